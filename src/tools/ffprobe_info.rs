use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// 查詢媒體長度的能力介面，測試時以假物件取代 ffprobe
pub trait DurationProbe {
    fn probe_duration(&self, path: &Path) -> Result<f64>;
}

impl<T: DurationProbe + ?Sized> DurationProbe for &T {
    fn probe_duration(&self, path: &Path) -> Result<f64> {
        (**self).probe_duration(path)
    }
}

/// 呼叫系統上的 ffprobe
#[derive(Debug, Clone, Copy, Default)]
pub struct Ffprobe;

impl DurationProbe for Ffprobe {
    fn probe_duration(&self, path: &Path) -> Result<f64> {
        Ok(get_media_info(path)?.duration_seconds)
    }
}

#[derive(Debug, Clone)]
pub struct MediaInfo {
    pub duration_seconds: f64,
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    duration: Option<String>,
}

/// 使用 ffprobe 取得媒體長度
pub fn get_media_info(path: &Path) -> Result<MediaInfo> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe 執行失敗 {}: {}", path.display(), stderr.trim());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_probe_output(&stdout).with_context(|| format!("無法解析 ffprobe 輸出: {}", path.display()))
}

fn parse_probe_output(json: &str) -> Result<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_str(json)?;
    let streams = probe.streams.unwrap_or_default();

    // 取得長度（優先從 format，其次從第一個有長度的串流）
    let duration_seconds = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or_else(|| streams.iter().find_map(|s| s.duration.as_deref()))
        .and_then(|d| d.trim().parse::<f64>().ok())
        .ok_or_else(|| anyhow::anyhow!("無法取得媒體長度"))?;

    Ok(MediaInfo { duration_seconds })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_duration() {
        let json = r#"{
            "streams": [{"codec_type": "video", "duration": "4.966667"}],
            "format": {"duration": "5.000000"}
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert!((info.duration_seconds - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_falls_back_to_stream_duration() {
        let json = r#"{
            "streams": [
                {"codec_type": "video"},
                {"codec_type": "audio", "duration": "12.5"}
            ],
            "format": {}
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert!((info.duration_seconds - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_without_duration_fails() {
        let json = r#"{"streams": [], "format": {"duration": "N/A"}}"#;
        assert!(parse_probe_output(json).is_err());
    }

    #[test]
    fn test_parse_invalid_json_fails() {
        assert!(parse_probe_output("not json").is_err());
    }
}
