use crate::config::EncoderSettings;
use anyhow::{Context, Result, bail};
use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// ffmpeg 的輸出處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// 批次階段：輸出只在失敗時附在錯誤訊息中
    Quiet,
    /// 最後的合成步驟：直接顯示在終端機
    Inherit,
}

/// 命令的用途，連同會影響輸出長度的參數
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    StillClip {
        duration: f64,
    },
    Transition {
        transition: String,
        offset: f64,
        target_duration: f64,
    },
    AudioLoop {
        duration: f64,
    },
    MuxAudio,
    StreamCopy,
}

#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    kind: CommandKind,
    inputs: Vec<PathBuf>,
    args: Vec<OsString>,
    output_path: PathBuf,
    output_mode: OutputMode,
}

/// 秒數以完整精度輸出
#[must_use]
pub fn format_seconds(seconds: f64) -> String {
    format!("{seconds}")
}

impl FfmpegCommand {
    fn new(kind: CommandKind, output_path: &Path, output_mode: OutputMode) -> Self {
        Self {
            kind,
            inputs: Vec::new(),
            args: vec!["-hide_banner".into(), "-nostdin".into()],
            output_path: output_path.to_path_buf(),
            output_mode,
        }
    }

    fn arg(mut self, value: impl Into<OsString>) -> Self {
        self.args.push(value.into());
        self
    }

    fn args<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    fn input(mut self, path: &Path) -> Self {
        self.inputs.push(path.to_path_buf());
        self.args.push("-i".into());
        self.args.push(path.as_os_str().to_owned());
        self
    }

    fn video_encoding(self, settings: &EncoderSettings) -> Self {
        self.args([
            "-c:v".to_string(),
            settings.video_codec.clone(),
            "-preset".to_string(),
            settings.preset.clone(),
            "-crf".to_string(),
            settings.crf.to_string(),
            "-pix_fmt".to_string(),
            settings.pixel_format.clone(),
        ])
    }

    fn finish(self) -> Self {
        let output = self.output_path.as_os_str().to_owned();
        self.arg("-y").arg(output)
    }

    /// 單張照片轉為固定長度的無聲片段
    #[must_use]
    pub fn still_clip(
        image: &Path,
        output_path: &Path,
        duration: f64,
        settings: &EncoderSettings,
    ) -> Self {
        let filter = format!(
            "fps={},scale={}:{},format={}",
            settings.fps, settings.width, settings.height, settings.pixel_format
        );

        Self::new(CommandKind::StillClip { duration }, output_path, OutputMode::Quiet)
            .args(["-loop", "1"])
            .input(image)
            .args(["-t".to_string(), format_seconds(duration), "-vf".to_string(), filter])
            .video_encoding(settings)
            .arg("-an")
            .finish()
    }

    /// 以 xfade 濾鏡合併兩個片段，`offset` 為第一段中轉場開始的時間點
    #[must_use]
    pub fn transition(
        first: &Path,
        second: &Path,
        output_path: &Path,
        transition: &str,
        overlap: f64,
        timing: TransitionTiming,
        settings: &EncoderSettings,
    ) -> Self {
        let filter = format!(
            "[0:v][1:v]xfade=transition={transition}:duration={}:offset={}[v]",
            format_seconds(overlap),
            format_seconds(timing.offset)
        );

        Self::new(
            CommandKind::Transition {
                transition: transition.to_string(),
                offset: timing.offset,
                target_duration: timing.target_duration,
            },
            output_path,
            OutputMode::Quiet,
        )
        .input(first)
        .input(second)
        .args(["-filter_complex".to_string(), filter, "-map".to_string(), "[v]".to_string()])
        .video_encoding(settings)
        .args(["-t".to_string(), format_seconds(timing.target_duration)])
        .finish()
    }

    /// 依 concat 清單串接音樂並截斷到指定長度
    #[must_use]
    pub fn audio_loop(
        concat_list: &Path,
        output_path: &Path,
        duration: f64,
        settings: &EncoderSettings,
    ) -> Self {
        Self::new(CommandKind::AudioLoop { duration }, output_path, OutputMode::Quiet)
            .args(["-f", "concat", "-safe", "0"])
            .input(concat_list)
            .args([
                "-t".to_string(),
                format_seconds(duration),
                "-c:a".to_string(),
                settings.audio_codec.clone(),
                "-b:a".to_string(),
                settings.audio_bitrate.clone(),
            ])
            .finish()
    }

    /// 影音合併，兩者皆不重新編碼，以較短者為準
    #[must_use]
    pub fn mux_audio(video: &Path, audio: &Path, output_path: &Path) -> Self {
        Self::new(CommandKind::MuxAudio, output_path, OutputMode::Inherit)
            .input(video)
            .input(audio)
            .args(["-c:v", "copy", "-c:a", "copy", "-shortest"])
            .finish()
    }

    /// 無音樂時直接複製串流
    #[must_use]
    pub fn stream_copy(video: &Path, output_path: &Path) -> Self {
        Self::new(CommandKind::StreamCopy, output_path, OutputMode::Inherit)
            .input(video)
            .args(["-c", "copy"])
            .finish()
    }

    #[must_use]
    pub const fn kind(&self) -> &CommandKind {
        &self.kind
    }

    #[must_use]
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    #[must_use]
    pub fn args_list(&self) -> &[OsString] {
        &self.args
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    #[must_use]
    pub const fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(&self.args);
        cmd
    }
}

/// xfade 的時間參數
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionTiming {
    pub offset: f64,
    pub target_duration: f64,
}

/// 執行 ffmpeg 的能力介面，測試時以假物件取代
pub trait MediaEncoder {
    fn encode(&self, command: &FfmpegCommand) -> Result<()>;
}

impl<T: MediaEncoder + ?Sized> MediaEncoder for &T {
    fn encode(&self, command: &FfmpegCommand) -> Result<()> {
        (**self).encode(command)
    }
}

/// 呼叫系統上的 ffmpeg，逐一阻塞執行
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegRunner;

impl MediaEncoder for FfmpegRunner {
    fn encode(&self, command: &FfmpegCommand) -> Result<()> {
        let mut cmd = command.build_command();
        cmd.stdin(Stdio::null());
        debug!("執行 ffmpeg: {:?}", command.args_list());

        let output_path = command.output_path();
        match command.output_mode() {
            OutputMode::Quiet => {
                let output = cmd
                    .output()
                    .with_context(|| format!("無法執行 ffmpeg: {}", output_path.display()))?;

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    bail!(
                        "ffmpeg 執行失敗 ({}) {}: {}",
                        output.status,
                        output_path.display(),
                        stderr.trim()
                    );
                }
            }
            OutputMode::Inherit => {
                let status = cmd
                    .status()
                    .with_context(|| format!("無法執行 ffmpeg: {}", output_path.display()))?;

                if !status.success() {
                    bail!("ffmpeg 執行失敗 ({status}) {}", output_path.display());
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(cmd: &FfmpegCommand) -> Vec<String> {
        cmd.args_list()
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    fn value_after(args: &[String], flag: &str) -> String {
        let pos = args.iter().position(|a| a == flag).unwrap();
        args[pos + 1].clone()
    }

    #[test]
    fn test_still_clip_args() {
        let settings = EncoderSettings::default();
        let cmd = FfmpegCommand::still_clip(
            Path::new("/photos/a.jpg"),
            Path::new("/tmp/s/clip_0000.mp4"),
            5.0,
            &settings,
        );
        let args = args_of(&cmd);

        assert_eq!(value_after(&args, "-loop"), "1");
        assert_eq!(value_after(&args, "-i"), "/photos/a.jpg");
        assert_eq!(value_after(&args, "-t"), "5");
        assert_eq!(value_after(&args, "-vf"), "fps=30,scale=480:480,format=yuv420p");
        assert_eq!(value_after(&args, "-preset"), "ultrafast");
        assert_eq!(value_after(&args, "-crf"), "23");
        assert!(args.contains(&"-an".to_string()));
        assert_eq!(args.last().unwrap(), "/tmp/s/clip_0000.mp4");
        assert_eq!(cmd.output_mode(), OutputMode::Quiet);
        assert_eq!(cmd.kind(), &CommandKind::StillClip { duration: 5.0 });
    }

    #[test]
    fn test_transition_filter_graph() {
        let settings = EncoderSettings::default();
        let cmd = FfmpegCommand::transition(
            Path::new("a.mp4"),
            Path::new("b.mp4"),
            Path::new("merge_r1_0000.mp4"),
            "wipeleft",
            1.0,
            TransitionTiming {
                offset: 4.0,
                target_duration: 9.0,
            },
            &settings,
        );
        let args = args_of(&cmd);

        assert_eq!(cmd.inputs(), &[PathBuf::from("a.mp4"), PathBuf::from("b.mp4")]);
        assert_eq!(
            value_after(&args, "-filter_complex"),
            "[0:v][1:v]xfade=transition=wipeleft:duration=1:offset=4[v]"
        );
        assert_eq!(value_after(&args, "-map"), "[v]");
        assert_eq!(value_after(&args, "-t"), "9");
    }

    #[test]
    fn test_audio_loop_args() {
        let settings = EncoderSettings::default();
        let cmd = FfmpegCommand::audio_loop(
            Path::new("music_list.txt"),
            Path::new("looped_music.m4a"),
            12.345,
            &settings,
        );
        let args = args_of(&cmd);

        assert_eq!(value_after(&args, "-f"), "concat");
        assert_eq!(value_after(&args, "-safe"), "0");
        assert_eq!(value_after(&args, "-t"), "12.345");
        assert_eq!(value_after(&args, "-c:a"), "aac");
        assert_eq!(value_after(&args, "-b:a"), "192k");
    }

    #[test]
    fn test_mux_keeps_streams_and_shortest() {
        let cmd = FfmpegCommand::mux_audio(
            Path::new("video.mp4"),
            Path::new("audio.m4a"),
            Path::new("out.mp4"),
        );
        let args = args_of(&cmd);

        assert_eq!(value_after(&args, "-c:v"), "copy");
        assert_eq!(value_after(&args, "-c:a"), "copy");
        assert!(args.contains(&"-shortest".to_string()));
        assert_eq!(cmd.output_mode(), OutputMode::Inherit);
    }

    #[test]
    fn test_stream_copy_args() {
        let cmd = FfmpegCommand::stream_copy(Path::new("video.mp4"), Path::new("out.mp4"));
        let args = args_of(&cmd);

        assert_eq!(value_after(&args, "-c"), "copy");
        assert!(!args.contains(&"-shortest".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp4");
        assert_eq!(cmd.kind(), &CommandKind::StreamCopy);
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(9.0), "9");
        assert_eq!(format_seconds(4.5), "4.5");
        assert_eq!(format_seconds(13.066_667), "13.066667");
        assert_eq!(format_seconds(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_seconds(12.345_678_901).parse::<f64>().unwrap(), 12.345_678_901);
    }
}
