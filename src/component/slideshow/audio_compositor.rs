use super::context::StageContext;
use crate::config::FileTypeTable;
use crate::tools::{DurationProbe, FfmpegCommand, MediaEncoder, scan_media_files};
use anyhow::{Context, Result, bail};
use log::{debug, info};
use rust_i18n::t;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// 一首音樂及其實際長度
#[derive(Debug, Clone, PartialEq)]
pub struct MusicTrack {
    pub path: PathBuf,
    pub duration: f64,
}

/// 循環排列後的播放清單，總長至少等於影片長度
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MusicPlaylist {
    pub entries: Vec<PathBuf>,
    pub total_duration: f64,
}

/// 最後輸出是否含音樂
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    WithAudio,
    VideoOnly,
}

/// 找出音樂資料夾中的檔案；未指定或資料夾不存在時回傳空列表
#[must_use]
pub fn scan_music(folder: Option<&Path>, file_type_table: &FileTypeTable) -> Vec<PathBuf> {
    let Some(folder) = folder else {
        return Vec::new();
    };
    if !folder.is_dir() {
        debug!("音樂資料夾不存在: {}", folder.display());
        return Vec::new();
    }
    scan_media_files(folder, &file_type_table.audio_extensions_set())
}

/// 依原始順序循環加入音樂，直到總長度不少於 `target`
///
/// 最後一首可能超出影片長度，輸出時再截斷。
pub fn build_playlist(tracks: &[MusicTrack], target: f64) -> Result<MusicPlaylist> {
    if tracks.is_empty() {
        bail!("沒有可用的音樂檔案");
    }
    if tracks.iter().all(|track| track.duration <= 0.0) {
        bail!("音樂檔案長度皆為 0，無法填滿影片");
    }

    let mut playlist = MusicPlaylist::default();
    for track in tracks.iter().cycle() {
        if playlist.total_duration >= target {
            break;
        }
        playlist.entries.push(track.path.clone());
        playlist.total_duration += track.duration;
    }

    Ok(playlist)
}

/// 寫出 ffmpeg concat demuxer 清單，路徑中的單引號需跳脫
pub fn write_concat_list(playlist: &MusicPlaylist, list_path: &Path) -> Result<()> {
    let mut content = String::new();
    for entry in &playlist.entries {
        let absolute = std::path::absolute(entry)
            .with_context(|| format!("無法取得絕對路徑: {}", entry.display()))?;
        let escaped = absolute.to_string_lossy().replace('\'', "'\\''");
        writeln!(content, "file '{escaped}'")?;
    }

    fs::write(list_path, content)
        .with_context(|| format!("無法寫入音樂清單: {}", list_path.display()))
}

/// 把音樂鋪滿影片長度後合併輸出；沒有音樂時直接複製影片串流
pub fn compose<P: DurationProbe, E: MediaEncoder>(
    ctx: &StageContext<'_, P, E>,
    video: &Path,
    video_duration: f64,
    music_files: &[PathBuf],
    output_path: &Path,
) -> Result<CompositeKind> {
    if music_files.is_empty() {
        println!("  {}", t!("audio.no_music"));
        let command = FfmpegCommand::stream_copy(video, output_path);
        ctx.encode(&command)
            .with_context(|| format!("無法輸出影片: {}", output_path.display()))?;
        return Ok(CompositeKind::VideoOnly);
    }

    let mut tracks = Vec::with_capacity(music_files.len());
    for path in music_files {
        let duration = ctx
            .probe_duration(path)
            .with_context(|| format!("無法取得音樂長度: {}", path.display()))?;
        debug!("音樂 {}: {duration:.3}s", path.display());
        tracks.push(MusicTrack {
            path: path.clone(),
            duration,
        });
    }

    let playlist = build_playlist(&tracks, video_duration)?;
    info!(
        "音樂清單: {} 首, {:.1}s (影片 {video_duration:.1}s)",
        playlist.entries.len(),
        playlist.total_duration
    );

    let list_path = ctx.session.music_list_path();
    write_concat_list(&playlist, &list_path)?;

    println!("  {}", t!("audio.looping"));
    let looped_music = ctx.session.looped_music_path();
    let command =
        FfmpegCommand::audio_loop(&list_path, &looped_music, video_duration, ctx.settings);
    ctx.encode(&command).context("無法產生循環音樂")?;

    println!("  {}", t!("audio.combining"));
    let command = FfmpegCommand::mux_audio(video, &looped_music, output_path);
    ctx.encode(&command)
        .with_context(|| format!("無法合併影片與音樂: {}", output_path.display()))?;

    Ok(CompositeKind::WithAudio)
}
