use super::context::StageContext;
use super::photo_selector::PhotoEntry;
use crate::tools::{DurationProbe, FfmpegCommand, MediaEncoder};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use rust_i18n::t;
use std::io::{self, Write};
use std::path::PathBuf;

/// 暫存目錄中的影片片段與其預期長度
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub path: PathBuf,
    pub duration: f64,
}

/// 每 N 張照片輸出一次進度
const REPORT_EVERY: usize = 10;

/// 每張照片各自轉成固定長度的無聲片段，檔名編號即播放順序
pub fn synthesize_clips<P: DurationProbe, E: MediaEncoder>(
    ctx: &StageContext<'_, P, E>,
    photos: &[PhotoEntry],
    photo_duration: f64,
) -> Result<Vec<Clip>> {
    let progress_bar = ProgressBar::new(photos.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let stdout = io::stdout();
    synthesize_with_progress(ctx, photos, photo_duration, &progress_bar, &mut stdout.lock())
}

/// 進度文字寫到 `out`，與進度條是否顯示無關
fn synthesize_with_progress<P: DurationProbe, E: MediaEncoder, W: Write>(
    ctx: &StageContext<'_, P, E>,
    photos: &[PhotoEntry],
    photo_duration: f64,
    progress_bar: &ProgressBar,
    out: &mut W,
) -> Result<Vec<Clip>> {
    let mut clips = Vec::with_capacity(photos.len());

    let total = photos.len();
    for (index, photo) in photos.iter().enumerate() {
        let current = index + 1;
        if index % REPORT_EVERY == 0 || current == total {
            let line = t!("clips.processing", current = current, total = total);
            progress_bar.suspend(|| writeln!(out, "  {line}"))?;
        }
        progress_bar.set_message(photo.name.clone());

        let clip_path = ctx.session.clip_path(index);
        let command =
            FfmpegCommand::still_clip(&photo.path, &clip_path, photo_duration, ctx.settings);

        if let Err(e) = ctx.encode(&command) {
            progress_bar.abandon();
            return Err(e.context(format!("無法建立照片片段: {}", photo.path.display())));
        }
        debug!("片段已建立 [{index}]: {}", clip_path.display());

        clips.push(Clip {
            path: clip_path,
            duration: photo_duration,
        });
        progress_bar.inc(1);
    }

    progress_bar.finish_and_clear();
    Ok(clips)
}
