use super::audio_compositor::{CompositeKind, compose, scan_music};
use super::clip_synthesizer::synthesize_clips;
use super::context::StageContext;
use super::photo_selector::{PhotoSelection, scan_photos, select_photos};
use super::session::Session;
use super::transition_merger::merge_clips;
use crate::config::{Config, SlideshowOptions};
use crate::tools::{DurationProbe, MediaEncoder};
use anyhow::{Context, Result};
use console::style;
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_i18n::t;
use std::cell::Cell;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 流程狀態：Idle → Selecting → Synthesizing → Merging → MeasuringDuration → Compositing → Done，
/// 任何階段出錯都會進入 Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Selecting,
    Synthesizing,
    Merging,
    MeasuringDuration,
    Compositing { with_audio: bool },
    Done,
    Failed,
}

/// 成功輸出後的摘要
#[derive(Debug, Clone, PartialEq)]
pub struct SlideshowReport {
    pub output_path: PathBuf,
    pub photo_count: usize,
    pub fixed_count: usize,
    pub rounds: usize,
    pub merges: usize,
    pub duration_seconds: f64,
    pub composite: CompositeKind,
}

/// 相簿影片產生器
///
/// 流程：
/// 1. 選照片（指定的開頭照片 + 其餘隨機）
/// 2. 每張照片轉成固定長度的片段
/// 3. 逐輪兩兩以隨機轉場合併
/// 4. 量測合併後的實際長度
/// 5. 加上循環音樂，或直接複製輸出
///
/// 所有中間檔案放在單次執行的暫存目錄，結束時一律清除。
pub struct SlideshowBuilder<P, E> {
    config: Config,
    options: SlideshowOptions,
    probe: P,
    encoder: E,
    shutdown_signal: Arc<AtomicBool>,
    rng: StdRng,
    temp_root: PathBuf,
    stage: Cell<PipelineStage>,
}

impl<P: DurationProbe, E: MediaEncoder> SlideshowBuilder<P, E> {
    pub fn new(
        config: Config,
        options: SlideshowOptions,
        probe: P,
        encoder: E,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            options,
            probe,
            encoder,
            shutdown_signal,
            rng: StdRng::from_os_rng(),
            temp_root: std::env::temp_dir(),
            stage: Cell::new(PipelineStage::Idle),
        }
    }

    /// 固定亂數種子，照片順序與轉場效果可重現
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// 暫存目錄建立在指定位置，而非系統暫存資料夾
    #[must_use]
    pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
        self.temp_root = temp_root.into();
        self
    }

    #[must_use]
    pub fn stage(&self) -> PipelineStage {
        self.stage.get()
    }

    /// 執行整個流程；資料夾中沒有照片時回傳 `Ok(None)`，不產生輸出
    pub fn run(&mut self) -> Result<Option<SlideshowReport>> {
        println!("{}", style(t!("pipeline.title")).cyan().bold());

        let result = self.run_stages();
        match &result {
            Ok(_) => self.enter(PipelineStage::Done),
            Err(e) => {
                error!("影片產生失敗: {e:#}");
                self.enter(PipelineStage::Failed);
            }
        }
        result
    }

    fn enter(&self, stage: PipelineStage) {
        debug!("流程狀態: {:?} -> {stage:?}", self.stage.get());
        self.stage.set(stage);
    }

    fn run_stages(&mut self) -> Result<Option<SlideshowReport>> {
        self.enter(PipelineStage::Selecting);

        let table = &self.config.file_type_table;
        let entries = scan_photos(&self.options.photo_folder, table)?;
        if entries.is_empty() {
            println!(
                "{}",
                style(t!(
                    "selector.no_images",
                    folder = self.options.photo_folder.display()
                ))
                .red()
            );
            warn!("找不到任何照片: {}", self.options.photo_folder.display());
            return Ok(None);
        }

        let first_photos = self.options.first_photos.as_deref().unwrap_or_default();
        let selection = select_photos(entries, first_photos, &mut self.rng);
        self.print_selection(&selection);

        let music_files = scan_music(self.options.music_folder.as_deref(), table);
        if !music_files.is_empty() {
            println!("{}", t!("audio.found", count = music_files.len()));
        }

        let session = Session::create_in(&self.temp_root)?;
        let result = self.render(&session, &selection, &music_files);

        println!("\n{}", style(t!("pipeline.cleanup")).dim());
        drop(session);

        result.map(Some)
    }

    fn render(
        &mut self,
        session: &Session,
        selection: &PhotoSelection,
        music_files: &[PathBuf],
    ) -> Result<SlideshowReport> {
        let ctx = StageContext {
            probe: &self.probe,
            encoder: &self.encoder,
            settings: &self.config.settings.encoder,
            session,
            shutdown_signal: self.shutdown_signal.as_ref(),
        };
        let options = &self.options;

        self.enter(PipelineStage::Synthesizing);
        println!("\n{}", style(t!("clips.stage")).cyan());
        let clips = synthesize_clips(&ctx, &selection.photos, options.photo_duration)?;

        self.enter(PipelineStage::Merging);
        println!("\n{}", style(t!("merge.stage")).cyan());
        let outcome = merge_clips(&ctx, clips, options.transition_duration, &mut self.rng)?;

        self.enter(PipelineStage::MeasuringDuration);
        // 轉場重疊會讓總長度小於各段相加，以實際檔案為準
        let video_duration = ctx
            .probe_duration(&outcome.clip.path)
            .with_context(|| format!("無法取得影片長度: {}", outcome.clip.path.display()))?;
        println!(
            "\n  {}",
            t!("merge.actual_duration", seconds = format!("{video_duration:.1}"))
        );

        let with_audio = !music_files.is_empty();
        self.enter(PipelineStage::Compositing { with_audio });
        println!("\n{}", style(t!("audio.stage")).cyan());
        let composite = compose(
            &ctx,
            &outcome.clip.path,
            video_duration,
            music_files,
            &options.output_path,
        )?;

        let report = SlideshowReport {
            output_path: options.output_path.clone(),
            photo_count: selection.len(),
            fixed_count: selection.fixed_names().len(),
            rounds: outcome.rounds,
            merges: outcome.merges,
            duration_seconds: video_duration,
            composite,
        };
        print_report(&report);
        Ok(report)
    }

    fn print_selection(&self, selection: &PhotoSelection) {
        for request in selection.requests.iter().filter(|r| !r.placed) {
            warn!("指定的開頭照片不存在: {}", request.name);
        }
        for line in selection_lines(selection, &self.options) {
            println!("{line}");
        }

        info!(
            "照片 {} 張（指定開頭 {}，隨機 {}）",
            selection.len(),
            selection.fixed_names().len(),
            selection.random_count
        );
    }
}

/// 選片結果的說明文字；沒有指定開頭照片時不列出指定區塊與分項數量
fn selection_lines(selection: &PhotoSelection, options: &SlideshowOptions) -> Vec<String> {
    let mut lines = Vec::new();
    let has_fixed = !selection.requests.is_empty();

    if has_fixed {
        lines.push(t!("selector.fixed_header").to_string());
        for (index, request) in selection.requests.iter().enumerate() {
            if request.placed {
                lines.push(format!("  {}. {}", index + 1, request.name));
            } else {
                let warning = t!("selector.fixed_missing", name = request.name);
                lines.push(format!("  {}", style(warning).yellow()));
            }
        }
    }

    lines.push(String::new());
    lines.push(t!("selector.total", count = selection.len()).to_string());
    if has_fixed {
        let fixed = t!("selector.fixed_count", count = selection.requests.len());
        let random = t!("selector.random_count", count = selection.random_count);
        lines.push(format!("  - {fixed}"));
        lines.push(format!("  - {random}"));
    }
    lines.push(
        t!(
            "selector.parameters",
            duration = options.photo_duration,
            transition = options.transition_duration
        )
        .to_string(),
    );

    lines
}

fn print_report(report: &SlideshowReport) {
    println!(
        "\n{}",
        style(t!(
            "pipeline.success",
            output = report.output_path.display()
        ))
        .green()
        .bold()
    );
    println!(
        "   {}",
        t!(
            "pipeline.summary",
            seconds = format!("{:.1}", report.duration_seconds),
            count = report.photo_count
        )
    );
    info!(
        "影片已建立: {} ({:.1}s, {} 張照片, {} 次轉場)",
        report.output_path.display(),
        report.duration_seconds,
        report.photo_count,
        report.merges
    );
}
