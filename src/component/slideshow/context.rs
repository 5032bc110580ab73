use super::session::Session;
use crate::config::EncoderSettings;
use crate::tools::{DurationProbe, FfmpegCommand, MediaEncoder};
use anyhow::{Result, bail};
use rust_i18n::t;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// 各階段共用的執行環境
///
/// 每次呼叫外部工具前都會檢查中斷信號，中斷時回傳錯誤，讓暫存目錄隨 `Session` 一起清除。
pub struct StageContext<'a, P, E> {
    pub probe: &'a P,
    pub encoder: &'a E,
    pub settings: &'a EncoderSettings,
    pub session: &'a Session,
    pub shutdown_signal: &'a AtomicBool,
}

impl<P: DurationProbe, E: MediaEncoder> StageContext<'_, P, E> {
    pub fn ensure_running(&self) -> Result<()> {
        if self.shutdown_signal.load(Ordering::SeqCst) {
            bail!("{}", t!("common.interrupted"));
        }
        Ok(())
    }

    pub fn encode(&self, command: &FfmpegCommand) -> Result<()> {
        self.ensure_running()?;
        self.encoder.encode(command)
    }

    pub fn probe_duration(&self, path: &Path) -> Result<f64> {
        self.ensure_running()?;
        self.probe.probe_duration(path)
    }
}
