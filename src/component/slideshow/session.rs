use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const SESSION_PREFIX: &str = "memory_ball_";

/// 單次執行的暫存目錄
///
/// 所有中間檔案只寫在這裡；值被 drop 時（成功、錯誤傳遞或 panic）整個目錄樹都會刪除。
#[derive(Debug)]
pub struct Session {
    root: PathBuf,
}

impl Session {
    pub fn create_in(parent: &Path) -> Result<Self> {
        let root = parent.join(format!("{SESSION_PREFIX}{}", Uuid::new_v4().simple()));
        fs::create_dir_all(&root)
            .with_context(|| format!("無法建立暫存目錄: {}", root.display()))?;
        debug!("建立暫存目錄: {}", root.display());
        Ok(Self { root })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// 第 `index` 張照片的片段
    #[must_use]
    pub fn clip_path(&self, index: usize) -> PathBuf {
        self.root.join(format!("clip_{index:04}.mp4"))
    }

    /// 第 `round` 輪中，從第 `index` 個片段開始的合併結果
    #[must_use]
    pub fn merge_path(&self, round: usize, index: usize) -> PathBuf {
        self.root.join(format!("merge_r{round}_{index:04}.mp4"))
    }

    #[must_use]
    pub fn music_list_path(&self) -> PathBuf {
        self.root.join("music_list.txt")
    }

    #[must_use]
    pub fn looped_music_path(&self) -> PathBuf {
        self.root.join("looped_music.m4a")
    }

    fn cleanup(&self) {
        if self.root.exists() {
            match fs::remove_dir_all(&self.root) {
                Ok(()) => debug!("已刪除暫存目錄: {}", self.root.display()),
                Err(e) => warn!("無法清理暫存目錄 {}: {e}", self.root.display()),
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cleanup();
    }
}
