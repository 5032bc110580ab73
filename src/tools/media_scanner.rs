use crate::config::FileTypeTable;
use anyhow::{Result, bail};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 確認來源資料夾存在
pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("路徑不存在: {}", path.display());
    }
    if !path.is_dir() {
        bail!("路徑不是資料夾: {}", path.display());
    }
    Ok(())
}

/// 只掃描資料夾第一層，依檔名排序後回傳符合副檔名的檔案
///
/// 資料夾不存在時回傳空列表。
pub fn scan_media_files(directory: &Path, extensions: &HashSet<String>) -> Vec<PathBuf> {
    WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| FileTypeTable::matches(entry.path(), extensions))
        .map(walkdir::DirEntry::into_path)
        .collect()
}
