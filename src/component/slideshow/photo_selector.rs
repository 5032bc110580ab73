use crate::config::FileTypeTable;
use crate::tools::{scan_media_files, validate_directory_exists};
use anyhow::Result;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 資料夾中找到的一張照片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoEntry {
    pub name: String,
    pub path: PathBuf,
}

/// 指定開頭照片的處理結果，依指定順序保存
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPhotoRequest {
    pub name: String,
    pub placed: bool,
}

/// 照片排序結果
#[derive(Debug, Clone, Default)]
pub struct PhotoSelection {
    /// 最終播放順序：指定的開頭照片在前，其餘隨機
    pub photos: Vec<PhotoEntry>,
    pub requests: Vec<FixedPhotoRequest>,
    pub random_count: usize,
}

impl PhotoSelection {
    /// 成功放在開頭的檔名
    #[must_use]
    pub fn fixed_names(&self) -> Vec<&str> {
        self.requests
            .iter()
            .filter(|r| r.placed)
            .map(|r| r.name.as_str())
            .collect()
    }

    /// 指定了但資料夾中不存在的檔名
    #[must_use]
    pub fn missing_names(&self) -> Vec<&str> {
        self.requests
            .iter()
            .filter(|r| !r.placed)
            .map(|r| r.name.as_str())
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.photos.len()
    }
}

/// 掃描照片資料夾（不遞迴）
pub fn scan_photos(folder: &Path, file_type_table: &FileTypeTable) -> Result<Vec<PhotoEntry>> {
    validate_directory_exists(folder)?;

    let photos = scan_media_files(folder, &file_type_table.image_extensions_set())
        .into_iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().to_string();
            Some(PhotoEntry { name, path })
        })
        .collect();

    Ok(photos)
}

/// 先放指定的開頭照片，其餘照片隨機排列
///
/// 指定的檔名不存在時只記錄為未放入，不會中斷；同一檔名重複指定時只放一次。
pub fn select_photos<R: Rng + ?Sized>(
    entries: Vec<PhotoEntry>,
    first_photos: &[String],
    rng: &mut R,
) -> PhotoSelection {
    let mut pool: HashMap<String, PhotoEntry> = entries
        .into_iter()
        .map(|entry| (entry.name.clone(), entry))
        .collect();

    let mut selection = PhotoSelection::default();

    for name in first_photos {
        let entry = pool.remove(name);
        selection.requests.push(FixedPhotoRequest {
            name: name.clone(),
            placed: entry.is_some(),
        });
        selection.photos.extend(entry);
    }

    // HashMap 的順序不固定，先排序讓相同種子得到相同結果
    let mut remaining: Vec<PhotoEntry> = pool.into_values().collect();
    remaining.sort_by(|a, b| a.name.cmp(&b.name));
    remaining.shuffle(rng);

    selection.random_count = remaining.len();
    selection.photos.extend(remaining);
    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn entries(names: &[&str]) -> Vec<PhotoEntry> {
        names
            .iter()
            .map(|name| PhotoEntry {
                name: (*name).to_string(),
                path: PathBuf::from("/photos").join(name),
            })
            .collect()
    }

    fn names(selection: &PhotoSelection) -> Vec<&str> {
        selection.photos.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_every_photo_appears_once() {
        let input = entries(&["a.jpg", "b.jpg", "c.png", "d.bmp", "e.jpeg"]);
        let mut rng = StdRng::seed_from_u64(7);
        let selection = select_photos(input, &[], &mut rng);

        assert_eq!(selection.len(), 5);
        let unique: HashSet<_> = names(&selection).into_iter().collect();
        assert_eq!(unique.len(), 5);
        assert_eq!(selection.random_count, 5);
        assert!(selection.requests.is_empty());
    }

    #[test]
    fn test_fixed_photos_lead_in_requested_order() {
        let input = entries(&["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg"]);
        let first = vec!["d.jpg".to_string(), "a.jpg".to_string()];

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selection = select_photos(input.clone(), &first, &mut rng);
            let order = names(&selection);

            assert_eq!(&order[..2], &["d.jpg", "a.jpg"]);
            let rest: HashSet<_> = order[2..].iter().copied().collect();
            assert_eq!(rest, HashSet::from(["b.jpg", "c.jpg", "e.jpg"]));
            assert_eq!(selection.random_count, 3);
        }
    }

    #[test]
    fn test_missing_fixed_photo_is_skipped() {
        let input = entries(&["a.jpg", "b.jpg"]);
        let first = vec!["nope.jpg".to_string(), "b.jpg".to_string()];
        let mut rng = StdRng::seed_from_u64(1);
        let selection = select_photos(input, &first, &mut rng);

        assert_eq!(selection.missing_names(), vec!["nope.jpg"]);
        assert_eq!(selection.fixed_names(), vec!["b.jpg"]);
        assert_eq!(names(&selection), vec!["b.jpg", "a.jpg"]);
    }

    #[test]
    fn test_duplicate_fixed_name_placed_once() {
        let input = entries(&["a.jpg", "b.jpg"]);
        let first = vec!["a.jpg".to_string(), "a.jpg".to_string()];
        let mut rng = StdRng::seed_from_u64(1);
        let selection = select_photos(input, &first, &mut rng);

        assert_eq!(names(&selection), vec!["a.jpg", "b.jpg"]);
        assert_eq!(selection.fixed_names(), vec!["a.jpg"]);
        assert_eq!(selection.missing_names(), vec!["a.jpg"]);
    }

    #[test]
    fn test_same_seed_same_order() {
        let input = entries(&["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg", "f.jpg"]);
        let first_run = select_photos(input.clone(), &[], &mut StdRng::seed_from_u64(42));
        let second_run = select_photos(input, &[], &mut StdRng::seed_from_u64(42));
        assert_eq!(first_run.photos, second_run.photos);
    }

    #[test]
    fn test_empty_input() {
        let mut rng = StdRng::seed_from_u64(0);
        let selection = select_photos(Vec::new(), &["a.jpg".to_string()], &mut rng);
        assert!(selection.is_empty());
        assert_eq!(selection.missing_names(), vec!["a.jpg"]);
    }

    #[test]
    fn test_scan_photos_from_folder() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["IMG_1.JPG", "img_2.png", "scan.BMP", "song.mp3", "readme.md"] {
            fs::write(temp_dir.path().join(name), b"x").unwrap();
        }

        let table = crate::config::Config::new().unwrap().file_type_table;
        let photos = scan_photos(temp_dir.path(), &table).unwrap();
        let found: Vec<_> = photos.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(found, vec!["IMG_1.JPG", "img_2.png", "scan.BMP"]);
    }

    #[test]
    fn test_scan_photos_missing_folder_fails() {
        let temp_dir = TempDir::new().unwrap();
        let table = crate::config::Config::new().unwrap().file_type_table;
        assert!(scan_photos(&temp_dir.path().join("missing"), &table).is_err());
    }
}
