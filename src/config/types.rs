use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// 預設輸出檔名
pub const DEFAULT_OUTPUT_FILE: &str = "output.mp4";
/// 每張照片預設顯示秒數
pub const DEFAULT_PHOTO_DURATION: f64 = 5.0;
/// 預設轉場秒數
pub const DEFAULT_TRANSITION_DURATION: f64 = 1.0;

/// ffmpeg xfade 可用的轉場效果
pub const DEFAULT_TRANSITIONS: [&str; 17] = [
    "fade",
    "dissolve",
    "circleopen",
    "circleclose",
    "fadeblack",
    "smoothleft",
    "smoothright",
    "smoothup",
    "smoothdown",
    "wipeleft",
    "wiperight",
    "wipeup",
    "wipedown",
    "slideleft",
    "slideright",
    "slideup",
    "slidedown",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "IMAGE_FILE")]
    pub image_file: Vec<String>,
    #[serde(rename = "AUDIO_FILE")]
    pub audio_file: Vec<String>,
}

impl FileTypeTable {
    #[must_use]
    pub fn image_extensions_set(&self) -> HashSet<String> {
        Self::extensions_set(&self.image_file)
    }

    #[must_use]
    pub fn audio_extensions_set(&self) -> HashSet<String> {
        Self::extensions_set(&self.audio_file)
    }

    #[must_use]
    pub fn is_image_file(&self, path: &Path) -> bool {
        Self::matches(path, &self.image_extensions_set())
    }

    #[must_use]
    pub fn is_audio_file(&self, path: &Path) -> bool {
        Self::matches(path, &self.audio_extensions_set())
    }

    fn extensions_set(extensions: &[String]) -> HashSet<String> {
        extensions.iter().map(|ext| ext.to_lowercase()).collect()
    }

    /// 副檔名比對不分大小寫，表內格式為 ".jpg"
    pub(crate) fn matches(path: &Path, extensions: &HashSet<String>) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(&format!(".{}", ext.to_lowercase())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    English,
    #[serde(rename = "zh-TW")]
    TraditionalChinese,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::English => "en-US",
            Self::TraditionalChinese => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 編碼參數，預設值對應 480x480 圓形顯示器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
    pub pixel_format: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    pub transitions: Vec<String>,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            width: 480,
            height: 480,
            fps: 30,
            video_codec: "libx264".to_string(),
            preset: "ultrafast".to_string(),
            crf: 23,
            pixel_format: "yuv420p".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
            transitions: DEFAULT_TRANSITIONS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// 使用者設定（`slideshow_settings.json`）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub encoder: EncoderSettings,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: UserSettings,
}

/// 單次執行的參數，由命令列解析而來
#[derive(Debug, Clone, PartialEq)]
pub struct SlideshowOptions {
    pub photo_folder: PathBuf,
    pub output_path: PathBuf,
    pub photo_duration: f64,
    pub transition_duration: f64,
    pub music_folder: Option<PathBuf>,
    pub first_photos: Option<Vec<String>>,
}

impl SlideshowOptions {
    #[must_use]
    pub fn new(photo_folder: impl Into<PathBuf>) -> Self {
        Self {
            photo_folder: photo_folder.into(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            photo_duration: DEFAULT_PHOTO_DURATION,
            transition_duration: DEFAULT_TRANSITION_DURATION,
            music_folder: None,
            first_photos: None,
        }
    }
}
