pub mod load;
pub mod types;

pub use load::SETTINGS_FILE;
pub use types::{
    Config, DEFAULT_OUTPUT_FILE, DEFAULT_PHOTO_DURATION, DEFAULT_TRANSITIONS,
    DEFAULT_TRANSITION_DURATION, EncoderSettings, FileTypeTable, Language, SlideshowOptions,
    UserSettings,
};
