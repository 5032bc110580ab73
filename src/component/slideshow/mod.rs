//! 相簿影片產生元件
//!
//! 流程：
//! 1. 選照片（指定開頭 + 隨機排列）
//! 2. 每張照片轉成片段
//! 3. 逐輪兩兩轉場合併
//! 4. 量測實際長度
//! 5. 加上循環音樂後輸出

mod audio_compositor;
mod clip_synthesizer;
mod context;
mod main;
mod photo_selector;
mod session;
mod transition_merger;

pub use audio_compositor::{
    CompositeKind, MusicPlaylist, MusicTrack, build_playlist, compose, scan_music,
    write_concat_list,
};
pub use clip_synthesizer::{Clip, synthesize_clips};
pub use context::StageContext;
pub use main::{PipelineStage, SlideshowBuilder, SlideshowReport};
pub use photo_selector::{
    FixedPhotoRequest, PhotoEntry, PhotoSelection, scan_photos, select_photos,
};
pub use session::Session;
pub use transition_merger::{MergeOutcome, merge_clips, merged_duration};
