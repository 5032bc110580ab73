mod ffmpeg_command;
mod ffprobe_info;
mod media_scanner;

pub use ffmpeg_command::{
    CommandKind, FfmpegCommand, FfmpegRunner, MediaEncoder, OutputMode, TransitionTiming,
    format_seconds,
};
pub use ffprobe_info::{DurationProbe, Ffprobe, MediaInfo, get_media_info};
pub use media_scanner::{scan_media_files, validate_directory_exists};
