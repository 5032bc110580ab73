//! 命令列參數
//!
//! `<photo_folder> [output_file] [duration] [transition_duration] [--music <folder>] [--first <name> ...]`

use crate::config::SlideshowOptions;
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use log::{debug, warn};
use rust_i18n::t;
use std::ffi::OsString;
use std::path::PathBuf;

/// 數值參數以字串接收，格式錯誤時保留預設值而非報錯
#[derive(Parser, Debug)]
#[command(
    name = "memory_ball_video",
    disable_help_flag = true,
    args_override_self = true
)]
struct CliArgs {
    photo_folder: Option<PathBuf>,

    output: Option<PathBuf>,

    #[arg(allow_negative_numbers = true)]
    duration: Option<String>,

    #[arg(allow_negative_numbers = true)]
    transition: Option<String>,

    /// 多出來的位置參數
    #[arg(hide = true, allow_negative_numbers = true)]
    extra: Vec<String>,

    /// 只給旗標不給資料夾時視同未指定
    #[arg(long, value_name = "FOLDER", num_args = 0..=1)]
    music: Option<Option<PathBuf>>,

    /// 吃掉後面所有值，直到下一個旗標；重複指定時以最後一次為準
    #[arg(long, value_name = "NAME", num_args = 0.., action = ArgAction::Set, allow_negative_numbers = true)]
    first: Option<Vec<String>>,

    #[arg(short = 'h', long = "help", action = ArgAction::SetTrue)]
    help: bool,
}

/// 解析參數（第一個為程式名稱）
///
/// 缺少照片資料夾、要求說明或參數無法解析時回傳 `None`，由呼叫端印出用法。
pub fn parse_args<I, T>(args: I) -> Option<SlideshowOptions>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match CliArgs::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            if e.kind() != ErrorKind::DisplayHelp {
                warn!("無法解析參數: {}", e.render());
            }
            return None;
        }
    };

    if cli.help {
        return None;
    }
    let folder = cli.photo_folder?;

    let mut options = SlideshowOptions::new(folder);
    if let Some(output) = cli.output {
        options.output_path = output;
    }
    if let Some(duration) = cli.duration {
        apply_seconds(&duration, &mut options.photo_duration);
    }
    if let Some(transition) = cli.transition {
        apply_seconds(&transition, &mut options.transition_duration);
    }
    if !cli.extra.is_empty() {
        debug!("忽略多餘參數: {:?}", cli.extra);
    }
    options.music_folder = cli.music.flatten();
    options.first_photos = cli.first;

    Some(options)
}

/// 無法解析的數值直接忽略，保留原本的值
fn apply_seconds(arg: &str, target: &mut f64) {
    match arg.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => *target = value,
        _ => debug!("無法解析秒數 {arg:?}，保留 {target}"),
    }
}

/// 用法說明
#[must_use]
pub fn usage(program: &str) -> String {
    [
        t!("cli.usage", program = program).to_string(),
        String::new(),
        t!("cli.examples").to_string(),
        format!("  {program} ./photos"),
        format!("  {program} ./photos output.mp4 5 1"),
        format!("  {program} ./photos output.mp4 5 1 --music ./music"),
        format!("  {program} ./photos output.mp4 5 1 --first IMG_001.jpg IMG_002.jpg IMG_003.jpg"),
        format!("  {program} ./photos output.mp4 5 1 --music ./music --first IMG_001.jpg IMG_002.jpg"),
    ]
    .join("\n")
}
