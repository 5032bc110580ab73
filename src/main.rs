use anyhow::Result;
use console::style;
use log::{info, warn};
use memory_ball_video::cli::{parse_args, usage};
use memory_ball_video::component::SlideshowBuilder;
use memory_ball_video::config::Config;
use memory_ball_video::init;
use memory_ball_video::set_language;
use memory_ball_video::signal::setup_shutdown_signal;
use memory_ball_video::tools::{FfmpegRunner, Ffprobe};
use rust_i18n::t;

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en-US");

const DEFAULT_PROGRAM_NAME: &str = "memory_ball_video";

fn main() -> Result<()> {
    init::init();

    // Load config and set locale
    let config = Config::new()?;
    set_language(config.settings.language);

    let program = std::env::args_os().next().map_or_else(
        || DEFAULT_PROGRAM_NAME.to_string(),
        |name| name.to_string_lossy().to_string(),
    );

    let Some(options) = parse_args(std::env::args_os()) else {
        println!("{}", usage(&program));
        std::process::exit(1);
    };

    let shutdown_signal = setup_shutdown_signal()?;
    let mut builder =
        SlideshowBuilder::new(config, options, Ffprobe, FfmpegRunner, shutdown_signal);

    match builder.run() {
        Ok(Some(report)) => {
            info!("Program exited normally: {}", report.output_path.display());
        }
        Ok(None) => {
            info!("Program exited without output");
        }
        Err(e) => {
            warn!("Program error: {e:#}");
            eprintln!("{} {e:#}", style(t!("common.error_prefix")).red().bold());
            std::process::exit(1);
        }
    }

    Ok(())
}
