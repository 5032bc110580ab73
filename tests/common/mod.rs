//! 測試共用工具：不需要 ffmpeg 的假媒體工具

#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use memory_ball_video::config::Config;
use memory_ball_video::tools::{CommandKind, DurationProbe, FfmpegCommand, MediaEncoder};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 假的 ffmpeg/ffprobe
///
/// 每個命令都會產生輸出檔並記住其長度，之後 probe 同一路徑時回傳該長度。
/// 串流複製會把輸入檔內容原樣寫到輸出。
#[derive(Default)]
pub struct FakeMedia {
    pub durations: RefCell<HashMap<PathBuf, f64>>,
    pub commands: RefCell<Vec<FfmpegCommand>>,
    pub concat_lists: RefCell<Vec<String>>,
    pub fail_when: Option<fn(&CommandKind) -> bool>,
}

impl FakeMedia {
    pub fn failing_on(predicate: fn(&CommandKind) -> bool) -> Self {
        Self {
            fail_when: Some(predicate),
            ..Default::default()
        }
    }

    pub fn set_duration(&self, path: &Path, seconds: f64) {
        self.durations
            .borrow_mut()
            .insert(path.to_path_buf(), seconds);
    }

    pub fn count(&self, predicate: fn(&CommandKind) -> bool) -> usize {
        self.commands
            .borrow()
            .iter()
            .filter(|c| predicate(c.kind()))
            .count()
    }

    pub fn find(&self, predicate: fn(&CommandKind) -> bool) -> Option<FfmpegCommand> {
        self.commands
            .borrow()
            .iter()
            .find(|c| predicate(c.kind()))
            .cloned()
    }
}

impl DurationProbe for FakeMedia {
    fn probe_duration(&self, path: &Path) -> Result<f64> {
        self.durations
            .borrow()
            .get(path)
            .copied()
            .with_context(|| format!("ffprobe: {} 不存在", path.display()))
    }
}

impl MediaEncoder for FakeMedia {
    fn encode(&self, command: &FfmpegCommand) -> Result<()> {
        self.commands.borrow_mut().push(command.clone());

        if self.fail_when.is_some_and(|fail| fail(command.kind())) {
            bail!("ffmpeg exited with status 1");
        }

        let output = command.output_path();
        let inputs = command.inputs();
        let duration = match command.kind() {
            CommandKind::StillClip { duration } => {
                fs::write(output, format!("still:{}", inputs[0].display()))?;
                *duration
            }
            CommandKind::Transition {
                transition,
                target_duration,
                ..
            } => {
                fs::write(output, format!("{transition}:{}", inputs.len()))?;
                *target_duration
            }
            CommandKind::AudioLoop { duration } => {
                self.concat_lists
                    .borrow_mut()
                    .push(fs::read_to_string(&inputs[0])?);
                fs::write(output, "audio")?;
                *duration
            }
            CommandKind::MuxAudio => {
                let mut bytes = fs::read(&inputs[0])?;
                bytes.extend_from_slice(b"+audio");
                fs::write(output, bytes)?;
                self.probe_duration(&inputs[0])?
            }
            CommandKind::StreamCopy => {
                fs::copy(&inputs[0], output)?;
                self.probe_duration(&inputs[0])?
            }
        };

        self.set_duration(output, duration);
        Ok(())
    }
}

pub fn is_still(kind: &CommandKind) -> bool {
    matches!(kind, CommandKind::StillClip { .. })
}

pub fn is_transition(kind: &CommandKind) -> bool {
    matches!(kind, CommandKind::Transition { .. })
}

pub fn is_audio_loop(kind: &CommandKind) -> bool {
    matches!(kind, CommandKind::AudioLoop { .. })
}

pub fn is_mux(kind: &CommandKind) -> bool {
    matches!(kind, CommandKind::MuxAudio)
}

pub fn is_copy(kind: &CommandKind) -> bool {
    matches!(kind, CommandKind::StreamCopy)
}

/// 不讀工作目錄的設定檔，使用預設值
pub fn default_config() -> Config {
    Config::with_settings_file(Path::new("/nonexistent/slideshow_settings.json")).unwrap()
}

/// 建立內容為檔名的假照片
pub fn create_photos(folder: &Path, names: &[&str]) {
    fs::create_dir_all(folder).unwrap();
    for name in names {
        fs::write(folder.join(name), name.as_bytes()).unwrap();
    }
}

/// 暫存根目錄下是否還有任何東西
pub fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path).unwrap().next().is_none()
}
