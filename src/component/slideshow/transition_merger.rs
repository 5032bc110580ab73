use super::clip_synthesizer::Clip;
use super::context::StageContext;
use crate::tools::{DurationProbe, FfmpegCommand, MediaEncoder, TransitionTiming};
use anyhow::{Context, Result, bail};
use log::{debug, info};
use rand::Rng;
use rand::seq::IndexedRandom;
use rust_i18n::t;

/// 合併完成的結果
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub clip: Clip,
    pub rounds: usize,
    pub merges: usize,
}

/// 兩段以 `overlap` 秒轉場相接後的長度
#[must_use]
pub fn merged_duration(first: f64, second: f64, overlap: f64) -> f64 {
    first + second - overlap
}

/// 逐輪兩兩合併，直到只剩一個片段
///
/// 每輪由左到右配對相鄰片段；數量為奇數時最後一段原封不動留到下一輪。
/// N 個片段總共合併 N-1 次，每次只處理兩個輸入（xfade 一次只接受兩段）。
pub fn merge_clips<P, E, R>(
    ctx: &StageContext<'_, P, E>,
    clips: Vec<Clip>,
    overlap: f64,
    rng: &mut R,
) -> Result<MergeOutcome>
where
    P: DurationProbe,
    E: MediaEncoder,
    R: Rng + ?Sized,
{
    let mut current = clips;
    let mut rounds = 0;
    let mut merges = 0;

    if current.len() > 1 && ctx.settings.transitions.is_empty() {
        bail!("轉場效果清單為空，請檢查設定檔");
    }

    while current.len() > 1 {
        rounds += 1;
        println!(
            "  {}",
            t!("merge.round", round = rounds, count = current.len())
        );

        let mut next = Vec::with_capacity(current.len().div_ceil(2));

        for (pair_index, pair) in current.chunks(2).enumerate() {
            let [first, second] = pair else {
                debug!("第 {rounds} 輪保留片段: {}", pair[0].path.display());
                next.extend_from_slice(pair);
                continue;
            };

            let merged = merge_pair(ctx, first, second, overlap, rounds, pair_index * 2, rng)?;
            next.push(merged);
            merges += 1;
        }

        current = next;
    }

    let Some(clip) = current.pop() else {
        bail!("沒有可合併的片段");
    };

    info!("合併完成: {rounds} 輪, {merges} 次轉場");
    Ok(MergeOutcome {
        clip,
        rounds,
        merges,
    })
}

fn merge_pair<P, E, R>(
    ctx: &StageContext<'_, P, E>,
    first: &Clip,
    second: &Clip,
    overlap: f64,
    round: usize,
    index: usize,
    rng: &mut R,
) -> Result<Clip>
where
    P: DurationProbe,
    E: MediaEncoder,
    R: Rng + ?Sized,
{
    // 以實際長度計算，編碼後的長度可能和預期略有差異
    let first_duration = ctx
        .probe_duration(&first.path)
        .with_context(|| format!("無法取得片段長度: {}", first.path.display()))?;
    let second_duration = ctx
        .probe_duration(&second.path)
        .with_context(|| format!("無法取得片段長度: {}", second.path.display()))?;

    let Some(transition) = ctx.settings.transitions.choose(rng) else {
        bail!("轉場效果清單為空，請檢查設定檔");
    };

    let timing = TransitionTiming {
        offset: first_duration - overlap,
        target_duration: merged_duration(first_duration, second_duration, overlap),
    };
    let output_path = ctx.session.merge_path(round, index);

    let command = FfmpegCommand::transition(
        &first.path,
        &second.path,
        &output_path,
        transition,
        overlap,
        timing,
        ctx.settings,
    );
    ctx.encode(&command).with_context(|| {
        format!(
            "轉場合併失敗 ({transition}): {} + {}",
            first.path.display(),
            second.path.display()
        )
    })?;

    debug!(
        "第 {round} 輪 [{index}] {transition}: {first_duration:.3}s + {second_duration:.3}s -> {:.3}s",
        timing.target_duration
    );

    Ok(Clip {
        path: output_path,
        duration: timing.target_duration,
    })
}
