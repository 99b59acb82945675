/// Final score computation.
///
/// A run scores per completed level (time tier + full-gold bonus), plus a
/// flat value for every gold piece collected anywhere, plus a bonus for
/// clearing every piece in the whole game.

use std::time::Duration;

pub const GOLD_VALUE: u32 = 250;
pub const LEVEL_GOLD_BONUS: u32 = 500;
pub const FULL_GOLD_BONUS: u32 = 2000;

/// Time tiers, inclusive upper bounds in seconds.
const TIME_TIERS: [(u64, u32); 4] = [(15, 1000), (30, 800), (45, 600), (60, 300)];
const SLOW_TIME_SCORE: u32 = 100;

/// Points for finishing a level in `elapsed`.
pub fn time_score(elapsed: Duration) -> u32 {
    let ms = elapsed.as_millis();
    TIME_TIERS
        .iter()
        .find(|(secs, _)| ms <= u128::from(*secs) * 1000)
        .map(|&(_, points)| points)
        .unwrap_or(SLOW_TIME_SCORE)
}

/// Per-level outcome fed into [`final_score`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelResult {
    /// `None` if the level was never completed.
    pub elapsed: Option<Duration>,
    pub gold_collected: u32,
    pub gold_total: u32,
}

impl LevelResult {
    /// Every piece taken. Levels without gold never qualify.
    pub fn all_gold(&self) -> bool {
        self.gold_total > 0 && self.gold_collected >= self.gold_total
    }
}

pub fn final_score(results: &[LevelResult]) -> u32 {
    let mut score = 0u32;
    for r in results {
        if let Some(elapsed) = r.elapsed {
            score += time_score(elapsed);
            if r.all_gold() {
                score += LEVEL_GOLD_BONUS;
            }
        }
    }

    let collected: u32 = results.iter().map(|r| r.gold_collected).sum();
    let total: u32 = results.iter().map(|r| r.gold_total).sum();
    score += collected * GOLD_VALUE;
    if total > 0 && collected >= total {
        score += FULL_GOLD_BONUS;
    }
    score
}
