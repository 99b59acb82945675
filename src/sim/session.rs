/// Session: the complete state of a running game.
///
/// Owns the levels, the player, the current level index and the
/// simulated clock. Time advances by a fixed step per tick, so level
/// timings are deterministic and independent of frame pacing.
///
/// ## Scrolling
///
/// The player is kept inside a horizontal dead zone
/// `[shift_left, shift_right]`. Crossing either edge snaps the player back
/// onto it and scrolls the level by the overshoot instead.

use std::time::Duration;

use crate::config::{PhysicsConfig, ScreenConfig};
use crate::domain::score::{self, LevelResult};
use crate::sim::event::GameEvent;
use crate::sim::level::Level;
use crate::sim::pack::LevelError;
use crate::sim::player::Player;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    /// Every level finished.
    GameComplete,
    /// Out of lives.
    GameOver,
}

/// Horizontal intent for one tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MoveDir {
    #[default]
    None,
    Left,
    Right,
}

/// Input for one simulation tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub movement: MoveDir,
    /// Edge-triggered: true only on the tick the key went down.
    pub jump: bool,
}

pub struct Session {
    pub levels: Vec<Level>,
    pub player: Player,
    pub current: usize,
    pub phase: Phase,
    pub tick: u64,
    /// Simulated time since the session started.
    pub clock: Duration,
    pub level_start: Vec<Option<Duration>>,
    pub level_end: Vec<Option<Duration>>,
    screen: ScreenConfig,
    tick_len: Duration,
}

impl Session {
    pub fn new(
        levels: Vec<Level>,
        physics: PhysicsConfig,
        screen: ScreenConfig,
        tick_len: Duration,
    ) -> Result<Self, LevelError> {
        let Some(first) = levels.first() else { return Err(LevelError::Empty) };
        let mut player = Player::new(physics, screen, levels.len());
        player.place_at_spawn(first);

        let n = levels.len();
        let mut level_start = vec![None; n];
        level_start[0] = Some(Duration::ZERO);

        Ok(Session {
            levels,
            player,
            current: 0,
            phase: Phase::Playing,
            tick: 0,
            clock: Duration::ZERO,
            level_start,
            level_end: vec![None; n],
            screen,
            tick_len,
        })
    }

    pub fn tick_len(&self) -> Duration {
        self.tick_len
    }

    pub fn current_level(&self) -> &Level {
        &self.levels[self.current]
    }

    /// Time spent in the current level (frozen once it is finished).
    pub fn level_elapsed(&self) -> Duration {
        let start = self.level_start[self.current].unwrap_or(Duration::ZERO);
        let end = self.level_end[self.current].unwrap_or(self.clock);
        end.saturating_sub(start)
    }

    // ── Input ──

    /// Forward intents to the player. Directional input is dropped during
    /// the wall-jump lockout and the respawn flash; jumps are dropped
    /// while respawning.
    pub fn apply_input(&mut self, input: FrameInput) {
        let player = &mut self.player;
        if !player.locked_out() {
            match input.movement {
                MoveDir::Left => player.go_left(),
                MoveDir::Right => player.go_right(),
                MoveDir::None => player.stop(),
            }
        }
        if input.jump && !player.respawning {
            player.jump();
        }
    }

    // ── Per-tick stages ──

    /// Player first, then the level.
    pub fn advance_entities(&mut self, events: &mut Vec<GameEvent>) {
        let idx = self.current;
        let level = &mut self.levels[idx];
        self.player.update(idx, level, events);
        level.update(&mut self.player.rect);
    }

    /// Catch gold the player was pushed onto by a moving platform after
    /// its own pickup check.
    pub fn sweep_gold(&mut self, events: &mut Vec<GameEvent>) {
        let idx = self.current;
        self.player.collect_gold(idx, &mut self.levels[idx], events);
    }

    /// Keep the player inside the scroll dead zone.
    pub fn scroll(&mut self) {
        let level = &mut self.levels[self.current];
        let rect = &mut self.player.rect;

        if rect.right() >= self.screen.shift_right {
            let diff = rect.right() - self.screen.shift_right;
            rect.set_right(self.screen.shift_right);
            level.shift_world(-diff, 0.0);
        }
        if rect.left() <= self.screen.shift_left {
            let diff = self.screen.shift_left - rect.left();
            rect.set_left(self.screen.shift_left);
            level.shift_world(diff, 0.0);
        }
    }

    /// Advance to the next level, or finish the game, once the player is
    /// past the current level's limit.
    pub fn check_completion(&mut self, events: &mut Vec<GameEvent>) {
        if !self.current_level().is_complete(&self.player.rect) {
            return;
        }

        self.level_end[self.current] = Some(self.clock);
        log::info!(
            "{} complete in {:.1}s",
            self.current_level().name,
            self.level_elapsed().as_secs_f32()
        );

        if self.current + 1 < self.levels.len() {
            events.push(GameEvent::LevelCompleted { level: self.current });
            self.current += 1;
            let next = &mut self.levels[self.current];
            next.reset_shift();
            self.player.place_at_spawn(next);
            self.player.start_respawn();
            self.level_start[self.current] = Some(self.clock);
        } else {
            self.phase = Phase::GameComplete;
            events.push(GameEvent::GameWon);
        }
    }

    pub fn check_game_over(&mut self, events: &mut Vec<GameEvent>) {
        if self.phase == Phase::Playing && self.player.lives == 0 {
            self.phase = Phase::GameOver;
            log::info!("game over on {}", self.current_level().name);
            events.push(GameEvent::GameLost);
        }
    }

    // ── Results ──

    pub fn levels_completed(&self) -> usize {
        self.level_end.iter().filter(|e| e.is_some()).count()
    }

    pub fn all_levels_completed(&self) -> bool {
        self.levels_completed() == self.levels.len()
    }

    pub fn level_results(&self) -> Vec<LevelResult> {
        (0..self.levels.len())
            .map(|i| LevelResult {
                elapsed: match (self.level_start[i], self.level_end[i]) {
                    (Some(s), Some(e)) => Some(e.saturating_sub(s)),
                    _ => None,
                },
                gold_collected: self.player.level_gold.get(i).copied().unwrap_or(0),
                gold_total: self.levels[i].initial_gold as u32,
            })
            .collect()
    }

    pub fn final_score(&self) -> u32 {
        score::final_score(&self.level_results())
    }
}
