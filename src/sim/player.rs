/// Player locomotion state machine.
///
/// ## Per-tick order
///   pose → clear ground flag → gravity (wall slide aware) → move x →
///   clear wall flag → resolve x → move y → resolve y (+ platform carry) →
///   hazards → gold → bouncepads → screen clamps → respawn flash →
///   wall-jump lockout countdown.
///
/// Flags are composed, not exclusive: a player can be grounded, touching a
/// wall, locked out after a wall jump and flashing after a respawn all at
/// once. `can_jump` and `can_wall_jump` are re-earned every tick by the
/// collision passes, so they always describe the contact made this tick.

use crate::config::{PhysicsConfig, ScreenConfig};
use crate::domain::geom::Rect;
use crate::sim::event::GameEvent;
use crate::sim::level::Level;

/// Cosmetic pose picked at the start of each tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Pose {
    #[default]
    Idle,
    Airborne,
    RunRight,
    RunLeft,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub rect: Rect,
    pub h_speed: f32,
    pub v_speed: f32,
    /// Gravity applied on the last tick (reduced while wall sliding).
    pub gravity: f32,
    pub lives: u32,
    pub gold_total: u32,
    /// Gold collected per level, indexed by level number.
    pub level_gold: Vec<u32>,
    pub can_jump: bool,
    pub can_wall_jump: bool,
    /// -1 wall on the left, 1 wall on the right, 0 never touched one.
    pub wall_direction: i8,
    pub wall_jump_timer: u32,
    pub respawning: bool,
    pub respawn_timer: u32,
    pub pose: Pose,
    tuning: PhysicsConfig,
    screen: ScreenConfig,
}

impl Player {
    pub fn new(tuning: PhysicsConfig, screen: ScreenConfig, level_count: usize) -> Self {
        Player {
            rect: Rect::new(0.0, 0.0, tuning.player_width, tuning.player_height),
            h_speed: 0.0,
            v_speed: 0.0,
            gravity: tuning.gravity,
            lives: tuning.initial_lives,
            gold_total: 0,
            level_gold: vec![0; level_count],
            can_jump: false,
            can_wall_jump: false,
            wall_direction: 0,
            wall_jump_timer: 0,
            respawning: false,
            respawn_timer: 0,
            pose: Pose::Idle,
            tuning,
            screen,
        }
    }

    // ── Intents ──

    pub fn go_left(&mut self) {
        self.h_speed = -self.tuning.run_speed;
    }

    pub fn go_right(&mut self) {
        self.h_speed = self.tuning.run_speed;
    }

    pub fn stop(&mut self) {
        self.h_speed = 0.0;
    }

    /// Wall jump if touching a wall, else ground jump if grounded.
    /// Returns true if either happened.
    pub fn jump(&mut self) -> bool {
        if self.can_wall_jump {
            self.h_speed = self.tuning.wall_jump_h_speed * -f32::from(self.wall_direction);
            self.v_speed = self.tuning.wall_jump_v_speed;
            self.wall_jump_timer = self.tuning.wall_jump_duration;
            self.can_wall_jump = false;
            self.pose = Pose::Airborne;
            true
        } else if self.can_jump {
            self.v_speed = self.tuning.jump_speed;
            self.pose = Pose::Airborne;
            true
        } else {
            false
        }
    }

    /// Directional input is ignored while true.
    pub fn locked_out(&self) -> bool {
        self.respawning || self.wall_jump_timer > 0
    }

    /// Drawn dimmed on the first half of every 10-tick flash cycle.
    pub fn dimmed(&self) -> bool {
        self.respawning && self.respawn_timer % 10 < 5
    }

    // ── Placement ──

    /// Stand on the level's first platform, or on the floor at the
    /// fallback x if it has none.
    pub fn place_at_spawn(&mut self, level: &Level) {
        match level.first_platform() {
            Some(plat) => {
                self.rect.set_left(plat.rect.left());
                self.rect.set_bottom(plat.rect.top());
            }
            None => {
                self.rect.set_left(self.screen.fallback_spawn_x);
                self.rect.set_bottom(self.screen.height);
            }
        }
    }

    /// Zero motion and contact state and begin the respawn flash.
    pub fn start_respawn(&mut self) {
        self.h_speed = 0.0;
        self.v_speed = 0.0;
        self.can_jump = false;
        self.can_wall_jump = false;
        self.wall_jump_timer = 0;
        self.respawning = true;
        self.respawn_timer = 0;
    }

    // ══════════════════════════════════════════════════════════════
    // Tick
    // ══════════════════════════════════════════════════════════════

    pub fn update(&mut self, level_idx: usize, level: &mut Level, events: &mut Vec<GameEvent>) {
        self.pose = self.pick_pose();
        self.can_jump = false;

        // Gravity
        if self.can_wall_jump && self.v_speed > 0.0 {
            self.gravity = self.tuning.wall_slide_gravity;
            self.v_speed = self.v_speed.min(self.tuning.wall_slide_max_fall);
        } else {
            self.gravity = self.tuning.gravity;
        }
        self.v_speed += self.gravity;

        // Horizontal
        self.rect.x += self.h_speed;
        self.can_wall_jump = false;
        for plat in &level.platforms {
            if !self.rect.intersects(&plat.rect) {
                continue;
            }
            if self.h_speed > 0.0 {
                self.rect.set_right(plat.rect.left());
                self.wall_direction = 1;
                self.can_wall_jump = true;
            } else if self.h_speed < 0.0 {
                self.rect.set_left(plat.rect.right());
                self.wall_direction = -1;
                self.can_wall_jump = true;
            }
        }

        // Vertical
        self.rect.y += self.v_speed;
        let hits: Vec<usize> = level.platforms.iter()
            .enumerate()
            .filter(|(_, p)| self.rect.intersects(&p.rect))
            .map(|(i, _)| i)
            .collect();
        if !hits.is_empty() {
            self.can_jump = true;
        }
        for i in hits {
            let plat = &level.platforms[i];
            if self.v_speed > 0.0 {
                self.rect.set_bottom(plat.rect.top());
                self.v_speed = 0.0;
                let (dx, dy) = plat.carry();
                self.rect.shift(dx, dy);
            } else if self.v_speed < 0.0 {
                self.rect.set_top(plat.rect.bottom());
                self.v_speed = 0.0;
            }
        }

        // Hazards
        for i in 0..level.lasers.len() {
            let laser = &level.lasers[i];
            if laser.is_lethal() && self.rect.intersects(&laser.rect) {
                self.caught(level, events);
            }
        }
        if level.spikes.iter().any(|s| self.rect.intersects(&s.rect)) {
            self.caught(level, events);
        }
        if level.enemies.iter().any(|e| self.rect.intersects(&e.rect)) {
            self.caught(level, events);
        }

        self.collect_gold(level_idx, level, events);

        // Bouncepads only catch a falling player.
        if self.v_speed > 0.0 {
            if let Some(pad) = level.bouncepads.iter().find(|b| self.rect.intersects(&b.rect)) {
                self.v_speed = pad.strength;
                events.push(GameEvent::Bounced);
            }
        }

        // Screen clamps
        if self.rect.bottom() > self.screen.height {
            self.rect.set_bottom(self.screen.height);
            self.v_speed = 0.0;
            self.can_jump = true;
        }
        if self.rect.top() < 0.0 {
            self.rect.set_top(0.0);
            self.v_speed = 0.0;
        }

        if self.respawning {
            self.respawn_timer += 1;
            if self.respawn_timer >= self.tuning.respawn_flash_ticks {
                self.respawning = false;
            }
            self.h_speed = 0.0;
            self.v_speed = 0.0;
            self.wall_jump_timer = 0;
            self.can_jump = false;
            self.can_wall_jump = false;
        }

        self.wall_jump_timer = self.wall_jump_timer.saturating_sub(1);
    }

    fn pick_pose(&self) -> Pose {
        if !self.can_jump && !self.can_wall_jump {
            Pose::Airborne
        } else if self.h_speed > 0.0 {
            Pose::RunRight
        } else if self.h_speed < 0.0 {
            Pose::RunLeft
        } else {
            Pose::Idle
        }
    }

    // ── Hazard contact ──

    /// Lose a life and respawn at the start of the current level.
    /// Always scrolls the level back and repositions, wherever the
    /// player was caught.
    pub fn caught(&mut self, level: &mut Level, events: &mut Vec<GameEvent>) {
        level.reset_shift();
        self.lives = self.lives.saturating_sub(1);
        self.start_respawn();
        self.place_at_spawn(level);
        log::debug!("player caught; {} lives left", self.lives);
        events.push(GameEvent::LifeLost { lives_left: self.lives });
    }

    // ── Pickups ──

    /// Take every gold piece overlapping the player. Pieces are removed
    /// from the level as they are counted, so each is counted once.
    /// Returns how many were taken.
    pub fn collect_gold(&mut self, level_idx: usize, level: &mut Level, events: &mut Vec<GameEvent>) -> u32 {
        let before = level.gold.len();
        let rect = self.rect;
        level.gold.retain(|g| !g.rect.intersects(&rect));
        let taken = (before - level.gold.len()) as u32;

        for _ in 0..taken {
            self.gold_total += 1;
            if let Some(count) = self.level_gold.get_mut(level_idx) {
                *count += 1;
            }
            events.push(GameEvent::GoldCollected { level: level_idx });
        }
        taken
    }
}
