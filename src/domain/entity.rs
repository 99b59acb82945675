/// Level entities: platforms (static + moving), lasers, spikes, gold,
/// bouncepads and enemies.
///
/// Every entity is a rectangle plus a kind-specific payload. Entities never
/// hold references to the player or to their level; anything they need
/// (the player's rectangle, the level's world shift, an anchor platform)
/// is passed into the call that needs it.

use serde::Deserialize;

use super::geom::Rect;

/// Patrol axis for moving platforms and enemies.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Which face a spike points out of. Purely visual: collision uses the
/// whole rectangle for every orientation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

/// Kind tag used for uniform iteration (drawing, debugging).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntityKind {
    Platform,
    MovingPlatform,
    Laser { active: bool },
    Spike(Orientation),
    Gold,
    Bouncepad,
    Enemy,
}

// ══════════════════════════════════════════════════════════════
// Patrol: shared back-and-forth motion
// ══════════════════════════════════════════════════════════════

/// Back-and-forth motion between two bounds along one axis.
///
/// Bounds are level-local (screen position minus world shift), so the
/// patrol range does not move when the level scrolls.
///
/// Horizontal patrols compare the left edge against both bounds.
/// Vertical patrols keep the whole body inside: top against `low`,
/// bottom against `high`.
///
/// Crossing a bound reflects the speed (no clamping), so an entity may
/// overshoot by at most one tick of travel.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Patrol {
    pub axis: Axis,
    pub speed: f32,
    pub low: f32,
    pub high: f32,
}

impl Patrol {
    /// Bounds may be given in either order.
    pub fn new(axis: Axis, speed: f32, bound1: f32, bound2: f32) -> Self {
        Patrol {
            axis,
            speed,
            low: bound1.min(bound2),
            high: bound1.max(bound2),
        }
    }

    /// Per-tick displacement `(dx, dy)`.
    pub fn delta(&self) -> (f32, f32) {
        match self.axis {
            Axis::Horizontal => (self.speed, 0.0),
            Axis::Vertical => (0.0, self.speed),
        }
    }

    /// Move `rect` by one tick of travel.
    pub fn step(&self, rect: &mut Rect) {
        let (dx, dy) = self.delta();
        rect.shift(dx, dy);
    }

    /// Reverse direction if the level-local position has crossed a bound
    /// while still heading outward. Returns true on reversal.
    pub fn reflect(&mut self, rect: &Rect, world_shift: (f32, f32)) -> bool {
        let (lo_edge, hi_edge) = match self.axis {
            Axis::Horizontal => {
                let local = rect.left() - world_shift.0;
                (local, local)
            }
            Axis::Vertical => (
                rect.top() - world_shift.1,
                rect.bottom() - world_shift.1,
            ),
        };
        let outward = (lo_edge < self.low && self.speed < 0.0)
            || (hi_edge > self.high && self.speed > 0.0);
        if outward {
            self.speed = -self.speed;
        }
        outward
    }

    /// `step` then `reflect`.
    pub fn advance(&mut self, rect: &mut Rect, world_shift: (f32, f32)) -> bool {
        self.step(rect);
        self.reflect(rect, world_shift)
    }
}

// ══════════════════════════════════════════════════════════════
// Platforms
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PlatformKind {
    Static,
    Moving(Patrol),
}

/// Solid from every side.
#[derive(Clone, Debug)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
}

impl Platform {
    pub fn fixed(rect: Rect) -> Self {
        Platform { rect, kind: PlatformKind::Static }
    }

    pub fn moving(rect: Rect, patrol: Patrol) -> Self {
        Platform { rect, kind: PlatformKind::Moving(patrol) }
    }

    pub fn patrol(&self) -> Option<&Patrol> {
        match &self.kind {
            PlatformKind::Moving(p) => Some(p),
            PlatformKind::Static => None,
        }
    }

    /// How far a rider standing on this platform is carried per tick.
    pub fn carry(&self) -> (f32, f32) {
        self.patrol().map(Patrol::delta).unwrap_or((0.0, 0.0))
    }

    /// One tick of motion. Moving platforms shove an overlapping player
    /// out along their direction of travel before checking bounds.
    /// Static platforms do nothing.
    pub fn update(&mut self, player: &mut Rect, world_shift: (f32, f32)) {
        let PlatformKind::Moving(patrol) = &mut self.kind else { return };
        patrol.step(&mut self.rect);

        if self.rect.intersects(player) {
            match (patrol.axis, patrol.speed < 0.0) {
                (Axis::Horizontal, true) => player.set_right(self.rect.left()),
                (Axis::Horizontal, false) => player.set_left(self.rect.right()),
                (Axis::Vertical, true) => player.set_bottom(self.rect.top()),
                (Axis::Vertical, false) => player.set_top(self.rect.bottom()),
            }
        }

        patrol.reflect(&self.rect, world_shift);
    }

    pub fn kind_tag(&self) -> EntityKind {
        match self.kind {
            PlatformKind::Static => EntityKind::Platform,
            PlatformKind::Moving(_) => EntityKind::MovingPlatform,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Laser
// ══════════════════════════════════════════════════════════════

/// Two-state timed hazard. Lethal only while active.
///
/// `timer` counts ticks in the current state; a state ends once the timer
/// exceeds its duration, so one full cycle takes
/// `active_duration + inactive_duration + 2` ticks.
#[derive(Clone, Debug)]
pub struct Laser {
    pub rect: Rect,
    pub active_duration: u32,
    pub inactive_duration: u32,
    pub timer: u32,
    pub active: bool,
}

impl Laser {
    /// Starts active with a fresh timer.
    pub fn new(rect: Rect, active_duration: u32, inactive_duration: u32) -> Self {
        Laser { rect, active_duration, inactive_duration, timer: 0, active: true }
    }

    pub fn tick(&mut self) {
        self.timer += 1;
        let limit = if self.active { self.active_duration } else { self.inactive_duration };
        if self.timer > limit {
            self.active = !self.active;
            self.timer = 0;
        }
    }

    pub fn is_lethal(&self) -> bool {
        self.active
    }
}

// ══════════════════════════════════════════════════════════════
// Spikes
// ══════════════════════════════════════════════════════════════

/// Static spike, or a spike riding on one face of a moving platform.
#[derive(Clone, Debug)]
pub struct Spike {
    pub rect: Rect,
    pub orientation: Orientation,
    /// Index into the owning level's platform list.
    pub anchor: Option<usize>,
}

impl Spike {
    pub fn fixed(rect: Rect, orientation: Orientation) -> Self {
        Spike { rect, orientation, anchor: None }
    }

    /// A spike that follows `platform_idx`. Its rectangle is recomputed
    /// from the platform on every level update.
    pub fn anchored(platform_idx: usize, platform: &Rect, orientation: Orientation, w: f32, h: f32) -> Self {
        let mut spike = Spike {
            rect: Rect::new(platform.x, platform.y, w, h),
            orientation,
            anchor: Some(platform_idx),
        };
        spike.attach_to(platform);
        spike
    }

    /// Sit flush against the face of `platform` named by the orientation,
    /// centred along that face.
    pub fn attach_to(&mut self, platform: &Rect) {
        match self.orientation {
            Orientation::Up => {
                self.rect.set_bottom(platform.top());
                self.rect.set_center_x(platform.center_x());
            }
            Orientation::Down => {
                self.rect.set_top(platform.bottom());
                self.rect.set_center_x(platform.center_x());
            }
            Orientation::Left => {
                self.rect.set_right(platform.left());
                self.rect.set_center_y(platform.center_y());
            }
            Orientation::Right => {
                self.rect.set_left(platform.right());
                self.rect.set_center_y(platform.center_y());
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Pickups, pads, enemies
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct Gold {
    pub rect: Rect,
}

/// Launches a falling player upward. `strength` is the vertical speed
/// applied (negative = up).
#[derive(Clone, Debug)]
pub struct Bouncepad {
    pub rect: Rect,
    pub strength: f32,
}

/// Patrolling hazard. Lethal on any contact.
#[derive(Clone, Debug)]
pub struct Enemy {
    pub rect: Rect,
    pub patrol: Patrol,
}

impl Enemy {
    pub fn new(rect: Rect, patrol: Patrol) -> Self {
        Enemy { rect, patrol }
    }

    pub fn update(&mut self, world_shift: (f32, f32)) {
        self.patrol.advance(&mut self.rect, world_shift);
    }
}
