/// Level state: the entity collections, the accumulated world shift and
/// the completion limit.
///
/// ## Coordinates
///   Entity rectangles are stored in screen space. Scrolling moves every
///   entity by the same amount and accumulates the total in `world_shift`,
///   so `screen = level_local + world_shift` for every entity.
///
/// ## Update order (one tick)
///   platforms → enemies → lasers → anchored spikes.
///   Gold and bouncepads are inert.

use crate::domain::entity::{
    Bouncepad, Enemy, EntityKind, Gold, Laser, Orientation, Patrol, Platform, Spike,
};
use crate::domain::geom::Rect;
use crate::sim::draw::{self, palette, Canvas};

/// Static text painted into the level; scrolls with the world.
#[derive(Clone, Debug)]
pub struct Label {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug)]
pub struct Level {
    pub name: String,
    pub platforms: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    pub lasers: Vec<Laser>,
    pub spikes: Vec<Spike>,
    pub gold: Vec<Gold>,
    pub bouncepads: Vec<Bouncepad>,
    pub labels: Vec<Label>,
    /// Accumulated scroll `(dx, dy)` since the level was built or reset.
    pub world_shift: (f32, f32),
    /// Level-local x the player must pass (going right) to finish.
    pub limit: f32,
    /// Gold placed at construction; never decreases.
    pub initial_gold: usize,
}

impl Level {
    pub fn new(name: impl Into<String>, limit: f32) -> Self {
        Level {
            name: name.into(),
            platforms: Vec::new(),
            enemies: Vec::new(),
            lasers: Vec::new(),
            spikes: Vec::new(),
            gold: Vec::new(),
            bouncepads: Vec::new(),
            labels: Vec::new(),
            world_shift: (0.0, 0.0),
            limit,
            initial_gold: 0,
        }
    }

    // ── Construction ──

    /// Returns the platform's index (for anchoring spikes).
    pub fn add_platform(&mut self, rect: Rect) -> usize {
        self.platforms.push(Platform::fixed(rect));
        self.platforms.len() - 1
    }

    pub fn add_moving_platform(&mut self, rect: Rect, patrol: Patrol) -> usize {
        self.platforms.push(Platform::moving(rect, patrol));
        self.platforms.len() - 1
    }

    pub fn add_spike(&mut self, rect: Rect, orientation: Orientation) {
        self.spikes.push(Spike::fixed(rect, orientation));
    }

    /// Attach a spike to the face of platform `platform_idx`.
    /// `w = None` spans the platform's width. Returns false if the index
    /// does not name a platform.
    pub fn add_anchored_spike(
        &mut self,
        platform_idx: usize,
        orientation: Orientation,
        w: Option<f32>,
        h: f32,
    ) -> bool {
        let Some(plat) = self.platforms.get(platform_idx) else { return false };
        let w = w.unwrap_or(plat.rect.w);
        let spike = Spike::anchored(platform_idx, &plat.rect, orientation, w, h);
        self.spikes.push(spike);
        true
    }

    pub fn add_gold(&mut self, rect: Rect) {
        self.gold.push(Gold { rect });
        self.initial_gold += 1;
    }

    pub fn add_bouncepad(&mut self, rect: Rect, strength: f32) {
        self.bouncepads.push(Bouncepad { rect, strength });
    }

    pub fn add_laser(&mut self, rect: Rect, active: u32, inactive: u32) {
        self.lasers.push(Laser::new(rect, active, inactive));
    }

    pub fn add_enemy(&mut self, rect: Rect, patrol: Patrol) {
        self.enemies.push(Enemy::new(rect, patrol));
    }

    pub fn add_label(&mut self, text: impl Into<String>, x: f32, y: f32) {
        self.labels.push(Label { text: text.into(), x, y });
    }

    // ── Tick ──

    /// Advance every entity one tick. Moving platforms may push
    /// `player` out of their way.
    pub fn update(&mut self, player: &mut Rect) {
        let shift = self.world_shift;
        for plat in &mut self.platforms {
            plat.update(player, shift);
        }
        for enemy in &mut self.enemies {
            enemy.update(shift);
        }
        for laser in &mut self.lasers {
            laser.tick();
        }
        for spike in &mut self.spikes {
            if let Some(plat) = spike.anchor.and_then(|i| self.platforms.get(i)) {
                spike.attach_to(&plat.rect);
            }
        }
    }

    // ── Scrolling ──

    /// Move every entity by `(dx, dy)` and accumulate the shift.
    pub fn shift_world(&mut self, dx: f32, dy: f32) {
        self.world_shift.0 += dx;
        self.world_shift.1 += dy;

        for r in self.rects_mut() {
            r.shift(dx, dy);
        }
        for l in &mut self.labels {
            l.x += dx;
            l.y += dy;
        }
    }

    /// Undo all scrolling so entities are back at level-local positions.
    pub fn reset_shift(&mut self) {
        let (dx, dy) = self.world_shift;
        if dx != 0.0 || dy != 0.0 {
            self.shift_world(-dx, -dy);
        }
        self.world_shift = (0.0, 0.0);
    }

    fn rects_mut(&mut self) -> impl Iterator<Item = &mut Rect> {
        self.platforms.iter_mut().map(|p| &mut p.rect)
            .chain(self.enemies.iter_mut().map(|e| &mut e.rect))
            .chain(self.lasers.iter_mut().map(|l| &mut l.rect))
            .chain(self.spikes.iter_mut().map(|s| &mut s.rect))
            .chain(self.gold.iter_mut().map(|g| &mut g.rect))
            .chain(self.bouncepads.iter_mut().map(|b| &mut b.rect))
    }

    // ── Queries ──

    /// Respawn anchor: the first platform registered.
    pub fn first_platform(&self) -> Option<&Platform> {
        self.platforms.first()
    }

    pub fn gold_remaining(&self) -> usize {
        self.gold.len()
    }

    /// Player's world-corrected x: screen x plus the world shift. Grows
    /// more negative the further right the player has travelled.
    pub fn progress(&self, player: &Rect) -> f32 {
        player.x + self.world_shift.0
    }

    pub fn is_complete(&self, player: &Rect) -> bool {
        self.progress(player) < self.limit
    }

    /// Every entity as `(kind, rect)`, in draw order.
    pub fn pieces(&self) -> impl Iterator<Item = (EntityKind, Rect)> + '_ {
        self.platforms.iter().map(|p| (p.kind_tag(), p.rect))
            .chain(self.enemies.iter().map(|e| (EntityKind::Enemy, e.rect)))
            .chain(self.lasers.iter().map(|l| (EntityKind::Laser { active: l.active }, l.rect)))
            .chain(self.spikes.iter().map(|s| (EntityKind::Spike(s.orientation), s.rect)))
            .chain(self.gold.iter().map(|g| (EntityKind::Gold, g.rect)))
            .chain(self.bouncepads.iter().map(|b| (EntityKind::Bouncepad, b.rect)))
    }

    // ── Drawing ──

    /// Room background, entities, then labels. The player is drawn by
    /// the caller on top.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.clear(palette::ROOM);
        for (kind, rect) in self.pieces() {
            canvas.fill_rect(rect, draw::color_of(kind));
            if let EntityKind::Spike(o) = kind {
                canvas.draw_text(rect.center_x(), rect.center_y(), draw::spike_glyph(o), palette::BLACK);
            }
        }
        for l in &self.labels {
            canvas.draw_text(l.x, l.y, &l.text, palette::LABEL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Axis;
    use crate::sim::draw::RecordingCanvas;

    fn sample() -> Level {
        let mut lv = Level::new("Sample", -500.0);
        lv.add_platform(Rect::new(50.0, 570.0, 250.0, 30.0));
        let mp = lv.add_moving_platform(
            Rect::new(300.0, 250.0, 100.0, 20.0),
            Patrol::new(Axis::Horizontal, 3.0, 300.0, 450.0),
        );
        assert!(lv.add_anchored_spike(mp, Orientation::Down, None, 20.0));
        lv.add_spike(Rect::new(200.0, 540.0, 50.0, 30.0), Orientation::Up);
        lv.add_gold(Rect::new(240.0, 250.0, 20.0, 20.0));
        lv.add_gold(Rect::new(460.0, 400.0, 20.0, 20.0));
        lv.add_bouncepad(Rect::new(200.0, 500.0, 100.0, 20.0), -18.0);
        lv.add_laser(Rect::new(500.0, 420.0, 230.0, 20.0), 40, 40);
        lv.add_enemy(
            Rect::new(340.0, 300.0, 30.0, 30.0),
            Patrol::new(Axis::Vertical, 3.0, 300.0, 545.0),
        );
        lv.add_label("Go right", 1000.0, 300.0);
        lv
    }

    #[test]
    fn gold_counts_are_tracked() {
        let mut lv = sample();
        assert_eq!(lv.initial_gold, 2);
        lv.gold.remove(0);
        assert_eq!(lv.gold_remaining(), 1);
        assert_eq!(lv.initial_gold, 2);
    }

    #[test]
    fn anchored_spike_needs_a_real_platform() {
        let mut lv = Level::new("x", -500.0);
        assert!(!lv.add_anchored_spike(3, Orientation::Up, None, 20.0));
        assert!(lv.spikes.is_empty());
    }

    #[test]
    fn anchored_spike_defaults_to_platform_width() {
        let lv = sample();
        let spike = &lv.spikes[0];
        assert_eq!(spike.rect.w, 100.0);
        assert_eq!(spike.rect.top(), lv.platforms[1].rect.bottom());
    }

    #[test]
    fn shift_moves_everything_and_accumulates() {
        let mut lv = sample();
        let before: Vec<Rect> = lv.pieces().map(|(_, r)| r).collect();
        lv.shift_world(-30.0, 0.0);
        lv.shift_world(-20.0, 5.0);
        assert_eq!(lv.world_shift, (-50.0, 5.0));
        for (b, (_, a)) in before.iter().zip(lv.pieces()) {
            assert_eq!(a.x, b.x - 50.0);
            assert_eq!(a.y, b.y + 5.0);
        }
        assert_eq!(lv.labels[0].x, 950.0);
    }

    #[test]
    fn reset_shift_restores_local_positions() {
        let mut lv = sample();
        let before: Vec<Rect> = lv.pieces().map(|(_, r)| r).collect();
        lv.shift_world(-137.0, 0.0);
        lv.shift_world(12.0, 0.0);
        lv.reset_shift();
        assert_eq!(lv.world_shift, (0.0, 0.0));
        let after: Vec<Rect> = lv.pieces().map(|(_, r)| r).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn update_keeps_anchored_spike_on_its_platform() {
        let mut lv = sample();
        let mut player = Rect::new(0.0, 0.0, 20.0, 35.0);
        for _ in 0..120 {
            lv.update(&mut player);
            let plat = lv.platforms[1].rect;
            let spike = lv.spikes[0].rect;
            assert_eq!(spike.top(), plat.bottom());
            assert_eq!(spike.center_x(), plat.center_x());
        }
    }

    #[test]
    fn moving_platform_stays_in_range_while_scrolled() {
        let mut lv = sample();
        let mut player = Rect::new(-1000.0, 0.0, 20.0, 35.0);
        lv.shift_world(-250.0, 0.0);
        for _ in 0..400 {
            lv.update(&mut player);
            let local = lv.platforms[1].rect.x - lv.world_shift.0;
            assert!((297.0..=453.0).contains(&local), "local x {local}");
        }
    }

    #[test]
    fn completion_uses_world_corrected_position() {
        let mut lv = sample();
        let mut player = Rect::new(120.0, 100.0, 20.0, 35.0);
        assert!(!lv.is_complete(&player));
        lv.shift_world(-700.0, 0.0);
        // world-corrected 120 + (-700) = -580 < -500
        player.x = 120.0;
        assert_eq!(lv.progress(&player), -580.0);
        assert!(lv.is_complete(&player));
    }

    #[test]
    fn draw_paints_room_entities_and_labels() {
        let lv = sample();
        let mut canvas = RecordingCanvas::default();
        lv.draw(&mut canvas);
        assert_eq!(canvas.cleared, Some(palette::ROOM));
        assert_eq!(canvas.rects.len(), lv.pieces().count());
        assert!(canvas.rects.iter().any(|(_, c)| *c == palette::GOLD));
        assert!(canvas.rects.iter().any(|(_, c)| *c == palette::LASER_ON));
        assert!(canvas.texts.iter().any(|(_, _, t, _)| t == "Go right"));
        assert!(canvas.texts.iter().any(|(_, _, t, _)| t == "v"));
    }
}
