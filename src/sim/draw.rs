/// Drawing seam between the simulation and whatever presents it.
///
/// The simulation describes a frame as filled rectangles and text labels
/// in world coordinates; the terminal renderer maps those to cells.

use crate::domain::entity::{EntityKind, Orientation};
use crate::domain::geom::Rect;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub mod palette {
    use super::Rgb;

    pub const ROOM: Rgb = Rgb(100, 125, 150);
    pub const PLATFORM: Rgb = Rgb(0, 225, 0);
    pub const MOVING_PLATFORM: Rgb = Rgb(0, 170, 60);
    pub const LASER_ON: Rgb = Rgb(255, 0, 0);
    pub const LASER_OFF: Rgb = Rgb(25, 0, 0);
    pub const SPIKE: Rgb = Rgb(100, 100, 100);
    pub const GOLD: Rgb = Rgb(255, 215, 0);
    pub const BOUNCEPAD: Rgb = Rgb(255, 0, 225);
    pub const ENEMY: Rgb = Rgb(0, 0, 255);
    pub const LABEL: Rgb = Rgb(240, 240, 240);
    pub const PLAYER: Rgb = Rgb(255, 140, 40);
    pub const PLAYER_DIM: Rgb = Rgb(150, 110, 90);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const YELLOW: Rgb = Rgb(255, 255, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
}

/// A surface that accepts world-space primitives.
pub trait Canvas {
    fn clear(&mut self, color: Rgb);
    fn fill_rect(&mut self, rect: Rect, color: Rgb);
    /// `(x, y)` is the top-left of the text in world units.
    fn draw_text(&mut self, x: f32, y: f32, text: &str, color: Rgb);
}

pub fn color_of(kind: EntityKind) -> Rgb {
    match kind {
        EntityKind::Platform => palette::PLATFORM,
        EntityKind::MovingPlatform => palette::MOVING_PLATFORM,
        EntityKind::Laser { active: true } => palette::LASER_ON,
        EntityKind::Laser { active: false } => palette::LASER_OFF,
        EntityKind::Spike(_) => palette::SPIKE,
        EntityKind::Gold => palette::GOLD,
        EntityKind::Bouncepad => palette::BOUNCEPAD,
        EntityKind::Enemy => palette::ENEMY,
    }
}

/// Single-character hint for which way a spike points.
pub fn spike_glyph(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::Up => "^",
        Orientation::Down => "v",
        Orientation::Left => "<",
        Orientation::Right => ">",
    }
}

// ── Test canvas ──

/// Records every primitive; used by tests to inspect a frame.
#[cfg(test)]
#[derive(Default, Debug)]
pub struct RecordingCanvas {
    pub cleared: Option<Rgb>,
    pub rects: Vec<(Rect, Rgb)>,
    pub texts: Vec<(f32, f32, String, Rgb)>,
}

#[cfg(test)]
impl Canvas for RecordingCanvas {
    fn clear(&mut self, color: Rgb) {
        self.cleared = Some(color);
        self.rects.clear();
        self.texts.clear();
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.rects.push((rect, color));
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, color: Rgb) {
        self.texts.push((x, y, text.to_string(), color));
    }
}
