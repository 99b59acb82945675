/// Level pack loader.
///
/// ## Sources (priority order):
///   1. `general.levels_file` from config.toml, if set and valid
///   2. Built-in embedded pack (`assets/levels.toml`)
///
/// ## Pack format (TOML):
///   ```toml
///   [[level]]
///   name = "Level 1"
///   limit = -500
///   platforms = [ { x = 50, y = 570, w = 250, h = 30 } ]
///   moving_platforms = [ { x = 300, y = 250, w = 100, h = 20,
///                          bounds = [300, 450], speed = 3, axis = "horizontal" } ]
///   moving_spikes = [ { platform = 0, orientation = "down" } ]
///   ```
///
/// Static platforms are registered before moving ones, so a moving spike's
/// `platform` index counts moving platforms only (0 = first moving one).
/// The first static platform is the respawn anchor.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::entity::{Axis, Orientation, Patrol};
use crate::domain::geom::Rect;
use crate::sim::level::Level;

/// A game is at most this many levels long.
pub const MAX_LEVELS: usize = 3;

const EMBEDDED_PACK: &str = include_str!("../../assets/levels.toml");

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("could not read level file: {0}")]
    Io(#[from] std::io::Error),
    #[error("level file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("level pack is empty")]
    Empty,
    #[error("level pack has {0} levels; at most {max} are supported", max = MAX_LEVELS)]
    TooManyLevels(usize),
    #[error("level {level}: moving spike refers to moving platform {index}, which does not exist")]
    BadAnchor { level: String, index: usize },
    #[error("level {level}: {what} has a non-positive size")]
    BadRect { level: String, what: &'static str },
}

// ══════════════════════════════════════════════════════════════
// File schema
// ══════════════════════════════════════════════════════════════

#[derive(Deserialize, Debug)]
struct PackFile {
    #[serde(rename = "level", default)]
    levels: Vec<LevelDef>,
}

#[derive(Deserialize, Debug)]
struct LevelDef {
    name: String,
    #[serde(default = "default_limit")]
    limit: i32,
    #[serde(default)]
    platforms: Vec<RectDef>,
    #[serde(default)]
    moving_platforms: Vec<MoverDef>,
    #[serde(default)]
    spikes: Vec<SpikeDef>,
    #[serde(default)]
    moving_spikes: Vec<MovingSpikeDef>,
    #[serde(default)]
    gold: Vec<GoldDef>,
    #[serde(default)]
    bouncepads: Vec<PadDef>,
    #[serde(default)]
    lasers: Vec<LaserDef>,
    #[serde(default)]
    enemies: Vec<MoverDef>,
    #[serde(default)]
    labels: Vec<LabelDef>,
}

#[derive(Deserialize, Debug)]
struct RectDef { x: i32, y: i32, w: i32, h: i32 }

#[derive(Deserialize, Debug)]
struct GoldDef {
    x: i32,
    y: i32,
    #[serde(default = "default_gold_size")]
    size: i32,
}

#[derive(Deserialize, Debug)]
struct MoverDef {
    x: i32, y: i32, w: i32, h: i32,
    bounds: [i32; 2],
    speed: i32,
    axis: Axis,
}

#[derive(Deserialize, Debug)]
struct SpikeDef {
    x: i32, y: i32, w: i32, h: i32,
    #[serde(default)]
    orientation: Orientation,
}

#[derive(Deserialize, Debug)]
struct MovingSpikeDef {
    platform: usize,
    #[serde(default)]
    orientation: Orientation,
    /// Defaults to the platform's width.
    #[serde(default)]
    w: Option<i32>,
    #[serde(default = "default_spike_height")]
    h: i32,
}

#[derive(Deserialize, Debug)]
struct PadDef {
    x: i32, y: i32, w: i32, h: i32,
    strength: i32,
}

#[derive(Deserialize, Debug)]
struct LaserDef {
    x: i32, y: i32, w: i32, h: i32,
    active: u32,
    inactive: u32,
}

#[derive(Deserialize, Debug)]
struct LabelDef { text: String, x: i32, y: i32 }

fn default_limit() -> i32 { -500 }
fn default_gold_size() -> i32 { 20 }
fn default_spike_height() -> i32 { 20 }

fn rect(x: i32, y: i32, w: i32, h: i32) -> Rect {
    Rect::new(x as f32, y as f32, w as f32, h as f32)
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load the configured pack, falling back to the embedded one on any
/// error. Only a broken embedded pack is reported to the caller.
pub fn load(levels_file: Option<&Path>) -> Result<Vec<Level>, LevelError> {
    if let Some(path) = levels_file {
        match load_file(path) {
            Ok(levels) => {
                log::info!("loaded {} level(s) from {}", levels.len(), path.display());
                return Ok(levels);
            }
            Err(e) => log::warn!("{}: {e}; using built-in levels", path.display()),
        }
    }
    embedded()
}

pub fn embedded() -> Result<Vec<Level>, LevelError> {
    parse(EMBEDDED_PACK)
}

pub fn load_file(path: &Path) -> Result<Vec<Level>, LevelError> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

pub fn parse(text: &str) -> Result<Vec<Level>, LevelError> {
    let pack: PackFile = toml::from_str(text)?;
    if pack.levels.is_empty() {
        return Err(LevelError::Empty);
    }
    if pack.levels.len() > MAX_LEVELS {
        return Err(LevelError::TooManyLevels(pack.levels.len()));
    }
    pack.levels.into_iter().map(build).collect()
}

// ══════════════════════════════════════════════════════════════
// Building
// ══════════════════════════════════════════════════════════════

fn build(def: LevelDef) -> Result<Level, LevelError> {
    let mut level = Level::new(def.name, def.limit as f32);

    let check = |r: Rect, what: &'static str, level: &Level| {
        if r.is_valid() {
            Ok(r)
        } else {
            Err(LevelError::BadRect { level: level.name.clone(), what })
        }
    };

    for p in &def.platforms {
        let r = check(rect(p.x, p.y, p.w, p.h), "platform", &level)?;
        level.add_platform(r);
    }

    let mut movers = Vec::with_capacity(def.moving_platforms.len());
    for m in &def.moving_platforms {
        let r = check(rect(m.x, m.y, m.w, m.h), "moving platform", &level)?;
        let patrol = Patrol::new(m.axis, m.speed as f32, m.bounds[0] as f32, m.bounds[1] as f32);
        movers.push(level.add_moving_platform(r, patrol));
    }

    for s in &def.spikes {
        let r = check(rect(s.x, s.y, s.w, s.h), "spike", &level)?;
        level.add_spike(r, s.orientation);
    }

    for s in &def.moving_spikes {
        let Some(&plat_idx) = movers.get(s.platform) else {
            return Err(LevelError::BadAnchor { level: level.name.clone(), index: s.platform });
        };
        if s.h <= 0 || s.w.is_some_and(|w| w <= 0) {
            return Err(LevelError::BadRect { level: level.name.clone(), what: "moving spike" });
        }
        level.add_anchored_spike(plat_idx, s.orientation, s.w.map(|w| w as f32), s.h as f32);
    }

    for g in &def.gold {
        let r = check(rect(g.x, g.y, g.size, g.size), "gold", &level)?;
        level.add_gold(r);
    }

    for b in &def.bouncepads {
        let r = check(rect(b.x, b.y, b.w, b.h), "bouncepad", &level)?;
        level.add_bouncepad(r, b.strength as f32);
    }

    for l in &def.lasers {
        let r = check(rect(l.x, l.y, l.w, l.h), "laser", &level)?;
        level.add_laser(r, l.active, l.inactive);
    }

    for e in &def.enemies {
        let r = check(rect(e.x, e.y, e.w, e.h), "enemy", &level)?;
        let patrol = Patrol::new(e.axis, e.speed as f32, e.bounds[0] as f32, e.bounds[1] as f32);
        level.add_enemy(r, patrol);
    }

    for t in def.labels {
        level.add_label(t.text, t.x as f32, t.y as f32);
    }

    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::PlatformKind;

    #[test]
    fn embedded_pack_has_three_levels_with_four_gold_each() {
        let levels = embedded().unwrap();
        assert_eq!(levels.len(), 3);
        for lv in &levels {
            assert_eq!(lv.initial_gold, 4, "{}", lv.name);
            assert_eq!(lv.limit, -500.0);
            assert_eq!(lv.world_shift, (0.0, 0.0));
            assert!(lv.first_platform().is_some());
        }
    }

    #[test]
    fn static_platforms_come_first() {
        let levels = embedded().unwrap();
        for lv in &levels {
            let first_moving = lv.platforms.iter()
                .position(|p| matches!(p.kind, PlatformKind::Moving(_)))
                .unwrap_or(lv.platforms.len());
            assert!(lv.platforms[first_moving..].iter()
                .all(|p| matches!(p.kind, PlatformKind::Moving(_))));
            assert!(matches!(lv.platforms[0].kind, PlatformKind::Static));
        }
    }

    #[test]
    fn first_level_spawn_platform() {
        let levels = embedded().unwrap();
        let first = levels[0].first_platform().unwrap();
        assert_eq!(first.rect, Rect::new(50.0, 570.0, 250.0, 30.0));
    }

    #[test]
    fn moving_spikes_attach_to_moving_platforms() {
        let levels = embedded().unwrap();
        let third = &levels[2];
        let anchored: Vec<_> = third.spikes.iter().filter(|s| s.anchor.is_some()).collect();
        assert_eq!(anchored.len(), 4);
        for s in anchored {
            let plat = &third.platforms[s.anchor.unwrap()];
            assert!(matches!(plat.kind, PlatformKind::Moving(_)));
        }
    }

    #[test]
    fn minimal_pack_uses_defaults() {
        let levels = parse(
            r#"
            [[level]]
            name = "Tiny"
            platforms = [ { x = 0, y = 500, w = 100, h = 20 } ]
            gold = [ { x = 10, y = 10 } ]
            "#,
        )
        .unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].limit, -500.0);
        assert_eq!(levels[0].gold[0].rect, Rect::new(10.0, 10.0, 20.0, 20.0));
    }

    #[test]
    fn rejects_more_than_three_levels() {
        let text = "[[level]]\nname = \"a\"\n".repeat(4);
        assert!(matches!(parse(&text), Err(LevelError::TooManyLevels(4))));
    }

    #[test]
    fn rejects_empty_pack() {
        assert!(matches!(parse(""), Err(LevelError::Empty)));
    }

    #[test]
    fn rejects_dangling_spike_anchor() {
        let text = r#"
            [[level]]
            name = "Broken"
            platforms = [ { x = 0, y = 500, w = 100, h = 20 } ]
            moving_spikes = [ { platform = 0 } ]
        "#;
        assert!(matches!(parse(text), Err(LevelError::BadAnchor { index: 0, .. })));
    }

    #[test]
    fn rejects_zero_sized_rect() {
        let text = r#"
            [[level]]
            name = "Flat"
            platforms = [ { x = 0, y = 500, w = 0, h = 20 } ]
        "#;
        assert!(matches!(parse(text), Err(LevelError::BadRect { what: "platform", .. })));
    }

    #[test]
    fn missing_file_falls_back_to_embedded() {
        let path = std::env::temp_dir().join("ledgehop_no_such_levels_file.toml");
        let _ = std::fs::remove_file(&path);
        let levels = load(Some(&path)).unwrap();
        assert_eq!(levels.len(), 3);
    }

    #[test]
    fn garbage_file_falls_back_to_embedded() {
        let path = std::env::temp_dir().join(format!("ledgehop_bad_levels_{}.toml", std::process::id()));
        std::fs::write(&path, "[[level]\nname = ").unwrap();
        let levels = load(Some(&path)).unwrap();
        assert_eq!(levels.len(), 3);
        let _ = std::fs::remove_file(&path);
    }
}
