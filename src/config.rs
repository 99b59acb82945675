/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing or incomplete.
///
/// Loading runs before the logger exists (the log path lives in the
/// config), so a read or parse failure is handed back to the caller as a
/// message instead of being logged here.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub general: GeneralConfig,
    pub screen: ScreenConfig,
    pub physics: PhysicsConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    pub tick_rate_ms: u64,
    pub scores_file: PathBuf,
    /// `None` = embedded level set.
    pub levels_file: Option<PathBuf>,
    pub sounds_dir: PathBuf,
    pub log_file: PathBuf,
}

/// Playfield geometry in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
    /// Player left edge at or left of this scrolls the world right.
    pub shift_left: f32,
    /// Player right edge at or right of this scrolls the world left.
    pub shift_right: f32,
    /// Spawn x when a level has no platforms (player sits on the floor).
    pub fallback_spawn_x: f32,
}

/// Player locomotion tuning. Speeds are world units per tick,
/// durations are ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub wall_slide_gravity: f32,
    pub wall_slide_max_fall: f32,
    pub run_speed: f32,
    pub jump_speed: f32,          // negative = up
    pub wall_jump_h_speed: f32,
    pub wall_jump_v_speed: f32,   // negative = up
    pub wall_jump_duration: u32,  // input lockout after a wall jump
    pub respawn_flash_ticks: u32,
    pub player_width: f32,
    pub player_height: f32,
    pub initial_lives: u32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub confirm: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    screen: TomlScreen,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_scores_file")]
    scores_file: String,
    #[serde(default)]
    levels_file: Option<String>,
    #[serde(default = "default_sounds_dir")]
    sounds_dir: String,
    #[serde(default = "default_log_file")]
    log_file: String,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct TomlScreen {
    width: f32,
    height: f32,
    shift_left: f32,
    shift_right: f32,
    fallback_spawn_x: f32,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct TomlPhysics {
    gravity: f32,
    wall_slide_gravity: f32,
    wall_slide_max_fall: f32,
    run_speed: f32,
    jump_speed: f32,
    wall_jump_h_speed: f32,
    wall_jump_v_speed: f32,
    wall_jump_duration: u32,
    respawn_flash_ticks: u32,
    player_width: f32,
    player_height: f32,
    initial_lives: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump_buttons")]
    jump: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }    // ~60 ticks/s
fn default_scores_file() -> String { "scores.txt".into() }
fn default_sounds_dir() -> String { "sounds".into() }
fn default_log_file() -> String { "ledgehop.log".into() }

fn default_jump_buttons() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            tick_rate_ms: default_tick_rate(),
            scores_file: default_scores_file(),
            levels_file: None,
            sounds_dir: default_sounds_dir(),
            log_file: default_log_file(),
        }
    }
}

impl Default for TomlScreen {
    fn default() -> Self {
        let s = ScreenConfig::default();
        TomlScreen {
            width: s.width,
            height: s.height,
            shift_left: s.shift_left,
            shift_right: s.shift_right,
            fallback_spawn_x: s.fallback_spawn_x,
        }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        let p = PhysicsConfig::default();
        TomlPhysics {
            gravity: p.gravity,
            wall_slide_gravity: p.wall_slide_gravity,
            wall_slide_max_fall: p.wall_slide_max_fall,
            run_speed: p.run_speed,
            jump_speed: p.jump_speed,
            wall_jump_h_speed: p.wall_jump_h_speed,
            wall_jump_v_speed: p.wall_jump_v_speed,
            wall_jump_duration: p.wall_jump_duration,
            respawn_flash_ticks: p.respawn_flash_ticks,
            player_width: p.player_width,
            player_height: p.player_height,
            initial_lives: p.initial_lives,
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump_buttons(),
            confirm: default_confirm(),
            quit: default_quit(),
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        ScreenConfig {
            width: 800.0,
            height: 600.0,
            shift_left: 120.0,
            shift_right: 500.0,
            fallback_spawn_x: 340.0,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            gravity: 0.65,
            wall_slide_gravity: 0.2,
            wall_slide_max_fall: 2.0,
            run_speed: 6.0,
            jump_speed: -12.0,
            wall_jump_h_speed: 3.0,
            wall_jump_v_speed: -12.0,
            wall_jump_duration: 10,
            respawn_flash_ticks: 60,
            player_width: 20.0,
            player_height: 35.0,
            initial_lives: 3,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    /// The second value describes a file that was found but unusable.
    pub fn load() -> (Self, Option<String>) {
        load_toml(&candidate_dirs())
    }

    /// Parse config text; unknown or missing keys use defaults.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(Self::from_toml)
    }

    pub fn defaults() -> Self {
        Self::from_toml(TomlConfig::default())
    }

    fn from_toml(t: TomlConfig) -> Self {
        GameConfig {
            general: GeneralConfig {
                tick_rate_ms: t.general.tick_rate_ms.max(1),
                scores_file: PathBuf::from(t.general.scores_file),
                levels_file: t.general.levels_file.map(PathBuf::from),
                sounds_dir: PathBuf::from(t.general.sounds_dir),
                log_file: PathBuf::from(t.general.log_file),
            },
            screen: ScreenConfig {
                width: t.screen.width,
                height: t.screen.height,
                shift_left: t.screen.shift_left,
                shift_right: t.screen.shift_right,
                fallback_spawn_x: t.screen.fallback_spawn_x,
            },
            physics: PhysicsConfig {
                gravity: t.physics.gravity,
                wall_slide_gravity: t.physics.wall_slide_gravity,
                wall_slide_max_fall: t.physics.wall_slide_max_fall,
                run_speed: t.physics.run_speed,
                jump_speed: t.physics.jump_speed,
                wall_jump_h_speed: t.physics.wall_jump_h_speed,
                wall_jump_v_speed: t.physics.wall_jump_v_speed,
                wall_jump_duration: t.physics.wall_jump_duration,
                respawn_flash_ticks: t.physics.respawn_flash_ticks,
                player_width: t.physics.player_width.max(1.0),
                player_height: t.physics.player_height.max(1.0),
                initial_lives: t.physics.initial_lives.max(1),
            },
            gamepad: GamepadConfig {
                jump: t.gamepad.jump,
                confirm: t.gamepad.confirm,
                quit: t.gamepad.quit,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories. The first readable
/// file wins; a parse error there means defaults plus a warning.
fn load_toml(search_dirs: &[PathBuf]) -> (GameConfig, Option<String>) {
    let mut warning = None;
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    return match GameConfig::parse(&text) {
                        Ok(cfg) => (cfg, warning),
                        Err(e) => (
                            GameConfig::defaults(),
                            Some(format!("{} parse error: {e}; using default settings", path.display())),
                        ),
                    };
                }
                Err(e) => {
                    warning = Some(format!("could not read {}: {e}", path.display()));
                }
            }
        }
    }
    (GameConfig::defaults(), warning)
}
