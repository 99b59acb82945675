/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use env_logger::{Env, Target};

use config::GameConfig;
use sim::event::GameEvent;
use sim::highscore::{HighScoreEntry, Leaderboard, MAX_INITIALS};
use sim::pack;
use sim::session::{FrameInput, MoveDir, Phase, Session};
use sim::step;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::{Renderer, Summary, View};
use ui::sound::{Cue, Music, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Where the frame loop is after (or during) a run.
enum Stage {
    Playing,
    GameOver(Summary),
    NameEntry { summary: Summary, initials: String },
    HighScores { highlight: u32 },
}

fn main() {
    let (config, config_warning) = GameConfig::load();
    init_logging(&config);
    if let Some(msg) = config_warning {
        log::warn!("{msg}");
    }

    let tick_rate = Duration::from_millis(config.general.tick_rate_ms);
    let started = pack::load(config.general.levels_file.as_deref())
        .and_then(|levels| Session::new(levels, config.physics, config.screen, tick_rate));
    let mut session = match started {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Cannot start: {e}");
            return;
        }
    };
    let mut board = Leaderboard::load(&config.general.scores_file);

    let mut renderer = Renderer::new(config.screen);
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new(&config.general.sounds_dir);
    if let Some(sfx) = &sound {
        sfx.play_music(Music::Main);
    }

    let result = game_loop(&mut session, &mut board, &mut renderer, sound.as_ref(), &config);

    if let Some(sfx) = &sound {
        sfx.stop_music();
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Ledgehop!");
    println!("Final Score: {}", session.final_score());
}

/// Route `log` output into the configured file; the terminal belongs to
/// the renderer. Without a log file the game runs silently.
fn init_logging(config: &GameConfig) {
    let file = match File::create(&config.general.log_file) {
        Ok(f) => f,
        Err(_) => return,
    };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init();
    log::info!("ledgehop starting, tick {}ms", config.general.tick_rate_ms);
}

fn game_loop(
    session: &mut Session,
    board: &mut Leaderboard,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = session.tick_len();
    let high_score = board.top_score().unwrap_or(0);

    let mut stage = Stage::Playing;
    // Jump presses seen between ticks.
    let mut pending_jump = false;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if let (Some(choice), Some(sfx)) = (kb.music_choice(), sound) {
            sfx.play_music(choice);
        }

        let escape = kb.quit_requested() || gp.quit_pressed();
        let confirm = kb.confirm_pressed() || gp.confirm_pressed();

        stage = match stage {
            Stage::Playing => {
                if escape {
                    break;
                }
                pending_jump |= kb.frame_input().jump || gp.jump_pressed();

                if last_tick.elapsed() >= tick_rate {
                    let input = FrameInput {
                        movement: detect_movement(&kb, &gp),
                        jump: std::mem::take(&mut pending_jump),
                    };
                    let events = step::step(session, input);
                    process_sound_events(sound, &events);
                    last_tick = Instant::now();
                }

                if session.phase == Phase::Playing {
                    Stage::Playing
                } else {
                    let summary = Summary {
                        finished: session.all_levels_completed(),
                        final_score: session.final_score(),
                        levels_completed: session.levels_completed(),
                        previous_high: high_score,
                    };
                    log::info!(
                        "run ended, score {} (makes the table: {})",
                        summary.final_score,
                        board.qualifies(summary.final_score)
                    );
                    Stage::GameOver(summary)
                }
            }
            Stage::GameOver(summary) => {
                if confirm {
                    Stage::NameEntry { summary, initials: String::new() }
                } else if escape {
                    Stage::HighScores { highlight: summary.final_score }
                } else {
                    Stage::GameOver(summary)
                }
            }
            Stage::NameEntry { summary, mut initials } => {
                if escape {
                    Stage::HighScores { highlight: summary.final_score }
                } else if confirm && !initials.is_empty() {
                    save_score(board, &initials, summary.final_score);
                    Stage::HighScores { highlight: summary.final_score }
                } else {
                    if kb.backspace_pressed() {
                        initials.pop();
                    }
                    for c in kb.typed_letters() {
                        if initials.len() < MAX_INITIALS {
                            initials.push(c);
                        }
                    }
                    Stage::NameEntry { summary, initials }
                }
            }
            Stage::HighScores { highlight } => {
                if escape || confirm {
                    break;
                }
                Stage::HighScores { highlight }
            }
        };

        let view = match &stage {
            Stage::Playing => View::Play { session, high_score },
            Stage::GameOver(summary) => View::GameOver(summary),
            Stage::NameEntry { initials, .. } => View::NameEntry { initials },
            Stage::HighScores { highlight } => View::HighScores { board, highlight: *highlight },
        };
        renderer.render(view)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn save_score(board: &mut Leaderboard, initials: &str, score: u32) {
    let entry = match HighScoreEntry::new(initials, score) {
        Ok(e) => e,
        Err(e) => {
            log::warn!("score not saved: {e}");
            return;
        }
    };
    match board.insert(entry) {
        Some(rank) => log::info!("{initials} placed #{rank} with {score}"),
        None => log::info!("{initials} with {score} did not make the table"),
    }
    if let Err(e) = board.save() {
        log::warn!("could not save high scores to {}: {e}", board.path().display());
    }
}

fn cue_for(event: &GameEvent) -> Cue {
    match event {
        GameEvent::GoldCollected { .. } => Cue::GoldCollect,
        GameEvent::Bounced => Cue::Bouncepad,
        GameEvent::LifeLost { .. } => Cue::LoseLife,
        GameEvent::LevelCompleted { .. } => Cue::LevelCompleted,
        GameEvent::GameWon => Cue::GameWon,
        GameEvent::GameLost => Cue::GameLost,
    }
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let Some(sfx) = sound else { return };
    for event in events {
        sfx.play(cue_for(event));
    }
}

/// Keyboard wins over the pad when both give a direction.
fn detect_movement(kb: &InputState, gp: &GamepadState) -> MoveDir {
    match kb.movement() {
        MoveDir::None => gp.movement(),
        dir => dir,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_event_has_a_cue() {
        assert_eq!(cue_for(&GameEvent::GoldCollected { level: 2 }), Cue::GoldCollect);
        assert_eq!(cue_for(&GameEvent::Bounced), Cue::Bouncepad);
        assert_eq!(cue_for(&GameEvent::LifeLost { lives_left: 1 }), Cue::LoseLife);
        assert_eq!(cue_for(&GameEvent::LevelCompleted { level: 0 }), Cue::LevelCompleted);
        assert_eq!(cue_for(&GameEvent::GameWon), Cue::GameWon);
        assert_eq!(cue_for(&GameEvent::GameLost), Cue::GameLost);
    }

    #[test]
    fn saving_a_score_writes_the_board() {
        let path = std::env::temp_dir().join("ledgehop_main_scores.txt");
        let _ = std::fs::remove_file(&path);
        let mut board = Leaderboard::load(&path);
        save_score(&mut board, "ABC", 4200);
        save_score(&mut board, "abc", 1); // rejected
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "ABC 4200\n");
        let _ = std::fs::remove_file(&path);
    }
}
