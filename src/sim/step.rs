/// The step function: advances the session by one tick.
///
/// Processing order:
///   1. Clock
///   2. Input intents (respecting lockout / respawn)
///   3. Player update (movement, collisions, hazards, pickups)
///   4. Level update (platforms push, enemies patrol, lasers cycle)
///   5. Gold sweep
///   6. Scroll dead zone
///   7. Level completion / advance
///   8. Game over check
///
/// Moving platforms therefore settle after the player's collision pass
/// and are read by the next tick's pass.

use super::event::GameEvent;
use super::session::{FrameInput, Phase, Session};

pub fn step(session: &mut Session, input: FrameInput) -> Vec<GameEvent> {
    if session.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    session.tick += 1;
    session.clock += session.tick_len();

    session.apply_input(input);
    session.advance_entities(&mut events);
    session.sweep_gold(&mut events);
    session.scroll();
    session.check_completion(&mut events);
    session.check_game_over(&mut events);

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::{PhysicsConfig, ScreenConfig};
    use crate::domain::entity::{Axis, Orientation, Patrol};
    use crate::domain::geom::Rect;
    use crate::sim::level::Level;
    use crate::sim::pack;
    use crate::sim::session::MoveDir;

    fn session_with(levels: Vec<Level>) -> Session {
        Session::new(levels, PhysicsConfig::default(), ScreenConfig::default(), Duration::from_millis(16))
            .unwrap()
    }

    fn run(s: &mut Session, input: FrameInput, ticks: usize) -> Vec<GameEvent> {
        let mut all = Vec::new();
        for _ in 0..ticks {
            all.extend(step(s, input));
        }
        all
    }

    const RIGHT: FrameInput = FrameInput { movement: MoveDir::Right, jump: false };
    const IDLE: FrameInput = FrameInput { movement: MoveDir::None, jump: false };

    #[test]
    fn clock_advances_by_fixed_step() {
        let mut s = session_with(pack::embedded().unwrap());
        run(&mut s, IDLE, 10);
        assert_eq!(s.tick, 10);
        assert_eq!(s.clock, Duration::from_millis(160));
    }

    #[test]
    fn idle_player_stays_on_spawn_platform() {
        let mut s = session_with(pack::embedded().unwrap());
        // Spawn is left of the dead zone: the first tick scrolls it in.
        run(&mut s, IDLE, 1);
        assert_eq!(s.player.rect.left(), 120.0);
        assert_eq!(s.levels[0].world_shift, (70.0, 0.0));
        let start = s.player.rect;
        let events = run(&mut s, IDLE, 120);
        assert!(events.is_empty(), "{events:?}");
        assert_eq!(s.player.rect, start);
        assert!(s.player.can_jump);
    }

    #[test]
    fn running_right_scrolls_and_finishes_level() {
        // One long floor; the limit is reached by scrolling alone.
        let mut lv = Level::new("run", -500.0);
        lv.add_platform(Rect::new(150.0, 570.0, 5000.0, 30.0));
        let mut s = session_with(vec![lv]);
        let events = run(&mut s, RIGHT, 400);
        assert_eq!(s.phase, Phase::GameComplete);
        assert!(events.contains(&GameEvent::GameWon));
        assert!(s.levels[0].world_shift.0 < -500.0);
        assert_eq!(s.player.rect.right(), 500.0);
    }

    #[test]
    fn no_steps_after_game_ends() {
        let mut lv = Level::new("run", -500.0);
        lv.add_platform(Rect::new(150.0, 570.0, 5000.0, 30.0));
        let mut s = session_with(vec![lv]);
        run(&mut s, RIGHT, 400);
        let tick = s.tick;
        assert!(step(&mut s, RIGHT).is_empty());
        assert_eq!(s.tick, tick);
    }

    #[test]
    fn three_deaths_end_the_game() {
        let mut lv = Level::new("deadly", -500.0);
        lv.add_platform(Rect::new(150.0, 570.0, 100.0, 30.0));
        // Spike sitting on the spawn spot.
        lv.add_spike(Rect::new(140.0, 520.0, 60.0, 60.0), Orientation::Up);
        let mut s = session_with(vec![lv]);
        let events = run(&mut s, IDLE, 5);
        let losses = events.iter().filter(|e| matches!(e, GameEvent::LifeLost { .. })).count();
        assert_eq!(losses, 3);
        assert_eq!(s.player.lives, 0);
        assert_eq!(s.phase, Phase::GameOver);
        assert_eq!(events.last(), Some(&GameEvent::GameLost));
    }

    #[test]
    fn gold_pushed_onto_player_is_swept() {
        let mut lv = Level::new("push", -500.0);
        lv.add_platform(Rect::new(150.0, 570.0, 300.0, 30.0));
        // Platform sweeping left into the player, gold just past it.
        lv.add_moving_platform(
            Rect::new(180.0, 500.0, 40.0, 70.0),
            Patrol::new(Axis::Horizontal, -10.0, -1000.0, 1000.0),
        );
        lv.add_gold(Rect::new(155.0, 545.0, 10.0, 10.0));
        let mut s = session_with(vec![lv]);
        s.player.rect.set_left(171.0);
        let events = step(&mut s, IDLE);
        // Platform moved to 170..210, shoving the player to right = 170.
        assert_eq!(s.player.rect.right(), 170.0);
        assert_eq!(s.player.gold_total, 1);
        assert!(events.contains(&GameEvent::GoldCollected { level: 0 }));
        assert_eq!(s.levels[0].gold_remaining(), 0);
    }

    #[test]
    fn level_timer_uses_simulated_time() {
        let mut a = Level::new("a", -500.0);
        a.add_platform(Rect::new(150.0, 570.0, 5000.0, 30.0));
        let mut b = Level::new("b", -500.0);
        b.add_platform(Rect::new(150.0, 570.0, 300.0, 30.0));
        let mut s = session_with(vec![a, b]);
        let events = run(&mut s, RIGHT, 400);
        assert!(events.contains(&GameEvent::LevelCompleted { level: 0 }));
        assert_eq!(s.current, 1);
        let r = s.level_results();
        let elapsed = r[0].elapsed.unwrap();
        assert!(elapsed > Duration::ZERO && elapsed < Duration::from_secs(15));
        assert_eq!(s.level_start[1], s.level_end[0]);
    }
}
