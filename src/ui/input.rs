/// Keyboard input tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous running while a direction key is held
///   - Edge-triggered jump (only fires on the initial press)
///   - Typed letters for the initials prompt
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::session::{FrameInput, MoveDir};
use crate::ui::sound::Music;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub const LEFT_KEYS: [KeyCode; 3] = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const RIGHT_KEYS: [KeyCode; 3] = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const JUMP_KEYS: [KeyCode; 4] = [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char(' ')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent
    /// drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for text entry and Ctrl+C.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn record(&mut self, key: KeyEvent, at: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, at);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Edge trigger: freshly pressed this frame.
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    // ── Game intents ──

    /// Held direction. Left wins when both are held.
    pub fn movement(&self) -> MoveDir {
        if self.any_held(&LEFT_KEYS) {
            MoveDir::Left
        } else if self.any_held(&RIGHT_KEYS) {
            MoveDir::Right
        } else {
            MoveDir::None
        }
    }

    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            movement: self.movement(),
            jump: self.any_pressed(&JUMP_KEYS),
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.ctrl_c_pressed() || self.was_pressed(KeyCode::Esc)
    }

    pub fn confirm_pressed(&self) -> bool {
        self.was_pressed(KeyCode::Enter)
    }

    pub fn backspace_pressed(&self) -> bool {
        self.was_pressed(KeyCode::Backspace)
    }

    /// Keys 1/2/3 pick the background track.
    pub fn music_choice(&self) -> Option<Music> {
        if self.was_pressed(KeyCode::Char('1')) {
            Some(Music::Main)
        } else if self.was_pressed(KeyCode::Char('2')) {
            Some(Music::Funny)
        } else if self.was_pressed(KeyCode::Char('3')) {
            Some(Music::Off)
        } else {
            None
        }
    }

    /// ASCII letters typed this frame, uppercased, in order.
    pub fn typed_letters(&self) -> Vec<char> {
        self.raw_events.iter()
            .filter(|k| k.kind != KeyEventKind::Release)
            .filter(|k| !k.modifiers.contains(KeyModifiers::CONTROL))
            .filter_map(|k| match k.code {
                KeyCode::Char(c) if c.is_ascii_alphabetic() => Some(c.to_ascii_uppercase()),
                _ => None,
            })
            .collect()
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn press_is_edge_triggered() {
        let mut input = InputState::new();
        input.record(press(KeyCode::Char(' ')), Instant::now());
        assert!(input.frame_input().jump);

        // Repeat while held: not fresh.
        input.fresh_presses.clear();
        input.record(press(KeyCode::Char(' ')), Instant::now());
        assert!(!input.frame_input().jump);
    }

    #[test]
    fn held_direction_maps_to_movement() {
        let mut input = InputState::new();
        assert_eq!(input.movement(), MoveDir::None);
        input.record(press(KeyCode::Char('d')), Instant::now());
        assert_eq!(input.movement(), MoveDir::Right);
        input.record(press(KeyCode::Left), Instant::now());
        assert_eq!(input.movement(), MoveDir::Left);
    }

    #[test]
    fn release_is_honored_when_enabled() {
        let mut input = InputState::new();
        input.honor_release = true;
        input.record(press(KeyCode::Right), Instant::now());
        let mut up = press(KeyCode::Right);
        up.kind = KeyEventKind::Release;
        input.record(up, Instant::now());
        assert_eq!(input.movement(), MoveDir::None);
    }

    #[test]
    fn letters_are_uppercased_and_ctrl_c_is_not_a_letter() {
        let mut input = InputState::new();
        input.record(press(KeyCode::Char('a')), Instant::now());
        input.record(press(KeyCode::Char('7')), Instant::now());
        input.record(press(KeyCode::Char('Q')), Instant::now());
        input.record(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), Instant::now());
        assert_eq!(input.typed_letters(), vec!['A', 'Q']);
        assert!(input.ctrl_c_pressed());
        assert!(input.quit_requested());
    }

    #[test]
    fn number_keys_pick_music() {
        let mut input = InputState::new();
        assert_eq!(input.music_choice(), None);
        input.record(press(KeyCode::Char('2')), Instant::now());
        assert_eq!(input.music_choice(), Some(Music::Funny));
    }
}
