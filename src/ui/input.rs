/// Keyboard edges and terminal focus for the menus.
///
/// A key counts once when it goes down and again only after it is released.
/// Terminals that never send Release events are handled by treating a key as
/// released once no Press/Repeat has arrived for `HOLD_TIMEOUT`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Last Press/Repeat per key still considered held.
    held: HashMap<KeyCode, Instant>,
    /// Keys that went down during the latest `drain_events`.
    pressed: Vec<KeyCode>,
    quit: bool,
    focus: Option<bool>,
    /// Trust Release events instead of the timeout. Off until the terminal
    /// is known to report them.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            held: HashMap::new(),
            pressed: Vec::new(),
            quit: false,
            focus: None,
            honor_release: false,
        }
    }

    /// Read everything the terminal has queued. Once per frame.
    pub fn drain_events(&mut self) {
        self.pressed.clear();
        self.quit = false;
        self.focus = None;

        while event::poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.on_key(key, Instant::now()),
                Ok(Event::FocusGained) => self.focus = Some(true),
                Ok(Event::FocusLost) => self.focus = Some(false),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "terminal event read failed");
                    break;
                }
            }
        }

        let now = Instant::now();
        self.held.retain(|_, last| now.duration_since(*last) < HOLD_TIMEOUT);
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c' | 'C')) {
            self.quit = true;
        }

        if key.kind == KeyEventKind::Release {
            if self.honor_release {
                self.held.remove(&key.code);
            }
            return;
        }

        let still_held = self
            .held
            .insert(key.code, now)
            .is_some_and(|last| now.duration_since(last) < HOLD_TIMEOUT);
        if !still_held {
            self.pressed.push(key.code);
        }
    }

    /// Whether any of `codes` went down this frame.
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        self.pressed.iter().any(|code| codes.contains(code))
    }

    /// `Some(true)` if the terminal window gained focus this frame,
    /// `Some(false)` if it lost it.
    pub fn focus_change(&self) -> Option<bool> {
        self.focus
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn repeat_within_timeout_is_not_a_new_press() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.on_key(key(KeyCode::Right, KeyEventKind::Press), t0);
        assert!(input.any_pressed(&[KeyCode::Right]));

        input.pressed.clear();
        input.on_key(key(KeyCode::Right, KeyEventKind::Repeat), t0 + Duration::from_millis(30));
        assert!(!input.any_pressed(&[KeyCode::Right]));
    }

    #[test]
    fn press_after_timeout_counts_again() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.on_key(key(KeyCode::Left, KeyEventKind::Press), t0);
        input.pressed.clear();
        input.on_key(key(KeyCode::Left, KeyEventKind::Press), t0 + HOLD_TIMEOUT * 2);
        assert!(input.any_pressed(&[KeyCode::Up, KeyCode::Left]));
    }

    #[test]
    fn release_only_counts_when_honored() {
        let t0 = Instant::now();
        let later = t0 + Duration::from_millis(10);

        let mut input = InputState::new();
        input.on_key(key(KeyCode::Enter, KeyEventKind::Press), t0);
        input.on_key(key(KeyCode::Enter, KeyEventKind::Release), t0);
        input.pressed.clear();
        input.on_key(key(KeyCode::Enter, KeyEventKind::Press), later);
        assert!(!input.any_pressed(&[KeyCode::Enter]));

        input.honor_release = true;
        input.on_key(key(KeyCode::Enter, KeyEventKind::Release), later);
        input.on_key(key(KeyCode::Enter, KeyEventKind::Press), later);
        assert!(input.any_pressed(&[KeyCode::Enter]));
    }

    #[test]
    fn ctrl_c_is_detected() {
        let mut input = InputState::new();
        input.on_key(
            KeyEvent::new_with_kind(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press),
            Instant::now(),
        );
        assert!(input.ctrl_c_pressed());
    }
}
