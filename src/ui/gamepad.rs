/// Gamepad menu input via gilrs.
///
/// Directions come from the D-pad or the left stick; confirm and back come
/// from the button lists in `[gamepad]` of config.toml (A/Start and
/// B/Select unless configured). Every query is edge-triggered.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Face and shoulder buttons that can be bound to menu actions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    /// Accepts both Xbox-style letters and gilrs compass names.
    fn parse(name: &str) -> Option<Btn> {
        let btn = match name.trim().to_ascii_lowercase().as_str() {
            "a" | "south" => Btn::A,
            "b" | "east" => Btn::B,
            "x" | "west" => Btn::X,
            "y" | "north" => Btn::Y,
            "l1" | "lb" | "lefttrigger" => Btn::L1,
            "r1" | "rb" | "righttrigger" => Btn::R1,
            "start" => Btn::Start,
            "select" | "back" => Btn::Select,
            _ => return None,
        };
        Some(btn)
    }

    fn parse_all(names: &[String]) -> Vec<Btn> {
        names.iter().filter_map(|n| Btn::parse(n)).collect()
    }
}

/// Index into the `dpad` and `stick` edge arrays.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Nav {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default)]
struct Edge {
    down: bool,
    fired: bool,
}

impl Edge {
    fn set(&mut self, down: bool) {
        self.fired |= down && !self.down;
        self.down = down;
    }
}

/// What a physical gilrs button means to the menu.
#[cfg(feature = "gamepad")]
enum Source {
    Pad(Nav),
    Bound(Btn),
}

#[cfg(feature = "gamepad")]
fn classify(button: Button) -> Option<Source> {
    Some(match button {
        Button::DPadUp => Source::Pad(Nav::Up),
        Button::DPadDown => Source::Pad(Nav::Down),
        Button::DPadLeft => Source::Pad(Nav::Left),
        Button::DPadRight => Source::Pad(Nav::Right),
        Button::South => Source::Bound(Btn::A),
        Button::East => Source::Bound(Btn::B),
        Button::West => Source::Bound(Btn::X),
        Button::North => Source::Bound(Btn::Y),
        Button::LeftTrigger => Source::Bound(Btn::L1),
        Button::RightTrigger => Source::Bound(Btn::R1),
        Button::Start => Source::Bound(Btn::Start),
        Button::Select => Source::Bound(Btn::Select),
        _ => return None,
    })
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [Edge; BTN_COUNT],
    dpad: [Edge; 4],
    stick: [Edge; 4],
    stick_axes: (f32, f32),

    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                if let Some((_, pad)) = g.gamepads().next() {
                    tracing::info!(name = pad.name(), "gamepad connected");
                }
                Some(g)
            }
            Err(e) => {
                tracing::warn!(error = %e, "gamepad support unavailable");
                None
            }
        };

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            buttons: [Edge::default(); BTN_COUNT],
            dpad: [Edge::default(); 4],
            stick: [Edge::default(); 4],
            stick_axes: (0.0, 0.0),
            confirm: vec![Btn::A, Btn::Start],
            cancel: vec![Btn::B, Btn::Select],
        }
    }

    /// Rebind confirm/cancel. An empty or fully unknown list keeps the default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        let confirm = Btn::parse_all(&cfg.confirm);
        if !confirm.is_empty() {
            self.confirm = confirm;
        }
        let cancel = Btn::parse_all(&cfg.cancel);
        if !cancel.is_empty() {
            self.cancel = cancel;
        }
    }

    /// Call once per frame before querying.
    pub fn update(&mut self) {
        for edge in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            edge.fired = false;
        }

        #[cfg(feature = "gamepad")]
        self.poll();
    }

    #[cfg(feature = "gamepad")]
    fn poll(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return;
        };
        let events: Vec<EventType> = std::iter::from_fn(|| gilrs.next_event()).map(|e| e.event).collect();

        for event in events {
            match event {
                EventType::ButtonPressed(button, _) => self.press(button, true),
                EventType::ButtonReleased(button, _) => self.press(button, false),
                EventType::AxisChanged(Axis::LeftStickX, value, _) => self.stick_axes.0 = value,
                EventType::AxisChanged(Axis::LeftStickY, value, _) => self.stick_axes.1 = value,
                EventType::Disconnected => {
                    tracing::info!("gamepad disconnected");
                    self.release_all();
                }
                _ => {}
            }
        }

        let (x, y) = self.stick_axes;
        self.stick[Nav::Up as usize].set(y > STICK_DEADZONE);
        self.stick[Nav::Down as usize].set(y < -STICK_DEADZONE);
        self.stick[Nav::Left as usize].set(x < -STICK_DEADZONE);
        self.stick[Nav::Right as usize].set(x > STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, button: Button, down: bool) {
        match classify(button) {
            Some(Source::Pad(nav)) => self.dpad[nav as usize].set(down),
            Some(Source::Bound(btn)) => self.buttons[btn as usize].set(down),
            None => {}
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [Edge::default(); BTN_COUNT];
        self.dpad = [Edge::default(); 4];
        self.stick = [Edge::default(); 4];
        self.stick_axes = (0.0, 0.0);
    }

    fn fired(&self, bound: &[Btn]) -> bool {
        bound.iter().any(|&b| self.buttons[b as usize].fired)
    }

    fn nav(&self, nav: Nav) -> bool {
        self.dpad[nav as usize].fired || self.stick[nav as usize].fired
    }

    pub fn confirm_pressed(&self) -> bool {
        self.fired(&self.confirm)
    }

    pub fn cancel_pressed(&self) -> bool {
        self.fired(&self.cancel)
    }

    pub fn up_pressed(&self) -> bool {
        self.nav(Nav::Up)
    }

    pub fn down_pressed(&self) -> bool {
        self.nav(Nav::Down)
    }

    pub fn left_pressed(&self) -> bool {
        self.nav(Nav::Left)
    }

    pub fn right_pressed(&self) -> bool {
        self.nav(Nav::Right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_loosely() {
        assert_eq!(Btn::parse("start"), Some(Btn::Start));
        assert_eq!(Btn::parse(" Back "), Some(Btn::Select));
        assert_eq!(Btn::parse("SOUTH"), Some(Btn::A));
        assert_eq!(Btn::parse("turbo"), None);
    }

    #[test]
    fn unknown_bindings_keep_defaults() {
        let mut gp = GamepadState::new();
        gp.load_button_config(&GamepadConfig {
            confirm: vec!["nope".into()],
            cancel: vec!["Y".into()],
        });
        assert_eq!(gp.confirm, vec![Btn::A, Btn::Start]);
        assert_eq!(gp.cancel, vec![Btn::Y]);
    }

    #[test]
    fn holding_fires_once() {
        let mut e = Edge::default();
        e.set(true);
        assert!(e.fired);
        e.fired = false;
        e.set(true);
        assert!(!e.fired);
        e.set(false);
        e.set(true);
        assert!(e.fired);
    }

    #[test]
    fn stick_and_dpad_share_directions() {
        let mut gp = GamepadState::new();
        gp.stick[Nav::Right as usize].set(true);
        assert!(gp.right_pressed());
        assert!(!gp.left_pressed());
        gp.dpad[Nav::Left as usize].set(true);
        assert!(gp.left_pressed());
    }

    #[test]
    fn update_clears_edges_but_not_holds() {
        let mut gp = GamepadState::new();
        gp.dpad[Nav::Up as usize].set(true);
        gp.buttons[Btn::A as usize].set(true);
        assert!(gp.up_pressed());
        assert!(gp.confirm_pressed());
        gp.update();
        assert!(!gp.up_pressed());
        assert!(!gp.confirm_pressed());
        assert!(gp.dpad[Nav::Up as usize].down);
    }
}
