//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame clock
//! - Keyboard mapping into held actions
//! - Focus loss (everything released)

use crate::settings::KeyLayout;
use crate::sim::TickInput;

/// A gameplay action bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Shoot,
}

/// Map a `KeyboardEvent.key` value to an action
///
/// Letter keys match in either case so Caps Lock does not break WASD.
pub fn action_for_key(key: &str, layout: KeyLayout) -> Option<Action> {
    let arrow = match key {
        "ArrowLeft" => Some(Action::Left),
        "ArrowRight" => Some(Action::Right),
        "ArrowUp" => Some(Action::Up),
        "ArrowDown" => Some(Action::Down),
        " " | "Spacebar" => Some(Action::Shoot),
        _ => None,
    };
    if arrow.is_some() || layout == KeyLayout::ArrowsOnly {
        return arrow;
    }

    match key {
        "a" | "A" => Some(Action::Left),
        "d" | "D" => Some(Action::Right),
        "w" | "W" => Some(Action::Up),
        "s" | "S" => Some(Action::Down),
        _ => None,
    }
}

/// Which actions are currently held down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldActions {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub shoot: bool,
}

impl HeldActions {
    pub fn set(&mut self, action: Action, held: bool) {
        let slot = match action {
            Action::Left => &mut self.left,
            Action::Right => &mut self.right,
            Action::Up => &mut self.up,
            Action::Down => &mut self.down,
            Action::Shoot => &mut self.shoot,
        };
        *slot = held;
    }

    /// Apply a key event; returns whether the key was bound
    pub fn apply_key(&mut self, key: &str, pressed: bool, layout: KeyLayout) -> bool {
        match action_for_key(key, layout) {
            Some(action) => {
                self.set(action, pressed);
                true
            }
            None => false,
        }
    }

    /// Release everything (window blur, level change)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn to_tick_input(&self, now: f64) -> TickInput {
        TickInput {
            left: self.left,
            right: self.right,
            up: self.up,
            down: self.down,
            shoot: self.shoot,
            now,
        }
    }
}

/// Wall-clock milliseconds
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the first call
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}
