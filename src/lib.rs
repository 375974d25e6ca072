//! Arrow Duel - A ten-level arcade archery duel
//!
//! Core modules:
//! - `sim`: Frame simulation (movement, enemy AI, projectiles, hazards)
//! - `progression`: Level progression state machine and lifecycle signals
//! - `persistence`: Saved level slot (LocalStorage on web)
//! - `platform`: Browser/native platform abstraction (input, clock)
//! - `renderer`: Canvas 2D render sink (web only)

pub mod persistence;
pub mod platform;
pub mod progression;
#[cfg(target_arch = "wasm32")]
pub mod renderer;
pub mod settings;
pub mod sim;

pub use progression::{Progression, ProgressionState, Signal};
pub use settings::{KeyLayout, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default playfield dimensions (pixels)
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Nominal frame length for hosts without a display clock (ms)
    pub const FRAME_MS: f64 = 16.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 20.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_SPAWN_X: f32 = 50.0;

    /// Enemy defaults
    pub const ENEMY_SIZE: f32 = 20.0;
    /// Enemy spawn / patrol anchor, measured from the right edge
    pub const ENEMY_RIGHT_INSET: f32 = 70.0;

    /// Arrows (player projectiles)
    pub const ARROW_WIDTH: f32 = 15.0;
    pub const ARROW_HEIGHT: f32 = 5.0;
    /// Unified speed for arrows and basic fireballs
    pub const PROJECTILE_SPEED: f32 = 4.0;
    pub const SHOT_COOLDOWN_MS: f64 = 1000.0;
    /// Level 10 auto-aim interval
    pub const AUTO_SHOT_INTERVAL_MS: f64 = 500.0;

    /// Fireballs (enemy projectiles)
    pub const FIREBALL_SIZE: f32 = 15.0;

    /// Patrol
    pub const PATROL_MIN_Y: f32 = 10.0;
    /// Bottom patrol bound, measured from the bottom edge
    pub const PATROL_BOTTOM_INSET: f32 = 30.0;
    pub const PATROL_FLIP_CHANCE: f64 = 0.02;
    pub const PATROL_EASING: f32 = 0.05;
    /// Horizontal easing only kicks in beyond this distance from the anchor
    pub const PATROL_EASING_DEADZONE: f32 = 30.0;

    /// Dodge
    pub const DODGE_SPEED: f32 = 10.0;
    pub const DODGE_DURATION_MS: f64 = 300.0;
    pub const DODGE_COOLDOWN_MS: f64 = 1500.0;
    pub const DODGE_TRIGGER_RADIUS: f32 = 120.0;
    pub const DODGE_ROLL_CHANCE: f64 = 0.5;
    pub const DODGE_CHANCE: f64 = 0.5;

    /// Chase
    pub const CHASE_KNOCKBACK: f32 = 30.0;
    pub const MODE_SWITCH_FRAMES: u32 = 120;

    /// Teleport
    pub const TELEPORT_INTERVAL_MS: f64 = 2000.0;
    pub const TELEPORT_WALL_MARGIN: f32 = 50.0;

    /// Shield counterattack window after the enemy's own shot
    pub const SHIELD_WINDOW_MS: f64 = 1000.0;

    /// Swarm
    pub const SWARM_SIZE: usize = 5;

    /// Hazards (TNT)
    pub const HAZARD_SIZE: f32 = 30.0;
    pub const HAZARD_DAMAGE: i32 = 3;
    pub const HAZARD_SPEED: f32 = 2.0;
    pub const HAZARD_INITIAL_COUNT: usize = 2;
    pub const HAZARD_MAX_LIVE: usize = 4;
    pub const HAZARD_SPAWN_INTERVAL_MS: f64 = 4000.0;
    pub const HAZARD_TURN_PERIOD_FRAMES: u32 = 60;
    pub const HAZARD_TURN_CHANCE: f64 = 0.3;
    /// Minimum distance between a fresh hazard and the player
    pub const HAZARD_SPAWN_CLEARANCE: f32 = 150.0;
}

/// Unit vector from `from` toward `to`, or `None` when the points coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Option<Vec2> {
    let delta = to - from;
    let distance = delta.length();
    if distance > 0.0 {
        Some(delta / distance)
    } else {
        None
    }
}

/// Unit vector at the given heading (radians)
#[inline]
pub fn heading_vector(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
