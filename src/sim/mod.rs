//! Frame simulation module
//!
//! All gameplay logic lives here:
//! - One step per display frame, run to completion
//! - Timers are timestamps compared against the frame clock
//! - Randomness comes from the run's own RNG
//! - No rendering, storage or platform dependencies

pub mod ai;
pub mod collision;
pub mod hazard;
pub mod levels;
pub mod projectiles;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::{Aabb, Hitbox, intersects};
pub use levels::{AttackPattern, Level, LevelConfig, Policy};
pub use snapshot::FrameSnapshot;
pub use state::{
    Arrow, ArrowMotion, Direction, Enemy, Fireball, GameEvent, GamePhase, GameState, Hazard,
    Player,
};
pub use tick::{TickInput, tick};
