//! Render snapshot
//!
//! Everything the render sink needs for one frame, flattened into plain
//! serializable records. Nothing flows back into the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Direction, GamePhase, GameState};

/// How long the teleport flash stays visible (ms)
pub const TELEPORT_FLASH_MS: f64 = 200.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub size: Vec2,
    pub facing: Direction,
    pub lives: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub health: i32,
    pub dodging: bool,
    /// Drawn with a shield bubble
    pub shielded: bool,
    /// Drawn with a teleport flash
    pub teleported: bool,
}

/// A projectile or hazard box with a heading for sprite rotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteView {
    pub pos: Vec2,
    pub size: Vec2,
    pub angle: f32,
}

/// One frame's worth of drawable state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub level: u8,
    pub phase: GamePhase,
    pub playfield: Vec2,
    pub player: PlayerView,
    /// Live enemies only
    pub enemies: Vec<EnemyView>,
    pub arrows: Vec<SpriteView>,
    pub fireballs: Vec<SpriteView>,
    pub hazards: Vec<SpriteView>,
}

impl FrameSnapshot {
    /// Capture the drawable state at time `now`
    pub fn capture(state: &GameState, now: f64) -> Self {
        let shield_level = state.config.policy.shielded();

        Self {
            level: state.level.get(),
            phase: state.phase,
            playfield: state.playfield,
            player: PlayerView {
                pos: state.player.pos,
                size: state.player.size,
                facing: state.player.direction,
                lives: state.player.lives,
            },
            enemies: state
                .live_enemies()
                .map(|e| EnemyView {
                    id: e.id,
                    pos: e.pos,
                    size: e.size,
                    health: e.health,
                    dodging: e.is_dodging(),
                    shielded: shield_level && !e.counterattack_open(now),
                    teleported: e.last_teleport.is_some_and(|t| now >= t && now - t < TELEPORT_FLASH_MS),
                })
                .collect(),
            arrows: state
                .arrows
                .iter()
                .map(|a| SpriteView {
                    pos: a.pos,
                    size: a.size,
                    angle: a.angle(),
                })
                .collect(),
            fireballs: state
                .fireballs
                .iter()
                .map(|f| SpriteView {
                    pos: f.pos,
                    size: f.size,
                    angle: f.heading.y.atan2(f.heading.x),
                })
                .collect(),
            hazards: state
                .hazards
                .iter()
                .map(|h| SpriteView {
                    pos: h.pos,
                    size: h.size,
                    angle: h.angle,
                })
                .collect(),
        }
    }
}
