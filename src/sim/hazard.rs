//! TNT hazards
//!
//! Hazards drift at constant speed, mirror off the playfield walls and now
//! and then pick a new heading at random. Touching one costs the player
//! its damage and removes it.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;

use super::collision::hits;
use super::state::{GameEvent, GameState, Hazard};
use crate::consts::*;

/// Attempts at finding a spawn point clear of the player
const SPAWN_ATTEMPTS: usize = 8;

/// Mirror a heading off the walls that were crossed
///
/// Crossing a vertical wall flips the X component, a horizontal wall the Y
/// component.
pub fn reflect_heading(angle: f32, flip_x: bool, flip_y: bool) -> f32 {
    let mut angle = angle;
    if flip_x {
        angle = PI - angle;
    }
    if flip_y {
        angle = -angle;
    }
    angle.rem_euclid(TAU)
}

/// Move a hazard one frame and bounce it off the playfield edges
///
/// The position is not pushed back inside, so a hazard may overlap a wall
/// for a frame.
pub fn advance<R: Rng>(hazard: &mut Hazard, playfield: Vec2, rng: &mut R) {
    let vel = hazard.velocity();
    hazard.pos += vel;

    let flip_x = (hazard.pos.x < 0.0 && vel.x < 0.0)
        || (hazard.pos.x + hazard.size.x > playfield.x && vel.x > 0.0);
    let flip_y = (hazard.pos.y < 0.0 && vel.y < 0.0)
        || (hazard.pos.y + hazard.size.y > playfield.y && vel.y > 0.0);
    if flip_x || flip_y {
        hazard.angle = reflect_heading(hazard.angle, flip_x, flip_y);
    }

    hazard.turn_counter += 1;
    if hazard.turn_counter % HAZARD_TURN_PERIOD_FRAMES == 0 && rng.random_bool(HAZARD_TURN_CHANCE) {
        hazard.angle = rng.random_range(0.0..TAU);
    }
}

/// Add one hazard at a random spot away from the player
pub fn spawn(state: &mut GameState) -> u32 {
    let max = (state.playfield - Vec2::splat(HAZARD_SIZE)).max(Vec2::ONE);
    let player_center = state.player.center();

    // Fallback: the corner farthest from the player
    let mut pos = [Vec2::ZERO, Vec2::new(max.x, 0.0), Vec2::new(0.0, max.y), max]
        .into_iter()
        .max_by(|a, b| a.distance(player_center).total_cmp(&b.distance(player_center)))
        .unwrap_or(max);
    for _ in 0..SPAWN_ATTEMPTS {
        let candidate = Vec2::new(
            state.rng.random_range(0.0..max.x),
            state.rng.random_range(0.0..max.y),
        );
        let center = candidate + Vec2::splat(HAZARD_SIZE / 2.0);
        if center.distance(player_center) >= HAZARD_SPAWN_CLEARANCE {
            pos = candidate;
            break;
        }
    }

    let angle = state.rng.random_range(0.0..TAU);
    let id = state.next_entity_id();
    state.hazards.push(Hazard::new(id, pos, angle));
    state.events.push(GameEvent::HazardSpawned { hazard_id: id });
    log::debug!("Hazard {} spawned at ({:.0}, {:.0})", id, pos.x, pos.y);
    id
}

/// Spawn on schedule, move every hazard and resolve hits on the player
pub fn update(state: &mut GameState, now: f64) {
    if !state.config.hazards {
        return;
    }

    if now - state.last_hazard_spawn >= HAZARD_SPAWN_INTERVAL_MS {
        state.last_hazard_spawn = now;
        if state.hazards.len() < HAZARD_MAX_LIVE {
            spawn(state);
        }
    }

    let playfield = state.playfield;
    let hazards = std::mem::take(&mut state.hazards);
    let mut survivors = Vec::with_capacity(hazards.len());

    for mut hazard in hazards {
        advance(&mut hazard, playfield, &mut state.rng);

        if hits(&hazard, &state.player) {
            state.player.lives -= hazard.damage;
            state.events.push(GameEvent::PlayerHit {
                damage: hazard.damage,
                lives: state.player.lives,
            });
            log::debug!("Hazard {} hit player, lives {}", hazard.id, state.player.lives);
            continue;
        }
        survivors.push(hazard);
    }

    state.hazards = survivors;
}
