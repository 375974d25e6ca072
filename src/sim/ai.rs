//! Enemy behavior policies
//!
//! Pure step functions, one per `Policy`. Each takes the current enemy and a
//! read-only view of the world and returns the updated enemy plus whatever
//! it did that the rest of the frame has to react to. No behavior reaches
//! into shared state.

use glam::Vec2;
use rand::Rng;

use super::collision::{Aabb, clamp_to_bounds, intersects};
use super::levels::Policy;
use super::state::{Arrow, Direction, Dodge, Enemy};
use crate::consts::*;
use crate::direction_to;

/// Read-only world view for one enemy step
#[derive(Debug, Clone, Copy)]
pub struct AiContext {
    /// Current time (ms)
    pub now: f64,
    pub playfield: Vec2,
    /// Player collision box
    pub player: Aabb,
    /// Lives lost when this enemy touches the player
    pub contact_damage: i32,
}

/// Side effects of an enemy step
#[derive(Debug, Clone, PartialEq)]
pub enum AiEvent {
    /// Enemy jumped to a new position
    Teleported,
    /// Chasing enemy ran into the player
    Crushed { damage: i32, knockback: Vec2 },
    /// Mode-switching enemy changed mode
    ModeSwitched { chasing: bool },
    /// Dodge finished, patrol resumes
    DodgeEnded,
}

/// Result of stepping one enemy
#[derive(Debug, Clone)]
pub struct AiStep {
    pub enemy: Enemy,
    pub events: Vec<AiEvent>,
}

/// Advance one enemy under `policy`
pub fn step<R: Rng>(policy: Policy, enemy: &Enemy, ctx: &AiContext, rng: &mut R) -> AiStep {
    let mut enemy = enemy.clone();
    let mut events = Vec::new();

    match policy {
        Policy::PatrolDodge => {
            if enemy.is_dodging() {
                if let Some(event) = dodge_step(&mut enemy, ctx, rng) {
                    events.push(event);
                }
            }
            // A dodge that just ended hands straight back to patrol
            if !enemy.is_dodging() {
                patrol_step(&mut enemy, ctx, rng, true);
            }
        }
        Policy::DirectChase => {
            events.extend(chase_step(&mut enemy, ctx));
        }
        Policy::ModeSwitchChase => {
            enemy.mode_frames += 1;
            if enemy.mode_frames >= MODE_SWITCH_FRAMES {
                enemy.mode_frames = 0;
                enemy.chase_mode = !enemy.chase_mode;
                events.push(AiEvent::ModeSwitched { chasing: enemy.chase_mode });
            }

            if enemy.chase_mode {
                if let Some(crush) = chase_step(&mut enemy, ctx) {
                    // Back off after landing a hit
                    enemy.chase_mode = false;
                    enemy.mode_frames = 0;
                    events.push(crush);
                    events.push(AiEvent::ModeSwitched { chasing: false });
                }
            } else {
                patrol_step(&mut enemy, ctx, rng, false);
            }
        }
        Policy::ShieldedPatrol => {
            patrol_step(&mut enemy, ctx, rng, true);
        }
        Policy::TeleportBurst | Policy::Swarm => {
            if teleport_step(&mut enemy, ctx, rng) {
                events.push(AiEvent::Teleported);
            }
        }
    }

    AiStep { enemy, events }
}

/// Vertical patrol between the patrol bounds, optionally easing back
/// toward the right-hand anchor column
fn patrol_step<R: Rng>(enemy: &mut Enemy, ctx: &AiContext, rng: &mut R, ease_x: bool) {
    if rng.random_bool(PATROL_FLIP_CHANCE) {
        enemy.patrol_direction = -enemy.patrol_direction;
    }

    enemy.pos.y += enemy.speed * enemy.patrol_direction;

    let max_y = ctx.playfield.y - PATROL_BOTTOM_INSET;
    if enemy.pos.y <= PATROL_MIN_Y {
        enemy.patrol_direction = 1.0;
    } else if enemy.pos.y >= max_y {
        enemy.patrol_direction = -1.0;
    }

    if ease_x {
        let target_x = ctx.playfield.x - ENEMY_RIGHT_INSET;
        if (enemy.pos.x - target_x).abs() > PATROL_EASING_DEADZONE {
            enemy.pos.x += (target_x - enemy.pos.x) * PATROL_EASING;
        }
    }
}

/// Fast vertical evasion; ends the dodge once its time is up
fn dodge_step<R: Rng>(enemy: &mut Enemy, ctx: &AiContext, rng: &mut R) -> Option<AiEvent> {
    let dodge = enemy.dodge?;

    if ctx.now >= dodge.until {
        enemy.dodge = None;
        enemy.patrol_direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        log::debug!("Enemy {} dodge ended", enemy.id);
        return Some(AiEvent::DodgeEnded);
    }

    enemy.pos.y += DODGE_SPEED * dodge.direction.unit().y;
    let max_y = ctx.playfield.y - PATROL_BOTTOM_INSET;
    enemy.pos.y = enemy.pos.y.clamp(PATROL_MIN_Y, max_y);
    None
}

/// Move straight at the player; report contact
fn chase_step(enemy: &mut Enemy, ctx: &AiContext) -> Option<AiEvent> {
    // Coincident positions have no direction; hold still this frame
    let heading = direction_to(enemy.pos, ctx.player.pos).unwrap_or(Vec2::ZERO);

    enemy.pos += heading * enemy.speed;
    enemy.pos = clamp_to_bounds(enemy.pos, enemy.size, ctx.playfield);

    let body = Aabb::new(enemy.pos, enemy.size);
    intersects(&body, &ctx.player).then(|| AiEvent::Crushed {
        damage: ctx.contact_damage,
        knockback: heading * CHASE_KNOCKBACK,
    })
}

/// Jump to a random spot clear of the walls once the interval has passed
fn teleport_step<R: Rng>(enemy: &mut Enemy, ctx: &AiContext, rng: &mut R) -> bool {
    if !enemy.teleport_ready(ctx.now) {
        return false;
    }

    let min = Vec2::splat(TELEPORT_WALL_MARGIN);
    let max = (ctx.playfield - enemy.size - min).max(min);
    enemy.pos = Vec2::new(
        random_between(rng, min.x, max.x),
        random_between(rng, min.y, max.y),
    );
    enemy.last_teleport = Some(ctx.now);
    log::debug!("Enemy {} teleported to ({:.0}, {:.0})", enemy.id, enemy.pos.x, enemy.pos.y);
    true
}

fn random_between<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..=hi) } else { lo }
}

/// React to a fresh player shot
///
/// Any arrow within the trigger radius gives the enemy a chance to start a
/// dodge, away from whichever half of the field it is in. Returns the dodge
/// direction if one started.
pub fn try_dodge<R: Rng>(
    enemy: &mut Enemy,
    arrows: &[Arrow],
    now: f64,
    playfield: Vec2,
    rng: &mut R,
) -> Option<Direction> {
    for arrow in arrows {
        if arrow.pos.distance(enemy.pos) >= DODGE_TRIGGER_RADIUS || !enemy.dodge_ready(now) {
            continue;
        }
        if !rng.random_bool(DODGE_CHANCE) {
            continue;
        }

        let direction = if enemy.pos.y > playfield.y / 2.0 {
            Direction::Up
        } else {
            Direction::Down
        };
        let until = now + DODGE_DURATION_MS;
        enemy.dodge = Some(Dodge { direction, until });
        enemy.dodge_ready_at = Some(until + DODGE_COOLDOWN_MS);
        log::debug!("Enemy {} dodging {:?}", enemy.id, direction);
        return Some(direction);
    }
    None
}
