//! Frame update
//!
//! Core game loop step. The order is fixed: player input, enemy AI,
//! arrows, victory check, enemy fire, fireballs, hazards, defeat check.

use glam::Vec2;
use rand::Rng;

use super::ai::{self, AiContext, AiEvent};
use super::collision::{Hitbox, clamp_to_bounds};
use super::hazard;
use super::projectiles;
use super::state::{Direction, GameEvent, GamePhase, GameState, Player};
use crate::consts::DODGE_ROLL_CHANCE;

/// Input snapshot for a single frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub shoot: bool,
    /// Wall-clock time of this frame (ms)
    pub now: f64,
}

impl TickInput {
    /// No keys held at time `now`
    pub fn idle(now: f64) -> Self {
        Self {
            now,
            ..Default::default()
        }
    }
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    if state.is_over() {
        return;
    }

    let now = input.now;
    state.frame += 1;

    // 1. Player movement and shooting
    move_player(&mut state.player, input, state.playfield);
    if state.config.auto_aim {
        projectiles::auto_shoot(state, now);
    } else if input.shoot && projectiles::shoot(state, now) {
        react_to_shot(state, now);
    }

    // 2. Enemy AI
    step_enemies(state, now);

    // 3. Arrows vs enemies
    projectiles::update_arrows(state, now);

    // 4. Victory ends the frame
    if state.all_enemies_defeated() {
        state.phase = GamePhase::Victory;
        state.events.push(GameEvent::Victory);
        log::info!("Level {} cleared on frame {}", state.level, state.frame);
        return;
    }

    // 5. Enemy fire
    projectiles::spawn_fireballs(state, now);

    // 6. Fireballs vs player
    projectiles::update_fireballs(state);

    // 7. Hazards
    hazard::update(state, now);

    // 8. Defeat
    if state.player.is_defeated() {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver);
        log::info!("Game over on level {} (frame {})", state.level, state.frame);
    }
}

/// Apply held directions and clamp the player to the playfield
///
/// Facing follows the last direction processed, in the order left, right,
/// up, down.
pub fn move_player(player: &mut Player, input: &TickInput, playfield: Vec2) {
    let held = [
        (input.left, Direction::Left),
        (input.right, Direction::Right),
        (input.up, Direction::Up),
        (input.down, Direction::Down),
    ];
    for (pressed, direction) in held {
        if pressed {
            player.pos += direction.unit() * player.speed;
            player.direction = direction;
        }
    }
    player.pos = clamp_to_bounds(player.pos, player.size, playfield);
}

/// Coin flip after a shot; on heads, dodging enemies check nearby arrows
fn react_to_shot(state: &mut GameState, now: f64) {
    if !state.config.policy.dodges() || !state.rng.random_bool(DODGE_ROLL_CHANCE) {
        return;
    }

    let playfield = state.playfield;
    for enemy in state.enemies.iter_mut().filter(|e| e.is_alive()) {
        if let Some(direction) = ai::try_dodge(enemy, &state.arrows, now, playfield, &mut state.rng) {
            state.events.push(GameEvent::EnemyDodged {
                enemy_id: enemy.id,
                direction,
            });
        }
    }
}

/// Run the level's policy on every live enemy and apply what they did
fn step_enemies(state: &mut GameState, now: f64) {
    let policy = state.config.policy;
    let mut ctx = AiContext {
        now,
        playfield: state.playfield,
        player: state.player.hitbox(),
        contact_damage: state.config.contact_damage,
    };

    let enemies = std::mem::take(&mut state.enemies);
    let mut stepped = Vec::with_capacity(enemies.len());

    for enemy in enemies {
        if !enemy.is_alive() {
            stepped.push(enemy);
            continue;
        }

        let out = ai::step(policy, &enemy, &ctx, &mut state.rng);
        for event in out.events {
            match event {
                AiEvent::Teleported => {
                    state.events.push(GameEvent::EnemyTeleported { enemy_id: out.enemy.id });
                }
                AiEvent::Crushed { damage, knockback } => {
                    let player = &mut state.player;
                    player.lives -= damage;
                    player.pos = clamp_to_bounds(player.pos + knockback, player.size, state.playfield);
                    ctx.player = player.hitbox();
                    state.events.push(GameEvent::PlayerHit {
                        damage,
                        lives: player.lives,
                    });
                    log::debug!("Enemy {} crushed player, lives {}", out.enemy.id, player.lives);
                }
                AiEvent::ModeSwitched { chasing } => {
                    log::debug!("Enemy {} {}", out.enemy.id, if chasing { "chasing" } else { "patrolling" });
                }
                AiEvent::DodgeEnded => {}
            }
        }
        stepped.push(out.enemy);
    }

    state.enemies = stepped;
}
