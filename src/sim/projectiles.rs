//! Arrows and fireballs
//!
//! Spawning, straight-line motion, off-field culling and the damage each
//! projectile deals on contact. Collections are rebuilt every frame rather
//! than spliced while iterating.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::collision::hits;
use super::levels::AttackPattern;
use super::state::{Arrow, ArrowMotion, Fireball, GameEvent, GameState};
use crate::consts::*;
use crate::{direction_to, heading_vector};

/// Fireballs in one burst
const BURST_COUNT: usize = 3;

fn arrow_from(origin: Vec2, motion: ArrowMotion) -> Arrow {
    Arrow {
        pos: origin,
        size: Vec2::new(ARROW_WIDTH, ARROW_HEIGHT),
        speed: PROJECTILE_SPEED,
        motion,
    }
}

/// Fire an arrow along the player's facing if the cooldown allows
///
/// Returns whether a shot was accepted. Auto-aim levels ignore manual shots.
pub fn shoot(state: &mut GameState, now: f64) -> bool {
    if state.config.auto_aim || !state.player.shot_ready(now) {
        return false;
    }

    state.player.last_shot = Some(now);
    let arrow = arrow_from(
        state.player.center(),
        ArrowMotion::Cardinal(state.player.direction),
    );
    state.arrows.push(arrow);
    state.events.push(GameEvent::ArrowFired { auto: false });
    true
}

/// Fire an arrow at the nearest live enemy on the auto-aim interval
pub fn auto_shoot(state: &mut GameState, now: f64) -> bool {
    if !state.config.auto_aim || !state.player.auto_shot_ready(now) {
        return false;
    }

    let origin = state.player.center();
    let nearest = state
        .live_enemies()
        .map(|e| e.center())
        .min_by(|a, b| {
            a.distance(origin)
                .partial_cmp(&b.distance(origin))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let Some(target) = nearest else {
        return false;
    };
    let Some(unit) = direction_to(origin, target) else {
        return false;
    };

    state.player.last_auto_shot = Some(now);
    state.arrows.push(arrow_from(origin, ArrowMotion::Aimed(unit)));
    state.events.push(GameEvent::ArrowFired { auto: true });
    true
}

fn out_of_bounds(pos: Vec2, playfield: Vec2) -> bool {
    pos.x < 0.0 || pos.x > playfield.x || pos.y < 0.0 || pos.y > playfield.y
}

/// Move arrows, drop the ones that left the field, and resolve enemy hits
///
/// An arrow is spent on the first live enemy it touches. Shielded enemies
/// only take damage inside their counterattack window.
pub fn update_arrows(state: &mut GameState, now: f64) {
    let playfield = state.playfield;
    let damage = state.config.arrow_damage;
    let shielded = state.config.policy.shielded();

    let arrows = std::mem::take(&mut state.arrows);
    let mut survivors = Vec::with_capacity(arrows.len());

    for mut arrow in arrows {
        arrow.pos += arrow.velocity();
        if out_of_bounds(arrow.pos, playfield) {
            continue;
        }

        let Some(enemy) = state
            .enemies
            .iter_mut()
            .find(|e| e.is_alive() && hits(&arrow, &**e))
        else {
            survivors.push(arrow);
            continue;
        };

        if shielded && !enemy.counterattack_open(now) {
            state.events.push(GameEvent::HitAbsorbed { enemy_id: enemy.id });
            log::debug!("Enemy {} shield absorbed a hit", enemy.id);
            continue;
        }

        enemy.health -= damage;
        state.events.push(GameEvent::EnemyHit {
            enemy_id: enemy.id,
            health: enemy.health,
        });
        if !enemy.is_alive() {
            state.events.push(GameEvent::EnemyDefeated { enemy_id: enemy.id });
            log::info!("Enemy {} defeated", enemy.id);
        }
    }

    state.arrows = survivors;
}

/// Roll each live enemy's attack for this frame
pub fn spawn_fireballs(state: &mut GameState, now: f64) {
    let (chance, speed, burst) = match state.config.attack {
        AttackPattern::None => return,
        AttackPattern::Aimed { chance, speed } => (chance, speed, false),
        AttackPattern::Burst { chance, speed } => (chance, speed, true),
    };

    let target = state.player.pos;
    for enemy in state.enemies.iter_mut().filter(|e| e.is_alive()) {
        if !state.rng.random_bool(chance) {
            continue;
        }

        let offset = target - enemy.pos;
        if burst {
            let aim = if offset == Vec2::ZERO { 0.0 } else { offset.y.atan2(offset.x) };
            for k in 0..BURST_COUNT {
                let angle = aim + k as f32 * TAU / BURST_COUNT as f32;
                state.fireballs.push(Fireball {
                    pos: enemy.pos,
                    size: Vec2::splat(FIREBALL_SIZE),
                    speed,
                    heading: heading_vector(angle),
                    damage: Some(1),
                });
            }
        } else {
            state.fireballs.push(Fireball {
                pos: enemy.pos,
                size: Vec2::splat(FIREBALL_SIZE),
                speed,
                heading: offset,
                damage: None,
            });
        }

        enemy.last_shot = Some(now);
        state.events.push(GameEvent::EnemyFired {
            enemy_id: enemy.id,
            count: if burst { BURST_COUNT } else { 1 },
        });
    }
}

/// Move fireballs, drop the ones that left the field, and resolve player hits
///
/// Every hit costs exactly one life, whatever the fireball's damage tag.
pub fn update_fireballs(state: &mut GameState) {
    let playfield = state.playfield;
    let fireballs = std::mem::take(&mut state.fireballs);
    let mut survivors = Vec::with_capacity(fireballs.len());

    for mut fireball in fireballs {
        // Degenerate heading: leave it where it is this frame
        if let Some(vel) = fireball.velocity() {
            fireball.pos += vel;
        }
        if out_of_bounds(fireball.pos, playfield) {
            continue;
        }

        if hits(&fireball, &state.player) {
            state.player.lives -= 1;
            state.events.push(GameEvent::PlayerHit {
                damage: 1,
                lives: state.player.lives,
            });
            continue;
        }
        survivors.push(fireball);
    }

    state.fireballs = survivors;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::levels::Level;
    use crate::sim::state::Direction;

    fn field() -> Vec2 {
        Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT)
    }

    fn level(n: u8) -> GameState {
        GameState::new(Level::new(n).unwrap(), field(), 0.0, 42)
    }

    fn fireball(pos: Vec2, heading: Vec2, damage: Option<i32>) -> Fireball {
        Fireball {
            pos,
            size: Vec2::splat(FIREBALL_SIZE),
            speed: 4.0,
            heading,
            damage,
        }
    }

    #[test]
    fn test_shot_cooldown() {
        let mut state = level(1);
        assert!(shoot(&mut state, 0.0));
        assert!(!shoot(&mut state, 999.0));
        assert!(shoot(&mut state, 1000.0));
        assert_eq!(state.arrows.len(), 2);
    }

    #[test]
    fn test_arrow_inherits_facing() {
        let mut state = level(1);
        state.player.direction = Direction::Up;
        shoot(&mut state, 0.0);
        let arrow = &state.arrows[0];
        assert_eq!(arrow.motion, ArrowMotion::Cardinal(Direction::Up));
        assert_eq!(arrow.pos, state.player.center());
        assert_eq!(arrow.velocity(), Vec2::new(0.0, -PROJECTILE_SPEED));
    }

    #[test]
    fn test_auto_aim_level_ignores_manual_shots() {
        let mut state = level(10);
        assert!(!shoot(&mut state, 0.0));
        assert!(state.arrows.is_empty());
    }

    #[test]
    fn test_auto_shot_targets_nearest_live_enemy() {
        let mut state = level(10);
        for (i, enemy) in state.enemies.iter_mut().enumerate() {
            enemy.pos = Vec2::new(300.0 + i as f32 * 100.0, 300.0);
        }
        // Nearest one is already down
        state.enemies[0].health = 0;

        assert!(auto_shoot(&mut state, 0.0));
        let ArrowMotion::Aimed(unit) = state.arrows[0].motion else {
            panic!("auto shot should be aimed");
        };
        let expected = direction_to(state.player.center(), state.enemies[1].center()).unwrap();
        assert!((unit - expected).length() < 1e-5);
        assert!((unit.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_auto_shot_interval() {
        let mut state = level(10);
        assert!(auto_shoot(&mut state, 0.0));
        assert!(!auto_shoot(&mut state, 499.0));
        assert!(auto_shoot(&mut state, 500.0));
    }

    #[test]
    fn test_arrow_culled_off_field() {
        let mut state = level(1);
        state.arrows.push(arrow_from(Vec2::new(field().x - 1.0, 10.0), ArrowMotion::Cardinal(Direction::Right)));
        update_arrows(&mut state, 0.0);
        assert!(state.arrows.is_empty());
    }

    #[test]
    fn test_single_hit_defeats_level_one_enemy() {
        let mut state = level(1);
        let enemy_pos = state.enemies[0].pos;
        state.arrows.push(arrow_from(enemy_pos - Vec2::new(10.0, -8.0), ArrowMotion::Cardinal(Direction::Right)));
        update_arrows(&mut state, 0.0);
        assert!(state.arrows.is_empty());
        assert!(state.all_enemies_defeated());
        assert!(state.events.contains(&GameEvent::EnemyDefeated { enemy_id: state.enemies[0].id }));
    }

    #[test]
    fn test_heavy_arrows_take_four_hits() {
        let mut state = level(5);
        assert_eq!(state.enemies[0].health, 10);
        let mut healths = Vec::new();
        for _ in 0..4 {
            let enemy_pos = state.enemies[0].pos;
            state.arrows.push(arrow_from(enemy_pos, ArrowMotion::Cardinal(Direction::Right)));
            update_arrows(&mut state, 0.0);
            healths.push(state.enemies[0].health);
        }
        assert_eq!(healths, vec![7, 4, 1, -2]);
        assert!(state.all_enemies_defeated());
    }

    #[test]
    fn test_shield_absorbs_outside_window() {
        let mut state = level(8);
        let enemy_pos = state.enemies[0].pos;
        state.enemies[0].last_shot = Some(0.0);

        state.arrows.push(arrow_from(enemy_pos, ArrowMotion::Cardinal(Direction::Right)));
        update_arrows(&mut state, 1200.0);
        assert_eq!(state.enemies[0].health, 3);
        assert!(state.arrows.is_empty());

        state.arrows.push(arrow_from(enemy_pos, ArrowMotion::Cardinal(Direction::Right)));
        update_arrows(&mut state, 500.0);
        assert_eq!(state.enemies[0].health, 2);
    }

    #[test]
    fn test_shield_up_before_first_shot() {
        let mut state = level(8);
        let enemy_pos = state.enemies[0].pos;
        state.arrows.push(arrow_from(enemy_pos, ArrowMotion::Cardinal(Direction::Right)));
        update_arrows(&mut state, 100.0);
        assert_eq!(state.enemies[0].health, 3);
    }

    #[test]
    fn test_dead_enemies_do_not_stop_arrows() {
        let mut state = level(10);
        state.enemies[0].health = 0;
        let pos = state.enemies[0].pos;
        for enemy in state.enemies.iter_mut().skip(1) {
            enemy.pos = Vec2::new(10.0, 10.0);
        }
        state.arrows.push(arrow_from(pos, ArrowMotion::Cardinal(Direction::Down)));
        update_arrows(&mut state, 0.0);
        assert_eq!(state.arrows.len(), 1);
    }

    #[test]
    fn test_fireball_keeps_spawn_heading() {
        let mut state = level(1);
        state.fireballs.push(fireball(Vec2::new(400.0, 100.0), Vec2::new(30.0, 40.0), None));
        update_fireballs(&mut state);
        // Player moves; the fireball does not re-aim
        state.player.pos = Vec2::new(700.0, 20.0);
        update_fireballs(&mut state);
        let pos = state.fireballs[0].pos;
        assert!((pos - Vec2::new(400.0 + 2.0 * 2.4, 100.0 + 2.0 * 3.2)).length() < 1e-4);
    }

    #[test]
    fn test_fireball_hit_costs_one_life_regardless_of_tag() {
        let mut state = level(9);
        let lives = state.player.lives;
        let at = state.player.pos;
        state.fireballs.push(fireball(at, Vec2::X, Some(5)));
        update_fireballs(&mut state);
        assert_eq!(state.player.lives, lives - 1);
        assert!(state.fireballs.is_empty());
    }

    #[test]
    fn test_degenerate_fireball_stays_finite() {
        let mut state = level(1);
        state.fireballs.push(fireball(Vec2::new(400.0, 100.0), Vec2::ZERO, None));
        update_fireballs(&mut state);
        assert_eq!(state.fireballs[0].pos, Vec2::new(400.0, 100.0));
    }

    #[test]
    fn test_burst_spreads_three_ways() {
        let mut state = level(9);
        state.config.attack = AttackPattern::Burst { chance: 1.0, speed: 5.0 };
        spawn_fireballs(&mut state, 0.0);
        assert_eq!(state.fireballs.len(), 3);

        let to_player = (state.player.pos - state.enemies[0].pos).normalize();
        let headings: Vec<Vec2> = state.fireballs.iter().map(|f| f.heading).collect();
        assert!((headings[0] - to_player).length() < 1e-5);
        for pair in [(0, 1), (1, 2), (2, 0)] {
            let cos = headings[pair.0].dot(headings[pair.1]);
            // 120° apart
            assert!((cos + 0.5).abs() < 1e-4);
        }
        assert!(state.fireballs.iter().all(|f| f.damage == Some(1)));
        assert_eq!(state.enemies[0].last_shot, Some(0.0));
    }

    #[test]
    fn test_aimed_shot_opens_counterattack_window() {
        let mut state = level(8);
        state.config.attack = AttackPattern::Aimed { chance: 1.0, speed: 10.0 };
        spawn_fireballs(&mut state, 2500.0);
        assert_eq!(state.fireballs.len(), 1);
        assert_eq!(state.fireballs[0].heading, state.player.pos - state.enemies[0].pos);
        assert!(state.enemies[0].counterattack_open(3000.0));
    }

    #[test]
    fn test_no_fireballs_on_quiet_levels() {
        let mut state = level(2);
        for frame in 0..500 {
            spawn_fireballs(&mut state, frame as f64 * FRAME_MS);
        }
        assert!(state.fireballs.is_empty());
    }

    fn fire_rate(mut state: GameState, frames: usize) -> f64 {
        let shooters = state.enemies.len();
        for frame in 0..frames {
            spawn_fireballs(&mut state, frame as f64 * FRAME_MS);
            state.fireballs.clear();
        }
        let fired = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyFired { .. }))
            .count();
        fired as f64 / (frames * shooters) as f64
    }

    #[test]
    fn test_aimed_fire_rates() {
        let rate = fire_rate(level(1), 10_000);
        assert!((rate - 0.02).abs() < 0.005, "level 1 rate {rate}");
        let rate = fire_rate(level(5), 20_000);
        assert!((rate - 0.01).abs() < 0.003, "level 5 rate {rate}");
    }

    #[test]
    fn test_burst_fire_rates() {
        let rate = fire_rate(level(9), 10_000);
        assert!((rate - 0.02).abs() < 0.005, "level 9 rate {rate}");
        // Five swarm enemies roll separately
        let rate = fire_rate(level(10), 4_000);
        assert!((rate - 0.01).abs() < 0.003, "level 10 rate {rate}");
    }
}
