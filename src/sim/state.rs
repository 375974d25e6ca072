//! Game state and core simulation types
//!
//! Plain data records for every sprite on the field, plus the per-run
//! `GameState` that owns them.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Hitbox};
use super::hazard;
use super::levels::{Level, LevelConfig};
use crate::consts::*;

/// Facing / travel direction on screen (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    #[default]
    Right,
}

impl Direction {
    /// Unit step for this direction in screen space
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::NEG_Y,
            Direction::Down => Vec2::Y,
            Direction::Left => Vec2::NEG_X,
            Direction::Right => Vec2::X,
        }
    }

    /// Sprite rotation for rendering (radians, 0 = facing right)
    pub fn angle(self) -> f32 {
        use std::f32::consts::{FRAC_PI_2, PI};
        match self {
            Direction::Right => 0.0,
            Direction::Left => PI,
            Direction::Up => -FRAC_PI_2,
            Direction::Down => FRAC_PI_2,
        }
    }
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Every enemy is down
    Victory,
    /// Player ran out of lives
    GameOver,
}

/// The player-controlled archer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    /// Remaining hit points; the run ends at zero or below
    pub lives: i32,
    pub direction: Direction,
    /// Timestamp of the last accepted manual shot (ms)
    pub last_shot: Option<f64>,
    /// Timestamp of the last automatic shot (ms, auto-aim levels only)
    pub last_auto_shot: Option<f64>,
}

impl Player {
    pub fn new(lives: i32, playfield: Vec2) -> Self {
        Self {
            pos: Vec2::new(PLAYER_SPAWN_X, playfield.y / 2.0),
            size: Vec2::splat(PLAYER_SIZE),
            speed: PLAYER_SPEED,
            lives,
            direction: Direction::Right,
            last_shot: None,
            last_auto_shot: None,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Whether the manual shot cooldown has elapsed at `now`
    pub fn shot_ready(&self, now: f64) -> bool {
        self.last_shot.is_none_or(|t| now - t >= SHOT_COOLDOWN_MS)
    }

    /// Whether the automatic shot interval has elapsed at `now`
    pub fn auto_shot_ready(&self, now: f64) -> bool {
        self.last_auto_shot.is_none_or(|t| now - t >= AUTO_SHOT_INTERVAL_MS)
    }

    pub fn is_defeated(&self) -> bool {
        self.lives <= 0
    }
}

impl Hitbox for Player {
    fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// An in-progress dodge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dodge {
    /// Up or Down
    pub direction: Direction,
    /// When the dodge ends (ms)
    pub until: f64,
}

/// An enemy sprite
///
/// Behavior-state fields are only touched by the policies that use them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub health: i32,
    /// Patrol heading: 1.0 = down, -1.0 = up
    pub patrol_direction: f32,
    /// Active dodge, if any
    pub dodge: Option<Dodge>,
    /// Earliest time another dodge may start (ms)
    pub dodge_ready_at: Option<f64>,
    /// Mode-switching chase: currently chasing
    pub chase_mode: bool,
    /// Frames spent in the current chase/patrol mode
    pub mode_frames: u32,
    pub last_teleport: Option<f64>,
    /// Timestamp of this enemy's last fireball (ms)
    pub last_shot: Option<f64>,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, speed: f32, health: i32) -> Self {
        Self {
            id,
            pos,
            size: Vec2::splat(ENEMY_SIZE),
            speed,
            health,
            patrol_direction: 1.0,
            dodge: None,
            dodge_ready_at: None,
            chase_mode: true,
            mode_frames: 0,
            last_teleport: None,
            last_shot: None,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_dodging(&self) -> bool {
        self.dodge.is_some()
    }

    /// Whether a dodge may start at `now`
    pub fn dodge_ready(&self, now: f64) -> bool {
        !self.is_dodging() && self.dodge_ready_at.is_none_or(|t| now >= t)
    }

    /// Whether the counterattack window after this enemy's own shot is open
    pub fn counterattack_open(&self, now: f64) -> bool {
        self.last_shot.is_some_and(|t| now - t <= SHIELD_WINDOW_MS)
    }

    /// Whether the teleport interval has elapsed at `now`
    pub fn teleport_ready(&self, now: f64) -> bool {
        self.last_teleport.is_none_or(|t| now - t >= TELEPORT_INTERVAL_MS)
    }
}

impl Hitbox for Enemy {
    fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// How an arrow travels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ArrowMotion {
    /// Straight along the shooter's facing
    Cardinal(Direction),
    /// Along a unit vector (auto-aimed)
    Aimed(Vec2),
}

/// A player projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arrow {
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub motion: ArrowMotion,
}

impl Arrow {
    /// Displacement per frame
    pub fn velocity(&self) -> Vec2 {
        match self.motion {
            ArrowMotion::Cardinal(direction) => direction.unit() * self.speed,
            ArrowMotion::Aimed(unit) => unit * self.speed,
        }
    }

    /// Heading angle for rendering
    pub fn angle(&self) -> f32 {
        match self.motion {
            ArrowMotion::Cardinal(direction) => direction.angle(),
            ArrowMotion::Aimed(unit) => unit.y.atan2(unit.x),
        }
    }
}

impl Hitbox for Arrow {
    fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// An enemy projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fireball {
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    /// Offset toward the target captured at spawn; never re-aimed
    pub heading: Vec2,
    /// Damage tag set by bursts; hits always cost one life
    pub damage: Option<i32>,
}

impl Fireball {
    /// Displacement per frame, or `None` when the heading is degenerate
    pub fn velocity(&self) -> Option<Vec2> {
        let distance = self.heading.length();
        (distance > 0.0).then(|| self.heading / distance * self.speed)
    }
}

impl Hitbox for Fireball {
    fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// A bouncing TNT hazard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub damage: i32,
    pub speed: f32,
    /// Heading angle (radians)
    pub angle: f32,
    /// Frames since spawn, drives periodic heading changes
    pub turn_counter: u32,
}

impl Hazard {
    pub fn new(id: u32, pos: Vec2, angle: f32) -> Self {
        Self {
            id,
            pos,
            size: Vec2::splat(HAZARD_SIZE),
            damage: HAZARD_DAMAGE,
            speed: HAZARD_SPEED,
            angle,
            turn_counter: 0,
        }
    }

    /// Displacement per frame
    pub fn velocity(&self) -> Vec2 {
        crate::heading_vector(self.angle) * self.speed
    }
}

impl Hitbox for Hazard {
    fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Things that happened during a tick, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ArrowFired { auto: bool },
    EnemyHit { enemy_id: u32, health: i32 },
    /// Shielded enemy took an arrow without damage
    HitAbsorbed { enemy_id: u32 },
    EnemyDefeated { enemy_id: u32 },
    EnemyDodged { enemy_id: u32, direction: Direction },
    EnemyTeleported { enemy_id: u32 },
    EnemyFired { enemy_id: u32, count: usize },
    PlayerHit { damage: i32, lives: i32 },
    HazardSpawned { hazard_id: u32 },
    Victory,
    GameOver,
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    pub level: Level,
    pub config: LevelConfig,
    /// Playfield dimensions (pixels)
    pub playfield: Vec2,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub arrows: Vec<Arrow>,
    pub fireballs: Vec<Fireball>,
    pub hazards: Vec<Hazard>,
    pub phase: GamePhase,
    /// Frames simulated so far
    pub frame: u64,
    /// Wall-clock time the run started (ms)
    pub started_at: f64,
    /// Last time a hazard was added (ms)
    pub last_hazard_spawn: f64,
    /// Events produced since the host last drained them
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create the starting state for `level`
    pub fn new(level: Level, playfield: Vec2, now: f64, seed: u64) -> Self {
        let config = LevelConfig::for_level(level);
        let mut state = Self {
            level,
            config,
            playfield,
            player: Player::new(config.player_lives, playfield),
            enemies: Vec::with_capacity(config.enemy_count),
            arrows: Vec::new(),
            fireballs: Vec::new(),
            hazards: Vec::new(),
            phase: GamePhase::Playing,
            frame: 0,
            started_at: now,
            last_hazard_spawn: now,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };

        state.spawn_enemies(now);

        if config.hazards {
            for _ in 0..HAZARD_INITIAL_COUNT {
                hazard::spawn(&mut state);
            }
        }

        log::info!(
            "Level {} started: {:?} x{}, enemy hp {}, lives {}",
            level,
            config.policy,
            config.enemy_count,
            config.enemy_health,
            config.player_lives
        );

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn spawn_enemies(&mut self, now: f64) {
        let count = self.config.enemy_count;
        let anchor_x = self.playfield.x - ENEMY_RIGHT_INSET;

        for i in 0..count {
            let id = self.next_entity_id();
            let pos = if count == 1 {
                Vec2::new(anchor_x, self.playfield.y / 2.0)
            } else {
                // Staggered column on the right side
                let x = anchor_x - (i % 2) as f32 * 80.0;
                let y = self.playfield.y * (i + 1) as f32 / (count + 1) as f32 - ENEMY_SIZE / 2.0;
                Vec2::new(x, y)
            };

            let mut enemy = Enemy::new(id, pos, self.config.enemy_speed, self.config.enemy_health);
            if self.config.policy.teleports() {
                // Offset timers so a swarm does not jump in unison
                enemy.last_teleport = Some(now + i as f64 * TELEPORT_INTERVAL_MS / count as f64);
            }
            self.enemies.push(enemy);
        }
    }

    /// Whether every enemy is down
    pub fn all_enemies_defeated(&self) -> bool {
        self.enemies.iter().all(|e| !e.is_alive())
    }

    /// Enemies still in combat
    pub fn live_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.is_alive())
    }

    /// Whether the run has ended
    pub fn is_over(&self) -> bool {
        self.phase != GamePhase::Playing
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playfield() -> Vec2 {
        Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT)
    }

    #[test]
    fn test_new_level_one() {
        let state = GameState::new(Level::FIRST, playfield(), 0.0, 1);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].health, 1);
        assert_eq!(state.enemies[0].pos, Vec2::new(730.0, 300.0));
        assert_eq!(state.player.pos, Vec2::new(50.0, 300.0));
        assert_eq!(state.player.lives, 1);
        assert!(state.hazards.is_empty());
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_hazard_levels_start_with_two() {
        for n in [4, 5] {
            let state = GameState::new(Level::new(n).unwrap(), playfield(), 0.0, 7);
            assert_eq!(state.hazards.len(), HAZARD_INITIAL_COUNT);
        }
    }

    #[test]
    fn test_swarm_spawns_five_distinct_enemies() {
        let state = GameState::new(Level::LAST, playfield(), 0.0, 3);
        assert_eq!(state.enemies.len(), 5);
        let mut ids: Vec<u32> = state.enemies.iter().map(|e| e.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 5);
        assert!(state.enemies.iter().all(|e| e.health == 10));
    }

    #[test]
    fn test_shot_cooldown_boundary() {
        let mut player = Player::new(1, playfield());
        assert!(player.shot_ready(0.0));
        player.last_shot = Some(0.0);
        assert!(!player.shot_ready(999.0));
        assert!(player.shot_ready(1000.0));
    }

    #[test]
    fn test_counterattack_window() {
        let mut enemy = Enemy::new(1, Vec2::ZERO, 4.0, 3);
        assert!(!enemy.counterattack_open(0.0));
        enemy.last_shot = Some(1000.0);
        assert!(enemy.counterattack_open(1500.0));
        assert!(!enemy.counterattack_open(2200.0));
    }

    #[test]
    fn test_degenerate_fireball_has_no_velocity() {
        let fireball = Fireball {
            pos: Vec2::ZERO,
            size: Vec2::splat(FIREBALL_SIZE),
            speed: 4.0,
            heading: Vec2::ZERO,
            damage: None,
        };
        assert!(fireball.velocity().is_none());
    }
}
