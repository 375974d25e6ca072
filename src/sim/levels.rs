//! Level table
//!
//! Consolidates per-level parameters: which enemy behavior runs, how tough
//! the enemy is, what it shoots, and whether TNT roams the field.

use serde::{Deserialize, Serialize};

/// A level number in `1..=10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const FIRST: Level = Level(1);
    pub const LAST: Level = Level(10);

    /// Build a level from a raw number, rejecting anything outside `1..=10`
    pub fn new(n: u8) -> Option<Self> {
        (Self::FIRST.0..=Self::LAST.0).contains(&n).then_some(Level(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Next level, looping back to 1 after the last
    pub fn next(self) -> Self {
        if self == Self::LAST {
            Self::FIRST
        } else {
            Level(self.0 + 1)
        }
    }

    pub fn is_last(self) -> bool {
        self == Self::LAST
    }

    /// All levels in order
    pub fn all() -> impl Iterator<Item = Level> {
        (Self::FIRST.0..=Self::LAST.0).map(Level)
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Level::new(n).ok_or_else(|| format!("level {n} out of range 1..=10"))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.0
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Enemy behavior variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Policy {
    /// Vertical patrol with horizontal easing; dodges nearby arrows
    PatrolDodge,
    /// Runs straight at the player and crushes on contact
    DirectChase,
    /// Alternates between chasing and vertical patrol
    ModeSwitchChase,
    /// Patrol that only takes damage right after its own shot
    ShieldedPatrol,
    /// Periodic teleport plus three-way bursts
    TeleportBurst,
    /// Several teleporting enemies at once
    Swarm,
}

impl Policy {
    /// Whether this behavior reacts to player shots by dodging
    pub fn dodges(self) -> bool {
        matches!(self, Policy::PatrolDodge)
    }

    /// Whether this behavior absorbs hits outside its counterattack window
    pub fn shielded(self) -> bool {
        matches!(self, Policy::ShieldedPatrol)
    }

    /// Whether this behavior teleports
    pub fn teleports(self) -> bool {
        matches!(self, Policy::TeleportBurst | Policy::Swarm)
    }
}

/// How the enemy shoots back
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackPattern {
    /// Never fires
    None,
    /// One fireball aimed at the player
    Aimed { chance: f64, speed: f32 },
    /// Three fireballs, 120° apart, one of them aimed at the player
    Burst { chance: f64, speed: f32 },
}

/// Parameters for one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub level: Level,
    pub policy: Policy,
    /// Number of enemies on the field
    pub enemy_count: usize,
    /// Starting health per enemy
    pub enemy_health: i32,
    /// Enemy movement speed (pixels/frame)
    pub enemy_speed: f32,
    /// Health removed by one arrow
    pub arrow_damage: i32,
    /// Player starting lives
    pub player_lives: i32,
    /// Lives lost when a chasing enemy makes contact
    pub contact_damage: i32,
    pub attack: AttackPattern,
    /// Whether TNT hazards roam the field
    pub hazards: bool,
    /// Whether arrows are aimed automatically instead of fired by hand
    pub auto_aim: bool,
}

impl LevelConfig {
    /// Look up the configuration for a level
    pub fn for_level(level: Level) -> Self {
        let base = LevelConfig {
            level,
            policy: Policy::PatrolDodge,
            enemy_count: 1,
            enemy_health: 1,
            enemy_speed: 4.0,
            arrow_damage: 1,
            player_lives: 1,
            contact_damage: 0,
            attack: AttackPattern::None,
            hazards: false,
            auto_aim: false,
        };

        match level.get() {
            1 => LevelConfig {
                attack: AttackPattern::Aimed { chance: 0.02, speed: 4.0 },
                ..base
            },
            2 => LevelConfig {
                policy: Policy::DirectChase,
                enemy_health: 2,
                enemy_speed: 1.5,
                contact_damage: 1,
                ..base
            },
            3 => LevelConfig {
                policy: Policy::DirectChase,
                enemy_health: 3,
                enemy_speed: 2.0,
                contact_damage: 1,
                ..base
            },
            4 => LevelConfig {
                enemy_health: 3,
                player_lives: 5,
                hazards: true,
                ..base
            },
            5 => LevelConfig {
                policy: Policy::ModeSwitchChase,
                enemy_health: 10,
                enemy_speed: 2.5,
                arrow_damage: 3,
                player_lives: 5,
                contact_damage: 3,
                attack: AttackPattern::Aimed { chance: 0.01, speed: 4.0 },
                hazards: true,
                ..base
            },
            6 => LevelConfig {
                enemy_health: 4,
                enemy_speed: 5.0,
                attack: AttackPattern::Aimed { chance: 0.02, speed: 6.0 },
                ..base
            },
            7 => LevelConfig {
                enemy_health: 5,
                enemy_speed: 6.0,
                attack: AttackPattern::Aimed { chance: 0.02, speed: 6.0 },
                ..base
            },
            8 => LevelConfig {
                policy: Policy::ShieldedPatrol,
                enemy_health: 3,
                attack: AttackPattern::Aimed { chance: 0.02, speed: 10.0 },
                ..base
            },
            9 => LevelConfig {
                policy: Policy::TeleportBurst,
                enemy_health: 5,
                enemy_speed: 0.0,
                player_lives: 3,
                attack: AttackPattern::Burst { chance: 0.02, speed: 5.0 },
                ..base
            },
            _ => LevelConfig {
                policy: Policy::Swarm,
                enemy_count: crate::consts::SWARM_SIZE,
                enemy_health: 10,
                enemy_speed: 0.0,
                arrow_damage: 3,
                player_lives: 10,
                attack: AttackPattern::Burst { chance: 0.01, speed: 5.0 },
                auto_aim: true,
                ..base
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_range() {
        assert!(Level::new(0).is_none());
        assert!(Level::new(11).is_none());
        assert_eq!(Level::new(7).map(Level::get), Some(7));
        assert_eq!(Level::all().count(), 10);
    }

    #[test]
    fn test_next_loops_after_last() {
        assert_eq!(Level::FIRST.next().get(), 2);
        assert_eq!(Level::LAST.next(), Level::FIRST);
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<Level>("0").is_err());
        assert_eq!(serde_json::from_str::<Level>("4").ok(), Level::new(4));
    }

    #[test]
    fn test_policy_mapping() {
        let policy = |n| LevelConfig::for_level(Level::new(n).unwrap()).policy;
        for n in [1, 4, 6, 7] {
            assert_eq!(policy(n), Policy::PatrolDodge);
        }
        assert_eq!(policy(2), Policy::DirectChase);
        assert_eq!(policy(3), Policy::DirectChase);
        assert_eq!(policy(5), Policy::ModeSwitchChase);
        assert_eq!(policy(8), Policy::ShieldedPatrol);
        assert_eq!(policy(9), Policy::TeleportBurst);
        assert_eq!(policy(10), Policy::Swarm);
    }

    #[test]
    fn test_player_lives_table() {
        for level in Level::all() {
            let expected = match level.get() {
                4 | 5 => 5,
                9 => 3,
                10 => 10,
                _ => 1,
            };
            assert_eq!(LevelConfig::for_level(level).player_lives, expected, "level {level}");
        }
    }

    #[test]
    fn test_enemy_health_in_range() {
        for level in Level::all() {
            let config = LevelConfig::for_level(level);
            assert!((1..=10).contains(&config.enemy_health));
        }
    }

    #[test]
    fn test_hazard_levels() {
        let with_hazards: Vec<u8> = Level::all()
            .filter(|l| LevelConfig::for_level(*l).hazards)
            .map(Level::get)
            .collect();
        assert_eq!(with_hazards, vec![4, 5]);
    }

    #[test]
    fn test_swarm_level() {
        let config = LevelConfig::for_level(Level::LAST);
        assert_eq!(config.enemy_count, 5);
        assert!(config.auto_aim);
        assert!(matches!(config.attack, AttackPattern::Burst { chance, .. } if chance == 0.01));
    }
}
