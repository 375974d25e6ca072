//! Level progression
//!
//! Tracks which level the player is on across runs:
//!
//! ```text
//! Idle(L) --start--> Running(L) --conclude--> Victory(L) --settle--> Idle(L+1)
//!                                         \                \-> Complete (after 10)
//!                                          \-> Defeat(L) --settle--> Idle(L)
//! ```
//!
//! Durable writes are queued and flushed by the host after the frame, so a
//! slow or failing store never stalls the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::persistence::{self, LevelStore};
use crate::sim::{GamePhase, GameState, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressionState {
    /// Waiting to start the given level
    Idle(Level),
    /// A run of the given level is in progress
    Running(Level),
    /// The given level was just cleared
    Victory(Level),
    /// The run of the given level was lost
    Defeat(Level),
    /// All ten levels cleared; the next run starts at level 1
    Complete,
}

/// Lifecycle signals for the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    GameOver,
    Victory { next_level: Level },
    LevelSwitchRequested(Level),
}

#[derive(Debug, Clone)]
pub struct Progression {
    state: ProgressionState,
    /// Level waiting to be written to the store
    pending: Option<Level>,
}

impl Progression {
    pub fn new(level: Level) -> Self {
        Self {
            state: ProgressionState::Idle(level),
            pending: None,
        }
    }

    /// Pick up where the saved level left off
    pub fn resume<S: LevelStore + ?Sized>(store: &S) -> Self {
        Self::new(persistence::load_level(store))
    }

    pub fn state(&self) -> ProgressionState {
        self.state
    }

    /// Level that is running or will run next
    pub fn level(&self) -> Level {
        match self.state {
            ProgressionState::Idle(level)
            | ProgressionState::Running(level)
            | ProgressionState::Victory(level)
            | ProgressionState::Defeat(level) => level,
            ProgressionState::Complete => Level::FIRST,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, ProgressionState::Running(_))
    }

    /// Begin a run of the current level
    ///
    /// Returns `None` unless idle.
    pub fn start(&mut self, playfield: Vec2, now: f64, seed: u64) -> Option<GameState> {
        let level = match self.state {
            ProgressionState::Idle(level) => level,
            ProgressionState::Complete => Level::FIRST,
            other => {
                log::warn!("Cannot start a run from {:?}", other);
                return None;
            }
        };

        self.state = ProgressionState::Running(level);
        Some(GameState::new(level, playfield, now, seed))
    }

    /// Record how the running level ended
    ///
    /// Returns the signal for the UI, or `None` if nothing ended.
    pub fn conclude(&mut self, phase: GamePhase) -> Option<Signal> {
        let ProgressionState::Running(level) = self.state else {
            return None;
        };

        match phase {
            GamePhase::Playing => None,
            GamePhase::Victory => {
                let next_level = level.next();
                self.state = ProgressionState::Victory(level);
                self.pending = Some(next_level);
                log::info!("Victory on level {}, next level {}", level, next_level);
                Some(Signal::Victory { next_level })
            }
            GamePhase::GameOver => {
                self.state = ProgressionState::Defeat(level);
                log::info!("Defeat on level {}", level);
                Some(Signal::GameOver)
            }
        }
    }

    /// Move from a finished run back to idle
    pub fn settle(&mut self) {
        self.state = match self.state {
            ProgressionState::Victory(level) if level.is_last() => {
                log::info!("All levels cleared");
                ProgressionState::Complete
            }
            ProgressionState::Victory(level) => ProgressionState::Idle(level.next()),
            ProgressionState::Defeat(level) => ProgressionState::Idle(level),
            other => other,
        };
    }

    /// External level-select override
    ///
    /// Abandons any run in progress.
    pub fn select_level(&mut self, level: Level) -> Signal {
        if self.is_running() {
            log::info!("Abandoning level {} for level {}", self.level(), level);
        }
        self.state = ProgressionState::Idle(level);
        self.pending = Some(level);
        Signal::LevelSwitchRequested(level)
    }

    /// Level queued for the store, if any
    pub fn pending_write(&self) -> Option<Level> {
        self.pending
    }

    /// Apply the queued write; failures are logged and dropped
    pub fn flush<S: LevelStore + ?Sized>(&mut self, store: &mut S) {
        if let Some(level) = self.pending.take() {
            persistence::save_level(store, level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::persistence::MemoryStore;
    use crate::sim::{GameEvent, TickInput, tick};

    fn field() -> Vec2 {
        Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT)
    }

    fn finish(progression: &mut Progression, phase: GamePhase) -> Option<Signal> {
        progression.start(field(), 0.0, 1)?;
        progression.conclude(phase)
    }

    #[test]
    fn test_victory_advances_and_persists() {
        for n in 1..10 {
            let mut store = MemoryStore::new();
            let mut progression = Progression::new(Level::new(n).unwrap());
            let signal = finish(&mut progression, GamePhase::Victory);
            let next = Level::new(n + 1).unwrap();

            assert_eq!(signal, Some(Signal::Victory { next_level: next }));
            progression.flush(&mut store);
            progression.settle();

            assert_eq!(store.peek(), Some(n + 1));
            assert_eq!(progression.state(), ProgressionState::Idle(next));
        }
    }

    #[test]
    fn test_last_level_loops_to_first() {
        let mut store = MemoryStore::with_level(10);
        let mut progression = Progression::resume(&store);
        let signal = finish(&mut progression, GamePhase::Victory);
        assert_eq!(signal, Some(Signal::Victory { next_level: Level::FIRST }));

        progression.flush(&mut store);
        progression.settle();
        assert_eq!(store.peek(), Some(1));
        assert_eq!(progression.state(), ProgressionState::Complete);
        assert_eq!(progression.level(), Level::FIRST);

        let state = progression.start(field(), 0.0, 1).unwrap();
        assert_eq!(state.level, Level::FIRST);
    }

    #[test]
    fn test_defeat_retries_same_level() {
        let mut store = MemoryStore::with_level(6);
        let mut progression = Progression::resume(&store);
        assert_eq!(finish(&mut progression, GamePhase::GameOver), Some(Signal::GameOver));
        assert_eq!(progression.state(), ProgressionState::Defeat(Level::new(6).unwrap()));
        assert_eq!(progression.pending_write(), None);

        progression.flush(&mut store);
        progression.settle();
        assert_eq!(store.peek(), Some(6));
        assert_eq!(progression.state(), ProgressionState::Idle(Level::new(6).unwrap()));
    }

    #[test]
    fn test_playing_phase_concludes_nothing() {
        let mut progression = Progression::new(Level::FIRST);
        assert_eq!(finish(&mut progression, GamePhase::Playing), None);
        assert!(progression.is_running());
    }

    #[test]
    fn test_cannot_start_twice() {
        let mut progression = Progression::new(Level::FIRST);
        assert!(progression.start(field(), 0.0, 1).is_some());
        assert!(progression.start(field(), 0.0, 1).is_none());
    }

    #[test]
    fn test_is_running_tracks_lifecycle() {
        let mut progression = Progression::new(Level::FIRST);
        assert!(!progression.is_running());
        progression.start(field(), 0.0, 1);
        assert!(progression.is_running());
        progression.conclude(GamePhase::GameOver);
        assert!(!progression.is_running());
        progression.settle();
        assert!(!progression.is_running());
        assert!(progression.start(field(), 0.0, 2).is_some());
    }

    #[test]
    fn test_select_level_overrides_slot() {
        let mut store = MemoryStore::with_level(2);
        let mut progression = Progression::resume(&store);
        progression.start(field(), 0.0, 1);

        let level = Level::new(8).unwrap();
        assert_eq!(progression.select_level(level), Signal::LevelSwitchRequested(level));
        assert_eq!(progression.state(), ProgressionState::Idle(level));
        progression.flush(&mut store);
        assert_eq!(store.peek(), Some(8));
    }

    #[test]
    fn test_failed_store_keeps_progress_in_memory() {
        let mut store = MemoryStore::new();
        store.fail = true;
        let mut progression = Progression::resume(&store);
        assert_eq!(progression.level(), Level::FIRST);

        finish(&mut progression, GamePhase::Victory);
        progression.flush(&mut store);
        progression.settle();

        assert_eq!(progression.pending_write(), None);
        assert_eq!(progression.level().get(), 2);
        assert_eq!(store.peek(), None);
    }

    #[test]
    fn test_level_one_stand_and_shoot() {
        let mut store = MemoryStore::new();
        let mut progression = Progression::resume(&store);
        let mut state = progression.start(field(), 0.0, 77).unwrap();
        assert_eq!(state.enemies[0].health, 1);
        // A standing player only hits along its own row, so the patrol is
        // parked on that row
        state.enemies[0].speed = 0.0;
        // Level 1 still fires aimed shots at 2% per frame; spare lives keep
        // a stray fireball from ending the run before the arrow lands
        state.player.lives = 1000;

        let mut now = 0.0;
        let mut signals = Vec::new();
        for _ in 0..600 {
            now += FRAME_MS;
            tick(&mut state, &TickInput { shoot: true, now, ..Default::default() });
            if let Some(signal) = progression.conclude(state.phase) {
                signals.push(signal);
                progression.flush(&mut store);
                progression.settle();
            }
        }

        let events = state.drain_events();
        let victories = events.iter().filter(|e| **e == GameEvent::Victory).count();
        assert_eq!(victories, 1);
        assert!(!events.contains(&GameEvent::GameOver));
        assert_eq!(state.phase, GamePhase::Victory);

        // Every life lost went to a fireball, one apiece
        let hits = events.iter().filter(|e| matches!(e, GameEvent::PlayerHit { .. })).count();
        assert_eq!(state.player.lives, 1000 - hits as i32);
        assert!(state.player.lives > 0);
        assert_eq!(signals, vec![Signal::Victory { next_level: Level::new(2).unwrap() }]);
        assert_eq!(store.peek(), Some(2));
        assert_eq!(progression.state(), ProgressionState::Idle(Level::new(2).unwrap()));
    }
}
