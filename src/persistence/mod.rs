//! Saved level slot
//!
//! The only durable state is the level the player is on. Stores are
//! best-effort: a failed read resumes at level 1 and a failed write is
//! logged and dropped.

use thiserror::Error;

use crate::sim::Level;

/// LocalStorage key for the saved level
pub const LEVEL_KEY: &str = "arrow_duel_level";

/// Why a store could not read or write the level slot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("saved level is not a number: {0:?}")]
    Corrupt(String),
}

/// A key-value slot holding the current level number
pub trait LevelStore {
    /// Read the saved level, `None` if nothing was saved yet
    fn get(&self) -> Result<Option<u8>, StoreError>;
    /// Overwrite the saved level
    fn set(&mut self, level: u8) -> Result<(), StoreError>;
}

/// In-memory store (native builds and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    level: Option<u8>,
    /// Make every call fail, for exercising the fallback paths
    pub fail: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(level: u8) -> Self {
        Self {
            level: Some(level),
            fail: false,
        }
    }

    /// What was last written, bypassing failure injection
    pub fn peek(&self) -> Option<u8> {
        self.level
    }
}

impl LevelStore for MemoryStore {
    fn get(&self) -> Result<Option<u8>, StoreError> {
        if self.fail {
            return Err(StoreError::Unavailable);
        }
        Ok(self.level)
    }

    fn set(&mut self, level: u8) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::Unavailable);
        }
        self.level = Some(level);
        Ok(())
    }
}

/// Browser LocalStorage store
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl LevelStore for LocalStorageStore {
    fn get(&self) -> Result<Option<u8>, StoreError> {
        let raw = Self::storage()?
            .get_item(LEVEL_KEY)
            .map_err(|e| StoreError::Backend(format!("{e:?}")))?;
        match raw {
            None => Ok(None),
            Some(text) => serde_json::from_str::<u8>(&text)
                .map(Some)
                .map_err(|_| StoreError::Corrupt(text)),
        }
    }

    fn set(&mut self, level: u8) -> Result<(), StoreError> {
        let text = serde_json::to_string(&level).map_err(|e| StoreError::Backend(e.to_string()))?;
        Self::storage()?
            .set_item(LEVEL_KEY, &text)
            .map_err(|e| StoreError::Backend(format!("{e:?}")))
    }
}

/// Read the saved level, falling back to level 1 on any problem
pub fn load_level<S: LevelStore + ?Sized>(store: &S) -> Level {
    match store.get() {
        Ok(Some(n)) => match Level::new(n) {
            Some(level) => {
                log::info!("Resuming at level {}", level);
                level
            }
            None => {
                log::warn!("Saved level {} out of range, starting at level 1", n);
                Level::FIRST
            }
        },
        Ok(None) => {
            log::info!("No saved level, starting at level 1");
            Level::FIRST
        }
        Err(e) => {
            log::warn!("Failed to read saved level ({}), starting at level 1", e);
            Level::FIRST
        }
    }
}

/// Write the level, logging instead of failing
///
/// Returns whether the write went through.
pub fn save_level<S: LevelStore + ?Sized>(store: &mut S, level: Level) -> bool {
    match store.set(level.get()) {
        Ok(()) => {
            log::info!("Saved level {}", level);
            true
        }
        Err(e) => {
            log::warn!("Failed to save level {}: {}", level, e);
            false
        }
    }
}
