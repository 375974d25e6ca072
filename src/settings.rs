//! Game settings and preferences
//!
//! Persisted separately from the level slot in LocalStorage.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};

/// Keyboard layout for movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum KeyLayout {
    /// Arrow keys and WASD both move
    #[default]
    ArrowsAndWasd,
    /// Only arrow keys move
    ArrowsOnly,
}

impl KeyLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyLayout::ArrowsAndWasd => "Arrows + WASD",
            KeyLayout::ArrowsOnly => "Arrows",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "arrows + wasd" | "wasd" | "both" => Some(KeyLayout::ArrowsAndWasd),
            "arrows" | "arrows-only" => Some(KeyLayout::ArrowsOnly),
            _ => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Playfield width in pixels
    pub playfield_width: f32,
    /// Playfield height in pixels
    pub playfield_height: f32,

    // === HUD ===
    /// Show level, lives and enemy health
    pub show_stats: bool,

    // === Input ===
    pub key_layout: KeyLayout,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            show_stats: true,
            key_layout: KeyLayout::default(),
        }
    }
}

impl Settings {
    /// Playfield size, falling back to the default for nonsense values
    pub fn playfield(&self) -> Vec2 {
        let size = Vec2::new(self.playfield_width, self.playfield_height);
        if size.is_finite() && size.min_element() > 0.0 {
            size
        } else {
            Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT)
        }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "arrow_duel_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        log::debug!("Settings not persisted on native ({})", Self::STORAGE_KEY);
    }
}
