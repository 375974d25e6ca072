//! Arrow Duel entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlSelectElement, KeyboardEvent};

    use arrow_duel::persistence::LocalStorageStore;
    use arrow_duel::platform::{self, HeldActions};
    use arrow_duel::renderer::CanvasRenderer;
    use arrow_duel::sim::{FrameSnapshot, GameEvent, GameState, Level, tick};
    use arrow_duel::{KeyLayout, Progression, Settings, Signal};

    /// Game instance holding all state
    struct Game {
        settings: Settings,
        progression: Progression,
        store: LocalStorageStore,
        /// Current or most recently finished run
        state: Option<GameState>,
        renderer: Option<CanvasRenderer>,
        held: HeldActions,
    }

    impl Game {
        fn new(settings: Settings) -> Self {
            let store = LocalStorageStore;
            Self {
                settings,
                progression: Progression::resume(&store),
                store,
                state: None,
                renderer: None,
                held: HeldActions::default(),
            }
        }

        /// Start the current level if nothing is running
        fn start(&mut self) {
            let now = platform::now_ms();
            let seed = js_sys::Date::now() as u64;
            if let Some(state) = self.progression.start(self.settings.playfield(), now, seed) {
                log::info!("Level {} started with seed: {}", state.level, seed);
                self.state = Some(state);
                self.held.clear();
                set_status("");
            }
        }

        /// Run one frame of the simulation and settle its outcome
        fn update(&mut self, now: f64) {
            if !self.progression.is_running() {
                return;
            }
            let Some(state) = self.state.as_mut() else {
                return;
            };

            tick(state, &self.held.to_tick_input(now));
            for event in state.drain_events() {
                match event {
                    GameEvent::PlayerHit { damage, lives } => {
                        log::debug!("Player hit for {} ({} lives left)", damage, lives)
                    }
                    other => log::debug!("{:?}", other),
                }
            }

            if let Some(signal) = self.progression.conclude(state.phase) {
                self.progression.flush(&mut self.store);
                self.progression.settle();
                show_signal(signal);
            }
        }

        fn render(&self, now: f64) {
            let (Some(renderer), Some(state)) = (&self.renderer, &self.state) else {
                return;
            };
            let frame = FrameSnapshot::capture(state, now);
            if let Err(e) = renderer.render(&frame, &self.settings) {
                log::warn!("Render error: {}", e);
            }
        }

        fn select_level(&mut self, level: Level) {
            let signal = self.progression.select_level(level);
            self.progression.flush(&mut self.store);
            self.state = None;
            self.held.clear();
            show_signal(signal);
        }
    }

    fn set_status(text: &str) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id("status") {
            el.set_text_content(Some(text));
        }
    }

    fn show_signal(signal: Signal) {
        let text = match signal {
            Signal::GameOver => "Game over. Press Enter to retry.".to_string(),
            Signal::Victory { next_level } if next_level == Level::FIRST => {
                "All levels cleared! Press Enter to play again from level 1.".to_string()
            }
            Signal::Victory { next_level } => {
                format!("Victory! Press Enter for level {}.", next_level)
            }
            Signal::LevelSwitchRequested(level) => {
                format!("Level {} selected. Press Enter to start.", level)
            }
        };
        set_status(&text);
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Arrow Duel starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No canvas element");
            return;
        };

        let settings = Settings::load();
        let playfield = settings.playfield();
        canvas.set_width(playfield.x as u32);
        canvas.set_height(playfield.y as u32);

        let game = Rc::new(RefCell::new(Game::new(settings)));
        match CanvasRenderer::new(canvas) {
            Ok(renderer) => game.borrow_mut().renderer = Some(renderer),
            Err(e) => log::error!("Failed to create renderer: {}", e),
        }

        let level = game.borrow().progression.level();
        set_status(&format!("Level {}. Press Enter to start.", level));

        setup_input_handlers(game.clone());
        setup_level_select(game.clone(), level);
        setup_key_layout_select(game.clone());

        request_animation_frame(game);

        log::info!("Arrow Duel running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                if key == "Enter" {
                    if !g.progression.is_running() {
                        g.start();
                    }
                    return;
                }
                let layout = g.settings.key_layout;
                if g.held.apply_key(&key, true, layout) {
                    event.prevent_default();
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let layout = g.settings.key_layout;
                g.held.apply_key(&event.key(), false, layout);
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur releases every held key
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().held.clear();
                log::debug!("Input released (window blur)");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_level_select(game: Rc<RefCell<Game>>, current: Level) {
        let Some(select) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("level-select"))
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        else {
            return;
        };
        select.set_value(&current.to_string());

        let select_clone = select.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let value = select_clone.value();
            match value.parse::<u8>().ok().and_then(Level::new) {
                Some(level) => game.borrow_mut().select_level(level),
                None => log::warn!("Ignoring level selection {:?}", value),
            }
        });
        let _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_key_layout_select(game: Rc<RefCell<Game>>) {
        let Some(select) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("key-layout"))
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        else {
            return;
        };
        select.set_value(game.borrow().settings.key_layout.as_str());

        let select_clone = select.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let value = select_clone.value();
            let Some(layout) = KeyLayout::from_str(&value) else {
                log::warn!("Ignoring key layout {:?}", value);
                return;
            };
            let mut g = game.borrow_mut();
            g.settings.key_layout = layout;
            g.held.clear();
            g.settings.save();
            log::info!("Key layout: {}", layout.as_str());
        });
        let _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            let now = platform::now_ms();
            g.update(now);
            g.render(now);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Arrow Duel (native) starting...");
    log::info!("Native mode runs a headless demo - build for wasm32 to play");

    let level = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u8>().ok())
        .and_then(arrow_duel::sim::Level::new);
    headless::run(level);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted run on a simulated 16ms clock
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use arrow_duel::consts::FRAME_MS;
    use arrow_duel::persistence::MemoryStore;
    use arrow_duel::sim::{Direction, FrameSnapshot, GameState, Level, TickInput, tick};
    use arrow_duel::{Progression, ProgressionState, Settings};

    /// Give up after a simulated minute
    const MAX_FRAMES: u32 = 3750;
    const SEED: u64 = 7;

    pub fn run(level: Option<Level>) {
        let settings = Settings::load();
        let mut store = MemoryStore::new();
        let mut progression = Progression::resume(&store);
        if let Some(level) = level {
            progression.select_level(level);
            progression.flush(&mut store);
        }

        let mut now = 0.0;
        let Some(mut state) = progression.start(settings.playfield(), now, SEED) else {
            log::error!("Could not start a run");
            return;
        };

        let mut frames = 0;
        while frames < MAX_FRAMES {
            now += FRAME_MS;
            frames += 1;
            let input = line_up_and_shoot(&state, now);
            tick(&mut state, &input);

            if let Some(signal) = progression.conclude(state.phase) {
                log::info!("{:?} after {} frames ({:.1}s)", signal, frames, now / 1000.0);
                progression.flush(&mut store);
                progression.settle();
                break;
            }
        }

        if progression.state() == ProgressionState::Running(state.level) {
            log::info!("Level {} still undecided after {} frames", state.level, frames);
        }
        log::info!(
            "Lives {}, enemies left {}, saved level {:?}",
            state.player.lives,
            state.live_enemies().count(),
            store.peek()
        );

        match serde_json::to_string_pretty(&FrameSnapshot::capture(&state, now)) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to serialize snapshot: {}", e),
        }
    }

    /// Stay on the nearest enemy's row, face right and keep the trigger held
    fn line_up_and_shoot(state: &GameState, now: f64) -> TickInput {
        let me = state.player.center();
        let target = state
            .live_enemies()
            .map(|e| e.center())
            .min_by(|a, b| a.distance(me).total_cmp(&b.distance(me)));

        let mut input = TickInput {
            shoot: true,
            now,
            ..Default::default()
        };
        if let Some(target) = target {
            let dy = target.y - me.y;
            input.up = dy < -state.player.speed;
            input.down = dy > state.player.speed;
        }
        // One step right to turn around once lined up
        input.right = !input.up && !input.down && state.player.direction != Direction::Right;
        input
    }
}
