//! Ravana War entry point
//!
//! In the browser this owns the frame loop and input listeners and exposes
//! the latest render snapshot and events as JSON for the page's renderer.
//! Natively it runs a headless autoplay session and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use ravana_war::consts::FALLBACK_DT;
    use ravana_war::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
    use ravana_war::{Difficulty, LevelTable, Playfield, Progress, Settings};

    /// Browser session: simulation plus everything persisted around it
    pub(crate) struct Game {
        pub(crate) state: GameState,
        pub(crate) progress: Progress,
        pub(crate) settings: Settings,
        input: TickInput,
        last_time: f64,
        /// Events since the page last asked for them
        pending_events: Vec<GameEvent>,
    }

    impl Game {
        fn new(field: Playfield, seed: u64) -> Self {
            let settings = Settings::load();
            let progress = Progress::load();
            Self {
                state: GameState::new(LevelTable::builtin(), settings.tuning(), field, seed),
                progress,
                settings,
                input: TickInput::default(),
                last_time: 0.0,
                pending_events: Vec::new(),
            }
        }

        fn update(&mut self, time: f64) {
            // First frame after a (re)start has no meaningful delta
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                FALLBACK_DT
            };
            self.last_time = time;

            let input = self.input.clone();
            tick(&mut self.state, &input, dt);

            // One-shot inputs
            self.input.pause = false;
            self.input.reload = false;
            self.input.special = false;

            for event in self.state.drain_events() {
                if let GameEvent::LevelComplete { stats } = &event {
                    if self.state.record_completion(&mut self.progress) {
                        log::info!("New best score {} on level {}", stats.score, stats.level);
                    }
                    self.progress.save();
                }
                self.pending_events.push(event);
            }
        }

        fn handle_key(&mut self, code: &str, down: bool) {
            match code {
                "KeyW" | "ArrowUp" => self.input.up = down,
                "KeyS" | "ArrowDown" => self.input.down = down,
                "KeyA" | "ArrowLeft" => self.input.left = down,
                "KeyD" | "ArrowRight" => self.input.right = down,
                "KeyR" if down => self.input.reload = true,
                "Space" if down => self.input.special = true,
                "Escape" if down => self.input.pause = true,
                _ => {}
            }
        }
    }

    thread_local! {
        pub(crate) static GAME: RefCell<Option<Game>> = const { RefCell::new(None) };
    }

    /// Run `f` against the live game, if one exists
    pub(crate) fn with_game<T>(f: impl FnOnce(&mut Game) -> T) -> Option<T> {
        GAME.with(|g| g.borrow_mut().as_mut().map(f))
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Ravana War starting...");

        let Some(window) = web_sys::window() else {
            log::warn!("No window; nothing to run");
            return;
        };
        let Some(document) = window.document() else {
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::warn!("No #canvas element found");
            return;
        };

        let field = Playfield::new(canvas.width() as f32, canvas.height() as f32);
        let seed = js_sys::Date::now() as u64;
        GAME.with(|g| *g.borrow_mut() = Some(Game::new(field, seed)));
        log::info!("Playfield {}x{}, seed {}", field.width, field.height, seed);

        setup_input_handlers(&canvas);
        setup_resize_handler(&canvas);
        setup_auto_pause();
        request_animation_frame();
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        for (kind, down) in [("keydown", true), ("keyup", false)] {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if down && event.code() == "Space" {
                    event.prevent_default();
                }
                with_game(|g| g.handle_key(&event.code(), down));
            });
            let _ = document.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse position relative to the canvas
        {
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let rect = canvas_clone.get_bounding_client_rect();
                let x = event.client_x() as f32 - rect.left() as f32;
                let y = event.client_y() as f32 - rect.top() as f32;
                with_game(|g| g.input.aim = glam::Vec2::new(x, y));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for (kind, down) in [("mousedown", true), ("mouseup", false)] {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if event.button() == 0 {
                    with_game(|g| g.input.fire = down);
                }
            });
            let _ = canvas.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// The page sizes the canvas backing store; follow it on resize
    fn setup_resize_handler(canvas: &HtmlCanvasElement) {
        let Some(window) = web_sys::window() else {
            return;
        };

        let canvas_clone = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let field = Playfield::new(canvas_clone.width() as f32, canvas_clone.height() as f32);
            with_game(|g| {
                if g.state.playfield != field {
                    g.state.set_playfield(field);
                    log::info!("Playfield resized to {}x{}", field.width, field.height);
                }
            });
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause() {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                with_game(|g| {
                    if g.state.phase == GamePhase::Playing {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                });
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame() {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(time: f64) {
        with_game(|g| g.update(time));
        request_animation_frame();
    }

    pub(crate) fn start(game: &mut Game, level: u32) -> bool {
        match game.state.start_level(level, &game.progress) {
            Ok(()) => {
                game.last_time = 0.0;
                game.pending_events.clear();
                true
            }
            Err(err) => {
                log::warn!("Cannot start level: {}", err);
                false
            }
        }
    }

    pub(crate) fn take_events(game: &mut Game) -> Vec<GameEvent> {
        std::mem::take(&mut game.pending_events)
    }

    pub(crate) fn set_difficulty(game: &mut Game, name: &str) -> bool {
        let Some(difficulty) = Difficulty::parse(name) else {
            return false;
        };
        game.settings.difficulty = difficulty;
        game.settings.save();
        // Takes effect from the next session
        if game.state.phase != GamePhase::Playing {
            game.state.tuning = game.settings.tuning();
        }
        true
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Start a level from the level-select screen
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_level(level: u32) -> bool {
    wasm_game::with_game(|g| wasm_game::start(g, level)).unwrap_or(false)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn restart_level() -> bool {
    wasm_game::with_game(|g| g.state.restart_level().is_ok()).unwrap_or(false)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn quit_to_menu() {
    wasm_game::with_game(|g| g.state.quit());
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn toggle_pause() {
    wasm_game::with_game(|g| g.state.toggle_pause());
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_difficulty(name: &str) -> bool {
    wasm_game::with_game(|g| wasm_game::set_difficulty(g, name)).unwrap_or(false)
}

/// Latest render snapshot as JSON
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn snapshot_json() -> String {
    wasm_game::with_game(|g| serde_json::to_string(&g.state.snapshot()).unwrap_or_default())
        .unwrap_or_default()
}

/// Events since the previous call, as a JSON array
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn drain_events_json() -> String {
    wasm_game::with_game(|g| {
        serde_json::to_string(&wasm_game::take_events(g)).unwrap_or_else(|_| "[]".to_string())
    })
    .unwrap_or_else(|| "[]".to_string())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn unlocked_levels() -> Vec<u32> {
    wasm_game::with_game(|g| g.progress.unlocked.clone()).unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Ravana War (native) starting headless autoplay...");
    log::info!("Run the wasm32 build for the playable browser version");

    let stats = autoplay::run(1, 120.0);
    println!(
        "Level {}: score {}, {} kills, {:.0}% accuracy, {:.1}s",
        stats.level,
        stats.score,
        stats.kills,
        stats.accuracy() * 100.0,
        stats.elapsed
    );
}

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use glam::Vec2;
    use ravana_war::sim::{GameEvent, GamePhase, GameState, SessionStats, TickInput, tick};
    use ravana_war::{LevelTable, Playfield, Progress, Settings};

    const FRAME: f32 = 1.0 / 60.0;
    /// Back away from enemies closer than this
    const COMFORT_DISTANCE: f32 = 180.0;

    /// Play `level` with a simple bot for up to `seconds` of simulated time
    pub fn run(level: u32, seconds: f32) -> SessionStats {
        let settings = Settings::load();
        let mut progress = Progress::load();
        let mut state = GameState::new(
            LevelTable::builtin(),
            settings.tuning(),
            Playfield::default(),
            0x5EED,
        );
        if let Err(err) = state.start_level(level, &progress) {
            log::warn!("{}", err);
            return state.session_stats();
        }

        let frames = (seconds / FRAME) as usize;
        for _ in 0..frames {
            let input = bot_input(&state);
            tick(&mut state, &input, FRAME);

            for event in state.drain_events() {
                match event {
                    GameEvent::WaveStart { wave } => log::info!("Wave {} begins", wave),
                    GameEvent::PlayerRespawn { lives } => log::info!("Respawned, {} lives", lives),
                    _ => {}
                }
            }
            if state.phase.is_terminal() {
                break;
            }
        }

        if state.phase == GamePhase::LevelComplete && state.record_completion(&mut progress) {
            progress.save();
        }
        state.session_stats()
    }

    fn bot_input(state: &GameState) -> TickInput {
        let me = state.player.pos;
        let nearest = state
            .enemies
            .iter()
            .filter(|e| e.is_alive() && !e.is_spawning())
            .min_by(|a, b| a.pos.distance(me).total_cmp(&b.pos.distance(me)));

        let mut input = TickInput {
            special: state.player.special_ready(),
            ..Default::default()
        };
        let Some(target) = nearest else {
            return input;
        };

        input.aim = target.pos;
        input.fire = true;
        let away: Vec2 = me - target.pos;
        if away.length() < COMFORT_DISTANCE {
            input.left = away.x < 0.0;
            input.right = away.x > 0.0;
            input.up = away.y < 0.0;
            input.down = away.y > 0.0;
        }
        input
    }
}
