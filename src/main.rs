//! Rival Isle entry point
//!
//! Handles platform-specific initialization and runs the game loop. The
//! wasm build drives the DOM HUD directly; the render collaborator (terrain,
//! meshes, effects) hangs off the same ids and is free to evolve separately.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::KeyboardEvent;

    use glam::Vec2;
    use rival_isle::battle::BattleEvent;
    use rival_isle::config::load_monolith_configs;
    use rival_isle::consts::*;
    use rival_isle::game::{FrameInput, Game, GameEvent, Mode};
    use rival_isle::progress::{CharacterId, ProgressionStore};
    use rival_isle::ui::{heart_string, status_lines};

    /// Held-key state folded into each frame's input
    #[derive(Default)]
    struct HeldKeys {
        north: bool,
        south: bool,
        west: bool,
        east: bool,
    }

    impl HeldKeys {
        fn move_dir(&self) -> Vec2 {
            let x = (self.east as i32 - self.west as i32) as f32;
            let y = (self.south as i32 - self.north as i32) as f32;
            Vec2::new(x, y)
        }
    }

    /// Shell instance holding the game and per-frame input
    struct Shell {
        game: Game,
        input: FrameInput,
        held: HeldKeys,
        accumulator: f32,
        last_time: f64,
        /// Hearts HUD for reflex battles, HP text for turn-based ones
        reflex_hud: bool,
    }

    impl Shell {
        fn new(game: Game) -> Self {
            Self {
                game,
                input: FrameInput::default(),
                held: HeldKeys::default(),
                accumulator: 0.0,
                last_time: 0.0,
                reflex_hud: false,
            }
        }

        /// Run fixed-timestep updates, clearing one-shot inputs after each
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                self.input.move_dir = self.held.move_dir();
                let input = self.input.clone();
                self.game.update(&input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                self.input.interact = false;
                self.input.strike = false;
                self.input.cycle = false;
                self.input.pick_starter = None;
            }
        }

        /// Push game state into the DOM HUD
        fn update_hud(&mut self) {
            self.reflex_hud = self.game.battle_is_reflex().unwrap_or(self.reflex_hud);

            set_visible("character-select", self.game.mode() == Mode::CharacterSelect);
            set_visible("battle-overlay", self.game.mode() == Mode::Battle);

            for line in status_lines(self.game.store().state(), self.game.monoliths().len()) {
                // Lines are stable: Current / Unlocked / Monoliths
                if let Some((id, text)) = line.split_once(": ") {
                    set_text(&format!("status-{}", id.to_lowercase()), text);
                }
            }

            set_text("hint", self.game.hint().unwrap_or(""));
            set_text("toast", self.game.toast.visible().unwrap_or(""));

            for event in self.game.take_events() {
                match event {
                    GameEvent::Battle(event) => self.apply_battle_event(event),
                    GameEvent::ShowProjectPanel { monolith_id } => {
                        set_text("project-panel-body", &monolith_id);
                        set_visible("project-panel", true);
                    }
                }
            }
        }

        fn apply_battle_event(&self, event: BattleEvent) {
            match event {
                BattleEvent::Message(text) => set_text("battle-log", &text),
                BattleEvent::PlayerHealth(value) => {
                    set_text("player-health", &self.health_text(value));
                }
                BattleEvent::OpponentHealth(value) => {
                    set_text("enemy-health", &self.health_text(value));
                }
                BattleEvent::CommandMenu(show) => set_visible("command-menu", show),
                BattleEvent::StrikeReady(ready) => set_visible("strike-ready", ready),
                BattleEvent::AttackLanded { on_player } => {
                    // The render collaborator plays the hit flash; the HUD
                    // just nudges the right panel
                    let id = if on_player { "player-panel" } else { "enemy-panel" };
                    if let Some(el) = element(id) {
                        let _ = el.set_attribute("class", "panel hit");
                    }
                }
            }
        }

        fn health_text(&self, value: i32) -> String {
            if self.reflex_hud {
                heart_string(value.max(0) as u8, REFLEX_MAX_HEARTS)
            } else {
                format!("{value} HP")
            }
        }
    }

    fn element(id: &str) -> Option<web_sys::Element> {
        web_sys::window()?.document()?.get_element_by_id(id)
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = element(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(id: &str, visible: bool) {
        if let Some(el) = element(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Rival Isle starting...");

        let document = web_sys::window()
            .expect("no window")
            .document()
            .expect("no document");

        // World config ships inline in the page; defaults cover its absence
        let monoliths = document
            .get_element_by_id("monolith-config")
            .and_then(|el| el.text_content())
            .map(|json| load_monolith_configs(&json))
            .unwrap_or_else(rival_isle::config::default_monoliths);

        let store = ProgressionStore::load();
        let seed = js_sys::Date::now() as u64;
        let game = Game::new(store, monoliths, seed);
        log::info!("Session seed: {seed}");

        let shell = Rc::new(RefCell::new(Shell::new(game)));
        setup_input_handlers(shell.clone());
        request_animation_frame(shell);

        log::info!("Rival Isle running!");
    }

    fn setup_input_handlers(shell: Rc<RefCell<Shell>>) {
        let window = web_sys::window().unwrap();

        {
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut s = shell.borrow_mut();
                match event.code().as_str() {
                    "KeyW" | "ArrowUp" => s.held.north = true,
                    "KeyS" | "ArrowDown" => s.held.south = true,
                    "KeyA" | "ArrowLeft" => s.held.west = true,
                    "KeyD" | "ArrowRight" => s.held.east = true,
                    "KeyE" => s.input.interact = true,
                    "Space" => {
                        event.prevent_default();
                        s.input.strike = true;
                    }
                    "Tab" => {
                        event.prevent_default();
                        s.input.cycle = true;
                    }
                    "Digit1" => s.input.pick_starter = Some(CharacterId::Design),
                    "Digit2" => s.input.pick_starter = Some(CharacterId::Art),
                    "Digit3" => s.input.pick_starter = Some(CharacterId::Collab),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut s = shell.borrow_mut();
                match event.code().as_str() {
                    "KeyW" | "ArrowUp" => s.held.north = false,
                    "KeyS" | "ArrowDown" => s.held.south = false,
                    "KeyA" | "ArrowLeft" => s.held.west = false,
                    "KeyD" | "ArrowRight" => s.held.east = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Abort a running battle when the tab is hidden; an abandoned fight
        // counts as a loss
        {
            let document = web_sys::window().unwrap().document().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let document = web_sys::window().unwrap().document().unwrap();
                if document.hidden() {
                    shell.borrow_mut().game.abort_battle();
                    log::info!("Battle aborted (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
    }

    fn request_animation_frame(shell: Rc<RefCell<Shell>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(shell, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(shell: Rc<RefCell<Shell>>, time: f64) {
        {
            let mut s = shell.borrow_mut();
            let dt = if s.last_time > 0.0 {
                ((time - s.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            s.last_time = time;

            s.update(dt);
            s.update_hud();
        }

        request_animation_frame(shell);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Rival Isle (native) starting...");

    // Headless demo: pick a starter, walk to the nearest rival, win the
    // reflex duel. The web build is the real interface.
    use rival_isle::config::default_monoliths;
    use rival_isle::consts::SIM_DT;
    use rival_isle::game::{FrameInput, Game, Mode};
    use rival_isle::progress::{CharacterId, ProgressionStore};

    let mut game = Game::new(ProgressionStore::load(), default_monoliths(), 0x5eed);
    game.update(
        &FrameInput {
            pick_starter: Some(CharacterId::Design),
            ..Default::default()
        },
        SIM_DT,
    );

    let target = game
        .roamers()
        .positions()
        .first()
        .map(|(_, pos)| *pos)
        .expect("rivals roam after the starter pick");
    game.set_player_position(target);
    game.update(
        &FrameInput {
            interact: true,
            ..Default::default()
        },
        SIM_DT,
    );

    let strike = FrameInput {
        strike: true,
        ..Default::default()
    };
    let mut elapsed = 0.0f32;
    while game.mode() == Mode::Battle && elapsed < 30.0 {
        game.update(&strike, SIM_DT);
        elapsed += SIM_DT;
    }

    let state = game.store().state();
    println!(
        "Demo finished in {elapsed:.1}s: current={:?}, unlocked={:?}",
        state.current_character, state.unlocked_characters
    );
}
