//! Rock Hauler entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent};

    use rock_hauler::consts::MAX_FRAME_DT;
    use rock_hauler::renderer::Renderer;
    use rock_hauler::sim::{GameState, InputSnapshot, Key, tick};
    use rock_hauler::tuning::Tuning;

    /// Game instance holding all state
    struct Game {
        state: GameState,
        renderer: Renderer,
        input: InputSnapshot,
        last_time: f64,
    }

    /// Map a raw key event to the logical key the simulation understands
    fn logical_key(event: &KeyboardEvent) -> Option<Key> {
        match event.key().as_str() {
            "ArrowUp" | "w" | "W" => Some(Key::Up),
            "ArrowDown" | "s" | "S" => Some(Key::Down),
            "ArrowLeft" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "d" | "D" => Some(Key::Right),
            " " | "Enter" => Some(Key::Confirm),
            _ => None,
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Rock Hauler starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let ctx = canvas
            .get_context("2d")
            .expect("context lookup failed")
            .expect("no 2d context")
            .dyn_into::<CanvasRenderingContext2d>()
            .expect("not a 2d context");

        let tuning = Tuning::load();
        let seed = js_sys::Date::now() as u64;
        let mut state = GameState::new(seed, tuning);
        state.set_viewport(width as f32, height as f32);

        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            state,
            renderer: Renderer::new(ctx),
            input: InputSnapshot::new(),
            last_time: 0.0,
        }));

        setup_input_handlers(game.clone());
        setup_resize_handler(&canvas, game.clone());

        request_animation_frame(game);

        log::info!("Rock Hauler running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Keydown; browser auto-repeat collapses inside the snapshot
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = logical_key(&event) {
                    event.prevent_default();
                    game.borrow_mut().input.press(key);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyup
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = logical_key(&event) {
                    game.borrow_mut().input.release(key);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let width = canvas.client_width().max(1) as u32;
            let height = canvas.client_height().max(1) as u32;
            canvas.set_width(width);
            canvas.set_height(height);
            game.borrow_mut()
                .state
                .set_viewport(width as f32, height as f32);
            log::debug!("viewport resized to {width}x{height}");
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Frame delta, capped so background-tab pauses do not explode
            let dt = if g.last_time > 0.0 {
                (((time - g.last_time) / 1000.0) as f32).min(MAX_FRAME_DT)
            } else {
                0.0
            };
            g.last_time = time;

            let input = g.input.clone();
            tick(&mut g.state, &input, dt);
            g.input.begin_frame();

            let Game {
                ref state,
                ref renderer,
                ..
            } = *g;
            renderer.draw(state);
        }

        request_animation_frame(game);
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
    use rock_hauler::sim::{GamePhase, GameState, InputSnapshot, Key, tick};
    use rock_hauler::tuning::Tuning;

    env_logger::init();
    log::info!("Rock Hauler (native) starting...");
    log::info!("Native mode runs a headless demo - serve the web build for the real game");

    let dt = 1.0 / 60.0;
    let mut state = GameState::new(0xE1C, Tuning::default());
    let mut input = InputSnapshot::new();

    input.press(Key::Confirm);
    tick(&mut state, &input, dt);
    input.begin_frame();
    input.release(Key::Confirm);
    input.press(Key::Down); // hold the trigger the whole way

    // Thirty simulated seconds of driving, jumping and firing
    for frame in 0u32..(30 * 60) {
        if frame % 240 == 0 {
            input.press(Key::Up);
        } else if frame % 240 == 120 {
            input.release(Key::Up);
        }
        tick(&mut state, &input, dt);
        input.begin_frame();
        if state.phase != GamePhase::Playing {
            break;
        }
    }

    log::info!(
        "demo finished: phase {:?}, score {}, {} rocks left, {} entities drawn",
        state.phase,
        state.score,
        state.rocks_remaining(),
        state.render_entities().len()
    );
}
