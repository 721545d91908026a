pub mod runner;

pub use runner::EngineRunner;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use quizrun_engine::Signal;

thread_local! {
    static RUNNER: RefCell<Option<EngineRunner>> = RefCell::new(None);
}

fn with_runner<R>(f: impl FnOnce(&mut EngineRunner) -> R) -> R {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let runner = borrow
            .as_mut()
            .expect("Engine not initialized. Call engine_init() first.");
        f(runner)
    })
}

#[wasm_bindgen]
pub fn engine_init(seed: u32) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let runner = EngineRunner::new(seed as u64);
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    log::info!("quizrun: engine initialized (seed {})", seed);
}

/// Apply tuning JSON; rebuilds the engine around the new parameters.
#[wasm_bindgen]
pub fn engine_load_tuning(json: &str) {
    with_runner(|r| r.load_tuning(json));
}

/// Advance one frame. `speed` is the normalized terrain speed from the
/// game-state store; a changed `reset_tick` rebuilds the run.
#[wasm_bindgen]
pub fn engine_tick(time: f32, dt: f32, speed: f32, reset_tick: u32) {
    with_runner(|r| r.tick(time, dt, speed, reset_tick));
}

/// Run deferred work. Schedule via requestIdleCallback, not the frame loop.
#[wasm_bindgen]
pub fn engine_maintain() -> u32 {
    with_runner(|r| r.maintain())
}

#[wasm_bindgen]
pub fn engine_answer_confirmed(tile: u32) {
    with_runner(|r| r.push_signal(Signal::AnswerConfirmed { tile }));
}

#[wasm_bindgen]
pub fn engine_player_position(x: f32, y: f32, z: f32) {
    with_runner(|r| r.push_signal(Signal::PlayerPosition { x, y, z }));
}

#[wasm_bindgen]
pub fn engine_custom_signal(kind: u32, a: f32, b: f32, c: f32) {
    with_runner(|r| r.push_signal(Signal::Custom { kind, a, b, c }));
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_frame_buffer_ptr() -> *const f32 {
    with_runner(|r| r.buffer_ptr())
}

#[wasm_bindgen]
pub fn get_buffer_total_floats() -> u32 {
    with_runner(|r| r.buffer_total_floats())
}

#[wasm_bindgen]
pub fn get_rows_visible() -> u32 {
    with_runner(|r| r.rows_visible())
}

#[wasm_bindgen]
pub fn get_columns() -> u32 {
    with_runner(|r| r.columns())
}

#[wasm_bindgen]
pub fn get_max_events() -> u32 {
    with_runner(|r| r.max_events())
}

#[wasm_bindgen]
pub fn get_stage() -> u32 {
    with_runner(|r| r.stage())
}

#[wasm_bindgen]
pub fn get_distance() -> u32 {
    with_runner(|r| r.distance())
}

#[wasm_bindgen]
pub fn get_buffer_underruns() -> u32 {
    with_runner(|r| r.buffer_underruns())
}
