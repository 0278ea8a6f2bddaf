//! Browser bindings
//!
//! A canvas host owns the animation frame loop and calls `frame` with the
//! wall-clock delta; the fixed clock turns that into simulation ticks.
//! Drawing reads the JSON snapshot.

use wasm_bindgen::prelude::*;

use crate::sim::tick::trim_backlog;
use crate::sim::{FixedClock, GameEvent, MatchState, TickInput, tick};
use crate::tuning::Tuning;

/// Events kept for a host that never drains them; the oldest go first
const MAX_PENDING_EVENTS: usize = 1024;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Fletch simulation core loaded");
}

/// Match handle exposed to JavaScript
#[wasm_bindgen]
pub struct WasmMatch {
    state: MatchState,
    clock: FixedClock,
    input: TickInput,
    pending: Vec<GameEvent>,
}

#[wasm_bindgen]
impl WasmMatch {
    /// New duel with the reference tuning
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> WasmMatch {
        Self::from_tuning(Tuning::default(), seed)
    }

    /// New duel from a tuning JSON string
    pub fn with_tuning(json: &str, seed: u64) -> Result<WasmMatch, JsValue> {
        let tuning = Tuning::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::from_tuning(tuning, seed))
    }

    /// Set the player's bow from the angle and power sliders
    pub fn set_aim(&mut self, angle: f32, power: f32) {
        self.input.angle = angle;
        self.input.power = power;
    }

    /// Queue a player shot for the next tick
    pub fn fire(&mut self) {
        self.input.fire = true;
    }

    /// Queue a pause toggle for the next tick
    pub fn toggle_pause(&mut self) {
        self.input.pause = true;
    }

    /// Advance by a frame's wall-clock seconds; returns ticks run
    pub fn frame(&mut self, dt_secs: f32) -> u32 {
        let steps = self.clock.advance(dt_secs);
        for _ in 0..steps {
            let events = tick(&mut self.state, &self.input, 1.0);
            self.pending.extend(events);

            // Clear one-shot inputs after processing
            self.input.fire = false;
            self.input.pause = false;
        }
        trim_backlog(&mut self.pending, MAX_PENDING_EVENTS);
        steps
    }

    /// Current snapshot as JSON
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.state
            .snapshot()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Events since the last call, as a JSON array.
    ///
    /// Only the newest `MAX_PENDING_EVENTS` are kept between calls.
    pub fn drain_events_json(&mut self) -> Result<String, JsValue> {
        let events = std::mem::take(&mut self.pending);
        serde_json::to_string(&events).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Fraction of a tick since the last step, for smooth drawing
    pub fn alpha(&self) -> f32 {
        self.clock.alpha()
    }
}

impl WasmMatch {
    fn from_tuning(tuning: Tuning, seed: u64) -> WasmMatch {
        WasmMatch {
            state: MatchState::new(tuning, seed),
            clock: FixedClock::default(),
            input: TickInput::default(),
            pending: Vec::new(),
        }
    }
}
