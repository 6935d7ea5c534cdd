//! Batched critical-surface search runner.
//!
//! Evaluating the whole candidate grid in one call can stall a UI frame,
//! so the runner exposes the search as resumable batches with a progress
//! payload the frontend polls between frames.

use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use talus_core::geometry::{SlopeGeometry, SoilProperties, TrialCircle};
use talus_core::search::{
    candidates, evaluate_candidate, AnalysisInput, CriticalSurfaceResult, EquilibriumResult,
    Method, SearchOutcome, SearchSettings,
};
use wasm_bindgen::prelude::*;

/// Progress payload for the stepped grid search.
#[derive(Serialize)]
struct SearchProgress {
    done: bool,
    evaluated: usize,
    total: usize,
    best_fs: Option<f64>,
}

struct SearchState {
    slope: SlopeGeometry,
    soil: SoilProperties,
    method: Method,
    settings: SearchSettings,
    candidates: Vec<TrialCircle>,
    next: usize,
    best: Option<(TrialCircle, EquilibriumResult)>,
}

impl SearchState {
    fn done(&self) -> bool {
        self.next >= self.candidates.len()
    }

    fn progress(&self) -> SearchProgress {
        SearchProgress {
            done: self.done(),
            evaluated: self.next,
            total: self.candidates.len(),
            best_fs: self.best.as_ref().map(|(_, b)| b.factor_of_safety),
        }
    }
}

#[wasm_bindgen]
pub struct WasmSearchRunner {
    state: Option<SearchState>,
}

#[wasm_bindgen]
impl WasmSearchRunner {
    #[wasm_bindgen(constructor)]
    pub fn new(input: JsValue) -> Result<WasmSearchRunner, JsValue> {
        console_error_panic_hook::set_once();

        let input: AnalysisInput = from_value(input)
            .map_err(|e| JsValue::from_str(&format!("Invalid input record: {}", e)))?;
        let slope = input
            .slope()
            .map_err(|e| JsValue::from_str(&format!("Invalid geometry: {}", e)))?;
        let settings = input.settings();
        let candidates = candidates(&slope, &settings);

        Ok(WasmSearchRunner {
            state: Some(SearchState {
                slope,
                soil: input.soil(),
                method: input.method,
                settings,
                candidates,
                next: 0,
                best: None,
            }),
        })
    }

    pub fn is_done(&self) -> bool {
        self.state.as_ref().map_or(true, |state| state.done())
    }

    /// Evaluates up to `batch_size` candidates and returns the progress
    /// payload. Ties keep the earlier candidate, matching the canonical
    /// enumeration order of the sequential search.
    pub fn run_steps(&mut self, batch_size: u32) -> Result<JsValue, JsValue> {
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        for _ in 0..batch_size {
            if state.done() {
                break;
            }
            let circle = state.candidates[state.next];
            state.next += 1;

            if let Some(result) =
                evaluate_candidate(&circle, &state.slope, &state.soil, state.method, &state.settings)
            {
                let better = state
                    .best
                    .as_ref()
                    .map_or(true, |(_, b)| result.factor_of_safety < b.factor_of_safety);
                if better {
                    state.best = Some((circle, result));
                }
            }
        }

        to_value(&state.progress())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn get_progress(&self) -> Result<JsValue, JsValue> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        to_value(&state.progress())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Returns the final search outcome once every candidate has been
    /// evaluated.
    pub fn get_result(&self) -> Result<JsValue, JsValue> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        if !state.done() {
            return Err(JsValue::from_str("Search has not finished yet."));
        }

        let outcome = match &state.best {
            Some((circle, result)) => {
                SearchOutcome::Found(CriticalSurfaceResult::new(*circle, result.clone()))
            }
            None => SearchOutcome::NotFound,
        };

        to_value(&outcome).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_runner_tests {
    use super::WasmSearchRunner;
    use serde_wasm_bindgen::to_value;
    use talus_core::search::{AnalysisInput, Method};

    fn build_runner() -> WasmSearchRunner {
        let input = AnalysisInput {
            height: 10.0,
            slope_angle: 30.0,
            gamma: 18.0,
            cohesion: 25.0,
            friction_angle: 25.0,
            ru: 0.0,
            kh: 0.0,
            n_slices: 10,
            method: Method::Bishop,
        };
        WasmSearchRunner::new(to_value(&input).expect("input value")).expect("runner")
    }

    #[test]
    fn runner_requires_completion_for_result() {
        let runner = build_runner();
        assert!(!runner.is_done());
        assert!(runner.get_result().is_err(), "expected not finished yet");
    }

    #[test]
    fn runner_completes_in_batches() {
        let mut runner = build_runner();
        while !runner.is_done() {
            runner.run_steps(16).expect("run steps");
        }
        assert!(runner.get_result().is_ok());
    }
}
