//! WASM bridge exposing the Talus slope-stability engine to a web UI.

pub mod runner;

use serde_wasm_bindgen::{from_value, to_value};
use talus_core::search::{analyze, AnalysisInput};
use wasm_bindgen::prelude::*;

/// Runs a full analysis from a JS input record and returns the search
/// outcome (critical surface or an explicit not-found marker).
#[wasm_bindgen]
pub fn analyze_slope(input: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let input: AnalysisInput = from_value(input)
        .map_err(|e| JsValue::from_str(&format!("Invalid input record: {}", e)))?;
    let outcome =
        analyze(&input).map_err(|e| JsValue::from_str(&format!("Analysis failed: {}", e)))?;

    to_value(&outcome).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_value_tests {
    use super::analyze_slope;
    use serde_wasm_bindgen::to_value;
    use talus_core::search::{AnalysisInput, Method};

    fn sample_input() -> AnalysisInput {
        AnalysisInput {
            height: 10.0,
            slope_angle: 30.0,
            gamma: 18.0,
            cohesion: 25.0,
            friction_angle: 25.0,
            ru: 0.0,
            kh: 0.0,
            n_slices: 10,
            method: Method::Bishop,
        }
    }

    #[test]
    fn analyze_slope_accepts_a_valid_record() {
        let input = to_value(&sample_input()).expect("input value");
        assert!(analyze_slope(input).is_ok());
    }

    #[test]
    fn analyze_slope_reports_core_errors() {
        let mut input = sample_input();
        input.height = -1.0;
        let input = to_value(&input).expect("input value");

        let err = analyze_slope(input).expect_err("expected error");
        let message = err.as_string().unwrap_or_default();
        assert!(message.contains("Analysis failed"));
    }
}
