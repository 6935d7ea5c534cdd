//! Limit-equilibrium solvers reducing a slice list to a factor of safety.

use crate::geometry::SoilProperties;
use crate::slices::Slice;
use serde::{Deserialize, Serialize};

/// Any denominator with magnitude below this rejects the candidate
/// instead of letting a near-singular term blow up the sum.
const DENOM_EPS: f64 = 1e-9;

/// Settings controlling the Bishop/Janbu fixed-point iteration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IterationSettings {
    pub max_steps: usize,
    pub tolerance: f64,
    pub initial_guess: f64,
}

impl Default for IterationSettings {
    fn default() -> Self {
        Self {
            max_steps: 20,
            tolerance: 1e-3,
            initial_guess: 1.5,
        }
    }
}

/// Strategy seam shared by all equilibrium methods: reduce a slice list
/// to a single factor of safety. `radius` feeds the pseudo-static moment
/// term.
///
/// Returns `None` for expected degenerate outcomes (collapsing
/// denominator, non-positive driving sum, non-finite estimate); the
/// caller drops the candidate rather than treating this as an error.
pub trait LimitEquilibrium {
    fn factor_of_safety(&self, soil: &SoilProperties, slices: &[Slice], radius: f64)
        -> Option<f64>;
}

/// Driving sum shared by the moment-based methods:
/// W·sin(alpha) plus the pseudo-static term kh·W·(h/2)/R.
fn moment_driving(soil: &SoilProperties, slices: &[Slice], radius: f64) -> f64 {
    slices
        .iter()
        .map(|s| {
            s.weight * s.alpha.sin()
                + soil.seismic_coefficient * s.weight * (0.5 * s.height) / radius
        })
        .sum()
}

/// Janbu's force-based driving sum: tan(alpha) in place of sin(alpha).
fn force_driving(soil: &SoilProperties, slices: &[Slice], radius: f64) -> f64 {
    slices
        .iter()
        .map(|s| {
            s.weight * s.alpha.tan()
                + soil.seismic_coefficient * s.weight * (0.5 * s.height) / radius
        })
        .sum()
}

fn safety_ratio(resisting: f64, driving: f64) -> Option<f64> {
    if driving <= DENOM_EPS {
        return None;
    }
    let fs = resisting / driving;
    (fs.is_finite() && fs > 0.0).then_some(fs)
}

/// Ordinary method of slices (Fellenius): a direct force balance along
/// the base chords, no iteration.
pub struct Fellenius;

impl LimitEquilibrium for Fellenius {
    fn factor_of_safety(
        &self,
        soil: &SoilProperties,
        slices: &[Slice],
        radius: f64,
    ) -> Option<f64> {
        let tan_phi = soil.tan_phi();
        let resisting: f64 = slices
            .iter()
            .map(|s| {
                let normal = s.weight * s.alpha.cos() - s.pore_pressure * s.base_len;
                soil.cohesion * s.base_len + normal.max(0.0) * tan_phi
            })
            .sum();
        safety_ratio(resisting, moment_driving(soil, slices, radius))
    }
}

/// Bishop's simplified method. The per-slice denominator
/// m_alpha = cos(alpha) + sin(alpha)·tan(phi)/FS depends on the factor of
/// safety being solved for, so the value is found by fixed-point
/// iteration from `IterationSettings::initial_guess`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BishopSimplified {
    pub settings: IterationSettings,
}

impl BishopSimplified {
    pub fn new(settings: IterationSettings) -> Self {
        Self { settings }
    }
}

/// One pure Bishop step: `(fs_prev, slices) -> fs_next`.
fn bishop_step(
    soil: &SoilProperties,
    slices: &[Slice],
    radius: f64,
    fs_prev: f64,
) -> Option<f64> {
    let tan_phi = soil.tan_phi();
    let mut resisting = 0.0;
    for s in slices {
        let m_alpha = s.alpha.cos() + s.alpha.sin() * tan_phi / fs_prev;
        if m_alpha.abs() < DENOM_EPS {
            return None;
        }
        resisting += (soil.cohesion * s.base_len
            + (s.weight - s.pore_pressure * s.base_len) * tan_phi)
            / m_alpha;
    }
    safety_ratio(resisting, moment_driving(soil, slices, radius))
}

impl LimitEquilibrium for BishopSimplified {
    fn factor_of_safety(
        &self,
        soil: &SoilProperties,
        slices: &[Slice],
        radius: f64,
    ) -> Option<f64> {
        fixed_point(&self.settings, |fs| bishop_step(soil, slices, radius, fs))
            .map(|outcome| outcome.value)
    }
}

/// Janbu's simplified method: n_alpha = cos²(alpha) +
/// sin(alpha)·cos(alpha)·tan(phi)/FS in the denominator and tan(alpha)
/// in the driving sum. The classical f₀ interslice correction is left
/// out of this variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct JanbuSimplified {
    pub settings: IterationSettings,
}

impl JanbuSimplified {
    pub fn new(settings: IterationSettings) -> Self {
        Self { settings }
    }
}

/// One pure Janbu step: `(fs_prev, slices) -> fs_next`.
fn janbu_step(
    soil: &SoilProperties,
    slices: &[Slice],
    radius: f64,
    fs_prev: f64,
) -> Option<f64> {
    let tan_phi = soil.tan_phi();
    let mut resisting = 0.0;
    for s in slices {
        let (sin_a, cos_a) = s.alpha.sin_cos();
        let n_alpha = cos_a * cos_a + sin_a * cos_a * tan_phi / fs_prev;
        if n_alpha.abs() < DENOM_EPS {
            return None;
        }
        resisting += (soil.cohesion * s.base_len
            + (s.weight - s.pore_pressure * s.base_len) * tan_phi)
            / n_alpha;
    }
    safety_ratio(resisting, force_driving(soil, slices, radius))
}

impl LimitEquilibrium for JanbuSimplified {
    fn factor_of_safety(
        &self,
        soil: &SoilProperties,
        slices: &[Slice],
        radius: f64,
    ) -> Option<f64> {
        fixed_point(&self.settings, |fs| janbu_step(soil, slices, radius, fs))
            .map(|outcome| outcome.value)
    }
}

#[derive(Debug, Clone, Copy)]
struct FixedPointOutcome {
    value: f64,
    iterations: usize,
    converged: bool,
}

/// Iterates `step` from the seed until successive estimates differ by
/// less than the tolerance or the step cap is reached. Non-convergence
/// is non-fatal: the last estimate is returned either way.
fn fixed_point<F>(settings: &IterationSettings, mut step: F) -> Option<FixedPointOutcome>
where
    F: FnMut(f64) -> Option<f64>,
{
    let mut fs = settings.initial_guess;
    for iteration in 1..=settings.max_steps {
        let next = step(fs)?;
        if (next - fs).abs() < settings.tolerance {
            return Some(FixedPointOutcome {
                value: next,
                iterations: iteration,
                converged: true,
            });
        }
        fs = next;
    }
    log::warn!(
        "factor-of-safety iteration did not converge in {} steps; keeping last estimate {fs}",
        settings.max_steps
    );
    Some(FixedPointOutcome {
        value: fs,
        iterations: settings.max_steps,
        converged: false,
    })
}
