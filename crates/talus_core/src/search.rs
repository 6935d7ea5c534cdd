//! Critical failure-surface search over a grid of trial circles.

use crate::geometry::{CenterPoint, SlopeGeometry, SoilProperties, TrialCircle};
use crate::slices::{discretize, Slice};
use crate::solvers::{
    BishopSimplified, Fellenius, IterationSettings, JanbuSimplified, LimitEquilibrium,
};
use anyhow::{bail, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Factors of safety beyond this are not meaningful minima and usually
/// betray a near-degenerate denominator; such candidates are dropped.
const MAX_PLAUSIBLE_FS: f64 = 1e3;

/// The closed set of limit-equilibrium methods the engine dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Fellenius,
    Bishop,
    Janbu,
}

impl Method {
    fn build(self, settings: IterationSettings) -> MethodSolver {
        match self {
            Method::Fellenius => MethodSolver::Fellenius(Fellenius),
            Method::Bishop => MethodSolver::Bishop(BishopSimplified::new(settings)),
            Method::Janbu => MethodSolver::Janbu(JanbuSimplified::new(settings)),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown stability method `{0}`; expected fellenius, bishop, or janbu")]
pub struct ParseMethodError(String);

impl FromStr for Method {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fellenius" => Ok(Method::Fellenius),
            "bishop" => Ok(Method::Bishop),
            "janbu" => Ok(Method::Janbu),
            other => Err(ParseMethodError(other.to_string())),
        }
    }
}

enum MethodSolver {
    Fellenius(Fellenius),
    Bishop(BishopSimplified),
    Janbu(JanbuSimplified),
}

impl LimitEquilibrium for MethodSolver {
    fn factor_of_safety(
        &self,
        soil: &SoilProperties,
        slices: &[Slice],
        radius: f64,
    ) -> Option<f64> {
        match self {
            MethodSolver::Fellenius(s) => s.factor_of_safety(soil, slices, radius),
            MethodSolver::Bishop(s) => s.factor_of_safety(soil, slices, radius),
            MethodSolver::Janbu(s) => s.factor_of_safety(soil, slices, radius),
        }
    }
}

/// Grid configuration for the critical-surface search.
///
/// Centers are placed at `center_x_factors × run` horizontally and
/// `center_y_factors × height` vertically; radii at `radius_factors ×
/// height`. The default five-value grids are deliberately coarse; they
/// are configuration, not a tuned accuracy guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    pub center_x_factors: Vec<f64>,
    pub center_y_factors: Vec<f64>,
    pub radius_factors: Vec<f64>,
    pub n_slices: usize,
    pub iteration: IterationSettings,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            center_x_factors: vec![0.2, 0.4, 0.5, 0.6, 0.8],
            center_y_factors: vec![0.8, 1.0, 1.2, 1.5, 2.0],
            radius_factors: vec![0.8, 1.0, 1.2, 1.5, 1.8],
            n_slices: 10,
            iteration: IterationSettings::default(),
        }
    }
}

impl SearchSettings {
    fn validate(&self) -> Result<()> {
        if self.center_x_factors.is_empty()
            || self.center_y_factors.is_empty()
            || self.radius_factors.is_empty()
        {
            bail!("Search grids must not be empty.");
        }
        if self.n_slices == 0 {
            bail!("n_slices must be at least 1.");
        }
        if self.iteration.max_steps == 0 {
            bail!("Iteration step cap must be at least 1.");
        }
        Ok(())
    }
}

/// Enumerates trial circles in canonical (cx, cy, R) order, dropping
/// circles whose radius is implausibly small for their center height.
pub fn candidates(slope: &SlopeGeometry, settings: &SearchSettings) -> Vec<TrialCircle> {
    let capacity = settings.center_x_factors.len()
        * settings.center_y_factors.len()
        * settings.radius_factors.len();
    let mut out = Vec::with_capacity(capacity);
    for &fx in &settings.center_x_factors {
        let cx = fx * slope.run();
        for &fy in &settings.center_y_factors {
            let cy = fy * slope.height();
            for &fr in &settings.radius_factors {
                let radius = fr * slope.height();
                if radius < 0.5 * cy {
                    continue;
                }
                out.push(TrialCircle::new(cx, cy, radius));
            }
        }
    }
    out
}

/// Factor of safety for one trial circle together with the slices that
/// produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquilibriumResult {
    pub factor_of_safety: f64,
    pub slices: Vec<Slice>,
}

/// Runs the discretizer and the selected solver on one trial circle.
///
/// `None` marks the expected degenerate outcomes: the circle misses the
/// slope, too few slices survive, or no plausible positive factor of
/// safety exists. These are frequent on the coarse grid and are simply
/// skipped by the search.
pub fn evaluate_candidate(
    circle: &TrialCircle,
    slope: &SlopeGeometry,
    soil: &SoilProperties,
    method: Method,
    settings: &SearchSettings,
) -> Option<EquilibriumResult> {
    let slices = discretize(circle, slope, soil, settings.n_slices)?;
    let solver = method.build(settings.iteration);
    let fs = solver.factor_of_safety(soil, &slices, circle.radius)?;
    if fs > MAX_PLAUSIBLE_FS {
        return None;
    }
    Some(EquilibriumResult {
        factor_of_safety: fs,
        slices,
    })
}

/// Stability classification of the governing factor of safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StabilityStatus {
    Stable,
    Marginal,
    Unstable,
}

impl StabilityStatus {
    pub fn classify(fs: f64) -> Self {
        if fs >= 1.5 {
            StabilityStatus::Stable
        } else if fs >= 1.0 {
            StabilityStatus::Marginal
        } else {
            StabilityStatus::Unstable
        }
    }
}

/// The governing (minimum factor of safety) failure surface, the engine's
/// externally visible output record. Report and UI collaborators consume
/// it as immutable data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalSurfaceResult {
    #[serde(rename = "FS")]
    pub factor_of_safety: f64,
    pub critical_center: CenterPoint,
    pub critical_radius: f64,
    pub slices: Vec<Slice>,
    pub status: StabilityStatus,
}

impl CriticalSurfaceResult {
    pub fn new(circle: TrialCircle, result: EquilibriumResult) -> Self {
        Self {
            factor_of_safety: result.factor_of_safety,
            critical_center: circle.center.into(),
            critical_radius: circle.radius,
            status: StabilityStatus::classify(result.factor_of_safety),
            slices: result.slices,
        }
    }
}

/// Outcome of a grid search: either the critical surface or an explicit
/// marker that no candidate produced a usable factor of safety. The
/// marker is a distinct variant, never a numeric sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SearchOutcome {
    Found(CriticalSurfaceResult),
    NotFound,
}

impl SearchOutcome {
    pub fn found(&self) -> Option<&CriticalSurfaceResult> {
        match self {
            SearchOutcome::Found(result) => Some(result),
            SearchOutcome::NotFound => None,
        }
    }
}

/// Searches the candidate grid for the minimum factor of safety.
///
/// The comparison is strictly-less-than, so among ties the candidate
/// encountered first in canonical (cx, cy, R) order wins.
pub fn critical_surface_search(
    slope: &SlopeGeometry,
    soil: &SoilProperties,
    method: Method,
    settings: &SearchSettings,
) -> Result<SearchOutcome> {
    settings.validate()?;
    let circles = candidates(slope, settings);

    let mut best: Option<(TrialCircle, EquilibriumResult)> = None;
    let mut valid = 0usize;
    for circle in &circles {
        let Some(result) = evaluate_candidate(circle, slope, soil, method, settings) else {
            continue;
        };
        valid += 1;
        let better = best
            .as_ref()
            .map_or(true, |(_, b)| result.factor_of_safety < b.factor_of_safety);
        if better {
            best = Some((*circle, result));
        }
    }

    log::debug!(
        "critical-surface search: {} candidates, {} valid",
        circles.len(),
        valid
    );
    Ok(conclude(best))
}

/// Parallel variant of [`critical_surface_search`]. Candidate
/// evaluations are independent, so they distribute freely; the reduction
/// compares `(FS, enumeration index)` lexicographically, which reproduces
/// the sequential first-encountered-wins tie-break bit for bit.
pub fn critical_surface_search_parallel(
    slope: &SlopeGeometry,
    soil: &SoilProperties,
    method: Method,
    settings: &SearchSettings,
) -> Result<SearchOutcome> {
    settings.validate()?;
    let circles = candidates(slope, settings);

    let best = circles
        .par_iter()
        .enumerate()
        .filter_map(|(index, circle)| {
            evaluate_candidate(circle, slope, soil, method, settings)
                .map(|result| (index, *circle, result))
        })
        .min_by(|a, b| {
            (a.2.factor_of_safety, a.0)
                .partial_cmp(&(b.2.factor_of_safety, b.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    Ok(conclude(best.map(|(_, circle, result)| (circle, result))))
}

fn conclude(best: Option<(TrialCircle, EquilibriumResult)>) -> SearchOutcome {
    match best {
        Some((circle, result)) => SearchOutcome::Found(CriticalSurfaceResult::new(circle, result)),
        None => SearchOutcome::NotFound,
    }
}

/// External input record for a single analysis run. Field names follow
/// the caller-facing JSON contract; `ru`, `kh` and `nSlices` are
/// optional with the documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisInput {
    pub height: f64,
    pub slope_angle: f64,
    pub gamma: f64,
    pub cohesion: f64,
    pub friction_angle: f64,
    #[serde(default)]
    pub ru: f64,
    #[serde(default)]
    pub kh: f64,
    #[serde(default = "default_n_slices")]
    pub n_slices: usize,
    pub method: Method,
}

fn default_n_slices() -> usize {
    10
}

impl AnalysisInput {
    /// Geometry described by the record.
    pub fn slope(&self) -> Result<SlopeGeometry> {
        SlopeGeometry::new(self.height, self.slope_angle)
    }

    /// Soil description with the record's optional loading terms applied.
    pub fn soil(&self) -> SoilProperties {
        SoilProperties {
            unit_weight: self.gamma,
            cohesion: self.cohesion,
            friction_angle_deg: self.friction_angle,
            pore_pressure_ratio: self.ru,
            seismic_coefficient: self.kh,
        }
    }

    /// Default grid with the record's slice count.
    pub fn settings(&self) -> SearchSettings {
        SearchSettings {
            n_slices: self.n_slices,
            ..SearchSettings::default()
        }
    }
}

/// Runs the full engine on an input record: builds the geometry and soil
/// description, then searches the default grid for the critical surface.
pub fn analyze(input: &AnalysisInput) -> Result<SearchOutcome> {
    let slope = input.slope()?;
    critical_surface_search(&slope, &input.soil(), input.method, &input.settings())
}
