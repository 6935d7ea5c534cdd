//! Discretization of the sliding mass into vertical slices.

use crate::geometry::{SlopeGeometry, SoilProperties, TrialCircle};
use serde::{Deserialize, Serialize};

/// Minimum slice height retained; thinner slivers carry no meaningful
/// weight and mark regions where the circle is not actually under soil.
const MIN_SLICE_HEIGHT: f64 = 1e-3;
/// Slices whose base chord is near-vertical are dropped before
/// aggregation (the chord length 1/cos(alpha) degenerates there).
const MIN_BASE_COS: f64 = 1e-6;
/// A credible sliding mass needs at least this many slices.
const MIN_SLICES: usize = 3;
/// Horizontal window, as multiples of the slope run, outside which the
/// sliding mass is not allowed to extend.
const CLIP_BEFORE_TOE: f64 = 0.5;
const CLIP_BEYOND_CREST: f64 = 2.0;

/// One vertical slice of the assumed sliding mass.
///
/// Computed fresh for every trial circle; only the slices of the winning
/// candidate outlive the search, retained for reporting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slice {
    pub index: usize,
    pub mid_x: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    /// Base inclination in radians, positive where the base dips toward
    /// the toe side of the circle center.
    pub alpha: f64,
    pub base_len: f64,
    pub pore_pressure: f64,
}

/// Intersects `circle` with the ground profile and partitions the region
/// where the arc lies below ground into `n_slices` equal-width slices.
///
/// Returns `None` when fewer than three usable slices survive; such a
/// circle is not a credible failure surface and the caller drops it.
pub fn discretize(
    circle: &TrialCircle,
    slope: &SlopeGeometry,
    soil: &SoilProperties,
    n_slices: usize,
) -> Option<Vec<Slice>> {
    if n_slices == 0 {
        return None;
    }

    let cx = circle.center.x;
    let x_min = (cx - circle.radius).max(-CLIP_BEFORE_TOE * slope.run());
    let x_max = (cx + circle.radius).min(CLIP_BEYOND_CREST * slope.run());
    if x_max <= x_min {
        return None;
    }
    let width = (x_max - x_min) / n_slices as f64;

    let mut slices = Vec::with_capacity(n_slices);
    for i in 0..n_slices {
        let mid_x = x_min + (i as f64 + 0.5) * width;
        let Some(arc_z) = circle.arc_elevation(mid_x) else {
            continue;
        };
        let height = (slope.ground_elevation(mid_x) - arc_z).max(0.0);
        if height < MIN_SLICE_HEIGHT {
            continue;
        }

        // Vertical leg of the radius at mid_x; alpha is the angle of the
        // outward radius from vertical.
        let vertical = circle.center.y - arc_z;
        if vertical / circle.radius < MIN_BASE_COS {
            continue;
        }
        let alpha = (mid_x - cx).atan2(vertical);

        slices.push(Slice {
            index: slices.len(),
            mid_x,
            width,
            height,
            weight: soil.unit_weight * height * width,
            alpha,
            base_len: width / alpha.cos(),
            pore_pressure: soil.pore_pressure_ratio * soil.unit_weight * height,
        });
    }

    if slices.len() < MIN_SLICES {
        return None;
    }
    Some(slices)
}

#[cfg(test)]
mod tests {
    use super::{discretize, MIN_SLICE_HEIGHT};
    use crate::geometry::{SlopeGeometry, SoilProperties, TrialCircle};

    fn slope() -> SlopeGeometry {
        SlopeGeometry::new(10.0, 30.0).expect("slope")
    }

    fn soil() -> SoilProperties {
        SoilProperties::new(18.0, 25.0, 25.0)
    }

    #[test]
    fn produces_valid_slices_for_a_cutting_circle() {
        let slope = slope();
        let circle = TrialCircle::new(0.5 * slope.run(), 12.0, 12.0);
        let slices = discretize(&circle, &slope, &soil(), 10).expect("usable circle");

        assert!(slices.len() >= 3);
        for (i, slice) in slices.iter().enumerate() {
            assert_eq!(slice.index, i);
            assert!(slice.width > 0.0);
            assert!(slice.height >= MIN_SLICE_HEIGHT);
            assert!(slice.weight > 0.0);
            assert!(slice.base_len >= slice.width - 1e-12);
            assert!(slice.alpha.abs() < std::f64::consts::FRAC_PI_2);
        }
    }

    #[test]
    fn weight_and_pore_pressure_follow_soil_parameters() {
        let slope = slope();
        let mut soil = soil();
        soil.pore_pressure_ratio = 0.3;
        let circle = TrialCircle::new(0.5 * slope.run(), 12.0, 12.0);
        let slices = discretize(&circle, &slope, &soil, 10).expect("usable circle");

        for slice in &slices {
            let expected_weight = soil.unit_weight * slice.height * slice.width;
            assert!((slice.weight - expected_weight).abs() < 1e-9);
            let expected_u = 0.3 * soil.unit_weight * slice.height;
            assert!((slice.pore_pressure - expected_u).abs() < 1e-9);
        }
    }

    #[test]
    fn alpha_sign_follows_position_relative_to_center() {
        let slope = slope();
        let circle = TrialCircle::new(0.5 * slope.run(), 12.0, 12.0);
        let slices = discretize(&circle, &slope, &soil(), 10).expect("usable circle");

        for slice in &slices {
            if slice.mid_x > circle.center.x + 1e-9 {
                assert!(slice.alpha > 0.0);
            } else if slice.mid_x < circle.center.x - 1e-9 {
                assert!(slice.alpha < 0.0);
            }
        }
    }

    #[test]
    fn rejects_circle_entirely_above_ground() {
        let slope = slope();
        // Arc bottom sits at y = 25, well above the 10 m crest.
        let circle = TrialCircle::new(0.5 * slope.run(), 30.0, 5.0);
        assert!(discretize(&circle, &slope, &soil(), 10).is_none());
    }

    #[test]
    fn rejects_circle_outside_the_clipped_domain() {
        let slope = slope();
        let circle = TrialCircle::new(10.0 * slope.run(), 12.0, 12.0);
        assert!(discretize(&circle, &slope, &soil(), 10).is_none());
    }

    #[test]
    fn rejects_zero_slice_request() {
        let slope = slope();
        let circle = TrialCircle::new(0.5 * slope.run(), 12.0, 12.0);
        assert!(discretize(&circle, &slope, &soil(), 0).is_none());
    }
}
