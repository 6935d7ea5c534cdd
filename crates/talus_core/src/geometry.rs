//! Slope cross-section geometry and trial failure circles.

use anyhow::{bail, Result};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Cross-section of a simple homogeneous slope.
///
/// The coordinate system puts the toe at the origin, with x running from
/// toe to crest and y vertical. The ground profile is piecewise linear:
/// flat at elevation zero ahead of the toe, rising at the slope angle over
/// the horizontal run, flat at the crest elevation beyond it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlopeGeometry {
    height: f64,
    angle_deg: f64,
    run: f64,
}

impl SlopeGeometry {
    pub fn new(height: f64, angle_deg: f64) -> Result<Self> {
        if !height.is_finite() || height <= 0.0 {
            bail!("Slope height must be positive.");
        }
        if !angle_deg.is_finite() || angle_deg <= 0.0 || angle_deg >= 90.0 {
            bail!("Slope angle must lie strictly between 0 and 90 degrees.");
        }
        let run = height / angle_deg.to_radians().tan();
        Ok(Self {
            height,
            angle_deg,
            run,
        })
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    /// Horizontal distance from toe to crest.
    pub fn run(&self) -> f64 {
        self.run
    }

    /// Ground surface elevation at horizontal position `x`.
    ///
    /// The domain is unbounded; callers clip as needed.
    pub fn ground_elevation(&self, x: f64) -> f64 {
        if x <= 0.0 {
            0.0
        } else if x >= self.run {
            self.height
        } else {
            x * self.height / self.run
        }
    }
}

/// Strength and loading parameters of the homogeneous soil mass.
///
/// `pore_pressure_ratio` (ru) stands in for a full seepage analysis;
/// `seismic_coefficient` (kh) applies pseudo-static earthquake loading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SoilProperties {
    pub unit_weight: f64,
    pub cohesion: f64,
    pub friction_angle_deg: f64,
    #[serde(default)]
    pub pore_pressure_ratio: f64,
    #[serde(default)]
    pub seismic_coefficient: f64,
}

impl SoilProperties {
    pub fn new(unit_weight: f64, cohesion: f64, friction_angle_deg: f64) -> Self {
        Self {
            unit_weight,
            cohesion,
            friction_angle_deg,
            pore_pressure_ratio: 0.0,
            seismic_coefficient: 0.0,
        }
    }

    pub(crate) fn tan_phi(&self) -> f64 {
        self.friction_angle_deg.to_radians().tan()
    }
}

/// One candidate circular failure surface: a center and radius in the
/// slope's coordinate system. Pure value, created transiently by the
/// search and never mutated.
#[derive(Debug, Clone, Copy)]
pub struct TrialCircle {
    pub center: Point2<f64>,
    pub radius: f64,
}

impl TrialCircle {
    pub fn new(cx: f64, cy: f64, radius: f64) -> Self {
        Self {
            center: Point2::new(cx, cy),
            radius,
        }
    }

    /// Elevation of the lower circular arc at horizontal position `x`,
    /// or `None` where the circle does not reach.
    pub fn arc_elevation(&self, x: f64) -> Option<f64> {
        let dx = x - self.center.x;
        let chord = self.radius * self.radius - dx * dx;
        if chord < 0.0 {
            return None;
        }
        Some(self.center.y - chord.sqrt())
    }
}

/// Plain serializable mirror of a circle center for output records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CenterPoint {
    pub x: f64,
    pub y: f64,
}

impl From<Point2<f64>> for CenterPoint {
    fn from(value: Point2<f64>) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}
