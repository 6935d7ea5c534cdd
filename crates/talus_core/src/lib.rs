//! The `talus_core` crate is the slope-stability engine for Talus: it
//! computes the factor of safety of a homogeneous slope against
//! rotational failure with the limit-equilibrium method of slices, and
//! searches a grid of circular trial surfaces for the critical
//! (minimum-FS) one.
//!
//! Key components:
//! - **Geometry**: piecewise-linear ground profile, trial circles, soil
//!   parameters.
//! - **Slices**: discretization of the sliding mass into vertical slices.
//! - **Solvers**: Fellenius, Bishop-simplified and Janbu-simplified
//!   reductions of a slice list to a factor of safety.
//! - **Search**: grid enumeration of trial circles retaining the
//!   minimum, with sequential and parallel drivers.

pub mod geometry;
pub mod search;
pub mod slices;
pub mod solvers;
