//! Vector type aliases for world positions, velocities and slice coordinates.

use nalgebra::{Vector2, Vector3};

/// 3D vector type for positions and velocity samples.
///
/// This is a simple alias for `nalgebra::Vector3<f32>`, used throughout
/// the crate for world positions, cell velocities and glyph orientations.
pub type Vec3 = Vector3<f32>;

/// 2D vector type for positions on a contour slice.
///
/// The two components are the horizontal and vertical display axes of the
/// slice, not necessarily world X and Y.
pub type Vec2 = Vector2<f32>;
