//! Velocity to color mapping
//!
//! A mapper is configured between cache builds and only read while a build
//! runs, so [`VelocityColorMapper`] is `Sync` and its lookups take `&self`.

mod bar;
mod hsv;

pub use bar::render_color_bar;
pub use hsv::HsvColorMapper;

use crate::core_types::{Rgb8, Vec3};

/// Minimum width of a velocity range; narrower ranges are widened upward
pub const MIN_VELOCITY_RANGE: f32 = 0.001;

/// Maps velocities within a configured range to colors
pub trait VelocityColorMapper: Send + Sync {
    /// Set the velocities mapped to the low and high ends of the color scale
    fn set_velocity_range(&mut self, min: f32, max: f32);

    /// Color of a scalar velocity value
    fn color_of_scalar(&self, velocity: f32) -> Rgb8;

    /// Color of a velocity vector, by magnitude
    fn color_of_vector(&self, velocity: &Vec3) -> Rgb8 {
        self.color_of_scalar(velocity.norm())
    }
}
