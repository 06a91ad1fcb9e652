//! Mapper interpolating between two colors in HSV space

use crate::color::{VelocityColorMapper, MIN_VELOCITY_RANGE};
use crate::core_types::Rgb8;

/// Linear HSV blend from `low_color` at the range minimum to `high_color`
/// at the range maximum, saturating outside the range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HsvColorMapper {
    low_color: Rgb8,
    high_color: Rgb8,
    min_velocity: f32,
    max_velocity: f32,
    low_hsv: [f32; 3],
    high_hsv: [f32; 3],
}

impl Default for HsvColorMapper {
    fn default() -> Self {
        Self::new(Rgb8::BLUE, Rgb8::RED)
    }
}

impl HsvColorMapper {
    /// Create a mapper over the range `[0, 1]`
    pub fn new(low_color: Rgb8, high_color: Rgb8) -> Self {
        Self {
            low_color,
            high_color,
            min_velocity: 0.0,
            max_velocity: 1.0,
            low_hsv: low_color.to_hsv(),
            high_hsv: high_color.to_hsv(),
        }
    }

    pub fn set_colors(&mut self, low_color: Rgb8, high_color: Rgb8) {
        self.low_color = low_color;
        self.high_color = high_color;
        self.low_hsv = low_color.to_hsv();
        self.high_hsv = high_color.to_hsv();
    }

    pub fn low_color(&self) -> Rgb8 {
        self.low_color
    }

    pub fn high_color(&self) -> Rgb8 {
        self.high_color
    }

    /// Effective `(min, max)` after widening
    pub fn velocity_range(&self) -> (f32, f32) {
        (self.min_velocity, self.max_velocity)
    }

    /// Position of `velocity` on the color scale, in `[0, 1]`
    pub fn scale_position(&self, velocity: f32) -> f32 {
        let t = (velocity - self.min_velocity) / (self.max_velocity - self.min_velocity);
        if t.is_nan() {
            0.0
        } else {
            t.clamp(0.0, 1.0)
        }
    }
}

impl VelocityColorMapper for HsvColorMapper {
    fn set_velocity_range(&mut self, min: f32, max: f32) {
        self.min_velocity = min;
        self.max_velocity = max.max(min + MIN_VELOCITY_RANGE);
    }

    fn color_of_scalar(&self, velocity: f32) -> Rgb8 {
        let t = self.scale_position(velocity);
        let lerp = |i: usize| {
            let (a, b) = (self.low_hsv[i], self.high_hsv[i]);
            (a + (b - a) * t).clamp(0.0, 1.0)
        };
        Rgb8::from_hsv(lerp(0), lerp(1), lerp(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Vec3;

    #[test]
    fn test_endpoints() {
        let mut m = HsvColorMapper::default();
        m.set_velocity_range(2.0, 4.0);
        assert_eq!(m.color_of_scalar(2.0), Rgb8::BLUE);
        assert_eq!(m.color_of_scalar(4.0), Rgb8::RED);
        // saturates outside the range
        assert_eq!(m.color_of_scalar(-100.0), Rgb8::BLUE);
        assert_eq!(m.color_of_scalar(100.0), Rgb8::RED);
    }

    #[test]
    fn test_midpoint_is_hsv_blend() {
        let mut m = HsvColorMapper::default();
        m.set_velocity_range(0.0, 1.0);
        // blue hue 2/3 and red hue 0 blend to 1/3, which is green
        assert_eq!(m.color_of_scalar(0.5), Rgb8::new(0, 255, 0));
    }

    #[test]
    fn test_degenerate_range_is_widened() {
        let mut m = HsvColorMapper::default();
        m.set_velocity_range(3.0, 3.0);
        let (lo, hi) = m.velocity_range();
        assert_eq!(lo, 3.0);
        assert!(hi > lo);
        assert_eq!(m.color_of_scalar(3.0), Rgb8::BLUE);
        assert_eq!(m.color_of_scalar(3.5), Rgb8::RED);

        m.set_velocity_range(5.0, 1.0);
        let (lo, hi) = m.velocity_range();
        assert!(hi > lo);
    }

    #[test]
    fn test_vector_uses_magnitude() {
        let mut m = HsvColorMapper::default();
        m.set_velocity_range(0.0, 10.0);
        assert_eq!(
            m.color_of_vector(&Vec3::new(3.0, 4.0, 0.0)),
            m.color_of_scalar(5.0)
        );
    }

    #[test]
    fn test_set_colors() {
        let mut m = HsvColorMapper::default();
        m.set_colors(Rgb8::BLACK, Rgb8::WHITE);
        assert_eq!(m.color_of_scalar(0.0), Rgb8::BLACK);
        assert_eq!(m.color_of_scalar(1.0), Rgb8::WHITE);
        assert_eq!(m.low_color(), Rgb8::BLACK);
    }
}
