//! Vertical color legend raster

use crate::color::VelocityColorMapper;
use crate::core_types::{Rgb8, RgbImage};

/// Render a `width × height` legend running from `low` at the bottom to
/// `high` at the top
pub fn render_color_bar(
    mapper: &dyn VelocityColorMapper,
    low: f32,
    high: f32,
    width: usize,
    height: usize,
) -> RgbImage {
    let mut image = RgbImage::new(width, height, Rgb8::WHITE);
    for y in 0..height {
        let t = (y as f32 + 0.5) / height as f32;
        let color = mapper.color_of_scalar(low + (high - low) * t);
        for x in 0..width {
            image.set_pixel(x, height - 1 - y, color);
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::HsvColorMapper;

    #[test]
    fn test_bar_runs_bottom_to_top() {
        let mut m = HsvColorMapper::default();
        m.set_velocity_range(0.0, 1.0);
        let bar = render_color_bar(&m, 0.0, 1.0, 4, 64);

        assert_eq!(bar.width(), 4);
        assert_eq!(bar.height(), 64);
        assert_eq!(bar.pixel(0, 63), m.color_of_scalar(0.5 / 64.0));
        assert_eq!(bar.pixel(3, 0), m.color_of_scalar(63.5 / 64.0));
        // rows are uniform
        for y in 0..64 {
            assert_eq!(bar.pixel(0, y), bar.pixel(3, y));
        }
    }

    #[test]
    fn test_empty_bar() {
        let m = HsvColorMapper::default();
        let bar = render_color_bar(&m, 0.0, 1.0, 0, 0);
        assert!(bar.as_bytes().is_empty());
    }
}
