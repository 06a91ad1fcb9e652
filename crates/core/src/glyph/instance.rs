use crate::color::VelocityColorMapper;
use crate::core_types::{Aabb, Rgb8, Vec3};
use crate::glyph::GlyphSample;
use nalgebra::{Matrix3, Matrix4};

/// Per-instance data for drawing one arrow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphInstance {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Rgb8,
    /// Arrow model space to world space
    pub model: Matrix4<f32>,
}

/// Uniform arrow scale so that `count` arrows roughly fill the field volume
pub fn arrow_scale(field_bounds: &Aabb, arrow_bounds: &Aabb, count: usize) -> f32 {
    let field_volume = field_bounds.volume().abs();
    let arrow_volume = arrow_bounds.volume().abs();
    field_volume / (arrow_volume * count as f32)
}

/// Translate to `position`, point the model +Y axis along `velocity`, scale
/// by `scale` in model space
pub fn model_matrix(position: &Vec3, velocity: &Vec3, scale: &Vec3) -> Matrix4<f32> {
    Matrix4::new_translation(position)
        * frame_along(velocity).to_homogeneous()
        * Matrix4::new_nonuniform_scaling(scale)
}

/// Right-handed orthonormal frame whose second column is `direction`
fn frame_along(direction: &Vec3) -> Matrix3<f32> {
    let Some(y) = direction.try_normalize(f32::EPSILON) else {
        return Matrix3::identity();
    };
    let helper = if y.x.abs() > 0.9 { Vec3::y() } else { Vec3::x() };
    let z = helper.cross(&y).normalize();
    let x = y.cross(&z);
    Matrix3::from_columns(&[x, y, z])
}

pub fn build_instances(
    samples: &[GlyphSample],
    mapper: &dyn VelocityColorMapper,
    scale: &Vec3,
) -> Vec<GlyphInstance> {
    samples
        .iter()
        .map(|s| GlyphInstance {
            position: s.position,
            velocity: s.velocity,
            color: mapper.color_of_vector(&s.velocity),
            model: model_matrix(&s.position, &s.velocity, scale),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::HsvColorMapper;
    use approx::assert_relative_eq;
    use nalgebra::Vector4;

    #[test]
    fn test_arrow_scale() {
        let field = Aabb::new(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let arrow = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 0.5));
        assert_relative_eq!(arrow_scale(&field, &arrow, 4), 4.0);
    }

    #[test]
    fn test_frame_is_rotation() {
        for d in [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(-1.0, 2.0, 5.0),
        ] {
            let r = frame_along(&d);
            assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-5);
            assert_relative_eq!(r * r.transpose(), Matrix3::identity(), epsilon = 1e-5);
            assert_relative_eq!(r.column(1).into_owned(), d.normalize(), epsilon = 1e-6);
        }
        assert_eq!(frame_along(&Vec3::zeros()), Matrix3::identity());
    }

    #[test]
    fn test_model_matrix_maps_arrow_tip() {
        let m = model_matrix(
            &Vec3::new(1.0, 2.0, 3.0),
            &Vec3::new(0.0, 0.0, 4.0),
            &Vec3::repeat(0.5),
        );
        // the tip of a unit arrow along +Y ends half a unit along +Z
        let tip = m * Vector4::new(0.0, 1.0, 0.0, 1.0);
        assert_relative_eq!(tip, Vector4::new(1.0, 2.0, 3.5, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_instances_colored_by_magnitude() {
        let mut mapper = HsvColorMapper::default();
        mapper.set_velocity_range(0.0, 10.0);
        let samples = [GlyphSample {
            position: Vec3::zeros(),
            velocity: Vec3::new(6.0, 8.0, 0.0),
        }];
        let instances = build_instances(&samples, &mapper, &Vec3::repeat(1.0));
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].color, mapper.color_of_scalar(10.0));
    }
}
