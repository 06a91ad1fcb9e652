//! Constant velocity field for debugging views

use crate::core_types::{Aabb, Vec3};
use crate::field::{VelocityComponent, VelocityField};

/// Margin added around the constant value so color ranges are not degenerate
const RANGE_MARGIN: f32 = 0.1;

/// Ball radius; the ball is centered in the unit cube
const RADIUS: f32 = 0.5;

/// A fixed velocity inside the ball of radius 0.5 centered at (0.5, 0.5, 0.5)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantVelocityField {
    velocity: Vec3,
    magnitude: f32,
}

impl ConstantVelocityField {
    pub fn new(velocity: Vec3) -> Self {
        Self {
            velocity,
            magnitude: velocity.norm(),
        }
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn value(&self, component: VelocityComponent) -> f32 {
        component
            .axis()
            .map_or(self.magnitude, |a| self.velocity[a])
    }
}

impl VelocityField for ConstantVelocityField {
    fn sample(&self, pos: &Vec3) -> Option<Vec3> {
        ((pos - Vec3::repeat(0.5)).norm() < RADIUS).then_some(self.velocity)
    }

    fn max_velocity(&self, component: VelocityComponent) -> f32 {
        self.value(component) + RANGE_MARGIN
    }

    fn min_velocity(&self, component: VelocityComponent) -> f32 {
        self.value(component) - RANGE_MARGIN
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::unit()
    }

    fn clone_for_parallel_access(&self) -> Box<dyn VelocityField> {
        Box::new(*self)
    }
}
