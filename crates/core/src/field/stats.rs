//! Precomputed velocity extrema

use crate::core_types::Vec3;
use crate::field::VelocityComponent;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-axis and magnitude extrema over every cell of a field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityStats {
    pub min_axis: Vec3,
    pub max_axis: Vec3,
    pub min_magnitude: f32,
    pub max_magnitude: f32,
}

impl VelocityStats {
    /// Identity element for [`VelocityStats::merge`]
    fn empty() -> Self {
        Self {
            min_axis: Vec3::repeat(f32::MAX),
            max_axis: Vec3::repeat(f32::MIN),
            min_magnitude: f32::MAX,
            max_magnitude: f32::MIN,
        }
    }

    fn include(mut self, v: &Vec3) -> Self {
        self.min_axis = self.min_axis.inf(v);
        self.max_axis = self.max_axis.sup(v);
        let len = v.norm();
        self.min_magnitude = self.min_magnitude.min(len);
        self.max_magnitude = self.max_magnitude.max(len);
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            min_axis: self.min_axis.inf(&other.min_axis),
            max_axis: self.max_axis.sup(&other.max_axis),
            min_magnitude: self.min_magnitude.min(other.min_magnitude),
            max_magnitude: self.max_magnitude.max(other.max_magnitude),
        }
    }

    /// Compute extrema over `velocities` in parallel
    ///
    /// `velocities` must not be empty; extrema of nothing are undefined.
    pub fn from_velocities(velocities: &[Vec3]) -> Self {
        assert!(
            !velocities.is_empty(),
            "velocity statistics need at least one sample"
        );
        velocities
            .par_iter()
            .fold(Self::empty, Self::include)
            .reduce(Self::empty, Self::merge)
    }

    pub fn max(&self, component: VelocityComponent) -> f32 {
        component
            .axis()
            .map_or(self.max_magnitude, |a| self.max_axis[a])
    }

    pub fn min(&self, component: VelocityComponent) -> f32 {
        component
            .axis()
            .map_or(self.min_magnitude, |a| self.min_axis[a])
    }
}
