//! Velocity field abstraction
//!
//! [`VelocityField`] is the query interface every view samples through. Two
//! implementations exist:
//!
//! - [`ConstantVelocityField`]: a fixed vector inside a ball, for exercising views
//! - [`FluentVelocityField`]: cell-constant samples on an unstructured solver mesh
//!
//! # Parallel access
//!
//! Implementations may keep mutable query state (the mesh field caches the
//! last cell it found), so the trait only requires `Send`. A thread that wants
//! to sample a field calls [`VelocityField::clone_for_parallel_access`] once
//! and keeps the clone for itself. Clones share all immutable data with the
//! field they came from; only the query accelerator is duplicated.

mod constant;
mod fluent;
mod stats;

pub use constant::ConstantVelocityField;
pub use fluent::{FluentFieldData, FluentVelocityField, VELOCITY_ARRAYS};
pub use stats::VelocityStats;

use crate::core_types::{Aabb, Vec3};
use serde::{Deserialize, Serialize};

/// Which velocity quantity a statistic or a contour refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VelocityComponent {
    #[default]
    X,
    Y,
    Z,
    /// Vector length
    Magnitude,
}

impl VelocityComponent {
    /// World axis index, `None` for [`VelocityComponent::Magnitude`]
    pub fn axis(self) -> Option<usize> {
        match self {
            VelocityComponent::X => Some(0),
            VelocityComponent::Y => Some(1),
            VelocityComponent::Z => Some(2),
            VelocityComponent::Magnitude => None,
        }
    }

    /// Extract this component from a velocity sample
    pub fn of(self, velocity: &Vec3) -> f32 {
        self.axis().map_or_else(|| velocity.norm(), |a| velocity[a])
    }
}

/// Map from world position to velocity
pub trait VelocityField: Send {
    /// Velocity at `pos`, `None` where the field is undefined
    fn sample(&self, pos: &Vec3) -> Option<Vec3>;

    /// Largest value of `component` over the whole field
    fn max_velocity(&self, component: VelocityComponent) -> f32;

    /// Smallest value of `component` over the whole field
    fn min_velocity(&self, component: VelocityComponent) -> f32;

    /// Box enclosing every position where [`VelocityField::sample`] can return a value
    fn bounding_box(&self) -> Aabb;

    /// Independent copy for use on another thread
    fn clone_for_parallel_access(&self) -> Box<dyn VelocityField>;
}

/// One clone of `field` per worker thread
pub fn thread_local_clones(field: &dyn VelocityField, count: usize) -> Vec<Box<dyn VelocityField>> {
    (0..count)
        .map(|_| field.clone_for_parallel_access())
        .collect()
}
