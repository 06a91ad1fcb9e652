//! Velocity Field Visualization Core Library
//!
//! Query and rasterization core for inspecting 3D velocity fields exported by
//! CFD solvers. A field answers "what is the velocity here"; views slice it
//! into color images or scatter arrow glyphs through it.
//!
//! ## Contour Pipeline
//!
//! - [`FluentVelocityField`] locates the mesh cell containing a point and
//!   returns its cell-constant velocity
//! - [`VelocityContourCache`] rasterizes a slice on a [`WorkerPool`], one
//!   field clone per worker
//! - [`ContourView`] tracks when the cache is stale and resamples it into
//!   viewport images

// Core types and utilities
pub mod core_types;
pub mod error;

// Mesh storage, readers and point location
pub mod mesh;

// Velocity fields
pub mod field;

// Rendering support
pub mod color;
pub mod contour;
pub mod glyph;
pub mod parallel;

// Re-export core types
pub use core_types::{Aabb, Rgb8, RgbImage, Vec2, Vec3};
pub use error::FieldLoadError;

// Re-export field types
pub use field::{
    ConstantVelocityField, FluentVelocityField, VelocityComponent, VelocityField, VelocityStats,
};
pub use mesh::{CellDataSet, CellLocator};

// Re-export rendering types
pub use color::{HsvColorMapper, VelocityColorMapper};
pub use contour::{CameraDirection, ContourConfig, ContourView, VelocityContourCache};
pub use glyph::{GlyphConfig, GlyphInstance, SampleStrategy};
pub use parallel::WorkerPool;
