//! Arrow glyph placement for 3D velocity views
//!
//! Sample positions are drawn inside the field's bounding box, kept only where
//! the field is defined, and turned into per-instance colors and model
//! matrices ready for instanced drawing of an arrow mesh pointing along +Y.

mod instance;
mod sampling;

pub use instance::{arrow_scale, build_instances, model_matrix, GlyphInstance};
pub use sampling::{radical_inverse, sample_glyphs, GlyphSample, SampleStrategy};

use crate::color::VelocityColorMapper;
use crate::core_types::{Aabb, Vec3};
use crate::field::VelocityField;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Glyph sampling settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphConfig {
    /// Number of glyphs wanted
    pub sample_count: usize,

    pub strategy: SampleStrategy,

    /// Candidate positions tried per wanted glyph before giving up
    /// (random and Halton strategies)
    pub attempts_per_sample: usize,

    /// Seed for the random and jittered strategies
    pub seed: u64,

    /// Bounds of the arrow mesh in model space
    pub arrow_bounds: Aabb,
}

impl Default for GlyphConfig {
    fn default() -> Self {
        Self {
            sample_count: 1000,
            strategy: SampleStrategy::Halton,
            attempts_per_sample: 64,
            seed: 0,
            arrow_bounds: Aabb::new(Vec3::new(-0.1, 0.0, -0.1), Vec3::new(0.1, 1.0, 0.1)),
        }
    }
}

/// Sample `field` over its bounding box and build colored, scaled glyphs
///
/// The mapper is used as is; callers normally set its range to the field's
/// magnitude extrema first.
pub fn build_glyphs(
    field: &dyn VelocityField,
    mapper: &dyn VelocityColorMapper,
    config: &GlyphConfig,
) -> Vec<GlyphInstance> {
    let bounds = field.bounding_box();
    let samples = sample_glyphs(field, &bounds, config);
    let scale = arrow_scale(&bounds, &config.arrow_bounds, config.sample_count);
    debug!(
        "Sampled {} of {} glyphs ({:?}), arrow scale {}",
        samples.len(),
        config.sample_count,
        config.strategy,
        scale
    );
    build_instances(&samples, mapper, &Vec3::repeat(scale))
}
