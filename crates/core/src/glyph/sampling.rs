use crate::core_types::{Aabb, Vec3};
use crate::field::VelocityField;
use crate::glyph::GlyphConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Jittered tries per lattice cell in the uniform strategy
const TRIES_PER_CELL: usize = 10;

/// How glyph positions are distributed over the bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SampleStrategy {
    /// Independent uniform positions
    Random,
    /// One jittered position per cell of a lattice sized to the wanted count
    Uniform,
    /// Halton sequence in bases 2, 3 and 5
    #[default]
    Halton,
}

/// A position where the field is defined, with the velocity found there
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphSample {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Van der Corput radical inverse of `index` in `base`, in `[0, 1)`
pub fn radical_inverse(mut index: u32, base: u32) -> f32 {
    let inv_base = 1.0 / f64::from(base);
    let mut f = 1.0;
    let mut r = 0.0;
    while index > 0 {
        f *= inv_base;
        r += f * f64::from(index % base);
        index /= base;
    }
    r as f32
}

/// Draw glyph samples inside `bounds`
///
/// Returns at most `config.sample_count` samples; fewer when the field is
/// defined on too small a part of the box for the attempt budget.
pub fn sample_glyphs(
    field: &dyn VelocityField,
    bounds: &Aabb,
    config: &GlyphConfig,
) -> Vec<GlyphSample> {
    let budget = config.sample_count.saturating_mul(config.attempts_per_sample);
    match config.strategy {
        SampleStrategy::Random => {
            let mut rng = StdRng::seed_from_u64(config.seed);
            sample_random(field, bounds, config.sample_count, budget, &mut rng)
        }
        SampleStrategy::Uniform => {
            let mut rng = StdRng::seed_from_u64(config.seed);
            sample_uniform(field, bounds, config.sample_count, &mut rng)
        }
        SampleStrategy::Halton => sample_halton(field, bounds, config.sample_count, budget),
    }
}

fn try_sample(field: &dyn VelocityField, position: Vec3) -> Option<GlyphSample> {
    field
        .sample(&position)
        .map(|velocity| GlyphSample { position, velocity })
}

fn sample_random(
    field: &dyn VelocityField,
    bounds: &Aabb,
    count: usize,
    budget: usize,
    rng: &mut StdRng,
) -> Vec<GlyphSample> {
    let extent = bounds.extent();
    (0..budget)
        .filter_map(|_| {
            let t = Vec3::new(rng.random(), rng.random(), rng.random());
            try_sample(field, bounds.lower + extent.component_mul(&t))
        })
        .take(count)
        .collect()
}

fn sample_uniform(
    field: &dyn VelocityField,
    bounds: &Aabb,
    count: usize,
    rng: &mut StdRng,
) -> Vec<GlyphSample> {
    let extent = bounds.extent();
    let volume = bounds.volume();
    if count == 0 || volume <= 0.0 {
        return Vec::new();
    }

    let density = (count as f32 / volume).cbrt();
    let cells = extent.map(|e| ((density * e).ceil() as usize).max(1));
    let side = extent
        .component_div(&cells.map(|n| n as f32))
        .max();

    let mut samples = Vec::with_capacity(count);
    for i in 0..cells.x {
        for j in 0..cells.y {
            for k in 0..cells.z {
                let cell = Vec3::new(i as f32, j as f32, k as f32);
                let hit = (0..TRIES_PER_CELL).find_map(|_| {
                    let jitter = Vec3::new(rng.random(), rng.random(), rng.random());
                    try_sample(field, bounds.lower + (cell + jitter) * side)
                });
                samples.extend(hit);
            }
        }
    }
    samples
}

fn sample_halton(
    field: &dyn VelocityField,
    bounds: &Aabb,
    count: usize,
    budget: usize,
) -> Vec<GlyphSample> {
    let extent = bounds.extent();
    (1..=budget)
        .filter_map(|i| {
            let i = u32::try_from(i).ok()?;
            let t = Vec3::new(
                radical_inverse(i, 2),
                radical_inverse(i, 3),
                radical_inverse(i, 5),
            );
            try_sample(field, bounds.lower + extent.component_mul(&t))
        })
        .take(count)
        .collect()
}
