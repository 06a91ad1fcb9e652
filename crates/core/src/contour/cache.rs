//! Fixed-resolution color raster of one field slice

use crate::color::VelocityColorMapper;
use crate::contour::ContourAxes;
use crate::core_types::image::put_pixel;
use crate::core_types::{Rgb8, RgbImage, Vec2, Vec3};
use crate::field::{VelocityComponent, VelocityField};
use crate::parallel::WorkerPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::debug;

/// Color of texels where the field is undefined
pub const BACKGROUND: Rgb8 = Rgb8::new(0, 77, 77);

/// Everything besides the mapper and the fields that determines a raster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourParams {
    /// Texels per side
    pub resolution: usize,
    pub axes: ContourAxes,
    /// World coordinate along `axes.depth`
    pub depth: f32,
    pub component: VelocityComponent,
}

/// Square color raster over the field's bounds projected onto a slice plane
///
/// Row 0 lies at the lower edge of the rectangle. The cache never invalidates
/// itself: whoever owns it rebuilds it when the slice, the component or the
/// mapper changes.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityContourCache {
    resolution: usize,
    lower_left: Vec2,
    upper_right: Vec2,
    texels: Vec<Rgb8>,
}

impl VelocityContourCache {
    /// Rasterize a slice using one field clone per worker
    ///
    /// Rows are claimed through a shared counter; the worker with index `i`
    /// samples only through `fields[i]`.
    ///
    /// # Panics
    /// Panics if `fields` is empty or `params.resolution` is zero
    pub fn build(
        mapper: &dyn VelocityColorMapper,
        params: &ContourParams,
        fields: &mut [Box<dyn VelocityField>],
        pool: &WorkerPool,
    ) -> Self {
        assert!(!fields.is_empty(), "contour build needs at least one field clone");
        assert!(params.resolution > 0, "contour resolution must be positive");

        let start = Instant::now();
        let res = params.resolution;
        let axes = params.axes;

        let bounds = fields[0].bounding_box();
        let lower_left = Vec2::new(bounds.lower[axes.horizontal], bounds.lower[axes.vertical]);
        let upper_right = Vec2::new(bounds.upper[axes.horizontal], bounds.upper[axes.vertical]);
        let texel_size = (upper_right - lower_left) / res as f32;

        let thread_count = fields.len();
        let mut texels = vec![BACKGROUND; res * res];
        {
            let rows: Vec<Mutex<&mut [Rgb8]>> = texels.chunks_mut(res).map(Mutex::new).collect();
            let fields: Vec<Mutex<&mut Box<dyn VelocityField>>> =
                fields.iter_mut().map(Mutex::new).collect();
            let next_row = AtomicUsize::new(0);

            pool.run(thread_count, |thread_index| {
                let field = fields[thread_index]
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);

                let mut pos = Vec3::zeros();
                pos[axes.depth] = params.depth;

                loop {
                    let y = next_row.fetch_add(1, Ordering::Relaxed);
                    if y >= res {
                        return;
                    }
                    let mut row = rows[y].lock().unwrap_or_else(PoisonError::into_inner);

                    pos[axes.vertical] = lower_left.y + texel_size.y * (y as f32 + 0.5);
                    for (x, texel) in row.iter_mut().enumerate() {
                        pos[axes.horizontal] = lower_left.x + texel_size.x * (x as f32 + 0.5);

                        let Some(velocity) = field.sample(&pos) else {
                            continue;
                        };
                        *texel = match params.component.axis() {
                            Some(a) => mapper.color_of_scalar(velocity[a]),
                            None => mapper.color_of_vector(&velocity),
                        };
                    }
                }
            });
        }

        debug!(
            "Contour cache {}x{} built on {} threads in {:.1} ms",
            res,
            res,
            thread_count,
            start.elapsed().as_secs_f64() * 1000.0
        );

        Self {
            resolution: res,
            lower_left,
            upper_right,
            texels,
        }
    }

    /// Nearest texel at a world position on the slice plane
    ///
    /// Positions outside the rectangle give [`BACKGROUND`]. Positions on the
    /// upper or right edge read the last row or column.
    pub fn value_at(&self, world: &Vec2) -> Rgb8 {
        if world.x < self.lower_left.x
            || world.y < self.lower_left.y
            || world.x > self.upper_right.x
            || world.y > self.upper_right.y
        {
            return BACKGROUND;
        }

        let uv = (world - self.lower_left).component_div(&(self.upper_right - self.lower_left));
        let last = self.resolution - 1;
        let x = ((uv.x * self.resolution as f32).floor() as usize).min(last);
        let y = ((uv.y * self.resolution as f32).floor() as usize).min(last);
        self.texel(x, y)
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn lower_left(&self) -> Vec2 {
        self.lower_left
    }

    pub fn upper_right(&self) -> Vec2 {
        self.upper_right
    }

    /// Texel at column `x`, row `y` counted from the bottom
    pub fn texel(&self, x: usize, y: usize) -> Rgb8 {
        self.texels[y * self.resolution + x]
    }

    /// Copy into a top-down image
    pub fn to_image(&self) -> RgbImage {
        let res = self.resolution;
        let mut image = RgbImage::new(res, res, BACKGROUND);
        for (row, src) in image.rows_mut().zip(self.texels.chunks(res).rev()) {
            for (x, &color) in src.iter().enumerate() {
                put_pixel(row, x, color);
            }
        }
        image
    }
}
