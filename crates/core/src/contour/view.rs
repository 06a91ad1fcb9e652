//! Headless contour view: slice selection, viewport and cache invalidation

use crate::color::{render_color_bar, HsvColorMapper, VelocityColorMapper};
use crate::contour::{CameraDirection, ContourParams, VelocityContourCache, BACKGROUND};
use crate::core_types::image::put_pixel;
use crate::core_types::{Rgb8, RgbImage, Vec2, Vec3};
use crate::field::{thread_local_clones, VelocityComponent, VelocityField};
use crate::parallel::WorkerPool;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Wheel delta of one detent
const WHEEL_STEP: i32 = 120;

/// Scale applied to the visible rectangle per wheel detent when zooming out
const ZOOM_FACTOR: f32 = 1.1;

/// Contour view settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Texels per side of the cached raster, independent of the viewport size
    pub resolution: usize,

    /// Worker threads for the shared pool; `-1` uses every hardware thread
    pub worker_count: i32,

    /// Fraction of the viewport left empty on each side when fitting the field
    pub margin: f32,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            resolution: 4096,
            worker_count: -1,
            margin: 0.1,
        }
    }
}

/// Interactive slice view over a velocity field, without any windowing
///
/// Owns one field clone per pool thread and a contour cache. Anything that
/// changes what the cache holds (camera direction, component, depth, mapper)
/// drops the cache; [`ContourView::render`] rebuilds it on demand. Panning,
/// zooming and resizing only change how the cache is resampled.
pub struct ContourView {
    fields: Vec<Box<dyn VelocityField>>,
    pool: Arc<WorkerPool>,
    config: ContourConfig,
    mapper: HsvColorMapper,
    velocity_range: (f32, f32),

    camera: CameraDirection,
    component: VelocityComponent,
    depth: f32,
    depth_range: (f32, f32),

    width: usize,
    height: usize,
    lower_left: Vec2,
    upper_right: Vec2,

    cache: Option<VelocityContourCache>,
}

impl ContourView {
    /// Create a view looking along Y at the X component, fitted to a
    /// `width × height` viewport
    pub fn new(
        field: &dyn VelocityField,
        pool: Arc<WorkerPool>,
        config: ContourConfig,
        width: usize,
        height: usize,
    ) -> Self {
        let fields = thread_local_clones(field, pool.thread_count());
        let mut view = Self {
            fields,
            pool,
            config,
            mapper: HsvColorMapper::default(),
            velocity_range: (0.0, 1.0),
            camera: CameraDirection::default(),
            component: VelocityComponent::default(),
            depth: 0.0,
            depth_range: (0.0, 0.0),
            width,
            height,
            lower_left: Vec2::zeros(),
            upper_right: Vec2::zeros(),
            cache: None,
        };
        view.initialize_world_rect();
        view.initialize_depth();
        view.update_velocity_range();
        view
    }

    pub fn camera_direction(&self) -> CameraDirection {
        self.camera
    }

    pub fn component(&self) -> VelocityComponent {
        self.component
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Bounds of the depth slider along the current depth axis
    pub fn depth_range(&self) -> (f32, f32) {
        self.depth_range
    }

    /// Range currently fed to the color mapper
    pub fn velocity_range(&self) -> (f32, f32) {
        self.velocity_range
    }

    pub fn mapper(&self) -> &HsvColorMapper {
        &self.mapper
    }

    pub fn config(&self) -> &ContourConfig {
        &self.config
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Visible world rectangle as `(lower_left, upper_right)`
    pub fn world_rect(&self) -> (Vec2, Vec2) {
        (self.lower_left, self.upper_right)
    }

    pub fn is_cache_dirty(&self) -> bool {
        self.cache.is_none()
    }

    /// Last built cache, if still valid
    pub fn cache(&self) -> Option<&VelocityContourCache> {
        self.cache.as_ref()
    }

    /// Look along another axis; refits the viewport and recenters the depth
    pub fn set_camera_direction(&mut self, camera: CameraDirection) {
        self.camera = camera;
        self.cache = None;
        self.initialize_world_rect();
        self.initialize_depth();
    }

    /// Color another component; the mapper range follows the field's extrema
    pub fn set_component(&mut self, component: VelocityComponent) {
        self.component = component;
        self.cache = None;
        self.update_velocity_range();
    }

    /// Move the slice, clamped to the field's extent along the depth axis
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth.clamp(self.depth_range.0, self.depth_range.1);
        self.cache = None;
    }

    pub fn set_mapper_colors(&mut self, low: Rgb8, high: Rgb8) {
        self.mapper.set_colors(low, high);
        self.cache = None;
    }

    /// Override the mapped velocity range until the component changes
    pub fn set_velocity_range(&mut self, min: f32, max: f32) {
        self.velocity_range = (min, max);
        self.mapper.set_velocity_range(min, max);
        self.cache = None;
    }

    /// Legend for the current mapper and range
    pub fn color_bar(&self, width: usize, height: usize) -> RgbImage {
        let (low, high) = self.velocity_range;
        render_color_bar(&self.mapper, low, high, width, height)
    }

    /// Change the viewport size, keeping the visible center fixed
    pub fn resize(&mut self, width: usize, height: usize) {
        let (old_width, old_height) = (self.width, self.height);
        self.width = width;
        self.height = height;
        if width == 0 || height == 0 {
            return;
        }
        if old_width == 0 || old_height == 0 {
            self.initialize_world_rect();
            return;
        }

        let center = (self.lower_left + self.upper_right) * 0.5;
        let half = center - self.lower_left;
        let half_x = half.x * width as f32 / old_width as f32;
        let half = Vec2::new(half_x, half_x * height as f32 / width as f32);

        self.lower_left = center - half;
        self.upper_right = center + half;
    }

    /// Drag the view by a pixel delta, screen y pointing down
    pub fn pan(&mut self, dx: i32, dy: i32) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let offset = (self.upper_right - self.lower_left)
            .component_mul(&Vec2::new(-dx as f32, dy as f32))
            .component_div(&self.viewport_size());
        self.lower_left += offset;
        self.upper_right += offset;
    }

    /// Zoom around the pixel `(x, y)`; positive wheel deltas zoom in
    pub fn zoom(&mut self, x: i32, y: i32, wheel_delta: i32) {
        if self.width == 0 || self.height == 0 || wheel_delta == 0 {
            return;
        }
        let cursor = self.pixel_to_world(x as f32 + 0.5, self.height as f32 - 0.5 - y as f32);

        let steps = wheel_delta.unsigned_abs().div_ceil(WHEEL_STEP.unsigned_abs()) as i32;
        let scale = if wheel_delta > 0 {
            ZOOM_FACTOR.recip().powi(steps)
        } else {
            ZOOM_FACTOR.powi(steps)
        };

        self.lower_left = cursor + (self.lower_left - cursor) * scale;
        self.upper_right = cursor + (self.upper_right - cursor) * scale;
    }

    /// World position under the center of pixel `(x, y)` on the current slice
    pub fn to_world_position(&self, x: i32, y: i32) -> Option<Vec3> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let plane = self.pixel_to_world(x as f32 + 0.5, self.height as f32 - 0.5 - y as f32);
        let axes = self.camera.axes();

        let mut pos = Vec3::zeros();
        pos[axes.horizontal] = plane.x;
        pos[axes.vertical] = plane.y;
        pos[axes.depth] = self.depth;
        Some(pos)
    }

    /// Sample the field directly, bypassing the cache
    pub fn velocity_at(&self, world: &Vec3) -> Option<Vec3> {
        self.fields[0].sample(world)
    }

    /// Render the viewport, rebuilding the cache first if it was invalidated
    pub fn render(&mut self) -> RgbImage {
        let params = ContourParams {
            resolution: self.config.resolution,
            axes: self.camera.axes(),
            depth: self.depth,
            component: self.component,
        };
        let cache = self.cache.get_or_insert_with(|| {
            debug!(
                "Rebuilding contour cache: axes {:?}, component {:?}, depth {}",
                params.axes, params.component, params.depth
            );
            VelocityContourCache::build(&self.mapper, &params, &mut self.fields, &self.pool)
        });

        let (width, height) = (self.width, self.height);
        let mut image = RgbImage::new(width, height, BACKGROUND);
        if width == 0 || height == 0 {
            return image;
        }

        let texel = (self.upper_right - self.lower_left).component_div(&Vec2::new(
            width as f32,
            height as f32,
        ));
        let lower_left = self.lower_left;
        {
            let rows: Vec<Mutex<&mut [u8]>> = image.rows_mut().map(Mutex::new).collect();
            let next_row = AtomicUsize::new(0);

            self.pool.run(self.pool.thread_count(), |_| loop {
                let y = next_row.fetch_add(1, Ordering::Relaxed);
                if y >= height {
                    return;
                }
                let mut row = rows[height - 1 - y]
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);

                let world_y = lower_left.y + texel.y * (y as f32 + 0.5);
                for x in 0..width {
                    let world = Vec2::new(lower_left.x + texel.x * (x as f32 + 0.5), world_y);
                    put_pixel(&mut row, x, cache.value_at(&world));
                }
            });
        }
        image
    }

    fn viewport_size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    fn pixel_to_world(&self, x: f32, y: f32) -> Vec2 {
        self.lower_left
            + (self.upper_right - self.lower_left)
                .component_mul(&Vec2::new(x, y))
                .component_div(&self.viewport_size())
    }

    /// Fit the projected field bounds into the viewport with a margin,
    /// preserving aspect ratio
    fn initialize_world_rect(&mut self) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let bounds = self.fields[0].bounding_box();
        let axes = self.camera.axes();

        let size = self.viewport_size();
        let margin = (size * self.config.margin).map(f32::floor);
        let lower = Vec2::new(bounds.lower[axes.horizontal], bounds.lower[axes.vertical]);
        let upper = Vec2::new(bounds.upper[axes.horizontal], bounds.upper[axes.vertical]);

        let extent = (upper - lower).map(|e| e.max(f32::EPSILON));
        let fit = (size - margin * 2.0).component_div(&extent);
        let scale = fit.x.min(fit.y);
        let origin = (size - (lower + upper) * scale) * 0.5;

        self.lower_left = -origin / scale;
        self.upper_right = (size - origin) / scale;
    }

    fn initialize_depth(&mut self) {
        let bounds = self.fields[0].bounding_box();
        let axis = self.camera.axes().depth;
        self.depth_range = (bounds.lower[axis], bounds.upper[axis]);
        self.depth = 0.5 * (self.depth_range.0 + self.depth_range.1);
    }

    fn update_velocity_range(&mut self) {
        let field = &self.fields[0];
        let range = (
            field.min_velocity(self.component),
            field.max_velocity(self.component),
        );
        self.velocity_range = range;
        self.mapper.set_velocity_range(range.0, range.1);
    }
}
