//! 2D contour slices through a velocity field
//!
//! [`VelocityContourCache`] rasterizes one axis-aligned slice at a fixed
//! resolution. [`ContourView`] decides when that raster is stale and resamples
//! it into viewport images of arbitrary size.

mod axes;
mod cache;
mod view;

pub use axes::{CameraDirection, ContourAxes};
pub use cache::{ContourParams, VelocityContourCache, BACKGROUND};
pub use view::{ContourConfig, ContourView};
