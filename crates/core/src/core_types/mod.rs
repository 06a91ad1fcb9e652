//! Core types and utilities

pub mod aabb;
pub mod color;
pub mod image;
pub mod vec3;

pub use aabb::Aabb;
pub use color::Rgb8;
pub use image::RgbImage;
pub use vec3::{Vec2, Vec3};
