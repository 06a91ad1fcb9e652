//! Axis-aligned bounding boxes

use crate::core_types::vec3::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in world space
///
/// An empty box has `lower > upper` on every axis; extending it with a point
/// yields the degenerate box containing just that point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner (m)
    pub lower: Vec3,
    /// Maximum corner (m)
    pub upper: Vec3,
}

impl Aabb {
    /// Create a box from its two corners
    pub fn new(lower: Vec3, upper: Vec3) -> Self {
        Self { lower, upper }
    }

    /// The empty box, identity element for [`Aabb::extend`] and [`Aabb::union`]
    pub fn empty() -> Self {
        Self {
            lower: Vec3::repeat(f32::MAX),
            upper: Vec3::repeat(f32::MIN),
        }
    }

    /// Unit cube `[0, 1]³`
    pub fn unit() -> Self {
        Self::new(Vec3::zeros(), Vec3::repeat(1.0))
    }

    /// Smallest box enclosing all `points`
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec3>,
    {
        points.into_iter().fold(Self::empty(), |mut b, p| {
            b.extend(p);
            b
        })
    }

    /// Grow the box to contain `p`
    pub fn extend(&mut self, p: &Vec3) {
        self.lower = self.lower.inf(p);
        self.upper = self.upper.sup(p);
    }

    /// Smallest box enclosing both boxes
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            lower: self.lower.inf(&other.lower),
            upper: self.upper.sup(&other.upper),
        }
    }

    /// `true` if no point has been added
    pub fn is_empty(&self) -> bool {
        self.lower.x > self.upper.x || self.lower.y > self.upper.y || self.lower.z > self.upper.z
    }

    /// Closed containment test
    pub fn contains(&self, p: &Vec3) -> bool {
        (0..3).all(|i| p[i] >= self.lower[i] && p[i] <= self.upper[i])
    }

    /// Edge lengths (zero vector for an empty box)
    pub fn extent(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::zeros()
        } else {
            self.upper - self.lower
        }
    }

    pub fn center(&self) -> Vec3 {
        0.5 * (self.lower + self.upper)
    }

    /// Product of the edge lengths
    pub fn volume(&self) -> f32 {
        self.extent().product()
    }

    /// Length of the main diagonal
    pub fn diagonal(&self) -> f32 {
        self.extent().norm()
    }

    /// Box grown by `margin` on every side
    #[must_use]
    pub fn padded(&self, margin: f32) -> Self {
        Self {
            lower: self.lower.add_scalar(-margin),
            upper: self.upper.add_scalar(margin),
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let points = [
            Vec3::new(1.0, -2.0, 3.0),
            Vec3::new(-1.0, 4.0, 0.5),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let b = Aabb::from_points(&points);
        assert_eq!(b.lower, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.upper, Vec3::new(1.0, 4.0, 3.0));
        assert!(points.iter().all(|p| b.contains(p)));
    }

    #[test]
    fn test_empty_box() {
        let b = Aabb::empty();
        assert!(b.is_empty());
        assert_eq!(b.extent(), Vec3::zeros());
        assert!(!b.contains(&Vec3::zeros()));

        let u = b.union(&Aabb::unit());
        assert_eq!(u, Aabb::unit());
    }

    #[test]
    fn test_contains_is_closed() {
        let b = Aabb::unit();
        assert!(b.contains(&Vec3::new(1.0, 1.0, 1.0)));
        assert!(b.contains(&Vec3::new(0.0, 0.5, 1.0)));
        assert!(!b.contains(&Vec3::new(1.0001, 0.5, 0.5)));
        assert!((b.diagonal() - 3.0_f32.sqrt()).abs() < 1e-6);
    }
}
