use serde::{Deserialize, Serialize};

/// World axis indices mapped to the horizontal, vertical and depth directions
/// of a slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContourAxes {
    pub horizontal: usize,
    pub vertical: usize,
    pub depth: usize,
}

impl ContourAxes {
    /// # Panics
    /// Panics unless the three indices are a permutation of `0, 1, 2`
    pub fn new(horizontal: usize, vertical: usize, depth: usize) -> Self {
        assert!(
            horizontal < 3 && vertical < 3 && depth < 3,
            "axis index out of range"
        );
        assert!(
            horizontal != vertical && vertical != depth && horizontal != depth,
            "contour axes must be distinct"
        );
        Self {
            horizontal,
            vertical,
            depth,
        }
    }
}

/// Axis the viewer looks along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CameraDirection {
    X,
    #[default]
    Y,
    Z,
}

impl CameraDirection {
    pub fn axes(self) -> ContourAxes {
        match self {
            CameraDirection::X => ContourAxes::new(1, 2, 0),
            CameraDirection::Y => ContourAxes::new(0, 2, 1),
            CameraDirection::Z => ContourAxes::new(0, 1, 2),
        }
    }
}
