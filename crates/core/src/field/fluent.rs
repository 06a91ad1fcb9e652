//! Velocity field backed by a solver mesh with per-cell velocity samples
//!
//! Each cell carries one constant velocity vector. A query finds the cell
//! containing the point and returns that vector unchanged: there is no
//! interpolation across cell boundaries, since the exports this reads only
//! provide cell-centred values.

use crate::core_types::{Aabb, Vec3};
use crate::error::FieldLoadError;
use crate::field::{VelocityComponent, VelocityField, VelocityStats};
use crate::mesh::{read_dataset, CellDataSet, CellLocator, ConvexCell};
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Names of the per-cell arrays holding the X, Y and Z velocity components
pub const VELOCITY_ARRAYS: [&str; 3] = ["X_VELOCITY", "Y_VELOCITY", "Z_VELOCITY"];

/// Immutable part of a mesh field, shared by every clone
#[derive(Debug)]
pub struct FluentFieldData {
    cells: Vec<ConvexCell>,
    velocities: Vec<Vec3>,
    stats: VelocityStats,
    bounds: Aabb,
}

impl FluentFieldData {
    pub fn cells(&self) -> &[ConvexCell] {
        &self.cells
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn stats(&self) -> &VelocityStats {
        &self.stats
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }
}

/// Cell-constant velocity field loaded from a solver export
///
/// Holds the shared mesh data behind an `Arc` plus a locator owned by this
/// instance. The locator caches its last hit, so one instance must not be
/// queried from two threads; use [`VelocityField::clone_for_parallel_access`].
#[derive(Debug)]
pub struct FluentVelocityField {
    data: Arc<FluentFieldData>,
    locator: CellLocator,
}

impl FluentVelocityField {
    /// Load a field from a dataset file (`.vtk` or `.json`)
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed, or if the dataset
    /// does not describe a usable velocity field (see [`Self::from_dataset`])
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FieldLoadError> {
        let path = path.as_ref();
        let field = Self::from_dataset(&read_dataset(path)?)?;
        info!("Cells in {}: {}", path.display(), field.cell_count());
        Ok(field)
    }

    /// Build a field from an in-memory dataset
    ///
    /// # Errors
    /// - `InvalidMesh` if a cell is malformed
    /// - `EmptyMesh` if there are no cells
    /// - `MissingArray` if any of [`VELOCITY_ARRAYS`] is absent
    /// - `ArrayLength` if a velocity array does not have one value per cell
    pub fn from_dataset(dataset: &CellDataSet) -> Result<Self, FieldLoadError> {
        dataset.validate()?;

        let n = dataset.cell_count();
        if n == 0 {
            return Err(FieldLoadError::EmptyMesh);
        }

        let mut components: [&[f64]; 3] = [&[]; 3];
        for (slot, name) in components.iter_mut().zip(VELOCITY_ARRAYS) {
            let values = dataset
                .cell_array(name)
                .ok_or_else(|| FieldLoadError::MissingArray(name.to_string()))?;
            if values.len() != n {
                return Err(FieldLoadError::ArrayLength {
                    name: name.to_string(),
                    expected: n,
                    actual: values.len(),
                });
            }
            *slot = values;
        }

        let velocities: Vec<Vec3> = (0..n)
            .map(|i| {
                Vec3::new(
                    components[0][i] as f32,
                    components[1][i] as f32,
                    components[2][i] as f32,
                )
            })
            .collect();

        let cells: Vec<ConvexCell> = dataset
            .cells
            .par_iter()
            .map(|c| ConvexCell::from_cell(c, &dataset.points))
            .collect();
        let degenerate = cells.iter().filter(|c| c.is_degenerate()).count();
        if degenerate > 0 {
            warn!("{degenerate} of {n} cells enclose no volume and will never be sampled");
        }

        let data = FluentFieldData {
            stats: VelocityStats::from_velocities(&velocities),
            bounds: dataset.bounds(),
            cells,
            velocities,
        };
        let locator = CellLocator::build(&data.cells);

        Ok(Self {
            data: Arc::new(data),
            locator,
        })
    }

    pub fn cell_count(&self) -> usize {
        self.data.cells.len()
    }

    /// Velocity stored for cell `index`
    pub fn cell_velocity(&self, index: usize) -> Option<Vec3> {
        self.data.velocities.get(index).copied()
    }

    pub fn stats(&self) -> &VelocityStats {
        &self.data.stats
    }

    /// Shared immutable data
    pub fn data(&self) -> &Arc<FluentFieldData> {
        &self.data
    }

    /// Index of the cell containing `pos`
    pub fn locate(&self, pos: &Vec3) -> Option<usize> {
        self.locator
            .find_cell(&self.data.cells, pos)
            .map(|id| id as usize)
    }
}

impl VelocityField for FluentVelocityField {
    fn sample(&self, pos: &Vec3) -> Option<Vec3> {
        self.locate(pos).map(|id| self.data.velocities[id])
    }

    fn max_velocity(&self, component: VelocityComponent) -> f32 {
        self.data.stats.max(component)
    }

    fn min_velocity(&self, component: VelocityComponent) -> f32 {
        self.data.stats.min(component)
    }

    fn bounding_box(&self) -> Aabb {
        self.data.bounds
    }

    fn clone_for_parallel_access(&self) -> Box<dyn VelocityField> {
        Box::new(Self {
            data: Arc::clone(&self.data),
            locator: CellLocator::build(&self.data.cells),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Cell, CellKind};

    fn two_cell_dataset() -> CellDataSet {
        let mut ds = CellDataSet::voxel_grid(
            &Aabb::new(Vec3::zeros(), Vec3::new(2.0, 1.0, 1.0)),
            2,
            1,
            1,
        );
        ds.insert_cell_array("X_VELOCITY", vec![1.0, -1.0]);
        ds.insert_cell_array("Y_VELOCITY", vec![0.0, 2.0]);
        ds.insert_cell_array("Z_VELOCITY", vec![0.25, 0.0]);
        ds
    }

    #[test]
    fn test_cell_constant_samples() {
        let field = FluentVelocityField::from_dataset(&two_cell_dataset()).unwrap();
        assert_eq!(field.cell_count(), 2);

        assert_eq!(
            field.sample(&Vec3::new(0.2, 0.5, 0.5)),
            Some(Vec3::new(1.0, 0.0, 0.25))
        );
        assert_eq!(
            field.sample(&Vec3::new(0.9, 0.1, 0.9)),
            Some(Vec3::new(1.0, 0.0, 0.25))
        );
        assert_eq!(
            field.sample(&Vec3::new(1.7, 0.5, 0.5)),
            Some(Vec3::new(-1.0, 2.0, 0.0))
        );
        assert_eq!(field.sample(&Vec3::new(2.5, 0.5, 0.5)), None);
    }

    #[test]
    fn test_stats_and_bounds() {
        let field = FluentVelocityField::from_dataset(&two_cell_dataset()).unwrap();
        assert_eq!(field.max_velocity(VelocityComponent::X), 1.0);
        assert_eq!(field.min_velocity(VelocityComponent::X), -1.0);
        assert_eq!(field.max_velocity(VelocityComponent::Y), 2.0);
        assert_eq!(field.min_velocity(VelocityComponent::Z), 0.0);
        assert_eq!(field.max_velocity(VelocityComponent::Magnitude), 5.0_f32.sqrt());
        assert_eq!(
            field.bounding_box(),
            Aabb::new(Vec3::zeros(), Vec3::new(2.0, 1.0, 1.0))
        );
    }

    #[test]
    fn test_missing_array() {
        let mut ds = two_cell_dataset();
        ds.cell_arrays.remove("Y_VELOCITY");
        match FluentVelocityField::from_dataset(&ds) {
            Err(FieldLoadError::MissingArray(name)) => assert_eq!(name, "Y_VELOCITY"),
            other => panic!("expected MissingArray, got {other:?}"),
        }
    }

    #[test]
    fn test_array_length_mismatch() {
        let mut ds = two_cell_dataset();
        ds.insert_cell_array("Z_VELOCITY", vec![1.0]);
        assert!(matches!(
            FluentVelocityField::from_dataset(&ds),
            Err(FieldLoadError::ArrayLength {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_mesh() {
        let mut ds = CellDataSet::default();
        for name in VELOCITY_ARRAYS {
            ds.insert_cell_array(name, Vec::new());
        }
        assert!(matches!(
            FluentVelocityField::from_dataset(&ds),
            Err(FieldLoadError::EmptyMesh)
        ));
    }

    #[test]
    fn test_collapsed_cell_does_not_shadow_neighbour() {
        let mut ds = CellDataSet::voxel_grid(&Aabb::unit(), 1, 1, 1);
        // a hexahedron with every node on the voxel center, listed first
        let center = ds.points.len() as u32;
        ds.points.push(Vec3::new(0.5, 0.5, 0.5));
        ds.cells
            .insert(0, Cell::new(CellKind::Hexahedron, vec![center; 8]));
        ds.insert_cell_array("X_VELOCITY", vec![99.0, 1.0]);
        ds.insert_cell_array("Y_VELOCITY", vec![0.0, 0.0]);
        ds.insert_cell_array("Z_VELOCITY", vec![0.0, 0.0]);

        let field = FluentVelocityField::from_dataset(&ds).unwrap();
        let expected = Some(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(field.sample(&Vec3::new(0.1, 0.1, 0.1)), expected);
        assert_eq!(field.sample(&Vec3::new(0.5, 0.5, 0.5)), expected);
        assert_eq!(field.sample(&Vec3::new(0.9, 0.2, 0.7)), expected);
        assert_eq!(field.locate(&Vec3::new(0.5, 0.5, 0.5)), Some(1));
    }

    #[test]
    fn test_clone_shares_data() {
        let field = FluentVelocityField::from_dataset(&two_cell_dataset()).unwrap();
        let clone = field.clone_for_parallel_access();
        assert_eq!(Arc::strong_count(field.data()), 2);

        for x in [0.1_f32, 0.6, 1.2, 1.9, 2.2] {
            let p = Vec3::new(x, 0.4, 0.6);
            assert_eq!(clone.sample(&p), field.sample(&p));
        }
        drop(clone);
        assert_eq!(Arc::strong_count(field.data()), 1);
    }
}
