//! Unstructured cell meshes with per-cell data arrays
//!
//! A [`CellDataSet`] is what the readers in [`io`] produce: mesh points, cells
//! referencing those points, and named per-cell scalar arrays. The geometry
//! and locator submodules turn it into something that answers
//! "which cell contains this point".

pub mod geometry;
pub mod io;
pub mod locator;
mod vtk;

pub use geometry::{ConvexCell, Plane};
pub use io::{read_dataset, write_dataset_json};
pub use locator::CellLocator;

use crate::core_types::{Aabb, Vec3};
use crate::error::FieldLoadError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Supported 3D cell shapes, numbered as in VTK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Tetra,
    Voxel,
    Hexahedron,
    Wedge,
    Pyramid,
}

impl CellKind {
    /// Map a VTK cell type id to a supported kind
    pub fn from_vtk_id(id: u32) -> Option<Self> {
        match id {
            10 => Some(CellKind::Tetra),
            11 => Some(CellKind::Voxel),
            12 => Some(CellKind::Hexahedron),
            13 => Some(CellKind::Wedge),
            14 => Some(CellKind::Pyramid),
            _ => None,
        }
    }

    pub fn vtk_id(self) -> u32 {
        match self {
            CellKind::Tetra => 10,
            CellKind::Voxel => 11,
            CellKind::Hexahedron => 12,
            CellKind::Wedge => 13,
            CellKind::Pyramid => 14,
        }
    }

    /// Number of nodes a cell of this kind references
    pub fn node_count(self) -> usize {
        match self {
            CellKind::Tetra => 4,
            CellKind::Pyramid => 5,
            CellKind::Wedge => 6,
            CellKind::Voxel | CellKind::Hexahedron => 8,
        }
    }

    /// Faces as local node indices, in VTK node ordering
    ///
    /// Winding is not relied upon; face normals are oriented outward from
    /// the cell centroid when geometry is built.
    pub fn faces(self) -> &'static [&'static [usize]] {
        match self {
            CellKind::Tetra => &[&[0, 1, 3], &[1, 2, 3], &[2, 0, 3], &[0, 2, 1]],
            CellKind::Voxel => &[
                &[0, 2, 6, 4],
                &[1, 5, 7, 3],
                &[0, 4, 5, 1],
                &[2, 3, 7, 6],
                &[0, 1, 3, 2],
                &[4, 6, 7, 5],
            ],
            CellKind::Hexahedron => &[
                &[0, 4, 7, 3],
                &[1, 2, 6, 5],
                &[0, 1, 5, 4],
                &[3, 7, 6, 2],
                &[0, 3, 2, 1],
                &[4, 5, 6, 7],
            ],
            CellKind::Wedge => &[
                &[0, 1, 2],
                &[3, 5, 4],
                &[0, 3, 4, 1],
                &[1, 4, 5, 2],
                &[2, 5, 3, 0],
            ],
            CellKind::Pyramid => &[
                &[0, 3, 2, 1],
                &[0, 1, 4],
                &[1, 2, 4],
                &[2, 3, 4],
                &[3, 0, 4],
            ],
        }
    }
}

/// One mesh cell: its shape and the indices of its nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub kind: CellKind,
    pub nodes: Vec<u32>,
}

impl Cell {
    pub fn new(kind: CellKind, nodes: Vec<u32>) -> Self {
        Self { kind, nodes }
    }
}

/// Mesh points, cells and named per-cell arrays as loaded from a solver export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellDataSet {
    /// Mesh node positions
    pub points: Vec<Vec3>,
    /// Cells referencing `points`
    pub cells: Vec<Cell>,
    /// Per-cell scalar arrays keyed by name (e.g. `X_VELOCITY`)
    #[serde(default)]
    pub cell_arrays: FxHashMap<String, Vec<f64>>,
}

impl CellDataSet {
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Look up a per-cell array by name
    pub fn cell_array(&self, name: &str) -> Option<&[f64]> {
        self.cell_arrays.get(name).map(Vec::as_slice)
    }

    /// Add or replace a per-cell array
    pub fn insert_cell_array(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.cell_arrays.insert(name.into(), values);
    }

    /// Bounds of all mesh points
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.points)
    }

    /// Check that every cell has the right node count and references existing points
    ///
    /// # Errors
    /// Returns `InvalidMesh` describing the first offending cell
    pub fn validate(&self) -> Result<(), FieldLoadError> {
        for (i, cell) in self.cells.iter().enumerate() {
            if cell.nodes.len() != cell.kind.node_count() {
                return Err(FieldLoadError::InvalidMesh(format!(
                    "cell {i} ({:?}) has {} nodes, expected {}",
                    cell.kind,
                    cell.nodes.len(),
                    cell.kind.node_count()
                )));
            }
            if let Some(&bad) = cell
                .nodes
                .iter()
                .find(|&&n| n as usize >= self.points.len())
            {
                return Err(FieldLoadError::InvalidMesh(format!(
                    "cell {i} references node {bad}, mesh has {} points",
                    self.points.len()
                )));
            }
        }
        Ok(())
    }

    /// Structured block of `nx × ny × nz` voxels spanning `bounds`
    ///
    /// Cells are numbered x-fastest; the per-cell arrays are left empty.
    pub fn voxel_grid(bounds: &Aabb, nx: usize, ny: usize, nz: usize) -> Self {
        assert!(nx > 0 && ny > 0 && nz > 0, "voxel grid needs at least one cell per axis");

        let step = bounds.extent().component_div(&Vec3::new(nx as f32, ny as f32, nz as f32));
        let mut points = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
        for k in 0..=nz {
            for j in 0..=ny {
                for i in 0..=nx {
                    points.push(
                        bounds.lower
                            + Vec3::new(i as f32, j as f32, k as f32).component_mul(&step),
                    );
                }
            }
        }

        let node = |i: usize, j: usize, k: usize| ((k * (ny + 1) + j) * (nx + 1) + i) as u32;
        let mut cells = Vec::with_capacity(nx * ny * nz);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    cells.push(Cell::new(
                        CellKind::Voxel,
                        vec![
                            node(i, j, k),
                            node(i + 1, j, k),
                            node(i, j + 1, k),
                            node(i + 1, j + 1, k),
                            node(i, j, k + 1),
                            node(i + 1, j, k + 1),
                            node(i, j + 1, k + 1),
                            node(i + 1, j + 1, k + 1),
                        ],
                    ));
                }
            }
        }

        Self {
            points,
            cells,
            cell_arrays: FxHashMap::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vtk_ids() {
        for id in 10..=14 {
            let kind = CellKind::from_vtk_id(id).unwrap();
            assert_eq!(kind.vtk_id(), id);
        }
        assert_eq!(CellKind::from_vtk_id(5), None);
        assert_eq!(CellKind::from_vtk_id(42), None);
    }

    #[test]
    fn test_face_tables_reference_valid_nodes() {
        for kind in [
            CellKind::Tetra,
            CellKind::Voxel,
            CellKind::Hexahedron,
            CellKind::Wedge,
            CellKind::Pyramid,
        ] {
            for face in kind.faces() {
                assert!(face.len() >= 3);
                assert!(face.iter().all(|&n| n < kind.node_count()));
            }
        }
    }

    #[test]
    fn test_voxel_grid_layout() {
        let ds = CellDataSet::voxel_grid(&Aabb::unit(), 2, 3, 4);
        assert_eq!(ds.cell_count(), 24);
        assert_eq!(ds.points.len(), 3 * 4 * 5);
        assert_eq!(ds.bounds(), Aabb::unit());
        assert!(ds.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_node() {
        let mut ds = CellDataSet::voxel_grid(&Aabb::unit(), 1, 1, 1);
        ds.cells[0].nodes[3] = 99;
        let err = ds.validate().unwrap_err();
        assert!(matches!(err, FieldLoadError::InvalidMesh(_)));

        let mut ds = CellDataSet::voxel_grid(&Aabb::unit(), 1, 1, 1);
        ds.cells[0].nodes.pop();
        assert!(ds.validate().is_err());
    }
}
