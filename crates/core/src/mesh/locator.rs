//! Static uniform-bin cell locator
//!
//! Cells are binned by their bounding boxes into a regular grid laid over the
//! mesh bounds. Bin contents are stored in compressed-row form: `offsets[b]`
//! to `offsets[b + 1]` index into `cell_ids`, and every bin lists its cells in
//! ascending id order. A point query only tests the cells of the one bin the
//! point falls in.
//!
//! The locator remembers the last cell it returned. Queries along a pixel row
//! tend to stay inside the same cell for many samples, so the hint saves most
//! bin scans. The hint is interior-mutable, which makes the locator `!Sync`:
//! every thread that queries a mesh needs its own locator.

use crate::core_types::{Aabb, Vec3};
use crate::mesh::ConvexCell;
use std::cell::Cell;
use std::time::Instant;
use tracing::debug;

/// Target average number of cells per bin
const CELLS_PER_BIN: f32 = 4.0;

/// Upper bound on bins along one axis
const MAX_BINS_PER_AXIS: usize = 256;

/// Point-in-cell acceleration structure over a fixed set of convex cells
#[derive(Debug)]
pub struct CellLocator {
    bounds: Aabb,
    dims: [usize; 3],
    bin_size: Vec3,
    offsets: Vec<u32>,
    cell_ids: Vec<u32>,
    last_hit: Cell<Option<u32>>,
}

impl CellLocator {
    /// Bin `cells` into a fresh locator
    pub fn build(cells: &[ConvexCell]) -> Self {
        let start = Instant::now();

        let bounds = cells
            .iter()
            .fold(Aabb::empty(), |b, c| b.union(c.bounds()));
        let dims = bin_dims(&bounds, cells.len());
        let extent = bounds.extent();
        let bin_size = Vec3::new(
            extent.x / dims[0] as f32,
            extent.y / dims[1] as f32,
            extent.z / dims[2] as f32,
        );

        let mut locator = Self {
            bounds,
            dims,
            bin_size,
            offsets: Vec::new(),
            cell_ids: Vec::new(),
            last_hit: Cell::new(None),
        };

        // first pass counts, second pass fills; ids arrive in ascending order
        let bin_count = dims[0] * dims[1] * dims[2];
        let mut counts = vec![0u32; bin_count];
        for cell in cells {
            locator.for_each_bin(cell.bounds(), |b| counts[b] += 1);
        }

        let mut offsets = Vec::with_capacity(bin_count + 1);
        let mut running = 0u32;
        offsets.push(0);
        for &c in &counts {
            running += c;
            offsets.push(running);
        }

        let mut cursor: Vec<u32> = offsets[..bin_count].to_vec();
        let mut cell_ids = vec![0u32; running as usize];
        for (id, cell) in cells.iter().enumerate() {
            locator.for_each_bin(cell.bounds(), |b| {
                cell_ids[cursor[b] as usize] = id as u32;
                cursor[b] += 1;
            });
        }

        locator.offsets = offsets;
        locator.cell_ids = cell_ids;

        debug!(
            "Cell locator built: {} cells, {}x{}x{} bins, {} entries in {:.2?}",
            cells.len(),
            dims[0],
            dims[1],
            dims[2],
            locator.cell_ids.len(),
            start.elapsed()
        );

        locator
    }

    /// Bounds covered by the binned cells
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Number of bins along each axis
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Find a cell containing `p`
    ///
    /// Returns the lowest-id containing cell among the candidates of the bin
    /// `p` falls in, or `None` if `p` is outside every cell. `cells` must be
    /// the slice the locator was built from.
    pub fn find_cell(&self, cells: &[ConvexCell], p: &Vec3) -> Option<u32> {
        if !self.bounds.contains(p) {
            return None;
        }

        if let Some(hint) = self.last_hit.get() {
            if cells[hint as usize].contains_strictly(p) {
                return Some(hint);
            }
        }

        let bin = self.bin_of(p);
        let candidates =
            &self.cell_ids[self.offsets[bin] as usize..self.offsets[bin + 1] as usize];
        let found = candidates
            .iter()
            .copied()
            .find(|&id| cells[id as usize].contains(p));

        if found.is_some() {
            self.last_hit.set(found);
        }
        found
    }

    fn axis_index(&self, value: f32, axis: usize) -> usize {
        if self.bin_size[axis] <= 0.0 {
            return 0;
        }
        let t = ((value - self.bounds.lower[axis]) / self.bin_size[axis]).floor();
        (t.max(0.0) as usize).min(self.dims[axis] - 1)
    }

    fn bin_of(&self, p: &Vec3) -> usize {
        let i = self.axis_index(p.x, 0);
        let j = self.axis_index(p.y, 1);
        let k = self.axis_index(p.z, 2);
        (k * self.dims[1] + j) * self.dims[0] + i
    }

    fn for_each_bin<F: FnMut(usize)>(&self, b: &Aabb, mut f: F) {
        let lo = [
            self.axis_index(b.lower.x, 0),
            self.axis_index(b.lower.y, 1),
            self.axis_index(b.lower.z, 2),
        ];
        let hi = [
            self.axis_index(b.upper.x, 0),
            self.axis_index(b.upper.y, 1),
            self.axis_index(b.upper.z, 2),
        ];
        for k in lo[2]..=hi[2] {
            for j in lo[1]..=hi[1] {
                for i in lo[0]..=hi[0] {
                    f((k * self.dims[1] + j) * self.dims[0] + i);
                }
            }
        }
    }
}

/// Choose bin counts so bins are roughly cubic and hold about `CELLS_PER_BIN` cells
fn bin_dims(bounds: &Aabb, cell_count: usize) -> [usize; 3] {
    if bounds.is_empty() || cell_count == 0 {
        return [1, 1, 1];
    }

    let target_bins = (cell_count as f32 / CELLS_PER_BIN).max(1.0);
    let extent = bounds.extent();
    let max_extent = extent.max();
    if max_extent <= 0.0 {
        return [1, 1, 1];
    }

    // flat meshes get their bin edge from the non-degenerate axes only
    let spanned: Vec<f32> = extent.iter().copied().filter(|&e| e > 0.0).collect();
    let measure: f32 = spanned.iter().product();
    let edge = (measure / target_bins).powf(1.0 / spanned.len() as f32);

    let mut dims = [1usize; 3];
    for axis in 0..3 {
        if extent[axis] > 0.0 && edge > 0.0 {
            dims[axis] = ((extent[axis] / edge).round() as usize).clamp(1, MAX_BINS_PER_AXIS);
        }
    }
    dims
}
