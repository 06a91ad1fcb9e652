//! Convex polyhedron representation of mesh cells for point containment

use crate::core_types::{Aabb, Vec3};
use crate::mesh::Cell;

/// Relative containment tolerance, scaled by the cell diagonal
const CONTAINMENT_TOLERANCE: f32 = 1e-5;

/// Fewest face planes that can enclose a volume
const MIN_ENCLOSING_PLANES: usize = 4;

/// Oriented plane `normal · p = offset`, normal pointing out of the cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub offset: f32,
}

impl Plane {
    /// Signed distance of `p` (positive outside)
    #[inline]
    pub fn distance(&self, p: &Vec3) -> f32 {
        self.normal.dot(p) - self.offset
    }
}

/// A mesh cell as the intersection of its face half-spaces
///
/// A collapsed cell (fewer than four usable faces) has no interior and
/// contains no point.
#[derive(Debug, Clone)]
pub struct ConvexCell {
    bounds: Aabb,
    /// `bounds` grown by `tolerance`, checked before the planes
    reach: Aabb,
    planes: Vec<Plane>,
    tolerance: f32,
}

impl ConvexCell {
    /// Build face planes for `cell` from the mesh `points`
    ///
    /// Face normals come from Newell's method so slightly warped quads still
    /// get a sensible average plane. Each normal is flipped if needed to
    /// point away from the node centroid. Faces with zero area are skipped.
    pub fn from_cell(cell: &Cell, points: &[Vec3]) -> Self {
        let nodes: Vec<Vec3> = cell.nodes.iter().map(|&n| points[n as usize]).collect();
        let bounds = Aabb::from_points(&nodes);
        let centroid = nodes.iter().sum::<Vec3>() / nodes.len() as f32;

        let planes = cell
            .kind
            .faces()
            .iter()
            .filter_map(|face| {
                let mut normal = Vec3::zeros();
                let mut face_center = Vec3::zeros();
                for (i, &a) in face.iter().enumerate() {
                    let p = nodes[a];
                    let q = nodes[face[(i + 1) % face.len()]];
                    normal.x += (p.y - q.y) * (p.z + q.z);
                    normal.y += (p.z - q.z) * (p.x + q.x);
                    normal.z += (p.x - q.x) * (p.y + q.y);
                    face_center += p;
                }
                face_center /= face.len() as f32;

                let len = normal.norm();
                if len <= f32::EPSILON * bounds.diagonal().max(f32::MIN_POSITIVE) {
                    return None;
                }
                let mut normal = normal / len;
                if normal.dot(&(centroid - face_center)) > 0.0 {
                    normal = -normal;
                }
                Some(Plane {
                    normal,
                    offset: normal.dot(&face_center),
                })
            })
            .collect();

        let tolerance = CONTAINMENT_TOLERANCE * bounds.diagonal();
        Self {
            bounds,
            reach: bounds.padded(tolerance),
            planes,
            tolerance,
        }
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// `true` if the cell encloses no volume
    pub fn is_degenerate(&self) -> bool {
        self.planes.len() < MIN_ENCLOSING_PLANES
    }

    /// `true` if `p` lies inside or on the boundary (within tolerance)
    #[inline]
    pub fn contains(&self, p: &Vec3) -> bool {
        !self.is_degenerate()
            && self.reach.contains(p)
            && self
                .planes
                .iter()
                .all(|plane| plane.distance(p) <= self.tolerance)
    }

    /// `true` if `p` lies inside with at least the tolerance to spare on every face
    ///
    /// A strictly interior point cannot be claimed by a neighbouring cell of a
    /// conforming mesh.
    #[inline]
    pub fn contains_strictly(&self, p: &Vec3) -> bool {
        !self.is_degenerate()
            && self.bounds.contains(p)
            && self
                .planes
                .iter()
                .all(|plane| plane.distance(p) < -self.tolerance)
    }
}
