//! Read-only views of the rank-local mesh fragment.
//!
//! The host owns the real mesh; the exporter consumes it through these
//! views. Point indices in cells and patch faces are *local* (0-based,
//! within this rank's point list); the mesh writer remaps them to global
//! numbering by adding the rank's point offset. Duplicated points on
//! processor boundaries are exported as-is, matching the decomposed-mesh
//! convention.

use crate::shape::CellShape;

/// One cell: a shape tag plus its local point indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    shape: CellShape,
    vertices: Vec<u64>,
}

impl Cell {
    pub fn new(shape: CellShape, vertices: Vec<u64>) -> Self {
        Self { shape, vertices }
    }

    /// The effective shape group for writing: fixed-width only when the
    /// vertex list matches the tag's width, polyhedron fallback otherwise.
    pub fn write_shape(&self) -> CellShape {
        match self.shape.vertex_count() {
            Some(w) if w == self.vertices.len() => self.shape,
            _ => CellShape::Polyhedron,
        }
    }

    pub fn shape(&self) -> CellShape {
        self.shape
    }

    pub fn vertices(&self) -> &[u64] {
        &self.vertices
    }
}

/// A named boundary patch: variable-length faces as local point indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalPatch {
    name: String,
    faces: Vec<Vec<u64>>,
}

impl LocalPatch {
    pub fn new(name: impl Into<String>, faces: Vec<Vec<u64>>) -> Self {
        Self {
            name: name.into(),
            faces,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn faces(&self) -> &[Vec<u64>] {
        &self.faces
    }

    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    /// Summed length of all face point lists.
    pub fn n_face_points(&self) -> usize {
        self.faces.iter().map(Vec::len).sum()
    }
}

/// This rank's fragment of the decomposed mesh.
#[derive(Clone, Debug, Default)]
pub struct LocalMesh {
    points: Vec<[f64; 3]>,
    cells: Vec<Cell>,
    patches: Vec<LocalPatch>,
}

impl LocalMesh {
    pub fn new(points: Vec<[f64; 3]>, cells: Vec<Cell>, patches: Vec<LocalPatch>) -> Self {
        Self {
            points,
            cells,
            patches,
        }
    }

    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn patches(&self) -> &[LocalPatch] {
        &self.patches
    }

    /// Look up a patch by name. Absence is normal for a decomposed mesh
    /// whose rank holds no part of that boundary.
    pub fn patch(&self, name: &str) -> Option<&LocalPatch> {
        self.patches.iter().find(|p| p.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_vertex_list_falls_back_to_polyhedron() {
        let cell = Cell::new(CellShape::Hexahedron, vec![0, 1, 2, 3]);
        assert_eq!(cell.write_shape(), CellShape::Polyhedron);
    }

    #[test]
    fn matching_vertex_list_keeps_its_shape() {
        let cell = Cell::new(CellShape::Tetrahedron, vec![0, 1, 2, 3]);
        assert_eq!(cell.write_shape(), CellShape::Tetrahedron);
    }

    #[test]
    fn patch_face_point_count_sums_lengths() {
        let patch = LocalPatch::new("inlet", vec![vec![0, 1, 2], vec![2, 3, 4, 5]]);
        assert_eq!(patch.n_faces(), 2);
        assert_eq!(patch.n_face_points(), 7);
    }
}
