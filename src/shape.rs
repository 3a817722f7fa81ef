//! Cell shape tags for the primitive shapes with fixed-width connectivity.
//!
//! Cells are grouped by shape so connectivity can be written as fixed-width
//! integer rows, one dataset per shape. Shapes without a fixed vertex count
//! (and cells whose vertex list disagrees with their tag) go to the
//! polyhedron fallback, which is written as a flat index table plus an
//! offset table.

use serde::{Deserialize, Serialize};

/// Closed set of primitive cell shapes.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum CellShape {
    /// Shape not determined by the host; handled through the fallback.
    Unknown,
    Tetrahedron,
    Pyramid,
    Prism,
    Hexahedron,
    /// Generic cell with a variable-length vertex list.
    Polyhedron,
}

impl CellShape {
    /// The fixed-width shapes, in the order their datasets are created.
    /// This order is part of the collective protocol: every rank iterates
    /// it identically.
    pub const FIXED: [CellShape; 4] = [
        CellShape::Tetrahedron,
        CellShape::Pyramid,
        CellShape::Prism,
        CellShape::Hexahedron,
    ];

    /// Vertices per cell for fixed-width shapes, `None` otherwise.
    pub fn vertex_count(self) -> Option<usize> {
        match self {
            CellShape::Tetrahedron => Some(4),
            CellShape::Pyramid => Some(5),
            CellShape::Prism => Some(6),
            CellShape::Hexahedron => Some(8),
            CellShape::Unknown | CellShape::Polyhedron => None,
        }
    }

    /// Dataset name under `mesh/cells`.
    pub fn dataset_name(self) -> &'static str {
        match self {
            CellShape::Tetrahedron => "tetrahedra",
            CellShape::Pyramid => "pyramids",
            CellShape::Prism => "prisms",
            CellShape::Hexahedron => "hexahedra",
            CellShape::Unknown | CellShape::Polyhedron => "polyhedra",
        }
    }

    /// Tag a cell by vertex count alone. Ambiguity is resolved toward the
    /// primitive shape; hosts with richer topology information should tag
    /// cells themselves.
    pub fn from_vertex_count(n: usize) -> Self {
        match n {
            4 => CellShape::Tetrahedron,
            5 => CellShape::Pyramid,
            6 => CellShape::Prism,
            8 => CellShape::Hexahedron,
            _ => CellShape::Polyhedron,
        }
    }
}
