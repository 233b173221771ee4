//! Mesh generation and isoline extraction for gridded and scattered data.
//!
//! Pipeline:
//! - [`mesh::MeshBuilder`] normalizes data into a triangulated mesh
//! - [`color_range::ColorRangeMapper`] maps mesh values onto a color table
//! - [`isoline::IsolineExtractor`] traces isolines (marching triangles/squares)
//! - [`labels`] places labels along isolines for a map view

pub mod color_range;
pub mod config;
pub mod isoline;
pub mod labels;
pub mod mesh;
pub mod spec;

pub use color_range::{ColorMappedMesh, ColorMapping, ColorRangeMapper};
pub use config::CoreConfig;
pub use isoline::{Isoline, IsolineExtractor, IsolinePath, IsolineResult, ValueEntry};
pub use labels::{
    place_labels, DisplayTransform, LabelOptions, LabelPlacer, LabelPosition, LabelRefresh,
    MapState, ViewSnapshot,
};
pub use mesh::{Mesh, MeshBuilder, MeshShape, VALUE_KEY};
pub use spec::{ColorRangeSpec, ElementPacking, Elements, IsolineSpec, LabelRule, MeshSpec};
