//! Greedy quad meshing for small layered voxel volumes.
//!
//! A [`VoxelGrid`] is a stack of 2D layers (usually painted as PNG images, see [`layer`]) whose pixels encode
//! material IDs through the [`codec`]. Meshing is split by face orientation into three [`AxisGroup`]s, each handled by
//! a [`MeshWorker`] on its own thread:
//!
//! - `xy`: top and bottom faces
//! - `xz`: front and back faces
//! - `yz`: left and right faces
//!
//! Each worker indexes the visible voxels of its group ([`FaceVisibilityIndex`]), grows maximal single-material
//! rectangles over them ([`greedy_quads`]), and turns the [`Quad`]s into vertex buffers ([`MeshAccumulator`]). A
//! [`MeshPass`] runs all three and only hands out meshes once every group succeeded.
//!
//! # Example Code
//!
//! ```
//! use strata_mesh::{greedy_group_quads, AxisGroup, Face, VoxelGrid};
//!
//! // A 4x4 floor, one layer deep, with a single raised voxel of another material.
//! let grid = VoxelGrid::from_fn([4, 4, 2], |p| match (p.x, p.y, p.z) {
//!     (_, _, 0) => 1,
//!     (1, 2, 1) => 2,
//!     _ => 0,
//! })?;
//!
//! let quads = greedy_group_quads(&grid, AxisGroup::Xy);
//!
//! // The floor's bottom merges into one 4x4 quad.
//! assert!(quads
//!     .iter()
//!     .any(|q| q.face == Face::Bottom && q.material == 1 && q.area() == 16));
//! // Every quad is one material.
//! assert!(quads.iter().all(|q| q.voxels().all(|p| grid.get(p) == q.material)));
//! # Ok::<_, strata_mesh::Error>(())
//! ```

mod buffer;
pub mod codec;
mod error;
pub mod geometry;
mod greedy;
mod grid;
pub mod layer;
pub mod palette;
mod pass;
mod quad;
mod task;
mod visibility;
mod worker;

pub use buffer::*;
pub use error::*;
#[doc(inline)]
pub use geometry::*;
pub use greedy::*;
pub use grid::*;
pub use layer::{load_layers, save_layers, Layer, MAP_DEPTH, MAP_HEIGHT, MAP_WIDTH};
pub use palette::Palette;
pub use pass::*;
pub use quad::*;
pub use task::*;
pub use visibility::*;
pub use worker::*;

pub use ilattice;
pub use ndshape;
