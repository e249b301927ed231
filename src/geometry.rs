//! Voxel geometry in layer-local coordinates.
//!
//! A volume is a stack of 2D layers. Inside a layer, **X** grows to the right
//! and **Y** grows toward the back of the drawing; **Z** is the layer index,
//! so layer 0 is the bottom of the stack.
//!
//! ```text
//!        +Z (top)
//!         |  +Y (front)
//!         | /
//!  -X ____|/____ +X (right)
//!        /|
//!       / |
//!     -Y  -Z (bottom)
//! ```
//!
//! # Faces
//!
//! Each voxel has six [`Face`]s, named after the direction they point:
//!
//! | face   | outward | width axis | height axis |
//! |--------|---------|------------|-------------|
//! | top    | +Z      | X          | Y           |
//! | bottom | -Z      | X          | Y           |
//! | front  | +Y      | X          | Z           |
//! | back   | -Y      | X          | Z           |
//! | left   | -X      | Y          | Z           |
//! | right  | +X      | Y          | Z           |
//!
//! A quad grown on a face extends from its seed voxel toward **+width** and
//! **+height** only, so the seed is always the quad's minimum voxel.
//!
//! # Axis Groups
//!
//! The six faces are split into three [`AxisGroup`]s of two opposite faces
//! each. Meshing one group never reads or writes the drawn-state of another
//! group's faces, which is what lets the three groups run on independent
//! threads.
//!
//! ```text
//!   xy: top, bottom     sliced by Z
//!   xz: front, back     sliced by Y
//!   yz: left, right     sliced by X
//! ```
//!
//! # Quad Corners
//!
//! Corners are returned so that `(v1 - v0) × (v3 - v0)` points out of the
//! voxel, and triangles `[0, 1, 2]` and `[0, 2, 3]` wind counterclockwise when
//! seen from outside:
//!
//! ```text
//!   3 <---- 2
//!   |     ^ |
//!   |   /   |
//!   v /     |
//!   0 ----> 1
//!
//! (outward normal pointing out of the screen)
//! ```

mod axis;
mod face;

pub use axis::*;
pub use face::*;
