use std::fmt;

use ilattice::glam::{IVec3, UVec3};
use ilattice::prelude::Extent;
use ndshape::{RuntimeShape, Shape};

use crate::codec::EMPTY;
use crate::{AxisGroup, Error, Face, Layer, Result};

/// Integer position of a voxel; `z` is the layer index.
pub type VoxelCoordinate = IVec3;

/// A dense `width × height × depth` volume of material IDs, where [`EMPTY`] never produces geometry.
///
/// Voxels are stored at the linear offset `((z * height) + y) * width + x`.
///
/// The meshing workers share a grid through an `Arc` and only ever read it; painting requires `&mut`, so it cannot
/// happen while a pass holds the grid.
#[derive(Clone)]
pub struct VoxelGrid {
    shape: RuntimeShape<u32, 3>,
    materials: Vec<u32>,
}

impl VoxelGrid {
    /// An empty grid. Every dimension must be positive, fit in an `i32`, and the voxel count must fit in a `u32`.
    pub fn new(width: u32, height: u32, depth: u32) -> Result<Self> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "grid dimensions must be positive, got {width}x{height}x{depth}"
            )));
        }
        let max_dim = i32::MAX as u32;
        let size = width.checked_mul(height).and_then(|a| a.checked_mul(depth));
        if width > max_dim || height > max_dim || depth > max_dim || size.is_none() {
            return Err(Error::InvalidConfiguration(format!(
                "grid of {width}x{height}x{depth} voxels is too large"
            )));
        }
        let shape = RuntimeShape::<u32, 3>::new([width, height, depth]);
        let materials = vec![EMPTY; shape.size() as usize];

        Ok(Self { shape, materials })
    }

    pub fn from_fn(
        [width, height, depth]: [u32; 3],
        mut f: impl FnMut(VoxelCoordinate) -> u32,
    ) -> Result<Self> {
        let mut grid = Self::new(width, height, depth)?;
        for p in grid.extent().iter3() {
            let i = grid.shape.linearize(p.to_array()) as usize;
            grid.materials[i] = f(p.as_ivec3());
        }
        Ok(grid)
    }

    /// Stacks `layers` bottom to top. All layers must share one non-empty size.
    pub fn from_layers(layers: &[Layer]) -> Result<Self> {
        let first = layers.first().ok_or_else(|| {
            Error::InvalidConfiguration("a grid needs at least one layer".to_owned())
        })?;
        let (width, height) = (first.width(), first.height());
        if let Some((z, layer)) = layers
            .iter()
            .enumerate()
            .find(|(_, l)| l.width() != width || l.height() != height)
        {
            return Err(Error::InvalidConfiguration(format!(
                "layer {z} is {}x{} but layer 0 is {width}x{height}",
                layer.width(),
                layer.height()
            )));
        }

        Self::from_fn([width, height, layers.len() as u32], |p| {
            layers[p.z as usize].get(p.x as u32, p.y as u32)
        })
    }

    /// Splits the grid back into one layer per `z`.
    pub fn to_layers(&self) -> Result<Vec<Layer>> {
        let [width, height, depth] = self.dims();
        (0..depth)
            .map(|z| {
                let mut layer = Layer::blank(width, height);
                for y in 0..height {
                    for x in 0..width {
                        layer.set(x, y, self.get(IVec3::new(x as i32, y as i32, z as i32)))?;
                    }
                }
                Ok(layer)
            })
            .collect()
    }

    #[inline]
    pub fn dims(&self) -> [u32; 3] {
        self.shape.as_array()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.dims()[0]
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.dims()[1]
    }

    /// Number of layers.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.dims()[2]
    }

    #[inline]
    pub fn shape(&self) -> &RuntimeShape<u32, 3> {
        &self.shape
    }

    /// The number of voxels, occupied or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// `true` when no voxel holds a material.
    pub fn is_unoccupied(&self) -> bool {
        self.materials.iter().all(|m| *m == EMPTY)
    }

    /// Every in-bounds voxel position.
    #[inline]
    pub fn extent(&self) -> Extent<UVec3> {
        Extent::from_min_and_shape(UVec3::ZERO, UVec3::from(self.dims()))
    }

    #[inline]
    pub fn in_bounds(&self, p: VoxelCoordinate) -> bool {
        let dims = UVec3::from(self.dims()).as_ivec3();
        p.cmpge(IVec3::ZERO).all() && p.cmplt(dims).all()
    }

    /// The arena offset of `p`, if it is in bounds.
    #[inline]
    pub fn linearize(&self, p: VoxelCoordinate) -> Option<usize> {
        if self.in_bounds(p) {
            Some(self.shape.linearize(p.as_uvec3().to_array()) as usize)
        } else {
            None
        }
    }

    /// The material at `p`, or [`EMPTY`] outside the grid.
    #[inline]
    pub fn get(&self, p: VoxelCoordinate) -> u32 {
        self.linearize(p).map_or(EMPTY, |i| self.materials[i])
    }

    /// Paints one voxel. Positions outside the grid are ignored.
    pub fn set(&mut self, p: VoxelCoordinate, material: u32) {
        if let Some(i) = self.linearize(p) {
            self.materials[i] = material;
        }
    }

    #[inline]
    pub fn is_occupied(&self, p: VoxelCoordinate) -> bool {
        self.get(p) != EMPTY
    }

    /// `true` iff the neighbor across `face` is inside the grid and non-empty. The grid boundary never occludes.
    #[inline]
    pub fn is_face_occluded(&self, p: VoxelCoordinate, face: Face) -> bool {
        let neighbor = p + face.offset();
        self.in_bounds(neighbor) && self.is_occupied(neighbor)
    }

    /// A voxel is hidden when it is strictly inside the grid and all six neighbors are occupied, so none of its faces
    /// can ever be seen.
    pub fn is_hidden(&self, p: VoxelCoordinate) -> bool {
        let dims = UVec3::from(self.dims()).as_ivec3();
        let interior = p.cmpgt(IVec3::ZERO).all() && p.cmplt(dims - IVec3::ONE).all();

        interior && Face::ALL.iter().all(|face| self.is_occupied(p + face.offset()))
    }

    /// Every `(voxel, face)` of `group` that belongs in the mesh: the voxel is occupied and the face is not occluded.
    pub fn visible_faces(&self, group: AxisGroup) -> Vec<(VoxelCoordinate, Face)> {
        let mut faces = Vec::new();
        for p in self.extent().iter3() {
            let p = p.as_ivec3();
            if !self.is_occupied(p) {
                continue;
            }
            for face in group.faces() {
                if !self.is_face_occluded(p, face) {
                    faces.push((p, face));
                }
            }
        }
        faces
    }
}

impl fmt::Debug for VoxelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoxelGrid")
            .field("dims", &self.dims())
            .field("occupied", &self.materials.iter().filter(|m| **m != EMPTY).count())
            .finish()
    }
}
