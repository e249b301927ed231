//! Per-worker bookkeeping for one [`AxisGroup`]: which voxel faces were already emitted, and where the candidate
//! voxels are.

use std::collections::BTreeMap;
use std::fmt;

use ilattice::glam::IVec3;
use log::debug;
use ndshape::{RuntimeShape, Shape};

use crate::{AxisGroup, Error, Face, FaceSet, Result, VoxelCoordinate, VoxelGrid};

/// A dense arena of [`FaceSet`]s, one per voxel. A bit, once set, is never cleared until the whole arena is reset.
#[derive(Clone)]
pub struct DrawnFaces {
    shape: RuntimeShape<u32, 3>,
    faces: Vec<FaceSet>,
}

impl DrawnFaces {
    pub fn new(dims: [u32; 3]) -> Self {
        let shape = RuntimeShape::<u32, 3>::new(dims);
        Self {
            faces: vec![FaceSet::EMPTY; shape.size() as usize],
            shape,
        }
    }

    #[inline]
    fn index(&self, p: VoxelCoordinate) -> Option<usize> {
        let [w, h, d] = self.shape.as_array();
        let in_bounds = p.cmpge(IVec3::ZERO).all()
            && p.cmplt(IVec3::new(w as i32, h as i32, d as i32)).all();
        in_bounds.then(|| self.shape.linearize(p.as_uvec3().to_array()) as usize)
    }

    /// Idempotent. Positions outside the arena are ignored.
    #[inline]
    pub fn mark_face_drawn(&mut self, p: VoxelCoordinate, face: Face) {
        debug_assert!(self.index(p).is_some(), "{p} is outside the grid");
        if let Some(i) = self.index(p) {
            self.faces[i].insert(face);
        }
    }

    /// Unvisited and out-of-bounds positions read as "not drawn".
    #[inline]
    pub fn is_face_drawn(&self, p: VoxelCoordinate, face: Face) -> bool {
        self.get(p).contains(face)
    }

    #[inline]
    pub fn get(&self, p: VoxelCoordinate) -> FaceSet {
        self.index(p).map_or(FaceSet::EMPTY, |i| self.faces[i])
    }

    /// Total number of faces marked drawn.
    pub fn count(&self) -> usize {
        self.faces.iter().map(FaceSet::len).sum()
    }

    pub fn clear(&mut self) {
        self.faces.fill(FaceSet::EMPTY);
    }
}

impl fmt::Debug for DrawnFaces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawnFaces")
            .field("dims", &self.shape.as_array())
            .field("drawn", &self.count())
            .finish()
    }
}

/// Occupied, non-hidden voxels bucketed two ways: by their coordinate on the group's slice axis, and by material.
#[derive(Clone, Debug)]
pub struct SliceIndex {
    group: AxisGroup,
    slices: Vec<Vec<VoxelCoordinate>>,
    per_material: BTreeMap<u32, Vec<VoxelCoordinate>>,
}

impl SliceIndex {
    pub fn new(group: AxisGroup, dims: [u32; 3]) -> Self {
        let num_slices = dims[group.slice_axis().index()] as usize;
        Self {
            group,
            slices: vec![Vec::new(); num_slices],
            per_material: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn group(&self) -> AxisGroup {
        self.group
    }

    #[inline]
    pub fn num_slices(&self) -> usize {
        self.slices.len()
    }

    /// The voxels whose slice-axis coordinate is `i`, in scan order. Empty for out-of-range `i`.
    pub fn slice(&self, i: usize) -> &[VoxelCoordinate] {
        self.slices.get(i).map_or(&[], Vec::as_slice)
    }

    /// The materials present, in ascending order.
    pub fn materials(&self) -> impl Iterator<Item = u32> + '_ {
        self.per_material.keys().copied()
    }

    /// The voxels of `material`, ordered slice by slice.
    pub fn coords_of(&self, material: u32) -> &[VoxelCoordinate] {
        self.per_material.get(&material).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[VoxelCoordinate])> + '_ {
        self.per_material.iter().map(|(m, c)| (*m, c.as_slice()))
    }

    /// Number of indexed voxels.
    pub fn len(&self) -> usize {
        self.slices.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, p: VoxelCoordinate, material: u32) {
        let slice = p[self.group.slice_axis().index()] as usize;
        self.slices[slice].push(p);
        self.per_material.entry(material).or_default().push(p);
    }

    pub fn clear(&mut self) {
        for slice in self.slices.iter_mut() {
            slice.clear();
        }
        self.per_material.clear();
    }
}

/// The drawn-state and slice index owned by a single mesher.
#[derive(Clone, Debug)]
pub struct FaceVisibilityIndex {
    dims: [u32; 3],
    drawn: DrawnFaces,
    slices: SliceIndex,
}

impl FaceVisibilityIndex {
    /// Allocates an empty index sized for `grid`. Call [`scan`](Self::scan) to fill it.
    pub fn new(grid: &VoxelGrid, group: AxisGroup) -> Self {
        let dims = grid.dims();
        Self {
            dims,
            drawn: DrawnFaces::new(dims),
            slices: SliceIndex::new(group, dims),
        }
    }

    /// Allocates and scans in one step.
    pub fn build(grid: &VoxelGrid, group: AxisGroup) -> Self {
        let mut index = Self::new(grid, group);
        index.scan_unchecked(grid);
        index
    }

    /// Resets the index and refills the slice lists with one pass over `grid`, skipping empty and hidden voxels.
    pub fn scan(&mut self, grid: &VoxelGrid) -> Result<()> {
        if grid.dims() != self.dims {
            return Err(Error::InvalidConfiguration(format!(
                "index was allocated for a {:?} grid but the grid is {:?}",
                self.dims,
                grid.dims()
            )));
        }
        self.scan_unchecked(grid);
        Ok(())
    }

    fn scan_unchecked(&mut self, grid: &VoxelGrid) {
        self.reset();

        for p in grid.extent().iter3() {
            let p = p.as_ivec3();
            let material = grid.get(p);
            if material != crate::codec::EMPTY && !grid.is_hidden(p) {
                self.slices.insert(p, material);
            }
        }

        // Seeds are visited slice by slice within each material.
        let axis = self.slices.group.slice_axis().index();
        for coords in self.slices.per_material.values_mut() {
            coords.sort_by_key(|p| p[axis]);
        }

        debug!(
            "{} index: {} visible voxels, {} materials",
            self.group(),
            self.slices.len(),
            self.slices.per_material.len()
        );
    }

    #[inline]
    pub fn group(&self) -> AxisGroup {
        self.slices.group()
    }

    #[inline]
    pub fn drawn(&self) -> &DrawnFaces {
        &self.drawn
    }

    #[inline]
    pub fn slices(&self) -> &SliceIndex {
        &self.slices
    }

    /// Borrows the drawn-state mutably alongside the slice lists, so seeds can be walked while faces are marked.
    #[inline]
    pub fn split_mut(&mut self) -> (&mut DrawnFaces, &SliceIndex) {
        (&mut self.drawn, &self.slices)
    }

    #[inline]
    pub fn mark_face_drawn(&mut self, p: VoxelCoordinate, face: Face) {
        self.drawn.mark_face_drawn(p, face)
    }

    #[inline]
    pub fn is_face_drawn(&self, p: VoxelCoordinate, face: Face) -> bool {
        self.drawn.is_face_drawn(p, face)
    }

    pub fn reset(&mut self) {
        self.drawn.clear();
        self.slices.clear();
    }
}
