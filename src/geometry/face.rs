use crate::{Axis, AxisGroup, Quad};

use ilattice::glam::{IVec3, UVec3};

/// One of the six faces of a voxel. See the [`geometry` module documentation][crate::geometry] for the axis conventions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Face {
    Top = 0,
    Bottom = 1,
    Front = 2,
    Back = 3,
    Left = 4,
    Right = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Top,
        Face::Bottom,
        Face::Front,
        Face::Back,
        Face::Left,
        Face::Right,
    ];

    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The axis this face points along.
    #[inline]
    pub const fn normal_axis(&self) -> Axis {
        match self {
            Face::Top | Face::Bottom => Axis::Z,
            Face::Front | Face::Back => Axis::Y,
            Face::Left | Face::Right => Axis::X,
        }
    }

    #[inline]
    pub const fn signum(&self) -> i32 {
        match self {
            Face::Top | Face::Front | Face::Right => 1,
            Face::Bottom | Face::Back | Face::Left => -1,
        }
    }

    /// The single-step offset to the voxel sharing this face.
    #[inline]
    pub fn offset(&self) -> IVec3 {
        self.normal_axis().get_signed_unit_vector() * self.signum()
    }

    /// The `[width, height]` axes of quads grown on this face.
    #[inline]
    pub const fn axes(&self) -> [Axis; 2] {
        match self {
            Face::Top | Face::Bottom => [Axis::X, Axis::Y],
            Face::Front | Face::Back => [Axis::X, Axis::Z],
            Face::Left | Face::Right => [Axis::Y, Axis::Z],
        }
    }

    /// Unit steps along the `[width, height]` axes.
    #[inline]
    pub fn tangents(&self) -> [IVec3; 2] {
        let [w, h] = self.axes();
        [w.get_signed_unit_vector(), h.get_signed_unit_vector()]
    }

    #[inline]
    pub const fn group(&self) -> AxisGroup {
        match self {
            Face::Top | Face::Bottom => AxisGroup::Xy,
            Face::Front | Face::Back => AxisGroup::Xz,
            Face::Left | Face::Right => AxisGroup::Yz,
        }
    }

    #[inline]
    pub fn opposite(&self) -> Face {
        match self {
            Face::Top => Face::Bottom,
            Face::Bottom => Face::Top,
            Face::Front => Face::Back,
            Face::Back => Face::Front,
            Face::Left => Face::Right,
            Face::Right => Face::Left,
        }
    }

    /// Returns the 4 lattice corners of `quad` in winding order; `(v1 - v0) × (v3 - v0)` is the outward normal.
    ///
    /// A voxel at `p` spans `[p, p + 1]` on every axis, so faces pointing in a positive direction sit one unit further
    /// along their normal than the voxel's minimum corner.
    #[inline]
    pub fn quad_corners(&self, quad: &Quad) -> [IVec3; 4] {
        let [u, v] = self.tangents();
        let w_vec = u * quad.width as i32;
        let h_vec = v * quad.height as i32;

        let minimum = UVec3::from(quad.minimum).as_ivec3();
        let min_w_min_h = if self.signum() > 0 {
            minimum + self.offset()
        } else {
            minimum
        };
        let max_w_min_h = min_w_min_h + w_vec;
        let min_w_max_h = min_w_min_h + h_vec;
        let max_w_max_h = min_w_min_h + w_vec + h_vec;

        match self {
            // X × Y = +Z
            Face::Top => [min_w_min_h, max_w_min_h, max_w_max_h, min_w_max_h],
            Face::Bottom => [min_w_min_h, min_w_max_h, max_w_max_h, max_w_min_h],
            // X × Z = -Y
            Face::Front => [min_w_min_h, min_w_max_h, max_w_max_h, max_w_min_h],
            Face::Back => [min_w_min_h, max_w_min_h, max_w_max_h, min_w_max_h],
            // Y × Z = +X
            Face::Left => [min_w_min_h, min_w_max_h, max_w_max_h, max_w_min_h],
            Face::Right => [min_w_min_h, max_w_min_h, max_w_max_h, min_w_max_h],
        }
    }

    #[inline]
    pub fn quad_mesh_positions(&self, quad: &Quad, voxel_size: f32) -> [[f32; 3]; 4] {
        self.quad_corners(quad)
            .map(|c| (voxel_size * c.as_vec3()).to_array())
    }
}

/// A set of faces stored as one bit per face.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct FaceSet(u8);

impl FaceSet {
    pub const EMPTY: FaceSet = FaceSet(0);

    #[inline]
    pub fn contains(&self, face: Face) -> bool {
        self.0 & (1 << face as u8) != 0
    }

    #[inline]
    pub fn insert(&mut self, face: Face) {
        self.0 |= 1 << face as u8;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Face> + '_ {
        Face::ALL.into_iter().filter(|f| self.contains(*f))
    }
}

impl FromIterator<Face> for FaceSet {
    fn from_iter<I: IntoIterator<Item = Face>>(iter: I) -> Self {
        let mut set = FaceSet::EMPTY;
        for face in iter {
            set.insert(face);
        }
        set
    }
}
