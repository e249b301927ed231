use ilattice::glam::{IVec3, UVec3};

use crate::Face;

/// A rectangle of coplanar voxel faces sharing one material.
///
/// `minimum` is the seed voxel; the quad covers `width` voxels along the face's width axis and `height` voxels along its
/// height axis, both growing in the positive direction. See [`Face::axes`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Quad {
    /// The minimum voxel in the quad.
    pub minimum: [u32; 3],
    /// Width of the quad.
    pub width: u32,
    /// Height of the quad.
    pub height: u32,
    pub face: Face,
    /// Material ID of every voxel under the quad.
    pub material: u32,
}

impl Quad {
    /// Number of voxel faces merged into this quad.
    #[inline]
    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    /// Every voxel whose `face` this quad covers.
    pub fn voxels(&self) -> impl Iterator<Item = IVec3> {
        let minimum = UVec3::from(self.minimum).as_ivec3();
        let [u, v] = self.face.tangents();
        let width = self.width as i32;
        let height = self.height as i32;

        (0..height).flat_map(move |j| (0..width).map(move |i| minimum + u * i + v * j))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voxels_follow_face_axes() {
        let quad = Quad {
            minimum: [1, 0, 2],
            width: 2,
            height: 2,
            face: Face::Left,
            material: 7,
        };
        let voxels: Vec<_> = quad.voxels().collect();
        assert_eq!(
            voxels,
            vec![
                IVec3::new(1, 0, 2),
                IVec3::new(1, 1, 2),
                IVec3::new(1, 0, 3),
                IVec3::new(1, 1, 3),
            ]
        );
        assert_eq!(quad.area(), 4);
    }
}
