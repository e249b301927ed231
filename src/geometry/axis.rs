use std::fmt;
use std::str::FromStr;

use ilattice::glam::IVec3;

use crate::{Error, Face};

/// Either the X, Y, or Z axis.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// The index for a point's component on this axis.
    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }

    #[inline]
    pub const fn get_signed_unit_vector(&self) -> IVec3 {
        match self {
            Axis::X => IVec3::X,
            Axis::Y => IVec3::Y,
            Axis::Z => IVec3::Z,
        }
    }
}

/// One of the three pairs of opposite faces. Each group is meshed by its own worker.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum AxisGroup {
    /// Top and bottom faces.
    Xy,
    /// Front and back faces.
    Xz,
    /// Left and right faces.
    Yz,
}

impl AxisGroup {
    pub const ALL: [AxisGroup; 3] = [AxisGroup::Xy, AxisGroup::Xz, AxisGroup::Yz];

    /// The two faces this group emits.
    #[inline]
    pub const fn faces(&self) -> [Face; 2] {
        match self {
            AxisGroup::Xy => [Face::Top, Face::Bottom],
            AxisGroup::Xz => [Face::Front, Face::Back],
            AxisGroup::Yz => [Face::Left, Face::Right],
        }
    }

    /// The axis orthogonal to this group's quads. Voxels are bucketed into slices by their coordinate on this axis.
    #[inline]
    pub const fn slice_axis(&self) -> Axis {
        match self {
            AxisGroup::Xy => Axis::Z,
            AxisGroup::Xz => Axis::Y,
            AxisGroup::Yz => Axis::X,
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            AxisGroup::Xy => "xy",
            AxisGroup::Xz => "xz",
            AxisGroup::Yz => "yz",
        }
    }

    #[inline]
    pub fn contains(&self, face: Face) -> bool {
        self.faces().contains(&face)
    }
}

impl fmt::Display for AxisGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AxisGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xy" => Ok(AxisGroup::Xy),
            "xz" => Ok(AxisGroup::Xz),
            "yz" => Ok(AxisGroup::Yz),
            other => Err(Error::InvalidConfiguration(format!(
                "unrecognized axis group {other:?}, expected one of \"xy\", \"xz\", \"yz\""
            ))),
        }
    }
}
