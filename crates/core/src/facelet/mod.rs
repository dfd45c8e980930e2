use std::fmt;

use glam::IVec3;
use serde::{Deserialize, Serialize};

/// One of the six sticker colors, named after the face whose center carries
/// it. The same letter identifies the face in the solver string and in move
/// notation.
///
/// World axes: `+x` points at R, `+y` at U and `+z` at F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FaceletLabel {
    U,
    D,
    F,
    B,
    L,
    R,
}

impl FaceletLabel {
    /// Fixed enumeration order. Palette tie-breaking and array indexing follow it.
    pub const ALL: [FaceletLabel; 6] = [
        FaceletLabel::U,
        FaceletLabel::D,
        FaceletLabel::F,
        FaceletLabel::B,
        FaceletLabel::L,
        FaceletLabel::R,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::U => 0,
            Self::D => 1,
            Self::F => 2,
            Self::B => 3,
            Self::L => 4,
            Self::R => 5,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::U => 'U',
            Self::D => 'D',
            Self::F => 'F',
            Self::B => 'B',
            Self::L => 'L',
            Self::R => 'R',
        }
    }

    pub fn from_char(value: char) -> Option<Self> {
        match value {
            'U' => Some(Self::U),
            'D' => Some(Self::D),
            'F' => Some(Self::F),
            'B' => Some(Self::B),
            'L' => Some(Self::L),
            'R' => Some(Self::R),
            _ => None,
        }
    }

    /// Unit vector pointing out of this face.
    pub fn normal(self) -> IVec3 {
        match self {
            Self::U => IVec3::Y,
            Self::D => IVec3::NEG_Y,
            Self::F => IVec3::Z,
            Self::B => IVec3::NEG_Z,
            Self::L => IVec3::NEG_X,
            Self::R => IVec3::X,
        }
    }

    pub fn from_normal(normal: IVec3) -> Option<Self> {
        Self::ALL.into_iter().find(|face| face.normal() == normal)
    }
}

impl fmt::Display for FaceletLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Lattice coordinate of the cubie carrying sticker `index` of `face`.
///
/// Stickers are numbered row-major as seen from outside the face. U is viewed
/// with B at the top, D with F at the top, and the four side faces with U at
/// the top.
pub fn facelet_coord(face: FaceletLabel, index: usize) -> IVec3 {
    let row = (index / 3) as i32;
    let col = (index % 3) as i32;
    match face {
        FaceletLabel::U => IVec3::new(col - 1, 1, row - 1),
        FaceletLabel::D => IVec3::new(col - 1, -1, 1 - row),
        FaceletLabel::F => IVec3::new(col - 1, 1 - row, 1),
        FaceletLabel::B => IVec3::new(1 - col, 1 - row, -1),
        FaceletLabel::R => IVec3::new(1, 1 - row, 1 - col),
        FaceletLabel::L => IVec3::new(-1, 1 - row, col - 1),
    }
}

/// Inverse of [`facelet_coord`]. Returns `None` when `coord` is not on `face`.
pub fn facelet_index(face: FaceletLabel, coord: IVec3) -> Option<usize> {
    if coord.dot(face.normal()) != 1 || coord.abs().max_element() > 1 {
        return None;
    }
    let (row, col) = match face {
        FaceletLabel::U => (coord.z + 1, coord.x + 1),
        FaceletLabel::D => (1 - coord.z, coord.x + 1),
        FaceletLabel::F => (1 - coord.y, coord.x + 1),
        FaceletLabel::B => (1 - coord.y, 1 - coord.x),
        FaceletLabel::R => (1 - coord.y, 1 - coord.z),
        FaceletLabel::L => (1 - coord.y, coord.z + 1),
    };
    Some((row * 3 + col) as usize)
}
