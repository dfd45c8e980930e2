use glam::{IVec3, Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::{
    facelet::{facelet_coord, facelet_index},
    CubeError, CubeState, FaceletLabel, IntegrityError, Result,
};

/// Coordinate above which a cubie belongs to a face layer.
pub const LAYER_THRESHOLD: f32 = 0.5;

/// Largest deviation from a lattice point tolerated before snapping.
pub const SNAP_TOLERANCE: f32 = 1e-3;

/// The six geometric faces of a unit cube, in the material order renderers
/// use for boxes (`+x, -x, +y, -y, +z, -z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocalFace {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl LocalFace {
    pub const ALL: [LocalFace; 6] = [
        LocalFace::PosX,
        LocalFace::NegX,
        LocalFace::PosY,
        LocalFace::NegY,
        LocalFace::PosZ,
        LocalFace::NegZ,
    ];

    pub fn normal(self) -> IVec3 {
        match self {
            Self::PosX => IVec3::X,
            Self::NegX => IVec3::NEG_X,
            Self::PosY => IVec3::Y,
            Self::NegY => IVec3::NEG_Y,
            Self::PosZ => IVec3::Z,
            Self::NegZ => IVec3::NEG_Z,
        }
    }
}

/// One of the 26 visible unit cubes.
///
/// `materials` is fixed at construction. After any number of moves the
/// sticker visible in a direction is found purely by rotating the local face
/// normals with `orientation`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cubie {
    position: Vec3,
    orientation: Mat3,
    materials: [Option<FaceletLabel>; 6],
}

impl Cubie {
    fn new(home: IVec3, state: &CubeState) -> Self {
        let materials = LocalFace::ALL.map(|local| {
            let normal = local.normal();
            let face = FaceletLabel::from_normal(normal)?;
            let index = facelet_index(face, home)?;
            Some(state.facelet(face, index))
        });
        Self {
            position: home.as_vec3(),
            orientation: Mat3::IDENTITY,
            materials,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current lattice coordinate.
    pub fn coord(&self) -> IVec3 {
        self.position.round().as_ivec3()
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_mat3(&self.orientation).normalize()
    }

    pub fn materials(&self) -> &[Option<FaceletLabel>; 6] {
        &self.materials
    }

    /// Sticker currently facing world direction `direction`, if any.
    pub fn sticker_facing(&self, direction: IVec3) -> Option<FaceletLabel> {
        LocalFace::ALL
            .iter()
            .zip(self.materials.iter())
            .find(|(local, _)| {
                let world = self.orientation * local.normal().as_vec3();
                world.round().as_ivec3() == direction
            })
            .and_then(|(_, material)| *material)
    }

    /// Applies `rotation` about the origin and snaps the result back onto the
    /// lattice. Fails without touching `self` when the rotated position is not
    /// near a lattice point.
    pub(crate) fn baked(
        &self,
        rotation: Quat,
        index: usize,
    ) -> std::result::Result<Self, IntegrityError> {
        let position = rotation * self.position;
        let snapped = position.round();
        if (position - snapped).abs().max_element() > SNAP_TOLERANCE {
            return Err(IntegrityError::OffLattice { index });
        }
        let orientation = snap_matrix(Mat3::from_quat(rotation) * self.orientation);
        Ok(Self {
            position: snapped,
            orientation,
            ..self.clone()
        })
    }
}

fn snap_matrix(matrix: Mat3) -> Mat3 {
    Mat3::from_cols(
        matrix.x_axis.round(),
        matrix.y_axis.round(),
        matrix.z_axis.round(),
    )
}

/// Arena of the 26 cubies. Indices are stable for the lifetime of the
/// lattice, so layers and pivots refer to cubies by index.
#[derive(Debug, Clone, PartialEq)]
pub struct CubieLattice {
    cubies: Vec<Cubie>,
}

impl CubieLattice {
    /// Builds the lattice at its initial positions with stickers taken from
    /// `state`.
    pub fn new(state: &CubeState) -> Self {
        let mut cubies = Vec::with_capacity(26);
        for x in -1..=1 {
            for y in -1..=1 {
                for z in -1..=1 {
                    if x == 0 && y == 0 && z == 0 {
                        continue;
                    }
                    cubies.push(Cubie::new(IVec3::new(x, y, z), state));
                }
            }
        }
        Self { cubies }
    }

    pub fn cubies(&self) -> &[Cubie] {
        &self.cubies
    }

    pub fn len(&self) -> usize {
        self.cubies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubies.is_empty()
    }

    /// Indices of cubies in the outer layer of `face`.
    pub fn layer(&self, face: FaceletLabel) -> Vec<usize> {
        let normal = face.normal().as_vec3();
        self.cubies
            .iter()
            .enumerate()
            .filter(|(_, cubie)| cubie.position.dot(normal) > LAYER_THRESHOLD)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn cubie_at(&self, coord: IVec3) -> Option<&Cubie> {
        self.cubies.iter().find(|cubie| cubie.coord() == coord)
    }

    /// Replaces the transforms of the listed cubies in one step.
    pub(crate) fn commit(&mut self, updated: Vec<(usize, Cubie)>) {
        for (index, cubie) in updated {
            self.cubies[index] = cubie;
        }
    }

    /// Confirms every cubie sits on a distinct lattice point.
    pub fn check_integrity(&self) -> std::result::Result<(), IntegrityError> {
        let mut seen = Vec::with_capacity(self.cubies.len());
        for (index, cubie) in self.cubies.iter().enumerate() {
            let coord = cubie.coord();
            let off = (cubie.position - coord.as_vec3()).abs().max_element() > SNAP_TOLERANCE;
            if off || coord == IVec3::ZERO || coord.abs().max_element() > 1 {
                return Err(IntegrityError::OffLattice { index });
            }
            if seen.contains(&coord) {
                return Err(IntegrityError::Collision {
                    x: coord.x,
                    y: coord.y,
                    z: coord.z,
                });
            }
            seen.push(coord);
        }
        Ok(())
    }

    /// Reads the visible stickers back off the geometry.
    pub fn visible_state(&self) -> Result<CubeState> {
        let mut faces = [None; 6];
        for face in FaceletLabel::ALL {
            let mut labels = [face; 9];
            for (index, slot) in labels.iter_mut().enumerate() {
                let coord = facelet_coord(face, index);
                let sticker = self
                    .cubie_at(coord)
                    .and_then(|cubie| cubie.sticker_facing(face.normal()));
                *slot = sticker.ok_or_else(|| {
                    CubeError::InvalidState(format!("no sticker visible at {face}{}", index + 1))
                })?;
            }
            faces[face.index()] = Some(labels);
        }
        CubeState::from_faces(faces)
    }
}
