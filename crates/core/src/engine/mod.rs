use glam::{Quat, Vec3};
use tracing::{debug, error};

use crate::{CubeError, CubieLattice, IntegrityError, Move, Result};

/// Transient rotation frame over the nine cubies of one layer.
///
/// Members stay in the lattice arena; the pivot only records their indices
/// and the shared rotation, so nothing is copied or moved while turning.
#[derive(Debug, Clone)]
pub struct PivotGroup {
    mv: Move,
    members: Vec<usize>,
    axis: Vec3,
    angle: f32,
}

impl PivotGroup {
    pub fn current_move(&self) -> Move {
        self.mv
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Angle reached so far, in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn target_angle(&self) -> f32 {
        self.mv.angle()
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_axis_angle(self.axis, self.angle)
    }
}

/// Sole writer of the [`CubieLattice`]. Turns one layer at a time.
#[derive(Debug, Clone)]
pub struct MoveEngine {
    lattice: CubieLattice,
    pivot: Option<PivotGroup>,
}

impl MoveEngine {
    pub fn new(lattice: CubieLattice) -> Self {
        Self {
            lattice,
            pivot: None,
        }
    }

    pub fn lattice(&self) -> &CubieLattice {
        &self.lattice
    }

    pub fn pivot(&self) -> Option<&PivotGroup> {
        self.pivot.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.pivot.is_none()
    }

    /// Selects the layer for `mv` and groups it under a fresh pivot at zero
    /// rotation, so no cubie visibly moves yet.
    pub fn begin_move(&mut self, mv: Move) -> Result<&PivotGroup> {
        if let Some(active) = &self.pivot {
            return Err(IntegrityError::MoveInProgress(active.mv.face).into());
        }

        let members = self.lattice.layer(mv.face);
        if members.len() != 9 {
            error!(face = %mv.face, found = members.len(), "layer selection corrupted");
            return Err(IntegrityError::LayerSize {
                face: mv.face,
                found: members.len(),
            }
            .into());
        }

        debug!(%mv, "move started");
        let pivot = self.pivot.insert(PivotGroup {
            mv,
            members,
            axis: mv.face.normal().as_vec3(),
            angle: 0.0,
        });
        Ok(&*pivot)
    }

    /// Positions the pivot at `progress` (0..=1, already eased) of its turn.
    pub fn set_progress(&mut self, progress: f32) -> Result<()> {
        let pivot = self.pivot.as_mut().ok_or(IntegrityError::NoActiveMove)?;
        pivot.angle = pivot.mv.angle() * progress.clamp(0.0, 1.0);
        Ok(())
    }

    /// Bakes the exact final rotation into every member, snaps them back onto
    /// the lattice and discards the pivot. On failure the lattice keeps its
    /// last fully baked state.
    pub fn finish_move(&mut self) -> Result<Move> {
        let pivot = self.pivot.take().ok_or(IntegrityError::NoActiveMove)?;
        let rotation = Quat::from_axis_angle(pivot.axis, pivot.mv.angle());

        let baked = pivot
            .members
            .iter()
            .map(|&index| {
                self.lattice.cubies()[index]
                    .baked(rotation, index)
                    .map(|cubie| (index, cubie))
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|err| log_integrity(pivot.mv, err))?;

        let mut next = self.lattice.clone();
        next.commit(baked);
        next.check_integrity()
            .map_err(|err| log_integrity(pivot.mv, err))?;
        self.lattice = next;

        debug!(mv = %pivot.mv, "move baked");
        Ok(pivot.mv)
    }

    /// Turns a layer instantly.
    pub fn apply_move(&mut self, mv: Move) -> Result<()> {
        self.begin_move(mv)?;
        self.finish_move().map(|_| ())
    }

    pub fn apply_all(&mut self, moves: &[Move]) -> Result<()> {
        moves.iter().try_for_each(|mv| self.apply_move(*mv))
    }

    /// World position and rotation of a cubie, including the pivot's
    /// in-flight rotation for layer members.
    pub fn world_transform(&self, index: usize) -> Option<(Vec3, Quat)> {
        let cubie = self.lattice.cubies().get(index)?;
        match &self.pivot {
            Some(pivot) if pivot.contains(index) => {
                let rotation = pivot.rotation();
                Some((rotation * cubie.position(), rotation * cubie.rotation()))
            }
            _ => Some((cubie.position(), cubie.rotation())),
        }
    }
}

fn log_integrity(mv: Move, err: IntegrityError) -> CubeError {
    error!(%mv, %err, "move left the lattice inconsistent");
    err.into()
}
