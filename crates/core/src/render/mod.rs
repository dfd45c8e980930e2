use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::{FaceletLabel, MoveEngine};

/// World placement of one cubie as handed to the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub index: usize,
    pub position: Vec3,
    pub rotation: Quat,
    /// Sticker per local face in `+x, -x, +y, -y, +z, -z` order.
    pub materials: [Option<FaceletLabel>; 6],
    pub in_pivot: bool,
}

/// The transient rotation frame while a layer is turning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotNode {
    pub face: FaceletLabel,
    pub members: Vec<usize>,
    pub rotation: Quat,
}

/// Scene graph snapshot: 26 cubies plus the pivot when a move is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFrame {
    pub cubies: Vec<SceneNode>,
    pub pivot: Option<PivotNode>,
}

impl SceneFrame {
    /// Captures the engine's current geometry with cubie centers `spacing`
    /// apart.
    pub fn capture(engine: &MoveEngine, spacing: f32) -> Self {
        let pivot = engine.pivot();
        let cubies = engine
            .lattice()
            .cubies()
            .iter()
            .enumerate()
            .filter_map(|(index, cubie)| {
                let (position, rotation) = engine.world_transform(index)?;
                Some(SceneNode {
                    index,
                    position: position * spacing,
                    rotation,
                    materials: *cubie.materials(),
                    in_pivot: pivot.is_some_and(|p| p.contains(index)),
                })
            })
            .collect();

        Self {
            cubies,
            pivot: pivot.map(|p| PivotNode {
                face: p.current_move().face,
                members: p.members().to_vec(),
                rotation: p.rotation(),
            }),
        }
    }
}

/// Rendering backend abstraction. Keeps the most recent scene and counts
/// submissions; a windowed renderer draws from [`RenderGraph::last_frame`].
#[derive(Debug, Default)]
pub struct RenderGraph {
    last_frame: Option<SceneFrame>,
    frames_submitted: u64,
}

impl RenderGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, frame: SceneFrame) {
        self.last_frame = Some(frame);
        self.frames_submitted += 1;
    }

    pub fn last_frame(&self) -> Option<&SceneFrame> {
        self.last_frame.as_ref()
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }
}
