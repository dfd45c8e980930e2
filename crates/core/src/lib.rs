//! Core library for the Cube Replay application.
//!
//! The crate turns six camera captures of a 3×3×3 puzzle into a validated
//! facelet state, hands the canonical string to an external solver and then
//! replays the returned moves on a lattice of 26 rigid cubies. Each module owns
//! one stage of that pipeline; [`Session`] wires them together for a single
//! user session.

pub mod animation;
pub mod capture;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod facelet;
pub mod lattice;
pub mod moves;
pub mod render;
pub mod scan;
pub mod session;
pub mod solver;
pub mod state;

pub use animation::{AnimationSequencer, Easing, SequencerEvent};
pub use capture::{CameraSource, Frame, SamplePoint, StaticCamera};
pub use color::{ColorClassifier, ColorSample, Palette, ReferenceColor};
pub use config::{AnimationConfig, AppConfig, LatticeConfig, ScanConfig};
pub use engine::{MoveEngine, PivotGroup};
pub use error::{CubeError, IntegrityError, Result};
pub use facelet::FaceletLabel;
pub use lattice::{Cubie, CubieLattice, LocalFace};
pub use moves::{parse_sequence, Direction, Move};
pub use render::{PivotNode, RenderGraph, SceneFrame, SceneNode};
pub use scan::{CaptureOutcome, FaceSnapshot, ScanOrder, ScanStateMachine, ScanStep};
pub use session::Session;
pub use solver::{solve_moves, CommandSolver, SolverAdapter};
pub use state::{CubeState, SOLVER_FACE_ORDER};
