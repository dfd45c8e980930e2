use crate::FaceletLabel;

/// Result alias that carries the custom [`CubeError`] type.
pub type Result<T> = std::result::Result<T, CubeError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum CubeError {
    /// The center sticker of a capture did not match the face the scanner
    /// expected. Nothing was recorded; the same face has to be shown again.
    #[error("expected the {expected} center but the camera saw {found}")]
    CenterMismatch {
        expected: FaceletLabel,
        found: FaceletLabel,
    },
    /// The camera could not be opened or stopped delivering frames.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
    /// The external solver rejected the state or could not be run.
    #[error("solver failed: {0}")]
    SolverFailure(String),
    /// Geometric or input corruption. Animation must not continue.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    /// A capture arrived after all six faces were recorded.
    #[error("all faces have already been scanned")]
    ScanComplete,
    /// A facelet record was malformed or incomplete.
    #[error("invalid cube state: {0}")]
    InvalidState(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Free-form message for session level misuse.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl CubeError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Returns true for errors that indicate a defect rather than a user
    /// recoverable condition.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }
}

/// Fatal integrity failures raised by move parsing and the move engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    #[error("unknown move token `{0}`")]
    UnknownMove(String),
    #[error("a move turns one or two quarters, got {0}")]
    QuarterTurns(u8),
    #[error("layer {face} selected {found} cubies, expected 9")]
    LayerSize { face: FaceletLabel, found: usize },
    #[error("cubie {index} drifted off the lattice")]
    OffLattice { index: usize },
    #[error("two cubies share lattice point ({x}, {y}, {z})")]
    Collision { x: i32, y: i32, z: i32 },
    #[error("a {0} move is already in progress")]
    MoveInProgress(FaceletLabel),
    #[error("no move is in progress")]
    NoActiveMove,
}
