use std::time::Duration;

use tracing::{info, warn};

use crate::{
    solve_moves, AnimationSequencer, AppConfig, CameraSource, CaptureOutcome, ColorClassifier,
    ColorSample, CubeError, CubeState, CubieLattice, FaceSnapshot, Move, MoveEngine, Result,
    ScanOrder, ScanStateMachine, SceneFrame, SequencerEvent, SolverAdapter,
};

/// One user session: scan six faces, solve, then replay the solution.
///
/// The session is the single owner of every piece of mutable state, so each
/// stage has exactly one writer at a time.
#[derive(Debug)]
pub struct Session {
    config: AppConfig,
    scanner: ScanStateMachine,
    camera_ready: bool,
    snapshots: Vec<FaceSnapshot>,
    state: Option<CubeState>,
    engine: Option<MoveEngine>,
    sequencer: Option<AnimationSequencer>,
}

impl Session {
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let classifier = ColorClassifier::new(config.palette.clone())?;
        Ok(Self {
            scanner: ScanStateMachine::new(ScanOrder::standard(), classifier),
            config,
            camera_ready: false,
            snapshots: Vec::new(),
            state: None,
            engine: None,
            sequencer: None,
        })
    }

    /// Skips scanning and starts from a known state.
    pub fn with_state(config: AppConfig, state: CubeState) -> Result<Self> {
        let mut session = Self::new(config)?;
        session.install_state(state);
        Ok(session)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// One-shot camera acquisition that must succeed before capturing.
    pub fn connect_camera(&mut self, camera: &mut dyn CameraSource) -> Result<()> {
        if let Err(err) = camera.open() {
            warn!(%err, "camera could not be opened");
            self.camera_ready = false;
            return Err(match err {
                CubeError::CameraUnavailable(_) => err,
                other => CubeError::CameraUnavailable(other.to_string()),
            });
        }
        self.camera_ready = true;
        info!("camera connected");
        Ok(())
    }

    /// Text shown to the user for the current step.
    pub fn prompt(&self) -> String {
        match self.scanner.expected() {
            Some(step) if self.camera_ready || self.scanner.captured() > 0 => {
                format!("Show {} center & press SPACE", step.name)
            }
            Some(step) => format!("Show the {} center to the camera", step.name),
            None => "Scan Complete! Ready to Solve.".to_string(),
        }
    }

    /// Grabs a frame from `camera` and captures the expected face from it.
    pub fn capture(&mut self, camera: &mut dyn CameraSource) -> Result<FaceSnapshot> {
        if self.state.is_some() {
            return Err(CubeError::ScanComplete);
        }
        if !self.camera_ready {
            return Err(CubeError::CameraUnavailable(
                "connect the camera before scanning".to_string(),
            ));
        }
        let frame = camera.frame()?;
        let samples = frame.sample_face(&self.config.scan.sample_points, self.config.scan.mirror)?;
        let snapshot = self.capture_samples(&samples)?;
        if self.scanner.is_complete() {
            camera.close();
            self.camera_ready = false;
        }
        Ok(snapshot)
    }

    /// Captures the expected face from nine already sampled colors. Once a
    /// state is installed, by scanning or [`with_state`](Self::with_state),
    /// captures are rejected until [`reset`](Self::reset).
    pub fn capture_samples(&mut self, samples: &[ColorSample; 9]) -> Result<FaceSnapshot> {
        if self.state.is_some() {
            return Err(CubeError::ScanComplete);
        }
        match self.scanner.capture(samples)? {
            CaptureOutcome::Accepted { snapshot, .. } => {
                self.snapshots.push(snapshot);
                Ok(snapshot)
            }
            CaptureOutcome::Completed { snapshot, state } => {
                self.snapshots.push(snapshot);
                self.install_state(state);
                Ok(snapshot)
            }
        }
    }

    fn install_state(&mut self, state: CubeState) {
        self.engine = Some(MoveEngine::new(CubieLattice::new(&state)));
        self.state = Some(state);
    }

    pub fn snapshots(&self) -> &[FaceSnapshot] {
        &self.snapshots
    }

    pub fn cube_state(&self) -> Option<&CubeState> {
        self.state.as_ref()
    }

    /// Canonical solver input for the scanned cube.
    pub fn facelets(&self) -> Result<String> {
        self.state
            .as_ref()
            .map(CubeState::to_facelets)
            .ok_or_else(|| CubeError::InvalidState("the cube has not been scanned".to_string()))
    }

    /// Asks `solver` for a solution and queues it for playback. On failure
    /// the scanned state is kept so the user can retry without rescanning.
    pub fn solve(&mut self, solver: &dyn SolverAdapter) -> Result<&[Move]> {
        self.ensure_loadable()?;
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| CubeError::InvalidState("the cube has not been scanned".to_string()))?;
        let moves = solve_moves(solver, state)?;
        self.load_moves(moves)
    }

    /// Queues a known move list for playback without asking a solver. An
    /// empty list completes on the first tick.
    pub fn load_moves(&mut self, moves: Vec<Move>) -> Result<&[Move]> {
        self.ensure_loadable()?;
        let sequencer = self
            .sequencer
            .insert(AnimationSequencer::new(moves, &self.config.animation));
        Ok(sequencer.moves())
    }

    fn ensure_loadable(&self) -> Result<()> {
        if self.sequencer.is_some() {
            return Err(CubeError::msg("a solution is already loaded, reset first"));
        }
        if self.engine.is_none() {
            return Err(CubeError::InvalidState(
                "the cube has not been scanned".to_string(),
            ));
        }
        Ok(())
    }

    /// Solution currently loaded for playback.
    pub fn solution(&self) -> &[Move] {
        self.sequencer
            .as_ref()
            .map(AnimationSequencer::moves)
            .unwrap_or_default()
    }

    pub fn active_move(&self) -> Option<usize> {
        self.sequencer.as_ref().and_then(AnimationSequencer::active_index)
    }

    pub fn is_animation_finished(&self) -> bool {
        self.sequencer
            .as_ref()
            .is_some_and(AnimationSequencer::is_finished)
    }

    /// Advances playback. Does nothing until a solution is loaded.
    pub fn tick(&mut self, delta: Duration) -> Result<Vec<SequencerEvent>> {
        match (self.sequencer.as_mut(), self.engine.as_mut()) {
            (Some(sequencer), Some(engine)) => sequencer.tick(delta, engine),
            _ => Ok(Vec::new()),
        }
    }

    /// Stops playback at the next move boundary.
    pub fn cancel(&mut self) {
        if let Some(sequencer) = self.sequencer.as_mut() {
            sequencer.request_cancel();
        }
    }

    pub fn engine(&self) -> Option<&MoveEngine> {
        self.engine.as_ref()
    }

    /// Scene for the rendering surface, once the lattice exists.
    pub fn scene(&self) -> Option<SceneFrame> {
        self.engine
            .as_ref()
            .map(|engine| SceneFrame::capture(engine, self.config.lattice.spacing))
    }

    /// Returns to the first scan prompt. The camera has to be reconnected.
    pub fn reset(&mut self) {
        info!("session reset");
        self.scanner = ScanStateMachine::new(
            self.scanner.order().clone(),
            self.scanner.classifier().clone(),
        );
        self.camera_ready = false;
        self.snapshots.clear();
        self.state = None;
        self.engine = None;
        self.sequencer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FaceletLabel, Frame, Palette, StaticCamera};

    fn uniform(face: FaceletLabel) -> [ColorSample; 9] {
        [Palette::standard().rgb(face).unwrap(); 9]
    }

    fn solved_camera() -> StaticCamera {
        StaticCamera::new(
            ScanOrder::standard()
                .steps()
                .iter()
                .map(|step| Frame::from_grid(&uniform(step.face), 10, true)),
        )
    }

    fn play_to_end(session: &mut Session) -> Vec<SequencerEvent> {
        let mut events = Vec::new();
        for _ in 0..10_000 {
            events.extend(session.tick(Duration::from_millis(16)).unwrap());
            if session.is_animation_finished() {
                break;
            }
        }
        events
    }

    #[test]
    fn solved_cube_end_to_end() {
        let mut session = Session::new(AppConfig::default()).unwrap();
        let mut camera = solved_camera();
        assert_eq!(session.prompt(), "Show the WHITE center to the camera");

        session.connect_camera(&mut camera).unwrap();
        assert_eq!(session.prompt(), "Show WHITE center & press SPACE");
        for _ in 0..6 {
            session.capture(&mut camera).unwrap();
        }
        assert_eq!(session.prompt(), "Scan Complete! Ready to Solve.");
        assert!(!camera.is_open());
        assert_eq!(session.snapshots().len(), 6);

        let facelets = session.facelets().unwrap();
        assert_eq!(facelets, CubeState::solved().to_facelets());

        let solver = |input: &str| -> Result<String> {
            if CubeState::from_facelets(input)?.is_solved() {
                Ok(String::new())
            } else {
                Err(CubeError::SolverFailure("unexpected state".to_string()))
            }
        };
        assert!(session.solve(&solver).unwrap().is_empty());

        let events = session.tick(Duration::ZERO).unwrap();
        assert_eq!(events, vec![SequencerEvent::Completed]);
        assert!(session.is_animation_finished());
    }

    #[test]
    fn capture_requires_a_camera() {
        let mut session = Session::new(AppConfig::default()).unwrap();
        let mut camera = StaticCamera::denied();
        assert!(matches!(
            session.connect_camera(&mut camera),
            Err(CubeError::CameraUnavailable(_))
        ));
        assert!(matches!(
            session.capture(&mut camera),
            Err(CubeError::CameraUnavailable(_))
        ));
    }

    #[test]
    fn mismatch_keeps_the_prompt() {
        let mut session = Session::new(AppConfig::default()).unwrap();
        let err = session.capture_samples(&uniform(FaceletLabel::D)).unwrap_err();
        assert!(matches!(err, CubeError::CenterMismatch { .. }));
        assert!(session.snapshots().is_empty());
        assert!(session.prompt().contains("WHITE"));
    }

    #[test]
    fn solver_failure_keeps_the_scan() {
        let mut session = Session::with_state(AppConfig::default(), CubeState::solved()).unwrap();
        let failing = |_: &str| -> Result<String> {
            Err(CubeError::SolverFailure("unsolvable".to_string()))
        };
        assert!(session.solve(&failing).is_err());
        assert!(session.cube_state().is_some());

        let working = |_: &str| -> Result<String> { Ok("R R'".to_string()) };
        assert_eq!(session.solve(&working).unwrap().len(), 2);
    }

    #[test]
    fn replays_a_solution_back_to_solved() {
        let mut scrambler = MoveEngine::new(CubieLattice::new(&CubeState::solved()));
        let scramble = crate::parse_sequence("F R U' L2 D B'").unwrap();
        scrambler.apply_all(&scramble).unwrap();
        let scrambled = scrambler.lattice().visible_state().unwrap();

        let mut session = Session::with_state(AppConfig::default(), scrambled).unwrap();
        let solution: String = scramble
            .iter()
            .rev()
            .map(|mv| mv.inverse().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let solver = move |_: &str| -> Result<String> { Ok(solution.clone()) };
        session.solve(&solver).unwrap();
        assert_eq!(session.solution().len(), 6);

        let events = play_to_end(&mut session);
        assert_eq!(events.last(), Some(&SequencerEvent::Completed));
        assert!(session.active_move().is_none());

        let engine = session.engine().unwrap();
        assert!(engine.lattice().visible_state().unwrap().is_solved());
        assert_eq!(session.scene().unwrap().cubies.len(), 26);
    }

    #[test]
    fn reset_returns_to_the_first_face() {
        let mut session = Session::new(AppConfig::default()).unwrap();
        session.capture_samples(&uniform(FaceletLabel::U)).unwrap();
        session.capture_samples(&uniform(FaceletLabel::L)).unwrap();
        session.reset();
        assert!(session.cube_state().is_none());
        assert!(session.engine().is_none());
        assert!(session.snapshots().is_empty());
        assert!(session.prompt().contains("WHITE"));
    }

    #[test]
    fn known_state_refuses_captures_during_playback() {
        let mut session = Session::with_state(AppConfig::default(), CubeState::solved()).unwrap();
        let solver = |_: &str| -> Result<String> { Ok("R U".to_string()) };
        session.solve(&solver).unwrap();
        session.tick(Duration::from_millis(100)).unwrap();
        assert_eq!(session.active_move(), Some(0));

        for step in ScanOrder::standard().steps() {
            assert!(matches!(
                session.capture_samples(&uniform(step.face)),
                Err(CubeError::ScanComplete)
            ));
        }
        assert!(session.snapshots().is_empty());
        assert!(!session.engine().unwrap().is_idle());

        let events = play_to_end(&mut session);
        assert_eq!(events.last(), Some(&SequencerEvent::Completed));
        let expected = {
            let mut engine = MoveEngine::new(CubieLattice::new(&CubeState::solved()));
            engine.apply_all(&crate::parse_sequence("R U").unwrap()).unwrap();
            engine.lattice().visible_state().unwrap()
        };
        assert_eq!(session.engine().unwrap().lattice().visible_state().unwrap(), expected);
    }

    #[test]
    fn empty_move_list_completes_on_a_scrambled_cube() {
        let scrambled = CubeState::from_facelets(
            "DRLUUBFBRBLURRLRUBLRDDFDLFUFUFFDBRDUBRUFLLFDDBFLUBLRBD",
        )
        .unwrap();
        let mut session = Session::with_state(AppConfig::default(), scrambled.clone()).unwrap();
        assert!(session.load_moves(Vec::new()).unwrap().is_empty());
        assert_eq!(
            session.tick(Duration::ZERO).unwrap(),
            vec![SequencerEvent::Completed]
        );
        assert_eq!(
            session.engine().unwrap().lattice().visible_state().unwrap(),
            scrambled
        );
        assert!(session.load_moves(Vec::new()).is_err());
    }

    #[test]
    fn moves_need_a_cube_first() {
        let mut session = Session::new(AppConfig::default()).unwrap();
        assert!(matches!(
            session.load_moves(Vec::new()),
            Err(CubeError::InvalidState(_))
        ));
    }

    #[test]
    fn scanned_session_rejects_a_seventh_capture() {
        let mut session = Session::new(AppConfig::default()).unwrap();
        for step in ScanOrder::standard().steps() {
            session.capture_samples(&uniform(step.face)).unwrap();
        }
        assert!(matches!(
            session.capture_samples(&uniform(FaceletLabel::U)),
            Err(CubeError::ScanComplete)
        ));
        assert_eq!(session.snapshots().len(), 6);
    }
}
