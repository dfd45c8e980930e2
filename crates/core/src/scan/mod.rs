use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{ColorClassifier, ColorSample, CubeError, CubeState, FaceletLabel, Result};

/// One entry of the capture order: the face to show and the name of its
/// center color used in prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStep {
    pub face: FaceletLabel,
    pub name: String,
}

impl ScanStep {
    pub fn new(face: FaceletLabel, name: impl Into<String>) -> Self {
        Self {
            face,
            name: name.into(),
        }
    }
}

/// Fixed order in which the six faces must be captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOrder {
    steps: Vec<ScanStep>,
}

impl Default for ScanOrder {
    fn default() -> Self {
        Self::standard()
    }
}

impl ScanOrder {
    /// White, red, blue, orange, green, yellow.
    pub fn standard() -> Self {
        Self {
            steps: vec![
                ScanStep::new(FaceletLabel::U, "WHITE"),
                ScanStep::new(FaceletLabel::L, "RED"),
                ScanStep::new(FaceletLabel::F, "BLUE"),
                ScanStep::new(FaceletLabel::R, "ORANGE"),
                ScanStep::new(FaceletLabel::B, "GREEN"),
                ScanStep::new(FaceletLabel::D, "YELLOW"),
            ],
        }
    }

    /// Custom order; must name every face exactly once.
    pub fn new(steps: Vec<ScanStep>) -> Result<Self> {
        let covers_all = steps.len() == 6
            && FaceletLabel::ALL
                .iter()
                .all(|face| steps.iter().filter(|s| s.face == *face).count() == 1);
        if !covers_all {
            return Err(CubeError::InvalidConfig(
                "scan order must list each face exactly once".to_string(),
            ));
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[ScanStep] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&ScanStep> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Labels recorded for one accepted capture, for thumbnails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceSnapshot {
    pub face: FaceletLabel,
    pub labels: [FaceletLabel; 9],
    /// Palette color of each label, not the raw camera sample.
    pub colors: [ColorSample; 9],
}

/// Result of an accepted capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The face was recorded; `next` is the face to show now.
    Accepted {
        snapshot: FaceSnapshot,
        next: FaceletLabel,
    },
    /// The last face was recorded and the cube state is final.
    Completed {
        snapshot: FaceSnapshot,
        state: CubeState,
    },
}

impl CaptureOutcome {
    pub fn snapshot(&self) -> &FaceSnapshot {
        match self {
            Self::Accepted { snapshot, .. } | Self::Completed { snapshot, .. } => snapshot,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanPhase {
    Expecting(usize),
    Complete,
}

/// Drives the ordered per-face capture sequence.
#[derive(Debug, Clone)]
pub struct ScanStateMachine {
    order: ScanOrder,
    classifier: ColorClassifier,
    phase: ScanPhase,
    faces: [Option<[FaceletLabel; 9]>; 6],
    state: Option<CubeState>,
}

impl ScanStateMachine {
    pub fn new(order: ScanOrder, classifier: ColorClassifier) -> Self {
        Self {
            order,
            classifier,
            phase: ScanPhase::Expecting(0),
            faces: [None; 6],
            state: None,
        }
    }

    pub fn order(&self) -> &ScanOrder {
        &self.order
    }

    pub fn classifier(&self) -> &ColorClassifier {
        &self.classifier
    }

    /// Step awaiting capture, or `None` once complete.
    pub fn expected(&self) -> Option<&ScanStep> {
        match self.phase {
            ScanPhase::Expecting(index) => self.order.get(index),
            ScanPhase::Complete => None,
        }
    }

    /// Number of faces recorded so far.
    pub fn captured(&self) -> usize {
        match self.phase {
            ScanPhase::Expecting(index) => index,
            ScanPhase::Complete => self.order.len(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase == ScanPhase::Complete
    }

    /// The finalized state once all faces are captured.
    pub fn state(&self) -> Option<&CubeState> {
        self.state.as_ref()
    }

    /// Classifies nine samples for the expected face and records them when
    /// the center matches. A mismatch leaves the machine untouched.
    pub fn capture(&mut self, samples: &[ColorSample; 9]) -> Result<CaptureOutcome> {
        let ScanPhase::Expecting(index) = self.phase else {
            return Err(CubeError::ScanComplete);
        };
        let expected = self
            .order
            .get(index)
            .map(|step| step.face)
            .ok_or(CubeError::ScanComplete)?;

        let labels = self.classifier.classify_all(samples);
        if labels[4] != expected {
            warn!(%expected, found = %labels[4], "center mismatch, show the face again");
            return Err(CubeError::CenterMismatch {
                expected,
                found: labels[4],
            });
        }

        self.faces[expected.index()] = Some(labels);
        let palette = self.classifier.palette();
        let snapshot = FaceSnapshot {
            face: expected,
            labels,
            colors: std::array::from_fn(|i| palette.rgb(labels[i]).unwrap_or(samples[i])),
        };
        info!(face = %expected, captured = index + 1, "face captured");

        match self.order.get(index + 1) {
            Some(next) => {
                self.phase = ScanPhase::Expecting(index + 1);
                Ok(CaptureOutcome::Accepted {
                    snapshot,
                    next: next.face,
                })
            }
            None => {
                let state = CubeState::from_faces(self.faces)?;
                self.phase = ScanPhase::Complete;
                self.state = Some(state.clone());
                info!(facelets = %state, "scan complete");
                Ok(CaptureOutcome::Completed { snapshot, state })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Palette;

    fn machine() -> ScanStateMachine {
        ScanStateMachine::new(ScanOrder::standard(), ColorClassifier::default())
    }

    fn uniform(face: FaceletLabel) -> [ColorSample; 9] {
        [Palette::standard().rgb(face).unwrap(); 9]
    }

    #[test]
    fn mismatched_center_does_not_advance() {
        let mut scan = machine();
        let err = scan.capture(&uniform(FaceletLabel::R)).unwrap_err();
        assert!(matches!(
            err,
            CubeError::CenterMismatch {
                expected: FaceletLabel::U,
                found: FaceletLabel::R
            }
        ));
        assert_eq!(scan.captured(), 0);
        assert_eq!(scan.expected().unwrap().face, FaceletLabel::U);

        let outcome = scan.capture(&uniform(FaceletLabel::U)).unwrap();
        assert_eq!(
            outcome,
            CaptureOutcome::Accepted {
                snapshot: FaceSnapshot {
                    face: FaceletLabel::U,
                    labels: [FaceletLabel::U; 9],
                    colors: [ColorSample::new(255, 255, 255); 9],
                },
                next: FaceletLabel::L,
            }
        );
    }

    #[test]
    fn snapshot_colors_come_from_the_palette() {
        let mut scan = machine();
        let mut samples = [ColorSample::new(250, 248, 252); 9];
        samples[2] = ColorSample::new(200, 35, 60);
        let outcome = scan.capture(&samples).unwrap();
        let snapshot = outcome.snapshot();
        assert_eq!(snapshot.labels[2], FaceletLabel::L);
        assert_eq!(snapshot.colors[2], Palette::standard().rgb(FaceletLabel::L).unwrap());
        assert_eq!(snapshot.colors[4], ColorSample::new(255, 255, 255));
    }

    #[test]
    fn faces_cannot_be_captured_out_of_order() {
        let mut scan = machine();
        scan.capture(&uniform(FaceletLabel::U)).unwrap();
        // Showing U again is a mismatch now that L is expected.
        assert!(scan.capture(&uniform(FaceletLabel::U)).is_err());
        assert!(scan.capture(&uniform(FaceletLabel::F)).is_err());
        assert_eq!(scan.captured(), 1);
    }

    #[test]
    fn six_captures_complete_the_state() {
        let mut scan = machine();
        let order: Vec<FaceletLabel> = scan.order().steps().iter().map(|s| s.face).collect();
        let mut last = None;
        for face in order {
            let mut samples = uniform(face);
            // Off-center stickers may be any color.
            samples[0] = Palette::standard().rgb(FaceletLabel::B).unwrap();
            last = Some(scan.capture(&samples).unwrap());
        }

        assert!(scan.is_complete());
        let Some(CaptureOutcome::Completed { state, .. }) = last else {
            panic!("last capture should complete the scan");
        };
        for face in FaceletLabel::ALL {
            assert_eq!(state.face(face).len(), 9);
            assert_eq!(state.facelet(face, 4), face);
            assert_eq!(state.facelet(face, 0), FaceletLabel::B);
        }
        assert_eq!(scan.state(), Some(&state));
    }

    #[test]
    fn capture_after_completion_is_rejected() {
        let mut scan = machine();
        for step in ScanOrder::standard().steps() {
            scan.capture(&uniform(step.face)).unwrap();
        }
        let before = scan.state().cloned();
        assert!(matches!(
            scan.capture(&uniform(FaceletLabel::U)),
            Err(CubeError::ScanComplete)
        ));
        assert_eq!(scan.state().cloned(), before);
    }

    #[test]
    fn custom_orders_must_cover_every_face() {
        let mut steps = ScanOrder::standard().steps().to_vec();
        assert!(ScanOrder::new(steps.clone()).is_ok());
        steps[5].face = FaceletLabel::U;
        assert!(ScanOrder::new(steps).is_err());
    }
}
