use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CubeError, FaceletLabel, Result};

/// Face order the external solver expects in the canonical string.
pub const SOLVER_FACE_ORDER: [FaceletLabel; 6] = [
    FaceletLabel::U,
    FaceletLabel::R,
    FaceletLabel::F,
    FaceletLabel::D,
    FaceletLabel::L,
    FaceletLabel::B,
];

/// Complete 6×9 facelet record. Every face is present and each center equals
/// its own face; the constructors refuse anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeState {
    faces: [[FaceletLabel; 9]; 6],
}

impl CubeState {
    /// Builds a state from per-face captures indexed by [`FaceletLabel::index`].
    pub fn from_faces(faces: [Option<[FaceletLabel; 9]>; 6]) -> Result<Self> {
        let mut complete = [[FaceletLabel::U; 9]; 6];
        for face in FaceletLabel::ALL {
            let labels = faces[face.index()]
                .ok_or_else(|| CubeError::InvalidState(format!("face {face} was not scanned")))?;
            if labels[4] != face {
                return Err(CubeError::InvalidState(format!(
                    "face {face} has center {}",
                    labels[4]
                )));
            }
            complete[face.index()] = labels;
        }
        Ok(Self { faces: complete })
    }

    pub fn solved() -> Self {
        Self {
            faces: FaceletLabel::ALL.map(|face| [face; 9]),
        }
    }

    /// Parses a 54 character canonical string in [`SOLVER_FACE_ORDER`].
    pub fn from_facelets(text: &str) -> Result<Self> {
        let chars: Vec<char> = text.trim().chars().collect();
        if chars.len() != 54 {
            return Err(CubeError::InvalidState(format!(
                "expected 54 facelets, found {}",
                chars.len()
            )));
        }

        let mut faces = [None; 6];
        for (chunk, face) in chars.chunks(9).zip(SOLVER_FACE_ORDER) {
            let mut labels = [FaceletLabel::U; 9];
            for (slot, value) in labels.iter_mut().zip(chunk) {
                *slot = FaceletLabel::from_char(*value).ok_or_else(|| {
                    CubeError::InvalidState(format!("unknown facelet `{value}`"))
                })?;
            }
            faces[face.index()] = Some(labels);
        }
        Self::from_faces(faces)
    }

    pub fn face(&self, face: FaceletLabel) -> &[FaceletLabel; 9] {
        &self.faces[face.index()]
    }

    pub fn facelet(&self, face: FaceletLabel, index: usize) -> FaceletLabel {
        self.faces[face.index()][index]
    }

    /// Canonical solver input. Pure: equal states always yield equal strings.
    pub fn to_facelets(&self) -> String {
        SOLVER_FACE_ORDER
            .iter()
            .flat_map(|face| self.face(*face).iter().map(|label| label.as_char()))
            .collect()
    }

    pub fn is_solved(&self) -> bool {
        FaceletLabel::ALL
            .iter()
            .all(|face| self.face(*face).iter().all(|label| label == face))
    }
}

impl fmt::Display for CubeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_facelets())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLVED: &str = "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";

    #[test]
    fn solved_state_serializes_in_solver_order() {
        let state = CubeState::solved();
        assert_eq!(state.to_facelets(), SOLVED);
        assert_eq!(state.to_facelets().len(), 54);
        assert!(state.is_solved());
    }

    #[test]
    fn serialization_is_stable() {
        let text = "DRLUUBFBRBLURRLRUBLRDDFDLFUFUFFDBRDUBRUFLLFDDBFLUBLRBD";
        let state = CubeState::from_facelets(text).unwrap();
        assert_eq!(state.to_facelets(), text);
        assert_eq!(state.clone().to_facelets(), state.to_facelets());
        assert!(!state.is_solved());
    }

    #[test]
    fn rejects_missing_faces_and_wrong_centers() {
        let mut faces = FaceletLabel::ALL.map(|face| Some([face; 9]));
        faces[FaceletLabel::B.index()] = None;
        let err = CubeState::from_faces(faces).unwrap_err();
        assert!(format!("{err}").contains("face B"));

        let mut faces = FaceletLabel::ALL.map(|face| Some([face; 9]));
        faces[FaceletLabel::F.index()] = Some([FaceletLabel::R; 9]);
        assert!(CubeState::from_faces(faces).is_err());
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!(CubeState::from_facelets("UUU").is_err());
        let bad = SOLVED.replacen('R', "X", 1);
        assert!(CubeState::from_facelets(&bad).is_err());
    }
}
