use serde::{Deserialize, Serialize};

use crate::{CubeError, FaceletLabel, Result};

/// Raw pixel value sampled from a camera frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct ColorSample {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorSample {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Squared Euclidean distance in RGB space. Exact in integers, so ties are
    /// real ties rather than float noise.
    pub fn distance_squared(self, other: ColorSample) -> u32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        (dr * dr + dg * dg + db * db) as u32
    }
}

impl From<[u8; 3]> for ColorSample {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<ColorSample> for [u8; 3] {
    fn from(value: ColorSample) -> Self {
        [value.r, value.g, value.b]
    }
}

/// Physical sticker color associated with a face letter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceColor {
    pub label: FaceletLabel,
    pub name: String,
    pub rgb: ColorSample,
}

impl ReferenceColor {
    pub fn new(label: FaceletLabel, name: impl Into<String>, rgb: [u8; 3]) -> Self {
        Self {
            label,
            name: name.into(),
            rgb: rgb.into(),
        }
    }
}

/// Ordered set of reference colors. Order matters: on equal distance the
/// earlier entry wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub colors: Vec<ReferenceColor>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

impl Palette {
    /// White U, yellow D, blue F, green B, red L, orange R.
    pub fn standard() -> Self {
        Self {
            colors: vec![
                ReferenceColor::new(FaceletLabel::U, "WHITE", [255, 255, 255]),
                ReferenceColor::new(FaceletLabel::D, "YELLOW", [255, 255, 0]),
                ReferenceColor::new(FaceletLabel::F, "BLUE", [0, 81, 186]),
                ReferenceColor::new(FaceletLabel::B, "GREEN", [0, 158, 96]),
                ReferenceColor::new(FaceletLabel::L, "RED", [196, 30, 58]),
                ReferenceColor::new(FaceletLabel::R, "ORANGE", [255, 88, 0]),
            ],
        }
    }

    /// Every face letter must appear exactly once.
    pub fn validate(&self) -> Result<()> {
        for face in FaceletLabel::ALL {
            let count = self.colors.iter().filter(|c| c.label == face).count();
            if count != 1 {
                return Err(CubeError::InvalidConfig(format!(
                    "palette must define face {face} exactly once, found {count}"
                )));
            }
        }
        if self.colors.len() != FaceletLabel::ALL.len() {
            return Err(CubeError::InvalidConfig(format!(
                "palette must hold 6 colors, found {}",
                self.colors.len()
            )));
        }
        Ok(())
    }

    pub fn get(&self, label: FaceletLabel) -> Option<&ReferenceColor> {
        self.colors.iter().find(|c| c.label == label)
    }

    pub fn rgb(&self, label: FaceletLabel) -> Option<ColorSample> {
        self.get(label).map(|c| c.rgb)
    }
}

/// Nearest-neighbour classifier over a validated [`Palette`].
#[derive(Debug, Clone)]
pub struct ColorClassifier {
    palette: Palette,
}

impl Default for ColorClassifier {
    fn default() -> Self {
        Self {
            palette: Palette::standard(),
        }
    }
}

impl ColorClassifier {
    pub fn new(palette: Palette) -> Result<Self> {
        palette.validate()?;
        Ok(Self { palette })
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Returns the label of the closest reference color. Never fails.
    pub fn classify(&self, sample: ColorSample) -> FaceletLabel {
        let mut best: Option<(u32, FaceletLabel)> = None;
        for reference in &self.palette.colors {
            let distance = sample.distance_squared(reference.rgb);
            if best.map_or(true, |(closest, _)| distance < closest) {
                best = Some((distance, reference.label));
            }
        }
        best.map(|(_, label)| label).unwrap_or(FaceletLabel::U)
    }

    pub fn classify_all<const N: usize>(&self, samples: &[ColorSample; N]) -> [FaceletLabel; N] {
        std::array::from_fn(|i| self.classify(samples[i]))
    }
}
