use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{capture::default_sample_points, CubeError, Easing, Palette, Result, SamplePoint};

/// Top-level configuration structure for the application.
///
/// Every section has defaults, so a JSON file only needs the keys it
/// overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub palette: Palette,
    pub scan: ScanConfig,
    pub animation: AnimationConfig,
    pub lattice: LatticeConfig,
}

impl AppConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.palette.validate()?;
        if self.scan.sample_points.len() != 9 {
            return Err(CubeError::InvalidConfig(format!(
                "scan.sample_points must hold 9 points, found {}",
                self.scan.sample_points.len()
            )));
        }
        let out_of_frame = self
            .scan
            .sample_points
            .iter()
            .any(|p| !(0.0..=1.0).contains(&p.x) || !(0.0..=1.0).contains(&p.y));
        if out_of_frame {
            return Err(CubeError::InvalidConfig(
                "scan.sample_points must lie inside the frame".to_string(),
            ));
        }
        if !(self.lattice.spacing.is_finite() && self.lattice.spacing >= 1.0) {
            return Err(CubeError::InvalidConfig(format!(
                "lattice.spacing must be at least 1.0, got {}",
                self.lattice.spacing
            )));
        }
        Ok(())
    }
}

/// Where and how faces are sampled from camera frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub sample_points: Vec<SamplePoint>,
    /// Flip frames horizontally before sampling, as front cameras mirror.
    pub mirror: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sample_points: default_sample_points(),
            mirror: true,
        }
    }
}

/// Timing of the move playback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Zero plays every move instantly.
    pub move_duration_ms: u64,
    pub easing: Easing,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            move_duration_ms: 400,
            easing: Easing::QuadraticInOut,
        }
    }
}

impl AnimationConfig {
    pub fn move_duration(&self) -> Duration {
        Duration::from_millis(self.move_duration_ms)
    }
}

/// Scene export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    /// Distance between neighbouring cubie centers in the exported scene.
    pub spacing: f32,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self { spacing: 1.05 }
    }
}
