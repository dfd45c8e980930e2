use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{ColorSample, CubeError, Result};

/// Relative position inside a frame, both coordinates in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub x: f32,
    pub y: f32,
}

impl SamplePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The 3×3 grid at quarter offsets, row-major.
pub fn default_sample_points() -> Vec<SamplePoint> {
    const STEPS: [f32; 3] = [0.25, 0.5, 0.75];
    STEPS
        .iter()
        .flat_map(|y| STEPS.iter().map(move |x| SamplePoint::new(*x, *y)))
        .collect()
}

/// Tightly packed RGB8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(CubeError::CameraUnavailable(format!(
                "malformed {width}x{height} frame with {} bytes",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Uniform frame, handy for synthetic captures.
    pub fn filled(width: u32, height: u32, color: ColorSample) -> Result<Self> {
        let pixels = [color.r, color.g, color.b].repeat(width as usize * height as usize);
        Self::new(width, height, pixels)
    }

    /// Builds a frame of 3×3 square cells as a camera would see the face held
    /// in front of it. `grid` is in reading order of the physical face; when
    /// `mirrored` the columns are flipped the way a front camera delivers them.
    pub fn from_grid(grid: &[ColorSample; 9], cell: u32, mirrored: bool) -> Self {
        let size = cell.max(1) * 3;
        let mut pixels = Vec::with_capacity(size as usize * size as usize * 3);
        for y in 0..size {
            for x in 0..size {
                let mut col = (x / cell.max(1)) as usize;
                if mirrored {
                    col = 2 - col;
                }
                let row = (y / cell.max(1)) as usize;
                let color = grid[row * 3 + col];
                pixels.extend_from_slice(&[color.r, color.g, color.b]);
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> ColorSample {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let offset = (y * self.width as usize + x) * 3;
        ColorSample::new(
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        )
    }

    /// Samples one pixel per point. With `mirror` the frame is flipped
    /// horizontally first, so the result reads like the face itself.
    pub fn sample(&self, point: SamplePoint, mirror: bool) -> ColorSample {
        let x = (self.width as f32 * point.x.clamp(0.0, 1.0)).floor() as u32;
        let y = (self.height as f32 * point.y.clamp(0.0, 1.0)).floor() as u32;
        let x = x.min(self.width - 1);
        let x = if mirror { self.width - 1 - x } else { x };
        self.pixel(x, y)
    }

    pub fn sample_face(&self, points: &[SamplePoint], mirror: bool) -> Result<[ColorSample; 9]> {
        if points.len() != 9 {
            return Err(CubeError::InvalidConfig(format!(
                "a face needs 9 sample points, got {}",
                points.len()
            )));
        }
        Ok(std::array::from_fn(|i| self.sample(points[i], mirror)))
    }
}

/// Source of video frames. Acquisition is a one-shot request that has to
/// succeed before any frame is read.
pub trait CameraSource {
    fn open(&mut self) -> Result<()>;

    fn frame(&mut self) -> Result<Frame>;

    fn close(&mut self) {}
}

/// Camera that replays a fixed queue of frames.
#[derive(Debug, Default)]
pub struct StaticCamera {
    frames: VecDeque<Frame>,
    available: bool,
    open: bool,
}

impl StaticCamera {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            available: true,
            open: false,
        }
    }

    /// A camera whose permission request is always denied.
    pub fn denied() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl CameraSource for StaticCamera {
    fn open(&mut self) -> Result<()> {
        if !self.available {
            return Err(CubeError::CameraUnavailable(
                "camera access was denied".to_string(),
            ));
        }
        self.open = true;
        Ok(())
    }

    fn frame(&mut self) -> Result<Frame> {
        if !self.open {
            return Err(CubeError::CameraUnavailable("camera is not open".to_string()));
        }
        self.frames
            .pop_front()
            .ok_or_else(|| CubeError::CameraUnavailable("stream ended".to_string()))
    }

    fn close(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> [ColorSample; 9] {
        std::array::from_fn(|i| ColorSample::new(i as u8 * 10, 0, 0))
    }

    #[test]
    fn default_points_are_row_major_quarters() {
        let points = default_sample_points();
        assert_eq!(points.len(), 9);
        assert_eq!(points[1], SamplePoint::new(0.5, 0.25));
        assert_eq!(points[3], SamplePoint::new(0.25, 0.5));
    }

    #[test]
    fn mirrored_capture_reads_in_face_order() {
        let frame = Frame::from_grid(&grid(), 8, true);
        let samples = frame.sample_face(&default_sample_points(), true).unwrap();
        assert_eq!(samples, grid());
    }

    #[test]
    fn unmirrored_capture_reads_in_face_order() {
        let frame = Frame::from_grid(&grid(), 4, false);
        let samples = frame.sample_face(&default_sample_points(), false).unwrap();
        assert_eq!(samples, grid());
    }

    #[test]
    fn rejects_malformed_frames() {
        assert!(Frame::new(2, 2, vec![0; 5]).is_err());
        assert!(Frame::new(0, 2, Vec::new()).is_err());
        assert!(Frame::filled(0, 0, ColorSample::new(1, 2, 3)).is_err());
        assert!(Frame::filled(3, 0, ColorSample::new(1, 2, 3)).is_err());
    }

    #[test]
    fn single_pixel_frame_samples_every_point() {
        let blue = ColorSample::new(0, 0, 255);
        let frame = Frame::filled(1, 1, blue).unwrap();
        assert_eq!(frame.sample(SamplePoint::new(1.0, 1.0), true), blue);
        assert_eq!(frame.sample_face(&default_sample_points(), false).unwrap(), [blue; 9]);
    }

    #[test]
    fn denied_camera_reports_unavailable() {
        let mut camera = StaticCamera::denied();
        assert!(matches!(camera.open(), Err(CubeError::CameraUnavailable(_))));
        assert!(matches!(camera.frame(), Err(CubeError::CameraUnavailable(_))));
    }

    #[test]
    fn static_camera_replays_frames_in_order() {
        let red = ColorSample::new(255, 0, 0);
        let mut camera = StaticCamera::new([Frame::filled(2, 2, red).unwrap()]);
        camera.open().unwrap();
        assert_eq!(camera.frame().unwrap().pixel(1, 1), red);
        assert!(camera.frame().is_err());
    }
}
