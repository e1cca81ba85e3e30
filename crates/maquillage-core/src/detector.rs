//! Landmark detector seam.
//!
//! The engine never runs a face tracker itself. Hosts implement
//! [`LandmarkDetector`] over whatever tracker they have and hand the result
//! to the pipeline; [`StaticDetector`] replays a fixed detection, which is how
//! the CLI feeds landmark files through the same path.

use crate::types::{LandmarkPoint, LandmarkSet};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("landmark file not found: {0}")]
    NotFound(String),
    #[error("failed to read landmarks: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid landmark JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("detection is {detected:?} but frame is {frame:?}")]
    FrameMismatch { detected: (u32, u32), frame: (u32, u32) },
}

/// One face's landmarks as reported by a tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub landmarks: LandmarkSet,
    pub source_width: u32,
    pub source_height: u32,
    /// Coordinates are in `[0, 1]` rather than source pixels.
    #[serde(default)]
    pub normalized: bool,
}

impl Detection {
    pub fn from_json_str(src: &str) -> Result<Self, DetectorError> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, DetectorError> {
        if !path.exists() {
            return Err(DetectorError::NotFound(path.display().to_string()));
        }
        let src = std::fs::read_to_string(path)?;
        Self::from_json_str(&src)
    }

    /// Landmarks in source-image pixels.
    pub fn to_pixels(&self) -> LandmarkSet {
        if !self.normalized {
            return self.landmarks.clone();
        }
        let (w, h) = (self.source_width as f32, self.source_height as f32);
        let mut out = LandmarkSet::with_len(self.landmarks.len());
        for (i, p) in self.landmarks.iter() {
            out.set(i, LandmarkPoint { x: p.x * w, y: p.y * h, z: p.z });
        }
        out
    }

    pub fn source_size(&self) -> (u32, u32) {
        (self.source_width, self.source_height)
    }
}

/// Anything that can produce landmarks for a frame.
///
/// `Ok(None)` means no face was found; the pipeline then skips every effect.
pub trait LandmarkDetector {
    fn detect(&mut self, frame: &RgbaImage) -> Result<Option<Detection>, DetectorError>;
}

/// Replays one fixed detection for every frame.
#[derive(Debug, Clone, Default)]
pub struct StaticDetector {
    detection: Option<Detection>,
    /// Reject frames whose size differs from the detection's source size.
    strict: bool,
}

impl StaticDetector {
    pub fn new(detection: Detection) -> Self {
        Self {
            detection: Some(detection),
            strict: false,
        }
    }

    /// A detector that never finds a face.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

impl LandmarkDetector for StaticDetector {
    fn detect(&mut self, frame: &RgbaImage) -> Result<Option<Detection>, DetectorError> {
        let Some(detection) = &self.detection else {
            tracing::debug!("no face");
            return Ok(None);
        };
        if self.strict && detection.source_size() != frame.dimensions() {
            return Err(DetectorError::FrameMismatch {
                detected: detection.source_size(),
                frame: frame.dimensions(),
            });
        }
        Ok(Some(detection.clone()))
    }
}
