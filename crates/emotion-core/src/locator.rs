//! Face locator backed by a pretrained SeetaFace funnel cascade.
//!
//! The cascade binary is loaded once from disk; detection runs a fixed
//! multi-scale sliding window over a grayscale image and returns zero or
//! more candidate boxes. Zero faces is a valid outcome, not an error.

use crate::types::FaceBox;
use image::GrayImage;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

// --- Named constants (fixed, not configurable) ---
const MIN_FACE_SIZE: u32 = 30;
/// Pyramid shrink per level; ≈ 1/1.1, the conventional cascade scale step.
const PYRAMID_SCALE_FACTOR: f32 = 0.91;
const SCORE_THRESHOLD: f64 = 2.0;
const SLIDE_WINDOW_STEP: u32 = 4;

#[derive(Error, Debug)]
pub enum LocatorError {
    #[error("cascade model file not found: {0}")]
    ModelNotFound(String),
    #[error("failed to read cascade model: {0}")]
    InvalidModel(String),
}

/// Strategy for locating faces in a grayscale image.
///
/// A trait seam so tests can substitute a stub locator for the pretrained
/// cascade.
pub trait FaceLocator {
    fn locate(&mut self, gray: &GrayImage) -> Vec<FaceBox>;
}

/// SeetaFace-cascade face detector.
pub struct CascadeFaceDetector {
    model: rustface::Model,
}

impl std::fmt::Debug for CascadeFaceDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeFaceDetector").finish_non_exhaustive()
    }
}

impl CascadeFaceDetector {
    /// Load the pretrained cascade binary from the given path.
    pub fn load(model_path: &str) -> Result<Self, LocatorError> {
        if !Path::new(model_path).exists() {
            return Err(LocatorError::ModelNotFound(model_path.to_string()));
        }

        let bytes = std::fs::read(model_path)
            .map_err(|e| LocatorError::InvalidModel(e.to_string()))?;
        let model = rustface::read_model(Cursor::new(bytes))
            .map_err(|e| LocatorError::InvalidModel(e.to_string()))?;

        tracing::info!(path = model_path, "loaded face cascade model");

        Ok(Self { model })
    }
}

impl FaceLocator for CascadeFaceDetector {
    fn locate(&mut self, gray: &GrayImage) -> Vec<FaceBox> {
        // The rustface detector is stateful per run, so a fresh one is
        // built from the shared model for each call.
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(MIN_FACE_SIZE);
        detector.set_score_thresh(SCORE_THRESHOLD);
        detector.set_pyramid_scale_factor(PYRAMID_SCALE_FACTOR);
        detector.set_slide_window_step(SLIDE_WINDOW_STEP, SLIDE_WINDOW_STEP);

        let faces = detector.detect(&rustface::ImageData::new(
            gray.as_raw(),
            gray.width(),
            gray.height(),
        ));

        faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBox {
                    x: bbox.x(),
                    y: bbox.y(),
                    width: bbox.width(),
                    height: bbox.height(),
                    score: face.score(),
                }
            })
            .collect()
    }
}

/// Select the primary subject: the box with maximal width × height.
///
/// Ties keep the first maximal element in the detector's candidate order.
pub fn largest_face(faces: &[FaceBox]) -> Option<&FaceBox> {
    let mut best: Option<&FaceBox> = None;
    for face in faces {
        match best {
            Some(b) if face.area() <= b.area() => {}
            _ => best = Some(face),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_box(x: i32, y: i32, w: u32, h: u32) -> FaceBox {
        FaceBox { x, y, width: w, height: h, score: 1.0 }
    }

    #[test]
    fn test_largest_face_empty() {
        assert!(largest_face(&[]).is_none());
    }

    #[test]
    fn test_largest_face_picks_max_area() {
        let faces = vec![
            make_box(0, 0, 30, 30),
            make_box(50, 50, 100, 80),
            make_box(10, 10, 40, 40),
        ];
        let best = largest_face(&faces).unwrap();
        assert_eq!(best.width, 100);
        assert_eq!(best.height, 80);
    }

    #[test]
    fn test_largest_face_tie_keeps_first() {
        // Same area (60×40 vs 40×60); the first encountered wins.
        let faces = vec![make_box(0, 0, 60, 40), make_box(5, 5, 40, 60)];
        let best = largest_face(&faces).unwrap();
        assert_eq!((best.x, best.y), (0, 0));
    }

    #[test]
    fn test_load_missing_model() {
        let err = CascadeFaceDetector::load("/nonexistent/cascade.bin").unwrap_err();
        assert!(matches!(err, LocatorError::ModelNotFound(_)));
    }
}
