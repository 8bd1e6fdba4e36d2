//! Detect-and-predict pipeline.
//!
//! Decodes an uploaded image, locates the largest face, crops it and
//! classifies the expression. Zero detected faces is a distinct outcome
//! so callers can answer with "not found" rather than a server error.

use crate::classifier::{ClassifierError, EmotionClassifier};
use crate::locator::{largest_face, FaceLocator};
use crate::types::{FaceBox, Prediction};
use image::{imageops, GrayImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("uploaded bytes do not decode as an image")]
    InvalidImage,
    #[error("no face detected")]
    NoFaceDetected,
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// Run the full pipeline over raw uploaded bytes (JPEG or PNG).
pub fn detect_and_predict<L, C>(
    locator: &mut L,
    classifier: &mut C,
    bytes: &[u8],
) -> Result<Prediction, PipelineError>
where
    L: FaceLocator,
    C: EmotionClassifier,
{
    let decoded = image::load_from_memory(bytes).map_err(|e| {
        tracing::debug!(error = %e, "image decode failed");
        PipelineError::InvalidImage
    })?;
    let gray = decoded.to_luma8();

    let faces = locator.locate(&gray);
    tracing::debug!(count = faces.len(), "faces located");

    let face = largest_face(&faces).ok_or(PipelineError::NoFaceDetected)?;
    let crop = crop_face(&gray, face).ok_or(PipelineError::NoFaceDetected)?;

    let prediction = classifier.classify(&crop)?;
    tracing::debug!(
        emotion = %prediction.emotion,
        confidence = prediction.confidence,
        "face classified"
    );

    Ok(prediction)
}

/// Crop a face box out of a grayscale image, clamping to the image bounds.
///
/// Returns `None` when the clamped box has no area (the cascade reported a
/// box entirely outside the image).
pub fn crop_face(gray: &GrayImage, face: &FaceBox) -> Option<GrayImage> {
    let x0 = face.x.max(0) as u32;
    let y0 = face.y.max(0) as u32;
    let x1 = (face.x + face.width as i32).clamp(0, gray.width() as i32) as u32;
    let y1 = (face.y + face.height as i32).clamp(0, gray.height() as i32) as u32;

    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    Some(imageops::crop_imm(gray, x0, y0, x1 - x0, y1 - y0).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Emotion;
    use image::Luma;
    use std::io::Cursor;

    struct StubLocator(Vec<FaceBox>);

    impl FaceLocator for StubLocator {
        fn locate(&mut self, _gray: &GrayImage) -> Vec<FaceBox> {
            self.0.clone()
        }
    }

    struct StubClassifier(Result<Prediction, ()>);

    impl EmotionClassifier for StubClassifier {
        fn classify(&mut self, _face: &GrayImage) -> Result<Prediction, ClassifierError> {
            self.0.clone().map_err(|_| {
                ClassifierError::InferenceFailed("stub failure".to_string())
            })
        }
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = GrayImage::from_pixel(width, height, Luma([128]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn face(x: i32, y: i32, w: u32, h: u32) -> FaceBox {
        FaceBox { x, y, width: w, height: h, score: 3.0 }
    }

    fn happy() -> Prediction {
        Prediction { emotion: Emotion::Happy, confidence: 0.92 }
    }

    #[test]
    fn test_invalid_bytes_rejected() {
        let mut locator = StubLocator(vec![face(0, 0, 10, 10)]);
        let mut classifier = StubClassifier(Ok(happy()));
        let err = detect_and_predict(&mut locator, &mut classifier, b"not an image").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidImage));
    }

    #[test]
    fn test_no_face_detected() {
        let mut locator = StubLocator(vec![]);
        let mut classifier = StubClassifier(Ok(happy()));
        let bytes = png_bytes(64, 64);
        let err = detect_and_predict(&mut locator, &mut classifier, &bytes).unwrap_err();
        assert!(matches!(err, PipelineError::NoFaceDetected));
    }

    #[test]
    fn test_happy_path() {
        let mut locator = StubLocator(vec![face(8, 8, 32, 32)]);
        let mut classifier = StubClassifier(Ok(happy()));
        let bytes = png_bytes(64, 64);
        let prediction = detect_and_predict(&mut locator, &mut classifier, &bytes).unwrap();
        assert_eq!(prediction.emotion, Emotion::Happy);
        assert!((0.0..=1.0).contains(&prediction.confidence));
    }

    #[test]
    fn test_classifier_failure_propagates() {
        let mut locator = StubLocator(vec![face(0, 0, 32, 32)]);
        let mut classifier = StubClassifier(Err(()));
        let bytes = png_bytes(64, 64);
        let err = detect_and_predict(&mut locator, &mut classifier, &bytes).unwrap_err();
        assert!(matches!(err, PipelineError::Classifier(_)));
    }

    #[test]
    fn test_box_fully_outside_image_is_no_face() {
        let mut locator = StubLocator(vec![face(200, 200, 30, 30)]);
        let mut classifier = StubClassifier(Ok(happy()));
        let bytes = png_bytes(64, 64);
        let err = detect_and_predict(&mut locator, &mut classifier, &bytes).unwrap_err();
        assert!(matches!(err, PipelineError::NoFaceDetected));
    }

    #[test]
    fn test_crop_face_clamps_to_bounds() {
        let gray = GrayImage::from_pixel(100, 100, Luma([50]));
        // Extends past the right and bottom edges.
        let crop = crop_face(&gray, &face(80, 90, 40, 40)).unwrap();
        assert_eq!(crop.width(), 20);
        assert_eq!(crop.height(), 10);
    }

    #[test]
    fn test_crop_face_negative_origin() {
        let gray = GrayImage::from_pixel(100, 100, Luma([50]));
        let crop = crop_face(&gray, &face(-10, -10, 40, 40)).unwrap();
        assert_eq!(crop.width(), 30);
        assert_eq!(crop.height(), 30);
    }

    #[test]
    fn test_crop_face_no_overlap() {
        let gray = GrayImage::from_pixel(50, 50, Luma([50]));
        assert!(crop_face(&gray, &face(60, 60, 20, 20)).is_none());
    }

    #[test]
    fn test_largest_of_two_faces_wins() {
        // The big face is second in detector order; ensure area decides.
        let mut calls: Vec<(u32, u32)> = Vec::new();

        struct RecordingClassifier<'a>(&'a mut Vec<(u32, u32)>);
        impl EmotionClassifier for RecordingClassifier<'_> {
            fn classify(&mut self, crop: &GrayImage) -> Result<Prediction, ClassifierError> {
                self.0.push((crop.width(), crop.height()));
                Ok(Prediction { emotion: Emotion::Neutral, confidence: 0.5 })
            }
        }

        let mut locator = StubLocator(vec![face(0, 0, 10, 10), face(20, 20, 40, 40)]);
        let bytes = png_bytes(96, 96);
        let mut classifier = RecordingClassifier(&mut calls);
        detect_and_predict(&mut locator, &mut classifier, &bytes).unwrap();
        drop(classifier);
        assert_eq!(calls, vec![(40, 40)]);
    }
}
