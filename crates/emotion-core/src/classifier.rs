//! Expression classifier via ONNX Runtime.
//!
//! Runs a pretrained CNN over a 48×48 grayscale face crop and returns the
//! highest-probability class among the seven emotion categories.

use crate::types::{Emotion, Prediction};
use image::{imageops, GrayImage};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

// --- Named constants ---
/// Network input is 48×48, single channel, NHWC with batch size 1.
const INPUT_SIZE: u32 = 48;
const NUM_CLASSES: usize = 7;
const PIXEL_SCALE: f32 = 255.0;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Strategy for classifying the expression of a grayscale face crop.
///
/// A trait seam so tests can substitute a stub classifier for the
/// pretrained network.
pub trait EmotionClassifier {
    fn classify(&mut self, face: &GrayImage) -> Result<Prediction, ClassifierError>;
}

/// ONNX-backed expression classifier.
#[derive(Debug)]
pub struct OnnxClassifier {
    session: Session,
}

impl OnnxClassifier {
    /// Load the pretrained CNN from the given ONNX file.
    pub fn load(model_path: &str) -> Result<Self, ClassifierError> {
        if !Path::new(model_path).exists() {
            return Err(ClassifierError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)
            .map_err(ort::Error::from)?
            .commit_from_file(model_path)?;

        tracing::info!(
            path = model_path,
            inputs = ?session.inputs().iter().map(|i| (i.name(), i.dtype())).collect::<Vec<_>>(),
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            "loaded emotion model"
        );

        Ok(Self { session })
    }
}

impl EmotionClassifier for OnnxClassifier {
    fn classify(&mut self, face: &GrayImage) -> Result<Prediction, ClassifierError> {
        let input = preprocess(face);

        let outputs = self.session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, probs) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::InferenceFailed(format!("class probabilities: {e}")))?;

        if probs.len() != NUM_CLASSES {
            return Err(ClassifierError::InferenceFailed(format!(
                "expected {NUM_CLASSES} class probabilities, got {}",
                probs.len()
            )));
        }

        let index = argmax(probs).ok_or_else(|| {
            ClassifierError::InferenceFailed("empty probability vector".to_string())
        })?;
        let emotion = Emotion::from_index(index).ok_or_else(|| {
            ClassifierError::InferenceFailed(format!("class index {index} out of range"))
        })?;

        Ok(Prediction {
            emotion,
            confidence: probs[index].clamp(0.0, 1.0),
        })
    }
}

/// Preprocess a grayscale face crop into the network's input tensor.
///
/// Resizes to 48×48, scales intensities from [0, 255] to [0.0, 1.0] and
/// frames the result as NHWC (1, 48, 48, 1). Resizing an already-48×48
/// crop is a no-op on pixel values up to floating-point rounding.
pub fn preprocess(face: &GrayImage) -> Array4<f32> {
    let resized = if face.width() == INPUT_SIZE && face.height() == INPUT_SIZE {
        face.clone()
    } else {
        imageops::resize(face, INPUT_SIZE, INPUT_SIZE, imageops::FilterType::Triangle)
    };

    let size = INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, size, size, 1));
    for y in 0..size {
        for x in 0..size {
            let pixel = resized.get_pixel(x as u32, y as u32)[0];
            tensor[[0, y, x, 0]] = f32::from(pixel) / PIXEL_SCALE;
        }
    }

    tensor
}

/// Index of the maximum value; ties keep the first maximal element.
fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
