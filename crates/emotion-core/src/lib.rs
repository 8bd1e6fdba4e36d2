//! emotion-core — Face location and facial-expression classification.
//!
//! Uses a pretrained SeetaFace funnel cascade for face detection and a
//! pretrained CNN (via ONNX Runtime, CPU inference) for classifying the
//! expression into one of seven emotion categories.

pub mod classifier;
pub mod locator;
pub mod pipeline;
pub mod types;

pub use classifier::{ClassifierError, EmotionClassifier, OnnxClassifier};
pub use locator::{CascadeFaceDetector, FaceLocator, LocatorError};
pub use pipeline::{detect_and_predict, PipelineError};
pub use types::{Emotion, FaceBox, Prediction};
