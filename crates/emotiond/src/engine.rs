//! Inference engine thread.
//!
//! Both pretrained artifacts are loaded once at startup and moved onto a
//! dedicated OS thread; HTTP handlers reach it through a clone-safe
//! [`EngineHandle`]. Model state is immutable for the process lifetime.

use emotion_core::classifier::{ClassifierError, OnnxClassifier};
use emotion_core::locator::{CascadeFaceDetector, LocatorError};
use emotion_core::pipeline::{detect_and_predict, PipelineError};
use emotion_core::types::Prediction;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Locator(#[from] LocatorError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("engine thread exited")]
    ChannelClosed,
}

enum EngineRequest {
    Predict {
        image: Vec<u8>,
        reply: oneshot::Sender<Result<Prediction, PipelineError>>,
    },
}

/// Clone-safe handle to the engine thread.
#[derive(Clone, Debug)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    /// Run the detect-and-predict pipeline over uploaded image bytes.
    pub async fn predict(&self, image: Vec<u8>) -> Result<Prediction, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Predict { image, reply: reply_tx })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        let result = reply_rx.await.map_err(|_| EngineError::ChannelClosed)?;
        Ok(result?)
    }
}

/// Load both pretrained artifacts and spawn the engine thread.
///
/// Fails fast when either artifact is missing or unreadable; the caller
/// decides whether that degrades the service or aborts it.
pub fn spawn_engine(cascade_path: &str, model_path: &str) -> Result<EngineHandle, EngineError> {
    // Both load constructors log the artifact path on success.
    let mut locator = CascadeFaceDetector::load(cascade_path)?;
    let mut classifier = OnnxClassifier::load(model_path)?;

    let (tx, mut rx) = mpsc::channel::<EngineRequest>(4);

    std::thread::Builder::new()
        .name("emotion-engine".into())
        .spawn(move || {
            tracing::info!("engine thread started");
            while let Some(req) = rx.blocking_recv() {
                match req {
                    EngineRequest::Predict { image, reply } => {
                        let result = detect_and_predict(&mut locator, &mut classifier, &image);
                        let _ = reply.send(result);
                    }
                }
            }
            tracing::info!("engine thread exiting");
        })
        .expect("failed to spawn engine thread");

    Ok(EngineHandle { tx })
}
