//! HTTP error taxonomy and response mapping.
//!
//! Error bodies mirror the original service's `{ "detail": ... }` shape,
//! detail messages included.

use crate::engine::EngineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use emotion_core::pipeline::PipelineError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("models not loaded")]
    ServiceUnavailable,
    #[error("no file field in upload")]
    MissingFile,
    #[error("uploaded bytes do not decode as an image")]
    InvalidImage,
    #[error("no face detected")]
    NoFaceDetected,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("engine error: {0}")]
    Engine(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::MissingFile | ApiError::InvalidImage => StatusCode::BAD_REQUEST,
            ApiError::NoFaceDetected => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> &'static str {
        match self {
            ApiError::ServiceUnavailable => {
                "Le service de détection d'émotion est actuellement indisponible (modèles non chargés)."
            }
            ApiError::MissingFile => "Aucun fichier fourni dans le champ 'file'.",
            ApiError::InvalidImage => "Fichier image non valide ou illisible.",
            ApiError::NoFaceDetected => {
                "Aucun visage détecté dans l'image fournie. Assurez-vous que l'image contient un visage clair."
            }
            ApiError::Database(_) | ApiError::Engine(_) => "Erreur interne du serveur.",
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Pipeline(PipelineError::InvalidImage) => ApiError::InvalidImage,
            EngineError::Pipeline(PipelineError::NoFaceDetected) => ApiError::NoFaceDetected,
            other => ApiError::Engine(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::ServiceUnavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ApiError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidImage.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NoFaceDetected.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Engine("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_engine_error_conversion() {
        let err: ApiError = EngineError::Pipeline(PipelineError::NoFaceDetected).into();
        assert!(matches!(err, ApiError::NoFaceDetected));

        let err: ApiError = EngineError::Pipeline(PipelineError::InvalidImage).into();
        assert!(matches!(err, ApiError::InvalidImage));

        let err: ApiError = EngineError::ChannelClosed.into();
        assert!(matches!(err, ApiError::Engine(_)));
    }
}
