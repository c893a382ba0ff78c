//! Text recognition engines.
//!
//! The service talks to OCR engines through [`TextRecognizer`] so the
//! tesseract backend can be swapped for the mock one in local runs and tests.

pub mod mock;
pub mod tesseract;

use crate::config::{EngineKind, OcrSettings};
use async_trait::async_trait;
use image::DynamicImage;
use service_core::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub use mock::MockRecognizer;
pub use tesseract::TesseractRecognizer;

/// Failure while producing a transcription.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("cannot read image {}: {source}", .path.display())]
    ImageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode image {}: {source}", .path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{0}")]
    Engine(String),
}

impl From<OcrError> for AppError {
    fn from(err: OcrError) -> Self {
        let message = err.to_string();
        match err {
            OcrError::ImageUnavailable { .. } => AppError::ImageUnavailable(message),
            OcrError::ImageDecode { .. } => AppError::ImageDecodeError(message),
            OcrError::Engine(_) => AppError::OcrEngineError(message),
        }
    }
}

impl OcrError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            OcrError::ImageUnavailable { .. } => "image_unavailable",
            OcrError::ImageDecode { .. } => "image_decode",
            OcrError::Engine(_) => "engine",
        }
    }
}

#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Engine identifier used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Transcribe the text contained in `image`.
    async fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;

    /// Check that the engine can be invoked.
    async fn health_check(&self) -> Result<(), OcrError>;
}

pub fn build_recognizer(settings: &OcrSettings) -> Arc<dyn TextRecognizer> {
    match settings.engine {
        EngineKind::Tesseract => Arc::new(TesseractRecognizer::new(settings)),
        EngineKind::Mock => Arc::new(MockRecognizer::new(settings.mock_text.clone())),
    }
}
