use crate::services::image_loader::load_image;
use crate::services::recognizers::{OcrError, TextRecognizer};
use metrics::{counter, histogram};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Transcribes the configured image with the configured recognizer.
#[derive(Clone)]
pub struct Transcriber {
    image_path: PathBuf,
    recognizer: Arc<dyn TextRecognizer>,
}

impl Transcriber {
    pub fn new(image_path: impl Into<PathBuf>, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            image_path: image_path.into(),
            recognizer,
        }
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    pub fn recognizer(&self) -> &dyn TextRecognizer {
        self.recognizer.as_ref()
    }

    /// Read, decode and recognize the image. The engine output is returned
    /// unmodified, including any trailing whitespace.
    pub async fn transcribe(&self) -> Result<String, OcrError> {
        let start = Instant::now();
        let engine = self.recognizer.name();

        tracing::info!(
            image_path = ?self.image_path,
            engine = %engine,
            "Transcription started"
        );

        let result = self.run().await;
        let elapsed = start.elapsed();

        let outcome = match &result {
            Ok(text) => {
                tracing::info!(
                    engine = %engine,
                    text_length = text.len(),
                    duration_ms = elapsed.as_millis() as u64,
                    "Transcription completed"
                );
                "success"
            }
            Err(e) => {
                tracing::warn!(
                    engine = %engine,
                    error = %e,
                    kind = e.kind(),
                    "Transcription failed"
                );
                e.kind()
            }
        };

        counter!(
            "ocr_transcriptions_total",
            "engine" => engine,
            "outcome" => outcome
        )
        .increment(1);
        histogram!("ocr_transcription_duration_seconds", "engine" => engine)
            .record(elapsed.as_secs_f64());

        result
    }

    async fn run(&self) -> Result<String, OcrError> {
        let image = load_image(&self.image_path).await?;
        self.recognizer.recognize(&image).await
    }
}
