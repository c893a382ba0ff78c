//! Mock recognizer for testing.

use super::{OcrError, TextRecognizer};
use async_trait::async_trait;
use image::DynamicImage;

/// Returns the same text for every image.
pub struct MockRecognizer {
    text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl TextRecognizer for MockRecognizer {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            "Mock recognizer invoked"
        );
        Ok(self.text.clone())
    }

    async fn health_check(&self) -> Result<(), OcrError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_configured_text() {
        let recognizer = MockRecognizer::new("HELLO\n");
        let image = DynamicImage::new_luma8(4, 4);

        assert_eq!(recognizer.recognize(&image).await.unwrap(), "HELLO\n");
        assert!(recognizer.health_check().await.is_ok());
    }
}
