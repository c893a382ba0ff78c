//! Tesseract recognizer backed by the `tesseract` command line tool.

use super::{OcrError, TextRecognizer};
use crate::config::OcrSettings;
use crate::services::executor::CommandExecutor;
use crate::services::image_loader::encode_png;
use async_trait::async_trait;
use image::DynamicImage;
use std::time::Duration;

pub struct TesseractRecognizer {
    binary: String,
    language: String,
    tessdata_dir: Option<String>,
    page_segmentation_mode: Option<u8>,
    executor: CommandExecutor,
}

impl TesseractRecognizer {
    pub fn new(settings: &OcrSettings) -> Self {
        Self {
            binary: settings.tesseract_binary.clone(),
            language: settings.language.clone(),
            tessdata_dir: settings.tessdata_dir.clone(),
            page_segmentation_mode: settings.page_segmentation_mode,
            executor: CommandExecutor::new(Duration::from_secs(settings.timeout_secs)),
        }
    }

    /// Arguments for reading a PNG from stdin and writing plain text to stdout.
    fn recognize_args(&self) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.language.clone(),
        ];

        if let Some(dir) = &self.tessdata_dir {
            args.push("--tessdata-dir".to_string());
            args.push(dir.clone());
        }

        if let Some(psm) = self.page_segmentation_mode {
            args.push("--psm".to_string());
            args.push(psm.to_string());
        }

        args
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let png = encode_png(image)?;
        let args = self.recognize_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let output = self.executor.execute(&self.binary, &args, Some(png.as_slice())).await?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn health_check(&self) -> Result<(), OcrError> {
        self.executor
            .execute(&self.binary, &["--version"], None)
            .await
            .map(|_| ())
    }
}
