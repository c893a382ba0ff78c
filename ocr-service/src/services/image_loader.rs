use crate::services::recognizers::OcrError;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// Read and decode the image at `path`.
///
/// The format is sniffed from the file contents, so the extension does not
/// need to match. Decoding runs on the blocking pool.
pub async fn load_image(path: &Path) -> Result<DynamicImage, OcrError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| OcrError::ImageUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(path = ?path, size = bytes.len(), "Read image file");

    let owned_path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes).map_err(|source| OcrError::ImageDecode {
            path: owned_path,
            source,
        })
    })
    .await
    .map_err(|e| OcrError::Engine(format!("Image decode task failed: {}", e)))?
}

/// Encode `image` as an 8-bit grayscale PNG for the OCR engine.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, OcrError> {
    let gray = DynamicImage::ImageLuma8(image.to_luma8());
    let mut buf = Cursor::new(Vec::new());
    gray.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| OcrError::Engine(format!("Failed to encode image for OCR: {}", e)))?;
    Ok(buf.into_inner())
}
