#![allow(dead_code)]

use image::{DynamicImage, GrayImage, Luma};
use ocr_service::config::{CorsSettings, EngineKind, OcrConfig, OcrSettings};
use ocr_service::startup::Application;
use service_core::config::Config as CoreConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const MOCK_TEXT: &str = "HELLO\n";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub image_path: PathBuf,
    // Keeps the fixture directory alive for the lifetime of the app.
    fixtures: TempDir,
}

impl TestApp {
    /// Spawn the service with the mock engine over a valid fixture image.
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn the service after letting the caller adjust the OCR settings.
    ///
    /// `image_path` starts out pointing at a valid blank PNG inside a
    /// temporary directory.
    pub async fn spawn_with(customize: impl FnOnce(&mut OcrSettings)) -> Self {
        let fixtures = tempfile::tempdir().expect("Failed to create fixture directory");
        let image_path = fixtures.path().join("test.png");
        write_blank_png(&image_path);

        let mut ocr = OcrSettings {
            image_path,
            engine: EngineKind::Mock,
            mock_text: MOCK_TEXT.to_string(),
            ..OcrSettings::default()
        };
        customize(&mut ocr);

        let config = OcrConfig {
            common: CoreConfig {
                port: 0, // Random port for testing
                ..CoreConfig::default()
            },
            ocr,
            cors: CorsSettings {
                allowed_origins: vec![],
            },
        };
        let image_path = config.ocr.image_path.clone();

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            image_path,
            fixtures,
        }
    }
}

pub fn write_blank_png(path: &Path) {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 32, Luma([255])))
        .save(path)
        .expect("Failed to write fixture image");
}

/// Glyphs on a 5x7 grid, one string per row.
const GLYPHS: &[(char, [&str; 7])] = &[
    (
        'H',
        ["#...#", "#...#", "#...#", "#####", "#...#", "#...#", "#...#"],
    ),
    (
        'E',
        ["#####", "#....", "#....", "####.", "#....", "#....", "#####"],
    ),
    (
        'L',
        ["#....", "#....", "#....", "#....", "#....", "#....", "#####"],
    ),
    (
        'O',
        [".###.", "#...#", "#...#", "#...#", "#...#", "#...#", ".###."],
    ),
];

/// Render `text` as black block letters on white, large enough for OCR.
pub fn write_text_png(path: &Path, text: &str) {
    const SCALE: u32 = 12;
    const MARGIN: u32 = 40;
    const SPACING: u32 = 2;

    let glyph_width = 5 + SPACING;
    let width = MARGIN * 2 + text.len() as u32 * glyph_width * SCALE;
    let height = MARGIN * 2 + 7 * SCALE;
    let mut img = GrayImage::from_pixel(width, height, Luma([255]));

    for (index, ch) in text.chars().enumerate() {
        let rows = GLYPHS
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, rows)| rows)
            .expect("Glyph not available");
        let origin_x = MARGIN + index as u32 * glyph_width * SCALE;

        for (row, line) in rows.iter().enumerate() {
            for (col, cell) in line.chars().enumerate() {
                if cell != '#' {
                    continue;
                }
                for dy in 0..SCALE {
                    for dx in 0..SCALE {
                        img.put_pixel(
                            origin_x + col as u32 * SCALE + dx,
                            MARGIN + row as u32 * SCALE + dy,
                            Luma([0]),
                        );
                    }
                }
            }
        }
    }

    DynamicImage::ImageLuma8(img)
        .save(path)
        .expect("Failed to write text fixture");
}

/// Write an executable stand-in for the tesseract CLI that drains stdin and
/// prints `output`.
#[cfg(unix)]
pub fn write_fake_tesseract(dir: &Path, output: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let body_path = dir.join("tesseract.out");
    std::fs::write(&body_path, output).expect("Failed to write engine output");

    let binary = dir.join("tesseract");
    let script = format!(
        "#!/bin/sh\ncat > /dev/null\ncat '{}'\n",
        body_path.display()
    );
    std::fs::write(&binary, script).expect("Failed to write fake engine");
    std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to mark fake engine executable");
    binary
}
