use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;

const DEFAULT_IMAGE_PATH: &str = "test.png";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub common: core_config::Config,
    pub ocr: OcrSettings,
    pub cors: CorsSettings,
}

#[derive(Debug, Clone)]
pub struct OcrSettings {
    /// Image transcribed on every request. Relative paths resolve against the
    /// working directory of the process.
    pub image_path: PathBuf,
    pub engine: EngineKind,
    /// Tesseract language pack, e.g. `eng` or `eng+deu`.
    pub language: String,
    pub tesseract_binary: String,
    pub tessdata_dir: Option<String>,
    pub page_segmentation_mode: Option<u8>,
    pub timeout_secs: u64,
    /// Text returned by the mock engine.
    pub mock_text: String,
}

#[derive(Debug, Clone)]
pub struct CorsSettings {
    /// Empty means any origin is allowed.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Tesseract,
    Mock,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            image_path: PathBuf::from(DEFAULT_IMAGE_PATH),
            engine: EngineKind::Tesseract,
            language: "eng".to_string(),
            tesseract_binary: "tesseract".to_string(),
            tessdata_dir: None,
            page_segmentation_mode: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            mock_text: String::new(),
        }
    }
}

impl OcrConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";
        let defaults = OcrSettings::default();

        let page_segmentation_mode = env::var("OCR_PAGE_SEGMENTATION_MODE")
            .ok()
            .map(|v| parse_page_segmentation_mode(&v))
            .transpose()?;

        Ok(OcrConfig {
            common: common_config,
            ocr: OcrSettings {
                image_path: PathBuf::from(get_env(
                    "OCR_IMAGE_PATH",
                    Some(DEFAULT_IMAGE_PATH),
                    is_prod,
                )?),
                engine: get_env("OCR_ENGINE", Some("tesseract"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                language: get_env("OCR_LANGUAGE", Some(defaults.language.as_str()), is_prod)?,
                tesseract_binary: get_env(
                    "OCR_TESSERACT_BINARY",
                    Some(defaults.tesseract_binary.as_str()),
                    is_prod,
                )?,
                tessdata_dir: env::var("OCR_TESSDATA_DIR").ok(),
                page_segmentation_mode,
                timeout_secs: parse_timeout_secs(&get_env(
                    "OCR_TIMEOUT_SECS",
                    Some(DEFAULT_TIMEOUT_SECS.to_string().as_str()),
                    is_prod,
                )?)?,
                mock_text: env::var("OCR_MOCK_TEXT").unwrap_or_default(),
            },
            cors: CorsSettings {
                allowed_origins: parse_origins(&get_env(
                    "CORS_ALLOWED_ORIGINS",
                    Some("*"),
                    is_prod,
                )?),
            },
        })
    }
}

impl std::str::FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tesseract" => Ok(EngineKind::Tesseract),
            "mock" => Ok(EngineKind::Mock),
            _ => Err(format!("Invalid OCR engine: {}", s)),
        }
    }
}

fn parse_page_segmentation_mode(value: &str) -> Result<u8, AppError> {
    match value.trim().parse::<u8>() {
        Ok(psm) if psm <= 13 => Ok(psm),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "Invalid OCR_PAGE_SEGMENTATION_MODE: {} (expected 0-13)",
            value
        ))),
    }
}

fn parse_timeout_secs(value: &str) -> Result<u64, AppError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "Invalid OCR_TIMEOUT_SECS: {} (expected a positive number of seconds)",
            value
        ))),
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .map(str::to_string)
        .collect()
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_kind_parses_case_insensitively() {
        assert_eq!("Tesseract".parse::<EngineKind>(), Ok(EngineKind::Tesseract));
        assert_eq!(" mock ".parse::<EngineKind>(), Ok(EngineKind::Mock));
        assert!("easyocr".parse::<EngineKind>().is_err());
    }

    #[test]
    fn wildcard_origin_means_any() {
        assert!(parse_origins("*").is_empty());
        assert_eq!(
            parse_origins("http://a.test, http://b.test,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn page_segmentation_mode_is_bounded() {
        assert_eq!(parse_page_segmentation_mode("6").unwrap(), 6);
        assert!(parse_page_segmentation_mode("14").is_err());
        assert!(parse_page_segmentation_mode("auto").is_err());
    }

    #[test]
    fn timeout_must_be_positive() {
        assert_eq!(parse_timeout_secs("30").unwrap(), 30);
        assert!(matches!(
            parse_timeout_secs("0"),
            Err(AppError::ConfigError(_))
        ));
        assert!(parse_timeout_secs("-5").is_err());
        assert!(parse_timeout_secs("soon").is_err());
    }

    #[test]
    fn defaults_point_at_test_png() {
        let settings = OcrSettings::default();
        assert_eq!(settings.image_path, PathBuf::from("test.png"));
        assert_eq!(settings.engine, EngineKind::Tesseract);
        assert_eq!(settings.language, "eng");
    }
}
