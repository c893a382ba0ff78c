pub mod executor;
pub mod image_loader;
pub mod metrics;
pub mod recognizers;
pub mod transcriber;

pub use executor::CommandExecutor;
pub use metrics::{get_metrics, init_metrics};
pub use recognizers::{build_recognizer, OcrError, TextRecognizer};
pub use transcriber::Transcriber;
