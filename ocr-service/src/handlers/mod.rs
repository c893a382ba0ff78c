pub mod health;
pub mod transcription;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use transcription::extract_text;
