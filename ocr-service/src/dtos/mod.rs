pub mod transcription;

pub use transcription::TranscriptionResponse;
