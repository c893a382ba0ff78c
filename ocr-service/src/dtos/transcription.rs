use serde::{Deserialize, Serialize};

/// Body of a successful `GET /` or `POST /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub data: String,
}

impl From<String> for TranscriptionResponse {
    fn from(data: String) -> Self {
        Self { data }
    }
}
