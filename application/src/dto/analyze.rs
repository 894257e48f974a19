use serde::{Deserialize, Serialize};
use validator::Validate;

use sentinel_domain::ThreatAssessment;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnalyzeCallRequest {
    /// Raw WAV container bytes as uploaded by the caller.
    #[validate(length(min = 1))]
    pub audio: Vec<u8>,
    #[validate(length(min = 1, max = 64))]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeCallResponse {
    pub session_id: String,
    pub assessment: ThreatAssessment,
    /// The text that was scanned for keywords: the transcript, or the
    /// failure message standing in for it.
    pub text: String,
}
