use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSample {
    pub sample_rate_hz: u32,
    pub samples: Vec<f32>,
}

/// Why the speech-recognition backend produced no transcript. The display
/// strings double as the transcript shown to the caller, so they stay
/// human-readable.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TranscribeError {
    #[error("Error: Could not understand audio (Quality too low).")]
    Unintelligible,
    #[error("Error: API unavailable.")]
    ServiceUnavailable,
    #[error("Error processing file: {0}")]
    ProcessingFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranscriptResult {
    Text(String),
    Failed(TranscribeError),
}

impl TranscriptResult {
    /// Text the caller sees as "the transcript"; failures surface their
    /// message verbatim.
    pub fn display_text(&self) -> String {
        match self {
            TranscriptResult::Text(text) => text.clone(),
            TranscriptResult::Failed(failure) => failure.to_string(),
        }
    }
}

/// Half-open range of sample indices classified as non-silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleInterval {
    pub start: usize,
    pub end: usize,
}

impl SampleInterval {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordFinding {
    pub matched: Vec<String>,
    pub score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcousticFinding {
    pub silence_ratio: f32,
    pub spectral_flatness: f32,
    pub score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatAssessment {
    pub score: f32,
    pub high_threat: bool,
    pub keywords: KeywordFinding,
    pub acoustic: AcousticFinding,
    pub transcript: TranscriptResult,
}
