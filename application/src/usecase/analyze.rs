use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;
use validator::Validate;

use sentinel_domain::{
    aggregate, AcousticAnalyzer, KeywordScorer, SpeechRecognitionPort, TranscriptResult,
    WaveformAnalysisPort,
};

use crate::{AnalyzeCallRequest, AnalyzeCallResponse, ApplicationError};

#[async_trait]
pub trait AnalyzeCallUseCase: Send + Sync {
    async fn analyze(
        &self,
        request: AnalyzeCallRequest,
    ) -> Result<AnalyzeCallResponse, ApplicationError>;
}

pub struct AnalyzeCallUseCaseImpl {
    recognizer: Arc<dyn SpeechRecognitionPort>,
    waveform: Arc<dyn WaveformAnalysisPort>,
    scorer: KeywordScorer,
    analyzer: AcousticAnalyzer,
    scan_failure_text: bool,
}

impl AnalyzeCallUseCaseImpl {
    pub fn new(
        recognizer: Arc<dyn SpeechRecognitionPort>,
        waveform: Arc<dyn WaveformAnalysisPort>,
        scorer: KeywordScorer,
        scan_failure_text: bool,
    ) -> Self {
        let analyzer = AcousticAnalyzer::new(waveform.clone());
        Self {
            recognizer,
            waveform,
            scorer,
            analyzer,
            scan_failure_text,
        }
    }
}

#[async_trait]
impl AnalyzeCallUseCase for AnalyzeCallUseCaseImpl {
    async fn analyze(
        &self,
        request: AnalyzeCallRequest,
    ) -> Result<AnalyzeCallResponse, ApplicationError> {
        request
            .validate()
            .map_err(|err| ApplicationError::Validation(err.to_string()))?;

        let session_id = request
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        tracing::debug!(
            session_id = %session_id,
            byte_count = request.audio.len(),
            "starting call analysis"
        );

        let sample = self.waveform.decode_waveform(&request.audio)?;

        let transcript = match self.recognizer.transcribe(&sample).await {
            Ok(text) => TranscriptResult::Text(text),
            Err(failure) => {
                tracing::warn!(session_id = %session_id, failure = %failure, "transcription failed");
                TranscriptResult::Failed(failure)
            }
        };

        // A failed transcription does not abort scoring. Its message flows
        // into the keyword scan unless the flag says otherwise, so the
        // backend's wording counts as transcript content.
        let text = match (&transcript, self.scan_failure_text) {
            (TranscriptResult::Failed(_), false) => String::new(),
            _ => transcript.display_text(),
        };

        let keywords = self.scorer.score(&text);
        let acoustic = self.analyzer.analyze(&sample)?;
        let assessment = aggregate(keywords, acoustic, transcript);

        tracing::debug!(
            session_id = %session_id,
            score = assessment.score,
            high_threat = assessment.high_threat,
            matched_count = assessment.keywords.matched.len(),
            "call analysis completed"
        );

        Ok(AnalyzeCallResponse {
            session_id,
            assessment,
            text,
        })
    }
}
