use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use sentinel_domain::{AudioSample, DomainError, SpeechRecognitionPort, TranscribeError};

#[derive(Debug, Clone)]
pub struct RecognizerAdapterConfig {
    pub base_url: String,
    pub language: String,
    pub request_timeout: Duration,
}

/// Speech recognition over a REST backend. The sample is re-encoded as
/// 16-bit PCM WAV for the wire; transport and status failures map onto the
/// transcription error taxonomy. No retries.
pub struct RestSpeechRecognizer {
    config: RecognizerAdapterConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TranscribeResponseBody {
    #[serde(default)]
    text: String,
}

impl RestSpeechRecognizer {
    pub fn new(config: RecognizerAdapterConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| {
                DomainError::internal_error(&format!("failed to build recognizer client: {err}"))
            })?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/transcribe",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl SpeechRecognitionPort for RestSpeechRecognizer {
    async fn transcribe(&self, sample: &AudioSample) -> Result<String, TranscribeError> {
        let payload = encode_wav(sample)
            .map_err(|err| TranscribeError::ProcessingFailure(err.to_string()))?;
        tracing::debug!(
            byte_count = payload.len(),
            sample_rate_hz = sample.sample_rate_hz,
            "sending audio to speech recognizer"
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("language", self.config.language.as_str())])
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        map_response(response).await
    }
}

fn map_transport_error(error: reqwest::Error) -> TranscribeError {
    if error.is_timeout() || error.is_connect() {
        TranscribeError::ServiceUnavailable
    } else {
        TranscribeError::ProcessingFailure(error.to_string())
    }
}

async fn map_response(response: reqwest::Response) -> Result<String, TranscribeError> {
    let status = response.status();
    // 422 is the backend's "no words resolved" answer.
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        return Err(TranscribeError::Unintelligible);
    }
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return Err(TranscribeError::ServiceUnavailable);
    }
    if !status.is_success() {
        return Err(TranscribeError::ProcessingFailure(format!(
            "recognizer returned HTTP {status}"
        )));
    }

    let body: TranscribeResponseBody = response.json().await.map_err(|err| {
        TranscribeError::ProcessingFailure(format!("invalid recognizer response: {err}"))
    })?;
    let text = body.text.trim().to_string();
    if text.is_empty() {
        return Err(TranscribeError::Unintelligible);
    }
    Ok(text)
}

fn encode_wav(sample: &AudioSample) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: sample.sample_rate_hz,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &value in &sample.samples {
        writer.write_sample((value.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)?;
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}
