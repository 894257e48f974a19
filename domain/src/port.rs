use async_trait::async_trait;

use crate::{AudioSample, DomainError, SampleInterval, TranscribeError};

#[async_trait]
pub trait SpeechRecognitionPort: Send + Sync {
    async fn transcribe(&self, sample: &AudioSample) -> Result<String, TranscribeError>;
}

pub trait WaveformAnalysisPort: Send + Sync {
    /// Decode a WAV byte-stream into a mono waveform.
    fn decode_waveform(&self, bytes: &[u8]) -> Result<AudioSample, DomainError>;

    /// Segment the waveform into non-silent intervals using an energy
    /// threshold relative to the peak frame level.
    fn active_intervals(&self, sample: &AudioSample) -> Vec<SampleInterval>;

    /// Per-frame spectral flatness (geometric mean over arithmetic mean of
    /// the power spectrum), each value in [0, 1].
    fn spectral_flatness(&self, sample: &AudioSample) -> Vec<f32>;
}
