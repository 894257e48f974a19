use std::sync::Arc;

use crate::{
    AcousticFinding, AudioSample, DomainError, KeywordFinding, SampleInterval, ThreatAssessment,
    TranscriptResult, WaveformAnalysisPort,
};

/// Spoken scam phrases count as stronger evidence than acoustic artifacts.
pub const KEYWORD_WEIGHT: f32 = 0.7;
pub const ACOUSTIC_WEIGHT: f32 = 0.3;
pub const HIGH_THREAT_THRESHOLD: f32 = 50.0;

const POINTS_PER_MATCH: u32 = 35;
const FLATNESS_SYNTHETIC_MAX: f32 = 0.01;
const SILENCE_RATIO_SYNTHETIC_MIN: f32 = 0.3;
const FLATNESS_POINTS: u8 = 20;
const SILENCE_POINTS: u8 = 30;

/// Scans transcript text for scam-indicative phrases. The lexicon is
/// injected configuration; each phrase counts at most once.
pub struct KeywordScorer {
    lexicon: Vec<String>,
}

impl KeywordScorer {
    pub fn new(lexicon: Vec<String>) -> Self {
        let lexicon = lexicon
            .into_iter()
            .map(|phrase| phrase.trim().to_lowercase())
            .filter(|phrase| !phrase.is_empty())
            .collect();
        Self { lexicon }
    }

    pub fn score(&self, text: &str) -> KeywordFinding {
        let haystack = text.to_lowercase();
        let matched: Vec<String> = self
            .lexicon
            .iter()
            .filter(|phrase| haystack.contains(phrase.as_str()))
            .cloned()
            .collect();
        let score = (matched.len() as u32 * POINTS_PER_MATCH).min(100) as u8;
        KeywordFinding { matched, score }
    }
}

/// Derives the synthetic-voice contribution from silence pacing and
/// spectral flatness. The score tops out at 50, not 100; the aggregate
/// preserves that scale as-is.
pub struct AcousticAnalyzer {
    waveform: Arc<dyn WaveformAnalysisPort>,
}

impl AcousticAnalyzer {
    pub fn new(waveform: Arc<dyn WaveformAnalysisPort>) -> Self {
        Self { waveform }
    }

    pub fn analyze(&self, sample: &AudioSample) -> Result<AcousticFinding, DomainError> {
        if sample.samples.is_empty() {
            return Err(DomainError::invalid_input("audio sample is empty"));
        }

        let active: usize = self
            .waveform
            .active_intervals(sample)
            .iter()
            .map(SampleInterval::len)
            .sum();
        let silence_ratio = (1.0 - active as f32 / sample.samples.len() as f32).clamp(0.0, 1.0);

        let frames = self.waveform.spectral_flatness(sample);
        let spectral_flatness = if frames.is_empty() {
            0.0
        } else {
            frames.iter().sum::<f32>() / frames.len() as f32
        };

        let mut score = 0;
        if spectral_flatness < FLATNESS_SYNTHETIC_MAX {
            score += FLATNESS_POINTS;
        }
        if silence_ratio > SILENCE_RATIO_SYNTHETIC_MIN {
            score += SILENCE_POINTS;
        }

        Ok(AcousticFinding {
            silence_ratio,
            spectral_flatness,
            score,
        })
    }
}

pub fn aggregate(
    keywords: KeywordFinding,
    acoustic: AcousticFinding,
    transcript: TranscriptResult,
) -> ThreatAssessment {
    let score =
        f32::from(keywords.score) * KEYWORD_WEIGHT + f32::from(acoustic.score) * ACOUSTIC_WEIGHT;
    ThreatAssessment {
        score,
        high_threat: score > HIGH_THREAT_THRESHOLD,
        keywords,
        acoustic,
        transcript,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_relative_eq;

    use super::*;
    use crate::{AudioSample, SampleInterval};

    fn scorer() -> KeywordScorer {
        KeywordScorer::new(
            [
                "gift card",
                "urgent",
                "wire transfer",
                "social security",
                "police",
                "arrest",
                "verify your account",
                "otp",
                "password",
                "refund",
                "amazon",
                "bank account",
            ]
            .map(str::to_string)
            .to_vec(),
        )
    }

    struct FakeWaveform {
        active: Vec<SampleInterval>,
        flatness: Vec<f32>,
    }

    impl WaveformAnalysisPort for FakeWaveform {
        fn decode_waveform(&self, _bytes: &[u8]) -> Result<AudioSample, DomainError> {
            Ok(sample(0))
        }

        fn active_intervals(&self, _sample: &AudioSample) -> Vec<SampleInterval> {
            self.active.clone()
        }

        fn spectral_flatness(&self, _sample: &AudioSample) -> Vec<f32> {
            self.flatness.clone()
        }
    }

    fn sample(len: usize) -> AudioSample {
        AudioSample {
            sample_rate_hz: 16_000,
            samples: vec![0.0; len],
        }
    }

    fn analyzer(active: Vec<SampleInterval>, flatness: Vec<f32>) -> AcousticAnalyzer {
        AcousticAnalyzer::new(Arc::new(FakeWaveform { active, flatness }))
    }

    #[test]
    fn matched_phrases_keep_lexicon_order_and_step_scoring() {
        let finding = scorer().score("please verify your account and provide your otp");
        assert_eq!(finding.matched, vec!["verify your account", "otp"]);
        assert_eq!(finding.score, 70);
    }

    #[test]
    fn empty_text_matches_nothing() {
        let finding = scorer().score("");
        assert!(finding.matched.is_empty());
        assert_eq!(finding.score, 0);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let finding = scorer().score("URGENT wire Transfer");
        assert_eq!(finding.matched, vec!["urgent", "wire transfer"]);
        assert_eq!(finding.score, 70);
    }

    #[test]
    fn repeated_phrase_counts_once() {
        let finding = scorer().score("otp otp otp");
        assert_eq!(finding.matched, vec!["otp"]);
        assert_eq!(finding.score, 35);
    }

    #[test]
    fn keyword_score_clamps_at_100() {
        let finding = scorer().score("urgent: the police will arrest you over your bank account");
        assert_eq!(finding.matched.len(), 4);
        assert_eq!(finding.score, 100);
    }

    #[test]
    fn analyzer_rejects_empty_sample() {
        let result = analyzer(Vec::new(), Vec::new()).analyze(&sample(0));
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn analyzer_scores_flat_spectrum_and_long_pauses() {
        let finding = analyzer(
            vec![SampleInterval { start: 0, end: 500 }],
            vec![0.005, 0.005],
        )
        .analyze(&sample(1_000))
        .expect("analysis succeeds");

        assert_relative_eq!(finding.silence_ratio, 0.5, epsilon = 1e-6);
        assert_relative_eq!(finding.spectral_flatness, 0.005, epsilon = 1e-6);
        assert_eq!(finding.score, 50);
    }

    #[test]
    fn analyzer_scores_natural_audio_zero() {
        let finding = analyzer(vec![SampleInterval { start: 0, end: 900 }], vec![0.05])
            .analyze(&sample(1_000))
            .expect("analysis succeeds");

        assert_relative_eq!(finding.silence_ratio, 0.1, epsilon = 1e-6);
        assert_eq!(finding.score, 0);
    }

    #[test]
    fn analyzer_defaults_flatness_to_zero_without_frames() {
        let finding = analyzer(vec![SampleInterval { start: 0, end: 1_000 }], Vec::new())
            .analyze(&sample(1_000))
            .expect("analysis succeeds");

        assert_eq!(finding.spectral_flatness, 0.0);
        assert_eq!(finding.score, 20);
    }

    #[test]
    fn aggregate_blends_with_fixed_weights() {
        let keywords = scorer().score("please verify your account and provide your otp");
        let acoustic = AcousticFinding {
            silence_ratio: 0.5,
            spectral_flatness: 0.005,
            score: 50,
        };

        let assessment = aggregate(keywords, acoustic, TranscriptResult::Text(String::new()));
        assert_relative_eq!(assessment.score, 64.0, epsilon = 1e-4);
        assert!(assessment.high_threat);
    }

    #[test]
    fn aggregate_keeps_silent_benign_audio_low() {
        let keywords = scorer().score("hi grandma, happy birthday");
        let acoustic = AcousticFinding {
            silence_ratio: 0.1,
            spectral_flatness: 0.05,
            score: 0,
        };

        let assessment = aggregate(keywords, acoustic, TranscriptResult::Text(String::new()));
        assert_eq!(assessment.score, 0.0);
        assert!(!assessment.high_threat);
    }

    #[test]
    fn final_score_caps_at_85_under_the_unnormalized_acoustic_scale() {
        let keywords = KeywordFinding {
            matched: Vec::new(),
            score: 100,
        };
        let acoustic = AcousticFinding {
            silence_ratio: 1.0,
            spectral_flatness: 0.0,
            score: 50,
        };

        let assessment = aggregate(keywords, acoustic, TranscriptResult::Text(String::new()));
        assert_relative_eq!(assessment.score, 85.0, epsilon = 1e-4);
    }

    #[test]
    fn scores_just_below_threshold_stay_low_threat() {
        let keywords = KeywordFinding {
            matched: Vec::new(),
            score: 70,
        };
        let acoustic = AcousticFinding {
            silence_ratio: 0.0,
            spectral_flatness: 0.05,
            score: 0,
        };

        let assessment = aggregate(keywords, acoustic, TranscriptResult::Text(String::new()));
        assert_relative_eq!(assessment.score, 49.0, epsilon = 1e-4);
        assert!(!assessment.high_threat);
    }
}
