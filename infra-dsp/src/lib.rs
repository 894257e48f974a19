use std::io::Cursor;

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use sentinel_domain::{AudioSample, DomainError, SampleInterval, WaveformAnalysisPort};

// Floor applied to spectral power before the geometric mean, so empty bins
// do not collapse the log-sum.
const POWER_FLOOR: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct DspAdapterConfig {
    pub frame_len: usize,
    pub hop_len: usize,
    pub top_db: f32,
}

/// Frame-based waveform analysis over decoded WAV audio. All computations
/// are pure functions of the input sample; repeated calls yield identical
/// results.
pub struct DspWaveformAnalyzer {
    frame_len: usize,
    hop_len: usize,
    top_db: f32,
}

impl DspWaveformAnalyzer {
    pub fn new(config: DspAdapterConfig) -> Self {
        Self {
            frame_len: config.frame_len.max(1),
            hop_len: config.hop_len.max(1),
            top_db: config.top_db.max(0.0),
        }
    }
}

impl WaveformAnalysisPort for DspWaveformAnalyzer {
    fn decode_waveform(&self, bytes: &[u8]) -> Result<AudioSample, DomainError> {
        let reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|err| DomainError::invalid_input(&format!("unreadable WAV payload: {err}")))?;
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(DomainError::invalid_input("WAV header declares no channels"));
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|err| {
                    DomainError::invalid_input(&format!("corrupt WAV sample data: {err}"))
                })?,
            hound::SampleFormat::Int => {
                let scale = int_sample_scale(spec.bits_per_sample);
                reader
                    .into_samples::<i32>()
                    .map(|sample| sample.map(|value| value as f32 / scale))
                    .collect::<Result<_, _>>()
                    .map_err(|err| {
                        DomainError::invalid_input(&format!("corrupt WAV sample data: {err}"))
                    })?
            }
        };

        let samples = downmix(&interleaved, spec.channels as usize);
        tracing::debug!(
            sample_rate_hz = spec.sample_rate,
            channels = spec.channels,
            sample_count = samples.len(),
            "decoded WAV payload"
        );

        Ok(AudioSample {
            sample_rate_hz: spec.sample_rate,
            samples,
        })
    }

    fn active_intervals(&self, sample: &AudioSample) -> Vec<SampleInterval> {
        let rms = frame_rms(&sample.samples, self.frame_len, self.hop_len);
        let peak = rms.iter().copied().fold(0.0_f32, f32::max);
        if peak <= 0.0 {
            return Vec::new();
        }

        // Frames are active when their level is within `top_db` of the peak.
        let threshold = peak * db_drop_to_amplitude(self.top_db);
        let frame_count = rms.len();
        let total = sample.samples.len();
        let mut intervals = Vec::new();
        let mut open: Option<usize> = None;
        for (idx, level) in rms.iter().enumerate() {
            match (*level > threshold, open) {
                (true, None) => open = Some(idx),
                (false, Some(start)) => {
                    intervals.push(frames_to_interval(start, idx, frame_count, self.hop_len, total));
                    open = None;
                }
                _ => {}
            }
        }
        if let Some(start) = open {
            intervals.push(frames_to_interval(
                start,
                frame_count,
                frame_count,
                self.hop_len,
                total,
            ));
        }
        intervals
    }

    fn spectral_flatness(&self, sample: &AudioSample) -> Vec<f32> {
        if sample.samples.is_empty() {
            return Vec::new();
        }

        let frame_len = self.frame_len;
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(frame_len);
        let window = hann_window(frame_len);
        let bins = frame_len / 2 + 1;

        let mut flatness = Vec::new();
        let mut start = 0;
        loop {
            // The tail frame is zero-padded so short captures still measure.
            let mut buffer: Vec<Complex<f32>> = (0..frame_len)
                .map(|offset| {
                    let value = sample.samples.get(start + offset).copied().unwrap_or(0.0);
                    Complex::new(value * window[offset], 0.0)
                })
                .collect();
            fft.process(&mut buffer);

            let mut log_sum = 0.0_f64;
            let mut linear_sum = 0.0_f64;
            for bin in buffer.iter().take(bins) {
                let power = f64::from(bin.norm_sqr()).max(POWER_FLOOR);
                log_sum += power.ln();
                linear_sum += power;
            }
            let geometric_mean = (log_sum / bins as f64).exp();
            let arithmetic_mean = linear_sum / bins as f64;
            flatness.push((geometric_mean / arithmetic_mean) as f32);

            if start + frame_len >= sample.samples.len() {
                break;
            }
            start += self.hop_len;
        }
        flatness
    }
}

fn int_sample_scale(bits_per_sample: u16) -> f32 {
    let shift = bits_per_sample.saturating_sub(1).min(31);
    (((1_i64 << shift) - 1).max(1)) as f32
}

fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

fn frame_rms(samples: &[f32], frame_len: usize, hop_len: usize) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let mut rms = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + frame_len).min(samples.len());
        let frame = &samples[start..end];
        let energy: f32 = frame.iter().map(|value| value * value).sum();
        rms.push((energy / frame.len() as f32).sqrt());
        if end == samples.len() {
            break;
        }
        start += hop_len;
    }
    rms
}

fn db_drop_to_amplitude(drop_db: f32) -> f32 {
    10.0_f32.powf(-drop_db / 20.0)
}

fn frames_to_interval(
    start_frame: usize,
    end_frame: usize,
    frame_count: usize,
    hop_len: usize,
    total_samples: usize,
) -> SampleInterval {
    let start = (start_frame * hop_len).min(total_samples);
    // An interval reaching the last frame covers the remaining tail.
    let end = if end_frame >= frame_count {
        total_samples
    } else {
        (end_frame * hop_len).min(total_samples)
    };
    SampleInterval { start, end }
}

fn hann_window(len: usize) -> Vec<f32> {
    (0..len)
        .map(|idx| 0.5 - 0.5 * (std::f32::consts::TAU * idx as f32 / len as f32).cos())
        .collect()
}
