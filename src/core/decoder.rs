// src/core/decoder.rs
//
// Audio decoding into the mono, fixed-rate waveform the extractor consumes.
// Uses Symphonia for format-agnostic decoding and rubato for resampling.

use log::debug;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use crate::error::{DetectionError, Result};

/// Sample rate every waveform is analyzed at
pub const TARGET_SAMPLE_RATE: u32 = 22_050;

/// Decoded mono samples at a fixed rate
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Container for decoded audio data and metadata
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Interleaved samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of audio channels
    pub channels: usize,
    /// Duration in seconds
    pub duration_secs: f64,
    /// Original codec name
    pub codec_name: String,
}

impl AudioData {
    /// Downmix and resample to the analysis rate
    pub fn to_waveform(&self) -> Result<Waveform> {
        let mono = extract_mono(self);
        let samples = resample(&mono, self.sample_rate, TARGET_SAMPLE_RATE)?;
        Ok(Waveform::new(samples, TARGET_SAMPLE_RATE))
    }
}

/// Decode an audio file
pub fn decode_file(path: &Path) -> Result<AudioData> {
    let file = File::open(path).map_err(|e| {
        DetectionError::UnsupportedAudio(format!("failed to open {}: {}", path.display(), e))
    })?;

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    decode_source(Box::new(file), hint)
}

/// Decode an in-memory audio payload. `extension` is an optional
/// container hint such as `"mp3"` or `"wav"`.
pub fn decode_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<AudioData> {
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }
    decode_source(Box::new(Cursor::new(bytes)), hint)
}

fn unsupported<E: std::fmt::Display>(context: &str) -> impl FnOnce(E) -> DetectionError + '_ {
    move |e| DetectionError::UnsupportedAudio(format!("{}: {}", context, e))
}

fn decode_source(source: Box<dyn MediaSource>, hint: Hint) -> Result<AudioData> {
    let mss = MediaSourceStream::new(source, Default::default());

    let meta_opts = MetadataOptions::default();
    let fmt_opts = FormatOptions::default();

    let mut probed = symphonia::default::get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(unsupported("failed to probe format"))?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| DetectionError::UnsupportedAudio("no supported audio track".into()))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| DetectionError::UnsupportedAudio("sample rate not specified".into()))?;

    let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(1);
    if channels == 0 {
        return Err(DetectionError::UnsupportedAudio("stream reports 0 channels".into()));
    }

    let codec_name = format!("{:?}", track.codec_params.codec);

    let dec_opts = DecoderOptions::default();
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &dec_opts)
        .map_err(unsupported("failed to create decoder"))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match probed.format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(symphonia::core::errors::Error::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(unsupported("failed to read packet")(e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(buf) => buf,
            Err(symphonia::core::errors::Error::DecodeError(msg)) => {
                debug!("skipping undecodable packet: {}", msg);
                continue;
            }
            Err(e) => return Err(unsupported("failed to decode packet")(e)),
        };

        if sample_buf.is_none() {
            let spec = *decoded.spec();
            let duration = decoded.capacity() as u64;
            sample_buf = Some(SampleBuffer::new(duration, spec));
        }

        if let Some(ref mut buf) = sample_buf {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    let duration_secs = samples.len() as f64 / (sample_rate as f64 * channels as f64);
    debug!(
        "decoded {} samples, {} Hz, {} ch, {:.2}s ({})",
        samples.len(),
        sample_rate,
        channels,
        duration_secs,
        codec_name
    );

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
        duration_secs,
        codec_name,
    })
}

/// Extract mono samples from potentially multi-channel audio
pub fn extract_mono(audio: &AudioData) -> Vec<f32> {
    if audio.channels <= 1 {
        return audio.samples.clone();
    }

    audio
        .samples
        .chunks_exact(audio.channels)
        .map(|frame| frame.iter().sum::<f32>() / audio.channels as f32)
        .collect()
}

/// Input frames handed to the resampler per call
const RESAMPLE_CHUNK: usize = 1024;

/// Length of `len` samples at `from_rate` once converted to `to_rate`
pub fn resampled_len(len: usize, from_rate: u32, to_rate: u32) -> usize {
    let (from, to) = (from_rate as u64, to_rate as u64);
    ((len as u64 * to + from - 1) / from) as usize
}

/// Resample mono audio. Identity when the rates already match.
///
/// The output is aligned with the input (the filter delay is removed) and
/// holds exactly `resampled_len` samples.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(DetectionError::UnsupportedAudio(format!(
            "cannot resample {} Hz -> {} Hz",
            from_rate, to_rate
        )));
    }

    debug!("resampling {} Hz -> {} Hz", from_rate, to_rate);

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        to_rate as f64 / from_rate as f64,
        2.0,
        params,
        RESAMPLE_CHUNK,
        1,
    )
    .map_err(unsupported("failed to build resampler"))?;

    let expected = resampled_len(samples.len(), from_rate, to_rate);
    let delay = resampler.output_delay();
    let mut output: Vec<f32> = Vec::with_capacity(expected + delay + RESAMPLE_CHUNK);

    for chunk in samples.chunks(RESAMPLE_CHUNK) {
        let wave_in = [chunk];
        let processed = if chunk.len() == RESAMPLE_CHUNK {
            resampler.process(&wave_in[..], None)
        } else {
            resampler.process_partial(Some(&wave_in[..]), None)
        };
        let frames = processed.map_err(unsupported("resampling failed"))?;
        output.extend_from_slice(&frames[0]);
    }

    // Flush the samples still held back by the filter delay
    while output.len() < expected + delay {
        let frames = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(unsupported("resampling failed"))?;
        if frames[0].is_empty() {
            break;
        }
        output.extend_from_slice(&frames[0]);
    }

    output.drain(..delay.min(output.len()));
    output.resize(expected, 0.0);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo(samples: Vec<f32>) -> AudioData {
        AudioData {
            duration_secs: samples.len() as f64 / 2.0 / 44100.0,
            samples,
            sample_rate: 44100,
            channels: 2,
            codec_name: "Test".to_string(),
        }
    }

    #[test]
    fn test_extract_mono() {
        let audio = stereo(vec![0.5, -0.5, 0.3, -0.3]);
        let mono = extract_mono(&audio);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.0).abs() < 0.001);
        assert!((mono[1] - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_waveform_duration() {
        let wave = Waveform::new(vec![0.0; 11025], TARGET_SAMPLE_RATE);
        assert!((wave.duration_secs() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_resample_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample(&samples, 22050, 22050).unwrap(), samples);
    }

    #[test]
    fn test_resample_halves_length() {
        let samples: Vec<f32> = (0..44100)
            .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 44100.0).sin())
            .collect();
        let out = resample(&samples, 44100, 22050).unwrap();
        assert_eq!(out.len(), 22050);
    }

    #[test]
    fn test_resampled_len_rounds_up() {
        assert_eq!(resampled_len(22050, 44100, 22050), 11025);
        assert_eq!(resampled_len(8000, 16000, 22050), 11025);
        assert_eq!(resampled_len(24000, 48000, 22050), 11025);
        assert_eq!(resampled_len(3, 44100, 22050), 2);
    }

    #[test]
    fn test_resample_keeps_length_and_alignment() {
        // Impulse train every 4000 input samples at 48 kHz
        let mut samples = vec![0.0f32; 24000];
        for i in (2000..24000).step_by(4000) {
            samples[i] = 1.0;
        }
        let out = resample(&samples, 48000, 22050).unwrap();
        assert_eq!(out.len(), 11025);

        // Each peak lands within a couple of samples of its scaled position
        let peak = (900..940)
            .max_by(|&a, &b| out[a].abs().total_cmp(&out[b].abs()))
            .unwrap();
        let expected = (2000.0 * 22050.0 / 48000.0) as i64;
        assert!((peak as i64 - expected).abs() <= 2, "peak at {}", peak);
    }

    #[test]
    fn test_resample_short_input_padded_to_length() {
        let out = resample(&[0.5; 10], 16000, 22050).unwrap();
        assert_eq!(out.len(), resampled_len(10, 16000, 22050));
    }

    #[test]
    fn test_garbage_bytes_unsupported() {
        let err = decode_bytes(vec![0x13, 0x37, 0x00, 0x42, 0x99], Some("mp3")).unwrap_err();
        assert!(matches!(err, DetectionError::UnsupportedAudio(_)));
    }
}
