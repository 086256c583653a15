//! Chunk decoding
//!
//! Turns raw streaming chunks into classifier-ready samples:
//! - Face: data-URL or raw encoded still image → packed RGB8 frame
//! - Voice: encoded audio clip → mono f32 at [`VOICE_SAMPLE_RATE`]
//!
//! Both decoders are CPU-bound and synchronous; callers run them on the
//! blocking pool.

use crate::inference::{FaceFrame, VoiceClip};
use base64::Engine;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

/// Sample rate voice clips are resampled to before classification
pub const VOICE_SAMPLE_RATE: u32 = 16_000;

const MAX_FLUSH_PASSES: usize = 8;

/// Chunk decoding errors
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Empty chunk")]
    Empty,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Audio decode failed: {0}")]
    Audio(String),

    #[error("Resampling failed: {0}")]
    Resample(String),
}

/// Strip an optional `data:<mime>;base64,` header and decode the payload
pub fn decode_data_url(text: &str) -> Result<Vec<u8>, DecodeError> {
    let payload = match text.split_once(',') {
        Some((_header, encoded)) => encoded,
        None => text,
    };
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

/// Decode an encoded still image (JPEG, PNG, WebP) into an RGB8 frame
pub fn decode_face_frame(bytes: &[u8]) -> Result<FaceFrame, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    let rgb = image::load_from_memory(bytes)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(FaceFrame {
        width,
        height,
        rgb: rgb.into_raw(),
    })
}

/// Decode an encoded audio clip into mono f32 at [`VOICE_SAMPLE_RATE`]
pub fn decode_voice_clip(bytes: &[u8]) -> Result<VoiceClip, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::Audio(format!("probe failed: {}", e)))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| DecodeError::Audio("no audio track".to_string()))?;
    let track_id = track.id;
    let source_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| DecodeError::Audio("sample rate unknown".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::Audio(format!("unsupported codec: {}", e)))?;

    let mut mono: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(DecodeError::Audio(format!("read packet: {}", e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Corrupt packet: skip it and keep going
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::debug!("Skipping undecodable packet: {}", e);
                continue;
            }
            Err(e) => return Err(DecodeError::Audio(format!("decode packet: {}", e))),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);

        // Average channels down to mono
        mono.extend(
            buffer
                .samples()
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
    }

    if mono.is_empty() {
        return Err(DecodeError::Audio("clip contains no samples".to_string()));
    }

    let samples = resample_mono(mono, source_rate, VOICE_SAMPLE_RATE)?;
    Ok(VoiceClip {
        samples,
        sample_rate: VOICE_SAMPLE_RATE,
    })
}

/// Resample mono PCM with a sinc interpolator
///
/// The whole clip is one input chunk. The filter delay is trimmed from the
/// front and the tail is recovered with flush passes, so output frame `n`
/// lines up with input time `n / target_rate`.
pub fn resample_mono(
    samples: Vec<f32>,
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>, DecodeError> {
    if source_rate == target_rate || samples.is_empty() {
        return Ok(samples);
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = target_rate as f64 / source_rate as f64;
    let expected = (samples.len() as f64 * ratio).round() as usize;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, samples.len(), 1)
        .map_err(|e| DecodeError::Resample(e.to_string()))?;
    let delay = resampler.output_delay();

    let mut output = resampler
        .process(&[samples], None)
        .map_err(|e| DecodeError::Resample(e.to_string()))?
        .pop()
        .unwrap_or_default();

    // Short clips may need more than one flush to cover the delay
    for _ in 0..MAX_FLUSH_PASSES {
        if output.len() >= delay + expected {
            break;
        }
        let tail = resampler
            .process_partial::<Vec<f32>>(None, None)
            .map_err(|e| DecodeError::Resample(e.to_string()))?;
        match tail.into_iter().next() {
            Some(frames) if !frames.is_empty() => output.extend(frames),
            _ => break,
        }
    }

    let output: Vec<f32> = output.into_iter().skip(delay).take(expected).collect();

    tracing::debug!(
        "Resampled voice clip {} Hz → {} Hz ({} frames, delay {})",
        source_rate,
        target_rate,
        output.len(),
        delay
    );

    Ok(output)
}
