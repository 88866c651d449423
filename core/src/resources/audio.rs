//! Audio decoding for `.ogg` / `.mp3` resources.
//!
//! Decoded audio is stored planar (one `Vec<f32>` per channel) at the sample
//! rate of the [`AudioContext`] it was decoded for, matching what a mixer
//! running at that rate consumes.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

/// Output rate decoded audio is converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioContext {
    sample_rate: u32,
}

impl AudioContext {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Default for AudioContext {
    fn default() -> Self {
        Self::new(44_100)
    }
}

/// Decoded PCM audio, one sample vector per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Build a buffer from planar channel data.
    ///
    /// All channels must have the same length.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        debug_assert!(channels.windows(2).all(|w| w[0].len() == w[1].len()));
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn number_of_channels(&self) -> usize {
        self.channels.len()
    }

    /// Length in sample frames.
    pub fn length(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.length() as f64 / self.sample_rate as f64
    }

    pub fn channel_data(&self, channel: usize) -> Option<&[f32]> {
        self.channels.get(channel).map(Vec::as_slice)
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("unsupported or corrupt audio: {0}")]
    Format(#[from] SymphoniaError),
    #[error("no decodable audio track")]
    NoTrack,
    #[error("audio track has no sample rate")]
    UnknownSampleRate,
    #[error("audio stream contains no samples")]
    Empty,
    #[error("channel layout changed mid-stream: {expected} channels, then {found}")]
    ChannelLayoutChanged { expected: usize, found: usize },
}

/// Decodes encoded audio bytes for a context.
///
/// `extension` is the file extension of the location the bytes came from
/// (`"ogg"`, `"mp3"`), when known.
pub trait AudioDecoder: Send + Sync {
    fn decode(
        &self,
        bytes: &[u8],
        extension: Option<&str>,
        ctx: &AudioContext,
    ) -> Result<AudioBuffer, DecodeError>;
}

/// Interleaved PCM collected packet by packet.
///
/// Every packet must carry the channel count of the first one.
#[derive(Debug, Default)]
struct PcmAccumulator {
    channels: usize,
    interleaved: Vec<f32>,
}

impl PcmAccumulator {
    fn push(&mut self, channels: usize, samples: &[f32]) -> Result<(), DecodeError> {
        if self.channels == 0 {
            self.channels = channels;
        } else if self.channels != channels {
            return Err(DecodeError::ChannelLayoutChanged {
                expected: self.channels,
                found: channels,
            });
        }
        self.interleaved.extend_from_slice(samples);
        Ok(())
    }

    fn into_planar(self) -> Result<Vec<Vec<f32>>, DecodeError> {
        if self.channels == 0 || self.interleaved.is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(deinterleave(&self.interleaved, self.channels))
    }
}

/// Symphonia-backed decoder for Ogg Vorbis and MP3.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(
        &self,
        bytes: &[u8],
        extension: Option<&str>,
        ctx: &AudioContext,
    ) -> Result<AudioBuffer, DecodeError> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = extension {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format_reader = probed.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(DecodeError::NoTrack)?;
        let track_id = track.id;
        let source_rate = track
            .codec_params
            .sample_rate
            .ok_or(DecodeError::UnknownSampleRate)?;

        let mut decoder =
            symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

        let mut pcm = PcmAccumulator::default();

        loop {
            let packet = match format_reader.next_packet() {
                Ok(packet) => packet,
                // End of stream
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(e.into()),
            };
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    sample_buf.copy_interleaved_ref(decoded);
                    pcm.push(spec.channels.count(), sample_buf.samples())?;
                }
                // A corrupt packet is skipped, the rest of the stream may still decode
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::debug!("Skipping undecodable audio packet: {}", e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        let channels = pcm
            .into_planar()?
            .into_iter()
            .map(|samples| resample_linear(&samples, source_rate, ctx.sample_rate()))
            .collect();

        Ok(AudioBuffer::new(ctx.sample_rate(), channels))
    }
}

/// Split interleaved `L R L R ...` samples into one vector per channel.
///
/// A trailing partial frame is dropped.
pub fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    if channels == 0 {
        return Vec::new();
    }
    let frames = samples.len() / channels;
    let mut planar = vec![Vec::with_capacity(frames); channels];
    for frame in samples.chunks_exact(channels) {
        for (channel, &sample) in planar.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }
    planar
}

/// Resample one channel using linear interpolation.
pub fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if samples.is_empty() || source_rate == 0 || target_rate == 0 {
        return Vec::new();
    }
    if source_rate == target_rate {
        return samples.to_vec();
    }

    let ratio = source_rate as f64 / target_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 * ratio;
        let src_idx = src_pos.floor() as usize;
        let frac = (src_pos - src_idx as f64) as f32;

        let sample = if src_idx + 1 < samples.len() {
            let s1 = samples[src_idx];
            let s2 = samples[src_idx + 1];
            s1 + (s2 - s1) * frac
        } else {
            samples[samples.len() - 1]
        };
        output.push(sample);
    }

    output
}
