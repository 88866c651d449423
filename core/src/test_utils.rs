//! Shared test utilities for unit tests

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use hashbrown::HashMap;

use crate::resources::{AudioBuffer, AudioContext, AudioDecoder, DecodeError, FetchError, Fetcher};
use crate::wasm::{ForeignError, ForeignModule};

// ============================================================================
// Fetching
// ============================================================================

/// In-memory fetcher with optional per-location latency
#[derive(Default)]
pub struct MemoryFetcher {
    files: HashMap<String, Vec<u8>>,
    delays: HashMap<String, Duration>,
    fetch_count: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` for `location`
    pub fn with(mut self, location: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(location.to_string(), bytes);
        self
    }

    /// Delay responses for `location`
    pub fn with_delay(mut self, location: &str, delay: Duration) -> Self {
        self.delays.insert(location.to_string(), delay);
        self
    }

    /// Number of fetches issued so far
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(location) {
            tokio::time::sleep(*delay).await;
        }
        self.files
            .get(location)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(location.to_string()))
    }
}

/// Encode a solid-color RGBA PNG
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 128, 255]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

// ============================================================================
// Audio
// ============================================================================

/// Decoder that accepts any input starting with `OggS` and produces one
/// mono frame per input byte. Everything else fails to decode.
pub struct StubDecoder;

impl AudioDecoder for StubDecoder {
    fn decode(
        &self,
        bytes: &[u8],
        _extension: Option<&str>,
        ctx: &AudioContext,
    ) -> Result<AudioBuffer, DecodeError> {
        if !bytes.starts_with(b"OggS") {
            return Err(DecodeError::NoTrack);
        }
        let samples = bytes.iter().map(|&b| b as f32 / 255.0).collect();
        Ok(AudioBuffer::new(ctx.sample_rate(), vec![samples]))
    }
}

/// Samples per channel in one MPEG-1 Layer III frame
pub const MP3_FRAME_SAMPLES: usize = 1152;

/// Build a mono 44.1 kHz, 128 kbps MP3 stream of `frames` silent frames.
///
/// Each frame is a header followed by all-zero side info and main data:
/// no bit reservoir, zero-length granules, so every frame decodes to
/// `MP3_FRAME_SAMPLES` zero samples.
pub fn silent_mp3(frames: usize) -> Vec<u8> {
    // Sync, MPEG-1, Layer III, no CRC | 128 kbps, 44.1 kHz, no padding | mono
    const HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0xC0];
    // 144 * 128000 / 44100
    const FRAME_LEN: usize = 417;

    let mut out = Vec::with_capacity(frames * FRAME_LEN);
    for _ in 0..frames {
        out.extend_from_slice(&HEADER);
        out.resize(out.len() + FRAME_LEN - HEADER.len(), 0);
    }
    out
}

// ============================================================================
// Foreign memory
// ============================================================================

/// Foreign module backed by a plain byte vector that records deallocations
#[derive(Debug, Default)]
pub struct RecordingModule {
    pub memory: Vec<u8>,
    pub deallocs: Vec<u32>,
}

impl RecordingModule {
    pub fn new(memory: Vec<u8>) -> Self {
        Self {
            memory,
            deallocs: Vec::new(),
        }
    }
}

impl ForeignModule for RecordingModule {
    fn memory(&self) -> &[u8] {
        &self.memory
    }

    fn dealloc_str(&mut self, ptr: u32) -> Result<(), ForeignError> {
        self.deallocs.push(ptr);
        Ok(())
    }
}
