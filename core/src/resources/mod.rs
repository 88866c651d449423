//! Batch resource loading
//!
//! Loads a heterogeneous set of media assets concurrently and reports when
//! every entry has reached a terminal state.
//!
//! # Module Organization
//!
//! - [`source`] - Source table and suffix dispatch
//! - [`manifest`] - TOML resource manifests
//! - [`fetch`] - Raw byte fetching (HTTP and local files)
//! - [`audio`] - Audio context and decoding
//! - [`images`] - Image loading
//! - [`loader`] - Completion tracking across a batch
//!
//! # Failure Policy
//!
//! No failure aborts a batch. A fetch, decode or image load that fails is
//! logged and its slot "degrades": it counts toward completion but has no
//! entry in the [`ResourceMap`].

pub mod audio;
pub mod fetch;
pub mod images;
pub mod loader;
pub mod manifest;
pub mod source;


pub use audio::{AudioBuffer, AudioContext, AudioDecoder, DecodeError, SymphoniaDecoder};
pub use fetch::{AssetFetcher, FetchError, Fetcher, FileFetcher, HttpFetcher};
pub use images::{FetchImageLoader, ImageHandle, ImageLoadError, ImageLoader};
pub use loader::ResourceLoader;
pub use manifest::{ManifestError, ResourceManifest};
pub use source::{ResourceKind, SourceMap};

/// A loaded resource, shaped by the branch its location dispatched to.
#[derive(Debug, Clone)]
pub enum Resource {
    /// Raw bytes of a `.mid` location
    Bytes(Vec<u8>),
    /// Decoded `.ogg` / `.mp3` audio
    Audio(AudioBuffer),
    /// Any other location, decoded as an image
    Image(ImageHandle),
}

impl Resource {
    /// Which dispatch branch produced this resource.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Bytes(_) => ResourceKind::Midi,
            Resource::Audio(_) => ResourceKind::Audio,
            Resource::Image(_) => ResourceKind::Image,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Resource::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioBuffer> {
        match self {
            Resource::Audio(buffer) => Some(buffer),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageHandle> {
        match self {
            Resource::Image(handle) => Some(handle),
            _ => None,
        }
    }
}

/// Output table of a batch: key -> loaded resource.
///
/// Degraded keys are absent, so it never has more entries than the
/// [`SourceMap`] it was built from.
pub type ResourceMap = hashbrown::HashMap<String, Resource>;
