//! mengine core - host-side asset and guest utilities
//!
//! This crate provides the pieces the mengine runtime needs around a game
//! compiled to WebAssembly: loading its media assets and talking to its
//! linear memory.
//!
//! # Architecture
//!
//! - [`ResourceLoader`] - Concurrent batch loading of images, audio and MIDI blobs
//! - [`SourceMap`] / [`ResourceMap`] - Input and output tables of a batch
//! - [`GuestModule`] - WASM guest loaded and instantiated with wasmtime
//! - [`read_c_string`] - Copy a NUL-terminated guest string and release it

pub mod config;
pub mod resources;
#[cfg(test)]
pub mod test_utils;
pub mod wasm;

pub use config::LoaderConfig;

// Re-export resource loading types
pub use resources::{
    AssetFetcher, AudioBuffer, AudioContext, AudioDecoder, DecodeError, FetchError,
    FetchImageLoader, Fetcher, FileFetcher, HttpFetcher, ImageHandle, ImageLoadError, ImageLoader,
    ManifestError, Resource, ResourceKind, ResourceLoader, ResourceManifest, ResourceMap,
    SourceMap, SymphoniaDecoder,
};

// Re-export guest memory types
pub use wasm::{
    DEFAULT_RAM_LIMIT, ForeignError, ForeignModule, GuestModule, HostState, WasmEngine,
    read_c_string, scan_c_string,
};
