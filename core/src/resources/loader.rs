//! Concurrent batch loading with completion tracking.
//!
//! Every entry of a [`SourceMap`] is resolved by its own tokio task. Tasks
//! only produce values; the single collector loop in [`ResourceLoader::load`]
//! is the only writer of the [`ResourceMap`], so completions that race are
//! serialized there.
//!
//! # Completion Contract
//!
//! - `on_progress(done, total)` runs once per terminal entry, resolved or degraded
//! - `on_complete(results)` runs exactly once, after the last terminal entry
//! - An empty source table completes immediately without issuing any I/O

use std::sync::Arc;

use tokio::task::{JoinSet, spawn_blocking};
use tracing::{debug, info, warn};

use super::audio::{AudioContext, AudioDecoder, SymphoniaDecoder};
use super::fetch::{AssetFetcher, FetchError, Fetcher};
use super::images::{FetchImageLoader, ImageLoader};
use super::source::{ResourceKind, SourceMap, audio_extension};
use super::{Resource, ResourceMap};
use crate::config::LoaderConfig;

/// Services shared by every in-flight entry of a batch.
struct LoaderServices {
    fetcher: Arc<dyn Fetcher>,
    images: Arc<dyn ImageLoader>,
    decoder: Arc<dyn AudioDecoder>,
    audio: AudioContext,
}

/// Loads batches of media resources.
///
/// Cheap to clone; clones share the same fetcher, image loader and decoder.
#[derive(Clone)]
pub struct ResourceLoader {
    services: Arc<LoaderServices>,
}

impl ResourceLoader {
    /// Create a loader that fetches everything through `fetcher`, decodes audio
    /// with symphonia and images with the `image` crate.
    pub fn new(fetcher: Arc<dyn Fetcher>, audio: AudioContext) -> Self {
        let images = Arc::new(FetchImageLoader::new(fetcher.clone()));
        Self::with_services(fetcher, images, Arc::new(SymphoniaDecoder::new()), audio)
    }

    /// Create a loader from explicit services.
    pub fn with_services(
        fetcher: Arc<dyn Fetcher>,
        images: Arc<dyn ImageLoader>,
        decoder: Arc<dyn AudioDecoder>,
        audio: AudioContext,
    ) -> Self {
        Self {
            services: Arc::new(LoaderServices {
                fetcher,
                images,
                decoder,
                audio,
            }),
        }
    }

    /// Create a loader that resolves locations as described by `config`.
    pub fn from_config(config: &LoaderConfig) -> Result<Self, FetchError> {
        let fetcher = Arc::new(AssetFetcher::from_config(config)?);
        Ok(Self::new(fetcher, AudioContext::new(config.sample_rate)))
    }

    /// Audio context decoded audio is produced for.
    pub fn audio_context(&self) -> AudioContext {
        self.services.audio
    }

    /// Load every entry of `sources` concurrently.
    ///
    /// Returns after `on_complete` has been called. Entries that fail to load
    /// are logged and omitted from the results but still count toward
    /// `done`, so a failure never stalls the batch.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn load<C>(
        &self,
        sources: SourceMap,
        on_complete: C,
        mut on_progress: Option<&mut dyn FnMut(usize, usize)>,
    ) where
        C: FnOnce(ResourceMap),
    {
        let total = sources.len();
        if total == 0 {
            info!("Resources load complete (empty batch)");
            on_complete(ResourceMap::new());
            return;
        }

        let mut in_flight = JoinSet::new();
        for (key, location) in sources {
            let services = self.services.clone();
            in_flight.spawn(async move {
                let resource = resolve_entry(services, &key, location).await;
                (key, resource)
            });
        }

        let mut results = ResourceMap::with_capacity(total);
        let mut done = 0usize;

        while let Some(joined) = in_flight.join_next().await {
            match joined {
                Ok((key, Some(resource))) => {
                    results.insert(key, resource);
                }
                Ok((_, None)) => {}
                // A panicking entry degrades like any other failure
                Err(e) => warn!("Resource task failed: {}", e),
            }

            done += 1;
            if let Some(progress) = on_progress.as_mut() {
                progress(done, total);
            }
        }

        info!(
            "Resources load complete: {}/{} loaded",
            results.len(),
            total
        );
        on_complete(results);
    }

    /// Load every entry and return the results.
    pub async fn load_all(&self, sources: SourceMap) -> ResourceMap {
        let mut out = None;
        self.load(sources, |results| out = Some(results), None).await;
        out.unwrap_or_default()
    }
}

/// Resolve one entry to its terminal state.
///
/// `None` means the entry degraded; the reason has already been logged.
async fn resolve_entry(
    services: Arc<LoaderServices>,
    key: &str,
    location: String,
) -> Option<Resource> {
    let kind = ResourceKind::from_location(&location);
    debug!("Loading resource '{}' ({}) from {}", key, kind, location);

    match kind {
        ResourceKind::Midi => match services.fetcher.fetch(&location).await {
            Ok(bytes) => Some(Resource::Bytes(bytes)),
            Err(e) => {
                warn!("Failed to fetch '{}' from {}: {}", key, location, e);
                None
            }
        },
        ResourceKind::Audio => {
            let bytes = match services.fetcher.fetch(&location).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Failed to fetch '{}' from {}: {}", key, location, e);
                    return None;
                }
            };

            let decoder = services.decoder.clone();
            let ctx = services.audio;
            let extension = audio_extension(&location);
            match spawn_blocking(move || decoder.decode(&bytes, extension, &ctx)).await {
                Ok(Ok(buffer)) => Some(Resource::Audio(buffer)),
                Ok(Err(e)) => {
                    warn!("Failed to decode audio '{}' from {}: {}", key, location, e);
                    None
                }
                Err(e) => {
                    warn!("Audio decode task for '{}' failed: {}", key, e);
                    None
                }
            }
        }
        ResourceKind::Image => match services.images.load_image(&location).await {
            Ok(handle) => Some(Resource::Image(handle)),
            Err(e) => {
                warn!("Failed to load image '{}' from {}: {}", key, location, e);
                None
            }
        },
    }
}
