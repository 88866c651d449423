//! Image loading for resources that are neither MIDI nor audio.

use std::sync::Arc;

use async_trait::async_trait;
use image::RgbaImage;
use thiserror::Error;

use super::fetch::{FetchError, Fetcher};

/// A decoded image, cheap to clone.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    location: String,
    pixels: Arc<RgbaImage>,
}

impl ImageHandle {
    pub fn new(location: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            location: location.into(),
            pixels: Arc::new(pixels),
        }
    }

    /// Location the image was loaded from.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// RGBA8 pixel data.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to decode image {location}: {source}")]
    Decode {
        location: String,
        #[source]
        source: image::ImageError,
    },
    #[error("image decode task for {0} did not finish")]
    Interrupted(String),
}

/// Loads a location into a decoded image.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load_image(&self, location: &str) -> Result<ImageHandle, ImageLoadError>;
}

/// Fetches image bytes and decodes them with the `image` crate.
pub struct FetchImageLoader {
    fetcher: Arc<dyn Fetcher>,
}

impl FetchImageLoader {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ImageLoader for FetchImageLoader {
    async fn load_image(&self, location: &str) -> Result<ImageHandle, ImageLoadError> {
        let bytes = self.fetcher.fetch(location).await?;

        let owned_location = location.to_string();
        let decoded = tokio::task::spawn_blocking(move || {
            image::load_from_memory(&bytes).map(|img| img.to_rgba8())
        })
        .await
        .map_err(|_| ImageLoadError::Interrupted(owned_location.clone()))?;

        let pixels = decoded.map_err(|source| ImageLoadError::Decode {
            location: owned_location.clone(),
            source,
        })?;

        Ok(ImageHandle::new(owned_location, pixels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MemoryFetcher, png_bytes};

    #[tokio::test]
    async fn test_load_png() {
        let fetcher = MemoryFetcher::new().with("Car.png", png_bytes(3, 2));
        let loader = FetchImageLoader::new(Arc::new(fetcher));

        let handle = loader.load_image("Car.png").await.unwrap();
        assert_eq!(handle.location(), "Car.png");
        assert_eq!((handle.width(), handle.height()), (3, 2));
        assert_eq!(handle.pixels().as_raw().len(), 3 * 2 * 4);
    }

    #[tokio::test]
    async fn test_load_corrupt_image() {
        let fetcher = MemoryFetcher::new().with("Car.png", b"not a png".to_vec());
        let loader = FetchImageLoader::new(Arc::new(fetcher));

        let result = loader.load_image("Car.png").await;
        assert!(matches!(result, Err(ImageLoadError::Decode { location, .. }) if location == "Car.png"));
    }

    #[tokio::test]
    async fn test_load_missing_image() {
        let loader = FetchImageLoader::new(Arc::new(MemoryFetcher::new()));
        let result = loader.load_image("Missing.png").await;
        assert!(matches!(result, Err(ImageLoadError::Fetch(FetchError::NotFound(_)))));
    }
}
