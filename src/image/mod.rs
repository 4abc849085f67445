//! External image lookup and the cache-on-first-view operation.

/// `reqwest`-backed search client.
pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    core::store::{InstrumentStore, Lookup, StoreError},
    types::{ImageRef, InstrumentId},
};

pub use http::HttpImageLookup;

/// Failure talking to the image search service.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Transport or client construction failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Service answered with a non-success status.
    #[error("service returned status {0}")]
    Status(u16),
    /// Response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Request-by-name contract to an image search service.
#[async_trait]
pub trait ImageLookup: Send + Sync {
    /// First matching picture address for `query`, or `None` when nothing matches.
    async fn first_image(&self, query: &str) -> Result<Option<String>, LookupError>;
}

/// Lookup used when image search is disabled; never matches.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImageLookup;

#[async_trait]
impl ImageLookup for NoImageLookup {
    async fn first_image(&self, _query: &str) -> Result<Option<String>, LookupError> {
        Ok(None)
    }
}

/// Returns the record's image, querying `lookup` by name and caching the
/// answer when the record has none yet.
///
/// Lookup errors, empty results, and expiry of `timeout` all cache
/// [`ImageRef::Placeholder`]. Only a missing record is an error.
pub async fn fetch_image_if_missing(
    store: &mut InstrumentStore,
    id: InstrumentId,
    lookup: &dyn ImageLookup,
    timeout: Duration,
) -> Result<ImageRef, StoreError> {
    let rec = store.get(id).ok_or(StoreError::NotFound(Lookup::Id(id)))?;
    if let Some(image) = &rec.image {
        return Ok(image.clone());
    }
    let name = rec.name.clone();

    let image = match tokio::time::timeout(timeout, lookup.first_image(&name)).await {
        Ok(Ok(Some(url))) => ImageRef::Url(url),
        Ok(Ok(None)) => {
            debug!(id, %name, "no image match, caching placeholder");
            ImageRef::Placeholder
        }
        Ok(Err(err)) => {
            warn!(id, %name, error = %err, "image lookup failed, caching placeholder");
            ImageRef::Placeholder
        }
        Err(_) => {
            warn!(id, %name, timeout_ms = timeout.as_millis() as u64, "image lookup timed out, caching placeholder");
            ImageRef::Placeholder
        }
    };

    store.set_image(id, image.clone())?;
    Ok(image)
}

/// [`fetch_image_if_missing`] for the first record named exactly `name`.
pub async fn fetch_image_if_missing_by_name(
    store: &mut InstrumentStore,
    name: &str,
    lookup: &dyn ImageLookup,
    timeout: Duration,
) -> Result<ImageRef, StoreError> {
    let id = store.id_by_name(name)?;
    fetch_image_if_missing(store, id, lookup, timeout).await
}
