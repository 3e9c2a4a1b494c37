use async_trait::async_trait;
use bytes::Bytes;

use crate::blob::error::BlobResult;

/// The blob-storage seam: opaque byte objects addressed by slash-separated
/// object paths, with durable download URLs.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Stores `data` at `path`, replacing any existing object.
    async fn upload(&self, path: &str, data: Bytes, content_type: Option<&str>) -> BlobResult<()>;

    /// Resolves a durable URL for the object at `path`.
    ///
    /// # Errors
    /// Returns `blob/not-found` if no object exists at `path`.
    async fn download_url(&self, path: &str) -> BlobResult<String>;
}
