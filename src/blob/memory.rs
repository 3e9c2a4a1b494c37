use std::collections::BTreeMap;

use async_lock::Mutex;
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};
use url::Url;

use crate::blob::error::{internal_error, invalid_argument, not_found, BlobResult};
use crate::blob::store::BlobStore;

// Everything except unreserved URL characters is escaped, '/' included, so
// the whole object path lands in a single URL path segment.
const OBJECT_PATH_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const DEFAULT_BASE_URL: &str = "https://blobstore.invalid/v0/b/feedsync.appspot.com/o";

struct StoredBlob {
    data: Bytes,
    content_type: Option<String>,
}

/// In-memory blob store whose download URLs carry a content-derived token,
/// so a URL is stable for identical bytes and distinguishable otherwise.
pub struct MemoryBlobStore {
    objects: Mutex<BTreeMap<String, StoredBlob>>,
    base_url: String,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Returns the stored object, mainly for assertions in tests.
    pub async fn object(&self, path: &str) -> Option<(Bytes, Option<String>)> {
        let guard = self.objects.lock().await;
        guard
            .get(path)
            .map(|blob| (blob.data.clone(), blob.content_type.clone()))
    }

    fn url_for(&self, path: &str, data: &Bytes) -> BlobResult<String> {
        let encoded_path = utf8_percent_encode(path, OBJECT_PATH_ESCAPES).to_string();
        let token = download_token(data);
        let url = format!("{}/{encoded_path}?alt=media&token={token}", self.base_url);
        Url::parse(&url)
            .map_err(|err| internal_error(format!("Built an invalid download URL: {err}")))?;
        Ok(url)
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &str, data: Bytes, content_type: Option<&str>) -> BlobResult<()> {
        if path.is_empty() {
            return Err(invalid_argument("Object paths must not be empty"));
        }
        let mut guard = self.objects.lock().await;
        guard.insert(
            path.to_string(),
            StoredBlob {
                data,
                content_type: content_type.map(str::to_string),
            },
        );
        log::debug!("stored blob at '{path}'");
        Ok(())
    }

    async fn download_url(&self, path: &str) -> BlobResult<String> {
        let guard = self.objects.lock().await;
        let blob = guard
            .get(path)
            .ok_or_else(|| not_found(format!("No object at '{path}'")))?;
        self.url_for(path, &blob.data)
    }
}

fn download_token(data: &Bytes) -> String {
    let digest = Sha256::digest(data);
    URL_SAFE_NO_PAD.encode(&digest[..16])
}
