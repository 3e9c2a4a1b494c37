use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::blob::data_url::{encode_data_url, sniff_image_type};
use crate::blob::BlobStore;
use crate::feed::documents::{
    post_document, post_image_path, posts_collection, FIELD_AUTHOR_IMAGE_URL, FIELD_AUTHOR_NAME,
    FIELD_CAPTION, FIELD_CREATED_AT, FIELD_IMAGE_URL,
};
use crate::feed::error::{caption_too_long, missing_image, unauthenticated, FeedResult};
use crate::session::ViewerSession;
use crate::store::{DocumentStore, FieldMap, FieldValue};

/// Longest caption accepted by `submit`.
pub const MAX_CAPTION_LEN: usize = 150;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// An image held locally between staging and submission.
#[derive(Clone, Debug)]
pub struct StagedImage {
    bytes: Bytes,
    content_type: String,
    preview: String,
}

impl StagedImage {
    /// Data URL rendering of the staged bytes, for immediate display.
    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

#[derive(Default)]
struct UploadState {
    staged: Option<StagedImage>,
    submitting: bool,
}

/// Create-post-with-image workflow.
///
/// The sequence is linear and not resumable: create the post record, upload
/// the blob under the new post's id, resolve its URL, patch the record.
/// A failure after the first step leaves a post without `image_url`; no
/// rollback is attempted, the orphan is logged so it stays findable.
pub struct UploadViewModel {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    viewer: Option<ViewerSession>,
    state: Mutex<UploadState>,
}

impl UploadViewModel {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        viewer: Option<ViewerSession>,
    ) -> Self {
        Self {
            store,
            blobs,
            viewer,
            state: Mutex::new(UploadState::default()),
        }
    }

    /// Holds `bytes` locally and returns a data-URL preview. Purely local:
    /// nothing is uploaded until [`submit`](Self::submit).
    pub fn stage_image(&self, bytes: Bytes) -> FeedResult<String> {
        if bytes.is_empty() {
            return Err(missing_image("cannot stage an empty image"));
        }
        let content_type = sniff_image_type(&bytes).unwrap_or(FALLBACK_CONTENT_TYPE);
        let preview = encode_data_url(&bytes, content_type);
        let staged = StagedImage {
            bytes,
            content_type: content_type.to_string(),
            preview: preview.clone(),
        };
        self.state.lock().unwrap().staged = Some(staged);
        Ok(preview)
    }

    /// Discards the staged image, if any.
    pub fn clear_staged_image(&self) {
        self.state.lock().unwrap().staged = None;
    }

    pub fn staged_preview(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .staged
            .as_ref()
            .map(|staged| staged.preview.clone())
    }

    pub fn is_submitting(&self) -> bool {
        self.state.lock().unwrap().submitting
    }

    /// Creates the post and attaches the staged image.
    ///
    /// Only one submission may be in flight: a call that finds another one
    /// running returns `Ok(None)` without side effects. Validation failures
    /// (no session, no staged image, over-long caption) reject before any
    /// network call. On success the staged image and guard are reset and the
    /// new post id is returned; on failure the guard resets but the staged
    /// image is kept so the caller may retry.
    pub async fn submit(&self, caption: &str) -> FeedResult<Option<String>> {
        let viewer = self
            .viewer
            .clone()
            .ok_or_else(|| unauthenticated("submit requires a signed-in viewer"))?;
        if caption.chars().count() > MAX_CAPTION_LEN {
            return Err(caption_too_long(format!(
                "captions are limited to {MAX_CAPTION_LEN} characters"
            )));
        }

        // Guard check and set happen under one lock so a re-entrant call
        // cannot slip between them.
        let staged = {
            let mut state = self.state.lock().unwrap();
            if state.submitting {
                log::debug!("submit ignored: another upload is in flight");
                return Ok(None);
            }
            let staged = state
                .staged
                .clone()
                .ok_or_else(|| missing_image("submit requires a staged image"))?;
            state.submitting = true;
            staged
        };

        let result = self.run_submit(&viewer, caption, &staged).await;
        let mut state = self.state.lock().unwrap();
        state.submitting = false;
        match result {
            Ok(post_id) => {
                state.staged = None;
                Ok(Some(post_id))
            }
            Err(err) => Err(err),
        }
    }

    async fn run_submit(
        &self,
        viewer: &ViewerSession,
        caption: &str,
        staged: &StagedImage,
    ) -> FeedResult<String> {
        let mut fields = FieldMap::from([
            (
                FIELD_CAPTION.to_string(),
                FieldValue::String(caption.to_string()),
            ),
            (
                FIELD_AUTHOR_NAME.to_string(),
                FieldValue::String(viewer.display_name.clone()),
            ),
            (FIELD_CREATED_AT.to_string(), FieldValue::ServerTimestamp),
        ]);
        if let Some(image_url) = &viewer.image_url {
            fields.insert(
                FIELD_AUTHOR_IMAGE_URL.to_string(),
                FieldValue::String(image_url.clone()),
            );
        }

        let created = self.store.create(&posts_collection(), fields).await?;
        let post_id = created.id().to_string();

        if let Err(err) = self.attach_image(&post_id, staged).await {
            // The post exists but has no image_url; a repair job can find it.
            log::warn!("post {post_id} was created without an image: {err}");
            return Err(err);
        }
        Ok(post_id)
    }

    async fn attach_image(&self, post_id: &str, staged: &StagedImage) -> FeedResult<()> {
        let blob_path = post_image_path(post_id);
        self.blobs
            .upload(
                &blob_path,
                staged.bytes.clone(),
                Some(&staged.content_type),
            )
            .await?;
        let url = self.blobs.download_url(&blob_path).await?;
        let fields = FieldMap::from([(FIELD_IMAGE_URL.to_string(), FieldValue::String(url))]);
        self.store.update(&post_document(post_id)?, fields).await?;
        Ok(())
    }
}
