use std::sync::{Arc, Mutex};

use crate::feed::documents::{
    comments_collection, like_document, likes_collection, Comment, Like, FIELD_AUTHOR_IMAGE_URL,
    FIELD_AUTHOR_NAME, FIELD_CREATED_AT, FIELD_TEXT,
};
use crate::feed::error::{unauthenticated, FeedResult};
use crate::feed::live_query::LiveQuery;
use crate::session::ViewerSession;
use crate::store::{
    DocumentStore, FieldMap, FieldValue, OrderDirection, Query, StoreResult,
};

#[derive(Default)]
struct PostState {
    comments: Vec<Comment>,
    likes: Vec<Like>,
    draft_comment: String,
    submitting: bool,
}

/// Per-post live state: the comment stream, the like set, and the locally
/// owned comment draft.
///
/// The view model owns its two subscriptions exclusively and releases them
/// on [`detach`](Self::detach) or drop. `has_liked` is derived from the
/// latest likes snapshot on every read; it is never stored, so it cannot
/// drift from the snapshot it is defined by.
pub struct PostViewModel {
    post_id: String,
    store: Arc<dyn DocumentStore>,
    viewer: Option<ViewerSession>,
    state: Arc<Mutex<PostState>>,
    comments_query: Mutex<LiveQuery<Comment>>,
    likes_query: Mutex<LiveQuery<Like>>,
}

impl PostViewModel {
    /// Opens the comment and like subscriptions for `post_id`.
    pub fn attach(
        store: Arc<dyn DocumentStore>,
        post_id: &str,
        viewer: Option<ViewerSession>,
    ) -> StoreResult<Arc<Self>> {
        let state = Arc::new(Mutex::new(PostState::default()));

        let comments_state = Arc::clone(&state);
        let comments_query = LiveQuery::open(
            store.as_ref(),
            Query::collection(comments_collection(post_id)?)
                .order_by(FIELD_CREATED_AT, OrderDirection::Descending),
            move |comments| {
                comments_state.lock().unwrap().comments = comments;
            },
        )?;

        let likes_state = Arc::clone(&state);
        let likes_query = LiveQuery::open(
            store.as_ref(),
            Query::collection(likes_collection(post_id)?),
            move |likes| {
                likes_state.lock().unwrap().likes = likes;
            },
        )?;

        Ok(Arc::new(Self {
            post_id: post_id.to_string(),
            store,
            viewer,
            state,
            comments_query: Mutex::new(comments_query),
            likes_query: Mutex::new(likes_query),
        }))
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    /// The latest comment snapshot, newest first.
    pub fn comments(&self) -> Vec<Comment> {
        self.state.lock().unwrap().comments.clone()
    }

    pub fn like_count(&self) -> usize {
        self.state.lock().unwrap().likes.len()
    }

    /// Whether the current viewer's like entry is present in the latest
    /// likes snapshot. Always `false` without a session.
    pub fn has_liked(&self) -> bool {
        let state = self.state.lock().unwrap();
        match &self.viewer {
            Some(viewer) => state.likes.iter().any(|like| like.viewer_id == viewer.id),
            None => false,
        }
    }

    pub fn draft_comment(&self) -> String {
        self.state.lock().unwrap().draft_comment.clone()
    }

    pub fn set_draft_comment(&self, text: impl Into<String>) {
        self.state.lock().unwrap().draft_comment = text.into();
    }

    pub fn is_submitting(&self) -> bool {
        self.state.lock().unwrap().submitting
    }

    /// Creates or deletes the viewer's like entry, depending on the latest
    /// snapshot.
    ///
    /// There is no optimistic flip: `has_liked` changes only when the next
    /// likes snapshot arrives, so a failed write cannot leave a stale flag
    /// behind. The entry's path is derived from (post, viewer), so repeated
    /// creates collapse into one membership entry.
    pub async fn toggle_like(&self) -> FeedResult<()> {
        let viewer = self
            .viewer
            .as_ref()
            .ok_or_else(|| unauthenticated("toggle_like requires a signed-in viewer"))?;
        let path = like_document(&self.post_id, &viewer.id)?;
        if self.has_liked() {
            self.store.delete(&path).await?;
        } else {
            let fields = FieldMap::from([(
                FIELD_AUTHOR_NAME.to_string(),
                FieldValue::String(viewer.display_name.clone()),
            )]);
            self.store.set(&path, fields).await?;
        }
        Ok(())
    }

    /// Submits the current draft as a new comment.
    ///
    /// A draft that trims to empty is a no-op returning `Ok(false)` with the
    /// draft untouched. Otherwise the draft is cleared before the write is
    /// issued; if the write then fails, the text is gone. Returns `Ok(true)`
    /// once the comment has been written.
    pub async fn submit_comment(&self) -> FeedResult<bool> {
        let text = {
            let state = self.state.lock().unwrap();
            if state.draft_comment.trim().is_empty() {
                return Ok(false);
            }
            state.draft_comment.clone()
        };
        let viewer = self
            .viewer
            .as_ref()
            .ok_or_else(|| unauthenticated("submit_comment requires a signed-in viewer"))?;

        {
            let mut state = self.state.lock().unwrap();
            state.draft_comment.clear();
            state.submitting = true;
        }

        let mut fields = FieldMap::from([
            (FIELD_TEXT.to_string(), FieldValue::String(text)),
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

        let collection = comments_collection(&self.post_id)?;
        let result = self.store.create(&collection, fields).await;
        self.state.lock().unwrap().submitting = false;

        match result {
            Ok(_) => Ok(true),
            Err(err) => {
                log::warn!(
                    "comment on post {} failed after the draft was cleared: {err}",
                    self.post_id
                );
                Err(err.into())
            }
        }
    }

    /// Closes both subscriptions. Called by the owning feed when the post
    /// leaves its retained set; safe to call repeatedly.
    pub fn detach(&self) {
        self.comments_query.lock().unwrap().close();
        self.likes_query.lock().unwrap().close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;

    fn viewer() -> ViewerSession {
        ViewerSession::new("uid-1", "Ada").with_image_url("https://example.test/ada.png")
    }

    fn store() -> Arc<MemoryDocumentStore> {
        Arc::new(MemoryDocumentStore::new())
    }

    #[tokio::test]
    async fn has_liked_tracks_snapshot_membership() {
        let store = store();
        let post = PostViewModel::attach(store.clone(), "p1", Some(viewer())).unwrap();
        assert!(!post.has_liked());

        // Another client writes the viewer's like entry directly.
        let path = like_document("p1", "uid-1").unwrap();
        store
            .set(
                &path,
                FieldMap::from([(
                    FIELD_AUTHOR_NAME.to_string(),
                    FieldValue::String("Ada".into()),
                )]),
            )
            .await
            .unwrap();
        assert!(post.has_liked());
        assert_eq!(post.like_count(), 1);

        store.delete(&path).await.unwrap();
        assert!(!post.has_liked());
    }

    #[tokio::test]
    async fn toggle_like_flips_over_two_round_trips() {
        let store = store();
        let post = PostViewModel::attach(store.clone(), "p1", Some(viewer())).unwrap();

        post.toggle_like().await.expect("like");
        assert!(post.has_liked());
        assert_eq!(post.like_count(), 1);

        post.toggle_like().await.expect("unlike");
        assert!(!post.has_liked());
        assert_eq!(post.like_count(), 0);
    }

    #[tokio::test]
    async fn toggle_like_without_session_is_rejected_before_writing() {
        let store = store();
        let post = PostViewModel::attach(store.clone(), "p1", None).unwrap();
        let err = post.toggle_like().await.expect_err("no session");
        assert_eq!(err.code_str(), "feed/unauthenticated");
        assert_eq!(post.like_count(), 0);
    }

    #[tokio::test]
    async fn empty_drafts_are_not_submitted() {
        let store = store();
        let post = PostViewModel::attach(store.clone(), "p1", Some(viewer())).unwrap();

        assert!(!post.submit_comment().await.unwrap());

        post.set_draft_comment("   ");
        assert!(!post.submit_comment().await.unwrap());
        assert_eq!(post.draft_comment(), "   ");
        assert!(post.comments().is_empty());
    }

    #[tokio::test]
    async fn submitting_a_comment_clears_the_draft_and_prepends() {
        let store = store();
        let post = PostViewModel::attach(store.clone(), "p1", Some(viewer())).unwrap();

        post.set_draft_comment("hello");
        assert!(post.submit_comment().await.unwrap());
        assert_eq!(post.draft_comment(), "");
        assert!(!post.is_submitting());

        let comments = post.comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "hello");
        assert_eq!(comments[0].author_name, "Ada");
        assert_eq!(
            comments[0].author_image_url.as_deref(),
            Some("https://example.test/ada.png")
        );
        assert!(comments[0].created_at.is_some());

        post.set_draft_comment("newer");
        post.submit_comment().await.unwrap();
        let comments = post.comments();
        let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["newer", "hello"]);
    }

    #[tokio::test]
    async fn unauthenticated_submit_keeps_the_draft() {
        let store = store();
        let post = PostViewModel::attach(store.clone(), "p1", None).unwrap();
        post.set_draft_comment("kept");
        let err = post.submit_comment().await.expect_err("no session");
        assert_eq!(err.code_str(), "feed/unauthenticated");
        assert_eq!(post.draft_comment(), "kept");
    }

    #[tokio::test]
    async fn detach_stops_snapshot_delivery() {
        let store = store();
        let post = PostViewModel::attach(store.clone(), "p1", Some(viewer())).unwrap();
        post.detach();

        let collection = comments_collection("p1").unwrap();
        store
            .create(
                &collection,
                FieldMap::from([(FIELD_TEXT.to_string(), FieldValue::String("late".into()))]),
            )
            .await
            .unwrap();
        assert!(post.comments().is_empty());
    }
}
