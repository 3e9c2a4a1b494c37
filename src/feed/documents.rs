use serde::Serialize;

use crate::store::{CollectionPath, DocumentPath, DocumentSnapshot, StoreResult, Timestamp};

pub const POSTS_COLLECTION: &str = "posts";
pub const COMMENTS_SUBCOLLECTION: &str = "comments";
pub const LIKES_SUBCOLLECTION: &str = "likes";

pub const FIELD_AUTHOR_NAME: &str = "author_name";
pub const FIELD_AUTHOR_IMAGE_URL: &str = "author_image_url";
pub const FIELD_CAPTION: &str = "caption";
pub const FIELD_IMAGE_URL: &str = "image_url";
pub const FIELD_TEXT: &str = "text";
pub const FIELD_CREATED_AT: &str = "created_at";

pub fn posts_collection() -> CollectionPath {
    CollectionPath::from_string(POSTS_COLLECTION).expect("static collection path is valid")
}

pub fn post_document(post_id: &str) -> StoreResult<DocumentPath> {
    posts_collection().doc(post_id)
}

pub fn comments_collection(post_id: &str) -> StoreResult<CollectionPath> {
    post_document(post_id)?.collection(COMMENTS_SUBCOLLECTION)
}

pub fn likes_collection(post_id: &str) -> StoreResult<CollectionPath> {
    post_document(post_id)?.collection(LIKES_SUBCOLLECTION)
}

/// A viewer's like entry lives at a fixed path derived from the post and the
/// viewer, so creating it twice cannot produce two entries.
pub fn like_document(post_id: &str, viewer_id: &str) -> StoreResult<DocumentPath> {
    likes_collection(post_id)?.doc(viewer_id)
}

/// Object path of a post's image blob, keyed by the post id.
pub fn post_image_path(post_id: &str) -> String {
    format!("{POSTS_COLLECTION}/{post_id}/image")
}

/// Conversion seam from raw document snapshots to typed rows.
///
/// Conversion is infallible: documents written by other clients may lack
/// fields, and a feed row with defaults beats dropping the document.
pub trait FromSnapshot: Sized {
    fn from_snapshot(snapshot: &DocumentSnapshot) -> Self;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Post {
    pub id: String,
    pub author_name: String,
    pub author_image_url: Option<String>,
    /// Absent until the post's image upload has completed.
    pub image_url: Option<String>,
    pub caption: String,
    pub created_at: Option<Timestamp>,
}

impl FromSnapshot for Post {
    fn from_snapshot(snapshot: &DocumentSnapshot) -> Self {
        Self {
            id: snapshot.id().to_string(),
            author_name: snapshot
                .str_field(FIELD_AUTHOR_NAME)
                .unwrap_or_default()
                .to_string(),
            author_image_url: snapshot
                .str_field(FIELD_AUTHOR_IMAGE_URL)
                .map(str::to_string),
            image_url: snapshot.str_field(FIELD_IMAGE_URL).map(str::to_string),
            caption: snapshot
                .str_field(FIELD_CAPTION)
                .unwrap_or_default()
                .to_string(),
            created_at: snapshot.timestamp_field(FIELD_CREATED_AT),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Comment {
    pub id: String,
    pub author_name: String,
    pub author_image_url: Option<String>,
    pub text: String,
    pub created_at: Option<Timestamp>,
}

impl FromSnapshot for Comment {
    fn from_snapshot(snapshot: &DocumentSnapshot) -> Self {
        Self {
            id: snapshot.id().to_string(),
            author_name: snapshot
                .str_field(FIELD_AUTHOR_NAME)
                .unwrap_or_default()
                .to_string(),
            author_image_url: snapshot
                .str_field(FIELD_AUTHOR_IMAGE_URL)
                .map(str::to_string),
            text: snapshot
                .str_field(FIELD_TEXT)
                .unwrap_or_default()
                .to_string(),
            created_at: snapshot.timestamp_field(FIELD_CREATED_AT),
        }
    }
}

/// Membership entry: the document id is the liking viewer's id.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Like {
    pub viewer_id: String,
    pub author_name: String,
}

impl FromSnapshot for Like {
    fn from_snapshot(snapshot: &DocumentSnapshot) -> Self {
        Self {
            viewer_id: snapshot.id().to_string(),
            author_name: snapshot
                .str_field(FIELD_AUTHOR_NAME)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FieldMap, FieldValue};

    #[test]
    fn paths_follow_the_nested_layout() {
        assert_eq!(
            comments_collection("p1").unwrap().canonical_string(),
            "posts/p1/comments"
        );
        assert_eq!(
            like_document("p1", "uid").unwrap().canonical_string(),
            "posts/p1/likes/uid"
        );
        assert_eq!(post_image_path("p1"), "posts/p1/image");
        assert!(post_document("a/b").is_err());
    }

    #[test]
    fn post_decodes_with_missing_fields() {
        let path = post_document("p1").unwrap();
        let fields = FieldMap::from([(
            FIELD_CAPTION.to_string(),
            FieldValue::String("sunset".into()),
        )]);
        let post = Post::from_snapshot(&DocumentSnapshot::new(path, Some(fields)));
        assert_eq!(post.id, "p1");
        assert_eq!(post.caption, "sunset");
        assert_eq!(post.author_name, "");
        assert!(post.image_url.is_none());
        assert!(post.created_at.is_none());
    }

    #[test]
    fn like_takes_viewer_id_from_document_id() {
        let path = like_document("p1", "uid-9").unwrap();
        let fields = FieldMap::from([(
            FIELD_AUTHOR_NAME.to_string(),
            FieldValue::String("Ada".into()),
        )]);
        let like = Like::from_snapshot(&DocumentSnapshot::new(path, Some(fields)));
        assert_eq!(like.viewer_id, "uid-9");
        assert_eq!(like.author_name, "Ada");
    }
}
