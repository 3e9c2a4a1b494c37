use std::fmt::{Display, Formatter};

use crate::store::error::{invalid_argument, StoreResult};

fn parse_segments(path: &str) -> StoreResult<Vec<String>> {
    if path.is_empty() {
        return Err(invalid_argument("Paths must not be empty"));
    }
    let segments: Vec<String> = path
        .split('/')
        .map(|segment| segment.to_string())
        .collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(invalid_argument(format!(
            "Path '{path}' contains an empty segment"
        )));
    }
    Ok(segments)
}

fn validate_id(id: &str) -> StoreResult<()> {
    if id.is_empty() {
        return Err(invalid_argument("Document IDs must not be empty"));
    }
    if id.contains('/') {
        return Err(invalid_argument("Document IDs cannot contain '/'"));
    }
    Ok(())
}

/// Path to a collection of documents, e.g. `posts` or `posts/abc/comments`.
///
/// Collections always have an odd number of segments; the documents inside
/// them extend the path by one id segment.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    pub fn from_string(path: &str) -> StoreResult<Self> {
        let segments = parse_segments(path)?;
        if segments.len() % 2 == 0 {
            return Err(invalid_argument(format!(
                "'{path}' does not name a collection (odd number of segments required)"
            )));
        }
        Ok(Self { segments })
    }

    /// The collection identifier (last path segment).
    pub fn id(&self) -> &str {
        self.segments
            .last()
            .expect("collection paths always have at least one segment")
    }

    /// Returns the path of the document identified by `id` in this collection.
    pub fn doc(&self, id: &str) -> StoreResult<DocumentPath> {
        validate_id(id)?;
        let mut segments = self.segments.clone();
        segments.push(id.to_string());
        Ok(DocumentPath { segments })
    }

    pub fn canonical_string(&self) -> String {
        self.segments.join("/")
    }
}

impl Display for CollectionPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical_string())
    }
}

/// Path to a single document, e.g. `posts/abc` or `posts/abc/likes/uid`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    pub fn from_string(path: &str) -> StoreResult<Self> {
        let segments = parse_segments(path)?;
        if segments.len() % 2 != 0 {
            return Err(invalid_argument(format!(
                "'{path}' does not name a document (even number of segments required)"
            )));
        }
        Ok(Self { segments })
    }

    /// The document identifier (last path segment).
    pub fn id(&self) -> &str {
        self.segments
            .last()
            .expect("document paths always have at least two segments")
    }

    /// The collection containing this document.
    pub fn parent(&self) -> CollectionPath {
        CollectionPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        }
    }

    /// Returns a subcollection rooted at this document.
    pub fn collection(&self, id: &str) -> StoreResult<CollectionPath> {
        validate_id(id)?;
        let mut segments = self.segments.clone();
        segments.push(id.to_string());
        Ok(CollectionPath { segments })
    }

    pub fn canonical_string(&self) -> String {
        self.segments.join("/")
    }
}

impl Display for DocumentPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_and_document_roundtrip() {
        let posts = CollectionPath::from_string("posts").unwrap();
        assert_eq!(posts.id(), "posts");

        let post = posts.doc("abc").unwrap();
        assert_eq!(post.id(), "abc");
        assert_eq!(post.parent(), posts);
        assert_eq!(post.canonical_string(), "posts/abc");

        let likes = post.collection("likes").unwrap();
        assert_eq!(likes.canonical_string(), "posts/abc/likes");
        assert_eq!(likes.doc("uid").unwrap().id(), "uid");
    }

    #[test]
    fn rejects_wrong_parity() {
        assert!(CollectionPath::from_string("posts/abc").is_err());
        assert!(DocumentPath::from_string("posts").is_err());
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(CollectionPath::from_string("").is_err());
        assert!(DocumentPath::from_string("posts//comments/x").is_err());
        let posts = CollectionPath::from_string("posts").unwrap();
        assert!(posts.doc("").is_err());
        assert!(posts.doc("a/b").is_err());
    }
}
