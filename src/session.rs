use serde::{Deserialize, Serialize};

/// The signed-in viewer, supplied by the host's auth layer.
///
/// This crate only reads it: the id keys the viewer's like entries and the
/// display fields are copied onto authored documents. It is never persisted
/// on its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerSession {
    pub id: String,
    pub display_name: String,
    pub image_url: Option<String>,
}

impl ViewerSession {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            image_url: None,
        }
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_optional_image() {
        let session = ViewerSession::new("uid-1", "Ada").with_image_url("https://example.test/a");
        assert_eq!(session.id, "uid-1");
        assert_eq!(session.image_url.as_deref(), Some("https://example.test/a"));
    }
}
