use crate::store::path::DocumentPath;
use crate::store::timestamp::Timestamp;
use crate::store::value::{FieldMap, FieldValue};

/// The state of a single document as observed at one point in time.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentSnapshot {
    path: DocumentPath,
    fields: Option<FieldMap>,
}

impl DocumentSnapshot {
    pub fn new(path: DocumentPath, fields: Option<FieldMap>) -> Self {
        Self { path, fields }
    }

    /// Returns whether the document existed when the snapshot was taken.
    pub fn exists(&self) -> bool {
        self.fields.is_some()
    }

    /// Returns the decoded document fields if the snapshot contains data.
    pub fn data(&self) -> Option<&FieldMap> {
        self.fields.as_ref()
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.as_ref().and_then(|fields| fields.get(name))
    }

    /// Convenience accessor for a string-valued field.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(FieldValue::as_str)
    }

    /// Convenience accessor for a timestamp-valued field.
    pub fn timestamp_field(&self, name: &str) -> Option<Timestamp> {
        self.field(name).and_then(FieldValue::as_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn snapshot_reports_existence() {
        let path = DocumentPath::from_string("posts/abc").unwrap();
        let missing = DocumentSnapshot::new(path.clone(), None);
        assert!(!missing.exists());
        assert!(missing.data().is_none());

        let fields = BTreeMap::from([("caption".to_string(), FieldValue::String("hi".into()))]);
        let present = DocumentSnapshot::new(path, Some(fields));
        assert!(present.exists());
        assert_eq!(present.str_field("caption"), Some("hi"));
        assert_eq!(present.str_field("missing"), None);
        assert_eq!(present.id(), "abc");
    }
}
