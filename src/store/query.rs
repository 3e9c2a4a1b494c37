use crate::store::path::{CollectionPath, DocumentPath};
use crate::store::snapshot::DocumentSnapshot;

/// Sort direction for a query's order key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: OrderDirection,
}

/// A subscription target: one collection, optionally ordered by a field.
///
/// Queries cover whole collections; consumers that need a slice of the
/// result set take it from the delivered snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    collection: CollectionPath,
    order_by: Option<OrderBy>,
}

impl Query {
    pub fn collection(collection: CollectionPath) -> Self {
        Self {
            collection,
            order_by: None,
        }
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn collection_path(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn order(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    /// Whether a document at `path` belongs to this query's result set.
    pub fn matches(&self, path: &DocumentPath) -> bool {
        path.parent() == self.collection
    }
}

/// The full ordered result set of a query at one point in time.
///
/// Every delivery carries the complete sequence, never a delta; consumers
/// replace their local copy wholesale.
#[derive(Clone, Debug)]
pub struct QuerySnapshot {
    documents: Vec<DocumentSnapshot>,
}

impl QuerySnapshot {
    pub fn new(documents: Vec<DocumentSnapshot>) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &[DocumentSnapshot] {
        &self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn into_documents(self) -> Vec<DocumentSnapshot> {
        self.documents
    }
}

impl IntoIterator for QuerySnapshot {
    type Item = DocumentSnapshot;
    type IntoIter = std::vec::IntoIter<DocumentSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}
