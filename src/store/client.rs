use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use async_trait::async_trait;

use crate::store::error::StoreResult;
use crate::store::path::{CollectionPath, DocumentPath};
use crate::store::query::{Query, QuerySnapshot};
use crate::store::snapshot::DocumentSnapshot;
use crate::store::value::FieldMap;

/// Callback invoked with the full current result set on every change.
pub type SnapshotCallback = Arc<dyn Fn(QuerySnapshot) + Send + Sync + 'static>;

/// The document-store seam every view model is built against.
///
/// Implementations provide per-document last-write-wins atomicity and
/// deliver query snapshots in emission order; nothing stronger is assumed.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Creates a document with a store-assigned id and returns its snapshot.
    async fn create(
        &self,
        collection: &CollectionPath,
        fields: FieldMap,
    ) -> StoreResult<DocumentSnapshot>;

    /// Writes the document at `path`, replacing any existing fields.
    async fn set(&self, path: &DocumentPath, fields: FieldMap) -> StoreResult<()>;

    /// Merges `fields` into an existing document.
    ///
    /// # Errors
    /// Returns `store/not-found` if the document does not exist.
    async fn update(&self, path: &DocumentPath, fields: FieldMap) -> StoreResult<()>;

    /// Deletes the document at `path`; succeeds even if it does not exist.
    async fn delete(&self, path: &DocumentPath) -> StoreResult<()>;

    /// Fetches the document at `path`; the snapshot may be empty.
    async fn get(&self, path: &DocumentPath) -> StoreResult<DocumentSnapshot>;

    /// Registers a listener and returns its registration handle.
    ///
    /// The listener receives the current result set once on registration and
    /// again after every change until the registration is detached.
    fn subscribe(&self, query: Query, callback: SnapshotCallback)
        -> StoreResult<ListenerRegistration>;
}

/// Handle owning one live subscription.
///
/// Detaching is idempotent; an undetached registration detaches itself when
/// dropped, so a registration can never outlive its owner.
pub struct ListenerRegistration {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl ListenerRegistration {
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    pub fn detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }

    pub fn is_detached(&self) -> bool {
        self.detach.is_none()
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.detach();
    }
}

impl Debug for ListenerRegistration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("detached", &self.is_detached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn detach_runs_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let mut registration = ListenerRegistration::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!registration.is_detached());
        registration.detach();
        registration.detach();
        assert!(registration.is_detached());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_detaches() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        {
            let _registration = ListenerRegistration::new(move || {
                counted.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
