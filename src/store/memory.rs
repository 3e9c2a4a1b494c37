use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

use crate::store::client::{DocumentStore, ListenerRegistration, SnapshotCallback};
use crate::store::error::{not_found, StoreResult};
use crate::store::path::{CollectionPath, DocumentPath};
use crate::store::query::{OrderBy, OrderDirection, Query, QuerySnapshot};
use crate::store::snapshot::DocumentSnapshot;
use crate::store::timestamp::Timestamp;
use crate::store::value::{FieldMap, FieldValue};

struct ListenerEntry {
    id: u64,
    query: Query,
    callback: SnapshotCallback,
}

/// In-memory document store with synchronous snapshot delivery.
///
/// Every successful write re-runs the queries of all listeners registered on
/// the written collection and invokes their callbacks with the full ordered
/// result set. Callbacks are cloned out of the listener table and invoked
/// with no lock held, so a callback may freely subscribe, detach, or write.
pub struct MemoryDocumentStore {
    documents: Mutex<BTreeMap<DocumentPath, FieldMap>>,
    listeners: Arc<Mutex<Vec<ListenerEntry>>>,
    listener_counter: AtomicU64,
    // Last server timestamp handed out; writes never reuse or reorder it.
    clock: Mutex<Timestamp>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(BTreeMap::new()),
            listeners: Arc::new(Mutex::new(Vec::new())),
            listener_counter: AtomicU64::new(1),
            clock: Mutex::new(Timestamp::new(0, 0)),
        }
    }

    fn next_server_timestamp(&self) -> Timestamp {
        let mut last = self.clock.lock().unwrap();
        let mut stamp = Timestamp::now();
        if stamp <= *last {
            stamp = Timestamp::new(last.seconds, last.nanos + 1);
        }
        *last = stamp;
        stamp
    }

    /// Replaces write-time sentinels with the timestamp assigned to this
    /// write. All sentinel fields of one write resolve to the same instant.
    fn materialize(&self, mut fields: FieldMap) -> FieldMap {
        let has_sentinel = fields
            .values()
            .any(|value| matches!(value, FieldValue::ServerTimestamp));
        if has_sentinel {
            let stamp = self.next_server_timestamp();
            for value in fields.values_mut() {
                if matches!(value, FieldValue::ServerTimestamp) {
                    *value = FieldValue::Timestamp(stamp);
                }
            }
        }
        fields
    }

    fn snapshot_for_query(&self, query: &Query) -> QuerySnapshot {
        let mut documents: Vec<DocumentSnapshot> = {
            let guard = self.documents.lock().unwrap();
            guard
                .iter()
                .filter(|(path, _)| query.matches(path))
                .map(|(path, fields)| DocumentSnapshot::new(path.clone(), Some(fields.clone())))
                .collect()
        };
        if let Some(order) = query.order() {
            sort_documents(&mut documents, order);
        }
        QuerySnapshot::new(documents)
    }

    fn notify_collection(&self, collection: &CollectionPath) {
        let targets: Vec<(SnapshotCallback, Query)> = {
            let guard = self.listeners.lock().unwrap();
            guard
                .iter()
                .filter(|entry| entry.query.collection_path() == collection)
                .map(|entry| (Arc::clone(&entry.callback), entry.query.clone()))
                .collect()
        };
        for (callback, query) in targets {
            callback(self.snapshot_for_query(&query));
        }
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(
        &self,
        collection: &CollectionPath,
        fields: FieldMap,
    ) -> StoreResult<DocumentSnapshot> {
        let path = collection.doc(&generate_auto_id())?;
        let fields = self.materialize(fields);
        self.documents
            .lock()
            .unwrap()
            .insert(path.clone(), fields.clone());
        log::debug!("created {path}");
        self.notify_collection(collection);
        Ok(DocumentSnapshot::new(path, Some(fields)))
    }

    async fn set(&self, path: &DocumentPath, fields: FieldMap) -> StoreResult<()> {
        let fields = self.materialize(fields);
        self.documents.lock().unwrap().insert(path.clone(), fields);
        self.notify_collection(&path.parent());
        Ok(())
    }

    async fn update(&self, path: &DocumentPath, fields: FieldMap) -> StoreResult<()> {
        let fields = self.materialize(fields);
        {
            let mut guard = self.documents.lock().unwrap();
            let existing = guard
                .get_mut(path)
                .ok_or_else(|| not_found(format!("No document at '{path}'")))?;
            existing.extend(fields);
        }
        self.notify_collection(&path.parent());
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> StoreResult<()> {
        let removed = self.documents.lock().unwrap().remove(path).is_some();
        if removed {
            self.notify_collection(&path.parent());
        }
        Ok(())
    }

    async fn get(&self, path: &DocumentPath) -> StoreResult<DocumentSnapshot> {
        let fields = self.documents.lock().unwrap().get(path).cloned();
        Ok(DocumentSnapshot::new(path.clone(), fields))
    }

    fn subscribe(
        &self,
        query: Query,
        callback: SnapshotCallback,
    ) -> StoreResult<ListenerRegistration> {
        let id = self.listener_counter.fetch_add(1, AtomicOrdering::SeqCst);
        self.listeners.lock().unwrap().push(ListenerEntry {
            id,
            query: query.clone(),
            callback: Arc::clone(&callback),
        });
        log::debug!("listener {id} attached to {}", query.collection_path());

        let listeners = Arc::clone(&self.listeners);
        let registration = ListenerRegistration::new(move || {
            listeners.lock().unwrap().retain(|entry| entry.id != id);
            log::debug!("listener {id} detached");
        });

        // Initial delivery happens synchronously, before any later write can
        // race it, and with no lock held.
        callback(self.snapshot_for_query(&query));
        Ok(registration)
    }
}

fn sort_documents(documents: &mut [DocumentSnapshot], order: &OrderBy) {
    documents.sort_by(|left, right| {
        let left_value = left.field(&order.field).cloned().unwrap_or(FieldValue::Null);
        let right_value = right
            .field(&order.field)
            .cloned()
            .unwrap_or(FieldValue::Null);
        let ordering = left_value
            .compare(&right_value)
            .then_with(|| left.id().cmp(right.id()));
        match order.direction {
            OrderDirection::Ascending => ordering,
            OrderDirection::Descending => ordering.reverse(),
        }
    });
}

fn generate_auto_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .map(char::from)
        .take(20)
        .collect()
}
