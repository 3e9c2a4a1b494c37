use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::feed::documents::FromSnapshot;
use crate::store::{
    DocumentStore, ListenerRegistration, Query, QuerySnapshot, SnapshotCallback, StoreResult,
};

/// One live subscription delivering typed rows.
///
/// Every delivery carries the full current ordered sequence; the consumer
/// replaces its copy wholesale, so only the latest snapshot matters.
///
/// Closing is idempotent and gates delivery: a snapshot already on its way
/// when `close` runs is discarded instead of reaching the consumer. An open
/// query closes itself when dropped.
pub struct LiveQuery<T> {
    registration: Option<ListenerRegistration>,
    closed: Arc<AtomicBool>,
    _rows: PhantomData<fn() -> T>,
}

impl<T: FromSnapshot + 'static> LiveQuery<T> {
    pub fn open<F>(store: &dyn DocumentStore, query: Query, on_change: F) -> StoreResult<Self>
    where
        F: Fn(Vec<T>) + Send + Sync + 'static,
    {
        let closed = Arc::new(AtomicBool::new(false));
        let gate = Arc::clone(&closed);
        let callback: SnapshotCallback = Arc::new(move |snapshot: QuerySnapshot| {
            if gate.load(Ordering::SeqCst) {
                log::debug!("snapshot for a closed query discarded");
                return;
            }
            let rows = snapshot.documents().iter().map(T::from_snapshot).collect();
            on_change(rows);
        });
        let registration = store.subscribe(query, callback)?;
        Ok(Self {
            registration: Some(registration),
            closed,
            _rows: PhantomData,
        })
    }
}

impl<T> LiveQuery<T> {
    /// Stops delivery. Safe to call more than once.
    pub fn close(&mut self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            if let Some(mut registration) = self.registration.take() {
                registration.detach();
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        self.close();
    }
}
