pub mod client;
pub mod error;
pub mod memory;
pub mod path;
pub mod query;
pub mod snapshot;
pub mod timestamp;
pub mod value;

pub use client::{DocumentStore, ListenerRegistration, SnapshotCallback};
pub use error::{StoreError, StoreErrorCode, StoreResult};
pub use memory::MemoryDocumentStore;
pub use path::{CollectionPath, DocumentPath};
pub use query::{OrderBy, OrderDirection, Query, QuerySnapshot};
pub use snapshot::DocumentSnapshot;
pub use timestamp::Timestamp;
pub use value::{FieldMap, FieldValue};
