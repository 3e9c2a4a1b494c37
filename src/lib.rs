//! Live-sync view models for a photo feed backed by a realtime document
//! store.
//!
//! The crate keeps three client-side view models (the post feed, a single
//! post with its comments, likes, and draft, and the create-post-with-image
//! workflow) consistent with remote collections through streaming query
//! subscriptions. Persistence and delivery are behind the
//! [`store::DocumentStore`] and [`blob::BlobStore`] seams; the bundled
//! in-memory implementations make the whole engine runnable hermetically.
//!
//! ```
//! use std::sync::Arc;
//!
//! use feedsync::feed::FeedViewModel;
//! use feedsync::session::ViewerSession;
//! use feedsync::store::MemoryDocumentStore;
//!
//! let store = Arc::new(MemoryDocumentStore::new());
//! let viewer = ViewerSession::new("uid-1", "Ada");
//! let feed = FeedViewModel::attach(store, Some(viewer)).unwrap();
//! assert!(feed.is_empty());
//! ```

pub mod blob;
pub mod feed;
pub mod session;
pub mod store;
