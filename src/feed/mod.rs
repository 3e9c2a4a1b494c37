pub mod documents;
pub mod error;
pub mod live_query;
pub mod post;
pub mod posts;
pub mod upload;

pub use documents::{Comment, FromSnapshot, Like, Post};
pub use error::{FeedError, FeedErrorCode, FeedResult};
pub use live_query::LiveQuery;
pub use post::PostViewModel;
pub use posts::{FeedItem, FeedViewModel};
pub use upload::{StagedImage, UploadViewModel, MAX_CAPTION_LEN};
