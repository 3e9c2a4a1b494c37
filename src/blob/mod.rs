pub mod data_url;
pub mod error;
pub mod memory;
pub mod store;

pub use data_url::{decode_data_url, encode_data_url, sniff_image_type, DecodedDataUrl};
pub use error::{BlobError, BlobErrorCode, BlobResult};
pub use memory::MemoryBlobStore;
pub use store::BlobStore;
