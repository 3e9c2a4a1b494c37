use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::blob::BlobError;
use crate::store::StoreError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedErrorCode {
    Unauthenticated,
    MissingImage,
    CaptionTooLong,
    Store,
    Blob,
}

impl FeedErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedErrorCode::Unauthenticated => "feed/unauthenticated",
            FeedErrorCode::MissingImage => "feed/missing-image",
            FeedErrorCode::CaptionTooLong => "feed/caption-too-long",
            FeedErrorCode::Store => "feed/store",
            FeedErrorCode::Blob => "feed/blob",
        }
    }
}

#[derive(Clone, Debug)]
pub struct FeedError {
    pub code: FeedErrorCode,
    message: String,
}

impl FeedError {
    pub fn new(code: FeedErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl Display for FeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl Error for FeedError {}

pub type FeedResult<T> = Result<T, FeedError>;

pub fn unauthenticated(message: impl Into<String>) -> FeedError {
    FeedError::new(FeedErrorCode::Unauthenticated, message)
}

pub fn missing_image(message: impl Into<String>) -> FeedError {
    FeedError::new(FeedErrorCode::MissingImage, message)
}

pub fn caption_too_long(message: impl Into<String>) -> FeedError {
    FeedError::new(FeedErrorCode::CaptionTooLong, message)
}

impl From<StoreError> for FeedError {
    fn from(err: StoreError) -> Self {
        FeedError::new(FeedErrorCode::Store, err.to_string())
    }
}

impl From<BlobError> for FeedError {
    fn from(err: BlobError) -> Self {
        FeedError::new(FeedErrorCode::Blob, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_store_errors_with_their_message() {
        let source = crate::store::error::not_found("No document at 'posts/x'");
        let wrapped = FeedError::from(source);
        assert_eq!(wrapped.code_str(), "feed/store");
        assert!(wrapped.to_string().contains("store/not-found"));
    }
}
