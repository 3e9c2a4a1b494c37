use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlobErrorCode {
    InvalidArgument,
    NotFound,
    NoDownloadUrl,
    Internal,
}

impl BlobErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobErrorCode::InvalidArgument => "blob/invalid-argument",
            BlobErrorCode::NotFound => "blob/not-found",
            BlobErrorCode::NoDownloadUrl => "blob/no-download-url",
            BlobErrorCode::Internal => "blob/internal",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BlobError {
    pub code: BlobErrorCode,
    message: String,
}

impl BlobError {
    pub fn new(code: BlobErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl Display for BlobError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl Error for BlobError {}

pub type BlobResult<T> = Result<T, BlobError>;

pub fn invalid_argument(message: impl Into<String>) -> BlobError {
    BlobError::new(BlobErrorCode::InvalidArgument, message)
}

pub fn not_found(message: impl Into<String>) -> BlobError {
    BlobError::new(BlobErrorCode::NotFound, message)
}

pub fn no_download_url() -> BlobError {
    BlobError::new(
        BlobErrorCode::NoDownloadUrl,
        "The requested object has no download URL",
    )
}

pub fn internal_error(message: impl Into<String>) -> BlobError {
    BlobError::new(BlobErrorCode::Internal, message)
}
