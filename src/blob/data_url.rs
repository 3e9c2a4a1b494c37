use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use percent_encoding::percent_decode_str;

use crate::blob::error::{invalid_argument, BlobResult};

/// Bytes and content type extracted from a data URL.
#[derive(Debug)]
pub struct DecodedDataUrl {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl DecodedDataUrl {
    fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            content_type,
        }
    }
}

/// Renders bytes as a base64 data URL, suitable as an in-memory preview.
pub fn encode_data_url(bytes: &[u8], content_type: &str) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

/// Parses a data URL (e.g. `data:image/png;base64,...`) into bytes.
pub fn decode_data_url(value: &str) -> BlobResult<DecodedDataUrl> {
    if !value.starts_with("data:") {
        return Err(invalid_argument(
            "Data URL must start with the 'data:' scheme.",
        ));
    }

    let comma = value.find(',').ok_or_else(|| {
        invalid_argument("Data URL must contain a comma separating metadata and data segments.")
    })?;

    let metadata = &value[5..comma];
    let data_part = &value[comma + 1..];

    let (is_base64, content_type) = if metadata.is_empty() {
        (false, None)
    } else if let Some(stripped) = metadata.strip_suffix(";base64") {
        (true, non_empty(stripped))
    } else {
        (false, non_empty(metadata))
    };

    let bytes = if is_base64 {
        STANDARD
            .decode(data_part)
            .map_err(|err| invalid_argument(format!("Invalid base64 data URL: {err}")))?
    } else {
        percent_decode_str(data_part)
            .decode_utf8()
            .map_err(|_| invalid_argument("Data URL payload must be valid percent-encoded UTF-8."))?
            .into_owned()
            .into_bytes()
    };

    Ok(DecodedDataUrl::new(bytes, content_type))
}

fn non_empty(content_type: &str) -> Option<String> {
    let content_type = content_type.trim();
    if content_type.is_empty() {
        None
    } else {
        Some(content_type.to_string())
    }
}

/// Guesses an image content type from the leading magic bytes.
pub fn sniff_image_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}
