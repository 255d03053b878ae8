//! Decoding and inspection of uploaded page images.
//!
//! Pages arrive as base64 text (optionally as a `data:` URL, which is what a
//! browser `FileReader` produces). Only PNG and JPEG are accepted; the format
//! is sniffed from the bytes and the header is read for dimensions, but the
//! pixels are never decoded or re-encoded.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageFormat, ImageReader};

use crate::error::CoreError;
use crate::hashing::sha256_hex;

/// Image formats a page may be stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PageMimeType {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

impl PageMimeType {
    /// MIME type string, also the stored column value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// File extension used for archive entries and downloads.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for PageMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageMimeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image/png" => Ok(Self::Png),
            "image/jpeg" => Ok(Self::Jpeg),
            other => Err(CoreError::Validation(format!(
                "Unsupported page type '{other}'. Must be image/png or image/jpeg"
            ))),
        }
    }
}

impl TryFrom<String> for PageMimeType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A validated page payload ready to be persisted.
#[derive(Debug, Clone)]
pub struct DecodedPage {
    pub bytes: Vec<u8>,
    pub mime_type: PageMimeType,
    pub width: u32,
    pub height: u32,
    pub checksum: String,
}

impl DecodedPage {
    /// Payload size in bytes.
    pub fn size(&self) -> i64 {
        self.bytes.len() as i64
    }
}

/// Decode a base64 page payload and check that it is a PNG or JPEG image.
pub fn decode_page_payload(data: &str) -> Result<DecodedPage, CoreError> {
    let encoded = strip_data_url_prefix(data.trim());
    let bytes = STANDARD.decode(encoded).map_err(|e| {
        CoreError::Validation(format!("Page data is not valid base64: {e}"))
    })?;
    inspect_page_bytes(bytes)
}

/// Validate raw page bytes: sniff the format and read the image header.
pub fn inspect_page_bytes(bytes: Vec<u8>) -> Result<DecodedPage, CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::Validation("Page data is empty".to_string()));
    }

    let mime_type = match image::guess_format(&bytes) {
        Ok(ImageFormat::Png) => PageMimeType::Png,
        Ok(ImageFormat::Jpeg) => PageMimeType::Jpeg,
        _ => {
            return Err(CoreError::Validation(
                "The uploaded image is neither a valid JPEG nor PNG image".to_string(),
            ))
        }
    };

    let (width, height) = ImageReader::with_format(Cursor::new(&bytes), image_format(mime_type))
        .into_dimensions()
        .map_err(|e| CoreError::Validation(format!("Unreadable {mime_type} header: {e}")))?;

    let checksum = sha256_hex(&bytes);
    Ok(DecodedPage {
        bytes,
        mime_type,
        width,
        height,
        checksum,
    })
}

fn image_format(mime_type: PageMimeType) -> ImageFormat {
    match mime_type {
        PageMimeType::Png => ImageFormat::Png,
        PageMimeType::Jpeg => ImageFormat::Jpeg,
    }
}

/// Drop a leading `data:<mime>;base64,` if present.
fn strip_data_url_prefix(data: &str) -> &str {
    if data.starts_with("data:") {
        match data.find(',') {
            Some(idx) => &data[idx + 1..],
            None => data,
        }
    } else {
        data
    }
}
