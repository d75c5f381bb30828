//! Upload payloads as delivered by a browser file picker (`data:` URLs)

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::sheet::{ContainerKind, ReadError};

/// Encoded file contents plus the name the user picked.
///
/// `contents` is `"<media-type>;base64,<body>"`. A value without a comma is
/// taken to be the bare base64 body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUploadPayload {
    pub contents: String,
    pub filename: String,
}

impl RawUploadPayload {
    pub fn new(contents: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            filename: filename.into(),
        }
    }

    /// Wrap raw file bytes the same way an upload widget would.
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8]) -> Self {
        let filename = filename.into();
        let media_type = media_type_for(&filename);
        Self {
            contents: format!("data:{};base64,{}", media_type, STANDARD.encode(bytes)),
            filename,
        }
    }

    /// Media type from the `data:` header, if there is one.
    pub fn media_type(&self) -> Option<&str> {
        let (header, _) = self.contents.split_once(',')?;
        let header = header.strip_prefix("data:").unwrap_or(header);
        let media = header.split(';').next().unwrap_or_default().trim();
        if media.is_empty() {
            None
        } else {
            Some(media)
        }
    }

    /// Decode the body into raw file bytes.
    pub fn decode(&self) -> Result<Vec<u8>, ReadError> {
        let body = match self.contents.split_once(',') {
            Some((_, body)) => body,
            None => self.contents.as_str(),
        };
        let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        Ok(STANDARD.decode(compact.as_bytes())?)
    }

    /// Container format implied by the filename, falling back to the media type.
    pub fn container_kind(&self) -> ContainerKind {
        ContainerKind::from_filename(&self.filename)
            .or_else(|| self.media_type().and_then(ContainerKind::from_media_type))
            .unwrap_or(ContainerKind::Workbook)
    }
}

fn media_type_for(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("xlsm") => "application/vnd.ms-excel.sheet.macroEnabled.12",
        Some("xls") => "application/vnd.ms-excel",
        Some("ods") => "application/vnd.oasis.opendocument.spreadsheet",
        Some("csv") => "text/csv",
        Some("tsv") => "text/tab-separated-values",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
