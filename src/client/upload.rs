//! File upload helper.
//!
//! The backend receives files inline: the `uploadFile` action carries the
//! file name, a caller-chosen `type` tag and the content as a base64
//! `data:` URL.

use crate::Result;
use base64::Engine as _;
use serde_json::{json, Value};
use std::path::Path;

use super::core::RemoteCallClient;

pub const UPLOAD_ACTION: &str = "uploadFile";

/// `data:<mime>;base64,<content>`
pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime_type};base64,{encoded}")
}

/// MIME type from the file extension, `application/octet-stream` if unknown.
pub fn guess_mime(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

impl RemoteCallClient {
    /// Upload `bytes` through the `uploadFile` action.
    ///
    /// `upload_type` is the backend's tag for where the file belongs (for
    /// example `script` or `thumbnail`); the MIME type only shapes the data URL.
    pub async fn upload_file(
        &self,
        filename: &str,
        bytes: &[u8],
        mime_type: &str,
        upload_type: &str,
    ) -> Result<Value> {
        let payload = json!({
            "filename": filename,
            "content": data_url(mime_type, bytes),
            "type": upload_type,
        });
        self.call(UPLOAD_ACTION, payload, None).await
    }
}
