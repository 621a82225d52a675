//! Attachment checks done before anything is uploaded.
//!
//! The bytes go to object storage, which this crate does not talk to; what
//! lives here is the validation and naming both task and subtask
//! attachments share, plus the metadata record attached to the task.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use taskflow_core::{ClientError, Result};

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const ALLOWED_CONTENT_TYPES: [&str; 6] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "image/jpeg",
    "image/png",
    "text/plain",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub name: String,
    pub size: u64,
    pub content_type: String,
}

impl UploadCandidate {
    /// Build from a local file; the content type comes from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| ClientError::Validation(format!("cannot read {}: {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            content_type: content_type_for(&name).to_string(),
            name,
            size: metadata.len(),
        })
    }
}

/// Size is checked before type.
pub fn validate_upload(file: &UploadCandidate) -> Result<()> {
    if file.size > MAX_UPLOAD_BYTES {
        return Err(ClientError::Validation(format!(
            "File \"{}\" is too large. Maximum size is 10MB",
            file.name
        )));
    }
    if !ALLOWED_CONTENT_TYPES.contains(&file.content_type.as_str()) {
        return Err(ClientError::Validation(format!(
            "File type \"{}\" is not allowed. Allowed types: PDF, DOC, DOCX, JPG, PNG, TXT",
            file.content_type
        )));
    }
    Ok(())
}

/// Everything outside `[A-Za-z0-9.-]` becomes `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

/// `{millis}_{user}_{sanitized name}`.
pub fn storage_file_name(user_id: &str, name: &str, timestamp_ms: i64) -> String {
    format!("{timestamp_ms}_{user_id}_{}", sanitize_file_name(name))
}

/// Human readable size: base 1024, at most two decimals, trailing zeros dropped.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut exponent = 0;
    let mut unit = 1u64;
    while exponent < UNITS.len() - 1 && bytes >= unit * 1024 {
        unit *= 1024;
        exponent += 1;
    }
    let value = bytes as f64 / unit as f64;
    let rounded = format!("{:.2}", (value * 100.0).round() / 100.0);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[exponent])
}

fn content_type_for(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase()).unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentOwner<'a> {
    Task(&'a str),
    Subtask(&'a str),
}

impl AttachmentOwner<'_> {
    fn id(&self) -> &str {
        match self {
            AttachmentOwner::Task(id) | AttachmentOwner::Subtask(id) => id,
        }
    }

    fn storage_path(&self, file_name: &str) -> String {
        match self {
            AttachmentOwner::Task(_) => format!("tasks/{file_name}"),
            AttachmentOwner::Subtask(id) => format!("subtask/{id}/attachments/{file_name}"),
        }
    }
}

/// Metadata stored on the task once the file is uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub storage_path: String,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: String,
}

/// Validate `file` and work out where it goes and how it will be recorded.
pub fn plan_attachment(
    file: &UploadCandidate,
    owner: AttachmentOwner<'_>,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<Attachment> {
    validate_upload(file)?;
    let millis = now.timestamp_millis();
    let stored_name = storage_file_name(user_id, &file.name, millis);
    Ok(Attachment {
        id: format!("{}_{millis}", owner.id()),
        name: file.name.clone(),
        size: file.size,
        content_type: file.content_type.clone(),
        storage_path: owner.storage_path(&stored_name),
        uploaded_at: now,
        uploaded_by: user_id.to_string(),
    })
}
