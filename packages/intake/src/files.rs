// ABOUTME: Uploaded requirement files and the per-file read pipeline
// ABOUTME: Acceptance rules by extension or MIME type and the Queued -> Reading -> Ready/Failed states

use std::path::Path;

use reqflow_core::generate_file_id;
use serde::Serialize;

use crate::error::{IntakeError, IntakeResult};
use crate::source::{DocumentSource, SourceContent};

pub const ACCEPTED_EXTENSIONS: &[&str] = &["txt", "md", "pdf", "doc", "docx"];

pub const ACCEPTED_MIME_TYPES: &[&str] = &[
    "text/plain",
    "text/markdown",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Queued,
    Reading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOrigin {
    Upload,
    Speech,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeFile {
    pub id: String,
    pub name: String,
    pub mime_type: Option<String>,
    pub size: usize,
    pub origin: FileOrigin,
    pub state: FileState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub(crate) bytes: Vec<u8>,
    #[serde(skip)]
    pub(crate) content: Option<String>,
}

/// Accept a file when either its extension or its declared MIME type is supported
pub fn is_accepted(name: &str, mime_type: Option<&str>) -> bool {
    let extension_ok = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false);

    let mime_ok = mime_type
        .map(|mime| {
            let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
            ACCEPTED_MIME_TYPES.contains(&essence.as_str())
        })
        .unwrap_or(false);

    extension_ok || mime_ok
}

impl IntakeFile {
    /// Queue an upload, rejecting unsupported types
    pub fn upload(name: &str, mime_type: Option<&str>, bytes: Vec<u8>) -> IntakeResult<Self> {
        if name.trim().is_empty() || !is_accepted(name, mime_type) {
            return Err(IntakeError::UnsupportedFile(name.to_string()));
        }
        Ok(Self {
            id: generate_file_id(),
            name: name.to_string(),
            mime_type: mime_type.map(str::to_string),
            size: bytes.len(),
            origin: FileOrigin::Upload,
            state: FileState::Queued,
            error: None,
            bytes,
            content: None,
        })
    }

    /// An accepted dictation transcript; already readable
    pub fn speech(name: String, transcript: String) -> Self {
        Self {
            id: generate_file_id(),
            name,
            mime_type: Some("text/plain".to_string()),
            size: transcript.len(),
            origin: FileOrigin::Speech,
            state: FileState::Ready,
            error: None,
            bytes: Vec::new(),
            content: Some(transcript),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == FileState::Ready
    }

    pub(crate) fn mark_ready(&mut self, content: String) {
        self.state = FileState::Ready;
        self.content = Some(content);
        self.error = None;
        self.bytes = Vec::new();
    }

    pub(crate) fn mark_failed(&mut self, reason: String) {
        self.state = FileState::Failed;
        self.error = Some(reason);
    }
}

impl DocumentSource for IntakeFile {
    fn content_ready(&self) -> SourceContent {
        match self.state {
            FileState::Queued | FileState::Reading => SourceContent::Pending,
            FileState::Ready => SourceContent::Ready(self.content.clone().unwrap_or_default()),
            FileState::Failed => SourceContent::Failed(self.error.clone().unwrap_or_default()),
        }
    }
}
