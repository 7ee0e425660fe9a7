//! Core submission types for globalforms.
//!
//! A submission is one filled-in form as stored by the server, together with
//! the files that were uploaded alongside it.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::forms::{self, FormKind};

/// Status every new submission starts in.
pub const PENDING: &str = "pending";

/// A validated submission that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubmission {
    /// Which form this is.
    pub kind: FormKind,
    /// `"Given Family"`, or `"Unknown"`.
    pub student_name: String,
    /// Student or employee identifier.
    pub student_id: String,
    /// Program label.
    pub program: String,
    /// The normalized form payload.
    pub form_data: Value,
    /// Copy of the form's long-text field, if it has one.
    pub notes: Option<String>,
}

/// A stored submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Row id, unique across all kinds.
    pub id: i64,
    /// Which form this is.
    pub kind: FormKind,
    /// `"Given Family"`, or `"Unknown"`.
    pub student_name: String,
    /// Student or employee identifier.
    pub student_id: String,
    /// Program label.
    pub program: String,
    /// When the server accepted the submission.
    pub submission_date: DateTime<Utc>,
    /// Review status.
    pub status: String,
    /// The normalized form payload, including `<field>_path` entries for
    /// uploaded files.
    pub form_data: Value,
    /// Copy of the form's long-text field, if it has one.
    #[serde(default)]
    pub notes: Option<String>,
    /// Label for the list view's "Request Type" column.
    #[serde(default)]
    pub request_type: String,
    /// Files uploaded with the submission.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Submission {
    /// Recompute [`Submission::request_type`] from the stored fields.
    pub fn refresh_request_type(&mut self) {
        self.request_type = forms::request_type(self.kind, &self.program, &self.form_data);
    }

    /// `kind:id`, the reference the CLI uses to select a request.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

/// A file uploaded with a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Multipart field the file arrived in.
    pub field: String,
    /// File name as sent by the browser.
    pub original_name: String,
    /// Where the server stored it. Never sent to clients.
    #[serde(skip_serializing, default)]
    pub stored_path: PathBuf,
    /// File size.
    pub size_bytes: u64,
    /// BLAKE3 hex digest of the contents.
    pub content_hash: String,
}

impl Attachment {
    /// Compute the BLAKE3 hash of the given contents.
    #[must_use]
    pub fn compute_hash(contents: &[u8]) -> String {
        blake3::hash(contents).to_hex().to_string()
    }

    /// Check whether `contents` match this attachment's digest.
    #[must_use]
    pub fn matches(&self, contents: &[u8]) -> bool {
        self.content_hash == Self::compute_hash(contents)
    }
}
