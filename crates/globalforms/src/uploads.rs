//! Attachment files on disk.
//!
//! Files are grouped as `<root>/<kind dir>/<student id>/<uuid><ext>`. The
//! database only records where each file went; see [`crate::storage`].

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::forms::FormKind;
use crate::submission::Attachment;

/// Folder used when a student id has no usable characters.
const UNKNOWN_FOLDER: &str = "unknown";

/// Longest extension kept from an uploaded file name.
const MAX_EXTENSION_LEN: usize = 10;

/// Writes and removes uploaded files under one root directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at `root`. Nothing is created until the first
    /// save.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one student's files for one kind.
    #[must_use]
    pub fn student_dir(&self, kind: FormKind, student_id: &str) -> PathBuf {
        self.root
            .join(kind.upload_dir())
            .join(sanitize_folder(student_id))
    }

    /// Write an uploaded file and describe it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn save(
        &self,
        kind: FormKind,
        student_id: &str,
        field: &str,
        original_name: &str,
        contents: &[u8],
    ) -> Result<Attachment> {
        let dir = self.student_dir(kind, student_id);
        std::fs::create_dir_all(&dir).map_err(|source| Error::DirectoryCreate {
            path: dir.clone(),
            source,
        })?;

        let file_name = format!("{}{}", Uuid::new_v4(), extension_of(original_name));
        let path = dir.join(file_name);
        std::fs::write(&path, contents)
            .map_err(|e| Error::upload(field, format!("could not store file: {e}")))?;

        debug!(
            %kind,
            field,
            size = contents.len(),
            "Stored upload at {}",
            path.display()
        );

        Ok(Attachment {
            field: field.to_string(),
            original_name: original_name.to_string(),
            stored_path: path,
            size_bytes: contents.len() as u64,
            content_hash: Attachment::compute_hash(contents),
        })
    }

    /// Delete a stored file, then its student folder if that is now empty.
    ///
    /// A file that is already gone is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn remove(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => debug!("Removed upload {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Upload already missing: {}", path.display());
            }
            Err(e) => return Err(e.into()),
        }

        if let Some(parent) = path.parent() {
            if parent.starts_with(&self.root) && parent != self.root {
                // Fails while other files remain, which is fine.
                let _ = std::fs::remove_dir(parent);
            }
        }
        Ok(())
    }

    /// Remove every file in `attachments`, logging failures.
    ///
    /// Returns how many files could not be removed.
    pub fn remove_all(&self, attachments: &[Attachment]) -> usize {
        let mut failed = 0;
        for attachment in attachments {
            if let Err(e) = self.remove(&attachment.stored_path) {
                warn!(
                    field = %attachment.field,
                    "Failed to remove {}: {e}",
                    attachment.stored_path.display()
                );
                failed += 1;
            }
        }
        failed
    }
}

/// Reduce a student id to `[A-Za-z0-9_-]`.
#[must_use]
pub fn sanitize_folder(student_id: &str) -> String {
    let cleaned: String = student_id
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        UNKNOWN_FOLDER.to_string()
    } else {
        cleaned
    }
}

/// `.ext` from an uploaded name, lowercased, or empty.
fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            e.chars()
                .filter(char::is_ascii_alphanumeric)
                .take(MAX_EXTENSION_LEN)
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}
