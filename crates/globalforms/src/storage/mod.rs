//! Storage layer for globalforms.
//!
//! This module provides `SQLite`-based persistent storage for form
//! submissions and the metadata of their uploaded files. The files
//! themselves live on disk, see [`crate::uploads`].

pub mod migrations;
pub mod schema;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::forms::FormKind;
use crate::submission::{Attachment, NewSubmission, Submission, PENDING};

const SUBMISSION_COLUMNS: &str =
    "id, kind, student_name, student_id, program, submission_date, status, form_data, notes";

impl ToSql for FormKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.slug()))
    }
}

impl FromSql for FormKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let slug = value.as_str()?;
        FormKind::from_slug(slug)
            .ok_or_else(|| FromSqlError::Other(format!("unknown form kind: {slug}").into()))
    }
}

/// Storage engine for form submissions.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a validated submission together with its uploaded files.
    ///
    /// The submission row and its attachment rows are written in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert(&self, new: &NewSubmission, attachments: &[Attachment]) -> Result<Submission> {
        // Stored at fixed precision so text ordering matches time ordering.
        let submission_date = Utc::now().trunc_subsecs(6);
        let form_data = serde_json::to_string(&new.form_data)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            r"
            INSERT INTO submissions
                (kind, student_name, student_id, program, submission_date, status, form_data, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
            params![
                new.kind,
                new.student_name,
                new.student_id,
                new.program,
                submission_date.to_rfc3339_opts(SecondsFormat::Micros, true),
                PENDING,
                form_data,
                new.notes,
            ],
        )?;
        let id = tx.last_insert_rowid();
        for attachment in attachments {
            Self::insert_attachment(&tx, id, attachment)?;
        }
        tx.commit()?;

        debug!(kind = %new.kind, id, files = attachments.len(), "Inserted submission");

        let mut submission = Submission {
            id,
            kind: new.kind,
            student_name: new.student_name.clone(),
            student_id: new.student_id.clone(),
            program: new.program.clone(),
            submission_date,
            status: PENDING.to_string(),
            form_data: new.form_data.clone(),
            notes: new.notes.clone(),
            request_type: String::new(),
            attachments: attachments.to_vec(),
        };
        submission.refresh_request_type();
        Ok(submission)
    }

    /// Record one more uploaded file for an existing submission.
    ///
    /// # Errors
    ///
    /// Returns an error if the submission does not exist or the database
    /// operation fails.
    pub fn add_attachment(&self, submission_id: i64, attachment: &Attachment) -> Result<i64> {
        Self::insert_attachment(&self.conn, submission_id, attachment)?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_attachment(
        conn: &Connection,
        submission_id: i64,
        attachment: &Attachment,
    ) -> Result<()> {
        let size = i64::try_from(attachment.size_bytes).unwrap_or(i64::MAX);
        conn.execute(
            r"
            INSERT INTO attachments
                (submission_id, field, original_name, stored_path, size_bytes, content_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                submission_id,
                attachment.field,
                attachment.original_name,
                attachment.stored_path.to_string_lossy(),
                size,
                attachment.content_hash,
            ],
        )?;
        Ok(())
    }

    /// Files uploaded with a submission, in upload order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn attachments(&self, submission_id: i64) -> Result<Vec<Attachment>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT field, original_name, stored_path, size_bytes, content_hash
            FROM attachments WHERE submission_id = ?1 ORDER BY id
            ",
        )?;
        let attachments = stmt
            .query_map([submission_id], Self::row_to_attachment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(attachments)
    }

    /// Get one submission of the given kind.
    ///
    /// A submission stored under a different kind is treated as missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, kind: FormKind, id: i64) -> Result<Option<Submission>> {
        let sql = format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?1 AND kind = ?2");
        let found = self
            .conn
            .query_row(&sql, params![id, kind], Self::row_to_submission)
            .optional()?;

        match found {
            Some(submission) => Ok(Some(self.with_attachments(submission)?)),
            None => Ok(None),
        }
    }

    /// List submissions newest first, optionally restricted to one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list(&self, kind: Option<FormKind>, skip: usize, limit: usize) -> Result<Vec<Submission>> {
        let skip = i64::try_from(skip).unwrap_or(i64::MAX);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let submissions = if let Some(kind) = kind {
            let sql = format!(
                "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE kind = ?1 \
                 ORDER BY submission_date DESC, id DESC LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![kind, limit, skip], Self::row_to_submission)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        } else {
            let sql = format!(
                "SELECT {SUBMISSION_COLUMNS} FROM submissions \
                 ORDER BY submission_date DESC, id DESC LIMIT ?1 OFFSET ?2"
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![limit, skip], Self::row_to_submission)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        };

        submissions
            .into_iter()
            .map(|s| self.with_attachments(s))
            .collect()
    }

    /// Count submissions, optionally restricted to one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self, kind: Option<FormKind>) -> Result<i64> {
        let count = match kind {
            Some(kind) => self.conn.query_row(
                "SELECT COUNT(*) FROM submissions WHERE kind = ?1",
                [kind],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM submissions", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    /// Delete one submission of the given kind.
    ///
    /// Returns the deleted submission and its attachments so the caller can
    /// remove the files, or `None` if nothing matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, kind: FormKind, id: i64) -> Result<Option<Submission>> {
        let Some(submission) = self.get(kind, id)? else {
            return Ok(None);
        };

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM attachments WHERE submission_id = ?1", [id])?;
        tx.execute(
            "DELETE FROM submissions WHERE id = ?1 AND kind = ?2",
            params![id, kind],
        )?;
        tx.commit()?;

        debug!(%kind, id, "Deleted submission");
        Ok(Some(submission))
    }

    /// Delete every submission, optionally restricted to one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_all(&self, kind: Option<FormKind>) -> Result<BulkDelete> {
        let tx = self.conn.unchecked_transaction()?;

        let (attachments, deleted) = if let Some(kind) = kind {
            let attachments = {
                let mut stmt = tx.prepare(
                    r"
                    SELECT a.field, a.original_name, a.stored_path, a.size_bytes, a.content_hash
                    FROM attachments a JOIN submissions s ON s.id = a.submission_id
                    WHERE s.kind = ?1 ORDER BY a.id
                    ",
                )?;
                let rows = stmt
                    .query_map([kind], Self::row_to_attachment)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            };
            tx.execute(
                "DELETE FROM attachments WHERE submission_id IN \
                 (SELECT id FROM submissions WHERE kind = ?1)",
                [kind],
            )?;
            let deleted = tx.execute("DELETE FROM submissions WHERE kind = ?1", [kind])?;
            (attachments, deleted)
        } else {
            let attachments = {
                let mut stmt = tx.prepare(
                    r"
                    SELECT field, original_name, stored_path, size_bytes, content_hash
                    FROM attachments ORDER BY id
                    ",
                )?;
                let rows = stmt
                    .query_map([], Self::row_to_attachment)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            };
            tx.execute("DELETE FROM attachments", [])?;
            let deleted = tx.execute("DELETE FROM submissions", [])?;
            (attachments, deleted)
        };

        tx.commit()?;

        if deleted > 0 {
            info!(
                kind = kind.map_or("all", FormKind::slug),
                deleted, "Deleted submissions"
            );
        }
        Ok(BulkDelete {
            deleted,
            attachments,
        })
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_submissions = self.count(None)?;

        let mut by_kind = BTreeMap::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT kind, COUNT(*) FROM submissions GROUP BY kind")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, FormKind>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (kind, count) = row?;
                by_kind.insert(kind.slug().to_string(), count);
            }
        }

        let (oldest, newest): (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(submission_date), MAX(submission_date) FROM submissions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let (total_attachments, attachment_bytes): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(size_bytes), 0) FROM attachments",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_submissions,
            by_kind,
            oldest_submission: oldest.as_deref().and_then(parse_timestamp),
            newest_submission: newest.as_deref().and_then(parse_timestamp),
            total_attachments,
            attachment_bytes: u64::try_from(attachment_bytes).unwrap_or(0),
            db_size_bytes,
        })
    }

    fn with_attachments(&self, mut submission: Submission) -> Result<Submission> {
        submission.attachments = self.attachments(submission.id)?;
        Ok(submission)
    }

    fn row_to_submission(row: &rusqlite::Row) -> rusqlite::Result<Submission> {
        let id: i64 = row.get(0)?;
        let date_str: String = row.get(5)?;
        let form_data_str: String = row.get(7)?;

        let submission_date = parse_timestamp(&date_str).unwrap_or_else(|| {
            warn!(id, "Unparseable submission date {date_str:?}");
            DateTime::<Utc>::UNIX_EPOCH
        });

        let form_data = serde_json::from_str(&form_data_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
        })?;

        let mut submission = Submission {
            id,
            kind: row.get(1)?,
            student_name: row.get(2)?,
            student_id: row.get(3)?,
            program: row.get(4)?,
            submission_date,
            status: row.get(6)?,
            form_data,
            notes: row.get(8)?,
            request_type: String::new(),
            attachments: Vec::new(),
        };
        submission.refresh_request_type();
        Ok(submission)
    }

    fn row_to_attachment(row: &rusqlite::Row) -> rusqlite::Result<Attachment> {
        let stored_path: String = row.get(2)?;
        let size: i64 = row.get(3)?;
        Ok(Attachment {
            field: row.get(0)?,
            original_name: row.get(1)?,
            stored_path: PathBuf::from(stored_path),
            size_bytes: u64::try_from(size).unwrap_or(0),
            content_hash: row.get(4)?,
        })
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Result of a bulk delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkDelete {
    /// Number of submissions removed.
    pub deleted: usize,
    /// Files that belonged to the removed submissions.
    pub attachments: Vec<Attachment>,
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    /// Total number of submissions stored.
    pub total_submissions: i64,
    /// Submission count per kind slug. Kinds with no submissions are absent.
    pub by_kind: BTreeMap<String, i64>,
    /// When the oldest submission arrived.
    pub oldest_submission: Option<DateTime<Utc>>,
    /// When the newest submission arrived.
    pub newest_submission: Option<DateTime<Utc>>,
    /// Number of uploaded files on record.
    pub total_attachments: i64,
    /// Combined size of the uploaded files.
    pub attachment_bytes: u64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
