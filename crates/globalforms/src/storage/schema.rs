//! `SQLite` schema definitions for globalforms.
//!
//! All form kinds share one `submissions` table; the kind is a column.

/// SQL statement to create the submissions table.
pub const CREATE_SUBMISSIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS submissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL,
    student_name TEXT NOT NULL,
    student_id TEXT NOT NULL,
    program TEXT NOT NULL,
    submission_date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    form_data TEXT NOT NULL,
    notes TEXT
)
";

/// Index for per-kind listing.
pub const CREATE_KIND_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_submissions_kind ON submissions(kind)
";

/// Index for looking up a student's requests.
pub const CREATE_STUDENT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_submissions_student ON submissions(student_id)
";

/// Index for newest-first listing.
pub const CREATE_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_submissions_date ON submissions(submission_date DESC)
";

/// SQL statement to create the attachments table.
pub const CREATE_ATTACHMENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS attachments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    submission_id INTEGER NOT NULL REFERENCES submissions(id) ON DELETE CASCADE,
    field TEXT NOT NULL,
    original_name TEXT NOT NULL,
    stored_path TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    content_hash TEXT NOT NULL
)
";

/// Index for loading a submission's attachments.
pub const CREATE_ATTACHMENT_SUBMISSION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_attachments_submission ON attachments(submission_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_SUBMISSIONS_TABLE,
    CREATE_KIND_INDEX,
    CREATE_STUDENT_INDEX,
    CREATE_DATE_INDEX,
    CREATE_ATTACHMENTS_TABLE,
    CREATE_ATTACHMENT_SUBMISSION_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.trim().is_empty());
        }
    }

    #[test]
    fn test_submissions_table_columns() {
        for column in [
            "kind TEXT NOT NULL",
            "student_name TEXT NOT NULL",
            "student_id TEXT NOT NULL",
            "submission_date TEXT NOT NULL",
            "status TEXT NOT NULL DEFAULT 'pending'",
            "form_data TEXT NOT NULL",
            "notes TEXT",
        ] {
            assert!(CREATE_SUBMISSIONS_TABLE.contains(column), "missing {column}");
        }
    }

    #[test]
    fn test_attachments_cascade() {
        assert!(CREATE_ATTACHMENTS_TABLE.contains("ON DELETE CASCADE"));
    }
}
