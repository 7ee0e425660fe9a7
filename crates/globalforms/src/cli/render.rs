//! Text rendering for command output.

use std::fmt::Write as _;

use crate::forms::{FieldErrors, FormInfo};
use crate::storage::StorageStats;
use crate::submission::Submission;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Cut `text` to `width` characters, marking the cut with `...`.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Table of form kinds.
#[must_use]
pub fn forms_table(forms: &[FormInfo]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<36} {:<36} FILES", "SLUG", "PROGRAM");
    for form in forms {
        let files = if form.file_fields.is_empty() {
            "-".to_string()
        } else {
            form.file_fields.join(", ")
        };
        let _ = writeln!(out, "{:<36} {:<36} {files}", form.slug, fit(&form.program, 36));
    }
    out
}

/// The request list as a table.
#[must_use]
pub fn requests_table(submissions: &[Submission]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6}  {:<24} {:<36} {:<24} {:<12} {:<16} STATUS",
        "ID", "KIND", "REQUEST TYPE", "STUDENT", "STUDENT ID", "SUBMITTED"
    );
    for s in submissions {
        let _ = writeln!(
            out,
            "{:>6}  {:<24} {:<36} {:<24} {:<12} {:<16} {}",
            s.id,
            fit(s.kind.slug(), 24),
            fit(&s.request_type, 36),
            fit(&s.student_name, 24),
            fit(&s.student_id, 12),
            s.submission_date.format(DATE_FORMAT),
            s.status
        );
    }
    out
}

/// The request list, one line per request.
#[must_use]
pub fn requests_plain(submissions: &[Submission]) -> String {
    let mut out = String::new();
    for s in submissions {
        let _ = writeln!(
            out,
            "{}  {}  {} ({})  {}",
            s.reference(),
            s.request_type,
            s.student_name,
            s.student_id,
            s.submission_date.format(DATE_FORMAT)
        );
    }
    out
}

/// The detail view of one request.
///
/// # Errors
///
/// Returns an error if the form data cannot be serialized.
pub fn request_detail(s: &Submission) -> serde_json::Result<String> {
    let mut out = String::new();
    let _ = writeln!(out, "{} #{}", s.program, s.id);
    let _ = writeln!(out, "  Request type:  {}", s.request_type);
    let _ = writeln!(out, "  Student:       {} ({})", s.student_name, s.student_id);
    let _ = writeln!(out, "  Submitted:     {}", s.submission_date.format(DATE_FORMAT));
    let _ = writeln!(out, "  Status:        {}", s.status);
    if let Some(notes) = &s.notes {
        let _ = writeln!(out, "  Notes:         {notes}");
    }
    if !s.attachments.is_empty() {
        let _ = writeln!(out, "  Attachments:");
        for a in &s.attachments {
            let _ = writeln!(
                out,
                "    {:<28} {} ({} bytes)",
                a.field, a.original_name, a.size_bytes
            );
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Form data");
    let _ = writeln!(out, "{}", serde_json::to_string_pretty(&s.form_data)?);
    Ok(out)
}

/// Storage statistics.
#[must_use]
pub fn stats_text(stats: &StorageStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Requests:      {}", stats.total_submissions);
    for (kind, count) in &stats.by_kind {
        let _ = writeln!(out, "  {kind:<36} {count}");
    }
    let _ = writeln!(
        out,
        "Attachments:   {} ({} bytes)",
        stats.total_attachments, stats.attachment_bytes
    );
    if let Some(oldest) = stats.oldest_submission {
        let _ = writeln!(out, "Oldest:        {}", oldest.format(DATE_FORMAT));
    }
    if let Some(newest) = stats.newest_submission {
        let _ = writeln!(out, "Newest:        {}", newest.format(DATE_FORMAT));
    }
    let _ = writeln!(out, "Database size: {} bytes", stats.db_size_bytes);
    out
}

/// Field errors, one per line.
#[must_use]
pub fn field_errors(errors: &FieldErrors) -> String {
    let mut out = String::new();
    for (field, message) in errors.iter() {
        let _ = writeln!(out, "  {field}: {message}");
    }
    out
}
