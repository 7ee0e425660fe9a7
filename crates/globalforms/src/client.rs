//! REST client for a running portal.
//!
//! [`PortalClient`] runs the same local rules as the server before it sends
//! anything, so most mistakes surface without a round trip. The server still
//! has the final say.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::forms::{self, payload, FieldErrors, FormInfo, FormKind};
use crate::server::DeleteReport;
use crate::storage::StorageStats;
use crate::submission::{NewSubmission, Submission};

/// A local file to send with a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Multipart field name, e.g. `i94`.
    pub field: String,
    /// File on disk.
    pub path: PathBuf,
}

impl FileUpload {
    /// Pair a field name with a file.
    #[must_use]
    pub fn new(field: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            field: payload::to_snake_case(&field.into()),
            path: path.into(),
        }
    }

    /// Parse `field=path`.
    ///
    /// # Errors
    ///
    /// Returns an error if either side is empty or the `=` is missing.
    pub fn parse(arg: &str) -> Result<Self> {
        match arg.split_once('=') {
            Some((field, path)) if !field.trim().is_empty() && !path.trim().is_empty() => {
                Ok(Self::new(field.trim(), path.trim()))
            }
            _ => Err(Error::malformed(format!(
                "expected an attachment as field=path, got '{arg}'"
            ))),
        }
    }

    /// The file name sent to the server.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned())
    }
}

impl FromStr for FileUpload {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Outcome of deleting several requests one by one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    /// `kind:id` references that were deleted.
    pub deleted: Vec<String>,
    /// `kind:id` references that could not be deleted.
    pub failed: Vec<String>,
}

impl DeleteSummary {
    /// Whether every request was deleted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// One-line summary for display.
    #[must_use]
    pub fn message(&self) -> String {
        if self.is_complete() {
            format!("Deleted {} requests", self.deleted.len())
        } else {
            "Some requests failed to delete".to_string()
        }
    }
}

/// HTTP client for the portal API.
#[derive(Debug, Clone)]
pub struct PortalClient {
    base_url: String,
    http: reqwest::Client,
}

impl PortalClient {
    /// Create a client for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    /// Create a client from the `[client]` config section.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.client.base_url.clone(), config.client_timeout())
    }

    /// The server root this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url)
    }

    /// Run the local rules on a form and its attachments without sending.
    ///
    /// Each attachment counts as present under its field name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upload`] for a file field the kind does not accept,
    /// and whatever [`forms::prepare`] rejects.
    pub fn prepare(kind: FormKind, form: Value, uploads: &[FileUpload]) -> Result<NewSubmission> {
        for upload in uploads {
            if !kind.accepts_file(&upload.field) {
                return Err(Error::upload(upload.field.clone(), "unexpected file field"));
            }
        }
        forms::prepare(kind, with_file_markers(form, uploads)?)
    }

    /// Validate locally, then submit a form with optional attachments.
    ///
    /// Sends JSON when there are no attachments and multipart otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when local or server rules fail,
    /// [`Error::Upload`] when an attachment is not accepted or cannot be
    /// read, and [`Error::Server`] for any other rejection.
    pub async fn submit(
        &self,
        kind: FormKind,
        form: Value,
        uploads: &[FileUpload],
    ) -> Result<Submission> {
        let prepared = Self::prepare(kind, form, uploads)?;
        let url = self.url(&format!("{}/", kind.slug()));
        debug!(%kind, files = uploads.len(), "Submitting to {url}");

        let request = if uploads.is_empty() {
            self.http.post(&url).json(&prepared.form_data)
        } else {
            self.http
                .post(&url)
                .multipart(multipart_form(&prepared.form_data, uploads).await?)
        };

        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// List requests newest first, for one kind or across all kinds.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list(
        &self,
        kind: Option<FormKind>,
        skip: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Submission>> {
        let url = match kind {
            Some(kind) => self.url(&format!("{}/", kind.slug())),
            None => self.url("requests/"),
        };
        let mut query = vec![("skip", skip.to_string())];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        let response = check(self.http.get(&url).query(&query).send().await?).await?;
        Ok(response.json().await?)
    }

    /// Fetch one request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the server has no such request.
    pub async fn get(&self, kind: FormKind, id: i64) -> Result<Submission> {
        let url = self.url(&format!("{}/{id}", kind.slug()));
        let response = check(self.http.get(&url).send().await?)
            .await
            .map_err(|e| scope_not_found(e, kind, id))?;
        Ok(response.json().await?)
    }

    /// Delete one request and its files.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the server has no such request.
    pub async fn delete(&self, kind: FormKind, id: i64) -> Result<()> {
        let url = self.url(&format!("{}/{id}", kind.slug()));
        check(self.http.delete(&url).send().await?)
            .await
            .map_err(|e| scope_not_found(e, kind, id))?;
        Ok(())
    }

    /// Delete several requests, continuing past failures.
    pub async fn delete_many(&self, targets: &[(FormKind, i64)]) -> DeleteSummary {
        let mut summary = DeleteSummary::default();
        for &(kind, id) in targets {
            let reference = format!("{kind}:{id}");
            match self.delete(kind, id).await {
                Ok(()) => summary.deleted.push(reference),
                Err(e) => {
                    warn!("Failed to delete {reference}: {e}");
                    summary.failed.push(reference);
                }
            }
        }
        summary
    }

    /// Delete every request of one kind, or of all kinds.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_all(&self, kind: Option<FormKind>) -> Result<DeleteReport> {
        let url = match kind {
            Some(kind) => self.url(&format!("{}/", kind.slug())),
            None => self.url("requests/"),
        };
        let response = check(self.http.delete(&url).send().await?).await?;
        Ok(response.json().await?)
    }

    /// The form kinds the server accepts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn forms(&self) -> Result<Vec<FormInfo>> {
        self.get_json("forms/").await
    }

    /// Storage statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn stats(&self) -> Result<StorageStats> {
        self.get_json("stats/").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = check(self.http.get(self.url(path)).send().await?).await?;
        Ok(response.json().await?)
    }
}

/// Put each upload's file name under its field so required-file rules see it.
fn with_file_markers(form: Value, uploads: &[FileUpload]) -> Result<Value> {
    let Value::Object(map) = form else {
        return Err(Error::malformed("expected a JSON object"));
    };
    let mut map = payload::unwrap_envelope(map);
    for upload in uploads {
        map.entry(upload.field.clone())
            .or_insert_with(|| Value::String(upload.file_name()));
    }
    Ok(Value::Object(map))
}

/// Text parts for every field except the uploaded ones, then the files.
async fn multipart_form(form_data: &Value, uploads: &[FileUpload]) -> Result<Form> {
    let empty = Map::new();
    let fields = form_data.as_object().unwrap_or(&empty);

    let mut form = Form::new();
    for (name, value) in fields {
        if uploads.iter().any(|u| &u.field == name) {
            continue;
        }
        let text = match value {
            Value::Array(_) | Value::Object(_) => value.to_string(),
            scalar => payload::value_text(scalar),
        };
        form = form.text(name.clone(), text);
    }

    for upload in uploads {
        let contents = read_upload(&upload.field, &upload.path).await?;
        form = form.part(
            upload.field.clone(),
            Part::bytes(contents).file_name(upload.file_name()),
        );
    }
    Ok(form)
}

async fn read_upload(field: &str, path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| Error::upload(field, format!("cannot read {}: {e}", path.display())))
}

/// Turn a non-2xx response into an error.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: Value = response.json().await.unwrap_or(Value::Null);
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        if let Some(errors) = body
            .get("errors")
            .and_then(|e| serde_json::from_value::<FieldErrors>(e.clone()).ok())
        {
            return Err(Error::Validation(errors));
        }
    }

    let detail = body.get("detail").map_or_else(
        || status.canonical_reason().unwrap_or("request failed").to_string(),
        payload::value_text,
    );
    Err(Error::Server {
        status: status.as_u16(),
        detail,
    })
}

fn scope_not_found(error: Error, kind: FormKind, id: i64) -> Error {
    match error {
        Error::Server { status: 404, .. } => Error::NotFound { kind, id },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{self, AppState};
    use crate::storage::Storage;
    use crate::uploads::UploadStore;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::net::TcpListener;

    async fn spawn_server() -> (PortalClient, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(AppState::new(
            Storage::open_in_memory().unwrap(),
            UploadStore::new(dir.path().join("uploads")),
            Config::default(),
        ));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, server::router(state)).await.unwrap();
        });

        let client = PortalClient::new(format!("http://{addr}/"), Duration::from_secs(5)).unwrap();
        (client, dir)
    }

    fn exit_form() -> Value {
        json!({
            "ucfId": "7654321",
            "givenName": "Kenji",
            "familyName": "Sato",
            "ucfEmail": "kenji@ucf.edu",
            "departureDate": "2025-08-01",
            "workAuthorizationAcknowledgment": true,
            "cptOptAcknowledgment": "true",
            "financialObligationsAcknowledgment": "yes"
        })
    }

    #[test]
    fn test_file_upload_parse() {
        let upload = FileUpload::parse("flightItinerary=./docs/itinerary.pdf").unwrap();
        assert_eq!(upload.field, "flight_itinerary");
        assert_eq!(upload.path, PathBuf::from("./docs/itinerary.pdf"));
        assert_eq!(upload.file_name(), "itinerary.pdf");

        assert!(FileUpload::parse("no-equals").is_err());
        assert!(FileUpload::parse("=path").is_err());
        assert!(FileUpload::parse("field=").is_err());
    }

    #[test]
    fn test_delete_summary_message() {
        let mut summary = DeleteSummary {
            deleted: vec!["exit-forms:1".into(), "exit-forms:2".into()],
            failed: Vec::new(),
        };
        assert!(summary.is_complete());
        assert_eq!(summary.message(), "Deleted 2 requests");

        summary.failed.push("exit-forms:3".into());
        assert_eq!(summary.message(), "Some requests failed to delete");
    }

    #[test]
    fn test_with_file_markers_keeps_existing_value() {
        let uploads = [
            FileUpload::new("i94", "/tmp/i94.pdf"),
            FileUpload::new("passport", "/tmp/p.jpg"),
        ];
        let marked = with_file_markers(json!({ "i94": "already.pdf" }), &uploads).unwrap();
        assert_eq!(marked["i94"], "already.pdf");
        assert_eq!(marked["passport"], "p.jpg");
        assert!(with_file_markers(json!("text"), &uploads).is_err());
    }

    #[test]
    fn test_prepare_counts_attachments_as_present() {
        let prepared = PortalClient::prepare(
            FormKind::ExitForm,
            exit_form(),
            &[FileUpload::new("flightItinerary", "/tmp/trip.pdf")],
        )
        .unwrap();
        assert_eq!(prepared.form_data["flight_itinerary"], "trip.pdf");
        assert_eq!(prepared.student_id, "7654321");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = PortalClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("forms/"), "http://localhost:8000/api/forms/");
    }

    #[tokio::test]
    async fn test_local_validation_fails_fast() {
        // Nothing listens here; a request would fail with Http instead.
        let client = PortalClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = client
            .submit(FormKind::ExitForm, json!({ "ucfId": "1" }), &[])
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.field_errors().unwrap().contains("ucf_email"));

        let err = client
            .submit(
                FormKind::DocumentRequest,
                json!({}),
                &[FileUpload::new("i94", "/tmp/x.pdf")],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upload { .. }));
    }

    #[tokio::test]
    async fn test_submit_list_get_delete() {
        let (client, _dir) = spawn_server().await;

        let created = client.submit(FormKind::ExitForm, exit_form(), &[]).await.unwrap();
        assert_eq!(created.kind, FormKind::ExitForm);
        assert_eq!(created.student_id, "7654321");

        let listed = client.list(Some(FormKind::ExitForm), 0, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        let all = client.list(None, 0, Some(10)).await.unwrap();
        assert_eq!(all.len(), 1);

        let fetched = client.get(FormKind::ExitForm, created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);

        client.delete(FormKind::ExitForm, created.id).await.unwrap();
        let err = client.get(FormKind::ExitForm, created.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { id, .. } if id == created.id));
    }

    #[tokio::test]
    async fn test_submit_with_attachment() {
        let (client, dir) = spawn_server().await;
        let file = dir.path().join("itinerary.pdf");
        std::fs::write(&file, b"%PDF itinerary").unwrap();

        let mut form = exit_form();
        form["remarks"] = json!("Leaving after finals");
        let created = client
            .submit(
                FormKind::ExitForm,
                form,
                &[FileUpload::new("flight_itinerary", &file)],
            )
            .await
            .unwrap();

        assert_eq!(created.attachments.len(), 1);
        assert_eq!(created.attachments[0].original_name, "itinerary.pdf");
        assert_eq!(created.attachments[0].size_bytes, 14);
        assert!(created.attachments[0].matches(b"%PDF itinerary"));
        assert_eq!(created.notes.as_deref(), Some("Leaving after finals"));
        assert_eq!(created.form_data["flight_itinerary"], "itinerary.pdf");

        let stats = client.stats().await.unwrap();
        assert_eq!(stats.total_attachments, 1);
    }

    #[tokio::test]
    async fn test_json_looking_remarks_survive_multipart() {
        let (client, dir) = spawn_server().await;
        let file = dir.path().join("itinerary.pdf");
        std::fs::write(&file, b"%PDF").unwrap();

        let mut form = exit_form();
        form["remarks"] = json!("[1, 2]");
        let created = client
            .submit(
                FormKind::ExitForm,
                form,
                &[FileUpload::new("flight_itinerary", &file)],
            )
            .await
            .unwrap();
        assert_eq!(created.notes.as_deref(), Some("[1,2]"));
    }

    #[tokio::test]
    async fn test_delete_many_and_delete_all() {
        let (client, _dir) = spawn_server().await;
        let first = client.submit(FormKind::ExitForm, exit_form(), &[]).await.unwrap();
        client.submit(FormKind::ExitForm, exit_form(), &[]).await.unwrap();
        client.submit(FormKind::ExitForm, exit_form(), &[]).await.unwrap();

        let summary = client
            .delete_many(&[(FormKind::ExitForm, first.id), (FormKind::ExitForm, 9999)])
            .await;
        assert_eq!(summary.deleted, vec![format!("exit-forms:{}", first.id)]);
        assert_eq!(summary.failed, vec!["exit-forms:9999".to_string()]);

        let report = client.delete_all(Some(FormKind::ExitForm)).await.unwrap();
        assert_eq!(report.deleted, 2);
        assert_eq!(report.message, "Successfully deleted 2 Exit Form requests");
    }

    #[tokio::test]
    async fn test_forms_listing() {
        let (client, _dir) = spawn_server().await;
        let forms = client.forms().await.unwrap();
        assert_eq!(forms.len(), FormKind::ALL.len());
        assert!(forms.iter().any(|f| f.slug == "virtual-checkin"));
    }
}
