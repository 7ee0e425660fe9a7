//! Route handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::{kind_from_slug, AppState};
use crate::error::{Error, Result};
use crate::forms::{self, payload, FormInfo, FormKind};
use crate::storage::StorageStats;
use crate::submission::{Attachment, NewSubmission, Submission};

type SharedState = Arc<AppState>;

/// Body returned by the bulk delete routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReport {
    /// Number of records removed.
    pub deleted: usize,
    /// Human-readable summary.
    pub message: String,
}

/// `skip`/`limit` for per-kind listing.
#[derive(Debug, Default, Deserialize)]
pub(super) struct Page {
    #[serde(default)]
    skip: usize,
    limit: Option<usize>,
}

/// Combined listing across kinds, optionally filtered to one slug.
#[derive(Debug, Default, Deserialize)]
pub(super) struct RequestsQuery {
    kind: Option<String>,
    #[serde(default)]
    skip: usize,
    limit: Option<usize>,
}

/// A file part held in memory until the submission validates.
#[derive(Debug)]
struct UploadedFile {
    field: String,
    file_name: String,
    contents: Bytes,
}

pub(super) async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the FastAPI backend!" }))
}

pub(super) async fn api_root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the I-20 Request API" }))
}

pub(super) async fn debug(
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(received) = body?;
    info!("Debug payload: {received}");
    Ok(Json(json!({
        "status": "received",
        "received_data": received,
        "message": "This is a debug endpoint that echoes back any JSON sent to it",
    })))
}

/// Any path no route matches.
pub(super) async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" })))
}

pub(super) async fn forms() -> Json<Vec<FormInfo>> {
    Json(FormKind::ALL.into_iter().map(FormKind::info).collect())
}

pub(super) async fn stats(State(state): State<SharedState>) -> Result<Json<StorageStats>> {
    let stats = blocking(&state, |state| state.storage()?.stats()).await?;
    Ok(Json(stats))
}

/// Accept a JSON or multipart submission for the kind named in the path.
pub(super) async fn create(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    request: Request,
) -> Result<Json<Submission>> {
    let kind = kind_from_slug(&slug)?;

    let (raw, files) = if is_multipart(&request) {
        read_multipart(kind, request).await?
    } else {
        let Json(value) = Json::<Value>::from_request(request, &()).await?;
        (value, Vec::new())
    };

    let new = match forms::prepare(kind, raw) {
        Ok(new) => new,
        Err(e) => {
            if let Some(errors) = e.field_errors() {
                info!(%kind, failed = errors.len(), "Rejected submission");
            }
            return Err(e);
        }
    };

    let submission = blocking(&state, move |state| store(state, new, &files)).await?;
    info!(
        %kind,
        id = submission.id,
        files = submission.attachments.len(),
        "Accepted submission"
    );
    Ok(Json(submission))
}

pub(super) async fn list_kind(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    page: std::result::Result<Query<Page>, QueryRejection>,
) -> Result<Json<Vec<Submission>>> {
    let kind = kind_from_slug(&slug)?;
    let Query(page) = page?;
    let limit = state.config().page_limit(page.limit);
    let submissions = blocking(&state, move |state| {
        state.storage()?.list(Some(kind), page.skip, limit)
    })
    .await?;
    Ok(Json(submissions))
}

pub(super) async fn list_all(
    State(state): State<SharedState>,
    query: std::result::Result<Query<RequestsQuery>, QueryRejection>,
) -> Result<Json<Vec<Submission>>> {
    let Query(query) = query?;
    let kind = query
        .kind
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .map(kind_from_slug)
        .transpose()?;
    let limit = state.config().page_limit(query.limit);
    let submissions =
        blocking(&state, move |state| state.storage()?.list(kind, query.skip, limit)).await?;
    Ok(Json(submissions))
}

pub(super) async fn get_one(
    State(state): State<SharedState>,
    path: std::result::Result<Path<(String, i64)>, PathRejection>,
) -> Result<Json<Submission>> {
    let Path((slug, id)) = path?;
    let kind = kind_from_slug(&slug)?;
    let submission = blocking(&state, move |state| state.storage()?.get(kind, id))
        .await?
        .ok_or(Error::NotFound { kind, id })?;
    Ok(Json(submission))
}

pub(super) async fn delete_one(
    State(state): State<SharedState>,
    path: std::result::Result<Path<(String, i64)>, PathRejection>,
) -> Result<StatusCode> {
    let Path((slug, id)) = path?;
    let kind = kind_from_slug(&slug)?;
    blocking(&state, move |state| {
        let removed = state.storage()?.delete(kind, id)?;
        let submission = removed.ok_or(Error::NotFound { kind, id })?;
        let failed = state.uploads().remove_all(&submission.attachments);
        if failed > 0 {
            warn!(%kind, id, failed, "Some attachment files were not removed");
        }
        info!("{} request deleted successfully", kind.program());
        Ok(())
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn delete_kind(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<DeleteReport>> {
    let kind = kind_from_slug(&slug)?;
    let deleted = blocking(&state, move |state| remove_all(state, Some(kind))).await?;
    Ok(Json(DeleteReport {
        deleted,
        message: format!("Successfully deleted {deleted} {} requests", kind.program()),
    }))
}

pub(super) async fn delete_everything(
    State(state): State<SharedState>,
) -> Result<Json<DeleteReport>> {
    let deleted = blocking(&state, |state| remove_all(state, None)).await?;
    Ok(Json(DeleteReport {
        deleted,
        message: format!("Successfully deleted {deleted} requests"),
    }))
}

/// Run synchronous storage work on the blocking pool.
async fn blocking<T, F>(state: &SharedState, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || work(state.as_ref()))
        .await
        .map_err(|e| Error::internal(format!("blocking task failed: {e}")))?
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

/// Split a multipart body into form fields and file parts.
///
/// Each accepted file also appears in the fields under its part name with
/// the uploaded file name as the value, so required-file rules see it.
async fn read_multipart(kind: FormKind, request: Request) -> Result<(Value, Vec<UploadedFile>)> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| Error::malformed(e.body_text()))?;

    let mut fields = Map::new();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::malformed(e.body_text()))?
    {
        let Some(name) = field.name().map(payload::to_snake_case) else {
            continue;
        };

        if let Some(file_name) = field.file_name().map(str::to_string) {
            // An untouched file input still sends a part with an empty name.
            if file_name.trim().is_empty() {
                continue;
            }
            if !kind.accepts_file(&name) {
                return Err(Error::upload(name, "unexpected file field"));
            }
            let contents = field
                .bytes()
                .await
                .map_err(|e| Error::upload(name.clone(), e.body_text()))?;
            payload::push_multipart_field(&mut fields, name.clone(), Value::String(file_name.clone()));
            files.push(UploadedFile {
                field: name,
                file_name,
                contents,
            });
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| Error::malformed(e.body_text()))?;
            payload::push_multipart_field(&mut fields, name, payload::multipart_value(&text));
        }
    }

    Ok((Value::Object(fields), files))
}

/// Write the files, then the record. Files are removed again if the record
/// cannot be stored.
fn store(state: &AppState, mut new: NewSubmission, files: &[UploadedFile]) -> Result<Submission> {
    let uploads = state.uploads();
    let mut attachments: Vec<Attachment> = Vec::with_capacity(files.len());

    for file in files {
        match uploads.save(
            new.kind,
            &new.student_id,
            &file.field,
            &file.file_name,
            &file.contents,
        ) {
            Ok(attachment) => attachments.push(attachment),
            Err(e) => {
                uploads.remove_all(&attachments);
                return Err(e);
            }
        }
    }

    record_paths(&mut new.form_data, &attachments);

    let stored = state
        .storage()
        .and_then(|storage| storage.insert(&new, &attachments));
    if stored.is_err() {
        uploads.remove_all(&attachments);
    }
    stored
}

/// Add `<field>_path` entries pointing at the stored files.
fn record_paths(form_data: &mut Value, attachments: &[Attachment]) {
    let Value::Object(map) = form_data else {
        return;
    };
    for attachment in attachments {
        payload::push_multipart_field(
            map,
            format!("{}_path", attachment.field),
            Value::String(attachment.stored_path.to_string_lossy().into_owned()),
        );
    }
}

fn remove_all(state: &AppState, kind: Option<FormKind>) -> Result<usize> {
    let bulk = state.storage()?.delete_all(kind)?;
    let failed = state.uploads().remove_all(&bulk.attachments);
    if failed > 0 {
        warn!(failed, "Some attachment files were not removed");
    }
    Ok(bulk.deleted)
}
