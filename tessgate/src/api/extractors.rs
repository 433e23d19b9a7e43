use std::path::Path;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{header, StatusCode};
use axum::Json;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;

use crate::api::state::AppState;
use crate::error::{Result, TessgateError};
use crate::input::{ImageRequest, JsonImageBody, UploadedFile};

/// Multipart field that carries the image.
const UPLOAD_FIELD: &str = "file";

impl FromRequest<AppState> for ImageRequest {
    type Rejection = TessgateError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self> {
        match media_type(&req).as_deref() {
            Some("application/json") => {
                let Json(body) = Json::<JsonImageBody>::from_request(req, state).await?;
                Ok(ImageRequest::from_json(body))
            }
            Some(mime) if mime.starts_with("image/") => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|r| map_rejection(r.status(), r.body_text()))?;
                Ok(ImageRequest::from_raw(bytes))
            }
            Some("multipart/form-data") => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|r| map_rejection(r.status(), r.body_text()))?;
                let upload = spool_upload(multipart, &state.config.server.upload_dir).await?;
                Ok(upload.map(ImageRequest::from_upload).unwrap_or_default())
            }
            _ => Ok(ImageRequest::default()),
        }
    }
}

/// The lowercased `type/subtype` of the request, parameters stripped.
fn media_type(req: &Request) -> Option<String> {
    let value = req.headers().get(header::CONTENT_TYPE)?.to_str().ok()?;
    let essence = value.split(';').next()?.trim().to_ascii_lowercase();
    (!essence.is_empty()).then_some(essence)
}

/// Stream the first `file` field to a temporary file in `dir`.
async fn spool_upload(mut multipart: Multipart, dir: &Path) -> Result<Option<UploadedFile>> {
    while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
        if field.name() == Some(UPLOAD_FIELD) {
            return spool_field(field, dir).await.map(Some);
        }
    }
    Ok(None)
}

async fn spool_field(mut field: Field<'_>, dir: &Path) -> Result<UploadedFile> {
    let spooled = tempfile::Builder::new()
        .prefix("tessgate-upload-")
        .tempfile_in(dir)
        .map_err(|e| TessgateError::Upload(format!("Failed to create temporary file: {e}")))?;
    // The TempPath half removes the file if anything below fails.
    let (file, path) = spooled.into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let mut written = 0usize;
    while let Some(chunk) = field.chunk().await.map_err(map_multipart_error)? {
        file.write_all(&chunk)
            .await
            .map_err(|e| TessgateError::Upload(format!("Failed to write upload: {e}")))?;
        written += chunk.len();
    }
    file.flush()
        .await
        .map_err(|e| TessgateError::Upload(format!("Failed to write upload: {e}")))?;

    let upload = UploadedFile::new(path);
    tracing::debug!(path = %upload.path().display(), bytes = written, "Spooled upload");
    Ok(upload)
}

impl From<JsonRejection> for TessgateError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

fn map_json_rejection(rejection: JsonRejection) -> TessgateError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            TessgateError::InvalidBody(format!("Invalid JSON: {}", err.body_text()))
        }
        JsonRejection::JsonSyntaxError(err) => {
            TessgateError::InvalidBody(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::BytesRejection(err) => map_rejection(err.status(), err.body_text()),
        _ => map_rejection(rejection.status(), rejection.body_text()),
    }
}

fn map_multipart_error(err: MultipartError) -> TessgateError {
    map_rejection(err.status(), err.body_text())
}

fn map_rejection(status: StatusCode, text: String) -> TessgateError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        TessgateError::PayloadTooLarge(text)
    } else if status.is_client_error() {
        TessgateError::InvalidBody(text)
    } else {
        TessgateError::Internal(text)
    }
}
