use axum::extract::{Query, State};
use axum::Json;

use crate::api::dto::ExtractQuery;
use crate::api::state::AppState;
use crate::engine::ExtractionResult;
use crate::error::Result;
use crate::input::ImageRequest;

/// `POST /extract-text?lang=<code>`
///
/// Accepts the image as JSON `{ "content": <base64> }`, JSON `{ "url": ... }`,
/// a raw `image/*` body, or a multipart `file` field. The engine is only
/// started once one of those resolved to bytes.
pub async fn extract_text(
    State(state): State<AppState>,
    Query(query): Query<ExtractQuery>,
    request: ImageRequest,
) -> Result<Json<ExtractionResult>> {
    let image = state.resolver.resolve(request).await?;
    tracing::debug!(bytes = image.len(), lang = ?query.lang, "Extracting text");

    let result = state
        .engine
        .extract_text(image, query.lang.as_deref())
        .await?;
    Ok(Json(result))
}
