use axum::extract::State;
use axum::Json;

use crate::api::dto::VersionResponse;
use crate::api::state::AppState;
use crate::engine::LanguageList;
use crate::error::Result;

/// `GET /`
///
/// Engine version and build options, plus links to the other routes.
pub async fn engine_version(State(state): State<AppState>) -> Result<Json<VersionResponse>> {
    let info = state.engine.version().await?;
    Ok(Json(VersionResponse::from(info)))
}

/// `GET /languages`
pub async fn list_languages(State(state): State<AppState>) -> Result<Json<LanguageList>> {
    let languages = state.engine.languages().await?;
    Ok(Json(languages))
}
