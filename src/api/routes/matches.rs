use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{dedup_by_id, ApiError, Pagination, PaginationMeta};
use crate::models::MatchRecord;
use crate::storage::JsonlReader;

#[derive(Debug, Deserialize)]
pub struct MatchesParams {
    pub player: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct MatchesResponse {
    pub matches: Vec<MatchRecord>,
    pub pagination: PaginationMeta,
}

/// Raw match listing. Unlike the stats endpoints this is an
/// operational surface, so a broken store is reported instead of
/// papered over.
pub async fn list_matches(
    State(state): State<AppState>,
    Query(params): Query<MatchesParams>,
) -> Result<Json<MatchesResponse>, ApiError> {
    let reader: JsonlReader<MatchRecord> = JsonlReader::new(state.storage.matches_path());
    let matches = reader
        .read_all()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let mut matches = dedup_by_id(matches, |m| m.id.as_ref().map(|id| id.as_str()));

    if let Some(ref player) = params.player {
        let needle = player.trim().to_lowercase();
        matches.retain(|m| {
            m.player
                .as_deref()
                .is_some_and(|p| p.trim().to_lowercase() == needle)
        });
    }

    let pagination = Pagination::new(params.page, params.page_size);
    let total = matches.len() as u32;
    let meta = PaginationMeta::new(&pagination, total);

    let page: Vec<MatchRecord> = matches
        .into_iter()
        .skip(pagination.offset() as usize)
        .take(pagination.page_size as usize)
        .collect();

    Ok(Json(MatchesResponse {
        matches: page,
        pagination: meta,
    }))
}
