//! HTTP handlers for the selection API

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use crate::catalog::CategoryLabel;
use crate::error::AtlasError;
use crate::model::{CountryCode, MemberLimit, ModelError, OrganizationRef};
use crate::session::{Selection, Session};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

impl IntoResponse for AtlasError {
    fn into_response(self) -> Response {
        let status = match &self {
            AtlasError::Model(_) => StatusCode::BAD_REQUEST,
            AtlasError::Superseded { .. } => StatusCode::CONFLICT,
            AtlasError::Sparql(_) => StatusCode::BAD_GATEWAY,
            AtlasError::Dataset(_) | AtlasError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        error_response(status, self.to_string())
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Request body of `POST /api/selection`
///
/// `max_members` is parsed by [`SelectionRequest::limit`], so a bad limit
/// is a [`ModelError`].
#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub country: String,
    #[serde(default)]
    pub max_members: Option<Value>,
}

impl SelectionRequest {
    /// The requested limit: a count, a string such as `"30"` or `"all"`,
    /// or the default when absent
    pub fn limit(&self) -> Result<MemberLimit, ModelError> {
        match &self.max_members {
            None | Some(Value::Null) => Ok(MemberLimit::default()),
            Some(Value::String(s)) => s.parse(),
            Some(other) => other.to_string().parse(),
        }
    }
}

/// Service status
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    /// Whether the reference tables have been loaded
    pub loaded: bool,
    pub organizations: usize,
    pub countries: usize,
    pub generation: u64,
}

/// One member-limit preset
#[derive(Debug, Serialize, Deserialize)]
pub struct PresetEntry {
    pub label: String,
    pub value: MemberLimit,
    pub default: bool,
}

#[derive(Debug, Deserialize)]
pub struct TreatyMembersParams {
    pub organization: String,
}

/// Members of one organization
#[derive(Debug, Serialize, Deserialize)]
pub struct TreatyMembersResponse {
    pub organization: OrganizationRef,
    pub members: Vec<CountryCode>,
}

/// Handler for system status
pub async fn status_handler(State(session): State<Arc<Session>>) -> Json<StatusResponse> {
    let reference = session.loader().get();
    Json(StatusResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
        loaded: reference.is_some(),
        organizations: reference.as_ref().map_or(0, |r| r.membership_sizes.len()),
        countries: reference.as_ref().map_or(0, |r| r.statistics.len()),
        generation: session.latest_generation(),
    })
}

/// Handler listing the member-limit presets
pub async fn presets_handler() -> Json<Vec<PresetEntry>> {
    let default = MemberLimit::default();
    Json(
        MemberLimit::PRESETS
            .iter()
            .map(|limit| PresetEntry {
                label: limit.to_string(),
                value: *limit,
                default: *limit == default,
            })
            .collect(),
    )
}

/// Handler listing every category label, the fallback included
pub async fn categories_handler() -> Json<Vec<&'static str>> {
    Json(CategoryLabel::ALL.iter().map(|c| c.as_str()).collect())
}

/// Handler running a selection
pub async fn select_handler(
    State(session): State<Arc<Session>>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<Selection>, AtlasError> {
    let country = CountryCode::new(&request.country)?;
    let limit = request.limit()?;
    debug!("POST /api/selection {} {}", country, limit);

    let selection = session.select(country, limit).await?;
    Ok(Json(Selection::clone(&selection)))
}

/// Handler returning the last committed selection
pub async fn current_selection_handler(State(session): State<Arc<Session>>) -> Response {
    match session.current().await {
        Some(selection) => Json(Selection::clone(&selection)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "No selection has been made"),
    }
}

/// Handler returning the statistics of one country
pub async fn country_stats_handler(
    State(session): State<Arc<Session>>,
    Path(code): Path<String>,
) -> Result<Response, AtlasError> {
    let code = CountryCode::new(&code)?;
    Ok(match session.country_stats(&code).await? {
        Some(record) => Json(record).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("No statistics for {}", code)),
    })
}

/// Handler listing the current members of one organization
pub async fn treaty_members_handler(
    State(session): State<Arc<Session>>,
    Query(params): Query<TreatyMembersParams>,
) -> Result<Json<TreatyMembersResponse>, AtlasError> {
    let organization = OrganizationRef::new(params.organization.trim())?;
    let members = session.treaty_members(&organization).await?;
    Ok(Json(TreatyMembersResponse {
        organization,
        members,
    }))
}
