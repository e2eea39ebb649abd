use crate::dashboard::RefreshOutcome;
use crate::errors::AppError;
use crate::models::{DashboardSnapshot, DateRange, RefreshRequest, Series};
use crate::normalize::{RawPayload, normalize_with};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{Json, body::Bytes, extract::State, http::StatusCode, response::Html};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.config))
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.dashboard.snapshot())
}

pub async fn refresh_dashboard(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<DashboardSnapshot>), AppError> {
    let request = parse_refresh_request(&body)?;
    let range = resolve_range(&state, &request)?;

    let outcome = state.dashboard.refresh(state.upstream.as_ref(), range).await?;

    Ok(match outcome {
        RefreshOutcome::Updated(snapshot) => (StatusCode::OK, Json(snapshot)),
        RefreshOutcome::Skipped(snapshot) => (StatusCode::ACCEPTED, Json(snapshot)),
    })
}

pub async fn normalize_payload(State(state): State<AppState>, body: String) -> Json<Series> {
    Json(normalize_with(
        RawPayload::Text(&body),
        state.dashboard.locale(),
    ))
}

fn parse_refresh_request(body: &[u8]) -> Result<RefreshRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RefreshRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| AppError::bad_request(format!("invalid refresh request: {err}")))
}

fn resolve_range(state: &AppState, request: &RefreshRequest) -> Result<DateRange, AppError> {
    let defaults = state.config.default_range;
    let from = request.from.unwrap_or(defaults.from);
    let to = request.to.unwrap_or(defaults.to);
    DateRange::new(from, to).ok_or_else(|| AppError::bad_request("'from' must not be after 'to'"))
}
