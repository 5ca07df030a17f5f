//! Dashboard aggregates

use axum::extract::State;
use axum::Json;
use certgen_common::db::Event;
use serde::Serialize;

use super::ApiError;
use crate::db::certificates::{self, EventCertificateCount};
use crate::db::events;
use crate::AppState;

/// Number of events shown in the "recent" panel
const RECENT_EVENTS_LIMIT: i64 = 5;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_events: i64,
    pub total_certificates: i64,
    pub recent_events: Vec<Event>,
    pub certificates_by_event: Vec<EventCertificateCount>,
}

/// GET /api/dashboard/stats
pub async fn dashboard_stats(
    State(state): State<AppState>,
) -> std::result::Result<Json<DashboardStats>, ApiError> {
    let total_events = events::count_events(&state.db).await?;
    let total_certificates = certificates::count_certificates(&state.db).await?;
    let recent_events = events::recent_events(&state.db, RECENT_EVENTS_LIMIT).await?;
    let certificates_by_event = certificates::counts_by_event(&state.db).await?;

    Ok(Json(DashboardStats {
        total_events,
        total_certificates,
        recent_events,
        certificates_by_event,
    }))
}
