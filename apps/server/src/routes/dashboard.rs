//! Admin dashboard endpoint.

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use chrono::Utc;

use tally_core::Capability;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::views::DashboardView;

/// `GET /dashboard`. Cashiers are sent to the register.
pub async fn dashboard(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Response> {
    if !user.role.allows(Capability::ViewDashboard) {
        return Ok(Redirect::to("/pos").into_response());
    }

    let stats = state.db.reports().dashboard(Utc::now().date_naive()).await?;
    Ok(Json(DashboardView::from(stats)).into_response())
}
