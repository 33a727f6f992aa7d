//! Login endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::verify_password;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::views::UserView;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = body?;

    let user = state.db.users().get_by_email(request.email.trim()).await?;
    let Some(user) = user.filter(|u| verify_password(&request.password, &u.password_hash)) else {
        warn!(email = %request.email, "Failed login attempt");
        return Err(ApiError::unauthenticated("Invalid credentials"));
    };

    let token = state.jwt.issue(&user)?;
    info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}
