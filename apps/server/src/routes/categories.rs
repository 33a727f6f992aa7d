//! Category endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use tally_core::validation::{validate_category_name, validate_description};
use tally_core::Capability;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::views::CategoryView;

#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// `GET /categories`
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<CategoryView>>> {
    user.require(Capability::ManageCategories)?;

    let rows = state.db.categories().list_with_counts().await?;
    Ok(Json(rows.into_iter().map(CategoryView::from).collect()))
}

/// `POST /categories`
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<CategoryBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CategoryView>)> {
    user.require(Capability::ManageCategories)?;
    let Json(body) = body?;

    let name = validate_category_name(&body.name)?;
    let description = validate_description(body.description.as_deref())?;

    let category = state
        .db
        .categories()
        .insert(&name, description.as_deref())
        .await?;
    info!(category_id = %category.id, name = %category.name, "Category created");

    Ok((StatusCode::CREATED, Json(category.into())))
}
