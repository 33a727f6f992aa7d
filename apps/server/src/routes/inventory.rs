//! # Inventory Endpoints
//!
//! Stock overview and manual stock adjustments.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::HeaderName;
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use serde::{Deserialize, Serialize};

use tally_core::validation::{validate_adjustment, AdjustmentRequest};
use tally_core::Capability;
use tally_db::{Page, Paginated, ProductFilter};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::views::{MovementView, ProductView};

const PER_PAGE: u32 = 20;
const SIDEBAR_LIMIT: u32 = 10;

/// Header carrying the one-shot success message after a redirect.
pub const FLASH_SUCCESS: HeaderName = HeaderName::from_static("x-flash-success");

#[derive(Debug, Deserialize)]
pub struct InventoryParams {
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct InventoryOverview {
    pub products: Paginated<ProductView>,
    pub low_stock_products: Vec<ProductView>,
    pub recent_movements: Vec<MovementView>,
}

/// `GET /inventory?page=n`
pub async fn overview(
    State(state): State<AppState>,
    user: CurrentUser,
    params: Result<Query<InventoryParams>, QueryRejection>,
) -> ApiResult<Json<InventoryOverview>> {
    user.require(Capability::ManageInventory)?;
    let Query(params) = params?;

    let page = Page::new(params.page.unwrap_or(1), PER_PAGE);
    let products = state.db.products().list(&ProductFilter::default(), page).await?;
    let low_stock = state.db.products().low_stock(SIDEBAR_LIMIT).await?;
    let movements = state.db.stock_movements().recent(SIDEBAR_LIMIT).await?;

    Ok(Json(InventoryOverview {
        products: products.map(ProductView::from),
        low_stock_products: low_stock.into_iter().map(ProductView::from).collect(),
        recent_movements: movements.into_iter().map(MovementView::from).collect(),
    }))
}

/// `PATCH /inventory/{product}`
pub async fn adjust(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
    body: Result<Json<AdjustmentRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    user.require(Capability::ManageInventory)?;
    let Json(request) = body?;

    let adjustment = validate_adjustment(&request)?;
    state
        .db
        .inventory()
        .adjust(&product_id, &user.id, &adjustment)
        .await?;

    Ok((
        [(FLASH_SUCCESS, "Stock updated successfully.")],
        Redirect::to("/inventory"),
    ))
}
