//! # Product Endpoints
//!
//! Back-office catalog management. Stock is only set once, as the opening
//! quantity on create; afterwards it changes through checkout and
//! `/inventory`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use tally_core::validation::{
    validate_product, validate_search_query, validate_stock_level, validate_uuid, ProductDraft,
};
use tally_core::{Capability, ProductStatus};
use tally_db::{Page, Paginated, ProductFilter};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::views::{MovementView, ProductView};

const PER_PAGE: u32 = 15;
const HISTORY_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub low_stock: bool,
    pub page: Option<u32>,
}

/// `GET /products`
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Paginated<ProductView>>> {
    user.require(Capability::ManageProducts)?;
    let Query(params) = params?;

    let status = params
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<ProductStatus>)
        .transpose()?;

    let filter = ProductFilter {
        search: validate_search_query(params.search.as_deref())?,
        category_id: params.category_id.filter(|id| !id.trim().is_empty()),
        status,
        low_stock: params.low_stock,
    };

    let page = Page::new(params.page.unwrap_or(1), PER_PAGE);
    let products = state.db.products().list(&filter, page).await?;
    Ok(Json(products.map(ProductView::from)))
}

#[derive(Debug, Deserialize)]
pub struct CreateProductBody {
    #[serde(flatten)]
    pub draft: ProductDraft,
    #[serde(default)]
    pub stock_quantity: i64,
}

/// `POST /products`
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<CreateProductBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ProductView>)> {
    user.require(Capability::ManageProducts)?;
    let Json(body) = body?;

    validate_uuid("category_id", &body.draft.category_id)?;
    let fields = validate_product(&body.draft)?;
    validate_stock_level("stock_quantity", body.stock_quantity)?;

    let product = state.db.products().insert(&fields, body.stock_quantity).await?;
    info!(product_id = %product.id, sku = %product.sku, "Product created");

    Ok((StatusCode::CREATED, Json(product.into())))
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub product: ProductView,
    pub movements: Vec<MovementView>,
}

/// `GET /products/{id}`
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductDetail>> {
    user.require(Capability::ManageProducts)?;

    let product = state
        .db
        .products()
        .get_with_category(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;
    let movements = state.db.stock_movements().for_product(&id, HISTORY_LIMIT).await?;

    Ok(Json(ProductDetail {
        product: product.into(),
        movements: movements.into_iter().map(MovementView::from).collect(),
    }))
}

/// `PUT /products/{id}`
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> ApiResult<Json<ProductView>> {
    user.require(Capability::ManageProducts)?;
    let Json(draft) = body?;

    validate_uuid("category_id", &draft.category_id)?;
    let fields = validate_product(&draft)?;

    let product = state.db.products().update(&id, &fields).await?;
    info!(product_id = %product.id, sku = %product.sku, "Product updated");

    Ok(Json(product.into()))
}
