//! # Register (POS) Endpoints
//!
//! Product search for the cashier and checkout.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tally_core::checkout::CartLine;
use tally_core::validation::{validate_amount_paid, validate_search_query};
use tally_core::Capability;
use tally_db::CheckoutRequest;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::views::{ProductView, SaleView};

/// Results shown under the register's search box.
pub const SEARCH_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

/// `GET /pos?query=coke`
pub async fn search(
    State(state): State<AppState>,
    user: CurrentUser,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<Vec<ProductView>>> {
    user.require(Capability::ProcessSales)?;
    let Query(params) = params?;

    let Some(query) = validate_search_query(params.query.as_deref())? else {
        return Ok(Json(Vec::new()));
    };

    let products = state.db.products().search_available(&query, SEARCH_LIMIT).await?;
    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub items: Vec<CartLine>,
    pub amount_paid: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub sale: SaleView,
    pub message: &'static str,
}

/// `POST /pos`
pub async fn checkout(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<CheckoutBody>, JsonRejection>,
) -> ApiResult<Json<CheckoutResponse>> {
    user.require(Capability::ProcessSales)?;
    let Json(body) = body?;

    let amount_paid = validate_amount_paid(body.amount_paid)?;
    let done = state
        .db
        .checkout()
        .checkout(CheckoutRequest {
            cashier_id: user.id.clone(),
            lines: body.items,
            amount_paid,
        })
        .await?;

    Ok(Json(CheckoutResponse {
        success: true,
        sale: SaleView::new(done.sale, user.name, Some(done.items)),
        message: "Sale processed successfully",
    }))
}
