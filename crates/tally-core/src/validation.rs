//! # Validation Module
//!
//! Input validation utilities for Tally POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (apps/server)                                 │
//! │  └── Type validation (JSON deserialization)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Lengths, ranges, formats                                          │
//! │  └── Decimal amounts → integer cents                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock_quantity >= 0)                                       │
//! │  ├── UNIQUE (sku, sale_number, email)                                  │
//! │  └── Foreign key constraints (category must exist)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_sku, validate_quantity};
//!
//! assert!(validate_sku("COKE-330").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use rust_decimal::Decimal;
use serde::Deserialize;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{MovementType, ProductFields, ProductStatus};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Largest accepted product price: 999 999.99.
pub const MAX_PRICE: Money = Money::from_cents(99_999_999);

/// Largest amount representable in cents: 92 233 720 368 547 758.07.
pub const MAX_AMOUNT: Money = Money::from_cents(i64::MAX);

/// Largest quantity accepted for a cart line, a stock movement or a stock
/// figure. Keeps `MAX_PRICE × quantity` well inside an `i64` of cents.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Default low-stock threshold for new products.
pub const DEFAULT_MIN_STOCK_LEVEL: i64 = 5;

// =============================================================================
// String Validators
// =============================================================================

/// Trims `value` and checks it is non-empty and at most `max` characters.
fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    optional_text(field, Some(value), max).map(|v| v.unwrap_or_default())
}

/// Trims `value`, maps blank to `None` and checks the length limit.
fn optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<Option<String>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(Some(value.to_string()))
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
/// - Only letters, digits, hyphens and underscores
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_sku;
///
/// assert!(validate_sku("COKE-330").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<String> {
    let sku = required_text("sku", sku, 100)?;

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(sku)
}

/// Validates a product name: required, at most 255 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    required_text("name", name, 255)
}

/// Validates a category name: required, at most 255 characters.
pub fn validate_category_name(name: &str) -> ValidationResult<String> {
    required_text("name", name, 255)
}

/// Validates an optional description: at most 1000 characters.
pub fn validate_description(description: Option<&str>) -> ValidationResult<Option<String>> {
    optional_text("description", description, 1000)
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query, or `None` when blank (callers return no results).
pub fn validate_search_query(query: Option<&str>) -> ValidationResult<Option<String>> {
    optional_text("query", query, 100)
}

/// Validates the reason of a stock adjustment: required, at most 255.
pub fn validate_reason(reason: &str) -> ValidationResult<String> {
    required_text("reason", reason, 255)
}

/// Validates the optional notes of a stock adjustment: at most 1000.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    optional_text("notes", notes, 1000)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a movement quantity: `1 ≤ qty ≤ MAX_QUANTITY`.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    validate_line_quantity("quantity", qty)
}

/// Same bounds as [`validate_quantity`] under a caller-chosen field name
/// (`items.0.quantity` for cart lines).
pub fn validate_line_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock figure (`stock_quantity`, `min_stock_level`):
/// `0 ≤ value ≤ MAX_QUANTITY`.
pub fn validate_stock_level(field: &str, value: i64) -> ValidationResult<()> {
    if !(0..=MAX_QUANTITY).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Converts a decimal amount to cents.
///
/// Sub-cent precision is a format error; an amount too large for cents is
/// a range error.
fn to_money(field: &str, amount: Decimal) -> ValidationResult<Money> {
    if amount.normalize().scale() > 2 {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must have at most 2 decimal places".to_string(),
        });
    }

    Money::from_decimal(amount).ok_or_else(|| ValidationError::AmountOutOfRange {
        field: field.to_string(),
        max: MAX_AMOUNT,
    })
}

/// Validates a product price: `0 ≤ price ≤ 999 999.99`, two decimals.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tally_core::validation::validate_price;
///
/// assert_eq!(validate_price("selling_price", Decimal::new(999, 2)).unwrap().cents(), 999);
/// assert!(validate_price("selling_price", Decimal::new(-1, 0)).is_err());
/// assert!(validate_price("selling_price", Decimal::new(1_000_000, 0)).is_err());
/// ```
pub fn validate_price(field: &str, amount: Decimal) -> ValidationResult<Money> {
    let money = to_money(field, amount)?;

    if money.is_negative() || money > MAX_PRICE {
        return Err(ValidationError::AmountOutOfRange {
            field: field.to_string(),
            max: MAX_PRICE,
        });
    }

    Ok(money)
}

/// Validates the amount tendered at checkout: `≥ 0`, two decimals.
pub fn validate_amount_paid(amount: Decimal) -> ValidationResult<Money> {
    let money = to_money("amount_paid", amount)?;

    if money.is_negative() {
        return Err(ValidationError::AmountOutOfRange {
            field: "amount_paid".to_string(),
            max: MAX_AMOUNT,
        });
    }

    Ok(money)
}

// =============================================================================
// Stock Adjustment
// =============================================================================

/// A manual stock change as submitted from the inventory screen.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct AdjustmentRequest {
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i64,
    pub reason: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Validated form of [`AdjustmentRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAdjustment {
    pub movement_type: MovementType,
    pub quantity: i64,
    pub reason: String,
    pub notes: Option<String>,
}

pub fn validate_adjustment(request: &AdjustmentRequest) -> ValidationResult<StockAdjustment> {
    validate_quantity(request.quantity)?;
    Ok(StockAdjustment {
        movement_type: request.movement_type,
        quantity: request.quantity,
        reason: validate_reason(&request.reason)?,
        notes: validate_notes(request.notes.as_deref())?,
    })
}

// =============================================================================
// Product Draft
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_min_stock_level() -> i64 {
    DEFAULT_MIN_STOCK_LEVEL
}

/// Product attributes as submitted by a client, prices as decimals.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct ProductDraft {
    pub category_id: String,
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub description: Option<String>,
    #[ts(as = "String")]
    pub purchase_price: Decimal,
    #[ts(as = "String")]
    pub selling_price: Decimal,
    #[serde(default = "default_true")]
    pub fixed_price: bool,
    #[serde(default = "default_min_stock_level")]
    pub min_stock_level: i64,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
}

/// Validates every product rule that does not need the database.
///
/// Category existence and SKU uniqueness are enforced by the repository
/// (foreign key and UNIQUE constraint).
pub fn validate_product(draft: &ProductDraft) -> ValidationResult<ProductFields> {
    let category_id = draft.category_id.trim();
    if category_id.is_empty() {
        return Err(ValidationError::Required {
            field: "category_id".to_string(),
        });
    }

    let purchase = validate_price("purchase_price", draft.purchase_price)?;
    let selling = validate_price("selling_price", draft.selling_price)?;
    if selling < purchase {
        return Err(ValidationError::LessThan {
            field: "selling_price".to_string(),
            other: "purchase_price".to_string(),
        });
    }

    validate_stock_level("min_stock_level", draft.min_stock_level)?;

    Ok(ProductFields {
        category_id: category_id.to_string(),
        name: validate_product_name(&draft.name)?,
        sku: validate_sku(&draft.sku)?,
        description: validate_description(draft.description.as_deref())?,
        purchase_price_cents: purchase.cents(),
        selling_price_cents: selling.cents(),
        fixed_price: draft.fixed_price,
        min_stock_level: draft.min_stock_level,
        image_path: optional_text("image_path", draft.image_path.as_deref(), 500)?,
        status: draft.status,
    })
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_uuid;
///
/// assert!(validate_uuid("product_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("product_id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
