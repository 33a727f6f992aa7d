//! # Domain Types
//!
//! Core domain types used throughout Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │◄──│    Product      │◄──│  StockMovement  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, name       │   │  sku (unique)   │   │  type, quantity │       │
//! │  └─────────────────┘   │  prices (cents) │   │  previous → new │       │
//! │                        │  stock_quantity │   │  reason, notes  │       │
//! │                        └────────▲────────┘   └────────┬────────┘       │
//! │                                 │ snapshot             │ user_id        │
//! │  ┌─────────────────┐   ┌────────┴────────┐   ┌────────▼────────┐       │
//! │  │      Sale       │──►│    SaleItem     │   │      User       │       │
//! │  │  sale_number    │   │  name/sku/price │   │  role           │       │
//! │  │  totals (cents) │   │  quantity       │   │  admin│cashier  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock movements, sales and sale items are immutable once written.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::policy::Role;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (825 = 8.25%).
///
/// Checkout currently applies [`TaxRate::zero`]; the rate is threaded
/// through the pricing functions so a non-zero rate only needs a config
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product Status
// =============================================================================

/// Whether a product is offered at the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Inactive,
}

impl ProductStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
        }
    }
}

impl Default for ProductStatus {
    fn default() -> Self {
        ProductStatus::Active
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProductStatus::Active),
            "inactive" => Ok(ProductStatus::Inactive),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec!["active".to_string(), "inactive".to_string()],
            }),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product grouping shown in filters and on the POS screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub category_id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Stock Keeping Unit - unique business identifier.
    pub sku: String,

    pub description: Option<String>,

    /// Cost in cents (for profit calculations).
    pub purchase_price_cents: i64,

    /// Price in cents charged at the register.
    pub selling_price_cents: i64,

    /// Whether the cashier may not override the price.
    pub fixed_price: bool,

    /// Units on hand. Never negative.
    pub stock_quantity: i64,

    /// At or below this level the product is "low stock".
    pub min_stock_level: i64,

    pub image_path: Option<String>,

    pub status: ProductStatus,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }

    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// `stock_quantity <= min_stock_level`.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.min_stock_level
    }

    /// Selling price minus purchase price.
    #[inline]
    pub fn profit_per_unit(&self) -> Money {
        self.selling_price() - self.purchase_price()
    }

    /// Profit as a percentage of purchase price, two decimals.
    ///
    /// Zero when the purchase price is zero.
    ///
    /// ```text
    /// purchase 6.00, selling 9.99  →  (9.99 - 6.00) / 6.00 × 100 = 66.50
    /// ```
    pub fn profit_margin_percent(&self) -> Decimal {
        if self.purchase_price_cents == 0 {
            return Decimal::ZERO;
        }
        let purchase = Decimal::from(self.purchase_price_cents);
        let profit = Decimal::from(self.profit_per_unit().cents());
        let mut margin = (profit / purchase * Decimal::ONE_HUNDRED).round_dp(2);
        margin.rescale(2);
        margin
    }
}

/// Validated, cents-denominated product attributes used for create and
/// update. Stock is deliberately absent: it only changes through checkout
/// and stock adjustments (apart from the opening quantity on create).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub category_id: String,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub purchase_price_cents: i64,
    pub selling_price_cents: i64,
    pub fixed_price: bool,
    pub min_stock_level: i64,
    pub image_path: Option<String>,
    pub status: ProductStatus,
}

// =============================================================================
// User
// =============================================================================

/// A staff account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Stock Movement
// =============================================================================

/// The kind of stock change a movement records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Goods received: stock goes up by the quantity.
    In,
    /// Goods removed (sale, damage): stock goes down, floored at zero.
    Out,
    /// Stock count: stock is set to the quantity.
    Adjustment,
}

impl MovementType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable ledger entry.
///
/// Invariant: `new_stock == previous_stock + quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub movement_type: MovementType,
    /// Signed change actually applied.
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub reason: String,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale. Checkout only ever produces `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Completed,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Completed
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// `SALE-YYYYMMDD-NNNN`, unique.
    pub sale_number: String,
    pub cashier_id: String,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub amount_paid_cents: i64,
    pub change_cents: i64,
    pub status: SaleStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }

    #[inline]
    pub fn change_given(&self) -> Money {
        Money::from_cents(self.change_cents)
    }
}

/// A sale line with the product snapshotted at the time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub product_name: String,
    pub product_sku: String,
    pub purchase_price_cents: i64,
    pub selling_price_cents: i64,
    pub quantity: i64,
    /// `selling_price_cents × quantity`.
    pub subtotal_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// `(selling - purchase) × quantity`, from the snapshot.
    pub fn profit(&self) -> Money {
        Money::from_cents(self.selling_price_cents - self.purchase_price_cents)
            .multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(purchase: i64, selling: i64, stock: i64, min: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            category_id: "c-1".to_string(),
            name: "Coca-Cola 330ml".to_string(),
            sku: "COKE-330".to_string(),
            description: None,
            purchase_price_cents: purchase,
            selling_price_cents: selling,
            fixed_price: true,
            stock_quantity: stock,
            min_stock_level: min,
            image_path: None,
            status: ProductStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_low_stock_is_inclusive() {
        assert!(product(100, 200, 5, 5).is_low_stock());
        assert!(product(100, 200, 0, 5).is_low_stock());
        assert!(!product(100, 200, 6, 5).is_low_stock());
    }

    #[test]
    fn test_profit_margin() {
        let p = product(600, 999, 10, 5);
        assert_eq!(p.profit_per_unit().cents(), 399);
        assert_eq!(p.profit_margin_percent().to_string(), "66.50");

        let free = product(0, 999, 10, 5);
        assert_eq!(free.profit_margin_percent(), Decimal::ZERO);
    }

    #[test]
    fn test_sale_item_profit_uses_snapshot() {
        let item = SaleItem {
            id: "i-1".to_string(),
            sale_id: "s-1".to_string(),
            product_id: "p-1".to_string(),
            product_name: "Coca-Cola 330ml".to_string(),
            product_sku: "COKE-330".to_string(),
            purchase_price_cents: 600,
            selling_price_cents: 999,
            quantity: 3,
            subtotal_cents: 2997,
            created_at: Utc::now(),
        };
        assert_eq!(item.profit().cents(), 1197);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("active".parse::<ProductStatus>().unwrap(), ProductStatus::Active);
        assert_eq!("inactive".parse::<ProductStatus>().unwrap(), ProductStatus::Inactive);
        assert!("archived".parse::<ProductStatus>().is_err());
    }

    #[test]
    fn test_movement_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MovementType::Adjustment).unwrap(), "\"adjustment\"");
        let parsed: MovementType = serde_json::from_str("\"in\"").unwrap();
        assert_eq!(parsed, MovementType::In);
    }
}
