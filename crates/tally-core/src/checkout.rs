//! # Checkout Pricing
//!
//! Pure arithmetic behind a checkout. The database layer reserves stock and
//! loads product snapshots, then hands the priced lines to this module.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate_cart(lines)          non-empty, 1 ≤ quantity ≤ MAX_QUANTITY   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  [reserve stock + load snapshots in tally-db]                           │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  SaleTotals::compute(priced, tax_rate)                                  │
//! │        subtotal = Σ selling × qty                                       │
//! │        tax      = subtotal × rate   (rate is zero today)                │
//! │        total    = subtotal + tax                                        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  totals.settle(amount_paid)    paid < total → InsufficientPayment       │
//! │                                change = max(0, paid − total)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Product, TaxRate};
use crate::validation::{validate_line_quantity, MAX_AMOUNT};

/// One requested cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Rejects empty carts and quantities outside `1..=MAX_QUANTITY`.
///
/// Lines for the same product are kept separate; each reserves its own
/// units and writes its own ledger entry.
pub fn validate_cart(lines: &[CartLine]) -> CoreResult<()> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    for (index, line) in lines.iter().enumerate() {
        if line.product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: format!("items.{index}.product_id"),
            }
            .into());
        }
        validate_line_quantity(&format!("items.{index}.quantity"), line.quantity)?;
    }

    Ok(())
}

/// A cart line after its stock was reserved, carrying the product snapshot
/// that the sale item will store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: String,
    pub product_name: String,
    pub product_sku: String,
    pub purchase_price: Money,
    pub selling_price: Money,
    pub quantity: i64,
    /// Stock before this line's decrement.
    pub stock_before: i64,
}

impl PricedLine {
    /// Builds a priced line from the product row read back after the
    /// decrement (`stock_quantity` is already the new level).
    pub fn from_reserved(product: &Product, quantity: i64) -> Self {
        PricedLine {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_sku: product.sku.clone(),
            purchase_price: product.purchase_price(),
            selling_price: product.selling_price(),
            quantity,
            stock_before: product.stock_quantity + quantity,
        }
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        self.selling_price.multiply_quantity(self.quantity)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        (self.selling_price - self.purchase_price).multiply_quantity(self.quantity)
    }
}

/// Subtotal, tax and total for a set of priced lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Fails with `AmountOutOfRange` when the total does not fit in cents.
    pub fn compute(lines: &[PricedLine], tax_rate: TaxRate) -> CoreResult<Self> {
        let out_of_range = || ValidationError::AmountOutOfRange {
            field: "total".to_string(),
            max: MAX_AMOUNT,
        };

        let subtotal = lines
            .iter()
            .try_fold(Money::zero(), |sum, line| {
                line.selling_price
                    .checked_multiply_quantity(line.quantity)
                    .and_then(|amount| sum.checked_add(amount))
            })
            .ok_or_else(out_of_range)?;
        let tax = subtotal.calculate_tax(tax_rate);
        let total = subtotal.checked_add(tax).ok_or_else(out_of_range)?;

        Ok(SaleTotals {
            subtotal,
            tax,
            total,
        })
    }

    /// Checks the tendered amount and returns the change due.
    pub fn settle(&self, amount_paid: Money) -> CoreResult<Money> {
        if amount_paid < self.total {
            return Err(CoreError::InsufficientPayment {
                total: self.total,
                paid: amount_paid,
            });
        }
        Ok(amount_paid.saturating_sub_floor_zero(self.total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(selling: i64, purchase: i64, quantity: i64) -> PricedLine {
        PricedLine {
            product_id: "p-1".to_string(),
            product_name: "Coca-Cola 330ml".to_string(),
            product_sku: "COKE-330".to_string(),
            purchase_price: Money::from_cents(purchase),
            selling_price: Money::from_cents(selling),
            quantity,
            stock_before: 10,
        }
    }

    #[test]
    fn test_validate_cart() {
        assert!(matches!(validate_cart(&[]), Err(CoreError::EmptyCart)));

        let ok = vec![CartLine { product_id: "p-1".to_string(), quantity: 1 }];
        assert!(validate_cart(&ok).is_ok());

        let zero = vec![CartLine { product_id: "p-1".to_string(), quantity: 0 }];
        assert!(matches!(validate_cart(&zero), Err(CoreError::Validation(_))));

        let blank = vec![CartLine { product_id: " ".to_string(), quantity: 2 }];
        assert!(matches!(validate_cart(&blank), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_validate_cart_caps_quantity() {
        let lines = vec![
            CartLine { product_id: "p-1".to_string(), quantity: 1 },
            CartLine { product_id: "p-2".to_string(), quantity: 100_000_000_000_000_000 },
        ];
        let err = validate_cart(&lines).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: items.1.quantity must be between 1 and 1000000");
    }

    #[test]
    fn test_total_overflow_is_rejected() {
        let err = SaleTotals::compute(&[line(999, 600, 100_000_000_000_000_000)], TaxRate::zero())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::AmountOutOfRange { ref field, .. }) if field == "total"
        ));

        let near_max = line(i64::MAX / 2 + 1, 0, 1);
        assert!(SaleTotals::compute(&[near_max.clone(), near_max], TaxRate::zero()).is_err());
    }

    #[test]
    fn test_three_at_nine_ninety_nine_paid_thirty() {
        let lines = vec![line(999, 600, 3)];
        let totals = SaleTotals::compute(&lines, TaxRate::zero()).unwrap();

        assert_eq!(totals.subtotal.cents(), 2997);
        assert_eq!(totals.tax.cents(), 0);
        assert_eq!(totals.total.cents(), 2997);

        let change = totals.settle(Money::from_cents(3000)).unwrap();
        assert_eq!(change.cents(), 3);
    }

    #[test]
    fn test_exact_payment_gives_zero_change() {
        let totals = SaleTotals::compute(&[line(250, 100, 2)], TaxRate::zero()).unwrap();
        assert_eq!(totals.settle(Money::from_cents(500)).unwrap(), Money::zero());
    }

    #[test]
    fn test_underpayment_rejected() {
        let totals = SaleTotals::compute(&[line(999, 600, 3)], TaxRate::zero()).unwrap();
        let err = totals.settle(Money::from_cents(2000)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientPayment { total, paid }
                if total.cents() == 2997 && paid.cents() == 2000
        ));
    }

    #[test]
    fn test_tax_added_to_total() {
        let totals = SaleTotals::compute(&[line(1000, 500, 1)], TaxRate::from_bps(1000)).unwrap();
        assert_eq!(totals.tax.cents(), 100);
        assert_eq!(totals.total, totals.subtotal + totals.tax);
    }

    #[test]
    fn test_line_profit() {
        assert_eq!(line(999, 600, 3).profit().cents(), 1197);
    }
}
