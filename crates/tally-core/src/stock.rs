//! # Stock Movement Policy
//!
//! Pure rules for how a manual stock change moves the on-hand quantity.
//! The database layer applies the resulting [`StockTransition`] and writes
//! it to the ledger unchanged.
//!
//! ```text
//! ┌────────────┬──────────────────────────┬──────────────────────────┐
//! │ type       │ new stock                │ ledger quantity          │
//! ├────────────┼──────────────────────────┼──────────────────────────┤
//! │ in         │ previous + q             │ +q                       │
//! │ out        │ max(0, previous - q)     │ new - previous           │
//! │ adjustment │ q                        │ q - previous             │
//! └────────────┴──────────────────────────┴──────────────────────────┘
//! ```
//!
//! An `out` larger than the stock on hand is clamped at zero. The ledger
//! records the change that actually happened, so
//! `new = previous + quantity` holds for every entry, and the requested
//! amount is kept in the movement notes.

use crate::error::{CoreResult, ValidationError};
use crate::types::MovementType;
use crate::validation::validate_quantity;

/// The outcome of applying one movement to a stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockTransition {
    pub previous: i64,
    pub new: i64,
    /// Signed change applied; always `new - previous`.
    pub delta: i64,
    /// The signed change that was asked for. Differs from `delta` only
    /// when an `out` was clamped.
    pub requested: i64,
}

impl StockTransition {
    /// True when an `out` asked for more than was on hand.
    #[inline]
    pub fn was_clamped(&self) -> bool {
        self.delta != self.requested
    }

    /// Movement notes with the clamping remark appended when it applies.
    ///
    /// ```rust
    /// use tally_core::stock::apply_movement;
    /// use tally_core::types::MovementType;
    ///
    /// let t = apply_movement(MovementType::Out, 5, 20).unwrap();
    /// assert_eq!(
    ///     t.notes_with_clamp(Some("damaged")).as_deref(),
    ///     Some("damaged; requested -20, clamped at zero")
    /// );
    /// ```
    pub fn notes_with_clamp(&self, notes: Option<&str>) -> Option<String> {
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());
        if !self.was_clamped() {
            return notes.map(str::to_string);
        }
        let remark = format!("requested {}, clamped at zero", self.requested);
        Some(match notes {
            Some(n) => format!("{n}; {remark}"),
            None => remark,
        })
    }
}

/// Computes the stock transition for a manual movement.
///
/// `quantity` must be within `1..=MAX_QUANTITY` for every type; an
/// `adjustment` to zero is expressed as an `out` of the full stock.
pub fn apply_movement(
    movement_type: MovementType,
    previous: i64,
    quantity: i64,
) -> CoreResult<StockTransition> {
    validate_quantity(quantity)?;

    let (new, requested) = match movement_type {
        MovementType::In => {
            let new = previous
                .checked_add(quantity)
                .ok_or_else(|| ValidationError::OutOfRange {
                    field: "stock_quantity".to_string(),
                    min: 0,
                    max: i64::MAX,
                })?;
            (new, quantity)
        }
        MovementType::Out => ((previous - quantity).max(0), -quantity),
        MovementType::Adjustment => (quantity, quantity - previous),
    };

    Ok(StockTransition {
        previous,
        new,
        delta: new - previous,
        requested,
    })
}

/// The transition a checkout line produces: a plain decrement that the
/// conditional update has already guaranteed will not go negative.
pub fn sale_transition(previous: i64, quantity: i64) -> StockTransition {
    StockTransition {
        previous,
        new: previous - quantity,
        delta: -quantity,
        requested: -quantity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_in_adds() {
        let t = apply_movement(MovementType::In, 8, 12).unwrap();
        assert_eq!((t.previous, t.new, t.delta), (8, 20, 12));
        assert!(!t.was_clamped());
    }

    #[test]
    fn test_adjustment_sets_absolute_target() {
        let t = apply_movement(MovementType::Adjustment, 8, 15).unwrap();
        assert_eq!((t.previous, t.new, t.delta), (8, 15, 7));

        let down = apply_movement(MovementType::Adjustment, 8, 3).unwrap();
        assert_eq!(down.delta, -5);
    }

    #[test]
    fn test_out_within_stock() {
        let t = apply_movement(MovementType::Out, 10, 4).unwrap();
        assert_eq!((t.new, t.delta), (6, -4));
        assert_eq!(t.notes_with_clamp(Some("broken")).as_deref(), Some("broken"));
    }

    #[test]
    fn test_out_clamps_at_zero_and_logs_actual_change() {
        let t = apply_movement(MovementType::Out, 5, 20).unwrap();
        assert_eq!(t.new, 0);
        assert_eq!(t.delta, -5);
        assert_eq!(t.requested, -20);
        assert!(t.was_clamped());
        assert_eq!(t.previous + t.delta, t.new);
        assert_eq!(
            t.notes_with_clamp(None).as_deref(),
            Some("requested -20, clamped at zero")
        );
    }

    #[test]
    fn test_ledger_identity_holds_for_every_type() {
        for movement_type in [MovementType::In, MovementType::Out, MovementType::Adjustment] {
            for previous in [0, 1, 7, 50] {
                for quantity in [1, 7, 100] {
                    let t = apply_movement(movement_type, previous, quantity).unwrap();
                    assert_eq!(t.previous + t.delta, t.new);
                    assert!(t.new >= 0);
                }
            }
        }
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let err = apply_movement(MovementType::In, 5, 0).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::MustBePositive { .. })));
    }

    #[test]
    fn test_oversized_quantity_rejected() {
        for movement_type in [MovementType::In, MovementType::Out, MovementType::Adjustment] {
            let err = apply_movement(movement_type, 5, i64::MAX).unwrap_err();
            assert!(matches!(err, CoreError::Validation(ValidationError::OutOfRange { .. })));
        }
    }

    #[test]
    fn test_in_past_i64_max_rejected() {
        let err = apply_movement(MovementType::In, i64::MAX - 3, 10).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "stock_quantity"
        ));
    }

    #[test]
    fn test_sale_transition() {
        let t = sale_transition(10, 3);
        assert_eq!((t.previous, t.new, t.delta), (10, 7, -3));
    }
}
