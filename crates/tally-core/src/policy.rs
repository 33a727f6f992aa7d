//! # Access Policy
//!
//! Which role may do what. Handlers ask `role.allows(capability)` before
//! touching any data.
//!
//! ```text
//! ┌──────────────────────┬─────────┬─────────┐
//! │ Capability           │ Admin   │ Cashier │
//! ├──────────────────────┼─────────┼─────────┤
//! │ ProcessSales         │   ✔     │   ✔     │
//! │ ViewDashboard        │   ✔     │         │
//! │ ManageInventory      │   ✔     │         │
//! │ ManageProducts       │   ✔     │         │
//! │ ManageCategories     │   ✔     │         │
//! └──────────────────────┴─────────┴─────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// A staff member's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Cashier,
}

/// An operation gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Search the register and run checkouts.
    ProcessSales,
    ViewDashboard,
    /// View stock levels and apply manual adjustments.
    ManageInventory,
    ManageProducts,
    ManageCategories,
}

impl Role {
    pub fn allows(&self, capability: Capability) -> bool {
        match self {
            Role::Admin => true,
            Role::Cashier => matches!(capability, Capability::ProcessSales),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Cashier => "cashier",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
