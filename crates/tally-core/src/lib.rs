//! # tally-core: Pure Business Logic for Tally POS
//!
//! This crate holds the rules of the shop floor as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  │    /pos, /inventory, /dashboard, /products, /categories         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  types   │ │  money   │ │ checkout │ │  stock   │          │   │
//! │  │   │ Product  │ │  Money   │ │ totals   │ │ in/out/  │          │   │
//! │  │   │ Sale     │ │  cents   │ │ change   │ │ adjust   │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  policy  │ │  report  │ │ sale_    │ │validation│          │   │
//! │  │   │  roles   │ │  windows │ │ number   │ │  rules   │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (Database Layer)                    │   │
//! │  │     SQLite, migrations, repositories, checkout + adjustment     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, StockMovement, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`checkout`] - Cart validation, totals and change
//! - [`stock`] - How in/out/adjustment movements change stock
//! - [`sale_number`] - `SALE-YYYYMMDD-NNNN` formatting
//! - [`policy`] - Roles and what they may do
//! - [`report`] - Calendar windows and the 7-day sales series
//! - [`validation`] - Input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::stock::apply_movement;
//! use tally_core::MovementType;
//!
//! // Stock count of 15 on a shelf that the system thinks holds 8
//! let t = apply_movement(MovementType::Adjustment, 8, 15).unwrap();
//! assert_eq!(t.new, 15);
//! assert_eq!(t.delta, 7);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod policy;
pub mod report;
pub mod sale_number;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tally_core::Money` instead of
// `use tally_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use policy::{Capability, Role};
pub use types::*;
