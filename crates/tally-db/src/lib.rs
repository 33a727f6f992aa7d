//! # tally-db: Database Layer for Tally POS
//!
//! This crate provides database access for Tally POS. It uses SQLite with
//! sqlx for async operations and owns the two multi-table transactions of
//! the system: checkout and manual stock adjustment.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   apps/server ─────────────────────────────────────┐                   │
//! │        │                                            │                   │
//! │        ▼                                            ▼                   │
//! │  ┌──────────────────────────┐   ┌──────────────────────────────────┐   │
//! │  │ Engines (one txn each)   │   │ Repositories (reads + CRUD)      │   │
//! │  │  CheckoutEngine          │   │  products, categories, users     │   │
//! │  │  AdjustmentEngine        │   │  sales, stock_movements, reports │   │
//! │  └────────────┬─────────────┘   └────────────────┬─────────────────┘   │
//! │               │       tally-core rules           │                     │
//! │               ▼                                  ▼                     │
//! │        ┌─────────────────────────────────────────────────┐             │
//! │        │  SQLite (WAL, foreign keys, busy timeout)       │             │
//! │        └─────────────────────────────────────────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, sale, etc.)
//! - [`checkout`] - Cart → Sale + SaleItems + ledger entries, atomically
//! - [`inventory`] - Manual stock changes with their ledger entry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/tally.db")).await?;
//!
//! let products = db.products().search_available("coke", 10).await?;
//! let sale = db.checkout().checkout(request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod inventory;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutEngine, CheckoutError, CheckoutRequest, CompletedSale};
pub use error::{DbError, DbResult};
pub use inventory::{AdjustmentEngine, AdjustmentError};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::{CategoryRepository, CategoryWithCount};
pub use repository::product::{ProductFilter, ProductRepository, ProductWithCategory};
pub use repository::report::{DashboardStats, ReportRepository};
pub use repository::sale::{RecentSale, SaleRepository, SaleWithItems};
pub use repository::stock::{MovementEntry, StockMovementRepository};
pub use repository::user::UserRepository;
pub use repository::{Page, Paginated};
