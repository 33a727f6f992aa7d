//! # Repository Module
//!
//! Database repository implementations for Tally POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().search_available("coke", 10)                    │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── search_available(&self, query, limit)                             │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, fields, opening_stock)                              │
//! │  └── update(&self, id, fields)                                         │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes that must be atomic across tables (checkout, stock adjustment)
//! live in [`crate::checkout`] and [`crate::inventory`], not here.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog search and CRUD
//! - [`CategoryRepository`](category::CategoryRepository) - Categories with product counts
//! - [`UserRepository`](user::UserRepository) - Staff accounts
//! - [`SaleRepository`](sale::SaleRepository) - Sale ledger reads
//! - [`StockMovementRepository`](stock::StockMovementRepository) - Stock ledger reads
//! - [`ReportRepository`](report::ReportRepository) - Dashboard aggregates

use serde::Serialize;

pub mod category;
pub mod product;
pub mod report;
pub mod sale;
pub mod stock;
pub mod user;

// =============================================================================
// Pagination
// =============================================================================

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub per_page: u32,
}

impl Page {
    /// Page `number` (clamped to at least 1) of `per_page` rows.
    pub fn new(number: u32, per_page: u32) -> Self {
        Page {
            number: number.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    pub fn offset(&self) -> i64 {
        (self.number as i64 - 1) * self.per_page as i64
    }
}

/// One page of results with the totals a pager needs.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub per_page: u32,
    pub total: i64,
    pub last_page: u32,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, page: Page, total: i64) -> Self {
        let per_page = page.per_page as i64;
        let last_page = ((total + per_page - 1) / per_page).max(1) as u32;
        Paginated {
            data,
            current_page: page.number,
            per_page: page.per_page,
            total,
            last_page,
        }
    }

    /// Converts the rows while keeping the pager fields.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
        }
    }
}

/// Escapes `%`, `_` and `\` so user input matches literally inside
/// `LIKE ... ESCAPE '\'`, and wraps it for a contains-match.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offsets() {
        assert_eq!(Page::new(1, 20).offset(), 0);
        assert_eq!(Page::new(3, 20).offset(), 40);
        assert_eq!(Page::new(0, 20).number, 1);
    }

    #[test]
    fn test_last_page() {
        assert_eq!(Paginated::new(Vec::<()>::new(), Page::new(1, 15), 0).last_page, 1);
        assert_eq!(Paginated::new(Vec::<()>::new(), Page::new(1, 15), 15).last_page, 1);
        assert_eq!(Paginated::new(Vec::<()>::new(), Page::new(1, 15), 16).last_page, 2);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("coke"), "%coke%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
