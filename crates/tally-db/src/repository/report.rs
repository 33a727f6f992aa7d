//! # Report Repository
//!
//! Read-only aggregates for the admin dashboard.
//!
//! ```text
//! ┌───────────────────────────── Dashboard ─────────────────────────────────┐
//! │  products: total / active / low stock        categories: total          │
//! │  today: sales, orders, profit     week to date     month to date        │
//! │  ┌──── last 7 days ────┐   ┌── low stock (5) ──┐   ┌── recent (5) ──┐   │
//! │  │ ▂ ▅ ▁ ▇ ▃ ▆ █       │   │ lowest first      │   │ newest first   │   │
//! │  └─────────────────────┘   └───────────────────┘   └────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All figures come from completed sales. Profit is summed from the sale
//! item snapshots, so later price edits never rewrite history.

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::product::{fetch_low_stock, ProductWithCategory};
use crate::repository::sale::{fetch_recent, RecentSale};
use tally_core::report::{daily_series, series_start, DailySales, Window, WindowSummary};
use tally_core::Money;

/// Rows shown in each dashboard list.
pub const DASHBOARD_LIST_LIMIT: u32 = 5;

/// Everything the dashboard renders.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_products: i64,
    pub active_products: i64,
    pub low_stock_products: i64,
    pub total_categories: i64,
    pub today_sales: Money,
    pub today_orders: i64,
    pub week_sales: Money,
    pub month_sales: Money,
    pub today_profit: Money,
    pub low_stock: Vec<ProductWithCategory>,
    pub recent_sales: Vec<RecentSale>,
    pub daily_sales: Vec<DailySales>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::FromRow)]
pub struct ProductCounts {
    pub total: i64,
    pub active: i64,
    pub low_stock: i64,
}

/// Repository for dashboard aggregates.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sale count, revenue and profit of completed sales in `window`.
    pub async fn window_summary(&self, window: Window) -> DbResult<WindowSummary> {
        let mut conn = self.pool.acquire().await?;
        window_summary(&mut conn, window).await
    }

    pub async fn product_counts(&self) -> DbResult<ProductCounts> {
        let mut conn = self.pool.acquire().await?;
        product_counts(&mut conn).await
    }

    /// The seven-day sales chart ending on `today`.
    pub async fn daily_sales(&self, today: NaiveDate) -> DbResult<Vec<DailySales>> {
        let mut conn = self.pool.acquire().await?;
        let totals = daily_totals(&mut conn, today).await?;
        Ok(daily_series(today, &totals))
    }

    /// Builds the full dashboard for `today` from one consistent snapshot.
    pub async fn dashboard(&self, today: NaiveDate) -> DbResult<DashboardStats> {
        debug!(%today, "Building dashboard");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let counts = product_counts(&mut tx).await?;
        let total_categories: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&mut *tx)
            .await?;

        let today_summary = window_summary(&mut tx, Window::day(today)).await?;
        let week = window_summary(&mut tx, Window::week_to_date(today)).await?;
        let month = window_summary(&mut tx, Window::month_to_date(today)).await?;

        let low_stock = fetch_low_stock(&mut tx, DASHBOARD_LIST_LIMIT).await?;
        let recent_sales = fetch_recent(&mut tx, DASHBOARD_LIST_LIMIT).await?;
        let totals = daily_totals(&mut tx, today).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(DashboardStats {
            total_products: counts.total,
            active_products: counts.active,
            low_stock_products: counts.low_stock,
            total_categories,
            today_sales: today_summary.total,
            today_orders: today_summary.sale_count,
            week_sales: week.total,
            month_sales: month.total,
            today_profit: today_summary.profit,
            low_stock,
            recent_sales,
            daily_sales: daily_series(today, &totals),
        })
    }
}

async fn window_summary(conn: &mut SqliteConnection, window: Window) -> DbResult<WindowSummary> {
    let (sale_count, total): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(SUM(total_cents), 0)
        FROM sales
        WHERE status = 'completed' AND created_at >= ?1 AND created_at < ?2
        "#,
    )
    .bind(window.from)
    .bind(window.to)
    .fetch_one(&mut *conn)
    .await?;

    let profit: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM((i.selling_price_cents - i.purchase_price_cents) * i.quantity), 0)
        FROM sale_items i
        JOIN sales s ON s.id = i.sale_id
        WHERE s.status = 'completed' AND s.created_at >= ?1 AND s.created_at < ?2
        "#,
    )
    .bind(window.from)
    .bind(window.to)
    .fetch_one(&mut *conn)
    .await?;

    Ok(WindowSummary {
        sale_count,
        total: Money::from_cents(total),
        profit: Money::from_cents(profit),
    })
}

async fn product_counts(conn: &mut SqliteConnection) -> DbResult<ProductCounts> {
    let counts = sqlx::query_as::<_, ProductCounts>(
        r#"
        SELECT
            COUNT(*) AS total,
            COALESCE(SUM(status = 'active'), 0) AS active,
            COALESCE(SUM(status = 'active' AND stock_quantity <= min_stock_level), 0) AS low_stock
        FROM products
        "#,
    )
    .fetch_one(conn)
    .await?;

    Ok(counts)
}

/// Revenue per UTC day over the chart window. Days without sales are absent.
async fn daily_totals(
    conn: &mut SqliteConnection,
    today: NaiveDate,
) -> DbResult<Vec<(NaiveDate, Money)>> {
    let window = Window::days(series_start(today), today);

    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT substr(created_at, 1, 10) AS day, SUM(total_cents)
        FROM sales
        WHERE status = 'completed' AND created_at >= ?1 AND created_at < ?2
        GROUP BY day
        ORDER BY day
        "#,
    )
    .bind(window.from)
    .bind(window.to)
    .fetch_all(conn)
    .await?;

    rows.into_iter()
        .map(|(day, cents)| {
            NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                .map(|date| (date, Money::from_cents(cents)))
                .map_err(|e| DbError::Internal(format!("bad sale date '{day}': {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Days, Utc};

    use super::*;
    use crate::checkout::CheckoutRequest;
    use crate::pool::Database;
    use crate::testing::{product, shop, Shop};
    use tally_core::checkout::CartLine;
    use tally_core::{Product, ProductStatus};

    async fn sell(shop: &Shop, product: &Product, quantity: i64, paid: i64) {
        shop.db
            .checkout()
            .checkout(CheckoutRequest {
                cashier_id: shop.admin.id.clone(),
                lines: vec![CartLine {
                    product_id: product.id.clone(),
                    quantity,
                }],
                amount_paid: Money::from_cents(paid),
            })
            .await
            .unwrap();
    }

    async fn backdate_sales(db: &Database, days: u64) {
        let when = Utc::now() - Days::new(days);
        sqlx::query("UPDATE sales SET created_at = ?1")
            .bind(when)
            .execute(db.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_dashboard() {
        let shop = shop().await;
        let stats = shop.db.reports().dashboard(Utc::now().date_naive()).await.unwrap();

        assert_eq!(stats.total_products, 0);
        assert_eq!(stats.total_categories, 1);
        assert_eq!(stats.today_orders, 0);
        assert!(stats.today_sales.is_zero());
        assert!(stats.recent_sales.is_empty());
        assert_eq!(stats.daily_sales.len(), 7);
        assert!(stats.daily_sales.iter().all(|d| d.total.is_zero()));
    }

    #[tokio::test]
    async fn test_today_totals_and_profit() {
        let shop = shop().await;
        let a = product(&shop.db, &shop.category.id, "COKE-330", 600, 999, 10).await;
        let b = product(&shop.db, &shop.category.id, "CHIPS", 100, 250, 3).await;

        sell(&shop, &a, 3, 3000).await;
        sell(&shop, &b, 2, 500).await;

        let today = Utc::now().date_naive();
        let stats = shop.db.reports().dashboard(today).await.unwrap();

        assert_eq!(stats.today_orders, 2);
        assert_eq!(stats.today_sales.cents(), 2997 + 500);
        assert_eq!(stats.today_profit.cents(), 3 * 399 + 2 * 150);
        assert_eq!(stats.week_sales, stats.today_sales);
        assert_eq!(stats.month_sales, stats.today_sales);

        // CHIPS is at 1 of min 5, COKE at 7 of 5
        assert_eq!(stats.low_stock_products, 1);
        assert_eq!(stats.low_stock[0].product.sku, "CHIPS");

        assert_eq!(stats.recent_sales.len(), 2);
        assert_eq!(stats.recent_sales[0].sale.total_cents, 500);
        assert_eq!(stats.daily_sales[6].total.cents(), 3497);
    }

    #[tokio::test]
    async fn test_window_excludes_older_sales() {
        let shop = shop().await;
        let a = product(&shop.db, &shop.category.id, "COKE-330", 600, 999, 10).await;
        sell(&shop, &a, 1, 999).await;
        backdate_sales(&shop.db, 2).await;

        let today = Utc::now().date_naive();
        let reports = shop.db.reports();

        let summary = reports.window_summary(Window::day(today)).await.unwrap();
        assert_eq!(summary, WindowSummary::default());

        let two_days_ago = today - Days::new(2);
        let then = reports.window_summary(Window::day(two_days_ago)).await.unwrap();
        assert_eq!(then.sale_count, 1);
        assert_eq!(then.profit.cents(), 399);

        let series = reports.daily_sales(today).await.unwrap();
        assert_eq!(series[4].date, two_days_ago);
        assert_eq!(series[4].total.cents(), 999);
        assert!(series[6].total.is_zero());
    }

    #[tokio::test]
    async fn test_product_counts() {
        let shop = shop().await;
        product(&shop.db, &shop.category.id, "A", 100, 200, 50).await;
        product(&shop.db, &shop.category.id, "B", 100, 200, 2).await;
        let c = product(&shop.db, &shop.category.id, "C", 100, 200, 0).await;

        let mut fields = crate::testing::fields(&shop.category.id, "C", 100, 200);
        fields.status = ProductStatus::Inactive;
        shop.db.products().update(&c.id, &fields).await.unwrap();

        let counts = shop.db.reports().product_counts().await.unwrap();
        assert_eq!(
            counts,
            ProductCounts {
                total: 3,
                active: 2,
                low_stock: 1
            }
        );
    }

    #[tokio::test]
    async fn test_dashboard_is_repeatable() {
        let shop = shop().await;
        let a = product(&shop.db, &shop.category.id, "COKE-330", 600, 999, 10).await;
        sell(&shop, &a, 2, 2000).await;

        let today = Utc::now().date_naive();
        let first = shop.db.reports().dashboard(today).await.unwrap();
        let second = shop.db.reports().dashboard(today).await.unwrap();
        assert_eq!(first, second);
    }
}
