//! # Response Views
//!
//! JSON shapes returned by the handlers. Money leaves the service as
//! two-decimal strings (`"29.97"`); cents never cross the HTTP boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tally_core::report::DailySales;
use tally_core::{
    Category, Money, MovementType, Product, ProductStatus, Role, Sale, SaleItem, SaleStatus, User,
};
use tally_db::{
    CategoryWithCount, DashboardStats, MovementEntry, ProductWithCategory, RecentSale,
};

fn amount(cents: i64) -> Decimal {
    Money::from_cents(cents).to_decimal()
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        UserView {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products_count: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        CategoryView {
            id: category.id,
            name: category.name,
            description: category.description,
            products_count: None,
            created_at: category.created_at,
        }
    }
}

impl From<CategoryWithCount> for CategoryView {
    fn from(row: CategoryWithCount) -> Self {
        CategoryView {
            products_count: Some(row.products_count),
            ..row.category.into()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: String,
    pub category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    pub fixed_price: bool,
    pub stock_quantity: i64,
    pub min_stock_level: i64,
    pub image_path: Option<String>,
    pub status: ProductStatus,
    pub is_low_stock: bool,
    pub profit_per_unit: Decimal,
    pub profit_margin: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductView {
    fn from(p: Product) -> Self {
        ProductView {
            category_name: None,
            purchase_price: p.purchase_price().to_decimal(),
            selling_price: p.selling_price().to_decimal(),
            is_low_stock: p.is_low_stock(),
            profit_per_unit: p.profit_per_unit().to_decimal(),
            profit_margin: p.profit_margin_percent(),
            id: p.id,
            category_id: p.category_id,
            name: p.name,
            sku: p.sku,
            description: p.description,
            fixed_price: p.fixed_price,
            stock_quantity: p.stock_quantity,
            min_stock_level: p.min_stock_level,
            image_path: p.image_path,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<ProductWithCategory> for ProductView {
    fn from(row: ProductWithCategory) -> Self {
        ProductView {
            category_name: Some(row.category_name),
            ..row.product.into()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovementView {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub product_sku: String,
    pub user_id: String,
    pub user_name: String,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub reason: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MovementEntry> for MovementView {
    fn from(entry: MovementEntry) -> Self {
        let m = entry.movement;
        MovementView {
            id: m.id,
            product_id: m.product_id,
            product_name: entry.product_name,
            product_sku: entry.product_sku,
            user_id: m.user_id,
            user_name: entry.user_name,
            movement_type: m.movement_type,
            quantity: m.quantity,
            previous_stock: m.previous_stock,
            new_stock: m.new_stock,
            reason: m.reason,
            notes: m.notes,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SaleItemView {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub product_sku: String,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    pub quantity: i64,
    pub subtotal: Decimal,
}

impl From<SaleItem> for SaleItemView {
    fn from(item: SaleItem) -> Self {
        SaleItemView {
            purchase_price: amount(item.purchase_price_cents),
            selling_price: amount(item.selling_price_cents),
            subtotal: amount(item.subtotal_cents),
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            product_sku: item.product_sku,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SaleView {
    pub id: String,
    pub sale_number: String,
    pub cashier_id: String,
    pub cashier_name: String,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub change_given: Decimal,
    pub status: SaleStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<SaleItemView>>,
}

impl SaleView {
    pub fn new(sale: Sale, cashier_name: String, items: Option<Vec<SaleItem>>) -> Self {
        SaleView {
            subtotal: amount(sale.subtotal_cents),
            tax_amount: amount(sale.tax_cents),
            total_amount: sale.total().to_decimal(),
            amount_paid: sale.amount_paid().to_decimal(),
            change_given: sale.change_given().to_decimal(),
            id: sale.id,
            sale_number: sale.sale_number,
            cashier_id: sale.cashier_id,
            cashier_name,
            status: sale.status,
            created_at: sale.created_at,
            items: items.map(|items| items.into_iter().map(SaleItemView::from).collect()),
        }
    }
}

impl From<RecentSale> for SaleView {
    fn from(row: RecentSale) -> Self {
        SaleView::new(row.sale, row.cashier_name, None)
    }
}

#[derive(Debug, Serialize)]
pub struct DailySalesView {
    pub date: String,
    pub label: String,
    pub total: Decimal,
}

impl From<DailySales> for DailySalesView {
    fn from(day: DailySales) -> Self {
        DailySalesView {
            date: day.date.format("%Y-%m-%d").to_string(),
            label: day.label,
            total: day.total.to_decimal(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub total_products: i64,
    pub active_products: i64,
    pub low_stock_products: i64,
    pub total_categories: i64,
    pub today_sales: Decimal,
    pub today_orders: i64,
    pub week_sales: Decimal,
    pub month_sales: Decimal,
    pub today_profit: Decimal,
    pub low_stock_items: Vec<ProductView>,
    pub recent_sales: Vec<SaleView>,
    pub daily_sales: Vec<DailySalesView>,
}

impl From<DashboardStats> for DashboardView {
    fn from(stats: DashboardStats) -> Self {
        DashboardView {
            total_products: stats.total_products,
            active_products: stats.active_products,
            low_stock_products: stats.low_stock_products,
            total_categories: stats.total_categories,
            today_sales: stats.today_sales.to_decimal(),
            today_orders: stats.today_orders,
            week_sales: stats.week_sales.to_decimal(),
            month_sales: stats.month_sales.to_decimal(),
            today_profit: stats.today_profit.to_decimal(),
            low_stock_items: stats.low_stock.into_iter().map(ProductView::from).collect(),
            recent_sales: stats.recent_sales.into_iter().map(SaleView::from).collect(),
            daily_sales: stats.daily_sales.into_iter().map(DailySalesView::from).collect(),
        }
    }
}
