use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Maps a field-less enum to the TEXT value it is stored and serialized as.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let text = value.as_str()?;
                Self::parse(text).ok_or_else(|| {
                    FromSqlError::Other(
                        format!("unrecognized {} value: {}", stringify!($name), text).into(),
                    )
                })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

text_enum!(OrderStatus {
    Pending => "pending",
    Preparing => "preparing",
    Ready => "ready",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    #[serde(rename = "UPI")]
    Upi,
    Cash,
}

text_enum!(PaymentMode {
    Upi => "UPI",
    Cash => "Cash",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderChannel {
    Online,
    Offline,
}

text_enum!(OrderChannel {
    Online => "online",
    Offline => "offline",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Ingredients,
    Fuel,
    Packaging,
    Utilities,
    Labor,
    Rent,
    Other,
}

text_enum!(ExpenseCategory {
    Ingredients => "ingredients",
    Fuel => "fuel",
    Packaging => "packaging",
    Utilities => "utilities",
    Labor => "labor",
    Rent => "rent",
    Other => "other",
});

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 7] = [
        ExpenseCategory::Ingredients,
        ExpenseCategory::Fuel,
        ExpenseCategory::Packaging,
        ExpenseCategory::Utilities,
        ExpenseCategory::Labor,
        ExpenseCategory::Rent,
        ExpenseCategory::Other,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuCategory {
    Mutton,
    Chicken,
    Egg,
    Veg,
    Extras,
    Beverages,
}

text_enum!(MenuCategory {
    Mutton => "mutton",
    Chicken => "chicken",
    Egg => "egg",
    Veg => "veg",
    Extras => "extras",
    Beverages => "beverages",
});

impl MenuCategory {
    /// Fixed kitchen ordering used by every menu listing.
    pub fn rank(&self) -> u8 {
        match self {
            MenuCategory::Mutton => 1,
            MenuCategory::Chicken => 2,
            MenuCategory::Egg => 3,
            MenuCategory::Veg => 4,
            MenuCategory::Extras => 5,
            MenuCategory::Beverages => 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub menu_item_id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub items: Vec<OrderItem>,
    pub total_quantity: i32,
    pub total_amount: f64,
    pub discount: Option<f64>,
    pub status: OrderStatus,
    pub payment_mode: Option<PaymentMode>,
    pub notes: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub order_type: Option<OrderChannel>,
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub menu_item_id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub items: Vec<NewOrderItem>,
    pub discount: Option<f64>,
    pub payment_mode: Option<PaymentMode>,
    pub notes: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub order_type: Option<OrderChannel>,
}

/// Staff edit of an existing order; provided fields replace the stored ones.
/// Replacing the item list recomputes line totals and the aggregate amount.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrder {
    pub items: Option<Vec<NewOrderItem>>,
    pub discount: Option<f64>,
    pub payment_mode: Option<PaymentMode>,
    pub notes: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub order_type: Option<OrderChannel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub category: MenuCategory,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMenuItem {
    pub name: String,
    pub price: f64,
    pub category: MenuCategory,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMenuItem {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub category: MenuCategory,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub price_per_plate: f64,
    pub tax_rate: f64,
    pub delivery_charge: f64,
    pub business_name: String,
    pub business_phone: String,
    pub business_address: String,
    pub currency: String,
    pub open_time: String,
    pub close_time: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSettings {
    pub price_per_plate: f64,
    pub tax_rate: f64,
    pub delivery_charge: f64,
    pub business_name: String,
    pub business_phone: String,
    pub business_address: String,
    pub currency: String,
    pub open_time: String,
    pub close_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub id: i64,
    pub date: NaiveDate,
    pub total_orders: i32,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuthorizedUser {
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
}

/// Derived profit figures for one interval; recomputed on demand and never
/// persisted as a source of truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfitData {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    pub profit_margin: f64,
    pub total_orders: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrendPoint {
    pub date: NaiveDate,
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: ExpenseCategory,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseBreakdown {
    pub breakdown: Vec<CategoryShare>,
    pub total_expenses: f64,
}

/// Payment-mode split for a range; cancelled orders are excluded throughout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderStats {
    pub total_orders: i32,
    pub total_revenue: f64,
    pub upi_orders: i32,
    pub upi_revenue: f64,
    pub cash_orders: i32,
    pub cash_revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
    Custom,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CustomRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Closed interval in local time: start is 00:00:00.000 and end is
/// 23:59:59.999 of the respective days.
#[derive(Debug, Clone, Copy)]
pub struct DateRange {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}
