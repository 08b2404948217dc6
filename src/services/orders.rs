use chrono::{DateTime, Local, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::{
    DateRange, NewOrder, NewOrderItem, Order, OrderItem, OrderStats, OrderStatus, Period,
    UpdateOrder,
};
use crate::services::reports;

const ORDER_COLUMNS: &str = "id, items, total_quantity, total_amount, discount, status, \
     payment_mode, notes, customer_name, customer_phone, order_type, order_date, \
     created_at, updated_at";

fn row_to_order(row: &rusqlite::Row<'_>) -> rusqlite::Result<Order> {
    let items_json: String = row.get(1)?;
    let items: Vec<OrderItem> = serde_json::from_str(&items_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Order {
        id: row.get(0)?,
        items,
        total_quantity: row.get(2)?,
        total_amount: row.get(3)?,
        discount: row.get(4)?,
        status: row.get(5)?,
        payment_mode: row.get(6)?,
        notes: row.get(7)?,
        customer_name: row.get(8)?,
        customer_phone: row.get(9)?,
        order_type: row.get(10)?,
        order_date: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

/// Line totals are always derived here, never trusted from the caller.
fn price_items(items: &[NewOrderItem]) -> Vec<OrderItem> {
    items
        .iter()
        .map(|item| OrderItem {
            menu_item_id: item.menu_item_id,
            name: item.name.clone(),
            price: item.price,
            quantity: item.quantity,
            total: item.price * item.quantity as f64,
        })
        .collect()
}

fn get_order_conn(conn: &Connection, id: i64) -> AppResult<Order> {
    let order = conn
        .query_row(
            &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS),
            [id],
            row_to_order,
        )
        .optional()?
        .ok_or(AppError::NotFound("order"))?;

    Ok(order)
}

pub fn create_order(db: &Database, order: NewOrder) -> AppResult<Order> {
    if order.items.is_empty() {
        return Err(AppError::InvalidArgument(
            "order must contain at least one item".to_string(),
        ));
    }

    let items = price_items(&order.items);
    let total_quantity: i32 = items.iter().map(|i| i.quantity).sum();
    let total_amount: f64 = items.iter().map(|i| i.total).sum();
    let items_json = serde_json::to_string(&items)?;
    let now = Utc::now();

    let created = {
        let conn = db.conn()?;

        conn.execute(
            "INSERT INTO orders (items, total_quantity, total_amount, discount, status, \
             payment_mode, notes, customer_name, customer_phone, order_type, order_date, \
             created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                items_json,
                total_quantity,
                total_amount,
                order.discount,
                OrderStatus::Pending,
                order.payment_mode,
                order.notes,
                order.customer_name,
                order.customer_phone,
                order.order_type,
                now,
                now,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        get_order_conn(&conn, id)?
    };

    db.today_orders.invalidate();

    Ok(created)
}

pub fn get_order(db: &Database, id: i64) -> AppResult<Order> {
    let conn = db.conn()?;
    get_order_conn(&conn, id)
}

pub fn update_order_status(db: &Database, id: i64, status: OrderStatus) -> AppResult<Order> {
    let updated = {
        let conn = db.conn()?;

        let changed = conn.execute(
            "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status, Utc::now(), id],
        )?;

        if changed == 0 {
            return Err(AppError::NotFound("order"));
        }

        get_order_conn(&conn, id)?
    };

    db.today_orders.invalidate();

    Ok(updated)
}

pub fn update_order(db: &Database, id: i64, update: UpdateOrder) -> AppResult<Order> {
    let updated = {
        let conn = db.conn()?;
        let existing = get_order_conn(&conn, id)?;

        let items = match &update.items {
            Some(new_items) => {
                if new_items.is_empty() {
                    return Err(AppError::InvalidArgument(
                        "order must contain at least one item".to_string(),
                    ));
                }
                price_items(new_items)
            }
            None => existing.items,
        };

        let total_quantity: i32 = items.iter().map(|i| i.quantity).sum();
        let total_amount: f64 = items.iter().map(|i| i.total).sum();
        let items_json = serde_json::to_string(&items)?;

        conn.execute(
            "UPDATE orders SET items = ?1, total_quantity = ?2, total_amount = ?3, \
             discount = ?4, payment_mode = ?5, notes = ?6, customer_name = ?7, \
             customer_phone = ?8, order_type = ?9, updated_at = ?10 WHERE id = ?11",
            params![
                items_json,
                total_quantity,
                total_amount,
                update.discount.or(existing.discount),
                update.payment_mode.or(existing.payment_mode),
                update.notes.or(existing.notes),
                update.customer_name.or(existing.customer_name),
                update.customer_phone.or(existing.customer_phone),
                update.order_type.or(existing.order_type),
                Utc::now(),
                id,
            ],
        )?;

        get_order_conn(&conn, id)?
    };

    db.today_orders.invalidate();

    Ok(updated)
}

pub fn delete_order(db: &Database, id: i64) -> AppResult<()> {
    {
        let conn = db.conn()?;
        let changed = conn.execute("DELETE FROM orders WHERE id = ?1", [id])?;

        if changed == 0 {
            return Err(AppError::NotFound("order"));
        }
    }

    db.today_orders.invalidate();

    Ok(())
}

pub fn get_today_orders(db: &Database) -> AppResult<Vec<Order>> {
    let range = reports::resolve_range(Period::Today, None)?;
    get_orders_in_range(db, range.start, range.end)
}

/// All orders whose timestamp falls inside the closed interval, newest first.
/// One query regardless of how many calendar days the interval spans.
pub fn get_orders_in_range(
    db: &Database,
    start: DateTime<Local>,
    end: DateTime<Local>,
) -> AppResult<Vec<Order>> {
    let conn = db.conn()?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM orders WHERE order_date >= ?1 AND order_date <= ?2 \
         ORDER BY order_date DESC",
        ORDER_COLUMNS
    ))?;

    let orders = stmt
        .query_map(
            params![start.with_timezone(&Utc), end.with_timezone(&Utc)],
            row_to_order,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(orders)
}

pub fn get_all_orders(db: &Database, limit: Option<u32>) -> AppResult<Vec<Order>> {
    let conn = db.conn()?;
    let limit = limit.unwrap_or(200);

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM orders ORDER BY order_date DESC LIMIT ?1",
        ORDER_COLUMNS
    ))?;

    let orders = stmt
        .query_map([limit], row_to_order)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(orders)
}

fn row_to_stats(row: &rusqlite::Row<'_>) -> rusqlite::Result<OrderStats> {
    Ok(OrderStats {
        total_orders: row.get(0)?,
        total_revenue: row.get(1)?,
        upi_orders: row.get(2)?,
        upi_revenue: row.get(3)?,
        cash_orders: row.get(4)?,
        cash_revenue: row.get(5)?,
    })
}

/// Revenue and order counts split by payment mode, cancelled orders excluded.
/// `range` limits the rollup to a closed interval; `None` covers everything.
pub fn get_order_stats(db: &Database, range: Option<DateRange>) -> AppResult<OrderStats> {
    const STATS_SELECT: &str = "SELECT COUNT(*), COALESCE(SUM(total_amount), 0), \
         COALESCE(SUM(CASE WHEN payment_mode = 'UPI' THEN 1 ELSE 0 END), 0), \
         COALESCE(SUM(CASE WHEN payment_mode = 'UPI' THEN total_amount ELSE 0 END), 0), \
         COALESCE(SUM(CASE WHEN payment_mode = 'Cash' THEN 1 ELSE 0 END), 0), \
         COALESCE(SUM(CASE WHEN payment_mode = 'Cash' THEN total_amount ELSE 0 END), 0) \
         FROM orders WHERE status <> 'cancelled'";

    let conn = db.conn()?;

    let stats = match range {
        Some(range) => conn.query_row(
            &format!("{} AND order_date >= ?1 AND order_date <= ?2", STATS_SELECT),
            params![
                range.start.with_timezone(&Utc),
                range.end.with_timezone(&Utc)
            ],
            row_to_stats,
        )?,
        None => conn.query_row(STATS_SELECT, [], row_to_stats)?,
    };

    Ok(stats)
}
