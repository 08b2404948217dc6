use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::{MenuCategory, MenuItem, NewMenuItem, UpdateMenuItem};

const MENU_COLUMNS: &str =
    "id, name, price, category, description, image_url, is_active, created_at, updated_at";

fn row_to_menu_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<MenuItem> {
    Ok(MenuItem {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        image_url: row.get(5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn validate(name: &str, price: f64) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::InvalidArgument(
            "menu item name must not be empty".to_string(),
        ));
    }
    if price <= 0.0 {
        return Err(AppError::InvalidArgument(
            "menu item price must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Listings follow the fixed kitchen order (mutton first, beverages last),
/// then name.
fn sort_menu(items: &mut [MenuItem]) {
    items.sort_by(|a, b| {
        a.category
            .rank()
            .cmp(&b.category.rank())
            .then_with(|| a.name.cmp(&b.name))
    });
}

pub fn create_menu_item(db: &Database, item: NewMenuItem) -> AppResult<MenuItem> {
    validate(&item.name, item.price)?;

    let conn = db.conn()?;
    let now = Utc::now();

    conn.execute(
        "INSERT INTO menu_items (name, price, category, description, image_url, is_active, \
         created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            item.name,
            item.price,
            item.category,
            item.description,
            item.image_url,
            item.is_active.unwrap_or(true),
            now,
            now,
        ],
    )?;

    let id = conn.last_insert_rowid();

    let created = conn
        .query_row(
            &format!("SELECT {} FROM menu_items WHERE id = ?1", MENU_COLUMNS),
            [id],
            row_to_menu_item,
        )
        .optional()?
        .ok_or(AppError::NotFound("menu item"))?;

    Ok(created)
}

pub fn update_menu_item(db: &Database, item: UpdateMenuItem) -> AppResult<MenuItem> {
    validate(&item.name, item.price)?;

    let conn = db.conn()?;

    let changed = conn.execute(
        "UPDATE menu_items SET name = ?1, price = ?2, category = ?3, description = ?4, \
         image_url = ?5, is_active = ?6, updated_at = ?7 WHERE id = ?8",
        params![
            item.name,
            item.price,
            item.category,
            item.description,
            item.image_url,
            item.is_active,
            Utc::now(),
            item.id,
        ],
    )?;

    if changed == 0 {
        return Err(AppError::NotFound("menu item"));
    }

    let updated = conn
        .query_row(
            &format!("SELECT {} FROM menu_items WHERE id = ?1", MENU_COLUMNS),
            [item.id],
            row_to_menu_item,
        )
        .optional()?
        .ok_or(AppError::NotFound("menu item"))?;

    Ok(updated)
}

pub fn get_all_menu_items(db: &Database) -> AppResult<Vec<MenuItem>> {
    let conn = db.conn()?;

    let mut stmt = conn.prepare(&format!("SELECT {} FROM menu_items", MENU_COLUMNS))?;
    let mut items = stmt
        .query_map([], row_to_menu_item)?
        .collect::<Result<Vec<_>, _>>()?;

    sort_menu(&mut items);
    Ok(items)
}

/// Only active items are offered to order takers.
pub fn get_active_menu_items(db: &Database) -> AppResult<Vec<MenuItem>> {
    let conn = db.conn()?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM menu_items WHERE is_active = 1",
        MENU_COLUMNS
    ))?;
    let mut items = stmt
        .query_map([], row_to_menu_item)?
        .collect::<Result<Vec<_>, _>>()?;

    sort_menu(&mut items);
    Ok(items)
}

pub fn get_menu_items_by_category(
    db: &Database,
    category: MenuCategory,
) -> AppResult<Vec<MenuItem>> {
    let conn = db.conn()?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM menu_items WHERE category = ?1 AND is_active = 1 ORDER BY name",
        MENU_COLUMNS
    ))?;
    let items = stmt
        .query_map([category], row_to_menu_item)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(items)
}

/// Soft deactivate / reactivate; inactive items stay available for editing.
pub fn set_menu_item_active(db: &Database, id: i64, active: bool) -> AppResult<()> {
    let conn = db.conn()?;

    let changed = conn.execute(
        "UPDATE menu_items SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
        params![active, Utc::now(), id],
    )?;

    if changed == 0 {
        return Err(AppError::NotFound("menu item"));
    }

    Ok(())
}

pub fn delete_menu_item(db: &Database, id: i64) -> AppResult<()> {
    let conn = db.conn()?;
    let changed = conn.execute("DELETE FROM menu_items WHERE id = ?1", [id])?;

    if changed == 0 {
        return Err(AppError::NotFound("menu item"));
    }

    Ok(())
}
