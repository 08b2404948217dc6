use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::db::Database;
use crate::error::AppResult;
use crate::models::{Settings, UpdateSettings};

fn row_to_settings(row: &rusqlite::Row<'_>) -> rusqlite::Result<Settings> {
    Ok(Settings {
        price_per_plate: row.get(0)?,
        tax_rate: row.get(1)?,
        delivery_charge: row.get(2)?,
        business_name: row.get(3)?,
        business_phone: row.get(4)?,
        business_address: row.get(5)?,
        currency: row.get(6)?,
        open_time: row.get(7)?,
        close_time: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn default_settings() -> Settings {
    let now = Utc::now();
    Settings {
        price_per_plate: 150.0,
        tax_rate: 0.0,
        delivery_charge: 0.0,
        business_name: "Biryani House".to_string(),
        business_phone: String::new(),
        business_address: String::new(),
        currency: "\u{20b9}".to_string(),
        open_time: "10:00".to_string(),
        close_time: "22:00".to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// Returns the stored configuration, or the defaults when none has been
/// saved yet.
pub fn get_settings(db: &Database) -> AppResult<Settings> {
    let conn = db.conn()?;

    let stored = conn
        .query_row(
            "SELECT price_per_plate, tax_rate, delivery_charge, business_name, \
             business_phone, business_address, currency, open_time, close_time, \
             created_at, updated_at FROM settings WHERE id = 1",
            [],
            row_to_settings,
        )
        .optional()?;

    Ok(stored.unwrap_or_else(default_settings))
}

pub fn update_settings(db: &Database, update: UpdateSettings) -> AppResult<Settings> {
    let now = Utc::now();

    {
        let conn = db.conn()?;

        conn.execute(
            "INSERT INTO settings (id, price_per_plate, tax_rate, delivery_charge, \
             business_name, business_phone, business_address, currency, open_time, \
             close_time, created_at, updated_at) \
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10) \
             ON CONFLICT(id) DO UPDATE SET \
             price_per_plate = excluded.price_per_plate, \
             tax_rate = excluded.tax_rate, \
             delivery_charge = excluded.delivery_charge, \
             business_name = excluded.business_name, \
             business_phone = excluded.business_phone, \
             business_address = excluded.business_address, \
             currency = excluded.currency, \
             open_time = excluded.open_time, \
             close_time = excluded.close_time, \
             updated_at = excluded.updated_at",
            params![
                update.price_per_plate,
                update.tax_rate,
                update.delivery_charge,
                update.business_name,
                update.business_phone,
                update.business_address,
                update.currency,
                update.open_time,
                update.close_time,
                now,
            ],
        )?;
    }

    get_settings(db)
}
