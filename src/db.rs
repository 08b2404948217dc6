use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::cache::TodayOrdersCache;
use crate::error::{AppError, AppResult};

pub struct Database {
    conn: Mutex<Connection>,
    pub today_orders: TodayOrdersCache,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self::from_conn(conn);
        db.initialize()?;
        Ok(db)
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self::from_conn(conn);
        db.initialize()?;
        Ok(db)
    }

    fn from_conn(conn: Connection) -> Self {
        Database {
            conn: Mutex::new(conn),
            today_orders: TodayOrdersCache::default(),
        }
    }

    pub(crate) fn conn(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| AppError::LockPoisoned)
    }

    fn initialize(&self) -> AppResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            "
            -- Customer orders; line items are embedded as a JSON array
            CREATE TABLE IF NOT EXISTS orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                items TEXT NOT NULL,
                total_quantity INTEGER NOT NULL,
                total_amount REAL NOT NULL,
                discount REAL,
                status TEXT NOT NULL DEFAULT 'pending',
                payment_mode TEXT,
                notes TEXT,
                customer_name TEXT,
                customer_phone TEXT,
                order_type TEXT,
                order_date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_orders_order_date ON orders(order_date);

            -- Business expenses
            CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);

            -- Menu offered to order takers
            CREATE TABLE IF NOT EXISTS menu_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                price REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT,
                image_url TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Single-row business configuration
            CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                price_per_plate REAL NOT NULL,
                tax_rate REAL NOT NULL,
                delivery_charge REAL NOT NULL,
                business_name TEXT NOT NULL,
                business_phone TEXT NOT NULL,
                business_address TEXT NOT NULL,
                currency TEXT NOT NULL,
                open_time TEXT NOT NULL,
                close_time TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Per-day profit rollups, one row per calendar date
            CREATE TABLE IF NOT EXISTS daily_summaries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL UNIQUE,
                total_orders INTEGER NOT NULL,
                total_revenue REAL NOT NULL,
                total_expenses REAL NOT NULL,
                net_profit REAL NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Staff emails allowed to sign in
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                name TEXT,
                role TEXT,
                created_at TEXT NOT NULL
            );
            ",
        )?;

        // Run migrations for existing databases (pass connection to avoid deadlock)
        Self::migrate_conn(&conn)?;

        Ok(())
    }

    fn migrate_conn(conn: &Connection) -> rusqlite::Result<()> {
        // Orders predating customer-facing channels lack these columns
        let columns: Vec<String> = conn
            .prepare("PRAGMA table_info(orders)")?
            .query_map([], |row| row.get::<_, String>(1))?
            .filter_map(|r| r.ok())
            .collect();

        if !columns.contains(&"customer_name".to_string()) {
            conn.execute("ALTER TABLE orders ADD COLUMN customer_name TEXT", [])?;
        }
        if !columns.contains(&"customer_phone".to_string()) {
            conn.execute("ALTER TABLE orders ADD COLUMN customer_phone TEXT", [])?;
        }
        if !columns.contains(&"order_type".to_string()) {
            conn.execute("ALTER TABLE orders ADD COLUMN order_type TEXT", [])?;
        }
        if !columns.contains(&"discount".to_string()) {
            conn.execute("ALTER TABLE orders ADD COLUMN discount REAL", [])?;
        }

        Ok(())
    }
}
