use chrono::{DateTime, Local, Utc};
use rusqlite::{params, OptionalExtension};

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::{Expense, NewExpense, Period};
use crate::services::reports;

fn row_to_expense(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        category: row.get(1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
        date: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub fn create_expense(db: &Database, expense: NewExpense) -> AppResult<Expense> {
    if expense.amount <= 0.0 {
        return Err(AppError::InvalidArgument(
            "expense amount must be positive".to_string(),
        ));
    }

    let conn = db.conn()?;
    let now = Utc::now();

    conn.execute(
        "INSERT INTO expenses (category, description, amount, date, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            expense.category,
            expense.description,
            expense.amount,
            expense.date,
            now,
            now,
        ],
    )?;

    let id = conn.last_insert_rowid();

    let created = conn
        .query_row(
            "SELECT id, category, description, amount, date, created_at, updated_at \
             FROM expenses WHERE id = ?1",
            [id],
            row_to_expense,
        )
        .optional()?
        .ok_or(AppError::NotFound("expense"))?;

    Ok(created)
}

pub fn get_today_expenses(db: &Database) -> AppResult<Vec<Expense>> {
    let range = reports::resolve_range(Period::Today, None)?;
    get_expenses_in_range(db, range.start, range.end)
}

/// All expenses dated inside the closed interval, newest first. One query
/// regardless of how many calendar days the interval spans.
pub fn get_expenses_in_range(
    db: &Database,
    start: DateTime<Local>,
    end: DateTime<Local>,
) -> AppResult<Vec<Expense>> {
    let conn = db.conn()?;

    let mut stmt = conn.prepare(
        "SELECT id, category, description, amount, date, created_at, updated_at \
         FROM expenses WHERE date >= ?1 AND date <= ?2 ORDER BY date DESC",
    )?;

    let expenses = stmt
        .query_map(
            params![start.with_timezone(&Utc), end.with_timezone(&Utc)],
            row_to_expense,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(expenses)
}

pub fn delete_expense(db: &Database, id: i64) -> AppResult<()> {
    let conn = db.conn()?;
    let changed = conn.execute("DELETE FROM expenses WHERE id = ?1", [id])?;

    if changed == 0 {
        return Err(AppError::NotFound("expense"));
    }

    Ok(())
}
