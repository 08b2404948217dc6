//! Pre-authorized staff directory. Sign-in itself happens against the
//! external identity provider; this only answers whether an email is allowed
//! in at all.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::{AuthorizedUser, NewAuthorizedUser};

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuthorizedUser> {
    Ok(AuthorizedUser {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        role: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub fn add_authorized_user(db: &Database, user: NewAuthorizedUser) -> AppResult<AuthorizedUser> {
    if user.email.trim().is_empty() {
        return Err(AppError::InvalidArgument(
            "email must not be empty".to_string(),
        ));
    }

    let conn = db.conn()?;

    conn.execute(
        "INSERT INTO users (email, name, role, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![user.email, user.name, user.role, Utc::now()],
    )?;

    let id = conn.last_insert_rowid();

    let created = conn
        .query_row(
            "SELECT id, email, name, role, created_at FROM users WHERE id = ?1",
            [id],
            row_to_user,
        )
        .optional()?
        .ok_or(AppError::NotFound("user"))?;

    Ok(created)
}

pub fn get_authorized_users(db: &Database) -> AppResult<Vec<AuthorizedUser>> {
    let conn = db.conn()?;

    let mut stmt =
        conn.prepare("SELECT id, email, name, role, created_at FROM users ORDER BY email")?;

    let users = stmt
        .query_map([], row_to_user)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(users)
}

pub fn check_email_authorized(db: &Database, email: &str) -> AppResult<Option<AuthorizedUser>> {
    let conn = db.conn()?;

    let user = conn
        .query_row(
            "SELECT id, email, name, role, created_at FROM users WHERE email = ?1",
            [email],
            row_to_user,
        )
        .optional()?;

    Ok(user)
}

pub fn remove_authorized_user(db: &Database, id: i64) -> AppResult<()> {
    let conn = db.conn()?;
    let changed = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;

    if changed == 0 {
        return Err(AppError::NotFound("user"));
    }

    Ok(())
}
