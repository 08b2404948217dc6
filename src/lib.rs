//! Order, menu, expense and profit management core for a small restaurant.
//!
//! Everything is a library-level contract consumed in-process by UI code:
//! the store is an embedded SQLite database behind [`Database`], and each
//! operation lives in a module under [`services`].

pub mod cache;
pub mod db;
pub mod error;
pub mod models;
pub mod services;


pub use db::Database;
pub use error::{AppError, AppResult};
