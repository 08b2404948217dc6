pub mod expenses;
pub mod menu_items;
pub mod orders;
pub mod reports;
pub mod settings;
pub mod users;
