pub mod database;
pub mod image_store;
pub mod store;
