pub mod database;
pub mod orders;
pub mod repositories;
pub mod settings;
