pub mod config_settings;
pub mod traits;
