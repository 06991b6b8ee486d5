mod config;
pub mod database;
pub mod migrations;

pub use config::{ApiConfig, Config, GuidanceConfig, SessionConfig};
pub use database::{FavoriteChange, HistoryEntry, LocalStore};

use std::path::PathBuf;

/// Returns `~/.config/acupress[-dev]/` based on ACUPRESS_ENV.
///
/// Set ACUPRESS_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ACUPRESS_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("acupress-dev")
    } else {
        base_dir.join("acupress")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
