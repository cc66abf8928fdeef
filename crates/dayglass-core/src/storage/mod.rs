pub mod config;
mod repository;

pub use config::Config;
pub use repository::{AppState, JsonFileRepository, Repository};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/dayglass[-dev]/` based on DAYGLASS_ENV.
///
/// Set DAYGLASS_ENV=dev to use development data directory. DAYGLASS_HOME
/// overrides the location entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("DAYGLASS_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DAYGLASS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("dayglass-dev")
            } else {
                base_dir.join("dayglass")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
