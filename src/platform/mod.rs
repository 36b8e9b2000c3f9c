//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logger initialisation
//! - Storage (file on native, LocalStorage on web)
//! - Per-user data directory

pub mod storage;

pub use storage::{DocumentStorage, MemoryStorage, StorageError};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

/// File name of the record table inside the data directory
pub const RECORDS_FILE: &str = "records.json";
/// File name of the optional settings document
pub const SETTINGS_FILE: &str = "settings.json";

/// Install the logger for this platform
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    // try_init so tests and embedders that already installed a logger don't panic
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    )
    .try_init();
}

#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Per-user data directory (`%APPDATA%\MemoryGames` or `~/.memorygames`)
#[cfg(not(target_arch = "wasm32"))]
pub fn data_dir() -> Option<std::path::PathBuf> {
    use std::path::PathBuf;

    if cfg!(windows) {
        if let Some(app_data) = std::env::var_os("APPDATA") {
            return Some(PathBuf::from(app_data).join("MemoryGames"));
        }
    }
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(".memorygames"))
}

/// Default location of the record file, if a data directory can be found
#[cfg(not(target_arch = "wasm32"))]
pub fn records_path() -> Option<std::path::PathBuf> {
    data_dir().map(|dir| dir.join(RECORDS_FILE))
}

/// Default location of the settings file, if a data directory can be found
#[cfg(not(target_arch = "wasm32"))]
pub fn settings_path() -> Option<std::path::PathBuf> {
    data_dir().map(|dir| dir.join(SETTINGS_FILE))
}
