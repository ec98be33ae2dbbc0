use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Carelog";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Address the API binds to unless `CARELOG_ADDR` overrides it.
pub const DEFAULT_ADDR: &str = "127.0.0.1:8970";

/// Seeded account used whenever a request names no `user_id`.
pub const DEFAULT_USER_NAME: &str = "Carelog User";
pub const DEFAULT_USER_EMAIL: &str = "me@carelog.local";

pub fn default_log_filter() -> &'static str {
    "info,carelog=debug"
}

/// Get the application data directory
/// ~/Carelog/ on all platforms (user-visible), unless CARELOG_DATA_DIR overrides it
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CARELOG_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Carelog")
}

/// SQLite database file
pub fn db_path() -> PathBuf {
    data_dir().join("carelog.db")
}

/// Root of the uploaded-file store, served under /files
pub fn uploads_dir() -> PathBuf {
    data_dir().join("uploads")
}

/// Bind address: CARELOG_ADDR or the default.
pub fn bind_addr() -> SocketAddr {
    match std::env::var("CARELOG_ADDR") {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("Invalid CARELOG_ADDR '{raw}'")),
        Err(_) => DEFAULT_ADDR.parse().expect("default address parses"),
    }
}
