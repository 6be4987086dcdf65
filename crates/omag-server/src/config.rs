use std::path::PathBuf;

use omag_core::OmagError;

const DEFAULT_PORT: u16 = 9443;
const DEFAULT_CONFIG_DIR: &str = "./data/servers";

/// Platform settings read from the environment.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub port: u16,
    /// Bearer token required on every service route; `None` leaves them open.
    pub api_key: Option<String>,
    pub config_dir: PathBuf,
    /// Users allowed to administer the platform; empty allows anyone.
    pub admin_users: Vec<String>,
    /// Servers activated from their stored configuration at startup.
    pub startup_servers: Vec<String>,
}

fn list_var(name: &str) -> Vec<String> {
    std::env::var(name)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

impl PlatformConfig {
    /// - `OMAG_PLATFORM_PORT` (defaults to 9443)
    /// - `OMAG_PLATFORM_API_KEY` (optional)
    /// - `OMAG_CONFIG_DIR` (defaults to `./data/servers`)
    /// - `OMAG_ADMIN_USERS`, `OMAG_STARTUP_SERVERS` (comma-separated)
    pub fn from_env() -> Result<Self, OmagError> {
        let port = match std::env::var("OMAG_PLATFORM_PORT") {
            Err(_) => DEFAULT_PORT,
            Ok(raw) => raw.parse().map_err(|_| {
                OmagError::Configuration(format!(
                    "Invalid OMAG_PLATFORM_PORT '{raw}': must be a port number"
                ))
            })?,
        };

        let api_key = std::env::var("OMAG_PLATFORM_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let config_dir = std::env::var("OMAG_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR));

        Ok(Self {
            port,
            api_key,
            config_dir,
            admin_users: list_var("OMAG_ADMIN_USERS"),
            startup_servers: list_var("OMAG_STARTUP_SERVERS"),
        })
    }
}
