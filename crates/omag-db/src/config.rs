use omag_core::OmagError;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration for the database connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Pool settings for `url`, sized from the environment.
    ///
    /// - `OMAG_DATABASE_MAX_CONNECTIONS` (optional, defaults to 5)
    pub fn from_env(url: impl Into<String>) -> Result<Self, OmagError> {
        let max_connections = match std::env::var("OMAG_DATABASE_MAX_CONNECTIONS") {
            Err(_) => DEFAULT_MAX_CONNECTIONS,
            Ok(raw) => {
                let parsed: u32 = raw.parse().map_err(|_| {
                    OmagError::Configuration(format!(
                        "Invalid OMAG_DATABASE_MAX_CONNECTIONS '{raw}': must be a positive integer"
                    ))
                })?;
                if parsed == 0 {
                    return Err(OmagError::Configuration(
                        "OMAG_DATABASE_MAX_CONNECTIONS must be at least 1".into(),
                    ));
                }
                parsed
            }
        };

        Ok(Self {
            url: url.into(),
            max_connections,
        })
    }
}
