use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub live: LiveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    /// Session cookie lifetime in seconds (24h by default).
    pub expires_in: i64,
}

/// Department-scoped admin accounts. Passwords may be stored either as plain
/// values (credential-equality, the simple deployment) or as bcrypt hashes
/// (`$2...`); both are accepted at login.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    #[serde(default)]
    pub accounts: Vec<AdminAccount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAccount {
    pub id: String,
    pub password: String,
    pub department: String,
}

/// Live-feed tuning. All durations in milliseconds except the resync
/// interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveConfig {
    /// Coalescing window for change-signal bursts.
    pub debounce_ms: u64,
    /// Fallback full re-sync interval in case change signals are lost.
    pub resync_secs: u64,
    /// Lead-in duration before the winner is revealed.
    pub pre_start_ms: u64,
    /// How long the revealed winner stays on screen.
    pub reveal_ms: u64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 250,
            resync_secs: 30,
            pre_start_ms: 3000,
            reveal_ms: 6000,
        }
    }
}

impl Config {
    /// Load from `CONFIG_PATH` (default `config.toml`); a missing file falls
    /// back to environment variables entirely, and env vars override file
    /// values either way.
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str)
                    .map_err(|e| format!("failed to parse {config_path}: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is required when no config.toml is present")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    session: SessionConfig {
                        secret: get_env("SESSION_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        expires_in: get_env_parse("SESSION_EXPIRES_IN", 86_400i64),
                    },
                    admin: AdminConfig::default(),
                    live: LiveConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("failed to read {config_path}: {e}").into());
            }
        };

        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("SESSION_SECRET") {
            config.session.secret = v;
        }
        if let Ok(v) = env::var("SESSION_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.session.expires_in = n;
        }
        if let Ok(v) = env::var("LIVE_DEBOUNCE_MS")
            && let Ok(n) = v.parse()
        {
            config.live.debounce_ms = n;
        }
        if let Ok(v) = env::var("LIVE_RESYNC_SECS")
            && let Ok(n) = v.parse()
        {
            config.live.resync_secs = n;
        }
        if let Ok(v) = env::var("LIVE_PRE_START_MS")
            && let Ok(n) = v.parse()
        {
            config.live.pre_start_ms = n;
        }
        if let Ok(v) = env::var("LIVE_REVEAL_MS")
            && let Ok(n) = v.parse()
        {
            config.live.reveal_ms = n;
        }

        // Single-account deployments configure the admin via env
        if let (Ok(id), Ok(password)) = (env::var("ADMIN_ID"), env::var("ADMIN_PASSWORD")) {
            let department = env::var("ADMIN_DEPARTMENT").unwrap_or_default();
            config.admin.accounts.retain(|a| a.id != id);
            config.admin.accounts.push(AdminAccount {
                id,
                password,
                department,
            });
        }

        if config.admin.accounts.is_empty() {
            log::warn!("No admin accounts configured; every login will be rejected");
        }

        Ok(config)
    }
}
