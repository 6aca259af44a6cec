use std::str::FromStr;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is required")]
    Missing { var: &'static str },

    #[error("{var} has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Outbound mail settings.
#[derive(Debug, Clone)]
pub struct MailSettings {
    /// Sender of every outgoing message.
    pub from: String,
    /// Recipient of the per-booking operator notice.
    pub operator_email: String,
    pub queue_capacity: usize,
    /// Delivery attempts per message before giving up.
    pub max_attempts: u32,
}

/// Credentials for the administrator created at startup when absent.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Bound on each storage operation in milliseconds (default: `3000`).
    pub storage_timeout_ms: u64,
    pub db_max_connections: u32,
    /// Marks session cookies `Secure`.
    pub in_production: bool,
    /// Session inactivity expiry in hours (default: `24`).
    pub session_lifetime_hours: i64,
    pub mail: MailSettings,
    pub admin_bootstrap: Option<AdminBootstrap>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            request_timeout_secs: 30,
            storage_timeout_ms: 3000,
            db_max_connections: 10,
            in_production: false,
            session_lifetime_hours: 24,
            mail: MailSettings {
                from: "reservations@bookings.local".into(),
                operator_email: "operator@bookings.local".into(),
                queue_capacity: 100,
                max_attempts: 3,
            },
            admin_bootstrap: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                       |
    /// |--------------------------|-------------------------------|
    /// | `HOST`                   | `0.0.0.0`                     |
    /// | `PORT`                   | `3000`                        |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                          |
    /// | `STORAGE_TIMEOUT_MS`     | `3000`                        |
    /// | `DB_MAX_CONNECTIONS`     | `10`                          |
    /// | `IN_PRODUCTION`          | `false`                       |
    /// | `SESSION_LIFETIME_HOURS` | `24`                          |
    /// | `MAIL_FROM`              | `reservations@bookings.local` |
    /// | `OPERATOR_EMAIL`         | `operator@bookings.local`     |
    /// | `MAIL_QUEUE_CAPACITY`    | `100`                         |
    /// | `MAIL_MAX_ATTEMPTS`      | `3`                           |
    /// | `ADMIN_EMAIL`            | unset                         |
    /// | `ADMIN_PASSWORD`         | unset                         |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let admin_bootstrap = match (
            std::env::var("ADMIN_EMAIL").ok(),
            std::env::var("ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            _ => None,
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT", defaults.port)?,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            storage_timeout_ms: env_parse("STORAGE_TIMEOUT_MS", defaults.storage_timeout_ms)?,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            in_production: env_parse("IN_PRODUCTION", defaults.in_production)?,
            session_lifetime_hours: env_parse(
                "SESSION_LIFETIME_HOURS",
                defaults.session_lifetime_hours,
            )?,
            mail: MailSettings {
                from: std::env::var("MAIL_FROM").unwrap_or(defaults.mail.from),
                operator_email: std::env::var("OPERATOR_EMAIL")
                    .unwrap_or(defaults.mail.operator_email),
                queue_capacity: env_parse("MAIL_QUEUE_CAPACITY", defaults.mail.queue_capacity)?,
                max_attempts: env_parse("MAIL_MAX_ATTEMPTS", defaults.mail.max_attempts)?,
            },
            admin_bootstrap,
        })
    }
}

/// Read `DATABASE_URL`, which has no default.
pub fn database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing {
        var: "DATABASE_URL",
    })
}

fn env_parse<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(default),
    }
}
