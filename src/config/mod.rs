use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub uploads: UploadConfig,
    pub pagination: PaginationConfig,
    pub admin: AdminSeedConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; when absent it is assembled from the DB_* parts
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub upload_path: String,
    pub max_file_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSeedConfig {
    pub email: String,
    pub phone: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password: String,
}

pub const DEFAULT_JWT_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("DB_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = env::var("DB_PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Ok(v) = env::var("DB_USER") {
            self.database.user = v;
        }
        if let Ok(v) = env::var("DB_PASSWORD") {
            self.database.password = v;
        }
        if let Ok(v) = env::var("DB_NAME") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY") {
            self.security.jwt_expiry = parse_duration(&v).unwrap_or(DEFAULT_JWT_EXPIRY);
        }

        // Uploads
        if let Ok(v) = env::var("UPLOAD_PATH") {
            self.uploads.upload_path = v;
        }
        if let Ok(v) = env::var("MAX_FILE_SIZE") {
            self.uploads.max_file_size = v.parse().unwrap_or(self.uploads.max_file_size);
        }

        // Pagination
        if let Ok(v) = env::var("PAGINATION_MAX_LIMIT") {
            self.pagination.max_limit = v.parse().unwrap_or(self.pagination.max_limit);
        }

        // Admin seed
        if let Ok(v) = env::var("ADMIN_EMAIL") {
            self.admin.email = v;
        }
        if let Ok(v) = env::var("ADMIN_PHONE") {
            self.admin.phone = v;
        }
        if let Ok(v) = env::var("ADMIN_NAME") {
            self.admin.name = v;
        }
        if let Ok(v) = env::var("ADMIN_PASSWORD") {
            self.admin.password = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig::local(10, 30),
            security: SecurityConfig {
                jwt_secret: "development-only-secret".to_string(),
                jwt_expiry: DEFAULT_JWT_EXPIRY,
            },
            uploads: UploadConfig {
                upload_path: "./uploads".to_string(),
                max_file_size: 10 * 1024 * 1024, // 10MB
            },
            pagination: PaginationConfig {
                default_limit: 10,
                max_limit: 100,
            },
            admin: AdminSeedConfig::default_seed("password"),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig::local(20, 10),
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry: DEFAULT_JWT_EXPIRY,
            },
            uploads: UploadConfig {
                upload_path: "./uploads".to_string(),
                max_file_size: 10 * 1024 * 1024,
            },
            pagination: PaginationConfig {
                default_limit: 10,
                max_limit: 100,
            },
            admin: AdminSeedConfig::default_seed(""),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig::local(50, 5),
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry: DEFAULT_JWT_EXPIRY,
            },
            uploads: UploadConfig {
                upload_path: "/var/lib/seva/uploads".to_string(),
                max_file_size: 5 * 1024 * 1024, // 5MB
            },
            pagination: PaginationConfig {
                default_limit: 10,
                max_limit: 100,
            },
            admin: AdminSeedConfig::default_seed(""),
        }
    }

    /// Checks that must hold before the server accepts traffic
    pub fn validate(&self) -> Result<(), String> {
        if self.security.jwt_secret.is_empty() {
            return Err("JWT_SECRET must be set".to_string());
        }
        if self.environment != Environment::Development && self.admin.password.is_empty() {
            return Err("ADMIN_PASSWORD must be set outside development".to_string());
        }
        Ok(())
    }
}

impl DatabaseConfig {
    fn local(max_connections: u32, connection_timeout: u64) -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "seva_space".to_string(),
            max_connections,
            connection_timeout,
        }
    }

    /// Connection URL, either as configured or assembled from parts
    pub fn connection_url(&self) -> Result<String, url::ParseError> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }

        let mut url = url::Url::parse(&format!("postgres://{}:{}", self.host, self.port))?;
        // set_username/set_password only fail for cannot-be-a-base URLs
        let _ = url.set_username(&self.user);
        if !self.password.is_empty() {
            let _ = url.set_password(Some(&self.password));
        }
        url.set_path(&format!("/{}", self.name));
        url.query_pairs_mut().append_pair("sslmode", "disable");
        Ok(url.into())
    }
}

impl AdminSeedConfig {
    fn default_seed(password: &str) -> Self {
        Self {
            email: "admin@sevaspace.local".to_string(),
            phone: "9999999999".to_string(),
            name: "Admin User".to_string(),
            password: password.to_string(),
        }
    }
}

/// Parses durations like `24h`, `90m`, `1h30m`, `45s`.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut total = 0u64;
    let mut digits = String::new();
    for c in input.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let value: u64 = digits.parse().ok()?;
        digits.clear();
        let unit = match c {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return None,
        };
        total = total.checked_add(value.checked_mul(unit)?)?;
    }

    // trailing digits without a unit
    if !digits.is_empty() {
        return None;
    }

    Some(Duration::from_secs(total))
}

/// Loads `config.env` then `.env` into the process environment. Variables that are
/// already set win, so the first file to define a key takes precedence.
pub fn load_env_files() {
    for file in ["config.env", ".env"] {
        if let Ok(path) = dotenvy::from_filename(file) {
            tracing::debug!("Loaded environment from {}", path.display());
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
