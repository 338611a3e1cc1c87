use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) database_url: String,
    pub(crate) database_max_connections: u32,
    pub(crate) http_addr: String,
    pub(crate) cors_origins: Vec<String>,
    pub(crate) log_level: String,
    pub(crate) jwt: JwtSettings,
}

/// Consumed by the authentication subsystem; carried here so the whole
/// configuration surface is validated in one place at startup.
#[derive(Debug, Clone)]
pub(crate) struct JwtSettings {
    pub(crate) issuer: String,
    pub(crate) client_secret: String,
    pub(crate) access_expiry_seconds: i64,
    pub(crate) refresh_expiry_seconds: i64,
}

impl Settings {
    pub(crate) fn from_env() -> Result<Self> {
        let database_url = get_required("DATABASE_URL").context("DATABASE_URL is required")?;
        let database_max_connections = parse_u32_env("DATABASE_MAX_CONNECTIONS", 5)?;

        let http_addr = std::env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let cors_origins = parse_cors_origins(
            std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:8000,http://127.0.0.1:8000".to_string()),
        );
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());

        let jwt = JwtSettings::from_env()?;

        Ok(Self {
            database_url,
            database_max_connections,
            http_addr,
            cors_origins,
            log_level,
            jwt,
        })
    }
}

impl JwtSettings {
    fn from_env() -> Result<Self> {
        let issuer = get_required("JWT_ISSUER").context("JWT_ISSUER is required")?;
        let client_secret =
            get_required("JWT_CLIENT_SECRET").context("JWT_CLIENT_SECRET is required")?;

        if client_secret.chars().count() < 32 {
            return Err(anyhow!("JWT_CLIENT_SECRET must be at least 32 characters"));
        }

        let access_expiry_seconds = parse_i64_env("JWT_ACCESS_EXPIRY_SECONDS", 1800)?;
        let refresh_expiry_seconds = parse_i64_env("JWT_REFRESH_EXPIRY_SECONDS", 604800)?;

        Ok(Self {
            issuer,
            client_secret,
            access_expiry_seconds,
            refresh_expiry_seconds,
        })
    }
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn parse_cors_origins(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_u32_env(key: &str, default: u32) -> Result<u32> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u32>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_i64_env(key: &str, default: i64) -> Result<i64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<i64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value <= 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
