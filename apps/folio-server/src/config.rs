//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::bail;

use folio_core::services::ReadPolicy;
#[cfg(feature = "postgres")]
use folio_infra::DatabaseConfig;
use folio_infra::JwtConfig;

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// Which repository backend serves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-memory store seeded with sample content.
    Fixture,
    Postgres,
}

/// Credentials for an admin account ensured at startup.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    /// Local directory for uploaded media; in-memory when unset.
    pub media_dir: Option<PathBuf>,
    pub media_public_base_url: String,
    pub read_policy: ReadPolicy,
    pub admin_bootstrap: Option<AdminBootstrap>,
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    match value.map(|v| v.to_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(var("PORT"), 8080u16);

        let database_url = var("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let store_backend = match var("STORE_BACKEND").map(|v| v.to_lowercase()).as_deref() {
            Some("fixture") | Some("memory") => StoreBackend::Fixture,
            Some("postgres") => StoreBackend::Postgres,
            Some(other) => bail!("Unknown STORE_BACKEND '{other}' (expected fixture or postgres)"),
            None if database_url.is_some() => StoreBackend::Postgres,
            None => StoreBackend::Fixture,
        };

        #[cfg(feature = "postgres")]
        let database = database_url.map(|url| DatabaseConfig {
            url,
            max_connections: parse_or(var("DB_MAX_CONNECTIONS"), 20),
            min_connections: parse_or(var("DB_MIN_CONNECTIONS"), 2),
        });

        #[cfg(feature = "postgres")]
        if store_backend == StoreBackend::Postgres && database.is_none() {
            bail!("STORE_BACKEND=postgres requires DATABASE_URL");
        }
        #[cfg(not(feature = "postgres"))]
        if store_backend == StoreBackend::Postgres {
            bail!("This build has no postgres support; use STORE_BACKEND=fixture");
        }

        let secret = var("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());
        if secret == DEFAULT_JWT_SECRET {
            tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
        }
        let jwt = JwtConfig {
            secret,
            expiration_hours: parse_or(var("JWT_EXPIRATION_HOURS"), 24),
            issuer: var("JWT_ISSUER").unwrap_or_else(|| "folio".to_string()),
        };

        let media_public_base_url = var("MEDIA_PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}/media"));

        let admin_bootstrap = match (var("ADMIN_EMAIL"), var("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            (Some(_), None) => bail!("ADMIN_PASSWORD is required alongside ADMIN_EMAIL"),
            _ => None,
        };

        Ok(Self {
            host,
            port,
            store_backend,
            #[cfg(feature = "postgres")]
            database,
            jwt,
            media_dir: var("MEDIA_DIR").map(PathBuf::from),
            media_public_base_url,
            read_policy: ReadPolicy {
                include_future_dated: parse_bool(var("PUBLIC_INCLUDE_FUTURE_POSTS"), true),
            },
            admin_bootstrap,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.store_backend, StoreBackend::Fixture);
        assert_eq!(cfg.jwt.expiration_hours, 24);
        assert_eq!(cfg.jwt.issuer, "folio");
        assert_eq!(cfg.media_public_base_url, "http://127.0.0.1:8080/media");
        assert!(cfg.read_policy.include_future_dated);
        assert!(cfg.media_dir.is_none());
        assert!(cfg.admin_bootstrap.is_none());
    }

    #[test]
    fn test_future_posts_flag() {
        let cfg = config(&[("PUBLIC_INCLUDE_FUTURE_POSTS", "false")]).unwrap();
        assert!(!cfg.read_policy.include_future_dated);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(config(&[("STORE_BACKEND", "sqlite")]).is_err());
    }

    #[test]
    fn test_admin_email_requires_password() {
        assert!(config(&[("ADMIN_EMAIL", "admin@beamx.io")]).is_err());
        let cfg = config(&[
            ("ADMIN_EMAIL", "admin@beamx.io"),
            ("ADMIN_PASSWORD", "secret1"),
        ])
        .unwrap();
        assert_eq!(cfg.admin_bootstrap.unwrap().email, "admin@beamx.io");
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn test_database_url_selects_postgres() {
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/folio")]).unwrap();
        assert_eq!(cfg.store_backend, StoreBackend::Postgres);
        let db = cfg.database.unwrap();
        assert_eq!(db.max_connections, 20);
        assert_eq!(db.min_connections, 2);

        let cfg = config(&[
            ("DATABASE_URL", "postgres://localhost/folio"),
            ("STORE_BACKEND", "fixture"),
        ])
        .unwrap();
        assert_eq!(cfg.store_backend, StoreBackend::Fixture);

        assert!(config(&[("STORE_BACKEND", "postgres")]).is_err());
    }
}
