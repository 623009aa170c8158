use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::expansion::DEFAULT_STORAGE_KEY;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub tree: TreeConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    pub expansion_storage_key: String,
    pub hide_unroutable_leaves: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database name swapped into DATABASE_URL; None keeps the URL's own
    pub name: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    /// Header an upstream auth layer fills with the caller's permission names
    pub permissions_header: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Tree overrides
        if let Ok(v) = env::var("TREE_EXPANSION_KEY") {
            if !v.trim().is_empty() {
                self.tree.expansion_storage_key = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("TREE_HIDE_UNROUTABLE_LEAVES") {
            self.tree.hide_unroutable_leaves = v.parse().unwrap_or(self.tree.hide_unroutable_leaves);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_NAME") {
            self.database.name = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(v) = env::var("PANEL_TREE_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_PERMISSIONS_HEADER") {
            if !v.trim().is_empty() {
                self.security.permissions_header = v.trim().to_ascii_lowercase();
            }
        }

        self
    }

    fn tree_defaults() -> TreeConfig {
        TreeConfig {
            expansion_storage_key: DEFAULT_STORAGE_KEY.to_string(),
            hide_unroutable_leaves: true,
        }
    }

    /// Development preset without environment overrides
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            tree: Self::tree_defaults(),
            database: DatabaseConfig {
                name: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                permissions_header: "x-user-permissions".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            tree: Self::tree_defaults(),
            database: DatabaseConfig {
                name: None,
                max_connections: 10,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 8080,
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                permissions_header: "x-user-permissions".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            tree: Self::tree_defaults(),
            database: DatabaseConfig {
                name: None,
                max_connections: 20,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 8080,
                enable_request_logging: false,
                max_request_size_bytes: 512 * 1024, // 512KB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                permissions_header: "x-user-permissions".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.tree.expansion_storage_key, "sidebar-expanded-groups");
        assert!(config.tree.hide_unroutable_leaves);
        assert_eq!(config.api.port, 3000);
        assert!(config.api.enable_request_logging);
    }

    #[test]
    fn test_presets_ignore_environment() {
        env::set_var("TREE_HIDE_UNROUTABLE_LEAVES", "false");
        let config = AppConfig::development();
        assert!(config.tree.hide_unroutable_leaves);
        assert_eq!(config.security.permissions_header, "x-user-permissions");
        env::remove_var("TREE_HIDE_UNROUTABLE_LEAVES");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.environment, Environment::Production);
        assert!(!config.api.enable_request_logging);
        assert_eq!(config.security.permissions_header, "x-user-permissions");
    }
}
