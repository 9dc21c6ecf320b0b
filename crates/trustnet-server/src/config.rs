use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use trustnet_core::paths;
use trustnet_core::scoring::{DEFAULT_SUGGESTION_LIMIT, ScoringConfig};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Explicit database file; falls back to ~/.trustnet/trustnet.db.
    pub database_path: Option<String>,
    pub scoring: ScoringConfig,
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    database: DatabaseSection,
    #[serde(default)]
    scoring: ScoringSection,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct DatabaseSection {
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScoringSection {
    #[serde(default = "default_suggestion_limit")]
    suggestion_limit: usize,
}

impl Default for ScoringSection {
    fn default() -> Self {
        Self {
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_suggestion_limit() -> usize {
    DEFAULT_SUGGESTION_LIMIT
}

impl ServerConfig {
    pub fn load() -> anyhow::Result<Self> {
        if let Some(file_config) = load_from_file()? {
            return Ok(Self::from_file(file_config));
        }

        Ok(Self::from_env())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured database path, or the default one under the data dir.
    pub fn resolve_database_path(&self) -> anyhow::Result<String> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => paths::ensure_database_path_string(),
        }
    }

    fn from_file(file_config: FileConfig) -> Self {
        Self {
            host: file_config.server.host,
            port: file_config.server.port,
            database_path: file_config.database.path,
            scoring: ScoringConfig {
                suggestion_limit: file_config.scoring.suggestion_limit,
            },
        }
    }

    fn from_env() -> Self {
        let host = env::var("TRUSTNET_SERVER_HOST").unwrap_or_else(|_| default_host());
        let port = env::var("TRUSTNET_SERVER_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or_else(default_port);
        let database_path = env::var("TRUSTNET_DB_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let suggestion_limit = env::var("TRUSTNET_SUGGESTION_LIMIT")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or_else(default_suggestion_limit);

        Self {
            host,
            port,
            database_path,
            scoring: ScoringConfig { suggestion_limit },
        }
    }
}

fn load_from_file() -> anyhow::Result<Option<FileConfig>> {
    let config_path = env::var("TRUSTNET_SERVER_CONFIG").ok();
    let path = if let Some(path) = config_path {
        Some(path)
    } else if Path::new("server.toml").exists() {
        Some("server.toml".to_string())
    } else {
        None
    };

    let Some(path) = path else {
        return Ok(None);
    };

    let contents = fs::read_to_string(&path)
        .map_err(|err| anyhow::anyhow!("Failed to read config {}: {}", path, err))?;
    let parsed: FileConfig = toml::from_str(&contents)
        .map_err(|err| anyhow::anyhow!("Failed to parse config {}: {}", path, err))?;
    Ok(Some(parsed))
}
