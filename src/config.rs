use crate::history_repo::DEFAULT_RETENTION;
use crate::report::{DEFAULT_FILENAME, DEFAULT_TITLE, ReportSettings};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub report: ReportConfig,
    /// When present, GET /api/report requires these HTTP Basic credentials.
    #[serde(default)]
    pub auth: Option<AuthConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
    /// Number of most recent uploads kept in history.
    #[serde(default = "default_retention_count")]
    pub retention_count: u32,
}

fn default_retention_count() -> u32 {
    DEFAULT_RETENTION
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Largest accepted request body for POST /api/upload.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_max_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_filename")]
    pub filename: String,
}

fn default_title() -> String {
    DEFAULT_TITLE.into()
}

fn default_filename() -> String {
    DEFAULT_FILENAME.into()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            filename: default_filename(),
        }
    }
}

impl ReportConfig {
    pub fn settings(&self) -> ReportSettings {
        ReportSettings {
            title: self.title.clone(),
            filename: self.filename.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            self.database.retention_count > 0,
            "database.retention_count must be > 0, got {}",
            self.database.retention_count
        );
        anyhow::ensure!(
            self.upload.max_bytes > 0,
            "upload.max_bytes must be > 0, got {}",
            self.upload.max_bytes
        );
        anyhow::ensure!(
            !self.report.filename.is_empty(),
            "report.filename must be non-empty"
        );
        anyhow::ensure!(
            !self.report.filename.contains(['"', '/', '\\']),
            "report.filename must not contain quotes or path separators, got {}",
            self.report.filename
        );
        if let Some(auth) = &self.auth {
            anyhow::ensure!(
                !auth.username.is_empty() && !auth.username.contains(':'),
                "auth.username must be non-empty and must not contain ':'"
            );
            anyhow::ensure!(!auth.password.is_empty(), "auth.password must be non-empty");
        }
        Ok(())
    }
}
