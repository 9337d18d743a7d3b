//! Repository configuration file support.
//!
//! Reads `repository.toml`:
//!
//! ```toml
//! [repository]
//! type = "mongo"
//!
//! [mongo]
//! connection_uri = "mongodb://localhost:27017/bus_tracker"
//! database = "bus_tracker"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::RepositoryError;
use crate::db::MongoConfig;

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub mongo: MongoSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// MongoDB connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSettings {
    #[serde(default)]
    pub connection_uri: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    #[serde(default = "default_server_selection_timeout")]
    pub server_selection_timeout: u64,
}

impl Default for MongoSettings {
    fn default() -> Self {
        Self {
            connection_uri: String::new(),
            database: None,
            max_connections: default_max_connections(),
            min_connections: 0,
            connect_timeout: default_connect_timeout(),
            server_selection_timeout: default_server_selection_timeout(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_server_selection_timeout() -> u64 {
    30
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse repository configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load repository configuration from the default location.
    ///
    /// Searches for `repository.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = [
            PathBuf::from("repository.toml"),
            PathBuf::from("backend/repository.toml"),
            PathBuf::from("../repository.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(RepositoryError::configuration(
            "No repository.toml found in standard locations",
        ))
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// Convert to MongoConfig if this is a Mongo configuration.
    #[cfg(feature = "mongo-repo")]
    pub fn to_mongo_config(&self) -> Result<Option<MongoConfig>, RepositoryError> {
        let repo_type = self.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        if repo_type != RepositoryType::Mongo {
            return Ok(None);
        }

        if self.mongo.connection_uri.is_empty() {
            return Err(RepositoryError::configuration(
                "Mongo repository requires 'mongo.connection_uri' setting",
            ));
        }

        Ok(Some(MongoConfig {
            connection_uri: self.mongo.connection_uri.clone(),
            database: self.mongo.database.clone(),
            max_pool_size: self.mongo.max_connections,
            min_pool_size: self.mongo.min_connections,
            connect_timeout_sec: self.mongo.connect_timeout,
            server_selection_timeout_sec: self.mongo.server_selection_timeout,
        }))
    }

    /// Convert to MongoConfig when the feature is disabled.
    #[cfg(not(feature = "mongo-repo"))]
    pub fn to_mongo_config(&self) -> Result<Option<MongoConfig>, RepositoryError> {
        let repo_type = self.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        if repo_type == RepositoryType::Mongo {
            return Err(RepositoryError::configuration(
                "Mongo repository feature not enabled",
            ));
        }

        Ok(None)
    }
}
