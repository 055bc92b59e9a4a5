//! Service configuration persistence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const SERVICE_CONFIG_FILE: &str = "service.json";

#[derive(Error, Debug)]
pub enum ConfigError {
	/// No data directory could be resolved for this platform
	#[error("No data directory could be resolved for this platform")]
	NoDataDir,

	/// IO error
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON error
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Service-wide configuration stored in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
	/// Version that created this config
	pub version: String,

	pub created_at: DateTime<Utc>,

	/// Where the repo registry document lives.
	pub repo_registry_path: PathBuf,

	#[serde(skip)]
	data_dir: PathBuf,
}

impl ServiceConfig {
	fn new(data_dir: &Path) -> Self {
		Self {
			version: env!("CARGO_PKG_VERSION").to_string(),
			created_at: Utc::now(),
			repo_registry_path: data_dir.join("repo-registry.json"),
			data_dir: data_dir.to_path_buf(),
		}
	}

	/// Default per-user data directory for the service.
	pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
		Ok(dirs::data_local_dir()
			.ok_or(ConfigError::NoDataDir)?
			.join("GVFS"))
	}

	/// Load the config under `data_dir`, writing a fresh one on first run.
	pub fn load_or_create(data_dir: &Path) -> Result<Self, ConfigError> {
		let path = data_dir.join(SERVICE_CONFIG_FILE);

		if path.exists() {
			let contents = std::fs::read_to_string(&path)?;
			let mut config: Self = serde_json::from_str(&contents)?;
			config.data_dir = data_dir.to_path_buf();
			return Ok(config);
		}

		let config = Self::new(data_dir);
		config.ensure_directories()?;
		config.save()?;
		Ok(config)
	}

	pub fn ensure_directories(&self) -> Result<(), ConfigError> {
		std::fs::create_dir_all(&self.data_dir)?;
		Ok(())
	}

	pub fn save(&self) -> Result<(), ConfigError> {
		let contents = serde_json::to_string_pretty(self)?;
		std::fs::write(self.data_dir.join(SERVICE_CONFIG_FILE), contents)?;
		Ok(())
	}

	pub fn data_dir(&self) -> &Path {
		&self.data_dir
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_run_writes_and_reload_round_trips() {
		let dir = tempfile::tempdir().unwrap();

		let created = ServiceConfig::load_or_create(dir.path()).unwrap();
		assert!(dir.path().join(SERVICE_CONFIG_FILE).exists());
		assert_eq!(
			created.repo_registry_path,
			dir.path().join("repo-registry.json")
		);

		let reloaded = ServiceConfig::load_or_create(dir.path()).unwrap();
		assert_eq!(reloaded.version, created.version);
		assert_eq!(reloaded.created_at, created.created_at);
		assert_eq!(reloaded.repo_registry_path, created.repo_registry_path);
	}
}
