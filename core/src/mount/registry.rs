//! Repo registry access
//!
//! The registry of enlistments is owned by the registration surface; the
//! core only reads it. The on-disk form is a JSON array of registrations.

use crate::domain::RepoRegistration;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RegistryError {
	/// IO error
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON error
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Read-only view of the repo registry.
#[async_trait]
pub trait RepoRegistry: Send + Sync {
	/// All active registrations owned by `user_sid`.
	async fn try_get_active_repos_for_user(
		&self,
		user_sid: &str,
	) -> Result<Vec<RepoRegistration>, RegistryError>;
}

/// Registry backed by a JSON document on disk.
pub struct FileRepoRegistry {
	registry_path: PathBuf,
}

impl FileRepoRegistry {
	pub fn new(registry_path: impl Into<PathBuf>) -> Self {
		Self {
			registry_path: registry_path.into(),
		}
	}

	fn filter_for_user(registrations: Vec<RepoRegistration>, user_sid: &str) -> Vec<RepoRegistration> {
		registrations
			.into_iter()
			.filter(|repo| repo.is_active && repo.owner_sid.eq_ignore_ascii_case(user_sid))
			.collect()
	}
}

#[async_trait]
impl RepoRegistry for FileRepoRegistry {
	async fn try_get_active_repos_for_user(
		&self,
		user_sid: &str,
	) -> Result<Vec<RepoRegistration>, RegistryError> {
		if !self.registry_path.exists() {
			// A registry that was never written means no repos yet.
			debug!(registry = %self.registry_path.display(), "repo registry not present");
			return Ok(Vec::new());
		}

		let contents = tokio::fs::read_to_string(&self.registry_path).await?;
		let registrations: Vec<RepoRegistration> = serde_json::from_str(&contents)?;

		Ok(Self::filter_for_user(registrations, user_sid))
	}
}
