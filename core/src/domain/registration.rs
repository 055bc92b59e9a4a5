//! Repo registrations consumed from the external registry

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One registered repository, as recorded by the service registry.
///
/// The core only ever reads registrations; creating and retiring them is the
/// registration surface's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRegistration {
	/// Local working directory containing the virtualized repository.
	pub enlistment_root: PathBuf,

	/// SID of the user the repo was registered for.
	pub owner_sid: String,

	/// Inactive registrations are kept for history but never auto-mounted.
	pub is_active: bool,
}

impl RepoRegistration {
	pub fn new(enlistment_root: impl Into<PathBuf>, owner_sid: impl Into<String>) -> Self {
		Self {
			enlistment_root: enlistment_root.into(),
			owner_sid: owner_sid.into(),
			is_active: true,
		}
	}
}
