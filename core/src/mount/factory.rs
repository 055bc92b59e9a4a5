//! Mount execution seam

use async_trait::async_trait;
use std::path::Path;

/// Launches the projection process for an enlistment.
///
/// Implementations wrap whatever platform surface actually performs the
/// mount; the supervisor only consumes this trait, never a global.
#[async_trait]
pub trait MountFactory: Send + Sync {
	/// SID of the user this factory mounts for.
	fn current_user_sid(&self) -> String;

	/// Mount the repo rooted at `enlistment_root`. Returns whether the mount
	/// succeeded; failure details are the implementation's to log.
	async fn mount(&self, enlistment_root: &Path) -> bool;

	/// Release any resources held by the factory.
	async fn dispose(&self) {}
}
