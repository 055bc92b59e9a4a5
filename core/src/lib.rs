//! GVFS Core
//!
//! Engine for working with virtualized Git repositories: the durable
//! placeholder catalog behind the filesystem projection, the per-session
//! auto-mount supervisor with its shared volume watcher, and the offline
//! ref repair tool.
//!
//! The projection driver, IPC surface and CLI live elsewhere and consume
//! this crate through the seams exposed here ([`mount::MountFactory`],
//! [`notifications::NotificationSink`], [`mount::RepoRegistry`]).

pub mod catalog;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod mount;
pub mod notifications;
pub mod repair;
pub mod volume;

pub use catalog::PlaceholderCatalog;
pub use config::ServiceConfig;
pub use domain::{PlaceholderEntry, PlaceholderKind, RepoRegistration};

use crate::mount::{FileRepoRegistry, MountFactory, MountSupervisor};
use crate::notifications::NotificationSink;
use crate::volume::VolumeWatcher;
use std::sync::Arc;
use tracing::info;

/// Everything the service runs for one login session.
///
/// The outer service constructs one of these per session, with the platform
/// collaborators injected, and drives it through [`start`] and [`shutdown`].
///
/// [`start`]: GvfsSession::start
/// [`shutdown`]: GvfsSession::shutdown
pub struct GvfsSession {
	session_id: u32,

	/// Shared volume availability watcher for this session.
	pub watcher: Arc<VolumeWatcher>,

	/// Auto-mount supervisor for this session's user.
	pub supervisor: Arc<MountSupervisor>,
}

impl GvfsSession {
	pub fn new(
		session_id: u32,
		config: &ServiceConfig,
		mount_factory: Arc<dyn MountFactory>,
		notifications: Arc<dyn NotificationSink>,
	) -> Self {
		let watcher = Arc::new(VolumeWatcher::new());
		let registry = Arc::new(FileRepoRegistry::new(config.repo_registry_path.clone()));
		let supervisor = MountSupervisor::new(
			session_id,
			registry,
			mount_factory,
			notifications,
			watcher.clone(),
		);

		Self {
			session_id,
			watcher,
			supervisor,
		}
	}

	/// Run the initial auto-mount sweep and leave the supervisor watching
	/// for volumes.
	pub async fn start(&self) {
		info!(session_id = self.session_id, "starting session services");
		self.supervisor.clone().start().await;
	}

	/// Stop the control loops and release their resources. In-flight work
	/// runs to completion.
	pub async fn shutdown(&self) {
		self.supervisor.dispose().await;
		self.watcher.dispose().await;
		info!(session_id = self.session_id, "session services stopped");
	}

	pub fn session_id(&self) -> u32 {
		self.session_id
	}
}
