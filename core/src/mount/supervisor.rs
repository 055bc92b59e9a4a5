//! Mount Supervisor - per-session auto-mount control loop

use crate::domain::RepoRegistration;
use crate::mount::{MountFactory, RepoRegistry};
use crate::notifications::{Notification, NotificationSink};
use crate::volume::{OsVolumePlatform, VolumePlatform, VolumeWatcher, VOLUME_POLL_INTERVAL};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

/// Title of every auto-mount notification.
pub const AUTO_MOUNT_TITLE: &str = "GVFS AutoMount";

enum SweepTrigger {
	/// Initial sweep requested by `start`.
	Start,
	/// The non-auto-repeating retry timer elapsed.
	Retry,
	/// A watched volume was observed to exist.
	VolumeAvailable(PathBuf),
	Shutdown,
}

/// Ensures every active repo of one logged-in user is mounted once its
/// volume is reachable.
///
/// A sweep mounts everything whose volume is present and reports each
/// outcome. Missing volumes arm a retry in [`VOLUME_POLL_INTERVAL`] and
/// register a one-shot watcher callback, so the supervisor goes quiescent
/// only when every registered volume has been seen. Each repo is
/// mount-attempted at most once per session: later sweeps only pick up
/// repos whose volumes newly appeared. Mount failures are reported but
/// never retried; polling cannot fix a repo whose volume is already there.
pub struct MountSupervisor {
	session_id: u32,
	user_sid: String,
	registry: Arc<dyn RepoRegistry>,
	mount_factory: Arc<dyn MountFactory>,
	notifications: Arc<dyn NotificationSink>,
	watcher: Arc<VolumeWatcher>,
	platform: Arc<dyn VolumePlatform>,
	retry_interval: Duration,

	trigger_tx: mpsc::UnboundedSender<SweepTrigger>,
	trigger_rx: Mutex<Option<mpsc::UnboundedReceiver<SweepTrigger>>>,
	running: Arc<RwLock<bool>>,
	retry_armed: AtomicBool,
	/// Volume roots with a watcher callback already pending, so retry
	/// sweeps do not stack duplicate registrations.
	watched_roots: Mutex<HashSet<PathBuf>>,
	/// Enlistment roots already handed to the mount factory this session.
	/// Later sweeps skip them, whatever the outcome was.
	attempted_mounts: Mutex<HashSet<PathBuf>>,
}

impl MountSupervisor {
	pub fn new(
		session_id: u32,
		registry: Arc<dyn RepoRegistry>,
		mount_factory: Arc<dyn MountFactory>,
		notifications: Arc<dyn NotificationSink>,
		watcher: Arc<VolumeWatcher>,
	) -> Arc<Self> {
		Self::with_platform(
			session_id,
			registry,
			mount_factory,
			notifications,
			watcher,
			Arc::new(OsVolumePlatform),
			VOLUME_POLL_INTERVAL,
		)
	}

	/// Full constructor with an injected platform and retry cadence.
	pub fn with_platform(
		session_id: u32,
		registry: Arc<dyn RepoRegistry>,
		mount_factory: Arc<dyn MountFactory>,
		notifications: Arc<dyn NotificationSink>,
		watcher: Arc<VolumeWatcher>,
		platform: Arc<dyn VolumePlatform>,
		retry_interval: Duration,
	) -> Arc<Self> {
		let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
		let user_sid = mount_factory.current_user_sid();

		Arc::new(Self {
			session_id,
			user_sid,
			registry,
			mount_factory,
			notifications,
			watcher,
			platform,
			retry_interval,
			trigger_tx,
			trigger_rx: Mutex::new(Some(trigger_rx)),
			running: Arc::new(RwLock::new(false)),
			retry_armed: AtomicBool::new(false),
			watched_roots: Mutex::new(HashSet::new()),
			attempted_mounts: Mutex::new(HashSet::new()),
		})
	}

	/// Spawn the worker and run one immediate sweep.
	pub async fn start(self: Arc<Self>) {
		let Some(triggers) = self.trigger_rx.lock().await.take() else {
			warn!(session_id = self.session_id, "mount supervisor already started");
			return;
		};

		*self.running.write().await = true;
		let _ = self.trigger_tx.send(SweepTrigger::Start);

		let this = self.clone();
		tokio::spawn(async move {
			this.run(triggers).await;
		});
	}

	/// Stop the worker and dispose the mount factory. An in-flight sweep
	/// runs to completion.
	pub async fn dispose(&self) {
		*self.running.write().await = false;
		let _ = self.trigger_tx.send(SweepTrigger::Shutdown);
		self.mount_factory.dispose().await;
		info!(session_id = self.session_id, "mount supervisor disposed");
	}

	async fn run(self: Arc<Self>, mut triggers: mpsc::UnboundedReceiver<SweepTrigger>) {
		info!(
			session_id = self.session_id,
			user_sid = %self.user_sid,
			"mount supervisor started"
		);

		while let Some(trigger) = triggers.recv().await {
			match trigger {
				SweepTrigger::Shutdown => break,
				SweepTrigger::Retry => {
					self.retry_armed.store(false, Ordering::SeqCst);
				}
				SweepTrigger::VolumeAvailable(root) => {
					self.watched_roots.lock().await.remove(&root);
				}
				SweepTrigger::Start => {}
			}

			if !*self.running.read().await {
				break;
			}

			if !self.mount_all().await {
				self.arm_retry();
			}
		}

		debug!(session_id = self.session_id, "mount supervisor worker exited");
	}

	/// One sweep over the user's registrations. Returns whether every
	/// repo's volume was present.
	#[instrument(skip(self), fields(session_id = self.session_id))]
	async fn mount_all(&self) -> bool {
		let repos = match self
			.registry
			.try_get_active_repos_for_user(&self.user_sid)
			.await
		{
			Ok(repos) => repos,
			Err(err) => {
				// Transient; the next start or volume event retries. The
				// retry timer is left exactly as it was.
				error!("Could not read repo registry: {}", err);
				return true;
			}
		};

		debug!(repos = repos.len(), "running auto-mount sweep");

		let mut all_volumes_present = true;
		for repo in repos {
			let Some(volume_root) = self.platform.volume_root(&repo.enlistment_root) else {
				// A registration without a volume root is malformed;
				// polling will not fix it, same as a failed mount.
				warn!(
					enlistment = %repo.enlistment_root.display(),
					"registered enlistment has no volume root, skipping"
				);
				continue;
			};

			if self.attempted_mounts.lock().await.contains(&repo.enlistment_root) {
				continue;
			}

			if tokio::fs::metadata(&volume_root).await.is_ok() {
				self.attempted_mounts
					.lock()
					.await
					.insert(repo.enlistment_root.clone());
				self.mount_one(&repo).await;
			} else {
				debug!(volume = %volume_root.display(), "volume not yet available");
				all_volumes_present = false;
				self.watch_volume(volume_root).await;
			}
		}

		all_volumes_present
	}

	async fn mount_one(&self, repo: &RepoRegistration) {
		let root = &repo.enlistment_root;
		info!(enlistment = %root.display(), "attempting to mount repo");

		let mounted = self.mount_factory.mount(root).await;

		let message = if mounted {
			format!("The following repo is now mounted:\n{}", root.display())
		} else {
			error!(enlistment = %root.display(), "repo failed to mount");
			format!("The following repo failed to mount:\n{}", root.display())
		};

		self.notifications
			.send_notification(self.session_id, Notification::new(AUTO_MOUNT_TITLE, message))
			.await;
	}

	/// Enqueue a one-shot watcher callback for an absent volume, at most one
	/// outstanding registration per root.
	async fn watch_volume(&self, volume_root: PathBuf) {
		{
			let mut watched = self.watched_roots.lock().await;
			if !watched.insert(volume_root.clone()) {
				return;
			}
		}

		let trigger_tx = self.trigger_tx.clone();
		let root = volume_root.clone();
		self.watcher
			.register(volume_root, move || {
				let _ = trigger_tx.send(SweepTrigger::VolumeAvailable(root));
			})
			.await;
	}

	/// Arm the non-auto-repeating retry timer, if it is not already armed.
	fn arm_retry(&self) {
		if self.retry_armed.swap(true, Ordering::SeqCst) {
			return;
		}

		let trigger_tx = self.trigger_tx.clone();
		let running = self.running.clone();
		let retry_interval = self.retry_interval;
		tokio::spawn(async move {
			tokio::time::sleep(retry_interval).await;
			if *running.read().await {
				let _ = trigger_tx.send(SweepTrigger::Retry);
			}
		});
	}
}
