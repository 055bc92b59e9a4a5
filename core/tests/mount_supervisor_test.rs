//! Mount supervisor integration tests

use async_trait::async_trait;
use gvfs_core::domain::RepoRegistration;
use gvfs_core::mount::{
	MountFactory, MountSupervisor, RegistryError, RepoRegistry, AUTO_MOUNT_TITLE,
};
use gvfs_core::notifications::Notifier;
use gvfs_core::volume::{VolumePlatform, VolumeWatcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::{sleep, timeout};

const TICK: Duration = Duration::from_millis(25);
const USER_SID: &str = "S-1-5-21-100";

struct StaticRegistry {
	repos: Vec<RepoRegistration>,
}

#[async_trait]
impl RepoRegistry for StaticRegistry {
	async fn try_get_active_repos_for_user(
		&self,
		user_sid: &str,
	) -> Result<Vec<RepoRegistration>, RegistryError> {
		Ok(self
			.repos
			.iter()
			.filter(|repo| repo.is_active && repo.owner_sid == user_sid)
			.cloned()
			.collect())
	}
}

struct FailingRegistry;

#[async_trait]
impl RepoRegistry for FailingRegistry {
	async fn try_get_active_repos_for_user(
		&self,
		_user_sid: &str,
	) -> Result<Vec<RepoRegistration>, RegistryError> {
		Err(RegistryError::Io(std::io::Error::new(
			std::io::ErrorKind::PermissionDenied,
			"registry unreadable",
		)))
	}
}

/// Records every mount request; roots listed in `fail_roots` report failure.
struct RecordingMountFactory {
	mounts: Mutex<Vec<PathBuf>>,
	fail_roots: Vec<PathBuf>,
}

impl RecordingMountFactory {
	fn new() -> Arc<Self> {
		Self::failing_for(Vec::new())
	}

	fn failing_for(fail_roots: Vec<PathBuf>) -> Arc<Self> {
		Arc::new(Self {
			mounts: Mutex::new(Vec::new()),
			fail_roots,
		})
	}

	fn mounted(&self) -> Vec<PathBuf> {
		self.mounts.lock().unwrap().clone()
	}
}

#[async_trait]
impl MountFactory for RecordingMountFactory {
	fn current_user_sid(&self) -> String {
		USER_SID.to_string()
	}

	async fn mount(&self, enlistment_root: &Path) -> bool {
		self.mounts.lock().unwrap().push(enlistment_root.to_path_buf());
		!self.fail_roots.iter().any(|root| root == enlistment_root)
	}
}

/// Maps each enlistment to a test-controlled "volume" directory.
struct MapPlatform {
	roots: HashMap<PathBuf, PathBuf>,
}

impl VolumePlatform for MapPlatform {
	fn volume_root(&self, path: &Path) -> Option<PathBuf> {
		self.roots.get(path).cloned()
	}
}

async fn wait_until(condition: impl Fn() -> bool) {
	timeout(Duration::from_secs(5), async {
		while !condition() {
			sleep(Duration::from_millis(10)).await;
		}
	})
	.await
	.expect("condition not reached in time");
}

fn build_supervisor(
	registry: Arc<dyn RepoRegistry>,
	factory: Arc<RecordingMountFactory>,
	platform: MapPlatform,
) -> (Arc<MountSupervisor>, Arc<Notifier>, Arc<VolumeWatcher>) {
	let notifier = Notifier::new();
	let watcher = Arc::new(VolumeWatcher::with_interval(TICK));
	let supervisor = MountSupervisor::with_platform(
		1,
		registry,
		factory,
		notifier.clone(),
		watcher.clone(),
		Arc::new(platform),
		TICK,
	);
	(supervisor, notifier, watcher)
}

#[tokio::test]
async fn repos_mount_as_their_volumes_appear() {
	let dir = TempDir::new().unwrap();
	let vol1 = dir.path().join("vol1");
	let vol2 = dir.path().join("vol2");
	std::fs::create_dir(&vol1).unwrap();

	let enl1 = vol1.join("repo1");
	let enl2 = vol2.join("repo2");

	let registry = Arc::new(StaticRegistry {
		repos: vec![
			RepoRegistration::new(&enl1, USER_SID),
			RepoRegistration::new(&enl2, USER_SID),
		],
	});
	let factory = RecordingMountFactory::new();
	let platform = MapPlatform {
		roots: HashMap::from([(enl1.clone(), vol1.clone()), (enl2.clone(), vol2.clone())]),
	};

	let (supervisor, notifier, _watcher) =
		build_supervisor(registry, factory.clone(), platform);
	supervisor.clone().start().await;

	// First sweep mounts only the repo whose volume is present.
	wait_until(|| factory.mounted().contains(&enl1)).await;
	assert!(!factory.mounted().contains(&enl2));

	// Volume two arrives; the retry/watcher path picks up the second repo.
	std::fs::create_dir(&vol2).unwrap();
	wait_until(|| factory.mounted().contains(&enl2)).await;

	// Later sweeps must not re-mount repos already attempted: one mount
	// per repo, however many retry/watcher sweeps ran.
	sleep(TICK * 6).await;
	let mounted = factory.mounted();
	assert_eq!(mounted.len(), 2);
	assert!(mounted.contains(&enl1) && mounted.contains(&enl2));

	let notifications = notifier.get_notifications().await;
	assert_eq!(notifications.len(), 2);
	assert!(notifications
		.iter()
		.all(|(_, note)| note.title == AUTO_MOUNT_TITLE));
	assert!(notifications.iter().any(|(_, note)| {
		note.message.contains("now mounted") && note.message.contains(&enl2.display().to_string())
	}));

	supervisor.dispose().await;
}

#[tokio::test]
async fn mount_failure_is_reported_but_not_retried() {
	let dir = TempDir::new().unwrap();
	let vol = dir.path().join("vol");
	std::fs::create_dir(&vol).unwrap();
	let enl = vol.join("repo");

	let registry = Arc::new(StaticRegistry {
		repos: vec![RepoRegistration::new(&enl, USER_SID)],
	});
	let factory = RecordingMountFactory::failing_for(vec![enl.clone()]);
	let platform = MapPlatform {
		roots: HashMap::from([(enl.clone(), vol.clone())]),
	};

	let (supervisor, notifier, _watcher) =
		build_supervisor(registry, factory.clone(), platform);
	supervisor.clone().start().await;

	wait_until(|| !factory.mounted().is_empty()).await;

	// All volumes were present, so the retry timer is never armed; the
	// failed mount is not attempted again.
	sleep(TICK * 6).await;
	assert_eq!(factory.mounted().len(), 1);

	let notifications = notifier.get_notifications().await;
	assert!(notifications.iter().any(|(_, note)| {
		note.message.contains("failed to mount") && note.message.contains(&enl.display().to_string())
	}));

	supervisor.dispose().await;
}

#[tokio::test]
async fn failed_mount_is_not_reattempted_by_volume_retries() {
	let dir = TempDir::new().unwrap();
	let vol1 = dir.path().join("vol1");
	let vol2 = dir.path().join("vol2");
	std::fs::create_dir(&vol1).unwrap();

	let doomed = vol1.join("doomed");
	let waiting = vol2.join("waiting");

	let registry = Arc::new(StaticRegistry {
		repos: vec![
			RepoRegistration::new(&doomed, USER_SID),
			RepoRegistration::new(&waiting, USER_SID),
		],
	});
	let factory = RecordingMountFactory::failing_for(vec![doomed.clone()]);
	let platform = MapPlatform {
		roots: HashMap::from([(doomed.clone(), vol1.clone()), (waiting.clone(), vol2.clone())]),
	};

	let (supervisor, notifier, _watcher) =
		build_supervisor(registry, factory.clone(), platform);
	supervisor.clone().start().await;

	wait_until(|| factory.mounted().contains(&doomed)).await;

	// The absent volume keeps the retry timer armed, but the sweeps it
	// drives must not re-attempt the failed mount.
	sleep(TICK * 6).await;
	assert_eq!(factory.mounted(), vec![doomed.clone()]);

	std::fs::create_dir(&vol2).unwrap();
	wait_until(|| factory.mounted().contains(&waiting)).await;
	sleep(TICK * 6).await;
	assert_eq!(factory.mounted(), vec![doomed.clone(), waiting.clone()]);

	// One failure notification for the doomed repo, one success for the
	// other; no duplicates from the retry sweeps.
	let notifications = notifier.get_notifications().await;
	assert_eq!(notifications.len(), 2);
	assert_eq!(
		notifications
			.iter()
			.filter(|(_, note)| note.message.contains("failed to mount"))
			.count(),
		1
	);

	supervisor.dispose().await;
}

#[tokio::test]
async fn inactive_and_foreign_repos_are_ignored() {
	let dir = TempDir::new().unwrap();
	let vol = dir.path().join("vol");
	std::fs::create_dir(&vol).unwrap();

	let mine = vol.join("mine");
	let inactive = vol.join("inactive");
	let foreign = vol.join("foreign");

	let mut inactive_reg = RepoRegistration::new(&inactive, USER_SID);
	inactive_reg.is_active = false;

	let registry = Arc::new(StaticRegistry {
		repos: vec![
			RepoRegistration::new(&mine, USER_SID),
			inactive_reg,
			RepoRegistration::new(&foreign, "S-1-5-21-999"),
		],
	});
	let factory = RecordingMountFactory::new();
	let platform = MapPlatform {
		roots: HashMap::from([
			(mine.clone(), vol.clone()),
			(inactive.clone(), vol.clone()),
			(foreign.clone(), vol.clone()),
		]),
	};

	let (supervisor, _notifier, _watcher) =
		build_supervisor(registry, factory.clone(), platform);
	supervisor.clone().start().await;

	wait_until(|| !factory.mounted().is_empty()).await;
	assert_eq!(factory.mounted(), vec![mine]);

	supervisor.dispose().await;
}

#[tokio::test]
async fn registry_failure_leaves_supervisor_quiescent() {
	let factory = RecordingMountFactory::new();
	let (supervisor, notifier, _watcher) = build_supervisor(
		Arc::new(FailingRegistry),
		factory.clone(),
		MapPlatform {
			roots: HashMap::new(),
		},
	);
	supervisor.clone().start().await;

	sleep(TICK * 6).await;
	assert!(factory.mounted().is_empty());
	assert!(notifier.get_notifications().await.is_empty());

	supervisor.dispose().await;
}

#[tokio::test]
async fn dispose_stops_pending_volume_sweeps() {
	let dir = TempDir::new().unwrap();
	let vol = dir.path().join("vol");
	let enl = vol.join("repo");

	let registry = Arc::new(StaticRegistry {
		repos: vec![RepoRegistration::new(&enl, USER_SID)],
	});
	let factory = RecordingMountFactory::new();
	let platform = MapPlatform {
		roots: HashMap::from([(enl.clone(), vol.clone())]),
	};

	let (supervisor, _notifier, watcher) =
		build_supervisor(registry, factory.clone(), platform);
	supervisor.clone().start().await;

	sleep(TICK * 3).await;
	supervisor.dispose().await;

	// The volume shows up after disposal; no sweep may run.
	std::fs::create_dir(&vol).unwrap();
	sleep(TICK * 6).await;
	assert!(factory.mounted().is_empty());

	watcher.dispose().await;
}
