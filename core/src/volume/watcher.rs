//! One-shot volume availability watcher

use super::VOLUME_POLL_INTERVAL;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

type VolumeCallback = Box<dyn FnOnce() + Send + 'static>;

struct WatcherState {
	/// Pending callbacks keyed by volume path, in registration order.
	bindings: HashMap<PathBuf, Vec<VolumeCallback>>,
	/// Whether the poll task is currently armed.
	poll_active: bool,
	disposed: bool,
}

/// Fires registered callbacks once their volume path is observed to exist.
///
/// A single poll task re-arms itself while any binding is pending and goes
/// idle otherwise. Callbacks fire at most once, serially, in registration
/// order for a given path; the only cancellation is [`dispose`], which drops
/// every pending callback.
///
/// Callbacks run on the poll task while the watcher lock is held, so they
/// must not call back into the watcher; hand off to a channel for anything
/// nontrivial.
///
/// [`dispose`]: VolumeWatcher::dispose
pub struct VolumeWatcher {
	state: Arc<Mutex<WatcherState>>,
	poll_interval: Duration,
}

impl VolumeWatcher {
	pub fn new() -> Self {
		Self::with_interval(VOLUME_POLL_INTERVAL)
	}

	/// Watcher polling at a custom cadence. Production uses
	/// [`VOLUME_POLL_INTERVAL`]; tests run at millisecond cadence.
	pub fn with_interval(poll_interval: Duration) -> Self {
		Self {
			state: Arc::new(Mutex::new(WatcherState {
				bindings: HashMap::new(),
				poll_active: false,
				disposed: false,
			})),
			poll_interval,
		}
	}

	/// Register a one-shot callback for `volume_path`, starting the poll
	/// task if it is idle.
	///
	/// Never fails; registrations for an already-watched path accumulate and
	/// all fire together when the volume appears. After [`dispose`] the
	/// callback is silently dropped.
	///
	/// [`dispose`]: VolumeWatcher::dispose
	pub async fn register(
		&self,
		volume_path: impl Into<PathBuf>,
		callback: impl FnOnce() + Send + 'static,
	) {
		let volume_path = volume_path.into();
		let mut state = self.state.lock().await;

		if state.disposed {
			debug!(
				volume = %volume_path.display(),
				"registration after dispose, dropping callback"
			);
			return;
		}

		state
			.bindings
			.entry(volume_path)
			.or_default()
			.push(Box::new(callback));

		if !state.poll_active {
			state.poll_active = true;
			tokio::spawn(Self::run_poll_loop(self.state.clone(), self.poll_interval));
		}
	}

	/// Number of volume paths still being watched.
	pub async fn pending_registrations(&self) -> usize {
		self.state.lock().await.bindings.len()
	}

	/// Stop the poll task and drop all pending callbacks.
	///
	/// Waits out an in-flight tick (the tick holds the state lock for its
	/// whole sweep), so no callback fires after this returns.
	pub async fn dispose(&self) {
		let mut state = self.state.lock().await;
		state.disposed = true;

		let dropped: usize = state.bindings.values().map(Vec::len).sum();
		state.bindings.clear();
		if dropped > 0 {
			debug!(dropped, "volume watcher disposed with pending callbacks");
		}
	}

	/// Self-re-armed tick: each pass decides whether to schedule the next,
	/// so ticks never overlap.
	async fn run_poll_loop(state: Arc<Mutex<WatcherState>>, poll_interval: Duration) {
		loop {
			tokio::time::sleep(poll_interval).await;

			let mut state = state.lock().await;
			if state.disposed {
				state.poll_active = false;
				return;
			}

			let available: Vec<PathBuf> = state
				.bindings
				.keys()
				.filter(|path| path.is_dir())
				.cloned()
				.collect();

			for path in available {
				// Remove the binding before firing so a misbehaving callback
				// can never leave it half-removed.
				if let Some(callbacks) = state.bindings.remove(&path) {
					debug!(
						volume = %path.display(),
						callbacks = callbacks.len(),
						"volume is now available"
					);
					for callback in callbacks {
						callback();
					}
				}
			}

			if state.bindings.is_empty() {
				state.poll_active = false;
				return;
			}
		}
	}
}

impl Default for VolumeWatcher {
	fn default() -> Self {
		Self::new()
	}
}
