//! Volume availability primitives
//!
//! This module provides the shared one-shot "fire when this volume becomes
//! reachable" watcher and the platform seam for resolving a path's volume
//! root. Both the watcher and the mount supervisor poll at the same cadence.

mod platform;
mod watcher;

pub use platform::{volume_root_of, OsVolumePlatform, VolumePlatform};
pub use watcher::VolumeWatcher;

use std::time::Duration;

/// Poll cadence shared by the volume watcher and the mount supervisor's
/// retry timer.
pub const VOLUME_POLL_INTERVAL: Duration = Duration::from_secs(15);
