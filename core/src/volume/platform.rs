//! Volume root resolution
//!
//! The supervisor asks the platform which volume an enlistment lives on and
//! whether that volume is currently reachable. The OS implementation derives
//! the volume root from the path itself; tests substitute a mapping.

use std::path::{Component, Path, PathBuf};

/// Resolves the volume root containing a path.
pub trait VolumePlatform: Send + Sync {
	/// The mount point of the block device containing `path`, or `None` for
	/// a path with no volume (e.g. a relative path).
	fn volume_root(&self, path: &Path) -> Option<PathBuf>;
}

/// Platform implementation backed by the host path syntax.
pub struct OsVolumePlatform;

impl VolumePlatform for OsVolumePlatform {
	fn volume_root(&self, path: &Path) -> Option<PathBuf> {
		volume_root_of(path)
	}
}

/// Volume root of `path`: the drive prefix on Windows, the filesystem root
/// elsewhere. Relative paths have no volume root.
pub fn volume_root_of(path: &Path) -> Option<PathBuf> {
	match path.components().next()? {
		Component::Prefix(prefix) => {
			let mut root = PathBuf::from(prefix.as_os_str());
			root.push(std::path::MAIN_SEPARATOR_STR);
			Some(root)
		}
		Component::RootDir => Some(PathBuf::from(std::path::MAIN_SEPARATOR_STR)),
		_ => None,
	}
}
