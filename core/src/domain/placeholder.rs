//! Placeholder records for the filesystem projection layer
//!
//! A placeholder is a virtual entry the projection layer has exposed to the
//! OS without necessarily materializing its content. Every entry ever shown
//! is recorded in the placeholder catalog so that hydration, enumeration and
//! tombstone detection stay consistent across restarts.

use serde::{Deserialize, Serialize};

/// On-disk discriminator for a placeholder entry.
///
/// The numeric values are part of the shared store format and must never be
/// reordered or reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PlaceholderKind {
	File = 0,
	PartialFolder = 1,
	ExpandedFolder = 2,
	/// A folder whose deletion the OS has signalled but the projection layer
	/// has not yet finalized.
	PossibleTombstoneFolder = 3,
}

impl PlaceholderKind {
	/// Decode the stored discriminator. Returns `None` for values outside
	/// the known range.
	pub fn from_db(value: u8) -> Option<Self> {
		match value {
			0 => Some(Self::File),
			1 => Some(Self::PartialFolder),
			2 => Some(Self::ExpandedFolder),
			3 => Some(Self::PossibleTombstoneFolder),
			_ => None,
		}
	}

	pub fn to_db(self) -> u8 {
		self as u8
	}

	/// Every kind other than `File` is a folder variant.
	pub fn is_folder(self) -> bool {
		!matches!(self, Self::File)
	}
}

/// One row of the placeholder catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderEntry {
	/// Repository-relative virtual path, stored verbatim.
	pub path: String,

	pub kind: PlaceholderKind,

	/// 40-character hex content fingerprint. Present for files, always
	/// absent for folder variants. Treated as opaque; never validated.
	pub sha: Option<String>,
}

impl PlaceholderEntry {
	pub fn file(path: impl Into<String>, sha: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			kind: PlaceholderKind::File,
			sha: Some(sha.into()),
		}
	}

	pub fn partial_folder(path: impl Into<String>) -> Self {
		Self::folder(path, PlaceholderKind::PartialFolder)
	}

	pub fn expanded_folder(path: impl Into<String>) -> Self {
		Self::folder(path, PlaceholderKind::ExpandedFolder)
	}

	pub fn possible_tombstone_folder(path: impl Into<String>) -> Self {
		Self::folder(path, PlaceholderKind::PossibleTombstoneFolder)
	}

	fn folder(path: impl Into<String>, kind: PlaceholderKind) -> Self {
		Self {
			path: path.into(),
			kind,
			sha: None,
		}
	}

	pub fn is_folder(&self) -> bool {
		self.kind.is_folder()
	}
}
