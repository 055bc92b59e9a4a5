//! Placeholder Catalog - durable index of every projected virtual entry
//!
//! The projection layer records each virtual file or folder it exposes to
//! the OS as a row keyed by path. Hydration on open, enumeration on readdir
//! and tombstone detection all read this catalog, so every operation here is
//! a single atomic statement against the shared store.

mod error;

pub use error::{CatalogError, Result};

use crate::domain::{PlaceholderEntry, PlaceholderKind};
use crate::infrastructure::database::{entities::placeholder, Database};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Handle to the placeholder table of one enlistment's store.
///
/// Cheap to clone; operations may be issued concurrently from any number of
/// threads, each running on its own pooled connection. There are no
/// cross-operation transactions.
#[derive(Clone)]
pub struct PlaceholderCatalog {
	db: Arc<Database>,
}

impl PlaceholderCatalog {
	pub fn new(db: Arc<Database>) -> Self {
		Self { db }
	}

	/// Open (and create if missing) the store at `path` and return a catalog
	/// over it.
	pub async fn open(path: &Path) -> Result<Self> {
		let db = Database::open(path).await?;
		Ok(Self::new(Arc::new(db)))
	}

	/// Exact number of placeholder rows at a transactional snapshot.
	pub async fn count(&self) -> Result<u64> {
		let count = placeholder::Entity::find().count(self.db.conn()).await?;
		Ok(count)
	}

	/// Single scan of the whole catalog, classified into file and folder
	/// entries. Order is unspecified.
	pub async fn get_all_entries(&self) -> Result<(Vec<PlaceholderEntry>, Vec<PlaceholderEntry>)> {
		let rows = placeholder::Entity::find().all(self.db.conn()).await?;

		let mut files = Vec::new();
		let mut folders = Vec::new();
		for row in rows {
			let entry = row.try_into_entry()?;
			if entry.is_folder() {
				folders.push(entry);
			} else {
				files.push(entry);
			}
		}

		debug!(
			files = files.len(),
			folders = folders.len(),
			"enumerated placeholder catalog"
		);

		Ok((files, folders))
	}

	/// The path of every file-typed placeholder, as a set.
	pub async fn get_all_file_paths(&self) -> Result<HashSet<String>> {
		let rows = placeholder::Entity::find()
			.filter(placeholder::Column::PathType.eq(PlaceholderKind::File.to_db()))
			.all(self.db.conn())
			.await?;

		Ok(rows.into_iter().map(|row| row.path).collect())
	}

	/// Insert-or-replace by path. A second add for the same path overwrites
	/// kind and sha atomically. Folder entries are stored with a NULL sha
	/// regardless of input.
	pub async fn add(&self, entry: &PlaceholderEntry) -> Result<()> {
		let sha = if entry.kind.is_folder() {
			None
		} else {
			entry.sha.clone()
		};

		let model = placeholder::ActiveModel {
			path: Set(entry.path.clone()),
			path_type: Set(entry.kind.to_db()),
			sha: Set(sha),
		};

		placeholder::Entity::insert(model)
			.on_conflict(
				OnConflict::column(placeholder::Column::Path)
					.update_columns([placeholder::Column::PathType, placeholder::Column::Sha])
					.to_owned(),
			)
			.exec_without_returning(self.db.conn())
			.await?;

		Ok(())
	}

	pub async fn add_file(&self, path: &str, sha: &str) -> Result<()> {
		self.add(&PlaceholderEntry::file(path, sha)).await
	}

	pub async fn add_partial_folder(&self, path: &str) -> Result<()> {
		self.add(&PlaceholderEntry::partial_folder(path)).await
	}

	pub async fn add_expanded_folder(&self, path: &str) -> Result<()> {
		self.add(&PlaceholderEntry::expanded_folder(path)).await
	}

	pub async fn add_possible_tombstone_folder(&self, path: &str) -> Result<()> {
		self.add(&PlaceholderEntry::possible_tombstone_folder(path))
			.await
	}

	/// Remove the row for `path`. Silent if no such row exists.
	pub async fn remove(&self, path: &str) -> Result<()> {
		placeholder::Entity::delete_by_id(path)
			.exec(self.db.conn())
			.await?;
		Ok(())
	}
}
