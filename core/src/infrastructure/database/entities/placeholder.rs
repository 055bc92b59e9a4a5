//! Placeholder entity

use crate::domain::{PlaceholderEntry, PlaceholderKind};
use sea_orm::entity::prelude::*;
use sea_orm::DbErr;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "Placeholder")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	pub path: String,
	#[sea_orm(column_name = "pathType")]
	pub path_type: u8,
	pub sha: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
	/// Convert database model to a domain entry.
	///
	/// Folder rows always read back with `sha = None`, whatever the row
	/// holds on disk.
	pub fn try_into_entry(self) -> Result<PlaceholderEntry, DbErr> {
		let kind = PlaceholderKind::from_db(self.path_type).ok_or_else(|| {
			DbErr::Custom(format!(
				"unknown placeholder type value {} for '{}'",
				self.path_type, self.path
			))
		})?;

		let sha = if kind.is_folder() { None } else { self.sha };

		Ok(PlaceholderEntry {
			path: self.path,
			kind,
			sha,
		})
	}
}
