//! Placeholder store access using SeaORM

use sea_orm::{
	ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod entities;

/// Schema of the placeholder store.
///
/// The store format is shared with every other reader of the placeholder
/// file. The exact spelling of the table name, column names, TINYINT type
/// and WITHOUT ROWID must be preserved; the schema builder cannot express
/// WITHOUT ROWID, hence raw SQL. Creation is idempotent and the file gets
/// no migration bookkeeping tables.
const CREATE_PLACEHOLDER_TABLE: &str = "CREATE TABLE IF NOT EXISTS Placeholder \
	(path TEXT PRIMARY KEY, pathType TINYINT NOT NULL, sha CHAR(40) NULL) \
	WITHOUT ROWID";

/// Pooled connection to one placeholder store file.
///
/// Every catalog operation checks a connection out of the pool for the scope
/// of its statement and returns it on all exit paths; the pool is the only
/// long-lived handle.
pub struct Database {
	conn: DatabaseConnection,
}

impl Database {
	/// Open the placeholder store at `path`, creating the file and schema
	/// if they do not exist yet.
	pub async fn open(path: &Path) -> Result<Self, DbErr> {
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)
				.map_err(|e| DbErr::Custom(format!("Failed to create directory: {}", e)))?;
		}

		let db_url = format!("sqlite://{}?mode=rwc", path.display());

		let mut opt = ConnectOptions::new(db_url);
		opt.max_connections(8)
			.min_connections(1)
			.connect_timeout(Duration::from_secs(8))
			.acquire_timeout(Duration::from_secs(8))
			.sqlx_logging(false); // We'll use tracing instead

		let conn = SeaDatabase::connect(opt).await?;
		conn.execute_unprepared(CREATE_PLACEHOLDER_TABLE).await?;

		info!("Opened placeholder store at {:?}", path);

		Ok(Self { conn })
	}

	/// Get the database connection
	pub fn conn(&self) -> &DatabaseConnection {
		&self.conn
	}
}
