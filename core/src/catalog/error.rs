//! Catalog-specific error types

use thiserror::Error;

/// Placeholder catalog errors.
///
/// Storage faults are fatal to the operation that hit them; the catalog
/// never retries or migrates on its own.
#[derive(Error, Debug)]
pub enum CatalogError {
	/// Database error
	#[error("Database error: {0}")]
	Database(#[from] sea_orm::DbErr),
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
