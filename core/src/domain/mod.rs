//! Pure domain types shared across the core

mod placeholder;
mod registration;

pub use placeholder::{PlaceholderEntry, PlaceholderKind};
pub use registration::RepoRegistration;
