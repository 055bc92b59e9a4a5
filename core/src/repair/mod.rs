//! Offline Git ref repair
//!
//! Diagnoses missing or malformed ref files directly on disk (the repo may
//! be too corrupted for git itself to start) and reconstructs each damaged
//! ref from the tail of its reflog. Repair is forbidden while a rebase,
//! merge, bisect, cherry-pick or revert is in progress.
//!
//! The whole module is synchronous: it runs in an offline repair mode with
//! exclusive access to `.git/`, never next to a live projection.

mod engine;
mod reflog;
mod refs;

pub use engine::{FixResult, IssueStatus, RefRepairer};
pub use reflog::RefLogEntry;
pub use refs::{valid_ref_contents, HeadRefs, LocalBranchRefs, RefFamily};
