//! Automatic mounting of registered repositories
//!
//! One supervisor runs per login session. It reads the user's registrations,
//! mounts every repo whose volume is reachable, and keeps retrying the rest
//! until their volumes appear or the session ends.

mod factory;
mod registry;
mod supervisor;

pub use factory::MountFactory;
pub use registry::{FileRepoRegistry, RegistryError, RepoRegistry};
pub use supervisor::{MountSupervisor, AUTO_MOUNT_TITLE};
