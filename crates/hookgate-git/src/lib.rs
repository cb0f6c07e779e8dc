//! Git access for hookgate
//!
//! Two independent pieces:
//!
//! - [`Repository`] lists changed and tracked files by shelling out to `git`
//!   through a [`hookgate_exec::CommandRunner`].
//! - [`HookInstaller`] manages the hook script in the repository's hooks
//!   directory, refusing to touch hooks it did not write.

pub mod error;
pub mod hooks;
pub mod repository;

pub use error::{Error, Result};
pub use hooks::{HOOK_MARKER, HookInstaller, HookState, HookType, InstallOutcome, hook_script};
pub use repository::{DEFAULT_GIT_TIMEOUT, DiffStatus, Repository, parse_lines};
