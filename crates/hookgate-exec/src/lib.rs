//! Subprocess execution for hookgate
//!
//! Every external tool hookgate talks to (git, make, formatters, linters)
//! goes through the [`CommandRunner`] trait so that deadlines and
//! cancellation are enforced in one place, and so that tests can swap in a
//! scripted runner.

pub mod deadline;
pub mod error;
mod group;
pub mod invocation;
pub mod runner;

pub use deadline::{CancelSource, CancelToken, Deadline};
pub use error::{Error, Result};
pub use invocation::{CommandOutput, Invocation};
pub use runner::{CommandRunner, SystemRunner};
