//! Check orchestration framework for hookgate
//!
//! This crate implements the part of hookgate with real state:
//!
//! - **Shared context**: memoized repository root and build-target probes,
//!   shared by every check in one run ([`CheckContext`])
//! - **Check abstraction**: identity, file filtering and execution ([`Check`])
//! - **Execution protocol**: build target first, direct tool as fallback,
//!   bounded by a deadline ([`execute`](execute::execute))
//! - **Error taxonomy**: a closed set of failure kinds, each with a
//!   remediation hint ([`CheckError`])
//! - **Orchestrator**: selection, scheduling and aggregation ([`Orchestrator`])
//!
//! # Architecture
//!
//! ```text
//!          hookgate-cli
//!               |
//!        hookgate-checks
//!               |
//!         hookgate-core
//!           |       |
//!   hookgate-git    |
//!           |       |
//!         hookgate-exec
//! ```

pub mod check;
pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod execute;
pub mod orchestrator;
pub mod registry;

pub use check::{
    Category, Check, CheckMetadata, DEFAULT_CHECK_TIMEOUT, Dependency, FilePattern,
    filter_by_patterns,
};
pub use config::{CONFIG_FILE, CheckSection, Config, CustomCheck, RunSection};
pub use context::{CheckContext, DEFAULT_BUILD_TOOL, PROBE_TIMEOUT, TargetProbe};
pub use error::{CheckError, Error, ErrorKind, ExecutionCause, Result};
pub use execute::{Strategy, ToolSpec, Verify, execute};
pub use orchestrator::{
    CheckOutcome, CheckStatus, Orchestrator, RunOptions, RunReport, SkipReason,
};
pub use registry::Registry;
