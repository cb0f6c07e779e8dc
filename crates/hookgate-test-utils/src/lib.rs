//! Shared test utilities for the hookgate workspace.
//!
//! This crate is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`git`]: git repository fixtures at three realism levels
//! - [`repo`]: [`TestRepo`](repo::TestRepo) for writing and staging files
//! - [`runner`]: [`ScriptedRunner`](runner::ScriptedRunner), a fake
//!   `CommandRunner` that records every invocation

pub mod git;
pub mod repo;
pub mod runner;

pub use repo::TestRepo;
pub use runner::{Reply, ScriptedRunner};
