//! Command implementations for hookgate-cli

pub mod hooks;
pub mod list;
pub mod run;

pub use hooks::{run_install, run_status, run_uninstall};
pub use list::run_list;
pub use run::run_checks;
