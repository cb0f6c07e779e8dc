//! Built-in checks for hookgate.
//!
//! Every check here is a [`ToolCheck`]: metadata plus a
//! [`ToolSpec`](hookgate_core::ToolSpec) run through the shared
//! build-target-first protocol.

pub mod custom;
pub mod go;
pub mod tool;

use std::sync::Arc;

use hookgate_core::{Config, Registry, Result};

pub use custom::custom_check;
pub use tool::ToolCheck;

/// Registry with `go-fmt`, `go-lint` and `go-mod-tidy`, in that order.
pub fn builtin_registry() -> Registry {
    let mut registry = Registry::new();
    for check in go::all() {
        // Built-in names are distinct constants.
        let _ = registry.register(Arc::new(check));
    }
    registry
}

/// Built-in checks followed by the `[[custom]]` entries of `config`.
///
/// A custom check reusing a built-in name is rejected.
pub fn registry_for(config: &Config) -> Result<Registry> {
    let mut registry = builtin_registry();
    for custom in &config.custom {
        registry.register(Arc::new(custom_check(custom)))?;
    }
    Ok(registry)
}
