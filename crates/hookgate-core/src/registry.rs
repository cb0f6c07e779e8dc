//! Ordered collection of available checks

use std::collections::HashMap;
use std::sync::Arc;

use crate::check::Check;
use crate::error::{Error, Result};

/// Checks keyed by name, iterated in registration order.
#[derive(Default, Clone)]
pub struct Registry {
    checks: Vec<Arc<dyn Check>>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("checks", &self.names()).finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a check. Names must be unique.
    pub fn register(&mut self, check: Arc<dyn Check>) -> Result<()> {
        let name = check.name().to_string();
        if self.index.contains_key(&name) {
            return Err(Error::DuplicateCheck { name });
        }
        tracing::debug!(check = %name, "Registered check");
        self.index.insert(name, self.checks.len());
        self.checks.push(check);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Check>> {
        self.index.get(name).map(|&i| &self.checks[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.checks.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Check>> {
        self.checks.iter()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
