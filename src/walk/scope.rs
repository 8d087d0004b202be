use std::collections::HashMap;

/// Block-scoped "has this destination been reserved" flags.
///
/// Entering a nested block, branch or loop body takes a [`child`](Self::child)
/// copy; whatever the child records is dropped with it.
#[derive(Debug, Clone, Default)]
pub struct ScopeEnv {
    reserved: HashMap<String, bool>,
}

impl ScopeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value copy of this environment for a nested scope.
    pub fn child(&self) -> ScopeEnv {
        self.clone()
    }

    pub fn set(&mut self, key: impl Into<String>, reserved: bool) {
        self.reserved.insert(key.into(), reserved);
    }

    pub fn is_reserved(&self, key: &str) -> bool {
        self.reserved.get(key).copied().unwrap_or(false)
    }
}
