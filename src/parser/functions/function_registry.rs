use std::{collections::HashMap, sync::Arc};

use crate::parser::functions::{CountImpl, PathFunction, ResolveImpl, ReverseResolveImpl};

/// Registry of path functions, looked up by exact name.
#[derive(Default)]
pub struct FunctionRegistry {
    by_name: HashMap<String, Arc<dyn PathFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self { Self { by_name: HashMap::new() } }

    pub fn register<I: PathFunction + 'static>(&mut self, impl_: I) {
        self.by_name.insert(impl_.name().to_string(), Arc::new(impl_));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PathFunction>> {
        self.by_name.get(name).cloned()
    }

    pub fn list(&self) -> Vec<String> {
        let mut v: Vec<_> = self.by_name.keys().cloned().collect();
        v.sort();
        v
    }

    pub fn default_function_registry() -> Self {
        let mut registry = Self::new();
        registry.register(CountImpl);
        registry.register(ResolveImpl);
        registry.register(ReverseResolveImpl);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_contains_defaults_and_lookup_is_exact() {
        let r = FunctionRegistry::default_function_registry();
        assert_eq!(r.list(), vec!["count", "resolve", "reverseResolve"]);

        assert!(r.get("count").is_some());
        assert!(r.get("reverseResolve").is_some());
        assert!(r.get("COUNT").is_none());
        assert!(r.get("reverseresolve").is_none());
    }
}
