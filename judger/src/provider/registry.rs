use super::{leetcode::LeetCodeProvider, mock::MockProvider, JudgeError, JudgeResult, Provider};
use crate::config::ClientConfig;
use std::collections::BTreeMap;

pub type ProviderFactory =
    Box<dyn Fn(&ClientConfig) -> JudgeResult<Box<dyn Provider>> + Send + Sync>;

/// Name-keyed table of backend constructors.
///
/// Build one at startup and pass it to whatever assembles a session. Each
/// [`create`](ProviderRegistry::create) call returns a fresh instance with
/// its own credentials and caches.
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    pub fn new() -> ProviderRegistry {
        ProviderRegistry {
            factories: BTreeMap::new(),
        }
    }

    /// A registry with every built-in backend.
    pub fn with_defaults() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.register(LeetCodeProvider::NAME, |cfg| {
            Ok(Box::new(LeetCodeProvider::new(cfg)?))
        });
        registry.register(MockProvider::NAME, |_| Ok(Box::new(MockProvider::new())));
        registry
    }

    /// Register a factory under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ClientConfig) -> JudgeResult<Box<dyn Provider>> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!("Registering provider {}", name);
        self.factories.insert(name, Box::new(factory));
    }

    pub fn create(&self, name: &str, cfg: &ClientConfig) -> JudgeResult<Box<dyn Provider>> {
        match self.factories.get(name) {
            Some(factory) => factory(cfg),
            None => Err(JudgeError::UnknownProvider {
                name: name.to_owned(),
                available: self.available().join(", "),
            }),
        }
    }

    /// Registered names, sorted.
    pub fn available(&self) -> Vec<&str> {
        self.factories.keys().map(|k| k.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_registered() {
        let registry = ProviderRegistry::with_defaults();
        let cfg = ClientConfig::default();
        for name in ["leetcode", "mock"] {
            let provider = registry.create(name, &cfg).unwrap();
            assert_eq!(provider.name(), name);
        }
        assert_eq!(registry.available(), vec!["leetcode", "mock"]);
    }

    #[test]
    fn unknown_provider_lists_available() {
        let registry = ProviderRegistry::with_defaults();
        let err = registry
            .create("nonexistent-provider", &ClientConfig::default())
            .err()
            .unwrap();
        let msg = err.to_string();
        assert!(msg.contains("unknown provider"), "{}", msg);
        assert!(msg.contains("mock"), "{}", msg);
        assert!(msg.contains("leetcode"), "{}", msg);
    }

    #[test]
    fn registries_are_independent() {
        let mut a = ProviderRegistry::new();
        let b = ProviderRegistry::new();
        a.register("mock", |_| Ok(Box::new(MockProvider::new())));
        assert!(a.contains("mock"));
        assert!(!b.contains("mock"));
    }

    #[test]
    fn factory_errors_are_returned() {
        let mut registry = ProviderRegistry::new();
        registry.register("broken", |_| {
            Err(JudgeError::NotFound("broken backend".into()))
        });
        let err = registry.create("broken", &ClientConfig::default()).err().unwrap();
        assert!(matches!(err, JudgeError::NotFound(_)));
    }
}
