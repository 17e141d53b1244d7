//! Prioritised set of translation backends
//!
//! Backends are registered under a module id (`google`, `google2`,
//! `command`, `mock`, ...). Registration order is the fallback priority; the
//! selected module is always moved to the front of the chain.

use crate::command::CommandTranslator;
use crate::config::TranslatorConfig;
use crate::error::{TranslateError, TranslateResult};
use crate::google_free::GoogleFreeProvider;
use crate::google_translate::GoogleTranslateProvider;
use crate::translator::MachineTranslator;
use std::sync::Arc;
use tracing::info;

/// A translator together with the module id it was registered under
#[derive(Clone)]
pub struct Backend {
    pub id: String,
    pub translator: Arc<dyn MachineTranslator>,
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("id", &self.id)
            .field("provider", &self.translator.provider_name())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
    backends: Vec<Backend>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend; re-registering an id replaces it in place
    pub fn register<T>(self, id: &str, translator: T) -> Self
    where
        T: MachineTranslator + 'static,
    {
        self.register_arc(id, Arc::new(translator))
    }

    pub fn register_arc(mut self, id: &str, translator: Arc<dyn MachineTranslator>) -> Self {
        let backend = Backend {
            id: id.to_string(),
            translator,
        };
        match self.backends.iter_mut().find(|b| b.id == id) {
            Some(existing) => *existing = backend,
            None => self.backends.push(backend),
        }
        self
    }

    /// Build the production backends described by the configuration
    ///
    /// `google` is registered when an API key is configured, `google2` always,
    /// and `command` when an external program is configured.
    pub fn from_config(config: &TranslatorConfig) -> TranslateResult<Self> {
        let mut registry = Self::new();

        if let Some(api_key) = &config.google_api_key {
            registry = registry.register("google", GoogleTranslateProvider::new(api_key.clone())?);
        }
        registry = registry.register("google2", GoogleFreeProvider::new()?);
        if let Some(spec) = &config.command {
            registry = registry.register(
                "command",
                CommandTranslator::new(spec.clone(), config.staging_dir.clone()),
            );
        }

        info!("Registered translation backends: {:?}", registry.ids());
        Ok(registry)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.id.as_str()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.backends.iter().any(|b| b.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Ordered chain for one request
    ///
    /// `preferred` goes first when registered. With `fallback` the remaining
    /// backends follow in registration order; without it the chain has a
    /// single entry.
    pub fn chain(&self, preferred: &str, fallback: bool) -> TranslateResult<Vec<Backend>> {
        let mut chain: Vec<Backend> = Vec::with_capacity(self.backends.len());
        if let Some(first) = self.backends.iter().find(|b| b.id == preferred) {
            chain.push(first.clone());
        }
        if fallback || chain.is_empty() {
            chain.extend(self.backends.iter().filter(|b| b.id != preferred).cloned());
        }
        if !fallback {
            chain.truncate(1);
        }

        if chain.is_empty() {
            return Err(TranslateError::ConfigError(
                "no translation backends are registered".to_string(),
            ));
        }
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockMode, MockTranslator};

    fn registry() -> BackendRegistry {
        BackendRegistry::new()
            .register("a", MockTranslator::new(MockMode::Suffix))
            .register("b", MockTranslator::new(MockMode::NoOp))
            .register("c", MockTranslator::new(MockMode::Error("down".into())))
    }

    fn ids(chain: &[Backend]) -> Vec<&str> {
        chain.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_registration_order() {
        assert_eq!(registry().ids(), vec!["a", "b", "c"]);
        assert!(registry().contains("b"));
        assert!(!registry().contains("z"));
    }

    #[test]
    fn test_reregister_replaces_in_place() {
        let registry = registry().register("b", MockTranslator::new(MockMode::Suffix));
        assert_eq!(registry.ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_chain_preferred_first() {
        let chain = registry().chain("b", true).unwrap();
        assert_eq!(ids(&chain), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_chain_without_fallback() {
        let chain = registry().chain("c", false).unwrap();
        assert_eq!(ids(&chain), vec!["c"]);
    }

    #[test]
    fn test_chain_unknown_preferred_uses_priority_order() {
        assert_eq!(ids(&registry().chain("zz", true).unwrap()), vec!["a", "b", "c"]);
        assert_eq!(ids(&registry().chain("zz", false).unwrap()), vec!["a"]);
    }

    #[test]
    fn test_empty_registry_chain_fails() {
        assert!(BackendRegistry::new().chain("google2", true).is_err());
    }

    #[test]
    fn test_from_config_registers_keyless_backend() {
        let registry = BackendRegistry::from_config(&TranslatorConfig::default()).unwrap();
        assert_eq!(registry.ids(), vec!["google2"]);

        let mut config = TranslatorConfig::default()
            .with_command(crate::command::CommandSpec::jsontt("jsontt"));
        config.google_api_key = Some("key".to_string());
        let registry = BackendRegistry::from_config(&config).unwrap();
        assert_eq!(registry.ids(), vec!["google", "google2", "command"]);
    }
}
