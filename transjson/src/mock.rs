//! Mock Machine Translator for testing
//!
//! Deterministic, network-free translator used by the test suites and by
//! `--mock` runs of the CLI. Besides the basic modes it can fail for chosen
//! target locales or for the first N calls per text, and it counts calls so
//! tests can assert how often the backend was hit.
//!
//! # Example
//!
//! ```ignore
//! use transjson::{MachineTranslator, MockTranslator, MockMode};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", "en", "fr").await.unwrap();
//!     assert_eq!(result, "hello_fr");
//! }
//! ```

use crate::error::{TranslateError, TranslateResult};
use crate::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_fr"
    Suffix,

    /// Use predefined mappings: (text, target_locale) → translation.
    /// Unknown pairs fall back to suffix mode.
    Mappings(HashMap<(String, String), String>),

    /// Simulate backend errors
    Error(String),

    /// Answer every call with a placeholder such as "--"
    Sentinel(String),

    /// No-op: return input unchanged
    NoOp,
}

/// Mock translator that simulates various translation scenarios
///
/// Clones share their call counters.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
    name: String,
    failing_locales: HashSet<String>,
    fail_first: u32,
    calls: Arc<AtomicUsize>,
    calls_per_text: Arc<Mutex<HashMap<(String, String), u32>>>,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self::with_delay(mode, 0)
    }

    /// Create a MockTranslator with simulated network delay
    ///
    /// ```ignore
    /// let mock = MockTranslator::with_delay(MockMode::Suffix, 50);
    /// // Each translation will have ~50ms delay
    /// ```
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            mode,
            delay_ms,
            name: "Mock Translator".to_string(),
            failing_locales: HashSet::new(),
            fail_first: 0,
            calls: Arc::new(AtomicUsize::new(0)),
            calls_per_text: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Convenience constructor for a mapping-mode mock
    pub fn from_pairs(pairs: &[(&str, &str, &str)]) -> Self {
        let map = pairs
            .iter()
            .map(|(text, locale, translation)| {
                ((text.to_string(), locale.to_string()), translation.to_string())
            })
            .collect();
        Self::new(MockMode::Mappings(map))
    }

    /// Override the provider name reported in logs
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Always fail when translating into `locale`
    pub fn failing_for(mut self, locale: &str) -> Self {
        self.failing_locales.insert(locale.to_string());
        self
    }

    /// Fail the first `n` calls for every (text, target) pair
    pub fn failing_first(mut self, n: u32) -> Self {
        self.fail_first = n;
        self
    }

    /// Total number of `translate` calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of calls made for one (text, target) pair
    pub fn calls_for(&self, text: &str, target_locale: &str) -> u32 {
        self.calls_per_text
            .lock()
            .map(|calls| {
                calls
                    .get(&(text.to_string(), target_locale.to_string()))
                    .copied()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    /// Internal helper to apply the simulated delay
    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    /// Record the call and return its 1-based index for this (text, target)
    fn record_call(&self, text: &str, target: &str) -> u32 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.calls_per_text.lock() {
            Ok(mut calls) => {
                let count = calls
                    .entry((text.to_string(), target.to_string()))
                    .or_insert(0);
                *count += 1;
                *count
            }
            Err(_) => 1,
        }
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, text: &str, target: &str, call: u32) -> TranslateResult<String> {
        if self.failing_locales.contains(target) {
            return Err(TranslateError::TranslationError(format!(
                "{} cannot translate into {}",
                self.name, target
            )));
        }
        if call <= self.fail_first {
            return Err(TranslateError::TranslationError(format!(
                "simulated transient failure (call {})",
                call
            )));
        }

        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Error(msg) => Err(TranslateError::TranslationError(msg.clone())),
            MockMode::Sentinel(value) => Ok(value.clone()),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_locale: &str,
        target_locale: &str,
    ) -> TranslateResult<String> {
        let call = self.record_call(text, target_locale);
        self.apply_delay().await;
        self.apply_translation(text, target_locale, call)
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}
