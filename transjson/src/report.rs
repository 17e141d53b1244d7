//! Result and status types returned by the orchestrator
//!
//! Every (language, key) pair ends in exactly one [`KeyStatus`], so callers
//! can tell a genuine translation apart from a copy of the source text.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    /// A backend produced an accepted translation
    Translated,
    /// Every attempt failed; the source value was kept
    Fallback,
    /// Every attempt failed and the policy does not allow the source value
    Failed,
    /// Not a translatable string (non-string or blank); copied verbatim
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyReport {
    pub status: KeyStatus,
    pub attempts: u32,
    /// Module id that produced the accepted value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    pub duration_ms: u64,
    /// Last failure seen for this key, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl KeyReport {
    pub fn unchanged() -> Self {
        Self {
            status: KeyStatus::Unchanged,
            attempts: 0,
            backend: None,
            duration_ms: 0,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageStatus {
    Complete,
    Partial,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageReport {
    pub status: LanguageStatus,
    pub completeness: f64,
    pub translated: usize,
    pub fallback: usize,
    pub failed: usize,
    pub unchanged: usize,
    /// Rounds in which this language had work scheduled
    pub rounds: u32,
    /// Cumulative backend time over all keys
    pub backend_time_ms: u64,
    pub keys: BTreeMap<String, KeyReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// Every requested language succeeded
    Complete,
    /// Some languages failed entirely, at least one succeeded
    Partial,
    /// No language produced an accepted result
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationSummary {
    pub status: OutcomeStatus,
    pub policy: String,
    pub from: String,
    /// Backend chain in the order it was tried
    pub backends: Vec<String>,
    pub languages: BTreeMap<String, LanguageReport>,
    pub failed_languages: Vec<String>,
    pub duration_ms: u64,
}

impl TranslationSummary {
    /// Whether any key ran into a per-attempt timeout
    pub fn saw_timeouts(&self) -> bool {
        self.languages.values().any(|lang| {
            lang.keys
                .values()
                .any(|key| key.error.as_deref().is_some_and(|e| e.contains("timed out")))
        })
    }

    /// Operator hints for a request in which every language failed
    pub fn suggestions(&self, available_modules: &[&str]) -> Vec<String> {
        let mut hints = vec![
            "Reduce 'concurrencylimit' to ease backend rate limits".to_string(),
            format!(
                "Switch backend with the 'module' field (available: {})",
                available_modules.join(", ")
            ),
            "Increase 'retryAttempts' or the retry delay between attempts".to_string(),
        ];
        if self.saw_timeouts() {
            hints.push("Raise TRANSLATE_ATTEMPT_TIMEOUT_MS; some attempts timed out".to_string());
        }
        hints
    }
}

/// Translated mappings plus the per-language/per-key report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationOutcome {
    /// language code → translated object, for every language that did not fail
    pub output: Map<String, Value>,
    pub summary: TranslationSummary,
}

impl TranslationOutcome {
    pub fn status(&self) -> OutcomeStatus {
        self.summary.status
    }

    pub fn language(&self, code: &str) -> Option<&Map<String, Value>> {
        self.output.get(code).and_then(Value::as_object)
    }

    pub fn report(&self, code: &str) -> Option<&LanguageReport> {
        self.summary.languages.get(code)
    }

    pub fn key_report(&self, code: &str, key: &str) -> Option<&KeyReport> {
        self.report(code).and_then(|lang| lang.keys.get(key))
    }
}
