//! Orchestrator configuration
//!
//! Everything the orchestrator would otherwise read from globals (supported
//! languages, concurrency, retry timing, failure policy, sentinel values)
//! lives in [`TranslatorConfig`], built once at startup and passed in.

use crate::command::CommandSpec;
use crate::error::{TranslateError, TranslateResult};
use crate::languages::default_language_set;
use crate::retry::RetryPolicy;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

/// What happens to a key whose every attempt failed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailurePolicy {
    /// Keep the source text and mark the key as a fallback
    Fallback,
    /// Any failed key fails its whole language
    Strict,
    /// Re-run missing keys until the language reaches this fraction
    Completeness(f64),
}

impl FailurePolicy {
    /// Parse a named policy; completeness needs a threshold and is not nameable
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "fallback" | "source" => Some(FailurePolicy::Fallback),
            "strict" | "fail" => Some(FailurePolicy::Strict),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FailurePolicy::Fallback => "fallback",
            FailurePolicy::Strict => "strict",
            FailurePolicy::Completeness(_) => "completeness",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    pub supported_languages: BTreeSet<String>,
    pub concurrency_limit: usize,
    pub retry: RetryPolicy,
    /// Largest `retryAttempts` a request may ask for
    pub max_retry_attempts: u32,
    pub attempt_timeout: Duration,
    /// Upper bound on re-translation rounds under [`FailurePolicy::Completeness`]
    pub completeness_rounds: u32,
    pub default_module: String,
    /// Try the remaining registered backends after the selected one gives up
    pub backend_fallback: bool,
    pub failure_policy: FailurePolicy,
    /// Exact (trimmed) values that mean "no translation"
    pub sentinels: Vec<String>,
    /// Values matching any of these are backend error strings
    pub error_patterns: Vec<Regex>,
    pub staging_dir: PathBuf,
    pub command: Option<CommandSpec>,
    pub google_api_key: Option<String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            supported_languages: default_language_set(),
            concurrency_limit: 3,
            retry: RetryPolicy::default(),
            max_retry_attempts: 10,
            attempt_timeout: Duration::from_secs(30),
            completeness_rounds: 3,
            default_module: "google2".to_string(),
            backend_fallback: true,
            failure_policy: FailurePolicy::Fallback,
            sentinels: default_sentinels(),
            error_patterns: default_error_patterns(),
            staging_dir: std::env::temp_dir(),
            command: None,
            google_api_key: None,
        }
    }
}

fn default_sentinels() -> Vec<String> {
    ["--", "[object Object]", "undefined", "null"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_error_patterns() -> Vec<Regex> {
    [
        r"(?i)^error\b\s*[:\-]",
        r"(?i)^translation (failed|error)\b",
        r"(?i)^\[?(untranslated|no translation)\]?$",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
}

impl TranslatorConfig {
    /// Load from `TRANSLATE_*` environment variables, falling back to defaults
    pub fn from_env() -> TranslateResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> TranslateResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(limit) = parse_var::<usize, _>(&lookup, "TRANSLATE_CONCURRENCY_LIMIT")? {
            config.concurrency_limit = limit;
        }
        if let Some(attempts) = parse_var::<u32, _>(&lookup, "TRANSLATE_RETRY_ATTEMPTS")? {
            config.retry.max_attempts = attempts;
        }
        if let Some(max) = parse_var::<u32, _>(&lookup, "TRANSLATE_MAX_RETRY_ATTEMPTS")? {
            config.max_retry_attempts = max;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "TRANSLATE_RETRY_DELAY_MS")? {
            config.retry.initial_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "TRANSLATE_MAX_RETRY_DELAY_MS")? {
            config.retry.max_delay = Duration::from_millis(ms);
        }
        if let Some(multiplier) = parse_var::<f64, _>(&lookup, "TRANSLATE_BACKOFF_MULTIPLIER")? {
            config.retry.backoff_multiplier = multiplier;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "TRANSLATE_ATTEMPT_TIMEOUT_MS")? {
            config.attempt_timeout = Duration::from_millis(ms);
        }
        if let Some(rounds) = parse_var::<u32, _>(&lookup, "TRANSLATE_COMPLETENESS_ROUNDS")? {
            config.completeness_rounds = rounds;
        }
        if let Some(module) = lookup("TRANSLATE_DEFAULT_MODULE") {
            config.default_module = module.trim().to_string();
        }
        if let Some(value) = lookup("TRANSLATE_BACKEND_FALLBACK") {
            config.backend_fallback = parse_flag("TRANSLATE_BACKEND_FALLBACK", &value)?;
        }
        if let Some(value) = lookup("TRANSLATE_FAILURE_POLICY") {
            config.failure_policy = FailurePolicy::parse(&value).ok_or_else(|| {
                TranslateError::ConfigError(format!(
                    "TRANSLATE_FAILURE_POLICY must be 'fallback' or 'strict', got {:?}",
                    value
                ))
            })?;
        }
        if let Some(threshold) = parse_var::<f64, _>(&lookup, "TRANSLATE_MINIMUM_COMPLETENESS")? {
            config.failure_policy = FailurePolicy::Completeness(threshold);
        }
        if let Some(codes) = lookup("TRANSLATE_SUPPORTED_LANGUAGES") {
            config.supported_languages = codes
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
        }
        if let Some(sentinels) = lookup("TRANSLATE_SENTINELS") {
            config.sentinels = sentinels.split('|').map(|s| s.trim().to_string()).collect();
        }
        if let Some(dir) = lookup("TRANSLATE_STAGING_DIR") {
            config.staging_dir = PathBuf::from(dir);
        }
        if let Some(program) = lookup("TRANSLATE_COMMAND") {
            let mut spec = CommandSpec::jsontt(program.trim());
            if let Some(args) = lookup("TRANSLATE_COMMAND_ARGS") {
                spec.args = args.split_whitespace().map(str::to_string).collect();
            }
            config.command = Some(spec);
        }
        config.google_api_key = lookup("GOOGLE_TRANSLATE_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        config.validate()?;
        Ok(config)
    }

    pub fn with_supported_languages<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_languages = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_retry_attempts(mut self, max: u32) -> Self {
        self.max_retry_attempts = max;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_completeness_rounds(mut self, rounds: u32) -> Self {
        self.completeness_rounds = rounds;
        self
    }

    pub fn with_default_module(mut self, module: impl Into<String>) -> Self {
        self.default_module = module.into();
        self
    }

    pub fn with_backend_fallback(mut self, enabled: bool) -> Self {
        self.backend_fallback = enabled;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    pub fn with_command(mut self, command: CommandSpec) -> Self {
        self.command = Some(command);
        self
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.supported_languages.contains(code)
    }

    /// Whether a backend answer is a placeholder rather than a translation
    ///
    /// A rule only counts when it matches the answer and not the source, so
    /// a string that itself reads "Error: ..." may come back unchanged.
    pub fn is_placeholder(&self, source: &str, answer: &str) -> bool {
        let answer = answer.trim();
        let source = source.trim();
        self.sentinels
            .iter()
            .any(|s| s == answer && s != source)
            || self
                .error_patterns
                .iter()
                .any(|re| re.is_match(answer) && !re.is_match(source))
    }

    pub fn validate(&self) -> TranslateResult<()> {
        if self.concurrency_limit == 0 {
            return Err(TranslateError::ConfigError(
                "concurrency limit must be at least 1".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(TranslateError::ConfigError(
                "retry attempts must be at least 1".to_string(),
            ));
        }
        if self.retry.max_attempts > self.max_retry_attempts {
            return Err(TranslateError::ConfigError(format!(
                "retry attempts ({}) exceed the maximum of {}",
                self.retry.max_attempts, self.max_retry_attempts
            )));
        }
        if let FailurePolicy::Completeness(threshold) = self.failure_policy {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(TranslateError::ConfigError(format!(
                    "minimum completeness must be between 0 and 1, got {}",
                    threshold
                )));
            }
        }
        if self.supported_languages.is_empty() {
            return Err(TranslateError::ConfigError(
                "supported language set is empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> TranslateResult<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            TranslateError::ConfigError(format!("{} has an invalid value: {:?}", key, raw))
        }),
    }
}

/// Parse yes/no style flags (`yes`, `no`, `true`, `false`, `1`, `0`)
pub fn parse_flag(key: &str, value: &str) -> TranslateResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "on" => Ok(true),
        "no" | "n" | "false" | "0" | "off" => Ok(false),
        other => Err(TranslateError::ConfigError(format!(
            "{} expects yes/no, got {:?}",
            key, other
        ))),
    }
}
