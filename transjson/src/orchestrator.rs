//! Translation orchestrator
//!
//! Fans one request out into (language, key) jobs, runs them through the
//! backend chain with bounded concurrency, and reassembles the results in
//! input order.
//!
//! # Pipeline
//!
//! 1. **Plan**: validate languages, module and tuning options against the
//!    configuration and resolve the backend chain and failure policy. Nothing
//!    is sent to a backend if this step fails.
//! 2. **Rounds**: every translatable key of every language becomes a job.
//!    Under [`FailurePolicy::Completeness`] languages that are still below
//!    their threshold get further rounds for their missing keys only.
//! 3. **Assemble**: build one output object per language with the same key
//!    set as the input, plus the per-key and per-language report.
//!
//! Each job owns its own result slot, so jobs never contend for shared state
//! and a failing key cannot affect any other key or language.

use crate::completeness::CompletenessReport;
use crate::config::{FailurePolicy, TranslatorConfig};
use crate::error::{TranslateError, TranslateResult};
use crate::registry::{Backend, BackendRegistry};
use crate::report::{
    KeyReport, KeyStatus, LanguageReport, LanguageStatus, OutcomeStatus, TranslationOutcome,
    TranslationSummary,
};
use crate::request::TranslationRequest;
use crate::retry::RetryPolicy;
use crate::translator::{AUTO_DETECT, is_auto, validate_locale};
use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct Orchestrator {
    config: TranslatorConfig,
    registry: BackendRegistry,
}

/// Everything resolved for one request before the first backend call
#[derive(Debug)]
struct Plan {
    languages: Vec<String>,
    from: String,
    concurrency: usize,
    retry: RetryPolicy,
    policy: FailurePolicy,
    chain: Vec<Backend>,
}

struct Job {
    lang: usize,
    key: String,
    text: String,
}

struct JobResult {
    lang: usize,
    key: String,
    /// Accepted text and the id of the backend that produced it
    translation: Option<(String, String)>,
    attempts: u32,
    elapsed: Duration,
    error: Option<String>,
}

#[derive(Debug, Default)]
struct Slot {
    translation: Option<(String, String)>,
    attempts: u32,
    elapsed: Duration,
    error: Option<String>,
}

impl Orchestrator {
    pub fn new(config: TranslatorConfig, registry: BackendRegistry) -> TranslateResult<Self> {
        config.validate()?;
        if registry.is_empty() {
            return Err(TranslateError::ConfigError(
                "no translation backends are registered".to_string(),
            ));
        }
        Ok(Self { config, registry })
    }

    /// Orchestrator over the production backends the configuration enables
    pub fn from_config(config: TranslatorConfig) -> TranslateResult<Self> {
        let registry = BackendRegistry::from_config(&config)?;
        Self::new(config, registry)
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub fn available_modules(&self) -> Vec<&str> {
        self.registry.ids()
    }

    /// Translate every string value of `request.data` into every target
    ///
    /// Returns `Err` only for invalid requests. Backend failures are
    /// recorded per key in the outcome's summary.
    pub async fn translate(&self, request: &TranslationRequest) -> TranslateResult<TranslationOutcome> {
        let started = Instant::now();
        let plan = self.plan(request)?;

        let translatable: Vec<(&String, &str)> = request
            .data
            .iter()
            .filter_map(|(key, value)| match value {
                Value::String(text) if !text.trim().is_empty() => Some((key, text.as_str())),
                _ => None,
            })
            .collect();

        info!(
            "Translating {} of {} keys into {:?} (policy: {}, backends: {:?})",
            translatable.len(),
            request.data.len(),
            plan.languages,
            plan.policy.name(),
            plan.chain.iter().map(|b| b.id.as_str()).collect::<Vec<_>>()
        );

        let mut slots: Vec<HashMap<String, Slot>> = plan
            .languages
            .iter()
            .map(|_| {
                translatable
                    .iter()
                    .map(|(key, _)| ((*key).clone(), Slot::default()))
                    .collect()
            })
            .collect();
        let mut rounds = vec![0u32; plan.languages.len()];

        let max_rounds = match plan.policy {
            FailurePolicy::Completeness(_) => self.config.completeness_rounds.max(1),
            _ => 1,
        };

        for round in 0..max_rounds {
            let mut jobs = Vec::new();
            for (lang, lang_slots) in slots.iter().enumerate() {
                if round > 0 && !needs_another_round(&plan.policy, lang_slots) {
                    continue;
                }
                let pending: Vec<Job> = translatable
                    .iter()
                    .filter(|(key, _)| {
                        lang_slots
                            .get(*key)
                            .is_some_and(|slot| slot.translation.is_none())
                    })
                    .map(|(key, text)| Job {
                        lang,
                        key: (*key).clone(),
                        text: text.to_string(),
                    })
                    .collect();
                if !pending.is_empty() {
                    rounds[lang] += 1;
                    jobs.extend(pending);
                }
            }

            if jobs.is_empty() {
                break;
            }
            if round > 0 {
                debug!("Round {}: re-attempting {} keys", round + 1, jobs.len());
                tokio::time::sleep(plan.retry.delay_for_attempt(1)).await;
            }

            let results: Vec<JobResult> = stream::iter(jobs)
                .map(|job| self.run_job(&plan, job))
                .buffer_unordered(plan.concurrency)
                .collect()
                .await;

            for result in results {
                if let Some(slot) = slots[result.lang].get_mut(&result.key) {
                    slot.attempts += result.attempts;
                    slot.elapsed += result.elapsed;
                    if result.translation.is_some() {
                        slot.translation = result.translation;
                        slot.error = None;
                    } else {
                        slot.error = result.error;
                    }
                }
            }
        }

        let outcome = self.assemble(request, &plan, &slots, &rounds, started);
        info!(
            "Translation finished with status {:?} in {}ms (failed languages: {:?})",
            outcome.summary.status, outcome.summary.duration_ms, outcome.summary.failed_languages
        );
        Ok(outcome)
    }

    fn plan(&self, request: &TranslationRequest) -> TranslateResult<Plan> {
        if request.to_languages.is_empty() {
            return Err(TranslateError::InvalidRequest(
                "'toLanguages' must not be empty. Provide 'data' and 'toLanguages' array (ISO codes)."
                    .to_string(),
            ));
        }

        let mut unsupported = Vec::new();
        for code in &request.to_languages {
            validate_locale(code)?;
            if is_auto(code) {
                return Err(TranslateError::InvalidRequest(
                    "'auto' can only be used as the source language".to_string(),
                ));
            }
            if !self.config.is_supported(code) {
                unsupported.push(code.as_str());
            }
        }
        if !unsupported.is_empty() {
            return Err(TranslateError::InvalidRequest(format!(
                "Unsupported target language(s): {}",
                unsupported.join(", ")
            )));
        }

        let from = if is_auto(&request.from) {
            AUTO_DETECT.to_string()
        } else {
            validate_locale(&request.from)?;
            if !self.config.is_supported(&request.from) {
                return Err(TranslateError::InvalidRequest(format!(
                    "Unsupported source language: {}",
                    request.from
                )));
            }
            request.from.clone()
        };

        let options = &request.options;
        if let Some(module) = &options.module {
            if !self.registry.contains(module) {
                return Err(TranslateError::InvalidRequest(format!(
                    "Unknown module '{}'. Available modules: {}",
                    module,
                    self.registry.ids().join(", ")
                )));
            }
        }

        let concurrency = options
            .concurrency_limit
            .unwrap_or(self.config.concurrency_limit);
        if concurrency == 0 {
            return Err(TranslateError::InvalidRequest(
                "'concurrencylimit' must be a positive integer".to_string(),
            ));
        }

        let attempts = options
            .retry_attempts
            .unwrap_or(self.config.retry.max_attempts);
        if attempts == 0 {
            return Err(TranslateError::InvalidRequest(
                "'retryAttempts' must be a positive integer".to_string(),
            ));
        }
        if attempts > self.config.max_retry_attempts {
            return Err(TranslateError::InvalidRequest(format!(
                "'retryAttempts' must be at most {}",
                self.config.max_retry_attempts
            )));
        }

        let policy = match options.minimum_completeness {
            Some(threshold) if !(0.0..=1.0).contains(&threshold) => {
                return Err(TranslateError::InvalidRequest(
                    "'minimumCompleteness' must be a number between 0 and 1".to_string(),
                ));
            }
            Some(threshold) => FailurePolicy::Completeness(threshold),
            None => options.failure_policy.unwrap_or(self.config.failure_policy),
        };

        let module = options
            .module
            .as_deref()
            .unwrap_or(&self.config.default_module);
        let chain = self.registry.chain(
            module,
            options.fallback.unwrap_or(self.config.backend_fallback),
        )?;

        Ok(Plan {
            languages: request.to_languages.clone(),
            from,
            concurrency,
            retry: self.config.retry.clone().with_max_attempts(attempts),
            policy,
            chain,
        })
    }

    /// Walk the backend chain for one key until a translation is accepted
    async fn run_job(&self, plan: &Plan, job: Job) -> JobResult {
        let started = Instant::now();
        let target = &plan.languages[job.lang];
        let mut attempts = 0u32;
        let mut last_error = None;
        let mut translation = None;

        'chain: for backend in &plan.chain {
            for _ in 0..plan.retry.max_attempts {
                let delay = plan.retry.delay_for_attempt(attempts);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempts += 1;

                match self.attempt(backend, &job.text, &plan.from, target).await {
                    Ok(text) => {
                        translation = Some((text, backend.id.clone()));
                        break 'chain;
                    }
                    Err(err) => {
                        warn!(
                            "Attempt {} for '{}' → {} via {} failed: {}",
                            attempts, job.key, target, backend.id, err
                        );
                        let retryable = err.is_retryable();
                        last_error = Some(err.to_string());
                        if !retryable {
                            break;
                        }
                    }
                }
            }
        }

        JobResult {
            lang: job.lang,
            key: job.key,
            translation,
            attempts,
            elapsed: started.elapsed(),
            error: last_error,
        }
    }

    /// One bounded backend call, with placeholder answers turned into errors
    async fn attempt(&self, backend: &Backend, text: &str, from: &str, to: &str) -> TranslateResult<String> {
        let timeout = self.config.attempt_timeout;
        let translated = tokio::time::timeout(timeout, backend.translator.translate(text, from, to))
            .await
            .map_err(|_| TranslateError::Timeout(timeout.as_millis() as u64))??;

        if translated.trim().is_empty() || self.config.is_placeholder(text, &translated) {
            return Err(TranslateError::Sentinel(translated));
        }
        Ok(translated)
    }

    fn assemble(
        &self,
        request: &TranslationRequest,
        plan: &Plan,
        slots: &[HashMap<String, Slot>],
        rounds: &[u32],
        started: Instant,
    ) -> TranslationOutcome {
        let mut output = Map::new();
        let mut languages = BTreeMap::new();
        let mut failed_languages = Vec::new();
        let strict = matches!(plan.policy, FailurePolicy::Strict);

        for (lang, code) in plan.languages.iter().enumerate() {
            let lang_slots = &slots[lang];
            let mut object = Map::new();
            let mut keys = BTreeMap::new();
            let (mut translated, mut fallback, mut failed, mut unchanged) = (0, 0, 0, 0);
            let mut backend_time = Duration::ZERO;

            for (key, value) in &request.data {
                let Some(slot) = lang_slots.get(key) else {
                    object.insert(key.clone(), value.clone());
                    keys.insert(key.clone(), KeyReport::unchanged());
                    unchanged += 1;
                    continue;
                };

                backend_time += slot.elapsed;
                let status = match &slot.translation {
                    Some((text, _)) => {
                        object.insert(key.clone(), Value::String(text.clone()));
                        translated += 1;
                        KeyStatus::Translated
                    }
                    None => {
                        object.insert(key.clone(), value.clone());
                        if strict {
                            failed += 1;
                            KeyStatus::Failed
                        } else {
                            fallback += 1;
                            KeyStatus::Fallback
                        }
                    }
                };
                keys.insert(
                    key.clone(),
                    KeyReport {
                        status,
                        attempts: slot.attempts,
                        backend: slot.translation.as_ref().map(|(_, id)| id.clone()),
                        duration_ms: slot.elapsed.as_millis() as u64,
                        error: slot.error.clone(),
                    },
                );
            }

            let completeness = CompletenessReport::new(lang_slots.len(), translated);
            let status = language_status(&plan.policy, &completeness);
            if status == LanguageStatus::Failed {
                warn!(
                    "Language {} failed ({}/{} keys translated)",
                    code, completeness.accepted, completeness.translatable
                );
                failed_languages.push(code.clone());
            } else {
                output.insert(code.clone(), Value::Object(object));
            }

            languages.insert(
                code.clone(),
                LanguageReport {
                    status,
                    completeness: completeness.ratio(),
                    translated,
                    fallback,
                    failed,
                    unchanged,
                    rounds: rounds[lang],
                    backend_time_ms: backend_time.as_millis() as u64,
                    keys,
                },
            );
        }

        let status = if failed_languages.len() == plan.languages.len() {
            OutcomeStatus::Failed
        } else if !failed_languages.is_empty() {
            OutcomeStatus::Partial
        } else {
            OutcomeStatus::Complete
        };

        TranslationOutcome {
            output,
            summary: TranslationSummary {
                status,
                policy: plan.policy.name().to_string(),
                from: plan.from.clone(),
                backends: plan.chain.iter().map(|b| b.id.clone()).collect(),
                languages,
                failed_languages,
                duration_ms: started.elapsed().as_millis() as u64,
            },
        }
    }
}

fn needs_another_round(policy: &FailurePolicy, slots: &HashMap<String, Slot>) -> bool {
    let FailurePolicy::Completeness(threshold) = policy else {
        return false;
    };
    let accepted = slots.values().filter(|s| s.translation.is_some()).count();
    let report = CompletenessReport::new(slots.len(), accepted);
    !report.meets(*threshold) || report.is_empty_result()
}

fn language_status(policy: &FailurePolicy, completeness: &CompletenessReport) -> LanguageStatus {
    let failed = completeness.is_empty_result()
        || match policy {
            FailurePolicy::Fallback => false,
            FailurePolicy::Strict => !completeness.is_complete(),
            FailurePolicy::Completeness(threshold) => !completeness.meets(*threshold),
        };

    if failed {
        LanguageStatus::Failed
    } else if completeness.is_complete() {
        LanguageStatus::Complete
    } else {
        LanguageStatus::Partial
    }
}
