//! Translation request parsing
//!
//! Requests arrive as loosely typed JSON. [`TranslationRequest::from_value`]
//! performs the shape checks (data is an object, toLanguages is a non-empty
//! list of strings, tuning fields have sane types) so that the caller gets a
//! precise client error before any backend is touched. Language support and
//! module names are checked later by the orchestrator against its
//! configuration.

use crate::config::{FailurePolicy, parse_flag};
use crate::error::{TranslateError, TranslateResult};
use crate::translator::AUTO_DETECT;
use serde_json::{Map, Value};

const USAGE_HINT: &str = "Provide 'data' and 'toLanguages' array (ISO codes).";

/// Per-request overrides of the orchestrator defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub concurrency_limit: Option<usize>,
    pub retry_attempts: Option<u32>,
    pub minimum_completeness: Option<f64>,
    pub module: Option<String>,
    /// Whether other backends may take over once the selected one gives up
    pub fallback: Option<bool>,
    pub failure_policy: Option<FailurePolicy>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    pub data: Map<String, Value>,
    /// Target codes in request order, duplicates removed
    pub to_languages: Vec<String>,
    pub from: String,
    pub options: RequestOptions,
}

impl TranslationRequest {
    pub fn new<I, S>(data: Map<String, Value>, to_languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            data,
            to_languages: dedupe(to_languages.into_iter().map(Into::into)),
            from: AUTO_DETECT.to_string(),
            options: RequestOptions::default(),
        }
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse and shape-check a JSON request body
    pub fn from_value(body: &Value) -> TranslateResult<Self> {
        let body = body.as_object().ok_or_else(|| {
            TranslateError::InvalidRequest(format!("Request body must be a JSON object. {}", USAGE_HINT))
        })?;

        let data = match body.get("data") {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::Null) | None => {
                return Err(TranslateError::InvalidRequest(format!(
                    "Missing 'data'. {}",
                    USAGE_HINT
                )));
            }
            Some(_) => {
                return Err(TranslateError::InvalidRequest(
                    "'data' must be a JSON object".to_string(),
                ));
            }
        };

        let to_languages = match body.get("toLanguages") {
            Some(Value::Array(items)) if !items.is_empty() => items
                .iter()
                .map(|item| {
                    item.as_str().map(|s| s.trim().to_string()).ok_or_else(|| {
                        TranslateError::InvalidRequest(
                            "'toLanguages' must contain only language code strings".to_string(),
                        )
                    })
                })
                .collect::<TranslateResult<Vec<_>>>()?,
            Some(Value::Array(_)) => {
                return Err(TranslateError::InvalidRequest(format!(
                    "'toLanguages' must not be empty. {}",
                    USAGE_HINT
                )));
            }
            Some(Value::Null) | None => {
                return Err(TranslateError::InvalidRequest(format!(
                    "Missing 'toLanguages'. {}",
                    USAGE_HINT
                )));
            }
            Some(_) => {
                return Err(TranslateError::InvalidRequest(format!(
                    "'toLanguages' must be an array. {}",
                    USAGE_HINT
                )));
            }
        };

        let from = match body.get("from") {
            Some(Value::String(code)) if !code.trim().is_empty() => code.trim().to_string(),
            Some(Value::String(_)) | Some(Value::Null) | None => AUTO_DETECT.to_string(),
            Some(_) => {
                return Err(TranslateError::InvalidRequest(
                    "'from' must be a language code string".to_string(),
                ));
            }
        };

        let options = RequestOptions {
            concurrency_limit: positive_integer(body, &["concurrencylimit", "concurrencyLimit"])?
                .map(|n| n as usize),
            retry_attempts: positive_integer(body, &["retryAttempts"])?.map(|n| n as u32),
            minimum_completeness: completeness(body)?,
            module: module(body)?,
            fallback: fallback(body)?,
            failure_policy: failure_policy(body)?,
        };

        Ok(Self {
            data,
            to_languages: dedupe(to_languages.into_iter()),
            from,
            options,
        })
    }
}

fn dedupe(codes: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for code in codes {
        if !seen.contains(&code) {
            seen.push(code);
        }
    }
    seen
}

fn lookup<'a>(body: &'a Map<String, Value>, names: &[&str]) -> Option<(&'a Value, String)> {
    names
        .iter()
        .find_map(|name| body.get(*name).map(|v| (v, name.to_string())))
        .filter(|(v, _)| !v.is_null())
}

fn positive_integer(body: &Map<String, Value>, names: &[&str]) -> TranslateResult<Option<u64>> {
    match lookup(body, names) {
        None => Ok(None),
        Some((value, name)) => match value.as_u64() {
            Some(n) if n >= 1 => Ok(Some(n.min(u32::MAX as u64))),
            _ => Err(TranslateError::InvalidRequest(format!(
                "'{}' must be a positive integer",
                name
            ))),
        },
    }
}

fn completeness(body: &Map<String, Value>) -> TranslateResult<Option<f64>> {
    match lookup(body, &["minimumCompleteness"]) {
        None => Ok(None),
        Some((value, _)) => match value.as_f64() {
            Some(ratio) if (0.0..=1.0).contains(&ratio) => Ok(Some(ratio)),
            _ => Err(TranslateError::InvalidRequest(
                "'minimumCompleteness' must be a number between 0 and 1".to_string(),
            )),
        },
    }
}

fn module(body: &Map<String, Value>) -> TranslateResult<Option<String>> {
    match lookup(body, &["module"]) {
        None => Ok(None),
        Some((Value::String(name), _)) if !name.trim().is_empty() => Ok(Some(name.trim().to_string())),
        Some(_) => Err(TranslateError::InvalidRequest(
            "'module' must be a backend name".to_string(),
        )),
    }
}

fn fallback(body: &Map<String, Value>) -> TranslateResult<Option<bool>> {
    match lookup(body, &["fallback"]) {
        None => Ok(None),
        Some((Value::Bool(flag), _)) => Ok(Some(*flag)),
        Some((Value::String(flag), _)) => parse_flag("fallback", flag)
            .map(Some)
            .map_err(|_| TranslateError::InvalidRequest("'fallback' must be yes or no".to_string())),
        Some(_) => Err(TranslateError::InvalidRequest(
            "'fallback' must be a boolean".to_string(),
        )),
    }
}

fn failure_policy(body: &Map<String, Value>) -> TranslateResult<Option<FailurePolicy>> {
    match lookup(body, &["failurePolicy"]) {
        None => Ok(None),
        Some((Value::String(name), _)) => FailurePolicy::parse(name).map(Some).ok_or_else(|| {
            TranslateError::InvalidRequest(
                "'failurePolicy' must be 'fallback' or 'strict'".to_string(),
            )
        }),
        Some(_) => Err(TranslateError::InvalidRequest(
            "'failurePolicy' must be a string".to_string(),
        )),
    }
}
