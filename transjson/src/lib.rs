//! Translate the string values of a JSON object into many languages
//!
//! The crate fans a flat JSON object out to interchangeable machine
//! translation backends, retries and falls back between them, and reports
//! per key whether a real translation was obtained.
//!
//! # Workflow Example
//!
//! ```ignore
//! use transjson::{Orchestrator, TranslationRequest, TranslatorConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Load configuration and the backends it enables
//!     let orchestrator = Orchestrator::from_config(TranslatorConfig::from_env()?)?;
//!
//!     // 2. Parse a request body
//!     let request = TranslationRequest::from_value(&json!({
//!         "data": {"greeting": "Hello", "count": 3},
//!         "toLanguages": ["es", "fr"]
//!     }))?;
//!
//!     // 3. Translate; backend failures end up in the summary, not in Err
//!     let outcome = orchestrator.translate(&request).await?;
//!     println!("{}", serde_json::to_string_pretty(&outcome.output)?);
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod completeness;
pub mod config;
pub mod error;
pub mod google_free;
pub mod google_translate;
pub mod languages;
pub mod mock;
pub mod orchestrator;
pub mod registry;
pub mod report;
pub mod request;
pub mod retry;
pub mod translator;


// Re-export main types for convenient access
pub use command::{CommandSpec, CommandTranslator};
pub use completeness::CompletenessReport;
pub use config::{FailurePolicy, TranslatorConfig};
pub use error::{TranslateError, TranslateResult};
pub use google_free::GoogleFreeProvider;
pub use google_translate::GoogleTranslateProvider;
pub use languages::{SUPPORTED_LANGUAGES, language_name};
pub use mock::{MockMode, MockTranslator};
pub use orchestrator::Orchestrator;
pub use registry::{Backend, BackendRegistry};
pub use report::{
    KeyReport, KeyStatus, LanguageReport, LanguageStatus, OutcomeStatus, TranslationOutcome,
    TranslationSummary,
};
pub use request::{RequestOptions, TranslationRequest};
pub use retry::RetryPolicy;
pub use translator::{AUTO_DETECT, MachineTranslator};
