//! Machine translation trait and locale helpers
//!
//! `MachineTranslator` is the single seam between the orchestrator and the
//! translation backends. In-process HTTP clients, external processes driven
//! through staged files, and the test mock all sit behind it, so the
//! orchestrator never branches on which backend it is talking to.
//!
//! # Example
//!
//! ```ignore
//! use transjson::{MachineTranslator, MockMode, MockTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = MockTranslator::new(MockMode::Suffix);
//!     let result = provider.translate("Hello", "en", "fr").await?;
//!     assert_eq!(result, "Hello_fr");
//!     Ok(())
//! }
//! ```

use crate::error::{TranslateError, TranslateResult};
use async_trait::async_trait;

/// Source locale value asking the backend to detect the language itself
pub const AUTO_DETECT: &str = "auto";

/// Generic trait for machine translation providers
///
/// All methods are async to support I/O-bound operations like network
/// requests or child processes.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target locale
    ///
    /// `source_locale` may be [`AUTO_DETECT`]. Implementations may return a
    /// placeholder string when they have no translation; the orchestrator
    /// classifies those as soft failures.
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> TranslateResult<String>;

    /// Human readable provider name, used in logs
    fn provider_name(&self) -> &str;
}

/// Whether the source locale requests automatic detection
pub fn is_auto(locale: &str) -> bool {
    locale.eq_ignore_ascii_case(AUTO_DETECT)
}

/// Validate that a locale code is in acceptable format
///
/// Checks that the locale code contains only alphanumeric characters,
/// hyphens, and underscores. Membership in the supported set is checked
/// separately by the orchestrator.
pub fn validate_locale(locale: &str) -> TranslateResult<()> {
    if locale.is_empty() {
        return Err(TranslateError::InvalidLocale(
            "Locale code is empty".to_string(),
        ));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(TranslateError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}
