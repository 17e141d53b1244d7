/// How much of a language's translatable content holds a real translation
///
/// Only string values that are non-empty after trimming count as
/// translatable. Fallback copies of the source text do not count as accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletenessReport {
    pub translatable: usize,
    pub accepted: usize,
}

impl CompletenessReport {
    pub fn new(translatable: usize, accepted: usize) -> Self {
        Self {
            translatable,
            accepted: accepted.min(translatable),
        }
    }

    /// Accepted fraction; a language with nothing to translate is complete
    pub fn ratio(&self) -> f64 {
        if self.translatable == 0 {
            1.0
        } else {
            self.accepted as f64 / self.translatable as f64
        }
    }

    pub fn meets(&self, threshold: f64) -> bool {
        self.ratio() + f64::EPSILON >= threshold
    }

    pub fn is_complete(&self) -> bool {
        self.accepted == self.translatable
    }

    /// True when there was something to translate and nothing was accepted
    pub fn is_empty_result(&self) -> bool {
        self.translatable > 0 && self.accepted == 0
    }
}
