//! Pure transcript scoring against a fixed toxic vocabulary.

use crate::defaults;

/// Result of scoring one transcript.
///
/// Created once per poll tick and transient; only a flagged event's content
/// is ever persisted, through the incident report.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionEvent {
    /// The transcript that was scored.
    pub transcript: String,
    /// Vocabulary entries found, in vocabulary declaration order.
    pub matched_terms: Vec<String>,
    /// `matched_terms.len() / vocabulary.len()`, in `[0, 1]`.
    pub score: f32,
}

impl DetectionEvent {
    /// Whether this event should trigger incident capture.
    pub fn is_incident(&self) -> bool {
        !self.matched_terms.is_empty()
    }
}

/// Scores transcripts by case-insensitive substring matching.
///
/// Pure and deterministic: no I/O, no hidden state. The vocabulary is loaded
/// once at startup and injected here; it is read-only for the process
/// lifetime. Matching is exact substring only, with no stemming or fuzzy
/// matching, so creative spellings are missed. Known limitation.
#[derive(Debug, Clone)]
pub struct ToxicityScorer {
    vocabulary: Vec<String>,
}

impl ToxicityScorer {
    /// Create a scorer over the given vocabulary.
    ///
    /// Declaration order is preserved for reproducible reports.
    pub fn new(vocabulary: Vec<String>) -> Self {
        Self { vocabulary }
    }

    /// Scorer over the built-in vocabulary.
    pub fn builtin() -> Self {
        Self::new(
            defaults::TOXIC_VOCABULARY
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Score `text` against every vocabulary entry.
    pub fn score(&self, text: &str) -> DetectionEvent {
        let haystack = text.to_lowercase();
        let matched_terms: Vec<String> = self
            .vocabulary
            .iter()
            .filter(|term| haystack.contains(&term.to_lowercase()))
            .cloned()
            .collect();

        let score = if self.vocabulary.is_empty() {
            0.0
        } else {
            matched_terms.len() as f32 / self.vocabulary.len() as f32
        };

        DetectionEvent {
            transcript: text.to_string(),
            matched_terms,
            score,
        }
    }
}
