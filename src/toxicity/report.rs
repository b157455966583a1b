//! Incident report serialization.

use crate::clip::store::ClipStore;
use crate::defaults;
use crate::error::{Result, ToxiguardError};
use crate::toxicity::scorer::DetectionEvent;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Durable record of one flagged incident.
///
/// Serialized pretty-printed to `toxicity_report.json`; each new incident
/// overwrites the previous report. No history is retained by design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    pub transcription: String,
    pub toxicity_score: f32,
    pub flagged_words: Vec<String>,
}

impl IncidentReport {
    /// Build a report from the flagged detection event.
    ///
    /// The transcript is the one that tripped detection (the "before"
    /// window's text), not a re-transcription of the merged compound clip.
    pub fn from_event(event: &DetectionEvent) -> Self {
        Self {
            transcription: event.transcript.clone(),
            toxicity_score: event.score,
            flagged_words: event.matched_terms.clone(),
        }
    }

    /// Write `transcription.txt` and `toxicity_report.json` into the store.
    ///
    /// Returns the report path. Overwrites any prior incident's files.
    pub fn write(&self, store: &ClipStore) -> Result<PathBuf> {
        let transcript_path = store.path_of(defaults::TRANSCRIPT_FILE);
        fs::write(&transcript_path, &self.transcription)?;

        let report_path = store.path_of(defaults::REPORT_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            ToxiguardError::Other(format!("Failed to serialize incident report: {}", e))
        })?;
        fs::write(&report_path, json)?;

        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn event() -> DetectionEvent {
        DetectionEvent {
            transcript: "this game is trash".to_string(),
            matched_terms: vec!["trash".to_string()],
            score: 1.0 / 13.0,
        }
    }

    #[test]
    fn from_event_copies_fields() {
        let report = IncidentReport::from_event(&event());
        assert_eq!(report.transcription, "this game is trash");
        assert_eq!(report.flagged_words, vec!["trash"]);
        assert_eq!(report.toxicity_score, 1.0 / 13.0);
    }

    #[test]
    fn write_produces_transcript_and_pretty_json() {
        let dir = TempDir::new().unwrap();
        let store = ClipStore::new(dir.path()).unwrap();

        let report = IncidentReport::from_event(&event());
        let report_path = report.write(&store).unwrap();

        let transcript = fs::read_to_string(store.path_of(defaults::TRANSCRIPT_FILE)).unwrap();
        assert_eq!(transcript, "this game is trash");

        let json = fs::read_to_string(&report_path).unwrap();
        // Pretty-printed: multi-line with the three expected keys
        assert!(json.contains('\n'));
        let parsed: IncidentReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn write_overwrites_previous_incident() {
        let dir = TempDir::new().unwrap();
        let store = ClipStore::new(dir.path()).unwrap();

        IncidentReport {
            transcription: "first".to_string(),
            toxicity_score: 0.5,
            flagged_words: vec!["noob".to_string()],
        }
        .write(&store)
        .unwrap();

        IncidentReport {
            transcription: "second".to_string(),
            toxicity_score: 0.25,
            flagged_words: vec!["trash".to_string()],
        }
        .write(&store)
        .unwrap();

        let json = fs::read_to_string(store.path_of(defaults::REPORT_FILE)).unwrap();
        let parsed: IncidentReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.transcription, "second");
        let transcript = fs::read_to_string(store.path_of(defaults::TRANSCRIPT_FILE)).unwrap();
        assert_eq!(transcript, "second");
    }

    #[test]
    fn json_field_names_match_report_schema() {
        let json = serde_json::to_string(&IncidentReport::from_event(&event())).unwrap();
        assert!(json.contains("\"transcription\""));
        assert!(json.contains("\"toxicity_score\""));
        assert!(json.contains("\"flagged_words\""));
    }
}
