//! Events streamed to the uploading client
//!
//! Wire shapes (one JSON object per `data:` line):
//! - `{"type":"progress","current":1,"total":3}`
//! - `{"type":"complete","results":{"success":2,"failed":1,"errors":["..."]}}`
//! - `{"type":"error","message":"..."}`

use serde::{Deserialize, Serialize};

/// Message emitted by the ingest pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IngestEvent {
    /// A row has been picked up; `current` is its 1-based position.
    ///
    /// Sent before the row's outcome is known, so `current == total` does
    /// not mean the run is finished. Only `Complete` signals that.
    Progress { current: usize, total: usize },

    /// Terminal summary, sent once after the last row
    Complete { results: ResultSummary },

    /// Request-level failure; nothing follows it
    Error { message: String },
}

impl IngestEvent {
    pub fn progress(current: usize, total: usize) -> Self {
        Self::Progress { current, total }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Whether the stream ends after this event
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

/// Per-run success/failure tally
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    #[serde(rename = "success")]
    pub success_count: usize,
    #[serde(rename = "failed")]
    pub failed_count: usize,
    /// One diagnostic per failed row, in row order
    pub errors: Vec<String>,
}

impl ResultSummary {
    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub fn record_failure(&mut self, diagnostic: String) {
        self.failed_count += 1;
        self.errors.push(diagnostic);
    }

    /// Rows accounted for so far
    pub fn processed(&self) -> usize {
        self.success_count + self.failed_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn progress_wire_shape() {
        let value = serde_json::to_value(IngestEvent::progress(2, 5)).unwrap();
        assert_eq!(value, json!({"type": "progress", "current": 2, "total": 5}));
    }

    #[test]
    fn complete_wire_shape() {
        let mut results = ResultSummary::default();
        results.record_success();
        results.record_failure("Row 2: Missing ingredient name".to_string());

        let value = serde_json::to_value(IngestEvent::Complete { results }).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "complete",
                "results": {
                    "success": 1,
                    "failed": 1,
                    "errors": ["Row 2: Missing ingredient name"]
                }
            })
        );
    }

    #[test]
    fn error_wire_shape() {
        let value = serde_json::to_value(IngestEvent::error("No file provided")).unwrap();
        assert_eq!(value, json!({"type": "error", "message": "No file provided"}));
    }

    #[test]
    fn only_progress_is_non_terminal() {
        assert!(!IngestEvent::progress(1, 1).is_terminal());
        assert!(IngestEvent::error("x").is_terminal());
        assert!(IngestEvent::Complete {
            results: ResultSummary::default()
        }
        .is_terminal());
    }
}
