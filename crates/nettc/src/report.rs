//! Run report types.

use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Passed,
    Failed,
}

/// Result of a single case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub name: String,
    pub status: CaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl CaseOutcome {
    pub fn from_result(name: &str, result: &Result<(), CaseError>, elapsed: Duration) -> Self {
        let (status, error) = match result {
            Ok(()) => (CaseStatus::Passed, None),
            Err(e) => (CaseStatus::Failed, Some(e.to_string())),
        };
        Self {
            name: name.to_string(),
            status,
            error,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Passed
    }
}

/// Outcomes of one run, in execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// When the run started (RFC 3339).
    pub started_at: String,
    /// When the run finished (RFC 3339), if it has.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    pub passed: usize,
    pub failed: usize,
    pub outcomes: Vec<CaseOutcome>,
}

impl RunReport {
    pub fn starting() -> Self {
        Self {
            started_at: chrono::Utc::now().to_rfc3339(),
            completed_at: None,
            passed: 0,
            failed: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: CaseOutcome) {
        if outcome.passed() {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn finish(mut self) -> Self {
        self.completed_at = Some(chrono::Utc::now().to_rfc3339());
        self
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Human-readable summary, one line per case plus a totals line.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for outcome in &self.outcomes {
            let mark = match outcome.status {
                CaseStatus::Passed => "PASS",
                CaseStatus::Failed => "FAIL",
            };
            let _ = write!(out, "{mark} {} ({} ms)", outcome.name, outcome.duration_ms);
            if let Some(error) = &outcome.error {
                let _ = write!(out, ": {error}");
            }
            out.push('\n');
        }
        let _ = writeln!(out, "{} passed, {} failed", self.passed, self.failed);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, error: Option<&str>) -> CaseOutcome {
        CaseOutcome {
            name: name.to_string(),
            status: if error.is_some() {
                CaseStatus::Failed
            } else {
                CaseStatus::Passed
            },
            error: error.map(str::to_string),
            duration_ms: 3,
        }
    }

    #[test]
    fn case_status_serializes_lowercase() {
        insta::assert_json_snapshot!([CaseStatus::Passed, CaseStatus::Failed], @r#"
        [
          "passed",
          "failed"
        ]
        "#);
    }

    #[test]
    fn failed_outcome_serializes_error() {
        insta::assert_json_snapshot!(outcome("connect", Some("connect to port 0 succeeded but was expected to fail")), @r#"
        {
          "name": "connect",
          "status": "failed",
          "error": "connect to port 0 succeeded but was expected to fail",
          "duration_ms": 3
        }
        "#);
    }

    #[test]
    fn passed_outcome_omits_error() {
        insta::assert_json_snapshot!(outcome("accept", None), @r#"
        {
          "name": "accept",
          "status": "passed",
          "duration_ms": 3
        }
        "#);
    }

    #[test]
    fn from_result_captures_error_text() {
        let result = Err(CaseError::MissingAddress);
        let outcome = CaseOutcome::from_result("send", &result, Duration::from_millis(12));

        assert_eq!(outcome.status, CaseStatus::Failed);
        assert_eq!(
            outcome.error.as_deref(),
            Some("server signalled without publishing its address")
        );
        assert_eq!(outcome.duration_ms, 12);
    }

    #[test]
    fn record_counts_and_summary() {
        let mut report = RunReport::starting();
        report.record(outcome("accept", None));
        report.record(outcome("send", Some("recv failed: timed out")));
        let report = report.finish();

        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert!(!report.all_passed());
        assert!(report.completed_at.is_some());
        assert_eq!(
            report.summary(),
            "PASS accept (3 ms)\nFAIL send (3 ms): recv failed: timed out\n1 passed, 1 failed\n"
        );
    }

    #[test]
    fn report_deserializes_without_completed_at() {
        let json = r#"{"started_at":"2026-01-01T00:00:00+00:00","passed":0,"failed":0,"outcomes":[]}"#;
        let report: RunReport = serde_json::from_str(json).unwrap();
        assert!(report.completed_at.is_none());
        assert!(report.all_passed());
    }
}
