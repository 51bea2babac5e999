//! Case selection and sequential execution.

use std::time::Instant;

use crate::cases::{BUILTIN, Case};
use crate::config::RunnerConfig;
use crate::error::ConfigError;
use crate::report::{CaseOutcome, RunReport};

/// An ordered set of cases to run.
#[derive(Debug, Clone)]
pub struct Suite {
    cases: Vec<Case>,
}

impl Suite {
    pub fn builtin() -> Self {
        Self {
            cases: BUILTIN.to_vec(),
        }
    }

    pub fn new(cases: Vec<Case>) -> Self {
        Self { cases }
    }

    /// Keep only the named cases, in the order given. An empty list keeps everything.
    pub fn select<S: AsRef<str>>(self, names: &[S]) -> Result<Self, ConfigError> {
        if names.is_empty() {
            return Ok(self);
        }

        let cases = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.cases
                    .iter()
                    .find(|c| c.name == name)
                    .copied()
                    .ok_or_else(|| ConfigError::UnknownCase(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { cases })
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.cases.iter().map(|c| c.name).collect()
    }

    /// Run every case in order. A failing case never stops the run.
    pub fn run(&self, config: &RunnerConfig) -> RunReport {
        let mut report = RunReport::starting();
        tracing::info!(cases = self.cases.len(), "Starting run");

        for case in &self.cases {
            tracing::info!(case = case.name, "Running case");
            let start = Instant::now();
            let result = (case.run)(config);
            let outcome = CaseOutcome::from_result(case.name, &result, start.elapsed());

            match &result {
                Ok(()) => tracing::info!(
                    case = case.name,
                    duration_ms = outcome.duration_ms,
                    "Case passed"
                ),
                Err(e) => tracing::error!(case = case.name, error = %e, "Case failed"),
            }
            report.record(outcome);
        }

        let report = report.finish();
        tracing::info!(passed = report.passed, failed = report.failed, "Run finished");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaseError;
    use crate::report::CaseStatus;

    fn pass(_: &RunnerConfig) -> Result<(), CaseError> {
        Ok(())
    }

    fn fail(_: &RunnerConfig) -> Result<(), CaseError> {
        Err(CaseError::MissingAddress)
    }

    #[test]
    fn builtin_order() {
        assert_eq!(
            Suite::builtin().names(),
            ["accept", "connect", "send", "byte_order", "netdb"]
        );
    }

    #[test]
    fn select_keeps_requested_order() {
        let suite = Suite::builtin().select(&["send", "accept"]).unwrap();
        assert_eq!(suite.names(), ["send", "accept"]);
    }

    #[test]
    fn select_empty_keeps_all() {
        let suite = Suite::builtin().select::<&str>(&[]).unwrap();
        assert_eq!(suite.cases().len(), BUILTIN.len());
    }

    #[test]
    fn select_unknown_case_fails() {
        let err = Suite::builtin().select(&["netifapi"]).unwrap_err();
        assert_eq!(err, ConfigError::UnknownCase("netifapi".to_string()));
    }

    #[test]
    fn failing_case_does_not_stop_run() {
        let suite = Suite::new(vec![
            Case {
                name: "first",
                description: "fails",
                run: fail,
            },
            Case {
                name: "second",
                description: "passes",
                run: pass,
            },
        ]);

        let report = suite.run(&RunnerConfig::default());

        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.outcomes[0].status, CaseStatus::Failed);
        assert_eq!(report.outcomes[1].name, "second");
        assert!(report.completed_at.is_some());
    }

    #[test]
    fn byte_order_case_runs_through_suite() {
        let report = Suite::builtin()
            .select(&["byte_order"])
            .unwrap()
            .run(&RunnerConfig::default());
        assert!(report.all_passed(), "{}", report.summary());
    }
}
