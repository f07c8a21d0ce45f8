use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Terminal outcome of one dispatch pass over a mailing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunResult {
    Completed,
    CompletedWithErrors,
    DeadlineExpired,
    Superseded,
}

impl Display for RunResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let run_result = match self {
            RunResult::Completed => "completed",
            RunResult::CompletedWithErrors => "completed_with_errors",
            RunResult::DeadlineExpired => "deadline_expired",
            RunResult::Superseded => "superseded",
        };
        write!(f, "{}", run_result)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub mailing_id: Uuid,
    pub result: RunResult,
    pub attempted: usize,
    pub delivered: usize,
    pub undelivered: usize,
}

impl DispatchSummary {
    pub fn new(mailing_id: Uuid) -> Self {
        Self {
            mailing_id,
            result: RunResult::Completed,
            attempted: 0,
            delivered: 0,
            undelivered: 0,
        }
    }

    pub fn superseded(mailing_id: Uuid) -> Self {
        Self {
            result: RunResult::Superseded,
            ..Self::new(mailing_id)
        }
    }

    /// Settles the result of a pass that visited every customer.
    pub fn finish(mut self) -> Self {
        self.result = if self.undelivered > 0 {
            RunResult::CompletedWithErrors
        } else {
            RunResult::Completed
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_reports_errors_only_when_something_was_undelivered() {
        let mut summary = DispatchSummary::new(Uuid::new_v4());
        summary.attempted = 3;
        summary.delivered = 3;
        assert_eq!(summary.clone().finish().result, RunResult::Completed);

        summary.delivered = 2;
        summary.undelivered = 1;
        assert_eq!(summary.finish().result, RunResult::CompletedWithErrors);
    }

    #[test]
    fn run_result_serializes_as_snake_case() {
        let json = serde_json::to_string(&RunResult::CompletedWithErrors).unwrap();
        assert_eq!(json, "\"completed_with_errors\"");
    }
}
