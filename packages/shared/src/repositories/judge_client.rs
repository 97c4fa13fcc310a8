use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::battle::{Language, PlayerOutcome};
use crate::models::challenge::TestCase;
use crate::repositories::errors::judge_client_errors::JudgeClientError;

/// Overall verdict from a judge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Failed,
    Error,
    Timeout,
}

impl From<Verdict> for PlayerOutcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Passed => PlayerOutcome::Passed,
            Verdict::Failed => PlayerOutcome::Failed,
            Verdict::Error => PlayerOutcome::Error,
            Verdict::Timeout => PlayerOutcome::Timeout,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub passed: bool,
    pub time_ms: u64,
}

/// Summary the core consumes; per-case detail is passed through for the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub tests_passed: u32,
    pub total_tests: u32,
    pub execution_time_ms: u64,
    pub verdict: Verdict,
    pub case_results: Vec<CaseResult>,
}

/// External code-execution sandbox. Black box with its own retry/timeout
/// policy; callers only consume the summary.
#[async_trait]
pub trait JudgeClient: Send + Sync {
    async fn run_tests(
        &self,
        code: &str,
        language: Language,
        test_cases: &[TestCase],
    ) -> Result<ExecutionReport, JudgeClientError>;
}
