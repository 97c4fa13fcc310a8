use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use shared::models::battle::Language;
use shared::models::challenge::TestCase;
use shared::repositories::errors::judge_client_errors::JudgeClientError;
use shared::repositories::judge_client::{ExecutionReport, JudgeClient};

#[derive(Serialize)]
struct RunRequest<'a> {
    source_code: &'a str,
    language: Language,
    test_cases: &'a [TestCase],
}

/// Talks to the external code-execution service over HTTP.
pub struct HttpJudgeClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpJudgeClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");
        HttpJudgeClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl JudgeClient for HttpJudgeClient {
    async fn run_tests(
        &self,
        code: &str,
        language: Language,
        test_cases: &[TestCase],
    ) -> Result<ExecutionReport, JudgeClientError> {
        let response = self
            .http
            .post(format!("{}/run", self.base_url))
            .json(&RunRequest {
                source_code: code,
                language,
                test_cases,
            })
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    JudgeClientError::Timeout
                } else {
                    JudgeClientError::Unreachable(err.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(JudgeClientError::InvalidResponse(format!(
                "judge returned status {}",
                response.status()
            )));
        }

        response
            .json::<ExecutionReport>()
            .await
            .map_err(|err| JudgeClientError::InvalidResponse(err.to_string()))
    }
}
