//! HTTP stage runner
//!
//! Posts the workspace context to a hosted generation endpoint and parses
//! the structured stage output. The wire payload carries the log side
//! channel under a `_logs` key; it is split off here so the orchestrator
//! only ever sees `StageResult`.

use crate::{StageResult, StageRunner};
use async_trait::async_trait;
use leadfactory_core::{
    AgentLog, FactoryResult, StageError, StageName, StageOutput, Workspace,
};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Stage runner backed by a hosted generation service.
///
/// Expects `POST {base_url}/agents/{stage}` with the workspace JSON as
/// body to return the stage's output object, optionally carrying a
/// `_logs` side channel.
pub struct HttpStageRunner {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpStageRunner {
    /// Create a runner against a generation endpoint.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Attach a bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn failed(stage: StageName, reason: impl Into<String>) -> StageError {
        StageError::RunnerFailed {
            stage,
            reason: reason.into(),
        }
    }
}

/// Split the `_logs` side channel off a raw stage payload and parse the
/// remainder as a structured stage output.
pub fn parse_stage_payload(stage: StageName, mut raw: Value) -> Result<StageResult, StageError> {
    let map = raw.as_object_mut().ok_or_else(|| StageError::MalformedOutput {
        stage,
        reason: "expected a JSON object".to_string(),
    })?;

    let logs = match map.remove("_logs") {
        Some(value) => Some(serde_json::from_value::<AgentLog>(value).map_err(|e| {
            StageError::MalformedOutput {
                stage,
                reason: format!("invalid _logs side channel: {}", e),
            }
        })?),
        None => None,
    };

    let output: StageOutput =
        serde_json::from_value(raw).map_err(|e| StageError::MalformedOutput {
            stage,
            reason: format!("invalid stage output: {}", e),
        })?;

    Ok(StageResult { output, logs })
}

#[async_trait]
impl StageRunner for HttpStageRunner {
    async fn run_stage(&self, stage: StageName, context: &Workspace) -> FactoryResult<StageResult> {
        let url = format!("{}/agents/{}", self.base_url, stage);

        let mut request = self.client.post(&url).json(context);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::failed(stage, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Self::failed(stage, format!("status {}: {}", status.as_u16(), text)).into());
        }

        let raw: Value = response.json().await.map_err(|e| StageError::MalformedOutput {
            stage,
            reason: format!("unparsable response body: {}", e),
        })?;

        tracing::debug!(stage = %stage, "stage payload received");
        Ok(parse_stage_payload(stage, raw)?)
    }
}

impl std::fmt::Debug for HttpStageRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStageRunner")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.is_some())
            .finish()
    }
}
