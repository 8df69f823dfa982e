//! LEADFACTORY LLM - Stage Runner Seam
//!
//! Provider-agnostic trait for executing one pipeline stage against a
//! hosted generative model. The orchestrator only ever talks to
//! `StageRunner`; actual provider implementations are user-supplied
//! (an HTTP implementation ships in [`http_runner`]).

mod http_runner;

pub use http_runner::HttpStageRunner;

use async_trait::async_trait;
use leadfactory_core::{AgentLog, FactoryResult, StageError, StageName, StageOutput, Workspace};
use std::sync::{Arc, RwLock};

// ============================================================================
// STAGE RUNNER TRAIT
// ============================================================================

/// Result of one stage execution: the structured output to merge into the
/// workspace, plus the optional log side channel already split off the
/// wire payload.
#[derive(Debug, Clone, PartialEq)]
pub struct StageResult {
    pub output: StageOutput,
    pub logs: Option<AgentLog>,
}

/// Trait for stage runners.
/// Implementations must be thread-safe (Send + Sync).
///
/// # Example
/// ```ignore
/// struct GeminiRunner { /* ... */ }
///
/// #[async_trait]
/// impl StageRunner for GeminiRunner {
///     async fn run_stage(&self, stage: StageName, context: &Workspace)
///         -> FactoryResult<StageResult> {
///         // Prompt the hosted model with the full workspace context
///     }
/// }
/// ```
#[async_trait]
pub trait StageRunner: Send + Sync {
    /// Execute one stage with the full accumulated workspace as context
    /// (later stages see all prior stage outputs).
    ///
    /// # Returns
    /// * `Ok(StageResult)` - Structured output plus optional logs
    /// * `Err(FactoryError::Stage)` - On any failure, including malformed
    ///   or unparsable model output; the orchestrator treats this as
    ///   fatal to the pipeline run
    async fn run_stage(&self, stage: StageName, context: &Workspace) -> FactoryResult<StageResult>;
}

// ============================================================================
// RUNNER REGISTRY
// ============================================================================

/// Registry for the stage runner.
/// A runner must be explicitly registered - no auto-discovery.
pub struct RunnerRegistry {
    runner: RwLock<Option<Arc<dyn StageRunner>>>,
}

impl RunnerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            runner: RwLock::new(None),
        }
    }

    /// Register a stage runner.
    /// Replaces any previously registered runner.
    pub fn register(&self, runner: Arc<dyn StageRunner>) {
        if let Ok(mut slot) = self.runner.write() {
            *slot = Some(runner);
        }
    }

    /// Get the registered runner.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn StageRunner>)` - The registered runner
    /// * `Err(FactoryError::Stage(StageError::RunnerNotConfigured))` - If
    ///   none is registered
    pub fn runner(&self) -> FactoryResult<Arc<dyn StageRunner>> {
        self.runner
            .read()
            .ok()
            .and_then(|slot| slot.clone())
            .ok_or_else(|| StageError::RunnerNotConfigured.into())
    }

    /// Check whether a runner is registered.
    pub fn has_runner(&self) -> bool {
        self.runner
            .read()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Clear the registration.
    pub fn clear(&self) {
        if let Ok(mut slot) = self.runner.write() {
            *slot = None;
        }
    }
}

impl Default for RunnerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RunnerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerRegistry")
            .field("runner", &self.has_runner())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadfactory_core::FactoryError;

    struct NullRunner;

    #[async_trait]
    impl StageRunner for NullRunner {
        async fn run_stage(
            &self,
            _stage: StageName,
            _context: &Workspace,
        ) -> FactoryResult<StageResult> {
            Ok(StageResult {
                output: StageOutput::default(),
                logs: None,
            })
        }
    }

    #[test]
    fn test_empty_registry_reports_not_configured() {
        let registry = RunnerRegistry::new();
        assert!(!registry.has_runner());
        match registry.runner() {
            Err(FactoryError::Stage(StageError::RunnerNotConfigured)) => {}
            other => panic!("expected RunnerNotConfigured, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_registered_runner_is_returned() {
        let registry = RunnerRegistry::new();
        registry.register(Arc::new(NullRunner));
        assert!(registry.has_runner());

        let runner = registry.runner().unwrap();
        let ws = Workspace::new("Test", "Somewhere");
        let result = runner.run_stage(StageName::Collector, &ws).await.unwrap();
        assert_eq!(result.output, StageOutput::default());
    }

    #[test]
    fn test_clear_removes_runner() {
        let registry = RunnerRegistry::new();
        registry.register(Arc::new(NullRunner));
        registry.clear();
        assert!(!registry.has_runner());
    }
}
