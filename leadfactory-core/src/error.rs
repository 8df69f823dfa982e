//! Error types for LEADFACTORY operations

use crate::{Channel, StageName};
use thiserror::Error;

/// Stage execution errors. Any of these is fatal to the current pipeline
/// run: the orchestrator records the error on the workspace and halts.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StageError {
    #[error("No stage runner configured")]
    RunnerNotConfigured,

    #[error("Stage {stage} failed: {reason}")]
    RunnerFailed { stage: StageName, reason: String },

    #[error("Stage {stage} returned malformed output: {reason}")]
    MalformedOutput { stage: StageName, reason: String },
}

/// Message dispatch errors. Local to a single message: dispatch records
/// them as FAILED status plus a send log entry and continues.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SendError {
    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: i32,
        message: String,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Provider not implemented for channel {channel}")]
    ProviderNotImplemented { channel: Channel },

    #[error("No recipient resolvable for channel {channel}")]
    MissingRecipient { channel: Channel },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all LEADFACTORY errors.
#[derive(Debug, Clone, Error)]
pub enum FactoryError {
    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    #[error("Send error: {0}")]
    Send(#[from] SendError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for LEADFACTORY operations.
pub type FactoryResult<T> = Result<T, FactoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_display_carries_stage_tag() {
        let err = StageError::RunnerFailed {
            stage: StageName::PainFinder,
            reason: "upstream model rejected the prompt".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("PainFinder"));
        assert!(msg.contains("rejected"));
    }

    #[test]
    fn test_send_error_display_request_failed() {
        let err = SendError::RequestFailed {
            provider: "resend".to_string(),
            status: 502,
            message: "bad gateway".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("resend"));
        assert!(msg.contains("502"));
    }

    #[test]
    fn test_send_error_display_provider_not_implemented() {
        let err = SendError::ProviderNotImplemented {
            channel: Channel::Dm,
        };
        assert!(format!("{}", err).contains("dm"));
    }

    #[test]
    fn test_factory_error_from_variants() {
        let stage = FactoryError::from(StageError::RunnerNotConfigured);
        assert!(matches!(stage, FactoryError::Stage(_)));

        let send = FactoryError::from(SendError::MissingRecipient {
            channel: Channel::Whatsapp,
        });
        assert!(matches!(send, FactoryError::Send(_)));

        let config = FactoryError::from(ConfigError::MissingRequired {
            field: "sender_base_url".to_string(),
        });
        assert!(matches!(config, FactoryError::Config(_)));
    }
}
