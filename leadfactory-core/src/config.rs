//! Configuration types

use serde::{Deserialize, Serialize};

/// Factory-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Base URL of the sender/tracking service. Dispatch embeds tracking
    /// and unsubscribe URLs under this base.
    pub sender_base_url: String,
    /// Gap applied between autopilot steps when the template data yields
    /// a non-positive delay delta.
    pub default_step_gap_days: i64,
    /// Due offset of the human-verification follow-up scheduled after
    /// each autopilot step.
    pub verify_follow_up_days: i64,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            sender_base_url: "http://localhost:8787".to_string(),
            default_step_gap_days: 2,
            verify_follow_up_days: 1,
        }
    }
}

impl FactoryConfig {
    /// Config pointing at a given sender service.
    pub fn with_sender_base(mut self, base_url: impl Into<String>) -> Self {
        self.sender_base_url = base_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = FactoryConfig::default();
        assert_eq!(cfg.default_step_gap_days, 2);
        assert_eq!(cfg.verify_follow_up_days, 1);
        assert!(cfg.sender_base_url.starts_with("http://"));
    }

    #[test]
    fn test_with_sender_base() {
        let cfg = FactoryConfig::default().with_sender_base("https://sender.example.com");
        assert_eq!(cfg.sender_base_url, "https://sender.example.com");
    }
}
