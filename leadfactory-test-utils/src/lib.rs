//! LEADFACTORY Test Utilities
//!
//! Centralized test infrastructure for the workspace:
//! - Mock stage runner with realistic per-stage outputs
//! - Mock message sender recording outbound payloads
//! - Recording sink capturing every emitted workspace state
//! - Shared fixtures

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use leadfactory_core::{
    AgentLog, AuditOutput, AuditPriority, AuditSystem, CallScript, CheckStatus, FactoryResult,
    IntakeData, IntakeMode, Objection, OfferSystem, OfferTier, OutreachSystem, Persona,
    SiteArchitecture, SitePage, StageError, StageName, StageOutput, TextBlock,
    VerificationCheck, Workspace,
};
use leadfactory_llm::{StageResult, StageRunner};
use leadfactory_outreach::{EmailPayload, MessageSender, SendReceipt, WhatsAppPayload};
use leadfactory_pipeline::WorkspaceSink;

// ============================================================================
// FIXTURES
// ============================================================================

/// A fresh prospect workspace with a root phone and an intake carrying a
/// city and an email buried in a pasted text block.
pub fn sample_workspace() -> Workspace {
    Workspace::new("Garage Morel", "4 avenue Jean Jaurès, 69007 Lyon")
        .with_phone("+33478000000")
        .with_intake(IntakeData {
            mode: IntakeMode::Card,
            prospect_name: "Garage Morel".to_string(),
            city: "Lyon".to_string(),
            category: "garage automobile".to_string(),
            images: vec![],
            text_blocks: vec![TextBlock {
                origin: "fiche Google Maps".to_string(),
                text: "Garage Morel - réparation toutes marques. Contact: bruno@garage-morel.fr"
                    .to_string(),
            }],
            links: vec!["https://maps.google.com/?cid=123".to_string()],
            notes: "Pas de site web, fiche peu fournie.".to_string(),
        })
}

// ============================================================================
// MOCK STAGE RUNNER
// ============================================================================

/// Stage runner with canned per-stage outputs shaped like real agent
/// responses. Records every call; optionally fails at a chosen stage or
/// strips all contact fields.
pub struct MockStageRunner {
    fail_at: Option<StageName>,
    contactless: bool,
    calls: Mutex<Vec<StageName>>,
}

impl MockStageRunner {
    pub fn new() -> Self {
        Self {
            fail_at: None,
            contactless: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Runner whose outputs never carry a phone, email, city or address.
    pub fn contactless() -> Self {
        Self {
            contactless: true,
            ..Self::new()
        }
    }

    /// Fail with a runner error when the given stage executes.
    pub fn failing_at(mut self, stage: StageName) -> Self {
        self.fail_at = Some(stage);
        self
    }

    /// Every stage executed so far, in order.
    pub fn calls(&self) -> Vec<StageName> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn output_for(&self, stage: StageName, ws: &Workspace) -> StageOutput {
        let mut output = match stage {
            StageName::Collector => StageOutput {
                name: Some(ws.name.clone()),
                category: Some("garage automobile".to_string()),
                phone: Some("+33478000000".to_string()),
                email: Some("bruno@garage-morel.fr".to_string()),
                audit: Some(AuditSystem {
                    checks: vec![
                        "fiche Google Maps incomplète".to_string(),
                        "aucun site web détecté".to_string(),
                    ],
                    output: AuditOutput {
                        score: 34,
                        quick_wins: vec![
                            "ajouter des photos récentes".to_string(),
                            "répondre aux avis".to_string(),
                        ],
                        priority: AuditPriority::P1,
                    },
                }),
                ..Default::default()
            },
            StageName::Normalizer => StageOutput {
                phone: Some("+33478000000".to_string()),
                email: Some("bruno@garage-morel.fr".to_string()),
                city: Some("Lyon".to_string()),
                address: Some("4 avenue Jean Jaurès, 69007 Lyon".to_string()),
                business_activity: Some("réparation automobile toutes marques".to_string()),
                ..Default::default()
            },
            StageName::PainFinder => StageOutput {
                opportunity: Some("visibilité locale quasi nulle malgré de bons avis".to_string()),
                pain_points: Some(json!([
                    "invisible sur les recherches \"garage Lyon 7\"",
                    "aucun canal de prise de rendez-vous en ligne"
                ])),
                key_selling_points: Some(vec![
                    "4,8/5 sur 60 avis".to_string(),
                    "réparation toutes marques".to_string(),
                ]),
                ..Default::default()
            },
            StageName::OfferBuilder => StageOutput {
                offers: Some(OfferSystem {
                    tiers: vec![
                        OfferTier {
                            name: "Essentiel".to_string(),
                            price: Some("490€".to_string()),
                            goal: "être trouvable localement".to_string(),
                            includes: vec![
                                "site une page".to_string(),
                                "fiche Google optimisée".to_string(),
                            ],
                        },
                        OfferTier {
                            name: "Croissance".to_string(),
                            price: Some("990€".to_string()),
                            goal: "générer des demandes entrantes".to_string(),
                            includes: vec![
                                "site multi-pages".to_string(),
                                "prise de RDV en ligne".to_string(),
                            ],
                        },
                    ],
                }),
                suggested_pitch: Some(
                    "Vos clients vous cherchent sur Google et ne vous trouvent pas.".to_string(),
                ),
                ..Default::default()
            },
            StageName::Copywriter => StageOutput {
                outreach: Some(OutreachSystem {
                    persona: Persona {
                        persona_type: "artisan-gérant".to_string(),
                        tone: "direct, concret, sans jargon".to_string(),
                        pain_points: vec!["manque de temps".to_string()],
                    },
                    sequences: json!({
                        "email": ["intro_1", "followup_1", "last_call"],
                        "whatsapp": ["quick_ping"]
                    }),
                    call_script: CallScript {
                        intro: "Bonjour, je vous appelle au sujet de votre fiche Google."
                            .to_string(),
                        hook: "Vos concurrents du 7e captent vos recherches.".to_string(),
                        goal: "obtenir un rendez-vous de 15 minutes".to_string(),
                    },
                    objections: vec![Objection {
                        objection: "Je n'ai pas le temps".to_string(),
                        response: "Justement, tout est fait pour vous en 2 semaines."
                            .to_string(),
                    }],
                }),
                emails: Some(vec![json!({
                    "key": "intro_1",
                    "subject": "Question pour Garage Morel"
                })]),
                ..Default::default()
            },
            StageName::PrototypeDesigner => StageOutput {
                prototype: Some(SiteArchitecture {
                    spec: Some(json!({"style": "sobre", "palette": ["#1a1a1a", "#e63946"]})),
                    sitemap_ascii: "/\n├── hero\n├── services\n├── avis\n└── contact (CTA)"
                        .to_string(),
                    pages: vec![SitePage {
                        path: "/".to_string(),
                        seo: json!({"title": "Garage Morel - Lyon 7"}),
                        content_structure: vec![
                            "hero".to_string(),
                            "services".to_string(),
                            "avis".to_string(),
                            "cta-contact".to_string(),
                        ],
                        preview_html: None,
                    }],
                    exports: json!({}),
                    design_system: json!({}),
                }),
                ..Default::default()
            },
        };

        if self.contactless {
            output.phone = None;
            output.email = None;
            output.city = None;
            output.address = None;
        }
        output
    }
}

impl Default for MockStageRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StageRunner for MockStageRunner {
    async fn run_stage(&self, stage: StageName, context: &Workspace) -> FactoryResult<StageResult> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(stage);
        }
        if self.fail_at == Some(stage) {
            return Err(StageError::RunnerFailed {
                stage,
                reason: "mock failure".to_string(),
            }
            .into());
        }
        Ok(StageResult {
            output: self.output_for(stage, context),
            logs: Some(AgentLog {
                plan: vec![format!("run {stage}")],
                process: vec!["canned output".to_string()],
                verification: vec![VerificationCheck {
                    check: "output shape".to_string(),
                    status: CheckStatus::Ok,
                }],
            }),
        })
    }
}

// ============================================================================
// RECORDING SINK
// ============================================================================

/// Sink capturing every workspace state the orchestrator emits.
#[derive(Default)]
pub struct RecordingSink {
    pub snapshots: Vec<Workspace>,
}

impl WorkspaceSink for RecordingSink {
    fn persist(&mut self, ws: &Workspace) {
        self.snapshots.push(ws.clone());
    }
}

// ============================================================================
// MOCK SENDER
// ============================================================================

/// Message sender recording outbound payloads instead of delivering them.
pub struct MockSender {
    fail_email: bool,
    fail_whatsapp: bool,
    emails: Mutex<Vec<EmailPayload>>,
    whatsapps: Mutex<Vec<WhatsAppPayload>>,
}

impl MockSender {
    pub fn new() -> Self {
        Self {
            fail_email: false,
            fail_whatsapp: false,
            emails: Mutex::new(Vec::new()),
            whatsapps: Mutex::new(Vec::new()),
        }
    }

    /// Reject every email send with a provider error.
    pub fn failing_email(mut self) -> Self {
        self.fail_email = true;
        self
    }

    /// Reject every WhatsApp send with a provider error.
    pub fn failing_whatsapp(mut self) -> Self {
        self.fail_whatsapp = true;
        self
    }

    /// Every email accepted so far, in send order.
    pub fn emails(&self) -> Vec<EmailPayload> {
        self.emails.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Every WhatsApp message accepted so far, in send order.
    pub fn whatsapps(&self) -> Vec<WhatsAppPayload> {
        self.whatsapps.lock().map(|w| w.clone()).unwrap_or_default()
    }

    fn receipt(n: usize) -> SendReceipt {
        SendReceipt {
            ok: true,
            provider: Some("mock".to_string()),
            provider_message_id: Some(format!("mock-{n}")),
        }
    }
}

impl Default for MockSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageSender for MockSender {
    async fn send_email(&self, payload: EmailPayload) -> FactoryResult<SendReceipt> {
        if self.fail_email {
            return Err(leadfactory_core::SendError::RequestFailed {
                provider: "mock".to_string(),
                status: 502,
                message: "simulated provider outage".to_string(),
            }
            .into());
        }
        let mut emails = self.emails.lock().unwrap_or_else(|e| e.into_inner());
        emails.push(payload);
        Ok(Self::receipt(emails.len()))
    }

    async fn send_whatsapp(&self, payload: WhatsAppPayload) -> FactoryResult<SendReceipt> {
        if self.fail_whatsapp {
            return Err(leadfactory_core::SendError::RequestFailed {
                provider: "mock".to_string(),
                status: 502,
                message: "simulated provider outage".to_string(),
            }
            .into());
        }
        let mut whatsapps = self.whatsapps.lock().unwrap_or_else(|e| e.into_inner());
        whatsapps.push(payload);
        Ok(Self::receipt(whatsapps.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_workspace_has_contact_and_local_signals() {
        let ws = sample_workspace();
        assert!(ws.phone.is_some());
        assert!(!ws.address.is_empty());
        assert_eq!(ws.intake.as_ref().unwrap().city, "Lyon");
    }

    #[tokio::test]
    async fn test_mock_runner_records_calls_in_order() {
        let runner = MockStageRunner::new();
        let ws = sample_workspace();
        for stage in StageName::PIPELINE {
            runner.run_stage(stage, &ws).await.unwrap();
        }
        assert_eq!(runner.calls(), StageName::PIPELINE.to_vec());
    }

    #[tokio::test]
    async fn test_contactless_runner_strips_contact_fields() {
        let runner = MockStageRunner::contactless();
        let result = runner
            .run_stage(StageName::Normalizer, &sample_workspace())
            .await
            .unwrap();
        assert!(result.output.phone.is_none());
        assert!(result.output.email.is_none());
        assert!(result.output.city.is_none());
    }

    #[tokio::test]
    async fn test_failing_sender_rejects_only_configured_channel() {
        let sender = MockSender::new().failing_email();
        let email = EmailPayload {
            to: "a@b.fr".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
            html: None,
        };
        assert!(sender.send_email(email).await.is_err());

        let wa = WhatsAppPayload {
            to_e164: "+33600000000".to_string(),
            body: "b".to_string(),
        };
        assert!(sender.send_whatsapp(wa).await.is_ok());
        assert_eq!(sender.whatsapps().len(), 1);
    }
}
