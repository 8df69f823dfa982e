//! Reply classification and application
//!
//! An inbound reply goes through two independent halves: a classifier
//! produces an intent, and a deterministic applier turns the intent into
//! CRM/autopilot/opt-out transitions. The applier never inspects the
//! text itself, so swapping the heuristic classifier for a model-backed
//! one changes no downstream behavior.

use async_trait::async_trait;

use leadfactory_core::{
    ActivityKind, CrmStage, FactoryResult, InboundMessage, NextAction, ProposedReply,
    ReplyClassification, ReplyIntent, Workspace,
};

use crate::autopilot::stop_autopilot;
use crate::crm::{add_activity, add_follow_up, ensure_crm};

/// Inbound text handed to a classifier, with optional context of the
/// ongoing conversation.
#[derive(Debug, Clone, Default)]
pub struct ReplyInput {
    pub subject: String,
    pub text: String,
    pub business_name: Option<String>,
    pub last_message: Option<String>,
}

/// Classifier seam. The heuristic implementation is the baseline; a
/// model-backed classifier plugs in behind the same trait.
#[async_trait]
pub trait ReplyClassifier: Send + Sync {
    async fn classify(&self, input: &ReplyInput) -> FactoryResult<ReplyClassification>;
}

/// Keyword classifier. Checks intent buckets in a fixed priority order
/// and returns the first hit; "stop" is deliberately in both the
/// unsubscribe and objection sets, with unsubscribe winning.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

#[async_trait]
impl ReplyClassifier for HeuristicClassifier {
    async fn classify(&self, input: &ReplyInput) -> FactoryResult<ReplyClassification> {
        Ok(classify_heuristic(input))
    }
}

fn has(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|w| haystack.contains(w))
}

/// Classify an inbound reply from keyword buckets alone.
pub fn classify_heuristic(input: &ReplyInput) -> ReplyClassification {
    let t = input.text.to_lowercase();

    if has(&t, &["désinscrire", "unsubscribe", "stop", "retirer"]) {
        return ReplyClassification {
            intent: ReplyIntent::Unsubscribe,
            confidence: 0.9,
            summary: "Demande de désinscription.".to_string(),
            suggested_next_action: NextAction::StopAutopilot,
            proposed_reply: Some(ProposedReply {
                subject: None,
                body: "Bien reçu. Vous êtes désinscrit, bonne journée.".to_string(),
            }),
        };
    }

    if has(&t, &["pas intéressé", "non merci", "stop", "pub"]) {
        return ReplyClassification {
            intent: ReplyIntent::Objection,
            confidence: 0.7,
            summary: "Refus / objection.".to_string(),
            suggested_next_action: NextAction::StopAutopilot,
            proposed_reply: Some(ProposedReply {
                subject: None,
                body: "Merci pour votre retour. Je n’insiste pas. Bonne journée.".to_string(),
            }),
        };
    }

    if has(
        &t,
        &["oui", "ok", "d’accord", "quand", "rdv", "rendez-vous", "appel", "dispo"],
    ) {
        return ReplyClassification {
            intent: ReplyIntent::Positive,
            confidence: 0.75,
            summary: "Intérêt exprimé / demande de RDV.".to_string(),
            suggested_next_action: NextAction::Reply,
            proposed_reply: Some(ProposedReply {
                subject: None,
                body: "Merci ! Quel créneau vous arrange (2 options) ?\n— Option 1 : demain matin\n— Option 2 : demain après-midi\n\nEt le meilleur numéro pour vous joindre ?".to_string(),
            }),
        };
    }

    if has(&t, &["combien", "tarif", "prix", "coût", "devis"]) {
        return ReplyClassification {
            intent: ReplyIntent::Question,
            confidence: 0.75,
            summary: "Question sur le prix.".to_string(),
            suggested_next_action: NextAction::Reply,
            proposed_reply: Some(ProposedReply {
                subject: None,
                body: "Merci ! Pour vous donner un tarif juste :\n1) Votre service principal ?\n2) Votre ville/zone ?\n3) Vous avez déjà un site ?\n\nJe vous réponds avec une fourchette claire.".to_string(),
            }),
        };
    }

    if has(&t, &["absent", "out of office", "vacances", "de retour le"]) {
        return ReplyClassification {
            intent: ReplyIntent::OutOfOffice,
            confidence: 0.7,
            summary: "Réponse automatique d'absence.".to_string(),
            suggested_next_action: NextAction::ScheduleFollowup,
            proposed_reply: Some(ProposedReply {
                subject: None,
                body: "Merci, je reviens vers vous à votre retour.".to_string(),
            }),
        };
    }

    ReplyClassification {
        intent: ReplyIntent::Unknown,
        confidence: 0.4,
        summary: "Réponse non classée.".to_string(),
        suggested_next_action: NextAction::Reply,
        proposed_reply: Some(ProposedReply {
            subject: None,
            body: "Merci pour votre retour. Pouvez-vous me dire ce qui vous intéresse le plus ?"
                .to_string(),
        }),
    }
}

/// Apply a classified inbound reply to the workspace.
///
/// Records the inbound and its classification (first classification of a
/// given inbound wins; re-applying never revises it), logs a CRM note,
/// then runs the intent transition table. Every intent books some human
/// follow-up or terminal state so no reply ever silently dead-ends.
pub fn apply_reply(
    ws: Workspace,
    inbound: InboundMessage,
    classification: ReplyClassification,
) -> Workspace {
    let mut ws = ensure_crm(ws);
    let intent = classification.intent;

    ws.reply_classifications
        .entry(inbound.inbound_id)
        .or_insert(classification.clone());

    let note = format!(
        "Inbound ({}): {}\n\n{}",
        intent, classification.summary, inbound.text
    );
    ws.inbound.push(inbound);
    let mut ws = add_activity(ws, ActivityKind::Note, note);

    tracing::info!(
        workspace = %ws.workspace_id,
        intent = %intent,
        "inbound reply applied"
    );

    match intent {
        ReplyIntent::Unsubscribe => {
            ws.opt_out.email = true;
            if let Some(crm) = ws.crm.as_mut() {
                crm.stage = CrmStage::Lost;
            }
            stop_autopilot(ws)
        }
        ReplyIntent::Positive => {
            if let Some(crm) = ws.crm.as_mut() {
                crm.stage = CrmStage::Replied;
            }
            let ws = stop_autopilot(ws);
            add_follow_up(ws, 1, Some("Proposer 2 créneaux RDV"))
        }
        ReplyIntent::OutOfOffice | ReplyIntent::NotNow => {
            add_follow_up(ws, 7, Some("Relance après absence / pas maintenant"))
        }
        ReplyIntent::Objection | ReplyIntent::WrongPerson => {
            if let Some(crm) = ws.crm.as_mut() {
                crm.stage = CrmStage::Lost;
            }
            stop_autopilot(ws)
        }
        _ => add_follow_up(ws, 2, Some("Répondre / clarifier")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autopilot::enable_autopilot;
    use chrono::Utc;
    use leadfactory_core::{new_entity_id, AutopilotStatus, Channel, MatchedBy};

    fn classify(text: &str) -> ReplyClassification {
        classify_heuristic(&ReplyInput {
            text: text.to_string(),
            ..Default::default()
        })
    }

    fn inbound(text: &str) -> InboundMessage {
        InboundMessage {
            inbound_id: new_entity_id(),
            channel: Channel::Email,
            from: "bruno@garage-morel.fr".to_string(),
            to: "hello@leadfactory.dev".to_string(),
            subject: Some("Re: Question pour Garage Morel [LF:t-abc]".to_string()),
            text: text.to_string(),
            received_at: Utc::now(),
            matched_by: Some(MatchedBy::SubjectToken),
        }
    }

    #[test]
    fn test_keyword_buckets() {
        assert_eq!(classify("Merci de me désinscrire").intent, ReplyIntent::Unsubscribe);
        assert_eq!(classify("Non merci, pas besoin").intent, ReplyIntent::Objection);
        assert_eq!(classify("Oui, dispo demain pour un appel").intent, ReplyIntent::Positive);
        assert_eq!(classify("C'est combien, vous avez un tarif ?").intent, ReplyIntent::Question);
        assert_eq!(classify("Je suis absent, de retour le 12").intent, ReplyIntent::OutOfOffice);
        assert_eq!(classify("???").intent, ReplyIntent::Unknown);
    }

    #[test]
    fn test_stop_resolves_to_unsubscribe_over_objection() {
        let cls = classify("STOP");
        assert_eq!(cls.intent, ReplyIntent::Unsubscribe);
        assert_eq!(cls.suggested_next_action, NextAction::StopAutopilot);
    }

    #[test]
    fn test_every_classification_proposes_a_reply() {
        for text in ["désinscrire", "non merci", "oui", "tarif ?", "vacances", "???"] {
            let cls = classify(text);
            assert!(cls.proposed_reply.is_some(), "no proposed reply for {text:?}");
            assert!(cls.confidence > 0.0 && cls.confidence <= 1.0);
        }
    }

    #[test]
    fn test_unsubscribe_opts_out_and_stops() {
        let ws = enable_autopilot(
            Workspace::new("Garage Morel", "4 avenue Jaurès"),
            Utc::now(),
        );
        let msg = inbound("Merci de me désinscrire");
        let ws = apply_reply(ws, msg.clone(), classify(&msg.text));

        assert!(ws.opt_out.email);
        assert_eq!(ws.crm.as_ref().unwrap().stage, CrmStage::Lost);
        assert_eq!(
            ws.autopilot.as_ref().unwrap().status,
            AutopilotStatus::Stopped
        );
        assert_eq!(ws.inbound.len(), 1);
        assert_eq!(
            ws.reply_classifications[&msg.inbound_id].intent,
            ReplyIntent::Unsubscribe
        );
        // The note carries the intent tag and the original text.
        let crm = ws.crm.as_ref().unwrap();
        assert!(crm.activities[0].content.starts_with("Inbound (unsubscribe):"));
        assert!(crm.activities[0].content.contains("désinscrire"));
    }

    #[test]
    fn test_positive_moves_to_replied_with_meeting_follow_up() {
        let ws = enable_autopilot(
            Workspace::new("Garage Morel", "4 avenue Jaurès"),
            Utc::now(),
        );
        let msg = inbound("Oui, un rdv jeudi me va");
        let ws = apply_reply(ws, msg, classify("Oui, un rdv jeudi me va"));

        assert_eq!(ws.crm.as_ref().unwrap().stage, CrmStage::Replied);
        assert_eq!(
            ws.autopilot.as_ref().unwrap().status,
            AutopilotStatus::Stopped
        );
        let follow_ups = &ws.crm.as_ref().unwrap().follow_ups;
        assert_eq!(follow_ups.len(), 1);
        assert_eq!(follow_ups[0].note.as_deref(), Some("Proposer 2 créneaux RDV"));
    }

    #[test]
    fn test_out_of_office_keeps_autopilot_running() {
        let ws = enable_autopilot(
            Workspace::new("Garage Morel", "4 avenue Jaurès"),
            Utc::now(),
        );
        let msg = inbound("Je suis en vacances");
        let ws = apply_reply(ws, msg, classify("Je suis en vacances"));

        assert_eq!(
            ws.autopilot.as_ref().unwrap().status,
            AutopilotStatus::Active
        );
        assert_eq!(ws.crm.as_ref().unwrap().stage, CrmStage::New);
        assert_eq!(
            ws.crm.as_ref().unwrap().follow_ups[0].note.as_deref(),
            Some("Relance après absence / pas maintenant")
        );
    }

    #[test]
    fn test_question_schedules_clarification_follow_up() {
        let ws = Workspace::new("Garage Morel", "4 avenue Jaurès");
        let msg = inbound("Combien ça coûte ?");
        let ws = apply_reply(ws, msg, classify("Combien ça coûte ?"));

        assert_eq!(
            ws.crm.as_ref().unwrap().follow_ups[0].note.as_deref(),
            Some("Répondre / clarifier")
        );
    }

    #[test]
    fn test_first_classification_wins() {
        let ws = Workspace::new("Garage Morel", "4 avenue Jaurès");
        let msg = inbound("Oui");
        let ws = apply_reply(ws, msg.clone(), classify("Oui"));
        let ws = apply_reply(ws, msg.clone(), classify("désinscrire"));

        assert_eq!(
            ws.reply_classifications[&msg.inbound_id].intent,
            ReplyIntent::Positive
        );
        // The later apply still runs its transitions.
        assert!(ws.opt_out.email);
    }

    #[tokio::test]
    async fn test_heuristic_classifier_trait_wiring() {
        let classifier = HeuristicClassifier;
        let cls = classifier
            .classify(&ReplyInput {
                text: "Quand êtes-vous dispo ?".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(cls.intent, ReplyIntent::Positive);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        // Classification is a pure function of the text.
        #[test]
        fn prop_classification_deterministic(text in ".{0,200}") {
            let input = ReplyInput { text, ..Default::default() };
            prop_assert_eq!(classify_heuristic(&input), classify_heuristic(&input));
        }

        // Confidence always lands in the documented range.
        #[test]
        fn prop_confidence_in_range(text in ".{0,200}") {
            let cls = classify_heuristic(&ReplyInput { text, ..Default::default() });
            prop_assert!(cls.confidence >= 0.4 && cls.confidence <= 0.9);
        }
    }
}
