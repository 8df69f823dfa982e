//! Autopilot step sequence and message template library

use leadfactory_core::Channel;

/// One entry of the default outbound sequence. `delay_days` is the offset
/// from sequence activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceTemplate {
    pub delay_days: i64,
    pub channel: Channel,
    pub template_key: &'static str,
}

/// The fixed default sequence instantiated at autopilot activation.
pub fn default_sequence() -> [SequenceTemplate; 4] {
    [
        SequenceTemplate {
            delay_days: 0,
            channel: Channel::Email,
            template_key: "intro_1",
        },
        SequenceTemplate {
            delay_days: 2,
            channel: Channel::Email,
            template_key: "followup_1",
        },
        SequenceTemplate {
            delay_days: 5,
            channel: Channel::Whatsapp,
            template_key: "quick_ping",
        },
        SequenceTemplate {
            delay_days: 10,
            channel: Channel::Email,
            template_key: "last_call",
        },
    ]
}

/// Body of a message template by key.
pub fn template_body(key: &str) -> Option<&'static str> {
    match key {
        "intro_1" => Some(
            "Bonjour {{name}},\n\nJ'ai analysé la présence en ligne de {{business}} et j'ai remarqué quelques opportunités manquées sur Google Maps.\n\nJ'ai préparé un audit rapide. Êtes-vous la bonne personne pour en discuter ?",
        ),
        "followup_1" => Some(
            "Bonjour {{name}},\n\nJe me permets de vous relancer concernant mon précédent message sur votre visibilité locale. Avez-vous eu le temps d'y jeter un œil ?",
        ),
        "quick_ping" => Some(
            "Bonjour {{name}}, c'est au sujet de {{business}}. Avez-vous 5min pour un appel rapide ?",
        ),
        "last_call" => Some(
            "Bonjour {{name}},\n\nJe clôture votre dossier pour le moment. Je reste disponible si vous souhaitez améliorer votre acquisition client plus tard.\n\nCordialement.",
        ),
        _ => None,
    }
}

/// Substitute the `{{name}}` and `{{business}}` placeholders.
pub fn render_template(body: &str, name: &str, business: &str) -> String {
    body.replace("{{name}}", name).replace("{{business}}", business)
}
