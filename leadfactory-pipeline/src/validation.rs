//! Validation engine
//!
//! Pure, fully re-derivable advisory checks over the current workspace
//! state, recomputed idempotently after every stage. No check is fatal;
//! each failing check appends a human-readable warning consumed by the UI
//! and by the orchestrator's NEEDS_INPUT gating.

use leadfactory_core::{StageName, StageStatus, Workspace, WorkspaceValidation};
use serde::Serialize;

/// Fixed denylist scanned over generated copy. Matched case- and
/// diacritic-insensitively as substrings.
pub const BANNED_WORDS: [&str; 8] = [
    "garanti",
    "révolutionnaire",
    "meilleur",
    "exceptionnel",
    "incroyable",
    "promo",
    "offre de folie",
    "prix imbattables",
];

/// Result of a validation pass: the derived flags plus the warning list.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub validation: WorkspaceValidation,
    pub warnings: Vec<String>,
}

/// Lowercase and fold Latin diacritics so "Révolutionnaire" matches
/// "revolutionnaire".
fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.to_lowercase().chars() {
        match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' => out.push('a'),
            'è' | 'é' | 'ê' | 'ë' => out.push('e'),
            'ì' | 'í' | 'î' | 'ï' => out.push('i'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => out.push('o'),
            'ù' | 'ú' | 'û' | 'ü' => out.push('u'),
            'ç' => out.push('c'),
            'ñ' => out.push('n'),
            'ÿ' => out.push('y'),
            'œ' => out.push_str("oe"),
            'æ' => out.push_str("ae"),
            _ => out.push(c),
        }
    }
    out
}

fn json_text<T: Serialize>(value: &Option<T>) -> String {
    value
        .as_ref()
        .and_then(|v| serde_json::to_string(v).ok())
        .unwrap_or_default()
}

/// Scan a text for denylisted words. Returns the words that matched.
pub fn scan_banned_words(text: &str) -> Vec<&'static str> {
    let normalized = normalize(text);
    BANNED_WORDS
        .iter()
        .copied()
        .filter(|w| normalized.contains(&normalize(w)))
        .collect()
}

fn non_empty(s: &Option<String>) -> bool {
    s.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Recompute the advisory validation flags and warning list.
pub fn compute_validation(ws: &Workspace) -> ValidationReport {
    let mut warnings = Vec::new();

    let normalizer = ws.factory_state.run(StageName::Normalizer);
    let collector = ws.factory_state.run(StageName::Collector);

    // 1) Contact: root phone, or phone/email extracted by Normalizer or
    //    Collector.
    let phone = ws
        .phone
        .clone()
        .or_else(|| normalizer.output.as_ref().and_then(|o| o.phone.clone()))
        .or_else(|| collector.output.as_ref().and_then(|o| o.phone.clone()));
    let email = normalizer
        .output
        .as_ref()
        .and_then(|o| o.email.clone())
        .or_else(|| collector.output.as_ref().and_then(|o| o.email.clone()));

    let has_contact = non_empty(&phone) || non_empty(&email);
    if !has_contact {
        warnings.push("Contact manquant (téléphone/email).".to_string());
    }

    // 2) Local signals: non-empty city AND address.
    let city = ws
        .intake
        .as_ref()
        .map(|i| i.city.clone())
        .filter(|c| !c.trim().is_empty())
        .or_else(|| normalizer.output.as_ref().and_then(|o| o.city.clone()));
    let address = if ws.address.trim().is_empty() {
        normalizer.output.as_ref().and_then(|o| o.address.clone())
    } else {
        Some(ws.address.clone())
    };

    let local_signals = non_empty(&city) && non_empty(&address);
    if !local_signals {
        warnings.push("Signaux locaux incomplets (ville + adresse).".to_string());
    }

    // 3) CTA top + bottom: textual scan of the prototype for a hero
    //    marker and a contact/CTA marker, only once the stage is done.
    let designer = ws.factory_state.run(StageName::PrototypeDesigner);
    let cta_top_bottom = if designer.status == StageStatus::Done {
        let proto_text = normalize(&json_text(
            &designer.output.as_ref().and_then(|o| o.prototype.clone()),
        ));
        proto_text.contains("hero")
            && (proto_text.contains("contact") || proto_text.contains("cta"))
    } else {
        false
    };
    if designer.status == StageStatus::Done && !cta_top_bottom {
        warnings.push("CTA top/bottom non détecté (hero + cta/contact).".to_string());
    }

    // 4) Banned words over the concatenated generated copy.
    let blobs = [
        json_text(&ws.factory_state.run(StageName::OfferBuilder).output),
        json_text(&ws.factory_state.run(StageName::Copywriter).output),
        json_text(&designer.output),
    ]
    .join("\n");

    let hits = scan_banned_words(&blobs);
    let no_banned_words = hits.is_empty();
    if !no_banned_words {
        warnings.push(format!("Mots interdits détectés: {}", hits.join(", ")));
    }

    ValidationReport {
        validation: WorkspaceValidation {
            has_contact,
            local_signals,
            cta_top_bottom,
            no_banned_words,
        },
        warnings,
    }
}
