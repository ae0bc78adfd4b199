// [libs/domain/triage/src/rules.rs]
/*!
 * Motor de reglas determinista. Total: nunca falla, nunca
 * bloquea — es la red de seguridad cuando el clasificador externo no
 * está disponible o produce una respuesta inválida.
 */

use std::collections::BTreeSet;

use aegis_domain_models::{TriageResult, TriageSource};

use crate::category_table::{
    base_priority, canonical_org_category, headcount_bump, phrase_bump, required_division_type,
    skill_seeds, DEFAULT_CATEGORY, KEYWORD_BUCKETS,
};

/// Picks the first keyword bucket whose keyword list matches anywhere
/// in `text` (case-insensitive), falling back to `DEFAULT_CATEGORY`.
fn classify_category(text: &str) -> &'static str {
    let lowered = text.to_lowercase();
    for (_, keywords, category) in KEYWORD_BUCKETS {
        if keywords.iter().any(|kw| lowered.contains(kw)) {
            return category;
        }
    }
    DEFAULT_CATEGORY
}

/// The canonical organisation-category string the Assignment Engine
/// compares against (`category_match`). Exposed so the Assignment
/// Engine does not need to re-derive it from a raw category string.
pub fn org_category_for(category: &str) -> &'static str {
    canonical_org_category(category)
}

pub fn apply_rules(text: &str, headcount: u32) -> TriageResult {
    let category = classify_category(text);
    let priority = base_priority(category)
        .saturating_add(headcount_bump(headcount))
        .saturating_add(phrase_bump(text))
        .clamp(1, 5);

    let required_skills: BTreeSet<String> =
        skill_seeds(category).iter().map(|s| s.to_string()).collect();

    TriageResult {
        category: category.to_string(),
        priority,
        required_division_type: required_division_type(category).to_string(),
        required_skills,
        source: TriageSource::Rules,
        confidence: 0.6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flood_with_children_and_high_headcount_hits_priority_five() {
        let result = apply_rules("Flood water entered homes, children trapped", 12);
        assert_eq!(result.category, "Flood Rescue");
        assert_eq!(result.required_division_type, "Rescue");
        assert_eq!(result.priority, 5);
    }

    #[test]
    fn fallback_rules_handle_rescue_keywords_without_a_classifier() {
        let result = apply_rules("elderly trapped in collapsed building, urgent", 0);
        assert_eq!(result.category, "Rescue");
        assert_eq!(result.priority, 5);
        assert_eq!(result.source, TriageSource::Rules);
    }

    #[test]
    fn priority_never_exceeds_five() {
        let result = apply_rules("fire smoke burn urgent trapped children elderly", 50);
        assert_eq!(result.priority, 5);
    }

    #[test]
    fn priority_never_drops_below_one() {
        let result = apply_rules("routine welfare check, nothing unusual", 0);
        assert!(result.priority >= 1);
    }

    #[test]
    fn first_bucket_match_wins_on_tie() {
        // Text matches both "fire" and "medical" buckets; fire is declared first.
        let result = apply_rules("fire and medical emergency both reported", 0);
        assert_eq!(result.category, "Fire Response");
    }

    #[test]
    fn headcount_bump_thresholds() {
        use crate::category_table::headcount_bump;
        assert_eq!(headcount_bump(0), 0);
        assert_eq!(headcount_bump(2), 0);
        assert_eq!(headcount_bump(3), 1);
        assert_eq!(headcount_bump(9), 1);
        assert_eq!(headcount_bump(10), 2);
        assert_eq!(headcount_bump(29), 2);
        assert_eq!(headcount_bump(30), 3);
    }
}
