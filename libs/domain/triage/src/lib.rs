// [libs/domain/triage/src/lib.rs]
/*!
 * =================================================================
 * APARATO: TRIAGE SERVICE (V1.0)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: INCIDENT -> (CATEGORY, PRIORITY, DIVISION, SKILLS)
 *
 * Camino primario: clasificador externo acotado por deadline.
 * Camino de respaldo: reglas deterministas, total.
 * =================================================================
 */

pub mod category_table;
pub mod classifier;
pub mod rules;

pub use classifier::{Classifier, ClassifierOutcome, ClassifierRequest, GeminiClassifier};

use aegis_domain_models::TriageResult;
use tracing::{info, instrument};

/// Runs the full triage pipeline: try the classifier if one is
/// configured, fall through to the deterministic rules on anything
/// other than a schema-valid structured response. Never returns an
/// error — this function is total.
#[instrument(skip(classifier_impl, text))]
pub async fn triage(
    classifier_impl: Option<&(dyn Classifier)>,
    text: &str,
    headcount: u32,
    place: Option<&str>,
    voice_transcript: Option<&str>,
    category_hint: Option<&str>,
) -> TriageResult {
    if let Some(classifier_impl) = classifier_impl {
        let request = ClassifierRequest { text, headcount, place, voice_transcript, category_hint };
        match classifier_impl.classify(request).await {
            ClassifierOutcome::Structured(result) => {
                info!(source = "llm", category = %result.category, "🧭 [TRIAGE]: classified via LLM");
                return result.clamp_priority();
            }
            ClassifierOutcome::InvalidSchema => {
                info!("🧭 [TRIAGE]: classifier response failed schema validation, falling back to rules");
            }
            ClassifierOutcome::Unavailable => {
                info!("🧭 [TRIAGE]: classifier unavailable, falling back to rules");
            }
        }
    }

    rules::apply_rules(text, headcount).clamp_priority()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_classifier_configured_goes_straight_to_rules() {
        let result = triage(None, "fire smoke burn", 5, None, None, None).await;
        assert_eq!(result.source, aegis_domain_models::TriageSource::Rules);
        assert_eq!(result.category, "Fire Response");
    }

    struct AlwaysUnavailable;
    #[async_trait::async_trait]
    impl Classifier for AlwaysUnavailable {
        async fn classify(&self, _: ClassifierRequest<'_>) -> ClassifierOutcome {
            ClassifierOutcome::Unavailable
        }
    }

    #[tokio::test]
    async fn unavailable_classifier_falls_back_to_rules() {
        let c = AlwaysUnavailable;
        let result = triage(Some(&c), "medical bleeding", 1, None, None, None).await;
        assert_eq!(result.source, aegis_domain_models::TriageSource::Rules);
    }

    struct AlwaysStructured;
    #[async_trait::async_trait]
    impl Classifier for AlwaysStructured {
        async fn classify(&self, _: ClassifierRequest<'_>) -> ClassifierOutcome {
            ClassifierOutcome::Structured(TriageResult {
                category: "Custom".into(),
                priority: 9,
                required_division_type: "Medical".into(),
                required_skills: Default::default(),
                source: aegis_domain_models::TriageSource::Llm,
                confidence: 0.95,
            })
        }
    }

    #[tokio::test]
    async fn structured_classifier_result_is_clamped() {
        let c = AlwaysStructured;
        let result = triage(Some(&c), "anything", 1, None, None, None).await;
        assert_eq!(result.source, aegis_domain_models::TriageSource::Llm);
        assert_eq!(result.priority, 5);
    }
}
