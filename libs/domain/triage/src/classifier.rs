// [libs/domain/triage/src/classifier.rs]
/*!
 * =================================================================
 * APARATO: EXTERNAL CLASSIFIER BOUNDARY (V1.0)
 * RESPONSABILIDAD: FRONTERA TIPADA HACIA EL LLM EXTERNO
 *
 * En lugar de parsear un blob no estructurado y confiar en que tenga
 * la forma esperada, aquí se modela la respuesta del clasificador
 * como una variante etiquetada total — nunca hay un "Result::Err"
 * que se propague al llamador del Triage Service; sólo hay un árbol
 * de variantes que el fallback de reglas cierra.
 * =================================================================
 */

use std::time::Duration;

use aegis_domain_models::TriageResult;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{instrument, warn};

/// What the external classifier call produced. Never a `Result` —
/// `Unavailable` and `InvalidSchema` are first-class outcomes the
/// caller always has a total answer for, not a propagated failure.
#[derive(Debug)]
pub enum ClassifierOutcome {
    Structured(TriageResult),
    InvalidSchema,
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct ClassifierRequest<'a> {
    pub text: &'a str,
    pub headcount: u32,
    pub place: Option<&'a str>,
    pub voice_transcript: Option<&'a str>,
    pub category_hint: Option<&'a str>,
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, request: ClassifierRequest<'_>) -> ClassifierOutcome;
}

/// Raw shape expected back from the LLM; any deviation becomes
/// `InvalidSchema` rather than a panic or a propagated parse error.
#[derive(Debug, Deserialize)]
struct RawClassifierResponse {
    category: String,
    priority: u8,
    required_division_type: String,
    required_skills: Vec<String>,
    #[serde(default)]
    confidence: f32,
}

pub struct GeminiClassifier {
    http: reqwest::Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GeminiClassifier {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        )
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    #[instrument(skip(self, request), fields(headcount = request.headcount))]
    async fn classify(&self, request: ClassifierRequest<'_>) -> ClassifierOutcome {
        let prompt = build_bounded_prompt(&request);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "response_mime_type": "application/json" },
        });

        let call = self.http.post(self.endpoint()).json(&body).timeout(self.timeout).send();

        let response = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(resp)) if resp.status().is_success() => resp,
            Ok(Ok(resp)) => {
                warn!(status = %resp.status(), "🛰️ [TRIAGE]: classifier returned non-2xx");
                return ClassifierOutcome::Unavailable;
            }
            Ok(Err(err)) => {
                warn!(error = %err, "🛰️ [TRIAGE]: classifier transport error");
                return ClassifierOutcome::Unavailable;
            }
            Err(_) => {
                warn!("🛰️ [TRIAGE]: classifier call exceeded {:?} deadline", self.timeout);
                return ClassifierOutcome::Unavailable;
            }
        };

        let text_body = match response.text().await {
            Ok(body) => body,
            Err(_) => return ClassifierOutcome::Unavailable,
        };

        match serde_json::from_str::<RawClassifierResponse>(&text_body) {
            Ok(raw) if (1..=5).contains(&raw.priority) => ClassifierOutcome::Structured(TriageResult {
                category: raw.category,
                priority: raw.priority,
                required_division_type: raw.required_division_type,
                required_skills: raw.required_skills.into_iter().collect(),
                source: aegis_domain_models::TriageSource::Llm,
                confidence: raw.confidence,
            }),
            Ok(_) | Err(_) => ClassifierOutcome::InvalidSchema,
        }
    }
}

fn build_bounded_prompt(request: &ClassifierRequest<'_>) -> String {
    format!(
        "Classify this incident report. Respond with strict JSON matching \
         {{category, priority (1-5), required_division_type, required_skills}}.\n\
         Text: {}\nHeadcount: {}\nPlace: {}\nTranscript: {}\nCategory hint: {}",
        request.text,
        request.headcount,
        request.place.unwrap_or("unknown"),
        request.voice_transcript.unwrap_or(""),
        request.category_hint.unwrap_or("")
    )
}
