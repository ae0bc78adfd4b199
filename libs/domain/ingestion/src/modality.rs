// [libs/domain/ingestion/src/modality.rs]
//! Stage 2: resolve a usable text field. Falls back from raw
//! text to the voice transcript to an external STT call; an
//! unavailable STT provider never fails the pipeline, it just leaves
//! the text empty and flags the gap.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{instrument, warn};

use crate::document::{IntakeAnnotations, IntakeDocument, TextSource};

/// Outbound deadline for the STT call.
const STT_DEADLINE: Duration = Duration::from_secs(10);

#[async_trait]
pub trait SttProvider: Send + Sync {
    async fn transcribe(&self, audio_file_ref: &str) -> Option<String>;
}

#[instrument(skip(document, stt))]
pub async fn analyse_modality(document: &IntakeDocument, stt: Option<&dyn SttProvider>) -> IntakeAnnotations {
    if let Some(text) = &document.text {
        return IntakeAnnotations::starting(text.clone(), TextSource::Original);
    }

    if let Some(transcript) = &document.voice_transcript {
        if !transcript.raw_text.trim().is_empty() {
            return IntakeAnnotations::starting(transcript.raw_text.clone(), TextSource::TranscriptFallback);
        }
    }

    let Some(audio_ref) = &document.audio_file_ref else {
        warn!("🎙️ [MODALITY]: no text, transcript, or audio to fall back to");
        return IntakeAnnotations::starting(String::new(), TextSource::Unresolved);
    };

    let Some(stt) = stt else {
        warn!("🎙️ [MODALITY]: audio present but no STT provider configured");
        return IntakeAnnotations::starting(String::new(), TextSource::Unresolved);
    };

    match tokio::time::timeout(STT_DEADLINE, stt.transcribe(audio_ref)).await {
        Ok(Some(text)) if !text.trim().is_empty() => IntakeAnnotations::starting(text, TextSource::SttFallback),
        Ok(_) => {
            warn!("🎙️ [MODALITY]: STT returned empty transcript");
            IntakeAnnotations::starting(String::new(), TextSource::Unresolved)
        }
        Err(_) => {
            warn!("🎙️ [MODALITY]: STT call exceeded {STT_DEADLINE:?} deadline");
            IntakeAnnotations::starting(String::new(), TextSource::Unresolved)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TicketType;
    use chrono::Utc;

    fn base_document() -> IntakeDocument {
        IntakeDocument {
            ticket_id_client: "c1".into(),
            ticket_type: TicketType::Sos,
            text: None,
            voice_transcript: None,
            images: vec![],
            videos: vec![],
            audio_file_ref: None,
            latitude: 0.0,
            longitude: 0.0,
            location_accuracy_m: None,
            captured_at: Utc::now(),
            device_info: serde_json::json!({}),
            idempotency_key: "key-1".into(),
            capture_mode: None,
            connectivity_state: None,
        }
    }

    #[tokio::test]
    async fn uses_original_text_when_present() {
        let mut document = base_document();
        document.text = Some("smoke visible".into());
        let annotations = analyse_modality(&document, None).await;
        assert_eq!(annotations.resolved_text, "smoke visible");
        assert_eq!(annotations.text_source, TextSource::Original);
    }

    #[tokio::test]
    async fn falls_back_to_unresolved_without_any_source() {
        let document = base_document();
        let annotations = analyse_modality(&document, None).await;
        assert_eq!(annotations.text_source, TextSource::Unresolved);
        assert!(annotations.resolved_text.is_empty());
    }

    struct AlwaysEmpty;
    #[async_trait]
    impl SttProvider for AlwaysEmpty {
        async fn transcribe(&self, _audio_file_ref: &str) -> Option<String> {
            None
        }
    }

    #[tokio::test]
    async fn stt_unavailable_leaves_text_empty_without_failing() {
        let mut document = base_document();
        document.audio_file_ref = Some("gs://bucket/clip.m4a".into());
        let stt = AlwaysEmpty;
        let annotations = analyse_modality(&document, Some(&stt)).await;
        assert_eq!(annotations.text_source, TextSource::Unresolved);
    }
}
