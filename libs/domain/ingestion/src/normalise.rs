// [libs/domain/ingestion/src/normalise.rs]
//! Stage 1: collapse the wire metadata into an
//! `IntakeDocument` and assign an idempotency key when the client
//! didn't send one. Pure and total — no I/O, never fails.

use uuid::Uuid;

use crate::document::{IntakeDocument, RawIntakeMetadata};

pub fn normalise(raw: RawIntakeMetadata) -> IntakeDocument {
    let idempotency_key = raw
        .metadata
        .idempotency_key
        .filter(|key| !key.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    IntakeDocument {
        ticket_id_client: raw.ticket_id_client,
        ticket_type: raw.ticket_type,
        text: raw.text.filter(|t| !t.trim().is_empty()),
        voice_transcript: raw.voice_transcript,
        images: raw.image,
        videos: raw.video,
        audio_file_ref: raw.audio_file_ref,
        latitude: raw.latitude,
        longitude: raw.longitude,
        location_accuracy_m: raw.location_accuracy_m,
        captured_at: raw.timestamp,
        device_info: raw.device_info,
        idempotency_key,
        capture_mode: raw.metadata.capture_mode,
        connectivity_state: raw.metadata.connectivity_state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{IntakeKeying, TicketType};
    use chrono::Utc;

    fn sample() -> RawIntakeMetadata {
        RawIntakeMetadata {
            schema_version: "1.0.0".into(),
            ticket_id_client: "client-1".into(),
            ticket_type: TicketType::Sos,
            text: Some("flooding on main street".into()),
            voice_transcript: None,
            image: vec![],
            video: vec![],
            audio_file_ref: None,
            latitude: 17.9,
            longitude: 79.5,
            location_accuracy_m: Some(12.0),
            timestamp: Utc::now(),
            device_info: serde_json::json!({}),
            metadata: IntakeKeying { idempotency_key: None, capture_mode: None, connectivity_state: None },
        }
    }

    #[test]
    fn missing_idempotency_key_is_generated() {
        let doc = normalise(sample());
        assert!(Uuid::parse_str(&doc.idempotency_key).is_ok());
    }

    #[test]
    fn supplied_idempotency_key_is_kept() {
        let mut raw = sample();
        raw.metadata.idempotency_key = Some("client-supplied-key".into());
        let doc = normalise(raw);
        assert_eq!(doc.idempotency_key, "client-supplied-key");
    }

    #[test]
    fn blank_text_is_treated_as_absent() {
        let mut raw = sample();
        raw.text = Some("   ".into());
        let doc = normalise(raw);
        assert!(doc.text.is_none());
    }
}
