// [libs/domain/ingestion/src/document.rs]
//! Canonical shapes for the mobile intake pipeline. An
//! `IntakeDocument` is the normalised form of the wire metadata
//! schema; `IntakeAnnotations` accumulates what later stages learn
//! about it. Neither is mutated in place once built — each stage
//! returns a fresh annotation value, never edits the document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TicketType {
    Sos,
    Normal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoiceTranscriptSegment {
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceTranscript {
    pub raw_text: String,
    pub provider: String,
    pub model: String,
    pub language: String,
    #[serde(default)]
    pub segments: Vec<VoiceTranscriptSegment>,
}

/// The wire-level `metadata` JSON object, deserialised as-is
/// before normalisation touches it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawIntakeMetadata {
    pub schema_version: String,
    pub ticket_id_client: String,
    pub ticket_type: TicketType,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub voice_transcript: Option<VoiceTranscript>,
    #[serde(default)]
    pub image: Vec<String>,
    #[serde(default)]
    pub video: Vec<String>,
    #[serde(default)]
    pub audio_file_ref: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub location_accuracy_m: Option<f64>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub device_info: serde_json::Value,
    pub metadata: IntakeKeying,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntakeKeying {
    #[serde(default)]
    pub idempotency_key: Option<String>,
    #[serde(default)]
    pub capture_mode: Option<String>,
    #[serde(default)]
    pub connectivity_state: Option<String>,
}

/// The normalised document every later stage annotates. `text` is
/// `None` until modality analysis resolves one.
#[derive(Debug, Clone)]
pub struct IntakeDocument {
    pub ticket_id_client: String,
    pub ticket_type: TicketType,
    pub text: Option<String>,
    pub voice_transcript: Option<VoiceTranscript>,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub audio_file_ref: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub location_accuracy_m: Option<f64>,
    pub captured_at: DateTime<Utc>,
    pub device_info: serde_json::Value,
    pub idempotency_key: String,
    pub capture_mode: Option<String>,
    pub connectivity_state: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    Original,
    TranscriptFallback,
    SttFallback,
    Unresolved,
}

/// Accrued findings from stages 2-4. Carried alongside the document
/// rather than folded into it — keeps each stage a pure function of
/// its inputs plus the running annotation set.
#[derive(Debug, Clone)]
pub struct IntakeAnnotations {
    pub resolved_text: String,
    pub text_source: TextSource,
    pub weather_unverified: bool,
    pub likely_duplicate: bool,
    pub duplicate_cluster_id: Option<String>,
    pub fraud_score: f32,
    pub requires_review: bool,
    pub lane: Option<aegis_domain_models::PriorityLane>,
}

impl IntakeAnnotations {
    pub fn starting(resolved_text: String, text_source: TextSource) -> Self {
        Self {
            resolved_text,
            text_source,
            weather_unverified: false,
            likely_duplicate: false,
            duplicate_cluster_id: None,
            fraud_score: 0.0,
            requires_review: false,
            lane: None,
        }
    }
}
