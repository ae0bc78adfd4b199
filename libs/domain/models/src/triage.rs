// [libs/domain/models/src/triage.rs]
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageSource {
    Llm,
    Rules,
}

/// Output of the Triage Service. Carries `source` so downstream
/// consumers can tell an LLM classification from the deterministic
/// fallback apart without inspecting confidence heuristically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageResult {
    pub category: String,
    pub priority: u8,
    pub required_division_type: String,
    pub required_skills: BTreeSet<String>,
    pub source: TriageSource,
    pub confidence: f32,
}

impl TriageResult {
    pub fn clamp_priority(mut self) -> Self {
        self.priority = self.priority.clamp(1, 5);
        self
    }
}
