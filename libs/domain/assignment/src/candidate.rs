// [libs/domain/assignment/src/candidate.rs]
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Default)]
pub struct ScoreBreakdown {
    pub org_distance_fit: f64,
    pub org_type_match: f64,
    pub org_category_match: f64,
    pub org_headroom: f64,
    pub org_score: f64,

    pub division_type_match: f64,
    pub division_headroom: f64,
    pub division_skill_overlap: f64,
    pub division_score: f64,

    pub staff_availability: f64,
    pub staff_skill_overlap: f64,
    pub staff_distance_fit: f64,
    pub staff_score: f64,

    pub total: f64,
    /// Set when the org was selected despite being at or over
    /// capacity because no org anywhere in the fleet had headroom
    /// and the incident is priority 5.
    pub overflow: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub organisation_id: String,
    pub division_id: Option<String>,
    pub staff_id: Option<String>,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}
