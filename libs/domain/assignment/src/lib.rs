// [libs/domain/assignment/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ASSIGNMENT ENGINE (V1.0)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: RANKEAR (ORG, DIVISION?, STAFF?) SOBRE UN SNAPSHOT
 *
 * Puro: ninguna función de este crate realiza E/S ni mutación. El
 * `FleetSnapshot` es inmutable durante la decisión completa (glosario,
 * "Fleet snapshot"); la re-validación del candidato elegido ocurre en
 * la transacción del Lifecycle Coordinator, no aquí.
 * =================================================================
 */

pub mod candidate;
pub mod scoring;
pub mod snapshot;

pub use candidate::{Candidate, ScoreBreakdown};
pub use snapshot::FleetSnapshot;

use std::collections::BTreeSet;

use aegis_core_geo::{haversine_km, LatLng};
use aegis_domain_models::{DivisionStatus, OrgStatus, TriageResult};
use tracing::instrument;

/// Strategy boundary so a future scoring approach can be swapped in
/// without touching the Lifecycle Coordinator.
pub trait CandidateRanker {
    fn rank(&self, triage: &TriageResult, incident_location: LatLng, snapshot: &FleetSnapshot) -> Vec<Candidate>;
}

pub struct WeightedRanker;

impl CandidateRanker for WeightedRanker {
    fn rank(&self, triage: &TriageResult, incident_location: LatLng, snapshot: &FleetSnapshot) -> Vec<Candidate> {
        rank(triage, incident_location, snapshot)
    }
}

/// Top-level entry point: `Rank(incident, fleet_snapshot) -> ranked
/// list of candidates`.
#[instrument(skip(snapshot), fields(category = %triage.category, priority = triage.priority))]
pub fn rank(triage: &TriageResult, incident_location: LatLng, snapshot: &FleetSnapshot) -> Vec<Candidate> {
    let canonical_org_category = aegis_domain_triage::rules::org_category_for(&triage.category);
    let required_skills: BTreeSet<String> = triage.required_skills.clone();

    let eligible_orgs: Vec<_> = snapshot
        .organisations
        .iter()
        .filter(|o| o.status != OrgStatus::Inactive)
        .collect();

    let any_org_has_headroom = eligible_orgs.iter().any(|o| !o.is_at_or_over_capacity());
    let overflow_escalation_active = !any_org_has_headroom && triage.priority >= 5;

    let candidate_orgs: Vec<_> = eligible_orgs
        .into_iter()
        .filter(|o| !o.is_at_or_over_capacity() || overflow_escalation_active)
        .collect();

    let mut candidates: Vec<Candidate> = candidate_orgs
        .into_iter()
        .map(|org| {
            let org_score = scoring::score_organisation(
                org,
                incident_location,
                &triage.required_division_type,
                canonical_org_category,
            );

            let best_division = snapshot
                .divisions_of(&org.id)
                .filter(|d| d.status == DivisionStatus::Active)
                .map(|d| (d, scoring::score_division(d, &triage.required_division_type, &required_skills)))
                .max_by(|(_, a), (_, b)| a.total.partial_cmp(&b.total).unwrap());

            let best_staff = best_division.as_ref().and_then(|(division, _)| {
                snapshot
                    .staff_of_division(&division.id)
                    .filter(|s| s.is_selectable())
                    .map(|s| (s, scoring::score_staff(s, incident_location, &required_skills)))
                    .filter(|(_, score)| score.eligible)
                    .max_by(|(_, a), (_, b)| a.total.partial_cmp(&b.total).unwrap())
            });

            let division_total = best_division.as_ref().map(|(_, s)| s.total).unwrap_or(0.0);
            let staff_total = best_staff.as_ref().map(|(_, s)| s.total).unwrap_or(0.0);
            let total = org_score.total * 0.5 + division_total * 0.3 + staff_total * 0.2;

            let breakdown = ScoreBreakdown {
                org_distance_fit: org_score.distance_fit,
                org_type_match: org_score.type_match,
                org_category_match: org_score.category_match,
                org_headroom: org_score.headroom,
                org_score: org_score.total,
                division_type_match: best_division.as_ref().map(|(_, s)| s.type_match).unwrap_or(0.0),
                division_headroom: best_division.as_ref().map(|(_, s)| s.headroom).unwrap_or(0.0),
                division_skill_overlap: best_division.as_ref().map(|(_, s)| s.skill_overlap).unwrap_or(0.0),
                division_score: division_total,
                staff_availability: best_staff.as_ref().map(|(_, s)| s.availability).unwrap_or(0.0),
                staff_skill_overlap: best_staff.as_ref().map(|(_, s)| s.skill_overlap).unwrap_or(0.0),
                staff_distance_fit: best_staff.as_ref().map(|(_, s)| s.distance_fit).unwrap_or(0.0),
                staff_score: staff_total,
                total,
                overflow: overflow_escalation_active && org.is_at_or_over_capacity(),
            };

            Candidate {
                organisation_id: org.id.clone(),
                division_id: best_division.map(|(d, _)| d.id.clone()),
                staff_id: best_staff.map(|(s, _)| s.id.clone()),
                score: total,
                breakdown,
            }
        })
        .collect();

    candidates.sort_by(|a, b| tie_break_compare(a, b, snapshot, incident_location));
    candidates
}

/// Descending by score, then higher headroom, then shorter distance,
/// then lexicographically smaller id (determinism for tests).
fn tie_break_compare(a: &Candidate, b: &Candidate, snapshot: &FleetSnapshot, incident_location: LatLng) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    match b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal) {
        Ordering::Equal => {}
        other => return other,
    }

    match b.breakdown.org_headroom.partial_cmp(&a.breakdown.org_headroom).unwrap_or(Ordering::Equal) {
        Ordering::Equal => {}
        other => return other,
    }

    let dist = |candidate: &Candidate| -> f64 {
        snapshot
            .organisations
            .iter()
            .find(|o| o.id == candidate.organisation_id)
            .map(|o| haversine_km(incident_location, LatLng::new(o.latitude, o.longitude)))
            .unwrap_or(f64::MAX)
    };

    match dist(a).partial_cmp(&dist(b)).unwrap_or(Ordering::Equal) {
        Ordering::Equal => {}
        other => return other,
    }

    a.organisation_id.cmp(&b.organisation_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_domain_models::{Organisation, OrgCategory, OrgStatus, OrgType, TriageSource};

    fn active_org(id: &str, capacity: u32, load: u32) -> Organisation {
        Organisation {
            id: id.into(),
            name: id.into(),
            org_type: OrgType::Ngo,
            category: OrgCategory::Rescue,
            region: None,
            latitude: 17.9689,
            longitude: 79.5941,
            capacity,
            current_load: load,
            status: OrgStatus::Active,
        }
    }

    fn flood_triage() -> TriageResult {
        TriageResult {
            category: "Flood Rescue".into(),
            priority: 5,
            required_division_type: "Rescue".into(),
            required_skills: Default::default(),
            source: TriageSource::Rules,
            confidence: 0.6,
        }
    }

    #[test]
    fn returns_non_empty_ranking_with_one_active_org() {
        let snapshot = FleetSnapshot::new(vec![active_org("org-a", 10, 0)], vec![], vec![]);
        let triage = flood_triage();
        let ranking = rank(&triage, LatLng::new(17.9689, 79.5941), &snapshot);
        assert!(!ranking.is_empty());
        assert!(!ranking[0].breakdown.overflow);
    }

    #[test]
    fn overflow_escalation_selects_least_overloaded_org() {
        let snapshot = FleetSnapshot::new(
            vec![active_org("org-a", 10, 10), active_org("org-b", 10, 10)],
            vec![],
            vec![],
        );
        let triage = flood_triage();
        let ranking = rank(&triage, LatLng::new(17.9689, 79.5941), &snapshot);
        assert_eq!(ranking.len(), 2);
        assert!(ranking[0].breakdown.overflow);
    }

    #[test]
    fn full_capacity_org_excluded_when_headroom_exists_elsewhere() {
        let snapshot = FleetSnapshot::new(
            vec![active_org("org-full", 10, 10), active_org("org-open", 10, 0)],
            vec![],
            vec![],
        );
        let triage = flood_triage();
        let ranking = rank(&triage, LatLng::new(17.9689, 79.5941), &snapshot);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].organisation_id, "org-open");
    }

    #[test]
    fn inactive_org_never_appears() {
        let mut org = active_org("org-inactive", 10, 0);
        org.status = OrgStatus::Inactive;
        let snapshot = FleetSnapshot::new(vec![org], vec![], vec![]);
        let triage = flood_triage();
        let ranking = rank(&triage, LatLng::new(17.9689, 79.5941), &snapshot);
        assert!(ranking.is_empty());
    }

    #[test]
    fn tie_break_prefers_lower_id_on_identical_scores() {
        let snapshot = FleetSnapshot::new(vec![active_org("org-b", 10, 0), active_org("org-a", 10, 0)], vec![], vec![]);
        let triage = flood_triage();
        let ranking = rank(&triage, LatLng::new(17.9689, 79.5941), &snapshot);
        assert_eq!(ranking[0].organisation_id, "org-a");
    }
}
