// [libs/domain/assignment/src/scoring.rs]
/*!
 * Pure scoring functions. No I/O, no mutation — every function
 * here takes immutable references and returns a number or a small
 * breakdown struct.
 */

use std::collections::BTreeSet;

use aegis_core_geo::{distance_fit, haversine_km, LatLng};
use aegis_domain_models::{Division, Organisation, OrgType, Staff};

/// The category-policy table referenced by `type_match`: which
/// organisation types are compatible with which required division
/// type. Kept as a small match rather than a data file since the
/// policy is fixed and small, mirroring how the rules fallback
/// keeps its own fixed tables as plain Rust data.
pub fn org_type_compatible(required_division_type: &str, org_type: OrgType) -> bool {
    use OrgType::*;
    match required_division_type {
        "Medical" => matches!(org_type, Government | Ngo | Private),
        "Rescue" => matches!(org_type, Government | Ngo | VolunteerGroup),
        "Logistics" => matches!(org_type, Government | Private | Ngo),
        "Communication" => matches!(org_type, Government | Private),
        "Emergency Response" => matches!(org_type, Government | Ngo | VolunteerGroup | Private),
        _ => false,
    }
}

pub struct OrgScore {
    pub distance_fit: f64,
    pub type_match: f64,
    pub category_match: f64,
    pub headroom: f64,
    pub total: f64,
    /// `None` means the organisation is disqualified (Inactive).
    pub eligible: bool,
}

pub fn score_organisation(
    org: &Organisation,
    incident_location: LatLng,
    required_division_type: &str,
    canonical_org_category: &str,
) -> OrgScore {
    if org.status == aegis_domain_models::OrgStatus::Inactive {
        return OrgScore { distance_fit: 0.0, type_match: 0.0, category_match: 0.0, headroom: 0.0, total: f64::NEG_INFINITY, eligible: false };
    }

    let org_location = LatLng::new(org.latitude, org.longitude);
    let distance = haversine_km(incident_location, org_location);

    let distance_fit_score = distance_fit(distance, 100.0, 30.0);
    let type_match_score = if org_type_compatible(required_division_type, org.org_type) { 20.0 } else { 0.0 };
    let category_match_score = if org.category.as_canonical_str() == canonical_org_category { 20.0 } else { 0.0 };
    let headroom_score = 30.0 * org.headroom_fraction().max(0.0);

    let total = distance_fit_score + type_match_score + category_match_score + headroom_score;

    OrgScore {
        distance_fit: distance_fit_score,
        type_match: type_match_score,
        category_match: category_match_score,
        headroom: headroom_score,
        total,
        eligible: true,
    }
}

pub struct DivisionScore {
    pub type_match: f64,
    pub headroom: f64,
    pub skill_overlap: f64,
    pub total: f64,
}

pub fn score_division(division: &Division, required_division_type: &str, required_skills: &BTreeSet<String>) -> DivisionScore {
    let type_match_score = if division.division_type.as_str() == required_division_type { 50.0 } else { 0.0 };
    let headroom_score = 30.0 * division.headroom_fraction().max(0.0);

    let overlap_count = required_skills.intersection(&division.skills).count();
    let skill_overlap_score = 20.0 * (overlap_count as f64 / required_skills.len().max(1) as f64);

    DivisionScore {
        type_match: type_match_score,
        headroom: headroom_score,
        skill_overlap: skill_overlap_score,
        total: type_match_score + headroom_score + skill_overlap_score,
    }
}

pub struct StaffScoreResult {
    pub availability: f64,
    pub skill_overlap: f64,
    pub distance_fit: f64,
    pub total: f64,
    /// A Busy or Off-duty staff member is never returned.
    pub eligible: bool,
}

pub fn score_staff(staff: &Staff, incident_location: LatLng, required_skills: &BTreeSet<String>) -> StaffScoreResult {
    use aegis_domain_models::Availability;

    if staff.availability != Availability::Available {
        return StaffScoreResult { availability: 0.0, skill_overlap: 0.0, distance_fit: 0.0, total: f64::NEG_INFINITY, eligible: false };
    }

    let has_location = staff.latitude.is_some() && staff.longitude.is_some();
    let availability_score = if has_location { 40.0 } else { 20.0 }; // unknown location, Active -> half credit
    let overlap_count = required_skills.intersection(&staff.skills).count();
    let skill_overlap_score = 40.0 * (overlap_count as f64 / required_skills.len().max(1) as f64);

    let distance_fit_score = match (staff.latitude, staff.longitude) {
        (Some(lat), Some(lng)) => distance_fit(haversine_km(incident_location, LatLng::new(lat, lng)), 50.0, 20.0),
        _ => 0.0,
    };

    StaffScoreResult {
        availability: availability_score,
        skill_overlap: skill_overlap_score,
        distance_fit: distance_fit_score,
        total: availability_score + skill_overlap_score + distance_fit_score,
        eligible: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_domain_models::{OrgCategory, OrgStatus};

    fn sample_org(capacity: u32, load: u32, status: OrgStatus) -> Organisation {
        Organisation {
            id: "org-1".into(),
            name: "Org".into(),
            org_type: OrgType::Ngo,
            category: OrgCategory::Rescue,
            region: None,
            latitude: 0.0,
            longitude: 0.0,
            capacity,
            current_load: load,
            status,
        }
    }

    #[test]
    fn inactive_org_is_disqualified() {
        let org = sample_org(10, 0, OrgStatus::Inactive);
        let score = score_organisation(&org, LatLng::new(0.0, 0.0), "Rescue", "rescue");
        assert!(!score.eligible);
        assert_eq!(score.total, f64::NEG_INFINITY);
    }

    #[test]
    fn full_headroom_and_colocated_scores_maximum() {
        let org = sample_org(10, 0, OrgStatus::Active);
        let score = score_organisation(&org, LatLng::new(0.0, 0.0), "Rescue", "rescue");
        assert_eq!(score.distance_fit, 30.0);
        assert_eq!(score.type_match, 20.0);
        assert_eq!(score.category_match, 20.0);
        assert_eq!(score.headroom, 30.0);
        assert_eq!(score.total, 100.0);
    }

    #[test]
    fn busy_staff_is_never_eligible() {
        let staff = Staff {
            id: "s-1".into(),
            organisation_id: "org-1".into(),
            division_id: None,
            role: aegis_domain_models::StaffRole::Worker,
            skills: Default::default(),
            contact: None,
            availability: aegis_domain_models::Availability::Busy,
            latitude: None,
            longitude: None,
            status: aegis_domain_models::StaffStatus::Active,
        };
        let result = score_staff(&staff, LatLng::new(0.0, 0.0), &Default::default());
        assert!(!result.eligible);
    }
}
