// [libs/domain/ingestion/src/priority_lane.rs]
//! Stage 4: map triage priority plus verification flags onto a
//! dispatch lane. Pure, total, order-sensitive — the duplicate
//! downgrade happens after the base mapping, never before.

use aegis_domain_models::PriorityLane;

pub fn compute_priority_lane(triage_priority: u8, requires_review: bool, likely_duplicate: bool) -> PriorityLane {
    let base = if triage_priority >= 5 && !requires_review {
        PriorityLane::P0
    } else if triage_priority == 4 {
        PriorityLane::P1
    } else if triage_priority == 3 {
        PriorityLane::P2
    } else {
        PriorityLane::P3
    };

    if likely_duplicate {
        downgrade_one_lane(base)
    } else {
        base
    }
}

fn downgrade_one_lane(lane: PriorityLane) -> PriorityLane {
    match lane {
        PriorityLane::P0 => PriorityLane::P0,
        PriorityLane::P1 => PriorityLane::P2,
        PriorityLane::P2 => PriorityLane::P3,
        PriorityLane::P3 => PriorityLane::P3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_priority_clean_report_is_p0() {
        assert_eq!(compute_priority_lane(5, false, false), PriorityLane::P0);
    }

    #[test]
    fn high_priority_requiring_review_is_not_p0() {
        assert_eq!(compute_priority_lane(5, true, false), PriorityLane::P3);
    }

    #[test]
    fn mid_priorities_map_directly() {
        assert_eq!(compute_priority_lane(4, false, false), PriorityLane::P1);
        assert_eq!(compute_priority_lane(3, false, false), PriorityLane::P2);
        assert_eq!(compute_priority_lane(2, false, false), PriorityLane::P3);
    }

    #[test]
    fn duplicate_downgrades_one_lane_unless_already_p0() {
        assert_eq!(compute_priority_lane(4, false, true), PriorityLane::P2);
        assert_eq!(compute_priority_lane(3, false, true), PriorityLane::P3);
        assert_eq!(compute_priority_lane(5, false, true), PriorityLane::P0);
    }
}
