use crate::models::RiskLevel;

/// Scores at or above this are [`RiskLevel::Medium`].
pub const MEDIUM_THRESHOLD: f64 = 30.0;
/// Scores at or above this are [`RiskLevel::High`].
pub const HIGH_THRESHOLD: f64 = 70.0;

/// Presentation hint paired with a risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTag {
    Green,
    Orange,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub level: RiskLevel,
    pub color: ColorTag,
}

/// Clamp a score into `[0, 100]`. NaN maps to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

/// Classify a score into a risk level.
///
/// The score is clamped first, so out-of-range input never fails:
/// - `< 30` → Low / green
/// - `30 ..< 70` → Medium / orange
/// - `>= 70` → High / red
pub fn classify(score: f64) -> Classification {
    let score = clamp_score(score);

    if score >= HIGH_THRESHOLD {
        Classification {
            level: RiskLevel::High,
            color: ColorTag::Red,
        }
    } else if score >= MEDIUM_THRESHOLD {
        Classification {
            level: RiskLevel::Medium,
            color: ColorTag::Orange,
        }
    } else {
        Classification {
            level: RiskLevel::Low,
            color: ColorTag::Green,
        }
    }
}
