//! Corner condition summaries
//!
//! Aggregates the four per-side corner scores into a qualitative side
//! description and a human-readable card-level condition note.

use serde::{Deserialize, Serialize};

use crate::vision::corners::{confidence_for_score, ConfidenceTier, CornerCrop, Side};

/// Aggregated condition of one card side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideCondition {
    /// Mean of the four corner scores
    pub average_score: f32,
    /// Tier of the mean, using the corner threshold table
    pub confidence: ConfidenceTier,
    /// Qualitative wording shown to the seller
    pub description: String,
}

/// Wording for each confidence tier
fn description_for(tier: ConfidenceTier) -> &'static str {
    match tier {
        ConfidenceTier::High => "sharp",
        ConfidenceTier::Medium => "clean with minor wear",
        ConfidenceTier::Low => "soft or worn",
    }
}

/// Summarize one side's four corner crops
pub fn summarize_side(corners: &[CornerCrop; 4]) -> SideCondition {
    let average_score =
        corners.iter().map(|c| c.score as f32).sum::<f32>() / corners.len() as f32;
    let confidence = confidence_for_score(average_score);
    SideCondition {
        average_score,
        confidence,
        description: description_for(confidence).to_string(),
    }
}

/// Combine front/back side summaries into one or two sentences.
///
/// Absent sides are omitted entirely, never rendered as a default.
pub fn summarize_card(
    front: Option<&SideCondition>,
    back: Option<&SideCondition>,
) -> Option<String> {
    let mut sentences = Vec::new();
    for (side, condition) in [(Side::Front, front), (Side::Back, back)] {
        if let Some(condition) = condition {
            sentences.push(format!(
                "{} corners are {}.",
                side.label(),
                condition.description
            ));
        }
    }
    if sentences.is_empty() {
        None
    } else {
        Some(sentences.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelBuffer;
    use crate::vision::corners::{CornerKey, SourceRect};

    fn crop_with_score(corner: CornerKey, score: u32) -> CornerCrop {
        CornerCrop {
            corner,
            image: PixelBuffer::filled(8, 8, [128, 128, 128, 255]).unwrap(),
            score,
            confidence: confidence_for_score(score as f32),
            side: Side::Front,
            source_rect: SourceRect { x: 0, y: 0, size: 8 },
            offset_ratio_x: 0.0,
            offset_ratio_y: 0.0,
            manual_override: false,
        }
    }

    fn corners_with_scores(scores: [u32; 4]) -> [CornerCrop; 4] {
        [
            crop_with_score(CornerKey::TopLeft, scores[0]),
            crop_with_score(CornerKey::TopRight, scores[1]),
            crop_with_score(CornerKey::BottomLeft, scores[2]),
            crop_with_score(CornerKey::BottomRight, scores[3]),
        ]
    }

    #[test]
    fn test_sharp_side() {
        let condition = summarize_side(&corners_with_scores([40, 42, 50, 44]));
        assert_eq!(condition.confidence, ConfidenceTier::High);
        assert_eq!(condition.description, "sharp");
        assert!((condition.average_score - 44.0).abs() < 0.001);
    }

    #[test]
    fn test_worn_side() {
        let condition = summarize_side(&corners_with_scores([10, 12, 8, 14]));
        assert_eq!(condition.confidence, ConfidenceTier::Low);
        assert_eq!(condition.description, "soft or worn");
    }

    #[test]
    fn test_mixed_side_uses_mean() {
        // Mean 26 lands in the medium band even with one worn corner
        let condition = summarize_side(&corners_with_scores([40, 30, 24, 10]));
        assert_eq!(condition.confidence, ConfidenceTier::Medium);
        assert_eq!(condition.description, "clean with minor wear");
    }

    #[test]
    fn test_card_summary_both_sides() {
        let front = summarize_side(&corners_with_scores([40, 42, 50, 44]));
        let back = summarize_side(&corners_with_scores([25, 26, 30, 28]));
        let summary = summarize_card(Some(&front), Some(&back)).unwrap();
        assert_eq!(
            summary,
            "Front corners are sharp. Back corners are clean with minor wear."
        );
    }

    #[test]
    fn test_card_summary_omits_absent_side() {
        let front = summarize_side(&corners_with_scores([40, 42, 50, 44]));
        let summary = summarize_card(Some(&front), None).unwrap();
        assert_eq!(summary, "Front corners are sharp.");
    }

    #[test]
    fn test_card_summary_no_sides() {
        assert!(summarize_card(None, None).is_none());
    }
}
