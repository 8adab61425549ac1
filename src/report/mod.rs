//! UI-facing analysis reports
//!
//! Renders engine output as serializable records for the listing UI:
//! labeled corner crops ("Front Top Left", ...), per-side condition and
//! the reconciled identity. Corner images are PNG-encoded and
//! base64-embedded so a report is self-contained.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use tracing::warn;

use crate::frame::PixelBuffer;
use crate::identity::CardIdentity;
use crate::vision::{CardAnalysis, ConfidenceTier, CornerKey, Side, SideCondition, SourceRect};

/// One corner crop prepared for display
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CornerReport {
    /// Display label, e.g. "Front Top Left"
    pub label: String,
    pub corner: CornerKey,
    pub side: Side,
    pub score: u32,
    pub confidence: ConfidenceTier,
    pub source_rect: SourceRect,
    pub manual_override: bool,
    /// PNG bytes, base64-encoded; omitted when images are not requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_png: Option<String>,
}

/// Full analysis report for one card
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub content_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<CardIdentity>,
    pub corners: Vec<CornerReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_condition: Option<SideCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_condition: Option<SideCondition>,
    /// Human-readable condition note for the listing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_note: Option<String>,
}

/// Build the labeled corner list for a card analysis
pub fn corner_reports(analysis: &CardAnalysis, include_images: bool) -> Vec<CornerReport> {
    let mut reports = Vec::new();
    for side_analysis in [analysis.front.as_ref(), analysis.back.as_ref()]
        .into_iter()
        .flatten()
    {
        let Some(corners) = &side_analysis.corners else {
            continue;
        };
        for crop in corners {
            reports.push(CornerReport {
                label: crop.label(),
                corner: crop.corner,
                side: crop.side,
                score: crop.score,
                confidence: crop.confidence,
                source_rect: crop.source_rect,
                manual_override: crop.manual_override,
                image_png: include_images.then(|| encode_png(&crop.image)).flatten(),
            });
        }
    }
    reports
}

/// Assemble the full report for a card
pub fn build_report(
    analysis: &CardAnalysis,
    identity: Option<&CardIdentity>,
    include_images: bool,
) -> AnalysisReport {
    AnalysisReport {
        content_hash: analysis.content_hash.clone(),
        identity: identity.cloned(),
        corners: corner_reports(analysis, include_images),
        front_condition: analysis.front.as_ref().and_then(|a| a.condition.clone()),
        back_condition: analysis.back.as_ref().and_then(|a| a.condition.clone()),
        condition_note: analysis.summary.clone(),
    }
}

/// PNG-encode a buffer and base64 it; `None` on encode failure (logged)
fn encode_png(buffer: &PixelBuffer) -> Option<String> {
    let image: image::RgbaImage = image::ImageBuffer::from_raw(
        buffer.width(),
        buffer.height(),
        buffer.data().to_vec(),
    )?;

    let mut bytes: Vec<u8> = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut bytes);
    if let Err(err) = image.write_to(&mut cursor, image::ImageFormat::Png) {
        warn!("failed to encode corner crop: {}", err);
        return None;
    }
    Some(BASE64.encode(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CancelToken;
    use crate::vision::analyze_card;

    fn make_card_photo(width: u32, height: u32) -> PixelBuffer {
        let card_w = (width as f32 * 0.7) as u32;
        let card_h = (height as f32 * 0.7) as u32;
        let card_x = (width - card_w) / 2;
        let card_y = (height - card_h) / 2;

        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let on_card = x >= card_x
                    && x < card_x + card_w
                    && y >= card_y
                    && y < card_y + card_h;
                if on_card {
                    data.extend_from_slice(&[200, 195, 185, 255]);
                } else {
                    data.extend_from_slice(&[25, 25, 30, 255]);
                }
            }
        }
        PixelBuffer::from_rgba(data, width, height).unwrap()
    }

    #[test]
    fn test_corner_reports_are_labeled() {
        let front = make_card_photo(200, 260);
        let back = make_card_photo(200, 260);
        let analysis = analyze_card(&front, Some(&back), &CancelToken::new()).unwrap();

        let reports = corner_reports(&analysis, false);
        assert_eq!(reports.len(), 8);
        assert_eq!(reports[0].label, "Front Top Left");
        assert_eq!(reports[3].label, "Front Bottom Right");
        assert_eq!(reports[4].label, "Back Top Left");
        assert!(reports.iter().all(|r| r.image_png.is_none()));
    }

    #[test]
    fn test_corner_reports_embed_images_when_requested() {
        let front = make_card_photo(200, 260);
        let analysis = analyze_card(&front, None, &CancelToken::new()).unwrap();

        let reports = corner_reports(&analysis, true);
        assert_eq!(reports.len(), 4);
        for report in &reports {
            let encoded = report.image_png.as_ref().expect("image embedded");
            assert!(!encoded.is_empty());
        }
    }

    #[test]
    fn test_report_serializes_to_json() {
        let front = make_card_photo(200, 260);
        let analysis = analyze_card(&front, None, &CancelToken::new()).unwrap();
        let report = build_report(&analysis, None, false);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"contentHash\""));
        assert!(json.contains("\"Front Top Left\""));
        assert!(json.contains("\"conditionNote\""));
        // No identity was supplied, so none is serialized
        assert!(!json.contains("\"identity\""));
    }
}
