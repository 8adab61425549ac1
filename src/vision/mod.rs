//! Image analysis layer
//!
//! Pure, synchronous pixel statistics over [`PixelBuffer`]s: card bounds
//! detection, corner extraction and wear scoring, condition summaries and
//! the content-hash gate. No decoding, no I/O, no learned models.

pub mod bounds;
pub mod condition;
pub mod corners;
pub mod hash;

pub use bounds::{detect_bounds, CardBounds};
pub use condition::{summarize_card, summarize_side, SideCondition};
pub use corners::{
    confidence_for_score, corner_score, extract_corners, regenerate_corner, ConfidenceTier,
    CornerCrop, CornerKey, Side, SourceRect, MAX_CORNER_SCORE, MAX_OFFSET_RATIO,
};
pub use hash::{content_hash, content_hash_with, HashBackend};

use std::time::Instant;

use tracing::debug;

use crate::frame::PixelBuffer;
use crate::session::CancelToken;

/// Everything derived from one side's photo
#[derive(Debug, Clone)]
pub struct SideAnalysis {
    pub side: Side,
    pub bounds: Option<CardBounds>,
    pub corners: Option<[CornerCrop; 4]>,
    pub condition: Option<SideCondition>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Analyze one side of a card: bounds, corner crops, condition summary.
///
/// Returns `None` only when the cancellation token fires; degraded input
/// (no bounds, image too small) still produces a `SideAnalysis` with the
/// affected parts absent.
pub fn analyze_side(image: &PixelBuffer, side: Side, cancel: &CancelToken) -> Option<SideAnalysis> {
    if cancel.is_cancelled() {
        return None;
    }
    let start = Instant::now();

    let bounds = detect_bounds(image);

    if cancel.is_cancelled() {
        return None;
    }
    let corners = extract_corners(image, bounds.as_ref(), side);
    let condition = corners.as_ref().map(summarize_side);

    let processing_time = start.elapsed();
    debug!(
        "{} side analyzed in {:?}: bounds={} corners={}",
        side.label(),
        processing_time,
        bounds.is_some(),
        corners.is_some()
    );

    Some(SideAnalysis {
        side,
        bounds,
        corners,
        condition,
        processing_time_ms: processing_time.as_millis() as u64,
    })
}

/// Full analysis of a photo pair
#[derive(Debug, Clone)]
pub struct CardAnalysis {
    /// Content hash of the analyzed pair, for the skip-unchanged gate
    pub content_hash: String,
    pub front: Option<SideAnalysis>,
    pub back: Option<SideAnalysis>,
    /// Combined condition note; absent when neither side produced corners
    pub summary: Option<String>,
}

/// Analyze a front photo and optional back photo.
///
/// Returns `None` only when cancelled between stages.
pub fn analyze_card(
    front: &PixelBuffer,
    back: Option<&PixelBuffer>,
    cancel: &CancelToken,
) -> Option<CardAnalysis> {
    let content_hash = content_hash(front.data(), back.map(|b| b.data()));

    let front_analysis = analyze_side(front, Side::Front, cancel)?;
    let back_analysis = match back {
        Some(back) => Some(analyze_side(back, Side::Back, cancel)?),
        None => None,
    };

    let summary = summarize_card(
        front_analysis.condition.as_ref(),
        back_analysis.as_ref().and_then(|a| a.condition.as_ref()),
    );

    Some(CardAnalysis {
        content_hash,
        front: Some(front_analysis),
        back: back_analysis,
        summary,
    })
}
