//! Corner extraction and wear scoring
//!
//! Crops the four physical corners of a card photo (with a small outward
//! padding) and scores each crop for wear from pixel statistics: luma
//! texture, gradient clarity, and how well the card's edge is framed
//! within the crop. Scores map to a fixed three-tier confidence table.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::frame::{PixelBuffer, PixelRect};
use crate::vision::bounds::CardBounds;

/// Corner edge length as a fraction of the shorter image dimension
const CORNER_EDGE_RATIO: f32 = 0.22;
/// Outward padding as a fraction of the corner edge length
const CORNER_PADDING_RATIO: f32 = 0.12;
/// Smallest usable corner edge length in pixels
const MIN_CORNER_EDGE: u32 = 8;
/// Bounds confidence required before corner crops use the trimmed region
pub const TRIM_CONFIDENCE: f32 = 0.55;
/// Gradient magnitude that marks a pixel as part of an edge
const GRADIENT_EDGE_THRESHOLD: f32 = 12.0;
/// Inset fraction defining the centered framing sub-region
const FRAMING_INSET: f32 = 0.10;
/// Maximum corner score
pub const MAX_CORNER_SCORE: u32 = 60;
/// Largest user nudge, as a fraction of crop size, in either axis
pub const MAX_OFFSET_RATIO: f32 = 0.12;

/// Which physical corner of the card a crop covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CornerKey {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl CornerKey {
    /// All four corners in display order
    pub const ALL: [CornerKey; 4] = [
        CornerKey::TopLeft,
        CornerKey::TopRight,
        CornerKey::BottomLeft,
        CornerKey::BottomRight,
    ];

    /// Human-readable label, e.g. "Top Left"
    pub fn label(&self) -> &'static str {
        match self {
            CornerKey::TopLeft => "Top Left",
            CornerKey::TopRight => "Top Right",
            CornerKey::BottomLeft => "Bottom Left",
            CornerKey::BottomRight => "Bottom Right",
        }
    }
}

/// Which side of the card an image shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front,
    Back,
}

impl Side {
    pub fn label(&self) -> &'static str {
        match self {
            Side::Front => "Front",
            Side::Back => "Back",
        }
    }
}

/// Three-tier certainty vocabulary used for all analysis output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

/// Map a corner (or averaged) score to its confidence tier.
///
/// Fixed table: score >= 38 is High, >= 24 is Medium, below is Low.
pub fn confidence_for_score(score: f32) -> ConfidenceTier {
    if score >= 38.0 {
        ConfidenceTier::High
    } else if score >= 24.0 {
        ConfidenceTier::Medium
    } else {
        ConfidenceTier::Low
    }
}

/// Square crop position in *original* (untrimmed) image coordinates.
///
/// Always expressed relative to the original photo so re-crops are
/// reproducible regardless of trimming or prior nudges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// One scored corner crop
#[derive(Debug, Clone)]
pub struct CornerCrop {
    pub corner: CornerKey,
    /// Cropped pixels, a square of side `source_rect.size`
    pub image: PixelBuffer,
    /// Wear score in [0, 60]
    pub score: u32,
    pub confidence: ConfidenceTier,
    pub side: Side,
    /// Un-nudged base position in original image coordinates
    pub source_rect: SourceRect,
    /// User nudge applied relative to the base, clamped to +/-0.12
    pub offset_ratio_x: f32,
    pub offset_ratio_y: f32,
    /// True once the crop was regenerated from a user nudge
    pub manual_override: bool,
}

impl CornerCrop {
    /// Display label, e.g. "Front Top Left"
    pub fn label(&self) -> String {
        format!("{} {}", self.side.label(), self.corner.label())
    }
}

/// Extract and score all four corner crops from a card photo.
///
/// When `bounds` is present with confidence >= 0.55 the crops are taken
/// from the trimmed card region; otherwise the untrimmed image is used
/// (logged, never silent). Returns `None` when the working region is too
/// small for a usable crop.
pub fn extract_corners(
    original: &PixelBuffer,
    bounds: Option<&CardBounds>,
    side: Side,
) -> Option<[CornerCrop; 4]> {
    let (img_w, img_h) = original.dimensions();

    let region = match bounds {
        Some(b) if b.confidence >= TRIM_CONFIDENCE => PixelRect::new(b.x, b.y, b.width, b.height),
        Some(b) => {
            debug!(
                "bounds confidence {:.2} below {:.2}, extracting corners from untrimmed image",
                b.confidence, TRIM_CONFIDENCE
            );
            PixelRect::new(0, 0, img_w, img_h)
        }
        None => {
            debug!("no card bounds, extracting corners from untrimmed image");
            PixelRect::new(0, 0, img_w, img_h)
        }
    };

    let edge = ((region.width.min(region.height) as f32) * CORNER_EDGE_RATIO).round() as u32;
    if edge < MIN_CORNER_EDGE {
        debug!(
            "region {}x{} too small for corner crops",
            region.width, region.height
        );
        return None;
    }

    let padding = ((edge as f32) * CORNER_PADDING_RATIO).round() as u32;
    let crop_size = edge + 2 * padding;
    if crop_size > region.width || crop_size > region.height {
        return None;
    }

    let mut crops = Vec::with_capacity(4);
    for corner in CornerKey::ALL {
        let rect = corner_rect(corner, &region, edge, padding, crop_size);
        crops.push(make_crop(original, corner, side, rect)?);
    }
    <[CornerCrop; 4]>::try_from(crops).ok()
}

/// Crop position for one corner, in original image coordinates.
///
/// The un-padded `edge` square touches the region corner; the padded crop
/// extends outward and is shifted inward (never scaled) to stay inside the
/// region.
fn corner_rect(
    corner: CornerKey,
    region: &PixelRect,
    edge: u32,
    padding: u32,
    crop_size: u32,
) -> SourceRect {
    let pad = padding as i64;
    let (ideal_x, ideal_y) = match corner {
        CornerKey::TopLeft => (-pad, -pad),
        CornerKey::TopRight => ((region.width - edge) as i64 - pad, -pad),
        CornerKey::BottomLeft => (-pad, (region.height - edge) as i64 - pad),
        CornerKey::BottomRight => (
            (region.width - edge) as i64 - pad,
            (region.height - edge) as i64 - pad,
        ),
    };

    let max_x = (region.width - crop_size) as i64;
    let max_y = (region.height - crop_size) as i64;
    let x = ideal_x.clamp(0, max_x) as u32 + region.x;
    let y = ideal_y.clamp(0, max_y) as u32 + region.y;

    SourceRect {
        x,
        y,
        size: crop_size,
    }
}

fn make_crop(
    original: &PixelBuffer,
    corner: CornerKey,
    side: Side,
    rect: SourceRect,
) -> Option<CornerCrop> {
    let image = original.crop(PixelRect::new(rect.x, rect.y, rect.size, rect.size))?;
    let score = corner_score(&image);
    Some(CornerCrop {
        corner,
        score,
        confidence: confidence_for_score(score as f32),
        image,
        side,
        source_rect: rect,
        offset_ratio_x: 0.0,
        offset_ratio_y: 0.0,
        manual_override: false,
    })
}

/// Score a corner crop for wear, clamped to [0, 60].
///
/// Blend of three pixel statistics: luma standard deviation (texture),
/// mean neighbor gradient (clarity, scaled x1.2), and the fraction of edge
/// pixels falling inside the centered sub-region (framing, scaled to 60).
pub fn corner_score(crop: &PixelBuffer) -> u32 {
    let (w, h) = crop.dimensions();
    if w == 0 || h == 0 {
        return 0;
    }

    let w = w as usize;
    let h = h as usize;
    let mut lumas = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            lumas[y * w + x] = crop.luma(x as u32, y as u32);
        }
    }

    // Texture: standard deviation of per-pixel luma
    let count = (w * h) as f32;
    let mean = lumas.iter().sum::<f32>() / count;
    let variance = lumas.iter().map(|l| (l - mean) * (l - mean)).sum::<f32>() / count;
    let texture = variance.sqrt();

    // Clarity: mean |delta| to right and below neighbors, scaled x1.2.
    // Framing: of the pixels whose gradient marks an edge, the fraction
    // lying inside the 10%-inset centered sub-region.
    let inset_x0 = (w as f32 * FRAMING_INSET) as usize;
    let inset_x1 = w - inset_x0;
    let inset_y0 = (h as f32 * FRAMING_INSET) as usize;
    let inset_y1 = h - inset_y0;

    let mut gradient_sum = 0.0f32;
    let mut gradient_count = 0u32;
    let mut edge_pixels = 0u32;
    let mut centered_edge_pixels = 0u32;

    for y in 0..h {
        for x in 0..w {
            let here = lumas[y * w + x];
            let mut gradient = 0.0f32;
            if x + 1 < w {
                gradient += (lumas[y * w + x + 1] - here).abs();
            }
            if y + 1 < h {
                gradient += (lumas[(y + 1) * w + x] - here).abs();
            }
            gradient_sum += gradient;
            gradient_count += 1;

            if gradient > GRADIENT_EDGE_THRESHOLD {
                edge_pixels += 1;
                if x >= inset_x0 && x < inset_x1 && y >= inset_y0 && y < inset_y1 {
                    centered_edge_pixels += 1;
                }
            }
        }
    }

    let clarity = if gradient_count == 0 {
        0.0
    } else {
        (gradient_sum / gradient_count as f32) * 1.2
    };

    let framing = if edge_pixels == 0 {
        0.0
    } else {
        (centered_edge_pixels as f32 / edge_pixels as f32) * 60.0
    };

    let combined = 0.35 * texture + 0.45 * clarity + 0.20 * framing;
    (combined.round() as i64).clamp(0, MAX_CORNER_SCORE as i64) as u32
}

/// Re-crop a corner with a user nudge.
///
/// The requested offset ratios are clamped to +/-0.12 of the crop size and
/// applied to the crop's stored *original* base rect, never the previous
/// (possibly already nudged) position, so repeated nudges do not compound.
/// Returns `None` only when the crop no longer fits the image at all.
pub fn regenerate_corner(
    original: &PixelBuffer,
    previous: &CornerCrop,
    offset_ratio_x: f32,
    offset_ratio_y: f32,
) -> Option<CornerCrop> {
    let base = previous.source_rect;
    let (img_w, img_h) = original.dimensions();
    if base.size > img_w || base.size > img_h {
        return None;
    }

    let rx = offset_ratio_x.clamp(-MAX_OFFSET_RATIO, MAX_OFFSET_RATIO);
    let ry = offset_ratio_y.clamp(-MAX_OFFSET_RATIO, MAX_OFFSET_RATIO);

    let dx = (rx * base.size as f32).round() as i64;
    let dy = (ry * base.size as f32).round() as i64;
    let x = (base.x as i64 + dx).clamp(0, (img_w - base.size) as i64) as u32;
    let y = (base.y as i64 + dy).clamp(0, (img_h - base.size) as i64) as u32;

    let image = original.crop(PixelRect::new(x, y, base.size, base.size))?;
    let score = corner_score(&image);

    Some(CornerCrop {
        corner: previous.corner,
        score,
        confidence: confidence_for_score(score as f32),
        image,
        side: previous.side,
        source_rect: base,
        offset_ratio_x: rx,
        offset_ratio_y: ry,
        manual_override: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A card-like photo: bright card over dark background with the card
    /// edges a few pixels in from the buffer edges
    fn make_corner_photo(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let on_card = x >= 6 && x < width - 6 && y >= 6 && y < height - 6;
                if on_card {
                    // Mild texture so the card face is not perfectly flat
                    let v = 190 + ((x * 7 + y * 3) % 11) as u8;
                    data.extend_from_slice(&[v, v, v.saturating_sub(10), 255]);
                } else {
                    data.extend_from_slice(&[20, 22, 25, 255]);
                }
            }
        }
        PixelBuffer::from_rgba(data, width, height).unwrap()
    }

    #[test]
    fn test_flat_crop_scores_near_zero() {
        let flat = PixelBuffer::filled(100, 100, [128, 128, 128, 255]).unwrap();
        let score = corner_score(&flat);
        assert!(score <= 2, "flat gray crop should score near 0, got {}", score);
        assert_eq!(confidence_for_score(score as f32), ConfidenceTier::Low);
    }

    #[test]
    fn test_score_stays_in_bounds() {
        // Maximum-contrast checkerboard pushes every statistic up
        let mut data = Vec::new();
        for y in 0..40u32 {
            for x in 0..40u32 {
                let v = if (x + y) % 2 == 0 { 255 } else { 0 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let noisy = PixelBuffer::from_rgba(data, 40, 40).unwrap();
        let score = corner_score(&noisy);
        assert!(score <= MAX_CORNER_SCORE);
    }

    #[test]
    fn test_confidence_tier_boundaries() {
        assert_eq!(confidence_for_score(60.0), ConfidenceTier::High);
        assert_eq!(confidence_for_score(38.0), ConfidenceTier::High);
        assert_eq!(confidence_for_score(37.9), ConfidenceTier::Medium);
        assert_eq!(confidence_for_score(24.0), ConfidenceTier::Medium);
        assert_eq!(confidence_for_score(23.9), ConfidenceTier::Low);
        assert_eq!(confidence_for_score(0.0), ConfidenceTier::Low);
    }

    #[test]
    fn test_extract_corners_geometry() {
        let photo = make_corner_photo(200, 260);
        let corners = extract_corners(&photo, None, Side::Front).unwrap();

        // edge = round(200 * 0.22) = 44, padding = round(44 * 0.12) = 5,
        // crop = 54; ideal positions clamp inside the image
        for crop in &corners {
            assert_eq!(crop.source_rect.size, 54);
            assert!(crop.source_rect.x + 54 <= 200);
            assert!(crop.source_rect.y + 54 <= 260);
            assert_eq!(crop.image.dimensions(), (54, 54));
            assert!(crop.score <= MAX_CORNER_SCORE);
            assert!(!crop.manual_override);
        }

        assert_eq!(corners[0].source_rect.x, 0);
        assert_eq!(corners[0].source_rect.y, 0);
        // TopRight: ideal x = 200 - 44 - 5 = 151, clamped to 200 - 54 = 146
        assert_eq!(corners[1].source_rect.x, 146);
        assert_eq!(corners[3].source_rect.y, 206);
    }

    #[test]
    fn test_extract_corners_too_small() {
        let tiny = PixelBuffer::filled(30, 30, [100, 100, 100, 255]).unwrap();
        assert!(extract_corners(&tiny, None, Side::Front).is_none());
    }

    #[test]
    fn test_low_confidence_bounds_fall_back_to_untrimmed() {
        let photo = make_corner_photo(200, 260);
        let weak = CardBounds {
            x: 40,
            y: 40,
            width: 120,
            height: 180,
            confidence: 0.40,
        };
        let corners = extract_corners(&photo, Some(&weak), Side::Front).unwrap();
        // Untrimmed fallback anchors the top-left crop at the image origin
        assert_eq!(corners[0].source_rect.x, 0);
        assert_eq!(corners[0].source_rect.y, 0);
    }

    #[test]
    fn test_trimmed_extraction_uses_bounds_offset() {
        let photo = make_corner_photo(200, 260);
        let strong = CardBounds {
            x: 10,
            y: 12,
            width: 170,
            height: 230,
            confidence: 0.90,
        };
        let corners = extract_corners(&photo, Some(&strong), Side::Front).unwrap();
        assert_eq!(corners[0].source_rect.x, 10);
        assert_eq!(corners[0].source_rect.y, 12);
    }

    #[test]
    fn test_regenerate_clamps_offset() {
        let photo = make_corner_photo(200, 260);
        let corners = extract_corners(&photo, None, Side::Front).unwrap();
        let nudged = regenerate_corner(&photo, &corners[3], 0.5, -0.5).unwrap();
        assert!((nudged.offset_ratio_x - MAX_OFFSET_RATIO).abs() < f32::EPSILON);
        assert!((nudged.offset_ratio_y + MAX_OFFSET_RATIO).abs() < f32::EPSILON);
        assert!(nudged.manual_override);
    }

    #[test]
    fn test_repeated_nudges_do_not_compound() {
        let photo = make_corner_photo(200, 260);
        let corners = extract_corners(&photo, None, Side::Front).unwrap();
        let base = corners[3].source_rect;

        let once = regenerate_corner(&photo, &corners[3], -0.1, -0.1).unwrap();
        let twice = regenerate_corner(&photo, &once, -0.1, -0.1).unwrap();

        // The second nudge re-derives from the stored base, so the crops
        // are identical rather than drifting further
        assert_eq!(once.source_rect, base);
        assert_eq!(twice.source_rect, base);
        assert_eq!(once.image, twice.image);
        assert_eq!(once.score, twice.score);
    }
}
