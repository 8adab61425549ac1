//! Card bounds detection
//!
//! Finds the rectangular sub-region of a photo occupied by the card (vs.
//! background) so corner extraction can run on a trimmed image. Pure pixel
//! statistics: a background brightness estimate from the image edges, then
//! an inward scan for the first row/column that deviates from it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::frame::PixelBuffer;

/// Luma deviation a row/column must exceed to count as a card edge
const EDGE_DEVIATION_THRESHOLD: f32 = 14.0;
/// Fraction of each dimension sampled as the background band
const BACKGROUND_BAND_RATIO: f32 = 0.05;
/// Sampling stride along each scanned row/column
const SCAN_STRIDE: u32 = 4;
/// Minimum fraction of each dimension the detected rect must cover
const MIN_COVERAGE: f32 = 0.30;
/// Deviation ceiling used to normalize the confidence blend
const DEVIATION_NORM_CEILING: f32 = 40.0;
/// Minimum confidence for a detection to be reported
const MIN_CONFIDENCE: f32 = 0.5;
/// Outward padding applied to an accepted rectangle
const BOUNDS_PADDING: u32 = 2;

/// Detected card rectangle within a photo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Detection confidence in [0, 1], blended from edge contrast and
    /// area plausibility
    pub confidence: f32,
}

/// Detect the card rectangle within a photo.
///
/// Returns `None` when no confident bounds are found: background-only
/// images, rectangles covering less than 30% of either dimension, or a
/// confidence below 0.5.
pub fn detect_bounds(image: &PixelBuffer) -> Option<CardBounds> {
    let (w, h) = image.dimensions();

    let background = background_luma(image);

    let top = scan_rows(image, background, false)?;
    let bottom = scan_rows(image, background, true)?;
    let left = scan_columns(image, background, false)?;
    let right = scan_columns(image, background, true)?;

    if top.index >= bottom.index || left.index >= right.index {
        debug!("bounds scan crossed itself, rejecting");
        return None;
    }

    let rect_w = right.index - left.index + 1;
    let rect_h = bottom.index - top.index + 1;

    if (rect_w as f32) < (w as f32) * MIN_COVERAGE || (rect_h as f32) < (h as f32) * MIN_COVERAGE {
        debug!(
            "bounds too small ({}x{} in {}x{}), rejecting",
            rect_w, rect_h, w, h
        );
        return None;
    }

    let avg_deviation = (top.deviation + bottom.deviation + left.deviation + right.deviation) / 4.0;
    let norm_deviation = (avg_deviation / DEVIATION_NORM_CEILING).min(1.0);
    let area_ratio = (rect_w as f32 * rect_h as f32) / (w as f32 * h as f32);
    let confidence = 0.7 * norm_deviation + 0.3 * area_ratio;

    if confidence < MIN_CONFIDENCE {
        debug!("bounds confidence {:.2} below floor, rejecting", confidence);
        return None;
    }

    // Pad outward, clamped to the image
    let x = left.index.saturating_sub(BOUNDS_PADDING);
    let y = top.index.saturating_sub(BOUNDS_PADDING);
    let padded_w = (rect_w + 2 * BOUNDS_PADDING).min(w - x);
    let padded_h = (rect_h + 2 * BOUNDS_PADDING).min(h - y);

    debug!(
        "card bounds {}x{} at ({}, {}) confidence {:.2}",
        padded_w, padded_h, x, y, confidence
    );

    Some(CardBounds {
        x,
        y,
        width: padded_w,
        height: padded_h,
        confidence,
    })
}

/// First scan line that crossed the deviation threshold
struct EdgeHit {
    index: u32,
    deviation: f32,
}

/// Average background brightness sampled from 5%-wide bands at all four
/// image edges
fn background_luma(image: &PixelBuffer) -> f32 {
    let (w, h) = image.dimensions();
    let band_w = (((w as f32) * BACKGROUND_BAND_RATIO).round() as u32).max(1);
    let band_h = (((h as f32) * BACKGROUND_BAND_RATIO).round() as u32).max(1);

    let mut sum = 0.0f64;
    let mut count = 0u64;

    // Top and bottom bands
    for y in 0..band_h.min(h) {
        for x in (0..w).step_by(SCAN_STRIDE as usize) {
            sum += image.luma(x, y) as f64;
            sum += image.luma(x, h - 1 - y) as f64;
            count += 2;
        }
    }
    // Left and right bands
    for x in 0..band_w.min(w) {
        for y in (0..h).step_by(SCAN_STRIDE as usize) {
            sum += image.luma(x, y) as f64;
            sum += image.luma(w - 1 - x, y) as f64;
            count += 2;
        }
    }

    if count == 0 {
        return 0.0;
    }
    (sum / count as f64) as f32
}

/// Mean absolute luma deviation from the background along one row
fn row_deviation(image: &PixelBuffer, y: u32, background: f32) -> f32 {
    let w = image.width();
    let mut sum = 0.0f32;
    let mut count = 0u32;
    for x in (0..w).step_by(SCAN_STRIDE as usize) {
        sum += (image.luma(x, y) - background).abs();
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}

/// Mean absolute luma deviation from the background along one column
fn column_deviation(image: &PixelBuffer, x: u32, background: f32) -> f32 {
    let h = image.height();
    let mut sum = 0.0f32;
    let mut count = 0u32;
    for y in (0..h).step_by(SCAN_STRIDE as usize) {
        sum += (image.luma(x, y) - background).abs();
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}

/// Scan rows inward (top-down, or bottom-up when `reversed`) for the first
/// row deviating from the background
fn scan_rows(image: &PixelBuffer, background: f32, reversed: bool) -> Option<EdgeHit> {
    let h = image.height();
    for i in 0..h {
        let y = if reversed { h - 1 - i } else { i };
        let deviation = row_deviation(image, y, background);
        if deviation > EDGE_DEVIATION_THRESHOLD {
            return Some(EdgeHit {
                index: y,
                deviation,
            });
        }
    }
    None
}

/// Scan columns inward (left-right, or right-left when `reversed`) for the
/// first column deviating from the background
fn scan_columns(image: &PixelBuffer, background: f32, reversed: bool) -> Option<EdgeHit> {
    let w = image.width();
    for i in 0..w {
        let x = if reversed { w - 1 - i } else { i };
        let deviation = column_deviation(image, x, background);
        if deviation > EDGE_DEVIATION_THRESHOLD {
            return Some(EdgeHit {
                index: x,
                deviation,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelBuffer;

    /// Dark background with a bright card rectangle centered in it
    fn make_card_photo(width: u32, height: u32, card_frac: f32) -> PixelBuffer {
        let card_w = (width as f32 * card_frac) as u32;
        let card_h = (height as f32 * card_frac) as u32;
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
                    data.extend_from_slice(&[210, 205, 195, 255]);
                } else {
                    data.extend_from_slice(&[25, 25, 30, 255]);
                }
            }
        }
        PixelBuffer::from_rgba(data, width, height).unwrap()
    }

    #[test]
    fn test_detects_centered_card() {
        let photo = make_card_photo(200, 260, 0.7);
        let bounds = detect_bounds(&photo).expect("card should be detected");

        let card_x = (200 - 140) / 2;
        let card_y = (260 - 182) / 2;
        // Detected edges land on the card boundary, then pad 2px outward
        assert!(bounds.x <= card_x && bounds.x + 4 >= card_x);
        assert!(bounds.y <= card_y && bounds.y + 4 >= card_y);
        assert!(bounds.width >= 140 && bounds.width <= 146);
        assert!(bounds.height >= 182 && bounds.height <= 188);
        assert!(bounds.confidence >= 0.5 && bounds.confidence <= 1.0);
    }

    #[test]
    fn test_uniform_image_yields_none() {
        let photo = PixelBuffer::filled(120, 120, [128, 128, 128, 255]).unwrap();
        assert!(detect_bounds(&photo).is_none());
    }

    #[test]
    fn test_too_small_card_rejected() {
        // Card covers 20% of each dimension, below the 30% floor
        let photo = make_card_photo(200, 200, 0.2);
        assert!(detect_bounds(&photo).is_none());
    }

    #[test]
    fn test_padding_clamped_at_image_edge() {
        // Card flush against the top-left corner
        let mut data = Vec::new();
        for y in 0..100u32 {
            for x in 0..100u32 {
                if x < 60 && y < 60 {
                    data.extend_from_slice(&[220, 220, 220, 255]);
                } else {
                    data.extend_from_slice(&[15, 15, 15, 255]);
                }
            }
        }
        let photo = PixelBuffer::from_rgba(data, 100, 100).unwrap();
        if let Some(bounds) = detect_bounds(&photo) {
            assert!(bounds.x + bounds.width <= 100);
            assert!(bounds.y + bounds.height <= 100);
        }
    }
}
