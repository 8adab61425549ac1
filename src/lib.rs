//! cardlens - trading card identity and condition analysis engine
//!
//! Turns two noisy signal sources - OCR text lines from card photos and
//! the raw photos themselves - into a single reconciled card identity with
//! per-field provenance, plus corner wear scores and condition notes.
//! Everything is deterministic pixel statistics and table lookups; the
//! engine never performs OCR or ML classification itself, and never
//! panics on malformed input.

pub mod batch;
pub mod config;
pub mod frame;
pub mod identity;
pub mod ocr;
pub mod report;
pub mod session;
pub mod vision;

pub use batch::{analyze_batch, BatchItem, BatchOutcome, BATCH_CHUNK_SIZE};
pub use config::{load_config, save_config, EngineConfig};
pub use frame::{FrameError, PixelBuffer, PixelRect};
pub use identity::merge::merge;
pub use identity::{CardIdentity, FieldSource, Promotions};
pub use ocr::{resolve, resolve_flat, OcrLine};
pub use report::{build_report, corner_reports, AnalysisReport, CornerReport};
pub use session::{CancelToken, SessionStore};
pub use vision::{
    analyze_card, analyze_side, content_hash, detect_bounds, extract_corners,
    regenerate_corner, CardAnalysis, CardBounds, ConfidenceTier, CornerCrop, CornerKey, Side,
    SideAnalysis,
};
