//! Bounded batch analysis
//!
//! Sellers upload many cards at once; analyses are independent and
//! CPU-bound, so they fan out onto blocking tasks with a fixed concurrency
//! chunk rather than running unbounded.

use futures_util::{stream, StreamExt};
use tracing::{debug, info};

use crate::frame::PixelBuffer;
use crate::session::CancelToken;
use crate::vision::{analyze_card, CardAnalysis};

/// Simultaneous analyses per chunk
pub const BATCH_CHUNK_SIZE: usize = 3;

/// One card's photos queued for analysis
#[derive(Debug)]
pub struct BatchItem {
    pub card_id: String,
    pub front: PixelBuffer,
    pub back: Option<PixelBuffer>,
}

/// Result for one batch item; `analysis` is `None` when the run was
/// cancelled before the item completed
#[derive(Debug)]
pub struct BatchOutcome {
    pub card_id: String,
    pub analysis: Option<CardAnalysis>,
}

/// Analyze a batch with the default chunk size
pub async fn analyze_batch(items: Vec<BatchItem>, cancel: CancelToken) -> Vec<BatchOutcome> {
    analyze_batch_with_chunk(items, cancel, BATCH_CHUNK_SIZE).await
}

/// Analyze a batch, at most `chunk_size` cards in flight at a time.
///
/// Outcomes are returned in input order. Items within a chunk share no
/// state and run in parallel on the blocking pool.
pub async fn analyze_batch_with_chunk(
    items: Vec<BatchItem>,
    cancel: CancelToken,
    chunk_size: usize,
) -> Vec<BatchOutcome> {
    let total = items.len();
    let chunk_size = chunk_size.max(1);
    info!("analyzing batch of {} card(s), {} at a time", total, chunk_size);

    let outcomes: Vec<BatchOutcome> = stream::iter(items.into_iter().map(|item| {
        let cancel = cancel.clone();
        async move {
            let card_id = item.card_id.clone();
            let handle = tokio::task::spawn_blocking(move || {
                analyze_card(&item.front, item.back.as_ref(), &cancel)
            });
            let analysis = handle.await.ok().flatten();
            debug!(
                "batch item {} {}",
                card_id,
                if analysis.is_some() { "analyzed" } else { "skipped" }
            );
            BatchOutcome { card_id, analysis }
        }
    }))
    .buffered(chunk_size)
    .collect()
    .await;

    outcomes
}
