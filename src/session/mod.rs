//! Card sessions and analysis gating
//!
//! Owns the long-lived per-card identity records, the last-analyzed
//! content hash ("nothing changed, skip re-analysis" gate), and the
//! cancellation token the analysis pipeline consults between stages.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::identity::merge::merge;
use crate::identity::{CardIdentity, FieldSource, Promotions};

/// Cooperative cancellation flag.
///
/// The pipeline checks it before each expensive stage; any timeout or
/// give-up policy lives in the calling orchestration layer, which flips
/// the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; takes effect at the next stage boundary
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// One card being worked on in a session
#[derive(Debug, Clone)]
pub struct CardRecord {
    pub id: String,
    pub identity: CardIdentity,
    /// Content hash of the last-analyzed photo pair
    pub last_content_hash: Option<String>,
}

/// In-memory registry of cards for one selling session.
///
/// Thread-safe; front and back analysis completions may merge into the
/// same card from different tasks in either order.
#[derive(Debug, Default)]
pub struct SessionStore {
    cards: RwLock<HashMap<String, CardRecord>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new card and return its id
    pub fn create_card(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let record = CardRecord {
            id: id.clone(),
            identity: CardIdentity::default(),
            last_content_hash: None,
        };
        self.cards.write().insert(id.clone(), record);
        info!("created card {}", id);
        id
    }

    pub fn card(&self, id: &str) -> Option<CardRecord> {
        self.cards.read().get(id).cloned()
    }

    pub fn card_count(&self) -> usize {
        self.cards.read().len()
    }

    /// Consult the content-hash gate: returns true when the photo pair
    /// changed since the last analysis (or was never analyzed) and the
    /// expensive corner/resolver work should run.
    pub fn should_analyze(&self, id: &str, content_hash: &str) -> bool {
        let cards = self.cards.read();
        match cards.get(id) {
            Some(record) => match &record.last_content_hash {
                Some(prev) if prev == content_hash => {
                    debug!("card {} unchanged ({}), skipping re-analysis", id, content_hash);
                    false
                }
                _ => true,
            },
            None => false,
        }
    }

    /// Record the content hash of a completed analysis
    pub fn mark_analyzed(&self, id: &str, content_hash: String) {
        if let Some(record) = self.cards.write().get_mut(id) {
            record.last_content_hash = Some(content_hash);
        }
    }

    /// Fold a resolver pass into the card's identity (forward-only merge)
    pub fn apply_promotions(&self, id: &str, promotions: &Promotions, source: FieldSource) {
        if let Some(record) = self.cards.write().get_mut(id) {
            record.identity = merge(&record.identity, promotions, source);
        }
    }

    /// Record a manual field edit, marking it user-verified
    pub fn set_verified_field(&self, id: &str, field: &str, value: String) {
        if let Some(record) = self.cards.write().get_mut(id) {
            record.identity.set_field(field, value, FieldSource::Manual);
            record.identity.mark_verified(field);
        }
    }
}
