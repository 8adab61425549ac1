//! Card identity records
//!
//! The reconciled, per-field-provenanced description of a card that
//! resolver passes and manual edits accumulate into. Identity is
//! monotonically growing: fields fill in over time and are never silently
//! cleared.

pub mod merge;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Where a resolved field value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    Front,
    Back,
    Slab,
    Manual,
}

/// Canonical field keys, matching the serialized record shape
pub const IDENTITY_FIELDS: [&str; 11] = [
    "player",
    "team",
    "year",
    "setName",
    "brand",
    "sport",
    "league",
    "grade",
    "grader",
    "condition",
    "cardTitle",
];

/// Fields a single resolver pass was able to positively determine.
///
/// Unresolved fields are `None`, never empty strings, so a merge can never
/// confuse "resolved empty" with "unresolved".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotions {
    pub player: Option<String>,
    pub team: Option<String>,
    pub year: Option<String>,
    pub set_name: Option<String>,
    pub brand: Option<String>,
    pub sport: Option<String>,
    pub league: Option<String>,
    pub grade: Option<String>,
    pub grader: Option<String>,
    pub condition: Option<String>,
    pub card_title: Option<String>,
    pub is_slabbed: Option<bool>,
    /// Which OCR region each resolved field came from; fields without an
    /// entry take the merge call's default source
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub sources: HashMap<String, FieldSource>,
}

impl Promotions {
    /// True when the pass resolved nothing at all
    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(|(_, v)| v.is_none()) && self.is_slabbed.is_none()
    }

    /// Text fields as (canonical key, value) pairs, in field order
    pub fn entries(&self) -> [(&'static str, &Option<String>); 11] {
        [
            ("player", &self.player),
            ("team", &self.team),
            ("year", &self.year),
            ("setName", &self.set_name),
            ("brand", &self.brand),
            ("sport", &self.sport),
            ("league", &self.league),
            ("grade", &self.grade),
            ("grader", &self.grader),
            ("condition", &self.condition),
            ("cardTitle", &self.card_title),
        ]
    }
}

/// The reconciled identity of one card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardIdentity {
    pub player: Option<String>,
    pub team: Option<String>,
    pub year: Option<String>,
    pub set_name: Option<String>,
    pub brand: Option<String>,
    pub sport: Option<String>,
    pub league: Option<String>,
    pub grade: Option<String>,
    pub grader: Option<String>,
    pub condition: Option<String>,
    pub card_title: Option<String>,
    pub is_slabbed: bool,
    /// Provenance per field (canonical key -> source of its value)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub sources: HashMap<String, FieldSource>,
    /// Fields the user has explicitly confirmed
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub user_verified: HashMap<String, bool>,
}

impl CardIdentity {
    /// Current value of a text field by canonical key
    pub fn get(&self, field: &str) -> Option<&str> {
        let value = match field {
            "player" => &self.player,
            "team" => &self.team,
            "year" => &self.year,
            "setName" => &self.set_name,
            "brand" => &self.brand,
            "sport" => &self.sport,
            "league" => &self.league,
            "grade" => &self.grade,
            "grader" => &self.grader,
            "condition" => &self.condition,
            "cardTitle" => &self.card_title,
            _ => return None,
        };
        value.as_deref()
    }

    /// True when a text field currently has no usable value
    pub fn is_field_empty(&self, field: &str) -> bool {
        self.get(field).map_or(true, |v| v.trim().is_empty())
    }

    /// Set a text field and record its provenance.
    ///
    /// Unknown keys are ignored (logged), never an error.
    pub fn set_field(&mut self, field: &str, value: String, source: FieldSource) {
        let slot = match field {
            "player" => &mut self.player,
            "team" => &mut self.team,
            "year" => &mut self.year,
            "setName" => &mut self.set_name,
            "brand" => &mut self.brand,
            "sport" => &mut self.sport,
            "league" => &mut self.league,
            "grade" => &mut self.grade,
            "grader" => &mut self.grader,
            "condition" => &mut self.condition,
            "cardTitle" => &mut self.card_title,
            other => {
                warn!("ignoring unknown identity field '{}'", other);
                return;
            }
        };
        *slot = Some(value);
        self.sources.insert(field.to_string(), source);
    }

    /// Mark a field as user-confirmed
    pub fn mark_verified(&mut self, field: &str) {
        self.user_verified.insert(field.to_string(), true);
    }

    pub fn is_verified(&self, field: &str) -> bool {
        self.user_verified.get(field).copied().unwrap_or(false)
    }

    pub fn source_of(&self, field: &str) -> Option<FieldSource> {
        self.sources.get(field).copied()
    }

    /// Count of text fields with a usable value
    pub fn resolved_field_count(&self) -> usize {
        IDENTITY_FIELDS
            .iter()
            .filter(|f| !self.is_field_empty(f))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_field() {
        let mut identity = CardIdentity::default();
        identity.set_field("player", "Juan Soto".to_string(), FieldSource::Front);

        assert_eq!(identity.get("player"), Some("Juan Soto"));
        assert_eq!(identity.source_of("player"), Some(FieldSource::Front));
        assert!(!identity.is_field_empty("player"));
        assert!(identity.is_field_empty("team"));
    }

    #[test]
    fn test_unknown_field_is_ignored() {
        let mut identity = CardIdentity::default();
        identity.set_field("autograph", "yes".to_string(), FieldSource::Manual);
        assert!(identity.sources.is_empty());
    }

    #[test]
    fn test_empty_promotions() {
        assert!(Promotions::default().is_empty());

        let mut promotions = Promotions::default();
        promotions.is_slabbed = Some(false);
        assert!(!promotions.is_empty());
    }

    #[test]
    fn test_identity_serializes_camel_case() {
        let mut identity = CardIdentity::default();
        identity.set_field("setName", "Topps Chrome".to_string(), FieldSource::Front);

        let json = serde_json::to_string(&identity).unwrap();
        assert!(json.contains("\"setName\":\"Topps Chrome\""));
        assert!(json.contains("\"isSlabbed\":false"));
    }

    #[test]
    fn test_resolved_field_count() {
        let mut identity = CardIdentity::default();
        assert_eq!(identity.resolved_field_count(), 0);
        identity.set_field("player", "Juan Soto".to_string(), FieldSource::Front);
        identity.set_field("year", "2023".to_string(), FieldSource::Front);
        assert_eq!(identity.resolved_field_count(), 2);
    }
}
