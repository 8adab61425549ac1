//! Forward-only identity merge
//!
//! Folds a resolver pass into an existing identity without ever clobbering
//! an earlier resolution. Front and back analysis complete asynchronously
//! and may arrive in either order, so the policy is "first successful
//! resolution wins" rather than "last write wins".

use tracing::debug;

use crate::identity::{CardIdentity, FieldSource, Promotions};

/// Merge a promotions record into an identity, returning the new identity.
///
/// Rules:
/// - a promoted field lands only if the identity's field is still empty
/// - user-verified fields are re-asserted afterwards, even when the merge
///   left them untouched
/// - `is_slabbed` is the sole exception to first-wins: a later `true`
///   always overrides an earlier `false`, since slab detection from the
///   back/label image is the more reliable signal
pub fn merge(identity: &CardIdentity, promotions: &Promotions, source: FieldSource) -> CardIdentity {
    let mut merged = identity.clone();

    for (field, value) in promotions.entries() {
        let Some(value) = value else { continue };
        if value.trim().is_empty() {
            continue;
        }
        if merged.is_field_empty(field) {
            let field_source = promotions.sources.get(field).copied().unwrap_or(source);
            debug!("promoting {} = {:?} from {:?}", field, value, field_source);
            merged.set_field(field, value.clone(), field_source);
        }
    }

    let slab_source = promotions
        .sources
        .get("isSlabbed")
        .copied()
        .unwrap_or(source);
    match promotions.is_slabbed {
        Some(true) => {
            if !merged.is_slabbed {
                debug!("promoting isSlabbed = true from {:?}", slab_source);
            }
            merged.is_slabbed = true;
            merged.sources.insert("isSlabbed".to_string(), slab_source);
        }
        Some(false) => {
            // A negative only lands when slab status was never asserted
            if !merged.sources.contains_key("isSlabbed") {
                merged.is_slabbed = false;
                merged.sources.insert("isSlabbed".to_string(), slab_source);
            }
        }
        None => {}
    }

    // Re-assert user-verified fields against async front/back races
    let verified: Vec<String> = merged
        .user_verified
        .iter()
        .filter(|(_, v)| **v)
        .map(|(k, _)| k.clone())
        .collect();
    for field in verified {
        if let Some(original) = identity.get(&field) {
            let original_source = identity
                .source_of(&field)
                .unwrap_or(FieldSource::Manual);
            merged.set_field(&field, original.to_string(), original_source);
        }
    }

    // A merge can only add fields; clearing one is a programming error
    debug_assert!(
        crate::identity::IDENTITY_FIELDS
            .iter()
            .all(|f| identity.is_field_empty(f) || !merged.is_field_empty(f)),
        "merge cleared a previously resolved identity field"
    );

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn promotions_with(field: &str, value: &str) -> Promotions {
        let mut promotions = Promotions::default();
        match field {
            "player" => promotions.player = Some(value.to_string()),
            "year" => promotions.year = Some(value.to_string()),
            "team" => promotions.team = Some(value.to_string()),
            "setName" => promotions.set_name = Some(value.to_string()),
            _ => panic!("unhandled field in fixture"),
        }
        promotions
    }

    #[test]
    fn test_first_resolution_wins() {
        let identity = CardIdentity::default();
        let first = merge(&identity, &promotions_with("year", "2023"), FieldSource::Front);
        assert_eq!(first.year.as_deref(), Some("2023"));

        let second = merge(&first, &promotions_with("year", "2019"), FieldSource::Front);
        assert_eq!(second.year.as_deref(), Some("2023"));
        assert_eq!(second.source_of("year"), Some(FieldSource::Front));
    }

    #[test]
    fn test_out_of_order_passes_fill_distinct_fields() {
        let identity = CardIdentity::default();

        // Back pass lands first
        let after_back = merge(&identity, &promotions_with("team", "NEW YORK METS"), FieldSource::Back);
        let after_front = merge(
            &after_back,
            &promotions_with("player", "Juan Soto"),
            FieldSource::Front,
        );

        assert_eq!(after_front.team.as_deref(), Some("NEW YORK METS"));
        assert_eq!(after_front.player.as_deref(), Some("Juan Soto"));
        assert_eq!(after_front.source_of("team"), Some(FieldSource::Back));
        assert_eq!(after_front.source_of("player"), Some(FieldSource::Front));
    }

    #[test]
    fn test_empty_string_promotion_never_lands() {
        let identity = CardIdentity::default();
        let mut promotions = Promotions::default();
        promotions.player = Some("   ".to_string());
        let merged = merge(&identity, &promotions, FieldSource::Front);
        assert!(merged.player.is_none());
        assert!(merged.sources.is_empty());
    }

    #[test]
    fn test_slabbed_true_overrides_false() {
        let identity = CardIdentity::default();

        let mut front = Promotions::default();
        front.is_slabbed = Some(false);
        let after_front = merge(&identity, &front, FieldSource::Front);
        assert!(!after_front.is_slabbed);

        let mut back = Promotions::default();
        back.is_slabbed = Some(true);
        let after_back = merge(&after_front, &back, FieldSource::Back);
        assert!(after_back.is_slabbed);
        assert_eq!(after_back.source_of("isSlabbed"), Some(FieldSource::Back));
    }

    #[test]
    fn test_slabbed_false_never_suppresses_true() {
        let mut identity = CardIdentity::default();
        identity.is_slabbed = true;
        identity
            .sources
            .insert("isSlabbed".to_string(), FieldSource::Slab);

        let mut late = Promotions::default();
        late.is_slabbed = Some(false);
        let merged = merge(&identity, &late, FieldSource::Front);
        assert!(merged.is_slabbed);
        assert_eq!(merged.source_of("isSlabbed"), Some(FieldSource::Slab));
    }

    #[test]
    fn test_user_verified_field_reasserted() {
        let mut identity = CardIdentity::default();
        identity.set_field("player", "Juan Soto".to_string(), FieldSource::Manual);
        identity.mark_verified("player");

        let merged = merge(
            &identity,
            &promotions_with("player", "JUAN SOTO JR"),
            FieldSource::Back,
        );
        assert_eq!(merged.player.as_deref(), Some("Juan Soto"));
        assert_eq!(merged.source_of("player"), Some(FieldSource::Manual));
        assert!(merged.is_verified("player"));
    }

    #[test]
    fn test_merge_is_non_destructive_for_all_fields() {
        let mut identity = CardIdentity::default();
        for field in crate::identity::IDENTITY_FIELDS {
            identity.set_field(field, format!("existing-{}", field), FieldSource::Front);
        }

        let mut promotions = Promotions::default();
        promotions.player = Some("Other Player".to_string());
        promotions.team = Some("OTHER TEAM".to_string());
        promotions.year = Some("1999".to_string());

        let merged = merge(&identity, &promotions, FieldSource::Back);
        for field in crate::identity::IDENTITY_FIELDS {
            assert_eq!(
                merged.get(field),
                identity.get(field),
                "field {} must survive the merge",
                field
            );
        }
    }
}
