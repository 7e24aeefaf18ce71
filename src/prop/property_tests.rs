//! Property-Based Tests for the Prop Module
//!
//! Uses proptest to verify the read/write contract and the invalidation
//! behavior across arbitrary values and operation sequences.

use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::codec::Codec;
use crate::definer::{Definer, DefinerBuilder};
use crate::prop::{is_tracking_key, Prop};
use crate::store::PropertyMap;

// == Strategies ==
/// Generates property names that cannot collide with tracking keys
fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,31}".prop_map(|s| s)
}

/// Generates raw-safe string values (no surrounding whitespace to survive
/// the `FromStr`/`Display` round trip through the store)
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9 ,._-]{0,63}[a-zA-Z0-9]".prop_map(|s| s)
}

fn definer() -> Definer<PropertyMap> {
    DefinerBuilder::new()
        .codec(Codec::<String>::parsed())
        .codec(Codec::<u32>::parsed())
        .build()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any property without a default initializer, get returns the raw
    // stored value when present, else the caller-supplied substitute.
    #[test]
    fn prop_get_returns_stored_or_substitute(
        name in name_strategy(),
        stored in value_strategy(),
        substitute in value_strategy()
    ) {
        let prop: Prop<PropertyMap, String> = definer().define(&name).unwrap();
        let mut ctx = PropertyMap::new();

        prop_assert_eq!(
            prop.get_or(&mut ctx, Some(substitute.clone())).unwrap(),
            Some(substitute.clone())
        );
        prop_assert_eq!(prop.get(&mut ctx).unwrap(), None);

        ctx.insert(&name, &stored);
        prop_assert_eq!(prop.get(&mut ctx).unwrap(), Some(stored.clone()));
        prop_assert_eq!(prop.get_or(&mut ctx, Some(substitute)).unwrap(), Some(stored));
    }

    // set followed by get returns the written value for any faithful codec.
    #[test]
    fn prop_set_get_roundtrip(name in name_strategy(), value in value_strategy()) {
        let prop: Prop<PropertyMap, String> = definer().define(&name).unwrap();
        let mut ctx = PropertyMap::new();

        prop.set(&mut ctx, Some(&value)).unwrap();
        prop_assert_eq!(prop.get(&mut ctx).unwrap(), Some(value));
    }

    // Repeated gets without intervening sets are idempotent and run the
    // default initializer at most once.
    #[test]
    fn prop_get_idempotent(name in name_strategy(), value in value_strategy(), reads in 1usize..8) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let seeded = value.clone();
        let prop: Prop<PropertyMap, String> = definer()
            .define_with(&name, move |_ctx| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(seeded.clone())
            })
            .unwrap();
        let mut ctx = PropertyMap::new();

        for _ in 0..reads {
            prop_assert_eq!(prop.get(&mut ctx).unwrap(), Some(value.clone()));
        }
        prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    // A dependent property recomputes exactly when the upstream fingerprint
    // captured at its last write no longer matches.
    #[test]
    fn prop_recompute_tracks_upstream_drift(
        upstream_values in prop::collection::vec(0u32..1000, 2..10)
    ) {
        let d = definer();
        let upstream: Prop<PropertyMap, u32> = d.define("upstream").unwrap();
        let up = upstream.clone();
        let derived: Prop<PropertyMap, u32> = d
            .define_with("derived", move |ctx: &mut PropertyMap| {
                Ok(up.get(ctx)?.unwrap_or(0) * 2)
            })
            .unwrap()
            .depends_on(&upstream);

        let mut ctx = PropertyMap::new();
        for value in upstream_values {
            upstream.set(&mut ctx, Some(&value)).unwrap();
            // Whether or not the previous cached value survived, the
            // observable result always reflects the current upstream.
            prop_assert_eq!(derived.get(&mut ctx).unwrap(), Some(value * 2));
        }
    }

    // Rewriting the upstream with an identical value never forces a
    // recomputation of the dependent default.
    #[test]
    fn prop_same_hash_rewrite_is_quiescent(value in 0u32..1000, rewrites in 1usize..6) {
        let d = definer();
        let upstream: Prop<PropertyMap, u32> = d.define("upstream").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let up = upstream.clone();
        let derived: Prop<PropertyMap, u32> = d
            .define_with("derived", move |ctx: &mut PropertyMap| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(up.get(ctx)?.unwrap_or(0))
            })
            .unwrap()
            .depends_on(&upstream);

        let mut ctx = PropertyMap::new();
        upstream.set(&mut ctx, Some(&value)).unwrap();
        derived.get(&mut ctx).unwrap();

        for _ in 0..rewrites {
            upstream.set(&mut ctx, Some(&value)).unwrap();
            derived.get(&mut ctx).unwrap();
        }
        prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    // Tracking keys never leak into typed reads: a property sees only its
    // own storage key, and one dependency produces exactly one tracking key.
    #[test]
    fn prop_tracking_keys_stay_internal(value in 0u32..1000) {
        let d = definer();
        let upstream: Prop<PropertyMap, u32> = d.define("upstream").unwrap();
        let up = upstream.clone();
        let derived: Prop<PropertyMap, u32> = d
            .define_with("derived", move |ctx: &mut PropertyMap| {
                Ok(up.get(ctx)?.unwrap_or(0))
            })
            .unwrap()
            .depends_on(&upstream);

        let mut ctx = PropertyMap::new();
        upstream.set(&mut ctx, Some(&value)).unwrap();
        derived.get(&mut ctx).unwrap();

        prop_assert_eq!(ctx.keys().filter(|k| is_tracking_key(k)).count(), 1);
        prop_assert_eq!(upstream.get(&mut ctx).unwrap(), Some(value));
        prop_assert_eq!(derived.get(&mut ctx).unwrap(), Some(value));
    }
}
