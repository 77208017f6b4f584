//! Property-based tests for the file cache

use std::time::Duration;

use application::ForecastCachePort;
use domain::CacheKey;
use infrastructure::FileCache;
use proptest::prelude::*;
use serde_json::{Map, Value};

/// Arbitrary JSON documents
///
/// Floats are quarter steps so their decimal text is exact.
fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        (-4_000_000i32..4_000_000).prop_map(|n| Value::from(f64::from(n) / 4.0)),
        "\\PC{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("\\PC{0,8}", inner), 0..6)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

// ============================================================================
// Round-trip
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn stored_payload_reads_back_deep_equal(payload in json_value()) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), Duration::from_secs(3600));
        let key = CacheKey::new("point-roundtrip");

        let entry = runtime.block_on(async {
            cache.put(&key, &payload).await.unwrap();
            cache.get(&key).await.unwrap()
        });

        prop_assert_eq!(entry.map(|e| e.payload), Some(payload));
    }
}
