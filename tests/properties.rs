//! Property tests: values survive both builders, and streaming group-by
//! agrees with the buffered multimap.

use proptest::prelude::*;
use sqlweave::codec::{I64Codec, TextCodec};
use sqlweave::cursor::MemoryCursor;
use sqlweave::prelude::*;

fn select_back<T: std::fmt::Debug + Send + Sync + 'static>(value: T, rendering: Rendering) -> T {
    let registry = CodecRegistry::default();
    let config = ExecutorConfig {
        rendering,
        ..ExecutorConfig::default()
    };
    let mut conn = SqliteConnection::open_in_memory().unwrap();
    Session::new(&mut conn, &registry, &config)
        .query_first(&Template::sql("SELECT ").hole(value))
        .unwrap()
}

/// Finite `f64`s at the far ends of the exponent range, subnormals included.
fn extreme_f64() -> impl Strategy<Value = f64> {
    (
        any::<bool>(),
        prop_oneof![0u64..=58, 1987u64..=2046],
        0u64..(1 << 52),
    )
        .prop_filter("nonzero", |(_, exp, frac)| *exp != 0 || *frac != 0)
        .prop_map(|(negative, exp, frac)| {
            f64::from_bits((u64::from(negative) << 63) | (exp << 52) | frac)
        })
}

proptest! {
    #[test]
    fn test_f64_survives_both_builders(f in -1e6f64..1e6) {
        prop_assert_eq!(select_back(f, Rendering::Parameterized).to_bits(), f.to_bits());
        prop_assert_eq!(select_back(f, Rendering::Literal).to_bits(), f.to_bits());
    }

    #[test]
    fn test_extreme_f64_survives_both_builders(f in extreme_f64()) {
        prop_assert_eq!(select_back(f, Rendering::Parameterized).to_bits(), f.to_bits());
        prop_assert_eq!(select_back(f, Rendering::Literal).to_bits(), f.to_bits());
    }

    #[test]
    fn test_text_survives_both_builders(text in "\\PC*") {
        prop_assert_eq!(select_back(text.clone(), Rendering::Parameterized), text.clone());
        prop_assert_eq!(select_back(text.clone(), Rendering::Literal), text);
    }

    #[test]
    fn test_i64_survives_both_builders(n in any::<i64>()) {
        prop_assert_eq!(select_back(n, Rendering::Parameterized), n);
        prop_assert_eq!(select_back(n, Rendering::Literal), n);
    }

    #[test]
    fn test_optional_i64_survives_both_builders(n in proptest::option::of(any::<i64>())) {
        prop_assert_eq!(select_back(n, Rendering::Parameterized), n);
        prop_assert_eq!(select_back(n, Rendering::Literal), n);
    }

    #[test]
    fn test_segmented_lists_match_multimap(
        mut rows in proptest::collection::vec((0i64..5, "[a-z]{0,3}"), 0..40),
    ) {
        rows.sort_by_key(|(k, _)| *k);
        let rows: Vec<Vec<SqlValue>> = rows
            .into_iter()
            .map(|(k, v)| vec![SqlValue::from(k), SqlValue::from(v)])
            .collect();
        let registry = CodecRegistry::default();

        let mut cursor = MemoryCursor::new(["k", "v"], rows.clone());
        let grouped = segmented_map(I64Codec, list(TextCodec))
            .consume(&registry, &mut cursor)
            .unwrap();
        let mut cursor = MemoryCursor::new(["k", "v"], rows);
        let flat = as_multimap(I64Codec, TextCodec)
            .consume(&registry, &mut cursor)
            .unwrap();
        prop_assert_eq!(grouped, flat);
    }
}
