//! Property-based round-trip tests for path display and parsing.
//!
//! For any non-empty list of non-empty segments:
//!
//! 1. `Path::parse(&p.to_string()) == Ok(p)`.
//! 2. The displayed form addresses the same registry entry as the original.

use oculus_runtime::{Change, Observer, Path, Registry, Target};
use proptest::prelude::*;

// ── Strategies ────────────────────────────────────────────────────────────

fn segment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        // Separator, quote and escape heavy.
        "[a-z0-9.\\[\\]'\"\\\\ ]{1,6}",
        // Arbitrary printable text.
        "\\PC{1,8}",
        // Whitespace at the edges.
        "[ \t]{0,2}[a-z]{1,3}[ \t]{0,2}",
    ]
    .prop_filter("segment must be non-empty", |s| !s.is_empty())
}

fn segments_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(segment_strategy(), 1..5)
}

proptest! {
    #[test]
    fn display_then_parse_round_trips(segments in segments_strategy()) {
        let path = Path::from_segments(segments.clone()).unwrap();
        let shown = path.to_string();
        let reparsed = Path::parse(&shown);
        prop_assert_eq!(reparsed.as_ref(), Ok(&path), "displayed as {:?}", shown);
        let reparsed = reparsed.unwrap();
        let reparsed_segments: Vec<&str> = reparsed.segments().collect();
        let expected: Vec<&str> = segments.iter().map(String::as_str).collect();
        prop_assert_eq!(reparsed_segments, expected);
    }

    #[test]
    fn snapshot_paths_unwatch_their_registration(segments in segments_strategy()) {
        let mut reg = Registry::new();
        let t = Target::new(());
        let path = Path::from_segments(segments).unwrap();
        reg.watch(&t, &path, Observer::new(|_: &Change<'_, u8>| {})).unwrap();

        let shown = reg.snapshot().targets[0].paths[0].path.clone();
        let result = reg.unregister_path(&t, &shown, None).unwrap();
        prop_assert_eq!(result.observers_removed, 1);
        prop_assert!(reg.is_empty());
    }
}
