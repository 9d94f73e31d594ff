#![no_main]

use flowmap_core::{NormalizeOptions, TruncationCaps, normalize, truncate};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    let map = normalize(&raw, "FUZZ", &NormalizeOptions::default());
    for edge in &map.edges {
        assert!(map.node(&edge.from).is_some(), "dangling edge source");
        assert!(map.node(&edge.to).is_some(), "dangling edge target");
    }

    let bounded = truncate(&map, TruncationCaps::new(Some(8), Some(8)));
    assert!(bounded.map.nodes.len() <= 8);
    assert!(bounded.map.edges.len() <= 8);
    for edge in &bounded.map.edges {
        assert!(bounded.map.node(&edge.from).is_some());
        assert!(bounded.map.node(&edge.to).is_some());
    }
});
