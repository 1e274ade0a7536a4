mod support;

use std::collections::HashMap;
use std::sync::Arc;

use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use support::{InMemoryNotesRepo, service};

#[tokio::test]
async fn aggregate_reads_and_rewrites_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let store = Arc::new(InMemoryNotesRepo::new());
    store.insert_direct("A", "x").await;
    let notes = service(store);

    // miss + write, then hit
    notes.get_all().await.expect("refill");
    notes.get_all().await.expect("cached");
    // hit + write
    notes.create("B", "y").await.expect("create");

    let counters: HashMap<String, u64> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter_map(|(composite_key, _, _, value)| match value {
            DebugValue::Counter(count) => Some((composite_key.key().name().to_string(), count)),
            _ => None,
        })
        .collect();

    assert_eq!(counters.get("notes_cache_miss_total"), Some(&1));
    assert_eq!(counters.get("notes_cache_hit_total"), Some(&2));
    assert_eq!(counters.get("notes_cache_write_total"), Some(&2));
}
