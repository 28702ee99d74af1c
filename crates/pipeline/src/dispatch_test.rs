//! Dispatch table tests

use std::collections::HashMap;
use std::sync::Arc;

use crate::DispatchTable;

#[test]
fn test_insert_and_lookup() {
    let table = DispatchTable::new();
    table.insert(1, "config");
    table.insert(4, "close");

    assert_eq!(table.lookup(1), Some("config"));
    assert_eq!(table.lookup(4), Some("close"));
    assert_eq!(table.lookup(1008), None);
    assert_eq!(table.len(), 2);
}

#[test]
fn test_merge_adds_new_entries() {
    let table = DispatchTable::new();
    table.insert(1, "config");

    let mut entries = HashMap::new();
    entries.insert(1008, "acquisition");
    entries.insert(1026, "waveform");
    table.merge(entries);

    assert_eq!(table.ids(), vec![1, 1008, 1026]);
}

#[test]
fn test_merge_keeps_existing_entries() {
    let table = DispatchTable::new();
    table.insert(4, "close");

    table.merge([(4, "intruder"), (7, "reader")]);

    assert_eq!(table.lookup(4), Some("close"));
    assert_eq!(table.lookup(7), Some("reader"));
}

#[test]
fn test_concurrent_lookup_and_merge() {
    // lookup and merge must be atomic relative to each other; hammer
    // the table from both sides and check nothing tears
    let table = Arc::new(DispatchTable::new());
    table.insert(4, 0u64);

    let merger = {
        let table = Arc::clone(&table);
        std::thread::spawn(move || {
            for id in 100..1100u16 {
                table.merge([(id, u64::from(id))]);
            }
        })
    };

    let reader = {
        let table = Arc::clone(&table);
        std::thread::spawn(move || {
            for _ in 0..10_000 {
                if let Some(value) = table.lookup(500) {
                    assert_eq!(value, 500);
                }
                assert_eq!(table.lookup(4), Some(0));
            }
        })
    };

    merger.join().unwrap();
    reader.join().unwrap();

    assert_eq!(table.len(), 1001);
}
