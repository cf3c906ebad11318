//! Entry reader specs: warm cache hits and the one-way cold fallback.

use keel_adapters::{FakeCache, FakeLog};
use keel_core::LogEntry;
use keel_engine::EntryReader;

#[test]
fn cached_entry_is_served_with_zero_log_interactions() {
    let log = FakeLog::new();
    let cache = FakeCache::new();
    cache.seed(42, LogEntry::control(42, 7));

    let mut reader = EntryReader::new(log.clone(), cache.clone(), true);
    let entry = reader.get(42).unwrap();

    assert_eq!(entry.index, 42);
    assert!(log.calls().is_empty());
}

#[test]
fn cache_miss_opens_one_cursor_and_sticks_with_it() {
    let log = FakeLog::new();
    log.push(LogEntry::control(42, 7));
    log.push(LogEntry::control(43, 7));
    let cache = FakeCache::new();

    let mut reader = EntryReader::new(log.clone(), cache.clone(), true);
    assert_eq!(reader.get(42).unwrap().index, 42);

    // Index 43 shows up in the cache after the miss; the reader must not
    // go back to it
    cache.seed(43, LogEntry::control(43, 7));
    assert_eq!(reader.get(43).unwrap().index, 43);

    assert_eq!(log.cursors_opened(), 1);
    assert_eq!(cache.gets(), 1);
}
