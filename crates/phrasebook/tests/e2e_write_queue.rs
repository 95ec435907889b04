#![forbid(unsafe_code)]

//! End-to-end tests for write queue ordering and failure delivery.
//!
//! Validates:
//! - Updates persist in call order, one write per recorded update
//! - Each write serializes the dictionary as of write time
//! - Unobserved write failures surface exactly once, at the next drain
//! - An error hook keeps drain clean and sees load and write failures
//! - Shutdown flushes, then rejects later updates through the error path
//! - Dropping the handle flushes pending writes
//! - A panicking hook neither hangs drain nor stops later writes

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use phrasebook::{Dictionary, Phrasebook, PhrasebookError};

// ============================================================================
// Helpers
// ============================================================================

fn read_dict(dir: &Path, locale: &str) -> Dictionary {
    let contents = fs::read_to_string(dir.join(format!("{locale}.json"))).unwrap();
    serde_json::from_str(&contents).unwrap()
}

// ============================================================================
// Test 1: Updates persist in call order
// ============================================================================

#[test]
fn e2e_updates_apply_in_call_order() {
    let dir = tempfile::tempdir().unwrap();
    let order: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&order);
    let book = Phrasebook::builder()
        .directory(dir.path())
        .on_update(move |err, event| {
            assert!(err.is_none());
            sink.lock().unwrap().push(event.singular.clone());
        })
        .build()
        .unwrap();

    book.translate("first", &[]);
    book.translate("second", &[]);
    book.translate("third", &[]);
    book.drain().unwrap();

    assert_eq!(*order.lock().unwrap(), ["first", "second", "third"]);
    book.shutdown().unwrap();
}

// ============================================================================
// Test 2: Writes serialize the dictionary as of write time
// ============================================================================

#[test]
fn e2e_persisted_state_reflects_cache_at_write_time() {
    let dir = tempfile::tempdir().unwrap();
    let sizes: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&sizes);
    let book = Phrasebook::builder()
        .directory(dir.path())
        .on_update(move |err, event| {
            assert!(err.is_none());
            let contents = fs::read_to_string(&event.path).unwrap();
            let dict: Dictionary = serde_json::from_str(&contents).unwrap();
            sink.lock().unwrap().push(dict.len());
        })
        .build()
        .unwrap();

    book.translate("a", &[]);
    book.translate("b", &[]);
    book.translate("c", &[]);
    book.drain().unwrap();

    // Every persisted file is a valid snapshot of the growing dictionary,
    // so sizes never decrease and the last write holds all three keys.
    let sizes = sizes.lock().unwrap();
    assert_eq!(sizes.len(), 3);
    assert!(sizes.windows(2).all(|w| w[0] <= w[1]), "sizes: {sizes:?}");
    assert_eq!(*sizes.last().unwrap(), 3);
    book.shutdown().unwrap();
}

// ============================================================================
// Test 3: Unobserved write failure surfaces at drain, once
// ============================================================================

#[test]
fn e2e_unobserved_write_failure_surfaces_at_drain() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, "not a directory").unwrap();

    let book = Phrasebook::builder()
        .directory(blocker.join("locales"))
        .build()
        .unwrap();

    assert_eq!(book.translate("alpha", &[]), "alpha");
    let err = book.drain().unwrap_err();
    assert!(matches!(err, PhrasebookError::Write { .. }), "got: {err}");

    // Surfaced once; the queue keeps serving.
    book.drain().unwrap();

    let good = dir.path().join("locales");
    book.set_directory(&good);
    assert_eq!(book.translate("beta", &[]), "beta");
    book.drain().unwrap();

    // The cache kept the key whose write failed, so the first successful
    // write carries it along.
    let dict = read_dict(&good, "en");
    assert!(dict.contains_key("alpha") && dict.contains_key("beta"));
    book.shutdown().unwrap();
}

// ============================================================================
// Test 4: An error hook observes failures and keeps drain clean
// ============================================================================

#[test]
fn e2e_write_failure_reported_to_hook_keeps_drain_clean() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, "not a directory").unwrap();

    let errors: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    let book = Phrasebook::builder()
        .directory(blocker.join("locales"))
        .on_error(move |err| sink.lock().unwrap().push(err.to_string()))
        .build()
        .unwrap();

    assert_eq!(book.translate("alpha", &[]), "alpha");
    book.drain().unwrap();

    let recorded = errors.lock().unwrap().clone();
    assert_eq!(recorded.len(), 2, "load and write failures: {recorded:?}");
    assert!(recorded[0].contains("failed to read"));
    assert!(recorded[1].contains("failed to write"));
    book.shutdown().unwrap();
}

// ============================================================================
// Test 5: Shutdown flushes, then rejects updates
// ============================================================================

#[test]
fn e2e_shutdown_flushes_then_rejects_updates() {
    let dir = tempfile::tempdir().unwrap();
    let errors: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    let book = Phrasebook::builder()
        .directory(dir.path())
        .on_error(move |err| sink.lock().unwrap().push(err.to_string()))
        .build()
        .unwrap();

    book.translate("alpha", &[]);
    book.shutdown().unwrap();
    assert!(dir.path().join("en.json").exists());

    // The cache still resolves; persistence is rejected through the hook.
    assert_eq!(book.translate("beta", &[]), "beta");
    assert!(book.key_exists("beta"));
    let recorded = errors.lock().unwrap().clone();
    assert_eq!(recorded.len(), 1);
    assert!(recorded[0].contains("write queue is closed"));

    let dict = read_dict(dir.path(), "en");
    assert!(dict.contains_key("alpha") && !dict.contains_key("beta"));

    // Idempotent.
    book.shutdown().unwrap();
}

// ============================================================================
// Test 6: Dropping the handle flushes pending writes
// ============================================================================

#[test]
fn e2e_dropping_the_handle_flushes_pending_writes() {
    let dir = tempfile::tempdir().unwrap();
    {
        let book = Phrasebook::builder().directory(dir.path()).build().unwrap();
        book.translate("uno", &[]);
        book.translate("dos", &[]);
        book.translate("tres", &[]);
    }

    let dict = read_dict(dir.path(), "en");
    assert_eq!(dict.len(), 3);
}

// ============================================================================
// Test 7: Drain with nothing queued returns immediately
// ============================================================================

#[test]
fn e2e_drain_without_pending_updates_returns_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let book = Phrasebook::builder().directory(dir.path()).build().unwrap();
    book.drain().unwrap();
    book.drain().unwrap();
    book.shutdown().unwrap();
}

// ============================================================================
// Test 8: A panicking update hook neither hangs drain nor stops writes
// ============================================================================

#[test]
fn e2e_panicking_update_hook_keeps_queue_alive() {
    let dir = tempfile::tempdir().unwrap();
    let book = Arc::new(
        Phrasebook::builder()
            .directory(dir.path())
            .on_update(|_, _| panic!("hook bug"))
            .build()
            .unwrap(),
    );

    book.translate("First!", &[]);

    // Drain from a second thread so a wedged queue fails instead of
    // hanging the test.
    let (done_tx, done_rx) = mpsc::channel();
    let drainer = Arc::clone(&book);
    thread::spawn(move || {
        drainer.drain().unwrap();
        done_tx.send(()).unwrap();
    });
    done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("drain blocked after the update hook panicked");

    // Later lookups still record and persist.
    book.translate("Second!", &[]);
    book.shutdown().unwrap();

    let dict = read_dict(dir.path(), "en");
    assert!(dict.contains_key("First!"));
    assert!(dict.contains_key("Second!"));
}
