use book_courier_core::contract::{MockCaptionGenerator, MockChannel, OutgoingPost};
use book_courier_core::identity::BookIdentity;
use book_courier_core::ledger::Ledger;
use book_courier_core::publisher::{PublishFailure, Publisher};
use book_courier_core::store::FileStore;
use chrono::NaiveDate;
use std::fs;
use tempfile::tempdir;

fn captions() -> MockCaptionGenerator {
    let mut captions = MockCaptionGenerator::new();
    captions
        .expect_caption()
        .returning(|identity, publisher, date| format!("{identity}|{publisher}|{date}"));
    captions
}

fn accepting_channel() -> MockChannel {
    let mut channel = MockChannel::new();
    channel.expect_send().returning(|_: OutgoingPost| Ok(()));
    channel
}

#[test]
fn test_load_missing_ledger_is_empty() {
    let tmp = tempdir().unwrap();
    let ledger = Ledger::new(tmp.path().join("never-written.txt"));

    let set = ledger.load().expect("missing ledger must not be an error");

    assert!(set.is_empty());
}

#[test]
fn test_record_appends_without_rewriting() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("published.txt");
    fs::write(&path, "Existing Book\n").unwrap();
    let ledger = Ledger::new(&path);

    ledger.record(&BookIdentity::new("Dune")).unwrap();
    ledger.record(&BookIdentity::new("Clean Code")).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "Existing Book\nDune\nClean Code\n"
    );
    let set = ledger.load().unwrap();
    assert_eq!(set.len(), 3);
    assert!(set.contains(&BookIdentity::new("Clean Code")));
}

#[tokio::test]
async fn test_publish_sends_caption_then_moves_then_records() {
    let tmp = tempdir().unwrap();
    let store = FileStore::new(tmp.path().join("in"), tmp.path().join("out"));
    store.ensure_dirs().unwrap();
    fs::write(store.inbox_path("Dune - Ace.epub"), b"spice").unwrap();
    let ledger = Ledger::new(tmp.path().join("ledger.txt"));

    let mut channel = MockChannel::new();
    channel
        .expect_send()
        .withf(|post: &OutgoingPost| {
            post.filename == "Dune - Ace.epub"
                && post.bytes == b"spice"
                && post.caption == "Dune|Ace|2024-05-01"
        })
        .times(1)
        .returning(|_| Ok(()));
    let publisher = Publisher::new(channel, captions(), store.clone(), ledger.clone());

    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let book = publisher
        .publish_on(&store.inbox_path("Dune - Ace.epub"), "Dune - Ace.epub", date)
        .await
        .expect("publish should succeed");

    assert_eq!(book, BookIdentity::new("Dune"));
    assert!(!store.inbox_path("Dune - Ace.epub").exists());
    assert!(store.archive_dir().join("Dune - Ace.epub").exists());
    assert!(ledger.load().unwrap().contains(&book));
}

#[tokio::test]
async fn test_publish_unreadable_file_is_open_failure() {
    let tmp = tempdir().unwrap();
    let store = FileStore::new(tmp.path().join("in"), tmp.path().join("out"));
    store.ensure_dirs().unwrap();
    let ledger = Ledger::new(tmp.path().join("ledger.txt"));

    let mut channel = MockChannel::new();
    channel.expect_send().never();
    let publisher = Publisher::new(channel, captions(), store.clone(), ledger.clone());

    let err = publisher
        .publish(&store.inbox_path("gone.pdf"), "gone.pdf")
        .await
        .unwrap_err();

    assert!(matches!(err, PublishFailure::OpenFailed { .. }), "got {err:?}");
    assert!(!ledger.path().exists());
}

#[tokio::test]
async fn test_publish_move_failure_keeps_file_and_ledger() {
    let tmp = tempdir().unwrap();
    // Archive directory is never created, so the rename fails.
    let store = FileStore::new(tmp.path().join("in"), tmp.path().join("missing-archive"));
    fs::create_dir_all(store.inbox()).unwrap();
    fs::write(store.inbox_path("Dune - Ace.epub"), b"spice").unwrap();
    let ledger = Ledger::new(tmp.path().join("ledger.txt"));

    let publisher = Publisher::new(accepting_channel(), captions(), store.clone(), ledger.clone());

    let err = publisher
        .publish(&store.inbox_path("Dune - Ace.epub"), "Dune - Ace.epub")
        .await
        .unwrap_err();

    assert!(matches!(err, PublishFailure::MoveFailed { .. }), "got {err:?}");
    assert!(store.inbox_path("Dune - Ace.epub").exists());
    assert!(ledger.load().unwrap().is_empty());
}

#[tokio::test]
async fn test_publish_record_failure_after_archive() {
    let tmp = tempdir().unwrap();
    let store = FileStore::new(tmp.path().join("in"), tmp.path().join("out"));
    store.ensure_dirs().unwrap();
    fs::write(store.inbox_path("Dune - Ace.epub"), b"spice").unwrap();
    let ledger = Ledger::new(tmp.path().join("no-such-dir").join("ledger.txt"));

    let publisher = Publisher::new(accepting_channel(), captions(), store.clone(), ledger);

    let err = publisher
        .publish(&store.inbox_path("Dune - Ace.epub"), "Dune - Ace.epub")
        .await
        .unwrap_err();

    assert!(matches!(err, PublishFailure::RecordFailed { .. }), "got {err:?}");
    assert!(store.archive_dir().join("Dune - Ace.epub").exists());
}
