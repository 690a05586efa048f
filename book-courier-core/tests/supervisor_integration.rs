use book_courier_core::config::CourierConfig;
use book_courier_core::contract::{MockCaptionGenerator, MockChannel, OutgoingPost};
use book_courier_core::cycle::ScanCycle;
use book_courier_core::supervisor::{StopHandle, Supervisor, SupervisorStats};
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{tempdir, TempDir};

fn test_config(tmp: &TempDir) -> CourierConfig {
    let config = CourierConfig {
        inbox_dir: tmp.path().join("books"),
        archive_dir: tmp.path().join("published_books"),
        ledger_path: tmp.path().join("published_books.txt"),
        send_delay: Duration::ZERO,
        idle_interval: Duration::from_secs(3600),
        backoff_interval: Duration::from_secs(300),
    };
    fs::create_dir_all(&config.inbox_dir).unwrap();
    fs::create_dir_all(&config.archive_dir).unwrap();
    config
}

fn captions() -> MockCaptionGenerator {
    let mut captions = MockCaptionGenerator::new();
    captions
        .expect_caption()
        .returning(|identity, _, _| identity.to_string());
    captions
}

#[tokio::test(start_paused = true)]
async fn test_supervisor_runs_first_cycle_immediately_then_idles() {
    let tmp = tempdir().unwrap();
    let config = test_config(&tmp);
    fs::write(config.inbox_dir.join("Dune - Ace.epub"), b"d").unwrap();

    let mut channel = MockChannel::new();
    channel
        .expect_send()
        .times(1)
        .returning(|_: OutgoingPost| Ok(()));
    let supervisor = Supervisor::new(&config, ScanCycle::new(&config, channel, captions()));
    let stop = supervisor.stop_handle();

    // Stop well inside the first idle interval.
    let (stats, _) = tokio::join!(supervisor.run(), async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        stop.stop();
    });

    assert_eq!(
        stats,
        SupervisorStats {
            cycles: 1,
            failures: 0,
            published: 1,
        }
    );
    assert!(config.archive_dir.join("Dune - Ace.epub").exists());
}

#[tokio::test(start_paused = true)]
async fn test_supervisor_rescans_after_idle_interval() {
    let tmp = tempdir().unwrap();
    let config = test_config(&tmp);

    let mut channel = MockChannel::new();
    channel.expect_send().never();
    let supervisor = Supervisor::new(&config, ScanCycle::new(&config, channel, captions()));
    let stop = supervisor.stop_handle();

    // Cycles at t=0, 3600 and 7200; stop during the third idle wait.
    let (stats, _) = tokio::join!(supervisor.run(), async move {
        tokio::time::sleep(Duration::from_secs(3 * 3600 - 60)).await;
        stop.stop();
    });

    assert_eq!(stats.cycles, 3);
    assert_eq!(stats.failures, 0);
}

#[tokio::test(start_paused = true)]
async fn test_supervisor_backs_off_on_cycle_failure_and_keeps_going() {
    let tmp = tempdir().unwrap();
    let mut config = test_config(&tmp);
    config.ledger_path = tmp.path().join("ledger-dir");
    fs::create_dir(&config.ledger_path).unwrap();

    let mut channel = MockChannel::new();
    channel.expect_send().never();
    let supervisor = Supervisor::new(&config, ScanCycle::new(&config, channel, captions()));
    let stop = supervisor.stop_handle();

    // Failing cycles at t=0, 300, 600 and 900, each followed by a backoff.
    let (stats, _) = tokio::join!(supervisor.run(), async move {
        tokio::time::sleep(Duration::from_secs(1000)).await;
        stop.stop();
    });

    assert_eq!(stats.cycles, 0);
    assert_eq!(stats.failures, 4);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_cycle_finishes_the_cycle_then_skips_idle() {
    let tmp = tempdir().unwrap();
    let mut config = test_config(&tmp);
    config.send_delay = Duration::from_secs(30);
    fs::write(config.inbox_dir.join("A - first.pdf"), b"a").unwrap();
    fs::write(config.inbox_dir.join("B - second.pdf"), b"b").unwrap();

    let slot: Arc<Mutex<Option<StopHandle>>> = Arc::new(Mutex::new(None));
    let stop_from_send = slot.clone();
    let mut channel = MockChannel::new();
    channel
        .expect_send()
        .times(2)
        .returning(move |_: OutgoingPost| {
            if let Some(stop) = stop_from_send.lock().unwrap().as_ref() {
                stop.stop();
            }
            Ok(())
        });
    let supervisor = Supervisor::new(&config, ScanCycle::new(&config, channel, captions()));
    *slot.lock().unwrap() = Some(supervisor.stop_handle());

    let started = tokio::time::Instant::now();
    let stats = supervisor.run().await;

    assert_eq!(stats.cycles, 1);
    assert_eq!(stats.published, 2);
    assert!(config.archive_dir.join("A - first.pdf").exists());
    assert!(config.archive_dir.join("B - second.pdf").exists());
    // Both pacing delays, no idle interval.
    assert_eq!(started.elapsed(), Duration::from_secs(60));
}

#[tokio::test]
async fn test_supervisor_stopped_before_start_runs_nothing() {
    let tmp = tempdir().unwrap();
    let config = test_config(&tmp);

    let mut channel = MockChannel::new();
    channel.expect_send().never();
    let supervisor = Supervisor::new(&config, ScanCycle::new(&config, channel, captions()));
    supervisor.stop_handle().stop();

    let stats = supervisor.run().await;

    assert_eq!(stats, SupervisorStats::default());
}
