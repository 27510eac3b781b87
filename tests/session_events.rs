// tests/session_events.rs

use std::sync::Arc;
use std::time::Duration;

use fmtwatch::engine::Notification;
use fmtwatch::types::ChangeEvent;
use fmtwatch::watch::WatchMessage;
use fmtwatch_test_utils::builders::{MockProjectBuilder, PipelineBuilder};
use fmtwatch_test_utils::fake_formatter::FakeFormatter;
use fmtwatch_test_utils::{init_tracing, with_timeout};
use tokio::sync::mpsc;

fn changed(path: &str) -> WatchMessage {
    WatchMessage::Changed(ChangeEvent::new(path))
}

#[tokio::test]
async fn watcher_failures_become_error_notifications() {
    init_tracing();

    let fs = MockProjectBuilder::new("/proj").build();
    let builder = PipelineBuilder::new("/proj", fs, Arc::new(FakeFormatter::identity()));
    let sink = builder.sink();
    let session = builder.build_session();

    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(WatchMessage::Failed("inotify queue overflow".to_string()))
        .unwrap();
    drop(tx);
    with_timeout(session.run(rx, std::future::pending()))
        .await
        .unwrap();

    assert_eq!(
        sink.notifications(),
        vec![Notification::Error {
            message: "inotify queue overflow".to_string()
        }]
    );
}

#[tokio::test]
async fn events_for_several_files_are_all_processed() {
    init_tracing();

    let fs = MockProjectBuilder::new("/proj").build();
    let formatter = Arc::new(FakeFormatter::toy_script());
    let builder = PipelineBuilder::new("/proj", fs.clone(), formatter.clone())
        .settle_delay(Duration::from_millis(20));
    let sink = builder.sink();
    let session = builder.build_session();
    let mut ready = session.snapshot_status();
    let cache = session.cache();

    let (tx, rx) = mpsc::unbounded_channel();
    let running = tokio::spawn(session.run(rx, std::future::pending()));
    with_timeout(ready.wait_for(|done| *done)).await.unwrap();

    // Created after the snapshot, so none of them are known yet.
    fs.add_file("/proj/a.ts", "let a=1");
    fs.add_file("/proj/b.js", "let b=2");
    fs.add_file("/proj/c.json", "x=3");
    for path in ["/proj/a.ts", "/proj/b.js", "/proj/c.json"] {
        tx.send(changed(path)).unwrap();
    }
    drop(tx);
    with_timeout(running).await.unwrap().unwrap();

    assert_eq!(fs.contents("/proj/a.ts").unwrap(), b"let a = 1;\n");
    assert_eq!(fs.contents("/proj/b.js").unwrap(), b"let b = 2;\n");
    assert_eq!(fs.contents("/proj/c.json").unwrap(), b"x = 3;\n");
    assert_eq!(cache.len(), 3);

    let mut settled: Vec<String> = sink
        .notifications()
        .into_iter()
        .filter_map(|n| match n {
            Notification::Settled { relative_path, .. } => Some(relative_path),
            Notification::Error { .. } => None,
        })
        .collect();
    settled.sort();
    assert_eq!(settled, vec!["a.ts", "b.js", "c.json"]);
}

#[tokio::test]
async fn closing_the_source_lets_in_flight_events_finish() {
    init_tracing();

    let fs = MockProjectBuilder::new("/proj").build();
    let builder = PipelineBuilder::new("/proj", fs.clone(), Arc::new(FakeFormatter::toy_script()))
        .settle_delay(Duration::from_millis(200));
    let session = builder.build_session();
    let mut ready = session.snapshot_status();

    let (tx, rx) = mpsc::unbounded_channel();
    let running = tokio::spawn(session.run(rx, std::future::pending()));
    with_timeout(ready.wait_for(|done| *done)).await.unwrap();

    fs.add_file("/proj/a.ts", "let x=1");
    tx.send(changed("/proj/a.ts")).unwrap();
    drop(tx);
    with_timeout(running).await.unwrap().unwrap();

    assert_eq!(fs.contents("/proj/a.ts").unwrap(), b"let x = 1;\n");
}

#[tokio::test]
async fn shutdown_abandons_in_flight_events() {
    init_tracing();

    let fs = MockProjectBuilder::new("/proj").build();
    let builder = PipelineBuilder::new("/proj", fs.clone(), Arc::new(FakeFormatter::toy_script()))
        .settle_delay(Duration::from_secs(30));
    let session = builder.build_session();
    let mut ready = session.snapshot_status();

    let (tx, rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let running = tokio::spawn(session.run(rx, async move {
        let _ = stop_rx.await;
    }));
    with_timeout(ready.wait_for(|done| *done)).await.unwrap();

    fs.add_file("/proj/a.ts", "let x=1");
    tx.send(changed("/proj/a.ts")).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    stop_tx.send(()).unwrap();
    with_timeout(running).await.unwrap().unwrap();

    assert_eq!(fs.contents("/proj/a.ts").unwrap(), b"let x=1");
    assert_eq!(fs.write_count(), 0);
}

#[tokio::test]
async fn panicking_formatter_is_reported_and_session_continues() {
    init_tracing();

    let fs = MockProjectBuilder::new("/proj").build();
    let formatter = FakeFormatter::new(|text, _| {
        if text.contains("boom") {
            panic!("formatter blew up");
        }
        Ok(format!("{text}\n"))
    });
    let builder = PipelineBuilder::new("/proj", fs.clone(), Arc::new(formatter))
        .settle_delay(Duration::from_millis(10));
    let sink = builder.sink();
    let session = builder.build_session();
    let mut ready = session.snapshot_status();

    let (tx, rx) = mpsc::unbounded_channel();
    let running = tokio::spawn(session.run(rx, std::future::pending()));
    with_timeout(ready.wait_for(|done| *done)).await.unwrap();

    fs.add_file("/proj/bad.ts", "boom");
    fs.add_file("/proj/good.ts", "fine");
    tx.send(changed("/proj/bad.ts")).unwrap();
    tx.send(changed("/proj/good.ts")).unwrap();
    drop(tx);
    with_timeout(running).await.unwrap().unwrap();

    assert_eq!(fs.contents("/proj/good.ts").unwrap(), b"fine\n");
    let notifications = sink.notifications();
    assert!(notifications.iter().any(|n| matches!(
        n,
        Notification::Error { message } if message.contains("panicked")
    )));
    assert!(notifications.iter().any(|n| matches!(
        n,
        Notification::Settled { relative_path, .. } if relative_path == "good.ts"
    )));
}
