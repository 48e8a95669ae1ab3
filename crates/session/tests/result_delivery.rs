//! Result delivery contract: first-wins batches, formatting, error channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use capture_engine::{
    EngineConfiguration, FakeBackendBuilder, FakeBackendController, MountPoint, RecognizedBarcode,
    Symbology, SymbologySet,
};
use capture_session::{ResultSink, SessionController, SessionError, SessionOptions, SessionState};
use parking_lot::Mutex;

const MOUNT_ID: &str = "data-capture-view";

async fn scanning_controller(sink: ResultSink) -> (SessionController, FakeBackendController) {
    let (backend, fake) = FakeBackendBuilder::new().with_mount(MOUNT_ID).build();
    let controller = SessionController::new(
        backend,
        EngineConfiguration::new("TEST-LICENSE-KEY", "library/engine/"),
        SymbologySet::retail(),
        SessionOptions::default(),
    );
    controller
        .initialize(&MountPoint::element(MOUNT_ID), sink)
        .await
        .expect("initialize should succeed");
    (controller, fake)
}

fn collecting_sink() -> (ResultSink, Arc<Mutex<Vec<String>>>) {
    let results = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&results);
    let sink = ResultSink::new(move |formatted| captured.lock().push(formatted.to_string()));
    (sink, results)
}

#[tokio::test]
async fn first_batch_entry_wins_rest_discarded() {
    let (sink, results) = collecting_sink();
    let (_controller, fake) = scanning_controller(sink).await;

    let delivered = fake.emit_batch(vec![
        RecognizedBarcode::new("first", Symbology::Code128),
        RecognizedBarcode::new("second", Symbology::Qr),
        RecognizedBarcode::new("third", Symbology::Ean8),
    ]);

    assert!(delivered);
    let results = results.lock();
    assert_eq!(results.len(), 1, "exactly one sink invocation per event");
    assert_eq!(results[0], "Scanned: first\n(Code 128)");
}

#[tokio::test]
async fn formats_payload_and_format_label() {
    let (sink, results) = collecting_sink();
    let (_controller, fake) = scanning_controller(sink).await;

    fake.emit_batch(vec![RecognizedBarcode::new(
        "1234567890128",
        Symbology::Ean13UpcA,
    )]);

    assert_eq!(results.lock()[0], "Scanned: 1234567890128\n(EAN-13)");
}

#[tokio::test]
async fn absent_payload_is_empty_data_not_an_error() {
    let (sink, results) = collecting_sink();
    let (_controller, fake) = scanning_controller(sink).await;

    fake.emit_batch(vec![RecognizedBarcode::without_data(Symbology::DataMatrix)]);

    assert_eq!(results.lock()[0], "Scanned: \n(Data Matrix)");
}

#[tokio::test]
async fn no_results_before_scanning() {
    let (backend, fake) = FakeBackendBuilder::new().with_mount(MOUNT_ID).build();
    let (sink, results) = collecting_sink();
    let controller = SessionController::new(
        backend,
        EngineConfiguration::new("TEST-LICENSE-KEY", "library/engine/"),
        SymbologySet::retail(),
        SessionOptions::default(),
    );

    // Before initialize there is no observer at all.
    assert!(!fake.emit_batch(vec![RecognizedBarcode::new("early", Symbology::Qr)]));
    assert!(results.lock().is_empty());

    controller
        .initialize(&MountPoint::element(MOUNT_ID), sink)
        .await
        .unwrap();

    // Paused sessions analyze nothing.
    controller.stop().await.unwrap();
    assert!(!fake.emit_batch(vec![RecognizedBarcode::new("paused", Symbology::Qr)]));
    assert!(results.lock().is_empty());

    controller.start().await.unwrap();
    assert!(fake.emit_batch(vec![RecognizedBarcode::new("live", Symbology::Qr)]));
    assert_eq!(results.lock().len(), 1);
}

#[tokio::test]
async fn scanning_continues_after_a_hit() {
    let (sink, results) = collecting_sink();
    let (controller, fake) = scanning_controller(sink).await;

    fake.emit_batch(vec![RecognizedBarcode::new("one", Symbology::Qr)]);
    fake.emit_batch(vec![RecognizedBarcode::new("two", Symbology::Qr)]);

    assert_eq!(results.lock().len(), 2);
    assert_eq!(controller.state(), SessionState::Scanning);
    assert!(fake.mode_enabled(), "no auto-pause after a hit");
}

#[tokio::test]
async fn device_loss_reaches_the_error_callback() {
    let (sink, results) = collecting_sink();
    let errors = Arc::new(Mutex::new(Vec::new()));
    let captured_errors = Arc::clone(&errors);
    let sink = sink.with_error_handler(move |err| captured_errors.lock().push(err.to_string()));
    let (_controller, fake) = scanning_controller(sink).await;

    assert!(fake.emit_device_lost("device unplugged"));

    let errors = errors.lock();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("device unplugged"));
    assert!(results.lock().is_empty(), "device loss is not a result");
}

#[tokio::test]
async fn device_loss_error_is_device_lost_variant() {
    let (sink, _results) = collecting_sink();
    let lost = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&lost);
    let sink = sink.with_error_handler(move |err| {
        if matches!(err, SessionError::DeviceLost(_)) {
            counted.fetch_add(1, Ordering::SeqCst);
        }
    });
    let (_controller, fake) = scanning_controller(sink).await;

    fake.emit_device_lost("unplugged");
    assert_eq!(lost.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn resume_invokes_the_callers_clear_hook() {
    let (sink, _results) = collecting_sink();
    let cleared = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&cleared);
    let sink = sink.with_clear_hook(move || {
        counted.fetch_add(1, Ordering::SeqCst);
    });
    let (controller, fake) = scanning_controller(sink).await;

    fake.emit_batch(vec![RecognizedBarcode::new("hit", Symbology::Qr)]);
    controller.stop().await.unwrap();

    controller.resume().await.unwrap();
    assert_eq!(cleared.load(Ordering::SeqCst), 1);
    assert_eq!(controller.state(), SessionState::Scanning);

    // Safe with nothing pending.
    controller.resume().await.unwrap();
    assert_eq!(cleared.load(Ordering::SeqCst), 2);
    assert_eq!(controller.state(), SessionState::Scanning);
}
