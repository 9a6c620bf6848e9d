mod common;

use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::sync::Notify;

use common::{attached_engine, settle, Call, MockBackend, MockDisplay};
use lens_core::error::LensError;
use lens_core::rotate::{
    BackendOp, MutationPipeline, RotateEvent, RotateOutcome, RotationSafetyManager,
};
use lens_core::viewport::{lock_viewport, SharedViewport, Size};
use lens_core::ResourceKey;

type Pipeline = MutationPipeline<MockBackend, MockDisplay>;

struct Harness {
    pipeline: Arc<Pipeline>,
    backend: Arc<MockBackend>,
    display: Arc<MockDisplay>,
    viewport: SharedViewport,
    events: UnboundedReceiver<RotateEvent>,
}

/// Viewport zoomed in (fit inactive) over a 1600×1200 image.
fn harness(backend: MockBackend, display: MockDisplay) -> Harness {
    let mut engine = attached_engine(Size::new(800.0, 600.0), Size::new(1600.0, 1200.0));
    engine.fit_to_screen();
    engine.zoom_in();
    let viewport: SharedViewport = Arc::new(Mutex::new(engine));

    let backend = Arc::new(backend);
    let display = Arc::new(display);
    let (tx, events) = unbounded_channel();
    let pipeline = MutationPipeline::new(
        Arc::clone(&backend),
        Arc::clone(&display),
        Arc::clone(&viewport),
        Arc::new(RotationSafetyManager::new()),
    )
    .with_events(tx);

    Harness {
        pipeline: Arc::new(pipeline),
        backend,
        display,
        viewport,
        events,
    }
}

fn a() -> ResourceKey {
    ResourceKey::from("a.jpg")
}

fn rotated_display() -> MockDisplay {
    MockDisplay::showing("a.jpg", Size::new(1200.0, 1600.0))
}

// ---------------------------------------------------------------------------
// Success
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_success_on_screen_reloads_and_refits() {
    let mut h = harness(MockBackend::new(), rotated_display());

    let outcome = h.pipeline.run(a(), 90).await.unwrap();
    assert_eq!(outcome, RotateOutcome::Displayed);

    use BackendOp::*;
    assert_eq!(h.backend.ops(), vec![CreateBackup, Mutate, CleanupBackup]);
    assert_eq!(h.backend.mutate_angles(), vec![90]);
    assert_eq!(h.display.reloads(), vec![(a(), true)]);

    let vp = lock_viewport(&h.viewport);
    assert_eq!(vp.content_size(), Some(Size::new(1200.0, 1600.0)));
    assert!(vp.state().is_fit_active);
    assert_abs_diff_eq!(vp.state().scale, 0.375);
    drop(vp);

    assert!(!h.pipeline.safety().is_in_progress(Some(&a())));
    assert_eq!(
        h.pipeline.safety().take_completed(&a()),
        None,
        "displayed result must be consumed"
    );
    assert_eq!(
        h.events.try_recv().unwrap(),
        RotateEvent::Completed {
            key: a(),
            angle: 90,
            displayed: true
        }
    );
}

#[tokio::test]
async fn test_success_off_screen_is_left_pending() {
    let mut h = harness(
        MockBackend::new(),
        MockDisplay::showing("b.jpg", Size::new(10.0, 10.0)),
    );

    let outcome = h.pipeline.run(a(), 270).await.unwrap();
    assert_eq!(outcome, RotateOutcome::Pending);
    assert!(h.display.reloads().is_empty());
    assert!(!lock_viewport(&h.viewport).state().is_fit_active);

    assert_eq!(h.pipeline.safety().take_completed(&a()), Some(270));
    assert!(matches!(
        h.events.try_recv().unwrap(),
        RotateEvent::Completed {
            displayed: false,
            ..
        }
    ));
}

#[tokio::test]
async fn test_cleanup_failure_is_not_fatal() {
    let h = harness(MockBackend::failing(&[BackendOp::CleanupBackup]), rotated_display());

    let outcome = h.pipeline.run(a(), 90).await.unwrap();
    assert_eq!(outcome, RotateOutcome::Displayed);
    assert_eq!(h.backend.count(BackendOp::RestoreFromBackup), 0);
}

// ---------------------------------------------------------------------------
// Failure and rollback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_mutate_failure_restores_and_reloads() {
    let mut h = harness(MockBackend::failing(&[BackendOp::Mutate]), rotated_display());

    let err = h.pipeline.run(a(), 90).await.unwrap_err();
    assert!(
        matches!(err, LensError::Backend { op: BackendOp::Mutate, .. }),
        "got: {err}"
    );

    use BackendOp::*;
    assert_eq!(h.backend.ops(), vec![CreateBackup, Mutate, RestoreFromBackup]);
    assert_eq!(h.display.reloads(), vec![(a(), true)]);
    assert!(!h.pipeline.safety().is_in_progress(Some(&a())));
    assert_eq!(h.pipeline.safety().take_completed(&a()), None);
    // Rollback reloads without re-fitting.
    assert!(!lock_viewport(&h.viewport).state().is_fit_active);

    match h.events.try_recv().unwrap() {
        RotateEvent::RolledBack { key, cancelled, .. } => {
            assert_eq!(key, a());
            assert!(!cancelled);
        }
        other => panic!("expected rollback, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_backup_failure_skips_mutate() {
    let h = harness(
        MockBackend::failing(&[BackendOp::CreateBackup]),
        rotated_display(),
    );

    let err = h.pipeline.run(a(), 90).await.unwrap_err();
    assert!(
        matches!(err, LensError::Backend { op: BackendOp::CreateBackup, .. }),
        "got: {err}"
    );
    assert_eq!(h.backend.count(BackendOp::Mutate), 0);
    assert_eq!(h.backend.count(BackendOp::RestoreFromBackup), 1);
}

#[tokio::test]
async fn test_restore_failure_before_mutate_keeps_original_error() {
    let mut h = harness(
        MockBackend::failing(&[BackendOp::CreateBackup, BackendOp::RestoreFromBackup]),
        rotated_display(),
    );

    let err = h.pipeline.run(a(), 90).await.unwrap_err();
    assert!(
        matches!(err, LensError::Backend { op: BackendOp::CreateBackup, .. }),
        "got: {err}"
    );
    assert!(matches!(
        h.events.try_recv().unwrap(),
        RotateEvent::RolledBack { .. }
    ));
}

#[tokio::test]
async fn test_restore_failure_after_mutate_is_reported() {
    let mut h = harness(
        MockBackend::failing(&[BackendOp::Mutate, BackendOp::RestoreFromBackup]),
        rotated_display(),
    );

    let err = h.pipeline.run(a(), 90).await.unwrap_err();
    assert!(matches!(err, LensError::RestoreFailed { .. }), "got: {err}");
    assert!(!h.pipeline.safety().is_in_progress(None));
    assert!(h.display.reloads().is_empty());
    assert!(matches!(
        h.events.try_recv().unwrap(),
        RotateEvent::RestoreFailed { .. }
    ));
}

#[tokio::test]
async fn test_conflict_touches_nothing() {
    let h = harness(MockBackend::new(), rotated_display());
    let _held = h.pipeline.safety().begin(&a()).unwrap();

    let err = h.pipeline.run(a(), 90).await.unwrap_err();
    assert!(matches!(err, LensError::ConcurrencyConflict(_)), "got: {err}");
    assert!(h.backend.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_cancel_during_mutate_rolls_back() {
    let gate = Arc::new(Notify::new());
    let mut h = harness(MockBackend::gated(Arc::clone(&gate)), rotated_display());

    let pipeline = Arc::clone(&h.pipeline);
    let run = tokio::spawn(async move { pipeline.run(a(), 90).await });

    settle().await;
    assert_eq!(h.backend.calls(), vec![Call::Backup(a()), Call::Mutate(a(), 90)]);
    assert!(h.pipeline.safety().cancel(&a()));
    gate.notify_one();

    let err = run.await.unwrap().unwrap_err();
    assert!(err.is_cancelled(), "got: {err}");
    assert_eq!(h.backend.count(BackendOp::RestoreFromBackup), 1);
    assert_eq!(h.backend.count(BackendOp::CleanupBackup), 0);
    assert_eq!(h.pipeline.safety().take_completed(&a()), None);

    match h.events.try_recv().unwrap() {
        RotateEvent::RolledBack { cancelled, .. } => assert!(cancelled),
        other => panic!("expected rollback, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_cancel_then_new_rotation_is_admitted() {
    let gate = Arc::new(Notify::new());
    let h = harness(MockBackend::gated(Arc::clone(&gate)), rotated_display());

    let pipeline = Arc::clone(&h.pipeline);
    let first = tokio::spawn(async move { pipeline.run(a(), 90).await });
    settle().await;
    h.pipeline.safety().cancel(&a());

    // Cancelled entry is gone, so a fresh ticket can be issued.
    let ticket = h.pipeline.safety().begin(&a()).unwrap();
    gate.notify_one();
    assert!(first.await.unwrap().unwrap_err().is_cancelled());

    // The stale pipeline's release did not drop the newer ticket.
    assert!(h.pipeline.safety().is_in_progress(Some(&a())));
    h.pipeline.safety().fail(&ticket);
}
