mod common;

use approx::assert_abs_diff_eq;

use common::attached_engine;
use lens_core::viewport::{
    GestureMode, GestureRouter, InputEvent, Point, Size, TransformEngine, WheelDirection,
};

fn setup() -> (GestureRouter, TransformEngine) {
    let mut engine = attached_engine(Size::new(800.0, 600.0), Size::new(1600.0, 1200.0));
    engine.fit_to_screen();
    (GestureRouter::new(), engine)
}

fn down(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerDown {
        position: Point::new(x, y),
        primary: true,
    }
}

fn mv(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerMove {
        position: Point::new(x, y),
    }
}

// ---------------------------------------------------------------------------
// Pointer
// ---------------------------------------------------------------------------

#[test]
fn test_pointer_drag_pans() {
    let (mut router, mut engine) = setup();
    router.handle(&mut engine, down(100.0, 100.0));
    assert_eq!(router.mode(), GestureMode::Dragging);

    router.handle(&mut engine, mv(150.0, 80.0));
    assert_abs_diff_eq!(engine.state().translate_x, 50.0);
    assert_abs_diff_eq!(engine.state().translate_y, -20.0);
    assert!(!engine.state().is_fit_active);

    router.handle(&mut engine, InputEvent::PointerUp);
    assert_eq!(router.mode(), GestureMode::Idle);
    assert!(!engine.state().is_dragging);
}

#[test]
fn test_secondary_button_does_not_drag() {
    let (mut router, mut engine) = setup();
    router.handle(
        &mut engine,
        InputEvent::PointerDown {
            position: Point::new(10.0, 10.0),
            primary: false,
        },
    );
    router.handle(&mut engine, mv(90.0, 90.0));

    assert_eq!(router.mode(), GestureMode::Idle);
    assert_abs_diff_eq!(engine.state().translate_x, 0.0);
}

#[test]
fn test_pointer_leave_ends_drag() {
    let (mut router, mut engine) = setup();
    router.handle(&mut engine, down(0.0, 0.0));
    router.handle(&mut engine, InputEvent::PointerLeave);
    router.handle(&mut engine, mv(40.0, 40.0));

    assert_eq!(router.mode(), GestureMode::Idle);
    assert_abs_diff_eq!(engine.state().translate_x, 0.0);
}

#[test]
fn test_move_without_press_is_ignored() {
    let (mut router, mut engine) = setup();
    let before = engine.state().clone();
    router.handle(&mut engine, mv(300.0, 300.0));
    assert_eq!(engine.state(), &before);
}

#[test]
fn test_drag_on_unattached_engine_stays_idle() {
    let mut router = GestureRouter::new();
    let mut engine = TransformEngine::default();
    router.handle(&mut engine, down(5.0, 5.0));
    assert_eq!(router.mode(), GestureMode::Idle);
}

// ---------------------------------------------------------------------------
// Wheel
// ---------------------------------------------------------------------------

#[test]
fn test_wheel_event_zooms_about_cursor() {
    let (mut router, mut engine) = setup();
    let cursor = Point::new(200.0, 150.0);
    let before = engine.transform().invert(cursor);

    router.handle(
        &mut engine,
        InputEvent::Wheel {
            position: cursor,
            direction: WheelDirection::Up,
        },
    );
    assert_abs_diff_eq!(engine.state().scale, 0.55, epsilon = 1e-9);
    let after = engine.transform().invert(cursor);
    assert_abs_diff_eq!(before.x, after.x, epsilon = 1e-9);
    assert_abs_diff_eq!(before.y, after.y, epsilon = 1e-9);
}

// ---------------------------------------------------------------------------
// Touch
// ---------------------------------------------------------------------------

#[test]
fn test_single_touch_drags() {
    let (mut router, mut engine) = setup();
    router.handle(
        &mut engine,
        InputEvent::TouchStart {
            touches: vec![Point::new(10.0, 10.0)],
        },
    );
    router.handle(
        &mut engine,
        InputEvent::TouchMove {
            touches: vec![Point::new(20.0, 30.0)],
        },
    );
    assert_abs_diff_eq!(engine.state().translate_x, 10.0);
    assert_abs_diff_eq!(engine.state().translate_y, 20.0);

    router.handle(&mut engine, InputEvent::TouchEnd { touches: vec![] });
    assert_eq!(router.mode(), GestureMode::Idle);
}

#[test]
fn test_two_finger_pinch_zooms() {
    let (mut router, mut engine) = setup();
    router.handle(
        &mut engine,
        InputEvent::TouchStart {
            touches: vec![Point::new(300.0, 300.0), Point::new(400.0, 300.0)],
        },
    );
    match router.mode() {
        GestureMode::Pinching(pinch) => {
            assert_abs_diff_eq!(pinch.initial_distance, 100.0);
            assert_abs_diff_eq!(pinch.initial_scale, 0.5);
        }
        other => panic!("expected pinch, got: {other:?}"),
    }

    // Fingers spread to twice the distance around the same midpoint.
    router.handle(
        &mut engine,
        InputEvent::TouchMove {
            touches: vec![Point::new(250.0, 300.0), Point::new(450.0, 300.0)],
        },
    );
    assert_abs_diff_eq!(engine.state().scale, 1.0, epsilon = 1e-9);
    assert!(!engine.state().is_fit_active);
}

#[test]
fn test_second_finger_cancels_drag() {
    let (mut router, mut engine) = setup();
    router.handle(
        &mut engine,
        InputEvent::TouchStart {
            touches: vec![Point::new(10.0, 10.0)],
        },
    );
    router.handle(
        &mut engine,
        InputEvent::TouchStart {
            touches: vec![Point::new(10.0, 10.0), Point::new(60.0, 10.0)],
        },
    );
    assert!(matches!(router.mode(), GestureMode::Pinching(_)));
    assert!(!engine.state().is_dragging);
}

#[test]
fn test_lifting_one_finger_ends_pinch() {
    let (mut router, mut engine) = setup();
    router.handle(
        &mut engine,
        InputEvent::TouchStart {
            touches: vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
        },
    );
    router.handle(
        &mut engine,
        InputEvent::TouchEnd {
            touches: vec![Point::new(0.0, 0.0)],
        },
    );
    assert_eq!(router.mode(), GestureMode::Idle);

    // A lone finger left over does not pan.
    let before = engine.state().clone();
    router.handle(
        &mut engine,
        InputEvent::TouchMove {
            touches: vec![Point::new(50.0, 50.0)],
        },
    );
    assert_eq!(engine.state(), &before);
}

// ---------------------------------------------------------------------------
// Resize
// ---------------------------------------------------------------------------

#[test]
fn test_resize_refits_when_fit_active() {
    let (mut router, mut engine) = setup();
    router.handle(
        &mut engine,
        InputEvent::Resize {
            container: Size::new(1600.0, 1200.0),
        },
    );
    assert_abs_diff_eq!(engine.state().scale, 1.0);
    assert_eq!(engine.container_size(), Some(Size::new(1600.0, 1200.0)));
}

#[test]
fn test_resize_after_pan_keeps_view() {
    let (mut router, mut engine) = setup();
    router.handle(&mut engine, down(0.0, 0.0));
    router.handle(&mut engine, mv(10.0, 0.0));
    router.handle(&mut engine, InputEvent::PointerUp);
    let before = engine.state().clone();

    router.handle(
        &mut engine,
        InputEvent::Resize {
            container: Size::new(200.0, 200.0),
        },
    );
    assert_eq!(engine.state(), &before);
}
