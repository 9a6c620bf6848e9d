use tracing::debug;

use super::state::{PinchState, Point, Size};
use super::transform::{TransformEngine, WheelDirection};

/// Raw input from the viewport host, in container-local coordinates.
///
/// Touch events carry every finger currently on the surface, the way the
/// platform reports them.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { position: Point, primary: bool },
    PointerMove { position: Point },
    PointerUp,
    PointerLeave,
    Wheel { position: Point, direction: WheelDirection },
    TouchStart { touches: Vec<Point> },
    TouchMove { touches: Vec<Point> },
    TouchEnd { touches: Vec<Point> },
    Resize { container: Size },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum GestureMode {
    #[default]
    Idle,
    Dragging,
    Pinching(PinchState),
}

/// Turns input events into transform engine calls and tracks whether a
/// drag or a pinch is in progress.
#[derive(Debug, Default)]
pub struct GestureRouter {
    mode: GestureMode,
}

impl GestureRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    pub fn handle(&mut self, engine: &mut TransformEngine, event: InputEvent) {
        match event {
            InputEvent::PointerDown { position, primary } => {
                if primary {
                    self.start_drag(engine, position);
                }
            }
            InputEvent::PointerMove { position } => {
                if self.mode == GestureMode::Dragging {
                    engine.drag_to(position);
                }
            }
            InputEvent::PointerUp | InputEvent::PointerLeave => {
                if self.mode == GestureMode::Dragging {
                    self.go_idle(engine);
                }
            }
            InputEvent::Wheel {
                position,
                direction,
            } => {
                engine.wheel_zoom(position, direction);
            }
            InputEvent::TouchStart { touches } => self.touch_start(engine, &touches),
            InputEvent::TouchMove { touches } => self.touch_move(engine, &touches),
            InputEvent::TouchEnd { touches } => self.touch_end(engine, &touches),
            InputEvent::Resize { container } => {
                engine.set_container_size(container);
                engine.refit_if_active();
            }
        }
    }

    fn start_drag(&mut self, engine: &mut TransformEngine, position: Point) {
        engine.begin_drag(position);
        if engine.state().is_dragging {
            self.mode = GestureMode::Dragging;
            debug!("gesture: dragging");
        }
    }

    fn go_idle(&mut self, engine: &mut TransformEngine) {
        engine.end_drag();
        self.mode = GestureMode::Idle;
        debug!("gesture: idle");
    }

    fn touch_start(&mut self, engine: &mut TransformEngine, touches: &[Point]) {
        match touches {
            [single] => self.start_drag(engine, *single),
            [a, b, ..] => {
                engine.end_drag();
                let pinch = PinchState::new(*a, *b, engine.state().scale);
                self.mode = GestureMode::Pinching(pinch);
                debug!(distance = pinch.initial_distance, "gesture: pinching");
            }
            [] => {}
        }
    }

    fn touch_move(&mut self, engine: &mut TransformEngine, touches: &[Point]) {
        match (self.mode, touches) {
            (GestureMode::Dragging, [single]) => engine.drag_to(*single),
            (GestureMode::Pinching(pinch), [a, b, ..]) => {
                if let Some(ratio) = pinch.distance_ratio(*a, *b) {
                    engine.pinch_zoom(&pinch, a.midpoint(*b), ratio);
                }
            }
            _ => {}
        }
    }

    fn touch_end(&mut self, engine: &mut TransformEngine, remaining: &[Point]) {
        match self.mode {
            GestureMode::Pinching(_) if remaining.len() < 2 => self.go_idle(engine),
            GestureMode::Dragging if remaining.is_empty() => self.go_idle(engine),
            _ => {}
        }
    }
}
