use kurbo::{Point, Rect, Size};

/// Horizontal displacement a touch must travel before the gesture is treated
/// as a drag; a dominant vertical move past the same threshold is a scroll.
pub const TOUCH_AXIS_LOCK_PX: f64 = 8.0;

/// Padding used by the `Clamp` policy to keep the overlay on the wall.
pub const DRAG_CLAMP_PADDING_PX: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Whether drags may push the overlay outside the container. `Free` is the
/// documented default pending product clarification; `Clamp` keeps the whole
/// box inside the container with a fixed padding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClampPolicy {
    #[default]
    Free,
    Clamp,
}

/// Ephemeral gesture state. Exists only between gesture-start and gesture-end;
/// dropping it releases the pointer capture.
#[derive(Clone, Copy, Debug)]
pub struct DragSession {
    origin_pointer: Point,
    origin_box: Point,
}

#[derive(Clone, Copy, Debug)]
enum Phase {
    Idle,
    /// Touch landed but the axis lock has not resolved yet.
    Pending(DragSession),
    Dragging(DragSession),
    /// Touch resolved as a scroll; passthrough until the finger lifts.
    Scrolling,
}

/// New top-left for the overlay after a drag move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragUpdate {
    pub left: f64,
    pub top: f64,
}

/// Pointer gesture state machine repositioning the live overlay. Move/up
/// subscriptions are held only while a session exists and are released
/// deterministically on up/cancel.
#[derive(Debug)]
pub struct DragController {
    phase: Phase,
    policy: ClampPolicy,
}

impl DragController {
    pub fn new(policy: ClampPolicy) -> Self {
        Self {
            phase: Phase::Idle,
            policy,
        }
    }

    pub fn policy(&self) -> ClampPolicy {
        self.policy
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging(_))
    }

    /// True while the controller holds exclusive move/up subscriptions.
    pub fn has_capture(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Gesture start over the overlay. `box_origin` is the overlay's current
    /// top-left in container space. Mouse drags immediately; touch waits for
    /// the axis lock to resolve.
    pub fn pointer_down(&mut self, kind: PointerKind, pointer: Point, box_origin: Point) {
        let session = DragSession {
            origin_pointer: pointer,
            origin_box: box_origin,
        };
        self.phase = match kind {
            PointerKind::Mouse => Phase::Dragging(session),
            PointerKind::Touch => Phase::Pending(session),
        };
    }

    /// Pointer moved. Returns the overlay's new top-left while dragging,
    /// `None` otherwise (idle, still pending, or scrolling passthrough).
    pub fn pointer_move(
        &mut self,
        pointer: Point,
        container: Rect,
        overlay_size: Size,
    ) -> Option<DragUpdate> {
        match self.phase {
            Phase::Idle | Phase::Scrolling => None,
            Phase::Pending(session) => {
                let dx = (pointer.x - session.origin_pointer.x).abs();
                let dy = (pointer.y - session.origin_pointer.y).abs();
                if dy > TOUCH_AXIS_LOCK_PX && dy > dx {
                    self.phase = Phase::Scrolling;
                    return None;
                }
                if dx > TOUCH_AXIS_LOCK_PX {
                    self.phase = Phase::Dragging(session);
                    return self.apply_move(session, pointer, container, overlay_size);
                }
                None
            }
            Phase::Dragging(session) => self.apply_move(session, pointer, container, overlay_size),
        }
    }

    /// Gesture end. Returns the session's final displacement origin if a drag
    /// actually happened, so the caller can emit its drag-resolve event.
    pub fn pointer_up(&mut self) -> Option<DragSession> {
        let finished = match self.phase {
            Phase::Dragging(session) => Some(session),
            _ => None,
        };
        self.phase = Phase::Idle;
        finished
    }

    /// Cancellation (touchcancel, capture loss). Never resolves as a drag.
    pub fn pointer_cancel(&mut self) {
        self.phase = Phase::Idle;
    }

    fn apply_move(
        &self,
        session: DragSession,
        pointer: Point,
        container: Rect,
        overlay_size: Size,
    ) -> Option<DragUpdate> {
        let left = session.origin_box.x + (pointer.x - session.origin_pointer.x);
        let top = session.origin_box.y + (pointer.y - session.origin_pointer.y);

        let (left, top) = match self.policy {
            ClampPolicy::Free => (left, top),
            ClampPolicy::Clamp => (
                clamp_axis(
                    left,
                    container.x0 + DRAG_CLAMP_PADDING_PX,
                    container.x1 - DRAG_CLAMP_PADDING_PX - overlay_size.width,
                ),
                clamp_axis(
                    top,
                    container.y0 + DRAG_CLAMP_PADDING_PX,
                    container.y1 - DRAG_CLAMP_PADDING_PX - overlay_size.height,
                ),
            ),
        };

        Some(DragUpdate { left, top })
    }
}

fn clamp_axis(v: f64, min: f64, max: f64) -> f64 {
    if max < min {
        // Overlay larger than the padded container: pin to the midpoint.
        return (min + max) / 2.0;
    }
    v.clamp(min, max)
}
