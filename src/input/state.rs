use glam::Vec2;

use super::event::{InputEvent, MouseButton, TouchPoint};

/// Active interaction driven by pointer/touch edges. Exactly one is active
/// at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionState {
    /// No interaction in progress.
    #[default]
    None,
    /// Mouse trackball rotation.
    Rotate,
    /// Mouse drag zoom.
    Zoom,
    /// Mouse pan.
    Pan,
    /// One-finger rotation.
    TouchRotate,
    /// Two-finger pinch zoom.
    TouchZoom,
    /// Three-finger pan.
    TouchPan,
    /// Wheel zoom, consumed by the next update.
    Scroll,
}

/// Mouse button to interaction mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickActions {
    left: InteractionState,
    middle: InteractionState,
    right: InteractionState,
}

impl Default for ClickActions {
    fn default() -> Self {
        Self {
            left: InteractionState::Rotate,
            middle: InteractionState::Pan,
            right: InteractionState::Zoom,
        }
    }
}

impl ClickActions {
    /// Interaction started by `button`.
    #[must_use]
    pub fn action(&self, button: MouseButton) -> InteractionState {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Middle => self.middle,
            MouseButton::Right => self.right,
        }
    }

    /// Remap `button` to start `state`.
    pub fn set(&mut self, button: MouseButton, state: InteractionState) {
        match button {
            MouseButton::Left => self.left = state,
            MouseButton::Middle => self.middle = state,
            MouseButton::Right => self.right = state,
        }
    }
}

/// What the host should do after an input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputResponse {
    /// Input is disabled; the event was dropped.
    Ignored,
    /// State updated; nothing further to do.
    Handled,
    /// Released without moving: the host may pick at this position.
    Pick {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },
}

/// Pointer and touch tracking for the camera controller.
///
/// Events only record positions and switch the interaction state; the
/// camera itself moves in the controller's per-frame update, which reads
/// `previous -> pointer` motion and then syncs `previous`.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    state: InteractionState,
    pointer: Vec2,
    previous: Vec2,
    start: Vec2,
    touch_zoom_start: f32,
    touch_zoom_end: f32,
    target_touch_id: Option<u64>,
    mouse_scroll: f32,
}

fn touch_distance(a: &TouchPoint, b: &TouchPoint) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

impl PointerTracker {
    /// Current interaction state.
    #[must_use]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Latest pointer position.
    #[must_use]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Pointer position at the last camera update.
    #[must_use]
    pub fn previous(&self) -> Vec2 {
        self.previous
    }

    /// Touch id followed by a three-finger pan.
    #[must_use]
    pub fn target_touch_id(&self) -> Option<u64> {
        self.target_touch_id
    }

    /// Accumulated, not yet applied wheel zoom.
    #[must_use]
    pub fn mouse_scroll(&self) -> f32 {
        self.mouse_scroll
    }

    fn begin_at(&mut self, x: f32, y: f32) {
        self.pointer = Vec2::new(x, y);
        self.start = self.pointer;
        self.previous = self.pointer;
    }

    /// Apply one event.
    pub fn handle_event(
        &mut self,
        event: &InputEvent,
        actions: &ClickActions,
        scroll_rate: f32,
    ) -> InputResponse {
        match event {
            InputEvent::PointerDown { button, x, y } => {
                self.state = actions.action(*button);
                self.begin_at(*x, *y);
            }
            InputEvent::PointerMove { x, y } => {
                self.pointer = Vec2::new(*x, *y);
            }
            InputEvent::PointerUp { x, y } => {
                self.state = InteractionState::None;
                if self.start == Vec2::new(*x, *y) {
                    return InputResponse::Pick { x: *x, y: *y };
                }
            }
            InputEvent::PointerLeave => {
                self.state = InteractionState::None;
            }
            InputEvent::Wheel { delta_y } => {
                self.state = InteractionState::Scroll;
                if *delta_y > 0.0 {
                    self.mouse_scroll += scroll_rate;
                } else if *delta_y < 0.0 {
                    self.mouse_scroll -= scroll_rate;
                }
            }
            InputEvent::TouchStart { touches } => self.touch_start(touches),
            InputEvent::TouchMove { touches } => self.touch_move(touches),
            InputEvent::TouchEnd { .. } => {
                let tapped = self.state == InteractionState::TouchRotate
                    && self.pointer == self.start;
                self.touch_zoom_start = 0.0;
                self.touch_zoom_end = 0.0;
                self.target_touch_id = None;
                self.state = InteractionState::None;
                if tapped {
                    return InputResponse::Pick {
                        x: self.start.x,
                        y: self.start.y,
                    };
                }
            }
        }
        InputResponse::Handled
    }

    fn touch_start(&mut self, touches: &[TouchPoint]) {
        match touches {
            [one] => {
                self.state = InteractionState::TouchRotate;
                self.begin_at(one.x, one.y);
            }
            [a, b] => {
                self.state = InteractionState::TouchZoom;
                let distance = touch_distance(a, b);
                self.touch_zoom_start = distance;
                self.touch_zoom_end = distance;
            }
            [first, _, _] => {
                self.state = InteractionState::TouchPan;
                self.target_touch_id = Some(first.id);
                self.pointer = Vec2::new(first.x, first.y);
                self.previous = self.pointer;
            }
            _ => {}
        }
    }

    fn touch_move(&mut self, touches: &[TouchPoint]) {
        match touches {
            [one] => self.pointer = Vec2::new(one.x, one.y),
            [a, b] if self.state == InteractionState::TouchZoom => {
                self.touch_zoom_end = touch_distance(a, b);
            }
            [_, _, _] if self.state == InteractionState::TouchPan => {
                if let Some(tracked) = touches
                    .iter()
                    .find(|t| Some(t.id) == self.target_touch_id)
                {
                    self.pointer = Vec2::new(tracked.x, tracked.y);
                }
            }
            _ => {}
        }
    }

    /// Record that the camera has consumed motion up to the current
    /// pointer.
    pub(crate) fn sync_previous(&mut self) {
        self.previous = self.pointer;
    }

    /// Zoom amount for the active zoom-like state, consuming pinch motion.
    pub(crate) fn take_zoom_delta(&mut self) -> f32 {
        match self.state {
            InteractionState::Zoom => self.previous.y - self.pointer.y,
            InteractionState::Scroll => self.mouse_scroll,
            _ => {
                let delta = -(self.touch_zoom_end - self.touch_zoom_start);
                self.touch_zoom_start = self.touch_zoom_end;
                delta
            }
        }
    }

    /// Bookkeeping after a zoom step has been applied.
    pub(crate) fn finish_zoom(&mut self) {
        match self.state {
            InteractionState::Zoom => self.sync_previous(),
            InteractionState::Scroll => self.mouse_scroll = 0.0,
            _ => {}
        }
    }

    /// A wheel interaction lasts a single update.
    pub(crate) fn end_scroll(&mut self) {
        if self.state == InteractionState::Scroll {
            self.state = InteractionState::None;
        }
    }

    /// Drop any interaction in progress.
    pub(crate) fn reset(&mut self) {
        self.state = InteractionState::None;
        self.mouse_scroll = 0.0;
        self.touch_zoom_start = 0.0;
        self.touch_zoom_end = 0.0;
        self.target_touch_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(id: u64, x: f32, y: f32) -> TouchPoint {
        TouchPoint { id, x, y }
    }

    fn handle(tracker: &mut PointerTracker, event: InputEvent) -> InputResponse {
        tracker.handle_event(&event, &ClickActions::default(), 50.0)
    }

    #[test]
    fn buttons_map_to_default_actions() {
        let mut t = PointerTracker::default();
        let _ = handle(&mut t, InputEvent::PointerDown {
            button: MouseButton::Middle,
            x: 1.0,
            y: 2.0,
        });
        assert_eq!(t.state(), InteractionState::Pan);
        assert_eq!(t.previous(), Vec2::new(1.0, 2.0));
        let _ = handle(&mut t, InputEvent::PointerLeave);
        assert_eq!(t.state(), InteractionState::None);
    }

    #[test]
    fn release_at_start_requests_pick() {
        let mut t = PointerTracker::default();
        let down = InputEvent::PointerDown {
            button: MouseButton::Left,
            x: 5.0,
            y: 6.0,
        };
        let _ = handle(&mut t, down.clone());
        assert_eq!(
            handle(&mut t, InputEvent::PointerUp { x: 5.0, y: 6.0 }),
            InputResponse::Pick { x: 5.0, y: 6.0 }
        );

        let _ = handle(&mut t, down);
        let _ = handle(&mut t, InputEvent::PointerMove { x: 9.0, y: 6.0 });
        assert_eq!(
            handle(&mut t, InputEvent::PointerUp { x: 9.0, y: 6.0 }),
            InputResponse::Handled
        );
    }

    #[test]
    fn wheel_accumulates_by_sign() {
        let mut t = PointerTracker::default();
        let _ = handle(&mut t, InputEvent::Wheel { delta_y: 3.5 });
        let _ = handle(&mut t, InputEvent::Wheel { delta_y: 0.2 });
        assert_eq!(t.state(), InteractionState::Scroll);
        assert_eq!(t.mouse_scroll(), 100.0);
        assert_eq!(t.take_zoom_delta(), 100.0);
        t.finish_zoom();
        t.end_scroll();
        assert_eq!(t.mouse_scroll(), 0.0);
        assert_eq!(t.state(), InteractionState::None);
    }

    #[test]
    fn pinch_reports_distance_change_once() {
        let mut t = PointerTracker::default();
        let _ = handle(&mut t, InputEvent::TouchStart {
            touches: vec![touch(1, 0.0, 0.0), touch(2, 30.0, 40.0)],
        });
        assert_eq!(t.state(), InteractionState::TouchZoom);
        let _ = handle(&mut t, InputEvent::TouchMove {
            touches: vec![touch(1, 0.0, 0.0), touch(2, 60.0, 80.0)],
        });
        assert_eq!(t.take_zoom_delta(), -50.0);
        assert_eq!(t.take_zoom_delta(), 0.0);
    }

    #[test]
    fn three_finger_pan_follows_captured_touch() {
        let mut t = PointerTracker::default();
        let _ = handle(&mut t, InputEvent::TouchStart {
            touches: vec![touch(7, 10.0, 10.0), touch(8, 0.0, 0.0), touch(9, 5.0, 5.0)],
        });
        assert_eq!(t.target_touch_id(), Some(7));
        let _ = handle(&mut t, InputEvent::TouchMove {
            touches: vec![touch(8, 1.0, 1.0), touch(7, 20.0, 25.0), touch(9, 5.0, 5.0)],
        });
        assert_eq!(t.pointer(), Vec2::new(20.0, 25.0));
        let _ = handle(&mut t, InputEvent::TouchEnd { touches: vec![] });
        assert_eq!(t.target_touch_id(), None);
        assert_eq!(t.state(), InteractionState::None);
    }

    #[test]
    fn remapped_button_changes_action() {
        let mut actions = ClickActions::default();
        actions.set(MouseButton::Left, InteractionState::Zoom);
        assert_eq!(actions.action(MouseButton::Left), InteractionState::Zoom);
        assert_eq!(actions.action(MouseButton::Right), InteractionState::Zoom);
    }
}
