/// Platform-agnostic pointer, touch and wheel events.
///
/// Coordinates are relative to the drawing surface's top-left corner, in
/// the same pixel units as the size passed to
/// [`CameraController::on_resize`](crate::camera::CameraController::on_resize).
///
/// # Example
///
/// ```ignore
/// let response = controller.handle_event(&InputEvent::PointerDown {
///     button: MouseButton::Left,
///     x: 100.0,
///     y: 200.0,
/// });
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse button pressed.
    PointerDown {
        /// Which button was pressed.
        button: MouseButton,
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },
    /// Pointer moved to an absolute position.
    PointerMove {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },
    /// Mouse button released.
    PointerUp {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },
    /// Pointer left the drawing surface.
    PointerLeave,
    /// Scroll wheel; only the sign of `delta_y` is used.
    Wheel {
        /// Vertical scroll delta (positive = away from the user).
        delta_y: f32,
    },
    /// Fingers touched down; `touches` lists every active touch.
    TouchStart {
        /// All touches currently on the surface.
        touches: Vec<TouchPoint>,
    },
    /// Active touches moved.
    TouchMove {
        /// All touches currently on the surface.
        touches: Vec<TouchPoint>,
    },
    /// A touch lifted; `touches` lists the remaining ones.
    TouchEnd {
        /// Touches still on the surface.
        touches: Vec<TouchPoint>,
    },
}

/// One active touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Host-assigned identifier, stable for the lifetime of the touch.
    pub id: u64,
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

/// Platform-agnostic mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) mouse button.
    Left,
    /// Middle mouse button (wheel click).
    Middle,
    /// Secondary (right) mouse button.
    Right,
}
