//! The seam between the scene layer and whatever actually draws.
//!
//! Scenes hand a [`RenderBackend`] fully resolved frames: camera matrices,
//! the light, and every visible object with its world transform. The
//! backend owns GPU resources and pixel output.

use glam::Mat4;

use super::hud::HudSprite;
use crate::camera::{CameraView, DirectionalLight};
use crate::scene::object::{ObjectId, RenderableObject};

/// Pixel rectangle with a bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Bottom edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Rectangle covering a `width` x `height` target.
    #[must_use]
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// One visible object and where it sits in the world.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    /// Object handle, for picking round-trips.
    pub id: ObjectId,
    /// Object state at this frame.
    pub object: &'a RenderableObject,
    /// Region-to-world transform.
    pub world: Mat4,
}

/// Everything needed to draw one scene from one camera.
#[derive(Debug, Clone)]
pub struct SceneFrame<'a> {
    /// Camera matrices for this pass.
    pub camera: CameraView,
    /// Headlight following the camera.
    pub light: DirectionalLight,
    /// Visible objects.
    pub items: Vec<DrawItem<'a>>,
}

/// Drawing target driven by the render loop.
pub trait RenderBackend {
    /// Current drawable size in pixels.
    fn size(&self) -> (u32, u32);

    /// Resize the drawable.
    fn set_size(&mut self, width: u32, height: u32);

    /// Clear colour and depth.
    fn clear(&mut self, colour: [f32; 4]);

    /// Clear depth only, so later draws sit on top.
    fn clear_depth(&mut self);

    /// Restrict drawing to `rect`, or lift the restriction with `None`.
    fn set_scissor(&mut self, rect: Option<PixelRect>);

    /// Map normalized device coordinates onto `rect`.
    fn set_viewport(&mut self, rect: PixelRect);

    /// Draw one scene pass.
    fn draw_scene(&mut self, frame: &SceneFrame<'_>);

    /// Draw screen-space sprites with an orthographic projection.
    fn draw_overlay(&mut self, projection: Mat4, sprites: &[HudSprite]);
}

/// A backend call, as recorded by [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// [`RenderBackend::set_size`].
    Resize(u32, u32),
    /// [`RenderBackend::clear`].
    Clear([f32; 4]),
    /// [`RenderBackend::clear_depth`].
    ClearDepth,
    /// [`RenderBackend::set_scissor`].
    Scissor(Option<PixelRect>),
    /// [`RenderBackend::set_viewport`].
    Viewport(PixelRect),
    /// [`RenderBackend::draw_scene`] with the pass's eye position and the
    /// drawn object ids.
    Scene {
        /// Camera eye for the pass.
        eye: glam::Vec3,
        /// Objects drawn, in draw order.
        objects: Vec<ObjectId>,
    },
    /// [`RenderBackend::draw_overlay`] with the sprite count.
    Overlay(usize),
}

/// Backend with no output that records every call. Used for headless
/// runs and for checking frame ordering.
#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
    width: u32,
    height: u32,
    calls: Vec<BackendCall>,
}

impl HeadlessBackend {
    /// Backend reporting a `width` x `height` drawable.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    /// Calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Take and clear the recorded calls.
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }
}

impl RenderBackend for HeadlessBackend {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.calls.push(BackendCall::Resize(width, height));
    }

    fn clear(&mut self, colour: [f32; 4]) {
        self.calls.push(BackendCall::Clear(colour));
    }

    fn clear_depth(&mut self) {
        self.calls.push(BackendCall::ClearDepth);
    }

    fn set_scissor(&mut self, rect: Option<PixelRect>) {
        self.calls.push(BackendCall::Scissor(rect));
    }

    fn set_viewport(&mut self, rect: PixelRect) {
        self.calls.push(BackendCall::Viewport(rect));
    }

    fn draw_scene(&mut self, frame: &SceneFrame<'_>) {
        self.calls.push(BackendCall::Scene {
            eye: frame.camera.eye,
            objects: frame.items.iter().map(|item| item.id).collect(),
        });
    }

    fn draw_overlay(&mut self, _projection: Mat4, sprites: &[HudSprite]) {
        self.calls.push(BackendCall::Overlay(sprites.len()));
    }
}
