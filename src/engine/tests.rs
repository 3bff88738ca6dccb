use std::cell::Cell;
use std::rc::Rc;

use glam::{Vec2, Vec3};

use super::backend::{BackendCall, HeadlessBackend};
use super::*;
use crate::assets::ManualSource;
use crate::scene::{MorphGeometry, ObjectId, RenderableObject};

#[derive(Default)]
struct Counts {
    requested: Cell<u32>,
    cancelled: Cell<u32>,
}

struct CountingScheduler(Rc<Counts>);

impl FrameScheduler for CountingScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.0.requested.set(self.0.requested.get() + 1);
        FrameRequest(u64::from(self.0.requested.get()))
    }

    fn cancel_frame(&mut self, _request: FrameRequest) {
        self.0.cancelled.set(self.0.cancelled.get() + 1);
    }
}

fn render_loop() -> RenderLoop {
    RenderLoop::new(
        Options::default(),
        Box::new(ManualSource::new()),
        Box::new(ImmediateScheduler::default()),
    )
}

fn cube(centre: Vec3, time_enabled: bool) -> RenderableObject {
    let mut geometry = MorphGeometry::from_triangles(
        vec![centre - Vec3::ONE, centre + Vec3::ONE],
        Vec::new(),
    );
    geometry.morph_targets = vec![geometry.positions.clone(), geometry.positions.clone()];
    let mut object = RenderableObject::geometry(geometry);
    object.set_time_enabled(time_enabled);
    object
}

fn scene_objects(calls: &[BackendCall]) -> Vec<Vec<ObjectId>> {
    calls
        .iter()
        .filter_map(|c| match c {
            BackendCall::Scene { objects, .. } => Some(objects.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn frame_runs_overlay_then_callbacks_then_scene() {
    let mut lp = render_loop();
    let id = lp.current_scene_mut().add_object(cube(Vec3::ZERO, false)).unwrap();
    lp.add_logo("logo.png", 32.0, 32.0);
    lp.set_container_size(300, 200);
    let _ = lp.callbacks_mut().add(move |scene| {
        if let Some(object) = scene.tree_mut().object_mut(id) {
            object.set_visibility(false);
        }
        Ok(())
    });

    let mut backend = HeadlessBackend::new(1, 1);
    lp.render_frame(0.016, &mut backend);
    let calls = backend.take_calls();
    assert_eq!(calls[0], BackendCall::Resize(300, 200));
    assert_eq!(calls[1], BackendCall::ClearDepth);
    assert_eq!(calls[2], BackendCall::Overlay(1));
    assert!(matches!(calls[3], BackendCall::Clear(_)));
    // the callback hid the object before the scene was drawn
    assert_eq!(scene_objects(&calls), vec![Vec::<ObjectId>::new()]);
    assert_eq!(lp.hud().sprites()[0].position, Vec2::new(134.0, -84.0));

    lp.render_frame(0.016, &mut backend);
    assert!(!backend.calls().contains(&BackendCall::Resize(300, 200)));
}

#[test]
fn animate_and_stop_are_idempotent() {
    let counts = Rc::new(Counts::default());
    let mut lp = RenderLoop::new(
        Options::default(),
        Box::new(ManualSource::new()),
        Box::new(CountingScheduler(Rc::clone(&counts))),
    );
    let mut backend = HeadlessBackend::new(10, 10);
    lp.animate();
    lp.animate();
    assert_eq!(counts.requested.get(), 1);
    assert!(lp.is_animating());

    lp.on_frame(&mut backend);
    assert_eq!(counts.requested.get(), 2);
    assert!(!backend.take_calls().is_empty());

    lp.stop_animate();
    lp.stop_animate();
    assert_eq!(counts.cancelled.get(), 1);
    assert!(!lp.is_animating());
    lp.on_frame(&mut backend);
    assert!(backend.calls().is_empty());
}

#[test]
fn switching_scenes_moves_camera_input() {
    let mut lp = render_loop();
    let default = lp.current_scene_id();
    let other = lp.create_scene("other", Box::new(ManualSource::new())).unwrap();
    assert!(lp.create_scene("other", Box::new(ManualSource::new())).is_none());
    assert_eq!(lp.scene_by_name("other"), Some(other));
    assert!(!lp.scene(other).unwrap().controller().is_enabled());

    lp.add_active_scene(other);
    lp.add_active_scene(other);
    assert_eq!(lp.additional_scenes(), &[other]);
    lp.set_current_scene(other);
    assert!(lp.additional_scenes().is_empty());
    assert!(lp.scene(other).unwrap().controller().is_enabled());
    assert!(!lp.scene(default).unwrap().controller().is_enabled());
    assert!(lp.is_scene_active(other));
    assert!(!lp.is_scene_active(default));

    lp.add_active_scene(default);
    lp.clear_all_active_scenes();
    assert!(!lp.is_scene_active(default));
}

#[test]
fn additional_scenes_animate_and_draw_with_current() {
    let mut lp = render_loop();
    let first = lp.current_scene_mut().add_object(cube(Vec3::ZERO, true)).unwrap();
    let other = lp.create_scene("other", Box::new(ManualSource::new())).unwrap();
    let second = lp
        .scene_mut(other)
        .unwrap()
        .add_object(cube(Vec3::splat(10.0), true))
        .unwrap();
    lp.add_active_scene(other);

    let mut backend = HeadlessBackend::new(10, 10);
    lp.render_frame(0.016, &mut backend);
    assert!((lp.current_time() - 8.0).abs() < 1e-3);
    assert!((lp.scene(other).unwrap().current_time() - 8.0).abs() < 1e-3);
    let drawn = scene_objects(&backend.take_calls());
    assert_eq!(drawn.len(), 1);
    assert!(drawn[0].contains(&first) && drawn[0].contains(&second));

    lp.set_play_animation(false);
    lp.render_frame(0.016, &mut backend);
    assert!((lp.current_time() - 8.0).abs() < 1e-3);
    lp.set_morphs_time(100.0);
    assert_eq!(lp.current_time(), 100.0);
}

#[test]
fn view_all_frames_every_active_scene() {
    let mut lp = render_loop();
    lp.view_all();
    let _ = lp.current_scene_mut().add_object(cube(Vec3::ZERO, false));
    let other = lp.create_scene("other", Box::new(ManualSource::new())).unwrap();
    let _ = lp.scene_mut(other).unwrap().add_object(cube(Vec3::splat(10.0), false));
    lp.add_active_scene(other);
    lp.view_all();
    let target = lp.current_scene().controller().current_viewport().target_position;
    assert!((target - Vec3::splat(5.0)).length() < 1e-4);
}

#[test]
fn transition_scene_flies_to_the_other_scene() {
    let mut lp = render_loop();
    let other = lp.create_scene("other", Box::new(ManualSource::new())).unwrap();
    lp.transition_scene(other, None);
    assert!(!lp.current_scene().controller().is_transitioning_camera());

    let _ = lp.scene_mut(other).unwrap().add_object(cube(Vec3::splat(20.0), false));
    lp.transition_scene(other, Some(100.0));
    assert!(lp.current_scene().controller().is_transitioning_camera());
    let mut backend = HeadlessBackend::new(10, 10);
    lp.render_frame(1.0, &mut backend);
    lp.render_frame(200.0, &mut backend);
    let viewport = lp.current_scene().controller().current_viewport();
    assert!((viewport.target_position - Vec3::splat(20.0)).length() < 1e-3);
    assert!(!lp.current_scene().controller().is_transitioning_camera());
}
