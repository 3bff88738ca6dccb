use glam::Vec3;

use super::*;
use crate::assets::{ManualHandle, ManualSource, ModelSettings};
use crate::engine::backend::{BackendCall, HeadlessBackend};

const TRIANGLE: &str = r#"{
    "vertices": [0,0,0, 1,0,0, 0,1,0],
    "faces": [0, 0,1,2],
    "morphTargets": [
        {"name": "a", "vertices": [0,0,0, 1,0,0, 0,1,0]},
        {"name": "b", "vertices": [0,0,1, 1,0,1, 0,1,1]}
    ]
}"#;

const GLYPHS: &str = r#"{
    "positions": {"0": [0,0,0, 5,0,0]},
    "axis1": {"0": [1,0,0, 1,0,0]},
    "axis2": {"0": [0,1,0, 0,1,0]},
    "axis3": {"0": [0,0,1, 0,0,1]},
    "scale": {"0": [1,1,1, 1,1,1]},
    "metadata": {"number_of_vertices": 2}
}"#;

fn composer() -> (SceneComposer, ManualHandle) {
    let source = ManualSource::new();
    let handle = source.handle();
    (SceneComposer::new(&Options::default(), Box::new(source)), handle)
}

fn times(scene: &SceneComposer) -> Vec<f32> {
    let mut out: Vec<(ObjectId, f32)> = scene
        .tree()
        .iter_objects()
        .map(|(id, o)| (id, o.current_time()))
        .collect();
    out.sort_by_key(|(id, _)| *id);
    out.into_iter().map(|(_, t)| t).collect()
}

#[test]
fn animation_waits_for_every_expected_load() {
    let (mut scene, handle) = composer();
    let urls: Vec<String> = ["a.json", "b.json", "c.json"].map(str::to_owned).to_vec();
    let settings = vec![
        ModelSettings {
            time_enabled: true,
            ..ModelSettings::default()
        };
        3
    ];
    let _ = scene.load_models_url(&urls, &settings);
    assert_eq!(scene.load_counts(), (3, 0));

    assert!(handle.complete("a.json", TRIANGLE));
    assert!(handle.complete("b.json", TRIANGLE));
    scene.render_geometries(500.0, 0.016, true);
    assert_eq!(scene.tree().object_count(), 2);
    assert_eq!(times(&scene), vec![0.0, 0.0]);
    assert!(!scene.is_ready());

    assert!(handle.complete("c.json", TRIANGLE));
    scene.render_geometries(500.0, 0.016, true);
    let after = times(&scene);
    assert_eq!(after.len(), 3);
    for t in after {
        assert!((t - 8.0).abs() < 1e-3, "time {t}");
    }
}

#[test]
fn failed_download_releases_the_gate() {
    let (mut scene, handle) = composer();
    let urls = vec!["ok.json".to_owned(), "missing.json".to_owned()];
    let _ = scene.load_models_url(&urls, &[]);
    assert!(handle.progress("ok.json", 10, 100));
    scene.poll_loads();
    assert_eq!(scene.download_progress().total, 100);

    assert!(handle.complete("ok.json", TRIANGLE));
    assert!(handle.fail("missing.json", "404"));
    scene.render_geometries(500.0, 0.016, true);
    assert!(scene.is_ready());
    assert_eq!(scene.load_counts(), (1, 1));
    assert!(scene.download_progress().errored);
    let events = scene.take_load_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, LoadEvent::Failed { url, .. } if url == "missing.json")));
}

#[test]
fn undecodable_asset_counts_as_failure() {
    let (mut scene, handle) = composer();
    let _ = scene.load_stl("broken.stl", Some("broken"));
    assert!(handle.complete("broken.stl", b"solid x\nvertex 1 2\n".to_vec()));
    scene.poll_loads();
    assert!(scene.is_ready());
    assert_eq!(scene.tree().object_count(), 0);
    assert!(scene.download_progress().errored);
}

#[test]
fn metadata_items_load_relative_to_the_document() {
    let (mut scene, handle) = composer();
    let _ = scene.load_metadata_url("models/meta.json");
    let metadata = r#"[
        {"Type": "Surfaces", "URL": "heart.json", "GroupName": "heart", "MorphVertices": true},
        {"Type": "Points", "URL": "nodes.json", "GroupName": "nodes"},
        {"Type": "View", "URL": "view.json"}
    ]"#;
    assert!(handle.complete("models/meta.json", metadata));
    scene.poll_loads();
    assert_eq!(scene.pending_loads(), 3);
    let pending: Vec<String> = handle.pending().into_iter().map(|(_, u)| u).collect();
    assert_eq!(pending, vec![
        "models/heart.json".to_owned(),
        "models/nodes.json".to_owned(),
        "models/view.json".to_owned(),
    ]);
    assert_eq!(scene.load_counts(), (2, 0));

    assert!(handle.complete("models/view.json", r#"{"eyePosition": [0, 0, 42]}"#));
    assert!(handle.complete("models/heart.json", TRIANGLE));
    assert!(handle.complete("models/nodes.json", TRIANGLE));
    scene.poll_loads();

    let heart = scene.tree().find_geometries_with_group_name(scene.root(), "heart", true);
    assert_eq!(heart.len(), 1);
    let heart = scene.tree().object(heart[0]).unwrap();
    assert!(heart.time_enabled());
    assert_eq!(heart.model_id(), Some(1000));
    assert_eq!(scene.tree().find_pointsets_with_group_name(scene.root(), "nodes", true).len(), 1);
    assert_eq!(scene.controller().current_viewport().eye_position, Vec3::new(0.0, 0.0, 42.0));

    let events = scene.take_load_events();
    assert!(events.contains(&LoadEvent::MetadataCompleted {
        url: "models/meta.json".to_owned()
    }));
    assert!(events.contains(&LoadEvent::ViewApplied {
        url: "models/view.json".to_owned()
    }));
}

#[test]
fn view_bundle_loads_numbered_models() {
    let (mut scene, handle) = composer();
    let _ = scene.load_from_view_url("data/cube");
    let view = r#"{"farPlane": 99, "numberOfResources": 2, "opacity": [0.5], "timeEnabled": [true, false]}"#;
    assert!(handle.complete("data/cube_view.json", view));
    scene.poll_loads();
    assert_eq!(scene.controller().current_viewport().far_plane, 99.0);
    let pending: Vec<String> = handle.pending().into_iter().map(|(_, u)| u).collect();
    assert_eq!(pending, vec!["data/cube_1.json".to_owned(), "data/cube_2.json".to_owned()]);

    assert!(handle.complete("data/cube_1.json", TRIANGLE));
    scene.poll_loads();
    let first = scene.geometry_by_model_id(1000).unwrap();
    let first = scene.tree().object(first).unwrap();
    assert!(first.is_transparent());
    assert!(first.time_enabled());
}

#[test]
fn obj_groups_each_complete_an_input() {
    let (mut scene, handle) = composer();
    let _ = scene.load_obj("pair.obj", None);
    let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\no left\nf 1 2 3\no right\nf 3 2 1\n";
    assert!(handle.complete("pair.obj", obj));
    scene.poll_loads();
    assert_eq!(scene.load_counts(), (2, 2));
    assert!(scene.geometry_by_model_id(1000).is_some());
    assert!(scene.geometry_by_model_id(1001).is_some());
    assert_eq!(scene.next_available_model_id(), 1002);
    let names = scene.tree().find_objects_with_group_name(scene.root(), "right", true);
    assert_eq!(names.len(), 1);
}

#[test]
fn glyphset_holds_gate_until_glyph_arrives() {
    let (mut scene, handle) = composer();
    let _ = scene.load_glyphset_url("fibres.json", "arrow.json", Some("fibres"));
    assert!(handle.complete("fibres.json", GLYPHS));
    scene.render_geometries(500.0, 0.016, true);
    assert_eq!(scene.load_counts(), (1, 1));
    assert!(!scene.is_ready());
    assert_eq!(scene.current_time(), 0.0);

    assert!(handle.complete("arrow.json", TRIANGLE));
    scene.render_geometries(500.0, 0.016, true);
    assert!(scene.is_ready());
    let bounds = scene.bounding_box().unwrap();
    assert!(bounds.max.x >= 5.0);
}

#[test]
fn missing_glyph_drops_the_glyphset() {
    let (mut scene, handle) = composer();
    let _ = scene.load_glyphset_url("fibres.json", "arrow.json", None);
    assert!(handle.complete("fibres.json", GLYPHS));
    scene.poll_loads();
    assert!(handle.fail("arrow.json", "timeout"));
    scene.poll_loads();
    assert!(scene.is_ready());
    assert_eq!(scene.tree().object_count(), 0);
}

#[test]
fn explicit_objects_never_hold_the_gate() {
    let (mut scene, _handle) = composer();
    assert_eq!(scene.current_time(), 0.0);
    let id = scene
        .add_object(RenderableObject::geometry(MorphGeometry::from_triangles(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
        )))
        .unwrap();
    assert!(scene.is_ready());
    assert!(scene.object_is_in_scene(id));
    scene.set_duration(100.0);
    assert_eq!(scene.tree().object(id).unwrap().duration(), 100.0);
    scene.set_morphs_time(40.0);
    assert_eq!(scene.current_time(), 40.0);
    assert!(scene.remove_object(id));
    assert!(!scene.remove_object(id));

    let geometry = scene
        .add_geometry(MorphGeometry::from_triangles(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
        ))
        .unwrap();
    assert!(scene.is_ready());
    assert_eq!(scene.geometry_by_model_id(1000), Some(geometry));
}

#[test]
fn view_all_frames_the_scene() {
    let (mut scene, _handle) = composer();
    scene.view_all();
    assert_eq!(scene.controller().current_viewport(), scene.controller().default_viewport());

    let _ = scene.add_object(RenderableObject::geometry(MorphGeometry::from_triangles(
        vec![Vec3::splat(-1.0), Vec3::splat(1.0)],
        Vec::new(),
    )));
    scene.view_all();
    let viewport = scene.controller().current_viewport();
    assert_eq!(viewport.target_position, Vec3::ZERO);
    let radius = 3.0_f32.sqrt();
    let expected = radius / (40.0_f32.to_radians() / 2.0).tan();
    assert!((viewport.eye_distance() - expected).abs() < 1e-3);
    assert!((viewport.far_plane - (expected + radius * 4.0)).abs() < 1e-3);
}

#[test]
fn render_clears_then_draws() {
    let (mut scene, _handle) = composer();
    let id = scene
        .add_object(RenderableObject::pointset(MorphGeometry::from_triangles(
            vec![Vec3::ZERO],
            Vec::new(),
        )))
        .unwrap();
    let mut backend = HeadlessBackend::new(200, 100);
    scene.render(&mut backend);
    let calls = backend.take_calls();
    assert!(matches!(calls[0], BackendCall::Clear(_)));
    assert!(matches!(&calls[1], BackendCall::Scene { objects, .. } if objects == &vec![id]));

    scene.set_auto_clear(false);
    scene.set_stereo_effect_enable(true);
    scene.render(&mut backend);
    let calls = backend.take_calls();
    let scenes = calls.iter().filter(|c| matches!(c, BackendCall::Scene { .. })).count();
    assert_eq!(scenes, 2);
    assert_eq!(calls[0], BackendCall::Scissor(Some(PixelRect {
        x: 0,
        y: 0,
        width: 100,
        height: 100,
    })));
    assert_eq!(calls.last(), Some(&BackendCall::Viewport(PixelRect::full(200, 100))));
}

#[test]
fn camera_path_loads_into_controller() {
    let (mut scene, handle) = composer();
    let _ = scene.load_camera_path_url("path.json");
    let path = r#"{"CameraPath": [0,0,10, 10,0,0, 0,0,-10], "NumberOfPoints": 3}"#;
    assert!(handle.complete("path.json", path));
    scene.poll_loads();
    assert_eq!(scene.controller().number_of_time_frames(), 3);
    assert!(scene.take_load_events().contains(&LoadEvent::CameraPathLoaded {
        url: "path.json".to_owned()
    }));
}
