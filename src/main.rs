//! Headless viewer: loads a metadata document, runs the render loop until
//! the scene is ready and has animated for a while, then optionally exports
//! the result as glTF.

use std::path::{Path, PathBuf};
use std::time::Duration;

use morphview::assets::FileSource;
use morphview::engine::backend::HeadlessBackend;
use morphview::engine::{ImmediateScheduler, RenderLoop};
use morphview::options::Options;
use morphview::scene::LoadStatus;
use morphview::MorphviewError;

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;
const FRAME: Duration = Duration::from_millis(16);

struct Args {
    metadata: PathBuf,
    options: Option<PathBuf>,
    export: Option<PathBuf>,
    frames: usize,
}

fn parse_args() -> Option<Args> {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        metadata: PathBuf::new(),
        options: None,
        export: None,
        frames: 120,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--options" => parsed.options = Some(args.next()?.into()),
            "--export" => parsed.export = Some(args.next()?.into()),
            "--frames" => parsed.frames = args.next()?.parse().ok()?,
            _ => parsed.metadata = arg.into(),
        }
    }
    (!parsed.metadata.as_os_str().is_empty()).then_some(parsed)
}

fn run(args: &Args) -> Result<(), MorphviewError> {
    let options = match &args.options {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    let root = args.metadata.parent().unwrap_or_else(|| Path::new("."));
    let name = args
        .metadata
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| MorphviewError::AssetFetch {
            url: args.metadata.display().to_string(),
            message: "not a file name".into(),
        })?;

    let mut render_loop = RenderLoop::new(
        options,
        Box::new(FileSource::new(root)),
        Box::new(ImmediateScheduler::default()),
    );
    let _ = render_loop.current_scene_mut().load_metadata_url(name);
    render_loop.set_container_size(WIDTH, HEIGHT);
    render_loop.add_logo("logo.png", 128.0, 64.0);

    let mut backend = HeadlessBackend::new(WIDTH, HEIGHT);
    let mut framed = false;
    let mut frames = 0;
    render_loop.animate();
    while render_loop.is_animating() {
        render_loop.on_frame(&mut backend);
        let _ = backend.take_calls();
        let scene = render_loop.current_scene_mut();
        for event in scene.take_load_events() {
            log::debug!("{event:?}");
        }
        if scene.is_ready() && scene.pending_loads() == 0 {
            if framed {
                frames += 1;
            } else {
                scene.view_all();
                framed = true;
                let (expected, completed) = scene.load_counts();
                log::info!("scene ready: {completed}/{expected} inputs");
            }
        } else if matches!(scene.load_status(), LoadStatus::Stalled) {
            log::error!("giving up on a stalled load");
            render_loop.stop_animate();
        }
        if frames >= args.frames {
            render_loop.stop_animate();
        }
        std::thread::sleep(FRAME);
    }

    let scene = render_loop.current_scene();
    let progress = scene.download_progress();
    log::info!(
        "time {:.1}, {} objects, {} bytes loaded{}, {:.0} fps",
        scene.current_time(),
        scene.tree().object_count(),
        progress.loaded,
        if progress.errored { " with errors" } else { "" },
        render_loop.fps(),
    );

    if let Some(path) = &args.export {
        let binary = path.extension().is_some_and(|ext| ext == "glb");
        let bytes = scene.export_gltf(binary)?.wait()?;
        std::fs::write(path, bytes)?;
        log::info!("exported {}", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let Some(args) = parse_args() else {
        log::error!(
            "Usage: morphview <metadata.json> [--options <file.toml>] \
             [--frames <n>] [--export <out.gltf|out.glb>]"
        );
        std::process::exit(1);
    };

    if let Err(e) = run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
