use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scrollseq::{
    HeadlessHost, HostEvent, HostMetrics, PlayerOpts, ScrollSequencePlayer, SequenceConfig,
    SurfaceSize, ThreadedLoader, ViewportGeometry,
};

#[derive(Parser, Debug)]
#[command(name = "scrollseq", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the asset path of every frame, one per line.
    Paths(PathsArgs),
    /// Render the frame shown at a given scroll progress as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct PathsArgs {
    /// Sequence config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Sequence config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory that frame paths are resolved against.
    #[arg(long)]
    assets: PathBuf,

    /// Scroll-through progress in [0, 1].
    #[arg(long, default_value_t = 0.0)]
    progress: f64,

    /// Surface width in pixels.
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Surface (and viewport) height in pixels.
    #[arg(long, default_value_t = 360)]
    height: u32,

    /// Give up when no frame finishes loading for this many seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Paths(args) => cmd_paths(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<SequenceConfig> {
    let Some(path) = path else {
        return Ok(SequenceConfig::default());
    };
    SequenceConfig::from_json_file(path)
        .with_context(|| format!("load sequence config '{}'", path.display()))
}

fn cmd_paths(args: PathsArgs) -> anyhow::Result<()> {
    let cfg = read_config(args.config.as_deref())?;
    for frame in cfg.frame_range()?.iter() {
        println!("{}", cfg.frame_path(frame));
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    if !args.progress.is_finite() || !(0.0..=1.0).contains(&args.progress) {
        anyhow::bail!("--progress must be within [0, 1]");
    }
    let cfg = read_config(args.config.as_deref())?;

    let viewport = f64::from(args.height);
    let container = cfg.container_height_for(viewport);
    let geometry =
        ViewportGeometry::scrolled(args.progress * (container - viewport), container, viewport);

    let mut loader = ThreadedLoader::new(&args.assets, None)?;
    let mut host = HeadlessHost::new();
    let mut player = ScrollSequencePlayer::new(PlayerOpts::default());
    player.mount(
        cfg,
        HostMetrics {
            geometry,
            surface_box: SurfaceSize::new(args.width, args.height),
        },
        &mut host,
        &mut loader,
    )?;

    let timeout = Duration::from_secs(args.timeout_secs);
    while loader.in_flight() > 0 {
        let ev = loader
            .wait_next(timeout)
            .context("timed out waiting for frames to load")?;
        player.on_load_event(ev)?;
    }
    while player.needs_tick() {
        player.handle_event(HostEvent::AnimationFrame)?;
    }

    let stats = player.stats();
    tracing::info!(
        loaded = player.loading_percent(),
        failures = stats.decode_failures,
        redraws = stats.redraws,
        "sequence settled"
    );

    let current = player.current_frame().context("player is not mounted")?;
    let surface = player.surface().context("player is not mounted")?;
    match surface.last_drawn() {
        Some(drawn) if drawn != current => {
            tracing::warn!(
                wanted = current.0,
                shown = drawn.0,
                "frame unavailable, writing the last drawn frame"
            );
        }
        Some(_) => {}
        None => anyhow::bail!("no frame could be drawn (frame {} not loaded)", current.0),
    }
    let snapshot = surface
        .snapshot()
        .context("surface has no area")?
        .into_straight();

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &snapshot.data,
        snapshot.width,
        snapshot.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    player.unmount(&mut host);
    eprintln!("wrote {} (frame {})", args.out.display(), current.0);
    Ok(())
}
