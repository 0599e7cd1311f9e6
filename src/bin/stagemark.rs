use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use stagemark::headless::{HeadlessFactory, HeadlessMenu, HeadlessPlatform};
use stagemark::{
    BenchConfig, Button, Controller, ControllerState, FractalJob, MandelbrotKernel, RasterImage,
    SystemClock, Viewport, WorkerPool,
};

/// Pacing of the headless frame loop.
const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

#[derive(Parser, Debug)]
#[command(name = "stagemark", version)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the benchmark headless and print the scores.
    Run(RunArgs),
    /// Compute zooming Mandelbrot frames with the worker pool and save the last one as PNG.
    Fractal(FractalArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Only run the CPU stage.
    #[arg(long)]
    cpu_only: bool,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Configuration JSON; defaults apply to anything missing.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the score report JSON here once the run finishes.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Cap every stage's configured duration, in seconds.
    #[arg(long)]
    max_seconds: Option<f32>,
}

#[derive(Parser, Debug)]
struct FractalArgs {
    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Worker threads; 0 uses the available parallelism.
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Frames to compute, zooming in each frame.
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Fractal(args) => cmd_fractal(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>, max_seconds: Option<f32>) -> anyhow::Result<BenchConfig> {
    let mut config = match path {
        Some(p) => BenchConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => BenchConfig::default(),
    };
    if let Some(cap) = max_seconds {
        anyhow::ensure!(cap > 0.0, "--max-seconds must be positive");
        for d in [
            &mut config.fractal.duration_secs,
            &mut config.fillrate.duration_secs,
            &mut config.chessboard.duration_secs,
            &mut config.physics.duration_secs,
        ] {
            *d = d.min(cap);
        }
    }
    Ok(config)
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref(), args.max_seconds)?;
    let viewport = Viewport::new(args.width, args.height)?;

    let mut factory = HeadlessFactory::new();
    let mut ctl = Controller::standard(
        config,
        &mut factory,
        Box::new(HeadlessMenu::new()),
        Box::new(HeadlessPlatform::new()),
        Box::new(SystemClock),
    )?;
    ctl.init(viewport)?;

    let selection = if args.cpu_only {
        Button::CpuTest
    } else {
        Button::FullTest
    };
    ctl.button_pressed(Button::Start)?;
    let mut started = false;
    let wall = Instant::now();
    loop {
        let frame_start = Instant::now();
        ctl.draw().context("benchmark frame failed")?;
        match ctl.state() {
            ControllerState::StartMenu if !started => {
                ctl.button_pressed(selection)?;
                started = ctl.state() == ControllerState::Starting;
            }
            ControllerState::Finished if started => break,
            _ => {}
        }
        if let Some(rest) = FRAME_INTERVAL.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    let scores = ctl.scores().context("run finished without scores")?;
    for (name, data) in ctl.stage_results() {
        println!(
            "{name:<12} score {:>7}  fps {:>7.1}  load {:.3}s",
            data.score, data.fps, data.load_time
        );
    }
    if !args.cpu_only {
        println!("overall: {}", scores.overall);
    }
    println!("cpu: {}", scores.cpu);
    if !args.cpu_only {
        println!("fill rate: {}", scores.fill_rate);
    }
    println!("load time: {}", scores.load_time);
    tracing::info!(secs = wall.elapsed().as_secs_f32(), "run complete");

    if let Some(path) = &args.report {
        let json = ctl.report()?.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("write report '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_fractal(args: FractalArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.frames > 0, "--frames must be at least 1");
    let cfg = stagemark::config::FractalConfig {
        workers: args.workers,
        ..Default::default()
    };
    let mut pool = WorkerPool::spawn(
        MandelbrotKernel::new(cfg.initial_iterations),
        args.width,
        args.height,
        cfg.worker_count(),
    )?;

    let mut raster = RasterImage::new(args.width, args.height);
    let mut scale = 1.0f64;
    let mut iterations = cfg.initial_iterations;
    let started = Instant::now();
    for _ in 0..args.frames {
        let job = FractalJob::centered(
            cfg.target_re,
            cfg.target_im,
            cfg.initial_re_width * scale,
            args.width,
            args.height,
            iterations,
        );
        pool.dispatch(job)?;
        let report = pool.join().context("worker pool stopped")?;
        tracing::debug!(frame = report.frame, secs = report.compute_secs, "frame computed");
        scale *= cfg.zoom_factor;
        iterations += cfg.iteration_increment;
    }
    pool.copy_frame_into(&mut raster)?;
    pool.shutdown();
    eprintln!(
        "computed {} frame(s) in {:.3}s",
        args.frames,
        started.elapsed().as_secs_f32()
    );

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &raster.to_rgba8(),
        raster.width,
        raster.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
