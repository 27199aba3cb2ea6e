//! Command-line entry points: timed capture sessions, standalone analysis,
//! the combined detector, and a device probe.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use vibe_check::analyzer::{AnalysisReport, SequenceSummary, VibeAnalyzer, VibeVerdict};
use vibe_check::capture::{self, CaptureSource, PatternSource, ScreenSource};
use vibe_check::config::{load_json_config, save_json_config, AnalyzerConfig};
use vibe_check::error::VibeError;
use vibe_check::recorder::{record, SessionConfig};

#[derive(Parser)]
#[command(
    name = "vibe-check",
    version,
    about = "Captures frames on a timer and asks a vision API whether the person in them is vibing"
)]
struct Cli {
    /// Analyzer config file (JSON); vibe-check.json is picked up when present
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Capture desktop screenshots at a fixed interval
    Screen(ScreenArgs),
    /// Capture webcam frames at a fixed interval
    Camera(CameraArgs),
    /// Analyze existing images with the vision API
    Analyze(AnalyzeArgs),
    /// Capture from the webcam, then ask for a vibe verdict
    Detect(DetectArgs),
    /// Check capture devices and write a probe frame
    Probe(ProbeArgs),
    /// Write a default analyzer config file
    InitConfig,
}

#[derive(Args)]
struct ScreenArgs {
    /// Recording duration in seconds
    #[arg(long, default_value_t = 5.0)]
    duration: f64,
    /// Time between captures in seconds
    #[arg(long, default_value_t = 1.0)]
    interval: f64,
    /// Directory to save images
    #[arg(long, default_value = "screenshots")]
    output_dir: PathBuf,
}

#[derive(Args)]
struct CameraArgs {
    /// Recording duration in seconds
    #[arg(long, default_value_t = 5.0)]
    duration: f64,
    /// Time between captures in seconds
    #[arg(long, default_value_t = 1.0)]
    interval: f64,
    /// Directory to save images
    #[arg(long, default_value = "camera_images")]
    output_dir: PathBuf,
    /// Camera device index
    #[arg(long, default_value_t = 0)]
    camera: i32,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Images to analyze, in chronological order
    #[arg(required = true, value_name = "IMAGE")]
    images: Vec<PathBuf>,
    /// Analyze frames individually instead of comparing across time
    #[arg(long)]
    no_temporal: bool,
    #[command(flatten)]
    api: ApiArgs,
}

#[derive(Args)]
struct DetectArgs {
    /// Recording duration in seconds
    #[arg(long, default_value_t = 10.0)]
    duration: f64,
    /// Time between captures in seconds
    #[arg(long, default_value_t = 1.0)]
    interval: f64,
    /// Directory to save images
    #[arg(long, default_value = "vibe_images")]
    output_dir: PathBuf,
    /// Camera device index
    #[arg(long, default_value_t = 0)]
    camera: i32,
    /// Analyze frames individually instead of comparing across time
    #[arg(long)]
    no_temporal: bool,
    #[command(flatten)]
    api: ApiArgs,
}

#[derive(Args)]
struct ApiArgs {
    /// API key for the vision service
    #[arg(long, env = "VIBE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Override the configured endpoint base URL
    #[arg(long)]
    base_url: Option<String>,
    /// Override the configured model
    #[arg(long)]
    model: Option<String>,
}

#[derive(Args)]
struct ProbeArgs {
    /// Use the synthetic pattern source instead of real hardware
    #[arg(long)]
    pattern: bool,
    /// Camera device index to try first
    #[arg(long, default_value_t = 0)]
    camera: i32,
    /// Where to write the probe frame
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        if matches!(
            err.downcast_ref::<VibeError>(),
            Some(VibeError::MissingApiKey)
        ) {
            eprintln!();
            eprintln!("Please either:");
            eprintln!("  1. Set the VIBE_API_KEY environment variable:");
            eprintln!("     export VIBE_API_KEY='your-api-key-here'");
            eprintln!("  2. Pass it as an argument:");
            eprintln!("     vibe-check detect --api-key 'your-api-key-here'");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Screen(args) => run_screen(args).await,
        Command::Camera(args) => run_camera(args).await,
        Command::Analyze(args) => {
            let config = load_analyzer_config(cli.config.as_deref());
            run_analyze(args, config).await
        }
        Command::Detect(args) => {
            let config = load_analyzer_config(cli.config.as_deref());
            run_detect(args, config).await
        }
        Command::Probe(args) => run_probe(args),
        Command::InitConfig => run_init_config(cli.config.as_deref()),
    }
}

// ── Config ──────────────────────────────────────────────────

const DEFAULT_CONFIG_FILE: &str = "vibe-check.json";

/// Explicit `--config` wins; otherwise `vibe-check.json` is picked up when
/// it exists, and built-in defaults apply when it does not.
fn load_analyzer_config(path: Option<&Path>) -> AnalyzerConfig {
    match path {
        Some(path) => load_json_config(path, "Analyzer"),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                load_json_config(default_path, "Analyzer")
            } else {
                AnalyzerConfig::default()
            }
        }
    }
}

fn run_init_config(path: Option<&Path>) -> anyhow::Result<()> {
    let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    if path.exists() {
        anyhow::bail!("Config file already exists: {}", path.display());
    }
    save_json_config(path, &AnalyzerConfig::default(), "Analyzer")?;
    println!("Wrote default config to {}", path.display());
    println!("Set the API key there or via the VIBE_API_KEY environment variable.");
    Ok(())
}

// ── Capture commands ────────────────────────────────────────

fn session(output_dir: PathBuf, duration_secs: f64, interval_secs: f64) -> anyhow::Result<SessionConfig> {
    let duration = Duration::try_from_secs_f64(duration_secs)
        .map_err(|_| VibeError::Config(format!("Invalid duration: {duration_secs}")))?;
    let interval = Duration::try_from_secs_f64(interval_secs)
        .map_err(|_| VibeError::Config(format!("Invalid interval: {interval_secs}")))?;
    let config = SessionConfig::new(output_dir, duration, interval);
    config.validate()?;
    Ok(config)
}

async fn run_screen(args: ScreenArgs) -> anyhow::Result<()> {
    let config = session(args.output_dir, args.duration, args.interval)?;
    let mut source = ScreenSource::primary()?;
    let (width, height) = source.resolution()?;
    println!(
        "Starting screen capture ({}x{} primary monitor): {:.0}s at {:.1}s intervals",
        width, height, args.duration, args.interval
    );

    let frames = record(&mut source, &config).await?;
    print_session_summary(&frames, &config);
    Ok(())
}

async fn run_camera(args: CameraArgs) -> anyhow::Result<()> {
    let config = session(args.output_dir, args.duration, args.interval)?;
    println!(
        "Starting camera capture: {:.0}s at {:.1}s intervals",
        args.duration, args.interval
    );

    let mut source = open_camera_source(args.camera)?;
    let frames = record(&mut *source, &config).await?;
    print_session_summary(&frames, &config);
    Ok(())
}

#[cfg(feature = "camera")]
fn open_camera_source(index: i32) -> anyhow::Result<Box<dyn CaptureSource>> {
    Ok(Box::new(vibe_check::capture::CameraSource::open(index)?))
}

#[cfg(not(feature = "camera"))]
fn open_camera_source(_index: i32) -> anyhow::Result<Box<dyn CaptureSource>> {
    anyhow::bail!("Webcam capture requires the `camera` build feature (cargo build --features camera)")
}

fn print_session_summary(frames: &[PathBuf], config: &SessionConfig) {
    println!("{}", "-".repeat(50));
    println!("Recording complete!");
    println!("Total captures: {}", frames.len());
    let dir = std::fs::canonicalize(&config.output_dir)
        .unwrap_or_else(|_| config.output_dir.clone());
    println!("Images saved to: {}", dir.display());

    if !frames.is_empty() {
        println!("\nCaptured files:");
        for (i, path) in frames.iter().enumerate() {
            println!("  {}. {}", i + 1, path.display());
        }
    }
}

// ── Analysis commands ───────────────────────────────────────

fn build_analyzer(api: &ApiArgs, file_config: AnalyzerConfig) -> anyhow::Result<VibeAnalyzer> {
    let api_key = api.api_key.clone().or_else(|| file_config.resolve_api_key());
    let base_url = api.base_url.clone().or(file_config.base_url);
    let model = api.model.clone().unwrap_or(file_config.model);
    Ok(VibeAnalyzer::new(api_key, base_url, Some(model))?)
}

async fn run_analyze(args: AnalyzeArgs, file_config: AnalyzerConfig) -> anyhow::Result<()> {
    for image in &args.images {
        if !image.exists() {
            anyhow::bail!("Image not found: {}", image.display());
        }
    }
    let analyzer = build_analyzer(&args.api, file_config)?;

    if args.images.len() == 1 {
        println!("Analyzing: {}", args.images[0].display());
        let verdict = analyzer.analyze_image(&args.images[0]).await?;
        print_single(&verdict);
        return Ok(());
    }

    let report = analyzer.analyze(&args.images, !args.no_temporal).await?;
    print_report(&report, args.images.len());
    Ok(())
}

async fn run_detect(args: DetectArgs, file_config: AnalyzerConfig) -> anyhow::Result<()> {
    let analyzer = build_analyzer(&args.api, file_config)?;

    println!("\n{}", "🎵 ".repeat(20));
    println!("VIBE DETECTOR - Checking if you're vibing to the music!");
    println!("{}\n", "🎵 ".repeat(20));

    let config = session(args.output_dir, args.duration, args.interval)?;

    println!("Step 1: Capturing images from camera...");
    println!("  Duration: {} seconds", args.duration);
    println!("  Interval: {} second(s)", args.interval);
    println!("  Expected captures: {}\n", config.expected_captures());

    let mut source = open_camera_source(args.camera)?;
    let frames = record(&mut *source, &config).await?;

    if frames.is_empty() {
        anyhow::bail!("No images were captured");
    }
    println!("\n✓ Successfully captured {} images\n", frames.len());

    println!("Step 2: Analyzing images with the vision API...");
    let report = analyzer.analyze(&frames, !args.no_temporal).await?;
    print_report(&report, frames.len());

    println!("\n✓ Vibe detection complete!");
    let vibing = match &report {
        AnalysisReport::Temporal(verdict) => verdict.is_vibing,
        AnalysisReport::PerFrame(summary) => summary.overall_vibing,
    };
    if vibing {
        println!("\n🎉 🎊 🎉 Keep vibing! 🎉 🎊 🎉");
    } else {
        println!("\n💡 Tip: Try moving more energetically to the music!");
    }
    Ok(())
}

fn print_single(verdict: &VibeVerdict) {
    println!(
        "\nResult: {}",
        if verdict.is_vibing { "VIBING!" } else { "Not vibing" }
    );
    println!("Confidence: {}%", verdict.confidence);
    println!("Description: {}", verdict.description);
}

fn print_report(report: &AnalysisReport, total_frames: usize) {
    match report {
        AnalysisReport::Temporal(verdict) => print_temporal(verdict, total_frames),
        AnalysisReport::PerFrame(summary) => print_summary(summary),
    }
}

fn print_temporal(verdict: &VibeVerdict, total_frames: usize) {
    let line = "=".repeat(60);
    println!("{line}");
    println!("TEMPORAL VIBE ANALYSIS");
    println!("{line}");
    println!("Images analyzed: {total_frames}");
    println!(
        "Vibing detected: {}",
        if verdict.is_vibing { "YES" } else { "NO" }
    );
    println!("Confidence: {}%", verdict.confidence);
    println!(
        "Movement detected: {}",
        if verdict.movement_detected { "YES" } else { "NO" }
    );
    println!("Energy level: {}", verdict.energy_level);
    println!("\nAnalysis: {}", verdict.description);
    println!(
        "\n{}",
        if verdict.is_vibing {
            "🎉 PERSON IS VIBING!"
        } else {
            "😐 Not really vibing"
        }
    );
    println!("{line}\n");
}

fn print_summary(summary: &SequenceSummary) {
    let line = "=".repeat(60);
    println!("{line}");
    println!("VIBE ANALYSIS SUMMARY");
    println!("{line}");
    println!("Total images analyzed: {}", summary.total_images);
    println!("Images showing vibing: {}", summary.vibing_images);
    println!("Vibing percentage: {:.1}%", summary.vibing_percentage);
    println!("Average confidence: {:.1}%", summary.average_confidence);

    println!("\nPer-frame results:");
    for (i, frame) in summary.frames.iter().enumerate() {
        let verdict = &frame.verdict;
        println!(
            "  [{}/{}] {} ({}%)  {}",
            i + 1,
            summary.total_images,
            if verdict.is_vibing { "VIBING" } else { "not vibing" },
            verdict.confidence,
            verdict.description
        );
    }

    println!(
        "\nOverall verdict: {}",
        if summary.overall_vibing {
            "🎉 PERSON IS VIBING!"
        } else {
            "😐 Not really vibing"
        }
    );
    println!("{line}\n");
}

// ── Probe ───────────────────────────────────────────────────

fn run_probe(args: ProbeArgs) -> anyhow::Result<()> {
    println!("{}", "=".repeat(50));
    println!("CAPTURE DEVICE PROBE");
    println!("{}\n", "=".repeat(50));

    let devices = capture::list_video_devices();
    if devices.is_empty() {
        println!("No /dev/video* devices found");
    } else {
        println!("Video devices:");
        for device in &devices {
            println!("  {}", device.display());
        }
    }
    println!();

    if args.pattern {
        return probe_pattern(&args.output_dir);
    }
    probe_camera(args.camera, &args.output_dir)
}

fn probe_pattern(output_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(output_dir)?;
    let mut source = PatternSource::new();
    let frame = source.grab()?;
    let path = output_dir.join("probe_pattern.jpg");
    frame.save_with_format(&path, image::ImageFormat::Jpeg)?;
    println!(
        "✓ Pattern frame written: {} ({}x{})",
        path.display(),
        frame.width(),
        frame.height()
    );
    Ok(())
}

#[cfg(feature = "camera")]
fn probe_camera(index: i32, output_dir: &Path) -> anyhow::Result<()> {
    // Laptops commonly expose the built-in camera at 0 and externals at 1.
    let attempts = [index, index + 1];
    for idx in attempts {
        println!("Trying camera {}...", idx);
        match try_probe_camera(idx, output_dir) {
            Ok(()) => return Ok(()),
            Err(e) => println!("  {}", e),
        }
    }

    println!("\nNo working camera found. Tips:");
    println!("  - Close other applications that may be using the camera");
    println!("  - Check device permissions on /dev/video*");
    println!("  - Run with --pattern to exercise the pipeline without hardware");
    println!();
    probe_pattern(output_dir)
}

#[cfg(feature = "camera")]
fn try_probe_camera(index: i32, output_dir: &Path) -> anyhow::Result<()> {
    use vibe_check::capture::CameraSource;

    std::fs::create_dir_all(output_dir)?;
    let mut source = CameraSource::open(index)?;
    let frame = source.grab()?;
    let path = output_dir.join(format!("probe_camera_{index}.jpg"));
    frame.save_with_format(&path, image::ImageFormat::Jpeg)?;
    println!(
        "✓ Camera {} works: {} ({}x{})",
        index,
        path.display(),
        frame.width(),
        frame.height()
    );
    Ok(())
}

#[cfg(not(feature = "camera"))]
fn probe_camera(_index: i32, output_dir: &Path) -> anyhow::Result<()> {
    println!("Webcam support not compiled in (build with --features camera).");
    println!("Falling back to the synthetic pattern source.\n");
    probe_pattern(output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_writes_defaults_and_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vibe-check.json");

        run_init_config(Some(&path)).unwrap();
        let loaded: AnalyzerConfig = load_json_config(&path, "Analyzer");
        assert_eq!(loaded.model, "gpt-4o");
        assert_eq!(loaded.api_key_env.as_deref(), Some("VIBE_API_KEY"));

        let err = run_init_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
