use std::{path::PathBuf, thread, time::Duration};

use clap::{Args, Parser, Subcommand};
use second_screen_core::{
    interval_for_fps, AppConfig, BuiltinTimeline, EventTesting, RendererRegistry, ScheduleChange,
    Scheduler, SecondScreenError, Session, SharedSession, TimelineSource,
};
use tracing_subscriber::EnvFilter;

fn main() -> second_screen_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    cli.source.apply(&mut config);

    match cli.command {
        Commands::Play {
            fps,
            seek,
            run_for,
            test_event,
        } => {
            if let Some(fps) = fps {
                config.ticker.fps = fps;
            }
            run_play(&config, seek, run_for, test_event.as_deref())
        }
        Commands::Inspect { at, test_event } => run_inspect(&config, at, test_event.as_deref()),
        Commands::Validate => run_validate(&config),
        Commands::Export => run_export(&config),
        Commands::Kinds => {
            for kind in RendererRegistry::with_builtins().registered_kinds() {
                println!("{kind}");
            }
            Ok(())
        }
    }
}

fn run_play(
    config: &AppConfig,
    seek: Option<f64>,
    run_for: Option<f64>,
    test_event: Option<&str>,
) -> second_screen_core::Result<()> {
    let mut session = Session::from_config(config)?;
    let run_for = run_for.unwrap_or_else(|| session.scheduler().timeline().duration_sec() + 1.0);
    let wall_time = run_duration(run_for)?;
    tracing::info!(fps = config.ticker.fps, run_for, "starting session");

    if let Some(seconds) = seek {
        session.seek_to((seconds * 1000.0) as i64);
    }
    if let Some(kind) = test_event {
        session.trigger_test_event(kind, None, None);
    }
    session.start();
    tracing::info!("{}", session.presented());

    let registry = RendererRegistry::with_builtins();
    let shared = SharedSession::new(session);
    let ticker = shared.drive(interval_for_fps(config.ticker.fps), move |change, presented| {
        tracing::info!("{presented}");
        match change {
            ScheduleChange::Entered { event } | ScheduleChange::Switched { event, .. } => {
                match registry.render(&event) {
                    Some(overlay) => println!("[{}] {overlay}", event.kind),
                    None => tracing::warn!(kind = %event.kind, "no renderer registered"),
                }
            }
            ScheduleChange::Exited { from } => println!("[{from}] overlay dismissed"),
        }
    })?;

    thread::sleep(wall_time);
    ticker.stop();

    let presented = shared.presented()?;
    tracing::info!(elapsed_sec = presented.elapsed_sec, "session finished");
    Ok(())
}

/// Wall-clock run time for `--for`; negative values run for zero seconds.
fn run_duration(run_for: f64) -> second_screen_core::Result<Duration> {
    Duration::try_from_secs_f64(run_for.max(0.0))
        .map_err(|err| SecondScreenError::msg(format!("invalid run duration {run_for}s: {err}")))
}

fn run_inspect(config: &AppConfig, at: i64, test_event: Option<&str>) -> second_screen_core::Result<()> {
    let timeline = config.load_timeline()?;
    let mut scheduler = Scheduler::new(timeline);
    let snapshot = scheduler.compute(at).clone();

    let mut testing = EventTesting::with_default_duration(config.testing.default_duration_sec);
    if let Some(kind) = test_event {
        testing.trigger(kind, None, None);
    }
    let presented = testing.apply(&snapshot);

    tracing::info!("{presented}");
    println!("{}", serde_json::to_string_pretty(&presented)?);
    Ok(())
}

fn run_validate(config: &AppConfig) -> second_screen_core::Result<()> {
    let timeline = config.timeline.load()?;
    let issues = timeline.validate();
    if !issues.is_empty() {
        return Err(SecondScreenError::InvalidTimeline { issues });
    }
    println!(
        "timeline ok: {} clips, {} events, {}s",
        timeline.clips().len(),
        timeline.events().len(),
        timeline.duration_sec()
    );
    Ok(())
}

fn run_export(config: &AppConfig) -> second_screen_core::Result<()> {
    let timeline = config.timeline.load()?;
    println!("{}", serde_json::to_string_pretty(&timeline)?);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Second screen companion display scheduler", long_about = None)]
struct Cli {
    /// JSON configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Timeline selection shared by every subcommand.
#[derive(Args, Debug)]
struct SourceArgs {
    /// Timeline asset to load instead of the configured one.
    #[arg(long, global = true, conflicts_with = "builtin")]
    timeline: Option<PathBuf>,

    /// Built-in timeline to use (`new-game` or `demo`).
    #[arg(long, global = true)]
    builtin: Option<BuiltinTimeline>,
}

impl SourceArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.timeline {
            config.timeline = TimelineSource::Path(path.clone());
        } else if let Some(builtin) = self.builtin {
            config.timeline = TimelineSource::Builtin(builtin);
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a live session, printing overlays as the schedule changes.
    Play {
        /// Tick rate of the driver.
        #[arg(long)]
        fps: Option<u32>,
        /// Start position in seconds.
        #[arg(long)]
        seek: Option<f64>,
        /// Stop after this many seconds (defaults to the timeline length).
        #[arg(long = "for")]
        run_for: Option<f64>,
        /// Force a synthetic event of this kind over the schedule.
        #[arg(long)]
        test_event: Option<String>,
    },
    /// Print the resolved schedule at an instant as JSON.
    Inspect {
        /// Elapsed seconds.
        #[arg(long, allow_negative_numbers = true)]
        at: i64,
        /// Force a synthetic event of this kind over the schedule.
        #[arg(long)]
        test_event: Option<String>,
    },
    /// Check a timeline against the authoring conventions.
    Validate,
    /// Print the selected timeline as JSON.
    Export,
    /// List event kinds with a registered overlay renderer.
    Kinds,
}
