use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use engine::profiling::{Profiler, StepTimings};
use engine::{FrameClock, HeadlessRunner};
use stairjump::autoplay::{Autoplay, RunReport, run_autoplay};
use stairjump::config::{ConfigStore, GameConfig};
use stairjump::gesture::ScriptedGesture;
use stairjump::session::{GameSession, SessionInput};

#[derive(Debug, Parser)]
#[command(name = "stairjump")]
#[command(about = "Headless runner for the stair-jumping gesture game")]
struct Cli {
    /// Config JSON (defaults to $STAIRJUMP_CONFIG_PATH or the XDG location).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 3600)]
    ticks: usize,
    /// Fixed step in seconds; defaults to 1 / target_hz from the config.
    #[arg(long)]
    dt: Option<f64>,
    /// Jump on a fixed cadence instead of waiting for gestures.
    #[arg(long, default_value_t = false)]
    autoplay: bool,
    #[arg(long, default_value_t = 0.6)]
    cadence: f64,
    #[arg(long, default_value_t = 40.0)]
    strength: f64,
    /// Pace ticks to wall-clock time and use measured deltas.
    #[arg(long, default_value_t = false)]
    realtime: bool,
    /// Write the per-tick snapshot history as JSON.
    #[arg(long)]
    trace: Option<PathBuf>,
    /// Write the default config to this path and exit.
    #[arg(long)]
    write_default_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Some(path) = &cli.write_default_config {
        ConfigStore::new(path)
            .save(&GameConfig::default())
            .with_context(|| format!("writing default config to {}", path.display()))?;
        println!("wrote default config to {}", path.display());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => ConfigStore::new(path)
            .try_load()
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ConfigStore::from_env().load(),
    };

    let dt = cli
        .dt
        .unwrap_or(1.0 / config.simulation.target_hz as f64);
    if !(dt.is_finite() && dt > 0.0) {
        bail!("--dt must be a positive number of seconds, got {dt}");
    }

    let session = if cli.autoplay {
        // Autoplay drives every jump; keep the gesture pipeline quiet.
        GameSession::with_source(config.clone(), Box::new(ScriptedGesture::default()))
    } else {
        GameSession::new(config.clone())
    };
    let mut runner = HeadlessRunner::new(session);
    if cli.trace.is_none() {
        runner = runner.without_history();
    }

    let report = if cli.realtime {
        run_realtime(&mut runner, &cli, &config)
    } else if cli.autoplay {
        let mut autoplay = Autoplay::new(cli.cadence, cli.strength);
        run_autoplay(&mut runner, &mut autoplay, dt, cli.ticks)
    } else {
        run_fixed(&mut runner, dt, cli.ticks)
    };

    if let Some(path) = &cli.trace {
        runner
            .timemachine()
            .save_json_file(path)
            .with_context(|| format!("writing trace to {}", path.display()))?;
        log::info!("wrote {} snapshots to {}", runner.history().len(), path.display());
    }

    println!(
        "outcome={:?} ticks={} jumps={} time={:.2}s platform={} last_jump={:.1}",
        report.outcome,
        report.ticks,
        report.jumps,
        report.elapsed,
        report.final_platform,
        runner.simulation().last_jump_distance()
    );
    Ok(())
}

fn run_fixed(runner: &mut HeadlessRunner<GameSession>, dt: f64, max_ticks: usize) -> RunReport {
    let mut ticks = 0;
    while ticks < max_ticks && !runner.simulation().outcome().is_finished() {
        runner.step(SessionInput::Idle, dt);
        ticks += 1;
    }
    report_for(runner, ticks, 0)
}

fn run_realtime(
    runner: &mut HeadlessRunner<GameSession>,
    cli: &Cli,
    config: &GameConfig,
) -> RunReport {
    let mut clock = FrameClock::new(config.simulation.target_hz, config.simulation.max_dt);
    let mut budget = FrameBudget::new(clock.target_frame_time());
    let mut autoplay = cli.autoplay.then(|| Autoplay::new(cli.cadence, cli.strength));
    let mut ticks = 0;
    let mut jumps = 0;
    while ticks < cli.ticks && !runner.simulation().outcome().is_finished() {
        std::thread::sleep(clock.remaining_in_frame());
        let dt = clock.tick();
        let input = match autoplay.as_mut() {
            Some(auto) => auto.next_input(runner.simulation(), dt),
            None => SessionInput::Idle,
        };
        if matches!(input, SessionInput::ManualJump(_)) {
            jumps += 1;
        }
        runner.step_profiled(input, dt, &mut budget);
        ticks += 1;
    }
    if budget.overruns > 0 {
        log::warn!("{} of {ticks} steps ran over the frame budget", budget.overruns);
    }
    report_for(runner, ticks, jumps)
}

/// Logs steps whose simulation work alone exceeds one frame.
struct FrameBudget {
    budget: Duration,
    overruns: usize,
}

impl FrameBudget {
    fn new(budget: Duration) -> Self {
        Self { budget, overruns: 0 }
    }
}

impl Profiler for FrameBudget {
    fn on_step(&mut self, frame: usize, timings: StepTimings) {
        if timings.total > self.budget {
            self.overruns += 1;
            log::debug!(
                "frame {frame} took {:?} (advance {:?}, record {:?})",
                timings.total,
                timings.advance,
                timings.record
            );
        }
    }
}

fn report_for(runner: &HeadlessRunner<GameSession>, ticks: usize, jumps: u32) -> RunReport {
    let session = runner.simulation();
    RunReport {
        outcome: session.outcome(),
        ticks,
        jumps,
        elapsed: session.time(),
        final_platform: session.player().current_platform_index,
    }
}
