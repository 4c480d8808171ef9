use clap::Args;
use serde::Serialize;
use treadpro_core::{Config, SegmentSpec, Signal, WorkoutEngine, WorkoutSummary};

use super::{clock, resolve_session};

#[derive(Args)]
pub struct SimulateArgs {
    /// Session id, or "custom"
    pub id: String,
    /// Custom segment as DURATION_SECS:SPEED_KMH:INCLINE_PCT (repeatable)
    #[arg(long = "segment", value_name = "D:S:I")]
    pub segments: Vec<SegmentSpec>,
    /// Name for a custom session
    #[arg(long)]
    pub name: Option<String>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Signals raised on one logical second.
#[derive(Serialize)]
struct SecondLog {
    second: u64,
    signals: Vec<Signal>,
}

#[derive(Serialize)]
struct SimulationReport {
    signals: Vec<SecondLog>,
    summary: WorkoutSummary,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let session = resolve_session(&args.id, &args.segments, args.name.as_deref(), config.limits)?;
    let mut engine = WorkoutEngine::start(&session)?;

    let mut log = Vec::new();
    while !engine.status().is_terminal() {
        let signals = engine.tick();
        if !signals.is_empty() {
            log.push(SecondLog {
                second: engine.total_seconds_elapsed(),
                signals,
            });
        }
    }
    tracing::debug!(entries = log.len(), "simulation complete");

    let report = SimulationReport {
        signals: log,
        summary: engine.summary(),
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for entry in &report.signals {
        for signal in &entry.signals {
            let label = match signal {
                Signal::CountdownCue => "countdown beep".to_string(),
                Signal::SegmentEndCue => "segment end beep".to_string(),
                Signal::SegmentChanged { index } => {
                    let segment = &session.segments[*index];
                    format!(
                        "segment {} of {}: {:.1} km/h, {}%",
                        index + 1,
                        session.segments.len(),
                        segment.speed,
                        segment.incline
                    )
                }
                Signal::Finished => "finished".to_string(),
            };
            println!("[{:>7}] {label}", clock(entry.second));
        }
    }
    print_summary(&report.summary);
    Ok(())
}

pub fn print_summary(summary: &WorkoutSummary) {
    println!();
    println!("{} ({:?})", summary.session_name, summary.status);
    println!(
        "Elapsed:  {} / {}",
        clock(summary.total_seconds_elapsed),
        clock(summary.total_duration_secs)
    );
    if summary.skipped_seconds > 0 {
        println!("Skipped:  {}", clock(summary.skipped_seconds));
    }
    println!("Distance: {:.2} km", summary.distance_km);
    println!("Climb:    {:.0} m", summary.climb_m);
    println!("Avg:      {:.1} km/h", summary.average_speed());
}
