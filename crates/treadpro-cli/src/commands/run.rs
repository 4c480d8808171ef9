use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use treadpro_core::{Chime, Config, CueNotifier, Event, SegmentSpec, SilentNotifier, WorkoutRunner};

use super::simulate::print_summary;
use super::{clock, resolve_session};

#[derive(Args)]
pub struct RunArgs {
    /// Session id, or "custom"
    pub id: String,
    /// Custom segment as DURATION_SECS:SPEED_KMH:INCLINE_PCT (repeatable)
    #[arg(long = "segment", value_name = "D:S:I")]
    pub segments: Vec<SegmentSpec>,
    /// Name for a custom session
    #[arg(long)]
    pub name: Option<String>,
    /// Milliseconds per logical second (defaults to timer.tick_ms)
    #[arg(long)]
    pub tick_ms: Option<u64>,
    /// Print events as JSON lines
    #[arg(long)]
    pub json: bool,
    /// No beeps
    #[arg(long)]
    pub mute: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run_workout(args));
    // The stdin reader blocks on a thread of its own.
    runtime.shutdown_background();
    result
}

async fn run_workout(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let session = resolve_session(&args.id, &args.segments, args.name.as_deref(), config.limits)?;
    let tick_interval = args
        .tick_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.tick_interval());

    let notifier: Arc<dyn CueNotifier> = if args.mute || !config.audio.enabled {
        Arc::new(SilentNotifier)
    } else {
        let chime = Arc::new(Chime::from_config(&config.audio));
        // Starting a run is the user gesture that allows playback.
        chime.unlock();
        chime
    };

    let (runner, mut events) = WorkoutRunner::start(&session, notifier, tick_interval).await?;
    if !args.json {
        println!(
            "{}: {} segments, {}. Keys: p pause/resume, s skip, q quit",
            session.name,
            session.segments.len(),
            clock(session.total_duration())
        );
        if let Some(first) = session.segment(0) {
            println!(
                "[{}] segment 1/{}: {:.1} km/h, {}% for {}",
                clock(0),
                session.segments.len(),
                first.speed,
                first.incline,
                clock(first.duration as u64)
            );
        }
    }

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if args.json {
                    println!("{}", serde_json::to_string(&event)?);
                } else {
                    print_event(&event, session.segments.len());
                }
                if event.is_terminal() {
                    break;
                }
            }
            line = stdin.next_line(), if stdin_open => {
                match line? {
                    Some(line) => handle_key(&runner, line.trim()).await,
                    None => stdin_open = false,
                }
            }
        }
    }

    if !args.json {
        print_summary(&runner.summary().await);
    }
    Ok(())
}

async fn handle_key(runner: &WorkoutRunner, key: &str) {
    match key {
        "p" => {
            if !runner.pause().await {
                runner.resume().await;
            }
        }
        "s" => {
            runner.skip().await;
        }
        "q" => {
            runner.cancel().await;
        }
        "" => {}
        other => tracing::warn!(key = other, "unknown key"),
    }
}

fn print_event(event: &Event, segment_count: usize) {
    match event {
        Event::RunStarted { .. } | Event::SegmentEnded { .. } | Event::RunFinished { .. } => {}
        Event::RunPaused { .. } => println!("paused"),
        Event::RunResumed { .. } => println!("resumed"),
        Event::SegmentSkipped { from_segment, skipped_secs, .. } => {
            println!("skipped segment {} ({}s left)", from_segment + 1, skipped_secs)
        }
        Event::CountdownCue { segment_seconds_left, .. } => {
            println!("  {segment_seconds_left}...")
        }
        Event::SegmentChanged {
            segment_index,
            duration_secs,
            speed,
            incline,
            total_seconds_elapsed,
            ..
        } => {
            println!(
                "[{}] segment {}/{}: {:.1} km/h, {}% for {}",
                clock(*total_seconds_elapsed),
                segment_index + 1,
                segment_count,
                speed,
                incline,
                clock(*duration_secs as u64)
            );
        }
        Event::RunCancelled { total_seconds_elapsed, .. } => {
            println!("cancelled after {}", clock(*total_seconds_elapsed))
        }
    }
}
