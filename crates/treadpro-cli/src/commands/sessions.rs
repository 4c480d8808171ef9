use clap::Subcommand;
use treadpro_core::{custom_template, Catalog, Config, Session};

use super::{clock, CUSTOM_ID};

#[derive(Subcommand)]
pub enum SessionsAction {
    /// List built-in sessions
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one session and its speed/incline profile
    Show {
        /// Session id, or "custom" for the editable template
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: SessionsAction) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::builtin();
    match action {
        SessionsAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(catalog.sessions())?);
                return Ok(());
            }
            for session in catalog.sessions() {
                println!(
                    "{:<12} {:<20} {:>3} min  {:>2} segments  max {:.1} km/h, {}%",
                    session.id,
                    session.name,
                    session.total_minutes(),
                    session.segments.len(),
                    session.max_speed(),
                    session.max_incline(),
                );
            }
        }
        SessionsAction::Show { id, json } => {
            let session = if id == CUSTOM_ID {
                custom_template(&Config::load_or_default().limits)
            } else {
                catalog.get(&id)?.clone()
            };
            if json {
                let value = serde_json::json!({
                    "session": session,
                    "total_duration": session.total_duration(),
                    "profile": session.profile(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print_session(&session);
            }
        }
    }
    Ok(())
}

fn print_session(session: &Session) {
    println!("{} ({})", session.name, session.id);
    if !session.description.is_empty() {
        println!("{}", session.description);
    }
    println!("Total: {}", clock(session.total_duration()));
    println!();
    println!("  #   Time   Speed  Incline");
    for (point, segment) in session.profile().iter().zip(&session.segments) {
        println!(
            "  {:<4}{:>5}  {:>5.1}  {:>6}%",
            point.label,
            clock(segment.duration as u64),
            point.speed,
            point.incline,
        );
    }
}
