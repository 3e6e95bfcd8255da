//! Study Notes - command line driver
//!
//! Opens the notes of one material, applies a single operation through the
//! same widget/controller path the viewer uses, and waits for the remote
//! writes to finish before printing the result.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use study_notes::events::{Notification, NotificationLevel};
use study_notes::notes::{NoteCollection, NoteWidget, Position, Viewport};
use study_notes::{AppState, Config};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "study-notes")]
#[command(about = "Sticky notes for study materials")]
struct Cli {
    /// Path to the YAML config file (default: ./study-notes.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Material whose notes are opened
    #[arg(short, long, global = true, env = "STUDY_NOTES_MATERIAL_ID")]
    material: Option<Uuid>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the material's notes, visible first, then minimized
    List,

    /// Add an empty note at a random spot in the top-left of the viewport
    Add {
        /// Viewport width (overrides config)
        #[arg(long)]
        width: Option<f64>,

        /// Viewport height (overrides config)
        #[arg(long)]
        height: Option<f64>,
    },

    /// Drag a note to a new position (coordinates may be negative)
    Move {
        id: Uuid,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },

    /// Collapse a note into the minimized panel
    Minimize { id: Uuid },

    /// Bring a minimized note back onto the document
    Restore { id: Uuid },

    /// Replace a note's text
    Edit { id: Uuid, text: String },

    /// Delete a note
    Delete { id: Uuid },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,study_notes=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::from_yaml_and_env(cli.config.as_deref())?;
    let Some(material_id) = cli.material else {
        bail!("No material given: pass --material or set STUDY_NOTES_MATERIAL_ID");
    };

    let state = AppState::new(config)?;
    let mut notifications = state.bus.subscribe();
    let collection = state.collection()?;

    let loaded = collection.open(material_id).await;
    let outcome = match loaded {
        Ok(count) => {
            tracing::debug!(material_id = %material_id, count, "Opened material");
            run_command(&state, &collection, cli.command).await
        }
        Err(e) => Err(anyhow::Error::from(e).context("Failed to open notes")),
    };

    collection.settle().await;
    let emitted = drain(&mut notifications);
    print_notifications(&emitted);
    outcome?;

    print_notes(&collection);
    fail_on_error_notifications(&emitted)
}

async fn run_command(state: &AppState, collection: &NoteCollection, command: Commands) -> Result<()> {
    match command {
        Commands::List => Ok(()),
        Commands::Add { width, height } => {
            let default = state.config.viewport;
            let viewport = Viewport::new(
                width.unwrap_or(default.width),
                height.unwrap_or(default.height),
            );
            let note = collection.add_note(viewport).await?;
            println!(
                "{}  at ({:.0}, {:.0})",
                note.id, note.position.x, note.position.y
            );
            Ok(())
        }
        Commands::Move { id, x, y } => {
            let mut widget = widget_for(collection, id)?;
            if !widget.pointer_down(widget.position()) {
                bail!("Note {} is minimized; restore it before moving", id);
            }
            widget.pointer_move(Position::new(x, y));
            widget.pointer_up();
            Ok(())
        }
        Commands::Minimize { id } => {
            widget_for(collection, id)?.minimize();
            Ok(())
        }
        Commands::Restore { id } => {
            widget_for(collection, id)?.restore();
            Ok(())
        }
        Commands::Edit { id, text } => {
            widget_for(collection, id)?.edit(text);
            Ok(())
        }
        Commands::Delete { id } => {
            widget_for(collection, id)?.delete();
            Ok(())
        }
    }
}

fn widget_for(collection: &NoteCollection, id: Uuid) -> Result<NoteWidget<NoteCollection>> {
    collection
        .widget(id)
        .with_context(|| format!("No note {} on this material", id))
}

fn print_notes(collection: &NoteCollection) {
    let visible = collection.visible();
    let minimized = collection.minimized_summaries();

    println!("Visible ({}):", visible.len());
    for note in &visible {
        println!(
            "  {}  ({:>6.0}, {:>6.0})  {}",
            note.id,
            note.position.x,
            note.position.y,
            note.summary()
        );
    }
    println!("Minimized ({}):", minimized.len());
    for (id, label) in &minimized {
        println!("  {}  {}", id, label);
    }
}

fn drain(rx: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(n) = rx.try_recv() {
        out.push(n);
    }
    out
}

fn print_notifications(notifications: &[Notification]) {
    for n in notifications {
        let tag = match n.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
        };
        eprintln!("[{}] {}: {}", tag, n.title, n.description);
    }
}

/// Widget actions report failures only as notifications; turn those into a
/// failing exit status.
fn fail_on_error_notifications(notifications: &[Notification]) -> Result<()> {
    let failed: Vec<&str> = notifications
        .iter()
        .filter(|n| n.is_error())
        .map(|n| n.title.as_str())
        .collect();
    if failed.is_empty() {
        return Ok(());
    }
    bail!("{}", failed.join("; "))
}
