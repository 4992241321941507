// ABOUTME: Command handlers for the geonotes CLI
// ABOUTME: Each subcommand drives the shared NoteStore and prints the result

pub mod cli;
pub mod render;

use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use geonotes_client::{
    connect, ActionGuard, ClientConfig, LoadStatus, NoteDraft, NoteStore, NotesApi, NotesError,
    NotesResource, NotesView,
};
use std::time::Duration;
use tracing::debug;

pub use cli::{AddArgs, Cli, Command, EditArgs};

pub async fn run(command: Command, config: &ClientConfig) -> Result<()> {
    let store = connect(config)?;

    match command {
        Command::List => list(&store).await,
        Command::Show { id } => show(&store, &id).await,
        Command::Add(args) => add(&store, &args).await,
        Command::Edit(args) => edit(&store, &args).await,
        Command::Delete { id } => delete(&store, &id).await,
        Command::Watch { interval_secs } => {
            watch(&store, Duration::from_secs(interval_secs)).await
        }
    }
}

/// Message to show the user for a failed command.
pub fn describe_error(err: &anyhow::Error, api_url: &str) -> String {
    match err.downcast_ref::<NotesError>() {
        Some(notes_err) => notes_err.user_message(api_url),
        None => format!("{:#}", err),
    }
}

/// Refresh and turn a failed load into an error.
async fn load(store: &NoteStore<NotesResource>) -> Result<()> {
    store.refresh().await;
    let view = store.view();
    if view.status == LoadStatus::Errored {
        bail!(view.error.unwrap_or_else(|| "refresh failed".to_string()));
    }
    Ok(())
}

async fn list(store: &NoteStore<NotesResource>) -> Result<()> {
    load(store).await?;
    let view = store.view();

    if view.items.is_empty() {
        println!("{}", "No notes yet.".dimmed());
        return Ok(());
    }
    for note in &view.items {
        println!("{}", render::note_row(note));
    }
    Ok(())
}

async fn show(store: &NoteStore<NotesResource>, id: &str) -> Result<()> {
    load(store).await?;
    let note = store
        .get_by_id(id)
        .ok_or_else(|| anyhow!("No note with id {id}"))?;
    println!("{}", render::note_detail(&note));
    Ok(())
}

async fn add(store: &NoteStore<NotesResource>, args: &AddArgs) -> Result<()> {
    let created = store.create(&args.to_draft()).await?;
    println!("{} Created note {}", "✓".green().bold(), created.id.bold());
    Ok(())
}

async fn edit(store: &NoteStore<NotesResource>, args: &EditArgs) -> Result<()> {
    load(store).await?;
    let current = store
        .get_by_id(&args.id)
        .ok_or_else(|| anyhow!("No note with id {}", args.id))?;

    let draft = args.apply(NoteDraft::from_note(&current));
    if draft == NoteDraft::from_note(&current) {
        println!("{} Nothing to change", "!".yellow().bold());
        return Ok(());
    }

    let updated = store.update(&args.id, &draft).await?;
    println!("{} Updated note {}", "✓".green().bold(), updated.id.bold());
    Ok(())
}

async fn delete(store: &NoteStore<NotesResource>, id: &str) -> Result<()> {
    store
        .delete(id)
        .await
        .with_context(|| format!("Failed to delete note {id}"))?;
    println!("{} Deleted note {}", "✓".green().bold(), id.bold());
    Ok(())
}

/// Refresh on a fixed interval and print every transition until Ctrl-C.
///
/// A tick that arrives while the previous refresh is still in flight is
/// skipped.
async fn watch(store: &NoteStore<NotesResource>, interval: Duration) -> Result<()> {
    let mut updates = store.subscribe();
    let refreshing = ActionGuard::new();
    let mut ticker = tokio::time::interval(interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    println!(
        "{} Watching {} every {}s (Ctrl-C to stop)",
        "→".cyan(),
        store.api().endpoint().bold(),
        interval.as_secs()
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match refreshing.try_begin() {
                    Some(ticket) => {
                        let store = store.clone();
                        tokio::spawn(async move {
                            store.refresh().await;
                            drop(ticket);
                        });
                    }
                    None => debug!("refresh still in flight, skipping tick"),
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = updates.borrow_and_update().clone();
                print_transition(&view);
            }
            _ = &mut shutdown => {
                println!();
                break;
            }
        }
    }
    Ok(())
}

fn print_transition(view: &NotesView) {
    let stamp = chrono::Local::now().format("%H:%M:%S").to_string();
    let line = render::status_line(view);
    match view.status {
        LoadStatus::Errored => println!("{} {}", stamp.dimmed(), line.red()),
        LoadStatus::Loaded => {
            println!("{} {}", stamp.dimmed(), line.green());
            for note in &view.items {
                println!("  {}", render::note_row(note));
            }
        }
        _ => println!("{} {}", stamp.dimmed(), line.dimmed()),
    }
}
