//! Note commands. Each one requires a session and signs the user in first
//! when there is none.

use std::io::{self, Read};

use anyhow::{bail, Result};
use hdnotes_core::models::{Note, NoteDraft, NoteQuery, NoteStats};
use hdnotes_core::utils::{format_optional_date, truncate};

use crate::app::App;
use crate::prompt::confirm;

/// Preview length in the list view
const PREVIEW_CHARS: usize = 60;

pub async fn list(app: &mut App, query: NoteQuery) -> Result<()> {
    app.require_session().await?;

    let (page, stats) = futures::join!(app.api.list_notes(&query), app.api.note_stats());
    let page = page.map_err(|e| app.api_failure(e))?;

    // The list is still useful without the stats line.
    match stats {
        Ok(stats) => print_stats(&stats),
        Err(e) => tracing::warn!(error = %e, "Failed to fetch stats"),
    }

    let kind = if query.archived { "archived" } else { "active" };
    println!(
        "\n{} {} {} (page {} of {})\n",
        page.total,
        kind,
        if page.total == 1 { "note" } else { "notes" },
        query.page,
        page.total_pages.max(1)
    );

    if page.notes.is_empty() {
        if query.search.is_empty() {
            println!("No notes found. Create one with `hdnotes new`.");
        } else {
            println!("No notes match \"{}\".", query.search);
        }
        return Ok(());
    }

    for note in &page.notes {
        print_row(note);
    }
    Ok(())
}

pub async fn stats(app: &mut App) -> Result<()> {
    app.require_session().await?;
    let stats = app.api.note_stats().await.map_err(|e| app.api_failure(e))?;
    print_stats(&stats);
    Ok(())
}

pub async fn show(app: &mut App, id: &str) -> Result<()> {
    app.require_session().await?;
    let note = app.api.get_note(id).await.map_err(|e| app.api_failure(e))?;

    println!("{}", note.title);
    println!("{}", "=".repeat(note.title.chars().count().max(1)));
    println!("Created: {}", format_optional_date(note.created_at.as_ref(), "unknown"));
    if note.updated_at != note.created_at {
        println!("Updated: {}", format_optional_date(note.updated_at.as_ref(), "unknown"));
    }
    let mut flags = Vec::new();
    if note.is_pinned {
        flags.push("pinned");
    }
    if note.is_archived {
        flags.push("archived");
    }
    if !flags.is_empty() {
        println!("Status:  {}", flags.join(", "));
    }
    println!("\n{}", note.plain_text());
    Ok(())
}

pub async fn create(app: &mut App, title: String, content: Option<String>, color: Option<String>) -> Result<()> {
    app.require_session().await?;
    let content = match content {
        Some(content) => content,
        None => read_stdin()?,
    };

    let mut draft = NoteDraft::new(title, content);
    if let Some(color) = color {
        draft = draft.with_font_color(color);
    }
    let message = app.api.create_note(&draft).await.map_err(|e| app.api_failure(e))?;
    println!("{}", message);
    Ok(())
}

/// Replace the given parts of a note, keeping the rest as stored.
pub async fn edit(
    app: &mut App,
    id: &str,
    title: Option<String>,
    content: Option<String>,
    color: Option<String>,
) -> Result<()> {
    if title.is_none() && content.is_none() && color.is_none() {
        bail!("Nothing to change. Pass --title, --content or --color.");
    }
    app.require_session().await?;

    let note = app.api.get_note(id).await.map_err(|e| app.api_failure(e))?;
    let color = color.or_else(|| note.meta.as_ref().and_then(|m| m.font_color.clone()));

    let mut draft = NoteDraft::new(
        title.unwrap_or(note.title),
        content.unwrap_or(note.content),
    );
    if let Some(color) = color {
        draft = draft.with_font_color(color);
    }
    let message = app.api.save_note(id, &draft).await.map_err(|e| app.api_failure(e))?;
    println!("{}", message);
    Ok(())
}

pub async fn delete(app: &mut App, id: &str, yes: bool) -> Result<()> {
    app.require_session().await?;
    if !yes {
        let note = app.api.get_note(id).await.map_err(|e| app.api_failure(e))?;
        let question = format!(
            "Delete \"{}\"? This action cannot be undone.",
            truncate(&note.title, PREVIEW_CHARS)
        );
        if !confirm(&question, false)? {
            println!("Kept.");
            return Ok(());
        }
    }
    let message = app.api.delete_note(id).await.map_err(|e| app.api_failure(e))?;
    println!("{}", message);
    Ok(())
}

pub async fn toggle_pin(app: &mut App, id: &str) -> Result<()> {
    app.require_session().await?;
    let message = app.api.toggle_pin(id).await.map_err(|e| app.api_failure(e))?;
    println!("{}", message);
    Ok(())
}

pub async fn toggle_archive(app: &mut App, id: &str) -> Result<()> {
    app.require_session().await?;
    let message = app.api.toggle_archive(id).await.map_err(|e| app.api_failure(e))?;
    println!("{}", message);
    Ok(())
}

fn print_stats(stats: &NoteStats) {
    println!(
        "Notes: {}  Archived: {}  Pinned: {}  Words: {}  Characters: {}",
        stats.total_notes,
        stats.archived_notes,
        stats.pinned_notes,
        stats.total_words,
        stats.total_characters
    );
}

fn print_row(note: &Note) {
    let marker = if note.is_pinned { "*" } else { " " };
    println!(
        "{} {:<24} {:<28} {}",
        marker,
        note.id,
        truncate(&note.title, 28),
        format_optional_date(note.updated_at.as_ref(), "")
    );
    let preview = note.plain_text();
    if !preview.is_empty() {
        println!("  {}", truncate(&preview, PREVIEW_CHARS));
    }
}

fn read_stdin() -> Result<String> {
    eprintln!("Reading note content from stdin (end with Ctrl-D)...");
    let mut content = String::new();
    io::stdin().read_to_string(&mut content)?;
    Ok(content)
}
