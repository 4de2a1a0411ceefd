//! HD Notes - a command line client for the HD Notes API.
//!
//! Signs in with an emailed one-time code (or a Google ID token), keeps the
//! session between runs, and manages notes from the terminal.

mod app;
mod auth;
mod notes;
mod prompt;

use std::io;
use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hdnotes_core::models::{NoteQuery, DEFAULT_PAGE_SIZE};
use hdnotes_core::Config;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;

/// Log file prefix inside the configured log directory
const LOG_FILE_PREFIX: &str = "hdnotes.log";

/// HD Notes command-line interface.
#[derive(Parser)]
#[command(name = "hdnotes")]
#[command(about = "Sign in to HD Notes and manage your notes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL for this run (overrides HDNOTES_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email, password and an emailed code
    Login {
        /// Email to sign in with (defaults to the last one used)
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Create an account
    Signup {
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Sign in with a Google ID token
    Google {
        /// The ID token; prompted for when omitted
        credential: Option<String>,
        /// Create a new account instead of signing in
        #[arg(long)]
        signup: bool,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// List notes
    Notes {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,
        /// Only notes whose title or content matches
        #[arg(short, long, default_value = "")]
        search: String,
        /// List archived notes instead of active ones
        #[arg(short, long)]
        archived: bool,
    },
    /// Show note statistics
    Stats,
    /// Print a note
    Show { id: String },
    /// Create a note. Content is read from stdin unless --content is given.
    New {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        content: Option<String>,
        /// Font color, e.g. "#1e40af"
        #[arg(long)]
        color: Option<String>,
    },
    /// Change a note's title, content or color
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a note
    Rm {
        id: String,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Pin or unpin a note
    Pin { id: String },
    /// Archive or unarchive a note
    Archive { id: String },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<&Path>) {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = log_dir.map(|dir| {
        let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        fmt::layer().with_ansi(false).with_writer(appender)
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    init_tracing(config.log_dir.as_deref());
    if let Some(e) = config_error {
        warn!(error = %e, "Ignoring unreadable config, using defaults");
    }
    info!("HD Notes CLI starting");

    let mut app = App::new(config, cli.api_url)?;

    match cli.command {
        Commands::Login { email } => {
            if let Some(session) = app.session.current() {
                println!("Already signed in as {}.", session.user.display_name());
                if !prompt::confirm("Sign in again?", false)? {
                    return Ok(());
                }
            }
            auth::login(&mut app, email).await?;
        }
        Commands::Signup { email } => auth::signup(&mut app, email).await?,
        Commands::Google { credential, signup } => auth::google(&mut app, credential, signup).await?,
        Commands::Logout => auth::logout(&app),
        Commands::Whoami => auth::whoami(&app),
        Commands::Notes {
            page,
            limit,
            search,
            archived,
        } => {
            let query = NoteQuery {
                page: page.max(1),
                limit: limit.max(1),
                search,
                archived,
            };
            notes::list(&mut app, query).await?;
        }
        Commands::Stats => notes::stats(&mut app).await?,
        Commands::Show { id } => notes::show(&mut app, &id).await?,
        Commands::New {
            title,
            content,
            color,
        } => notes::create(&mut app, title, content, color).await?,
        Commands::Edit {
            id,
            title,
            content,
            color,
        } => notes::edit(&mut app, &id, title, content, color).await?,
        Commands::Rm { id, yes } => notes::delete(&mut app, &id, yes).await?,
        Commands::Pin { id } => notes::toggle_pin(&mut app, &id).await?,
        Commands::Archive { id } => notes::toggle_archive(&mut app, &id).await?,
    }

    info!("HD Notes CLI shutting down");
    Ok(())
}
