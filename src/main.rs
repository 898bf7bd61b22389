use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jobtracker::db::SqliteRepository;
use jobtracker::email::{ImapConfig, ImapEmailClient};
use jobtracker::import::remote::ReqwestHttpClient;
use jobtracker::import::{
    CsvImportSource, ImapImportSource, ImportService, ImportSummary, RemoteCsvImportSource,
    RowFilter,
};
use jobtracker::{Application, JobTracker, export, util};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jobtracker")]
#[command(about = "Track job applications - add, list, update and import them")]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, global = true, env = "JOBTRACKER_DB")]
    database: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set (e.g. "info", "jobtracker=debug")
    #[arg(long, global = true, env = "JOBTRACKER_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and schema
    Init,

    /// Add an application (needs a company, a position, or both)
    Add {
        #[arg(long, default_value = "")]
        company: String,

        #[arg(long, default_value = "")]
        position: String,

        #[arg(long, default_value = "")]
        location: String,

        /// Where the posting came from (linkedin, referral, ...)
        #[arg(long, default_value = "")]
        source: String,

        /// Initial status (defaults to "applied")
        #[arg(long, default_value = "")]
        status: String,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List applications
    List {
        /// Filter by exact status
        #[arg(short, long)]
        status: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one application
    Show { id: i64 },

    /// Change the status of an application (replaces its notes)
    Update {
        id: i64,

        #[arg(short, long)]
        status: String,

        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// Remove an application
    Remove { id: i64 },

    /// Show counts per status
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Import applications from an external source
    Import {
        #[command(subcommand)]
        source: ImportCommands,
    },

    /// Write all applications to a CSV file
    Export { path: PathBuf },
}

#[derive(Subcommand)]
enum ImportCommands {
    /// Import from a local CSV file
    Csv {
        path: PathBuf,

        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Skip rows missing either company or position
        #[arg(long)]
        strict: bool,
    },

    /// Import from a CSV document served over HTTP
    Remote {
        url: String,

        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Keep rows that have a company or a position (default needs both)
        #[arg(long)]
        lenient: bool,

        /// Give up on the request after this many seconds (default: wait forever)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Import from an IMAP mailbox
    Email {
        #[arg(long, env = "JOBTRACKER_IMAP_USER")]
        username: String,

        /// Path to app password file
        #[arg(short, long, default_value = "~/.gmail.app_password.txt")]
        password_file: String,

        #[arg(long, default_value = "imap.gmail.com")]
        host: String,

        #[arg(long, default_value = "993")]
        port: u16,

        #[arg(long, default_value = "INBOX")]
        mailbox: String,

        /// IMAP SEARCH expression
        #[arg(long, default_value = "UNSEEN")]
        search: String,
    },
}

fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level/filter '{}'", level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let db_path = cli.database.unwrap_or_else(SqliteRepository::default_path);
    let repository = SqliteRepository::open(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    let tracker = JobTracker::new(Box::new(repository));

    match cli.command {
        Commands::Init => {
            println!("Database initialized at {}", db_path.display());
        }

        Commands::Add {
            company,
            position,
            location,
            source,
            status,
            notes,
        } => {
            ensure_identity(&company, &position)?;
            let saved = tracker.add(&Application {
                company,
                position,
                location,
                source,
                status,
                notes,
                ..Default::default()
            })?;
            println!("Added application #{}", saved.id);
        }

        Commands::List { status, json } => {
            let apps = match status.as_deref() {
                Some(s) => tracker.filter_by_status(s)?,
                None => tracker.list_all()?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&apps)?);
            } else if apps.is_empty() {
                println!("No applications found.");
            } else {
                println!(
                    "{:<6} {:<12} {:<22} {:<26} {:<10}",
                    "ID", "STATUS", "COMPANY", "POSITION", "UPDATED"
                );
                println!("{}", "-".repeat(80));
                for app in apps {
                    println!(
                        "{:<6} {:<12} {:<22} {:<26} {:<10}",
                        app.id,
                        truncate(&app.status, 12),
                        truncate(&app.company, 20),
                        truncate(&app.position, 24),
                        app.last_update
                    );
                }
            }
        }

        Commands::Show { id } => match tracker.get(id)? {
            Some(app) => {
                println!("Application #{}", app.id);
                println!("Company: {}", app.company);
                println!("Position: {}", app.position);
                if !app.location.is_empty() {
                    println!("Location: {}", app.location);
                }
                if !app.source.is_empty() {
                    println!("Source: {}", app.source);
                }
                println!("Status: {}", app.status);
                println!("Applied: {}", app.applied_date);
                println!("Last update: {}", app.last_update);
                if !app.notes.is_empty() {
                    println!("\n--- Notes ---\n{}", app.notes);
                }
            }
            None => println!("Application #{} not found.", id),
        },

        Commands::Update { id, status, note } => {
            if tracker.update_status(id, &status, &note)? {
                println!("Application #{} is now '{}'.", id, status);
            } else {
                println!("Application #{} not found.", id);
            }
        }

        Commands::Remove { id } => {
            if tracker.remove(id)? {
                println!("Removed application #{}.", id);
            } else {
                println!("Application #{} not found.", id);
            }
        }

        Commands::Stats { json } => {
            let stats = tracker.compute_statistics()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else if stats.is_empty() {
                println!("No applications found.");
            } else {
                println!("Applications by status:");
                for (status, count) in &stats.count_by_status {
                    let label = if status.is_empty() { "(none)" } else { status.as_str() };
                    println!("  {:<14} {:>5}", label, count);
                }
                println!("  {:<14} {:>5}", "total", stats.total());
            }
        }

        Commands::Import { source } => {
            let (label, summary) = run_import(&tracker, source)?;
            print_summary(label, &summary);
        }

        Commands::Export { path } => {
            let apps = tracker.list_all()?;
            let file = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            export::write_csv(&apps, file)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported {} application(s) to {}", apps.len(), path.display());
        }
    }

    Ok(())
}

fn run_import(tracker: &JobTracker, source: ImportCommands) -> Result<(&'static str, ImportSummary)> {
    let summary = match source {
        ImportCommands::Csv {
            path,
            delimiter,
            strict,
        } => {
            let filter = if strict {
                RowFilter::RequireBoth
            } else {
                RowFilter::RequireEither
            };
            let mut source = CsvImportSource::new(&path)
                .with_delimiter(delimiter)
                .with_row_filter(filter);
            ("CSV file", ImportService::new(tracker, &mut source).run_once()?)
        }

        ImportCommands::Remote {
            url,
            delimiter,
            lenient,
            timeout_secs,
        } => {
            let filter = if lenient {
                RowFilter::RequireEither
            } else {
                RowFilter::RequireBoth
            };
            let client = ReqwestHttpClient::new(timeout_secs.map(Duration::from_secs))?;
            let mut source = RemoteCsvImportSource::new(client, url)
                .with_delimiter(delimiter)
                .with_row_filter(filter);
            ("remote CSV", ImportService::new(tracker, &mut source).run_once()?)
        }

        ImportCommands::Email {
            username,
            password_file,
            host,
            port,
            mailbox,
            search,
        } => {
            let password_path = util::expand_home(&password_file);
            let config =
                ImapConfig::from_password_file(&host, port, &username, &password_path, &mailbox)?;
            println!("Connecting to {} as {}...", host, username);
            let mut source = ImapImportSource::new(ImapEmailClient::new(config), search);
            ("mailbox", ImportService::new(tracker, &mut source).run_once()?)
        }
    };
    Ok(summary)
}

fn ensure_identity(company: &str, position: &str) -> Result<()> {
    if company.trim().is_empty() && position.trim().is_empty() {
        anyhow::bail!("Give at least --company or --position");
    }
    Ok(())
}

fn print_summary(label: &str, summary: &ImportSummary) {
    if summary.total == 0 {
        println!("No applications found in {}.", label);
    } else if summary.imported == 0 {
        println!(
            "{} contained {} row(s), but none could be imported.",
            label, summary.total
        );
    } else {
        println!(
            "Imported {} of {} application(s) from {}.",
            summary.imported, summary.total, label
        );
    }
    if summary.failed > 0 {
        println!("  Failed: {}", summary.failed);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
