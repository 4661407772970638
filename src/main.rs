//! # Email Intelligence Collector CLI (`eic`)
//!
//! The `eic` binary drives the dashboard from the terminal: single and bulk
//! lookups, collection statistics, digital twins, PDF analysis, exports,
//! and the local list of recent searches.
//!
//! ## Usage
//!
//! ```bash
//! eic --config ./config/eic.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `eic search <email>` | Look up one address |
//! | `eic bulk <file>` | Upload a `.csv` or `.txt` list of addresses |
//! | `eic stats` | Show collection statistics |
//! | `eic twin derive <email>` | Summarize a stored profile's completeness |
//! | `eic twin create <email>` | Build a server-side digital twin |
//! | `eic twin show <email>` | Load an existing server-side twin |
//! | `eic academic <email>` | Run an academic search |
//! | `eic pdf <email>` | Analyze PDFs mentioning the address |
//! | `eic insight <kind> <email>` | Fetch one analytics view |
//! | `eic export <email>` | Download a profile as JSON or PDF |
//! | `eic suggest <input>` | Search suggestions |
//! | `eic recent` | List or clear recent searches |
//! | `eic completions <shell>` | Print shell completions |

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use email_intel::client::{AcademicQuery, ApiClient, BulkUpload};
use email_intel::config;
use email_intel::dashboard::Dashboard;
use email_intel::models::{ExportFormat, ExportPayload, InsightKind, ResponseStatus};
use email_intel::recall::RecallStore;
use email_intel::render;
use email_intel::screen::Outcome;

/// Email Intelligence Collector CLI.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the file does not exist, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "eic",
    about = "Email Intelligence Collector client",
    version,
    long_about = "Look up publicly available information about email addresses through an \
    Email Intelligence Collector server: single and bulk searches, statistics, digital twins, \
    PDF analysis, and profile export."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/eic.toml")]
    config: PathBuf,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one email address.
    ///
    /// On success the address is added to the recent-search list and the
    /// statistics are refreshed.
    Search {
        email: String,

        /// Ignore cached data and collect again.
        #[arg(long)]
        force_refresh: bool,

        /// Print the raw response as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search every address in a `.csv` or `.txt` file.
    Bulk {
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Show collection statistics.
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Digital twin operations.
    Twin {
        #[command(subcommand)]
        action: TwinAction,
    },

    /// Run an academic search for an address.
    Academic {
        email: String,

        /// Full name, if known.
        #[arg(long)]
        name: Option<String>,

        /// Institution or company, if known.
        #[arg(long)]
        affiliation: Option<String>,
    },

    /// Analyze PDF documents that mention an address.
    Pdf {
        email: String,

        #[arg(long)]
        force_refresh: bool,

        #[arg(long)]
        json: bool,
    },

    /// Fetch one analytics view for an address.
    Insight {
        #[arg(value_enum)]
        kind: InsightKind,
        email: String,
    },

    /// Download a stored profile.
    Export {
        email: String,

        /// `json` or `pdf`.
        #[arg(long, default_value = "json")]
        format: ExportFormat,

        /// Output file. Defaults to `profile_<email>.<format>`.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Suggest addresses for a partial input.
    Suggest { input: String },

    /// List recently searched addresses.
    Recent {
        /// Forget all recent searches.
        #[arg(long)]
        clear: bool,
    },

    /// Print shell completions to stdout.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum TwinAction {
    /// Summarize the stored profile's completeness and confidence.
    ///
    /// Requires a prior `eic search` for the address.
    Derive {
        email: String,
        #[arg(long)]
        json: bool,
    },
    /// Run an academic search, then build a twin on the server.
    Create {
        email: String,
        #[arg(long)]
        json: bool,
    },
    /// Load an existing server-side twin and its analytics.
    Show {
        email: String,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "info" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Commands that don't require the server
    match &cli.command {
        Commands::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "eic", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Recent { clear } => {
            let cfg = config::load_or_default(&cli.config)?;
            let recall = RecallStore::from_config(&cfg.recall);
            if *clear {
                recall.clear()?;
                eprintln!("Cleared recent searches.");
            } else {
                let list = recall.list();
                if list.is_empty() {
                    println!("No recent searches.");
                }
                for query in list {
                    println!("{}", query);
                }
            }
            return Ok(());
        }
        _ => {}
    }

    let cfg = config::load_or_default(&cli.config)?;
    let api = Arc::new(ApiClient::new(&cfg.api)?);
    let dashboard = Dashboard::new(api, RecallStore::from_config(&cfg.recall));

    match cli.command {
        Commands::Search {
            email,
            force_refresh,
            json,
        } => {
            check_email(&email)?;
            let result = settled(dashboard.search(&email, force_refresh).await)?;
            if json {
                print_json(&result)?;
            } else if result.status == ResponseStatus::Error {
                bail!(
                    "{}",
                    result.message.as_deref().unwrap_or("The server rejected the search.")
                );
            } else {
                print!("{}", render::format_search(&result));
            }
        }
        Commands::Bulk { file, json } => {
            let upload = BulkUpload::from_path(&file)?;
            let result = settled(dashboard.bulk_search(Some(upload)).await)?;
            if json {
                print_json(&result)?;
            } else {
                print!("{}", render::format_bulk(&result));
            }
        }
        Commands::Stats { json } => {
            let stats = settled(dashboard.refresh_stats().await)?;
            if json {
                print_json(&stats)?;
            } else {
                print!("{}", render::format_stats(&stats));
            }
        }
        Commands::Twin { action } => match action {
            TwinAction::Derive { email, json } => {
                check_email(&email)?;
                let twin = settled(dashboard.derive_twin(&email).await)?;
                if json {
                    print_json(&twin)?;
                } else {
                    print!("{}", render::format_twin(&twin));
                }
            }
            TwinAction::Create { email, json } => {
                check_email(&email)?;
                let view = settled(dashboard.twin.create(&email).await)?;
                if json {
                    print_json(&view)?;
                } else {
                    print!(
                        "{}",
                        render::format_remote_twin(&email, &view, dashboard.twin.stage())
                    );
                }
            }
            TwinAction::Show { email, json } => {
                check_email(&email)?;
                let view = settled(dashboard.twin.load(&email).await)?;
                if json {
                    print_json(&view)?;
                } else {
                    print!(
                        "{}",
                        render::format_remote_twin(&email, &view, dashboard.twin.stage())
                    );
                }
            }
        },
        Commands::Academic {
            email,
            name,
            affiliation,
        } => {
            check_email(&email)?;
            let query = AcademicQuery {
                email: email.trim().to_string(),
                name,
                affiliation,
            };
            let value = dashboard.academic_search(&query).await?;
            print_json(&value)?;
        }
        Commands::Pdf {
            email,
            force_refresh,
            json,
        } => {
            check_email(&email)?;
            let analysis = settled(dashboard.pdf_analysis(&email, force_refresh).await)?;
            if json {
                print_json(&analysis)?;
            } else {
                print!("{}", render::format_pdf(&analysis));
            }
        }
        Commands::Insight { kind, email } => {
            check_email(&email)?;
            let value = dashboard.insight(kind, &email).await?;
            print_json(&value)?;
        }
        Commands::Export {
            email,
            format,
            output,
        } => {
            check_email(&email)?;
            let payload = dashboard.export(&email, format).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(format.default_file_name(email.trim())));
            write_export(&path, &payload)?;
        }
        Commands::Suggest { input } => {
            for suggestion in dashboard.suggestions(&input).await {
                println!("{}", suggestion);
            }
        }
        Commands::Recent { .. } | Commands::Completions { .. } => {
            // Handled above (before the client is built)
        }
    }

    Ok(())
}

/// Unwrap a settled outcome or turn it into a CLI error.
fn settled<T>(outcome: Outcome<T>) -> Result<T> {
    match outcome {
        Outcome::Success(value) => Ok(value),
        Outcome::Failure(failure) => bail!("{}", failure),
        Outcome::Rejected => bail!("Nothing to submit: input is empty."),
        Outcome::Busy => bail!("A request is already in progress."),
        Outcome::Stale => bail!("The response was superseded by a newer request."),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_export(path: &Path, payload: &ExportPayload) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    let bytes = match payload {
        ExportPayload::Json(value) => serde_json::to_vec_pretty(value)?,
        ExportPayload::Pdf(bytes) => bytes.clone(),
    };
    std::fs::write(path, &bytes)
        .with_context(|| format!("Failed to write export: {}", path.display()))?;
    eprintln!("Exported {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Basic `local@domain.tld` shape check; the server does the real validation.
fn check_email(input: &str) -> Result<()> {
    let email = input.trim();
    let plausible = !email.chars().any(char::is_whitespace)
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain
                        .split_once('.')
                        .is_some_and(|(host, _)| !host.is_empty())
                    && !domain.ends_with('.')
            }
            None => false,
        };
    if !plausible {
        bail!("'{}' is not a valid email address", input);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_email() {
        assert!(check_email("ada@example.com").is_ok());
        assert!(check_email("  ada@mail.example.co.uk ").is_ok());
        assert!(check_email("").is_err());
        assert!(check_email("ada").is_err());
        assert!(check_email("ada@example").is_err());
        assert!(check_email("@example.com").is_err());
        assert!(check_email("ada@.com").is_err());
        assert!(check_email("ada@example.").is_err());
        assert!(check_email("a da@example.com").is_err());
        assert!(check_email("a@b@example.com").is_err());
    }

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }
}
