use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use fshred::batch::{spawn_batch, BatchEvent, BatchSummary, CancellationToken};
use fshred::ui::progress::{format_summary, BatchProgress};
use fshred::{enumerate, DeletionMethod, Enumeration, ShredConfig};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "fshred")]
#[command(about = "Securely overwrite and delete files and directory trees")]
#[command(version = "1.0.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Print engine events as JSON lines instead of the progress view
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Overwrite and delete files (directories are walked recursively)
    Shred {
        /// Files or directories to destroy
        #[arg(required = true)]
        targets: Vec<PathBuf>,

        /// Deletion method (simple, dod3, dod7, gutmann, random:<n>, zerofill)
        #[arg(short, long, env = "FSHRED_METHOD", default_value = "dod3")]
        method: String,

        /// Do not descend into directories
        #[arg(long)]
        no_recursive: bool,

        /// Skip the typed confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show what would be shredded without touching anything
    List {
        #[arg(required = true)]
        targets: Vec<PathBuf>,

        /// Do not descend into directories
        #[arg(long)]
        no_recursive: bool,
    },

    /// List the available deletion methods
    Methods,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let guard = init_logging(cli.debug, cli.log_file.as_deref())?;

    let exit_code = match &cli.command {
        Commands::Shred {
            targets,
            method,
            no_recursive,
            yes,
        } => {
            let config = build_shred_config(method, !no_recursive)?;
            shred_targets(targets.clone(), config, *yes, cli.json).await?
        }
        Commands::List {
            targets,
            no_recursive,
        } => {
            list_targets(targets, !no_recursive, cli.json)?;
            0
        }
        Commands::Methods => {
            print_methods(cli.json)?;
            0
        }
    };

    if exit_code != 0 {
        // Flush the log writer before exiting without unwinding
        drop(guard);
        std::process::exit(exit_code);
    }

    Ok(())
}

fn init_logging(debug: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let console = fmt::layer().with_target(false).with_writer(io::stderr);

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("Invalid log file path: {}", path.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));

            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(fmt::layer().json().with_writer(writer))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .init();
            Ok(None)
        }
    }
}

fn build_shred_config(method: &str, recursive: bool) -> Result<ShredConfig> {
    let method: DeletionMethod = method
        .parse()
        .with_context(|| format!("try one of: {}", method_ids().join(", ")))?;

    Ok(ShredConfig { method, recursive })
}

fn method_ids() -> Vec<String> {
    DeletionMethod::ALL.iter().map(|m| m.to_string()).collect()
}

async fn shred_targets(
    targets: Vec<PathBuf>,
    config: ShredConfig,
    assume_yes: bool,
    json: bool,
) -> Result<i32> {
    let preview = enumerate(&targets, config.recursive);

    // Prompts go to stderr so `--json` output on stdout stays parseable
    if !assume_yes && !preview.is_empty() {
        eprintln!(
            "\n{} This will permanently destroy {} file(s).",
            "WARNING:".red().bold(),
            preview.files.len()
        );
        eprintln!("Method: {}", config.method.label());
        for target in &targets {
            eprintln!("  {}", target.display());
        }
        if !preview.skipped.is_empty() {
            eprintln!("{} target(s) will be skipped.", preview.skipped.len());
        }

        eprint!("\nType 'DELETE' to confirm: ");
        io::stderr().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if input.trim() != "DELETE" {
            eprintln!("Operation cancelled.");
            return Ok(0);
        }
    }

    let token = CancellationToken::new();
    setup_signal_handlers(token.clone())?;

    let started = Instant::now();
    let mut handle = spawn_batch(targets, config, token)?;

    let mut progress = if json {
        BatchProgress::hidden()
    } else {
        BatchProgress::new()
    };
    while let Some(event) = handle.events.recv().await {
        if json {
            print_json_event(&event)?;
        }
        progress.handle(&event);
        if event.is_terminal() {
            break;
        }
    }

    let summary = tokio::task::spawn_blocking(move || handle.join()).await??;
    info!(
        session = %summary.session_id,
        elapsed = %humantime::format_duration(started.elapsed()),
        "shred finished"
    );

    report(&summary, json)?;

    Ok(if summary.is_clean() { 0 } else { 1 })
}

fn print_json_event(event: &BatchEvent) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, event)?;
    writeln!(stdout)?;
    Ok(())
}

fn report(summary: &BatchSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(summary)?);
        return Ok(());
    }

    println!();
    let title = if summary.cancelled {
        "Shred interrupted".yellow().bold()
    } else if summary.is_clean() {
        "Shred complete".green().bold()
    } else {
        "Shred finished with errors".red().bold()
    };
    println!("{}", title);
    println!("{}", format_summary(summary));
    Ok(())
}

fn list_targets(targets: &[PathBuf], recursive: bool, json: bool) -> Result<()> {
    let enumeration = enumerate(targets, recursive);

    if json {
        println!("{}", serde_json::to_string_pretty(&enumeration)?);
        return Ok(());
    }

    for file in &enumeration.files {
        println!("{}", file.display());
    }
    print_skipped(&enumeration);
    println!(
        "\n{} file(s), {} skipped",
        enumeration.files.len(),
        enumeration.skipped.len()
    );
    Ok(())
}

fn print_skipped(enumeration: &Enumeration) {
    for skipped in &enumeration.skipped {
        eprintln!(
            "{}",
            format!("skipped {}: {}", skipped.path.display(), skipped.reason).yellow()
        );
    }
}

fn print_methods(json: bool) -> Result<()> {
    if json {
        let methods: Vec<_> = DeletionMethod::ALL
            .iter()
            .map(|m| {
                serde_json::json!({
                    "id": m.to_string(),
                    "label": m.label(),
                    "passes": m.pass_count(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&methods)?);
        return Ok(());
    }

    println!("{:<12} {:>6}  {}", "ID", "PASSES", "DESCRIPTION");
    for method in DeletionMethod::ALL {
        println!(
            "{:<12} {:>6}  {}",
            method.to_string(),
            method.pass_count(),
            method.label()
        );
    }
    println!("{:<12} {:>6}  {}", "random:<n>", "n", "Random n-Pass");
    Ok(())
}

// Signal handler for graceful shutdown
fn setup_signal_handlers(token: CancellationToken) -> Result<()> {
    use signal_hook::{consts::SIGINT, iterator::Signals};

    let mut signals = Signals::new([SIGINT])?;

    std::thread::spawn(move || {
        for sig in signals.forever() {
            if sig == SIGINT {
                eprintln!("\n\nInterrupt received! Stopping after the current file...");
                token.cancel();
            }
        }
    });

    Ok(())
}
