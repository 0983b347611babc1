use anyhow::{Context, Result};
use clap::Parser;
use namekeeper_core::Keeper;
use std::path::{Path, PathBuf};

/// Namekeeper - content-based filename records for media directories
#[derive(Parser)]
#[command(name = "namekeeper")]
#[command(about = "Record media filenames by content and restore them after renames", long_about = None)]
#[command(version)]
struct Cli {
    /// What to do: "record" the current names or "restore" them (case-insensitive)
    command: String,

    /// Directory to manage (defaults to the directory containing the executable)
    #[arg(short, long)]
    directory: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Determine target directory: CLI arg > the executable's own directory
    let directory = match cli.directory {
        Some(dir) => dir,
        None => default_directory()?,
    };

    match cli.command.to_lowercase().as_str() {
        "record" => cmd_record(&directory),
        "restore" => cmd_restore(&directory),
        _ => {
            println!("Unrecognized command: {}", cli.command);
            Ok(())
        }
    }
}

/// The directory containing the running executable.
fn default_directory() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    let dir = exe
        .parent()
        .context("Executable has no parent directory")?;
    Ok(dir.to_path_buf())
}

fn cmd_record(directory: &Path) -> Result<()> {
    let keeper = Keeper::new(directory)
        .with_context(|| format!("Failed to open directory {}", directory.display()))?;

    let summary = keeper
        .record()
        .with_context(|| format!("Failed to record names in {}", directory.display()))?;

    println!(
        "Scanned {} media files in {}",
        summary.scanned,
        directory.display()
    );
    println!(
        "Added {} new records ({} total)",
        summary.added, summary.total
    );

    Ok(())
}

fn cmd_restore(directory: &Path) -> Result<()> {
    let keeper = Keeper::new(directory)
        .with_context(|| format!("Failed to open directory {}", directory.display()))?;

    let report = keeper
        .restore()
        .with_context(|| format!("Failed to restore names in {}", directory.display()))?;

    if report.moved == 0 && report.skipped == 0 {
        println!("Nothing to restore in {}", directory.display());
    } else {
        println!("Restored {} files, skipped {}", report.moved, report.skipped);
    }

    Ok(())
}
