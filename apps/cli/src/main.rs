//! Voider CLI - Write to and recall from the void without the overlay
//!
//! Uses the same void directory and parsing as the desktop overlay, so
//! anything written here shows up in recall there and vice versa.
//!
//! Usage:
//!   voider write <text>    - Append fragments (a leading `0` archives)
//!   voider archive [name]  - Archive the active file
//!   voider recall          - Print a random archived line
//!   voider list            - List archives with line counts
//!   voider status          - Show void location and counts
//!   voider config [--init] - Show settings, or write them to voider.toml

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use voider_core::{
    config::default_config_path, index::line_counts, ArchiveTarget, Commit, Config, Indexer,
    Recall, Void,
};

const INDEX_TIMEOUT: Duration = Duration::from_secs(300);

/// Voider CLI - Throw thoughts into the void
#[derive(Parser)]
#[command(name = "voider")]
#[command(about = "Write to and recall from the void", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this void directory instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    void_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Commit text to the active file, exactly as the overlay would
    Write {
        /// Text to commit; `.` splits it into fragments
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Archive the active file and start a fresh one
    Archive {
        /// Archive name without `.txt` (random digits if omitted)
        name: Option<String>,
    },

    /// Print random lines from the archives
    Recall {
        /// Number of lines to print
        #[arg(short, long, default_value = "1")]
        count: usize,
    },

    /// List archives with their line counts
    List,

    /// Show void location and counts
    Status,

    /// Show the effective settings
    Config {
        /// Write the effective settings to the config file
        #[arg(long)]
        init: bool,

        /// Overwrite an existing config file when used with --init
        #[arg(long, requires = "init")]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("voider={}", log_level).parse()?)
                .add_directive(format!("voider_core={}", log_level).parse()?),
        )
        .with_target(false)
        .init();

    let config = load_config(cli.void_dir)?;
    if let Commands::Config { init, force } = cli.command {
        return cmd_config(&config, init, force);
    }

    debug!("Opening void at {:?}", config.void_dir);
    let void = Void::from_config(&config)
        .with_context(|| format!("Cannot open void at {}", config.void_dir.display()))?;

    match cli.command {
        Commands::Write { text } => cmd_write(&void, &text.join(" ")),
        Commands::Archive { name } => cmd_archive(&void, name),
        Commands::Recall { count } => cmd_recall(&void, count),
        Commands::List => cmd_list(&void),
        Commands::Status => cmd_status(&void),
        Commands::Config { .. } => unreachable!("handled before opening the void"),
    }
}

// ============ WRITE COMMAND ============

fn cmd_write(void: &Void, text: &str) -> Result<()> {
    let commit = void.commit(text).context("Failed to commit to the void")?;
    println!("{}", describe_commit(&commit));
    Ok(())
}

fn describe_commit(commit: &Commit) -> String {
    match commit {
        Commit::Nothing => "Nothing to write".dimmed().to_string(),
        Commit::Appended { segments } => format!(
            "{} {} fragment(s) into the void",
            "✓".green(),
            segments.to_string().cyan()
        ),
        Commit::Archived { path } => format!(
            "{} Archived to {}",
            "✓".green(),
            path.display().to_string().cyan()
        ),
    }
}

// ============ ARCHIVE COMMAND ============

fn cmd_archive(void: &Void, name: Option<String>) -> Result<()> {
    let target = match name {
        Some(name) => ArchiveTarget::Named(name),
        None => ArchiveTarget::Random,
    };

    let path = void
        .archive(&target)
        .context("Failed to archive the active file")?;
    println!("{}", describe_commit(&Commit::Archived { path }));
    Ok(())
}

// ============ RECALL COMMAND ============

fn cmd_recall(void: &Void, count: usize) -> Result<()> {
    let indexer = Indexer::start(void.clone()).context("Failed to start indexing")?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("  {spinner:.cyan} {msg}")?);
    spinner.set_message("Please wait, indexing lines...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let finished = indexer.wait_idle(INDEX_TIMEOUT);
    spinner.finish_and_clear();

    if !finished {
        anyhow::bail!("Indexing did not finish within {:?}", INDEX_TIMEOUT);
    }

    for _ in 0..count {
        match indexer.recall() {
            Recall::Line(line) => println!("{}", line),
            Recall::Empty => {
                println!("{}", "nothing found in the void".yellow());
                break;
            }
            Recall::Busy => {
                println!("{}", "Please wait, indexing lines...".yellow());
                break;
            }
        }
    }

    Ok(())
}

// ============ LIST COMMAND ============

fn cmd_list(void: &Void) -> Result<()> {
    let counts = line_counts(void).context("Failed to read archives")?;
    if counts.is_empty() {
        println!("{}", "No archives yet".dimmed());
        return Ok(());
    }

    for (path, lines) in counts {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let modified = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| "-".to_string());
        println!(
            "{:<32} {:>6} lines  {}",
            name.cyan(),
            lines,
            modified.dimmed()
        );
    }

    Ok(())
}

// ============ STATUS COMMAND ============

fn cmd_status(void: &Void) -> Result<()> {
    println!("{}", "Voider Status".bold().cyan());
    println!();

    let stats = void.stats().context("Failed to read the void")?;
    let recallable: usize = line_counts(void)?.iter().map(|(_, n)| n).sum();

    println!("Void:       {}", void.dir().display());
    println!("Config:     {}", default_config_path().display());
    println!(
        "Active:     {} ({} fragments, {} bytes)",
        void.active_file_name(),
        stats.active_fragments.to_string().cyan(),
        stats.active_bytes
    );
    println!("Archives:   {}", stats.archives.to_string().cyan());
    println!("Recallable: {}", recallable.to_string().cyan());

    Ok(())
}

// ============ CONFIG COMMAND ============

fn cmd_config(config: &Config, init: bool, force: bool) -> Result<()> {
    if init {
        let path = default_config_path();
        if path.exists() && !force {
            println!(
                "{} already exists (use {} to overwrite)",
                path.display().to_string().yellow(),
                "--force".cyan()
            );
            return Ok(());
        }
        let path = config
            .save_default()
            .context("Failed to write config file")?;
        println!("{} Wrote {}", "✓".green(), path.display().to_string().cyan());
        return Ok(());
    }

    println!("{}", "Voider Config".bold().cyan());
    println!();
    println!("File:        {}", default_config_path().display());
    println!("Void:        {}", config.void_dir.display());
    println!("Active file: {}", config.active_file);
    println!("Opacity:     {}", config.overlay.opacity);
    println!(
        "Ring:        {}px, {}px margin",
        config.overlay.ring_thickness, config.overlay.ring_margin
    );
    println!(
        "Font:        {} {}pt",
        config.overlay.font_family, config.overlay.font_size
    );
    Ok(())
}

// ============ HELPER FUNCTIONS ============

/// Resolve config: file, then `VOIDER_DIR`, then `--void-dir`.
fn load_config(void_dir: Option<PathBuf>) -> Result<Config> {
    let mut config = Config::resolve().context("Cannot load config")?;
    if let Some(dir) = void_dir {
        config.void_dir = dir;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_write_joins_words() {
        let cli = Cli::try_parse_from(["voider", "write", "one", "two.", "three"]).unwrap();
        match cli.command {
            Commands::Write { text } => assert_eq!(text.join(" "), "one two. three"),
            _ => panic!("expected write"),
        }
    }

    #[test]
    fn test_write_requires_text() {
        assert!(Cli::try_parse_from(["voider", "write"]).is_err());
    }

    #[test]
    fn test_global_void_dir() {
        let cli = Cli::try_parse_from(["voider", "status", "--void-dir", "/tmp/v"]).unwrap();
        assert_eq!(cli.void_dir, Some(PathBuf::from("/tmp/v")));
    }

    #[test]
    fn test_config_force_requires_init() {
        assert!(Cli::try_parse_from(["voider", "config", "--force"]).is_err());
        let cli = Cli::try_parse_from(["voider", "config", "--init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                init: true,
                force: true
            }
        ));
    }

    #[test]
    fn test_write_with_leading_zero_archives() -> Result<()> {
        let temp = TempDir::new()?;
        let void = Void::open(temp.path(), "0.txt")?;

        cmd_write(&void, "kept")?;
        cmd_write(&void, "0x")?;

        assert_eq!(
            std::fs::read_to_string(temp.path().join("x.txt"))?,
            "kept\n.\n"
        );
        assert_eq!(std::fs::read_to_string(temp.path().join("0.txt"))?, "");
        Ok(())
    }

    #[test]
    fn test_write_then_archive() -> Result<()> {
        let temp = TempDir::new()?;
        let void = Void::open(temp.path(), "0.txt")?;

        cmd_write(&void, "one. two")?;
        cmd_archive(&void, Some("done".to_string()))?;

        assert_eq!(
            std::fs::read_to_string(temp.path().join("done.txt"))?,
            "one\n.\ntwo\n.\n"
        );
        Ok(())
    }
}
