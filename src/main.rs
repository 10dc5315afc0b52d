//! # Connection Resolver CLI
//!
//! Reads a finished board and prints which player has joined their edges.
//!
//! The board is read from a file, or from stdin when no file (or `-`) is
//! given. Both the dense form (`OXX`) and the skewed rhombus form
//! (`O X X` with growing indentation) are accepted.
//!
//! ## Usage
//! ```text
//! resolve board.txt --stats
//! printf 'OXX\nXOO\nXXO\n' | resolve --tie-break first-reported
//! ```

use clap::Parser;
use colored::Colorize;
use connect::board::{Board, Marks, Player};
use connect::config::{ResolverConfig, TieBreak};
use connect::error::{ConfigError, ResolveError};
use connect::{Resolver, SearchStatistics};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Board file; stdin when omitted or "-"
    board: Option<PathBuf>,

    /// TOML configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Search threads (0 = one per CPU); overrides the config file
    #[clap(short, long)]
    num_threads: Option<usize>,

    /// Policy when several origins reach their goal edge
    #[clap(long, value_parser = ["scan-order", "first-reported"])]
    tie_break: Option<String>,

    /// Echo the parsed board before the result
    #[clap(long, action = clap::ArgAction::SetTrue)]
    show_board: bool,

    /// Print search statistics after the result
    #[clap(long, action = clap::ArgAction::SetTrue)]
    stats: bool,

    /// Debug logging
    #[clap(short, long, action = clap::ArgAction::SetTrue)]
    verbose: bool,
}

/// Errors surfaced by the command line front end
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("failed to read board: {0}")]
    Io(#[from] io::Error),

    #[error("invalid argument: {0}")]
    Argument(String),
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<(), CliError> {
    let config = load_configuration(args)?;
    debug!(?config, "configuration");

    let text = read_board_text(args)?;
    let board = Board::parse_with_marks(&text, config.marks)?;
    info!("board {}x{}", board.rows(), board.cols());
    if args.show_board {
        print!("{}", board);
    }

    let resolver = Resolver::new(&config)?;
    let resolution = resolver.resolve_with_report(&board)?;

    match resolution.winner {
        Some(player) => println!("winner: {}", paint(player, &config.marks)),
        None => println!("winner: {}", "none".dimmed()),
    }
    if args.stats {
        print_stats(&resolution.statistics, resolver.threads(), resolver.tie_break());
    }
    Ok(())
}

/// Load configuration from file or use defaults, then apply flag overrides
fn load_configuration(args: &Args) -> Result<ResolverConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            ResolverConfig::load(path)?
        }
        None => ResolverConfig::default(),
    };

    if let Some(threads) = args.num_threads {
        config.threads = threads;
    }
    if let Some(policy) = &args.tie_break {
        config.tie_break = policy.parse::<TieBreak>().map_err(CliError::Argument)?;
    }
    config.validate()?;
    Ok(config)
}

fn read_board_text(args: &Args) -> Result<String, CliError> {
    match &args.board {
        Some(path) if path.as_os_str() != "-" => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn paint(player: Player, marks: &Marks) -> colored::ColoredString {
    let mark = marks.mark(player).to_string();
    match player {
        Player::X => mark.red().bold(),
        Player::O => mark.blue().bold(),
    }
}

fn print_stats(stats: &SearchStatistics, threads: usize, tie_break: TieBreak) {
    println!("Search statistics:");
    println!("  Threads: {}", threads);
    println!("  Tie-break: {}", tie_break);
    println!("  Origins: {}", stats.origins);
    println!("  Cells visited: {}", stats.cells_visited);
    println!(
        "  Workers won/exhausted/cancelled: {}/{}/{}",
        stats.winning_workers, stats.exhausted_workers, stats.cancelled_workers
    );
    println!("  Time: {:.3}ms", stats.elapsed.as_secs_f64() * 1000.0);
}
