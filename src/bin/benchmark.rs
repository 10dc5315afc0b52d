use clap::Parser;
use connect::board::{Board, Marks};
use connect::config::{ResolverConfig, TieBreak};
use connect::{Resolver, SearchStatistics};
use rand_xoshiro::rand_core::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::process::ExitCode;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Board side length (default: 11)
    #[arg(long, default_value_t = 11)]
    board_size: usize,

    /// Number of random boards to resolve (default: 1000)
    #[arg(long, default_value_t = 1000)]
    boards: usize,

    /// Percentage of cells left empty (default: 0, a completely filled board)
    #[arg(long, default_value_t = 0)]
    empty_percent: u32,

    /// Number of search threads, 0 for one per CPU (default: 0)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Seed for board generation (default: 42)
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Tie-break policy
    #[arg(long, default_value = "scan-order", value_parser = ["scan-order", "first-reported"])]
    tie_break: String,

    /// Worker stack size in MiB (default: 8)
    #[arg(long, default_value_t = 8)]
    stack_size_mib: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();

    println!("Connection Resolver - Benchmark Tool");
    println!("====================================");
    println!("Board: {}x{}", args.board_size, args.board_size);
    println!("Boards: {}", args.boards);
    println!("Empty cells: {}%", args.empty_percent);
    println!("Seed: {}", args.seed);
    println!("------------------------------------");

    #[cfg(debug_assertions)]
    println!("WARNING: Running in debug mode. Performance will be significantly lower.\nUse --release for accurate benchmarks.\n");

    let tie_break = match args.tie_break.parse::<TieBreak>() {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let config = ResolverConfig {
        threads: args.threads,
        tie_break,
        stack_size_mib: args.stack_size_mib,
        ..Default::default()
    };
    let resolver = match Resolver::new(&config) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("Threads: {}", resolver.threads());

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(args.seed);
    let mut x_wins = 0usize;
    let mut o_wins = 0usize;
    let mut draws = 0usize;

    let start = Instant::now();
    for _ in 0..args.boards {
        let rows = random_rows(&mut rng, args.board_size, args.empty_percent);
        let board = match Board::from_rows_with_marks(&rows, Marks::default()) {
            Ok(board) => board,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        };
        match resolver.resolve(&board) {
            Ok(Some(connect::board::Player::X)) => x_wins += 1,
            Ok(Some(connect::board::Player::O)) => o_wins += 1,
            Ok(None) => draws += 1,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    let duration = start.elapsed();

    println!("\nOutcomes: X {} / O {} / none {}", x_wins, o_wins, draws);
    if args.empty_percent == 0 && draws > 0 {
        println!("WARNING: {} filled boards resolved without a winner", draws);
    }
    print_stats(&resolver.statistics(), duration, args.boards);
    ExitCode::SUCCESS
}

/// Generates a square board; each cell is empty with the given percentage,
/// otherwise X or O with equal odds.
fn random_rows(rng: &mut Xoshiro256PlusPlus, size: usize, empty_percent: u32) -> Vec<String> {
    (0..size)
        .map(|_| {
            (0..size)
                .map(|_| {
                    if rng.next_u32() % 100 < empty_percent {
                        '.'
                    } else if rng.next_u32() & 1 == 0 {
                        'X'
                    } else {
                        'O'
                    }
                })
                .collect()
        })
        .collect()
}

fn print_stats(stats: &SearchStatistics, duration: Duration, boards: usize) {
    let secs = duration.as_secs_f64();
    let bps = boards as f64 / secs;
    let cps = stats.cells_visited as f64 / secs;

    println!("Results:");
    println!("  Time: {:.3}s", secs);
    println!("  Boards/sec: {:.0}", bps);
    println!("  Cells visited: {}", stats.cells_visited);
    println!("  Cells/sec: {:.0}", cps);
    println!("  Workers started: {}", stats.origins);
    println!(
        "  Workers won/exhausted/cancelled: {}/{}/{}",
        stats.winning_workers, stats.exhausted_workers, stats.cancelled_workers
    );
}
