use std::process::ExitCode;
use std::time::Instant;

use chess_rules::perft::{perft, perft_divide};
use chess_rules::{Position, STARTING_POSITION};
use clap::Parser;

/// Count move-tree leaf nodes from a position.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Six-field position text
    #[arg(long, default_value = STARTING_POSITION)]
    fen: String,

    /// Search depth in plies
    #[arg(short, long, default_value_t = 4)]
    depth: u32,

    /// Print the count below each root move
    #[arg(long)]
    divide: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let position = match Position::from_text(&args.fen) {
        Ok(position) => position,
        Err(e) => {
            eprintln!("invalid position: {e}");
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let nodes = if args.divide {
        let divided = perft_divide(&position, args.depth);
        for (mv, count) in &divided {
            println!("{mv}: {count}");
        }
        divided.iter().map(|(_, count)| count).sum()
    } else {
        perft(&position, args.depth)
    };
    let elapsed = start.elapsed();

    println!();
    println!("Nodes searched: {nodes}");
    log::info!(
        "perft({}) took {:.3}s ({:.0} nodes/s)",
        args.depth,
        elapsed.as_secs_f64(),
        nodes as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    ExitCode::SUCCESS
}
