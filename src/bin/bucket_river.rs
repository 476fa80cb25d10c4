//! River hand bucketing binary.
//!
//! Usage:
//!   cargo run --release --bin bucket_river -- --board <CARDS> [OPTIONS]
//!
//! Options:
//!   --board <CARDS>      River board as ids ("0,12,25,38,51") or text ("2cAcAdAhAs")
//!   --config <FILE>      Bucketing configuration JSON file (optional)
//!   --buckets <N>        Number of buckets (default: 50)
//!   --iterations <N>     Refinement rounds (default: 50)
//!   --seed <N>           Random seed (default: 42)
//!   --stride <N>         Keep every N-th hand of the population (default: 1)
//!   --sequential         Disable parallel assignment
//!   --output <FILE>      Output file (default: buckets.json)

use std::env;
use std::fs::File;
use std::io::Write;
use std::process::ExitCode;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use quasar_core::bucketing::{bucket_hands_with_progress, BucketingConfig};
use quasar_core::cards::{parse_cards, Board, Hand};

#[derive(Serialize)]
struct BucketOutput {
    board: Vec<i32>,
    k: usize,
    rounds: usize,
    config: BucketingConfig,
    cluster_sizes: Vec<usize>,
    centers: Vec<Vec<f32>>,
    hands: Vec<[i32; 4]>,
    labels: Vec<usize>,
}

fn print_help() {
    println!("Usage: bucket_river --board <CARDS> [--config FILE] [--buckets N] [--iterations N]");
    println!("                    [--seed N] [--stride N] [--sequential] [--output FILE]");
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    let mut board_arg: Option<String> = None;
    let mut config_file: Option<String> = None;
    let mut buckets: Option<usize> = None;
    let mut iterations: Option<usize> = None;
    let mut seed: Option<u64> = None;
    let mut stride: usize = 1;
    let mut sequential = false;
    let mut output_file = "buckets.json".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--board" | "-b" => {
                i += 1;
                if i < args.len() {
                    board_arg = Some(args[i].clone());
                }
            }
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(args[i].clone());
                }
            }
            "--buckets" | "-k" => {
                i += 1;
                if i < args.len() {
                    buckets = args[i].parse().ok();
                }
            }
            "--iterations" | "-i" => {
                i += 1;
                if i < args.len() {
                    iterations = args[i].parse().ok();
                }
            }
            "--seed" | "-s" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().ok();
                }
            }
            "--stride" => {
                i += 1;
                if i < args.len() {
                    stride = args[i].parse::<usize>().unwrap_or(1).max(1);
                }
            }
            "--sequential" => {
                sequential = true;
            }
            "--output" | "-o" => {
                i += 1;
                if i < args.len() {
                    output_file = args[i].clone();
                }
            }
            "--help" | "-h" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    let Some(board_arg) = board_arg else {
        eprintln!("--board is required");
        print_help();
        return ExitCode::FAILURE;
    };
    let board = match parse_cards(&board_arg).and_then(Board::from_cards) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("Invalid board: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut config = match &config_file {
        Some(path) => match BucketingConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => BucketingConfig::default(),
    };
    if let Some(k) = buckets {
        config = config.with_buckets(k);
    }
    if let Some(n) = iterations {
        config = config.with_iterations(n);
    }
    if let Some(s) = seed {
        config = config.with_seed(s);
    }
    if sequential {
        config = config.with_parallel(false);
    }
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let hands: Vec<Hand> = Hand::enumerate_excluding(&board).into_iter().step_by(stride).collect();

    println!("=================================================");
    println!("  River Bucketing");
    println!("=================================================");
    println!("Board: {} ({:?})", board, board.ids());
    println!("Hands: {}", hands.len());
    println!("Buckets: {} | Rounds: {} | Seed: {}", config.num_buckets, config.iterations, config.seed);
    println!();

    let bar = ProgressBar::new(config.iterations as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} rounds {msg}") {
        bar.set_style(style);
    }

    let start = Instant::now();
    let result = bucket_hands_with_progress(&board, &hands, &config, |stats| {
        bar.set_message(format!("changed {} reseeded {}", stats.changed, stats.reseeded));
        bar.inc(1);
    });
    bar.finish();

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Bucketing failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let sizes = result.cluster_sizes();
    println!();
    println!("Done in {:.2}s ({} rounds)", start.elapsed().as_secs_f64(), result.rounds);
    println!("Realized buckets: {}", result.k);
    println!(
        "Bucket sizes: min {} / max {}",
        sizes.iter().min().copied().unwrap_or(0),
        sizes.iter().max().copied().unwrap_or(0)
    );

    let output = BucketOutput {
        board: board.ids(),
        k: result.k,
        rounds: result.rounds,
        config,
        cluster_sizes: sizes,
        centers: result.centers.outer_iter().map(|row| row.to_vec()).collect(),
        hands: hands.iter().map(Hand::ids).collect(),
        labels: result.labels,
    };

    let json = match serde_json::to_string(&output) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            return ExitCode::FAILURE;
        }
    };
    match File::create(&output_file).and_then(|mut f| f.write_all(json.as_bytes())) {
        Ok(_) => println!("Saved: {}", output_file),
        Err(e) => {
            eprintln!("Error saving {}: {}", output_file, e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
