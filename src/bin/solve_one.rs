//! Ask the external engine for one decision.
//!
//! Usage:
//!   cargo run --release --bin solve_one -- [FILE] [--cli PATH]
//!
//! Reads a spot JSON from FILE (or stdin), sends it to the engine found at
//! `--cli`, `$QUASAR_CLI` or `build/engine/quasar_cli`, and prints the
//! legal-action summary and action distribution.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use quasar_core::engine_api::{CliSolver, Spot, SpotSolver};

fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(p) if p != "-" => fs::read_to_string(p),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let mut input: Option<String> = None;
    let mut cli: Option<String> = None;
    let mut raw_output = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--cli" => {
                i += 1;
                if i < args.len() {
                    cli = Some(args[i].clone());
                }
            }
            "--raw" => raw_output = true,
            "--help" | "-h" => {
                println!("Usage: solve_one [FILE] [--cli PATH] [--raw]");
                return ExitCode::SUCCESS;
            }
            other => input = Some(other.to_string()),
        }
        i += 1;
    }

    let solver = match cli {
        Some(path) => CliSolver::new(path),
        None => match CliSolver::discover() {
            Ok(solver) => solver,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
    };
    log::info!("engine: {}", solver.program().display());

    let raw = match read_input(input.as_deref()) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error reading input: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if raw_output {
        return match solver.solve_json(&raw) {
            Ok(out) => {
                println!("{}", out.trim_end());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Solve failed: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let spot: Spot = match serde_json::from_str(&raw) {
        Ok(spot) => spot,
        Err(e) => {
            eprintln!("Invalid spot: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let response = match solver.solve_one_move(&spot) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("Solve failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let legal = &response.legal;
    println!("Street: {:?} | To act: seat {}", spot.street, spot.to_act);
    println!("Can check: {} | Can fold: {} | Call: {:.2}", legal.can_check, legal.can_fold, legal.call_amount);
    if let Some(bet) = legal.bet {
        println!("Bet to: {:.2} .. {:.2}", bet.min_to, bet.max_to);
    }
    if let Some(raise) = legal.raise {
        println!("Raise to: {:.2} .. {:.2}", raise.min_to, raise.max_to);
    }
    println!();
    println!("{:<10} {:>10} {:>8}", "Action", "Amount", "Prob");
    for wa in &response.uniform_actions {
        let name = wa
            .action
            .kind()
            .map_or_else(|| format!("#{}", wa.action.code), |k| format!("{:?}", k));
        println!("{:<10} {:>10.2} {:>7.1}%", name, wa.action.amount, wa.prob * 100.0);
    }

    ExitCode::SUCCESS
}
