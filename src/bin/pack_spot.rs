//! Pack one decision point into a model input batch.
//!
//! Usage:
//!   cargo run --release --bin pack_spot -- [FILE] [--pretty]
//!
//! Reads a decision point JSON from FILE, or from stdin when FILE is absent
//! or "-", and prints the packed `[1, P, 8 + K]` batch as JSON.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use serde::Serialize;

use quasar_core::transforms::DecisionPoint;

#[derive(Serialize)]
struct PackedOutput {
    shape: [usize; 3],
    x: Vec<Vec<f32>>,
    mask: Vec<f32>,
}

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
    let mut pretty = false;

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--pretty" | "-p" => pretty = true,
            "--help" | "-h" => {
                println!("Usage: pack_spot [FILE] [--pretty]");
                return ExitCode::SUCCESS;
            }
            other => input = Some(other.to_string()),
        }
    }

    let raw = match read_input(input.as_deref()) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error reading input: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let batch = match DecisionPoint::from_json_str(&raw).and_then(|dp| dp.pack()) {
        Ok(batch) => batch,
        Err(e) => {
            eprintln!("Packing failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let output = PackedOutput {
        shape: [1, batch.num_players(), batch.feature_dim()],
        x: batch.players().outer_iter().map(|row| row.to_vec()).collect(),
        mask: batch.mask.iter().copied().collect(),
    };

    let json = if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    };
    match json {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            ExitCode::FAILURE
        }
    }
}
