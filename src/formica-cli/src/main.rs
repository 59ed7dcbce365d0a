// Copyright 2026 The Formica Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fs;
use std::result::Result as StdResult;

use pico_args::Arguments;

use formica_engine::eprintln;
use formica_engine::{
    CandidateSet, Reference, Role, SolutionSet, Specs, search, simulate, write_comparison_file,
};

const VERSION: &str = "0.1.0";
const EXIT_FAILURE: i32 = 1;

macro_rules! die(
    ($($arg:tt)*) => { {
        eprintln!($($arg)*);
        std::process::exit(EXIT_FAILURE)
    } }
);

fn usage() -> ! {
    let argv0 = std::env::args()
        .next()
        .unwrap_or_else(|| "formica".to_string());
    die!(
        concat!(
            "formica {}: Rebuild colony quorum-sensing models from regression results.\n\
         \n\
         USAGE:\n",
            "    {} [OPTION...] COLONY_SIZE QUORUM TRAINING_FILE...\n",
            "\n\
         OPTIONS:\n",
            "    -h, --help       show this message\n",
            "    --results FILE   path to the results dump (default: results.txt)\n",
            "    --output FILE    path to write the comparison CSV (default: final_combination.csv)\n",
        ),
        VERSION,
        argv0
    );
}

#[derive(Clone, Debug)]
struct Args {
    results: String,
    output: String,
    colony_size: i64,
    quorum: i64,
    training: Vec<String>,
}

fn parse_args() -> StdResult<Args, Box<dyn std::error::Error>> {
    let mut parsed = Arguments::from_env();
    if parsed.contains(["-h", "--help"]) {
        usage();
    }

    let results = parsed
        .opt_value_from_str("--results")?
        .unwrap_or_else(|| "results.txt".to_string());
    let output = parsed
        .opt_value_from_str("--output")?
        .unwrap_or_else(|| "final_combination.csv".to_string());

    let free_arguments = parsed.finish();
    if free_arguments.len() < 3 {
        eprintln!("error: too few command line arguments");
        usage();
    }

    let free: Vec<String> = free_arguments
        .into_iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let colony_size = match free[0].parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            die!("error: invalid colony size '{}'", free[0]);
        }
    };
    let quorum = match free[1].parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            die!("error: invalid quorum size '{}'", free[1]);
        }
    };

    Ok(Args {
        results,
        output,
        colony_size,
        quorum,
        training: free[2..].to_vec(),
    })
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {}", err);
            usage();
        }
    };

    let content = match fs::read_to_string(&args.results) {
        Ok(content) => content,
        Err(err) => {
            die!("error: unable to open '{}': {}", &args.results, err);
        }
    };

    let solutions = match SolutionSet::parse(&content) {
        Ok(solutions) => solutions,
        Err(err) => {
            die!("error: '{}': {}", &args.results, err);
        }
    };
    let candidates = CandidateSet::compile(&solutions);

    // the first training file drives both scoring and export
    let reference = match Reference::load(&args.training[0]) {
        Ok(reference) => reference,
        Err(err) => {
            die!("error: {}", err);
        }
    };

    let specs = Specs::new(args.colony_size, args.quorum);

    let best = match search(&candidates, &specs, &reference) {
        Ok(best) => best,
        Err(err) => {
            die!("error: {}", err);
        }
    };

    println!("best model (R^2 = {:.6}):", best.score);
    for role in Role::ALL {
        println!("  d{:<2} = {}", role.as_str(), best.model.rate(role).source());
    }

    let trajectory = simulate(&best.model, &specs);
    if let Err(err) = write_comparison_file(&trajectory, &reference, &args.output) {
        die!("error: {}", err);
    }
    println!("wrote {}", args.output);
}
