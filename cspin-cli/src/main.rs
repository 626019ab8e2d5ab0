// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2026, cspin authors.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License.  You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the
// License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either
// express or implied.  See the License for the specific language governing permissions and
// limitations under the License.
// ------------------------------------------------------------------------------------------------

//! The `cspin` binary: load a source file, run it, print the outcome.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use cspin_cli::parse_program;
use cspin_core::evaluate_program;
use cspin_core::evaluate_program_seeded;
use cspin_core::Outcome;
use tracing_subscriber::EnvFilter;

/// Interpret CSP-style process definitions against an environment trace.
#[derive(Debug, Parser)]
#[command(name = "cspin", version)]
struct Args {
    /// File containing the process definitions to interpret.
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    file: PathBuf,

    /// Seed for nondeterministic choice, for reproducible runs.
    #[arg(long, value_name = "N")]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(outcome) => {
            println!("{outcome}");
            match outcome {
                Outcome::StaticError(_) => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            }
        }
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<Outcome> {
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("could not read {}", args.file.display()))?;
    let program = parse_program(&source)?;
    Ok(match args.seed {
        Some(seed) => evaluate_program_seeded(program, seed),
        None => evaluate_program(program),
    })
}
