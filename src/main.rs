// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! koa - compiler for the koa smart-contract language
//!
//! This is the main entry point for the koa CLI/REPL.
//!
//! ## Features
//!
//! - Compile contract files to disassembly or hex bytecode
//! - Dump the token stream of a file
//! - Interactive REPL with highlighting and history
//! - Parallel per-function compilation

mod cli;
mod output;
mod repl;

use clap::Parser;
use owo_colors::OwoColorize;
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands, OutputArgs};
use koa_compiler::{Config, compile, tokenize};
use output::{OutputFormat, format_bytecode, format_tokens, print_error};

/// Main entry point - uses tokio runtime for async file reads.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::new(cli.log_filter()))
        .init();

    let config = cli.config();
    debug!(?config, "starting");

    if let Some(code) = &cli.eval {
        return run_source(code, &config, OutputFormat::Asm);
    }

    match cli.command {
        None => run_repl(config),
        Some(Commands::Compile(args)) => match read_source(&args.file).await {
            Some(source) => run_source(&source, &config, output_format(args.output)),
            None => ExitCode::FAILURE,
        },
        Some(Commands::Tokens(args)) => match read_source(&args.file).await {
            Some(source) => {
                print!("{}", format_tokens(&tokenize(&source)));
                ExitCode::SUCCESS
            }
            None => ExitCode::FAILURE,
        },
    }
}

fn output_format(args: OutputArgs) -> OutputFormat {
    if args.hex {
        OutputFormat::Hex
    } else {
        OutputFormat::Asm
    }
}

/// Start the interactive REPL
fn run_repl(config: Config) -> ExitCode {
    match repl::Repl::new(config) {
        Ok(mut repl) => {
            if let Err(e) = repl.run() {
                eprintln!("{}: {:?}", "REPL Error".red().bold(), e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!(
                "{}: Failed to initialize REPL: {:?}",
                "Error".red().bold(),
                e
            );
            ExitCode::FAILURE
        }
    }
}

/// Read a source file asynchronously, reporting failures.
async fn read_source(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(source) => Some(source),
        Err(e) => {
            eprintln!(
                "{}: cannot read '{}': {}",
                "Error".red().bold(),
                path.display().cyan(),
                e
            );
            None
        }
    }
}

/// Compile a contract and print it.
fn run_source(source: &str, config: &Config, format: OutputFormat) -> ExitCode {
    match compile(source, config) {
        Ok(bytecode) => {
            let text = format_bytecode(&bytecode, format);
            println!("{}", text.trim_end());
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}
