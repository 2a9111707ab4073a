//! CLI argument parsing for koa.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// koa - compiler for the koa smart-contract language
#[derive(Parser, Debug)]
#[command(name = "koa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log filter, in `tracing` directive syntax
    #[arg(long, global = true, env = "KOA_LOG")]
    pub log: Option<String>,

    /// Compile functions one at a time
    #[arg(long, global = true)]
    pub sequential: bool,

    /// Capacity of the lexer's token queue
    #[arg(long, global = true, default_value_t = koa_compiler::lexer::DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// Compile a contract given on the command line
    #[arg(short, long, value_name = "CODE")]
    pub eval: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a contract file to bytecode
    #[command(alias = "c")]
    Compile(CompileArgs),

    /// Print the tokens of a source file
    Tokens(TokensArgs),
}

#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Contract source file
    pub file: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Default, Clone, Copy)]
#[group(multiple = false)]
pub struct OutputArgs {
    /// Print raw bytecode as hex
    #[arg(long)]
    pub hex: bool,

    /// Print the disassembly (default)
    #[arg(long)]
    pub asm: bool,
}

#[derive(Args, Debug)]
pub struct TokensArgs {
    /// Source file
    pub file: PathBuf,
}

impl Cli {
    /// The compiler configuration selected by the flags.
    pub fn config(&self) -> koa_compiler::Config {
        koa_compiler::Config::default()
            .with_parallel(!self.sequential)
            .with_queue_capacity(self.queue_capacity)
    }

    /// Log filter: `--log`/`KOA_LOG` wins, then `-v`, then `warn`.
    pub fn log_filter(&self) -> String {
        if let Some(filter) = &self.log {
            return filter.clone();
        }
        match self.verbose {
            0 => "warn".to_string(),
            1 => "koa=debug,koa_compiler=debug".to_string(),
            _ => "koa=trace,koa_compiler=trace".to_string(),
        }
    }
}
