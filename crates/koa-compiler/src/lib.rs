// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # koa-compiler
//!
//! A compiler for koa, a small statically-typed smart-contract language,
//! targeting a stack-based virtual machine.
//!
//! ## Overview
//!
//! This crate provides the whole pipeline from source text to bytecode:
//! - A state-machine lexer running on its own thread
//! - A recursive descent parser producing an AST
//! - A symbol table with nested function scopes
//! - A memory tracer laying out function-local variables
//! - An assembler with in-place backpatching, a code generator and a linker
//!
//! ## Quick Start
//!
//! ```rust
//! use koa_compiler::{Config, compile};
//!
//! let bytecode = compile(
//!     "contract { func add(a int, b int) int { return a + b } }",
//!     &Config::default(),
//! )?;
//! assert_eq!(
//!     bytecode.code.to_string(),
//!     "[JUMPDEST PUSH 00000000 LOADARGS PUSH 00000001 LOADARGS ADD RETURNING RETURNING]"
//! );
//! # Ok::<(), koa_compiler::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod compiler;
pub mod config;
pub mod lexer;
pub mod parser;
pub mod symbol;

pub use compiler::{Asm, Bytecode, Compiler, FunctionError, OpCode};
pub use config::Config;
pub use lexer::tokenize;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::ast::Contract;
use crate::compiler::AsmError;
use crate::parser::{ParseError, Parser};
use crate::symbol::SymbolError;

/// Errors that can occur while compiling a contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Syntax error during parsing
    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),

    /// A function declared twice, or a bad parameter
    #[error("declaration error: {0}")]
    Symbol(#[from] SymbolError),

    /// One or more functions failed to compile
    #[error("{}", render_function_errors(.0))]
    Compile(Vec<FunctionError>),

    /// Linking produced an invalid address
    #[error("link error: {0}")]
    Asm(#[from] AsmError),
}

fn render_function_errors(errors: &[FunctionError]) -> String {
    let mut out = format!("{} function(s) failed to compile", errors.len());
    for error in errors {
        out.push_str("\n  ");
        out.push_str(&error.to_string());
    }
    out
}

/// Parses a contract, lexing it on a background thread.
pub fn parse(source: &str) -> Result<Contract, Error> {
    parse_with(source, &Config::default())
}

fn parse_with(source: &str, config: &Config) -> Result<Contract, Error> {
    let mut parser = Parser::with_capacity(source, config.queue_capacity);
    Ok(parser.parse_contract()?)
}

/// Compiles a contract to linked bytecode.
#[instrument(skip_all, fields(len = source.len()))]
pub fn compile(source: &str, config: &Config) -> Result<Bytecode, Error> {
    let contract = parse_with(source, config)?;
    let bytecode = Compiler::new()
        .with_parallel(config.parallel)
        .compile(&contract)?;
    debug!(bytes = bytecode.code.byte_len(), "compiled contract");
    Ok(bytecode)
}
