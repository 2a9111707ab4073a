// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Interactive REPL for the koa compiler.
//!
//! Each entry is compiled on its own and its disassembly printed. An entry
//! that starts with `func` is wrapped in `contract { ... }` first.

use owo_colors::OwoColorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Config as EditorConfig, Editor, Helper};
use std::borrow::Cow;
use std::path::PathBuf;
use tracing::debug;

use koa_compiler::{Config, compile, tokenize};

use crate::output::{OutputFormat, format_bytecode, format_tokens, print_error};

/// REPL configuration constants
const HISTORY_FILE: &str = ".koa_history";
const MAX_HISTORY_SIZE: usize = 1000;

const KEYWORDS: &[&str] = &[
    "contract", "func", "if", "else", "return", "int", "string", "bool",
];

const LITERALS: &[&str] = &["true", "false"];

/// REPL commands that can be executed with a dot prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Exit,
    Clear,
    Version,
    Load,
    Tokens,
    Hex,
}

impl ReplCommand {
    /// Parse a REPL command from input string
    pub fn parse(input: &str) -> Option<(Self, Option<&str>)> {
        let input = input.trim();
        let rest = input.strip_prefix('.')?;

        let mut parts = rest.splitn(2, char::is_whitespace);
        let cmd = parts.next()?.to_lowercase();
        let arg = parts.next().map(str::trim).filter(|arg| !arg.is_empty());

        match cmd.as_str() {
            "help" | "h" | "?" => Some((ReplCommand::Help, arg)),
            "exit" | "quit" | "q" => Some((ReplCommand::Exit, arg)),
            "clear" | "cls" => Some((ReplCommand::Clear, arg)),
            "version" | "v" => Some((ReplCommand::Version, arg)),
            "load" | "l" => Some((ReplCommand::Load, arg)),
            "tokens" | "t" => Some((ReplCommand::Tokens, arg)),
            "hex" => Some((ReplCommand::Hex, arg)),
            _ => None,
        }
    }

    /// Get all available commands for help/completion
    pub fn all_commands() -> &'static [(&'static str, &'static str)] {
        &[
            (".help", "Show this help message"),
            (".exit", "Exit the REPL"),
            (".clear", "Clear the screen"),
            (".version", "Show version information"),
            (".load <file>", "Compile a contract file"),
            (".tokens <code>", "Show the tokens of some code"),
            (".hex", "Toggle between disassembly and hex output"),
        ]
    }
}

/// Wraps bare function definitions in a contract.
fn as_contract(input: &str) -> Cow<'_, str> {
    if input.trim_start().starts_with("func") {
        Cow::Owned(format!("contract {{ {input} }}"))
    } else {
        Cow::Borrowed(input)
    }
}

/// Helper struct for rustyline that provides completion, hints, and validation
#[derive(Default)]
struct KoaHelper {
    /// Keywords and REPL commands for completion
    keywords: Vec<String>,
}

impl KoaHelper {
    fn new() -> Self {
        let keywords = KEYWORDS
            .iter()
            .chain(LITERALS)
            .copied()
            .map(String::from)
            .chain(
                ReplCommand::all_commands()
                    .iter()
                    .map(|(cmd, _)| cmd.split(' ').next().unwrap_or_default().to_string()),
            )
            .collect();

        Self { keywords }
    }
}

impl Completer for KoaHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = word_start(&line[..pos]);
        let word = &line[start..pos];
        if word.is_empty() {
            return Ok((pos, vec![]));
        }

        let matches: Vec<Pair> = self
            .keywords
            .iter()
            .filter(|kw| kw.starts_with(word))
            .map(|kw| Pair {
                display: kw.clone(),
                replacement: kw[word.len()..].to_string(),
            })
            .collect();

        Ok((pos, matches))
    }
}

impl Hinter for KoaHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if pos < line.len() {
            return None;
        }

        let word = &line[word_start(line)..];
        if word.len() < 2 {
            return None;
        }

        self.keywords
            .iter()
            .find(|kw| kw.starts_with(word) && kw.len() > word.len())
            .map(|kw| {
                let rest: &str = &kw[word.len()..];
                rest.dimmed().to_string()
            })
    }
}

fn word_start(line: &str) -> usize {
    line.rfind(|c: char| !c.is_alphanumeric() && c != '_' && c != '.')
        .map(|i| i + 1)
        .unwrap_or(0)
}

impl Highlighter for KoaHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let mut result = String::with_capacity(line.len() * 2);
        let mut current_word = String::new();

        for c in line.chars() {
            if c.is_alphanumeric() || c == '_' {
                current_word.push(c);
            } else {
                if !current_word.is_empty() {
                    result.push_str(&highlight_word(&current_word));
                    current_word.clear();
                }
                let colored = match c {
                    '(' | ')' | '{' | '}' => c.to_string().yellow().to_string(),
                    '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' | '!' | '&' | '|' => {
                        c.to_string().cyan().to_string()
                    }
                    '"' => c.to_string().green().to_string(),
                    '.' if line.starts_with('.') => c.to_string().magenta().to_string(),
                    _ => c.to_string(),
                };
                result.push_str(&colored);
            }
        }

        if !current_word.is_empty() {
            result.push_str(&highlight_word(&current_word));
        }

        Cow::Owned(result)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn highlight_word(word: &str) -> String {
    if KEYWORDS.contains(&word) {
        word.magenta().bold().to_string()
    } else if LITERALS.contains(&word) {
        word.blue().to_string()
    } else if word.chars().all(|c| c.is_ascii_digit()) {
        word.yellow().to_string()
    } else {
        word.to_string()
    }
}

impl Validator for KoaHelper {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        let input = ctx.input();

        if !is_balanced(input) {
            return Ok(ValidationResult::Incomplete);
        }

        // A trailing operator expects more input
        let trimmed = input.trim();
        if trimmed.ends_with(['+', '-', '*', '/', '%', '=', ',', '{', '(', '&', '|', '<', '>']) {
            return Ok(ValidationResult::Incomplete);
        }

        Ok(ValidationResult::Valid(None))
    }
}

/// Check if braces and parentheses are balanced
fn is_balanced(input: &str) -> bool {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;

    for c in input.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if in_string {
            match c {
                '\\' => escape_next = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '(' => stack.push(')'),
            '{' => stack.push('}'),
            ')' | '}' => {
                if stack.pop() != Some(c) {
                    return true; // Unbalanced, but the parser reports it better
                }
            }
            _ => {}
        }
    }

    stack.is_empty() && !in_string
}

impl Helper for KoaHelper {}

/// The interactive REPL for the koa compiler
pub struct Repl {
    config: Config,
    format: OutputFormat,
    editor: Editor<KoaHelper, DefaultHistory>,
    history_path: PathBuf,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new(config: Config) -> rustyline::Result<Self> {
        let editor_config = EditorConfig::builder()
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .max_history_size(MAX_HISTORY_SIZE)?
            .auto_add_history(true)
            .build();

        let mut editor = Editor::with_config(editor_config)?;
        editor.set_helper(Some(KoaHelper::new()));

        let history_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("koa")
            .join(HISTORY_FILE);

        if let Some(parent) = history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        if let Err(e) = editor.load_history(&history_path) {
            debug!(path = %history_path.display(), error = %e, "no history loaded");
        }

        Ok(Self {
            config,
            format: OutputFormat::Asm,
            editor,
            history_path,
        })
    }

    /// Run the REPL main loop
    pub fn run(&mut self) -> rustyline::Result<()> {
        self.print_banner();

        loop {
            let prompt = format!("{} ", "koa>".bright_green().bold());

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();

                    if trimmed.is_empty() {
                        continue;
                    }

                    if let Some((cmd, arg)) = ReplCommand::parse(trimmed) {
                        match self.execute_command(cmd, arg) {
                            CommandResult::Continue => continue,
                            CommandResult::Exit => break,
                        }
                    }

                    self.compile_and_print(trimmed);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C".dimmed());
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "^D".dimmed());
                    break;
                }
                Err(err) => {
                    eprintln!("{}: {:?}", "Error".red().bold(), err);
                    break;
                }
            }
        }

        if let Err(e) = self.editor.save_history(&self.history_path) {
            debug!(path = %self.history_path.display(), error = %e, "history not saved");
        }

        println!();
        Ok(())
    }

    fn print_banner(&self) {
        let version = env!("CARGO_PKG_VERSION");
        println!();
        println!(
            "  {} {} {}",
            "koa contract compiler".white().bold(),
            "v".dimmed(),
            version.bright_yellow()
        );
        println!(
            "  {} {} {}",
            "Type".dimmed(),
            ".help".cyan(),
            "for available commands".dimmed()
        );
        println!();
    }

    fn execute_command(&mut self, cmd: ReplCommand, arg: Option<&str>) -> CommandResult {
        match cmd {
            ReplCommand::Help => self.print_help(),
            ReplCommand::Exit => return CommandResult::Exit,
            ReplCommand::Clear => print!("\x1B[2J\x1B[H"),
            ReplCommand::Version => {
                println!("{}: {}", "koa".bright_cyan().bold(), env!("CARGO_PKG_VERSION").yellow());
            }
            ReplCommand::Load => match arg {
                Some(path) => self.load_file(path),
                None => missing_argument(".load", "requires a file path"),
            },
            ReplCommand::Tokens => match arg {
                Some(code) => print!("{}", format_tokens(&tokenize(code))),
                None => missing_argument(".tokens", "requires some code"),
            },
            ReplCommand::Hex => {
                self.format = match self.format {
                    OutputFormat::Asm => OutputFormat::Hex,
                    OutputFormat::Hex => OutputFormat::Asm,
                };
                println!("{} {:?}", "output:".dimmed(), self.format);
            }
        }
        CommandResult::Continue
    }

    fn print_help(&self) {
        println!();
        println!("{}", "REPL Commands:".white().bold());
        println!();

        for (cmd, desc) in ReplCommand::all_commands() {
            println!("  {:16} {}", cmd.cyan(), desc.dimmed());
        }

        println!();
        println!("{}", "Input:".white().bold());
        println!();
        println!("  {}", "contract { func f(a int) int { return a } }".dimmed());
        println!("  {}", "func f(a int) int { return a }".dimmed());
        println!();
    }

    fn load_file(&mut self, path: &str) {
        match std::fs::read_to_string(path) {
            Ok(source) => self.compile_and_print(&source),
            Err(e) => eprintln!("{}: {}: {}", "Error".red().bold(), path.cyan(), e),
        }
    }

    fn compile_and_print(&mut self, input: &str) {
        match compile(&as_contract(input), &self.config) {
            Ok(bytecode) => {
                let text = format_bytecode(&bytecode, self.format);
                println!("{}", text.trim_end());
            }
            Err(e) => print_error(&e),
        }
    }
}

fn missing_argument(command: &str, message: &str) {
    eprintln!(
        "{}: {} {}",
        "Error".red().bold(),
        command.cyan(),
        message.dimmed()
    );
}

/// Result of executing a REPL command
enum CommandResult {
    Continue,
    Exit,
}
