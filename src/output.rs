//! Terminal rendering of compiler output.

use owo_colors::OwoColorize;

use koa_compiler::Bytecode;
use koa_compiler::lexer::{Token, TokenKind};

/// How compiled bytecode is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One instruction per line, grouped by function
    #[default]
    Asm,
    /// The raw bytecode as one hex string
    Hex,
}

/// Renders a linked contract.
pub fn format_bytecode(bytecode: &Bytecode, format: OutputFormat) -> String {
    match format {
        OutputFormat::Hex => bytecode
            .to_raw_byte_code()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect(),
        OutputFormat::Asm => format_listing(bytecode),
    }
}

fn format_listing(bytecode: &Bytecode) -> String {
    let mut out = String::new();
    let mut offset = 0;
    let mut functions = bytecode.functions.iter().peekable();
    let mut units = bytecode.code.asm_codes.iter().peekable();

    while let Some(code) = units.next() {
        while let Some(entry) = functions.next_if(|entry| entry.offset == offset) {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!(
                "{} {} {}\n",
                "func".magenta().bold(),
                entry.name.white().bold(),
                format!("@ {:#06x}", entry.offset).dimmed()
            ));
        }

        let mut line = format!("  {}  {}", format!("{offset:04x}").dimmed(), code.value.cyan());
        offset += code.raw_byte.len();

        while let Some(operand) = units.next_if(|next| next.is_operand()) {
            line.push(' ');
            line.push_str(&operand.value.yellow().to_string());
            offset += operand.raw_byte.len();
        }

        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Renders one token per line: location, kind and literal.
pub fn format_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        let location = format!("{}:{}", token.line, token.position);
        let kind = format!("{:8}", token.kind.to_string());
        let kind = match token.kind {
            TokenKind::Illegal => kind.red().bold().to_string(),
            TokenKind::Eos => kind.dimmed().to_string(),
            _ => kind.cyan().to_string(),
        };
        out.push_str(&format!("{:>8}  {}  {}\n", location.dimmed(), kind, token.literal));
    }
    out
}

/// Prints an error to stderr, coloring the part before the first colon.
pub fn print_error(error: &koa_compiler::Error) {
    let error_str = error.to_string();

    if let Some(colon_pos) = error_str.find(':') {
        let (error_type, message) = error_str.split_at(colon_pos);
        eprintln!("{}{}", error_type.red().bold(), message);
    } else {
        eprintln!("{}", error_str.red());
    }
}
