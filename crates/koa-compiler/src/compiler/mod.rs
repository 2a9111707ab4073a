//! Bytecode compiler for koa contracts.
//!
//! Transforms AST into bytecode for the koa stack VM.
//!
//! # Module Structure
//!
//! - `opcode`: The instruction set
//! - `bytecode`: The assembler, `Asm`, and the linked `Bytecode`
//! - `tracer`: Memory layout of function-local variables
//! - `codegen`: Code generation from AST
//!   - `codegen::statements`: Statements and `if`/`else` backpatching
//!   - `codegen::expressions`: Expressions and type checking

pub mod bytecode;
pub mod codegen;
pub mod opcode;
pub mod tracer;

pub use bytecode::{Asm, AsmCode, AsmError, Bytecode, FuncEntry, Operand};
pub use codegen::{CompileError, CompiledFunction, Compiler, FunctionError, link};
pub use opcode::OpCode;
pub use tracer::{EntryError, MemDefiner, MemEntry, MemEntryGetter, MemEntryTable, MemTracer};
