//! Code generation from AST to bytecode.
//!
//! The [`Compiler`] builds the contract's global scope, compiles every
//! function on its own (in parallel when the `parallel` feature is on) and
//! links the results into one [`Bytecode`].
//!
//! Each function is compiled against addresses relative to its own first
//! byte. The function compiler records the unit index of every jump operand
//! it patches, and [`link`] later shifts those operands by the function's
//! base address.

mod expressions;
mod statements;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::ast::{Contract, DataStructure, FunctionLiteral, Operator};
use crate::compiler::bytecode::{Asm, AsmError, Bytecode, FuncEntry, Operand};
use crate::compiler::opcode::OpCode;
use crate::compiler::tracer::{EntryError, MemEntryTable};
use crate::symbol::{self, Scope, ScopeRef, Symbol, SymbolError};

/// Errors raised while compiling one function.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A name that no enclosing scope binds
    #[error("undefined symbol '{0}'")]
    Undefined(String),

    /// A function name used where a value is expected
    #[error("'{0}' is a function, not a value")]
    NotAValue(String),

    /// Symbol table rejected a definition
    #[error(transparent)]
    Symbol(#[from] SymbolError),

    /// Memory tracer has no entry for a variable
    #[error(transparent)]
    Entry(#[from] EntryError),

    /// A value of the wrong type
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The type the context requires
        expected: DataStructure,
        /// The type the expression has
        found: DataStructure,
    },

    /// An operator applied to a type it is not defined for
    #[error("operator '{operator}' is not defined for {operand}")]
    UnsupportedOperator {
        /// The operator
        operator: Operator,
        /// The operand type
        operand: DataStructure,
    },

    /// An integer literal that does not fit in an operand
    #[error("integer literal {0} does not fit in 32 bits")]
    IntegerOverflow(i64),

    /// The assembler rejected an instruction
    #[error(transparent)]
    Asm(#[from] AsmError),
}

/// A compile error attributed to the function it occurred in.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionError {
    /// The function that failed
    pub function: String,
    /// What went wrong
    pub error: CompileError,
}

impl fmt::Display for FunctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func {}: {}", self.function, self.error)
    }
}

impl std::error::Error for FunctionError {}

/// One function's code before linking.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFunction {
    /// The function name
    pub name: String,
    /// The function body, with jump targets relative to its first byte
    pub asm: Asm,
    /// Unit indices of jump operands that need relocation
    pub jump_sites: Vec<usize>,
}

/// Compiles contracts to bytecode.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    parallel: bool,
}

impl Compiler {
    /// Creates a compiler that works through functions one at a time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles functions on the rayon pool when `parallel` is set and the
    /// `parallel` feature is enabled.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Compiles and links a contract.
    ///
    /// Every function is compiled even after one fails, so the error lists
    /// all failing functions.
    #[instrument(skip_all, fields(functions = contract.functions.len()))]
    pub fn compile(&self, contract: &Contract) -> Result<Bytecode, crate::Error> {
        let global = symbol::declare_functions(contract)?;

        let results = self.compile_functions(contract, &global);

        let mut compiled = Vec::with_capacity(results.len());
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(function) => compiled.push(function),
                Err(error) => errors.push(error),
            }
        }

        if !errors.is_empty() {
            debug!(failed = errors.len(), "contract failed to compile");
            return Err(crate::Error::Compile(errors));
        }

        Ok(link(compiled)?)
    }

    #[cfg(feature = "parallel")]
    fn compile_functions(
        &self,
        contract: &Contract,
        global: &ScopeRef,
    ) -> Vec<Result<CompiledFunction, FunctionError>> {
        if self.parallel {
            contract
                .functions
                .par_iter()
                .map(|function| compile_function(function, global))
                .collect()
        } else {
            contract
                .functions
                .iter()
                .map(|function| compile_function(function, global))
                .collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn compile_functions(
        &self,
        contract: &Contract,
        global: &ScopeRef,
    ) -> Vec<Result<CompiledFunction, FunctionError>> {
        contract
            .functions
            .iter()
            .map(|function| compile_function(function, global))
            .collect()
    }
}

/// Compiles one function against a global scope built by
/// [`declare_functions`](crate::symbol::declare_functions).
pub fn compile_function(
    function: &FunctionLiteral,
    global: &ScopeRef,
) -> Result<CompiledFunction, FunctionError> {
    let name = function.name.value.clone();
    let fail = |error: CompileError| FunctionError {
        function: name.clone(),
        error,
    };

    let scope = global
        .read()
        .resolve_local(&name)
        .and_then(|symbol| symbol.scope().cloned())
        .ok_or_else(|| fail(CompileError::Undefined(name.clone())))?;

    FunctionCompiler::new(function, scope)
        .compile()
        .map_err(fail)
}

/// Concatenates compiled functions in order and relocates their jumps.
pub fn link(functions: Vec<CompiledFunction>) -> Result<Bytecode, AsmError> {
    let mut bytecode = Bytecode::default();

    for mut function in functions {
        let base = bytecode.code.byte_len();

        for &site in &function.jump_sites {
            let relative = function
                .asm
                .operand_at(site)
                .ok_or(AsmError::NotAnOperand(site))?;
            let absolute = base + relative.to_u32() as usize;
            function
                .asm
                .replace_operand_at(site, Operand::address(absolute)?)?;
        }

        debug!(function = %function.name, base, len = function.asm.byte_len(), "linked function");
        bytecode.functions.push(FuncEntry {
            name: function.name,
            offset: base,
        });
        bytecode.code.append(&mut function.asm);
    }

    Ok(bytecode)
}

/// A block nested in the function body, with its own scope.
struct BlockScope {
    id: usize,
    scope: ScopeRef,
}

/// Per-function compilation state.
///
/// Owns everything it writes to: the Asm, the memory table and the list of
/// jump sites. The only shared state is the function's own scope.
///
/// Top-level locals live in the function scope next to the parameters. Each
/// nested block gets a child scope, and its locals get memory ids qualified
/// by the block's number so shadowed and sibling names never share an entry.
pub(crate) struct FunctionCompiler<'a> {
    function: &'a FunctionLiteral,
    scope: ScopeRef,
    blocks: Vec<BlockScope>,
    next_block: usize,
    memory: MemEntryTable,
    asm: Asm,
    jump_sites: Vec<usize>,
}

impl<'a> FunctionCompiler<'a> {
    pub(crate) fn new(function: &'a FunctionLiteral, scope: ScopeRef) -> Self {
        Self {
            function,
            scope,
            blocks: Vec::new(),
            next_block: 0,
            memory: MemEntryTable::new(),
            asm: Asm::new(),
            jump_sites: Vec::new(),
        }
    }

    #[instrument(skip_all, fields(function = %self.function.name))]
    pub(crate) fn compile(mut self) -> Result<CompiledFunction, CompileError> {
        let function = self.function;

        self.emit(OpCode::Jumpdest)?;
        self.compile_block(&function.body)?;
        self.emit(OpCode::Returning)?;

        debug!(
            units = self.asm.len(),
            bytes = self.asm.byte_len(),
            memory = self.memory.memory_counter(),
            "compiled function"
        );

        Ok(CompiledFunction {
            name: function.name.value.clone(),
            asm: self.asm,
            jump_sites: self.jump_sites,
        })
    }

    fn emit(&mut self, opcode: OpCode) -> Result<usize, CompileError> {
        Ok(self.asm.emerge(opcode, &[])?)
    }

    fn emit_push(&mut self, operand: Operand) -> Result<usize, CompileError> {
        Ok(self.asm.emerge(OpCode::Push, &[operand])?)
    }

    fn push_usize(&mut self, value: usize) -> Result<usize, CompileError> {
        self.emit_push(Operand::address(value)?)
    }

    /// Emits `PUSH <placeholder>` and returns the operand's unit index.
    fn emit_placeholder(&mut self) -> Result<usize, CompileError> {
        Ok(self.emit_push(Operand::PLACEHOLDER)? - 1)
    }

    /// Emits a `JUMPDEST` and points the operand at `site` to it.
    fn patch_jump(&mut self, site: usize) -> Result<(), CompileError> {
        let target = self.asm.byte_len();
        self.emit(OpCode::Jumpdest)?;
        self.asm.replace_operand_at(site, Operand::address(target)?)?;
        self.jump_sites.push(site);
        Ok(())
    }

    fn current_scope(&self) -> &ScopeRef {
        self.blocks.last().map_or(&self.scope, |block| &block.scope)
    }

    /// Number of the innermost block, `0` for the function body.
    fn current_block(&self) -> usize {
        self.blocks.last().map_or(0, |block| block.id)
    }

    fn enter_block(&mut self) {
        self.next_block += 1;
        let scope = Scope::enclosed(self.current_scope());
        self.blocks.push(BlockScope {
            id: self.next_block,
            scope,
        });
    }

    fn exit_block(&mut self) {
        self.blocks.pop();
    }

    /// Innermost binding of `name` inside this function, with the number of
    /// the block declaring it. Contract-level names are not included.
    fn lookup_local(&self, name: &str) -> Option<(usize, Arc<Symbol>)> {
        self.blocks
            .iter()
            .rev()
            .map(|block| (block.id, &block.scope))
            .chain(std::iter::once((0, &self.scope)))
            .find_map(|(id, scope)| scope.read().resolve_local(name).map(|symbol| (id, symbol)))
    }

    fn parameter_index(&self, name: &str) -> Option<usize> {
        self.function
            .parameters
            .iter()
            .position(|param| param.identifier.value == name)
    }
}

/// Memory table key of a local declared in `block`.
fn memory_id(name: &str, block: usize) -> String {
    if block == 0 {
        name.to_string()
    } else {
        format!("{name}@{block}")
    }
}
