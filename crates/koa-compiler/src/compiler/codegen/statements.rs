//! Statement compilation.
//!
//! | Statement | Emitted code |
//! |-----------|--------------|
//! | `int x = e` | `e`, `PUSH off`, `PUSH size`, `MSTORE` |
//! | `return e` | `e`, `RETURNING` |
//! | `e` | `e`, one `POP` per word of `e` |
//! | `if` | see below |
//!
//! A local takes as many bytes as its value: 4 for `int` and `bool`, the
//! byte length for a string. Copying a string local copies its full size.
//!
//! ## If Statement
//!
//! ```text
//! if (condition) { then } else { else }
//!
//!   [condition]
//!   NOT
//!   PUSH else_label
//!   JUMPI
//!   [then]
//!   PUSH end_label
//!   JUMP
//! else_label:
//!   JUMPDEST
//!   [else]
//! end_label:
//!   JUMPDEST
//! ```
//!
//! Without an `else` the first jump goes straight to `end_label`. Labels are
//! emitted as `PUSH 00000000` and patched once the `JUMPDEST` is reached.
//! Each branch is its own block: locals declared in it are gone after it.

use tracing::trace;

use super::expressions::stack_words;
use super::{CompileError, FunctionCompiler, memory_id};
use crate::ast::{
    AssignStatement, BlockStatement, DataStructure, Expression, IfStatement, ReturnStatement,
    Statement,
};
use crate::compiler::opcode::OpCode;
use crate::compiler::tracer::MemDefiner;
use crate::symbol::Symbol;

impl FunctionCompiler<'_> {
    pub(super) fn compile_block(&mut self, block: &BlockStatement) -> Result<(), CompileError> {
        for statement in &block.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    /// Compiles a block in a fresh child scope.
    fn compile_nested_block(&mut self, block: &BlockStatement) -> Result<(), CompileError> {
        self.enter_block();
        let result = self.compile_block(block);
        self.exit_block();
        result
    }

    fn compile_statement(&mut self, statement: &Statement) -> Result<(), CompileError> {
        match statement {
            Statement::Return(ret) => self.compile_return(ret),
            Statement::Assign(assign) => self.compile_assign(assign),
            Statement::If(if_stmt) => self.compile_if(if_stmt),
            Statement::Expression(stmt) => {
                self.type_of(&stmt.expr)?;
                let words = stack_words(self.value_size(&stmt.expr)?);
                self.compile_expression(&stmt.expr)?;
                for _ in 0..words {
                    self.emit(OpCode::Pop)?;
                }
                Ok(())
            }
        }
    }

    fn compile_return(&mut self, ret: &ReturnStatement) -> Result<(), CompileError> {
        let expected = self.function.return_type;
        let found = match &ret.return_value {
            Some(value) => self.type_of(value)?,
            None => DataStructure::Void,
        };
        if found != expected {
            return Err(CompileError::TypeMismatch { expected, found });
        }

        if let Some(value) = &ret.return_value {
            self.compile_expression(value)?;
        }
        self.emit(OpCode::Returning)?;
        Ok(())
    }

    fn compile_assign(&mut self, assign: &AssignStatement) -> Result<(), CompileError> {
        let found = self.type_of(&assign.value)?;
        if found != assign.ty {
            return Err(CompileError::TypeMismatch {
                expected: assign.ty,
                found,
            });
        }

        let size = self.value_size(&assign.value)?;
        self.compile_expression(&assign.value)?;

        let name = &assign.variable.value;
        let symbol = Symbol::from_data_structure(assign.ty, assign.variable.clone())?;
        self.current_scope().write().define(name.clone(), symbol)?;

        let id = memory_id(name, self.current_block());
        let entry = match &assign.value {
            Expression::StringLiteral(lit) => self.memory.define(&id, lit.value.as_bytes()),
            _ => self.memory.define(&id, &vec![0u8; size]),
        };
        trace!(variable = %id, offset = entry.offset, size = entry.size, "assigned");

        self.push_usize(entry.offset)?;
        self.push_usize(entry.size)?;
        self.emit(OpCode::Mstore)?;
        Ok(())
    }

    fn compile_if(&mut self, if_stmt: &IfStatement) -> Result<(), CompileError> {
        let found = self.type_of(&if_stmt.condition)?;
        if found != DataStructure::Bool {
            return Err(CompileError::TypeMismatch {
                expected: DataStructure::Bool,
                found,
            });
        }

        self.compile_expression(&if_stmt.condition)?;
        self.emit(OpCode::Not)?;
        let jump_to_else = self.emit_placeholder()?;
        self.emit(OpCode::Jumpi)?;

        self.compile_nested_block(&if_stmt.consequence)?;

        match &if_stmt.alternative {
            Some(alternative) => {
                let jump_to_end = self.emit_placeholder()?;
                self.emit(OpCode::Jump)?;

                self.patch_jump(jump_to_else)?;
                self.compile_nested_block(alternative)?;
                self.patch_jump(jump_to_end)?;
            }
            None => self.patch_jump(jump_to_else)?,
        }

        Ok(())
    }
}
