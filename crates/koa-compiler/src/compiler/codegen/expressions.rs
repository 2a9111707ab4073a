//! Expression compilation.
//!
//! Every `int` and `bool` expression leaves one word on the stack. A string
//! leaves one word per started 4-byte chunk of its bytes, at least one: a
//! literal pushes its chunks and `MLOAD` of a string local pushes as many
//! words as the local's size needs. String parameters arrive as one word.
//!
//! | Expression | Emitted code |
//! |------------|--------------|
//! | `42` | `PUSH 0000002a` |
//! | `true` | `PUSH 00000001` |
//! | `"abcde"` | `PUSH 61626364`, `PUSH 65000000` |
//! | parameter | `PUSH index`, `LOADARGS` |
//! | local | `PUSH offset`, `PUSH size`, `MLOAD` |
//! | `a op b` | `a`, `b`, operator |
//! | `-x` | `PUSH 0`, `x`, `SUB` |
//! | `!x` | `x`, `NOT` |
//!
//! ## Operators
//!
//! | Operator | Code | Operands |
//! |----------|------|----------|
//! | `+ - * / %` | `ADD SUB MUL DIV MOD` | int |
//! | `< >` | `LT GT` | int |
//! | `<=` | `GT NOT` | int |
//! | `>=` | `LT NOT` | int |
//! | `==` | `EQ` | same type, not string |
//! | `!=` | `EQ NOT` | same type, not string |
//! | `&& \|\|` | `AND OR` | bool |

use super::{CompileError, FunctionCompiler, memory_id};
use crate::ast::{DataStructure, Expression, Identifier, Operator};
use crate::compiler::bytecode::{OPERAND_WIDTH, Operand};
use crate::compiler::opcode::OpCode;
use crate::compiler::tracer::MemEntryGetter;

/// Size of an `int` or `bool` value in memory.
pub(super) const WORD_SIZE: usize = 4;

/// Stack words taken by a value of `size` bytes.
pub(super) fn stack_words(size: usize) -> usize {
    size.div_ceil(OPERAND_WIDTH).max(1)
}

/// Where a value-bearing name lives.
enum Binding {
    /// Call argument at this index
    Parameter(usize),
    /// Memory entry with this id
    Local(String),
}

impl FunctionCompiler<'_> {
    pub(super) fn compile_expression(&mut self, expr: &Expression) -> Result<(), CompileError> {
        match expr {
            Expression::IntegerLiteral(lit) => {
                let value =
                    i32::try_from(lit.value).map_err(|_| CompileError::IntegerOverflow(lit.value))?;
                self.emit_push(Operand::from(value))?;
            }
            Expression::BooleanLiteral(lit) => {
                self.emit_push(Operand::from(u32::from(lit.value)))?;
            }
            Expression::StringLiteral(lit) => {
                for operand in string_operands(&lit.value) {
                    self.emit_push(operand)?;
                }
            }
            Expression::Identifier(ident) => self.compile_identifier(ident)?,
            Expression::Infix(infix) => {
                self.compile_expression(&infix.left)?;
                self.compile_expression(&infix.right)?;
                self.compile_operator(infix.operator)?;
            }
            Expression::Prefix(prefix) => match prefix.operator {
                Operator::Minus => {
                    self.emit_push(Operand::from(0u32))?;
                    self.compile_expression(&prefix.right)?;
                    self.emit(OpCode::Sub)?;
                }
                _ => {
                    self.compile_expression(&prefix.right)?;
                    self.emit(OpCode::Not)?;
                }
            },
        }
        Ok(())
    }

    fn compile_identifier(&mut self, ident: &Identifier) -> Result<(), CompileError> {
        let id = match self.binding(&ident.value)?.1 {
            Binding::Parameter(index) => {
                self.push_usize(index)?;
                self.emit(OpCode::LoadArgs)?;
                return Ok(());
            }
            Binding::Local(id) => id,
        };

        let offset = self.memory.get_offset_of_entry(&id)?;
        let size = self.memory.get_size_of_entry(&id)?;
        self.push_usize(offset)?;
        self.push_usize(size)?;
        self.emit(OpCode::Mload)?;
        Ok(())
    }

    fn compile_operator(&mut self, operator: Operator) -> Result<(), CompileError> {
        let (opcode, negate) = match operator {
            Operator::Plus => (OpCode::Add, false),
            Operator::Minus => (OpCode::Sub, false),
            Operator::Asterisk => (OpCode::Mul, false),
            Operator::Slash => (OpCode::Div, false),
            Operator::Mod => (OpCode::Mod, false),
            Operator::Lt => (OpCode::Lt, false),
            Operator::Gt => (OpCode::Gt, false),
            Operator::LtEq => (OpCode::Gt, true),
            Operator::GtEq => (OpCode::Lt, true),
            Operator::Eq => (OpCode::Eq, false),
            Operator::NotEq => (OpCode::Eq, true),
            Operator::Land => (OpCode::And, false),
            Operator::Lor => (OpCode::Or, false),
            Operator::Bang => (OpCode::Not, false),
        };
        self.emit(opcode)?;
        if negate {
            self.emit(OpCode::Not)?;
        }
        Ok(())
    }

    /// Resolves a name from the innermost block outwards. Function names
    /// are not values.
    fn binding(&self, name: &str) -> Result<(DataStructure, Binding), CompileError> {
        let Some((block, symbol)) = self.lookup_local(name) else {
            return match self.scope.read().resolve(name) {
                Some(_) => Err(CompileError::NotAValue(name.to_string())),
                None => Err(CompileError::Undefined(name.to_string())),
            };
        };

        let ty = symbol
            .data_structure()
            .ok_or_else(|| CompileError::NotAValue(name.to_string()))?;
        let binding = match self.parameter_index(name) {
            Some(index) if block == 0 => Binding::Parameter(index),
            _ => Binding::Local(memory_id(name, block)),
        };
        Ok((ty, binding))
    }

    /// Bytes a value of `expr` occupies once stored.
    pub(super) fn value_size(&self, expr: &Expression) -> Result<usize, CompileError> {
        match expr {
            Expression::StringLiteral(lit) => Ok(lit.value.len()),
            Expression::Identifier(ident) => match self.binding(&ident.value)?.1 {
                Binding::Local(id) => Ok(self.memory.get_size_of_entry(&id)?),
                Binding::Parameter(_) => Ok(WORD_SIZE),
            },
            _ => Ok(WORD_SIZE),
        }
    }

    /// Static type of an expression, checking operand types on the way.
    pub(super) fn type_of(&self, expr: &Expression) -> Result<DataStructure, CompileError> {
        match expr {
            Expression::IntegerLiteral(_) => Ok(DataStructure::Int),
            Expression::StringLiteral(_) => Ok(DataStructure::String),
            Expression::BooleanLiteral(_) => Ok(DataStructure::Bool),
            Expression::Identifier(ident) => Ok(self.binding(&ident.value)?.0),
            Expression::Prefix(prefix) => {
                let operand = self.type_of(&prefix.right)?;
                let ty = match prefix.operator {
                    Operator::Minus => DataStructure::Int,
                    _ => DataStructure::Bool,
                };
                expect(ty, operand)?;
                Ok(ty)
            }
            Expression::Infix(infix) => {
                let left = self.type_of(&infix.left)?;
                let right = self.type_of(&infix.right)?;
                match infix.operator {
                    Operator::Plus
                    | Operator::Minus
                    | Operator::Asterisk
                    | Operator::Slash
                    | Operator::Mod => {
                        expect(DataStructure::Int, left)?;
                        expect(DataStructure::Int, right)?;
                        Ok(DataStructure::Int)
                    }
                    Operator::Lt | Operator::Gt | Operator::LtEq | Operator::GtEq => {
                        expect(DataStructure::Int, left)?;
                        expect(DataStructure::Int, right)?;
                        Ok(DataStructure::Bool)
                    }
                    Operator::Eq | Operator::NotEq => {
                        expect(left, right)?;
                        // EQ compares single words
                        if left == DataStructure::String {
                            return Err(CompileError::UnsupportedOperator {
                                operator: infix.operator,
                                operand: left,
                            });
                        }
                        Ok(DataStructure::Bool)
                    }
                    Operator::Land | Operator::Lor | Operator::Bang => {
                        expect(DataStructure::Bool, left)?;
                        expect(DataStructure::Bool, right)?;
                        Ok(DataStructure::Bool)
                    }
                }
            }
        }
    }
}

fn expect(expected: DataStructure, found: DataStructure) -> Result<(), CompileError> {
    if expected == found {
        Ok(())
    } else {
        Err(CompileError::TypeMismatch { expected, found })
    }
}

/// Splits a string into zero-padded 4-byte operands. The empty string still
/// pushes one operand.
fn string_operands(value: &str) -> Vec<Operand> {
    let bytes = value.as_bytes();
    if bytes.is_empty() {
        return vec![Operand::default()];
    }
    bytes
        .chunks(OPERAND_WIDTH)
        .map(|chunk| {
            let mut word = [0u8; OPERAND_WIDTH];
            word[..chunk.len()].copy_from_slice(chunk);
            Operand::new(word)
        })
        .collect()
}
