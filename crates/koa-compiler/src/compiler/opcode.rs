//! Operation codes for the koa VM.

use std::fmt;

use super::bytecode::AsmError;

/// Operation codes for the VM.
///
/// The VM is a stack machine. `PUSH` is the only instruction carrying an
/// operand; everything else takes its inputs from the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    // Arithmetic operations
    /// Add top two values
    Add = 0x01,
    /// Multiply
    Mul = 0x02,
    /// Subtract
    Sub = 0x03,
    /// Divide
    Div = 0x04,
    /// Modulo
    Mod = 0x05,

    // Comparison and logical operations
    /// Less than
    Lt = 0x10,
    /// Greater than
    Gt = 0x11,
    /// Equal
    Eq = 0x12,
    /// Logical NOT
    Not = 0x13,
    /// Logical AND
    And = 0x14,
    /// Logical OR
    Or = 0x15,

    // Stack and memory operations
    /// Pop the top value
    Pop = 0x20,
    /// Push the 4-byte operand
    Push = 0x21,
    /// Pop offset and size, push the memory contents
    Mload = 0x22,
    /// Pop offset, size and value, store the value
    Mstore = 0x23,
    /// Pop an index, push that call argument
    LoadArgs = 0x24,

    // Control flow
    /// Pop a target address and jump to it
    Jump = 0x30,
    /// Pop a target address and a condition, jump if the condition holds
    Jumpi = 0x31,
    /// Marks a valid jump target
    Jumpdest = 0x32,

    // Function operations
    /// Return from the current function
    Returning = 0x50,
}

impl OpCode {
    /// Every opcode, in byte order.
    pub const ALL: [OpCode; 20] = [
        OpCode::Add,
        OpCode::Mul,
        OpCode::Sub,
        OpCode::Div,
        OpCode::Mod,
        OpCode::Lt,
        OpCode::Gt,
        OpCode::Eq,
        OpCode::Not,
        OpCode::And,
        OpCode::Or,
        OpCode::Pop,
        OpCode::Push,
        OpCode::Mload,
        OpCode::Mstore,
        OpCode::LoadArgs,
        OpCode::Jump,
        OpCode::Jumpi,
        OpCode::Jumpdest,
        OpCode::Returning,
    ];

    /// The assembly mnemonic.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            OpCode::Add => "ADD",
            OpCode::Mul => "MUL",
            OpCode::Sub => "SUB",
            OpCode::Div => "DIV",
            OpCode::Mod => "MOD",
            OpCode::Lt => "LT",
            OpCode::Gt => "GT",
            OpCode::Eq => "EQ",
            OpCode::Not => "NOT",
            OpCode::And => "AND",
            OpCode::Or => "OR",
            OpCode::Pop => "POP",
            OpCode::Push => "PUSH",
            OpCode::Mload => "MLOAD",
            OpCode::Mstore => "MSTORE",
            OpCode::LoadArgs => "LOADARGS",
            OpCode::Jump => "JUMP",
            OpCode::Jumpi => "JUMPI",
            OpCode::Jumpdest => "JUMPDEST",
            OpCode::Returning => "RETURNING",
        }
    }

    /// Number of 4-byte operands following the opcode byte.
    pub fn operand_count(&self) -> usize {
        match self {
            OpCode::Push => 1,
            _ => 0,
        }
    }

    /// The opcode byte.
    pub fn as_byte(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for OpCode {
    type Error = AsmError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        OpCode::ALL
            .iter()
            .copied()
            .find(|op| op.as_byte() == byte)
            .ok_or(AsmError::UnknownOpcode(byte))
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
