//! Bytecode assembly.
//!
//! An [`Asm`] is a flat list of [`AsmCode`] units: one per opcode byte and
//! one per 4-byte operand. Keeping units separate (rather than one entry per
//! instruction) is what lets the code generator patch a single operand in
//! place once a forward jump target is known.
//!
//! ```text
//! units:  [PUSH] [0000000a] [JUMPI] [ADD] ...
//! bytes:   21     00 00 00 0a  31     01
//! ```

use std::fmt;

use thiserror::Error;

use super::opcode::OpCode;

/// Width in bytes of every operand.
pub const OPERAND_WIDTH: usize = 4;

/// Errors raised while assembling or decoding bytecode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// A byte that is not an opcode
    #[error("unknown opcode 0x{0:02x}")]
    UnknownOpcode(u8),

    /// An operand of the wrong width
    #[error("operand must be {OPERAND_WIDTH} bytes, got {0}")]
    OperandWidth(usize),

    /// Wrong number of operands for an opcode
    #[error("{opcode} takes {expected} operand(s), got {found}")]
    OperandCount {
        /// The opcode being assembled
        opcode: OpCode,
        /// Operands the opcode takes
        expected: usize,
        /// Operands supplied
        found: usize,
    },

    /// A unit index past the end of the buffer
    #[error("index {index} out of bounds for {len} units")]
    OutOfBounds {
        /// The requested unit
        index: usize,
        /// Units in the buffer
        len: usize,
    },

    /// Tried to replace an opcode unit with an operand
    #[error("unit {0} is not an operand")]
    NotAnOperand(usize),

    /// Tried to replace an operand unit with an opcode
    #[error("unit {0} is not an opcode")]
    NotAnOperator(usize),

    /// Raw bytecode ended in the middle of an operand
    #[error("operand truncated at byte {0}")]
    Truncated(usize),

    /// A jump address that does not fit in an operand
    #[error("address {0} does not fit in an operand")]
    AddressOverflow(usize),
}

/// A 4-byte big-endian operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Operand([u8; OPERAND_WIDTH]);

impl Operand {
    /// Dummy value for jump targets that get backpatched later.
    pub const PLACEHOLDER: Operand = Operand([0; OPERAND_WIDTH]);

    /// Wraps raw operand bytes.
    pub const fn new(bytes: [u8; OPERAND_WIDTH]) -> Self {
        Self(bytes)
    }

    /// Builds an operand from a slice that must be exactly 4 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AsmError> {
        let bytes: [u8; OPERAND_WIDTH] = bytes
            .try_into()
            .map_err(|_| AsmError::OperandWidth(bytes.len()))?;
        Ok(Self(bytes))
    }

    /// Encodes a byte address.
    pub fn address(address: usize) -> Result<Self, AsmError> {
        u32::try_from(address)
            .map(Self::from)
            .map_err(|_| AsmError::AddressOverflow(address))
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; OPERAND_WIDTH] {
        &self.0
    }

    /// The operand read as an unsigned integer.
    pub fn to_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl From<u32> for Operand {
    fn from(value: u32) -> Self {
        Self(value.to_be_bytes())
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Self(value.to_be_bytes())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// One assembled unit: an opcode byte or an operand's bytes, with its
/// disassembly text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsmCode {
    /// The bytes this unit contributes to the bytecode
    pub raw_byte: Vec<u8>,
    /// Mnemonic for opcodes, lowercase hex for operands
    pub value: String,
}

impl AsmCode {
    fn operator(opcode: OpCode) -> Self {
        Self {
            raw_byte: vec![opcode.as_byte()],
            value: opcode.mnemonic().to_string(),
        }
    }

    fn operand(operand: Operand) -> Self {
        Self {
            raw_byte: operand.as_bytes().to_vec(),
            value: operand.to_string(),
        }
    }

    /// Returns true if this unit holds an operand.
    pub fn is_operand(&self) -> bool {
        self.raw_byte.len() == OPERAND_WIDTH
    }

    /// The opcode held by this unit, if it holds one.
    pub fn opcode(&self) -> Option<OpCode> {
        match self.raw_byte.as_slice() {
            [byte] => OpCode::try_from(*byte).ok(),
            _ => None,
        }
    }
}

/// An ordered sequence of assembled units.
///
/// Equality is positional: two buffers are equal when every unit has the
/// same text and the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Asm {
    /// The units
    pub asm_codes: Vec<AsmCode>,
}

impl Asm {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one instruction and returns the new unit count.
    pub fn emerge(&mut self, opcode: OpCode, operands: &[Operand]) -> Result<usize, AsmError> {
        let codes = convert(opcode, operands)?;
        self.asm_codes.extend(codes);
        Ok(self.asm_codes.len())
    }

    /// Appends one instruction given as a raw opcode byte. Unknown bytes are
    /// rejected and leave the buffer untouched.
    pub fn emerge_byte(&mut self, opcode: u8, operands: &[Operand]) -> Result<usize, AsmError> {
        self.emerge(OpCode::try_from(opcode)?, operands)
    }

    /// Inserts one instruction before unit `index`, shifting later units.
    ///
    /// Every unit after `index` moves, so byte addresses taken earlier are
    /// invalidated. Use [`replace_operand_at`](Self::replace_operand_at)
    /// once addresses are in play.
    pub fn emerge_at(
        &mut self,
        index: usize,
        opcode: OpCode,
        operands: &[Operand],
    ) -> Result<usize, AsmError> {
        if index > self.asm_codes.len() {
            return Err(AsmError::OutOfBounds {
                index,
                len: self.asm_codes.len(),
            });
        }
        let codes = convert(opcode, operands)?;
        self.asm_codes.splice(index..index, codes);
        Ok(self.asm_codes.len())
    }

    /// Overwrites the operand unit at `index` without moving anything.
    pub fn replace_operand_at(&mut self, index: usize, operand: Operand) -> Result<(), AsmError> {
        let code = self.unit(index)?;
        if !code.is_operand() {
            return Err(AsmError::NotAnOperand(index));
        }
        *code = AsmCode::operand(operand);
        Ok(())
    }

    /// Overwrites the opcode unit at `index` without moving anything. The new
    /// opcode must take as many operands as the old one.
    pub fn replace_operator_at(&mut self, index: usize, opcode: OpCode) -> Result<(), AsmError> {
        let code = self.unit(index)?;
        let old = code.opcode().ok_or(AsmError::NotAnOperator(index))?;
        if old.operand_count() != opcode.operand_count() {
            return Err(AsmError::OperandCount {
                opcode,
                expected: opcode.operand_count(),
                found: old.operand_count(),
            });
        }
        *code = AsmCode::operator(opcode);
        Ok(())
    }

    /// The operand stored at `index`, if that unit is an operand.
    pub fn operand_at(&self, index: usize) -> Option<Operand> {
        let code = self.asm_codes.get(index)?;
        Operand::from_slice(&code.raw_byte).ok()
    }

    /// Concatenates the raw bytes of every unit.
    pub fn to_raw_byte_code(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        for code in &self.asm_codes {
            out.extend_from_slice(&code.raw_byte);
        }
        out
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.asm_codes.len()
    }

    /// Returns true if nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.asm_codes.is_empty()
    }

    /// Length of the raw bytecode.
    pub fn byte_len(&self) -> usize {
        self.asm_codes.iter().map(|code| code.raw_byte.len()).sum()
    }

    /// Byte address of unit `index`. `index == len()` gives the address just
    /// past the end.
    pub fn byte_offset_of(&self, index: usize) -> Option<usize> {
        if index > self.asm_codes.len() {
            return None;
        }
        Some(
            self.asm_codes[..index]
                .iter()
                .map(|code| code.raw_byte.len())
                .sum(),
        )
    }

    /// Moves every unit of `other` to the end of this buffer.
    pub fn append(&mut self, other: &mut Asm) {
        self.asm_codes.append(&mut other.asm_codes);
    }

    /// Decodes raw bytecode back into units.
    pub fn disassemble(bytes: &[u8]) -> Result<Asm, AsmError> {
        let mut asm = Asm::new();
        let mut pos = 0;

        while pos < bytes.len() {
            let opcode = OpCode::try_from(bytes[pos])?;
            pos += 1;

            let mut operands = Vec::with_capacity(opcode.operand_count());
            for _ in 0..opcode.operand_count() {
                let chunk = bytes
                    .get(pos..pos + OPERAND_WIDTH)
                    .ok_or(AsmError::Truncated(pos))?;
                operands.push(Operand::from_slice(chunk)?);
                pos += OPERAND_WIDTH;
            }

            asm.emerge(opcode, &operands)?;
        }

        Ok(asm)
    }

    fn unit(&mut self, index: usize) -> Result<&mut AsmCode, AsmError> {
        let len = self.asm_codes.len();
        self.asm_codes
            .get_mut(index)
            .ok_or(AsmError::OutOfBounds { index, len })
    }
}

impl fmt::Display for Asm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, code) in self.asm_codes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&code.value)?;
        }
        f.write_str("]")
    }
}

fn convert(opcode: OpCode, operands: &[Operand]) -> Result<Vec<AsmCode>, AsmError> {
    if operands.len() != opcode.operand_count() {
        return Err(AsmError::OperandCount {
            opcode,
            expected: opcode.operand_count(),
            found: operands.len(),
        });
    }

    let mut codes = Vec::with_capacity(1 + operands.len());
    codes.push(AsmCode::operator(opcode));
    codes.extend(operands.iter().copied().map(AsmCode::operand));
    Ok(codes)
}

/// Entry point of a function inside linked bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncEntry {
    /// The function name
    pub name: String,
    /// Byte address of the function's first instruction
    pub offset: usize,
}

/// A linked contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bytecode {
    /// The code of every function, in declaration order
    pub code: Asm,
    /// Where each function starts
    pub functions: Vec<FuncEntry>,
}

impl Bytecode {
    /// The wire format: opcode bytes and 4-byte operands, back to back.
    pub fn to_raw_byte_code(&self) -> Vec<u8> {
        self.code.to_raw_byte_code()
    }

    /// Looks up a function's entry address.
    pub fn function_offset(&self, name: &str) -> Option<usize> {
        self.functions
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.offset)
    }
}

impl fmt::Display for Bytecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}
