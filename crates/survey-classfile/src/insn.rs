//! Bytecode instruction decoding.
//!
//! Only the handful of instructions the renaming engine pattern-matches on are
//! decoded into structured form; everything else is kept as a bare opcode so
//! callers still see the full instruction order.

use std::sync::Arc;

use crate::constant_pool::ConstantPool;
use crate::error::{Error, Result};

pub mod opcodes {
    pub const LDC: u8 = 0x12;
    pub const LDC_W: u8 = 0x13;
    pub const LDC2_W: u8 = 0x14;
    pub const IINC: u8 = 0x84;
    pub const TABLESWITCH: u8 = 0xaa;
    pub const LOOKUPSWITCH: u8 = 0xab;
    pub const GETSTATIC: u8 = 0xb2;
    pub const PUTSTATIC: u8 = 0xb3;
    pub const GETFIELD: u8 = 0xb4;
    pub const PUTFIELD: u8 = 0xb5;
    pub const NEW: u8 = 0xbb;
    pub const WIDE: u8 = 0xc4;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldOp {
    GetStatic,
    PutStatic,
    GetField,
    PutField,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LdcConstant {
    String(String),
    /// Numeric, class, method-type, method-handle and dynamic constants.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insn {
    New(String),
    Ldc(LdcConstant),
    Field {
        op: FieldOp,
        owner: String,
        name: String,
        descriptor: String,
    },
    Other(u8),
}

impl Insn {
    pub fn ldc_string(value: impl Into<String>) -> Self {
        Insn::Ldc(LdcConstant::String(value.into()))
    }

    pub fn put_static(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Insn::Field {
            op: FieldOp::PutStatic,
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// The raw body of a `Code` attribute together with the constant pool it
/// indexes into. Decoding is deferred until [`Code::instructions`] is called.
#[derive(Debug, Clone)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,
    bytes: Vec<u8>,
    pool: Arc<ConstantPool>,
}

impl Code {
    pub(crate) fn new(
        max_stack: u16,
        max_locals: u16,
        bytes: Vec<u8>,
        pool: Arc<ConstantPool>,
    ) -> Self {
        Self {
            max_stack,
            max_locals,
            bytes,
            pool,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn instructions(&self) -> Result<Vec<Insn>> {
        decode(&self.bytes, &self.pool)
    }
}

fn decode(code: &[u8], pool: &ConstantPool) -> Result<Vec<Insn>> {
    let mut out = Vec::new();
    let mut pc = 0usize;
    while pc < code.len() {
        let opcode = code[pc];
        let len = instruction_len(code, pc)?;
        if pc + len > code.len() {
            return Err(Error::TruncatedInstruction { opcode, offset: pc });
        }
        let operands = &code[pc + 1..pc + len];
        let u2 = || u16::from_be_bytes([operands[0], operands[1]]);

        let insn = match opcode {
            opcodes::LDC => ldc(pool, operands[0] as u16)?,
            opcodes::LDC_W => ldc(pool, u2())?,
            opcodes::LDC2_W => Insn::Ldc(LdcConstant::Other),
            opcodes::NEW => Insn::New(pool.get_class_name(u2())?),
            opcodes::GETSTATIC | opcodes::PUTSTATIC | opcodes::GETFIELD | opcodes::PUTFIELD => {
                let op = match opcode {
                    opcodes::GETSTATIC => FieldOp::GetStatic,
                    opcodes::PUTSTATIC => FieldOp::PutStatic,
                    opcodes::GETFIELD => FieldOp::GetField,
                    _ => FieldOp::PutField,
                };
                let member = pool.get_member_ref(u2())?;
                Insn::Field {
                    op,
                    owner: member.owner,
                    name: member.name.to_string(),
                    descriptor: member.descriptor.to_string(),
                }
            }
            other => Insn::Other(other),
        };
        out.push(insn);
        pc += len;
    }
    Ok(out)
}

fn ldc(pool: &ConstantPool, index: u16) -> Result<Insn> {
    Ok(Insn::Ldc(match pool.get_string(index)? {
        Some(value) => LdcConstant::String(value.to_string()),
        None => LdcConstant::Other,
    }))
}

/// Total encoded length (opcode included) of the instruction starting at `pc`.
fn instruction_len(code: &[u8], pc: usize) -> Result<usize> {
    let opcode = code[pc];
    let len = match opcode {
        0x00..=0x0f => 1,
        0x10 => 2,
        0x11 => 3,
        opcodes::LDC => 2,
        opcodes::LDC_W | opcodes::LDC2_W => 3,
        0x15..=0x19 => 2,
        0x1a..=0x35 => 1,
        0x36..=0x3a => 2,
        0x3b..=0x83 => 1,
        opcodes::IINC => 3,
        0x85..=0x98 => 1,
        0x99..=0xa8 => 3,
        0xa9 => 2,
        opcodes::TABLESWITCH => {
            let base = switch_operands_start(pc);
            let low = read_i32(code, base + 4, opcode, pc)?;
            let high = read_i32(code, base + 8, opcode, pc)?;
            if high < low {
                return Err(Error::TruncatedInstruction { opcode, offset: pc });
            }
            let entries = (high as i64 - low as i64 + 1) as usize;
            base - pc + 12 + entries * 4
        }
        opcodes::LOOKUPSWITCH => {
            let base = switch_operands_start(pc);
            let npairs = read_i32(code, base + 4, opcode, pc)?;
            if npairs < 0 {
                return Err(Error::TruncatedInstruction { opcode, offset: pc });
            }
            base - pc + 8 + npairs as usize * 8
        }
        0xac..=0xb1 => 1,
        0xb2..=0xb8 => 3,
        0xb9 | 0xba => 5,
        opcodes::NEW => 3,
        0xbc => 2,
        0xbd => 3,
        0xbe | 0xbf => 1,
        0xc0 | 0xc1 => 3,
        0xc2 | 0xc3 => 1,
        opcodes::WIDE => match code.get(pc + 1) {
            Some(&opcodes::IINC) => 6,
            Some(_) => 4,
            None => return Err(Error::TruncatedInstruction { opcode, offset: pc }),
        },
        0xc5 => 4,
        0xc6 | 0xc7 => 3,
        0xc8 | 0xc9 => 5,
        0xca | 0xfe | 0xff => 1,
        _ => return Err(Error::InvalidOpcode { opcode, offset: pc }),
    };
    Ok(len)
}

/// Switch operands are aligned to a 4-byte boundary relative to the start of the code.
fn switch_operands_start(pc: usize) -> usize {
    (pc + 4) & !3
}

fn read_i32(code: &[u8], at: usize, opcode: u8, offset: usize) -> Result<i32> {
    let bytes = code
        .get(at..at + 4)
        .ok_or(Error::TruncatedInstruction { opcode, offset })?;
    Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
