//! Decoding raw Code-attribute bytes into the symbolic instruction model

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::classfile::constpool::{Constant, ConstantPool};
use crate::error::{Error, Result};

use super::insn::{Instruction, Label, LdcConstant};
use super::opcodes::*;

/// An instruction parsed with absolute branch-target offsets, before labels
/// are assigned.
#[derive(Debug)]
enum Proto {
    Simple(u8),
    Push { opcode: u8, operand: i32 },
    Var { opcode: u8, index: u16 },
    Iinc { index: u16, delta: i16 },
    Type { opcode: u8, class_name: String },
    Field { opcode: u8, owner: String, name: String, descriptor: String },
    Method { opcode: u8, owner: String, name: String, descriptor: String, interface: bool },
    Jump { opcode: u8, target: u32 },
    Ldc(LdcConstant),
    TableSwitch { default: u32, low: i32, high: i32, targets: Vec<u32> },
    LookupSwitch { default: u32, pairs: Vec<(i32, u32)> },
    MultiANewArray { class_name: String, dimensions: u8 },
}

/// Result of decoding one code array: the symbolic instruction list with
/// interleaved labels, and the offset-to-label map used to translate
/// exception-table boundaries.
#[derive(Debug)]
pub struct DecodedCode {
    pub instructions: Vec<Instruction>,
    labels: HashMap<u32, Label>,
}

impl DecodedCode {
    pub fn label_at(&self, offset: u32) -> Result<Label> {
        self.labels
            .get(&offset)
            .copied()
            .ok_or_else(|| Error::bytecode(format!("no label registered at offset {}", offset)))
    }
}

struct CodeCursor<'a> {
    code: &'a [u8],
    pos: usize,
}

impl<'a> CodeCursor<'a> {
    fn new(code: &'a [u8]) -> Self {
        Self { code, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.code.len()
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(count).filter(|&e| e <= self.code.len());
        match end {
            Some(end) => {
                let slice = &self.code[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(Error::bytecode("unexpected end of code")),
        }
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn i8(&mut self) -> Result<i8> {
        Ok(self.u8()? as i8)
    }

    fn u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn i16(&mut self) -> Result<i16> {
        Ok(self.u16()? as i16)
    }

    fn i32(&mut self) -> Result<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Skip the alignment padding that follows a switch opcode.
    fn align4(&mut self) -> Result<()> {
        while self.pos % 4 != 0 {
            self.u8()?;
        }
        Ok(())
    }
}

/// Decode a code array into symbolic instructions. `extra_targets` are
/// offsets (exception-table boundaries) that must also receive labels; an
/// offset equal to the code length marks the end of the method.
pub fn decode(code: &[u8], pool: &ConstantPool, extra_targets: &[u32]) -> Result<DecodedCode> {
    let mut cursor = CodeCursor::new(code);
    let mut protos: Vec<(u32, Proto)> = Vec::new();
    let mut boundaries: HashSet<u32> = HashSet::new();

    while !cursor.at_end() {
        let offset = cursor.pos as u32;
        boundaries.insert(offset);
        let proto = decode_one(&mut cursor, pool, offset)?;
        protos.push((offset, proto));
    }

    let code_end = code.len() as u32;
    let mut targets: BTreeSet<u32> = BTreeSet::new();
    for (_, proto) in &protos {
        match proto {
            Proto::Jump { target, .. } => {
                targets.insert(*target);
            }
            Proto::TableSwitch { default, targets: table, .. } => {
                targets.insert(*default);
                targets.extend(table.iter().copied());
            }
            Proto::LookupSwitch { default, pairs } => {
                targets.insert(*default);
                targets.extend(pairs.iter().map(|(_, t)| *t));
            }
            _ => {}
        }
    }
    targets.extend(extra_targets.iter().copied());

    for &target in &targets {
        if target != code_end && !boundaries.contains(&target) {
            return Err(Error::bytecode(format!(
                "branch target {} is not at an instruction boundary",
                target
            )));
        }
    }

    let labels: HashMap<u32, Label> = targets
        .iter()
        .enumerate()
        .map(|(id, &offset)| (offset, Label(id as u32)))
        .collect();

    let mut instructions = Vec::with_capacity(protos.len());
    for (offset, proto) in protos {
        if let Some(&label) = labels.get(&offset) {
            instructions.push(Instruction::Label(label));
        }
        instructions.push(finish(proto, &labels)?);
    }
    if let Some(&label) = labels.get(&code_end) {
        instructions.push(Instruction::Label(label));
    }

    Ok(DecodedCode { instructions, labels })
}

fn decode_one(cursor: &mut CodeCursor<'_>, pool: &ConstantPool, offset: u32) -> Result<Proto> {
    let opcode = cursor.u8()?;
    let proto = match opcode {
        NOP..=DCONST_1 => Proto::Simple(opcode),
        BIPUSH => Proto::Push { opcode, operand: cursor.i8()? as i32 },
        SIPUSH => Proto::Push { opcode, operand: cursor.i16()? as i32 },
        LDC => {
            let index = cursor.u8()? as u16;
            Proto::Ldc(loadable(pool, index, false)?)
        }
        LDC_W => {
            let index = cursor.u16()?;
            Proto::Ldc(loadable(pool, index, false)?)
        }
        LDC2_W => {
            let index = cursor.u16()?;
            Proto::Ldc(loadable(pool, index, true)?)
        }
        ILOAD..=ALOAD | ISTORE..=ASTORE => {
            Proto::Var { opcode, index: cursor.u8()? as u16 }
        }
        ILOAD_0..=SALOAD | ISTORE_0..=LXOR | I2L..=DCMPG => Proto::Simple(opcode),
        IINC => {
            let index = cursor.u8()? as u16;
            let delta = cursor.i8()? as i16;
            Proto::Iinc { index, delta }
        }
        IFEQ..=JSR | IFNULL | IFNONNULL => {
            let relative = cursor.i16()? as i64;
            Proto::Jump { opcode, target: branch_target(offset, relative)? }
        }
        GOTO_W | JSR_W => {
            let relative = cursor.i32()? as i64;
            Proto::Jump { opcode, target: branch_target(offset, relative)? }
        }
        RET => Proto::Var { opcode, index: cursor.u8()? as u16 },
        TABLESWITCH => {
            cursor.align4()?;
            let default = branch_target(offset, cursor.i32()? as i64)?;
            let low = cursor.i32()?;
            let high = cursor.i32()?;
            if low > high {
                return Err(Error::bytecode(format!(
                    "tableswitch bounds are inverted ({}..{})",
                    low, high
                )));
            }
            let count = (high as i64 - low as i64 + 1) as usize;
            if count > cursor.code.len() / 4 + 1 {
                return Err(Error::bytecode(format!(
                    "tableswitch entry count {} exceeds the code size",
                    count
                )));
            }
            let mut table = Vec::with_capacity(count);
            for _ in 0..count {
                table.push(branch_target(offset, cursor.i32()? as i64)?);
            }
            Proto::TableSwitch { default, low, high, targets: table }
        }
        LOOKUPSWITCH => {
            cursor.align4()?;
            let default = branch_target(offset, cursor.i32()? as i64)?;
            let npairs = cursor.i32()?;
            if npairs < 0 || npairs as usize > cursor.code.len() / 8 + 1 {
                return Err(Error::bytecode(format!("invalid lookupswitch pair count {}", npairs)));
            }
            let mut pairs = Vec::with_capacity(npairs as usize);
            for _ in 0..npairs {
                let key = cursor.i32()?;
                let target = branch_target(offset, cursor.i32()? as i64)?;
                pairs.push((key, target));
            }
            Proto::LookupSwitch { default, pairs }
        }
        IRETURN..=RETURN | ARRAYLENGTH | ATHROW | MONITORENTER | MONITOREXIT => {
            Proto::Simple(opcode)
        }
        GETSTATIC..=PUTFIELD => {
            let index = cursor.u16()?;
            let (owner, name, descriptor) = pool.field_ref(index)?;
            Proto::Field {
                opcode,
                owner: owner.to_string(),
                name: name.to_string(),
                descriptor: descriptor.to_string(),
            }
        }
        INVOKEVIRTUAL | INVOKESPECIAL | INVOKESTATIC => {
            let index = cursor.u16()?;
            let (owner, name, descriptor, interface) = pool.method_ref(index)?;
            Proto::Method {
                opcode,
                owner: owner.to_string(),
                name: name.to_string(),
                descriptor: descriptor.to_string(),
                interface,
            }
        }
        INVOKEINTERFACE => {
            let index = cursor.u16()?;
            let _count = cursor.u8()?;
            let _zero = cursor.u8()?;
            let (owner, name, descriptor, _) = pool.method_ref(index)?;
            Proto::Method {
                opcode,
                owner: owner.to_string(),
                name: name.to_string(),
                descriptor: descriptor.to_string(),
                interface: true,
            }
        }
        INVOKEDYNAMIC => {
            return Err(Error::unsupported("invokedynamic instruction"));
        }
        NEW | ANEWARRAY | CHECKCAST | INSTANCEOF => {
            let index = cursor.u16()?;
            Proto::Type { opcode, class_name: pool.class_name(index)?.to_string() }
        }
        NEWARRAY => Proto::Push { opcode, operand: cursor.u8()? as i32 },
        WIDE => {
            let sub = cursor.u8()?;
            match sub {
                IINC => {
                    let index = cursor.u16()?;
                    let delta = cursor.i16()?;
                    Proto::Iinc { index, delta }
                }
                ILOAD..=ALOAD | ISTORE..=ASTORE | RET => {
                    Proto::Var { opcode: sub, index: cursor.u16()? }
                }
                other => {
                    return Err(Error::bytecode(format!(
                        "invalid opcode 0x{:02x} after wide prefix",
                        other
                    )));
                }
            }
        }
        MULTIANEWARRAY => {
            let index = cursor.u16()?;
            let class_name = pool.class_name(index)?.to_string();
            let dimensions = cursor.u8()?;
            if dimensions == 0 {
                return Err(Error::bytecode("multianewarray with zero dimensions"));
            }
            Proto::MultiANewArray { class_name, dimensions }
        }
        other => {
            return Err(Error::bytecode(format!("invalid opcode 0x{:02x}", other)));
        }
    };
    Ok(proto)
}

fn branch_target(insn_offset: u32, relative: i64) -> Result<u32> {
    let target = insn_offset as i64 + relative;
    u32::try_from(target)
        .map_err(|_| Error::bytecode(format!("branch target {} out of bounds", target)))
}

fn loadable(pool: &ConstantPool, index: u16, two_words: bool) -> Result<LdcConstant> {
    let constant = pool.get(index)?;
    match (constant, two_words) {
        (Constant::Integer(value), false) => Ok(LdcConstant::Integer(*value)),
        (Constant::Float(value), false) => Ok(LdcConstant::Float(*value)),
        (Constant::String(utf8_index), false) => {
            Ok(LdcConstant::String(pool.utf8(*utf8_index)?.to_string()))
        }
        (Constant::Class(name_index), false) => {
            Ok(LdcConstant::Class(pool.utf8(*name_index)?.to_string()))
        }
        (Constant::Long(value), true) => Ok(LdcConstant::Long(*value)),
        (Constant::Double(value), true) => Ok(LdcConstant::Double(*value)),
        (Constant::MethodHandle(..) | Constant::MethodType(..) | Constant::Dynamic(..), _) => {
            Err(Error::unsupported("method-handle or dynamic ldc operand"))
        }
        (other, _) => Err(Error::class_format(format!(
            "constant pool index {} is not loadable here: {:?}",
            index, other
        ))),
    }
}

fn finish(proto: Proto, labels: &HashMap<u32, Label>) -> Result<Instruction> {
    let resolve = |offset: u32| -> Result<Label> {
        labels
            .get(&offset)
            .copied()
            .ok_or_else(|| Error::internal(format!("unresolved branch target {}", offset)))
    };
    let insn = match proto {
        Proto::Simple(opcode) => Instruction::Simple(opcode),
        Proto::Push { opcode, operand } => Instruction::Push { opcode, operand },
        Proto::Var { opcode, index } => Instruction::Var { opcode, index },
        Proto::Iinc { index, delta } => Instruction::Iinc { index, delta },
        Proto::Type { opcode, class_name } => Instruction::Type { opcode, class_name },
        Proto::Field { opcode, owner, name, descriptor } => {
            Instruction::Field { opcode, owner, name, descriptor }
        }
        Proto::Method { opcode, owner, name, descriptor, interface } => {
            Instruction::Method { opcode, owner, name, descriptor, interface }
        }
        Proto::Jump { opcode, target } => Instruction::Jump { opcode, target: resolve(target)? },
        Proto::Ldc(constant) => Instruction::Ldc(constant),
        Proto::TableSwitch { default, low, high, targets } => Instruction::TableSwitch {
            default: resolve(default)?,
            low,
            high,
            targets: targets.into_iter().map(resolve).collect::<Result<_>>()?,
        },
        Proto::LookupSwitch { default, pairs } => Instruction::LookupSwitch {
            default: resolve(default)?,
            pairs: pairs
                .into_iter()
                .map(|(key, target)| Ok((key, resolve(target)?)))
                .collect::<Result<_>>()?,
        },
        Proto::MultiANewArray { class_name, dimensions } => {
            Instruction::MultiANewArray { class_name, dimensions }
        }
    };
    Ok(insn)
}
