//! Encoding symbolic instructions back into Code-attribute bytes
//!
//! Single emission pass with deferred branch resolution: jumps and switch
//! slots are written as placeholders and patched once every label offset is
//! known. Constant operands are re-interned into the destination pool.

use std::collections::HashMap;

use crate::classfile::attribute::{CodeAttribute, ExceptionTableEntry};
use crate::classfile::constpool::ConstantPool;
use crate::error::{Error, Result};

use super::insn::{Instruction, Label, LdcConstant, MethodBody};
use super::opcodes::*;

#[derive(Debug, Clone, Copy)]
enum FixupKind {
    /// 16-bit signed offset relative to the owning instruction.
    Narrow,
    /// 32-bit signed offset relative to the owning instruction.
    Wide,
}

#[derive(Debug, Clone, Copy)]
struct Fixup {
    insn_start: u32,
    patch_pos: usize,
    target: Label,
    kind: FixupKind,
}

/// Encode a method body against the given constant pool.
pub fn encode(body: &MethodBody, pool: &mut ConstantPool) -> Result<CodeAttribute> {
    let mut code: Vec<u8> = Vec::new();
    let mut label_offsets: HashMap<Label, u32> = HashMap::new();
    let mut fixups: Vec<Fixup> = Vec::new();

    for insn in &body.instructions {
        emit(insn, &mut code, pool, &mut label_offsets, &mut fixups)?;
    }

    for fixup in &fixups {
        let target_offset = *label_offsets
            .get(&fixup.target)
            .ok_or_else(|| Error::bytecode("jump to an undefined label"))?;
        let relative = target_offset as i64 - fixup.insn_start as i64;
        match fixup.kind {
            FixupKind::Narrow => {
                let relative = i16::try_from(relative).map_err(|_| {
                    Error::bytecode(format!("branch offset {} out of 16-bit range", relative))
                })?;
                code[fixup.patch_pos..fixup.patch_pos + 2]
                    .copy_from_slice(&relative.to_be_bytes());
            }
            FixupKind::Wide => {
                let relative = i32::try_from(relative).map_err(|_| {
                    Error::bytecode(format!("branch offset {} out of 32-bit range", relative))
                })?;
                code[fixup.patch_pos..fixup.patch_pos + 4]
                    .copy_from_slice(&relative.to_be_bytes());
            }
        }
    }

    let mut attribute = CodeAttribute::new(body.max_stack, body.max_locals, code);
    for handler in &body.handlers {
        let pc = |label: Label| -> Result<u16> {
            let offset = *label_offsets
                .get(&label)
                .ok_or_else(|| Error::bytecode("exception handler bound to an undefined label"))?;
            u16::try_from(offset)
                .map_err(|_| Error::bytecode("exception handler offset exceeds 16 bits"))
        };
        let catch_type = match &handler.catch_type {
            Some(name) => pool.add_class(name),
            None => 0,
        };
        attribute.exception_table.push(ExceptionTableEntry::new(
            pc(handler.start)?,
            pc(handler.end)?,
            pc(handler.handler)?,
            catch_type,
        ));
    }
    Ok(attribute)
}

fn emit(
    insn: &Instruction,
    code: &mut Vec<u8>,
    pool: &mut ConstantPool,
    label_offsets: &mut HashMap<Label, u32>,
    fixups: &mut Vec<Fixup>,
) -> Result<()> {
    let insn_start = code.len() as u32;
    match insn {
        Instruction::Label(label) => {
            if label_offsets.insert(*label, insn_start).is_some() {
                return Err(Error::internal(format!("label {:?} defined twice", label)));
            }
        }
        Instruction::Simple(opcode) => code.push(*opcode),
        Instruction::Push { opcode, operand } => match *opcode {
            BIPUSH => {
                let value = i8::try_from(*operand)
                    .map_err(|_| Error::bytecode(format!("bipush operand {} out of range", operand)))?;
                code.push(BIPUSH);
                code.push(value as u8);
            }
            SIPUSH => {
                let value = i16::try_from(*operand)
                    .map_err(|_| Error::bytecode(format!("sipush operand {} out of range", operand)))?;
                code.push(SIPUSH);
                code.extend_from_slice(&value.to_be_bytes());
            }
            NEWARRAY => {
                let value = u8::try_from(*operand)
                    .map_err(|_| Error::bytecode(format!("newarray type {} out of range", operand)))?;
                code.push(NEWARRAY);
                code.push(value);
            }
            other => {
                return Err(Error::internal(format!(
                    "opcode 0x{:02x} is not an operand push",
                    other
                )));
            }
        },
        Instruction::Var { opcode, index } => emit_var(*opcode, *index, code)?,
        Instruction::Iinc { index, delta } => {
            if *index <= u8::MAX as u16 && i8::try_from(*delta).is_ok() {
                code.push(IINC);
                code.push(*index as u8);
                code.push(*delta as i8 as u8);
            } else {
                code.push(WIDE);
                code.push(IINC);
                code.extend_from_slice(&index.to_be_bytes());
                code.extend_from_slice(&delta.to_be_bytes());
            }
        }
        Instruction::Type { opcode, class_name } => {
            let index = pool.add_class(class_name);
            code.push(*opcode);
            code.extend_from_slice(&index.to_be_bytes());
        }
        Instruction::Field { opcode, owner, name, descriptor } => {
            let index = pool.add_field_ref(owner, name, descriptor);
            code.push(*opcode);
            code.extend_from_slice(&index.to_be_bytes());
        }
        Instruction::Method { opcode, owner, name, descriptor, interface } => {
            let index = if *interface {
                pool.add_interface_method_ref(owner, name, descriptor)
            } else {
                pool.add_method_ref(owner, name, descriptor)
            };
            code.push(*opcode);
            code.extend_from_slice(&index.to_be_bytes());
            if *opcode == INVOKEINTERFACE {
                let count = 1 + argument_slots(descriptor)?;
                let count = u8::try_from(count)
                    .map_err(|_| Error::bytecode("invokeinterface argument slots exceed 255"))?;
                code.push(count);
                code.push(0);
            }
        }
        Instruction::Jump { opcode, target } => {
            code.push(*opcode);
            let kind = if matches!(*opcode, GOTO_W | JSR_W) {
                FixupKind::Wide
            } else {
                FixupKind::Narrow
            };
            let patch_pos = code.len();
            match kind {
                FixupKind::Narrow => code.extend_from_slice(&[0, 0]),
                FixupKind::Wide => code.extend_from_slice(&[0, 0, 0, 0]),
            }
            fixups.push(Fixup { insn_start, patch_pos, target: *target, kind });
        }
        Instruction::Ldc(constant) => emit_ldc(constant, code, pool),
        Instruction::TableSwitch { default, low, high, targets } => {
            let expected = (*high as i64 - *low as i64 + 1) as usize;
            if targets.len() != expected {
                return Err(Error::internal(format!(
                    "tableswitch has {} targets for bounds {}..{}",
                    targets.len(),
                    low,
                    high
                )));
            }
            code.push(TABLESWITCH);
            while code.len() % 4 != 0 {
                code.push(0);
            }
            push_switch_slot(code, fixups, insn_start, *default);
            code.extend_from_slice(&low.to_be_bytes());
            code.extend_from_slice(&high.to_be_bytes());
            for target in targets {
                push_switch_slot(code, fixups, insn_start, *target);
            }
        }
        Instruction::LookupSwitch { default, pairs } => {
            code.push(LOOKUPSWITCH);
            while code.len() % 4 != 0 {
                code.push(0);
            }
            push_switch_slot(code, fixups, insn_start, *default);
            code.extend_from_slice(&(pairs.len() as i32).to_be_bytes());
            for (key, target) in pairs {
                code.extend_from_slice(&key.to_be_bytes());
                push_switch_slot(code, fixups, insn_start, *target);
            }
        }
        Instruction::MultiANewArray { class_name, dimensions } => {
            if *dimensions == 0 {
                return Err(Error::bytecode("multianewarray with zero dimensions"));
            }
            let index = pool.add_class(class_name);
            code.push(MULTIANEWARRAY);
            code.extend_from_slice(&index.to_be_bytes());
            code.push(*dimensions);
        }
    }
    Ok(())
}

fn push_switch_slot(code: &mut Vec<u8>, fixups: &mut Vec<Fixup>, insn_start: u32, target: Label) {
    fixups.push(Fixup { insn_start, patch_pos: code.len(), target, kind: FixupKind::Wide });
    code.extend_from_slice(&[0, 0, 0, 0]);
}

fn emit_var(opcode: u8, index: u16, code: &mut Vec<u8>) -> Result<()> {
    let short_base = match opcode {
        ILOAD..=ALOAD => Some(ILOAD_0 + (opcode - ILOAD) * 4),
        ISTORE..=ASTORE => Some(ISTORE_0 + (opcode - ISTORE) * 4),
        RET => None,
        other => {
            return Err(Error::internal(format!(
                "opcode 0x{:02x} is not a local variable access",
                other
            )));
        }
    };
    if let (Some(base), true) = (short_base, index <= 3) {
        code.push(base + index as u8);
    } else if index <= u8::MAX as u16 {
        code.push(opcode);
        code.push(index as u8);
    } else {
        code.push(WIDE);
        code.push(opcode);
        code.extend_from_slice(&index.to_be_bytes());
    }
    Ok(())
}

fn emit_ldc(constant: &LdcConstant, code: &mut Vec<u8>, pool: &mut ConstantPool) {
    let (index, two_words) = match constant {
        LdcConstant::Integer(value) => (pool.add_integer(*value), false),
        LdcConstant::Float(value) => (pool.add_float(*value), false),
        LdcConstant::String(value) => (pool.add_string(value), false),
        LdcConstant::Class(name) => (pool.add_class(name), false),
        LdcConstant::Long(value) => (pool.add_long(*value), true),
        LdcConstant::Double(value) => (pool.add_double(*value), true),
    };
    if two_words {
        code.push(LDC2_W);
        code.extend_from_slice(&index.to_be_bytes());
    } else if index <= u8::MAX as u16 {
        code.push(LDC);
        code.push(index as u8);
    } else {
        code.push(LDC_W);
        code.extend_from_slice(&index.to_be_bytes());
    }
}

/// Number of operand slots taken by a method descriptor's arguments
/// (long and double take two).
pub(crate) fn argument_slots(descriptor: &str) -> Result<u16> {
    let inner = descriptor
        .strip_prefix('(')
        .and_then(|rest| rest.split_once(')'))
        .map(|(args, _)| args)
        .ok_or_else(|| {
            Error::class_format(format!("invalid method descriptor '{}'", descriptor))
        })?;
    let mut slots: u16 = 0;
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            'J' | 'D' => slots += 2,
            'B' | 'C' | 'F' | 'I' | 'S' | 'Z' => slots += 1,
            'L' => {
                slots += 1;
                if !chars.by_ref().any(|c| c == ';') {
                    return Err(Error::class_format(format!(
                        "unterminated object type in descriptor '{}'",
                        descriptor
                    )));
                }
            }
            '[' => {
                // Array of anything is one reference slot; consume the
                // element type without counting it.
                let mut next = chars.next();
                while next == Some('[') {
                    next = chars.next();
                }
                match next {
                    Some('L') => {
                        if !chars.by_ref().any(|c| c == ';') {
                            return Err(Error::class_format(format!(
                                "unterminated object type in descriptor '{}'",
                                descriptor
                            )));
                        }
                    }
                    Some('B' | 'C' | 'F' | 'I' | 'S' | 'Z' | 'J' | 'D') => {}
                    _ => {
                        return Err(Error::class_format(format!(
                            "invalid array type in descriptor '{}'",
                            descriptor
                        )));
                    }
                }
                slots += 1;
            }
            other => {
                return Err(Error::class_format(format!(
                    "invalid type character '{}' in descriptor '{}'",
                    other, descriptor
                )));
            }
        }
    }
    Ok(slots)
}
