//! Class-file parsing and traversal driving
//!
//! The reader parses a complete class file, then fires the visitor events
//! in the traversal order of the structural contract: header, fields,
//! methods, inner-class declarations, end. Parsing up front (rather than
//! firing while scanning) lets the header event carry the class signature,
//! which the format stores after the member tables.

use super::constpool::{constant_tags::*, Constant, ConstantPool};
use super::defs::MAGIC;
use crate::bytecode::{self, ExceptionHandler, MethodBody};
use crate::error::{Error, Result};
use crate::visit::{
    ClassHeader, ClassVisitor, FieldConstant, FieldDeclaration, InnerClassDeclaration,
    MethodDeclaration,
};

pub struct ClassReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Parse the class and drive the visitor through its declarations.
    pub fn accept<V: ClassVisitor>(mut self, visitor: &mut V) -> Result<()> {
        let magic = self.u32()?;
        if magic != MAGIC {
            return Err(Error::class_format(format!("bad magic number 0x{:08X}", magic)));
        }
        let minor_version = self.u16()?;
        let major_version = self.u16()?;
        let pool = self.read_constant_pool()?;

        let access_flags = self.u16()?;
        let this_class = self.u16()?;
        let name = pool.class_name(this_class)?.to_string();
        let super_index = self.u16()?;
        let super_name = if super_index == 0 {
            None
        } else {
            Some(pool.class_name(super_index)?.to_string())
        };
        let interface_count = self.u16()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            let index = self.u16()?;
            interfaces.push(pool.class_name(index)?.to_string());
        }

        let field_count = self.u16()?;
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            fields.push(self.read_field(&pool)?);
        }

        let method_count = self.u16()?;
        let mut methods = Vec::with_capacity(method_count as usize);
        for _ in 0..method_count {
            methods.push(self.read_method(&pool)?);
        }

        let mut signature = None;
        let mut inner_classes = Vec::new();
        let attribute_count = self.u16()?;
        for _ in 0..attribute_count {
            let attr_name_index = self.u16()?;
            let attr_name = pool.utf8(attr_name_index)?.to_string();
            let length = self.u32()? as usize;
            let data = self.take(length)?;
            match attr_name.as_str() {
                "Signature" => {
                    let index = be_u16(data, 0)?;
                    signature = Some(pool.utf8(index)?.to_string());
                }
                "InnerClasses" => {
                    let count = be_u16(data, 0)? as usize;
                    for i in 0..count {
                        let base = 2 + i * 8;
                        let inner_index = be_u16(data, base)?;
                        let outer_index = be_u16(data, base + 2)?;
                        let inner_name_index = be_u16(data, base + 4)?;
                        let inner_access = be_u16(data, base + 6)?;
                        inner_classes.push(InnerClassDeclaration {
                            name: pool.class_name(inner_index)?.to_string(),
                            outer_name: if outer_index == 0 {
                                None
                            } else {
                                Some(pool.class_name(outer_index)?.to_string())
                            },
                            inner_name: if inner_name_index == 0 {
                                None
                            } else {
                                Some(pool.utf8(inner_name_index)?.to_string())
                            },
                            access_flags: inner_access,
                        });
                    }
                }
                _ => {}
            }
        }

        visitor.visit_header(ClassHeader {
            minor_version,
            major_version,
            access_flags,
            name,
            signature,
            super_name,
            interfaces,
        })?;
        for field in fields {
            visitor.visit_field(field)?;
        }
        for method in methods {
            visitor.visit_method(method)?;
        }
        for inner_class in inner_classes {
            visitor.visit_inner_class(inner_class)?;
        }
        visitor.visit_end()
    }

    fn read_constant_pool(&mut self) -> Result<ConstantPool> {
        let count = self.u16()?;
        if count == 0 {
            return Err(Error::class_format("constant pool count of zero"));
        }
        let mut pool = ConstantPool::new();
        let count = count as u32;
        let mut index: u32 = 1;
        while index < count {
            let tag = self.u8()?;
            let constant = match tag {
                CONSTANT_UTF8 => {
                    let length = self.u16()? as usize;
                    let bytes = self.take(length)?;
                    let value = std::str::from_utf8(bytes).map_err(|_| {
                        Error::class_format("invalid UTF-8 in constant pool entry")
                    })?;
                    Constant::Utf8(value.to_string())
                }
                CONSTANT_INTEGER => Constant::Integer(self.u32()? as i32),
                CONSTANT_FLOAT => Constant::Float(f32::from_bits(self.u32()?)),
                CONSTANT_LONG => Constant::Long(self.u64()? as i64),
                CONSTANT_DOUBLE => Constant::Double(f64::from_bits(self.u64()?)),
                CONSTANT_CLASS => Constant::Class(self.u16()?),
                CONSTANT_STRING => Constant::String(self.u16()?),
                CONSTANT_FIELDREF => Constant::FieldRef(self.u16()?, self.u16()?),
                CONSTANT_METHODREF => Constant::MethodRef(self.u16()?, self.u16()?),
                CONSTANT_INTERFACEMETHODREF => {
                    Constant::InterfaceMethodRef(self.u16()?, self.u16()?)
                }
                CONSTANT_NAMEANDTYPE => Constant::NameAndType(self.u16()?, self.u16()?),
                CONSTANT_METHODHANDLE => Constant::MethodHandle(self.u8()?, self.u16()?),
                CONSTANT_METHODTYPE => Constant::MethodType(self.u16()?),
                CONSTANT_DYNAMIC => Constant::Dynamic(self.u16()?, self.u16()?),
                CONSTANT_INVOKEDYNAMIC => Constant::InvokeDynamic(self.u16()?, self.u16()?),
                CONSTANT_MODULE => Constant::Module(self.u16()?),
                CONSTANT_PACKAGE => Constant::Package(self.u16()?),
                other => {
                    return Err(Error::class_format(format!(
                        "unknown constant pool tag {}",
                        other
                    )));
                }
            };
            let two_slots = matches!(constant, Constant::Long(_) | Constant::Double(_));
            pool.push_parsed(constant);
            index += 1;
            if two_slots {
                pool.push_phantom();
                index += 1;
            }
        }
        Ok(pool)
    }

    fn read_field(&mut self, pool: &ConstantPool) -> Result<FieldDeclaration> {
        let access_flags = self.u16()?;
        let name = pool.utf8(self.u16()?)?.to_string();
        let descriptor = pool.utf8(self.u16()?)?.to_string();
        let mut signature = None;
        let mut constant_value = None;
        let attribute_count = self.u16()?;
        for _ in 0..attribute_count {
            let attr_name_index = self.u16()?;
            let attr_name = pool.utf8(attr_name_index)?.to_string();
            let length = self.u32()? as usize;
            let data = self.take(length)?;
            match attr_name.as_str() {
                "ConstantValue" => {
                    let index = be_u16(data, 0)?;
                    constant_value = Some(match pool.get(index)? {
                        Constant::Integer(value) => FieldConstant::Integer(*value),
                        Constant::Long(value) => FieldConstant::Long(*value),
                        Constant::Float(value) => FieldConstant::Float(*value),
                        Constant::Double(value) => FieldConstant::Double(*value),
                        Constant::String(utf8_index) => {
                            FieldConstant::String(pool.utf8(*utf8_index)?.to_string())
                        }
                        other => {
                            return Err(Error::class_format(format!(
                                "invalid ConstantValue entry {:?} for field {}",
                                other, name
                            )));
                        }
                    });
                }
                "Signature" => {
                    let index = be_u16(data, 0)?;
                    signature = Some(pool.utf8(index)?.to_string());
                }
                _ => {}
            }
        }
        Ok(FieldDeclaration { access_flags, name, descriptor, signature, constant_value })
    }

    fn read_method(&mut self, pool: &ConstantPool) -> Result<MethodDeclaration> {
        let access_flags = self.u16()?;
        let name = pool.utf8(self.u16()?)?.to_string();
        let descriptor = pool.utf8(self.u16()?)?.to_string();
        let mut signature = None;
        let mut exceptions = Vec::new();
        let mut body = None;
        let attribute_count = self.u16()?;
        for _ in 0..attribute_count {
            let attr_name_index = self.u16()?;
            let attr_name = pool.utf8(attr_name_index)?.to_string();
            let length = self.u32()? as usize;
            let data = self.take(length)?;
            match attr_name.as_str() {
                "Code" => body = Some(read_code(data, pool)?),
                "Exceptions" => {
                    let count = be_u16(data, 0)? as usize;
                    for i in 0..count {
                        let index = be_u16(data, 2 + i * 2)?;
                        exceptions.push(pool.class_name(index)?.to_string());
                    }
                }
                "Signature" => {
                    let index = be_u16(data, 0)?;
                    signature = Some(pool.utf8(index)?.to_string());
                }
                _ => {}
            }
        }
        Ok(MethodDeclaration { access_flags, name, descriptor, signature, exceptions, body })
    }

    fn at(&self) -> usize {
        self.pos
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(count).filter(|&e| e <= self.bytes.len());
        match end {
            Some(end) => {
                let slice = &self.bytes[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(Error::class_format(format!(
                "unexpected end of class file at offset {}",
                self.at()
            ))),
        }
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(buf))
    }
}

/// Parse a Code attribute payload into a symbolic method body. Nested
/// debug attributes (line numbers, local variable tables) are dropped.
fn read_code(data: &[u8], pool: &ConstantPool) -> Result<MethodBody> {
    let max_stack = be_u16(data, 0)?;
    let max_locals = be_u16(data, 2)?;
    let code_length = be_u32(data, 4)? as usize;
    let code = data
        .get(8..8 + code_length)
        .ok_or_else(|| Error::class_format("Code attribute shorter than its code length"))?;

    let table_base = 8 + code_length;
    let handler_count = be_u16(data, table_base)? as usize;
    let mut raw_handlers = Vec::with_capacity(handler_count);
    let mut extra_targets = Vec::with_capacity(handler_count * 3);
    for i in 0..handler_count {
        let base = table_base + 2 + i * 8;
        let start_pc = be_u16(data, base)? as u32;
        let end_pc = be_u16(data, base + 2)? as u32;
        let handler_pc = be_u16(data, base + 4)? as u32;
        let catch_index = be_u16(data, base + 6)?;
        extra_targets.extend_from_slice(&[start_pc, end_pc, handler_pc]);
        let catch_type = if catch_index == 0 {
            None
        } else {
            Some(pool.class_name(catch_index)?.to_string())
        };
        raw_handlers.push((start_pc, end_pc, handler_pc, catch_type));
    }

    let decoded = bytecode::decode(code, pool, &extra_targets)?;
    let handlers = raw_handlers
        .into_iter()
        .map(|(start, end, handler, catch_type)| {
            Ok(ExceptionHandler {
                start: decoded.label_at(start)?,
                end: decoded.label_at(end)?,
                handler: decoded.label_at(handler)?,
                catch_type,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MethodBody { max_stack, max_locals, instructions: decoded.instructions, handlers })
}

fn be_u16(data: &[u8], offset: usize) -> Result<u16> {
    data.get(offset..offset + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| Error::class_format("truncated attribute payload"))
}

fn be_u32(data: &[u8], offset: usize) -> Result<u32> {
    data.get(offset..offset + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| Error::class_format("truncated attribute payload"))
}
