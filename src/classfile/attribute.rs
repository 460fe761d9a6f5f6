//! Attributes and exception table structures for Java class files

use super::constpool::ConstantPool;

#[derive(Debug, Clone)]
pub struct AttributeInfo {
    pub name_index: u16,
    pub info: Vec<u8>,
}

impl AttributeInfo {
    pub fn new(name_index: u16, info: Vec<u8>) -> Self {
        Self { name_index, info }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.name_index.to_be_bytes());
        bytes.extend_from_slice(&(self.info.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.info);
        bytes
    }
}

#[derive(Debug)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Vec<AttributeInfo>,
}

impl CodeAttribute {
    pub fn new(max_stack: u16, max_locals: u16, code: Vec<u8>) -> Self {
        Self {
            max_stack,
            max_locals,
            code,
            exception_table: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.max_stack.to_be_bytes());
        bytes.extend_from_slice(&self.max_locals.to_be_bytes());
        bytes.extend_from_slice(&(self.code.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.code);
        bytes.extend_from_slice(&(self.exception_table.len() as u16).to_be_bytes());
        for entry in &self.exception_table {
            bytes.extend_from_slice(&entry.to_bytes());
        }
        bytes.extend_from_slice(&(self.attributes.len() as u16).to_be_bytes());
        for attribute in &self.attributes {
            bytes.extend_from_slice(&attribute.to_bytes());
        }
        bytes
    }
}

#[derive(Debug, Clone)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

impl ExceptionTableEntry {
    pub fn new(start_pc: u16, end_pc: u16, handler_pc: u16, catch_type: u16) -> Self {
        Self { start_pc, end_pc, handler_pc, catch_type }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.start_pc.to_be_bytes());
        bytes.extend_from_slice(&self.end_pc.to_be_bytes());
        bytes.extend_from_slice(&self.handler_pc.to_be_bytes());
        bytes.extend_from_slice(&self.catch_type.to_be_bytes());
        bytes
    }
}

/// One entry of an InnerClasses attribute, already resolved to pool indices.
#[derive(Debug, Clone, Copy)]
pub struct InnerClassAttrEntry {
    pub inner_class_index: u16,
    pub outer_class_index: u16,
    pub inner_name_index: u16,
    pub access_flags: u16,
}

/// Helper to build an AttributeInfo for a Code attribute
pub fn make_code_attribute(constant_pool: &mut ConstantPool, code: &CodeAttribute) -> AttributeInfo {
    let name_index = constant_pool.add_utf8("Code");
    AttributeInfo::new(name_index, code.to_bytes())
}

/// Helper to build an AttributeInfo for a ConstantValue attribute
pub fn make_constant_value_attribute(
    constant_pool: &mut ConstantPool,
    constant_index: u16,
) -> AttributeInfo {
    let name_index = constant_pool.add_utf8("ConstantValue");
    AttributeInfo::new(name_index, constant_index.to_be_bytes().to_vec())
}

/// Helper to build an AttributeInfo for a Signature attribute
pub fn make_signature_attribute(constant_pool: &mut ConstantPool, signature: &str) -> AttributeInfo {
    let name_index = constant_pool.add_utf8("Signature");
    let signature_index = constant_pool.add_utf8(signature);
    AttributeInfo::new(name_index, signature_index.to_be_bytes().to_vec())
}

/// Helper to build an AttributeInfo for an Exceptions attribute
pub fn make_exceptions_attribute(
    constant_pool: &mut ConstantPool,
    exceptions: &[String],
) -> AttributeInfo {
    let name_index = constant_pool.add_utf8("Exceptions");
    let mut info = Vec::new();
    info.extend_from_slice(&(exceptions.len() as u16).to_be_bytes());
    for exception in exceptions {
        let class_index = constant_pool.add_class(exception);
        info.extend_from_slice(&class_index.to_be_bytes());
    }
    AttributeInfo::new(name_index, info)
}

/// Helper to build an AttributeInfo for an InnerClasses attribute
pub fn make_inner_classes_attribute(
    constant_pool: &mut ConstantPool,
    entries: &[InnerClassAttrEntry],
) -> AttributeInfo {
    let name_index = constant_pool.add_utf8("InnerClasses");
    let mut info = Vec::new();
    info.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    for entry in entries {
        info.extend_from_slice(&entry.inner_class_index.to_be_bytes());
        info.extend_from_slice(&entry.outer_class_index.to_be_bytes());
        info.extend_from_slice(&entry.inner_name_index.to_be_bytes());
        info.extend_from_slice(&entry.access_flags.to_be_bytes());
    }
    AttributeInfo::new(name_index, info)
}
