//! Constant pool and constants for Java class files

use std::collections::HashMap;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(u16),
    String(u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
    NameAndType(u16, u16),
    MethodHandle(u8, u16),
    MethodType(u16),
    Dynamic(u16, u16),
    InvokeDynamic(u16, u16),
    Module(u16),
    Package(u16),
}

pub mod constant_tags {
    pub const CONSTANT_UTF8: u8 = 1;
    pub const CONSTANT_INTEGER: u8 = 3;
    pub const CONSTANT_FLOAT: u8 = 4;
    pub const CONSTANT_LONG: u8 = 5;
    pub const CONSTANT_DOUBLE: u8 = 6;
    pub const CONSTANT_CLASS: u8 = 7;
    pub const CONSTANT_STRING: u8 = 8;
    pub const CONSTANT_FIELDREF: u8 = 9;
    pub const CONSTANT_METHODREF: u8 = 10;
    pub const CONSTANT_INTERFACEMETHODREF: u8 = 11;
    pub const CONSTANT_NAMEANDTYPE: u8 = 12;
    pub const CONSTANT_METHODHANDLE: u8 = 15;
    pub const CONSTANT_METHODTYPE: u8 = 16;
    pub const CONSTANT_DYNAMIC: u8 = 17;
    pub const CONSTANT_INVOKEDYNAMIC: u8 = 18;
    pub const CONSTANT_MODULE: u8 = 19;
    pub const CONSTANT_PACKAGE: u8 = 20;
}

/// Hashable identity of a pool entry, used for deduplication. Float and
/// double keys go through their bit patterns.
#[derive(Debug, Hash, PartialEq, Eq)]
enum PoolKey {
    Utf8(String),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Class(u16),
    Str(u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
    NameAndType(u16, u16),
}

/// A class-file constant pool. Indices are 1-based; Long and Double entries
/// occupy two slots, with the second slot unusable.
#[derive(Debug, Default)]
pub struct ConstantPool {
    entries: Vec<Option<Constant>>,
    cache: HashMap<PoolKey, u16>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self { entries: Vec::new(), cache: HashMap::new() }
    }

    /// The constant_pool_count value: number of slots plus one.
    pub fn count(&self) -> u16 {
        self.entries.len() as u16 + 1
    }

    fn push(&mut self, constant: Constant) -> u16 {
        let index = self.entries.len() as u16 + 1;
        let two_slots = matches!(constant, Constant::Long(_) | Constant::Double(_));
        self.entries.push(Some(constant));
        if two_slots {
            self.entries.push(None);
        }
        index
    }

    fn intern(&mut self, key: PoolKey, constant: Constant) -> u16 {
        if let Some(&index) = self.cache.get(&key) {
            return index;
        }
        let index = self.push(constant);
        self.cache.insert(key, index);
        index
    }

    pub fn add_utf8(&mut self, value: &str) -> u16 {
        self.intern(PoolKey::Utf8(value.to_string()), Constant::Utf8(value.to_string()))
    }

    pub fn add_integer(&mut self, value: i32) -> u16 {
        self.intern(PoolKey::Integer(value), Constant::Integer(value))
    }

    pub fn add_float(&mut self, value: f32) -> u16 {
        self.intern(PoolKey::Float(value.to_bits()), Constant::Float(value))
    }

    pub fn add_long(&mut self, value: i64) -> u16 {
        self.intern(PoolKey::Long(value), Constant::Long(value))
    }

    pub fn add_double(&mut self, value: f64) -> u16 {
        self.intern(PoolKey::Double(value.to_bits()), Constant::Double(value))
    }

    pub fn add_class(&mut self, name: &str) -> u16 {
        let name_index = self.add_utf8(name);
        self.intern(PoolKey::Class(name_index), Constant::Class(name_index))
    }

    pub fn add_string(&mut self, value: &str) -> u16 {
        let utf8_index = self.add_utf8(value);
        self.intern(PoolKey::Str(utf8_index), Constant::String(utf8_index))
    }

    pub fn add_name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.add_utf8(name);
        let descriptor_index = self.add_utf8(descriptor);
        self.intern(
            PoolKey::NameAndType(name_index, descriptor_index),
            Constant::NameAndType(name_index, descriptor_index),
        )
    }

    pub fn add_field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.add_class(class);
        let name_and_type_index = self.add_name_and_type(name, descriptor);
        self.intern(
            PoolKey::FieldRef(class_index, name_and_type_index),
            Constant::FieldRef(class_index, name_and_type_index),
        )
    }

    pub fn add_method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.add_class(class);
        let name_and_type_index = self.add_name_and_type(name, descriptor);
        self.intern(
            PoolKey::MethodRef(class_index, name_and_type_index),
            Constant::MethodRef(class_index, name_and_type_index),
        )
    }

    pub fn add_interface_method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.add_class(class);
        let name_and_type_index = self.add_name_and_type(name, descriptor);
        self.intern(
            PoolKey::InterfaceMethodRef(class_index, name_and_type_index),
            Constant::InterfaceMethodRef(class_index, name_and_type_index),
        )
    }

    /// Append a constant parsed from an existing class file. No
    /// deduplication: parsed pools keep their original indices.
    pub(crate) fn push_parsed(&mut self, constant: Constant) {
        self.entries.push(Some(constant));
    }

    /// Append the phantom second slot of a Long or Double entry.
    pub(crate) fn push_phantom(&mut self) {
        self.entries.push(None);
    }

    pub fn get(&self, index: u16) -> Result<&Constant> {
        index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i as usize))
            .and_then(|slot| slot.as_ref())
            .ok_or_else(|| Error::class_format(format!("invalid constant pool index {}", index)))
    }

    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value),
            other => Err(Error::class_format(format!(
                "constant pool index {} is not Utf8 but {:?}",
                index, other
            ))),
        }
    }

    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Class(name_index) => self.utf8(*name_index),
            other => Err(Error::class_format(format!(
                "constant pool index {} is not Class but {:?}",
                index, other
            ))),
        }
    }

    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index)? {
            Constant::NameAndType(name_index, descriptor_index) => {
                Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?))
            }
            other => Err(Error::class_format(format!(
                "constant pool index {} is not NameAndType but {:?}",
                index, other
            ))),
        }
    }

    /// Resolve a FieldRef entry to (owner, name, descriptor).
    pub fn field_ref(&self, index: u16) -> Result<(&str, &str, &str)> {
        match self.get(index)? {
            Constant::FieldRef(class_index, nat_index) => {
                let owner = self.class_name(*class_index)?;
                let (name, descriptor) = self.name_and_type(*nat_index)?;
                Ok((owner, name, descriptor))
            }
            other => Err(Error::class_format(format!(
                "constant pool index {} is not FieldRef but {:?}",
                index, other
            ))),
        }
    }

    /// Resolve a MethodRef or InterfaceMethodRef entry to
    /// (owner, name, descriptor, is_interface).
    pub fn method_ref(&self, index: u16) -> Result<(&str, &str, &str, bool)> {
        let (class_index, nat_index, interface) = match self.get(index)? {
            Constant::MethodRef(class_index, nat_index) => (*class_index, *nat_index, false),
            Constant::InterfaceMethodRef(class_index, nat_index) => (*class_index, *nat_index, true),
            other => {
                return Err(Error::class_format(format!(
                    "constant pool index {} is not a method reference but {:?}",
                    index, other
                )))
            }
        };
        let owner = self.class_name(class_index)?;
        let (name, descriptor) = self.name_and_type(nat_index)?;
        Ok((owner, name, descriptor, interface))
    }

    pub(crate) fn slots(&self) -> &[Option<Constant>] {
        &self.entries
    }
}
