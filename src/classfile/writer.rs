//! Trait-based serialization for classfile structures

use std::io::Write;

use super::class::ClassFile;
use super::constpool::{constant_tags::*, Constant, ConstantPool};

/// An object which can be written into a classfile.
pub trait ClassfileWritable {
    /// Writes the bytes of this object into the given buffer.
    fn write_to_classfile<W: Write>(&self, buffer: &mut W) -> std::io::Result<()>;

    /// Writes the bytes of this object into a newly created buffer.
    fn to_classfile_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        let _ = self.write_to_classfile(&mut buffer);
        buffer
    }
}

impl ClassfileWritable for ClassFile {
    fn write_to_classfile<W: Write>(&self, buffer: &mut W) -> std::io::Result<()> {
        buffer.write_all(&self.magic.to_be_bytes())?;

        buffer.write_all(&self.minor_version.to_be_bytes())?;
        buffer.write_all(&self.major_version.to_be_bytes())?;

        self.constant_pool.write_to_classfile(buffer)?;

        buffer.write_all(&self.access_flags.to_be_bytes())?;

        buffer.write_all(&self.this_class.to_be_bytes())?;
        buffer.write_all(&self.super_class.to_be_bytes())?;

        buffer.write_all(&(self.interfaces.len() as u16).to_be_bytes())?;
        for interface in &self.interfaces {
            buffer.write_all(&interface.to_be_bytes())?;
        }

        buffer.write_all(&(self.fields.len() as u16).to_be_bytes())?;
        for field in &self.fields {
            buffer.write_all(&field.to_bytes())?;
        }

        buffer.write_all(&(self.methods.len() as u16).to_be_bytes())?;
        for method in &self.methods {
            buffer.write_all(&method.to_bytes())?;
        }

        buffer.write_all(&(self.attributes.len() as u16).to_be_bytes())?;
        for attribute in &self.attributes {
            buffer.write_all(&attribute.to_bytes())?;
        }
        Ok(())
    }
}

impl ClassfileWritable for ConstantPool {
    fn write_to_classfile<W: Write>(&self, buffer: &mut W) -> std::io::Result<()> {
        buffer.write_all(&self.count().to_be_bytes())?;
        // Phantom slots of Long/Double entries occupy an index but no bytes.
        for slot in self.slots() {
            if let Some(constant) = slot {
                constant.write_to_classfile(buffer)?;
            }
        }
        Ok(())
    }
}

impl ClassfileWritable for Constant {
    fn write_to_classfile<W: Write>(&self, buffer: &mut W) -> std::io::Result<()> {
        match self {
            Constant::Utf8(value) => {
                buffer.write_all(&[CONSTANT_UTF8])?;
                let utf8_bytes = value.as_bytes();
                buffer.write_all(&(utf8_bytes.len() as u16).to_be_bytes())?;
                buffer.write_all(utf8_bytes)?;
            }
            Constant::Integer(value) => {
                buffer.write_all(&[CONSTANT_INTEGER])?;
                buffer.write_all(&value.to_be_bytes())?;
            }
            Constant::Float(value) => {
                buffer.write_all(&[CONSTANT_FLOAT])?;
                buffer.write_all(&value.to_be_bytes())?;
            }
            Constant::Long(value) => {
                buffer.write_all(&[CONSTANT_LONG])?;
                buffer.write_all(&value.to_be_bytes())?;
            }
            Constant::Double(value) => {
                buffer.write_all(&[CONSTANT_DOUBLE])?;
                buffer.write_all(&value.to_be_bytes())?;
            }
            Constant::Class(name_index) => {
                buffer.write_all(&[CONSTANT_CLASS])?;
                buffer.write_all(&name_index.to_be_bytes())?;
            }
            Constant::String(string_index) => {
                buffer.write_all(&[CONSTANT_STRING])?;
                buffer.write_all(&string_index.to_be_bytes())?;
            }
            Constant::FieldRef(class_index, name_and_type_index) => {
                buffer.write_all(&[CONSTANT_FIELDREF])?;
                buffer.write_all(&class_index.to_be_bytes())?;
                buffer.write_all(&name_and_type_index.to_be_bytes())?;
            }
            Constant::MethodRef(class_index, name_and_type_index) => {
                buffer.write_all(&[CONSTANT_METHODREF])?;
                buffer.write_all(&class_index.to_be_bytes())?;
                buffer.write_all(&name_and_type_index.to_be_bytes())?;
            }
            Constant::InterfaceMethodRef(class_index, name_and_type_index) => {
                buffer.write_all(&[CONSTANT_INTERFACEMETHODREF])?;
                buffer.write_all(&class_index.to_be_bytes())?;
                buffer.write_all(&name_and_type_index.to_be_bytes())?;
            }
            Constant::NameAndType(name_index, descriptor_index) => {
                buffer.write_all(&[CONSTANT_NAMEANDTYPE])?;
                buffer.write_all(&name_index.to_be_bytes())?;
                buffer.write_all(&descriptor_index.to_be_bytes())?;
            }
            Constant::MethodHandle(reference_kind, reference_index) => {
                buffer.write_all(&[CONSTANT_METHODHANDLE])?;
                buffer.write_all(&[*reference_kind])?;
                buffer.write_all(&reference_index.to_be_bytes())?;
            }
            Constant::MethodType(descriptor_index) => {
                buffer.write_all(&[CONSTANT_METHODTYPE])?;
                buffer.write_all(&descriptor_index.to_be_bytes())?;
            }
            Constant::Dynamic(bootstrap_index, name_and_type_index) => {
                buffer.write_all(&[CONSTANT_DYNAMIC])?;
                buffer.write_all(&bootstrap_index.to_be_bytes())?;
                buffer.write_all(&name_and_type_index.to_be_bytes())?;
            }
            Constant::InvokeDynamic(bootstrap_index, name_and_type_index) => {
                buffer.write_all(&[CONSTANT_INVOKEDYNAMIC])?;
                buffer.write_all(&bootstrap_index.to_be_bytes())?;
                buffer.write_all(&name_and_type_index.to_be_bytes())?;
            }
            Constant::Module(name_index) => {
                buffer.write_all(&[CONSTANT_MODULE])?;
                buffer.write_all(&name_index.to_be_bytes())?;
            }
            Constant::Package(name_index) => {
                buffer.write_all(&[CONSTANT_PACKAGE])?;
                buffer.write_all(&name_index.to_be_bytes())?;
            }
        }
        Ok(())
    }
}

/// Serialize a complete class file to bytes.
pub fn class_file_to_bytes(class_file: &ClassFile) -> Vec<u8> {
    class_file.to_classfile_bytes()
}
