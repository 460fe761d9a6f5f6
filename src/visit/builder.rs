//! Rebuilding a class file from a traversal event stream

use crate::bytecode;
use crate::classfile::attribute::{
    make_code_attribute, make_constant_value_attribute, make_exceptions_attribute,
    make_inner_classes_attribute, make_signature_attribute, InnerClassAttrEntry,
};
use crate::classfile::{class_file_to_bytes, ClassFile, FieldInfo, MethodInfo};
use crate::error::{Error, Result};

use super::{
    ClassHeader, ClassVisitor, FieldConstant, FieldDeclaration, InnerClassDeclaration,
    MethodDeclaration,
};

/// A visitor that reconstitutes the event stream into a serialized class,
/// interning every symbolic reference into a fresh constant pool.
#[derive(Debug, Default)]
pub struct ClassBuilder {
    class_file: ClassFile,
    class_name: Option<String>,
    inner_classes: Vec<InnerClassDeclaration>,
}

impl ClassBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Internal name of the class being built, once the header was seen.
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// Serialize the rebuilt class.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        if self.class_name.is_none() {
            return Err(Error::internal("class builder finished without a class header"));
        }
        Ok(class_file_to_bytes(&self.class_file))
    }
}

impl ClassVisitor for ClassBuilder {
    fn visit_header(&mut self, header: ClassHeader) -> Result<()> {
        let cf = &mut self.class_file;
        cf.minor_version = header.minor_version;
        cf.major_version = header.major_version;
        cf.access_flags = header.access_flags;
        cf.this_class = cf.constant_pool.add_class(&header.name);
        cf.super_class = match &header.super_name {
            Some(name) => cf.constant_pool.add_class(name),
            None => 0,
        };
        for interface in &header.interfaces {
            let index = cf.constant_pool.add_class(interface);
            cf.interfaces.push(index);
        }
        if let Some(signature) = &header.signature {
            let attribute = make_signature_attribute(&mut cf.constant_pool, signature);
            cf.attributes.push(attribute);
        }
        self.class_name = Some(header.name);
        Ok(())
    }

    fn visit_field(&mut self, field: FieldDeclaration) -> Result<()> {
        let cf = &mut self.class_file;
        let name_index = cf.constant_pool.add_utf8(&field.name);
        let descriptor_index = cf.constant_pool.add_utf8(&field.descriptor);
        let mut info = FieldInfo::new(field.access_flags, name_index, descriptor_index);
        if let Some(constant) = &field.constant_value {
            let constant_index = match constant {
                FieldConstant::Integer(value) => cf.constant_pool.add_integer(*value),
                FieldConstant::Long(value) => cf.constant_pool.add_long(*value),
                FieldConstant::Float(value) => cf.constant_pool.add_float(*value),
                FieldConstant::Double(value) => cf.constant_pool.add_double(*value),
                FieldConstant::String(value) => cf.constant_pool.add_string(value),
            };
            info.attributes
                .push(make_constant_value_attribute(&mut cf.constant_pool, constant_index));
        }
        if let Some(signature) = &field.signature {
            info.attributes.push(make_signature_attribute(&mut cf.constant_pool, signature));
        }
        cf.fields.push(info);
        Ok(())
    }

    fn visit_method(&mut self, method: MethodDeclaration) -> Result<()> {
        let cf = &mut self.class_file;
        let name_index = cf.constant_pool.add_utf8(&method.name);
        let descriptor_index = cf.constant_pool.add_utf8(&method.descriptor);
        let mut info = MethodInfo::new(method.access_flags, name_index, descriptor_index);
        if let Some(body) = &method.body {
            let code = bytecode::encode(body, &mut cf.constant_pool)?;
            info.attributes.push(make_code_attribute(&mut cf.constant_pool, &code));
        }
        if !method.exceptions.is_empty() {
            info.attributes
                .push(make_exceptions_attribute(&mut cf.constant_pool, &method.exceptions));
        }
        if let Some(signature) = &method.signature {
            info.attributes.push(make_signature_attribute(&mut cf.constant_pool, signature));
        }
        cf.methods.push(info);
        Ok(())
    }

    fn visit_inner_class(&mut self, inner_class: InnerClassDeclaration) -> Result<()> {
        self.inner_classes.push(inner_class);
        Ok(())
    }

    fn visit_end(&mut self) -> Result<()> {
        if self.inner_classes.is_empty() {
            return Ok(());
        }
        let cf = &mut self.class_file;
        let entries: Vec<InnerClassAttrEntry> = self
            .inner_classes
            .iter()
            .map(|inner| InnerClassAttrEntry {
                inner_class_index: cf.constant_pool.add_class(&inner.name),
                outer_class_index: inner
                    .outer_name
                    .as_deref()
                    .map(|name| cf.constant_pool.add_class(name))
                    .unwrap_or(0),
                inner_name_index: inner
                    .inner_name
                    .as_deref()
                    .map(|name| cf.constant_pool.add_utf8(name))
                    .unwrap_or(0),
                access_flags: inner.access_flags,
            })
            .collect();
        let attribute = make_inner_classes_attribute(&mut cf.constant_pool, &entries);
        cf.attributes.push(attribute);
        Ok(())
    }
}
