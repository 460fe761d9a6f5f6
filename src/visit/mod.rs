//! Structural traversal contract over one class definition
//!
//! A traversal presents a class as an ordered event stream: header, field
//! declarations, method declarations, inner-class declarations, end marker.
//! Passes implement `ClassVisitor` and either consume events or forward
//! them to a downstream visitor.

pub mod builder;

use crate::bytecode::MethodBody;
use crate::classfile::defs::{NO_ARG_VOID_DESCRIPTOR, STATIC_INITIALIZER_METHOD_NAME};
use crate::error::Result;

pub use builder::ClassBuilder;

/// The class header event: everything known about the class itself before
/// its members are walked.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassHeader {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    /// Internal (slash-separated) qualified name.
    pub name: String,
    pub signature: Option<String>,
    /// None only for the root object type itself.
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
}

/// A field constant value, as held by a ConstantValue attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldConstant {
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub constant_value: Option<FieldConstant>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDeclaration {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    /// Checked exception class names from the Exceptions attribute.
    pub exceptions: Vec<String>,
    /// None for abstract and native methods.
    pub body: Option<MethodBody>,
}

impl MethodDeclaration {
    /// Whether this is the class initialization method.
    pub fn is_static_initializer(&self) -> bool {
        self.name == STATIC_INITIALIZER_METHOD_NAME && self.descriptor == NO_ARG_VOID_DESCRIPTOR
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InnerClassDeclaration {
    pub name: String,
    pub outer_name: Option<String>,
    pub inner_name: Option<String>,
    pub access_flags: u16,
}

/// One pass over a class's structural declarations. Events arrive in a
/// fixed order: header, then each field, then each method, then each
/// inner-class declaration, then end.
pub trait ClassVisitor {
    fn visit_header(&mut self, header: ClassHeader) -> Result<()>;
    fn visit_field(&mut self, field: FieldDeclaration) -> Result<()>;
    fn visit_method(&mut self, method: MethodDeclaration) -> Result<()>;
    fn visit_inner_class(&mut self, inner_class: InnerClassDeclaration) -> Result<()>;
    fn visit_end(&mut self) -> Result<()>;
}
