// Common test utilities
#![allow(dead_code)]

use classlift::bytecode::{Instruction, MethodBody};
use classlift::classfile::defs::{
    JAVA_LANG_OBJECT, NO_ARG_VOID_DESCRIPTOR, STATIC_INITIALIZER_METHOD_NAME,
};
use classlift::classfile::defs::major_versions::JAVA_8;
use classlift::classfile::flags::{ACC_ABSTRACT, ACC_FINAL, ACC_INTERFACE, ACC_PUBLIC, ACC_STATIC};
use classlift::classfile::ClassReader;
use classlift::error::Result;
use classlift::visit::{
    ClassBuilder, ClassHeader, ClassVisitor, FieldDeclaration, InnerClassDeclaration,
    MethodDeclaration,
};

/// Everything a traversal reported about one class.
#[derive(Debug, Default)]
pub struct RecordedClass {
    pub header: Option<ClassHeader>,
    pub fields: Vec<FieldDeclaration>,
    pub methods: Vec<MethodDeclaration>,
    pub inner_classes: Vec<InnerClassDeclaration>,
    pub ended: bool,
}

impl RecordedClass {
    pub fn header(&self) -> &ClassHeader {
        self.header.as_ref().expect("class should have a header")
    }

    pub fn method(&self, name: &str) -> Option<&MethodDeclaration> {
        self.methods.iter().find(|m| m.name == name)
    }
}

impl ClassVisitor for RecordedClass {
    fn visit_header(&mut self, header: ClassHeader) -> Result<()> {
        self.header = Some(header);
        Ok(())
    }
    fn visit_field(&mut self, field: FieldDeclaration) -> Result<()> {
        self.fields.push(field);
        Ok(())
    }
    fn visit_method(&mut self, method: MethodDeclaration) -> Result<()> {
        self.methods.push(method);
        Ok(())
    }
    fn visit_inner_class(&mut self, inner_class: InnerClassDeclaration) -> Result<()> {
        self.inner_classes.push(inner_class);
        Ok(())
    }
    fn visit_end(&mut self) -> Result<()> {
        self.ended = true;
        Ok(())
    }
}

/// Parse class bytes into a recorded event stream.
pub fn read_class(bytes: &[u8]) -> RecordedClass {
    let mut recorded = RecordedClass::default();
    ClassReader::new(bytes).accept(&mut recorded).expect("class should parse");
    recorded
}

pub fn static_field(name: &str, descriptor: &str) -> FieldDeclaration {
    FieldDeclaration {
        access_flags: ACC_PUBLIC | ACC_STATIC | ACC_FINAL,
        name: name.to_string(),
        descriptor: descriptor.to_string(),
        signature: None,
        constant_value: None,
    }
}

pub fn static_initializer(body: MethodBody) -> MethodDeclaration {
    MethodDeclaration {
        access_flags: ACC_STATIC,
        name: STATIC_INITIALIZER_METHOD_NAME.to_string(),
        descriptor: NO_ARG_VOID_DESCRIPTOR.to_string(),
        signature: None,
        exceptions: Vec::new(),
        body: Some(body),
    }
}

pub fn abstract_method(name: &str, descriptor: &str) -> MethodDeclaration {
    MethodDeclaration {
        access_flags: ACC_PUBLIC | ACC_ABSTRACT,
        name: name.to_string(),
        descriptor: descriptor.to_string(),
        signature: None,
        exceptions: Vec::new(),
        body: None,
    }
}

pub fn inner_class_entry(name: &str, outer: &str, simple: &str) -> InnerClassDeclaration {
    InnerClassDeclaration {
        name: name.to_string(),
        outer_name: Some(outer.to_string()),
        inner_name: Some(simple.to_string()),
        access_flags: ACC_PUBLIC | ACC_STATIC,
    }
}

/// Serialize an interface class with the given members.
pub fn interface_class(
    name: &str,
    fields: Vec<FieldDeclaration>,
    methods: Vec<MethodDeclaration>,
    inner_classes: Vec<InnerClassDeclaration>,
) -> Vec<u8> {
    class_with_access(
        ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT,
        name,
        fields,
        methods,
        inner_classes,
    )
}

/// Serialize an ordinary (non-interface) class with the given members.
pub fn plain_class(
    name: &str,
    fields: Vec<FieldDeclaration>,
    methods: Vec<MethodDeclaration>,
) -> Vec<u8> {
    class_with_access(ACC_PUBLIC, name, fields, methods, Vec::new())
}

fn class_with_access(
    access_flags: u16,
    name: &str,
    fields: Vec<FieldDeclaration>,
    methods: Vec<MethodDeclaration>,
    inner_classes: Vec<InnerClassDeclaration>,
) -> Vec<u8> {
    let mut builder = ClassBuilder::new();
    builder
        .visit_header(ClassHeader {
            minor_version: 0,
            major_version: JAVA_8,
            access_flags,
            name: name.to_string(),
            signature: None,
            super_name: Some(JAVA_LANG_OBJECT.to_string()),
            interfaces: Vec::new(),
        })
        .expect("header should build");
    for field in fields {
        builder.visit_field(field).expect("field should build");
    }
    for method in methods {
        builder.visit_method(method).expect("method should build");
    }
    for inner_class in inner_classes {
        builder.visit_inner_class(inner_class).expect("inner class should build");
    }
    builder.visit_end().expect("end should build");
    builder.into_bytes().expect("class should serialize")
}

/// A `<clinit>` body that increments `owner.field` by one.
pub fn incrementing_initializer(owner: &str, field: &str) -> MethodBody {
    use classlift::bytecode::opcodes::{GETSTATIC, IADD, ICONST_1, PUTSTATIC, RETURN};
    MethodBody {
        max_stack: 2,
        max_locals: 0,
        instructions: vec![
            Instruction::Field {
                opcode: GETSTATIC,
                owner: owner.to_string(),
                name: field.to_string(),
                descriptor: "I".to_string(),
            },
            Instruction::Simple(ICONST_1),
            Instruction::Simple(IADD),
            Instruction::Field {
                opcode: PUTSTATIC,
                owner: owner.to_string(),
                name: field.to_string(),
                descriptor: "I".to_string(),
            },
            Instruction::Simple(RETURN),
        ],
        handlers: Vec::new(),
    }
}
