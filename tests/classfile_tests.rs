mod common;

use classlift::bytecode::opcodes::{ATHROW, GOTO, ICONST_0, IRETURN, POP, RETURN};
use classlift::bytecode::{ExceptionHandler, Instruction, Label, MethodBody};
use classlift::classfile::defs::major_versions::JAVA_8;
use classlift::classfile::flags::{ACC_PUBLIC, ACC_STATIC};
use classlift::classfile::ClassReader;
use classlift::error::Error;
use classlift::visit::{ClassBuilder, ClassHeader, FieldConstant, MethodDeclaration};
use classlift::visit::ClassVisitor;

use common::{inner_class_entry, read_class, static_field};

#[test]
fn header_fields_and_inner_classes_round_trip() {
    let mut builder = ClassBuilder::new();
    builder
        .visit_header(ClassHeader {
            minor_version: 3,
            major_version: JAVA_8,
            access_flags: ACC_PUBLIC,
            name: "com/x/C".to_string(),
            signature: Some("<T:Ljava/lang/Object;>Ljava/lang/Object;".to_string()),
            super_name: Some("java/lang/Object".to_string()),
            interfaces: vec!["com/x/I".to_string(), "com/x/J".to_string()],
        })
        .unwrap();

    let mut counted = static_field("COUNT", "I");
    counted.constant_value = Some(FieldConstant::Integer(42));
    builder.visit_field(counted).unwrap();
    let mut named = static_field("NAME", "Ljava/lang/String;");
    named.constant_value = Some(FieldConstant::String("shape".to_string()));
    builder.visit_field(named).unwrap();
    let mut scale = static_field("SCALE", "D");
    scale.constant_value = Some(FieldConstant::Double(1.5));
    builder.visit_field(scale).unwrap();

    builder.visit_inner_class(inner_class_entry("com/x/C$In", "com/x/C", "In")).unwrap();
    builder.visit_end().unwrap();
    let bytes = builder.into_bytes().unwrap();

    let recorded = read_class(&bytes);
    let header = recorded.header();
    assert_eq!(header.minor_version, 3);
    assert_eq!(header.major_version, JAVA_8);
    assert_eq!(header.name, "com/x/C");
    assert_eq!(header.signature.as_deref(), Some("<T:Ljava/lang/Object;>Ljava/lang/Object;"));
    assert_eq!(header.interfaces, ["com/x/I", "com/x/J"]);

    assert_eq!(recorded.fields.len(), 3);
    assert_eq!(recorded.fields[0].constant_value, Some(FieldConstant::Integer(42)));
    assert_eq!(
        recorded.fields[1].constant_value,
        Some(FieldConstant::String("shape".to_string()))
    );
    assert_eq!(recorded.fields[2].constant_value, Some(FieldConstant::Double(1.5)));

    assert_eq!(recorded.inner_classes.len(), 1);
    assert_eq!(recorded.inner_classes[0].name, "com/x/C$In");
    assert_eq!(recorded.inner_classes[0].inner_name.as_deref(), Some("In"));
    assert!(recorded.ended);
}

#[test]
fn methods_with_exception_handlers_round_trip() {
    let try_start = Label(0);
    let try_end = Label(1);
    let handler = Label(2);
    let body = MethodBody {
        max_stack: 2,
        max_locals: 1,
        instructions: vec![
            Instruction::Label(try_start),
            Instruction::Simple(ICONST_0),
            Instruction::Simple(POP),
            Instruction::Label(try_end),
            Instruction::Simple(ICONST_0),
            Instruction::Simple(IRETURN),
            Instruction::Label(handler),
            Instruction::Simple(ATHROW),
        ],
        handlers: vec![ExceptionHandler {
            start: try_start,
            end: try_end,
            handler,
            catch_type: Some("java/lang/Exception".to_string()),
        }],
    };

    let mut builder = ClassBuilder::new();
    builder
        .visit_header(ClassHeader {
            minor_version: 0,
            major_version: JAVA_8,
            access_flags: ACC_PUBLIC,
            name: "com/x/C".to_string(),
            signature: None,
            super_name: Some("java/lang/Object".to_string()),
            interfaces: vec![],
        })
        .unwrap();
    builder
        .visit_method(MethodDeclaration {
            access_flags: ACC_PUBLIC | ACC_STATIC,
            name: "risky".to_string(),
            descriptor: "()I".to_string(),
            signature: None,
            exceptions: vec!["java/lang/Exception".to_string()],
            body: Some(body),
        })
        .unwrap();
    builder.visit_end().unwrap();
    let bytes = builder.into_bytes().unwrap();

    let recorded = read_class(&bytes);
    let method = recorded.method("risky").expect("method should survive");
    assert_eq!(method.exceptions, ["java/lang/Exception"]);
    let body = method.body.as_ref().expect("method should keep its body");
    assert_eq!(body.max_stack, 2);
    assert_eq!(body.handlers.len(), 1);
    assert_eq!(body.handlers[0].catch_type.as_deref(), Some("java/lang/Exception"));
    // The handler's boundaries resolve to labels present in the stream.
    let labels: Vec<Label> = body
        .instructions
        .iter()
        .filter_map(|insn| match insn {
            Instruction::Label(label) => Some(*label),
            _ => None,
        })
        .collect();
    assert!(labels.contains(&body.handlers[0].start));
    assert!(labels.contains(&body.handlers[0].end));
    assert!(labels.contains(&body.handlers[0].handler));
}

#[test]
fn abstract_methods_have_no_body() {
    let bytes = common::interface_class(
        "com/x/I",
        vec![],
        vec![common::abstract_method("size", "()I")],
        vec![],
    );
    let recorded = read_class(&bytes);
    assert!(recorded.method("size").unwrap().body.is_none());
}

#[test]
fn bad_magic_is_rejected() {
    let bytes = [0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0, 52];
    let mut recorded = common::RecordedClass::default();
    let result = ClassReader::new(&bytes).accept(&mut recorded);
    assert!(matches!(result, Err(Error::ClassFormat { .. })));
}

#[test]
fn truncated_class_is_rejected() {
    let bytes = common::plain_class("com/x/C", vec![], vec![]);
    let mut recorded = common::RecordedClass::default();
    let result = ClassReader::new(&bytes[..bytes.len() - 3]).accept(&mut recorded);
    assert!(matches!(result, Err(Error::ClassFormat { .. })));
}

#[test]
fn goto_in_read_back_method_points_at_the_original_target() {
    let target = Label(7);
    let body = MethodBody {
        max_stack: 1,
        max_locals: 0,
        instructions: vec![
            Instruction::Jump { opcode: GOTO, target },
            Instruction::Simple(RETURN),
            Instruction::Label(target),
            Instruction::Simple(RETURN),
        ],
        handlers: vec![],
    };
    let bytes = common::plain_class(
        "com/x/C",
        vec![],
        vec![MethodDeclaration {
            access_flags: ACC_PUBLIC | ACC_STATIC,
            name: "skip".to_string(),
            descriptor: "()V".to_string(),
            signature: None,
            exceptions: vec![],
            body: Some(body),
        }],
    );

    let recorded = read_class(&bytes);
    let body = recorded.method("skip").unwrap().body.as_ref().unwrap();
    // goto(3 bytes) + return: the label must sit between the two returns.
    let jump_target = body
        .instructions
        .iter()
        .find_map(|insn| match insn {
            Instruction::Jump { target, .. } => Some(*target),
            _ => None,
        })
        .expect("jump should survive");
    let label_position = body
        .instructions
        .iter()
        .position(|insn| *insn == Instruction::Label(jump_target))
        .expect("target label should be in the stream");
    assert_eq!(body.instructions[label_position + 1], Instruction::Simple(RETURN));
    assert_eq!(label_position, 2);
}
