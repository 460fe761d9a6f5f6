use classlift::bytecode::opcodes::{
    GOTO, GOTO_W, ICONST_0, IFEQ, ILOAD, IRETURN, ISTORE, LDC_W, NOP, RETURN, WIDE,
};
use classlift::bytecode::{decode, encode, Instruction, Label, LdcConstant, MethodBody};
use classlift::classfile::ConstantPool;
use classlift::error::Error;

fn body(instructions: Vec<Instruction>) -> MethodBody {
    MethodBody { max_stack: 4, max_locals: 4, instructions, handlers: Vec::new() }
}

/// Encode, decode, re-encode; the second encoding must reproduce the first
/// byte-for-byte.
fn assert_fixed_point(instructions: Vec<Instruction>) -> Vec<u8> {
    let mut pool = ConstantPool::new();
    let first = encode(&body(instructions), &mut pool).expect("first encode should succeed");

    let decoded = decode(&first.code, &pool, &[]).expect("decode should succeed");
    let mut fresh_pool = ConstantPool::new();
    let second = encode(&body(decoded.instructions), &mut fresh_pool)
        .expect("second encode should succeed");
    assert_eq!(first.code, second.code);
    first.code
}

#[test]
fn forward_and_backward_branches_round_trip() {
    let loop_head = Label(0);
    let exit = Label(1);
    assert_fixed_point(vec![
        Instruction::Simple(ICONST_0),
        Instruction::Var { opcode: ISTORE, index: 1 },
        Instruction::Label(loop_head),
        Instruction::Var { opcode: ILOAD, index: 1 },
        Instruction::Jump { opcode: IFEQ, target: exit },
        Instruction::Iinc { index: 1, delta: -1 },
        Instruction::Jump { opcode: GOTO, target: loop_head },
        Instruction::Label(exit),
        Instruction::Simple(RETURN),
    ]);
}

#[test]
fn switches_round_trip() {
    let default = Label(0);
    let case_a = Label(1);
    let case_b = Label(2);
    assert_fixed_point(vec![
        Instruction::Var { opcode: ILOAD, index: 0 },
        Instruction::TableSwitch {
            default,
            low: 3,
            high: 5,
            targets: vec![case_a, case_b, case_a],
        },
        Instruction::Label(case_a),
        Instruction::Simple(ICONST_0),
        Instruction::Simple(IRETURN),
        Instruction::Label(case_b),
        Instruction::Var { opcode: ILOAD, index: 0 },
        Instruction::LookupSwitch { default, pairs: vec![(-10, case_a), (700, case_b)] },
        Instruction::Label(default),
        Instruction::Simple(RETURN),
    ]);
}

#[test]
fn wide_local_forms_round_trip() {
    let code = assert_fixed_point(vec![
        Instruction::Var { opcode: ILOAD, index: 300 },
        Instruction::Iinc { index: 70, delta: 2000 },
        Instruction::Var { opcode: ISTORE, index: 300 },
        Instruction::Simple(RETURN),
    ]);
    assert_eq!(code[0], WIDE);
}

#[test]
fn pool_constants_round_trip() {
    assert_fixed_point(vec![
        Instruction::Ldc(LdcConstant::Integer(123456)),
        Instruction::Ldc(LdcConstant::Long(1 << 40)),
        Instruction::Ldc(LdcConstant::Double(2.5)),
        Instruction::Ldc(LdcConstant::String("hello".to_string())),
        Instruction::Ldc(LdcConstant::Class("com/x/I".to_string())),
        Instruction::Field {
            opcode: classlift::bytecode::opcodes::GETSTATIC,
            owner: "com/x/I".to_string(),
            name: "a".to_string(),
            descriptor: "I".to_string(),
        },
        Instruction::Method {
            opcode: classlift::bytecode::opcodes::INVOKEINTERFACE,
            owner: "com/x/Callee".to_string(),
            name: "run".to_string(),
            descriptor: "(JI)V".to_string(),
            interface: true,
        },
        Instruction::Simple(RETURN),
    ]);
}

#[test]
fn ldc_widens_when_the_pool_grows_past_a_byte() {
    let mut pool = ConstantPool::new();
    for i in 0..300 {
        pool.add_integer(i);
    }
    let attribute = encode(
        &body(vec![
            Instruction::Ldc(LdcConstant::String("late".to_string())),
            Instruction::Simple(RETURN),
        ]),
        &mut pool,
    )
    .expect("encode should succeed");
    assert_eq!(attribute.code[0], LDC_W);
}

#[test]
fn goto_w_survives_decoding() {
    let target = Label(9);
    let mut pool = ConstantPool::new();
    let attribute = encode(
        &body(vec![
            Instruction::Jump { opcode: GOTO_W, target },
            Instruction::Label(target),
            Instruction::Simple(RETURN),
        ]),
        &mut pool,
    )
    .expect("encode should succeed");
    assert_eq!(attribute.code[0], GOTO_W);

    let decoded = decode(&attribute.code, &pool, &[]).expect("decode should succeed");
    assert!(decoded
        .instructions
        .iter()
        .any(|insn| matches!(insn, Instruction::Jump { opcode: GOTO_W, .. })));
}

#[test]
fn overlong_branch_is_rejected() {
    let target = Label(0);
    let mut instructions = vec![Instruction::Jump { opcode: GOTO, target }];
    instructions.extend(std::iter::repeat(Instruction::Simple(NOP)).take(40_000));
    instructions.push(Instruction::Label(target));
    instructions.push(Instruction::Simple(RETURN));

    let mut pool = ConstantPool::new();
    match encode(&body(instructions), &mut pool) {
        Err(Error::Bytecode { .. }) => {}
        other => panic!("expected a bytecode error, got {:?}", other.map(|a| a.code.len())),
    }
}

#[test]
fn jump_to_an_undefined_label_is_rejected() {
    let mut pool = ConstantPool::new();
    let result = encode(
        &body(vec![Instruction::Jump { opcode: GOTO, target: Label(42) }]),
        &mut pool,
    );
    assert!(matches!(result, Err(Error::Bytecode { .. })));
}

#[test]
fn truncated_code_is_rejected() {
    let pool = ConstantPool::new();
    // bipush with its operand byte missing
    assert!(matches!(
        decode(&[0x10], &pool, &[]),
        Err(Error::Bytecode { .. })
    ));
}

#[test]
fn branch_into_the_middle_of_an_instruction_is_rejected() {
    let pool = ConstantPool::new();
    // goto +1 lands inside its own operand bytes
    let code = [GOTO, 0x00, 0x01, NOP, RETURN];
    assert!(matches!(
        decode(&code, &pool, &[]),
        Err(Error::Bytecode { .. })
    ));
}
