//! Java bytecode instruction opcodes
//!
//! Values follow the Java Virtual Machine Specification, ordered by opcode.

use std::collections::HashMap;

use once_cell::sync::Lazy;

// 0x00 - 0x0F: constants
pub const NOP: u8 = 0x00;
pub const ACONST_NULL: u8 = 0x01;
pub const ICONST_M1: u8 = 0x02;
pub const ICONST_0: u8 = 0x03;
pub const ICONST_1: u8 = 0x04;
pub const ICONST_2: u8 = 0x05;
pub const ICONST_3: u8 = 0x06;
pub const ICONST_4: u8 = 0x07;
pub const ICONST_5: u8 = 0x08;
pub const LCONST_0: u8 = 0x09;
pub const LCONST_1: u8 = 0x0a;
pub const FCONST_0: u8 = 0x0b;
pub const FCONST_1: u8 = 0x0c;
pub const FCONST_2: u8 = 0x0d;
pub const DCONST_0: u8 = 0x0e;
pub const DCONST_1: u8 = 0x0f;

// 0x10 - 0x14: pushes and constant loads
pub const BIPUSH: u8 = 0x10;
pub const SIPUSH: u8 = 0x11;
pub const LDC: u8 = 0x12;
pub const LDC_W: u8 = 0x13;
pub const LDC2_W: u8 = 0x14;

// 0x15 - 0x2D: local variable loads
pub const ILOAD: u8 = 0x15;
pub const LLOAD: u8 = 0x16;
pub const FLOAD: u8 = 0x17;
pub const DLOAD: u8 = 0x18;
pub const ALOAD: u8 = 0x19;
pub const ILOAD_0: u8 = 0x1a;
pub const ALOAD_0: u8 = 0x2a;
pub const ALOAD_3: u8 = 0x2d;

// 0x2E - 0x35: array loads
pub const IALOAD: u8 = 0x2e;
pub const SALOAD: u8 = 0x35;

// 0x36 - 0x4E: local variable stores
pub const ISTORE: u8 = 0x36;
pub const LSTORE: u8 = 0x37;
pub const FSTORE: u8 = 0x38;
pub const DSTORE: u8 = 0x39;
pub const ASTORE: u8 = 0x3a;
pub const ISTORE_0: u8 = 0x3b;
pub const ASTORE_3: u8 = 0x4e;

// 0x4F - 0x56: array stores
pub const IASTORE: u8 = 0x4f;
pub const SASTORE: u8 = 0x56;

// 0x57 - 0x5F: stack manipulation
pub const POP: u8 = 0x57;
pub const POP2: u8 = 0x58;
pub const DUP: u8 = 0x59;
pub const DUP_X1: u8 = 0x5a;
pub const DUP_X2: u8 = 0x5b;
pub const DUP2: u8 = 0x5c;
pub const DUP2_X1: u8 = 0x5d;
pub const DUP2_X2: u8 = 0x5e;
pub const SWAP: u8 = 0x5f;

// 0x60 - 0x83: arithmetic and logic
pub const IADD: u8 = 0x60;
pub const LADD: u8 = 0x61;
pub const FADD: u8 = 0x62;
pub const DADD: u8 = 0x63;
pub const ISUB: u8 = 0x64;
pub const IMUL: u8 = 0x68;
pub const IDIV: u8 = 0x6c;
pub const IREM: u8 = 0x70;
pub const INEG: u8 = 0x74;
pub const ISHL: u8 = 0x78;
pub const ISHR: u8 = 0x7a;
pub const IUSHR: u8 = 0x7c;
pub const IAND: u8 = 0x7e;
pub const IOR: u8 = 0x80;
pub const IXOR: u8 = 0x82;
pub const LXOR: u8 = 0x83;

// 0x84: increment
pub const IINC: u8 = 0x84;

// 0x85 - 0x93: conversions
pub const I2L: u8 = 0x85;
pub const I2S: u8 = 0x93;

// 0x94 - 0x98: comparisons
pub const LCMP: u8 = 0x94;
pub const DCMPG: u8 = 0x98;

// 0x99 - 0xA8: branches
pub const IFEQ: u8 = 0x99;
pub const IFNE: u8 = 0x9a;
pub const IFLT: u8 = 0x9b;
pub const IFGE: u8 = 0x9c;
pub const IFGT: u8 = 0x9d;
pub const IFLE: u8 = 0x9e;
pub const IF_ICMPEQ: u8 = 0x9f;
pub const IF_ICMPNE: u8 = 0xa0;
pub const IF_ICMPLT: u8 = 0xa1;
pub const IF_ICMPGE: u8 = 0xa2;
pub const IF_ICMPGT: u8 = 0xa3;
pub const IF_ICMPLE: u8 = 0xa4;
pub const IF_ACMPEQ: u8 = 0xa5;
pub const IF_ACMPNE: u8 = 0xa6;
pub const GOTO: u8 = 0xa7;
pub const JSR: u8 = 0xa8;
pub const RET: u8 = 0xa9;

// 0xAA - 0xAB: switches
pub const TABLESWITCH: u8 = 0xaa;
pub const LOOKUPSWITCH: u8 = 0xab;

// 0xAC - 0xB1: returns
pub const IRETURN: u8 = 0xac;
pub const LRETURN: u8 = 0xad;
pub const FRETURN: u8 = 0xae;
pub const DRETURN: u8 = 0xaf;
pub const ARETURN: u8 = 0xb0;
pub const RETURN: u8 = 0xb1;

// 0xB2 - 0xBA: field and method access
pub const GETSTATIC: u8 = 0xb2;
pub const PUTSTATIC: u8 = 0xb3;
pub const GETFIELD: u8 = 0xb4;
pub const PUTFIELD: u8 = 0xb5;
pub const INVOKEVIRTUAL: u8 = 0xb6;
pub const INVOKESPECIAL: u8 = 0xb7;
pub const INVOKESTATIC: u8 = 0xb8;
pub const INVOKEINTERFACE: u8 = 0xb9;
pub const INVOKEDYNAMIC: u8 = 0xba;

// 0xBB - 0xC9: objects, arrays, checks, wide forms
pub const NEW: u8 = 0xbb;
pub const NEWARRAY: u8 = 0xbc;
pub const ANEWARRAY: u8 = 0xbd;
pub const ARRAYLENGTH: u8 = 0xbe;
pub const ATHROW: u8 = 0xbf;
pub const CHECKCAST: u8 = 0xc0;
pub const INSTANCEOF: u8 = 0xc1;
pub const MONITORENTER: u8 = 0xc2;
pub const MONITOREXIT: u8 = 0xc3;
pub const WIDE: u8 = 0xc4;
pub const MULTIANEWARRAY: u8 = 0xc5;
pub const IFNULL: u8 = 0xc6;
pub const IFNONNULL: u8 = 0xc7;
pub const GOTO_W: u8 = 0xc8;
pub const JSR_W: u8 = 0xc9;

/// Mnemonics for the opcodes that appear as single-byte symbolic
/// instructions or get printed by the structural dump. Families that always
/// decode into a richer instruction form (branches, pool accesses) are named
/// through their instruction variant instead.
static MNEMONICS: Lazy<HashMap<u8, &'static str>> = Lazy::new(|| {
    let mut table = HashMap::new();
    let named: &[(u8, &'static str)] = &[
        (NOP, "nop"),
        (ACONST_NULL, "aconst_null"),
        (ICONST_M1, "iconst_m1"),
        (ICONST_0, "iconst_0"),
        (ICONST_1, "iconst_1"),
        (ICONST_2, "iconst_2"),
        (ICONST_3, "iconst_3"),
        (ICONST_4, "iconst_4"),
        (ICONST_5, "iconst_5"),
        (LCONST_0, "lconst_0"),
        (LCONST_1, "lconst_1"),
        (FCONST_0, "fconst_0"),
        (FCONST_1, "fconst_1"),
        (FCONST_2, "fconst_2"),
        (DCONST_0, "dconst_0"),
        (DCONST_1, "dconst_1"),
        (BIPUSH, "bipush"),
        (SIPUSH, "sipush"),
        (ILOAD, "iload"),
        (LLOAD, "lload"),
        (FLOAD, "fload"),
        (DLOAD, "dload"),
        (ALOAD, "aload"),
        (ISTORE, "istore"),
        (LSTORE, "lstore"),
        (FSTORE, "fstore"),
        (DSTORE, "dstore"),
        (ASTORE, "astore"),
        (POP, "pop"),
        (POP2, "pop2"),
        (DUP, "dup"),
        (DUP_X1, "dup_x1"),
        (DUP_X2, "dup_x2"),
        (DUP2, "dup2"),
        (DUP2_X1, "dup2_x1"),
        (DUP2_X2, "dup2_x2"),
        (SWAP, "swap"),
        (IADD, "iadd"),
        (LADD, "ladd"),
        (FADD, "fadd"),
        (DADD, "dadd"),
        (ISUB, "isub"),
        (IMUL, "imul"),
        (IDIV, "idiv"),
        (IREM, "irem"),
        (INEG, "ineg"),
        (ISHL, "ishl"),
        (ISHR, "ishr"),
        (IUSHR, "iushr"),
        (IAND, "iand"),
        (IOR, "ior"),
        (IXOR, "ixor"),
        (IINC, "iinc"),
        (LCMP, "lcmp"),
        (IFEQ, "ifeq"),
        (IFNE, "ifne"),
        (IFLT, "iflt"),
        (IFGE, "ifge"),
        (IFGT, "ifgt"),
        (IFLE, "ifle"),
        (IF_ICMPEQ, "if_icmpeq"),
        (IF_ICMPNE, "if_icmpne"),
        (IF_ICMPLT, "if_icmplt"),
        (IF_ICMPGE, "if_icmpge"),
        (IF_ICMPGT, "if_icmpgt"),
        (IF_ICMPLE, "if_icmple"),
        (IF_ACMPEQ, "if_acmpeq"),
        (IF_ACMPNE, "if_acmpne"),
        (GOTO, "goto"),
        (JSR, "jsr"),
        (RET, "ret"),
        (TABLESWITCH, "tableswitch"),
        (LOOKUPSWITCH, "lookupswitch"),
        (IRETURN, "ireturn"),
        (LRETURN, "lreturn"),
        (FRETURN, "freturn"),
        (DRETURN, "dreturn"),
        (ARETURN, "areturn"),
        (RETURN, "return"),
        (GETSTATIC, "getstatic"),
        (PUTSTATIC, "putstatic"),
        (GETFIELD, "getfield"),
        (PUTFIELD, "putfield"),
        (INVOKEVIRTUAL, "invokevirtual"),
        (INVOKESPECIAL, "invokespecial"),
        (INVOKESTATIC, "invokestatic"),
        (INVOKEINTERFACE, "invokeinterface"),
        (NEW, "new"),
        (NEWARRAY, "newarray"),
        (ANEWARRAY, "anewarray"),
        (ARRAYLENGTH, "arraylength"),
        (ATHROW, "athrow"),
        (CHECKCAST, "checkcast"),
        (INSTANCEOF, "instanceof"),
        (MONITORENTER, "monitorenter"),
        (MONITOREXIT, "monitorexit"),
        (MULTIANEWARRAY, "multianewarray"),
        (IFNULL, "ifnull"),
        (IFNONNULL, "ifnonnull"),
        (GOTO_W, "goto_w"),
        (JSR_W, "jsr_w"),
    ];
    for &(opcode, name) in named {
        table.insert(opcode, name);
    }
    // Short-form load/store/const families keep a base name; the slot or
    // value is recoverable from the opcode itself.
    for opcode in ILOAD_0..=ALOAD_3 {
        table.insert(opcode, "load_n");
    }
    for opcode in ISTORE_0..=ASTORE_3 {
        table.insert(opcode, "store_n");
    }
    for opcode in IALOAD..=SALOAD {
        table.insert(opcode, "array_load");
    }
    for opcode in IASTORE..=SASTORE {
        table.insert(opcode, "array_store");
    }
    for opcode in I2L..=I2S {
        table.insert(opcode, "convert");
    }
    for opcode in LCMP..=DCMPG {
        table.insert(opcode, "compare");
    }
    for opcode in IADD..=LXOR {
        table.entry(opcode).or_insert("arith");
    }
    table
});

/// Human-readable name of an opcode, for diagnostics and the dump command.
pub fn mnemonic(opcode: u8) -> &'static str {
    MNEMONICS.get(&opcode).copied().unwrap_or("unknown")
}
