//! Bytecode instruction layer
//!
//! Method bodies travel through the transformer as symbolic instruction
//! lists (`Instruction`, `MethodBody`) so owners and constants can be
//! rewritten without tracking constant pool indices. `decode` lifts raw
//! Code-attribute bytes into that form; `encode` lowers it back against a
//! destination pool.

pub mod decode;
pub mod encode;
pub mod insn;
pub mod opcodes;

pub use decode::{decode, DecodedCode};
pub use encode::encode;
pub use insn::{ExceptionHandler, Instruction, Label, LdcConstant, MethodBody};
