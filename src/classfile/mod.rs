//! Class-file model, serialization, and reading

pub mod attribute;
pub mod class;
pub mod constpool;
pub mod defs;
pub mod field;
pub mod flags;
pub mod method;
pub mod reader;
pub mod writer;

pub use class::ClassFile;
pub use constpool::{Constant, ConstantPool};
pub use field::FieldInfo;
pub use method::MethodInfo;
pub use reader::ClassReader;
pub use writer::{class_file_to_bytes, ClassfileWritable};
