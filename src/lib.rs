//! classlift
//!
//! A class-file rewriting pass that relocates interface static field
//! storage into synthesized companion classes.
//!
//! ## Architecture
//!
//! - **classfile**: class-file model, constant pool, serializer, reader
//! - **bytecode**: symbolic instruction lists with decode/encode
//! - **visit**: the structural traversal contract and the class rebuilder
//! - **extract**: the interface-field extraction pass itself
//!
//! ## Transformation flow
//!
//! ```text
//! .class bytes → ClassReader → InterfaceFieldExtractor → ClassBuilder → rewritten bytes
//!                                      ↓
//!                      companion class → GeneratedClassConsumer
//!                      interface → companion name → NameMapping
//! ```
//!
//! The extractor withholds the interface's declared fields and `<clinit>`
//! from its downstream, so the rebuilt bytes are the field-stripped
//! interface; the captured members reappear in the emitted companion.

pub mod bytecode;
pub mod classfile;
pub mod config;
pub mod error;
pub mod extract;
pub mod visit;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::classfile::ClassReader;
use crate::extract::{
    GeneratedClassCollector, GeneratedClassConsumer, InterfaceFieldExtractor, NameMapping,
};
use crate::visit::ClassBuilder;

pub use config::Config;
pub use error::{Error, Result};

/// The rewritten form of one transformed class.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Internal name of the class, as read from its header.
    pub class_name: String,
    pub bytes: Vec<u8>,
}

/// Transform a single class in memory.
///
/// Runs the extraction pass over `bytes` and returns the rewritten class.
/// At most one companion class is handed to `consumer`, and at most one
/// entry is recorded into `names`, both only when the class is an
/// interface with declared fields.
pub fn transform_class(
    bytes: &[u8],
    consumer: &mut dyn GeneratedClassConsumer,
    names: &mut dyn NameMapping,
    config: &Config,
) -> Result<TransformOutput> {
    let builder = ClassBuilder::new();
    let mut extractor =
        InterfaceFieldExtractor::new(builder, consumer, names, &config.object_class);
    ClassReader::new(bytes).accept(&mut extractor)?;
    let builder = extractor.into_inner();
    let class_name = builder
        .class_name()
        .ok_or_else(|| Error::internal("traversal produced no class header"))?
        .to_string();
    let bytes = builder.into_bytes()?;
    Ok(TransformOutput { class_name, bytes })
}

/// Transform one `.class` file, writing the rewritten class and any
/// companion under `output_dir` by internal name.
pub fn transform_file(input_path: &str, output_dir: &str, config: &Config) -> Result<()> {
    log::debug!("transforming file {}", input_path);
    let bytes = fs::read(input_path)?;
    let mut consumer = GeneratedClassCollector::default();
    let mut names: HashMap<String, String> = HashMap::new();
    let output = transform_class(&bytes, &mut consumer, &mut names, config)?;
    write_class(output_dir, &output.class_name, &output.bytes)?;
    for generated in consumer.classes {
        write_class(output_dir, &generated.class_name, &generated.bytes)?;
    }
    Ok(())
}

/// Transform every `.class` file under `input_dir`, sharing one
/// name mapping and one generated-class sink across the whole tree.
/// Returns the number of class files written (rewritten plus companions).
pub fn transform_tree(input_dir: &str, output_dir: &str, config: &Config) -> Result<usize> {
    let mut consumer = GeneratedClassCollector::default();
    let mut names: HashMap<String, String> = HashMap::new();
    let mut written = 0usize;
    for entry in WalkDir::new(input_dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("class") {
            continue;
        }
        log::debug!("transforming {}", path.display());
        let bytes = fs::read(path)?;
        let output = transform_class(&bytes, &mut consumer, &mut names, config)?;
        write_class(output_dir, &output.class_name, &output.bytes)?;
        written += 1;
    }
    for generated in consumer.classes {
        write_class(output_dir, &generated.class_name, &generated.bytes)?;
        written += 1;
    }
    log::info!("transformed tree {}: {} class file(s) written", input_dir, written);
    Ok(written)
}

fn write_class(output_dir: &str, internal_name: &str, bytes: &[u8]) -> Result<()> {
    let path = Path::new(output_dir).join(format!("{}.class", internal_name));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, bytes)?;
    log::debug!("wrote {}", path.display());
    Ok(())
}
