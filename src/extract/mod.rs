//! The interface-field extraction pass and its collaborators

pub mod interface_fields;

use std::collections::HashMap;

pub use interface_fields::InterfaceFieldExtractor;

/// Sink for classes synthesized during a transformation run.
pub trait GeneratedClassConsumer {
    fn accept(&mut self, super_class_name: &str, class_name: &str, bytes: Vec<u8>);
}

/// One synthesized class, as handed to the consumer.
#[derive(Debug, Clone)]
pub struct GeneratedClass {
    pub super_class_name: String,
    pub class_name: String,
    pub bytes: Vec<u8>,
}

/// A consumer that collects every generated class in emission order.
#[derive(Debug, Default)]
pub struct GeneratedClassCollector {
    pub classes: Vec<GeneratedClass>,
}

impl GeneratedClassConsumer for GeneratedClassCollector {
    fn accept(&mut self, super_class_name: &str, class_name: &str, bytes: Vec<u8>) {
        self.classes.push(GeneratedClass {
            super_class_name: super_class_name.to_string(),
            class_name: class_name.to_string(),
            bytes,
        });
    }
}

/// The interface-to-companion name mapping shared across a run. The
/// extractor only ever inserts; it never reads an earlier entry back.
pub trait NameMapping {
    fn record(&mut self, interface_name: &str, companion_name: &str);
}

impl NameMapping for HashMap<String, String> {
    fn record(&mut self, interface_name: &str, companion_name: &str) {
        self.insert(interface_name.to_string(), companion_name.to_string());
    }
}
