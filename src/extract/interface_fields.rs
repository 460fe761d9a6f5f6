//! Relocation of interface static fields into a companion class
//!
//! Interfaces cannot carry mutable static storage in the target execution
//! model, so this pass captures an interface's declared fields and its
//! `<clinit>`, and emits them as a synthesized concrete class named
//! `<Interface>$FIELDS`. If the user already defined an inner class with
//! that name, the next free numbered suffix is used instead. Field
//! instructions inside the captured initializer that point at the interface
//! are retargeted at the companion class.

use crate::bytecode::{Instruction, MethodBody};
use crate::classfile::defs::{
    COMPANION_CLASS_VERSION, COMPANION_SUFFIX, CONSTRUCTOR_METHOD_NAME, NO_ARG_VOID_DESCRIPTOR,
};
use crate::classfile::flags::{ACC_INTERFACE, ACC_PRIVATE};
use crate::error::Result;
use crate::visit::{
    ClassBuilder, ClassHeader, ClassVisitor, FieldDeclaration, InnerClassDeclaration,
    MethodDeclaration,
};

use super::{GeneratedClassConsumer, NameMapping};

/// A single-class pass that captures an interface's declared fields and
/// static initializer, forwards everything else downstream, and emits a
/// companion class at the end of the traversal.
///
/// Instances are scoped to one class traversal and must not be reused.
pub struct InterfaceFieldExtractor<'a, V> {
    downstream: V,
    consumer: &'a mut dyn GeneratedClassConsumer,
    names: &'a mut dyn NameMapping,
    object_class: String,

    is_interface: bool,
    class_name: String,
    access_flags: u16,
    prefix: String,
    fields: Vec<FieldDeclaration>,
    clinit: Option<MethodDeclaration>,
    inner_class_names: Vec<String>,
    companion_name: Option<String>,
}

impl<'a, V: ClassVisitor> InterfaceFieldExtractor<'a, V> {
    /// Create an extractor forwarding to `downstream`.
    ///
    /// `object_class` is the internal name of the root object type, either
    /// pre-rename or post-rename; it becomes the companion's super class
    /// and the target of its constructor's super-call.
    pub fn new(
        downstream: V,
        consumer: &'a mut dyn GeneratedClassConsumer,
        names: &'a mut dyn NameMapping,
        object_class: &str,
    ) -> Self {
        Self {
            downstream,
            consumer,
            names,
            object_class: object_class.to_string(),
            is_interface: false,
            class_name: String::new(),
            access_flags: 0,
            prefix: String::new(),
            fields: Vec::new(),
            clinit: None,
            inner_class_names: Vec::new(),
            companion_name: None,
        }
    }

    /// Recover the downstream visitor after the traversal completes.
    pub fn into_inner(self) -> V {
        self.downstream
    }

    /// The companion name, allocated on first use and stable afterwards.
    fn companion_name(&mut self) -> &str {
        if self.companion_name.is_none() {
            self.companion_name = Some(self.next_available_companion_name());
        }
        self.companion_name.as_deref().unwrap()
    }

    // Finds the next free name for the companion class. Looping over the
    // collected names is acceptable since user code can only declare a
    // small number of them.
    fn next_available_companion_name(&self) -> String {
        if !self.inner_class_names.iter().any(|name| *name == self.prefix) {
            return self.prefix.clone();
        }
        let mut suffix = 0u32;
        loop {
            let candidate = format!("{}{}", self.prefix, suffix);
            if !self.inner_class_names.iter().any(|name| *name == candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Retarget every field instruction owned by the interface itself at
    /// the companion class. Other owners pass through untouched.
    fn rewrite_field_owners(&mut self, body: &mut MethodBody) {
        for insn in &mut body.instructions {
            if let Instruction::Field { owner, .. } = insn {
                if *owner == self.class_name {
                    *owner = self.companion_name().to_string();
                }
            }
        }
    }

    fn synthesize_companion(&mut self) -> Result<()> {
        let companion_name = self.companion_name().to_string();
        self.names.record(&self.class_name, &companion_name);
        log::debug!(
            "relocating {} field(s) from {} into {}",
            self.fields.len(),
            self.class_name,
            companion_name
        );

        let super_name = self.object_class.clone();
        let access_flags = self.access_flags & !ACC_INTERFACE;

        let mut builder = ClassBuilder::new();
        builder.visit_header(ClassHeader {
            minor_version: 0,
            major_version: COMPANION_CLASS_VERSION,
            access_flags,
            name: companion_name.clone(),
            signature: None,
            super_name: Some(super_name.clone()),
            interfaces: Vec::new(),
        })?;
        builder.visit_method(MethodDeclaration {
            access_flags: ACC_PRIVATE,
            name: CONSTRUCTOR_METHOD_NAME.to_string(),
            descriptor: NO_ARG_VOID_DESCRIPTOR.to_string(),
            signature: None,
            exceptions: Vec::new(),
            body: Some(constructor_body(&super_name)),
        })?;
        for field in self.fields.drain(..) {
            builder.visit_field(field)?;
        }
        if let Some(clinit) = self.clinit.take() {
            builder.visit_method(clinit)?;
        }
        builder.visit_end()?;

        let bytes = builder.into_bytes()?;
        self.consumer.accept(&super_name, &companion_name, bytes);
        Ok(())
    }
}

/// The body of the companion's private constructor: load `this`, invoke
/// the root object constructor, return.
fn constructor_body(object_class: &str) -> MethodBody {
    use crate::bytecode::opcodes::{ALOAD, INVOKESPECIAL, RETURN};
    MethodBody {
        max_stack: 1,
        max_locals: 1,
        instructions: vec![
            Instruction::Var { opcode: ALOAD, index: 0 },
            Instruction::Method {
                opcode: INVOKESPECIAL,
                owner: object_class.to_string(),
                name: CONSTRUCTOR_METHOD_NAME.to_string(),
                descriptor: NO_ARG_VOID_DESCRIPTOR.to_string(),
                interface: false,
            },
            Instruction::Simple(RETURN),
        ],
        handlers: Vec::new(),
    }
}

impl<V: ClassVisitor> ClassVisitor for InterfaceFieldExtractor<'_, V> {
    fn visit_header(&mut self, header: ClassHeader) -> Result<()> {
        if header.access_flags & ACC_INTERFACE != 0 {
            self.is_interface = true;
            self.class_name = header.name.clone();
            self.access_flags = header.access_flags;
            self.prefix = format!("{}{}", header.name, COMPANION_SUFFIX);
        }
        self.downstream.visit_header(header)
    }

    fn visit_field(&mut self, field: FieldDeclaration) -> Result<()> {
        if self.is_interface {
            // Captured for the generated class; the interface's own stream
            // no longer declares it.
            self.fields.push(field);
            Ok(())
        } else {
            self.downstream.visit_field(field)
        }
    }

    fn visit_method(&mut self, mut method: MethodDeclaration) -> Result<()> {
        if self.is_interface && method.is_static_initializer() {
            // Capture the initializer for the generated class, retargeting
            // its own-field accesses as they are taken in.
            if let Some(body) = method.body.as_mut() {
                self.rewrite_field_owners(body);
            }
            self.clinit = Some(method);
            Ok(())
        } else {
            self.downstream.visit_method(method)
        }
    }

    fn visit_inner_class(&mut self, inner_class: InnerClassDeclaration) -> Result<()> {
        if self.is_interface && inner_class.name.starts_with(&self.prefix) {
            self.inner_class_names.push(inner_class.name.clone());
        }
        self.downstream.visit_inner_class(inner_class)
    }

    fn visit_end(&mut self) -> Result<()> {
        // Generate the companion only if the interface declared fields. An
        // initializer with no fields is discarded.
        if self.is_interface && !self.fields.is_empty() {
            self.synthesize_companion()?;
        }
        self.downstream.visit_end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::GeneratedClassCollector;
    use std::collections::HashMap;

    struct NullVisitor;

    impl ClassVisitor for NullVisitor {
        fn visit_header(&mut self, _header: ClassHeader) -> Result<()> {
            Ok(())
        }
        fn visit_field(&mut self, _field: FieldDeclaration) -> Result<()> {
            Ok(())
        }
        fn visit_method(&mut self, _method: MethodDeclaration) -> Result<()> {
            Ok(())
        }
        fn visit_inner_class(&mut self, _inner_class: InnerClassDeclaration) -> Result<()> {
            Ok(())
        }
        fn visit_end(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn extractor_for<'a>(
        interface: &str,
        taken: &[&str],
        consumer: &'a mut GeneratedClassCollector,
        names: &'a mut HashMap<String, String>,
    ) -> InterfaceFieldExtractor<'a, NullVisitor> {
        let mut extractor =
            InterfaceFieldExtractor::new(NullVisitor, consumer, names, "java/lang/Object");
        extractor.is_interface = true;
        extractor.class_name = interface.to_string();
        extractor.prefix = format!("{}{}", interface, COMPANION_SUFFIX);
        extractor.inner_class_names = taken.iter().map(|s| s.to_string()).collect();
        extractor
    }

    #[test]
    fn prefix_is_used_when_free() {
        let mut consumer = GeneratedClassCollector::default();
        let mut names = HashMap::new();
        let mut extractor = extractor_for("com/x/I", &[], &mut consumer, &mut names);
        assert_eq!(extractor.companion_name(), "com/x/I$FIELDS");
    }

    #[test]
    fn numbered_suffixes_skip_taken_names() {
        let mut consumer = GeneratedClassCollector::default();
        let mut names = HashMap::new();
        let taken = ["com/x/I$FIELDS", "com/x/I$FIELDS0", "com/x/I$FIELDS1"];
        let mut extractor = extractor_for("com/x/I", &taken, &mut consumer, &mut names);
        assert_eq!(extractor.companion_name(), "com/x/I$FIELDS2");
    }

    #[test]
    fn allocation_is_memoized() {
        let mut consumer = GeneratedClassCollector::default();
        let mut names = HashMap::new();
        let mut extractor =
            extractor_for("com/x/I", &["com/x/I$FIELDS"], &mut consumer, &mut names);
        let first = extractor.companion_name().to_string();
        // New observations after allocation must not change the name.
        extractor.inner_class_names.push("com/x/I$FIELDS0".to_string());
        assert_eq!(extractor.companion_name(), first);
    }
}
