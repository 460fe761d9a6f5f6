use crate::classfile::defs::JAVA_LANG_OBJECT;

/// Configuration for a transformation run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Internal (slash-separated) name of the root object type. Used as the
    /// super class of synthesized companion classes and as the target of
    /// their constructor's super-call. May differ from `java/lang/Object`
    /// when the surrounding pipeline has already renamed platform classes.
    pub object_class: String,
}

impl Default for Config {
    fn default() -> Self {
        Self { object_class: JAVA_LANG_OBJECT.to_string() }
    }
}

impl Config {
    /// Configuration with a non-default root object class name.
    pub fn with_object_class(object_class: impl Into<String>) -> Self {
        Self { object_class: object_class.into() }
    }
}
