//! Generic classfile-specific definitions

/// Header of a Java class file (magic number)
pub const MAGIC: u32 = 0xCAFEBABE;

/// Name of a constructor
pub const CONSTRUCTOR_METHOD_NAME: &str = "<init>";

/// Name of a static initializer
pub const STATIC_INITIALIZER_METHOD_NAME: &str = "<clinit>";

/// Descriptor of a no-argument void method
pub const NO_ARG_VOID_DESCRIPTOR: &str = "()V";

/// Internal name of the default root object type
pub const JAVA_LANG_OBJECT: &str = "java/lang/Object";

/// Suffix appended to an interface name to form its companion class name
pub const COMPANION_SUFFIX: &str = "$FIELDS";

/// JVM version constants
pub mod major_versions {
    pub const JAVA_1_1: u16 = 45;
    pub const JAVA_1_4: u16 = 48;
    pub const JAVA_5_0: u16 = 49;
    pub const JAVA_6_0: u16 = 50;
    pub const JAVA_7: u16 = 51;
    pub const JAVA_8: u16 = 52;
    pub const JAVA_11: u16 = 55;
    pub const JAVA_17: u16 = 61;
}

/// Version tag written into synthesized companion classes. Kept at the
/// legacy value so companions deserialize identically to those produced by
/// earlier generations of this pipeline.
pub const COMPANION_CLASS_VERSION: u16 = major_versions::JAVA_6_0;
