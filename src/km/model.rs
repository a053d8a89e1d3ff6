//! The decoded Kotlin metadata tree.
//!
//! These are plain, owned data structures mirroring what the external codec produces when it
//! decodes a `@Metadata` payload, and what it accepts when encoding one. The rewriter builds a
//! fresh tree of these types instead of driving visitor callbacks, so the tree is the only
//! interchange format between the Info model and the codec.
//!
//! JVM-specific extension data (signatures, module name, local delegated properties, ...)
//! lives directly on the declaration it belongs to. Its presence is explicit: a function
//! whose `signature` is `None` was written without a JVM signature extension.

/// JVM signature of a method, as recorded in the JVM extension of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JvmMethodSignature {
    /// The method name.
    pub name: String,
    /// The method descriptor, `(params)ret`. Not guaranteed to be well formed.
    pub descriptor: String,
}

impl JvmMethodSignature {
    /// Creates a new method signature.
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        JvmMethodSignature {
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    /// The `name(params)ret` form used to match bytecode members.
    #[must_use]
    pub fn as_string(&self) -> String {
        format!("{}{}", self.name, self.descriptor)
    }
}

/// JVM signature of a field, as recorded in the JVM extension of a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JvmFieldSignature {
    /// The field name.
    pub name: String,
    /// The field descriptor. Not guaranteed to be well formed.
    pub descriptor: String,
}

impl JvmFieldSignature {
    /// Creates a new field signature.
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        JvmFieldSignature {
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    /// The `name:type` form used to match bytecode members.
    #[must_use]
    pub fn as_string(&self) -> String {
        format!("{}:{}", self.name, self.descriptor)
    }
}

/// Declaration-site or use-site variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KmVariance {
    /// No variance modifier.
    Invariant,
    /// `in`
    In,
    /// `out`
    Out,
}

/// What a type refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KmClassifier {
    /// A class, by Kotlin classifier name (`kotlin/collections/Map.Entry`).
    Class(String),
    /// A type parameter, by id.
    TypeParameter(u32),
    /// A type alias, by Kotlin classifier name.
    TypeAlias(String),
    /// A classifier shape the codec could not map onto the known kinds.
    Unrecognized(String),
}

/// A type argument. Both fields `None` is a star projection.
#[derive(Debug, Clone, PartialEq)]
pub struct KmTypeProjection {
    /// The use-site variance.
    pub variance: Option<KmVariance>,
    /// The projected type.
    pub ty: Option<KmType>,
}

impl KmTypeProjection {
    /// The star projection `*`.
    pub const STAR: KmTypeProjection = KmTypeProjection {
        variance: None,
        ty: None,
    };

    /// Creates a projection with the given variance.
    #[must_use]
    pub fn new(variance: KmVariance, ty: KmType) -> Self {
        KmTypeProjection {
            variance: Some(variance),
            ty: Some(ty),
        }
    }

    /// Returns `true` for `*`.
    #[must_use]
    pub fn is_star(&self) -> bool {
        self.variance.is_none() && self.ty.is_none()
    }
}

/// Upper bound of a flexible (platform) type.
#[derive(Debug, Clone, PartialEq)]
pub struct KmFlexibleTypeUpperBound {
    /// The upper bound type.
    pub ty: Box<KmType>,
    /// Identifier of the flexibility kind, if any.
    pub type_flexibility_id: Option<String>,
}

/// A Kotlin type.
#[derive(Debug, Clone, PartialEq)]
pub struct KmType {
    /// Type flags, see [`crate::km::flags::TypeFlags`].
    pub flags: u32,
    /// What the type refers to.
    pub classifier: KmClassifier,
    /// Type arguments.
    pub arguments: Vec<KmTypeProjection>,
    /// The type alias this type was written as, if any.
    pub abbreviated_type: Option<Box<KmType>>,
    /// The outer type of an inner class type.
    pub outer_type: Option<Box<KmType>>,
    /// The upper bound if this is a flexible type.
    pub flexible_type_upper_bound: Option<KmFlexibleTypeUpperBound>,
    /// JVM extension: raw Java type.
    pub is_raw: bool,
    /// JVM extension: type annotations.
    pub annotations: Vec<KmAnnotation>,
}

impl KmType {
    /// Creates a type with no arguments and no extras.
    #[must_use]
    pub fn new(flags: u32, classifier: KmClassifier) -> Self {
        KmType {
            flags,
            classifier,
            arguments: Vec::new(),
            abbreviated_type: None,
            outer_type: None,
            flexible_type_upper_bound: None,
            is_raw: false,
            annotations: Vec::new(),
        }
    }

    /// Creates a class type from its Kotlin classifier name.
    #[must_use]
    pub fn class(name: &str) -> Self {
        KmType::new(0, KmClassifier::Class(name.to_string()))
    }
}

/// A type parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct KmTypeParameter {
    /// Type parameter flags.
    pub flags: u32,
    /// The name.
    pub name: String,
    /// The id, unique within the enclosing declarations.
    pub id: u32,
    /// Declaration-site variance.
    pub variance: KmVariance,
    /// Upper bounds.
    pub upper_bounds: Vec<KmType>,
    /// JVM extension: annotations.
    pub annotations: Vec<KmAnnotation>,
}

/// A value parameter of a function, constructor or property setter.
#[derive(Debug, Clone, PartialEq)]
pub struct KmValueParameter {
    /// Value parameter flags, see [`crate::km::flags::ValueParameterFlags`].
    pub flags: u32,
    /// The name.
    pub name: String,
    /// The declared type.
    pub ty: KmType,
    /// The element type if this is a `vararg` parameter.
    pub vararg_element_type: Option<KmType>,
}

/// A Kotlin annotation literal.
#[derive(Debug, Clone, PartialEq)]
pub struct KmAnnotation {
    /// Kotlin classifier name of the annotation class.
    pub class_name: String,
    /// Named arguments in declaration order.
    pub arguments: Vec<(String, KmAnnotationArgument)>,
}

/// The value of an annotation argument.
#[derive(Debug, Clone, PartialEq)]
pub enum KmAnnotationArgument {
    /// `Byte`
    Byte(i8),
    /// `Char`
    Char(char),
    /// `Short`
    Short(i16),
    /// `Int`
    Int(i32),
    /// `Long`
    Long(i64),
    /// `Float`
    Float(f32),
    /// `Double`
    Double(f64),
    /// `Boolean`
    Boolean(bool),
    /// `UByte`
    UByte(u8),
    /// `UShort`
    UShort(u16),
    /// `UInt`
    UInt(u32),
    /// `ULong`
    ULong(u64),
    /// `String`
    String(String),
    /// `Foo::class`, possibly as an array class.
    KClass {
        /// Kotlin classifier name of the class.
        class_name: String,
        /// Number of array dimensions around the class.
        array_dimension_count: u32,
    },
    /// An enum entry.
    Enum {
        /// Kotlin classifier name of the enum class.
        enum_class_name: String,
        /// Name of the entry.
        enum_entry_name: String,
    },
    /// A nested annotation.
    Annotation(KmAnnotation),
    /// An array of values.
    Array(Vec<KmAnnotationArgument>),
}

/// Kind of a contract effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KmEffectType {
    /// `returns(value)`
    ReturnsConstant,
    /// `callsInPlace(lambda)`
    Calls,
    /// `returnsNotNull()`
    ReturnsNotNull,
}

/// Invocation kind of a `callsInPlace` effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KmEffectInvocationKind {
    /// `InvocationKind.AT_MOST_ONCE`
    AtMostOnce,
    /// `InvocationKind.EXACTLY_ONCE`
    ExactlyOnce,
    /// `InvocationKind.AT_LEAST_ONCE`
    AtLeastOnce,
}

/// A constant usable in effect expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KmConstantValue {
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
}

/// A boolean expression over parameters and constants inside a contract.
#[derive(Debug, Clone, PartialEq)]
pub struct KmEffectExpression {
    /// Expression flags (negation, null check).
    pub flags: u32,
    /// 1-based index of the referenced value parameter, 0 for the receiver.
    pub parameter_index: Option<u32>,
    /// The constant compared against.
    pub constant_value: Option<KmConstantValue>,
    /// Right-hand side of an `is` check.
    pub is_instance_type: Option<KmType>,
    /// Conjuncts.
    pub and_arguments: Vec<KmEffectExpression>,
    /// Disjuncts.
    pub or_arguments: Vec<KmEffectExpression>,
}

/// A single contract effect.
#[derive(Debug, Clone, PartialEq)]
pub struct KmEffect {
    /// What kind of effect this is.
    pub effect_type: KmEffectType,
    /// For `callsInPlace`, how often the lambda runs.
    pub invocation_kind: Option<KmEffectInvocationKind>,
    /// Arguments of the effect constructor.
    pub constructor_arguments: Vec<KmEffectExpression>,
    /// The condition under which the effect holds (`implies`).
    pub conclusion: Option<KmEffectExpression>,
}

/// A function contract.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KmContract {
    /// The effects in declaration order.
    pub effects: Vec<KmEffect>,
}

/// What a version requirement constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KmVersionKind {
    /// Kotlin language version.
    LanguageVersion,
    /// Kotlin compiler version.
    CompilerVersion,
    /// Kotlin API version.
    ApiVersion,
}

/// Severity of an unmet version requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KmVersionLevel {
    /// Report a warning.
    Warning,
    /// Report an error.
    Error,
    /// Hide the declaration.
    Hidden,
}

/// A `major.minor.patch` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KmVersion {
    /// Major component.
    pub major: u32,
    /// Minor component.
    pub minor: u32,
    /// Patch component.
    pub patch: u32,
}

/// A requirement on the consumer's Kotlin version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KmVersionRequirement {
    /// What is constrained.
    pub kind: KmVersionKind,
    /// What happens when unmet.
    pub level: KmVersionLevel,
    /// Optional diagnostic error code.
    pub error_code: Option<i32>,
    /// Optional diagnostic message.
    pub message: Option<String>,
    /// The minimal version.
    pub version: KmVersion,
}

/// A function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct KmFunction {
    /// Function flags, see [`crate::km::flags::FunctionFlags`].
    pub flags: u32,
    /// The declared name.
    pub name: String,
    /// Type parameters.
    pub type_parameters: Vec<KmTypeParameter>,
    /// Receiver type of an extension function.
    pub receiver_parameter_type: Option<KmType>,
    /// Context receiver types.
    pub context_receiver_types: Vec<KmType>,
    /// Value parameters.
    pub value_parameters: Vec<KmValueParameter>,
    /// Return type.
    pub return_type: KmType,
    /// Version requirements.
    pub version_requirements: Vec<KmVersionRequirement>,
    /// Contract, if declared.
    pub contract: Option<KmContract>,
    /// JVM extension: the method signature.
    pub signature: Option<JvmMethodSignature>,
    /// JVM extension: binary name of the class a lambda was compiled from.
    pub lambda_class_origin_name: Option<String>,
}

impl KmFunction {
    /// Creates a function with no parameters.
    pub fn new(flags: u32, name: impl Into<String>, return_type: KmType) -> Self {
        KmFunction {
            flags,
            name: name.into(),
            type_parameters: Vec::new(),
            receiver_parameter_type: None,
            context_receiver_types: Vec::new(),
            value_parameters: Vec::new(),
            return_type,
            version_requirements: Vec::new(),
            contract: None,
            signature: None,
            lambda_class_origin_name: None,
        }
    }
}

/// A constructor declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct KmConstructor {
    /// Constructor flags.
    pub flags: u32,
    /// Value parameters.
    pub value_parameters: Vec<KmValueParameter>,
    /// Version requirements.
    pub version_requirements: Vec<KmVersionRequirement>,
    /// JVM extension: the `<init>` signature.
    pub signature: Option<JvmMethodSignature>,
}

/// A property declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct KmProperty {
    /// Property flags, see [`crate::km::flags::PropertyFlags`].
    pub flags: u32,
    /// The declared name.
    pub name: String,
    /// Getter flags, see [`crate::km::flags::AccessorFlags`].
    pub getter_flags: u32,
    /// Setter flags, see [`crate::km::flags::AccessorFlags`].
    pub setter_flags: u32,
    /// Type parameters.
    pub type_parameters: Vec<KmTypeParameter>,
    /// Receiver type of an extension property.
    pub receiver_parameter_type: Option<KmType>,
    /// Context receiver types.
    pub context_receiver_types: Vec<KmType>,
    /// The setter parameter, if it is declared explicitly.
    pub setter_parameter: Option<KmValueParameter>,
    /// The property type.
    pub return_type: KmType,
    /// Version requirements.
    pub version_requirements: Vec<KmVersionRequirement>,
    /// JVM extension: JVM-specific property flags.
    pub jvm_flags: u32,
    /// JVM extension: backing field.
    pub field_signature: Option<JvmFieldSignature>,
    /// JVM extension: getter.
    pub getter_signature: Option<JvmMethodSignature>,
    /// JVM extension: setter.
    pub setter_signature: Option<JvmMethodSignature>,
    /// JVM extension: synthetic method holding the property annotations.
    pub synthetic_method_for_annotations: Option<JvmMethodSignature>,
    /// JVM extension: synthetic method returning the delegate.
    pub synthetic_method_for_delegate: Option<JvmMethodSignature>,
}

impl KmProperty {
    /// Creates a property without accessors or JVM signatures.
    pub fn new(flags: u32, name: impl Into<String>, return_type: KmType) -> Self {
        KmProperty {
            flags,
            name: name.into(),
            getter_flags: 0,
            setter_flags: 0,
            type_parameters: Vec::new(),
            receiver_parameter_type: None,
            context_receiver_types: Vec::new(),
            setter_parameter: None,
            return_type,
            version_requirements: Vec::new(),
            jvm_flags: 0,
            field_signature: None,
            getter_signature: None,
            setter_signature: None,
            synthetic_method_for_annotations: None,
            synthetic_method_for_delegate: None,
        }
    }
}

/// A type alias declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct KmTypeAlias {
    /// Type alias flags.
    pub flags: u32,
    /// The declared name.
    pub name: String,
    /// Type parameters.
    pub type_parameters: Vec<KmTypeParameter>,
    /// The right-hand side as written.
    pub underlying_type: KmType,
    /// The fully expanded right-hand side.
    pub expanded_type: KmType,
    /// Annotations on the alias.
    pub annotations: Vec<KmAnnotation>,
    /// Version requirements.
    pub version_requirements: Vec<KmVersionRequirement>,
}

/// Declarations of a file facade or multi-file class part.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KmPackage {
    /// Top-level functions.
    pub functions: Vec<KmFunction>,
    /// Top-level properties.
    pub properties: Vec<KmProperty>,
    /// Top-level type aliases.
    pub type_aliases: Vec<KmTypeAlias>,
    /// JVM extension: the module name.
    pub module_name: Option<String>,
    /// JVM extension: local delegated properties.
    pub local_delegated_properties: Vec<KmProperty>,
}

/// A Kotlin class declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KmClass {
    /// Class flags, see [`crate::km::flags::ClassFlags`].
    pub flags: u32,
    /// Kotlin classifier name; local and anonymous classes start with `.`.
    pub name: String,
    /// Type parameters.
    pub type_parameters: Vec<KmTypeParameter>,
    /// Super types.
    pub supertypes: Vec<KmType>,
    /// Member functions.
    pub functions: Vec<KmFunction>,
    /// Member properties.
    pub properties: Vec<KmProperty>,
    /// Type aliases (only in scripts).
    pub type_aliases: Vec<KmTypeAlias>,
    /// Constructors.
    pub constructors: Vec<KmConstructor>,
    /// Simple name of the companion object.
    pub companion_object: Option<String>,
    /// Simple names of nested classes.
    pub nested_classes: Vec<String>,
    /// Names of enum entries.
    pub enum_entries: Vec<String>,
    /// Kotlin classifier names of sealed subclasses.
    pub sealed_subclasses: Vec<String>,
    /// Property name of an inline (value) class.
    pub inline_class_underlying_property_name: Option<String>,
    /// Underlying type of an inline (value) class.
    pub inline_class_underlying_type: Option<KmType>,
    /// Context receiver types.
    pub context_receiver_types: Vec<KmType>,
    /// Version requirements.
    pub version_requirements: Vec<KmVersionRequirement>,
    /// JVM extension: the module name.
    pub module_name: Option<String>,
    /// JVM extension: binary name of the class this anonymous object was copied from.
    pub anonymous_object_origin_name: Option<String>,
    /// JVM extension: local delegated properties.
    pub local_delegated_properties: Vec<KmProperty>,
    /// JVM extension: JVM-specific class flags.
    pub jvm_flags: u32,
}

/// A lambda compiled to its own class.
#[derive(Debug, Clone, PartialEq)]
pub struct KmLambda {
    /// The lambda's signature as a function.
    pub function: KmFunction,
}

/// A decoded `@Metadata` payload, by class kind.
#[derive(Debug, Clone, PartialEq)]
pub enum KotlinClassMetadata {
    /// `k = 1`: a class, interface, object or annotation class.
    Class(KmClass),
    /// `k = 2`: the facade class of one `.kt` file.
    FileFacade(KmPackage),
    /// `k = 3`: a synthetic class; lambdas carry their function.
    SyntheticClass(Option<KmLambda>),
    /// `k = 4`: one file's part of a multi-file class.
    MultiFileClassPart {
        /// Binary name of the facade class.
        facade_class_name: String,
        /// The part's declarations.
        package: KmPackage,
    },
    /// `k = 5`: the facade of a multi-file class, listing its parts.
    MultiFileClassFacade(Vec<String>),
}

impl KotlinClassMetadata {
    /// The `k` discriminant of this payload.
    #[must_use]
    pub fn kind(&self) -> i32 {
        match self {
            KotlinClassMetadata::Class(_) => 1,
            KotlinClassMetadata::FileFacade(_) => 2,
            KotlinClassMetadata::SyntheticClass(_) => 3,
            KotlinClassMetadata::MultiFileClassPart { .. } => 4,
            KotlinClassMetadata::MultiFileClassFacade(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_strings() {
        let method = JvmMethodSignature::new("get", "(I)Ljava/lang/Object;");
        assert_eq!(method.as_string(), "get(I)Ljava/lang/Object;");
        let field = JvmFieldSignature::new("size", "I");
        assert_eq!(field.as_string(), "size:I");
    }

    #[test]
    fn test_star_projection() {
        assert!(KmTypeProjection::STAR.is_star());
        let projection = KmTypeProjection::new(KmVariance::Out, KmType::class("kotlin/Any"));
        assert!(!projection.is_star());
    }

    #[test]
    fn test_kinds() {
        assert_eq!(KotlinClassMetadata::Class(KmClass::default()).kind(), 1);
        assert_eq!(KotlinClassMetadata::SyntheticClass(None).kind(), 3);
        assert_eq!(KotlinClassMetadata::MultiFileClassFacade(vec![]).kind(), 5);
    }
}
