//! Identity of host types, methods and fields.
//!
//! These are the symbols the host compiler hands to the metadata layer. They are compared and
//! hashed by value; a [`TypeRef`] is a descriptor string behind an `Arc<str>` so that cloning
//! one while building Info trees is cheap.

use std::{fmt, sync::Arc};

use crate::host::descriptor::{
    descriptor_to_binary_name, descriptor_to_kotlin_classifier, is_array_descriptor,
    is_class_descriptor,
};

/// A JVM type, identified by its descriptor.
///
/// # Examples
///
/// ```rust
/// use ktmeta::host::TypeRef;
///
/// let ty = TypeRef::new("Lfoo/Bar$Baz;");
/// assert!(ty.is_class_type());
/// assert_eq!(ty.binary_name(), "foo/Bar$Baz");
/// assert_eq!(ty.kotlin_classifier(), "foo/Bar.Baz");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(Arc<str>);

impl TypeRef {
    /// Creates a type from its descriptor.
    pub fn new(descriptor: impl Into<Arc<str>>) -> Self {
        TypeRef(descriptor.into())
    }

    /// Creates a class type from its binary name (`foo/Bar`).
    #[must_use]
    pub fn from_binary_name(name: &str) -> Self {
        TypeRef::new(format!("L{name};"))
    }

    /// The descriptor of this type.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.0
    }

    /// The binary name for class types, the descriptor otherwise.
    #[must_use]
    pub fn binary_name(&self) -> &str {
        descriptor_to_binary_name(&self.0)
    }

    /// The Kotlin classifier form of this type (`foo/Outer.Inner`).
    #[must_use]
    pub fn kotlin_classifier(&self) -> String {
        descriptor_to_kotlin_classifier(&self.0)
    }

    /// Returns `true` for `L...;` types.
    #[must_use]
    pub fn is_class_type(&self) -> bool {
        is_class_descriptor(&self.0)
    }

    /// Returns `true` for array types.
    #[must_use]
    pub fn is_array_type(&self) -> bool {
        is_array_descriptor(&self.0)
    }

    /// Returns `true` for `V`.
    #[must_use]
    pub fn is_void(&self) -> bool {
        &*self.0 == "V"
    }

    /// Splits an array type into its dimension count and element type.
    ///
    /// Non-array types return `(0, self)`.
    #[must_use]
    pub fn split_array(&self) -> (usize, TypeRef) {
        let dims = self.0.bytes().take_while(|b| *b == b'[').count();
        if dims == 0 {
            (0, self.clone())
        } else {
            (dims, TypeRef::new(&self.0[dims..]))
        }
    }

    /// Wraps `element` into `dims` array dimensions.
    #[must_use]
    pub fn array_of(dims: usize, element: &TypeRef) -> TypeRef {
        TypeRef::new(format!("{}{}", "[".repeat(dims), element.descriptor()))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(value: &str) -> Self {
        TypeRef::new(value)
    }
}

/// A method reference: holder, name and prototype.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    /// The class declaring the method.
    pub holder: TypeRef,
    /// The method name.
    pub name: String,
    /// The parameter types, excluding the receiver of instance methods.
    pub parameters: Vec<TypeRef>,
    /// The return type.
    pub return_type: TypeRef,
}

impl MethodRef {
    /// Creates a new method reference.
    pub fn new(
        holder: TypeRef,
        name: impl Into<String>,
        parameters: Vec<TypeRef>,
        return_type: TypeRef,
    ) -> Self {
        MethodRef {
            holder,
            name: name.into(),
            parameters,
            return_type,
        }
    }

    /// The method descriptor, `(params)ret`.
    #[must_use]
    pub fn descriptor(&self) -> String {
        let mut desc = String::from("(");
        for param in &self.parameters {
            desc.push_str(param.descriptor());
        }
        desc.push(')');
        desc.push_str(self.return_type.descriptor());
        desc
    }

    /// The JVM signature, `name(params)ret`, as written in Kotlin metadata.
    #[must_use]
    pub fn jvm_signature(&self) -> String {
        format!("{}{}", self.name, self.descriptor())
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.holder, self.jvm_signature())
    }
}

/// A field reference: holder, name and type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// The class declaring the field.
    pub holder: TypeRef,
    /// The field name.
    pub name: String,
    /// The field type.
    pub field_type: TypeRef,
}

impl FieldRef {
    /// Creates a new field reference.
    pub fn new(holder: TypeRef, name: impl Into<String>, field_type: TypeRef) -> Self {
        FieldRef {
            holder,
            name: name.into(),
            field_type,
        }
    }

    /// The JVM signature, `name:type`, as written in Kotlin metadata.
    #[must_use]
    pub fn jvm_signature(&self) -> String {
        format!("{}:{}", self.name, self.field_type.descriptor())
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.holder, self.jvm_signature())
    }
}
