//! Program classes and their members as seen by the metadata layer.
//!
//! The host compiler owns the real bytecode graph; this module models the slice of it the
//! Kotlin metadata layer needs: a class's identity, its field and method references, its
//! class-file annotations, and one slot per class and per member where the read pass stores
//! the Kotlin Info that was bound to it.
//!
//! Each [`ProgramClass`] is processed by exactly one task at a time, so the Info slots are
//! plain fields and not synchronized.

use crate::{
    host::{descriptor::KOTLIN_METADATA_DESCRIPTOR, FieldRef, MethodRef, TypeRef},
    kotlin::{KotlinClassLevelInfo, KotlinFieldLevelInfo, KotlinMethodLevelInfo},
};

/// A single element value of a class-file annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationValue {
    /// An `int` constant.
    Int(i32),
    /// A `String` constant.
    String(String),
    /// An array of values.
    Array(Vec<AnnotationValue>),
}

/// A named element of a class-file annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationElement {
    /// The element name, e.g. `k` or `d1`.
    pub name: String,
    /// The element value.
    pub value: AnnotationValue,
}

impl AnnotationElement {
    /// Creates a new annotation element.
    pub fn new(name: impl Into<String>, value: AnnotationValue) -> Self {
        AnnotationElement {
            name: name.into(),
            value,
        }
    }
}

/// A class-file annotation: its type and its named elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// The annotation type.
    pub ty: TypeRef,
    /// The elements in declaration order.
    pub elements: Vec<AnnotationElement>,
}

impl Annotation {
    /// Creates a new annotation.
    #[must_use]
    pub fn new(ty: TypeRef, elements: Vec<AnnotationElement>) -> Self {
        Annotation { ty, elements }
    }

    /// Returns the value of the element named `name`.
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&AnnotationValue> {
        self.elements
            .iter()
            .find(|element| element.name == name)
            .map(|element| &element.value)
    }

    /// Returns `true` if this is the `kotlin.Metadata` annotation.
    #[must_use]
    pub fn is_kotlin_metadata(&self) -> bool {
        self.ty.descriptor() == KOTLIN_METADATA_DESCRIPTOR
    }
}

/// A method of a program class.
#[derive(Debug, Clone)]
pub struct ProgramMethod {
    /// The (current) method reference.
    pub reference: MethodRef,
    /// Whether the method is static.
    pub is_static: bool,
    /// The Kotlin declaration bound to this method by the read pass.
    pub kotlin_info: KotlinMethodLevelInfo,
}

impl ProgramMethod {
    /// Creates a method without Kotlin info.
    #[must_use]
    pub fn new(reference: MethodRef, is_static: bool) -> Self {
        ProgramMethod {
            reference,
            is_static,
            kotlin_info: KotlinMethodLevelInfo::None,
        }
    }

    /// The method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.reference.name
    }
}

/// A field of a program class.
#[derive(Debug, Clone)]
pub struct ProgramField {
    /// The (current) field reference.
    pub reference: FieldRef,
    /// The Kotlin declaration bound to this field by the read pass.
    pub kotlin_info: KotlinFieldLevelInfo,
}

impl ProgramField {
    /// Creates a field without Kotlin info.
    #[must_use]
    pub fn new(reference: FieldRef) -> Self {
        ProgramField {
            reference,
            kotlin_info: KotlinFieldLevelInfo::None,
        }
    }

    /// The field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.reference.name
    }
}

/// A class of the program being compiled.
#[derive(Debug, Clone)]
pub struct ProgramClass {
    /// The class type.
    pub ty: TypeRef,
    /// The declared fields.
    pub fields: Vec<ProgramField>,
    /// The declared methods.
    pub methods: Vec<ProgramMethod>,
    /// The class-file annotations.
    pub annotations: Vec<Annotation>,
    /// The Kotlin class-level info computed by the read pass.
    pub kotlin_info: KotlinClassLevelInfo,
}

impl ProgramClass {
    /// Creates an empty class of type `ty`.
    #[must_use]
    pub fn new(ty: TypeRef) -> Self {
        ProgramClass {
            ty,
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
            kotlin_info: KotlinClassLevelInfo::NoKotlinInfo,
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn with_field(mut self, field: FieldRef) -> Self {
        self.fields.push(ProgramField::new(field));
        self
    }

    /// Adds a method.
    #[must_use]
    pub fn with_method(mut self, method: MethodRef, is_static: bool) -> Self {
        self.methods.push(ProgramMethod::new(method, is_static));
        self
    }

    /// Adds an annotation.
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Returns the position of the `kotlin.Metadata` annotation, if present.
    #[must_use]
    pub fn metadata_annotation_index(&self) -> Option<usize> {
        self.annotations
            .iter()
            .position(Annotation::is_kotlin_metadata)
    }

    /// Returns the `kotlin.Metadata` annotation, if present.
    #[must_use]
    pub fn metadata_annotation(&self) -> Option<&Annotation> {
        self.metadata_annotation_index()
            .map(|index| &self.annotations[index])
    }
}
