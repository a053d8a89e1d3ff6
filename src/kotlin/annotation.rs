//! Kotlin annotation literals on types, type parameters and type aliases.

use crate::{
    host::TypeRef,
    km::{KmAnnotation, KmAnnotationArgument},
    kotlin::{RewriteContext, TypeReference},
};

/// An annotation literal.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationInfo {
    annotation_type: TypeReference,
    arguments: Vec<(String, AnnotationArgumentInfo)>,
}

/// The value of one annotation argument.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationArgumentInfo {
    /// `Foo::class`, possibly wrapped in arrays.
    Class {
        /// The class.
        ty: TypeReference,
        /// Number of array dimensions.
        array_dimension_count: u32,
    },
    /// `Enum.ENTRY`
    Enum {
        /// The enum class.
        enum_class: TypeReference,
        /// The entry name.
        entry: String,
    },
    /// A nested annotation.
    Annotation(AnnotationInfo),
    /// An array of values.
    Array(Vec<AnnotationArgumentInfo>),
    /// A primitive, unsigned or string constant.
    Primitive(KmAnnotationArgument),
}

impl AnnotationInfo {
    /// Builds the Info for a decoded annotation.
    #[must_use]
    pub fn create(annotation: &KmAnnotation) -> Self {
        AnnotationInfo {
            annotation_type: TypeReference::from_kotlin_classifier(&annotation.class_name),
            arguments: annotation
                .arguments
                .iter()
                .map(|(name, value)| (name.clone(), AnnotationArgumentInfo::create(value)))
                .collect(),
        }
    }

    /// Builds the Infos for a list of annotations.
    #[must_use]
    pub fn create_all(annotations: &[KmAnnotation]) -> Vec<Self> {
        annotations.iter().map(Self::create).collect()
    }

    /// Rewrites the annotation; `None` if its class was pruned.
    pub fn rewrite(&self, ctx: &RewriteContext) -> (Option<KmAnnotation>, bool) {
        let (class_name, mut changed) = match self.annotation_type.rewrite(ctx) {
            (Some(name), changed) => (name, changed),
            (None, _) => return (None, true),
        };
        let mut arguments = Vec::with_capacity(self.arguments.len());
        for (name, value) in &self.arguments {
            let (value, value_changed) = value.rewrite(ctx);
            changed |= value_changed;
            if let Some(value) = value {
                arguments.push((name.clone(), value));
            }
        }
        (
            Some(KmAnnotation {
                class_name,
                arguments,
            }),
            changed,
        )
    }

    /// Rewrites a list of annotations, dropping pruned ones.
    pub fn rewrite_all(annotations: &[Self], ctx: &RewriteContext) -> (Vec<KmAnnotation>, bool) {
        let mut changed = false;
        let mut out = Vec::with_capacity(annotations.len());
        for annotation in annotations {
            let (rewritten, annotation_changed) = annotation.rewrite(ctx);
            changed |= annotation_changed;
            out.extend(rewritten);
        }
        (out, changed)
    }

    /// Reports every referenced class.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        self.annotation_type.trace(f);
        for (_, value) in &self.arguments {
            value.trace(f);
        }
    }
}

impl AnnotationArgumentInfo {
    /// Builds the Info for a decoded argument value.
    #[must_use]
    pub fn create(argument: &KmAnnotationArgument) -> Self {
        match argument {
            KmAnnotationArgument::KClass {
                class_name,
                array_dimension_count,
            } => AnnotationArgumentInfo::Class {
                ty: TypeReference::from_kotlin_classifier(class_name),
                array_dimension_count: *array_dimension_count,
            },
            KmAnnotationArgument::Enum {
                enum_class_name,
                enum_entry_name,
            } => AnnotationArgumentInfo::Enum {
                enum_class: TypeReference::from_kotlin_classifier(enum_class_name),
                entry: enum_entry_name.clone(),
            },
            KmAnnotationArgument::Annotation(annotation) => {
                AnnotationArgumentInfo::Annotation(AnnotationInfo::create(annotation))
            }
            KmAnnotationArgument::Array(values) => {
                AnnotationArgumentInfo::Array(values.iter().map(Self::create).collect())
            }
            primitive => AnnotationArgumentInfo::Primitive(primitive.clone()),
        }
    }

    /// Rewrites the value; `None` if it names a pruned class.
    pub fn rewrite(&self, ctx: &RewriteContext) -> (Option<KmAnnotationArgument>, bool) {
        match self {
            AnnotationArgumentInfo::Class {
                ty,
                array_dimension_count,
            } => match ty.rewrite(ctx) {
                (Some(class_name), changed) => (
                    Some(KmAnnotationArgument::KClass {
                        class_name,
                        array_dimension_count: *array_dimension_count,
                    }),
                    changed,
                ),
                (None, _) => (None, true),
            },
            AnnotationArgumentInfo::Enum { enum_class, entry } => match enum_class.rewrite(ctx) {
                (Some(enum_class_name), changed) => (
                    Some(KmAnnotationArgument::Enum {
                        enum_class_name,
                        enum_entry_name: entry.clone(),
                    }),
                    changed,
                ),
                (None, _) => (None, true),
            },
            AnnotationArgumentInfo::Annotation(annotation) => {
                let (rewritten, changed) = annotation.rewrite(ctx);
                (rewritten.map(KmAnnotationArgument::Annotation), changed)
            }
            AnnotationArgumentInfo::Array(values) => {
                let mut changed = false;
                let mut out = Vec::with_capacity(values.len());
                for value in values {
                    let (value, value_changed) = value.rewrite(ctx);
                    changed |= value_changed;
                    out.extend(value);
                }
                (Some(KmAnnotationArgument::Array(out)), changed)
            }
            AnnotationArgumentInfo::Primitive(value) => (Some(value.clone()), false),
        }
    }

    /// Reports every referenced class.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        match self {
            AnnotationArgumentInfo::Class { ty, .. } => ty.trace(f),
            AnnotationArgumentInfo::Enum { enum_class, .. } => enum_class.trace(f),
            AnnotationArgumentInfo::Annotation(annotation) => annotation.trace(f),
            AnnotationArgumentInfo::Array(values) => {
                for value in values {
                    value.trace(f);
                }
            }
            AnnotationArgumentInfo::Primitive(_) => {}
        }
    }
}
