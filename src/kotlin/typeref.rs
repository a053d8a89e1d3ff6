//! References from metadata to host types.
//!
//! Metadata names types in three textual conventions (see [`crate::host::descriptor`]). A
//! [`TypeReference`] remembers which one it was read in and writes the renamed type back in
//! the same one. Strings that do not parse as a type are kept as an opaque original name and
//! are never renamed.

use crate::{
    host::{
        descriptor::{
            binary_name_to_descriptor, descriptor_to_binary_name, descriptor_to_kotlin_classifier,
            is_class_descriptor, is_statically_known_kotlin_type, is_valid_type_descriptor,
            kotlin_classifier_to_descriptor,
        },
        TypeRef,
    },
    kotlin::RewriteContext,
};

/// The textual convention a reference was read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameSyntax {
    /// `Lfoo/Bar$Baz;`, `I`, `[J`
    Descriptor,
    /// `foo/Bar$Baz`
    BinaryName,
    /// `foo/Bar.Baz`
    KotlinClassifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Target {
    Known(TypeRef),
    Original(String),
}

/// A type named by metadata: either bound to a host type or an opaque original name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeReference {
    target: Target,
    syntax: NameSyntax,
    /// The text as read.
    text: String,
}

impl TypeReference {
    /// Reads a field type descriptor.
    #[must_use]
    pub fn from_descriptor(descriptor: &str) -> Self {
        let target = if is_valid_type_descriptor(descriptor) {
            Target::Known(TypeRef::new(descriptor))
        } else {
            Target::Original(descriptor.to_string())
        };
        TypeReference {
            target,
            syntax: NameSyntax::Descriptor,
            text: descriptor.to_string(),
        }
    }

    /// Reads a binary class name.
    #[must_use]
    pub fn from_binary_name(name: &str) -> Self {
        Self::from_class_descriptor(binary_name_to_descriptor(name), name, NameSyntax::BinaryName)
    }

    /// Reads a Kotlin classifier name. Local class names must already have their leading `.`
    /// removed.
    ///
    /// A name that nests with `$` and never with `.` is in binary form and is written back
    /// in binary form.
    #[must_use]
    pub fn from_kotlin_classifier(name: &str) -> Self {
        if name.contains('$') && !name.contains('.') {
            return Self::from_binary_name(name);
        }
        Self::from_class_descriptor(
            kotlin_classifier_to_descriptor(name),
            name,
            NameSyntax::KotlinClassifier,
        )
    }

    fn from_class_descriptor(descriptor: String, original: &str, syntax: NameSyntax) -> Self {
        let target = if is_class_descriptor(&descriptor) {
            Target::Known(TypeRef::new(descriptor))
        } else {
            Target::Original(original.to_string())
        };
        TypeReference {
            target,
            syntax,
            text: original.to_string(),
        }
    }

    /// The bound host type, if the name parsed.
    #[must_use]
    pub fn known(&self) -> Option<&TypeRef> {
        match &self.target {
            Target::Known(ty) => Some(ty),
            Target::Original(_) => None,
        }
    }

    /// The opaque name, if the name did not parse.
    #[must_use]
    pub fn original_name(&self) -> Option<&str> {
        match &self.target {
            Target::Known(_) => None,
            Target::Original(name) => Some(name),
        }
    }

    /// The convention this reference is written in.
    #[must_use]
    pub fn syntax(&self) -> NameSyntax {
        self.syntax
    }

    fn render(&self, ty: &TypeRef) -> String {
        match self.syntax {
            NameSyntax::Descriptor => ty.descriptor().to_string(),
            NameSyntax::BinaryName => descriptor_to_binary_name(ty.descriptor()).to_string(),
            NameSyntax::KotlinClassifier => descriptor_to_kotlin_classifier(ty.descriptor()),
        }
    }

    /// The text this reference was read from, written back when nothing was renamed.
    #[must_use]
    pub fn original_text(&self) -> String {
        self.text.clone()
    }

    /// Renders the post-shrink name of the referenced type.
    ///
    /// Returns `None` when the type was pruned, unless it is a Kotlin type resolved by
    /// convention, which is written back unchanged. The flag is `true` iff the output
    /// differs from [`Self::original_text`].
    pub fn rewrite(&self, ctx: &RewriteContext) -> (Option<String>, bool) {
        let ty = match &self.target {
            Target::Original(name) => return (Some(name.clone()), false),
            Target::Known(ty) => ty,
        };
        match ctx.lookup_type(ty) {
            Some(renamed) if renamed == *ty => (Some(self.text.clone()), false),
            Some(renamed) => {
                let text = self.render(&renamed);
                let changed = text != self.text;
                (Some(text), changed)
            }
            None if is_statically_known_kotlin_type(ty.descriptor()) => {
                (Some(self.text.clone()), false)
            }
            None => (None, true),
        }
    }

    /// Like [`Self::rewrite`], substituting `default` for a pruned type.
    pub fn rewrite_or(&self, ctx: &RewriteContext, default: &str) -> (String, bool) {
        match self.rewrite(ctx) {
            (Some(text), changed) => (text, changed),
            (None, _) => {
                let changed = self.text != default;
                (default.to_string(), changed)
            }
        }
    }

    /// The post-shrink host type, `None` if unknown or pruned.
    pub fn rewritten_type(&self, ctx: &RewriteContext) -> Option<TypeRef> {
        self.known().and_then(|ty| ctx.lookup_type(ty))
    }

    /// Reports the bound host type.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        if let Target::Known(ty) = &self.target {
            f(ty);
        }
    }
}
