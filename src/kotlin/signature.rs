//! JVM signatures recorded in the JVM extension of declarations.
//!
//! A signature whose descriptor does not validate is kept as an opaque string and written
//! back untouched; only well-formed descriptors are decomposed into type references and
//! renamed.

use crate::{
    host::{
        descriptor::{is_valid_type_descriptor, split_method_descriptor, JAVA_LANG_OBJECT_DESCRIPTOR},
        FieldRef, MethodRef, TypeRef,
    },
    km::{JvmFieldSignature, JvmMethodSignature},
    kotlin::{RewriteContext, TypeReference},
};

/// The JVM signature of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JvmMethodSignatureInfo {
    /// A well-formed signature.
    Valid {
        /// The method name.
        name: String,
        /// The parameter types.
        parameters: Vec<TypeReference>,
        /// The return type.
        return_type: TypeReference,
    },
    /// A signature whose descriptor did not validate.
    InvalidDescriptor {
        /// The method name.
        name: String,
        /// The raw descriptor.
        descriptor: String,
    },
}

impl JvmMethodSignatureInfo {
    /// Builds the Info for a decoded method signature.
    #[must_use]
    pub fn create(signature: &JvmMethodSignature) -> Self {
        match split_method_descriptor(&signature.descriptor) {
            Some((parameters, return_type)) => JvmMethodSignatureInfo::Valid {
                name: signature.name.clone(),
                parameters: parameters
                    .into_iter()
                    .map(TypeReference::from_descriptor)
                    .collect(),
                return_type: TypeReference::from_descriptor(return_type),
            },
            None => JvmMethodSignatureInfo::InvalidDescriptor {
                name: signature.name.clone(),
                descriptor: signature.descriptor.clone(),
            },
        }
    }

    /// The method name as recorded.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            JvmMethodSignatureInfo::Valid { name, .. }
            | JvmMethodSignatureInfo::InvalidDescriptor { name, .. } => name,
        }
    }

    /// The descriptor as recorded.
    #[must_use]
    pub fn descriptor(&self) -> String {
        match self {
            JvmMethodSignatureInfo::Valid {
                parameters,
                return_type,
                ..
            } => {
                let mut desc = String::from("(");
                for param in parameters {
                    desc.push_str(&param.original_text());
                }
                desc.push(')');
                desc.push_str(&return_type.original_text());
                desc
            }
            JvmMethodSignatureInfo::InvalidDescriptor { descriptor, .. } => descriptor.clone(),
        }
    }

    /// The `name(params)ret` form as recorded, used to match bytecode members.
    #[must_use]
    pub fn as_string(&self) -> String {
        format!("{}{}", self.name(), self.descriptor())
    }

    /// Rewrites the signature.
    ///
    /// When `method` is the bytecode member this signature was bound to, its renamed name
    /// replaces the recorded one if the host renamed it. Pruned parameter and return types
    /// become `java.lang.Object`.
    pub fn rewrite(
        &self,
        method: Option<&MethodRef>,
        ctx: &RewriteContext,
    ) -> (JvmMethodSignature, bool) {
        let (name, parameters, return_type) = match self {
            JvmMethodSignatureInfo::InvalidDescriptor { name, descriptor } => {
                return (JvmMethodSignature::new(name.clone(), descriptor.clone()), false);
            }
            JvmMethodSignatureInfo::Valid {
                name,
                parameters,
                return_type,
            } => (name, parameters, return_type),
        };

        let mut changed = false;
        let final_name = match method.and_then(|m| ctx.lookup_method(m).map(|r| (m, r))) {
            Some((original, renamed)) if original.name != renamed.name => {
                changed = true;
                renamed.name
            }
            _ => name.clone(),
        };

        let mut desc = String::from("(");
        for param in parameters {
            let (text, c) = param.rewrite_or(ctx, JAVA_LANG_OBJECT_DESCRIPTOR);
            changed |= c;
            desc.push_str(&text);
        }
        desc.push(')');
        let (ret, c) = return_type.rewrite_or(ctx, JAVA_LANG_OBJECT_DESCRIPTOR);
        changed |= c;
        desc.push_str(&ret);

        (JvmMethodSignature::new(final_name, desc), changed)
    }

    /// Reports every referenced class.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        if let JvmMethodSignatureInfo::Valid {
            parameters,
            return_type,
            ..
        } = self
        {
            for param in parameters {
                param.trace(f);
            }
            return_type.trace(f);
        }
    }
}

/// The JVM signature of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JvmFieldSignatureInfo {
    /// A well-formed signature.
    Valid {
        /// The field name.
        name: String,
        /// The field type.
        ty: TypeReference,
    },
    /// A signature whose descriptor did not validate.
    InvalidDescriptor {
        /// The field name.
        name: String,
        /// The raw descriptor.
        descriptor: String,
    },
}

impl JvmFieldSignatureInfo {
    /// Builds the Info for a decoded field signature.
    #[must_use]
    pub fn create(signature: &JvmFieldSignature) -> Self {
        if is_valid_type_descriptor(&signature.descriptor) {
            JvmFieldSignatureInfo::Valid {
                name: signature.name.clone(),
                ty: TypeReference::from_descriptor(&signature.descriptor),
            }
        } else {
            JvmFieldSignatureInfo::InvalidDescriptor {
                name: signature.name.clone(),
                descriptor: signature.descriptor.clone(),
            }
        }
    }

    /// The field name as recorded.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            JvmFieldSignatureInfo::Valid { name, .. }
            | JvmFieldSignatureInfo::InvalidDescriptor { name, .. } => name,
        }
    }

    /// The `name:type` form as recorded, used to match bytecode members.
    #[must_use]
    pub fn as_string(&self) -> String {
        match self {
            JvmFieldSignatureInfo::Valid { name, ty } => format!("{name}:{}", ty.original_text()),
            JvmFieldSignatureInfo::InvalidDescriptor { name, descriptor } => {
                format!("{name}:{descriptor}")
            }
        }
    }

    /// Rewrites the signature, renaming it after `field` when that was renamed.
    pub fn rewrite(&self, field: Option<&FieldRef>, ctx: &RewriteContext) -> (JvmFieldSignature, bool) {
        let (name, ty) = match self {
            JvmFieldSignatureInfo::InvalidDescriptor { name, descriptor } => {
                return (JvmFieldSignature::new(name.clone(), descriptor.clone()), false);
            }
            JvmFieldSignatureInfo::Valid { name, ty } => (name, ty),
        };
        let mut changed = false;
        let final_name = match field.and_then(|f| ctx.lookup_field(f).map(|r| (f, r))) {
            Some((original, renamed)) if original.name != renamed.name => {
                changed = true;
                renamed.name
            }
            _ => name.clone(),
        };
        let (desc, c) = ty.rewrite_or(ctx, JAVA_LANG_OBJECT_DESCRIPTOR);
        (JvmFieldSignature::new(final_name, desc), changed | c)
    }

    /// Reports the field type.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        if let JvmFieldSignatureInfo::Valid { ty, .. } = self {
            ty.trace(f);
        }
    }
}
