//! Kotlin properties and the bytecode members that implement them.
//!
//! One property may be backed by up to five members: a field, a getter, a setter, a
//! synthetic method holding its annotations and a synthetic method returning its delegate.
//! Each is bound independently at read time; at write time the surviving ones are handed
//! back together as [`PropertyParts`] and combined into a single declaration.

use crate::{
    diagnostics::DiagnosticCategory,
    host::{descriptor::JAVA_LANG_OBJECT_DESCRIPTOR, FieldRef, MethodRef, TypeRef},
    km::{
        flags::{AccessorFlags, PropertyFlags},
        KmProperty,
    },
    kotlin::{
        JvmFieldSignatureInfo, JvmMethodSignatureInfo, ReadContext, RewriteContext, TypeInfo,
        TypeParameterInfo, ValueParameterInfo, VersionRequirementInfo,
    },
};

/// The bytecode members of one property that survived shrinking.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyParts<'a> {
    /// The backing field.
    pub field: Option<&'a FieldRef>,
    /// The getter.
    pub getter: Option<&'a MethodRef>,
    /// The setter.
    pub setter: Option<&'a MethodRef>,
    /// The synthetic `$annotations` method.
    pub synthetic_method_for_annotations: Option<&'a MethodRef>,
    /// The synthetic `$delegate` method.
    pub synthetic_method_for_delegate: Option<&'a MethodRef>,
}

/// A Kotlin property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    flags: u32,
    getter_flags: u32,
    setter_flags: u32,
    name: String,
    return_type: TypeInfo,
    receiver_parameter_type: Option<TypeInfo>,
    setter_parameter: Option<ValueParameterInfo>,
    type_parameters: Vec<TypeParameterInfo>,
    context_receiver_types: Vec<TypeInfo>,
    version_requirements: VersionRequirementInfo,
    jvm_flags: u32,
    field_signature: Option<JvmFieldSignatureInfo>,
    getter_signature: Option<JvmMethodSignatureInfo>,
    setter_signature: Option<JvmMethodSignatureInfo>,
    synthetic_method_for_annotations: Option<JvmMethodSignatureInfo>,
    synthetic_method_for_delegate: Option<JvmMethodSignatureInfo>,
}

impl PropertyInfo {
    /// Builds the Info for a decoded property.
    pub fn create(property: &KmProperty, ctx: &ReadContext) -> Self {
        PropertyInfo {
            flags: property.flags,
            getter_flags: property.getter_flags,
            setter_flags: property.setter_flags,
            name: property.name.clone(),
            return_type: TypeInfo::create(&property.return_type, ctx),
            receiver_parameter_type: property
                .receiver_parameter_type
                .as_ref()
                .map(|t| TypeInfo::create(t, ctx)),
            setter_parameter: property
                .setter_parameter
                .as_ref()
                .map(|p| ValueParameterInfo::create(p, ctx)),
            type_parameters: TypeParameterInfo::create_all(&property.type_parameters, ctx),
            context_receiver_types: TypeInfo::create_all(&property.context_receiver_types, ctx),
            version_requirements: VersionRequirementInfo::create(&property.version_requirements),
            jvm_flags: property.jvm_flags,
            field_signature: property
                .field_signature
                .as_ref()
                .map(JvmFieldSignatureInfo::create),
            getter_signature: property
                .getter_signature
                .as_ref()
                .map(JvmMethodSignatureInfo::create),
            setter_signature: property
                .setter_signature
                .as_ref()
                .map(JvmMethodSignatureInfo::create),
            synthetic_method_for_annotations: property
                .synthetic_method_for_annotations
                .as_ref()
                .map(JvmMethodSignatureInfo::create),
            synthetic_method_for_delegate: property
                .synthetic_method_for_delegate
                .as_ref()
                .map(JvmMethodSignatureInfo::create),
        }
    }

    /// Builds the Infos for a list of properties that are never bound.
    pub fn create_all(properties: &[KmProperty], ctx: &ReadContext) -> Vec<Self> {
        properties.iter().map(|p| Self::create(p, ctx)).collect()
    }

    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The backing field signature.
    #[must_use]
    pub fn field_signature(&self) -> Option<&JvmFieldSignatureInfo> {
        self.field_signature.as_ref()
    }

    /// The getter signature.
    #[must_use]
    pub fn getter_signature(&self) -> Option<&JvmMethodSignatureInfo> {
        self.getter_signature.as_ref()
    }

    /// The setter signature.
    #[must_use]
    pub fn setter_signature(&self) -> Option<&JvmMethodSignatureInfo> {
        self.setter_signature.as_ref()
    }

    /// The signature of the synthetic annotations holder.
    #[must_use]
    pub fn synthetic_method_for_annotations(&self) -> Option<&JvmMethodSignatureInfo> {
        self.synthetic_method_for_annotations.as_ref()
    }

    /// The signature of the synthetic delegate accessor.
    #[must_use]
    pub fn synthetic_method_for_delegate(&self) -> Option<&JvmMethodSignatureInfo> {
        self.synthetic_method_for_delegate.as_ref()
    }

    /// Returns `true` for `val x by delegate`.
    #[must_use]
    pub fn is_delegated(&self) -> bool {
        PropertyFlags::of(self.flags).contains(PropertyFlags::IS_DELEGATED)
    }

    /// Returns `true` if the getter is `inline`.
    #[must_use]
    pub fn is_getter_inline(&self) -> bool {
        AccessorFlags::of(self.getter_flags).contains(AccessorFlags::IS_INLINE)
    }

    /// Returns `true` if the setter is `inline`.
    #[must_use]
    pub fn is_setter_inline(&self) -> bool {
        AccessorFlags::of(self.setter_flags).contains(AccessorFlags::IS_INLINE)
    }

    /// Checks that the surviving parts still agree on the property's JVM type.
    ///
    /// The field of a delegated property holds the delegate and is not compared.
    fn has_consistent_type(&self, parts: &PropertyParts, ctx: &RewriteContext) -> bool {
        let object = TypeRef::new(JAVA_LANG_OBJECT_DESCRIPTOR);
        let field_type = parts
            .field
            .filter(|_| !self.is_delegated())
            .map(|field| &field.field_type);
        let getter_type = parts.getter.map(|getter| &getter.return_type);
        let setter_type = parts.setter.and_then(|setter| setter.parameters.last());

        let mut seen: Option<TypeRef> = None;
        for ty in [field_type, getter_type, setter_type].into_iter().flatten() {
            let renamed = ctx.lookup_type(ty).unwrap_or_else(|| object.clone());
            match &seen {
                Some(previous) if *previous != renamed => return false,
                Some(_) => {}
                None => seen = Some(renamed),
            }
        }
        true
    }

    /// Rewrites the property from its surviving parts.
    ///
    /// Returns `None` (and `changed`) when the parts disagree on the property type after
    /// renaming; the property is then left out of the metadata.
    pub fn rewrite(&self, parts: &PropertyParts, ctx: &RewriteContext) -> (Option<KmProperty>, bool) {
        if !self.has_consistent_type(parts, ctx) {
            let message = format!(
                "Dropping property '{}': its members disagree on the renamed type",
                self.name
            );
            log::debug!("{message}");
            ctx.diagnostics().info(DiagnosticCategory::Rewrite, message);
            return (None, true);
        }

        let mut changed = false;
        let mut name = self.name.clone();
        if let Some(field) = parts.field.filter(|field| field.name == self.name) {
            if let Some(renamed) = ctx.lookup_field(field) {
                if renamed.name != field.name {
                    changed = true;
                    name = renamed.name;
                }
            }
        }

        let (return_type, c) = self.return_type.rewrite(ctx);
        changed |= c;
        let mut property = KmProperty::new(self.flags, name, return_type);
        property.getter_flags = self.getter_flags;
        property.setter_flags = self.setter_flags;
        property.jvm_flags = self.jvm_flags;

        let (receiver, c) = TypeInfo::rewrite_opt(self.receiver_parameter_type.as_ref(), ctx);
        changed |= c;
        property.receiver_parameter_type = receiver;

        if let Some(setter_parameter) = &self.setter_parameter {
            let (param, c) = setter_parameter.rewrite(ctx);
            changed |= c;
            property.setter_parameter = Some(param);
        }

        let (type_parameters, c) = TypeParameterInfo::rewrite_all(&self.type_parameters, ctx);
        changed |= c;
        property.type_parameters = type_parameters;

        let (context_receivers, c) = TypeInfo::rewrite_all(&self.context_receiver_types, ctx);
        changed |= c;
        property.context_receiver_types = context_receivers;

        property.version_requirements = self.version_requirements.rewrite();

        if let Some(signature) = &self.field_signature {
            let (signature, c) = signature.rewrite(parts.field, ctx);
            changed |= c;
            property.field_signature = Some(signature);
        }
        let mut method_signature =
            |signature: &Option<JvmMethodSignatureInfo>, method: Option<&MethodRef>| {
                signature.as_ref().map(|signature| {
                    let (signature, c) = signature.rewrite(method, ctx);
                    changed |= c;
                    signature
                })
            };
        property.getter_signature = method_signature(&self.getter_signature, parts.getter);
        property.setter_signature = method_signature(&self.setter_signature, parts.setter);
        property.synthetic_method_for_annotations = method_signature(
            &self.synthetic_method_for_annotations,
            parts.synthetic_method_for_annotations,
        );
        property.synthetic_method_for_delegate = method_signature(
            &self.synthetic_method_for_delegate,
            parts.synthetic_method_for_delegate,
        );

        (Some(property), changed)
    }

    /// Reports every referenced class.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        self.return_type.trace(f);
        if let Some(receiver) = &self.receiver_parameter_type {
            receiver.trace(f);
        }
        if let Some(param) = &self.setter_parameter {
            param.trace(f);
        }
        for param in &self.type_parameters {
            param.trace(f);
        }
        for ty in &self.context_receiver_types {
            ty.trace(f);
        }
        if let Some(signature) = &self.field_signature {
            signature.trace(f);
        }
        for signature in [
            &self.getter_signature,
            &self.setter_signature,
            &self.synthetic_method_for_annotations,
            &self.synthetic_method_for_delegate,
        ]
        .into_iter()
        .flatten()
        {
            signature.trace(f);
        }
    }
}
