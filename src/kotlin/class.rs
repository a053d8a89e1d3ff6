//! The Kotlin info of a class (`k = 1`).
//!
//! Besides the declarations it shares with other containers, a class records its own name,
//! its super types, constructors, nested and sealed classes, its companion object and enum
//! entries. Everything that names another class is rewritten through the symbol table;
//! members are rewritten from the slots that binding left on the [`ProgramClass`].
//!
//! # Names
//!
//! The class name is re-derived from the renamed class only when the recorded name is the
//! one derivable from the class descriptor (or from its anonymous-object origin). Names
//! the compiler chose some other way are written back as they were.

use std::sync::Arc;

use crate::{
    diagnostics::DiagnosticCategory,
    host::{
        descriptor::{descriptor_to_binary_name, descriptor_to_kotlin_classifier},
        ProgramClass, TypeRef,
    },
    km::KmClass,
    kotlin::{
        CompanionInfo, ConstructorInfo, DeclarationContainerInfo, EnumEntryInfo,
        KotlinFieldLevelInfo, KotlinMethodLevelInfo, LocalDelegatedPropertiesInfo,
        MembersTracker, MetadataOrigin, ReadContext, RewriteContext, SymbolIndex, TypeInfo,
        TypeParameterInfo, TypeReference, VersionRequirementInfo,
    },
};

/// Prefix of local and anonymous class names.
const LOCAL_CLASS_PREFIX: char = '.';

/// How the recorded class name relates to the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameSource {
    /// The Kotlin classifier of the class descriptor.
    Classifier,
    /// The binary name of the class descriptor (local classes).
    BinaryName,
    /// The binary name of the anonymous-object origin.
    AnonymousObjectOrigin,
    /// Anything else; kept verbatim.
    Verbatim,
}

/// The Kotlin info of a class.
#[derive(Debug, Clone)]
pub struct ClassInfo {
    origin: MetadataOrigin,
    flags: u32,
    name: String,
    name_source: NameSource,
    is_local_or_anonymous: bool,
    type_parameters: Vec<TypeParameterInfo>,
    super_types: Vec<TypeInfo>,
    container: DeclarationContainerInfo,
    unbacked_constructors: Vec<ConstructorInfo>,
    constructors: MembersTracker,
    companion_object: Option<String>,
    companion_bound: bool,
    nested_classes: Vec<(String, TypeReference)>,
    enum_entries: Vec<String>,
    sealed_subclasses: Vec<TypeReference>,
    inline_class_underlying_property_name: Option<String>,
    inline_class_underlying_type: Option<TypeInfo>,
    context_receiver_types: Vec<TypeInfo>,
    version_requirements: VersionRequirementInfo,
    module_name: Option<String>,
    anonymous_object_origin: Option<TypeReference>,
    local_delegated_properties: LocalDelegatedPropertiesInfo,
    jvm_flags: u32,
}

impl ClassInfo {
    /// Builds the class info and binds its members to `class`.
    pub fn create(
        km: &KmClass,
        origin: MetadataOrigin,
        class: &mut ProgramClass,
        ctx: &ReadContext,
    ) -> Self {
        let index = SymbolIndex::new(class);
        let anonymous_object_origin = km
            .anonymous_object_origin_name
            .as_deref()
            .map(TypeReference::from_binary_name);
        let (is_local_or_anonymous, stripped) = match km.name.strip_prefix(LOCAL_CLASS_PREFIX) {
            Some(stripped) => (true, stripped),
            None => (false, km.name.as_str()),
        };
        let name_source = if is_local_or_anonymous && stripped == class.ty.binary_name() {
            NameSource::BinaryName
        } else if stripped == descriptor_to_kotlin_classifier(class.ty.descriptor()) {
            NameSource::Classifier
        } else if stripped == class.ty.binary_name() {
            NameSource::BinaryName
        } else if km.anonymous_object_origin_name.as_deref() == Some(stripped) {
            NameSource::AnonymousObjectOrigin
        } else {
            NameSource::Verbatim
        };

        let container = DeclarationContainerInfo::create(
            &km.functions,
            &km.properties,
            &km.type_aliases,
            class,
            &index,
            ctx,
        );

        let mut unbacked_constructors = Vec::new();
        let mut constructors = MembersTracker::new();
        for constructor in &km.constructors {
            let info = ConstructorInfo::create(constructor, ctx);
            let position = info
                .signature()
                .and_then(|signature| index.method(&signature.as_string()));
            match position {
                Some(position) if class.methods[position].kotlin_info.is_bound() => {
                    ctx.warning(
                        DiagnosticCategory::Read,
                        "Constructor shares its member with another declaration",
                    );
                    unbacked_constructors.push(info);
                }
                Some(position) => {
                    constructors.add();
                    class.methods[position].kotlin_info =
                        KotlinMethodLevelInfo::Constructor(Arc::new(info));
                }
                None => unbacked_constructors.push(info),
            }
        }

        let mut companion_bound = false;
        if let Some(companion) = &km.companion_object {
            match class.fields.iter_mut().find(|f| f.reference.name == *companion) {
                Some(field) => {
                    field.kotlin_info = KotlinFieldLevelInfo::Companion(CompanionInfo {
                        companion_object_name: companion.clone(),
                    });
                    companion_bound = true;
                }
                None => ctx.warning(
                    DiagnosticCategory::Companion,
                    format!("Missing field for companion object '{companion}'"),
                ),
            }
        }
        for entry in &km.enum_entries {
            if let Some(field) = class.fields.iter_mut().find(|f| f.reference.name == *entry) {
                field.kotlin_info = KotlinFieldLevelInfo::EnumEntry(EnumEntryInfo {
                    enum_entry_name: entry.clone(),
                });
            }
        }

        let outer = class.ty.binary_name().to_string();
        ClassInfo {
            origin,
            flags: km.flags,
            name: km.name.clone(),
            name_source,
            is_local_or_anonymous,
            type_parameters: TypeParameterInfo::create_all(&km.type_parameters, ctx),
            super_types: TypeInfo::create_all(&km.supertypes, ctx),
            container,
            unbacked_constructors,
            constructors,
            companion_object: km.companion_object.clone(),
            companion_bound,
            nested_classes: km
                .nested_classes
                .iter()
                .map(|simple| {
                    let ty = TypeReference::from_binary_name(&format!("{outer}${simple}"));
                    (simple.clone(), ty)
                })
                .collect(),
            enum_entries: km.enum_entries.clone(),
            sealed_subclasses: km
                .sealed_subclasses
                .iter()
                .map(|name| TypeReference::from_kotlin_classifier(name))
                .collect(),
            inline_class_underlying_property_name: km
                .inline_class_underlying_property_name
                .clone(),
            inline_class_underlying_type: km
                .inline_class_underlying_type
                .as_ref()
                .map(|t| TypeInfo::create(t, ctx)),
            context_receiver_types: TypeInfo::create_all(&km.context_receiver_types, ctx),
            version_requirements: VersionRequirementInfo::create(&km.version_requirements),
            module_name: km.module_name.clone(),
            anonymous_object_origin,
            local_delegated_properties: LocalDelegatedPropertiesInfo::create(
                &km.local_delegated_properties,
                ctx,
            ),
            jvm_flags: km.jvm_flags,
        }
    }

    /// The header fields the class was read with.
    #[must_use]
    pub fn origin(&self) -> &MetadataOrigin {
        &self.origin
    }

    /// The recorded class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The recorded companion object name.
    #[must_use]
    pub fn companion_object(&self) -> Option<&str> {
        self.companion_object.as_deref()
    }

    /// The function, property and type alias part.
    #[must_use]
    pub fn container(&self) -> &DeclarationContainerInfo {
        &self.container
    }

    fn rewrite_name(&self, class: &ProgramClass, ctx: &RewriteContext) -> (String, bool) {
        let renamed = match self.name_source {
            NameSource::Verbatim => return (self.name.clone(), false),
            NameSource::Classifier => ctx
                .lookup_type(&class.ty)
                .map(|ty| descriptor_to_kotlin_classifier(ty.descriptor())),
            NameSource::BinaryName => ctx
                .lookup_type(&class.ty)
                .map(|ty| descriptor_to_binary_name(ty.descriptor()).to_string()),
            NameSource::AnonymousObjectOrigin => self
                .anonymous_object_origin
                .as_ref()
                .and_then(|origin| origin.rewritten_type(ctx))
                .map(|ty| descriptor_to_binary_name(ty.descriptor()).to_string()),
        };
        let Some(renamed) = renamed else {
            return (self.name.clone(), false);
        };
        let name = if self.is_local_or_anonymous {
            format!("{LOCAL_CLASS_PREFIX}{renamed}")
        } else {
            renamed
        };
        let changed = name != self.name;
        (name, changed)
    }

    /// Rewrites the class from the surviving members of `class`.
    pub fn rewrite(&self, class: &ProgramClass, ctx: &RewriteContext) -> (KmClass, bool) {
        let (name, mut changed) = self.rewrite_name(class, ctx);
        let mut km = KmClass {
            flags: self.flags,
            name,
            jvm_flags: self.jvm_flags,
            module_name: self.module_name.clone(),
            inline_class_underlying_property_name: self
                .inline_class_underlying_property_name
                .clone(),
            version_requirements: self.version_requirements.rewrite(),
            ..KmClass::default()
        };

        let (type_parameters, c) = TypeParameterInfo::rewrite_all(&self.type_parameters, ctx);
        changed |= c;
        km.type_parameters = type_parameters;

        let this = ctx.lookup_type(&class.ty);
        for super_type in &self.super_types {
            if this.is_some() && super_type.classifier().rewritten_class(ctx) == this {
                changed = true;
                continue;
            }
            let (super_type, c) = super_type.rewrite(ctx);
            changed |= c;
            km.supertypes.push(super_type);
        }

        let (declarations, c) = self.container.rewrite(class, ctx);
        changed |= c;
        km.functions = declarations.functions;
        km.properties = declarations.properties;
        km.type_aliases = declarations.type_aliases;

        let mut surviving = 0;
        for method in &class.methods {
            let KotlinMethodLevelInfo::Constructor(constructor) = &method.kotlin_info else {
                continue;
            };
            if ctx.lookup_method(&method.reference).is_none() {
                continue;
            }
            surviving += 1;
            let (constructor, c) = constructor.rewrite(Some(&method.reference), ctx);
            changed |= c;
            km.constructors.push(constructor);
        }
        changed |= self.constructors.has_changed(surviving);
        for constructor in &self.unbacked_constructors {
            let (constructor, c) = constructor.rewrite(None, ctx);
            changed |= c;
            km.constructors.push(constructor);
        }

        let (companion, c) = self.rewrite_companion(class, ctx);
        changed |= c;
        km.companion_object = companion;

        let (enum_entries, c) = self.rewrite_enum_entries(class, ctx);
        changed |= c;
        km.enum_entries = enum_entries;

        let (nested_classes, c) = self.rewrite_nested_classes(class, ctx);
        changed |= c;
        km.nested_classes = nested_classes;

        for subclass in &self.sealed_subclasses {
            match subclass.rewrite(ctx) {
                (Some(name), c) => {
                    changed |= c;
                    km.sealed_subclasses.push(name);
                }
                (None, _) => changed = true,
            }
        }

        let (underlying_type, c) =
            TypeInfo::rewrite_opt(self.inline_class_underlying_type.as_ref(), ctx);
        changed |= c;
        km.inline_class_underlying_type = underlying_type;

        let (context_receivers, c) = TypeInfo::rewrite_all(&self.context_receiver_types, ctx);
        changed |= c;
        km.context_receiver_types = context_receivers;

        if let Some(origin) = &self.anonymous_object_origin {
            let (origin, c) = origin.rewrite(ctx);
            changed |= c;
            km.anonymous_object_origin_name = origin;
        }

        let (local_delegated_properties, c) = self.local_delegated_properties.rewrite(ctx);
        changed |= c;
        km.local_delegated_properties = local_delegated_properties;

        (km, changed)
    }

    fn rewrite_companion(&self, class: &ProgramClass, ctx: &RewriteContext) -> (Option<String>, bool) {
        let Some(companion) = &self.companion_object else {
            return (None, false);
        };
        if !self.companion_bound {
            return (Some(companion.clone()), false);
        }
        let renamed = class
            .fields
            .iter()
            .filter(|f| matches!(f.kotlin_info, KotlinFieldLevelInfo::Companion(_)))
            .find_map(|f| ctx.lookup_field(&f.reference));
        match renamed {
            Some(field) => {
                let changed = field.name != *companion;
                (Some(field.name), changed)
            }
            None => (None, true),
        }
    }

    fn rewrite_enum_entries(&self, class: &ProgramClass, ctx: &RewriteContext) -> (Vec<String>, bool) {
        let mut changed = false;
        let mut entries = Vec::with_capacity(self.enum_entries.len());
        for entry in &self.enum_entries {
            let field = class.fields.iter().find(|f| {
                matches!(&f.kotlin_info, KotlinFieldLevelInfo::EnumEntry(e) if e.enum_entry_name == *entry)
            });
            let Some(field) = field else {
                entries.push(entry.clone());
                continue;
            };
            match ctx.lookup_field(&field.reference) {
                Some(renamed) => {
                    changed |= renamed.name != *entry;
                    entries.push(renamed.name);
                }
                None => changed = true,
            }
        }
        (entries, changed)
    }

    fn rewrite_nested_classes(&self, class: &ProgramClass, ctx: &RewriteContext) -> (Vec<String>, bool) {
        let outer = ctx
            .lookup_type(&class.ty)
            .map_or_else(|| class.ty.binary_name().to_string(), |ty| ty.binary_name().to_string());
        let prefix = format!("{outer}$");
        let mut changed = false;
        let mut nested = Vec::with_capacity(self.nested_classes.len());
        for (simple, ty) in &self.nested_classes {
            if ty.known().is_none() {
                nested.push(simple.clone());
                continue;
            }
            let Some(renamed) = ty.rewritten_type(ctx) else {
                changed = true;
                continue;
            };
            let binary = renamed.binary_name();
            let name = match binary.strip_prefix(&prefix) {
                Some(suffix) => suffix.to_string(),
                None => {
                    let simple_name = binary.rsplit('/').next().unwrap_or(binary);
                    simple_name
                        .rsplit('$')
                        .next()
                        .unwrap_or(simple_name)
                        .to_string()
                }
            };
            changed |= name != *simple;
            nested.push(name);
        }
        (nested, changed)
    }

    /// Reports every class referenced by the class and its bound members.
    pub fn trace(&self, class: &ProgramClass, f: &mut dyn FnMut(&TypeRef)) {
        for param in &self.type_parameters {
            param.trace(f);
        }
        for super_type in &self.super_types {
            super_type.trace(f);
        }
        self.container.trace(class, f);
        for method in &class.methods {
            if let KotlinMethodLevelInfo::Constructor(constructor) = &method.kotlin_info {
                constructor.trace(f);
            }
        }
        for constructor in &self.unbacked_constructors {
            constructor.trace(f);
        }
        for (_, nested) in &self.nested_classes {
            nested.trace(f);
        }
        for subclass in &self.sealed_subclasses {
            subclass.trace(f);
        }
        if let Some(ty) = &self.inline_class_underlying_type {
            ty.trace(f);
        }
        for ty in &self.context_receiver_types {
            ty.trace(f);
        }
        if let Some(origin) = &self.anonymous_object_origin {
            origin.trace(f);
        }
        self.local_delegated_properties.trace(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::Diagnostics,
        host::{FieldRef, MappingSymbolTable, MethodRef},
        km::{JvmMethodSignature, KmConstructor, KmType},
    };

    fn outer() -> TypeRef {
        TypeRef::new("Lfoo/Outer;")
    }

    fn km() -> KmClass {
        KmClass {
            name: "foo/Outer".to_string(),
            supertypes: vec![KmType::class("foo/Base"), KmType::class("kotlin/Any")],
            constructors: vec![KmConstructor {
                flags: 0,
                value_parameters: vec![],
                version_requirements: vec![],
                signature: Some(JvmMethodSignature::new("<init>", "()V")),
            }],
            companion_object: Some("Companion".to_string()),
            nested_classes: vec!["Inner".to_string(), "Companion".to_string()],
            enum_entries: vec!["RED".to_string(), "GREEN".to_string()],
            sealed_subclasses: vec!["foo/Outer.Inner".to_string()],
            ..KmClass::default()
        }
    }

    fn class() -> ProgramClass {
        let companion = TypeRef::new("Lfoo/Outer$Companion;");
        ProgramClass::new(outer())
            .with_field(FieldRef::new(outer(), "Companion", companion))
            .with_field(FieldRef::new(outer(), "RED", outer()))
            .with_field(FieldRef::new(outer(), "GREEN", outer()))
            .with_method(MethodRef::new(outer(), "<init>", vec![], TypeRef::new("V")), false)
    }

    fn read(class: &mut ProgramClass, diagnostics: &Diagnostics) -> ClassInfo {
        let keeper = |_: &MethodRef| {};
        let ctx = ReadContext::new(&keeper, diagnostics, outer());
        ClassInfo::create(&km(), MetadataOrigin::default(), class, &ctx)
    }

    #[test]
    fn test_identity() {
        let mut class = class();
        let diagnostics = Diagnostics::new();
        let info = read(&mut class, &diagnostics);
        assert!(matches!(class.fields[0].kotlin_info, KotlinFieldLevelInfo::Companion(_)));
        assert!(matches!(class.methods[0].kotlin_info, KotlinMethodLevelInfo::Constructor(_)));

        let table = MappingSymbolTable::new();
        let ctx = RewriteContext::new(&table, &diagnostics);
        let (rewritten, changed) = info.rewrite(&class, &ctx);
        assert!(!changed);
        assert_eq!(rewritten, km());
    }

    #[test]
    fn test_renaming() {
        let mut class = class();
        let diagnostics = Diagnostics::new();
        let info = read(&mut class, &diagnostics);

        let table = MappingSymbolTable::new();
        table.rename_type(outer(), TypeRef::new("La;"));
        table.rename_type(TypeRef::new("Lfoo/Outer$Inner;"), TypeRef::new("La$b;"));
        table.rename_type(TypeRef::new("Lfoo/Outer$Companion;"), TypeRef::new("Lc;"));
        table.rename_field(class.fields[0].reference.clone(), "d");
        table.prune_field(class.fields[2].reference.clone());
        let ctx = RewriteContext::new(&table, &diagnostics);

        let (rewritten, changed) = info.rewrite(&class, &ctx);
        assert!(changed);
        assert_eq!(rewritten.name, "a");
        assert_eq!(rewritten.companion_object.as_deref(), Some("d"));
        assert_eq!(rewritten.nested_classes, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(rewritten.enum_entries, vec!["RED".to_string()]);
        assert_eq!(rewritten.sealed_subclasses, vec!["a.b".to_string()]);
        assert_eq!(rewritten.constructors.len(), 1);
    }

    #[test]
    fn test_self_super_type_dropped() {
        let mut class = class();
        let diagnostics = Diagnostics::new();
        let info = read(&mut class, &diagnostics);

        let table = MappingSymbolTable::new();
        table.rename_type(TypeRef::new("Lfoo/Base;"), TypeRef::new("La;"));
        table.rename_type(outer(), TypeRef::new("La;"));
        let ctx = RewriteContext::new(&table, &diagnostics);
        let (rewritten, changed) = info.rewrite(&class, &ctx);
        assert!(changed);
        assert_eq!(rewritten.supertypes, vec![KmType::class("kotlin/Any")]);
    }

    #[test]
    fn test_missing_companion_field_warns() {
        let mut class = ProgramClass::new(outer());
        let diagnostics = Diagnostics::new();
        let info = read(&mut class, &diagnostics);
        assert_eq!(diagnostics.by_category(DiagnosticCategory::Companion).len(), 1);

        let table = MappingSymbolTable::new();
        let ctx = RewriteContext::new(&table, &diagnostics);
        let (rewritten, _) = info.rewrite(&class, &ctx);
        assert_eq!(rewritten.companion_object.as_deref(), Some("Companion"));
    }

    #[test]
    fn test_pruned_companion_forces_change() {
        let mut class = class();
        let diagnostics = Diagnostics::new();
        let info = read(&mut class, &diagnostics);

        let table = MappingSymbolTable::new();
        table.prune_field(class.fields[0].reference.clone());
        let ctx = RewriteContext::new(&table, &diagnostics);
        let (rewritten, changed) = info.rewrite(&class, &ctx);
        assert!(changed);
        assert!(rewritten.companion_object.is_none());
    }

    #[test]
    fn test_duplicate_constructor_kept_unbacked() {
        let mut km = km();
        km.constructors.push(km.constructors[0].clone());
        let mut class = class();
        let keeper = |_: &MethodRef| {};
        let diagnostics = Diagnostics::new();
        let read = ReadContext::new(&keeper, &diagnostics, outer());
        let info = ClassInfo::create(&km, MetadataOrigin::default(), &mut class, &read);
        assert_eq!(diagnostics.by_category(DiagnosticCategory::Read).len(), 1);

        let table = MappingSymbolTable::new();
        let ctx = RewriteContext::new(&table, &diagnostics);
        let (rewritten, changed) = info.rewrite(&class, &ctx);
        assert!(!changed);
        assert_eq!(rewritten.constructors.len(), 2);
    }

    #[test]
    fn test_local_class_name_keeps_binary_form() {
        let ty = TypeRef::new("Lfoo/Outer$run$1;");
        let km = KmClass {
            name: ".foo/Outer$run$1".to_string(),
            ..KmClass::default()
        };
        let mut class = ProgramClass::new(ty.clone());
        let keeper = |_: &MethodRef| {};
        let diagnostics = Diagnostics::new();
        let read = ReadContext::new(&keeper, &diagnostics, ty.clone());
        let info = ClassInfo::create(&km, MetadataOrigin::default(), &mut class, &read);

        let table = MappingSymbolTable::new();
        let ctx = RewriteContext::new(&table, &diagnostics);
        let (same, changed) = info.rewrite(&class, &ctx);
        assert!(!changed);
        assert_eq!(same.name, ".foo/Outer$run$1");

        table.rename_type(ty, TypeRef::new("La$1;"));
        let (rewritten, changed) = info.rewrite(&class, &ctx);
        assert!(changed);
        assert_eq!(rewritten.name, ".a$1");
    }

    #[test]
    fn test_verbatim_name() {
        let mut km = km();
        km.name = "foo/Renamed".to_string();
        let mut class = class();
        let keeper = |_: &MethodRef| {};
        let diagnostics = Diagnostics::new();
        let read = ReadContext::new(&keeper, &diagnostics, outer());
        let info = ClassInfo::create(&km, MetadataOrigin::default(), &mut class, &read);

        let table = MappingSymbolTable::new();
        table.rename_type(outer(), TypeRef::new("La;"));
        let ctx = RewriteContext::new(&table, &diagnostics);
        let (rewritten, _) = info.rewrite(&class, &ctx);
        assert_eq!(rewritten.name, "foo/Renamed");
    }
}
