//! Binding of functions and properties to the members of a declaration container.
//!
//! Classes, file facades and multi-file class parts all declare functions, properties and
//! type aliases. This module binds those declarations to the bytecode members of the class
//! that carries the metadata and, after shrinking, regroups the surviving members into
//! declarations again.
//!
//! # Binding
//!
//! A declaration is bound by looking up its recorded JVM signature in the class's
//! [`SymbolIndex`]. Bound declarations live in the member slots of the [`ProgramClass`];
//! declarations without a match are kept in unbacked lists and re-emitted without renaming.
//! A declaration whose members are all bound already is kept unbacked as well and reported.
//!
//! Inline functions and inline property accessors additionally have their byte code kept,
//! together with the `$default` overload of an inline function with default arguments.
//!
//! # Rewriting
//!
//! Members are walked in class order. Pruned members are skipped, functions are emitted
//! for the survivors and properties are regrouped by their shared [`Arc`], so that a
//! property whose getter was removed is emitted without a getter signature.

use std::sync::Arc;

use crate::{
    diagnostics::DiagnosticCategory,
    host::{descriptor::JAVA_LANG_OBJECT_DESCRIPTOR, MethodRef, ProgramClass, TypeRef},
    km::{KmFunction, KmProperty, KmTypeAlias},
    kotlin::{
        FunctionInfo, JvmMethodSignatureInfo, KotlinFieldLevelInfo, KotlinMethodLevelInfo,
        MembersTracker, PropertyInfo, PropertyParts, ReadContext, RewriteContext, SymbolIndex,
        TypeAliasInfo,
    },
};

/// Number of bits in one `$default` mask parameter.
const DEFAULT_MASK_BITS: usize = 32;

/// The declarations of a container after rewriting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerDeclarations {
    /// Functions, bound ones in member order followed by unbacked ones.
    pub functions: Vec<KmFunction>,
    /// Properties, bound ones in member order followed by unbacked ones.
    pub properties: Vec<KmProperty>,
    /// Type aliases in declaration order.
    pub type_aliases: Vec<KmTypeAlias>,
}

/// The container part of a class's Kotlin info.
#[derive(Debug, Clone, Default)]
pub struct DeclarationContainerInfo {
    unbacked_functions: Vec<FunctionInfo>,
    unbacked_properties: Vec<PropertyInfo>,
    type_aliases: Vec<TypeAliasInfo>,
    tracker: MembersTracker,
}

impl DeclarationContainerInfo {
    /// Builds the container info and binds its declarations to the members of `class`.
    pub fn create(
        functions: &[KmFunction],
        properties: &[KmProperty],
        type_aliases: &[KmTypeAlias],
        class: &mut ProgramClass,
        index: &SymbolIndex,
        ctx: &ReadContext,
    ) -> Self {
        let mut container = DeclarationContainerInfo {
            type_aliases: TypeAliasInfo::create_all(type_aliases, ctx),
            ..Default::default()
        };
        for function in functions {
            container.bind_function(FunctionInfo::create(function, ctx), class, index, ctx);
        }
        for property in properties {
            container.bind_property(PropertyInfo::create(property, ctx), class, index, ctx);
        }
        container
    }

    fn bind_function(
        &mut self,
        function: FunctionInfo,
        class: &mut ProgramClass,
        index: &SymbolIndex,
        ctx: &ReadContext,
    ) {
        let position = function
            .signature()
            .and_then(|signature| index.method(&signature.as_string()));
        let Some(position) = position else {
            self.unbacked_functions.push(function);
            return;
        };

        if class.methods[position].kotlin_info.is_bound() {
            ctx.warning(
                DiagnosticCategory::Read,
                format!(
                    "Function '{}' shares its member with another declaration",
                    function.name()
                ),
            );
            self.unbacked_functions.push(function);
            return;
        }

        keep_if_inline(&function, position, class, index, ctx);
        self.tracker.add();
        class.methods[position].kotlin_info = KotlinMethodLevelInfo::Function(Arc::new(function));
    }

    fn bind_property(
        &mut self,
        property: PropertyInfo,
        class: &mut ProgramClass,
        index: &SymbolIndex,
        ctx: &ReadContext,
    ) {
        let field = property
            .field_signature()
            .and_then(|signature| index.field(&signature.as_string()));
        let method_position = |signature: Option<&JvmMethodSignatureInfo>| {
            signature.and_then(|signature| index.method(&signature.as_string()))
        };
        let getter = method_position(property.getter_signature());
        let setter = method_position(property.setter_signature());
        let methods = [
            getter,
            setter,
            method_position(property.synthetic_method_for_annotations()),
            method_position(property.synthetic_method_for_delegate()),
        ];

        if field.is_none() && methods.iter().all(Option::is_none) {
            self.unbacked_properties.push(property);
            return;
        }

        // Members bound by an earlier declaration stay with it.
        let field = field.filter(|&field| !class.fields[field].kotlin_info.is_bound());
        let methods = methods.map(|position| {
            position.filter(|&position| !class.methods[position].kotlin_info.is_bound())
        });
        if field.is_none() && methods.iter().all(Option::is_none) {
            ctx.warning(
                DiagnosticCategory::Read,
                format!(
                    "Property '{}' shares its members with another declaration",
                    property.name()
                ),
            );
            self.unbacked_properties.push(property);
            return;
        }
        let getter = methods[0];
        let setter = methods[1];

        if let Some(getter) = getter.filter(|_| property.is_getter_inline()) {
            ctx.keep_byte_code(&class.methods[getter].reference);
        }
        if let Some(setter) = setter.filter(|_| property.is_setter_inline()) {
            ctx.keep_byte_code(&class.methods[setter].reference);
        }

        let property = Arc::new(property);
        if let Some(field) = field {
            self.tracker.add();
            class.fields[field].kotlin_info = KotlinFieldLevelInfo::Property(Arc::clone(&property));
        }
        for position in methods.into_iter().flatten() {
            let slot = &mut class.methods[position].kotlin_info;
            if !slot.is_bound() {
                self.tracker.add();
            }
            *slot = KotlinMethodLevelInfo::Property(Arc::clone(&property));
        }
    }

    /// Number of declarations without a backing member.
    #[must_use]
    pub fn unbacked_count(&self) -> usize {
        self.unbacked_functions.len() + self.unbacked_properties.len()
    }

    /// Members bound at read time.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.tracker.count()
    }

    /// Rewrites the container's declarations from the surviving members of `class`.
    pub fn rewrite(
        &self,
        class: &ProgramClass,
        ctx: &RewriteContext,
    ) -> (ContainerDeclarations, bool) {
        let mut changed = false;
        let mut surviving = 0;
        let mut out = ContainerDeclarations::default();
        let mut groups: Vec<(&Arc<PropertyInfo>, PropertyParts)> = Vec::new();

        for method in &class.methods {
            if !method.kotlin_info.is_bound() || ctx.lookup_method(&method.reference).is_none() {
                continue;
            }
            match &method.kotlin_info {
                KotlinMethodLevelInfo::Function(function) => {
                    surviving += 1;
                    let (function, c) = function.rewrite(Some(&method.reference), ctx);
                    changed |= c;
                    out.functions.push(function);
                }
                KotlinMethodLevelInfo::Property(property) => {
                    surviving += 1;
                    let parts = parts_of(&mut groups, property);
                    assign_method(property, &method.reference, parts);
                }
                KotlinMethodLevelInfo::Constructor(_) | KotlinMethodLevelInfo::None => {}
            }
        }
        for field in &class.fields {
            let Some(property) = field.kotlin_info.as_property() else {
                continue;
            };
            if ctx.lookup_field(&field.reference).is_none() {
                continue;
            }
            surviving += 1;
            parts_of(&mut groups, property).field = Some(&field.reference);
        }

        for (property, parts) in &groups {
            let (property, c) = property.rewrite(parts, ctx);
            changed |= c;
            out.properties.extend(property);
        }

        for function in &self.unbacked_functions {
            let (function, c) = function.rewrite(None, ctx);
            changed |= c;
            out.functions.push(function);
        }
        for property in &self.unbacked_properties {
            let (property, c) = property.rewrite(&PropertyParts::default(), ctx);
            changed |= c;
            out.properties.extend(property);
        }

        let (type_aliases, c) = TypeAliasInfo::rewrite_all(&self.type_aliases, ctx);
        changed |= c;
        out.type_aliases = type_aliases;

        if self.tracker.has_changed(surviving) {
            changed = true;
        }
        (out, changed)
    }

    /// Reports every class referenced by the declarations bound to `class` and the
    /// unbacked ones.
    pub fn trace(&self, class: &ProgramClass, f: &mut dyn FnMut(&TypeRef)) {
        let mut seen: Vec<&Arc<PropertyInfo>> = Vec::new();
        for method in &class.methods {
            match &method.kotlin_info {
                KotlinMethodLevelInfo::Function(function) => function.trace(f),
                KotlinMethodLevelInfo::Property(property) => {
                    if !seen.iter().any(|p| Arc::ptr_eq(p, property)) {
                        seen.push(property);
                        property.trace(f);
                    }
                }
                _ => {}
            }
        }
        for field in &class.fields {
            if let Some(property) = field.kotlin_info.as_property() {
                if !seen.iter().any(|p| Arc::ptr_eq(p, property)) {
                    seen.push(property);
                    property.trace(f);
                }
            }
        }
        for function in &self.unbacked_functions {
            function.trace(f);
        }
        for property in &self.unbacked_properties {
            property.trace(f);
        }
        for alias in &self.type_aliases {
            alias.trace(f);
        }
    }
}

/// Finds or opens the part group of `property`, keeping first-seen order.
fn parts_of<'a, 'b>(
    groups: &'b mut Vec<(&'a Arc<PropertyInfo>, PropertyParts<'a>)>,
    property: &'a Arc<PropertyInfo>,
) -> &'b mut PropertyParts<'a> {
    let position = match groups.iter().position(|(p, _)| Arc::ptr_eq(p, property)) {
        Some(position) => position,
        None => {
            groups.push((property, PropertyParts::default()));
            groups.len() - 1
        }
    };
    &mut groups[position].1
}

/// Puts `method` in the part of `property` whose recorded signature it carries.
fn assign_method<'a>(property: &PropertyInfo, method: &'a MethodRef, parts: &mut PropertyParts<'a>) {
    let signature = method.jvm_signature();
    let matches = |recorded: Option<&JvmMethodSignatureInfo>| {
        recorded.is_some_and(|recorded| recorded.as_string() == signature)
    };
    if matches(property.getter_signature()) {
        parts.getter = Some(method);
    } else if matches(property.setter_signature()) {
        parts.setter = Some(method);
    } else if matches(property.synthetic_method_for_annotations()) {
        parts.synthetic_method_for_annotations = Some(method);
    } else if matches(property.synthetic_method_for_delegate()) {
        parts.synthetic_method_for_delegate = Some(method);
    }
}

/// Keeps the byte code of an inline function and of its `$default` overload.
///
/// The overload appends `ceil(n / 32)` `int` masks and a trailing `Object` marker to the
/// parameters; for instance methods the receiver is prepended as well.
fn keep_if_inline(
    function: &FunctionInfo,
    position: usize,
    class: &ProgramClass,
    index: &SymbolIndex,
    ctx: &ReadContext,
) {
    if !function.is_inline() {
        return;
    }
    let method = &class.methods[position].reference;
    ctx.keep_byte_code(method);
    if !function.has_default_values() {
        return;
    }

    let masks = function
        .value_parameter_count()
        .div_ceil(DEFAULT_MASK_BITS)
        .max(1);
    let mut extra = "I".repeat(masks);
    extra.push_str(JAVA_LANG_OBJECT_DESCRIPTOR);
    let parameters: String = method.parameters.iter().map(TypeRef::descriptor).collect();
    let name = format!("{}$default", method.name);
    let candidates = [
        format!("{name}({parameters}{extra}){}", method.return_type),
        format!(
            "{name}({}{parameters}{extra}){}",
            method.holder, method.return_type
        ),
    ];
    if let Some(overload) = candidates.iter().find_map(|s| index.method(s)) {
        ctx.keep_byte_code(&class.methods[overload].reference);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        diagnostics::Diagnostics,
        host::{FieldRef, MappingSymbolTable},
        km::{
            flags::{AccessorFlags, FunctionFlags, PropertyFlags},
            JvmFieldSignature, JvmMethodSignature, KmType, KmValueParameter,
        },
    };

    fn host() -> TypeRef {
        TypeRef::new("Lfoo/Host;")
    }

    fn string() -> TypeRef {
        TypeRef::new("Ljava/lang/String;")
    }

    fn function(name: &str, flags: u32, signature: Option<&str>) -> KmFunction {
        let mut function = KmFunction::new(flags, name, KmType::class("kotlin/String"));
        function.signature = signature.map(|s| JvmMethodSignature::new(name, s));
        function
    }

    fn property() -> KmProperty {
        let mut property = KmProperty::new(
            (PropertyFlags::HAS_GETTER | PropertyFlags::HAS_SETTER | PropertyFlags::IS_VAR).bits(),
            "title",
            KmType::class("kotlin/String"),
        );
        property.getter_flags = AccessorFlags::IS_INLINE.bits();
        property.field_signature = Some(JvmFieldSignature::new("title", "Ljava/lang/String;"));
        property.getter_signature =
            Some(JvmMethodSignature::new("getTitle", "()Ljava/lang/String;"));
        property.setter_signature =
            Some(JvmMethodSignature::new("setTitle", "(Ljava/lang/String;)V"));
        property
    }

    fn class() -> ProgramClass {
        ProgramClass::new(host())
            .with_field(FieldRef::new(host(), "title", string()))
            .with_method(MethodRef::new(host(), "getTitle", vec![], string()), false)
            .with_method(
                MethodRef::new(host(), "setTitle", vec![string()], TypeRef::new("V")),
                false,
            )
            .with_method(MethodRef::new(host(), "describe", vec![], string()), false)
    }

    #[test]
    fn test_binding() {
        let mut class = class();
        let index = SymbolIndex::new(&class);
        let kept = Mutex::new(Vec::new());
        let keeper = |m: &MethodRef| kept.lock().unwrap().push(m.name.clone());
        let diagnostics = Diagnostics::new();
        let ctx = ReadContext::new(&keeper, &diagnostics, host());

        let functions = [
            function("describe", 0, Some("()Ljava/lang/String;")),
            function("helper", 0, None),
            function("missing", 0, Some("()Ljava/lang/String;")),
        ];
        let container =
            DeclarationContainerInfo::create(&functions, &[property()], &[], &mut class, &index, &ctx);

        assert_eq!(container.bound_count(), 4);
        assert_eq!(container.unbacked_count(), 2);
        assert!(class.methods[2].kotlin_info.as_function().is_some());
        let getter = class.methods[0].kotlin_info.as_property().unwrap();
        let setter = class.methods[1].kotlin_info.as_property().unwrap();
        let field = class.fields[0].kotlin_info.as_property().unwrap();
        assert!(Arc::ptr_eq(getter, setter));
        assert!(Arc::ptr_eq(getter, field));
        assert_eq!(*kept.lock().unwrap(), vec!["getTitle".to_string()]);
    }

    #[test]
    fn test_shared_member_keeps_first_declaration() {
        let mut class = class();
        let index = SymbolIndex::new(&class);
        let keeper = |_: &MethodRef| {};
        let diagnostics = Diagnostics::new();
        let ctx = ReadContext::new(&keeper, &diagnostics, host());

        let functions = [
            function("describe", 0, Some("()Ljava/lang/String;")),
            function("describe", FunctionFlags::IS_INLINE.bits(), Some("()Ljava/lang/String;")),
        ];
        let container = DeclarationContainerInfo::create(
            &functions,
            &[property(), property()],
            &[],
            &mut class,
            &index,
            &ctx,
        );

        assert_eq!(container.bound_count(), 4);
        assert_eq!(container.unbacked_count(), 2);
        let bound = class.methods[2].kotlin_info.as_function().unwrap();
        assert!(!bound.is_inline());
        assert_eq!(diagnostics.warning_count(), 2);
        assert_eq!(diagnostics.by_category(DiagnosticCategory::Read).len(), 2);

        let table = MappingSymbolTable::new();
        let rewrite = RewriteContext::new(&table, &diagnostics);
        let (same, _) = container.rewrite(&class, &rewrite);
        assert_eq!(same.functions.len(), 2);
        assert_eq!(same.properties.len(), 2);
    }

    #[test]
    fn test_rewrite_regroups_property() {
        let mut class = class();
        let index = SymbolIndex::new(&class);
        let keeper = |_: &MethodRef| {};
        let diagnostics = Diagnostics::new();
        let read = ReadContext::new(&keeper, &diagnostics, host());
        let functions = [function("describe", 0, Some("()Ljava/lang/String;"))];
        let container =
            DeclarationContainerInfo::create(&functions, &[property()], &[], &mut class, &index, &read);

        let table = MappingSymbolTable::new();
        let ctx = RewriteContext::new(&table, &diagnostics);
        let (same, changed) = container.rewrite(&class, &ctx);
        assert!(!changed);
        assert_eq!(same.functions, functions.to_vec());
        assert_eq!(same.properties, vec![property()]);

        table.prune_method(class.methods[1].reference.clone());
        table.rename_method(class.methods[0].reference.clone(), "a");
        let (rewritten, changed) = container.rewrite(&class, &ctx);
        assert!(changed);
        let title = &rewritten.properties[0];
        assert_eq!(title.getter_signature.as_ref().unwrap().name, "a");
        assert!(title.setter_signature.is_some());
        assert_eq!(title.name, "title");
    }

    #[test]
    fn test_pruned_function_forces_change() {
        let mut class = class();
        let index = SymbolIndex::new(&class);
        let keeper = |_: &MethodRef| {};
        let diagnostics = Diagnostics::new();
        let read = ReadContext::new(&keeper, &diagnostics, host());
        let functions = [function("describe", 0, Some("()Ljava/lang/String;"))];
        let container =
            DeclarationContainerInfo::create(&functions, &[], &[], &mut class, &index, &read);

        let table = MappingSymbolTable::new();
        table.prune_method(class.methods[2].reference.clone());
        let ctx = RewriteContext::new(&table, &diagnostics);
        let (rewritten, changed) = container.rewrite(&class, &ctx);
        assert!(changed);
        assert!(rewritten.functions.is_empty());
    }

    #[test]
    fn test_inline_default_overload_kept() {
        let object = TypeRef::new(JAVA_LANG_OBJECT_DESCRIPTOR);
        let mut class = ProgramClass::new(host())
            .with_method(MethodRef::new(host(), "render", vec![string()], string()), false)
            .with_method(
                MethodRef::new(
                    host(),
                    "render$default",
                    vec![host(), string(), TypeRef::new("I"), object],
                    string(),
                ),
                true,
            );
        let index = SymbolIndex::new(&class);
        let kept = Mutex::new(Vec::new());
        let keeper = |m: &MethodRef| kept.lock().unwrap().push(m.name.clone());
        let diagnostics = Diagnostics::new();
        let ctx = ReadContext::new(&keeper, &diagnostics, host());

        let mut render = function(
            "render",
            FunctionFlags::IS_INLINE.bits(),
            Some("(Ljava/lang/String;)Ljava/lang/String;"),
        );
        render.value_parameters.push(KmValueParameter {
            flags: 1 << 1,
            name: "text".to_string(),
            ty: KmType::class("kotlin/String"),
            vararg_element_type: None,
        });
        DeclarationContainerInfo::create(&[render], &[], &[], &mut class, &index, &ctx);
        assert_eq!(
            *kept.lock().unwrap(),
            vec!["render".to_string(), "render$default".to_string()]
        );
    }
}
