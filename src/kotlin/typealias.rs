use crate::{
    host::TypeRef,
    km::KmTypeAlias,
    kotlin::{
        AnnotationInfo, ReadContext, RewriteContext, TypeInfo, TypeParameterInfo,
        VersionRequirementInfo,
    },
};

/// A `typealias` declaration. Type aliases have no bytecode members and are never bound.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasInfo {
    flags: u32,
    name: String,
    type_parameters: Vec<TypeParameterInfo>,
    underlying_type: TypeInfo,
    expanded_type: TypeInfo,
    annotations: Vec<AnnotationInfo>,
    version_requirements: VersionRequirementInfo,
}

impl TypeAliasInfo {
    /// Builds the Info for a decoded type alias.
    pub fn create(alias: &KmTypeAlias, ctx: &ReadContext) -> Self {
        TypeAliasInfo {
            flags: alias.flags,
            name: alias.name.clone(),
            type_parameters: TypeParameterInfo::create_all(&alias.type_parameters, ctx),
            underlying_type: TypeInfo::create(&alias.underlying_type, ctx),
            expanded_type: TypeInfo::create(&alias.expanded_type, ctx),
            annotations: AnnotationInfo::create_all(&alias.annotations),
            version_requirements: VersionRequirementInfo::create(&alias.version_requirements),
        }
    }

    /// Builds the Infos for all aliases of a container.
    pub fn create_all(aliases: &[KmTypeAlias], ctx: &ReadContext) -> Vec<Self> {
        aliases.iter().map(|a| Self::create(a, ctx)).collect()
    }

    /// The alias name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rewrites the alias.
    pub fn rewrite(&self, ctx: &RewriteContext) -> (KmTypeAlias, bool) {
        let (type_parameters, mut changed) =
            TypeParameterInfo::rewrite_all(&self.type_parameters, ctx);
        let (underlying_type, c) = self.underlying_type.rewrite(ctx);
        changed |= c;
        let (expanded_type, c) = self.expanded_type.rewrite(ctx);
        changed |= c;
        let (annotations, c) = AnnotationInfo::rewrite_all(&self.annotations, ctx);
        changed |= c;
        (
            KmTypeAlias {
                flags: self.flags,
                name: self.name.clone(),
                type_parameters,
                underlying_type,
                expanded_type,
                annotations,
                version_requirements: self.version_requirements.rewrite(),
            },
            changed,
        )
    }

    /// Rewrites a list of aliases.
    pub fn rewrite_all(aliases: &[Self], ctx: &RewriteContext) -> (Vec<KmTypeAlias>, bool) {
        let mut changed = false;
        let out = aliases
            .iter()
            .map(|a| {
                let (alias, c) = a.rewrite(ctx);
                changed |= c;
                alias
            })
            .collect();
        (out, changed)
    }

    /// Reports every referenced class.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        for param in &self.type_parameters {
            param.trace(f);
        }
        self.underlying_type.trace(f);
        self.expanded_type.trace(f);
        for annotation in &self.annotations {
            annotation.trace(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::Diagnostics,
        host::{MappingSymbolTable, MethodRef},
        km::{KmAnnotation, KmClassifier, KmType},
    };

    #[test]
    fn test_alias_expansion_renamed() {
        let alias = KmTypeAlias {
            flags: 0,
            name: "Handler".to_string(),
            type_parameters: vec![],
            underlying_type: KmType::class("foo/Callback"),
            expanded_type: KmType::class("foo/Callback"),
            annotations: vec![KmAnnotation {
                class_name: "foo/Gone".to_string(),
                arguments: vec![],
            }],
            version_requirements: vec![],
        };
        let keeper = |_: &MethodRef| {};
        let diagnostics = Diagnostics::new();
        let read = ReadContext::new(&keeper, &diagnostics, TypeRef::new("LHost;"));
        let info = TypeAliasInfo::create(&alias, &read);
        assert_eq!(info.name(), "Handler");

        let table = MappingSymbolTable::new();
        let ctx = RewriteContext::new(&table, &diagnostics);
        let (same, changed) = info.rewrite(&ctx);
        assert!(!changed);
        assert_eq!(same, alias);

        table.rename_type(TypeRef::new("Lfoo/Callback;"), TypeRef::new("La;"));
        table.prune(TypeRef::new("Lfoo/Gone;"));
        let (rewritten, changed) = info.rewrite(&ctx);
        assert!(changed);
        assert_eq!(rewritten.name, "Handler");
        assert_eq!(rewritten.expanded_type.classifier, KmClassifier::Class("a".to_string()));
        assert!(rewritten.annotations.is_empty());
    }
}
