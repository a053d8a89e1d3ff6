//! File facades and multi-file classes (`k = 2`, `4` and `5`).
//!
//! Top-level declarations of a `.kt` file are compiled into a facade class. With
//! `@JvmMultifileClass` several files share one facade; each file then gets a part class
//! that names the facade, and the facade lists its parts.

use crate::{
    host::{ProgramClass, TypeRef},
    km::KmPackage,
    kotlin::{
        DeclarationContainerInfo, LocalDelegatedPropertiesInfo, MetadataOrigin, ReadContext,
        RewriteContext, SymbolIndex, TypeReference,
    },
};

/// The declarations of a file facade or multi-file class part.
#[derive(Debug, Clone)]
pub struct PackageInfo {
    container: DeclarationContainerInfo,
    module_name: Option<String>,
    local_delegated_properties: LocalDelegatedPropertiesInfo,
}

impl PackageInfo {
    /// Builds the package info and binds its declarations to the members of `class`.
    pub fn create(package: &KmPackage, class: &mut ProgramClass, ctx: &ReadContext) -> Self {
        let index = SymbolIndex::new(class);
        PackageInfo {
            container: DeclarationContainerInfo::create(
                &package.functions,
                &package.properties,
                &package.type_aliases,
                class,
                &index,
                ctx,
            ),
            module_name: package.module_name.clone(),
            local_delegated_properties: LocalDelegatedPropertiesInfo::create(
                &package.local_delegated_properties,
                ctx,
            ),
        }
    }

    /// The function, property and type alias part.
    #[must_use]
    pub fn container(&self) -> &DeclarationContainerInfo {
        &self.container
    }

    /// Rewrites the package from the surviving members of `class`.
    pub fn rewrite(&self, class: &ProgramClass, ctx: &RewriteContext) -> (KmPackage, bool) {
        let (declarations, mut changed) = self.container.rewrite(class, ctx);
        let (local_delegated_properties, c) = self.local_delegated_properties.rewrite(ctx);
        changed |= c;
        (
            KmPackage {
                functions: declarations.functions,
                properties: declarations.properties,
                type_aliases: declarations.type_aliases,
                module_name: self.module_name.clone(),
                local_delegated_properties,
            },
            changed,
        )
    }

    /// Reports every referenced class.
    pub fn trace(&self, class: &ProgramClass, f: &mut dyn FnMut(&TypeRef)) {
        self.container.trace(class, f);
        self.local_delegated_properties.trace(f);
    }
}

/// The Kotlin info of a file facade.
#[derive(Debug, Clone)]
pub struct FileFacadeInfo {
    origin: MetadataOrigin,
    package: PackageInfo,
}

impl FileFacadeInfo {
    /// Builds the facade info.
    pub fn create(
        package: &KmPackage,
        origin: MetadataOrigin,
        class: &mut ProgramClass,
        ctx: &ReadContext,
    ) -> Self {
        FileFacadeInfo {
            origin,
            package: PackageInfo::create(package, class, ctx),
        }
    }

    /// The header fields the class was read with.
    #[must_use]
    pub fn origin(&self) -> &MetadataOrigin {
        &self.origin
    }

    /// The facade's declarations.
    #[must_use]
    pub fn package(&self) -> &PackageInfo {
        &self.package
    }

    /// Rewrites the facade.
    pub fn rewrite(&self, class: &ProgramClass, ctx: &RewriteContext) -> (KmPackage, bool) {
        self.package.rewrite(class, ctx)
    }

    /// Reports every referenced class.
    pub fn trace(&self, class: &ProgramClass, f: &mut dyn FnMut(&TypeRef)) {
        self.package.trace(class, f);
    }
}

/// The Kotlin info of one part of a multi-file class.
#[derive(Debug, Clone)]
pub struct MultiFileClassPartInfo {
    origin: MetadataOrigin,
    facade_class: TypeReference,
    package: PackageInfo,
}

impl MultiFileClassPartInfo {
    /// Builds the part info.
    pub fn create(
        facade_class_name: &str,
        package: &KmPackage,
        origin: MetadataOrigin,
        class: &mut ProgramClass,
        ctx: &ReadContext,
    ) -> Self {
        MultiFileClassPartInfo {
            origin,
            facade_class: TypeReference::from_binary_name(facade_class_name),
            package: PackageInfo::create(package, class, ctx),
        }
    }

    /// The header fields the class was read with.
    #[must_use]
    pub fn origin(&self) -> &MetadataOrigin {
        &self.origin
    }

    /// Rewrites the part. A pruned facade keeps its recorded name.
    pub fn rewrite(&self, class: &ProgramClass, ctx: &RewriteContext) -> (String, KmPackage, bool) {
        let original = self.facade_class.original_text();
        let (facade_class_name, mut changed) = self.facade_class.rewrite_or(ctx, &original);
        let (package, c) = self.package.rewrite(class, ctx);
        changed |= c;
        (facade_class_name, package, changed)
    }

    /// Reports every referenced class.
    pub fn trace(&self, class: &ProgramClass, f: &mut dyn FnMut(&TypeRef)) {
        self.facade_class.trace(f);
        self.package.trace(class, f);
    }
}

/// The Kotlin info of a multi-file class facade.
#[derive(Debug, Clone)]
pub struct MultiFileClassFacadeInfo {
    origin: MetadataOrigin,
    parts: Vec<TypeReference>,
}

impl MultiFileClassFacadeInfo {
    /// Builds the facade info from the binary names of its parts.
    #[must_use]
    pub fn create(parts: &[String], origin: MetadataOrigin) -> Self {
        MultiFileClassFacadeInfo {
            origin,
            parts: parts
                .iter()
                .map(|part| TypeReference::from_binary_name(part))
                .collect(),
        }
    }

    /// The header fields the class was read with.
    #[must_use]
    pub fn origin(&self) -> &MetadataOrigin {
        &self.origin
    }

    /// Rewrites the part list, dropping pruned parts.
    pub fn rewrite(&self, ctx: &RewriteContext) -> (Vec<String>, bool) {
        let mut changed = false;
        let mut parts = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            let (name, c) = part.rewrite(ctx);
            changed |= c;
            parts.extend(name);
        }
        (parts, changed)
    }

    /// Reports every part class.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        for part in &self.parts {
            part.trace(f);
        }
    }
}
