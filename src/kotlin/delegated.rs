use crate::{
    host::TypeRef,
    km::KmProperty,
    kotlin::{PropertyInfo, PropertyParts, ReadContext, RewriteContext},
};

/// The `val x by lazy { .. }` declarations local to function bodies of a container.
///
/// They have no members of their own on the container class and are rewritten unbacked.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocalDelegatedPropertiesInfo {
    properties: Vec<PropertyInfo>,
}

impl LocalDelegatedPropertiesInfo {
    /// Builds the Info for a container's local delegated properties.
    pub fn create(properties: &[KmProperty], ctx: &ReadContext) -> Self {
        LocalDelegatedPropertiesInfo {
            properties: PropertyInfo::create_all(properties, ctx),
        }
    }

    /// Number of recorded properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if there are none.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Rewrites every property in order.
    pub fn rewrite(&self, ctx: &RewriteContext) -> (Vec<KmProperty>, bool) {
        let mut changed = false;
        let mut out = Vec::with_capacity(self.properties.len());
        for property in &self.properties {
            let (rewritten, c) = property.rewrite(&PropertyParts::default(), ctx);
            changed |= c;
            out.extend(rewritten);
        }
        (out, changed)
    }

    /// Reports every referenced class.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        for property in &self.properties {
            property.trace(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::Diagnostics,
        host::{MappingSymbolTable, MethodRef},
        km::{JvmMethodSignature, KmType},
    };

    #[test]
    fn test_rewrite_unbacked() {
        let mut property = KmProperty::new(0, "cached", KmType::class("foo/Value"));
        property.getter_signature = Some(JvmMethodSignature::new("<v#0>", "()Lfoo/Value;"));
        let keeper = |_: &MethodRef| {};
        let diagnostics = Diagnostics::new();
        let read = ReadContext::new(&keeper, &diagnostics, TypeRef::new("LHost;"));
        let info = LocalDelegatedPropertiesInfo::create(&[property], &read);
        assert_eq!(info.len(), 1);

        let table = MappingSymbolTable::new();
        table.rename_type(TypeRef::new("Lfoo/Value;"), TypeRef::new("La;"));
        let ctx = RewriteContext::new(&table, &diagnostics);
        let (rewritten, changed) = info.rewrite(&ctx);
        assert!(changed);
        assert_eq!(rewritten[0].name, "cached");
        assert_eq!(
            rewritten[0].getter_signature.as_ref().unwrap().descriptor,
            "()La;"
        );
    }
}
