//! Signature tables over one class body.

use std::collections::HashMap;

use crate::host::ProgramClass;

/// Maps JVM signatures to member positions within a single [`ProgramClass`].
///
/// Methods are keyed by `name(params)ret`, fields by `name:type`. Keys are not normalized;
/// if two members share a signature the later one wins. Built once per class at read time.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    methods: HashMap<String, usize>,
    fields: HashMap<String, usize>,
}

impl SymbolIndex {
    /// Indexes the members of `class`.
    #[must_use]
    pub fn new(class: &ProgramClass) -> Self {
        SymbolIndex {
            methods: class
                .methods
                .iter()
                .enumerate()
                .map(|(i, m)| (m.reference.jvm_signature(), i))
                .collect(),
            fields: class
                .fields
                .iter()
                .enumerate()
                .map(|(i, f)| (f.reference.jvm_signature(), i))
                .collect(),
        }
    }

    /// Position of the method with the given signature.
    #[must_use]
    pub fn method(&self, signature: &str) -> Option<usize> {
        self.methods.get(signature).copied()
    }

    /// Position of the field with the given signature.
    #[must_use]
    pub fn field(&self, signature: &str) -> Option<usize> {
        self.fields.get(signature).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FieldRef, MethodRef, TypeRef};

    #[test]
    fn test_index_lookup() {
        let holder = TypeRef::new("Lfoo/Bar;");
        let class = ProgramClass::new(holder.clone())
            .with_field(FieldRef::new(holder.clone(), "x", TypeRef::new("I")))
            .with_method(
                MethodRef::new(holder.clone(), "getX", vec![], TypeRef::new("I")),
                false,
            )
            .with_method(
                MethodRef::new(holder, "setX", vec![TypeRef::new("I")], TypeRef::new("V")),
                false,
            );
        let index = SymbolIndex::new(&class);

        assert_eq!(index.field("x:I"), Some(0));
        assert_eq!(index.method("getX()I"), Some(0));
        assert_eq!(index.method("setX(I)V"), Some(1));
        assert_eq!(index.method("getX()J"), None);
        assert_eq!(index.field("x"), None);
    }

    #[test]
    fn test_last_inserted_wins() {
        let holder = TypeRef::new("LA;");
        let method = MethodRef::new(holder.clone(), "f", vec![], TypeRef::new("V"));
        let class = ProgramClass::new(holder)
            .with_method(method.clone(), false)
            .with_method(method, true);
        let index = SymbolIndex::new(&class);
        assert_eq!(index.method("f()V"), Some(1));
    }
}
