//! Per-class state threaded through Info creation and rewriting.

use crate::{
    diagnostics::{DiagnosticCategory, Diagnostics},
    host::{ByteCodeKeeper, FieldRef, MethodRef, SymbolTable, TypeRef},
};

/// What Info creation needs besides the decoded tree: where to report, whom to tell about
/// byte code that must be kept, and which class is being read.
pub struct ReadContext<'a> {
    keeper: &'a dyn ByteCodeKeeper,
    diagnostics: &'a Diagnostics,
    class: TypeRef,
}

impl<'a> ReadContext<'a> {
    /// Creates a context for reading the metadata of `class`.
    pub fn new(keeper: &'a dyn ByteCodeKeeper, diagnostics: &'a Diagnostics, class: TypeRef) -> Self {
        ReadContext {
            keeper,
            diagnostics,
            class,
        }
    }

    /// The class whose metadata is being read.
    pub fn class(&self) -> &TypeRef {
        &self.class
    }

    /// Tells the host to keep the original instructions of `method`.
    pub fn keep_byte_code(&self, method: &MethodRef) {
        self.keeper.keep_byte_code(method);
    }

    /// Records a warning about the current class.
    pub fn warning(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.diagnostics
            .warning_for(category, self.class.descriptor(), message);
    }
}

/// The renaming view used while rewriting.
///
/// Wraps the host [`SymbolTable`] and extends type lookup to primitives and arrays.
pub struct RewriteContext<'a> {
    symbols: &'a dyn SymbolTable,
    diagnostics: &'a Diagnostics,
}

impl<'a> RewriteContext<'a> {
    /// Creates a rewrite context over `symbols`.
    pub fn new(symbols: &'a dyn SymbolTable, diagnostics: &'a Diagnostics) -> Self {
        RewriteContext {
            symbols,
            diagnostics,
        }
    }

    /// The post-shrink identity of any type, or `None` if it (or its array element) was
    /// pruned. Primitive types and `V` map to themselves.
    pub fn lookup_type(&self, ty: &TypeRef) -> Option<TypeRef> {
        let (dims, element) = ty.split_array();
        if !element.is_class_type() {
            return Some(ty.clone());
        }
        let renamed = self.symbols.lookup_type(&element)?;
        Some(if dims == 0 {
            renamed
        } else {
            TypeRef::array_of(dims, &renamed)
        })
    }

    /// The post-shrink identity of a method, or `None` if it was pruned.
    pub fn lookup_method(&self, method: &MethodRef) -> Option<MethodRef> {
        self.symbols.lookup_method(method)
    }

    /// The post-shrink identity of a field, or `None` if it was pruned.
    pub fn lookup_field(&self, field: &FieldRef) -> Option<FieldRef> {
        self.symbols.lookup_field(field)
    }

    /// The diagnostics sink of the current pass.
    pub fn diagnostics(&self) -> &Diagnostics {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MappingSymbolTable;

    #[test]
    fn test_lookup_any_type() {
        let table = MappingSymbolTable::new();
        table.rename_type(TypeRef::new("Lfoo/A;"), TypeRef::new("La;"));
        table.prune(TypeRef::new("Lfoo/Gone;"));
        let diagnostics = Diagnostics::new();
        let ctx = RewriteContext::new(&table, &diagnostics);

        assert_eq!(ctx.lookup_type(&TypeRef::new("I")), Some(TypeRef::new("I")));
        assert_eq!(
            ctx.lookup_type(&TypeRef::new("[[Lfoo/A;")),
            Some(TypeRef::new("[[La;"))
        );
        assert_eq!(ctx.lookup_type(&TypeRef::new("[Lfoo/Gone;")), None);
        assert_eq!(ctx.lookup_type(&TypeRef::new("Lfoo/Gone;")), None);
    }
}
