//! The host symbol table consumed by the read and write passes.
//!
//! The metadata layer never decides what gets renamed or removed. It asks a [`SymbolTable`]
//! for the post-shrink identity of every type and member it references, and reports members
//! whose original instructions must survive through a [`ByteCodeKeeper`].
//!
//! [`MappingSymbolTable`] is a ready-made table backed by concurrent maps, convenient for hosts
//! that compute their renaming up front and for tests.

use dashmap::{DashMap, DashSet};

use crate::host::{FieldRef, MethodRef, ProgramClass, TypeRef};

/// Read-only view of the host's renaming and pruning decisions.
///
/// The table is shared by all per-class tasks of a pass, hence the `Sync` bound. It is a
/// snapshot: nothing writes to it while a pass runs.
pub trait SymbolTable: Sync {
    /// Returns the post-shrink identity of a class type, or `None` if it was pruned.
    ///
    /// Only class types are passed here; primitives and arrays are decomposed by the caller.
    fn lookup_type(&self, ty: &TypeRef) -> Option<TypeRef>;

    /// Returns the post-shrink identity of a method, or `None` if it was pruned.
    fn lookup_method(&self, method: &MethodRef) -> Option<MethodRef>;

    /// Returns the post-shrink identity of a field, or `None` if it was pruned.
    fn lookup_field(&self, field: &FieldRef) -> Option<FieldRef>;

    /// Returns `true` if the class type was removed from the program.
    fn is_pruned(&self, ty: &TypeRef) -> bool {
        self.lookup_type(ty).is_none()
    }

    /// Returns `true` if the class type is pinned by a keep rule.
    fn is_kept(&self, ty: &TypeRef) -> bool;

    /// Returns `true` if the `@Metadata` annotation of `class` may be deleted outright.
    fn is_kotlin_metadata_removal_allowed(&self, class: &ProgramClass) -> bool;
}

/// Callback telling the host that a method's original instructions must be retained.
///
/// Inline functions are re-inlined by the Kotlin compiler from their bytecode, so shrinking
/// their body would break downstream consumers.
pub trait ByteCodeKeeper: Sync {
    /// Marks `method` as needing its original code.
    fn keep_byte_code(&self, method: &MethodRef);
}

impl<F> ByteCodeKeeper for F
where
    F: Fn(&MethodRef) + Sync,
{
    fn keep_byte_code(&self, method: &MethodRef) {
        self(method);
    }
}

/// A [`SymbolTable`] built from explicit renaming and pruning decisions.
///
/// Everything not mentioned maps to itself. Types are renamed as a whole (including nested
/// occurrences in method and field references); members are renamed by name.
///
/// # Examples
///
/// ```rust
/// use ktmeta::host::{MappingSymbolTable, SymbolTable, TypeRef};
///
/// let table = MappingSymbolTable::new();
/// table.rename_type(TypeRef::new("Lfoo/Bar;"), TypeRef::new("La/a;"));
/// table.prune(TypeRef::new("Lfoo/Unused;"));
///
/// assert_eq!(table.lookup_type(&TypeRef::new("Lfoo/Bar;")), Some(TypeRef::new("La/a;")));
/// assert!(table.is_pruned(&TypeRef::new("Lfoo/Unused;")));
/// ```
#[derive(Debug, Default)]
pub struct MappingSymbolTable {
    types: DashMap<TypeRef, TypeRef>,
    methods: DashMap<MethodRef, String>,
    fields: DashMap<FieldRef, String>,
    pruned: DashSet<TypeRef>,
    pruned_methods: DashSet<MethodRef>,
    pruned_fields: DashSet<FieldRef>,
    kept: DashSet<TypeRef>,
    metadata_removable: DashSet<TypeRef>,
}

impl MappingSymbolTable {
    /// Creates an identity table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renames the class type `from` to `to`.
    pub fn rename_type(&self, from: TypeRef, to: TypeRef) {
        self.types.insert(from, to);
    }

    /// Renames `method` to `name`.
    pub fn rename_method(&self, method: MethodRef, name: impl Into<String>) {
        self.methods.insert(method, name.into());
    }

    /// Renames `field` to `name`.
    pub fn rename_field(&self, field: FieldRef, name: impl Into<String>) {
        self.fields.insert(field, name.into());
    }

    /// Marks the class type as removed.
    pub fn prune(&self, ty: TypeRef) {
        self.pruned.insert(ty);
    }

    /// Marks the method as removed.
    pub fn prune_method(&self, method: MethodRef) {
        self.pruned_methods.insert(method);
    }

    /// Marks the field as removed.
    pub fn prune_field(&self, field: FieldRef) {
        self.pruned_fields.insert(field);
    }

    /// Pins the class type.
    pub fn keep(&self, ty: TypeRef) {
        self.kept.insert(ty);
    }

    /// Allows the `@Metadata` annotation of the class to be deleted.
    pub fn allow_metadata_removal(&self, ty: TypeRef) {
        self.metadata_removable.insert(ty);
    }

    /// Maps any type (primitive, array or class) through the renaming, keeping pruned or
    /// unknown types as they are.
    fn map_any(&self, ty: &TypeRef) -> TypeRef {
        let (dims, element) = ty.split_array();
        if !element.is_class_type() {
            return ty.clone();
        }
        match self.types.get(&element) {
            Some(renamed) => TypeRef::array_of(dims, renamed.value()),
            None => ty.clone(),
        }
    }
}

impl SymbolTable for MappingSymbolTable {
    fn lookup_type(&self, ty: &TypeRef) -> Option<TypeRef> {
        if self.pruned.contains(ty) {
            return None;
        }
        Some(
            self.types
                .get(ty)
                .map_or_else(|| ty.clone(), |renamed| renamed.value().clone()),
        )
    }

    fn lookup_method(&self, method: &MethodRef) -> Option<MethodRef> {
        if self.pruned_methods.contains(method) {
            return None;
        }
        let name = self
            .methods
            .get(method)
            .map_or_else(|| method.name.clone(), |name| name.value().clone());
        Some(MethodRef::new(
            self.map_any(&method.holder),
            name,
            method.parameters.iter().map(|p| self.map_any(p)).collect(),
            self.map_any(&method.return_type),
        ))
    }

    fn lookup_field(&self, field: &FieldRef) -> Option<FieldRef> {
        if self.pruned_fields.contains(field) {
            return None;
        }
        let name = self
            .fields
            .get(field)
            .map_or_else(|| field.name.clone(), |name| name.value().clone());
        Some(FieldRef::new(
            self.map_any(&field.holder),
            name,
            self.map_any(&field.field_type),
        ))
    }

    fn is_kept(&self, ty: &TypeRef) -> bool {
        self.kept.contains(ty)
    }

    fn is_kotlin_metadata_removal_allowed(&self, class: &ProgramClass) -> bool {
        self.metadata_removable.contains(&class.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_table() {
        let table = MappingSymbolTable::new();
        let ty = TypeRef::new("Lfoo/Bar;");
        assert_eq!(table.lookup_type(&ty), Some(ty.clone()));
        assert!(!table.is_pruned(&ty));
        assert!(!table.is_kept(&ty));
    }

    #[test]
    fn test_member_renaming() {
        let table = MappingSymbolTable::new();
        let holder = TypeRef::new("Lfoo/Bar;");
        let arg = TypeRef::new("[Lfoo/Arg;");
        table.rename_type(holder.clone(), TypeRef::new("La;"));
        table.rename_type(TypeRef::new("Lfoo/Arg;"), TypeRef::new("Lb;"));

        let method = MethodRef::new(holder.clone(), "run", vec![arg], TypeRef::new("V"));
        table.rename_method(method.clone(), "a");
        let renamed = table.lookup_method(&method).unwrap();
        assert_eq!(renamed.name, "a");
        assert_eq!(renamed.holder, TypeRef::new("La;"));
        assert_eq!(renamed.jvm_signature(), "a([Lb;)V");

        let field = FieldRef::new(holder, "x", TypeRef::new("I"));
        table.prune_field(field.clone());
        assert!(table.lookup_field(&field).is_none());
    }

    #[test]
    fn test_keeper_closure() {
        let kept = boxcar::Vec::new();
        let keeper = |method: &MethodRef| {
            kept.push(method.name.clone());
        };
        let method = MethodRef::new(TypeRef::new("LA;"), "f", vec![], TypeRef::new("V"));
        keeper.keep_byte_code(&method);
        assert_eq!(kept.count(), 1);
    }
}
