//! The Info slots attached to bytecode members.
//!
//! Binding stores an [`Arc`] of the bound Info in the member's slot. A property bound to
//! several members shares one `Arc` between all of their slots, so the rewrite pass can
//! regroup the members of a property with [`Arc::ptr_eq`].

use std::sync::Arc;

use crate::kotlin::{ConstructorInfo, FunctionInfo, PropertyInfo};

/// The Kotlin declaration a method implements.
#[derive(Debug, Clone, Default)]
pub enum KotlinMethodLevelInfo {
    /// Not bound to any declaration.
    #[default]
    None,
    /// A constructor.
    Constructor(Arc<ConstructorInfo>),
    /// A function.
    Function(Arc<FunctionInfo>),
    /// An accessor or synthetic method of a property.
    Property(Arc<PropertyInfo>),
}

impl KotlinMethodLevelInfo {
    /// Returns `true` if the method is bound to a declaration.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        !matches!(self, KotlinMethodLevelInfo::None)
    }

    /// The bound function, if any.
    #[must_use]
    pub fn as_function(&self) -> Option<&Arc<FunctionInfo>> {
        match self {
            KotlinMethodLevelInfo::Function(function) => Some(function),
            _ => None,
        }
    }

    /// The bound property, if any.
    #[must_use]
    pub fn as_property(&self) -> Option<&Arc<PropertyInfo>> {
        match self {
            KotlinMethodLevelInfo::Property(property) => Some(property),
            _ => None,
        }
    }
}

/// The companion object instance field of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionInfo {
    /// The companion's declared name.
    pub companion_object_name: String,
}

/// The static field holding one enum entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntryInfo {
    /// The entry's declared name.
    pub enum_entry_name: String,
}

/// The Kotlin declaration a field implements.
#[derive(Debug, Clone, Default)]
pub enum KotlinFieldLevelInfo {
    /// Not bound to any declaration.
    #[default]
    None,
    /// The backing field of a property.
    Property(Arc<PropertyInfo>),
    /// The companion object field.
    Companion(CompanionInfo),
    /// An enum entry field.
    EnumEntry(EnumEntryInfo),
}

impl KotlinFieldLevelInfo {
    /// Returns `true` if the field is bound to a declaration.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        !matches!(self, KotlinFieldLevelInfo::None)
    }

    /// The bound property, if any.
    #[must_use]
    pub fn as_property(&self) -> Option<&Arc<PropertyInfo>> {
        match self {
            KotlinFieldLevelInfo::Property(property) => Some(property),
            _ => None,
        }
    }
}

/// Counts the members bound at read time so the rewrite can tell when some disappeared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MembersTracker {
    bound: usize,
}

impl MembersTracker {
    /// An empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one bound member.
    pub fn add(&mut self) {
        self.bound += 1;
    }

    /// Members bound at read time.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bound
    }

    /// Returns `true` if fewer (or more) members survived than were bound.
    #[must_use]
    pub fn has_changed(&self, surviving: usize) -> bool {
        self.bound != surviving
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker() {
        let mut tracker = MembersTracker::new();
        tracker.add();
        tracker.add();
        assert_eq!(tracker.count(), 2);
        assert!(!tracker.has_changed(2));
        assert!(tracker.has_changed(1));
    }

    #[test]
    fn test_default_slots_unbound() {
        assert!(!KotlinMethodLevelInfo::default().is_bound());
        assert!(!KotlinFieldLevelInfo::default().is_bound());
        let companion = KotlinFieldLevelInfo::Companion(CompanionInfo {
            companion_object_name: "Companion".to_string(),
        });
        assert!(companion.is_bound());
        assert!(companion.as_property().is_none());
    }
}
