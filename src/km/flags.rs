//! Kotlin declaration flag words.
//!
//! Kotlin metadata packs visibility, modality and a handful of booleans into one `u32` per
//! declaration. The decoded tree keeps the raw word so that unknown bits survive a rewrite;
//! these types name the bits the rewriter actually inspects.
//!
//! Visibility occupies bits 1-3 and modality bits 4-5 of every declaration word. They are
//! exposed as masks rather than flags since they are small integers, not booleans.

use bitflags::bitflags;

/// Mask of the visibility field common to all declarations.
pub const VISIBILITY_MASK: u32 = 0b111 << 1;

/// Mask of the modality field common to all declarations.
pub const MODALITY_MASK: u32 = 0b11 << 4;

bitflags! {
    /// Flags of a class declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClassFlags: u32 {
        /// The class has annotations.
        const HAS_ANNOTATIONS = 1;
        /// `inner class`
        const IS_INNER = 1 << 9;
        /// `data class`
        const IS_DATA = 1 << 10;
        /// `external class`
        const IS_EXTERNAL = 1 << 11;
        /// `expect class`
        const IS_EXPECT = 1 << 12;
        /// `value class`
        const IS_VALUE = 1 << 13;
        /// `fun interface`
        const IS_FUN = 1 << 14;
    }

    /// Flags of a function declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FunctionFlags: u32 {
        /// The function has annotations.
        const HAS_ANNOTATIONS = 1;
        /// `operator fun`
        const IS_OPERATOR = 1 << 8;
        /// `infix fun`
        const IS_INFIX = 1 << 9;
        /// `inline fun`
        const IS_INLINE = 1 << 10;
        /// `tailrec fun`
        const IS_TAILREC = 1 << 11;
        /// `external fun`
        const IS_EXTERNAL = 1 << 12;
        /// `suspend fun`
        const IS_SUSPEND = 1 << 13;
        /// `expect fun`
        const IS_EXPECT = 1 << 14;
    }

    /// Flags of a constructor declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConstructorFlags: u32 {
        /// The constructor has annotations.
        const HAS_ANNOTATIONS = 1;
        /// Not the primary constructor.
        const IS_SECONDARY = 1 << 4;
    }

    /// Flags of a property declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyFlags: u32 {
        /// The property has annotations.
        const HAS_ANNOTATIONS = 1;
        /// `var`
        const IS_VAR = 1 << 8;
        /// The property has a getter.
        const HAS_GETTER = 1 << 9;
        /// The property has a setter.
        const HAS_SETTER = 1 << 10;
        /// `const val`
        const IS_CONST = 1 << 11;
        /// `lateinit var`
        const IS_LATEINIT = 1 << 12;
        /// The property has a compile-time constant initializer.
        const HAS_CONSTANT = 1 << 13;
        /// `external val`
        const IS_EXTERNAL = 1 << 14;
        /// `val x by delegate`
        const IS_DELEGATED = 1 << 15;
        /// `expect val`
        const IS_EXPECT = 1 << 16;
    }

    /// Flags of a property getter or setter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessorFlags: u32 {
        /// The accessor has annotations.
        const HAS_ANNOTATIONS = 1;
        /// The accessor has a body.
        const IS_NOT_DEFAULT = 1 << 6;
        /// `external get()`
        const IS_EXTERNAL = 1 << 7;
        /// `inline get()`
        const IS_INLINE = 1 << 8;
    }

    /// Flags of a value parameter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ValueParameterFlags: u32 {
        /// The parameter has annotations.
        const HAS_ANNOTATIONS = 1;
        /// The parameter declares a default value.
        const DECLARES_DEFAULT_VALUE = 1 << 1;
        /// `crossinline`
        const IS_CROSSINLINE = 1 << 2;
        /// `noinline`
        const IS_NOINLINE = 1 << 3;
    }

    /// Flags of a type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        /// `T?`
        const IS_NULLABLE = 1;
        /// `suspend () -> Unit`
        const IS_SUSPEND = 1 << 1;
        /// `T & Any`
        const IS_DEFINITELY_NON_NULL = 1 << 2;
    }

    /// Flags of a type parameter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeParameterFlags: u32 {
        /// `reified T`
        const IS_REIFIED = 1;
    }
}

impl FunctionFlags {
    /// Interprets a raw function flag word.
    #[must_use]
    pub fn of(raw: u32) -> Self {
        Self::from_bits_retain(raw)
    }
}

impl PropertyFlags {
    /// Interprets a raw property flag word.
    #[must_use]
    pub fn of(raw: u32) -> Self {
        Self::from_bits_retain(raw)
    }
}

impl AccessorFlags {
    /// Interprets a raw accessor flag word.
    #[must_use]
    pub fn of(raw: u32) -> Self {
        Self::from_bits_retain(raw)
    }
}

impl ValueParameterFlags {
    /// Interprets a raw value parameter flag word.
    #[must_use]
    pub fn of(raw: u32) -> Self {
        Self::from_bits_retain(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_bits_survive() {
        let raw = FunctionFlags::IS_INLINE.bits() | VISIBILITY_MASK | (1 << 30);
        let flags = FunctionFlags::of(raw);
        assert!(flags.contains(FunctionFlags::IS_INLINE));
        assert_eq!(flags.bits(), raw);
    }

    #[test]
    fn test_property_flags() {
        let flags = PropertyFlags::of((1 << 15) | (1 << 9));
        assert!(flags.contains(PropertyFlags::IS_DELEGATED));
        assert!(flags.contains(PropertyFlags::HAS_GETTER));
        assert!(!flags.contains(PropertyFlags::HAS_SETTER));
        assert!(AccessorFlags::of(1 << 8).contains(AccessorFlags::IS_INLINE));
        assert!(ValueParameterFlags::of(2).contains(ValueParameterFlags::DECLARES_DEFAULT_VALUE));
    }
}
