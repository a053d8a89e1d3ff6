//! JVM descriptor and Kotlin classifier string conversions.
//!
//! Three textual conventions meet in Kotlin metadata:
//!
//! - **Descriptors** as found in class files: `Lkotlin/collections/Map$Entry;`, `I`, `[J`
//! - **Binary names** with `/` package separators: `kotlin/collections/Map$Entry`
//! - **Kotlin classifiers** with `.` as the nesting separator: `kotlin/collections/Map.Entry`
//!
//! Local and anonymous classes are written in classifier form with a leading `.`
//! (`.kotlin/random/FallbackThreadLocalRandom$implStorage$1`) so that the Kotlin compiler
//! does not try to resolve them by name.
//!
//! All functions here are total: invalid input is reported through `Option`/`bool` and never
//! panics, since metadata strings come straight from untrusted class files.

/// Descriptor of `java.lang.Object`, used when a JVM signature references a pruned type.
pub const JAVA_LANG_OBJECT_DESCRIPTOR: &str = "Ljava/lang/Object;";

/// Classifier of `kotlin.Any`, used when a Kotlin type references a pruned class.
pub const KOTLIN_ANY_CLASSIFIER: &str = "kotlin/Any";

/// Descriptor of `kotlin.Any`.
pub const KOTLIN_ANY_DESCRIPTOR: &str = "Lkotlin/Any;";

/// Descriptor of the `kotlin.Metadata` annotation class.
pub const KOTLIN_METADATA_DESCRIPTOR: &str = "Lkotlin/Metadata;";

/// Separator between an outer and an inner class in binary names.
pub const INNER_CLASS_SEPARATOR: char = '$';

/// Separator between an outer and an inner class in Kotlin classifiers.
pub const KOTLIN_NESTING_SEPARATOR: char = '.';

/// Returns the length of the leading field-type descriptor in `desc`, if any.
///
/// `V` is only accepted when `allow_void` is set (method return types).
fn leading_descriptor_len(desc: &str, allow_void: bool) -> Option<usize> {
    let bytes = desc.as_bytes();
    match *bytes.first()? {
        b'Z' | b'B' | b'C' | b'S' | b'I' | b'J' | b'F' | b'D' => Some(1),
        b'V' if allow_void => Some(1),
        b'L' => {
            let end = desc.find(';')?;
            if is_valid_binary_name(&desc[1..end]) {
                Some(end + 1)
            } else {
                None
            }
        }
        b'[' => {
            let mut dims = 0;
            while bytes.get(dims) == Some(&b'[') {
                dims += 1;
            }
            if dims > 255 {
                return None;
            }
            leading_descriptor_len(&desc[dims..], false).map(|len| len + dims)
        }
        _ => None,
    }
}

/// Returns `true` if `name` is a plausible JVM binary name such as `foo/Bar$Baz`.
///
/// Every `/`-separated segment must be non-empty and free of the characters the JVM
/// specification reserves in unqualified names.
#[must_use]
pub fn is_valid_binary_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('/').all(|segment| {
            !segment.is_empty()
                && !segment
                    .chars()
                    .any(|c| matches!(c, '.' | ';' | '[' | '<' | '>' | ':'))
        })
}

/// Returns `true` if `desc` is exactly one well-formed field type descriptor.
#[must_use]
pub fn is_valid_type_descriptor(desc: &str) -> bool {
    leading_descriptor_len(desc, false) == Some(desc.len())
}

/// Returns `true` if `desc` is a class type descriptor (`L...;`).
#[must_use]
pub fn is_class_descriptor(desc: &str) -> bool {
    desc.starts_with('L') && is_valid_type_descriptor(desc)
}

/// Returns `true` if `desc` is an array type descriptor.
#[must_use]
pub fn is_array_descriptor(desc: &str) -> bool {
    desc.starts_with('[') && is_valid_type_descriptor(desc)
}

/// Splits a method descriptor into its parameter descriptors and return descriptor.
///
/// Returns `None` if the descriptor is not well formed.
///
/// # Examples
///
/// ```rust
/// use ktmeta::host::descriptor::split_method_descriptor;
///
/// let (params, ret) = split_method_descriptor("(I[Ljava/lang/String;)V").unwrap();
/// assert_eq!(params, vec!["I", "[Ljava/lang/String;"]);
/// assert_eq!(ret, "V");
/// ```
#[must_use]
pub fn split_method_descriptor(desc: &str) -> Option<(Vec<&str>, &str)> {
    let rest = desc.strip_prefix('(')?;
    let close = rest.find(')')?;
    let mut params_str = &rest[..close];
    let ret = &rest[close + 1..];

    let mut params = Vec::new();
    while !params_str.is_empty() {
        let len = leading_descriptor_len(params_str, false)?;
        params.push(&params_str[..len]);
        params_str = &params_str[len..];
    }

    if leading_descriptor_len(ret, true) != Some(ret.len()) {
        return None;
    }
    Some((params, ret))
}

/// Returns `true` if `desc` is a well-formed method descriptor.
#[must_use]
pub fn is_valid_method_descriptor(desc: &str) -> bool {
    split_method_descriptor(desc).is_some()
}

/// Converts a class descriptor to its binary name (`Lfoo/Bar;` to `foo/Bar`).
///
/// Non-class descriptors are returned unchanged.
#[must_use]
pub fn descriptor_to_binary_name(desc: &str) -> &str {
    desc.strip_prefix('L')
        .and_then(|inner| inner.strip_suffix(';'))
        .unwrap_or(desc)
}

/// Converts a binary name to a class descriptor (`foo/Bar` to `Lfoo/Bar;`).
#[must_use]
pub fn binary_name_to_descriptor(name: &str) -> String {
    format!("L{name};")
}

/// Converts a Kotlin classifier to a class descriptor.
///
/// `kotlin/collections/Map.Entry` becomes `Lkotlin/collections/Map$Entry;`.
#[must_use]
pub fn kotlin_classifier_to_descriptor(classifier: &str) -> String {
    binary_name_to_descriptor(&classifier.replace(KOTLIN_NESTING_SEPARATOR, "$"))
}

/// Converts a class descriptor to a Kotlin classifier.
///
/// `Lkotlin/collections/Map$Entry;` becomes `kotlin/collections/Map.Entry`.
#[must_use]
pub fn descriptor_to_kotlin_classifier(desc: &str) -> String {
    descriptor_to_binary_name(desc).replace(INNER_CLASS_SEPARATOR, ".")
}

/// Returns the simple (unqualified) part of a binary name.
#[must_use]
pub fn simple_name_of_binary_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Returns `true` for Kotlin types that the compiler resolves by convention.
///
/// Function types (`kotlin/Function3`, `kotlin/jvm/functions/Function1`, their suspend and
/// reflective variants) are synthesized by the Kotlin compiler and never exist as real classes
/// in the program. A shrinker sees them as pruned, but their descriptor must survive verbatim.
#[must_use]
pub fn is_statically_known_kotlin_type(desc: &str) -> bool {
    const PREFIXES: [&str; 6] = [
        "Lkotlin/Function",
        "Lkotlin/jvm/functions/Function",
        "Lkotlin/coroutines/SuspendFunction",
        "Lkotlin/reflect/KFunction",
        "Lkotlin/reflect/KSuspendFunction",
        "Lkotlin/SuspendFunction",
    ];
    let Some(body) = desc.strip_suffix(';') else {
        return false;
    };
    PREFIXES.iter().any(|prefix| {
        body.strip_prefix(prefix)
            .is_some_and(|arity| arity.is_empty() || arity.bytes().all(|b| b.is_ascii_digit()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_descriptors() {
        assert!(is_valid_type_descriptor("I"));
        assert!(is_valid_type_descriptor("[[J"));
        assert!(is_valid_type_descriptor("Lfoo/Bar$Baz;"));
        assert!(!is_valid_type_descriptor("V"));
        assert!(!is_valid_type_descriptor("Lfoo/Bar"));
        assert!(!is_valid_type_descriptor("L;"));
        assert!(!is_valid_type_descriptor("Lfoo.Bar;"));
        assert!(!is_valid_type_descriptor("II"));
        assert!(is_class_descriptor("Lkotlin/Any;"));
        assert!(!is_class_descriptor("[Lkotlin/Any;"));
        assert!(is_array_descriptor("[Lkotlin/Any;"));
    }

    #[test]
    fn test_method_descriptors() {
        let (params, ret) = split_method_descriptor("(IJLfoo/Bar;[[Z)Lfoo/Baz;").unwrap();
        assert_eq!(params, vec!["I", "J", "Lfoo/Bar;", "[[Z"]);
        assert_eq!(ret, "Lfoo/Baz;");

        assert!(is_valid_method_descriptor("()V"));
        assert!(!is_valid_method_descriptor("(V)V"));
        assert!(!is_valid_method_descriptor("(I"));
        assert!(!is_valid_method_descriptor("()"));
        assert!(!is_valid_method_descriptor("(Lfoo;)VV"));
        assert!(!is_valid_method_descriptor("I)V"));
    }

    #[test]
    fn test_name_conversions() {
        assert_eq!(descriptor_to_binary_name("Lfoo/Bar$Baz;"), "foo/Bar$Baz");
        assert_eq!(descriptor_to_binary_name("I"), "I");
        assert_eq!(binary_name_to_descriptor("foo/Bar"), "Lfoo/Bar;");
        assert_eq!(
            kotlin_classifier_to_descriptor("kotlin/collections/Map.Entry"),
            "Lkotlin/collections/Map$Entry;"
        );
        assert_eq!(
            descriptor_to_kotlin_classifier("Lkotlin/collections/Map$Entry;"),
            "kotlin/collections/Map.Entry"
        );
        assert_eq!(simple_name_of_binary_name("foo/bar/Baz"), "Baz");
        assert_eq!(simple_name_of_binary_name("Baz"), "Baz");
    }

    #[test]
    fn test_binary_names() {
        assert!(is_valid_binary_name("foo/Bar$1"));
        assert!(!is_valid_binary_name(""));
        assert!(!is_valid_binary_name("foo//Bar"));
        assert!(!is_valid_binary_name("foo/Bar.Baz"));
    }

    #[test]
    fn test_statically_known_types() {
        assert!(is_statically_known_kotlin_type("Lkotlin/Function1;"));
        assert!(is_statically_known_kotlin_type("Lkotlin/Function;"));
        assert!(is_statically_known_kotlin_type("Lkotlin/jvm/functions/Function22;"));
        assert!(is_statically_known_kotlin_type("Lkotlin/reflect/KSuspendFunction2;"));
        assert!(!is_statically_known_kotlin_type("Lkotlin/FunctionX;"));
        assert!(!is_statically_known_kotlin_type("Lkotlin/collections/List;"));
        assert!(!is_statically_known_kotlin_type("kotlin/Function1"));
    }
}
