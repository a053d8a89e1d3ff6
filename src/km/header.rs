//! The `kotlin.Metadata` annotation and its raw payload.
//!
//! A compiled Kotlin class carries its metadata as a class-file annotation of type
//! `kotlin/Metadata` with these elements:
//!
//! | Element | Type       | Meaning                                   |
//! |---------|------------|-------------------------------------------|
//! | `k`     | `int`      | class kind, see [`MetadataKind`]          |
//! | `mv`    | `int[]`    | metadata version                          |
//! | `bv`    | `int[]`    | bytecode version (written, never read)    |
//! | `d1`    | `String[]` | encoded declarations                      |
//! | `d2`    | `String[]` | string table                              |
//! | `xs`    | `String`   | extra string (facade class name, ...)     |
//! | `pn`    | `String`   | fully qualified package name              |
//! | `xi`    | `int`      | extra flags                               |
//!
//! [`MetadataHeader`] is the typed view of those elements handed to the codec. Optional
//! elements that are absent stay `None`; they are never defaulted to zero or empty.

use strum::{EnumCount, EnumIter, IntoEnumIterator};

use crate::{
    config::{RewriterConfig, BYTECODE_VERSION},
    host::{descriptor::KOTLIN_METADATA_DESCRIPTOR, Annotation, AnnotationElement, AnnotationValue, TypeRef},
    Error, Result,
};

/// The class kinds a `@Metadata` annotation can describe, keyed by `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum MetadataKind {
    /// A class, interface, object or annotation class.
    Class = 1,
    /// The facade class of a single `.kt` file.
    FileFacade = 2,
    /// A synthetic class, such as a lambda or `WhenMappings`.
    SyntheticClass = 3,
    /// One file's part of a `@JvmMultifileClass`.
    MultiFileClassPart = 4,
    /// The facade of a `@JvmMultifileClass`.
    MultiFileClassFacade = 5,
}

impl MetadataKind {
    /// Maps a raw `k` value onto a kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMetadataKind`] for values outside `1..=5`.
    pub fn from_k(k: i32) -> Result<Self> {
        MetadataKind::iter()
            .find(|kind| *kind as i32 == k)
            .ok_or(Error::UnknownMetadataKind(k))
    }
}

/// The raw payload of a `@Metadata` annotation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetadataHeader {
    /// `k`
    pub kind: i32,
    /// `mv`
    pub metadata_version: Option<Vec<i32>>,
    /// `bv`
    pub bytecode_version: Option<Vec<i32>>,
    /// `d1`
    pub data1: Vec<String>,
    /// `d2`
    pub data2: Vec<String>,
    /// `xs`
    pub extra_string: Option<String>,
    /// `pn`
    pub package_name: Option<String>,
    /// `xi`
    pub extra_int: Option<i32>,
}

fn expect_int(name: &str, value: &AnnotationValue) -> Result<i32> {
    match value {
        AnnotationValue::Int(v) => Ok(*v),
        other => Err(malformed_error!(
            "@Metadata element '{}' must be an int, found {:?}",
            name,
            other
        )),
    }
}

fn expect_string(name: &str, value: &AnnotationValue) -> Result<String> {
    match value {
        AnnotationValue::String(v) => Ok(v.clone()),
        other => Err(malformed_error!(
            "@Metadata element '{}' must be a string, found {:?}",
            name,
            other
        )),
    }
}

fn expect_array<T>(
    name: &str,
    value: &AnnotationValue,
    element: fn(&str, &AnnotationValue) -> Result<T>,
) -> Result<Vec<T>> {
    match value {
        AnnotationValue::Array(values) => values.iter().map(|v| element(name, v)).collect(),
        other => Err(malformed_error!(
            "@Metadata element '{}' must be an array, found {:?}",
            name,
            other
        )),
    }
}

impl MetadataHeader {
    /// Reads the header from a `kotlin.Metadata` annotation.
    ///
    /// Unknown elements are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingElement`] when `k` or `d1` is absent and [`Error::Malformed`]
    /// when an element has the wrong shape.
    pub fn from_annotation(annotation: &Annotation) -> Result<Self> {
        if !annotation.is_kotlin_metadata() {
            return Err(malformed_error!(
                "Expected a kotlin.Metadata annotation, found {}",
                annotation.ty
            ));
        }

        let kind = annotation
            .element("k")
            .ok_or(Error::MissingElement("k"))
            .and_then(|v| expect_int("k", v))?;
        let data1 = annotation
            .element("d1")
            .ok_or(Error::MissingElement("d1"))
            .and_then(|v| expect_array("d1", v, expect_string))?;
        let data2 = match annotation.element("d2") {
            Some(v) => expect_array("d2", v, expect_string)?,
            None => Vec::new(),
        };

        Ok(MetadataHeader {
            kind,
            metadata_version: annotation
                .element("mv")
                .map(|v| expect_array("mv", v, expect_int))
                .transpose()?,
            bytecode_version: annotation
                .element("bv")
                .map(|v| expect_array("bv", v, expect_int))
                .transpose()?,
            data1,
            data2,
            extra_string: annotation
                .element("xs")
                .map(|v| expect_string("xs", v))
                .transpose()?,
            package_name: annotation
                .element("pn")
                .map(|v| expect_string("pn", v))
                .transpose()?,
            extra_int: annotation
                .element("xi")
                .map(|v| expect_int("xi", v))
                .transpose()?,
        })
    }

    /// Builds a `kotlin.Metadata` annotation from this header.
    ///
    /// Element order is `k`, `mv`, `bv`, `d1`, `d2`, `xs`, `pn`, `xi`. Optional elements are
    /// written only when set, non-empty and enabled in `config`.
    #[must_use]
    pub fn to_annotation(&self, config: &RewriterConfig) -> Annotation {
        let ints = |values: &[i32]| {
            AnnotationValue::Array(values.iter().map(|v| AnnotationValue::Int(*v)).collect())
        };
        let strings = |values: &[String]| {
            AnnotationValue::Array(
                values
                    .iter()
                    .map(|v| AnnotationValue::String(v.clone()))
                    .collect(),
            )
        };

        let mut elements = vec![AnnotationElement::new("k", AnnotationValue::Int(self.kind))];
        if let Some(mv) = &self.metadata_version {
            elements.push(AnnotationElement::new("mv", ints(mv)));
        }
        if config.write_bytecode_version {
            elements.push(AnnotationElement::new("bv", ints(&BYTECODE_VERSION)));
        }
        elements.push(AnnotationElement::new("d1", strings(&self.data1)));
        elements.push(AnnotationElement::new("d2", strings(&self.data2)));
        if config.write_extra_string {
            if let Some(xs) = self.extra_string.as_ref().filter(|xs| !xs.is_empty()) {
                elements.push(AnnotationElement::new(
                    "xs",
                    AnnotationValue::String(xs.clone()),
                ));
            }
        }
        if config.write_package_name {
            if let Some(pn) = self.package_name.as_ref().filter(|pn| !pn.is_empty()) {
                elements.push(AnnotationElement::new(
                    "pn",
                    AnnotationValue::String(pn.clone()),
                ));
            }
        }
        if config.write_extra_int {
            if let Some(xi) = self.extra_int.filter(|xi| *xi != 0) {
                elements.push(AnnotationElement::new("xi", AnnotationValue::Int(xi)));
            }
        }

        Annotation::new(TypeRef::new(KOTLIN_METADATA_DESCRIPTOR), elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(elements: Vec<AnnotationElement>) -> Annotation {
        Annotation::new(TypeRef::new(KOTLIN_METADATA_DESCRIPTOR), elements)
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(MetadataKind::COUNT, 5);
        assert_eq!(MetadataKind::from_k(1).unwrap(), MetadataKind::Class);
        assert_eq!(
            MetadataKind::from_k(5).unwrap(),
            MetadataKind::MultiFileClassFacade
        );
        assert!(matches!(
            MetadataKind::from_k(6),
            Err(Error::UnknownMetadataKind(6))
        ));
        assert!(matches!(
            MetadataKind::from_k(0),
            Err(Error::UnknownMetadataKind(0))
        ));
    }

    #[test]
    fn test_optional_elements_absent() {
        let annotation = metadata(vec![
            AnnotationElement::new("k", AnnotationValue::Int(2)),
            AnnotationElement::new("d1", AnnotationValue::Array(vec![])),
        ]);
        let header = MetadataHeader::from_annotation(&annotation).unwrap();
        assert_eq!(header.kind, 2);
        assert!(header.metadata_version.is_none());
        assert!(header.extra_string.is_none());
        assert!(header.package_name.is_none());
        assert!(header.extra_int.is_none());
        assert!(header.data2.is_empty());
    }

    #[test]
    fn test_missing_required() {
        let annotation = metadata(vec![AnnotationElement::new("k", AnnotationValue::Int(1))]);
        assert!(matches!(
            MetadataHeader::from_annotation(&annotation),
            Err(Error::MissingElement("d1"))
        ));
        let annotation = metadata(vec![AnnotationElement::new(
            "d1",
            AnnotationValue::Array(vec![]),
        )]);
        assert!(matches!(
            MetadataHeader::from_annotation(&annotation),
            Err(Error::MissingElement("k"))
        ));
    }

    #[test]
    fn test_wrong_shape() {
        let annotation = metadata(vec![
            AnnotationElement::new("k", AnnotationValue::String("1".to_string())),
            AnnotationElement::new("d1", AnnotationValue::Array(vec![])),
        ]);
        assert!(matches!(
            MetadataHeader::from_annotation(&annotation),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_to_annotation() {
        let header = MetadataHeader {
            kind: 1,
            metadata_version: Some(vec![1, 8, 0]),
            bytecode_version: None,
            data1: vec!["x".to_string()],
            data2: vec!["Foo".to_string()],
            extra_string: Some(String::new()),
            package_name: Some("foo".to_string()),
            extra_int: Some(48),
        };
        let annotation = header.to_annotation(&RewriterConfig::default());
        let names: Vec<_> = annotation.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["k", "mv", "bv", "d1", "d2", "pn", "xi"]);

        let read = MetadataHeader::from_annotation(&annotation).unwrap();
        assert_eq!(read.bytecode_version, Some(BYTECODE_VERSION.to_vec()));
        assert_eq!(read.extra_string, None);
        assert_eq!(read.extra_int, Some(48));

        let stripped = header.to_annotation(&RewriterConfig::stripping());
        assert!(stripped.element("pn").is_none());
    }
}
