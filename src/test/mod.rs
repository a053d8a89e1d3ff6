//! Shared fixtures for unit tests.

use crate::{
    config::RewriterConfig,
    host::{Annotation, ProgramClass, TypeRef},
    km::{KotlinClassMetadata, MetadataCodec},
};

/// Encodes `metadata` with `codec` and wraps it in a `kotlin.Metadata` annotation the way
/// the Kotlin compiler writes it.
pub fn metadata_annotation(
    codec: &dyn MetadataCodec,
    metadata: &KotlinClassMetadata,
    version: &[i32],
) -> Annotation {
    let header = codec
        .encode(metadata, version)
        .expect("test metadata must encode");
    header.to_annotation(&RewriterConfig::default())
}

/// A class of type `descriptor` carrying `metadata`.
pub fn kotlin_class(
    codec: &dyn MetadataCodec,
    descriptor: &str,
    metadata: &KotlinClassMetadata,
) -> ProgramClass {
    ProgramClass::new(TypeRef::new(descriptor)).with_annotation(metadata_annotation(
        codec,
        metadata,
        &[1, 8, 0],
    ))
}
