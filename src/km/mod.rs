//! Decoded Kotlin metadata and the codec boundary.
//!
//! The `km` layer is what the external binary codec speaks: a [`MetadataHeader`] holds the
//! raw `@Metadata` elements, and a [`KotlinClassMetadata`] holds the decoded declaration
//! tree. The Info model in [`crate::kotlin`] is built from these trees at read time and
//! produces new ones at write time.
//!
//! # Key Components
//!
//! - [`MetadataHeader`] / [`MetadataKind`] - the annotation payload and its `k` discriminant
//! - [`KotlinClassMetadata`] and the `Km*` types - the plain-data declaration tree
//! - [`MetadataCodec`] - decode/encode contract implemented by the host, and the in-memory
//!   [`MemoryCodec`]
//! - [`flags`] - named bits of the Kotlin flag words
//! - [`printer`] - textual rendering of a decoded tree

mod codec;
pub mod flags;
mod header;
mod model;
pub mod printer;

pub use codec::{MemoryCodec, MetadataCodec};
pub use header::{MetadataHeader, MetadataKind};
pub use model::{
    JvmFieldSignature, JvmMethodSignature, KmAnnotation, KmAnnotationArgument, KmClass,
    KmClassifier, KmConstantValue, KmConstructor, KmContract, KmEffect, KmEffectExpression,
    KmEffectInvocationKind, KmEffectType, KmFlexibleTypeUpperBound, KmFunction, KmLambda,
    KmPackage, KmProperty, KmType, KmTypeAlias, KmTypeParameter, KmTypeProjection,
    KmValueParameter, KmVariance, KmVersion, KmVersionKind, KmVersionLevel, KmVersionRequirement,
    KotlinClassMetadata,
};
