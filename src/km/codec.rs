//! The boundary to the binary metadata codec.
//!
//! Reading and writing the protobuf-like `d1`/`d2` payload is not done by this crate. The
//! host supplies a [`MetadataCodec`] that turns a [`MetadataHeader`] into a decoded
//! [`KotlinClassMetadata`] tree and back.

use crate::{
    km::{KotlinClassMetadata, MetadataHeader},
    Error, Result,
};

/// Decodes and encodes `@Metadata` payloads.
///
/// Implementations are shared by every per-class task of a pass and must therefore be
/// [`Sync`]. They should be pure: encoding a freshly decoded tree with the same version must
/// reproduce `d1` and `d2` exactly, or unchanged classes would churn.
pub trait MetadataCodec: Sync {
    /// Decodes the payload described by `header`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Codec`] or [`crate::Error::Malformed`] if the payload cannot be
    /// decoded. The kind and version have already been validated by the caller.
    fn decode(&self, header: &MetadataHeader) -> Result<KotlinClassMetadata>;

    /// Encodes `metadata`, stamping it with `metadata_version`.
    ///
    /// The returned header carries `k`, `mv`, `d1`, `d2` and whatever `xs`, `pn` and `xi`
    /// the encoded tree implies.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Codec`] if the tree cannot be encoded.
    fn encode(
        &self,
        metadata: &KotlinClassMetadata,
        metadata_version: &[i32],
    ) -> Result<MetadataHeader>;
}

/// A [`MetadataCodec`] that keeps decoded trees in memory instead of serializing them.
///
/// `d1` holds the decimal index of the tree in an append-only table and `d2` is empty.
/// Encoding a tree equal to one already stored reuses its index, so re-encoding unchanged
/// metadata reproduces the original payload. Useful for hosts that hand over decoded trees
/// directly, for tests and for benchmarks.
#[derive(Debug, Default)]
pub struct MemoryCodec {
    trees: boxcar::Vec<KotlinClassMetadata>,
}

impl MemoryCodec {
    /// Creates an empty codec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct trees stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.count()
    }

    /// Returns `true` if nothing was encoded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.count() == 0
    }
}

impl MetadataCodec for MemoryCodec {
    fn decode(&self, header: &MetadataHeader) -> Result<KotlinClassMetadata> {
        let index = header
            .data1
            .first()
            .and_then(|d1| d1.parse::<usize>().ok())
            .ok_or_else(|| Error::Codec(format!("d1 {:?} is not a tree index", header.data1)))?;
        self.trees
            .get(index)
            .cloned()
            .ok_or_else(|| Error::Codec(format!("no tree stored at index {index}")))
    }

    fn encode(
        &self,
        metadata: &KotlinClassMetadata,
        metadata_version: &[i32],
    ) -> Result<MetadataHeader> {
        let index = match self.trees.iter().find(|(_, tree)| *tree == metadata) {
            Some((index, _)) => index,
            None => self.trees.push(metadata.clone()),
        };
        Ok(MetadataHeader {
            kind: metadata.kind(),
            metadata_version: Some(metadata_version.to_vec()),
            data1: vec![index.to_string()],
            ..MetadataHeader::default()
        })
    }
}
