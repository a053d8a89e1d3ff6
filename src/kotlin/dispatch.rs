//! Mapping of `@Metadata` payloads onto class-level Infos and back.
//!
//! # Reading
//!
//! [`read_kotlin_info`] turns the annotation of one [`ProgramClass`] into a
//! [`KotlinClassLevelInfo`]:
//!
//! 1. parse the raw annotation into a [`MetadataHeader`]
//! 2. map `k` onto a [`MetadataKind`] (an unknown kind is a hard error)
//! 3. check the metadata version against [`RewriterConfig::max_supported_version`]
//! 4. decode the payload with the host's [`MetadataCodec`]
//! 5. build the Info for the decoded kind, binding declarations to members on the way
//!
//! Creation itself cannot fail: anything the Info model cannot interpret is kept verbatim.
//!
//! # Rewriting
//!
//! [`KotlinClassLevelInfo::rewrite`] produces the decoded tree to encode, together with
//! whether it differs from what was read. Classes without Kotlin info, or whose info could
//! not be read, produce nothing.

use crate::{
    config::RewriterConfig,
    host::{ProgramClass, TypeRef},
    km::{KotlinClassMetadata, MetadataCodec, MetadataHeader, MetadataKind},
    kotlin::{
        ClassInfo, FileFacadeInfo, MultiFileClassFacadeInfo, MultiFileClassPartInfo,
        ReadContext, RewriteContext, SyntheticClassInfo,
    },
    Error, Result,
};

/// The optional header fields a class was read with, written back on re-encoding when the
/// codec does not produce them itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetadataOrigin {
    /// `mv`
    pub metadata_version: Vec<i32>,
    /// `pn`
    pub package_name: Option<String>,
    /// `xi`
    pub extra_int: Option<i32>,
    /// `xs`
    pub extra_string: Option<String>,
}

impl MetadataOrigin {
    fn new(header: &MetadataHeader, metadata_version: Vec<i32>) -> Self {
        MetadataOrigin {
            metadata_version,
            package_name: header.package_name.clone(),
            extra_int: header.extra_int,
            extra_string: header.extra_string.clone(),
        }
    }
}

/// The Kotlin info of a class, by metadata kind.
#[derive(Debug, Clone, Default)]
pub enum KotlinClassLevelInfo {
    /// The class has no `@Metadata` annotation.
    #[default]
    NoKotlinInfo,
    /// The annotation could not be read; it is left untouched.
    InvalidKotlinInfo,
    /// `k = 1`
    Class(Box<ClassInfo>),
    /// `k = 2`
    FileFacade(Box<FileFacadeInfo>),
    /// `k = 3`
    SyntheticClass(Box<SyntheticClassInfo>),
    /// `k = 4`
    MultiFileClassPart(Box<MultiFileClassPartInfo>),
    /// `k = 5`
    MultiFileClassFacade(Box<MultiFileClassFacadeInfo>),
}

impl KotlinClassLevelInfo {
    /// Returns `true` if readable Kotlin info is attached.
    #[must_use]
    pub fn is_kotlin(&self) -> bool {
        self.kind().is_some()
    }

    /// The metadata kind of readable Kotlin info.
    #[must_use]
    pub fn kind(&self) -> Option<MetadataKind> {
        match self {
            KotlinClassLevelInfo::NoKotlinInfo | KotlinClassLevelInfo::InvalidKotlinInfo => None,
            KotlinClassLevelInfo::Class(_) => Some(MetadataKind::Class),
            KotlinClassLevelInfo::FileFacade(_) => Some(MetadataKind::FileFacade),
            KotlinClassLevelInfo::SyntheticClass(_) => Some(MetadataKind::SyntheticClass),
            KotlinClassLevelInfo::MultiFileClassPart(_) => Some(MetadataKind::MultiFileClassPart),
            KotlinClassLevelInfo::MultiFileClassFacade(_) => {
                Some(MetadataKind::MultiFileClassFacade)
            }
        }
    }

    /// The header fields the info was read with.
    #[must_use]
    pub fn origin(&self) -> Option<&MetadataOrigin> {
        match self {
            KotlinClassLevelInfo::NoKotlinInfo | KotlinClassLevelInfo::InvalidKotlinInfo => None,
            KotlinClassLevelInfo::Class(info) => Some(info.origin()),
            KotlinClassLevelInfo::FileFacade(info) => Some(info.origin()),
            KotlinClassLevelInfo::SyntheticClass(info) => Some(info.origin()),
            KotlinClassLevelInfo::MultiFileClassPart(info) => Some(info.origin()),
            KotlinClassLevelInfo::MultiFileClassFacade(info) => Some(info.origin()),
        }
    }

    /// Rewrites the info against the surviving members of `class`.
    ///
    /// Returns `None` for classes without readable Kotlin info.
    pub fn rewrite(
        &self,
        class: &ProgramClass,
        ctx: &RewriteContext,
    ) -> Option<(KotlinClassMetadata, bool)> {
        let rewritten = match self {
            KotlinClassLevelInfo::NoKotlinInfo | KotlinClassLevelInfo::InvalidKotlinInfo => {
                return None
            }
            KotlinClassLevelInfo::Class(info) => {
                let (km, changed) = info.rewrite(class, ctx);
                (KotlinClassMetadata::Class(km), changed)
            }
            KotlinClassLevelInfo::FileFacade(info) => {
                let (package, changed) = info.rewrite(class, ctx);
                (KotlinClassMetadata::FileFacade(package), changed)
            }
            KotlinClassLevelInfo::SyntheticClass(info) => {
                let (lambda, changed) = info.rewrite(class, ctx);
                (KotlinClassMetadata::SyntheticClass(lambda), changed)
            }
            KotlinClassLevelInfo::MultiFileClassPart(info) => {
                let (facade_class_name, package, changed) = info.rewrite(class, ctx);
                (
                    KotlinClassMetadata::MultiFileClassPart {
                        facade_class_name,
                        package,
                    },
                    changed,
                )
            }
            KotlinClassLevelInfo::MultiFileClassFacade(info) => {
                let (parts, changed) = info.rewrite(ctx);
                (KotlinClassMetadata::MultiFileClassFacade(parts), changed)
            }
        };
        Some(rewritten)
    }

    /// Reports every class the metadata of `class` references.
    pub fn trace(&self, class: &ProgramClass, f: &mut dyn FnMut(&TypeRef)) {
        match self {
            KotlinClassLevelInfo::NoKotlinInfo | KotlinClassLevelInfo::InvalidKotlinInfo => {}
            KotlinClassLevelInfo::Class(info) => info.trace(class, f),
            KotlinClassLevelInfo::FileFacade(info) => info.trace(class, f),
            KotlinClassLevelInfo::SyntheticClass(info) => info.trace(f),
            KotlinClassLevelInfo::MultiFileClassPart(info) => info.trace(class, f),
            KotlinClassLevelInfo::MultiFileClassFacade(info) => info.trace(f),
        }
    }
}

/// Reads the Kotlin info of `class` and binds its declarations to the class's members.
///
/// A class without a `@Metadata` annotation yields [`KotlinClassLevelInfo::NoKotlinInfo`].
///
/// # Errors
///
/// - [`Error::UnknownMetadataKind`] if `k` is outside `1..=5`
/// - [`Error::UnknownMetadataVersion`] if `mv` is missing or newer than supported
/// - [`Error::MissingElement`], [`Error::Malformed`] or [`Error::Codec`] if the annotation
///   or its payload cannot be read
pub fn read_kotlin_info(
    class: &mut ProgramClass,
    codec: &dyn MetadataCodec,
    config: &RewriterConfig,
    ctx: &ReadContext,
) -> Result<KotlinClassLevelInfo> {
    let Some(annotation) = class.metadata_annotation() else {
        return Ok(KotlinClassLevelInfo::NoKotlinInfo);
    };
    let header = MetadataHeader::from_annotation(annotation)?;
    let kind = MetadataKind::from_k(header.kind)?;
    let metadata_version = match &header.metadata_version {
        Some(version) if config.is_supported_version(version) => version.clone(),
        other => return Err(Error::UnknownMetadataVersion(other.clone().unwrap_or_default())),
    };

    let metadata = codec.decode(&header)?;
    if metadata.kind() != kind as i32 {
        return Err(malformed_error!(
            "Codec decoded kind {} for a header of kind {}",
            metadata.kind(),
            header.kind
        ));
    }

    let origin = MetadataOrigin::new(&header, metadata_version);
    let info = match metadata {
        KotlinClassMetadata::Class(km) => {
            KotlinClassLevelInfo::Class(Box::new(ClassInfo::create(&km, origin, class, ctx)))
        }
        KotlinClassMetadata::FileFacade(package) => KotlinClassLevelInfo::FileFacade(Box::new(
            FileFacadeInfo::create(&package, origin, class, ctx),
        )),
        KotlinClassMetadata::SyntheticClass(lambda) => KotlinClassLevelInfo::SyntheticClass(
            Box::new(SyntheticClassInfo::create(lambda.as_ref(), origin, class, ctx)),
        ),
        KotlinClassMetadata::MultiFileClassPart {
            facade_class_name,
            package,
        } => KotlinClassLevelInfo::MultiFileClassPart(Box::new(MultiFileClassPartInfo::create(
            &facade_class_name,
            &package,
            origin,
            class,
            ctx,
        ))),
        KotlinClassMetadata::MultiFileClassFacade(parts) => KotlinClassLevelInfo::MultiFileClassFacade(
            Box::new(MultiFileClassFacadeInfo::create(&parts, origin)),
        ),
    };
    Ok(info)
}
