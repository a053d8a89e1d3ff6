//! The two-pass driver over all program classes.
//!
//! [`KotlinMetadataRewriter`] is the entry point a host calls around its shrinking phase:
//!
//! 1. **Read pass** ([`KotlinMetadataRewriter::read_kotlin_metadata`]), before shrinking:
//!    every class's `@Metadata` annotation is decoded, turned into Infos and bound to the
//!    class's members. Inline functions report their byte code to the host's
//!    [`ByteCodeKeeper`].
//! 2. **Write pass** ([`KotlinMetadataRewriter::rewrite_kotlin_metadata`]), after shrinking
//!    and renaming: every class's Infos are rewritten through the host's [`SymbolTable`],
//!    re-encoded and written back into the annotation, or the annotation is removed when
//!    the host allows it.
//!
//! # Failure containment
//!
//! Per-class problems never abort a pass. Unreadable metadata degrades to
//! [`KotlinClassLevelInfo::InvalidKotlinInfo`] and is left untouched; a failed re-encoding
//! leaves the original annotation in place. Both are recorded in [`Diagnostics`] and
//! logged. Only [`Error::UnknownMetadataKind`] escapes the read pass.
//!
//! # Examples
//!
//! ```rust,ignore
//! use ktmeta::prelude::*;
//!
//! let rewriter = KotlinMetadataRewriter::new(&codec);
//! rewriter.read_kotlin_metadata(&mut classes, &|method: &MethodRef| keep(method))?;
//! // ... shrink and rename ...
//! let summary = rewriter.rewrite_kotlin_metadata(&mut classes, &symbol_table);
//! println!("{summary}");
//! ```
//!
//! # Thread Safety
//!
//! Both passes run on the rayon thread pool when [`RewriterConfig::parallel`] is set. Each
//! class is handled by exactly one task; the codec, keeper and symbol table are shared.

use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

use rayon::prelude::*;

use crate::{
    config::RewriterConfig,
    diagnostics::{DiagnosticCategory, Diagnostics},
    host::{ByteCodeKeeper, ProgramClass, SymbolTable},
    km::{KotlinClassMetadata, MetadataCodec, MetadataHeader},
    kotlin::{read_kotlin_info, KotlinClassLevelInfo, ReadContext, RewriteContext},
    Error, Result,
};

/// What the write pass did with one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewriteOutcome {
    /// The class has no readable Kotlin info.
    Skipped,
    /// Nothing changed; the annotation was left as it was.
    Unchanged,
    /// The annotation was replaced.
    Rewritten,
    /// The annotation was deleted.
    Removed,
    /// Re-encoding failed; the annotation was left as it was.
    Failed,
}

/// Per-outcome class counts of one write pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    /// Classes without readable Kotlin info.
    pub skipped: usize,
    /// Classes left unchanged.
    pub unchanged: usize,
    /// Classes whose annotation was replaced.
    pub rewritten: usize,
    /// Classes whose annotation was deleted.
    pub removed: usize,
    /// Classes whose re-encoding failed.
    pub failed: usize,
}

impl RewriteSummary {
    fn record(mut self, outcome: RewriteOutcome) -> Self {
        match outcome {
            RewriteOutcome::Skipped => self.skipped += 1,
            RewriteOutcome::Unchanged => self.unchanged += 1,
            RewriteOutcome::Rewritten => self.rewritten += 1,
            RewriteOutcome::Removed => self.removed += 1,
            RewriteOutcome::Failed => self.failed += 1,
        }
        self
    }

    fn merge(self, other: Self) -> Self {
        RewriteSummary {
            skipped: self.skipped + other.skipped,
            unchanged: self.unchanged + other.unchanged,
            rewritten: self.rewritten + other.rewritten,
            removed: self.removed + other.removed,
            failed: self.failed + other.failed,
        }
    }

    /// Total number of classes visited.
    #[must_use]
    pub fn total(&self) -> usize {
        self.skipped + self.unchanged + self.rewritten + self.removed + self.failed
    }
}

impl fmt::Display for RewriteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Kotlin metadata: {} rewritten, {} unchanged, {} removed, {} failed, {} skipped",
            self.rewritten, self.unchanged, self.removed, self.failed, self.skipped
        )
    }
}

/// Reads, rewrites and re-encodes Kotlin metadata of program classes.
pub struct KotlinMetadataRewriter<'a> {
    codec: &'a dyn MetadataCodec,
    config: RewriterConfig,
    diagnostics: Diagnostics,
    version_warned: AtomicBool,
}

impl<'a> KotlinMetadataRewriter<'a> {
    /// Creates a rewriter with the default configuration.
    #[must_use]
    pub fn new(codec: &'a dyn MetadataCodec) -> Self {
        Self::with_config(codec, RewriterConfig::default())
    }

    /// Creates a rewriter with an explicit configuration.
    #[must_use]
    pub fn with_config(codec: &'a dyn MetadataCodec, config: RewriterConfig) -> Self {
        KotlinMetadataRewriter {
            codec,
            config,
            diagnostics: Diagnostics::new(),
            version_warned: AtomicBool::new(false),
        }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &RewriterConfig {
        &self.config
    }

    /// Everything reported so far by either pass.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Runs the read pass over `classes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMetadataKind`] if any class declares a kind outside `1..=5`.
    /// Every other problem is contained per class.
    pub fn read_kotlin_metadata(
        &self,
        classes: &mut [ProgramClass],
        keeper: &dyn ByteCodeKeeper,
    ) -> Result<()> {
        if self.config.parallel {
            classes
                .par_iter_mut()
                .try_for_each(|class| self.read_class(class, keeper))
        } else {
            classes
                .iter_mut()
                .try_for_each(|class| self.read_class(class, keeper))
        }
    }

    /// Reads the metadata of one class and stores the result in its Kotlin info slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMetadataKind`] if the class declares a kind outside `1..=5`.
    pub fn read_class(&self, class: &mut ProgramClass, keeper: &dyn ByteCodeKeeper) -> Result<()> {
        let ctx = ReadContext::new(keeper, &self.diagnostics, class.ty.clone());
        class.kotlin_info = match read_kotlin_info(class, self.codec, &self.config, &ctx) {
            Ok(info) => info,
            Err(Error::UnknownMetadataVersion(version)) => {
                self.warn_unknown_version(&version);
                KotlinClassLevelInfo::InvalidKotlinInfo
            }
            Err(error) if error.is_recoverable() => {
                let message = format!("Class {} has malformed kotlin.Metadata: {error}", class.ty);
                log::info!("{message}");
                self.diagnostics
                    .info_for(DiagnosticCategory::Read, class.ty.descriptor(), message);
                KotlinClassLevelInfo::InvalidKotlinInfo
            }
            Err(error) => return Err(error),
        };
        Ok(())
    }

    fn warn_unknown_version(&self, version: &[i32]) {
        if self.version_warned.swap(true, Ordering::Relaxed) {
            return;
        }
        let message = format!(
            "Kotlin metadata version {version:?} is newer than the supported {:?}; \
             metadata of such classes is left untouched",
            self.config.max_supported_version
        );
        log::warn!("{message}");
        self.diagnostics.warning(DiagnosticCategory::Version, message);
    }

    /// Runs the write pass over `classes`.
    pub fn rewrite_kotlin_metadata(
        &self,
        classes: &mut [ProgramClass],
        symbols: &dyn SymbolTable,
    ) -> RewriteSummary {
        if self.config.parallel {
            classes
                .par_iter_mut()
                .map(|class| RewriteSummary::default().record(self.rewrite_class(class, symbols)))
                .reduce(RewriteSummary::default, RewriteSummary::merge)
        } else {
            classes
                .iter_mut()
                .map(|class| self.rewrite_class(class, symbols))
                .fold(RewriteSummary::default(), RewriteSummary::record)
        }
    }

    /// Rewrites the metadata annotation of one class.
    pub fn rewrite_class(
        &self,
        class: &mut ProgramClass,
        symbols: &dyn SymbolTable,
    ) -> RewriteOutcome {
        if !class.kotlin_info.is_kotlin() {
            return RewriteOutcome::Skipped;
        }
        let Some(position) = class.metadata_annotation_index() else {
            return RewriteOutcome::Skipped;
        };
        if symbols.is_kotlin_metadata_removal_allowed(class) {
            class.annotations.remove(position);
            log::debug!("Removed kotlin.Metadata of {}", class.ty);
            return RewriteOutcome::Removed;
        }

        let ctx = RewriteContext::new(symbols, &self.diagnostics);
        let Some((metadata, changed)) = class.kotlin_info.rewrite(class, &ctx) else {
            return RewriteOutcome::Skipped;
        };
        if !changed && !self.config.rewrite_unchanged {
            return RewriteOutcome::Unchanged;
        }

        let header = match self.encode(&class.kotlin_info, &metadata) {
            Ok(header) => header,
            Err(error) => {
                let message = format!("Failed to rewrite kotlin.Metadata of {}: {error}", class.ty);
                log::warn!("{message}");
                self.diagnostics
                    .warning_for(DiagnosticCategory::Rewrite, class.ty.descriptor(), message);
                return RewriteOutcome::Failed;
            }
        };
        class.annotations[position] = header.to_annotation(&self.config);
        log::debug!("Rewrote kotlin.Metadata of {} (changed: {changed})", class.ty);
        RewriteOutcome::Rewritten
    }

    fn encode(
        &self,
        info: &KotlinClassLevelInfo,
        metadata: &KotlinClassMetadata,
    ) -> Result<MetadataHeader> {
        let origin = info
            .origin()
            .ok_or_else(|| Error::Error("Kotlin info without header origin".to_string()))?;
        let mut header = self.codec.encode(metadata, &origin.metadata_version)?;
        if header.metadata_version.is_none() {
            header.metadata_version = Some(origin.metadata_version.clone());
        }
        if header.package_name.is_none() {
            header.package_name.clone_from(&origin.package_name);
        }
        if header.extra_int.is_none() {
            header.extra_int = origin.extra_int;
        }
        if header.extra_string.is_none() {
            header.extra_string.clone_from(&origin.extra_string);
        }
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        host::{MappingSymbolTable, MethodRef, TypeRef},
        km::{KmClass, KotlinClassMetadata, MemoryCodec},
        test::{kotlin_class, metadata_annotation},
    };

    fn class(codec: &MemoryCodec, name: &str) -> ProgramClass {
        let metadata = KotlinClassMetadata::Class(KmClass {
            name: name.to_string(),
            ..KmClass::default()
        });
        kotlin_class(codec, &format!("L{name};"), &metadata)
    }

    #[test]
    fn test_unknown_version_warned_once() {
        let codec = MemoryCodec::new();
        let metadata = KotlinClassMetadata::SyntheticClass(None);
        let mut classes: Vec<ProgramClass> = (0..3)
            .map(|i| {
                ProgramClass::new(TypeRef::new(format!("Lfoo/S{i};")))
                    .with_annotation(metadata_annotation(&codec, &metadata, &[9, 0, 0]))
            })
            .collect();
        let rewriter = KotlinMetadataRewriter::new(&codec);
        rewriter
            .read_kotlin_metadata(&mut classes, &|_: &MethodRef| {})
            .unwrap();
        assert_eq!(
            rewriter.diagnostics().by_category(DiagnosticCategory::Version).len(),
            1
        );
        assert!(classes
            .iter()
            .all(|c| matches!(c.kotlin_info, KotlinClassLevelInfo::InvalidKotlinInfo)));
    }

    #[test]
    fn test_summary_counts() {
        let codec = MemoryCodec::new();
        let mut classes = vec![
            class(&codec, "foo/A"),
            class(&codec, "foo/B"),
            class(&codec, "foo/C"),
            ProgramClass::new(TypeRef::new("Lfoo/Plain;")),
        ];
        let mut config = RewriterConfig::default();
        config.parallel = false;
        let rewriter = KotlinMetadataRewriter::with_config(&codec, config);
        rewriter
            .read_kotlin_metadata(&mut classes, &|_: &MethodRef| {})
            .unwrap();

        let table = MappingSymbolTable::new();
        table.rename_type(TypeRef::new("Lfoo/B;"), TypeRef::new("La;"));
        table.allow_metadata_removal(TypeRef::new("Lfoo/C;"));
        let summary = rewriter.rewrite_kotlin_metadata(&mut classes, &table);
        assert_eq!(
            summary,
            RewriteSummary {
                skipped: 1,
                unchanged: 1,
                rewritten: 1,
                removed: 1,
                failed: 0,
            }
        );
        assert_eq!(summary.total(), 4);
        assert!(classes[2].metadata_annotation().is_none());
    }
}
