//! # ktmeta Prelude
//!
//! The types a host needs to drive the rewriter, in one import.
//!
//! ```rust
//! use ktmeta::prelude::*;
//!
//! let codec = MemoryCodec::new();
//! let rewriter = KotlinMetadataRewriter::with_config(&codec, RewriterConfig::preserving());
//! assert!(!rewriter.diagnostics().has_any());
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type
pub use crate::Error;

/// The result type used throughout the crate
pub use crate::Result;

// ================================================================================================
// Entry Points
// ================================================================================================

/// The two-pass rewriter and what it reports
pub use crate::rewriter::{KotlinMetadataRewriter, RewriteOutcome, RewriteSummary};

/// Rewriter options
pub use crate::config::RewriterConfig;

/// Diagnostics collected by both passes
pub use crate::diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics};

// ================================================================================================
// Host Interface
// ================================================================================================

/// Types, members and program classes
pub use crate::host::{
    Annotation, AnnotationElement, AnnotationValue, FieldRef, MethodRef, ProgramClass,
    ProgramField, ProgramMethod, TypeRef,
};

/// Renaming and keep decisions
pub use crate::host::{ByteCodeKeeper, MappingSymbolTable, SymbolTable};

// ================================================================================================
// Decoded Metadata
// ================================================================================================

/// Header, codec and the decoded tree
pub use crate::km::{
    JvmFieldSignature, JvmMethodSignature, KmClass, KmClassifier, KmConstructor, KmFunction,
    KmLambda, KmPackage, KmProperty, KmType, KmTypeAlias, KmValueParameter, KotlinClassMetadata,
    MemoryCodec, MetadataCodec, MetadataHeader, MetadataKind,
};

// ================================================================================================
// Info Model
// ================================================================================================

/// Class- and member-level Kotlin info slots
pub use crate::kotlin::{KotlinClassLevelInfo, KotlinFieldLevelInfo, KotlinMethodLevelInfo};
