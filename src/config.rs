//! Configuration of the metadata rewriter.
//!
//! [`RewriterConfig`] controls which optional `@Metadata` elements are written back, whether
//! unchanged metadata is re-emitted, how classes are scheduled, and which metadata versions
//! the codec is trusted with.
//!
//! # Presets
//!
//! - [`RewriterConfig::default`] - rewrite only what changed, write every element the input
//!   carried, stamp the bytecode version, run in parallel
//! - [`RewriterConfig::preserving`] - touch as little of the annotation as possible
//! - [`RewriterConfig::stripping`] - drop optional string elements from rewritten annotations
//!
//! # Examples
//!
//! ```rust
//! use ktmeta::config::RewriterConfig;
//!
//! let mut config = RewriterConfig::default();
//! config.parallel = false;
//!
//! assert!(config.is_supported_version(&[1, 8, 0]));
//! assert!(!config.is_supported_version(&[2, 1, 0]));
//! ```

/// Version stamped into the `bv` element of rewritten annotations.
pub const BYTECODE_VERSION: [i32; 3] = [1, 0, 3];

/// Default highest metadata version the codec is trusted with.
pub const MAX_SUPPORTED_METADATA_VERSION: [i32; 3] = [1, 9, 0];

/// Options for [`crate::KotlinMetadataRewriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct RewriterConfig {
    /// Replace the annotation even when the rewrite reported no change.
    pub rewrite_unchanged: bool,
    /// Emit `bv` with [`BYTECODE_VERSION`].
    pub write_bytecode_version: bool,
    /// Emit `xs` when set and non-empty.
    pub write_extra_string: bool,
    /// Emit `pn` when set and non-empty.
    pub write_package_name: bool,
    /// Emit `xi` when set and non-zero.
    pub write_extra_int: bool,
    /// Process classes on the rayon thread pool.
    pub parallel: bool,
    /// Highest `mv` accepted by the codec.
    pub max_supported_version: [i32; 3],
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            rewrite_unchanged: false,
            write_bytecode_version: true,
            write_extra_string: true,
            write_package_name: true,
            write_extra_int: true,
            parallel: true,
            max_supported_version: MAX_SUPPORTED_METADATA_VERSION,
        }
    }
}

impl RewriterConfig {
    /// Leaves unchanged annotations alone and does not add `bv`.
    #[must_use]
    pub fn preserving() -> Self {
        Self {
            write_bytecode_version: false,
            ..Self::default()
        }
    }

    /// Re-emits every annotation without the optional `xs` and `pn` strings.
    #[must_use]
    pub fn stripping() -> Self {
        Self {
            rewrite_unchanged: true,
            write_extra_string: false,
            write_package_name: false,
            ..Self::default()
        }
    }

    /// Returns `true` if `version` does not exceed [`Self::max_supported_version`].
    ///
    /// Missing trailing components count as zero; components past the third are ignored.
    #[must_use]
    pub fn is_supported_version(&self, version: &[i32]) -> bool {
        let mut padded = [0; 3];
        for (slot, component) in padded.iter_mut().zip(version) {
            *slot = *component;
        }
        padded <= self.max_supported_version
    }
}
