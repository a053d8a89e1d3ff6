use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Almost every variant is recoverable: the orchestration layer contains them per class and
/// degrades to "invalid Kotlin info" or "leave metadata untouched". The single exception is
/// [`Error::UnknownMetadataKind`], which signals a codec/host mismatch rather than bad input.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::Malformed`] - The `@Metadata` payload or a part of it could not be understood
/// - [`Error::MissingElement`] - A required annotation element (`k`, `d1`) is absent
/// - [`Error::InvalidDescriptor`] - A JVM descriptor failed validation
///
/// ## Ecosystem Errors
/// - [`Error::UnknownMetadataVersion`] - The metadata version is newer than supported
/// - [`Error::UnknownMetadataKind`] - The `k` discriminant is outside `1..=5`
/// - [`Error::Codec`] - The external codec rejected the payload
///
/// # Examples
///
/// ```rust
/// use ktmeta::Error;
///
/// let err = Error::UnknownMetadataKind(9);
/// assert!(!err.is_recoverable());
/// assert!(Error::MissingElement("d1").is_recoverable());
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The metadata is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A required element of the `@Metadata` annotation is missing.
    #[error("Missing required @Metadata element '{0}'")]
    MissingElement(&'static str),

    /// The declared metadata version exceeds what the codec understands.
    #[error("Unsupported Kotlin metadata version {0:?}")]
    UnknownMetadataVersion(Vec<i32>),

    /// The `k` discriminant does not name a known class kind.
    ///
    /// This is not contained per class: it indicates an unsupported ecosystem version.
    #[error("Unknown Kotlin metadata kind {0}")]
    UnknownMetadataKind(i32),

    /// A JVM type or method descriptor is not well formed.
    #[error("Invalid JVM descriptor '{0}'")]
    InvalidDescriptor(String),

    /// The external metadata codec failed to decode or encode a payload.
    #[error("Codec failure - {0}")]
    Codec(String),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}

impl Error {
    /// Returns `false` only for errors that must abort the whole run.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::UnknownMetadataKind(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_macro() {
        let err = malformed_error!("bad {} payload", "d1");
        match err {
            Error::Malformed { message, file, .. } => {
                assert_eq!(message, "bad d1 payload");
                assert!(file.ends_with("error.rs"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_recoverable() {
        assert!(!Error::UnknownMetadataKind(0).is_recoverable());
        assert!(Error::UnknownMetadataVersion(vec![2, 5, 0]).is_recoverable());
        assert!(Error::Codec("truncated".to_string()).is_recoverable());
    }

    #[test]
    fn test_display() {
        let err = Error::MissingElement("k");
        assert_eq!(err.to_string(), "Missing required @Metadata element 'k'");
    }
}
