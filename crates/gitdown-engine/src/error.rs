//! Error types for directive resolution.

use std::io;
use std::path::PathBuf;

/// Error raised by a helper's compile call.
#[derive(Debug, thiserror::Error)]
pub enum HelperError {
    /// A required option is absent or not a string.
    #[error("missing required option \"{0}\"")]
    MissingOption(&'static str),
    /// An option is present but unusable.
    #[error("invalid option \"{name}\": {message}")]
    InvalidOption {
        /// Option name.
        name: &'static str,
        /// What is wrong with the value.
        message: String,
    },
    /// A file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A variable is not defined in the configuration.
    #[error("undefined variable \"{0}\"")]
    UndefinedVariable(String),
    /// Any other helper failure.
    #[error("{0}")]
    Failed(String),
}

/// Semantic error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A directive marker could not be extended into valid JSON.
    InvalidDirective,
    /// A directive names a helper that is not registered.
    UnknownHelper,
    /// A helper's compile call failed.
    Helper,
    /// The pass ceiling was reached.
    PassLimitExceeded,
}

/// Error from resolving a document.
///
/// Every failure is fatal to the run; no partially resolved document is returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `{"gitdown"` marker in an active region is not followed by valid JSON.
    ///
    /// `fragment` is the exact source text from the marker to where scanning stopped:
    /// the last `}` before the end of the active region, or the region end when no
    /// `}` follows the marker. Later prose containing braces therefore ends up in the
    /// fragment; `offset` always points at the marker itself.
    #[error("Invalid Gitdown JSON (\"{fragment}\").")]
    InvalidDirective {
        /// Offending source text.
        fragment: String,
        /// Byte offset of the marker in the document.
        offset: usize,
    },
    /// A directive names a helper absent from the registry.
    #[error("Unknown helper \"{name}\".")]
    UnknownHelper {
        /// Helper name from the directive.
        name: String,
    },
    /// A helper failed while compiling a directive.
    #[error("Helper \"{name}\" failed on line {line}: {source}")]
    Helper {
        /// Helper name.
        name: String,
        /// Line of the directive (1-indexed).
        line: usize,
        /// Error returned by the helper.
        #[source]
        source: HelperError,
    },
    /// Resolution did not reach a fixpoint within the configured number of passes.
    #[error("Directive resolution did not finish within {limit} passes")]
    PassLimitExceeded {
        /// Configured ceiling.
        limit: usize,
    },
}

impl Error {
    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDirective { .. } => ErrorKind::InvalidDirective,
            Self::UnknownHelper { .. } => ErrorKind::UnknownHelper,
            Self::Helper { .. } => ErrorKind::Helper,
            Self::PassLimitExceeded { .. } => ErrorKind::PassLimitExceeded,
        }
    }
}
