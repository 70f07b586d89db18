//! Error types for manifest creation and verification.

use std::path::PathBuf;

use crate::verify::VerificationReport;

/// Coarse classification of a [`ManifestError`], for callers that branch on
/// the failure class rather than the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    UnsupportedAlgorithm,
    Io,
    ManifestUnreadable,
    MalformedManifest,
    Write,
    VerificationFailed,
}

/// Errors that can occur while building, reading, writing or verifying a
/// manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// A required option is missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A file-set carries an include/exclude pattern that does not compile.
    #[error("invalid file-set pattern {pattern:?}: {source}")]
    FileSet {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The requested hash algorithm is not in the supported set.
    #[error("unsupported hash algorithm: {0:?}")]
    UnsupportedAlgorithm(String),

    /// A selected file could not be resolved, opened or read while hashing.
    #[error("failed reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The recorded manifest does not exist or cannot be read.
    #[error("failed reading from manifest file {path:?}: {source}")]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A non-blank manifest line has no tab separator.
    #[error("malformed manifest {path:?}: line {line} has no tab separator")]
    MalformedManifest {
        path: PathBuf,
        /// 1-based line number.
        line: usize,
    },

    /// The manifest could not be written.
    #[error("failed writing to manifest file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Verification found at least one discrepancy.
    ///
    /// Every discrepancy has already been logged by the time this is returned;
    /// the full report rides along for callers that want it.
    #[error(
        "manifest verification failed: {} extra, {} missing, {} mismatched",
        .0.extra_files.len(),
        .0.missing_files.len(),
        .0.mismatched_files.len()
    )]
    VerificationFailed(Box<VerificationReport>),
}

impl ManifestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) | Self::FileSet { .. } => ErrorKind::Configuration,
            Self::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            Self::Io { .. } => ErrorKind::Io,
            Self::ManifestUnreadable { .. } => ErrorKind::ManifestUnreadable,
            Self::MalformedManifest { .. } => ErrorKind::MalformedManifest,
            Self::Write { .. } => ErrorKind::Write,
            Self::VerificationFailed(_) => ErrorKind::VerificationFailed,
        }
    }

    /// The verification report, if this error is a verification failure.
    pub fn report(&self) -> Option<&VerificationReport> {
        match self {
            Self::VerificationFailed(report) => Some(report),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, ManifestError>;
