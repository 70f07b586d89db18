//! Create and verify file-integrity manifests.
//!
//! A manifest lists every file selected by a set of [`fileset::FileSet`]s,
//! relative to a project base directory, alongside a content digest. The
//! [`task::ManifestTask`] either writes that listing or re-hashes the same
//! selection and reports extra, missing and mismatched entries.

pub mod builder;
pub mod codec;
pub mod config;
pub mod digest;
pub mod error;
pub mod fileset;
pub mod localize;
pub mod manifest;
pub mod normalize;
pub mod progress;
pub mod task;
pub mod verify;

pub use builder::ManifestBuilder;
pub use config::{Mode, TaskConfig};
pub use digest::HashAlgorithm;
pub use error::{ErrorKind, ManifestError, Result};
pub use fileset::{FileSet, FileSetResolver, GlobWalker};
pub use manifest::Manifest;
pub use task::{ManifestTask, TaskOutcome, TaskState};
pub use verify::{verify, VerificationReport};
