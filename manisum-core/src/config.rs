//! Task configuration, as given on the command line or in a JSON task file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::digest::HashAlgorithm;
use crate::error::{ManifestError, Result};
use crate::fileset::FileSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Create,
    Verify,
}

impl Mode {
    /// Case-insensitive; anything other than `verify` means create.
    ///
    /// The second value is false when `s` was neither mode name.
    pub fn parse_lenient(s: &str) -> (Self, bool) {
        match s.trim().to_ascii_lowercase().as_str() {
            "verify" => (Self::Verify, true),
            "create" => (Self::Create, true),
            _ => (Self::Create, false),
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Verify => "verify",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_algo() -> Option<String> {
    Some(HashAlgorithm::default().name().to_string())
}

fn default_mode() -> String {
    Mode::Create.name().to_string()
}

/// Everything one create/verify run needs.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TaskConfig {
    #[serde(default = "default_algo")]
    pub algo: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default, alias = "fileset")]
    pub filesets: Vec<FileSet>,
    /// Directory manifest paths are made relative to. Relative file-set
    /// directories are rooted here too. Defaults to the working directory.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self { algo: default_algo(), file: None, mode: default_mode(), filesets: Vec::new(), base_dir: None }
    }
}

impl TaskConfig {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: Some(file.into()), ..Self::default() }
    }

    pub fn algo(mut self, algo: impl Into<String>) -> Self {
        self.algo = Some(algo.into());
        self
    }

    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn fileset(mut self, set: FileSet) -> Self {
        self.filesets.push(set);
        self
    }

    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Load a JSON task description.
    ///
    /// Relative `file`, `base_dir` and file-set directories stay relative; they
    /// are resolved against the working directory and `base_dir` at run time.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ManifestError::io(path, e))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ManifestError::Configuration(format!("invalid task file: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_is_case_insensitive_with_create_fallback() {
        assert_eq!(Mode::parse_lenient("VeRiFy"), (Mode::Verify, true));
        assert_eq!(Mode::parse_lenient("create"), (Mode::Create, true));
        assert_eq!(Mode::parse_lenient("verfy"), (Mode::Create, false));
        assert_eq!(Mode::parse_lenient(""), (Mode::Create, false));
    }

    #[test]
    fn json_defaults() {
        let cfg = TaskConfig::from_json(r#"{"file": "Manifest"}"#).unwrap();
        assert_eq!(cfg.algo.as_deref(), Some("sha256"));
        assert_eq!(cfg.mode, "create");
        assert_eq!(cfg.file, Some(PathBuf::from("Manifest")));
        assert!(cfg.filesets.is_empty());
    }

    #[test]
    fn json_full() {
        let cfg = TaskConfig::from_json(
            r#"{
                "algo": "md5",
                "file": "out/Manifest",
                "mode": "verify",
                "base_dir": "/srv/app",
                "filesets": [
                    {"dir": "src", "include": ["**/*.php"], "exclude": ["vendor/**"]},
                    {"dir": "public"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(
            cfg,
            TaskConfig::new("out/Manifest")
                .algo("md5")
                .mode("verify")
                .base_dir("/srv/app")
                .fileset(FileSet::new("src").include("**/*.php").exclude("vendor/**"))
                .fileset(FileSet::new("public"))
        );
    }

    #[test]
    fn bad_json_is_configuration_error() {
        let err = TaskConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ManifestError::Configuration(_)));
    }
}
