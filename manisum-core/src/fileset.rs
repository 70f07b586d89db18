//! File-set specifications and their expansion into relative paths.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ManifestError, Result};
use crate::normalize::join_slash;

/// A rule-based selection of files under one directory.
///
/// Patterns are matched against `/`-separated paths relative to `dir`. A `*`
/// never crosses a `/`; use `**` to descend. No includes means everything.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FileSet {
    pub dir: PathBuf,
    #[serde(default, alias = "includes")]
    pub include: Vec<String>,
    #[serde(default, alias = "excludes")]
    pub exclude: Vec<String>,
}

impl FileSet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), ..Self::default() }
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }
}

/// Expands a [`FileSet`] into the files it selects.
pub trait FileSetResolver {
    /// Relative paths (to [`FileSetResolver::base_directory_of`]) in a
    /// deterministic order.
    fn resolve(&self, set: &FileSet, project_base: &Path) -> Result<Vec<String>>;

    /// Reject a set whose rules cannot be applied. Runs before any file is
    /// hashed.
    fn check(&self, _set: &FileSet) -> Result<()> {
        Ok(())
    }

    /// Absolute directory the set's relative paths are rooted at.
    fn base_directory_of(&self, set: &FileSet, project_base: &Path) -> PathBuf {
        if set.dir.is_absolute() {
            set.dir.clone()
        } else {
            project_base.join(&set.dir)
        }
    }
}

/// Default resolver: walks the directory with `walkdir` and filters with
/// `globset`. Yields regular files (and symlinks to them) in file-name order.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobWalker;

impl FileSetResolver for GlobWalker {
    fn check(&self, set: &FileSet) -> Result<()> {
        build_globsets(set).map(|_| ())
    }

    fn resolve(&self, set: &FileSet, project_base: &Path) -> Result<Vec<String>> {
        let (inc, exc) = build_globsets(set)?;
        let root = self.base_directory_of(set, project_base);
        std::fs::metadata(&root).map_err(|e| ManifestError::io(&root, e))?;
        let mut out = Vec::new();
        for ent in WalkDir::new(&root).min_depth(1).sort_by_file_name() {
            let ent = ent.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                ManifestError::io(path, e.into())
            })?;
            let ft = ent.file_type();
            let is_file = ft.is_file() || (ft.is_symlink() && ent.path().is_file());
            if !is_file {
                continue;
            }
            let rel = pathdiff::diff_paths(ent.path(), &root)
                .unwrap_or_else(|| ent.path().to_path_buf());
            let rel = join_slash(&rel);
            if inc.is_match(&rel) && !exc.is_match(&rel) {
                out.push(rel);
            }
        }
        Ok(out)
    }
}

fn build_globsets(set: &FileSet) -> Result<(GlobSet, GlobSet)> {
    let mut incb = GlobSetBuilder::new();
    let mut excb = GlobSetBuilder::new();
    if set.include.is_empty() {
        incb.add(compile("**")?);
    }
    for g in &set.include {
        incb.add(compile(g)?);
    }
    for g in &set.exclude {
        excb.add(compile(g)?);
    }
    let inc = incb.build().map_err(|source| ManifestError::FileSet { pattern: set.include.join(","), source })?;
    let exc = excb.build().map_err(|source| ManifestError::FileSet { pattern: set.exclude.join(","), source })?;
    Ok((inc, exc))
}

fn compile(pattern: &str) -> Result<globset::Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| ManifestError::FileSet { pattern: pattern.to_string(), source })
}
