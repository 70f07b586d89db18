use std::path::{Path, PathBuf};

use crate::digest::{digest_file_counted, HashAlgorithm};
use crate::error::{ManifestError, Result};
use crate::fileset::{FileSet, FileSetResolver, GlobWalker};
use crate::manifest::Manifest;
use crate::normalize::relative_to_base;
use crate::progress::Progress;

/// Hashes the files selected by a list of file-sets into a [`Manifest`].
///
/// The algorithm is a parsed [`HashAlgorithm`], so it has been validated
/// before any file is touched.
pub struct ManifestBuilder<'a> {
    algorithm: HashAlgorithm,
    resolver: &'a dyn FileSetResolver,
    progress: Progress,
    skip: Option<PathBuf>,
}

impl ManifestBuilder<'static> {
    /// Builder using the default [`GlobWalker`] resolver.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm, resolver: &GlobWalker, progress: Progress::disabled(), skip: None }
    }
}

impl<'a> ManifestBuilder<'a> {
    pub fn with_resolver(algorithm: HashAlgorithm, resolver: &'a dyn FileSetResolver) -> Self {
        Self { algorithm, resolver, progress: Progress::disabled(), skip: None }
    }

    pub fn progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Leave out the file at this resolved path, typically the manifest itself
    /// when it lives inside a selected directory.
    pub fn skip(mut self, resolved: impl Into<PathBuf>) -> Self {
        self.skip = Some(resolved.into());
        self
    }

    /// Expand, hash and collect every file of every set, in order.
    ///
    /// Paths are normalized against `base_dir`. A path seen again (within a set
    /// or in a later set) replaces the earlier digest. The first file that
    /// cannot be resolved or read aborts the whole build.
    pub fn build(&self, file_sets: &[FileSet], base_dir: &Path) -> Result<Manifest> {
        let base = std::fs::canonicalize(base_dir).map_err(|e| ManifestError::io(base_dir, e))?;
        let mut manifest = Manifest::new();
        self.progress.set_stage("Hashing");
        self.progress.start();
        let res = self.hash_sets(file_sets, &base, &mut manifest);
        self.progress.stop();
        res?;
        tracing::info!(
            files = manifest.len(),
            bytes = self.progress.bytes_done(),
            algo = %self.algorithm,
            "hashed file-sets"
        );
        Ok(manifest)
    }

    fn hash_sets(&self, file_sets: &[FileSet], base: &Path, manifest: &mut Manifest) -> Result<()> {
        for set in file_sets {
            let dir = self.resolver.base_directory_of(set, base);
            let files = self.resolver.resolve(set, base)?;
            tracing::debug!(dir = %dir.display(), files = files.len(), "expanded file-set");
            self.progress.add_files_total(files.len());
            for rel in files {
                let abs = dir.join(&rel);
                let resolved = std::fs::canonicalize(&abs).map_err(|e| ManifestError::io(&abs, e))?;
                if self.skip.as_deref() == Some(resolved.as_path()) {
                    tracing::debug!(path = %resolved.display(), "skipping manifest file");
                    continue;
                }
                let (digest, bytes) = digest_file_counted(&resolved, self.algorithm)?;
                let key = relative_to_base(&resolved, base);
                tracing::debug!(path = %key, %digest, "hashed");
                if let Some(prev) = manifest.insert(key.clone(), digest) {
                    tracing::debug!(path = %key, previous = %prev, "replaced earlier entry");
                }
                self.progress.inc_file(bytes);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::digest_bytes;
    use std::fs;
    use std::path::PathBuf;

    /// Yields a fixed list regardless of the set, to control ordering.
    struct Fixed(Vec<&'static str>);

    impl FileSetResolver for Fixed {
        fn resolve(&self, _set: &FileSet, _project_base: &Path) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    #[test]
    fn paths_are_relative_to_project_base() {
        let td = tempfile::tempdir().unwrap();
        fs::create_dir_all(td.path().join("web/css")).unwrap();
        fs::write(td.path().join("web/css/site.css"), b"body{}").unwrap();
        fs::write(td.path().join("web/index.html"), b"<html>").unwrap();

        let m = ManifestBuilder::new(HashAlgorithm::Sha256)
            .build(&[FileSet::new("web")], td.path())
            .unwrap();
        let paths: Vec<_> = m.paths().collect();
        assert_eq!(paths, vec!["web/css/site.css", "web/index.html"]);
        assert_eq!(m.get("web/index.html"), Some(digest_bytes(b"<html>", HashAlgorithm::Sha256).as_str()));
    }

    #[test]
    fn set_outside_base_keeps_absolute_path() {
        let base = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        fs::write(other.path().join("x.txt"), b"x").unwrap();
        let m = ManifestBuilder::new(HashAlgorithm::Md5)
            .build(&[FileSet::new(other.path())], base.path())
            .unwrap();
        let expected = fs::canonicalize(other.path().join("x.txt")).unwrap();
        assert_eq!(m.paths().collect::<Vec<_>>(), vec![expected.to_string_lossy()]);
    }

    #[test]
    fn overlapping_sets_collapse_to_one_entry() {
        let td = tempfile::tempdir().unwrap();
        fs::write(td.path().join("a.txt"), b"a").unwrap();
        let resolver = Fixed(vec!["a.txt", "./a.txt", "a.txt"]);
        let sets = [FileSet::new("."), FileSet::new(PathBuf::from("."))];
        let m = ManifestBuilder::with_resolver(HashAlgorithm::Sha256, &resolver)
            .build(&sets, td.path())
            .unwrap();
        assert_eq!(m.len(), 1);
        assert!(m.contains("a.txt"));
    }

    #[test]
    fn vanished_file_aborts_build() {
        let td = tempfile::tempdir().unwrap();
        fs::write(td.path().join("a.txt"), b"a").unwrap();
        let resolver = Fixed(vec!["a.txt", "gone.txt"]);
        let err = ManifestBuilder::with_resolver(HashAlgorithm::Sha256, &resolver)
            .build(&[FileSet::new(".")], td.path())
            .unwrap_err();
        match err {
            ManifestError::Io { path, .. } => assert!(path.ends_with("gone.txt")),
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn skipped_path_is_left_out() {
        let td = tempfile::tempdir().unwrap();
        fs::write(td.path().join("a.txt"), b"a").unwrap();
        fs::write(td.path().join("Manifest"), b"old").unwrap();
        let skip = fs::canonicalize(td.path().join("Manifest")).unwrap();
        let m = ManifestBuilder::new(HashAlgorithm::Sha256)
            .skip(skip)
            .build(&[FileSet::new(".")], td.path())
            .unwrap();
        assert_eq!(m.paths().collect::<Vec<_>>(), vec!["a.txt"]);
    }

    #[test]
    fn progress_counts_files_and_bytes() {
        let td = tempfile::tempdir().unwrap();
        fs::write(td.path().join("a"), b"12345").unwrap();
        fs::write(td.path().join("b"), b"123").unwrap();
        let progress = Progress::disabled();
        ManifestBuilder::new(HashAlgorithm::Blake3)
            .progress(progress.clone())
            .build(&[FileSet::new(".")], td.path())
            .unwrap();
        assert_eq!(progress.files_done(), 2);
        assert_eq!(progress.bytes_done(), 8);
    }
}
