use crate::manifest::Manifest;
use serde::{Deserialize, Serialize};

/// A path present on both sides whose digests differ.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
    pub path: String,
    pub computed: String,
    pub recorded: String,
}

/// Outcome of comparing a freshly computed manifest against a recorded one.
///
/// * `extra_files`: listed in the recorded manifest, not produced by this run.
/// * `missing_files`: produced by this run, not listed in the recorded manifest.
/// * `mismatched_files`: on both sides with different digests.
///
/// All three are sorted by path and pairwise disjoint.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VerificationReport {
    pub extra_files: Vec<String>,
    pub missing_files: Vec<String>,
    pub mismatched_files: Vec<Mismatch>,
    /// Entries that matched exactly.
    pub files_ok: usize,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.extra_files.is_empty() && self.missing_files.is_empty() && self.mismatched_files.is_empty()
    }

    pub fn mismatched_paths(&self) -> impl Iterator<Item = &str> {
        self.mismatched_files.iter().map(|m| m.path.as_str())
    }
}

/// Compare two manifests. Pure; performs no I/O.
pub fn verify(computed: &Manifest, recorded: &Manifest) -> VerificationReport {
    let mut report = VerificationReport::default();
    for (path, digest) in recorded.iter() {
        match computed.get(path) {
            None => report.extra_files.push(path.to_string()),
            Some(actual) if actual != digest => report.mismatched_files.push(Mismatch {
                path: path.to_string(),
                computed: actual.to_string(),
                recorded: digest.to_string(),
            }),
            Some(_) => report.files_ok += 1,
        }
    }
    report.missing_files = computed
        .paths()
        .filter(|p| !recorded.contains(p))
        .map(str::to_string)
        .collect();
    report
}
