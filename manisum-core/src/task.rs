//! The create/verify task: configuration checks, hashing, then either writing
//! the manifest or comparing against the recorded one.

use std::path::{Path, PathBuf};

use crate::builder::ManifestBuilder;
use crate::codec;
use crate::config::{Mode, TaskConfig};
use crate::digest::HashAlgorithm;
use crate::error::{ManifestError, Result};
use crate::fileset::{FileSetResolver, GlobWalker};
use crate::localize::{FluentLoc, Localizer};
use crate::progress::Progress;
use crate::verify::{verify, VerificationReport};

/// Where a [`ManifestTask`] is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Configuring,
    Scanning,
    Writing,
    Comparing,
    Done,
    Failed,
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Written { path: PathBuf, bytes: u64, files: usize },
    Verified { report: VerificationReport },
}

impl TaskOutcome {
    pub fn message(&self, loc: &dyn Localizer) -> String {
        match self {
            Self::Written { path, bytes, .. } => loc.msg(
                "create-written",
                &[("bytes", bytes.to_string().as_str()), ("path", path.display().to_string().as_str())],
            ),
            Self::Verified { report } => {
                loc.msg("verify-ok", &[("count", report.files_ok.to_string().as_str())])
            }
        }
    }
}

/// Settings that passed validation.
struct Checked {
    algorithm: HashAlgorithm,
    file: PathBuf,
    mode: Mode,
    base: PathBuf,
}

pub struct ManifestTask<'a> {
    config: TaskConfig,
    resolver: &'a dyn FileSetResolver,
    loc: Box<dyn Localizer + 'a>,
    progress: Progress,
    state: TaskState,
    failed_in: Option<TaskState>,
}

impl ManifestTask<'static> {
    /// Task using the glob resolver and the built-in English messages.
    pub fn new(config: TaskConfig) -> Self {
        Self {
            config,
            resolver: &GlobWalker,
            loc: Box::new(FluentLoc::default()),
            progress: Progress::disabled(),
            state: TaskState::Idle,
            failed_in: None,
        }
    }
}

impl<'a> ManifestTask<'a> {
    pub fn with_resolver(self, resolver: &'a dyn FileSetResolver) -> Self {
        Self { resolver, ..self }
    }

    pub fn with_localizer(mut self, loc: impl Localizer + 'a) -> Self {
        self.loc = Box::new(loc);
        self
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Stage the last run was in when it failed.
    pub fn failed_in(&self) -> Option<TaskState> {
        self.failed_in
    }

    /// Registration hook for build tools; there is nothing to prepare.
    pub fn init(&self) -> bool {
        true
    }

    /// Run and collapse the result into `(success, message)`.
    pub fn execute(&mut self) -> (bool, String) {
        match self.run() {
            Ok(outcome) => (true, outcome.message(self.loc.as_ref())),
            Err(e) => (false, e.to_string()),
        }
    }

    /// Run the task to completion.
    ///
    /// Configuration problems are reported before any file is read. On a
    /// verification failure every discrepancy is logged first.
    pub fn run(&mut self) -> Result<TaskOutcome> {
        self.failed_in = None;
        let res = self.run_inner();
        if let Err(e) = &res {
            tracing::debug!(kind = ?e.kind(), stage = ?self.state, "task failed: {e}");
            self.failed_in = Some(self.state);
            self.state = TaskState::Failed;
        } else {
            self.state = TaskState::Done;
        }
        res
    }

    fn run_inner(&mut self) -> Result<TaskOutcome> {
        self.state = TaskState::Configuring;
        let checked = self.check_config()?;

        self.state = TaskState::Scanning;
        tracing::info!(mode = %checked.mode, algo = %checked.algorithm, base = %checked.base.display(), "scanning file-sets");
        let mut builder = ManifestBuilder::with_resolver(checked.algorithm, self.resolver)
            .progress(self.progress.clone());
        if let Some(target) = resolved_target(&checked.file) {
            builder = builder.skip(target);
        }
        let computed = builder.build(&self.config.filesets, &checked.base)?;

        match checked.mode {
            Mode::Create => {
                self.state = TaskState::Writing;
                let bytes = codec::write_manifest(&checked.file, &computed)?;
                let outcome = TaskOutcome::Written { path: checked.file, bytes, files: computed.len() };
                tracing::info!("{}", outcome.message(self.loc.as_ref()));
                Ok(outcome)
            }
            Mode::Verify => {
                self.state = TaskState::Comparing;
                let recorded = codec::read_manifest(&checked.file)?;
                let report = verify(&computed, &recorded);
                if !report.is_clean() {
                    self.log_discrepancies(&report);
                    return Err(ManifestError::VerificationFailed(Box::new(report)));
                }
                let outcome = TaskOutcome::Verified { report };
                tracing::info!("{}", outcome.message(self.loc.as_ref()));
                Ok(outcome)
            }
        }
    }

    fn check_config(&self) -> Result<Checked> {
        let algo = match self.config.algo.as_deref().map(str::trim) {
            Some(a) if !a.is_empty() => a,
            _ => return Err(ManifestError::Configuration("hash algorithm must be specified".into())),
        };
        let algorithm: HashAlgorithm = algo.parse()?;

        let Some(file) = self.config.file.as_deref().filter(|f| !f.as_os_str().is_empty()) else {
            return Err(ManifestError::Configuration("path to manifest file must be specified".into()));
        };

        let (mode, known) = Mode::parse_lenient(&self.config.mode);
        if !known {
            tracing::warn!("{}", self.loc.msg("mode-unknown", &[("mode", self.config.mode.as_str())]));
        }

        for set in &self.config.filesets {
            self.resolver.check(set)?;
        }

        let base = match &self.config.base_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(|e| {
                ManifestError::Configuration(format!("cannot determine working directory: {e}"))
            })?,
        };
        let file = resolve_against(&base, file);

        Ok(Checked { algorithm, file, mode, base })
    }

    fn log_discrepancies(&self, report: &VerificationReport) {
        let loc = self.loc.as_ref();
        if !report.extra_files.is_empty() {
            let count = report.extra_files.len().to_string();
            tracing::warn!("{}", loc.msg("verify-extra-summary", &[("count", count.as_str())]));
            for path in &report.extra_files {
                tracing::warn!("{}", loc.msg("verify-extra-file", &[("path", path.as_str())]));
            }
        }
        if !report.missing_files.is_empty() {
            let count = report.missing_files.len().to_string();
            tracing::warn!("{}", loc.msg("verify-missing-summary", &[("count", count.as_str())]));
            for path in &report.missing_files {
                tracing::warn!("{}", loc.msg("verify-missing-file", &[("path", path.as_str())]));
            }
        }
        for m in &report.mismatched_files {
            tracing::warn!(
                computed = %m.computed,
                recorded = %m.recorded,
                "{}",
                loc.msg("verify-mismatch-file", &[("path", m.path.as_str())])
            );
        }
        tracing::warn!("{}", loc.msg("verify-failed", &[]));
    }
}

/// Canonical location of the manifest file, whether or not it exists yet.
fn resolved_target(file: &Path) -> Option<PathBuf> {
    if let Ok(p) = std::fs::canonicalize(file) {
        return Some(p);
    }
    let parent = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Some(std::fs::canonicalize(parent).ok()?.join(file.file_name()?))
}

fn resolve_against(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}
