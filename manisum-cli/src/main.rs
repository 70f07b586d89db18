use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use manisum_core::progress::Progress;
use manisum_core::{FileSet, HashAlgorithm, ManifestError, ManifestTask, TaskConfig, TaskOutcome};

#[derive(Parser)]
#[command(name = "manisum", version, about = "Create and verify file-integrity manifests")]
struct Cli {
    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Log every hashed file
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Periodically report hashing progress
    #[arg(long, global = true, default_value_t = false)]
    progress: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Hash the selected files and write the manifest
    Create(Selection),
    /// Re-hash the selected files and compare them with the manifest
    Verify {
        #[command(flatten)]
        sel: Selection,
        /// Print the verification report as JSON on stdout
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run a task described by a JSON file (algo, file, mode, filesets, base_dir)
    Run {
        #[arg(long)]
        config: PathBuf,
    },
    /// List supported hash algorithms
    Algorithms,
}

#[derive(Args)]
struct Selection {
    /// Manifest file (relative paths are resolved against --base-dir)
    #[arg(long)]
    file: PathBuf,
    #[arg(long, default_value = "sha256")]
    algo: String,
    /// Directory manifest paths are relative to (default: current directory)
    #[arg(long)]
    base_dir: Option<PathBuf>,
    #[arg(long)]
    include: Vec<String>,
    #[arg(long)]
    exclude: Vec<String>,
    /// One file-set per directory; the include/exclude globs apply to each
    #[arg(required = true)]
    dirs: Vec<PathBuf>,
}

impl Selection {
    fn into_config(self, mode: &str) -> TaskConfig {
        let mut cfg = TaskConfig::new(self.file).algo(self.algo).mode(mode);
        cfg.base_dir = self.base_dir;
        for dir in self.dirs {
            let mut set = FileSet::new(dir);
            set.include = self.include.clone();
            set.exclude = self.exclude.clone();
            cfg = cfg.fileset(set);
        }
        cfg
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);
    let progress = Progress::new(cli.progress);
    match cli.cmd {
        Cmd::Create(sel) => run_task(sel.into_config("create"), progress, false)?,
        Cmd::Verify { sel, json } => run_task(sel.into_config("verify"), progress, json)?,
        Cmd::Run { config } => run_config(&config, progress)?,
        Cmd::Algorithms => {
            for algo in HashAlgorithm::ALL {
                let marker = if algo == HashAlgorithm::default() { " (default)" } else { "" };
                println!("{}{}", algo.name(), marker);
            }
        }
    }
    Ok(())
}

fn init_logging(quiet: bool, verbose: bool) {
    let default = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn run_config(path: &Path, progress: Progress) -> Result<()> {
    let cfg = TaskConfig::from_json_file(path)
        .with_context(|| format!("load task file {}", path.display()))?;
    run_task(cfg, progress, false)
}

fn run_task(cfg: TaskConfig, progress: Progress, json: bool) -> Result<()> {
    let mut task = ManifestTask::new(cfg).with_progress(progress);
    if !task.init() {
        bail!("task initialisation failed");
    }
    let mode = task.config().mode.clone();
    match task.run() {
        Ok(outcome) => {
            if json {
                if let TaskOutcome::Verified { report } = &outcome {
                    println!("{}", serde_json::to_string_pretty(report)?);
                }
            } else {
                println!("OK");
            }
            Ok(())
        }
        Err(ManifestError::VerificationFailed(report)) if json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            bail!(ManifestError::VerificationFailed(report))
        }
        Err(e) => Err(e).with_context(|| format!("manifest {mode} failed")),
    }
}
