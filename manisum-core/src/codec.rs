//! Line-oriented manifest text format.
//!
//! Every entry is one line, `path<TAB>digest<LF>`, in ascending path order.
//! There is no header, footer or separator line.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::error::{ManifestError, Result};
use crate::manifest::Manifest;

pub fn encode(manifest: &Manifest) -> String {
    let mut out = String::new();
    for (path, digest) in manifest.iter() {
        out.push_str(path);
        out.push('\t');
        out.push_str(digest);
        out.push('\n');
    }
    out
}

/// Error from [`decode`]: either the reader failed or a line had no tab.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("read failed: {0}")]
    Io(#[source] std::io::Error),
    /// 1-based line number.
    #[error("line {0} has no tab separator")]
    Malformed(usize),
}

/// First path that cannot be written as a single manifest line.
fn unencodable_path(manifest: &Manifest) -> Option<&str> {
    manifest.paths().find(|p| p.contains(['\t', '\n', '\r']))
}

/// Parse manifest text.
///
/// Trailing whitespace is trimmed from each line and the text is split on the
/// first tab. Reading stops at end of input or at the first blank line; later
/// duplicates of a path win.
pub fn decode<R: BufRead>(reader: R) -> std::result::Result<Manifest, DecodeError> {
    let mut manifest = Manifest::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(DecodeError::Io)?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        let Some((path, digest)) = line.split_once('\t') else {
            return Err(DecodeError::Malformed(idx + 1));
        };
        manifest.insert(path, digest);
    }
    Ok(manifest)
}

pub fn decode_str(text: &str) -> std::result::Result<Manifest, DecodeError> {
    decode(text.as_bytes())
}

/// Read and decode the manifest at `path` under a shared lock.
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let unreadable = |source: std::io::Error| ManifestError::ManifestUnreadable { path: path.to_path_buf(), source };
    let f = File::open(path).map_err(unreadable)?;
    if !f.metadata().map_err(unreadable)?.is_file() {
        return Err(unreadable(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }
    f.lock_shared().map_err(unreadable)?;
    let res = decode(BufReader::new(&f));
    // Closing the handle releases the lock as well.
    let _ = f.unlock();
    res.map_err(|e| match e {
        DecodeError::Io(source) => unreadable(source),
        DecodeError::Malformed(line) => ManifestError::MalformedManifest { path: path.to_path_buf(), line },
    })
}

/// Encode `manifest` and write it to `path` under an exclusive lock.
///
/// The file is truncated only once the lock is held. Returns the number of
/// bytes written. A path containing a tab or line break is rejected before
/// the file is opened.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<u64> {
    let failed = |source: std::io::Error| ManifestError::Write { path: path.to_path_buf(), source };
    if let Some(bad) = unencodable_path(manifest) {
        return Err(failed(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("path {bad:?} contains a tab or line break"),
        )));
    }
    let text = encode(manifest);
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(failed)?;
    f.lock_exclusive().map_err(failed)?;
    let res = write_locked(&mut f, text.as_bytes());
    let _ = f.unlock();
    res.map_err(failed)?;
    Ok(text.len() as u64)
}

fn write_locked(f: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    f.set_len(0)?;
    f.write_all(bytes)?;
    f.sync_all()
}
