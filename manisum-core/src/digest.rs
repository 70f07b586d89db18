//! Streaming file digests with a configurable algorithm.
//!
//! Files are read in fixed-size chunks so memory use stays constant no matter
//! how large a file is. Digests are rendered as lowercase hex.

use md5::Md5;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512, Sha512_256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use crate::error::{ManifestError, Result};

/// Read buffer size used when streaming file contents.
pub const READ_CHUNK: usize = 64 * 1024;

/// Hash algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    Md5,
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
    Sha512_256,
    Blake3,
}

impl HashAlgorithm {
    /// Every supported algorithm, in the order `algorithms` lists them.
    pub const ALL: [HashAlgorithm; 7] = [
        Self::Md5,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
        Self::Sha512_256,
        Self::Blake3,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Sha512_256 => "sha512/256",
            Self::Blake3 => "blake3",
        }
    }

    /// Digest length in bytes.
    pub const fn output_len(&self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha224 => 28,
            Self::Sha256 | Self::Sha512_256 | Self::Blake3 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    pub const fn hex_len(&self) -> usize {
        self.output_len() * 2
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| ManifestError::UnsupportedAlgorithm(s.to_string()))
    }
}

/// Incremental hasher over any supported algorithm.
pub struct Hasher {
    state: HasherState,
}

enum HasherState {
    Md5(Md5),
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
    Sha512_256(Sha512_256),
    Blake3(Box<blake3::Hasher>),
}

impl Hasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let state = match algorithm {
            HashAlgorithm::Md5 => HasherState::Md5(Md5::new()),
            HashAlgorithm::Sha224 => HasherState::Sha224(Sha224::new()),
            HashAlgorithm::Sha256 => HasherState::Sha256(Sha256::new()),
            HashAlgorithm::Sha384 => HasherState::Sha384(Sha384::new()),
            HashAlgorithm::Sha512 => HasherState::Sha512(Sha512::new()),
            HashAlgorithm::Sha512_256 => HasherState::Sha512_256(Sha512_256::new()),
            HashAlgorithm::Blake3 => HasherState::Blake3(Box::new(blake3::Hasher::new())),
        };
        Self { state }
    }

    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            HasherState::Md5(h) => h.update(data),
            HasherState::Sha224(h) => h.update(data),
            HasherState::Sha256(h) => h.update(data),
            HasherState::Sha384(h) => h.update(data),
            HasherState::Sha512(h) => h.update(data),
            HasherState::Sha512_256(h) => h.update(data),
            HasherState::Blake3(h) => {
                h.update(data);
            }
        }
    }

    /// Consume the hasher and return the lowercase hex digest.
    pub fn finalize_hex(self) -> String {
        match self.state {
            HasherState::Md5(h) => hex::encode(h.finalize()),
            HasherState::Sha224(h) => hex::encode(h.finalize()),
            HasherState::Sha256(h) => hex::encode(h.finalize()),
            HasherState::Sha384(h) => hex::encode(h.finalize()),
            HasherState::Sha512(h) => hex::encode(h.finalize()),
            HasherState::Sha512_256(h) => hex::encode(h.finalize()),
            HasherState::Blake3(h) => h.finalize().to_hex().to_string(),
        }
    }
}

/// Hash everything `reader` yields, `READ_CHUNK` bytes at a time.
///
/// Returns the hex digest and the number of bytes consumed.
pub fn digest_reader<R: Read>(mut reader: R, algorithm: HashAlgorithm) -> io::Result<(String, u64)> {
    let mut hasher = Hasher::new(algorithm);
    let mut buf = vec![0u8; READ_CHUNK];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
        total += n as u64;
    }
    Ok((hasher.finalize_hex(), total))
}

pub fn digest_bytes(data: &[u8], algorithm: HashAlgorithm) -> String {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finalize_hex()
}

/// Digest a file's contents. Fails with [`ManifestError::Io`] naming `path`.
pub fn digest_file(path: &Path, algorithm: HashAlgorithm) -> Result<String> {
    digest_file_counted(path, algorithm).map(|(hex, _)| hex)
}

pub(crate) fn digest_file_counted(path: &Path, algorithm: HashAlgorithm) -> Result<(String, u64)> {
    let f = File::open(path).map_err(|e| ManifestError::io(path, e))?;
    digest_reader(f, algorithm).map_err(|e| ManifestError::io(path, e))
}
