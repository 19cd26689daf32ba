//! Archive format conventions (NumPy `.npz`)

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extension NumPy gives a keyed-array archive
pub const NPZ_EXTENSION: &str = "npz";

/// Path an archive is actually written to.
///
/// Like `numpy.savez`, `.npz` is appended (not substituted) when the path
/// does not already end with it, so `out` becomes `out.npz` and
/// `model.bin` becomes `model.bin.npz`.
pub fn npz_output_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.as_os_str().as_encoded_bytes().ends_with(b".npz") {
        return path.to_path_buf();
    }

    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(NPZ_EXTENSION);
    PathBuf::from(name)
}

/// Configuration for writing checkpoints
#[derive(Debug, Clone, Default)]
pub struct SaveConfig {
    /// Deflate members (`numpy.savez_compressed`) instead of storing them
    pub compress: bool,
}

impl SaveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable/disable compression
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}
