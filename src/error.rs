//! Error types for checkpoint averaging

use ndarray_npy::{ReadNpzError, WriteNpzError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no input models given: at least one checkpoint is required to compute an average")]
    EmptyModelList,

    #[error("failed to open checkpoint {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read checkpoint {}: {source}", .path.display())]
    ReadArchive {
        path: PathBuf,
        #[source]
        source: ReadNpzError,
    },

    #[error("failed to write checkpoint {}: {source}", .path.display())]
    WriteArchive {
        path: PathBuf,
        #[source]
        source: WriteNpzError,
    },

    #[error("failed to persist checkpoint to {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("checkpoint {} has no array named '{key}'", .path.display())]
    MissingKey { key: String, path: PathBuf },

    #[error("array '{key}' in {} has an unsupported dtype", .path.display())]
    UnsupportedDtype { key: String, path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
