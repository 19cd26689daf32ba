//! # ckpt-average: Checkpoint Averaging
//!
//! Averages the parameters of several model checkpoints stored as NumPy
//! `.npz` archives into one checkpoint, e.g. snapshots of the same model
//! trained from different seeds.
//!
//! ## Architecture
//!
//! - **average**: running per-key mean across checkpoints
//! - **io**: `.npz` checkpoint loading and saving
//! - **tensor**: tagged parameter arrays with explicit shape/dtype checks
//! - **config**: command-line interface

pub mod average;
pub mod config;
pub mod io;
pub mod tensor;

pub mod error;

// Re-export commonly used types
pub use average::{average_checkpoints, AverageSummary, Averager, HISTORY_KEY};
pub use error::{Error, Result};
pub use io::Checkpoint;
pub use tensor::ParamArray;
