//! Checkpoint I/O - Loading and saving keyed-array archives
//!
//! Checkpoints are NumPy `.npz` archives: a zip file holding one `.npy`
//! member per named array. Files written here load with `numpy.load`.

mod format;
mod load;
mod model;
mod save;


pub use format::{npz_output_path, SaveConfig, NPZ_EXTENSION};
pub use load::{load_checkpoint, CheckpointReader};
pub use model::Checkpoint;
pub use save::save_checkpoint;
