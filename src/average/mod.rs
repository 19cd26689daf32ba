//! Checkpoint averaging
//!
//! Combines N checkpoints into one by parameter-wise arithmetic mean:
//!
//! - every array is divided by the total number of inputs `n` as it is read
//!   and summed into a running accumulator, keyed by name;
//! - a key missing from some inputs is still divided by `n`, so its result
//!   is `sum / n` over the inputs that do have it;
//! - a contribution whose shape differs from the first one seen for that key
//!   is skipped with a warning and listed in the [`AverageSummary`];
//! - the training-history array [`HISTORY_KEY`] is never read or written.

mod accumulator;


pub use accumulator::Averager;

use crate::io::{save_checkpoint, SaveConfig};
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Key under which checkpoints store their validation-error history
pub const HISTORY_KEY: &str = "history_errs";

/// A contribution dropped because its shape disagreed with the accumulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedContribution {
    /// Parameter name
    pub key: String,
    /// Checkpoint the contribution came from
    pub source: PathBuf,
    /// Shape held by the accumulator
    pub expected: Vec<usize>,
    /// Shape found in `source`
    pub found: Vec<usize>,
}

/// Outcome of [`average_checkpoints`]
#[derive(Debug, Clone)]
pub struct AverageSummary {
    /// Number of input checkpoints (the divisor)
    pub inputs: usize,
    /// Number of arrays written
    pub keys: usize,
    /// Contributions skipped for shape mismatches, in encounter order
    pub skipped: Vec<SkippedContribution>,
    /// Path actually written (with `.npz` appended if it was missing)
    pub output: PathBuf,
}

/// Average `models` parameter-wise and write the result to `output`
///
/// Inputs are read one at a time in the given order, each file closed
/// before the next is opened. A progress line is printed for every input
/// and before saving. Any read or write failure aborts the run with
/// nothing written; an empty `models` list fails before touching the disk.
///
/// # Example
///
/// ```no_run
/// use ckpt_average::average::average_checkpoints;
///
/// let summary = average_checkpoints(
///     &["run1/model.npz", "run2/model.npz", "run3/model.npz"],
///     "model.avg.npz",
/// )
/// .unwrap();
/// assert_eq!(summary.inputs, 3);
/// ```
pub fn average_checkpoints<P: AsRef<Path>>(
    models: &[P],
    output: impl AsRef<Path>,
) -> Result<AverageSummary> {
    let mut averager = Averager::new(models.len())?;

    for model in models {
        let model = model.as_ref();
        println!("Loading {}", model.display());
        averager.add_file(model)?;
    }

    let output = output.as_ref();
    println!("Saving to {}", output.display());

    let inputs = averager.count();
    let (checkpoint, skipped) = averager.finish();
    let written = save_checkpoint(&checkpoint, output, &SaveConfig::default())?;

    info!(
        "Averaged {} arrays over {} checkpoints into {}",
        checkpoint.len(),
        inputs,
        written.display()
    );
    if !skipped.is_empty() {
        info!("{} contributions skipped for shape mismatches", skipped.len());
    }

    Ok(AverageSummary {
        inputs,
        keys: checkpoint.len(),
        skipped,
        output: written,
    })
}
