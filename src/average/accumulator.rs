//! Running per-key average

use super::{SkippedContribution, HISTORY_KEY};
use crate::io::{Checkpoint, CheckpointReader};
use crate::tensor::ParamArray;
use crate::{Error, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Accumulates `value / n` per key across `n` checkpoints
///
/// The first contribution for a key fixes its shape and element type.
#[derive(Debug)]
pub struct Averager {
    count: usize,
    sum: Checkpoint,
    skipped: Vec<SkippedContribution>,
}

impl Averager {
    /// Create an accumulator for `count` checkpoints
    ///
    /// Fails with [`Error::EmptyModelList`] when `count` is zero, since no
    /// per-checkpoint weight exists.
    pub fn new(count: usize) -> Result<Self> {
        if count == 0 {
            return Err(Error::EmptyModelList);
        }
        Ok(Self {
            count,
            sum: Checkpoint::new(),
            skipped: Vec::new(),
        })
    }

    /// Divisor applied to every contribution
    pub fn count(&self) -> usize {
        self.count
    }

    /// Contributions dropped so far
    pub fn skipped(&self) -> &[SkippedContribution] {
        &self.skipped
    }

    /// Current partial sums
    pub fn partial(&self) -> &Checkpoint {
        &self.sum
    }

    /// Add one array read from `source`.
    ///
    /// Returns `false` when nothing was added: the key is the history key,
    /// or its shape differs from what the accumulator already holds.
    pub fn add(&mut self, source: &Path, key: &str, value: &ParamArray) -> bool {
        if key == HISTORY_KEY {
            return false;
        }

        let contribution = value.scaled_by_count(self.count);
        match self.sum.get_mut(key) {
            None => {
                self.sum.insert(key, contribution);
                true
            }
            Some(acc) => match acc.add_assign(&contribution) {
                Ok(()) => true,
                Err(mismatch) => {
                    warn!(
                        "Skipping '{}' from {}: {}",
                        key,
                        source.display(),
                        mismatch
                    );
                    self.skipped.push(SkippedContribution {
                        key: key.to_string(),
                        source: source.to_path_buf(),
                        expected: mismatch.expected,
                        found: mismatch.found,
                    });
                    false
                }
            },
        }
    }

    /// Add every array of one checkpoint file, returning how many contributed.
    ///
    /// The history key is skipped before its data is decoded. The file is
    /// closed when this returns.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let mut reader = CheckpointReader::open(path)?;
        let keys: Vec<String> = reader
            .keys()
            .filter(|key| *key != HISTORY_KEY)
            .map(String::from)
            .collect();

        let mut contributed = 0;
        for key in &keys {
            let value = reader.read(key)?;
            if self.add(reader.path(), key, &value) {
                contributed += 1;
            }
        }

        debug!(
            "{}: {} of {} arrays contributed",
            reader.path().display(),
            contributed,
            reader.len()
        );
        Ok(contributed)
    }

    /// Consume the accumulator, yielding the averaged checkpoint
    pub fn finish(self) -> (Checkpoint, Vec<SkippedContribution>) {
        (self.sum, self.skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    fn f32s(values: &[f32]) -> ParamArray {
        ParamArray::from(arr1(values).into_dyn())
    }

    #[test]
    fn test_zero_count_is_rejected() {
        assert!(matches!(Averager::new(0), Err(Error::EmptyModelList)));
    }

    #[test]
    fn test_add_divides_by_count() {
        let src = Path::new("a.npz");
        let mut avg = Averager::new(4).unwrap();
        assert!(avg.add(src, "w", &f32s(&[4.0, 8.0])));
        assert_eq!(avg.partial().get("w"), Some(&f32s(&[1.0, 2.0])));
    }

    #[test]
    fn test_add_accumulates() {
        let mut avg = Averager::new(2).unwrap();
        avg.add(Path::new("a.npz"), "w", &f32s(&[2.0, 4.0]));
        avg.add(Path::new("b.npz"), "w", &f32s(&[4.0, 8.0]));
        let (ckpt, skipped) = avg.finish();
        assert_eq!(ckpt.get("w"), Some(&f32s(&[3.0, 6.0])));
        assert!(skipped.is_empty());
    }

    #[test]
    fn test_history_key_ignored() {
        let mut avg = Averager::new(1).unwrap();
        assert!(!avg.add(Path::new("a.npz"), HISTORY_KEY, &f32s(&[0.3])));
        assert!(avg.partial().is_empty());
    }

    #[test]
    fn test_shape_mismatch_is_skipped_and_recorded() {
        let mut avg = Averager::new(2).unwrap();
        avg.add(Path::new("a.npz"), "w", &f32s(&[2.0, 2.0]));
        let added = avg.add(
            Path::new("b.npz"),
            "w",
            &ParamArray::from(arr2(&[[1.0f32, 1.0]]).into_dyn()),
        );

        assert!(!added);
        assert_eq!(avg.partial().get("w"), Some(&f32s(&[1.0, 1.0])));
        assert_eq!(
            avg.skipped(),
            &[SkippedContribution {
                key: "w".to_string(),
                source: Path::new("b.npz").to_path_buf(),
                expected: vec![2],
                found: vec![1, 2],
            }]
        );
    }

    #[test]
    fn test_first_dtype_is_kept() {
        let mut avg = Averager::new(2).unwrap();
        avg.add(Path::new("a.npz"), "w", &f32s(&[1.0]));
        avg.add(
            Path::new("b.npz"),
            "w",
            &ParamArray::from(arr1(&[3.0f64]).into_dyn()),
        );
        assert_eq!(avg.partial().get("w"), Some(&f32s(&[2.0])));
    }
}
