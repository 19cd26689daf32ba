//! Checkpoint saving

use super::format::{npz_output_path, SaveConfig};
use super::model::Checkpoint;
use crate::tensor::ParamArray;
use crate::{Error, Result};
use ndarray_npy::{NpzWriter, WriteNpzError};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use tempfile::Builder;

/// Save a checkpoint as a NumPy `.npz` archive
///
/// # Arguments
///
/// * `checkpoint` - Arrays to write, in checkpoint order
/// * `path` - Output path; `.npz` is appended when missing
/// * `config` - Save configuration
///
/// Returns the path actually written. The archive is assembled in a
/// temporary file next to the destination and renamed into place, so a
/// failure never leaves a truncated archive behind. The destination
/// directory must already exist.
///
/// # Example
///
/// ```no_run
/// use ckpt_average::io::{load_checkpoint, save_checkpoint, SaveConfig};
///
/// let ckpt = load_checkpoint("model.npz").unwrap();
/// let written = save_checkpoint(&ckpt, "copy", &SaveConfig::default()).unwrap();
/// assert_eq!(written.to_str(), Some("copy.npz"));
/// ```
pub fn save_checkpoint(
    checkpoint: &Checkpoint,
    path: impl AsRef<Path>,
    config: &SaveConfig,
) -> Result<PathBuf> {
    let path = npz_output_path(path);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = Builder::new();
    builder.prefix(".ckpt-average").suffix(".npz.tmp");
    // Same mode numpy would leave under the usual umask, instead of 0600.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }

    let tmp = builder.tempfile_in(dir).map_err(|source| Error::Persist {
        path: path.clone(),
        source,
    })?;

    let mut npz = if config.compress {
        NpzWriter::new_compressed(tmp)
    } else {
        NpzWriter::new(tmp)
    };

    let write_err = |source| Error::WriteArchive {
        path: path.clone(),
        source,
    };

    for (name, value) in checkpoint.iter() {
        write_member(&mut npz, name, value).map_err(write_err)?;
    }
    let tmp = npz.finish().map_err(write_err)?;

    tmp.persist(&path).map_err(|e| Error::Persist {
        path: path.clone(),
        source: e.error,
    })?;

    Ok(path)
}

fn write_member<W: Write + Seek>(
    npz: &mut NpzWriter<W>,
    name: &str,
    value: &ParamArray,
) -> std::result::Result<(), WriteNpzError> {
    match value {
        ParamArray::F32(a) => npz.add_array(name, a),
        ParamArray::F64(a) => npz.add_array(name, a),
        ParamArray::Int(a) => npz.add_array(name, a),
        ParamArray::UInt(a) => npz.add_array(name, a),
        ParamArray::Bool(a) => npz.add_array(name, a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::load_checkpoint;
    use ndarray::{arr1, arr2};
    use tempfile::TempDir;

    fn sample() -> Checkpoint {
        vec![
            (
                "encoder_W",
                ParamArray::from(arr2(&[[1.0f32, 2.0], [3.0, 4.0]]).into_dyn()),
            ),
            ("encoder_b", ParamArray::from(arr1(&[0.5f64, -0.5]).into_dyn())),
            ("counts", ParamArray::from(arr1(&[3i64]).into_dyn())),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_save_and_load_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.npz");

        let written = save_checkpoint(&sample(), &path, &SaveConfig::default()).unwrap();
        assert_eq!(written, path);

        let loaded = load_checkpoint(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_save_appends_npz_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("averaged");

        let written = save_checkpoint(&sample(), &path, &SaveConfig::default()).unwrap();
        assert_eq!(written, dir.path().join("averaged.npz"));
        assert!(written.exists());
        assert!(!path.exists());
    }

    #[test]
    fn test_save_compressed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.npz");
        let zeros: Checkpoint = vec![(
            "z",
            ParamArray::from(ndarray::ArrayD::<f32>::zeros(vec![64, 64])),
        )]
        .into_iter()
        .collect();

        save_checkpoint(&zeros, &path, &SaveConfig::new().with_compress(true)).unwrap();
        let size = std::fs::metadata(&path).unwrap().len();
        assert!(size < 64 * 64 * 4);

        assert_eq!(load_checkpoint(&path).unwrap(), zeros);
    }

    #[test]
    fn test_save_empty_checkpoint() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.npz");

        save_checkpoint(&Checkpoint::new(), &path, &SaveConfig::default()).unwrap();
        assert!(load_checkpoint(&path).unwrap().is_empty());
    }

    #[test]
    fn test_save_invalid_directory() {
        let result = save_checkpoint(
            &sample(),
            "/nonexistent/directory/model.npz",
            &SaveConfig::default(),
        );
        assert!(result.is_err());
        assert!(!Path::new("/nonexistent/directory/model.npz").exists());
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        save_checkpoint(&sample(), dir.path().join("m.npz"), &SaveConfig::default()).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["m.npz".to_string()]);
    }

    #[test]
    fn test_save_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.npz");
        std::fs::write(&path, b"old contents").unwrap();

        save_checkpoint(&sample(), &path, &SaveConfig::default()).unwrap();
        assert_eq!(load_checkpoint(&path).unwrap(), sample());
    }
}
