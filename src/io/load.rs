//! Checkpoint loading

use super::model::Checkpoint;
use crate::tensor::ParamArray;
use crate::{Error, Result};
use ndarray::{ArrayD, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpyError, ReadNpzError, ReadableElement};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

/// Lazily reads arrays from one `.npz` checkpoint
///
/// Member names are listed up front; array data is decoded only when
/// [`read`](Self::read) is called, so members that are never requested
/// (such as pickled history objects) are never parsed. The file handle is
/// released when the reader is dropped.
pub struct CheckpointReader {
    path: PathBuf,
    npz: NpzReader<BufReader<File>>,
    keys: Vec<String>,
    index: HashMap<String, usize>,
}

impl CheckpointReader {
    /// Open a checkpoint archive and list its members
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = File::open(&path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;

        let mut npz = NpzReader::new(BufReader::new(file)).map_err(|source| Error::ReadArchive {
            path: path.clone(),
            source,
        })?;

        // `names()` already drops the `.npy` member suffix, giving the keys
        // the archive was written with.
        let keys = npz.names().map_err(|source| Error::ReadArchive {
            path: path.clone(),
            source,
        })?;

        let mut index = HashMap::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            index.entry(key.clone()).or_insert(i);
        }

        Ok(Self {
            path,
            npz,
            keys,
            index,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Array keys in archive order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Number of arrays in the archive
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Decode the array stored under `key`
    pub fn read(&mut self, key: &str) -> Result<ParamArray> {
        let member = *self.index.get(key).ok_or_else(|| Error::MissingKey {
            key: key.to_string(),
            path: self.path.clone(),
        })?;

        match read_member(&mut self.npz, member) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(Error::UnsupportedDtype {
                key: key.to_string(),
                path: self.path.clone(),
            }),
            Err(source) => Err(Error::ReadArchive {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Load every array of a checkpoint
///
/// # Example
///
/// ```no_run
/// use ckpt_average::io::load_checkpoint;
///
/// let ckpt = load_checkpoint("model.iter10000.npz").unwrap();
/// for (name, value) in ckpt.iter() {
///     println!("{name}: {:?} {}", value.shape(), value.dtype());
/// }
/// ```
pub fn load_checkpoint(path: impl AsRef<Path>) -> Result<Checkpoint> {
    let mut reader = CheckpointReader::open(path)?;
    let keys: Vec<String> = reader.keys().map(String::from).collect();

    let mut checkpoint = Checkpoint::new();
    for key in keys {
        let value = reader.read(&key)?;
        checkpoint.insert(key, value);
    }
    Ok(checkpoint)
}

/// Decode as one element type; `None` when the member stores a different dtype
fn decode_as<R, T>(
    npz: &mut NpzReader<R>,
    member: usize,
) -> std::result::Result<Option<ArrayD<T>>, ReadNpzError>
where
    R: Read + Seek,
    T: ReadableElement,
{
    match npz.by_index::<OwnedRepr<T>, IxDyn>(member) {
        Ok(array) => Ok(Some(array)),
        Err(ReadNpzError::Npy(ReadNpyError::WrongDescriptor(_))) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Decode the member at position `member` into the matching [`ParamArray`] variant.
///
/// Integer widths are widened to 64 bits. Returns `None` for dtypes with
/// no numeric representation here (objects, strings, complex, float16).
fn read_member<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    member: usize,
) -> std::result::Result<Option<ParamArray>, ReadNpzError> {
    if let Some(a) = decode_as::<R, f32>(npz, member)? {
        return Ok(Some(ParamArray::F32(a)));
    }
    if let Some(a) = decode_as::<R, f64>(npz, member)? {
        return Ok(Some(ParamArray::F64(a)));
    }

    if let Some(a) = decode_as::<R, i64>(npz, member)? {
        return Ok(Some(ParamArray::Int(a)));
    }
    if let Some(a) = decode_as::<R, i32>(npz, member)? {
        return Ok(Some(ParamArray::Int(a.mapv(i64::from))));
    }
    if let Some(a) = decode_as::<R, i16>(npz, member)? {
        return Ok(Some(ParamArray::Int(a.mapv(i64::from))));
    }
    if let Some(a) = decode_as::<R, i8>(npz, member)? {
        return Ok(Some(ParamArray::Int(a.mapv(i64::from))));
    }

    if let Some(a) = decode_as::<R, u64>(npz, member)? {
        return Ok(Some(ParamArray::UInt(a)));
    }
    if let Some(a) = decode_as::<R, u32>(npz, member)? {
        return Ok(Some(ParamArray::UInt(a.mapv(u64::from))));
    }
    if let Some(a) = decode_as::<R, u16>(npz, member)? {
        return Ok(Some(ParamArray::UInt(a.mapv(u64::from))));
    }
    if let Some(a) = decode_as::<R, u8>(npz, member)? {
        return Ok(Some(ParamArray::UInt(a.mapv(u64::from))));
    }

    if let Some(a) = decode_as::<R, bool>(npz, member)? {
        return Ok(Some(ParamArray::Bool(a)));
    }

    Ok(None)
}
