//! Tagged parameter arrays
//!
//! Checkpoint values keep their element type and shape alongside the data,
//! so every accumulation step can check compatibility explicitly instead of
//! relying on broadcasting.

use ndarray::{ArrayD, Zip};
use std::fmt;

/// Element type of a [`ParamArray`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    F32,
    F64,
    /// Any signed integer width, widened to i64
    Int,
    /// Any unsigned integer width, widened to u64
    UInt,
    Bool,
}

impl DType {
    pub fn name(&self) -> &'static str {
        match self {
            DType::F32 => "float32",
            DType::F64 => "float64",
            DType::Int => "int64",
            DType::UInt => "uint64",
            DType::Bool => "bool",
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DType::F32 | DType::F64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shapes of two arrays disagree, so they cannot be added elementwise
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMismatch {
    pub expected: Vec<usize>,
    pub found: Vec<usize>,
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected shape {:?}, found {:?}", self.expected, self.found)
    }
}

/// A named parameter's value: a dynamic-rank array of one element type
#[derive(Debug, Clone, PartialEq)]
pub enum ParamArray {
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    Int(ArrayD<i64>),
    UInt(ArrayD<u64>),
    Bool(ArrayD<bool>),
}

impl ParamArray {
    pub fn dtype(&self) -> DType {
        match self {
            ParamArray::F32(_) => DType::F32,
            ParamArray::F64(_) => DType::F64,
            ParamArray::Int(_) => DType::Int,
            ParamArray::UInt(_) => DType::UInt,
            ParamArray::Bool(_) => DType::Bool,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            ParamArray::F32(a) => a.shape(),
            ParamArray::F64(a) => a.shape(),
            ParamArray::Int(a) => a.shape(),
            ParamArray::UInt(a) => a.shape(),
            ParamArray::Bool(a) => a.shape(),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the data widened to f64
    pub fn to_f64(&self) -> ArrayD<f64> {
        match self {
            ParamArray::F32(a) => a.mapv(f64::from),
            ParamArray::F64(a) => a.clone(),
            ParamArray::Int(a) => a.mapv(|x| x as f64),
            ParamArray::UInt(a) => a.mapv(|x| x as f64),
            ParamArray::Bool(a) => a.mapv(|x| if x { 1.0 } else { 0.0 }),
        }
    }

    /// Divide every element by `count` using true division.
    ///
    /// Single precision stays single precision; every other element type
    /// comes back as f64, matching NumPy's `array / n`.
    pub fn scaled_by_count(&self, count: usize) -> ParamArray {
        match self {
            ParamArray::F32(a) => {
                let divisor = count as f32;
                ParamArray::F32(a.mapv(|x| x / divisor))
            }
            ParamArray::F64(a) => {
                let divisor = count as f64;
                ParamArray::F64(a.mapv(|x| x / divisor))
            }
            other => {
                let divisor = count as f64;
                ParamArray::F64(other.to_f64().mapv_into(|x| x / divisor))
            }
        }
    }

    /// Add `other` into `self` elementwise, keeping `self`'s element type.
    ///
    /// Mixed precision sums are computed in f64 and narrowed back when the
    /// accumulator is f32. A non-float accumulator is promoted to f64 first.
    /// Nothing is modified when the shapes differ.
    pub fn add_assign(&mut self, other: &ParamArray) -> Result<(), ShapeMismatch> {
        if self.shape() != other.shape() {
            return Err(ShapeMismatch {
                expected: self.shape().to_vec(),
                found: other.shape().to_vec(),
            });
        }

        if !self.dtype().is_float() {
            *self = ParamArray::F64(self.to_f64());
        }

        match (self, other) {
            (ParamArray::F32(acc), ParamArray::F32(c)) => *acc += c,
            (ParamArray::F32(acc), c) => {
                let c = c.to_f64();
                Zip::from(acc)
                    .and(&c)
                    .for_each(|a, &b| *a = (f64::from(*a) + b) as f32);
            }
            (ParamArray::F64(acc), ParamArray::F64(c)) => *acc += c,
            (ParamArray::F64(acc), c) => *acc += &c.to_f64(),
            _ => unreachable!("accumulator was promoted to a float type above"),
        }

        Ok(())
    }
}

impl From<ArrayD<f32>> for ParamArray {
    fn from(a: ArrayD<f32>) -> Self {
        ParamArray::F32(a)
    }
}

impl From<ArrayD<f64>> for ParamArray {
    fn from(a: ArrayD<f64>) -> Self {
        ParamArray::F64(a)
    }
}

impl From<ArrayD<i64>> for ParamArray {
    fn from(a: ArrayD<i64>) -> Self {
        ParamArray::Int(a)
    }
}

impl From<ArrayD<u64>> for ParamArray {
    fn from(a: ArrayD<u64>) -> Self {
        ParamArray::UInt(a)
    }
}

impl From<ArrayD<bool>> for ParamArray {
    fn from(a: ArrayD<bool>) -> Self {
        ParamArray::Bool(a)
    }
}
