//! Data arrays - the typed buffers behind points, cells and attributes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use super::{next_mtime, ObjectId};
use crate::util::ScalarType;

/// Typed backing store of a [`DataArray`].
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayData {
    Int8(Vec<i8>),
    Uint8(Vec<u8>),
    Int16(Vec<i16>),
    Uint16(Vec<u16>),
    Int32(Vec<i32>),
    Uint32(Vec<u32>),
    Int64(Vec<i64>),
    Uint64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    /// 64-bit signed index values (cell connectivity, point ids)
    IdType(Vec<i64>),
}

/// Run `$body` with `$v` bound to the inner vector, whatever its type.
macro_rules! with_values {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ArrayData::Int8($v) => $body,
            ArrayData::Uint8($v) => $body,
            ArrayData::Int16($v) => $body,
            ArrayData::Uint16($v) => $body,
            ArrayData::Int32($v) => $body,
            ArrayData::Uint32($v) => $body,
            ArrayData::Int64($v) => $body,
            ArrayData::Uint64($v) => $body,
            ArrayData::Float32($v) => $body,
            ArrayData::Float64($v) => $body,
            ArrayData::IdType($v) => $body,
        }
    };
}

impl ArrayData {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Self::Int8(_) => ScalarType::Int8,
            Self::Uint8(_) => ScalarType::Uint8,
            Self::Int16(_) => ScalarType::Int16,
            Self::Uint16(_) => ScalarType::Uint16,
            Self::Int32(_) => ScalarType::Int32,
            Self::Uint32(_) => ScalarType::Uint32,
            Self::Int64(_) => ScalarType::Int64,
            Self::Uint64(_) => ScalarType::Uint64,
            Self::Float32(_) => ScalarType::Float32,
            Self::Float64(_) => ScalarType::Float64,
            Self::IdType(_) => ScalarType::IdType,
        }
    }

    /// Number of scalar values (tuples x components).
    pub fn len(&self) -> usize {
        with_values!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw backing bytes in native (little-endian) layout.
    pub fn as_bytes(&self) -> &[u8] {
        with_values!(self, v => bytemuck::cast_slice(v.as_slice()))
    }

    /// Value at flat index `i` as f64.
    #[inline]
    pub fn value_f64(&self, i: usize) -> Option<f64> {
        with_values!(self, v => v.get(i).map(|&x| x as f64))
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        with_values!(self, v => v.iter().map(|&x| x as f64).collect())
    }

    /// Values as i64, truncating floats. Used for connectivity arrays.
    pub fn to_i64_vec(&self) -> Vec<i64> {
        with_values!(self, v => v.iter().map(|&x| x as i64).collect())
    }

    /// Build a new store by picking whole tuples out of `sources`.
    ///
    /// Each pick is `(source index, tuple index)`. Returns `None` if the
    /// sources do not share one element type or a pick is out of range.
    pub fn assemble(sources: &[&ArrayData], components: usize, picks: &[(usize, usize)]) -> Option<ArrayData> {
        macro_rules! assemble_as {
            ($variant:ident) => {{
                let mut out = Vec::with_capacity(picks.len() * components);
                for &(s, t) in picks {
                    let ArrayData::$variant(v) = sources.get(s)? else {
                        return None;
                    };
                    out.extend_from_slice(v.get(t * components..(t + 1) * components)?);
                }
                Some(ArrayData::$variant(out))
            }};
        }

        match sources.first()? {
            Self::Int8(_) => assemble_as!(Int8),
            Self::Uint8(_) => assemble_as!(Uint8),
            Self::Int16(_) => assemble_as!(Int16),
            Self::Uint16(_) => assemble_as!(Uint16),
            Self::Int32(_) => assemble_as!(Int32),
            Self::Uint32(_) => assemble_as!(Uint32),
            Self::Int64(_) => assemble_as!(Int64),
            Self::Uint64(_) => assemble_as!(Uint64),
            Self::Float32(_) => assemble_as!(Float32),
            Self::Float64(_) => assemble_as!(Float64),
            Self::IdType(_) => assemble_as!(IdType),
        }
    }
}

macro_rules! impl_from_vec {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(impl From<Vec<$t>> for ArrayData {
            fn from(v: Vec<$t>) -> Self {
                Self::$variant(v)
            }
        })*
    };
}

impl_from_vec!(
    i8 => Int8, u8 => Uint8, i16 => Int16, u16 => Uint16,
    i32 => Int32, u32 => Uint32, u64 => Uint64,
    f32 => Float32, f64 => Float64,
);

// i64 maps to the index type: that is what scene code builds by hand.
impl From<Vec<i64>> for ArrayData {
    fn from(v: Vec<i64>) -> Self {
        Self::IdType(v)
    }
}

/// A named, typed array of `components`-wide tuples.
///
/// Owned by the scene through `Arc`; the strong count doubles as the
/// external reference count the array cache sweeps on. Every mutation
/// bumps the modification time.
#[derive(Debug)]
pub struct DataArray {
    id: ObjectId,
    name: Option<String>,
    components: usize,
    component_names: Vec<Option<String>>,
    data: RwLock<ArrayData>,
    mtime: AtomicU64,
}

impl DataArray {
    /// Create an array. `components` is clamped to at least 1.
    pub fn new(name: Option<&str>, components: usize, data: impl Into<ArrayData>) -> Self {
        Self {
            id: ObjectId::next(),
            name: name.map(str::to_string),
            components: components.max(1),
            component_names: Vec::new(),
            data: RwLock::new(data.into()),
            mtime: AtomicU64::new(next_mtime()),
        }
    }

    /// Create a named array already wrapped for sharing.
    pub fn shared(name: &str, components: usize, data: impl Into<ArrayData>) -> Arc<Self> {
        Arc::new(Self::new(Some(name), components, data))
    }

    /// Attach per-component names (reported in range metadata).
    pub fn with_component_names<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.component_names = names.iter().map(|n| Some(n.as_ref().to_string())).collect();
        self
    }

    pub(crate) fn with_component_names_of(mut self, other: &DataArray) -> Self {
        self.component_names = other.component_names.clone();
        self
    }

    #[inline]
    pub fn object_id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn components(&self) -> usize {
        self.components
    }

    pub fn component_name(&self, component: usize) -> Option<&str> {
        self.component_names.get(component).and_then(|n| n.as_deref())
    }

    pub fn scalar_type(&self) -> ScalarType {
        self.data.read().scalar_type()
    }

    /// Number of scalar values (tuples x components).
    pub fn num_values(&self) -> usize {
        self.data.read().len()
    }

    pub fn num_tuples(&self) -> usize {
        self.num_values() / self.components
    }

    pub fn is_empty(&self) -> bool {
        self.num_values() == 0
    }

    /// Current modification time.
    #[inline]
    pub fn mtime(&self) -> u64 {
        self.mtime.load(Ordering::Acquire)
    }

    /// Mark the array as modified without touching its data.
    pub fn modified(&self) {
        self.mtime.store(next_mtime(), Ordering::Release);
    }

    /// Read access to the backing store.
    pub fn read(&self) -> RwLockReadGuard<'_, ArrayData> {
        self.data.read()
    }

    /// Replace the backing store.
    pub fn set_data(&self, data: impl Into<ArrayData>) {
        *self.data.write() = data.into();
        self.modified();
    }

    /// Mutate the backing store in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut ArrayData) -> R) -> R {
        let result = f(&mut self.data.write());
        self.modified();
        result
    }

    /// `(min, max)` of one component. Empty arrays report `(0, 0)`.
    pub fn range(&self, component: usize) -> (f64, f64) {
        let data = self.data.read();
        let comps = self.components;
        if component >= comps {
            return (0.0, 0.0);
        }
        let values = (component..data.len()).step_by(comps).filter_map(|i| data.value_f64(i));
        fold_range(values)
    }

    /// `(min, max)` of the per-tuple euclidean norm.
    pub fn magnitude_range(&self) -> (f64, f64) {
        let data = self.data.read();
        let comps = self.components;
        let tuples = data.len() / comps;
        let norms = (0..tuples).map(|t| {
            (0..comps)
                .filter_map(|c| data.value_f64(t * comps + c))
                .map(|x| x * x)
                .sum::<f64>()
                .sqrt()
        });
        fold_range(norms)
    }
}

fn fold_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut seen = false;
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.filter(|v| !v.is_nan()) {
        seen = true;
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if seen { (lo, hi) } else { (0.0, 0.0) }
}

/// Build a legacy cell connectivity array (`[n, id0 .. idn-1, ...]`).
pub fn cell_array(cells: &[&[i64]]) -> Arc<DataArray> {
    let mut flat = Vec::with_capacity(cells.iter().map(|c| c.len() + 1).sum());
    for cell in cells {
        flat.push(cell.len() as i64);
        flat.extend_from_slice(cell);
    }
    Arc::new(DataArray::new(None, 1, ArrayData::IdType(flat)))
}

/// Number of cells encoded in a legacy connectivity array.
pub fn count_cells(connectivity: &[i64]) -> usize {
    let mut i = 0;
    let mut count = 0;
    while i < connectivity.len() {
        let n = connectivity[i].max(0) as usize;
        i += n + 1;
        count += 1;
    }
    count
}
