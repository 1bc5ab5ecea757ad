//! Scalar element types of data arrays and their wire encodings.

use std::fmt;

/// Element type of a [`DataArray`](crate::scene::DataArray).
///
/// Mirrors the numeric subset of the VTK type enumeration. `IdType` is the
/// 64-bit signed index type used by cell connectivity arrays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ScalarType {
    /// Signed 8-bit integer (VTK_CHAR)
    Int8 = 2,
    /// Unsigned 8-bit integer (VTK_UNSIGNED_CHAR)
    Uint8 = 3,
    /// Signed 16-bit integer (VTK_SHORT)
    Int16 = 4,
    /// Unsigned 16-bit integer (VTK_UNSIGNED_SHORT)
    Uint16 = 5,
    /// Signed 32-bit integer (VTK_INT)
    Int32 = 6,
    /// Unsigned 32-bit integer (VTK_UNSIGNED_INT)
    Uint32 = 7,
    /// Signed 64-bit integer (VTK_LONG)
    Int64 = 8,
    /// Unsigned 64-bit integer (VTK_UNSIGNED_LONG)
    Uint64 = 9,
    /// 32-bit float (VTK_FLOAT)
    #[default]
    Float32 = 10,
    /// 64-bit float (VTK_DOUBLE)
    Float64 = 11,
    /// 64-bit signed index (VTK_ID_TYPE)
    IdType = 12,
}

impl ScalarType {
    /// Returns the size in bytes of a single element of this type.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Int64 | Self::Uint64 | Self::Float64 | Self::IdType => 8,
        }
    }

    /// Single-character code appended to content hashes.
    #[inline]
    pub const fn type_code(self) -> char {
        match self {
            Self::Int8 => 'b',
            Self::Uint8 => 'B',
            Self::Int16 => 'h',
            Self::Uint16 => 'H',
            Self::Int32 => 'i',
            Self::Uint32 => 'I',
            Self::Int64 => 'l',
            Self::Uint64 => 'L',
            Self::Float32 => 'f',
            Self::Float64 => 'd',
            Self::IdType => 'L',
        }
    }

    /// Typed-array tag the receiver decodes the payload with.
    ///
    /// 64-bit integers are narrowed before they are served, so they are
    /// announced as `Uint32Array`.
    #[inline]
    pub const fn wire_tag(self) -> &'static str {
        match self {
            Self::Int8 => "Int8Array",
            Self::Uint8 => "Uint8Array",
            Self::Int16 => "Int16Array",
            Self::Uint16 => "Uint16Array",
            Self::Int32 => "Int32Array",
            Self::Uint32 => "Uint32Array",
            Self::Int64 | Self::Uint64 | Self::IdType => "Uint32Array",
            Self::Float32 => "Float32Array",
            Self::Float64 => "Float64Array",
        }
    }


    /// Convert from the VTK type enumeration value.
    pub const fn from_vtk(v: u8) -> Option<Self> {
        match v {
            2 => Some(Self::Int8),
            3 => Some(Self::Uint8),
            4 => Some(Self::Int16),
            5 => Some(Self::Uint16),
            6 => Some(Self::Int32),
            7 => Some(Self::Uint32),
            8 => Some(Self::Int64),
            9 => Some(Self::Uint64),
            10 => Some(Self::Float32),
            11 => Some(Self::Float64),
            12 => Some(Self::IdType),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::IdType => "idtype",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sentinel written for index values that have no 32-bit representation.
pub const NO_VALUE_U32: u32 = u32::MAX;

/// Narrow signed 64-bit values to the 32-bit unsigned wire representation.
///
/// Negative values become [`NO_VALUE_U32`]; values above `u32::MAX`
/// saturate to `u32::MAX`.
pub fn narrow_to_u32(values: &[i64]) -> Vec<u32> {
    values
        .iter()
        .map(|&v| if v < 0 { NO_VALUE_U32 } else { u32::try_from(v).unwrap_or(u32::MAX) })
        .collect()
}

/// Unsigned counterpart of [`narrow_to_u32`], saturating at `u32::MAX`.
pub fn narrow_unsigned_to_u32(values: &[u64]) -> Vec<u32> {
    values.iter().map(|&v| u32::try_from(v).unwrap_or(u32::MAX)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(ScalarType::Int8.num_bytes(), 1);
        assert_eq!(ScalarType::Uint16.num_bytes(), 2);
        assert_eq!(ScalarType::Float32.num_bytes(), 4);
        assert_eq!(ScalarType::IdType.num_bytes(), 8);
    }

    #[test]
    fn test_type_codes() {
        assert_eq!(ScalarType::Float32.type_code(), 'f');
        assert_eq!(ScalarType::Float64.type_code(), 'd');
        assert_eq!(ScalarType::IdType.type_code(), 'L');
        assert_eq!(ScalarType::Uint8.type_code(), 'B');
    }

    #[test]
    fn test_wire_tags() {
        assert_eq!(ScalarType::Float32.wire_tag(), "Float32Array");
        assert_eq!(ScalarType::IdType.wire_tag(), "Uint32Array");
        assert_eq!(ScalarType::Int64.wire_tag(), "Uint32Array");
        assert_eq!(ScalarType::Uint16.wire_tag(), "Uint16Array");
    }

    #[test]
    fn test_from_vtk() {
        assert_eq!(ScalarType::from_vtk(10), Some(ScalarType::Float32));
        assert_eq!(ScalarType::from_vtk(12), Some(ScalarType::IdType));
        assert_eq!(ScalarType::from_vtk(1), None);
    }

    #[test]
    fn test_narrowing_saturates() {
        let narrowed = narrow_to_u32(&[0, 7, -1, -42, 1 << 40]);
        assert_eq!(narrowed, vec![0, 7, NO_VALUE_U32, NO_VALUE_U32, u32::MAX]);
        assert_eq!(narrow_unsigned_to_u32(&[3, u64::MAX]), vec![3, u32::MAX]);
    }
}
