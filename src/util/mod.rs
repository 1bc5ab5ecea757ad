//! Utility types shared by every layer.
//!
//! - [`ScalarType`] - element types of data arrays and their wire encodings
//! - [`Error`] / [`Result`] - error handling
//! - [`Diagnostic`] - recoverable traversal conditions

mod error;
mod scalar;

pub use error::*;
pub use scalar::*;
