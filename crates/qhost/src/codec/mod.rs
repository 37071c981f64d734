// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary value codec for the quantum kernel runtime interface.
//!
//! Two collaborating pieces:
//!
//! - **Type descriptors** ([`KernelType`]): parsed from the textual grammar
//!   or inferred from a live [`Value`].
//! - **Wire codec** ([`encode`] / [`decode`]): converts values to and from
//!   the kernel runtime's in-memory layout. Fixed-width data lives in the
//!   "stack part" at its write position; each list body lives in a heap
//!   region reached through a 4-byte relative pointer.
//!
//! The buffer carries no header and no outer length prefix. The caller must
//! supply the same type descriptor to [`decode`] that was used to produce
//! the bytes, tracked out-of-band.

mod decode;
mod encode;
mod type_descriptor;
mod value;

pub use decode::decode;
pub use encode::encode;
pub use type_descriptor::KernelType;
pub use value::Value;

use std::fmt;

/// Wire width of `int` (signed, little-endian).
pub const INT_SIZE: usize = 4;
/// Wire width of `bool` (signed byte, value domain {0, 1}).
pub const BOOL_SIZE: usize = 1;
/// Wire width of `double`. Single precision on the wire despite the name.
pub const DOUBLE_SIZE: usize = 4;
/// Wire width of a relative pointer to a list's heap region.
pub const PTR_SIZE: usize = 4;

/// Errors surfaced by the codec. Every failure is fatal to the single
/// encode/decode call; there are no partial results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The value's runtime kind has no encoding (e.g. an empty list, whose
    /// element type cannot be inferred).
    UnsupportedValue(String),
    /// The value's shape conflicts with the provided or expected type.
    TypeMismatch { expected: String, found: String },
    /// Type descriptor text or type tree is structurally invalid.
    MalformedType(String),
    /// A decode read would leave the buffer, or a resolved heap pointer
    /// points outside it.
    TruncatedBuffer { offset: usize, reason: String },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedValue(reason) => write!(f, "unsupported value: {}", reason),
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found {}", expected, found)
            }
            Self::MalformedType(reason) => write!(f, "malformed type descriptor: {}", reason),
            Self::TruncatedBuffer { offset, reason } => {
                write!(f, "truncated buffer at offset {}: {}", offset, reason)
            }
        }
    }
}

impl std::error::Error for CodecError {}

pub type CodecResult<T> = core::result::Result<T, CodecError>;


#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_error_display_variants() {
        let err = CodecError::TruncatedBuffer {
            offset: 12,
            reason: "unexpected end of buffer".into(),
        };
        assert_eq!(
            err.to_string(),
            "truncated buffer at offset 12: unexpected end of buffer"
        );

        let err = CodecError::TypeMismatch {
            expected: "int[]".into(),
            found: "bool".into(),
        };
        assert_eq!(err.to_string(), "type mismatch: expected int[], found bool");

        let err = CodecError::MalformedType("unbalanced parentheses in `(int,`".into());
        assert_eq!(
            err.to_string(),
            "malformed type descriptor: unbalanced parentheses in `(int,`"
        );

        let err = CodecError::UnsupportedValue("empty list".into());
        assert_eq!(err.to_string(), "unsupported value: empty list");
    }
}
