// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # qhost - Host-side value codec for compiled quantum kernels
//!
//! A host program that calls into a compiled quantum kernel has to hand
//! arguments over, and take results back, through a raw shared-memory block
//! laid out the way the kernel runtime expects. This crate implements that
//! binary interface: a compact textual type grammar (`int`, `bool`, `double`,
//! `T[]`, `(T1, T2, ...)`, arbitrarily nested) and the matching little-endian
//! wire codec with stack/heap separation and relative-pointer indirection for
//! variable-length nested structures.
//!
//! Compiler invocation, backend transport and process lifecycles are the
//! caller's business; this crate only produces and consumes the bytes.
//!
//! ## Quick Start
//!
//! ```rust
//! use qhost::{decode, encode, KernelType, Value};
//!
//! let value = Value::from((42, true, vec![1, 2, 3]));
//! let ty: KernelType = "(int, bool, int[])".parse()?;
//!
//! let bytes = encode(&value, &ty)?;
//! let (back, _) = decode(&bytes, &ty, 0)?;
//! assert_eq!(back, value);
//! # Ok::<(), qhost::CodecError>(())
//! ```
//!
//! ## Wire format at a glance
//!
//! | Type     | Stack part              | Heap part                          |
//! |----------|-------------------------|------------------------------------|
//! | `int`    | 4 bytes, signed LE      | -                                  |
//! | `bool`   | 1 byte, 0 or 1          | -                                  |
//! | `double` | 4 bytes, IEEE-754 f32   | -                                  |
//! | tuple    | slots concatenated      | -                                  |
//! | list     | 4-byte relative pointer | 4-byte count + element stack parts |
//!
//! `double` is single precision on the wire; the name comes from the kernel
//! language and is kept for binary compatibility.

/// Binary value codec (type descriptors, encode, decode).
pub mod codec;

pub use codec::{decode, encode, CodecError, CodecResult, KernelType, Value};
