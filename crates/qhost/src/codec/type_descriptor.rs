// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for kernel interface values.
//!
//! The textual grammar is the sole contract between the codec and its
//! callers:
//!
//! ```text
//! type       := primitive | list | tuple
//! primitive  := "int" | "bool" | "double"
//! list       := type "[]"
//! tuple      := "(" type ("," type)+ ")"
//! ```
//!
//! Whitespace is insignificant. `parse` and `Display` round-trip exactly.

use super::{CodecError, CodecResult, Value, BOOL_SIZE, DOUBLE_SIZE, INT_SIZE, PTR_SIZE};
use std::fmt;
use std::str::FromStr;

/// A structural type tree for kernel interface values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelType {
    /// 4-byte signed integer.
    Int,
    /// 1-byte boolean (signed byte holding 0 or 1).
    Bool,
    /// IEEE-754 single-precision float. The kernel language names it
    /// `double`; the 4-byte width is a wire-format fact.
    Double,
    /// Variable-length homogeneous sequence.
    List(Box<KernelType>),
    /// Fixed-arity heterogeneous sequence, arity >= 2.
    Tuple(Vec<KernelType>),
}

impl KernelType {
    /// Parse a type descriptor string. Whitespace is stripped first.
    pub fn parse(text: &str) -> CodecResult<Self> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        Self::parse_compact(&compact)
    }

    fn parse_compact(text: &str) -> CodecResult<Self> {
        // A trailing `[]` always binds to the whole remaining type: inner
        // list suffixes sit in front of a closing `)` or another `[]`, never
        // at the end of a longer descriptor.
        if let Some(elem) = text.strip_suffix("[]") {
            if elem.is_empty() {
                return Err(CodecError::MalformedType(
                    "missing element type before `[]`".into(),
                ));
            }
            return Ok(Self::List(Box::new(Self::parse_compact(elem)?)));
        }

        if let Some(body) = text.strip_prefix('(') {
            let Some(body) = body.strip_suffix(')') else {
                return Err(CodecError::MalformedType(format!(
                    "unbalanced parentheses in `{}`",
                    text
                )));
            };
            let slots = split_top_level(body)
                .ok_or_else(|| {
                    CodecError::MalformedType(format!(
                        "unbalanced parentheses or empty element in `{}`",
                        text
                    ))
                })?
                .into_iter()
                .map(Self::parse_compact)
                .collect::<CodecResult<Vec<_>>>()?;
            if slots.len() < 2 {
                return Err(CodecError::MalformedType(format!(
                    "tuple `{}` needs at least two element types",
                    text
                )));
            }
            return Ok(Self::Tuple(slots));
        }

        match text {
            "int" => Ok(Self::Int),
            "bool" => Ok(Self::Bool),
            "double" => Ok(Self::Double),
            other => Err(CodecError::MalformedType(format!(
                "unrecognized type `{}`",
                other
            ))),
        }
    }

    /// Infer the type of a live value.
    ///
    /// Lists must be non-empty (the element type of `[]` is ambiguous) and
    /// homogeneous; tuples infer per-slot.
    pub fn infer(value: &Value) -> CodecResult<Self> {
        match value {
            Value::Int(_) => Ok(Self::Int),
            Value::Bool(_) => Ok(Self::Bool),
            Value::Double(_) => Ok(Self::Double),
            Value::List(items) => {
                let first = items.first().ok_or_else(|| {
                    CodecError::UnsupportedValue(
                        "cannot infer the element type of an empty list".into(),
                    )
                })?;
                let elem = Self::infer(first)?;
                for item in &items[1..] {
                    let other = Self::infer(item)?;
                    if other != elem {
                        return Err(CodecError::TypeMismatch {
                            expected: elem.to_string(),
                            found: other.to_string(),
                        });
                    }
                }
                Ok(Self::List(Box::new(elem)))
            }
            Value::Tuple(items) => {
                if items.len() < 2 {
                    return Err(CodecError::MalformedType(format!(
                        "tuple of arity {} has no descriptor",
                        items.len()
                    )));
                }
                let slots = items.iter().map(Self::infer).collect::<CodecResult<_>>()?;
                Ok(Self::Tuple(slots))
            }
        }
    }

    /// Bytes a value of this type occupies inline at its write position,
    /// not counting any heap region it references. A list is a pointer slot
    /// regardless of its element type.
    pub fn stack_size(&self) -> usize {
        match self {
            Self::Int => INT_SIZE,
            Self::Bool => BOOL_SIZE,
            Self::Double => DOUBLE_SIZE,
            Self::List(_) => PTR_SIZE,
            Self::Tuple(slots) => slots.iter().map(Self::stack_size).sum(),
        }
    }

    /// Reject hand-built trees the grammar cannot express.
    pub fn validate(&self) -> CodecResult<()> {
        match self {
            Self::Int | Self::Bool | Self::Double => Ok(()),
            Self::List(elem) => elem.validate(),
            Self::Tuple(slots) => {
                if slots.len() < 2 {
                    return Err(CodecError::MalformedType(format!(
                        "tuple of arity {} has no descriptor",
                        slots.len()
                    )));
                }
                slots.iter().try_for_each(Self::validate)
            }
        }
    }
}

/// Split a tuple body at depth-0 commas. Returns `None` on unbalanced
/// parentheses or an empty slot.
fn split_top_level(body: &str) -> Option<Vec<&str>> {
    let mut slots = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                slots.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    slots.push(&body[start..]);
    if slots.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(slots)
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Bool => f.write_str("bool"),
            Self::Double => f.write_str("double"),
            Self::List(elem) => write!(f, "{}[]", elem),
            Self::Tuple(slots) => {
                f.write_str("(")?;
                for (i, slot) in slots.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", slot)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl FromStr for KernelType {
    type Err = CodecError;

    fn from_str(s: &str) -> CodecResult<Self> {
        Self::parse(s)
    }
}
