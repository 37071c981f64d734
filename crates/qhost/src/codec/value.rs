// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host-side values exchanged with kernel functions.

use std::fmt;

/// A host value with a kernel-side encoding.
///
/// This is a closed sum: anything a kernel function can accept or return is
/// one of these five shapes. `Double` holds an `f32` because the wire format
/// is single precision (see [`crate::codec::KernelType::Double`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Bool(bool),
    Double(f32),
    List(Vec<Value>),
    Tuple(Vec<Value>),
}

impl Value {
    /// Try to get as i32.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f32.
    pub fn as_double(&self) -> Option<f32> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as list elements.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get as tuple slots.
    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Double(_) => "double",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
        }
    }
}

/// Renders the value as a kernel-source literal: lists and tuples become
/// brace/paren initializers, booleans are lowercase.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", item)?;
            }
            Ok(())
        }

        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::List(items) => {
                f.write_str("{")?;
                write_items(f, items)?;
                f.write_str("}")
            }
            Self::Tuple(items) => {
                f.write_str("(")?;
                write_items(f, items)?;
                f.write_str(")")
            }
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Double(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// Generate `From` impls for native tuples (arity 2 to 4).
macro_rules! impl_tuple_from {
    ($($slot:ident),+) => {
        impl<$($slot: Into<Value>),+> From<($($slot,)+)> for Value {
            fn from(tuple: ($($slot,)+)) -> Self {
                #[allow(non_snake_case)]
                let ($($slot,)+) = tuple;
                Self::Tuple(vec![$($slot.into()),+])
            }
        }
    };
}

impl_tuple_from!(A, B);
impl_tuple_from!(A, B, C);
impl_tuple_from!(A, B, C, D);
