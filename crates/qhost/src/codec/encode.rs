// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encoding of host values into the kernel runtime's binary layout.
//!
//! Each call owns a fresh arena: one growable buffer plus a single
//! `heap_head` cursor acting as a bump allocator for list bodies. Fixed
//! width data is written in place; every nested list is a 4-byte relative
//! pointer into heap space beyond the region being filled.

use super::{CodecError, CodecResult, KernelType, Value, INT_SIZE};

/// Encode `value` against `ty` into a fresh byte buffer.
///
/// Fails with `TypeMismatch` when the value's shape conflicts with `ty`,
/// `UnsupportedValue` for an empty list, and `MalformedType` for a type
/// tree the grammar cannot express.
pub fn encode(value: &Value, ty: &KernelType) -> CodecResult<Vec<u8>> {
    ty.validate()?;
    log::trace!("encoding {} value against type {}", value.kind_name(), ty);

    let mut arena = Arena::new();
    match ty {
        // The outermost list is addressed body-first by the backend: the
        // count sits at offset 0 with no leading pointer, matching the
        // decode convention for a list-typed root.
        KernelType::List(elem) => {
            let Value::List(items) = value else {
                return Err(mismatch(ty, value));
            };
            arena.encode_list_body(items, elem)?;
        }
        _ => {
            arena.heap_head = ty.stack_size();
            arena.reserve_to(arena.heap_head);
            arena.encode_at(value, ty, 0)?;
        }
    }
    Ok(arena.buf)
}

fn mismatch(expected: &KernelType, found: &Value) -> CodecError {
    CodecError::TypeMismatch {
        expected: expected.to_string(),
        found: found.kind_name().to_string(),
    }
}

/// Per-call bump allocator. `heap_head` is the frontier of allocated space
/// and only ever grows; already-reserved regions are filled in place.
struct Arena {
    buf: Vec<u8>,
    heap_head: usize,
}

impl Arena {
    fn new() -> Self {
        Self {
            buf: Vec::new(),
            heap_head: 0,
        }
    }

    fn reserve_to(&mut self, end: usize) {
        if self.buf.len() < end {
            self.buf.resize(end, 0);
        }
    }

    /// Allocate `len` bytes at the heap frontier, returning the region start.
    fn bump(&mut self, len: usize) -> usize {
        let region = self.heap_head;
        self.heap_head += len;
        self.reserve_to(self.heap_head);
        region
    }

    fn write_i32(&mut self, pos: usize, v: i32) {
        self.buf[pos..pos + 4].copy_from_slice(&v.to_le_bytes());
    }

    fn encode_at(&mut self, value: &Value, ty: &KernelType, pos: usize) -> CodecResult<()> {
        match (ty, value) {
            (KernelType::Int, Value::Int(v)) => self.write_i32(pos, *v),
            (KernelType::Bool, Value::Bool(v)) => {
                self.buf[pos] = u8::from(*v);
            }
            (KernelType::Double, Value::Double(v)) => {
                self.buf[pos..pos + 4].copy_from_slice(&v.to_le_bytes());
            }
            (KernelType::Tuple(slots), Value::Tuple(items)) => {
                if slots.len() != items.len() {
                    return Err(mismatch(ty, value));
                }
                let mut cursor = pos;
                for (slot_ty, item) in slots.iter().zip(items) {
                    self.encode_at(item, slot_ty, cursor)?;
                    cursor += slot_ty.stack_size();
                }
            }
            (KernelType::List(elem), Value::List(items)) => {
                let region = self.heap_head;
                let offset = i32::try_from(region - pos).map_err(|_| {
                    CodecError::UnsupportedValue(
                        "value too large for a 32-bit relative pointer".into(),
                    )
                })?;
                self.write_i32(pos, offset);
                self.encode_list_body(items, elem)?;
            }
            _ => return Err(mismatch(ty, value)),
        }
        Ok(())
    }

    /// Write a list body at the heap frontier: 4-byte count, then the
    /// level-1 slots. The whole level-1 region is reserved before any
    /// element recursion so that nested list bodies land strictly after it.
    fn encode_list_body(&mut self, items: &[Value], elem: &KernelType) -> CodecResult<()> {
        if items.is_empty() {
            return Err(CodecError::UnsupportedValue(
                "cannot encode a list with zero elements".into(),
            ));
        }
        let count = i32::try_from(items.len()).map_err(|_| {
            CodecError::UnsupportedValue("list length exceeds the 32-bit count field".into())
        })?;

        let slot_size = elem.stack_size();
        let region = self.bump(INT_SIZE + items.len() * slot_size);
        self.write_i32(region, count);

        let mut slot = region + INT_SIZE;
        for item in items {
            self.encode_at(item, elem, slot)?;
            slot += slot_size;
        }
        Ok(())
    }
}
