// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decoding of kernel result buffers back into host values.
//!
//! A list decode walks two cursors: one advancing sequentially through the
//! level-1 region (count plus one stack slot per element), one peeking into
//! heap regions resolved through relative pointers. The level-1 walk never
//! advances into heap space.

use super::{CodecError, CodecResult, KernelType, Value, BOOL_SIZE, DOUBLE_SIZE, INT_SIZE, PTR_SIZE};

/// Decode a value of type `ty` from `bytes` starting at `start_offset`.
///
/// Returns the value and the offset one past its stack part. For a
/// list-typed root, `start_offset` addresses the list body directly (the
/// count field, not a pointer) - the convention the execution backend uses
/// when it reports where a returned list lives.
pub fn decode(bytes: &[u8], ty: &KernelType, start_offset: usize) -> CodecResult<(Value, usize)> {
    ty.validate()?;
    log::trace!(
        "decoding {} bytes against type {} at offset {}",
        bytes.len(),
        ty,
        start_offset
    );

    let reader = Reader { buf: bytes };
    match ty {
        KernelType::List(elem) => reader.read_list_body(elem, start_offset),
        _ => reader.read_at(ty, start_offset),
    }
}

struct Reader<'a> {
    buf: &'a [u8],
}

impl Reader<'_> {
    fn take(&self, offset: usize, len: usize) -> CodecResult<&[u8]> {
        let end = offset.checked_add(len).filter(|&end| end <= self.buf.len());
        match end {
            Some(end) => Ok(&self.buf[offset..end]),
            None => Err(CodecError::TruncatedBuffer {
                offset,
                reason: "unexpected end of buffer".into(),
            }),
        }
    }

    fn read_i32(&self, offset: usize) -> CodecResult<(i32, usize)> {
        let bytes = self.take(offset, INT_SIZE)?;
        let v = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        Ok((v, offset + INT_SIZE))
    }

    fn read_at(&self, ty: &KernelType, offset: usize) -> CodecResult<(Value, usize)> {
        match ty {
            KernelType::Int => {
                let (v, next) = self.read_i32(offset)?;
                Ok((Value::Int(v), next))
            }
            KernelType::Bool => {
                let bytes = self.take(offset, BOOL_SIZE)?;
                Ok((Value::Bool(bytes[0] != 0), offset + BOOL_SIZE))
            }
            KernelType::Double => {
                let bytes = self.take(offset, DOUBLE_SIZE)?;
                let v = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                Ok((Value::Double(v), offset + DOUBLE_SIZE))
            }
            KernelType::Tuple(slots) => {
                let mut head = offset;
                let mut items = Vec::with_capacity(slots.len());
                for slot_ty in slots {
                    let (item, next) = self.read_at(slot_ty, head)?;
                    items.push(item);
                    head = next;
                }
                Ok((Value::Tuple(items), head))
            }
            KernelType::List(elem) => {
                let (pointer, _) = self.read_i32(offset)?;
                let region = self.resolve_pointer(offset, pointer)?;
                let (value, _) = self.read_list_body(elem, region)?;
                // The stack part of a list is just the pointer slot; how far
                // the heap decode reached is its own business.
                Ok((value, offset + PTR_SIZE))
            }
        }
    }

    /// Resolve a relative pointer read at `offset`. The target is measured
    /// from the pointer's own position and must land inside the buffer.
    fn resolve_pointer(&self, offset: usize, pointer: i32) -> CodecResult<usize> {
        let target = offset as i64 + i64::from(pointer);
        if target < 0 || target as usize >= self.buf.len() {
            return Err(CodecError::TruncatedBuffer {
                offset,
                reason: format!("list pointer {} resolves outside the buffer", pointer),
            });
        }
        Ok(target as usize)
    }

    /// Decode a list body (count plus level-1 region) at `region`.
    fn read_list_body(&self, elem: &KernelType, region: usize) -> CodecResult<(Value, usize)> {
        let (count, mut head) = self.read_i32(region)?;
        if count < 0 {
            return Err(CodecError::TruncatedBuffer {
                offset: region,
                reason: format!("negative element count {}", count),
            });
        }
        let count = count as usize;

        // The whole level-1 region must fit before any element is touched;
        // this also keeps a hostile count from driving a huge allocation.
        let level1 = (count as u64) * (elem.stack_size() as u64);
        if head as u64 + level1 > self.buf.len() as u64 {
            return Err(CodecError::TruncatedBuffer {
                offset: region,
                reason: format!("level-1 region of {} elements exceeds the buffer", count),
            });
        }

        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            let (item, next) = self.read_at(elem, head)?;
            items.push(item);
            head = next;
        }
        Ok((Value::List(items), head))
    }
}

#[cfg(test)]
mod tests {
    use super::super::encode;
    use super::*;

    fn ty(text: &str) -> KernelType {
        KernelType::parse(text).unwrap()
    }

    #[test]
    fn test_decode_primitives() {
        let (v, next) = decode(&0x0102_0304i32.to_le_bytes(), &ty("int"), 0).unwrap();
        assert_eq!(v, Value::Int(0x0102_0304));
        assert_eq!(next, 4);

        let (v, next) = decode(&[1], &ty("bool"), 0).unwrap();
        assert_eq!(v, Value::Bool(true));
        assert_eq!(next, 1);

        let (v, _) = decode(&1.5f32.to_le_bytes(), &ty("double"), 0).unwrap();
        assert_eq!(v, Value::Double(1.5));
    }

    #[test]
    fn test_decode_at_nonzero_offset() {
        let mut bytes = vec![0xEE, 0xEE];
        bytes.extend_from_slice(&(-7i32).to_le_bytes());
        let (v, next) = decode(&bytes, &ty("int"), 2).unwrap();
        assert_eq!(v, Value::Int(-7));
        assert_eq!(next, 6);
    }

    #[test]
    fn test_decode_tuple_advances_through_slots() {
        let value = Value::from((3, false, 0.25f32));
        let descriptor = ty("(int, bool, double)");
        let bytes = encode(&value, &descriptor).unwrap();
        let (v, next) = decode(&bytes, &descriptor, 0).unwrap();
        assert_eq!(v, value);
        assert_eq!(next, descriptor.stack_size());
    }

    #[test]
    fn test_decode_list_next_offset_covers_level1_walk() {
        let bytes = encode(&Value::from(vec![1, 2, 3]), &ty("int[]")).unwrap();
        let (v, next) = decode(&bytes, &ty("int[]"), 0).unwrap();
        assert_eq!(v, Value::from(vec![1, 2, 3]));
        // count + three inline ints
        assert_eq!(next, 16);
    }

    #[test]
    fn test_decode_nonzero_bool_is_true() {
        let (v, _) = decode(&[0xFF], &ty("bool"), 0).unwrap();
        assert_eq!(v, Value::Bool(true));
    }

    #[test]
    fn test_truncated_primitive() {
        let err = decode(&[1, 2, 3], &ty("int"), 0).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedBuffer { .. }));

        let err = decode(&[], &ty("bool"), 0).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedBuffer { .. }));
    }

    #[test]
    fn test_truncated_by_one_byte() {
        let value = Value::from((1, true, vec![vec![1, 2], vec![3]]));
        let descriptor = ty("(int, bool, int[][])");
        let bytes = encode(&value, &descriptor).unwrap();
        let err = decode(&bytes[..bytes.len() - 1], &descriptor, 0).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedBuffer { .. }));
    }

    #[test]
    fn test_pointer_resolving_outside_buffer() {
        // count=1, pointer slot pointing far past the end.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&1024i32.to_le_bytes());
        let err = decode(&bytes, &ty("int[][]"), 0).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedBuffer { .. }));

        // Negative pointer escaping the front of the buffer.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&(-64i32).to_le_bytes());
        let err = decode(&bytes, &ty("int[][]"), 0).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedBuffer { .. }));
    }

    #[test]
    fn test_negative_count() {
        let bytes = (-1i32).to_le_bytes();
        let err = decode(&bytes, &ty("int[]"), 0).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedBuffer { .. }));
    }

    #[test]
    fn test_oversized_count_rejected_before_allocation() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&i32::MAX.to_le_bytes());
        bytes.extend_from_slice(&[0; 8]);
        let err = decode(&bytes, &ty("int[]"), 0).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedBuffer { .. }));
    }

    #[test]
    fn test_invalid_type_tree_rejected() {
        let bad = KernelType::Tuple(vec![KernelType::Int]);
        let err = decode(&[0; 16], &bad, 0).unwrap_err();
        assert!(matches!(err, CodecError::MalformedType(_)));
    }
}
