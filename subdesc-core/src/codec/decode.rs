// Copyright 2019-2023 Parity Technologies (UK) Ltd.
// This file is part of subdesc.
//
// subdesc is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// subdesc is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with subdesc.  If not, see <http://www.gnu.org/licenses/>.

use super::bits::decode_bits;
use super::compact::decode_compact_as;
use super::{DecodeError, DecodeErrorKind};
use crate::metadata::{Field, PrimitiveKind, TypeNode, TypeRegistry};
use crate::value::{Composite, Primitive, Value, Variant};
use crate::variant::{DiscriminantWidth, ValidIndices};
use crate::TypeId;

/// Walks the registry alongside the input bytes. The input is consumed from the front, so the
/// absolute offset of any position is worked out from how much of it remains.
pub struct Decoder<'r> {
	registry: &'r TypeRegistry,
	depth_limit: usize,
	/// Absolute offset of the first byte we were handed.
	base: usize,
	/// How many bytes we were handed.
	total: usize,
}

impl<'r> Decoder<'r> {
	pub fn new(registry: &'r TypeRegistry, depth_limit: usize, base: usize, total: usize) -> Self {
		Decoder { registry, depth_limit, base, total }
	}

	pub fn decode(&self, data: &mut &[u8], ty: TypeId) -> Result<Value, DecodeError> {
		self.decode_type(data, ty, 0)
	}

	fn error(&self, at: &[u8], ty: TypeId, kind: DecodeErrorKind) -> DecodeError {
		DecodeError { kind, ty, offset: self.base + self.total - at.len() }
	}

	fn take<'d>(&self, data: &mut &'d [u8], ty: TypeId, n: usize) -> Result<&'d [u8], DecodeError> {
		if data.len() < n {
			return Err(self.error(data, ty, DecodeErrorKind::UnexpectedEndOfInput { needed: n, available: data.len() }));
		}
		let (head, rest) = data.split_at(n);
		*data = rest;
		Ok(head)
	}

	fn fixed<const N: usize>(&self, data: &mut &[u8], ty: TypeId) -> Result<[u8; N], DecodeError> {
		let mut buf = [0u8; N];
		buf.copy_from_slice(self.take(data, ty, N)?);
		Ok(buf)
	}

	fn compact(&self, data: &mut &[u8], ty: TypeId, kind: PrimitiveKind) -> Result<u128, DecodeError> {
		let (value, len) = decode_compact_as(data, kind).map_err(|e| self.error(data, ty, e))?;
		*data = &data[len..];
		Ok(value)
	}

	fn decode_type(&self, data: &mut &[u8], ty: TypeId, depth: usize) -> Result<Value, DecodeError> {
		if depth > self.depth_limit {
			return Err(self.error(data, ty, DecodeErrorKind::DepthLimitExceeded(self.depth_limit)));
		}
		let node = self.registry.node(ty).ok_or_else(|| self.error(data, ty, DecodeErrorKind::TypeNotFound))?;
		match node {
			TypeNode::Primitive(kind) => self.decode_primitive(data, ty, *kind).map(Value::Primitive),
			TypeNode::Compact(inner) => self.decode_compact(data, ty, *inner, depth),
			TypeNode::Sequence(inner) => {
				// Sequences are preceded by a compact encoded length, so we know how many
				// values to pull out of the data.
				let len = self.compact(data, ty, PrimitiveKind::U32)?;
				// Every item takes at least a byte unless it's zero sized, and we won't build
				// more zero sized items than there are bytes left.
				if len > data.len() as u128 {
					return Err(self.error(data, ty, DecodeErrorKind::SequenceTooLong { len, available: data.len() }));
				}
				let values = (0..len).map(|_| self.decode_type(data, *inner, depth + 1)).collect::<Result<_, _>>()?;
				Ok(Value::Composite(Composite::Unnamed(values)))
			}
			TypeNode::Array { inner, len } => {
				// The length is part of the type, so it isn't present in the bytes.
				let values = (0..*len).map(|_| self.decode_type(data, *inner, depth + 1)).collect::<Result<_, _>>()?;
				Ok(Value::Composite(Composite::Unnamed(values)))
			}
			TypeNode::Tuple(ids) => {
				let values = ids.iter().map(|id| self.decode_type(data, *id, depth + 1)).collect::<Result<_, _>>()?;
				Ok(Value::Composite(Composite::Unnamed(values)))
			}
			TypeNode::Composite(fields) => self.decode_fields(data, fields, depth).map(Value::Composite),
			TypeNode::Variant(table) => {
				let at = *data;
				let index = match table.width() {
					DiscriminantWidth::Byte => self.fixed::<1>(data, ty)?[0] as u32,
					DiscriminantWidth::Compact => self.compact(data, ty, PrimitiveKind::U32)? as u32,
				};
				let def = table.by_index(index).ok_or_else(|| {
					self.error(at, ty, DecodeErrorKind::InvalidDiscriminant { index, valid: table.valid_indices() })
				})?;
				let value = if def.is_unit() { None } else { Some(self.decode_fields(data, &def.fields, depth)?) };
				Ok(Value::Variant(Variant { name: def.name.clone(), value }))
			}
			TypeNode::Option(inner) => {
				let at = *data;
				let tag = self.fixed::<1>(data, ty)?[0];
				match tag {
					0 => Ok(Value::none()),
					1 => Ok(Value::some(self.decode_type(data, *inner, depth + 1)?)),
					_ => Err(self.error(
						at,
						ty,
						DecodeErrorKind::InvalidDiscriminant { index: tag.into(), valid: ValidIndices(vec![0, 1]) },
					)),
				}
			}
			TypeNode::BitSequence { store, order } => {
				let (bits, len) = decode_bits(data, *store, *order).map_err(|e| self.error(data, ty, e))?;
				*data = &data[len..];
				Ok(Value::BitSequence(bits))
			}
		}
	}

	/// Variant and Composite types both have fields; this will decode them into values.
	fn decode_fields(&self, data: &mut &[u8], fields: &[Field], depth: usize) -> Result<Composite, DecodeError> {
		let are_named = !fields.is_empty() && fields.iter().all(|f| f.name.is_some());
		if are_named {
			let values = fields
				.iter()
				.map(|f| {
					let name = f.name.clone().unwrap_or_default();
					self.decode_type(data, f.ty, depth + 1).map(|val| (name, val))
				})
				.collect::<Result<_, _>>()?;
			Ok(Composite::Named(values))
		} else {
			let values = fields.iter().map(|f| self.decode_type(data, f.ty, depth + 1)).collect::<Result<_, _>>()?;
			Ok(Composite::Unnamed(values))
		}
	}

	/// Compact encoding applies to unsigned integers, and to composites or tuples that wrap
	/// exactly one of those (eg `Compact<Perbill>`). The wrapper is kept in the decoded value.
	fn decode_compact(&self, data: &mut &[u8], ty: TypeId, inner: TypeId, depth: usize) -> Result<Value, DecodeError> {
		if depth > self.depth_limit {
			return Err(self.error(data, ty, DecodeErrorKind::DepthLimitExceeded(self.depth_limit)));
		}
		let node = self.registry.node(inner).ok_or_else(|| self.error(data, inner, DecodeErrorKind::TypeNotFound))?;
		match node {
			TypeNode::Primitive(kind) => {
				let value = self.compact(data, ty, *kind)?;
				Ok(Value::Primitive(unsigned_primitive(*kind, value)))
			}
			TypeNode::Composite(fields) if fields.len() == 1 => {
				let value = self.decode_compact(data, ty, fields[0].ty, depth + 1)?;
				let composite = match &fields[0].name {
					Some(name) => Composite::Named(vec![(name.clone(), value)]),
					None => Composite::Unnamed(vec![value]),
				};
				Ok(Value::Composite(composite))
			}
			TypeNode::Tuple(ids) if ids.len() == 1 => {
				let value = self.decode_compact(data, ty, ids[0], depth + 1)?;
				Ok(Value::Composite(Composite::Unnamed(vec![value])))
			}
			// `Compact<()>` occupies no bytes.
			TypeNode::Composite(fields) if fields.is_empty() => Ok(Value::Composite(Composite::Unnamed(Vec::new()))),
			TypeNode::Tuple(ids) if ids.is_empty() => Ok(Value::Composite(Composite::Unnamed(Vec::new()))),
			other => Err(self.error(data, ty, DecodeErrorKind::UnsupportedCompactType(other.kind_name().to_owned()))),
		}
	}

	fn decode_primitive(&self, data: &mut &[u8], ty: TypeId, kind: PrimitiveKind) -> Result<Primitive, DecodeError> {
		let at = *data;
		let val = match kind {
			PrimitiveKind::Bool => match self.fixed::<1>(data, ty)?[0] {
				0 => Primitive::Bool(false),
				1 => Primitive::Bool(true),
				n => {
					return Err(self.error(
						at,
						ty,
						DecodeErrorKind::InvalidDiscriminant { index: n.into(), valid: ValidIndices(vec![0, 1]) },
					))
				}
			},
			PrimitiveKind::Char => {
				// Chars are encoded as their u32 scalar value.
				let val = u32::from_le_bytes(self.fixed(data, ty)?);
				Primitive::Char(char::from_u32(val).ok_or_else(|| self.error(at, ty, DecodeErrorKind::InvalidChar(val)))?)
			}
			PrimitiveKind::Str => {
				let len = self.compact(data, ty, PrimitiveKind::U32)? as usize;
				let bytes = self.take(data, ty, len)?;
				let s = std::str::from_utf8(bytes).map_err(|_| self.error(at, ty, DecodeErrorKind::InvalidUtf8))?;
				Primitive::Str(s.to_owned())
			}
			PrimitiveKind::U8 => Primitive::U8(u8::from_le_bytes(self.fixed(data, ty)?)),
			PrimitiveKind::U16 => Primitive::U16(u16::from_le_bytes(self.fixed(data, ty)?)),
			PrimitiveKind::U32 => Primitive::U32(u32::from_le_bytes(self.fixed(data, ty)?)),
			PrimitiveKind::U64 => Primitive::U64(u64::from_le_bytes(self.fixed(data, ty)?)),
			PrimitiveKind::U128 => Primitive::U128(u128::from_le_bytes(self.fixed(data, ty)?)),
			PrimitiveKind::U256 => Primitive::U256(self.fixed(data, ty)?),
			PrimitiveKind::I8 => Primitive::I8(i8::from_le_bytes(self.fixed(data, ty)?)),
			PrimitiveKind::I16 => Primitive::I16(i16::from_le_bytes(self.fixed(data, ty)?)),
			PrimitiveKind::I32 => Primitive::I32(i32::from_le_bytes(self.fixed(data, ty)?)),
			PrimitiveKind::I64 => Primitive::I64(i64::from_le_bytes(self.fixed(data, ty)?)),
			PrimitiveKind::I128 => Primitive::I128(i128::from_le_bytes(self.fixed(data, ty)?)),
			PrimitiveKind::I256 => Primitive::I256(self.fixed(data, ty)?),
		};
		Ok(val)
	}
}

/// Only unsigned kinds make it past the compact range check.
fn unsigned_primitive(kind: PrimitiveKind, value: u128) -> Primitive {
	match kind {
		PrimitiveKind::U8 => Primitive::U8(value as u8),
		PrimitiveKind::U16 => Primitive::U16(value as u16),
		PrimitiveKind::U32 => Primitive::U32(value as u32),
		PrimitiveKind::U64 => Primitive::U64(value as u64),
		_ => Primitive::U128(value),
	}
}
