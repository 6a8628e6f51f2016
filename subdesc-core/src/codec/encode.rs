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

use super::bits::encode_bits;
use super::compact::encode_compact;
use super::EncodeError;
use crate::metadata::{Field, PrimitiveKind, TypeNode, TypeRegistry};
use crate::value::{Composite, Primitive, Value, Variant};
use crate::variant::{DiscriminantWidth, VariantTable};
use crate::TypeId;

pub struct Encoder<'r> {
	registry: &'r TypeRegistry,
}

impl<'r> Encoder<'r> {
	pub fn new(registry: &'r TypeRegistry) -> Self {
		Encoder { registry }
	}

	pub fn encode(&self, ty: TypeId, value: &Value, out: &mut Vec<u8>) -> Result<(), EncodeError> {
		let node = self.registry.node(ty).ok_or(EncodeError::TypeNotFound { ty })?;
		match (node, value) {
			(TypeNode::Primitive(kind), Value::Primitive(p)) => self.encode_primitive(ty, *kind, p, out),
			(TypeNode::Compact(inner), value) => self.encode_compact(ty, *inner, value, out),
			(TypeNode::Sequence(inner), Value::Composite(values)) => {
				encode_compact(values.len() as u128, out);
				values.values().try_for_each(|v| self.encode(*inner, v, out))
			}
			(TypeNode::Array { inner, len }, Value::Composite(values)) => {
				check_len(ty, *len as usize, values.len())?;
				values.values().try_for_each(|v| self.encode(*inner, v, out))
			}
			(TypeNode::Tuple(ids), Value::Composite(values)) => {
				check_len(ty, ids.len(), values.len())?;
				ids.iter().zip(values.values()).try_for_each(|(id, v)| self.encode(*id, v, out))
			}
			(TypeNode::Composite(fields), Value::Composite(values)) => self.encode_fields(ty, fields, values, out),
			(TypeNode::Variant(table), Value::Variant(variant)) => self.encode_variant(ty, table, variant, out),
			(TypeNode::Option(inner), Value::Option(opt)) => self.encode_option(*inner, opt.as_deref(), out),
			(TypeNode::BitSequence { store, order }, Value::BitSequence(bits)) => {
				encode_bits(bits, *store, *order, out);
				Ok(())
			}
			(node, value) => Err(mismatch(ty, node.kind_name(), value)),
		}
	}

	/// Named values are matched to named fields by name, in whatever order they're given.
	/// Anything else is matched up by position.
	fn encode_fields(
		&self,
		ty: TypeId,
		fields: &[Field],
		values: &Composite,
		out: &mut Vec<u8>,
	) -> Result<(), EncodeError> {
		let fields_named = !fields.is_empty() && fields.iter().all(|f| f.name.is_some());
		match values {
			Composite::Named(named) if fields_named => {
				for field in fields {
					let name = field.name.as_deref().unwrap_or_default();
					let value = named
						.iter()
						.find(|(n, _)| n == name)
						.map(|(_, v)| v)
						.ok_or_else(|| EncodeError::MissingField { ty, field: name.to_owned() })?;
					self.encode(field.ty, value, out)?;
				}
				check_len(ty, fields.len(), named.len())
			}
			values => {
				check_len(ty, fields.len(), values.len())?;
				fields.iter().zip(values.values()).try_for_each(|(f, v)| self.encode(f.ty, v, out))
			}
		}
	}

	fn encode_variant(
		&self,
		ty: TypeId,
		table: &VariantTable,
		variant: &Variant,
		out: &mut Vec<u8>,
	) -> Result<(), EncodeError> {
		let def = table
			.by_name(&variant.name)
			.ok_or_else(|| EncodeError::UnknownVariant { ty, name: variant.name.clone() })?;
		match table.width() {
			// Every index fits in a byte, else the table would be compact.
			DiscriminantWidth::Byte => out.push(def.index as u8),
			DiscriminantWidth::Compact => encode_compact(def.index.into(), out),
		}
		match &variant.value {
			None => check_len(ty, def.fields.len(), 0),
			Some(values) => self.encode_fields(ty, &def.fields, values, out),
		}
	}

	fn encode_option(
		&self,
		inner: TypeId,
		value: Option<&Value>,
		out: &mut Vec<u8>,
	) -> Result<(), EncodeError> {
		match value {
			None => out.push(0),
			Some(value) => {
				out.push(1);
				self.encode(inner, value, out)?;
			}
		}
		Ok(())
	}

	/// Unsigned integers, and single field composites or tuples wrapping them, can be compact
	/// encoded. The value must have the same wrapper shape as the type.
	fn encode_compact(&self, ty: TypeId, inner: TypeId, value: &Value, out: &mut Vec<u8>) -> Result<(), EncodeError> {
		let node = self.registry.node(inner).ok_or(EncodeError::TypeNotFound { ty: inner })?;
		match (node, value) {
			(TypeNode::Primitive(kind), _) if kind.compact_max().is_none() => {
				Err(EncodeError::UnsupportedCompactType { ty, kind: kind.to_string() })
			}
			(TypeNode::Primitive(kind), Value::Primitive(p)) => {
				encode_compact(unsigned(ty, *kind, p)?, out);
				Ok(())
			}
			(TypeNode::Composite(fields), Value::Composite(values)) if fields.len() == 1 => {
				check_len(ty, 1, values.len())?;
				let field_value = match values {
					Composite::Named(named) => {
						let name = fields[0].name.as_deref().unwrap_or_default();
						named
							.iter()
							.find(|(n, _)| n == name)
							.map(|(_, v)| v)
							.ok_or_else(|| EncodeError::MissingField { ty: inner, field: name.to_owned() })?
					}
					Composite::Unnamed(unnamed) => &unnamed[0],
				};
				self.encode_compact(ty, fields[0].ty, field_value, out)
			}
			(TypeNode::Tuple(ids), Value::Composite(values)) if ids.len() == 1 => {
				check_len(ty, 1, values.len())?;
				match values.values().next() {
					Some(v) => self.encode_compact(ty, ids[0], v, out),
					None => Ok(()),
				}
			}
			(TypeNode::Composite(fields), Value::Composite(values)) if fields.is_empty() => check_len(ty, 0, values.len()),
			(TypeNode::Tuple(ids), Value::Composite(values)) if ids.is_empty() => check_len(ty, 0, values.len()),
			(TypeNode::Primitive(_) | TypeNode::Composite(_) | TypeNode::Tuple(_), value) => {
				Err(mismatch(inner, node.kind_name(), value))
			}
			(other, _) => Err(EncodeError::UnsupportedCompactType { ty, kind: other.kind_name().to_owned() }),
		}
	}

	fn encode_primitive(
		&self,
		ty: TypeId,
		kind: PrimitiveKind,
		p: &Primitive,
		out: &mut Vec<u8>,
	) -> Result<(), EncodeError> {
		match kind {
			PrimitiveKind::Bool => match p {
				Primitive::Bool(b) => out.push(*b as u8),
				_ => return Err(primitive_mismatch(ty, kind, p)),
			},
			PrimitiveKind::Char => match p {
				Primitive::Char(c) => out.extend_from_slice(&(*c as u32).to_le_bytes()),
				_ => return Err(primitive_mismatch(ty, kind, p)),
			},
			PrimitiveKind::Str => match p {
				Primitive::Str(s) => {
					encode_compact(s.len() as u128, out);
					out.extend_from_slice(s.as_bytes());
				}
				_ => return Err(primitive_mismatch(ty, kind, p)),
			},
			PrimitiveKind::U8 => out.push(unsigned(ty, kind, p)? as u8),
			PrimitiveKind::U16 => out.extend_from_slice(&(unsigned(ty, kind, p)? as u16).to_le_bytes()),
			PrimitiveKind::U32 => out.extend_from_slice(&(unsigned(ty, kind, p)? as u32).to_le_bytes()),
			PrimitiveKind::U64 => out.extend_from_slice(&(unsigned(ty, kind, p)? as u64).to_le_bytes()),
			PrimitiveKind::U128 => out.extend_from_slice(&unsigned(ty, kind, p)?.to_le_bytes()),
			PrimitiveKind::U256 => match p {
				Primitive::U256(bytes) => out.extend_from_slice(bytes),
				_ => {
					let mut bytes = [0u8; 32];
					bytes[..16].copy_from_slice(&unsigned(ty, kind, p)?.to_le_bytes());
					out.extend_from_slice(&bytes);
				}
			},
			PrimitiveKind::I8 => out.push(signed(ty, kind, p)? as i8 as u8),
			PrimitiveKind::I16 => out.extend_from_slice(&(signed(ty, kind, p)? as i16).to_le_bytes()),
			PrimitiveKind::I32 => out.extend_from_slice(&(signed(ty, kind, p)? as i32).to_le_bytes()),
			PrimitiveKind::I64 => out.extend_from_slice(&(signed(ty, kind, p)? as i64).to_le_bytes()),
			PrimitiveKind::I128 => out.extend_from_slice(&signed(ty, kind, p)?.to_le_bytes()),
			PrimitiveKind::I256 => match p {
				Primitive::I256(bytes) => out.extend_from_slice(bytes),
				_ => {
					let value = signed(ty, kind, p)?;
					// Sign extend into the upper half.
					let mut bytes = if value < 0 { [0xffu8; 32] } else { [0u8; 32] };
					bytes[..16].copy_from_slice(&value.to_le_bytes());
					out.extend_from_slice(&bytes);
				}
			},
		}
		Ok(())
	}
}

fn check_len(ty: TypeId, expected: usize, got: usize) -> Result<(), EncodeError> {
	if expected == got {
		Ok(())
	} else {
		Err(EncodeError::WrongLength { ty, expected, got })
	}
}

fn mismatch(ty: TypeId, expected: &str, value: &Value) -> EncodeError {
	EncodeError::TypeMismatch { ty, expected: expected.to_owned(), got: value.kind() }
}

fn primitive_mismatch(ty: TypeId, kind: PrimitiveKind, p: &Primitive) -> EncodeError {
	EncodeError::TypeMismatch { ty, expected: kind.to_string(), got: p.kind() }
}

/// Any integer value is accepted for an unsigned type, as long as it fits.
fn unsigned(ty: TypeId, kind: PrimitiveKind, p: &Primitive) -> Result<u128, EncodeError> {
	let max = kind.compact_max().unwrap_or(u128::MAX);
	match (p.as_u128(), p.as_i128()) {
		(Some(v), _) if v <= max => Ok(v),
		(Some(v), _) => Err(EncodeError::IntegerOutOfRange { ty, kind, value: v.to_string() }),
		(None, Some(v)) => Err(EncodeError::IntegerOutOfRange { ty, kind, value: v.to_string() }),
		(None, None) => Err(primitive_mismatch(ty, kind, p)),
	}
}

/// Any integer value is accepted for a signed type, as long as it fits.
fn signed(ty: TypeId, kind: PrimitiveKind, p: &Primitive) -> Result<i128, EncodeError> {
	let (min, max): (i128, i128) = match kind {
		PrimitiveKind::I8 => (i8::MIN.into(), i8::MAX.into()),
		PrimitiveKind::I16 => (i16::MIN.into(), i16::MAX.into()),
		PrimitiveKind::I32 => (i32::MIN.into(), i32::MAX.into()),
		PrimitiveKind::I64 => (i64::MIN.into(), i64::MAX.into()),
		_ => (i128::MIN, i128::MAX),
	};
	match (p.as_i128(), p.as_u128()) {
		(Some(v), _) if v >= min && v <= max => Ok(v),
		(Some(v), _) => Err(EncodeError::IntegerOutOfRange { ty, kind, value: v.to_string() }),
		(None, Some(v)) => Err(EncodeError::IntegerOutOfRange { ty, kind, value: v.to_string() }),
		(None, None) => Err(primitive_mismatch(ty, kind, p)),
	}
}
