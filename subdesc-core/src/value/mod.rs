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

/*!
This module exposes the [`Value`] type and related subtypes, which are used as the runtime
representations of SCALE encoded data (much like `serde_json::Value` is a runtime representation
of JSON data).

Sequences, arrays and tuples are all represented as an unnamed [`Composite`]; structs are named
or unnamed composites depending on whether their fields carry names. Enum values are a
[`Variant`] whose payload is `None` for unit variants.
*/

mod serialize;

use bitvec::{order::Lsb0, vec::BitVec};
use std::convert::From;
use std::fmt::Debug;

/// A sequence of bits, in logical order. How they are packed on the wire depends on the
/// store and order of the bit sequence type being encoded.
pub type BitSequence = BitVec<u8, Lsb0>;

/// [`Value`] holds a representation of some value that has been decoded, or is waiting to be
/// encoded.
#[derive(Clone, PartialEq)]
pub enum Value {
	/// A named or unnamed struct-like, array-like or tuple-like set of values.
	Composite(Composite),
	/// An enum variant.
	Variant(Variant),
	/// An optional value; `None` is the first-class "absent" state.
	Option(Option<Box<Value>>),
	/// A sequence of bits.
	BitSequence(BitSequence),
	/// Any of the primitive values we can have.
	Primitive(Primitive),
}

impl Value {
	/// A boolean value.
	pub fn bool(val: bool) -> Value {
		Value::Primitive(Primitive::Bool(val))
	}
	/// A char value.
	pub fn char(val: char) -> Value {
		Value::Primitive(Primitive::Char(val))
	}
	/// A string value.
	pub fn string<S: Into<String>>(val: S) -> Value {
		Value::Primitive(Primitive::Str(val.into()))
	}
	pub fn u8(val: u8) -> Value {
		Value::Primitive(Primitive::U8(val))
	}
	pub fn u16(val: u16) -> Value {
		Value::Primitive(Primitive::U16(val))
	}
	pub fn u32(val: u32) -> Value {
		Value::Primitive(Primitive::U32(val))
	}
	pub fn u64(val: u64) -> Value {
		Value::Primitive(Primitive::U64(val))
	}
	pub fn u128(val: u128) -> Value {
		Value::Primitive(Primitive::U128(val))
	}
	pub fn i8(val: i8) -> Value {
		Value::Primitive(Primitive::I8(val))
	}
	pub fn i16(val: i16) -> Value {
		Value::Primitive(Primitive::I16(val))
	}
	pub fn i32(val: i32) -> Value {
		Value::Primitive(Primitive::I32(val))
	}
	pub fn i64(val: i64) -> Value {
		Value::Primitive(Primitive::I64(val))
	}
	pub fn i128(val: i128) -> Value {
		Value::Primitive(Primitive::I128(val))
	}

	/// A struct-like composite with named fields.
	pub fn named_composite<S: Into<String>>(vals: Vec<(S, Value)>) -> Value {
		Value::Composite(Composite::Named(vals.into_iter().map(|(k, v)| (k.into(), v)).collect()))
	}

	/// A tuple, array or sequence-like composite.
	pub fn unnamed_composite(vals: Vec<Value>) -> Value {
		Value::Composite(Composite::Unnamed(vals))
	}

	/// A sequence of `u8` values, which is how byte arrays and byte vectors are represented.
	pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Value {
		Value::unnamed_composite(bytes.as_ref().iter().map(|&b| Value::u8(b)).collect())
	}

	/// A variant with some payload (or `None` for a unit variant).
	pub fn variant<S: Into<String>>(name: S, value: Option<Composite>) -> Value {
		Value::Variant(Variant { name: name.into(), value })
	}

	/// A unit variant; its payload is absent.
	pub fn unit_variant<S: Into<String>>(name: S) -> Value {
		Value::variant(name, None)
	}

	/// An absent optional value.
	pub fn none() -> Value {
		Value::Option(None)
	}

	/// A present optional value.
	pub fn some(val: Value) -> Value {
		Value::Option(Some(Box::new(val)))
	}

	/// A sequence of bits.
	pub fn bit_sequence(bits: BitSequence) -> Value {
		Value::BitSequence(bits)
	}

	/// If this is an unsigned integer primitive, return it as a `u128`.
	pub fn as_u128(&self) -> Option<u128> {
		match self {
			Value::Primitive(p) => p.as_u128(),
			_ => None,
		}
	}

	/// If this is a signed or unsigned integer primitive that fits, return it as an `i128`.
	pub fn as_i128(&self) -> Option<i128> {
		match self {
			Value::Primitive(p) => p.as_i128(),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Primitive(Primitive::Bool(b)) => Some(*b),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Primitive(Primitive::Str(s)) => Some(s),
			_ => None,
		}
	}

	pub fn as_variant(&self) -> Option<&Variant> {
		match self {
			Value::Variant(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_composite(&self) -> Option<&Composite> {
		match self {
			Value::Composite(c) => Some(c),
			_ => None,
		}
	}

	/// If this value is a composite made up entirely of `u8`s, hand back those bytes.
	pub fn as_bytes(&self) -> Option<Vec<u8>> {
		let composite = self.as_composite()?;
		composite
			.values()
			.map(|v| match v {
				Value::Primitive(Primitive::U8(b)) => Some(*b),
				_ => None,
			})
			.collect()
	}

	/// A short description of the shape of this value, used in error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			Value::Composite(Composite::Named(_)) => "named composite",
			Value::Composite(Composite::Unnamed(_)) => "unnamed composite",
			Value::Variant(_) => "variant",
			Value::Option(_) => "option",
			Value::BitSequence(_) => "bit sequence",
			Value::Primitive(p) => p.kind(),
		}
	}
}

impl Debug for Value {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Composite(val) => Debug::fmt(val, f),
			Self::Variant(val) => Debug::fmt(val, f),
			Self::Option(None) => f.write_str("None"),
			Self::Option(Some(val)) => f.debug_tuple("Some").field(val).finish(),
			Self::Primitive(val) => Debug::fmt(val, f),
			Self::BitSequence(val) => Debug::fmt(val, f),
		}
	}
}

/// A named or unnamed struct-like, array-like or tuple-like set of values.
/// This is used to represent a range of composite values on their own, or
/// as the payload of a specific [`Variant`].
#[derive(Clone, PartialEq)]
pub enum Composite {
	/// Eg `{ foo: 2, bar: false }`
	Named(Vec<(String, Value)>),
	/// Eg `(2, false)`
	Unnamed(Vec<Value>),
}

impl Composite {
	/// Return the number of values stored in this composite type.
	pub fn len(&self) -> usize {
		match self {
			Composite::Named(values) => values.len(),
			Composite::Unnamed(values) => values.len(),
		}
	}

	/// Is the composite type empty?
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Iterate over the values, ignoring any names.
	pub fn values(&self) -> impl ExactSizeIterator<Item = &Value> {
		let values: Vec<&Value> = match self {
			Composite::Named(values) => values.iter().map(|(_, v)| v).collect(),
			Composite::Unnamed(values) => values.iter().collect(),
		};
		values.into_iter()
	}

	/// Find a named field by its name.
	pub fn field(&self, name: &str) -> Option<&Value> {
		match self {
			Composite::Named(values) => values.iter().find(|(n, _)| n == name).map(|(_, v)| v),
			Composite::Unnamed(_) => None,
		}
	}
}

impl Debug for Composite {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Composite::Named(fields) => {
				let mut struc = f.debug_struct("");
				for (name, val) in fields {
					struc.field(name, val);
				}
				struc.finish()
			}
			Composite::Unnamed(fields) => {
				let mut struc = f.debug_tuple("");
				for val in fields {
					struc.field(val);
				}
				struc.finish()
			}
		}
	}
}

impl From<Composite> for Value {
	fn from(val: Composite) -> Self {
		Value::Composite(val)
	}
}

/// This represents the value of a specific variant from an enum: the name of the variant and,
/// unless it is a unit variant, the named/unnamed values associated with it.
#[derive(Clone, PartialEq)]
pub struct Variant {
	/// The name of the variant.
	pub name: String,
	/// Values for each of the named or unnamed fields associated with this variant, or `None`
	/// for unit variants.
	pub value: Option<Composite>,
}

impl Variant {
	/// Is this a unit variant (no payload)?
	pub fn is_unit(&self) -> bool {
		self.value.is_none()
	}

	/// The payload values, or an empty iterator for unit variants.
	pub fn values(&self) -> impl ExactSizeIterator<Item = &Value> {
		self.value.as_ref().map(|c| c.values().collect::<Vec<_>>()).unwrap_or_default().into_iter()
	}
}

impl Debug for Variant {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.name)?;
		if let Some(values) = &self.value {
			f.write_str(" ")?;
			Debug::fmt(values, f)?;
		}
		Ok(())
	}
}

impl From<Variant> for Value {
	fn from(val: Variant) -> Self {
		Value::Variant(val)
	}
}

/// A "primitive" value (this includes strings).
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
	Bool(bool),
	Char(char),
	Str(String),
	U8(u8),
	U16(u16),
	U32(u32),
	U64(u64),
	U128(u128),
	U256([u8; 32]),
	I8(i8),
	I16(i16),
	I32(i32),
	I64(i64),
	I128(i128),
	I256([u8; 32]),
}

impl Primitive {
	/// The unsigned integer value of this primitive, if it is one.
	pub fn as_u128(&self) -> Option<u128> {
		match *self {
			Primitive::U8(v) => Some(v.into()),
			Primitive::U16(v) => Some(v.into()),
			Primitive::U32(v) => Some(v.into()),
			Primitive::U64(v) => Some(v.into()),
			Primitive::U128(v) => Some(v),
			Primitive::I8(v) => u128::try_from(v).ok(),
			Primitive::I16(v) => u128::try_from(v).ok(),
			Primitive::I32(v) => u128::try_from(v).ok(),
			Primitive::I64(v) => u128::try_from(v).ok(),
			Primitive::I128(v) => u128::try_from(v).ok(),
			_ => None,
		}
	}

	/// The signed integer value of this primitive, if it is an integer that fits.
	pub fn as_i128(&self) -> Option<i128> {
		match *self {
			Primitive::I8(v) => Some(v.into()),
			Primitive::I16(v) => Some(v.into()),
			Primitive::I32(v) => Some(v.into()),
			Primitive::I64(v) => Some(v.into()),
			Primitive::I128(v) => Some(v),
			_ => self.as_u128().and_then(|v| i128::try_from(v).ok()),
		}
	}

	/// The name of this primitive's type.
	pub fn kind(&self) -> &'static str {
		match self {
			Primitive::Bool(_) => "bool",
			Primitive::Char(_) => "char",
			Primitive::Str(_) => "str",
			Primitive::U8(_) => "u8",
			Primitive::U16(_) => "u16",
			Primitive::U32(_) => "u32",
			Primitive::U64(_) => "u64",
			Primitive::U128(_) => "u128",
			Primitive::U256(_) => "u256",
			Primitive::I8(_) => "i8",
			Primitive::I16(_) => "i16",
			Primitive::I32(_) => "i32",
			Primitive::I64(_) => "i64",
			Primitive::I128(_) => "i128",
			Primitive::I256(_) => "i256",
		}
	}
}

impl From<Primitive> for Value {
	fn from(val: Primitive) -> Self {
		Value::Primitive(val)
	}
}
