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

use super::{BitSequence, Composite, Primitive, Value, Variant};
use serde::{
	ser::{SerializeMap, SerializeSeq},
	Serialize, Serializer,
};

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Value::Composite(val) => val.serialize(serializer),
			Value::Variant(val) => val.serialize(serializer),
			Value::Option(None) => serializer.serialize_none(),
			Value::Option(Some(val)) => serializer.serialize_some(val),
			Value::BitSequence(val) => serialize_bits(val, serializer),
			Value::Primitive(val) => val.serialize(serializer),
		}
	}
}

impl Serialize for Composite {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Composite::Named(vals) => {
				let mut map = serializer.serialize_map(Some(vals.len()))?;
				for (key, val) in vals {
					map.serialize_entry(key, val)?;
				}
				map.end()
			}
			Composite::Unnamed(vals) => {
				let mut seq = serializer.serialize_seq(Some(vals.len()))?;
				for val in vals {
					seq.serialize_element(val)?;
				}
				seq.end()
			}
		}
	}
}

/// Variants serialize as `{ "type": name, "value": payload }`. Unit variants have no
/// payload, so the `value` key is left out entirely rather than being set to `null`.
impl Serialize for Variant {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let len = if self.value.is_some() { 2 } else { 1 };
		let mut map = serializer.serialize_map(Some(len))?;
		map.serialize_entry("type", &self.name)?;
		if let Some(value) = &self.value {
			map.serialize_entry("value", value)?;
		}
		map.end()
	}
}

impl Serialize for Primitive {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		// Delegate to the serialization strategy used by the primitive types.
		match self {
			Primitive::Bool(v) => v.serialize(serializer),
			Primitive::Char(v) => v.serialize(serializer),
			Primitive::Str(v) => v.serialize(serializer),
			Primitive::U8(v) => v.serialize(serializer),
			Primitive::U16(v) => v.serialize(serializer),
			Primitive::U32(v) => v.serialize(serializer),
			Primitive::U64(v) => v.serialize(serializer),
			Primitive::U128(v) => v.serialize(serializer),
			Primitive::I8(v) => v.serialize(serializer),
			Primitive::I16(v) => v.serialize(serializer),
			Primitive::I32(v) => v.serialize(serializer),
			Primitive::I64(v) => v.serialize(serializer),
			Primitive::I128(v) => v.serialize(serializer),
			// 256 bit numbers have no native serde representation, so hand back LE hex.
			Primitive::U256(v) | Primitive::I256(v) => format!("0x{}", hex::encode(v)).serialize(serializer),
		}
	}
}

fn serialize_bits<S: Serializer>(bits: &BitSequence, serializer: S) -> Result<S::Ok, S::Error> {
	let mut seq = serializer.serialize_seq(Some(bits.len()))?;
	for bit in bits.iter() {
		seq.serialize_element(&*bit)?;
	}
	seq.end()
}
