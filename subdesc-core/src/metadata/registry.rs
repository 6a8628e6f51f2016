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

//! An arena of type nodes addressed by [`TypeId`]. Nodes only ever refer to each other by ID,
//! so forward references and cyclic type graphs need no special treatment; a reference is
//! resolved by looking it up when it's needed.

use super::{MetadataError, MetadataLocation};
use crate::variant::{VariantDef, VariantTable};
use crate::TypeId;
use scale_info::{form::PortableForm, PortableRegistry, TypeDef, TypeDefPrimitive};
use serde::Serialize;

type PortableType = scale_info::Type<PortableForm>;

/// The primitive types SCALE knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
	#[display(fmt = "bool")]
	Bool,
	#[display(fmt = "char")]
	Char,
	#[display(fmt = "str")]
	Str,
	#[display(fmt = "u8")]
	U8,
	#[display(fmt = "u16")]
	U16,
	#[display(fmt = "u32")]
	U32,
	#[display(fmt = "u64")]
	U64,
	#[display(fmt = "u128")]
	U128,
	#[display(fmt = "u256")]
	U256,
	#[display(fmt = "i8")]
	I8,
	#[display(fmt = "i16")]
	I16,
	#[display(fmt = "i32")]
	I32,
	#[display(fmt = "i64")]
	I64,
	#[display(fmt = "i128")]
	I128,
	#[display(fmt = "i256")]
	I256,
}

impl PrimitiveKind {
	/// The largest value a compact encoded integer of this kind may hold, or `None` if this
	/// kind can't be compact encoded.
	pub fn compact_max(self) -> Option<u128> {
		match self {
			PrimitiveKind::U8 => Some(u8::MAX.into()),
			PrimitiveKind::U16 => Some(u16::MAX.into()),
			PrimitiveKind::U32 => Some(u32::MAX.into()),
			PrimitiveKind::U64 => Some(u64::MAX.into()),
			PrimitiveKind::U128 => Some(u128::MAX),
			_ => None,
		}
	}
}

impl From<&TypeDefPrimitive> for PrimitiveKind {
	fn from(p: &TypeDefPrimitive) -> Self {
		match p {
			TypeDefPrimitive::Bool => PrimitiveKind::Bool,
			TypeDefPrimitive::Char => PrimitiveKind::Char,
			TypeDefPrimitive::Str => PrimitiveKind::Str,
			TypeDefPrimitive::U8 => PrimitiveKind::U8,
			TypeDefPrimitive::U16 => PrimitiveKind::U16,
			TypeDefPrimitive::U32 => PrimitiveKind::U32,
			TypeDefPrimitive::U64 => PrimitiveKind::U64,
			TypeDefPrimitive::U128 => PrimitiveKind::U128,
			TypeDefPrimitive::U256 => PrimitiveKind::U256,
			TypeDefPrimitive::I8 => PrimitiveKind::I8,
			TypeDefPrimitive::I16 => PrimitiveKind::I16,
			TypeDefPrimitive::I32 => PrimitiveKind::I32,
			TypeDefPrimitive::I64 => PrimitiveKind::I64,
			TypeDefPrimitive::I128 => PrimitiveKind::I128,
			TypeDefPrimitive::I256 => PrimitiveKind::I256,
		}
	}
}

/// The word type a bit sequence is packed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
pub enum BitStore {
	#[display(fmt = "u8")]
	U8,
	#[display(fmt = "u16")]
	U16,
	#[display(fmt = "u32")]
	U32,
	#[display(fmt = "u64")]
	U64,
}

impl BitStore {
	/// Number of bits in one store word.
	pub fn bits(self) -> usize {
		match self {
			BitStore::U8 => 8,
			BitStore::U16 => 16,
			BitStore::U32 => 32,
			BitStore::U64 => 64,
		}
	}
}

/// The order that bits are placed within each store word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
pub enum BitOrder {
	/// The first bit is the least significant bit of the word.
	Lsb0,
	/// The first bit is the most significant bit of the word.
	Msb0,
}

/// A named or unnamed field of a composite type or variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
	pub name: Option<String>,
	pub ty: TypeId,
	/// The name of the field's type as written in the runtime source. Informational only.
	pub type_name: Option<String>,
}

/// A generic type parameter recorded against a type, eg the `Call` of `UncheckedExtrinsic`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeParam {
	pub name: String,
	pub ty: Option<TypeId>,
}

/// The shape of a type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "def", rename_all = "camelCase")]
pub enum TypeNode {
	Primitive(PrimitiveKind),
	Compact(TypeId),
	Sequence(TypeId),
	Array { inner: TypeId, len: u32 },
	Tuple(Vec<TypeId>),
	Composite(Vec<Field>),
	Variant(VariantTable),
	Option(TypeId),
	BitSequence { store: BitStore, order: BitOrder },
}

impl TypeNode {
	/// The IDs of every type this node refers to directly, in declaration order.
	pub fn children(&self) -> Vec<TypeId> {
		match self {
			TypeNode::Primitive(_) | TypeNode::BitSequence { .. } => Vec::new(),
			TypeNode::Compact(inner) | TypeNode::Sequence(inner) | TypeNode::Option(inner) => vec![*inner],
			TypeNode::Array { inner, .. } => vec![*inner],
			TypeNode::Tuple(ids) => ids.clone(),
			TypeNode::Composite(fields) => fields.iter().map(|f| f.ty).collect(),
			TypeNode::Variant(table) => table.variants().iter().flat_map(|v| v.fields.iter().map(|f| f.ty)).collect(),
		}
	}

	/// A short name for the kind of node this is.
	pub fn kind_name(&self) -> &'static str {
		match self {
			TypeNode::Primitive(_) => "primitive",
			TypeNode::Compact(_) => "compact",
			TypeNode::Sequence(_) => "sequence",
			TypeNode::Array { .. } => "array",
			TypeNode::Tuple(_) => "tuple",
			TypeNode::Composite(_) => "composite",
			TypeNode::Variant(_) => "variant",
			TypeNode::Option(_) => "option",
			TypeNode::BitSequence { .. } => "bit sequence",
		}
	}

	/// The unit type is an empty tuple.
	pub fn is_unit(&self) -> bool {
		matches!(self, TypeNode::Tuple(ids) if ids.is_empty())
	}
}

/// A type in the registry: its shape plus the chain-specific naming around it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeInfo {
	pub id: TypeId,
	/// The path of the type in the runtime, eg `["pallet_balances", "types", "AccountData"]`.
	/// Empty for primitives, tuples, sequences and other anonymous types.
	pub path: Vec<String>,
	pub type_params: Vec<TypeParam>,
	pub node: TypeNode,
	pub docs: Vec<String>,
}

impl TypeInfo {
	/// A human readable name for the type: the joined path if it has one, or else its kind.
	pub fn display_name(&self) -> String {
		if self.path.is_empty() {
			match &self.node {
				TypeNode::Primitive(p) => p.to_string(),
				other => other.kind_name().to_owned(),
			}
		} else {
			self.path.join("::")
		}
	}

	/// Look up a type parameter by name.
	pub fn type_param(&self, name: &str) -> Option<TypeId> {
		self.type_params.iter().find(|p| p.name == name).and_then(|p| p.ty)
	}
}

/// An immutable arena of [`TypeInfo`]s, indexed by [`TypeId`].
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRegistry {
	types: Box<[TypeInfo]>,
}

impl TypeRegistry {
	/// Build a registry from types whose IDs match their positions. Every type a node refers
	/// to must exist in the registry.
	pub fn new(types: Vec<TypeInfo>) -> Result<TypeRegistry, MetadataError> {
		for (pos, info) in types.iter().enumerate() {
			if info.id.index() != pos {
				return Err(MetadataError::malformed(
					MetadataLocation::Type(info.id),
					format!("type is stored at position {pos}; type IDs must be sequential"),
				));
			}
		}
		for info in &types {
			if let Some(missing) = info.node.children().into_iter().find(|c| c.index() >= types.len()) {
				return Err(MetadataError::malformed(
					MetadataLocation::Type(info.id),
					format!("refers to type {missing}, which does not exist"),
				));
			}
		}
		Ok(TypeRegistry { types: types.into_boxed_slice() })
	}

	/// Convert a [`scale_info`] registry (as found in metadata) into our arena.
	pub fn from_portable(registry: &PortableRegistry) -> Result<TypeRegistry, MetadataError> {
		log::trace!("Converting {} portable types", registry.types.len());
		let types = registry
			.types
			.iter()
			.map(|ty| {
				let id = TypeId::from_u32(ty.id);
				let node = convert_type_def(registry, id, &ty.ty)?;
				Ok(TypeInfo {
					id,
					path: ty.ty.path.segments.clone(),
					type_params: ty
						.ty
						.type_params
						.iter()
						.map(|p| TypeParam { name: p.name.clone(), ty: p.ty.as_ref().map(TypeId::from) })
						.collect(),
					node,
					docs: ty.ty.docs.clone(),
				})
			})
			.collect::<Result<Vec<_>, MetadataError>>()?;
		TypeRegistry::new(types)
	}

	/// Given a [`TypeId`], return the corresponding type, if it exists.
	pub fn resolve<Id: Into<TypeId>>(&self, id: Id) -> Option<&TypeInfo> {
		self.types.get(id.into().index())
	}

	/// Given a [`TypeId`], return the shape of the corresponding type, if it exists.
	pub fn node<Id: Into<TypeId>>(&self, id: Id) -> Option<&TypeNode> {
		self.resolve(id).map(|info| &info.node)
	}

	/// The variant table of a type, if it exists and is a variant.
	pub fn variant_table<Id: Into<TypeId>>(&self, id: Id) -> Option<&VariantTable> {
		match self.node(id)? {
			TypeNode::Variant(table) => Some(table),
			_ => None,
		}
	}

	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	/// Iterate over every type, in ID order.
	pub fn iter(&self) -> impl ExactSizeIterator<Item = &TypeInfo> {
		self.types.iter()
	}
}

fn convert_fields(fields: &[scale_info::Field<PortableForm>]) -> Vec<Field> {
	fields
		.iter()
		.map(|f| Field { name: f.name.clone(), ty: TypeId::from(&f.ty), type_name: f.type_name.clone() })
		.collect()
}

fn convert_type_def(registry: &PortableRegistry, id: TypeId, ty: &PortableType) -> Result<TypeNode, MetadataError> {
	let node = match &ty.type_def {
		TypeDef::Composite(composite) => TypeNode::Composite(convert_fields(&composite.fields)),
		TypeDef::Variant(variant) => {
			if let Some(inner) = as_option(ty) {
				return Ok(TypeNode::Option(inner));
			}
			let variants = variant
				.variants
				.iter()
				.map(|v| VariantDef {
					index: v.index.into(),
					name: v.name.clone(),
					fields: convert_fields(&v.fields),
					docs: v.docs.clone(),
				})
				.collect();
			let table = VariantTable::new(variants)
				.map_err(|e| MetadataError::malformed(MetadataLocation::Type(id), e.to_string()))?;
			TypeNode::Variant(table)
		}
		TypeDef::Sequence(seq) => TypeNode::Sequence((&seq.type_param).into()),
		TypeDef::Array(arr) => TypeNode::Array { inner: (&arr.type_param).into(), len: arr.len },
		TypeDef::Tuple(tuple) => TypeNode::Tuple(tuple.fields.iter().map(TypeId::from).collect()),
		TypeDef::Primitive(p) => TypeNode::Primitive(p.into()),
		TypeDef::Compact(compact) => TypeNode::Compact((&compact.type_param).into()),
		TypeDef::BitSequence(bits) => {
			let store = bit_store(registry, bits.bit_store_type.id).ok_or_else(|| {
				MetadataError::malformed(MetadataLocation::Type(id), "bit store type must be u8, u16, u32 or u64")
			})?;
			let order = bit_order(registry, bits.bit_order_type.id).ok_or_else(|| {
				MetadataError::malformed(MetadataLocation::Type(id), "bit order type must be Lsb0 or Msb0")
			})?;
			TypeNode::BitSequence { store, order }
		}
	};
	Ok(node)
}

/// `Option<T>` shows up as a variant type with path `Option` and variants `None = 0` and
/// `Some(T) = 1`; we give it a node of its own.
fn as_option(ty: &PortableType) -> Option<TypeId> {
	let TypeDef::Variant(variant) = &ty.type_def else {
		return None;
	};
	if ty.path.segments.len() != 1 || ty.path.segments[0] != "Option" {
		return None;
	}
	match &variant.variants[..] {
		[none, some]
			if none.name == "None"
				&& none.index == 0
				&& none.fields.is_empty()
				&& some.name == "Some"
				&& some.index == 1
				&& some.fields.len() == 1 =>
		{
			Some((&some.fields[0].ty).into())
		}
		_ => None,
	}
}

fn find_type(registry: &PortableRegistry, id: u32) -> Option<&PortableType> {
	// IDs are sequential in well formed metadata, but don't lean on that here.
	match registry.types.get(id as usize) {
		Some(t) if t.id == id => Some(&t.ty),
		_ => registry.types.iter().find(|t| t.id == id).map(|t| &t.ty),
	}
}

fn bit_store(registry: &PortableRegistry, id: u32) -> Option<BitStore> {
	match &find_type(registry, id)?.type_def {
		TypeDef::Primitive(TypeDefPrimitive::U8) => Some(BitStore::U8),
		TypeDef::Primitive(TypeDefPrimitive::U16) => Some(BitStore::U16),
		TypeDef::Primitive(TypeDefPrimitive::U32) => Some(BitStore::U32),
		TypeDef::Primitive(TypeDefPrimitive::U64) => Some(BitStore::U64),
		_ => None,
	}
}

fn bit_order(registry: &PortableRegistry, id: u32) -> Option<BitOrder> {
	match find_type(registry, id)?.path.segments.last().map(|s| s.as_str()) {
		Some("Lsb0") => Some(BitOrder::Lsb0),
		Some("Msb0") => Some(BitOrder::Msb0),
		_ => None,
	}
}
