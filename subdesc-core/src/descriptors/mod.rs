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

//! Compile [`Metadata`] into descriptors: one for every storage entry, call, event, error and
//! constant of every pallet, and for every runtime API method.
//!
//! Descriptors never hold codec logic of their own. Each names the registry types it works
//! with through a [`TypeRef`], and builds a [`Codec`] for them on demand.

mod runtime;
mod storage;

use crate::anonymize::{AliasTable, AnonymizeError};
use crate::codec::{Codec, DecodeError, DecodeErrorKind, EncodeError};
use crate::metadata::{Field, Metadata, PalletMetadata, PalletSection, TypeNode, TypeRegistry};
use crate::value::{Composite, Value};
use crate::variant::VariantTable;
use crate::TypeId;
use serde::Serialize;
use std::collections::HashMap;

pub use runtime::{RuntimeArgDescriptor, RuntimeDescriptor};
pub use storage::{
	StorageDescriptor, StorageError, StorageKeyDescriptor, StorageKeyPart, StorageShape, STORAGE_PREFIX_LEN,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
	#[error("{context} refers to type {ty}, which does not exist")]
	DanglingTypeReference { ty: TypeId, context: String },
	#[error("{context} should be a variant type, but type {ty} is a {got}")]
	ExpectedVariant { ty: TypeId, context: String, got: &'static str },
	#[error(transparent)]
	Anonymize(#[from] AnonymizeError),
}

/// A reference to a registry type, along with its canonical alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeRef {
	pub id: TypeId,
	pub alias: String,
}

/// A named or unnamed argument/field, as found in calls, events and errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
	pub name: Option<String>,
	pub ty: TypeRef,
	/// The type name as written in the runtime source, if known.
	pub type_name: Option<String>,
}

/// A call (extrinsic) that a pallet exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxDescriptor {
	pub pallet: String,
	pub pallet_index: u8,
	pub name: String,
	/// The call index within the pallet.
	pub index: u32,
	pub args: Vec<FieldDescriptor>,
	/// The pallet's call enum, which this call is one variant of.
	pub call_ty: TypeRef,
	pub docs: Vec<String>,
}

impl TxDescriptor {
	/// Encode the call data: `pallet_index ++ call_index ++ args`.
	pub fn encode_call(&self, registry: &TypeRegistry, args: &Composite) -> Result<Vec<u8>, EncodeError> {
		let payload = if self.args.is_empty() && args.is_empty() { None } else { Some(args.clone()) };
		let mut out = vec![self.pallet_index];
		Codec::new(registry, self.call_ty.id).encode_to(&Value::variant(self.name.clone(), payload), &mut out)?;
		Ok(out)
	}

	/// Decode the argument bytes of this call (everything after the call index).
	pub fn decode_args(&self, registry: &TypeRegistry, bytes: &[u8]) -> Result<Composite, DecodeError> {
		decode_fields(registry, self.call_ty.id, &self.args, bytes)
	}
}

/// An event that a pallet can emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDescriptor {
	pub pallet: String,
	pub pallet_index: u8,
	pub name: String,
	pub index: u32,
	pub fields: Vec<FieldDescriptor>,
	pub event_ty: TypeRef,
	pub docs: Vec<String>,
}

impl EventDescriptor {
	/// Decode the payload of this event (everything after the event index).
	pub fn decode_fields(&self, registry: &TypeRegistry, bytes: &[u8]) -> Result<Composite, DecodeError> {
		decode_fields(registry, self.event_ty.id, &self.fields, bytes)
	}
}

/// An error that a pallet can return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDescriptor {
	pub pallet: String,
	pub pallet_index: u8,
	pub name: String,
	pub index: u32,
	pub fields: Vec<FieldDescriptor>,
	pub error_ty: TypeRef,
	pub docs: Vec<String>,
}

impl ErrorDescriptor {
	pub fn decode_fields(&self, registry: &TypeRegistry, bytes: &[u8]) -> Result<Composite, DecodeError> {
		decode_fields(registry, self.error_ty.id, &self.fields, bytes)
	}
}

/// A pallet constant, and the SCALE encoded value the metadata gives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlainDescriptor {
	pub pallet: String,
	pub name: String,
	pub value: TypeRef,
	#[serde(with = "hex::serde")]
	pub bytes: Vec<u8>,
	pub docs: Vec<String>,
}

impl PlainDescriptor {
	pub fn decode(&self, registry: &TypeRegistry) -> Result<Value, DecodeError> {
		Codec::new(registry, self.value.id).decode_exact(&self.bytes)
	}
}

/// Every descriptor for a single pallet, each section in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PalletDescriptors {
	pub name: String,
	pub index: u8,
	pub storage: Vec<StorageDescriptor>,
	pub calls: Vec<TxDescriptor>,
	pub events: Vec<EventDescriptor>,
	pub errors: Vec<ErrorDescriptor>,
	pub constants: Vec<PlainDescriptor>,
	pub docs: Vec<String>,
}

impl PalletDescriptors {
	pub fn storage(&self, name: &str) -> Option<&StorageDescriptor> {
		self.storage.iter().find(|s| s.name == name)
	}

	pub fn call(&self, name: &str) -> Option<&TxDescriptor> {
		self.calls.iter().find(|c| c.name == name)
	}

	pub fn call_by_index(&self, index: u32) -> Option<&TxDescriptor> {
		self.calls.iter().find(|c| c.index == index)
	}

	pub fn event(&self, name: &str) -> Option<&EventDescriptor> {
		self.events.iter().find(|e| e.name == name)
	}

	pub fn event_by_index(&self, index: u32) -> Option<&EventDescriptor> {
		self.events.iter().find(|e| e.index == index)
	}

	pub fn error(&self, name: &str) -> Option<&ErrorDescriptor> {
		self.errors.iter().find(|e| e.name == name)
	}

	pub fn constant(&self, name: &str) -> Option<&PlainDescriptor> {
		self.constants.iter().find(|c| c.name == name)
	}

	/// How many items the given section declares.
	pub fn section_len(&self, section: PalletSection) -> usize {
		match section {
			PalletSection::Storage => self.storage.len(),
			PalletSection::Calls => self.calls.len(),
			PalletSection::Events => self.events.len(),
			PalletSection::Errors => self.errors.len(),
			PalletSection::Constants => self.constants.len(),
		}
	}
}

/// A storage entry recovered from a full storage key, see [`DescriptorSet::decode_storage_key`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageKey<'d> {
	pub entry: &'d StorageDescriptor,
	pub keys: Vec<StorageKeyPart>,
}

/// The compiled descriptors of some metadata. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorSet {
	pallets: Vec<PalletDescriptors>,
	runtime_apis: Vec<RuntimeDescriptor>,
	#[serde(skip)]
	storage_by_prefix: HashMap<[u8; STORAGE_PREFIX_LEN], (usize, usize)>,
}

impl DescriptorSet {
	fn new(pallets: Vec<PalletDescriptors>, runtime_apis: Vec<RuntimeDescriptor>) -> Self {
		let storage_by_prefix = pallets
			.iter()
			.enumerate()
			.flat_map(|(p, pallet)| pallet.storage.iter().enumerate().map(move |(s, entry)| (entry.prefix_hash(), (p, s))))
			.collect();
		DescriptorSet { pallets, runtime_apis, storage_by_prefix }
	}

	/// Pallets in metadata order.
	pub fn pallets(&self) -> &[PalletDescriptors] {
		&self.pallets
	}

	pub fn pallet(&self, name: &str) -> Option<&PalletDescriptors> {
		self.pallets.iter().find(|p| p.name == name)
	}

	pub fn pallet_by_index(&self, index: u8) -> Option<&PalletDescriptors> {
		self.pallets.iter().find(|p| p.index == index)
	}

	pub fn storage(&self, pallet: &str, name: &str) -> Option<&StorageDescriptor> {
		self.pallet(pallet)?.storage(name)
	}

	pub fn call(&self, pallet: &str, name: &str) -> Option<&TxDescriptor> {
		self.pallet(pallet)?.call(name)
	}

	/// Find a call from the two indexes that lead call data.
	pub fn call_by_index(&self, pallet_index: u8, call_index: u32) -> Option<&TxDescriptor> {
		self.pallet_by_index(pallet_index)?.call_by_index(call_index)
	}

	pub fn event(&self, pallet: &str, name: &str) -> Option<&EventDescriptor> {
		self.pallet(pallet)?.event(name)
	}

	pub fn event_by_index(&self, pallet_index: u8, event_index: u32) -> Option<&EventDescriptor> {
		self.pallet_by_index(pallet_index)?.event_by_index(event_index)
	}

	pub fn error(&self, pallet: &str, name: &str) -> Option<&ErrorDescriptor> {
		self.pallet(pallet)?.error(name)
	}

	pub fn constant(&self, pallet: &str, name: &str) -> Option<&PlainDescriptor> {
		self.pallet(pallet)?.constant(name)
	}

	pub fn runtime_apis(&self) -> &[RuntimeDescriptor] {
		&self.runtime_apis
	}

	pub fn runtime_api(&self, api: &str, method: &str) -> Option<&RuntimeDescriptor> {
		self.runtime_apis.iter().find(|r| r.api == api && r.method == method)
	}

	/// The total number of descriptors across all pallets and runtime APIs.
	pub fn len(&self) -> usize {
		let in_pallets: usize =
			self.pallets.iter().map(|p| PalletSection::ALL.iter().map(|s| p.section_len(*s)).sum::<usize>()).sum();
		in_pallets + self.runtime_apis.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Decode the bytes representing a storage entry lookup. These take the form
	/// `twox_128(prefix) ++ twox_128(name) ++ rest`, where `rest` holds the hashed keys.
	pub fn decode_storage_key(&self, registry: &TypeRegistry, key: &[u8]) -> Result<StorageKey<'_>, StorageError> {
		if key.len() < STORAGE_PREFIX_LEN {
			return Err(StorageError::NotEnoughBytes {
				hasher: crate::metadata::StorageHasher::Twox128,
				needed: STORAGE_PREFIX_LEN,
				got: key.len(),
			});
		}
		let mut prefix = [0; STORAGE_PREFIX_LEN];
		prefix.copy_from_slice(&key[..STORAGE_PREFIX_LEN]);
		let (p, s) = self.storage_by_prefix.get(&prefix).ok_or(StorageError::EntryNotFound)?;
		let entry = &self.pallets[*p].storage[*s];
		let keys = entry.decode_key_parts(registry, &key[STORAGE_PREFIX_LEN..])?;
		Ok(StorageKey { entry, keys })
	}
}

/// Build the alias table for some metadata and compile its descriptors against it.
pub fn build(metadata: &Metadata) -> Result<(AliasTable, DescriptorSet), CompileError> {
	let aliases = AliasTable::build(metadata.types())?;
	let descriptors = compile(metadata, &aliases)?;
	Ok((aliases, descriptors))
}

/// Compile a descriptor for every pallet item and runtime API method in the metadata. Every
/// type referenced must have an alias in `aliases`.
pub fn compile(metadata: &Metadata, aliases: &AliasTable) -> Result<DescriptorSet, CompileError> {
	log::trace!("Compiling descriptors for {} pallets", metadata.pallets().len());
	let binder = Binder { types: metadata.types(), aliases };
	let pallets = metadata.pallets().iter().map(|p| binder.pallet(p)).collect::<Result<Vec<_>, _>>()?;

	let mut runtime_apis = Vec::new();
	for api in metadata.runtime_apis() {
		for method in &api.methods {
			runtime_apis.push(binder.runtime_method(&api.name, method)?);
		}
	}

	let set = DescriptorSet::new(pallets, runtime_apis);
	log::debug!("Compiled {} descriptors", set.len());
	Ok(set)
}

/// Binds metadata items to the types (and aliases) they refer to.
struct Binder<'a> {
	types: &'a TypeRegistry,
	aliases: &'a AliasTable,
}

impl<'a> Binder<'a> {
	fn type_ref(&self, id: TypeId, context: impl FnOnce() -> String) -> Result<TypeRef, CompileError> {
		match (self.types.resolve(id), self.aliases.alias_of(id)) {
			(Some(_), Some(alias)) => Ok(TypeRef { id, alias: alias.alias().to_owned() }),
			_ => Err(CompileError::DanglingTypeReference { ty: id, context: context() }),
		}
	}

	fn fields(&self, fields: &[Field], context: &str) -> Result<Vec<FieldDescriptor>, CompileError> {
		fields
			.iter()
			.enumerate()
			.map(|(pos, field)| {
				let ty = self.type_ref(field.ty, || match &field.name {
					Some(name) => format!("{context} field '{name}'"),
					None => format!("{context} field {pos}"),
				})?;
				Ok(FieldDescriptor { name: field.name.clone(), ty, type_name: field.type_name.clone() })
			})
			.collect()
	}

	/// The variant table behind a calls, events or errors section.
	fn section(
		&self,
		pallet: &PalletMetadata,
		section: PalletSection,
	) -> Result<Option<(TypeRef, &'a VariantTable)>, CompileError> {
		let id = match pallet.variant_section(section) {
			Some(id) => id,
			None => return Ok(None),
		};
		let context = || format!("{}.{}", pallet.name, section);
		let ty = self.type_ref(id, context)?;
		match self.types.node(id) {
			Some(TypeNode::Variant(table)) => Ok(Some((ty, table))),
			other => Err(CompileError::ExpectedVariant {
				ty: id,
				context: context(),
				got: other.map(TypeNode::kind_name).unwrap_or("missing type"),
			}),
		}
	}

	fn pallet(&self, pallet: &PalletMetadata) -> Result<PalletDescriptors, CompileError> {
		log::trace!("Compiling pallet {} (index {})", pallet.name, pallet.index);
		let storage = match &pallet.storage {
			Some(storage) => storage
				.entries
				.iter()
				.map(|entry| {
					let context = || format!("{}.{}", pallet.name, entry.name);
					let keys = entry
						.keys
						.iter()
						.map(|key| {
							Ok(StorageKeyDescriptor {
								ty: self.type_ref(key.ty, || format!("{} key", context()))?,
								hasher: key.hasher,
							})
						})
						.collect::<Result<Vec<_>, CompileError>>()?;
					Ok(StorageDescriptor {
						pallet: pallet.name.clone(),
						prefix: storage.prefix.clone(),
						name: entry.name.clone(),
						keys,
						value: self.type_ref(entry.value, || format!("{} value", context()))?,
						is_optional: entry.modifier == crate::metadata::StorageEntryModifier::Optional,
						default: entry.default.clone(),
						docs: entry.docs.clone(),
					})
				})
				.collect::<Result<Vec<_>, CompileError>>()?,
			None => Vec::new(),
		};

		let mut calls = Vec::new();
		if let Some((call_ty, table)) = self.section(pallet, PalletSection::Calls)? {
			for variant in table.variants() {
				calls.push(TxDescriptor {
					pallet: pallet.name.clone(),
					pallet_index: pallet.index,
					name: variant.name.clone(),
					index: variant.index,
					args: self.fields(&variant.fields, &format!("{}.{} call", pallet.name, variant.name))?,
					call_ty: call_ty.clone(),
					docs: variant.docs.clone(),
				});
			}
		}

		let mut events = Vec::new();
		if let Some((event_ty, table)) = self.section(pallet, PalletSection::Events)? {
			for variant in table.variants() {
				events.push(EventDescriptor {
					pallet: pallet.name.clone(),
					pallet_index: pallet.index,
					name: variant.name.clone(),
					index: variant.index,
					fields: self.fields(&variant.fields, &format!("{}.{} event", pallet.name, variant.name))?,
					event_ty: event_ty.clone(),
					docs: variant.docs.clone(),
				});
			}
		}

		let mut errors = Vec::new();
		if let Some((error_ty, table)) = self.section(pallet, PalletSection::Errors)? {
			for variant in table.variants() {
				errors.push(ErrorDescriptor {
					pallet: pallet.name.clone(),
					pallet_index: pallet.index,
					name: variant.name.clone(),
					index: variant.index,
					fields: self.fields(&variant.fields, &format!("{}.{} error", pallet.name, variant.name))?,
					error_ty: error_ty.clone(),
					docs: variant.docs.clone(),
				});
			}
		}

		let constants = pallet
			.constants
			.iter()
			.map(|constant| {
				Ok(PlainDescriptor {
					pallet: pallet.name.clone(),
					name: constant.name.clone(),
					value: self.type_ref(constant.ty, || format!("{}.{} constant", pallet.name, constant.name))?,
					bytes: constant.value.clone(),
					docs: constant.docs.clone(),
				})
			})
			.collect::<Result<Vec<_>, CompileError>>()?;

		Ok(PalletDescriptors {
			name: pallet.name.clone(),
			index: pallet.index,
			storage,
			calls,
			events,
			errors,
			constants,
			docs: pallet.docs.clone(),
		})
	}

	fn runtime_method(
		&self,
		api: &str,
		method: &crate::metadata::RuntimeApiMethodMetadata,
	) -> Result<RuntimeDescriptor, CompileError> {
		let context = |what: &str| format!("{api}_{} {what}", method.name);
		let args = method
			.inputs
			.iter()
			.map(|input| {
				Ok(RuntimeArgDescriptor {
					name: input.name.clone(),
					ty: self.type_ref(input.ty, || context(&format!("argument '{}'", input.name)))?,
				})
			})
			.collect::<Result<Vec<_>, CompileError>>()?;
		Ok(RuntimeDescriptor {
			api: api.to_owned(),
			method: method.name.clone(),
			args,
			result: self.type_ref(method.output, || context("result"))?,
			docs: method.docs.clone(),
		})
	}
}

/// Decode each field in turn; the fields must use up every byte.
fn decode_fields(
	registry: &TypeRegistry,
	owner: TypeId,
	fields: &[FieldDescriptor],
	bytes: &[u8],
) -> Result<Composite, DecodeError> {
	let mut offset = 0;
	let mut values = Vec::with_capacity(fields.len());
	for field in fields {
		let (value, consumed) = Codec::new(registry, field.ty.id).decode(bytes, offset)?;
		offset += consumed;
		values.push(value);
	}
	if offset < bytes.len() {
		return Err(DecodeError { kind: DecodeErrorKind::TrailingBytes(bytes.len() - offset), ty: owner, offset });
	}

	let are_named = !fields.is_empty() && fields.iter().all(|f| f.name.is_some());
	if are_named {
		let names = fields.iter().map(|f| f.name.clone().unwrap_or_default());
		Ok(Composite::Named(names.zip(values).collect()))
	} else {
		Ok(Composite::Unnamed(values))
	}
}
