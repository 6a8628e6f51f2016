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

//! Decode SCALE encoded metadata from a substrate node into a [`TypeRegistry`] arena plus the
//! pallet sections, runtime APIs and extrinsic details that descriptors are compiled from
//! (see [`crate::descriptors`]).

mod input;
mod registry;
#[macro_use]
mod convert;
mod version_14;
mod version_15;

use crate::TypeId;
use codec::Decode;
use frame_metadata::{RuntimeMetadata, RuntimeMetadataPrefixed, META_RESERVED};
use input::CountingInput;
use serde::Serialize;

pub use registry::{BitOrder, BitStore, Field, PrimitiveKind, TypeInfo, TypeNode, TypeParam, TypeRegistry};

/// The metadata versions we know how to turn into a [`Metadata`].
pub const SUPPORTED_VERSIONS: [u32; 2] = [14, 15];

/// Byte offset of the version discriminant; it follows the 4 byte `meta` magic number.
const VERSION_OFFSET: usize = 4;

/// Where in the metadata a problem was found.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MetadataLocation {
	#[display(fmt = "byte offset {}", _0)]
	Offset(usize),
	#[display(fmt = "type {}", _0)]
	Type(TypeId),
	#[display(fmt = "{}.{}", pallet, item)]
	Item { pallet: String, item: String },
}

/// An enum of the possible errors that can be returned from attempting to construct
/// a [`Metadata`] struct. Any of these aborts the parse; no partial metadata is handed back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
	#[error("metadata version {version} (at byte offset {offset}) is not supported; expected one of {SUPPORTED_VERSIONS:?}")]
	UnsupportedMetadataVersion { version: u32, offset: usize },
	#[error("malformed metadata at {location}: {reason}")]
	MalformedMetadata { location: MetadataLocation, reason: String },
}

impl MetadataError {
	pub(crate) fn malformed(location: MetadataLocation, reason: impl Into<String>) -> Self {
		MetadataError::MalformedMetadata { location, reason: reason.into() }
	}

	fn item(pallet: &str, item: &str, reason: impl Into<String>) -> Self {
		MetadataError::malformed(MetadataLocation::Item { pallet: pallet.to_owned(), item: item.to_owned() }, reason)
	}
}

/// This is a representation of the SCALE encoded metadata obtained from a substrate node.
/// It holds the type registry and, for every pallet, the items declared in each of its
/// sections in their declaration order. It is immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
	version: u32,
	types: TypeRegistry,
	pallets: Box<[PalletMetadata]>,
	runtime_apis: Box<[RuntimeApiMetadata]>,
	extrinsic: ExtrinsicMetadata,
	runtime_type: TypeId,
	outer_enums: Option<OuterEnums>,
}

impl Metadata {
	/// Attempt to convert some SCALE encoded bytes into Metadata, returning an
	/// error if something goes wrong in doing so. Here's an example command using
	/// `curl` and `jq` to download this from a locally running node (on the default port)
	/// and save it as `node_metadata.scale`.
	///
	/// ```sh
	/// curl -sX POST -H "Content-Type: application/json" --data '{"jsonrpc":"2.0","method":"state_getMetadata", "id": 1}' localhost:9933 \
	///     | jq .result \
	///     | cut -d '"' -f 2 \
	///     | xxd -r -p > node_metadata.scale
	/// ```
	///
	/// This file can then be read and passed directly to this method.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, MetadataError> {
		log::trace!("Decoding {} bytes of metadata", bytes.len());
		if bytes.len() <= VERSION_OFFSET {
			return Err(MetadataError::malformed(
				MetadataLocation::Offset(bytes.len()),
				"expected a 4 byte magic number followed by a version byte",
			));
		}
		if bytes[..VERSION_OFFSET] != META_RESERVED.to_le_bytes() {
			return Err(MetadataError::malformed(MetadataLocation::Offset(0), "missing the 'meta' magic number"));
		}
		let version = bytes[VERSION_OFFSET] as u32;
		if !SUPPORTED_VERSIONS.contains(&version) {
			return Err(MetadataError::UnsupportedMetadataVersion { version, offset: VERSION_OFFSET });
		}

		let mut input = CountingInput::new(bytes);
		let meta = RuntimeMetadataPrefixed::decode(&mut input)
			.map_err(|e| MetadataError::malformed(MetadataLocation::Offset(input.offset()), e.to_string()))?;
		if input.remaining() > 0 {
			return Err(MetadataError::malformed(
				MetadataLocation::Offset(input.offset()),
				format!("{} trailing bytes after the metadata", input.remaining()),
			));
		}
		Self::from_runtime_metadata(meta.1)
	}

	/// Convert the substrate runtime metadata into our Metadata.
	pub fn from_runtime_metadata(metadata: RuntimeMetadata) -> Result<Self, MetadataError> {
		match metadata {
			RuntimeMetadata::V14(meta_v14) => {
				log::trace!("V14 metadata found.");
				version_14::decode(meta_v14)
			}
			RuntimeMetadata::V15(meta_v15) => {
				log::trace!("V15 metadata found.");
				version_15::decode(meta_v15)
			}
			unsupported_meta => Err(MetadataError::UnsupportedMetadataVersion {
				version: unsupported_meta.version(),
				offset: VERSION_OFFSET,
			}),
		}
	}

	/// The metadata format version this was decoded from.
	pub fn version(&self) -> u32 {
		self.version
	}

	/// Return a reference to the type registry.
	pub fn types(&self) -> &TypeRegistry {
		&self.types
	}

	/// Given a [`crate::TypeId`], return the corresponding type from the type registry, if possible.
	pub fn resolve<Id: Into<TypeId>>(&self, id: Id) -> Option<&TypeInfo> {
		self.types.resolve(id)
	}

	/// The pallets, in the order the metadata lists them.
	pub fn pallets(&self) -> &[PalletMetadata] {
		&self.pallets
	}

	pub fn pallet_by_name(&self, name: &str) -> Option<&PalletMetadata> {
		self.pallets.iter().find(|p| p.name == name)
	}

	/// Find a pallet by the index it's given in the outer call/event enums.
	pub fn pallet_by_index(&self, index: u8) -> Option<&PalletMetadata> {
		self.pallets.iter().find(|p| p.index == index)
	}

	/// Runtime APIs; only V15 metadata carries these, so this is empty for V14.
	pub fn runtime_apis(&self) -> &[RuntimeApiMetadata] {
		&self.runtime_apis
	}

	/// Return details about the type of extrinsic supported by this metadata.
	pub fn extrinsic(&self) -> &ExtrinsicMetadata {
		&self.extrinsic
	}

	/// The type ID of the runtime itself.
	pub fn runtime_type(&self) -> TypeId {
		self.runtime_type
	}

	/// The outer call/event/error enums; only present in V15 metadata.
	pub fn outer_enums(&self) -> Option<&OuterEnums> {
		self.outer_enums.as_ref()
	}
}

/// The sections a pallet can declare items in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
pub enum PalletSection {
	#[display(fmt = "storage")]
	Storage,
	#[display(fmt = "calls")]
	Calls,
	#[display(fmt = "events")]
	Events,
	#[display(fmt = "errors")]
	Errors,
	#[display(fmt = "constants")]
	Constants,
}

impl PalletSection {
	pub const ALL: [PalletSection; 5] =
		[PalletSection::Storage, PalletSection::Calls, PalletSection::Events, PalletSection::Errors, PalletSection::Constants];
}

#[derive(Debug, Clone, PartialEq)]
pub struct PalletMetadata {
	pub name: String,
	/// The index of the pallet in the outer call and event enums.
	pub index: u8,
	pub storage: Option<PalletStorage>,
	/// The variant type listing the pallet's calls, if it has any.
	pub calls: Option<TypeId>,
	/// The variant type listing the pallet's events, if it has any.
	pub events: Option<TypeId>,
	/// The variant type listing the pallet's errors, if it has any.
	pub errors: Option<TypeId>,
	pub constants: Vec<ConstantMetadata>,
	pub docs: Vec<String>,
}

impl PalletMetadata {
	/// The variant type backing the calls, events or errors section.
	pub fn variant_section(&self, section: PalletSection) -> Option<TypeId> {
		match section {
			PalletSection::Calls => self.calls,
			PalletSection::Events => self.events,
			PalletSection::Errors => self.errors,
			PalletSection::Storage | PalletSection::Constants => None,
		}
	}

	/// Storage entries in declaration order (empty if the pallet has no storage).
	pub fn storage_entries(&self) -> &[StorageEntryMetadata] {
		self.storage.as_ref().map(|s| &*s.entries).unwrap_or(&[])
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct PalletStorage {
	/// The storage prefix (normally identical to the pallet name,
	/// although they are distinct values in the metadata).
	pub prefix: String,
	pub entries: Vec<StorageEntryMetadata>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageEntryMetadata {
	pub name: String,
	pub modifier: StorageEntryModifier,
	/// Map keys, outermost first. Empty for plain storage entries.
	pub keys: Vec<StorageKeyInfo>,
	pub value: TypeId,
	/// The SCALE encoded value handed back when nothing is stored.
	pub default: Vec<u8>,
	pub docs: Vec<String>,
}

/// One key of a storage map and the hasher applied to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageKeyInfo {
	pub ty: TypeId,
	pub hasher: StorageHasher,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StorageEntryModifier {
	/// Nothing is returned if no value is stored.
	Optional,
	/// The default value is returned if no value is stored.
	Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
pub enum StorageHasher {
	Blake2_128,
	Blake2_256,
	Blake2_128Concat,
	Twox128,
	Twox256,
	Twox64Concat,
	Identity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantMetadata {
	pub name: String,
	pub ty: TypeId,
	/// The SCALE encoded value of the constant.
	pub value: Vec<u8>,
	pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeApiMetadata {
	pub name: String,
	pub methods: Vec<RuntimeApiMethodMetadata>,
	pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeApiMethodMetadata {
	pub name: String,
	pub inputs: Vec<RuntimeApiParam>,
	pub output: TypeId,
	pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeApiParam {
	pub name: String,
	pub ty: TypeId,
}

/// Information about the extrinsic format supported on the substrate node
/// that the metadata was obtained from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrinsicMetadata {
	/// The version of the extrinsic format in use by the node.
	pub version: u8,
	/// The extrinsic type itself. V14 metadata only.
	pub ty: Option<TypeId>,
	pub address_ty: Option<TypeId>,
	pub call_ty: Option<TypeId>,
	pub signature_ty: Option<TypeId>,
	pub extra_ty: Option<TypeId>,
	/// Part of the extrinsic signature area can be varied to include whatever information
	/// a node decides is important. This holds details about that part, in order.
	pub signed_extensions: Vec<SignedExtensionMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedExtensionMetadata {
	pub identifier: String,
	pub ty: TypeId,
	pub additional_signed: TypeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OuterEnums {
	pub call_enum_ty: TypeId,
	pub event_enum_ty: TypeId,
	pub error_enum_ty: TypeId,
}

/// Metadata gives a single key type per storage map. With one hasher that's the key itself;
/// with N hashers it must be an N-tuple holding each key, outermost first.
fn split_storage_keys(
	types: &TypeRegistry,
	pallet: &str,
	entry: &str,
	key: TypeId,
	hashers: Vec<StorageHasher>,
) -> Result<Vec<StorageKeyInfo>, MetadataError> {
	if hashers.len() == 1 {
		return Ok(vec![StorageKeyInfo { ty: key, hasher: hashers[0] }]);
	}
	let key_ids = match types.node(key) {
		Some(TypeNode::Tuple(ids)) => ids.clone(),
		Some(other) => {
			return Err(MetadataError::item(
				pallet,
				entry,
				format!("expected a tuple of {} keys, got a {}", hashers.len(), other.kind_name()),
			))
		}
		None => return Err(MetadataError::item(pallet, entry, format!("key type {key} does not exist"))),
	};
	if key_ids.len() != hashers.len() {
		return Err(MetadataError::item(
			pallet,
			entry,
			format!("{} keys but {} hashers", key_ids.len(), hashers.len()),
		));
	}
	Ok(key_ids.into_iter().zip(hashers).map(|(ty, hasher)| StorageKeyInfo { ty, hasher }).collect())
}

/// Pallet names and indices must be unique, and every pallet must pass [`validate_pallet`].
fn validate_pallets(types: &TypeRegistry, pallets: &[PalletMetadata]) -> Result<(), MetadataError> {
	for (pos, pallet) in pallets.iter().enumerate() {
		if let Some(other) = pallets[..pos].iter().find(|p| p.name == pallet.name || p.index == pallet.index) {
			return Err(MetadataError::item(
				&pallet.name,
				"index",
				format!("pallet '{}' (index {}) clashes with pallet '{}' (index {})", pallet.name, pallet.index, other.name, other.index),
			));
		}
		validate_pallet(types, pallet)?;
	}
	Ok(())
}

/// Every item must reference types that exist, and call/event/error types must be variants.
fn validate_pallet(types: &TypeRegistry, pallet: &PalletMetadata) -> Result<(), MetadataError> {
	let exists = |item: &str, ty: TypeId| {
		types
			.resolve(ty)
			.map(|_| ())
			.ok_or_else(|| MetadataError::item(&pallet.name, item, format!("refers to type {ty}, which does not exist")))
	};

	for entry in pallet.storage_entries() {
		exists(&entry.name, entry.value)?;
		for key in &entry.keys {
			exists(&entry.name, key.ty)?;
		}
	}
	for constant in &pallet.constants {
		exists(&constant.name, constant.ty)?;
	}
	for section in [PalletSection::Calls, PalletSection::Events, PalletSection::Errors] {
		if let Some(ty) = pallet.variant_section(section) {
			let item = section.to_string();
			exists(&item, ty)?;
			if types.variant_table(ty).is_none() {
				return Err(MetadataError::item(&pallet.name, &item, format!("type {ty} is not a variant")));
			}
		}
	}
	Ok(())
}

fn validate_runtime_api(types: &TypeRegistry, api: &RuntimeApiMetadata) -> Result<(), MetadataError> {
	for method in &api.methods {
		let ids = method.inputs.iter().map(|p| p.ty).chain(std::iter::once(method.output));
		for ty in ids {
			if types.resolve(ty).is_none() {
				return Err(MetadataError::item(
					&api.name,
					&method.name,
					format!("refers to type {ty}, which does not exist"),
				));
			}
		}
	}
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn rejects_missing_magic() {
		let err = Metadata::from_bytes(b"nope\x0e").unwrap_err();
		assert_eq!(err, MetadataError::malformed(MetadataLocation::Offset(0), "missing the 'meta' magic number"));
	}

	#[test]
	fn rejects_unsupported_versions_by_the_version_byte() {
		let mut bytes = META_RESERVED.to_le_bytes().to_vec();
		bytes.push(13);
		bytes.extend_from_slice(&[0; 16]);
		let err = Metadata::from_bytes(&bytes).unwrap_err();
		assert_eq!(err, MetadataError::UnsupportedMetadataVersion { version: 13, offset: 4 });
	}

	#[test]
	fn truncated_metadata_reports_offset() {
		let mut bytes = META_RESERVED.to_le_bytes().to_vec();
		bytes.push(14);
		// A compact length claiming many types, and then nothing.
		bytes.push(0xfc);
		let err = Metadata::from_bytes(&bytes).unwrap_err();
		match err {
			MetadataError::MalformedMetadata { location: MetadataLocation::Offset(offset), .. } => {
				assert!(offset >= 5 && offset <= bytes.len(), "offset {offset} out of range")
			}
			other => panic!("unexpected error {other:?}"),
		}
	}

	#[test]
	fn too_short_for_a_version() {
		assert!(matches!(
			Metadata::from_bytes(&[0x6d, 0x65]),
			Err(MetadataError::MalformedMetadata { location: MetadataLocation::Offset(2), .. })
		));
	}
}
