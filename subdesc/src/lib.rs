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

//! Compile Substrate metadata once and share the result.
//!
//! [`CompiledMetadata`] bundles everything built from one metadata blob: the parsed
//! [`Metadata`], its [`AliasTable`] and its [`DescriptorSet`]. A [`DescriptorCache`] hands out
//! compiled metadata keyed by the hash of the bytes it was built from, so identical metadata
//! is only ever compiled once, and a [`Registry`] maps spec versions onto it.

#![forbid(unsafe_code)]

mod cache;
mod error;

use sp_core::hashing::blake2_256;
use std::collections::HashMap;
use std::sync::Arc;
use subdesc_core::decoder::{Extrinsic, ExtrinsicError};

pub use self::cache::DescriptorCache;
pub use self::error::Error;
pub use subdesc_core::{
	anonymize, anonymize::AliasTable, codec, codec::Codec, decoder, descriptors, descriptors::DescriptorSet, metadata,
	value, variant, Metadata, TypeId, Value,
};

/// The runtime spec version a piece of metadata belongs to.
pub type SpecVersion = u32;

/// The hash identifying a metadata blob: `blake2_256` of its SCALE encoded bytes.
pub type MetadataHash = [u8; 32];

/// Everything compiled from a single metadata blob. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledMetadata {
	hash: MetadataHash,
	metadata: Metadata,
	aliases: AliasTable,
	descriptors: DescriptorSet,
}

impl CompiledMetadata {
	/// Parse and compile some SCALE encoded metadata.
	pub fn compile(bytes: &[u8]) -> Result<CompiledMetadata, Error> {
		let hash = blake2_256(bytes);
		log::debug!("Compiling metadata 0x{}", hex_prefix(&hash));
		let metadata = Metadata::from_bytes(bytes)?;
		let (aliases, descriptors) = descriptors::build(&metadata)?;
		log::debug!(
			"Metadata V{} compiled: {} types in {} shapes, {} descriptors",
			metadata.version(),
			aliases.len(),
			aliases.unique_shapes(),
			descriptors.len()
		);
		Ok(CompiledMetadata { hash, metadata, aliases, descriptors })
	}

	pub fn hash(&self) -> &MetadataHash {
		&self.hash
	}

	pub fn metadata(&self) -> &Metadata {
		&self.metadata
	}

	pub fn aliases(&self) -> &AliasTable {
		&self.aliases
	}

	pub fn descriptors(&self) -> &DescriptorSet {
		&self.descriptors
	}

	/// A codec for any type in the registry.
	pub fn codec<Id: Into<TypeId>>(&self, ty: Id) -> Codec<'_> {
		Codec::new(self.metadata.types(), ty)
	}

	/// Decode a SCALE encoded vector of extrinsics, one result per extrinsic.
	pub fn decode_extrinsics(&self, data: &[u8]) -> Vec<Result<Extrinsic<'_>, ExtrinsicError>> {
		decoder::decode_extrinsics(&self.metadata, &self.descriptors, data)
	}
}

/// Compiled metadata for each registered runtime spec version. Versions whose metadata is
/// identical share a single compiled copy through the [`DescriptorCache`].
#[derive(Debug, Default)]
pub struct Registry {
	cache: DescriptorCache,
	versions: HashMap<SpecVersion, Arc<CompiledMetadata>>,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Use an existing cache, which may be shared with other registries.
	pub fn with_cache(cache: DescriptorCache) -> Self {
		Registry { cache, versions: HashMap::new() }
	}

	/// Register a runtime version with the registry, compiling its metadata if no identical
	/// metadata has been compiled already.
	pub fn register_version(&mut self, version: SpecVersion, metadata: &[u8]) -> Result<Arc<CompiledMetadata>, Error> {
		let compiled = self.cache.get_or_compile(metadata)?;
		log::trace!("Registered spec version {} as 0x{}", version, hex_prefix(compiled.hash()));
		self.versions.insert(version, compiled.clone());
		Ok(compiled)
	}

	pub fn has_version(&self, version: &SpecVersion) -> bool {
		self.versions.contains_key(version)
	}

	pub fn compiled(&self, version: SpecVersion) -> Result<&Arc<CompiledMetadata>, Error> {
		self.versions.get(&version).ok_or(Error::SpecVersionNotFound(version))
	}

	pub fn decode_extrinsics(
		&self,
		version: SpecVersion,
		data: &[u8],
	) -> Result<Vec<Result<Extrinsic<'_>, ExtrinsicError>>, Error> {
		Ok(self.compiled(version)?.decode_extrinsics(data))
	}

	pub fn cache(&self) -> &DescriptorCache {
		&self.cache
	}
}

/// The first few bytes of a hash, for log lines.
fn hex_prefix(hash: &MetadataHash) -> String {
	hex::encode(&hash[..4])
}
