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

use crate::{CompiledMetadata, Error, MetadataHash};
use parking_lot::RwLock;
use sp_core::hashing::blake2_256;
use std::collections::HashMap;
use std::sync::Arc;

/// Compiled metadata keyed by the `blake2_256` hash of the bytes it was compiled from.
///
/// Entries are never modified or removed once inserted. Cloning the cache hands back
/// another handle to the same entries.
#[derive(Debug, Default, Clone)]
pub struct DescriptorCache {
	entries: Arc<RwLock<HashMap<MetadataHash, Arc<CompiledMetadata>>>>,
}

impl DescriptorCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Hand back the compiled form of some metadata, compiling it if it isn't cached yet.
	///
	/// Compiling happens outside of the lock. If two callers race to compile the same bytes,
	/// both get the entry that was inserted first.
	pub fn get_or_compile(&self, bytes: &[u8]) -> Result<Arc<CompiledMetadata>, Error> {
		let hash = blake2_256(bytes);
		if let Some(compiled) = self.get(&hash) {
			log::trace!("Metadata cache hit");
			return Ok(compiled);
		}

		let compiled = Arc::new(CompiledMetadata::compile(bytes)?);
		let mut entries = self.entries.write();
		Ok(entries.entry(hash).or_insert(compiled).clone())
	}

	pub fn get(&self, hash: &MetadataHash) -> Option<Arc<CompiledMetadata>> {
		self.entries.read().get(hash).cloned()
	}

	pub fn contains(&self, hash: &MetadataHash) -> bool {
		self.entries.read().contains_key(hash)
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}
