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

use super::TypeRef;
use crate::codec::{Codec, DecodeError, EncodeError};
use crate::metadata::{StorageHasher, TypeRegistry};
use crate::value::Value;
use serde::Serialize;
use sp_core::hashing::{blake2_128, blake2_256, twox_128, twox_256, twox_64};

/// Storage keys always start with `twox_128(prefix) ++ twox_128(name)`.
pub const STORAGE_PREFIX_LEN: usize = 32;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
	#[error("{pallet}.{name} takes {expected} key(s) but {got} were given")]
	WrongNumberOfKeys { pallet: String, name: String, expected: usize, got: usize },
	#[error("not enough bytes to hold the {needed} byte hash of a {hasher} key; got {got}")]
	NotEnoughBytes { hasher: StorageHasher, needed: usize, got: usize },
	#[error("{0} bytes were left over after decoding the storage keys")]
	TrailingBytes(usize),
	#[error("couldn't find a storage entry corresponding to the prefix and name hashes provided")]
	EntryNotFound,
	#[error(transparent)]
	Encode(#[from] EncodeError),
	#[error(transparent)]
	Decode(#[from] DecodeError),
}

impl StorageHasher {
	/// Hash some SCALE encoded key bytes. Concat hashers append the bytes themselves.
	pub fn hash(&self, bytes: &[u8]) -> Vec<u8> {
		match self {
			StorageHasher::Blake2_128 => blake2_128(bytes).to_vec(),
			StorageHasher::Blake2_256 => blake2_256(bytes).to_vec(),
			StorageHasher::Blake2_128Concat => [blake2_128(bytes).as_slice(), bytes].concat(),
			StorageHasher::Twox128 => twox_128(bytes).to_vec(),
			StorageHasher::Twox256 => twox_256(bytes).to_vec(),
			StorageHasher::Twox64Concat => [twox_64(bytes).as_slice(), bytes].concat(),
			StorageHasher::Identity => bytes.to_vec(),
		}
	}

	/// How many bytes the hash portion takes up (not counting any appended key).
	pub fn hash_len(&self) -> usize {
		match self {
			StorageHasher::Blake2_128 | StorageHasher::Twox128 | StorageHasher::Blake2_128Concat => 16,
			StorageHasher::Blake2_256 | StorageHasher::Twox256 => 32,
			StorageHasher::Twox64Concat => 8,
			StorageHasher::Identity => 0,
		}
	}

	/// Is the SCALE encoded key next up after the hash?
	pub fn is_concat(&self) -> bool {
		matches!(self, StorageHasher::Blake2_128Concat | StorageHasher::Twox64Concat | StorageHasher::Identity)
	}
}

/// Whether an entry is a single value, a map or a map with several keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum StorageShape {
	#[display(fmt = "plain")]
	Plain,
	#[display(fmt = "map")]
	Map,
	#[display(fmt = "n-map")]
	NMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageKeyDescriptor {
	pub ty: TypeRef,
	pub hasher: StorageHasher,
}

/// A storage entry, its keys (outermost first) and the type of the value stored under them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageDescriptor {
	pub pallet: String,
	/// The storage prefix; usually, but not necessarily, the pallet name.
	pub prefix: String,
	pub name: String,
	pub keys: Vec<StorageKeyDescriptor>,
	pub value: TypeRef,
	/// `true` if nothing is handed back when no value is stored.
	pub is_optional: bool,
	#[serde(with = "hex::serde")]
	pub default: Vec<u8>,
	pub docs: Vec<String>,
}

impl StorageDescriptor {
	pub fn shape(&self) -> StorageShape {
		match self.keys.len() {
			0 => StorageShape::Plain,
			1 => StorageShape::Map,
			_ => StorageShape::NMap,
		}
	}

	/// `twox_128(prefix) ++ twox_128(name)`; every key of this entry starts with this.
	pub fn prefix_hash(&self) -> [u8; STORAGE_PREFIX_LEN] {
		let mut out = [0; STORAGE_PREFIX_LEN];
		out[..16].copy_from_slice(&twox_128(self.prefix.as_bytes()));
		out[16..].copy_from_slice(&twox_128(self.name.as_bytes()));
		out
	}

	/// SCALE encode one value per key and concatenate the encodings, first key outermost.
	/// No hashing is applied.
	pub fn encode_key_args(&self, registry: &TypeRegistry, args: &[Value]) -> Result<Vec<u8>, StorageError> {
		let mut out = Vec::new();
		for encoded in self.encode_each_key(registry, args)? {
			out.extend(encoded);
		}
		Ok(out)
	}

	/// The full storage key to look the value up with:
	/// `twox_128(prefix) ++ twox_128(name) ++ hasher(key)` for each key in turn.
	pub fn storage_key(&self, registry: &TypeRegistry, args: &[Value]) -> Result<Vec<u8>, StorageError> {
		let mut out = self.prefix_hash().to_vec();
		for (key, encoded) in self.keys.iter().zip(self.encode_each_key(registry, args)?) {
			out.extend(key.hasher.hash(&encoded));
		}
		Ok(out)
	}

	fn encode_each_key(&self, registry: &TypeRegistry, args: &[Value]) -> Result<Vec<Vec<u8>>, StorageError> {
		if args.len() != self.keys.len() {
			return Err(StorageError::WrongNumberOfKeys {
				pallet: self.pallet.clone(),
				name: self.name.clone(),
				expected: self.keys.len(),
				got: args.len(),
			});
		}
		self.keys
			.iter()
			.zip(args)
			.map(|(key, arg)| Codec::new(registry, key.ty.id).encode(arg).map_err(StorageError::from))
			.collect()
	}

	/// Decode a stored value. The bytes must hold exactly one value.
	pub fn decode_value(&self, registry: &TypeRegistry, bytes: &[u8]) -> Result<Value, DecodeError> {
		Codec::new(registry, self.value.id).decode_exact(bytes)
	}

	/// The value handed back when nothing is stored. Optional entries hand back nothing.
	pub fn default_value(&self, registry: &TypeRegistry) -> Result<Option<Value>, DecodeError> {
		if self.is_optional {
			return Ok(None);
		}
		self.decode_value(registry, &self.default).map(Some)
	}

	/// Split the part of a storage key following the prefix hash into one [`StorageKeyPart`]
	/// per key.
	pub fn decode_key_parts(&self, registry: &TypeRegistry, bytes: &[u8]) -> Result<Vec<StorageKeyPart>, StorageError> {
		let mut parts = Vec::with_capacity(self.keys.len());
		let mut offset = 0;
		for key in &self.keys {
			let hash_len = key.hasher.hash_len();
			let available = bytes.len() - offset;
			if available < hash_len {
				return Err(StorageError::NotEnoughBytes { hasher: key.hasher, needed: hash_len, got: available });
			}
			let hash = bytes[offset..offset + hash_len].to_vec();
			offset += hash_len;
			let value = if key.hasher.is_concat() {
				let (value, consumed) = Codec::new(registry, key.ty.id).decode(bytes, offset)?;
				offset += consumed;
				Some(value)
			} else {
				None
			};
			parts.push(StorageKeyPart { hasher: key.hasher, hash, value });
		}
		if offset != bytes.len() {
			return Err(StorageError::TrailingBytes(bytes.len() - offset));
		}
		Ok(parts)
	}
}

/// One key recovered from a storage key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageKeyPart {
	pub hasher: StorageHasher,
	/// The hash bytes (empty for [`StorageHasher::Identity`]).
	#[serde(with = "hex::serde")]
	pub hash: Vec<u8>,
	/// The key itself, if the hasher appends it to the hash.
	pub value: Option<Value>,
}
