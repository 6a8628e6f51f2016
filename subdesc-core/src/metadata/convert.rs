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

//! V14 and V15 pallets share their shape, but not necessarily their Rust types, so the
//! conversion into our own pallet representation is written once as a macro and expanded
//! against each version's module.

/// Convert a `frame_metadata::$ver::PalletMetadata` into a [`crate::metadata::PalletMetadata`].
/// Storage map keys are split into one entry per hasher along the way.
macro_rules! convert_pallet {
	($ver:ident, $types:expr, $pallet:expr, $docs:expr) => {{
		use frame_metadata::$ver as md;
		use $crate::metadata::{
			ConstantMetadata, PalletMetadata, PalletStorage, StorageEntryMetadata, StorageEntryModifier,
			StorageHasher,
		};
		use $crate::TypeId;

		let types: &$crate::metadata::TypeRegistry = $types;
		let pallet = $pallet;
		let name: String = pallet.name;

		let storage = match pallet.storage {
			Some(storage) => {
				let mut entries = Vec::with_capacity(storage.entries.len());
				for entry in storage.entries {
					let (keys, value) = match entry.ty {
						md::StorageEntryType::Plain(ty) => (Vec::new(), TypeId::from(ty)),
						md::StorageEntryType::Map { hashers, key, value } => {
							let hashers = hashers
								.into_iter()
								.map(|hasher| match hasher {
									md::StorageHasher::Blake2_128 => StorageHasher::Blake2_128,
									md::StorageHasher::Blake2_256 => StorageHasher::Blake2_256,
									md::StorageHasher::Blake2_128Concat => StorageHasher::Blake2_128Concat,
									md::StorageHasher::Twox128 => StorageHasher::Twox128,
									md::StorageHasher::Twox256 => StorageHasher::Twox256,
									md::StorageHasher::Twox64Concat => StorageHasher::Twox64Concat,
									md::StorageHasher::Identity => StorageHasher::Identity,
								})
								.collect();
							let keys = $crate::metadata::split_storage_keys(
								types,
								&name,
								&entry.name,
								TypeId::from(key),
								hashers,
							)?;
							(keys, TypeId::from(value))
						}
					};
					let modifier = match entry.modifier {
						md::StorageEntryModifier::Optional => StorageEntryModifier::Optional,
						md::StorageEntryModifier::Default => StorageEntryModifier::Default,
					};
					entries.push(StorageEntryMetadata {
						name: entry.name,
						modifier,
						keys,
						value,
						default: entry.default,
						docs: entry.docs,
					});
				}
				Some(PalletStorage { prefix: storage.prefix, entries })
			}
			None => None,
		};

		let constants = pallet
			.constants
			.into_iter()
			.map(|c| ConstantMetadata { name: c.name, ty: TypeId::from(c.ty), value: c.value, docs: c.docs })
			.collect();

		PalletMetadata {
			name,
			index: pallet.index,
			storage,
			calls: pallet.calls.map(|c| TypeId::from(c.ty)),
			events: pallet.event.map(|e| TypeId::from(e.ty)),
			errors: pallet.error.map(|e| TypeId::from(e.ty)),
			constants,
			docs: $docs,
		}
	}};
}
