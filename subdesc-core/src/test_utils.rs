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

//! Helpers for building registries and metadata in tests.

use crate::metadata::TypeRegistry;
use crate::TypeId;
use scale_info::{meta_type, PortableRegistry, Registry, TypeInfo};

/// A registry holding `T` and everything it refers to, along with the ID of `T`.
pub fn registry_of<T: TypeInfo + 'static>() -> (TypeRegistry, TypeId) {
	let mut registry = Registry::new();
	let id = registry.register_type(&meta_type::<T>());
	let portable: PortableRegistry = registry.into();
	(TypeRegistry::from_portable(&portable).expect("valid registry"), id.into())
}

/// A registry holding each of the given types, along with their IDs in the same order.
pub fn registry_with(types: &[scale_info::MetaType]) -> (TypeRegistry, Vec<TypeId>) {
	let mut registry = Registry::new();
	let ids = types.iter().map(|ty| registry.register_type(ty).into()).collect();
	let portable: PortableRegistry = registry.into();
	(TypeRegistry::from_portable(&portable).expect("valid registry"), ids)
}

/// A small runtime, described with the same derives a real one would use, for building
/// metadata from.
pub mod runtime {
	#![allow(non_camel_case_types, dead_code)]

	use codec::{Decode, Encode};
	use frame_metadata::{
		v14::{self, RuntimeMetadataV14},
		v15::{self, RuntimeMetadataV15},
		RuntimeMetadataPrefixed,
	};
	use scale_info::{meta_type, TypeInfo};

	pub type AccountId = [u8; 32];

	#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
	pub struct AccountData {
		pub free: u64,
		pub reserved: u64,
	}

	#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
	pub struct AssetAccount {
		pub balance: u128,
		pub is_frozen: bool,
	}

	#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
	pub enum BalancesCall {
		#[codec(index = 0)]
		transfer {
			dest: MultiAddress,
			#[codec(compact)]
			value: u128,
		},
		#[codec(index = 3)]
		remark(Vec<u8>),
	}

	#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
	pub enum BalancesEvent {
		#[codec(index = 2)]
		Transfer { from: AccountId, to: AccountId, amount: u128 },
		#[codec(index = 4)]
		Dust(u128),
	}

	#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
	pub enum BalancesError {
		InsufficientBalance,
		ExistentialDeposit,
	}

	#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
	pub enum AssetsCall {
		#[codec(index = 1)]
		freeze { id: u32, who: AccountId },
	}

	#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
	pub enum RuntimeCall {
		#[codec(index = 5)]
		Balances(BalancesCall),
		#[codec(index = 9)]
		Assets(AssetsCall),
	}

	#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
	pub enum RuntimeEvent {
		#[codec(index = 5)]
		Balances(BalancesEvent),
	}

	#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
	pub enum RuntimeError {
		#[codec(index = 5)]
		Balances(BalancesError),
	}

	#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
	pub enum MultiAddress {
		Id(AccountId),
		Index(#[codec(compact)] u32),
	}

	#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
	pub enum MultiSignature {
		Ed25519([u8; 64]),
		Sr25519([u8; 64]),
	}

	#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
	pub enum Era {
		Immortal,
		Mortal(u8, u8),
	}

	#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
	pub struct CheckNonce(#[codec(compact)] pub u32);

	#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
	pub struct ChargeTransactionPayment(#[codec(compact)] pub u128);

	pub type SignedExtra = (Era, CheckNonce, ChargeTransactionPayment);

	#[derive(TypeInfo)]
	pub struct UncheckedExtrinsic<Address, Call, Signature, Extra> {
		address: Address,
		call: Call,
		signature: Signature,
		extra: Extra,
	}

	#[derive(TypeInfo)]
	pub struct Runtime;

	pub const BALANCES_INDEX: u8 = 5;
	pub const ASSETS_INDEX: u8 = 9;
	pub const EXISTENTIAL_DEPOSIT: u128 = 500;

	fn balances_storage() -> v14::PalletStorageMetadata {
		v14::PalletStorageMetadata {
			prefix: "Balances",
			entries: vec![
				v14::StorageEntryMetadata {
					name: "TotalIssuance",
					modifier: v14::StorageEntryModifier::Default,
					ty: v14::StorageEntryType::Plain(meta_type::<u128>()),
					default: 0u128.encode(),
					docs: vec!["The total units issued."],
				},
				v14::StorageEntryMetadata {
					name: "Account",
					modifier: v14::StorageEntryModifier::Default,
					ty: v14::StorageEntryType::Map {
						hashers: vec![v14::StorageHasher::Blake2_128Concat],
						key: meta_type::<AccountId>(),
						value: meta_type::<AccountData>(),
					},
					default: AccountData { free: 0, reserved: 0 }.encode(),
					docs: vec![],
				},
			],
		}
	}

	fn assets_storage() -> v14::PalletStorageMetadata {
		v14::PalletStorageMetadata {
			prefix: "Assets",
			entries: vec![v14::StorageEntryMetadata {
				name: "Account",
				modifier: v14::StorageEntryModifier::Optional,
				ty: v14::StorageEntryType::Map {
					hashers: vec![v14::StorageHasher::Blake2_128Concat, v14::StorageHasher::Twox64Concat],
					key: meta_type::<(AccountId, u32)>(),
					value: meta_type::<AssetAccount>(),
				},
				default: vec![0],
				docs: vec![],
			}],
		}
	}

	fn signed_extensions() -> Vec<v14::SignedExtensionMetadata> {
		vec![
			v14::SignedExtensionMetadata {
				identifier: "CheckMortality",
				ty: meta_type::<Era>(),
				additional_signed: meta_type::<[u8; 32]>(),
			},
			v14::SignedExtensionMetadata {
				identifier: "CheckNonce",
				ty: meta_type::<CheckNonce>(),
				additional_signed: meta_type::<()>(),
			},
			v14::SignedExtensionMetadata {
				identifier: "ChargeTransactionPayment",
				ty: meta_type::<ChargeTransactionPayment>(),
				additional_signed: meta_type::<()>(),
			},
		]
	}

	pub fn metadata_v14() -> RuntimeMetadataV14 {
		let pallets = vec![
			v14::PalletMetadata {
				name: "Balances",
				storage: Some(balances_storage()),
				calls: Some(v14::PalletCallMetadata { ty: meta_type::<BalancesCall>() }),
				event: Some(v14::PalletEventMetadata { ty: meta_type::<BalancesEvent>() }),
				constants: vec![v14::PalletConstantMetadata {
					name: "ExistentialDeposit",
					ty: meta_type::<u128>(),
					value: EXISTENTIAL_DEPOSIT.encode(),
					docs: vec!["The minimum balance an account may hold."],
				}],
				error: Some(v14::PalletErrorMetadata { ty: meta_type::<BalancesError>() }),
				index: BALANCES_INDEX,
			},
			v14::PalletMetadata {
				name: "Assets",
				storage: Some(assets_storage()),
				calls: Some(v14::PalletCallMetadata { ty: meta_type::<AssetsCall>() }),
				event: None,
				constants: vec![],
				error: None,
				index: ASSETS_INDEX,
			},
		];
		let extrinsic = v14::ExtrinsicMetadata {
			ty: meta_type::<UncheckedExtrinsic<MultiAddress, RuntimeCall, MultiSignature, SignedExtra>>(),
			version: 4,
			signed_extensions: signed_extensions(),
		};
		RuntimeMetadataV14::new(pallets, extrinsic, meta_type::<Runtime>())
	}

	pub fn metadata_v15() -> RuntimeMetadataV15 {
		let pallets = vec![
			v15::PalletMetadata {
				name: "Balances",
				storage: Some(balances_storage()),
				calls: Some(v15::PalletCallMetadata { ty: meta_type::<BalancesCall>() }),
				event: Some(v15::PalletEventMetadata { ty: meta_type::<BalancesEvent>() }),
				constants: vec![v15::PalletConstantMetadata {
					name: "ExistentialDeposit",
					ty: meta_type::<u128>(),
					value: EXISTENTIAL_DEPOSIT.encode(),
					docs: vec![],
				}],
				error: Some(v15::PalletErrorMetadata { ty: meta_type::<BalancesError>() }),
				index: BALANCES_INDEX,
				docs: vec!["Keeps track of balances."],
			},
			v15::PalletMetadata {
				name: "Assets",
				storage: Some(assets_storage()),
				calls: Some(v15::PalletCallMetadata { ty: meta_type::<AssetsCall>() }),
				event: None,
				constants: vec![],
				error: None,
				index: ASSETS_INDEX,
				docs: vec![],
			},
		];
		let extrinsic = v15::ExtrinsicMetadata {
			version: 4,
			address_ty: meta_type::<MultiAddress>(),
			call_ty: meta_type::<RuntimeCall>(),
			signature_ty: meta_type::<MultiSignature>(),
			extra_ty: meta_type::<SignedExtra>(),
			signed_extensions: signed_extensions()
				.into_iter()
				.map(|e| v15::SignedExtensionMetadata {
					identifier: e.identifier,
					ty: e.ty,
					additional_signed: e.additional_signed,
				})
				.collect(),
		};
		let apis = vec![
			v15::RuntimeApiMetadata {
				name: "AccountNonceApi",
				methods: vec![v15::RuntimeApiMethodMetadata {
					name: "account_nonce",
					inputs: vec![v15::RuntimeApiMethodParamMetadata { name: "account", ty: meta_type::<AccountId>() }],
					output: meta_type::<u32>(),
					docs: vec![],
				}],
				docs: vec![],
			},
			v15::RuntimeApiMetadata {
				name: "Metadata",
				methods: vec![v15::RuntimeApiMethodMetadata {
					name: "metadata_at_version",
					inputs: vec![v15::RuntimeApiMethodParamMetadata { name: "version", ty: meta_type::<u32>() }],
					output: meta_type::<Option<Vec<u8>>>(),
					docs: vec![],
				}],
				docs: vec![],
			},
		];
		let outer_enums = v15::OuterEnums {
			call_enum_ty: meta_type::<RuntimeCall>(),
			event_enum_ty: meta_type::<RuntimeEvent>(),
			error_enum_ty: meta_type::<RuntimeError>(),
		};
		let custom = v15::CustomMetadata { map: Default::default() };
		RuntimeMetadataV15::new(pallets, extrinsic, meta_type::<Runtime>(), apis, outer_enums, custom)
	}

	pub fn v14_bytes() -> Vec<u8> {
		RuntimeMetadataPrefixed::from(metadata_v14()).encode()
	}

	pub fn v15_bytes() -> Vec<u8> {
		RuntimeMetadataPrefixed::from(metadata_v15()).encode()
	}
}
