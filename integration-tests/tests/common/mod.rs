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

//! A runtime described with the same derives a real one uses, and the metadata built from it.

#![allow(dead_code, non_camel_case_types)]

use codec::{Decode, Encode};
use frame_metadata::{
	v14::{self, RuntimeMetadataV14},
	v15::{self, RuntimeMetadataV15},
	RuntimeMetadataPrefixed,
};
use scale_info::{meta_type, TypeInfo};

pub type AccountId = [u8; 32];

pub const BALANCES: u8 = 10;
pub const ASSETS: u8 = 50;
pub const XCM: u8 = 99;

pub fn init_logger() {
	let _ = pretty_env_logger::try_init();
}

pub fn to_bytes(hex_str: &str) -> Vec<u8> {
	let hex_str = hex_str.strip_prefix("0x").expect("0x should prefix hex encoded bytes");
	hex::decode(hex_str).expect("valid bytes from hex")
}

#[derive(Debug, Clone, Copy, PartialEq, Encode, Decode, TypeInfo)]
pub enum Reasons {
	Free,
	Reserved,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
pub struct AccountData {
	pub free: u64,
	pub reserved: u64,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
pub struct BalanceLock {
	pub id: [u8; 8],
	pub amount: u128,
	pub reasons: Reasons,
}

/// Declared out of index order, with gaps, as pallets often end up.
#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
pub enum BalancesCall {
	#[codec(index = 7)]
	force_unreserve { who: AccountId, amount: u128 },
	#[codec(index = 0)]
	transfer_allow_death {
		dest: AccountId,
		#[codec(compact)]
		value: u128,
	},
	#[codec(index = 2)]
	set_lock(BalanceLock),
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
pub enum BalancesEvent {
	Endowed { account: AccountId, free_balance: u128 },
	Locked { who: AccountId, reasons: Reasons, until: Option<u32> },
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
pub enum BalancesError {
	VestingBalance,
	LiquidityRestrictions,
	InsufficientBalance,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
pub struct AssetAccount {
	pub balance: u128,
	pub frozen: bool,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
pub enum AssetsCall {
	#[codec(index = 3)]
	touch {
		#[codec(compact)]
		id: u32,
	},
}

pub mod pallet_a {
	use super::*;

	#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
	pub struct Pair {
		pub a: u8,
		pub b: u8,
	}
}

pub mod pallet_b {
	use super::*;

	#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
	pub struct Pair {
		pub a: u8,
		pub b: u8,
	}
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
pub struct Junctions(pub Vec<Junction>);

#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
pub enum Junction {
	Parachain(#[codec(compact)] u32),
	AccountIndex64 {
		#[codec(compact)]
		index: u64,
	},
	Nested(Junctions),
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
pub enum XcmCall {
	send { dest: Junctions, flags: bitvec::vec::BitVec<u8, bitvec::order::Lsb0> },
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
pub enum RuntimeCall {
	#[codec(index = 10)]
	Balances(BalancesCall),
	#[codec(index = 50)]
	Assets(AssetsCall),
	#[codec(index = 99)]
	Xcm(XcmCall),
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
pub enum RuntimeEvent {
	#[codec(index = 10)]
	Balances(BalancesEvent),
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, TypeInfo)]
pub enum RuntimeError {
	#[codec(index = 10)]
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
pub struct CheckNonce(#[codec(compact)] pub u32);

pub type SignedExtra = (CheckNonce,);

#[derive(TypeInfo)]
pub struct UncheckedExtrinsic<Address, Call, Signature, Extra> {
	address: Address,
	call: Call,
	signature: Signature,
	extra: Extra,
}

#[derive(TypeInfo)]
pub struct Runtime;

fn entry(
	name: &'static str,
	modifier: v14::StorageEntryModifier,
	ty: v14::StorageEntryType<scale_info::form::MetaForm>,
	default: Vec<u8>,
) -> v14::StorageEntryMetadata {
	v14::StorageEntryMetadata { name, modifier, ty, default, docs: vec![] }
}

fn map<K: TypeInfo + 'static, V: TypeInfo + 'static>(
	hashers: Vec<v14::StorageHasher>,
) -> v14::StorageEntryType<scale_info::form::MetaForm> {
	v14::StorageEntryType::Map { hashers, key: meta_type::<K>(), value: meta_type::<V>() }
}

fn pallets_v14() -> Vec<v14::PalletMetadata> {
	use v14::{StorageEntryModifier as Modifier, StorageHasher::*};
	vec![
		v14::PalletMetadata {
			name: "Balances",
			storage: Some(v14::PalletStorageMetadata {
				prefix: "Balances",
				entries: vec![
					entry("TotalIssuance", Modifier::Default, v14::StorageEntryType::Plain(meta_type::<u128>()), 0u128.encode()),
					entry(
						"Account",
						Modifier::Default,
						map::<AccountId, AccountData>(vec![Blake2_128Concat]),
						AccountData { free: 0, reserved: 0 }.encode(),
					),
					entry("Locks", Modifier::Default, map::<AccountId, Vec<BalanceLock>>(vec![Blake2_128Concat]), vec![0]),
				],
			}),
			calls: Some(v14::PalletCallMetadata { ty: meta_type::<BalancesCall>() }),
			event: Some(v14::PalletEventMetadata { ty: meta_type::<BalancesEvent>() }),
			constants: vec![
				v14::PalletConstantMetadata {
					name: "ExistentialDeposit",
					ty: meta_type::<u128>(),
					value: 10_000_000_000u128.encode(),
					docs: vec![],
				},
				v14::PalletConstantMetadata {
					name: "MaxLocks",
					ty: meta_type::<Option<u32>>(),
					value: Some(50u32).encode(),
					docs: vec![],
				},
			],
			error: Some(v14::PalletErrorMetadata { ty: meta_type::<BalancesError>() }),
			index: BALANCES,
		},
		v14::PalletMetadata {
			name: "Assets",
			storage: Some(v14::PalletStorageMetadata {
				prefix: "Assets",
				entries: vec![
					entry(
						"Account",
						Modifier::Optional,
						map::<(AccountId, u32), AssetAccount>(vec![Blake2_128Concat, Blake2_128Concat]),
						vec![0],
					),
					entry("PairA", Modifier::Optional, map::<u32, pallet_a::Pair>(vec![Twox64Concat]), vec![0]),
					entry("PairB", Modifier::Optional, map::<u32, pallet_b::Pair>(vec![Identity]), vec![0]),
				],
			}),
			calls: Some(v14::PalletCallMetadata { ty: meta_type::<AssetsCall>() }),
			event: None,
			constants: vec![],
			error: None,
			index: ASSETS,
		},
		v14::PalletMetadata {
			name: "Xcm",
			storage: Some(v14::PalletStorageMetadata {
				prefix: "Xcm",
				entries: vec![entry("Destinations", Modifier::Optional, map::<u64, Junctions>(vec![Twox128]), vec![0])],
			}),
			calls: Some(v14::PalletCallMetadata { ty: meta_type::<XcmCall>() }),
			event: None,
			constants: vec![],
			error: None,
			index: XCM,
		},
	]
}

fn signed_extensions() -> Vec<v14::SignedExtensionMetadata> {
	vec![v14::SignedExtensionMetadata {
		identifier: "CheckNonce",
		ty: meta_type::<CheckNonce>(),
		additional_signed: meta_type::<()>(),
	}]
}

pub fn metadata_v14() -> RuntimeMetadataV14 {
	let extrinsic = v14::ExtrinsicMetadata {
		ty: meta_type::<UncheckedExtrinsic<MultiAddress, RuntimeCall, MultiSignature, SignedExtra>>(),
		version: 4,
		signed_extensions: signed_extensions(),
	};
	RuntimeMetadataV14::new(pallets_v14(), extrinsic, meta_type::<Runtime>())
}

pub fn metadata_v15() -> RuntimeMetadataV15 {
	let pallets = pallets_v14()
		.into_iter()
		.map(|p| v15::PalletMetadata {
			name: p.name,
			storage: p.storage,
			calls: p.calls,
			event: p.event,
			constants: p.constants,
			error: p.error,
			index: p.index,
			docs: vec![],
		})
		.collect();
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
	let apis = vec![v15::RuntimeApiMetadata {
		name: "BalancesApi",
		methods: vec![v15::RuntimeApiMethodMetadata {
			name: "account",
			inputs: vec![
				v15::RuntimeApiMethodParamMetadata { name: "who", ty: meta_type::<AccountId>() },
				v15::RuntimeApiMethodParamMetadata { name: "at", ty: meta_type::<Option<u32>>() },
			],
			output: meta_type::<AccountData>(),
			docs: vec![],
		}],
		docs: vec![],
	}];
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

/// Find a type by the trailing segments of its path, eg `["pallet_a", "Pair"]`.
pub fn type_by_path(metadata: &subdesc::Metadata, segments: &[&str]) -> subdesc::TypeId {
	metadata
		.types()
		.iter()
		.find(|info| info.path.len() >= segments.len() && info.path[info.path.len() - segments.len()..] == *segments)
		.map(|info| info.id)
		.unwrap_or_else(|| panic!("no type with a path ending in {segments:?}"))
}
