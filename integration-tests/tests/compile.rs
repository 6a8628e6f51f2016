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

mod common;

use bitvec::{bitvec, order::Lsb0};
use codec::Encode;
use common::*;
use subdesc::descriptors::StorageShape;
use subdesc::metadata::PalletSection;
use subdesc::value::Composite;
use subdesc::{CompiledMetadata, Value};

fn compile(bytes: &[u8]) -> CompiledMetadata {
	init_logger();
	CompiledMetadata::compile(bytes).expect("metadata compiles")
}

#[test]
fn v14_and_v15_compile_to_the_same_pallets() {
	let v14 = compile(&v14_bytes());
	let v15 = compile(&v15_bytes());
	assert_eq!(v14.metadata().version(), 14);
	assert_eq!(v15.metadata().version(), 15);

	for compiled in [&v14, &v15] {
		let pallets: Vec<_> = compiled.descriptors().pallets().iter().map(|p| (p.name.as_str(), p.index)).collect();
		assert_eq!(pallets, vec![("Balances", BALANCES), ("Assets", ASSETS), ("Xcm", XCM)]);

		let balances = compiled.descriptors().pallet("Balances").unwrap();
		let sections: Vec<_> = PalletSection::ALL.iter().map(|s| balances.section_len(*s)).collect();
		assert_eq!(sections, vec![3, 3, 2, 3, 2]);
	}

	assert!(v14.descriptors().runtime_apis().is_empty());
	assert_eq!(v15.descriptors().runtime_apis().len(), 1);
	assert!(v15.metadata().outer_enums().is_some());
}

#[test]
fn calls_keep_declaration_order_and_declared_indices() {
	let compiled = compile(&v14_bytes());
	let calls: Vec<_> = compiled
		.descriptors()
		.pallet("Balances")
		.unwrap()
		.calls
		.iter()
		.map(|c| (c.name.as_str(), c.index))
		.collect();
	assert_eq!(calls, vec![("force_unreserve", 7), ("transfer_allow_death", 0), ("set_lock", 2)]);
	assert_eq!(compiled.descriptors().call_by_index(BALANCES, 7).unwrap().name, "force_unreserve");
	assert!(compiled.descriptors().call_by_index(BALANCES, 1).is_none());
}

#[test]
fn compiling_twice_gives_identical_results() {
	let bytes = v15_bytes();
	let first = compile(&bytes);
	let second = compile(&bytes);
	assert_eq!(first, second);

	let first_json = serde_json::to_string(first.descriptors()).unwrap();
	let second_json = serde_json::to_string(second.descriptors()).unwrap();
	assert_eq!(first_json, second_json);
}

#[test]
fn distinct_shapes_get_distinct_aliases() {
	let compiled = compile(&v15_bytes());
	let metadata = compiled.metadata();
	let aliases = compiled.aliases();

	let distinct = [
		type_by_path(metadata, &["AccountData"]),
		type_by_path(metadata, &["AssetAccount"]),
		type_by_path(metadata, &["BalanceLock"]),
		type_by_path(metadata, &["Reasons"]),
		type_by_path(metadata, &["pallet_a", "Pair"]),
		type_by_path(metadata, &["Junctions"]),
		type_by_path(metadata, &["Junction"]),
		type_by_path(metadata, &["MultiAddress"]),
	];
	let mut seen: Vec<_> = distinct.iter().map(|id| aliases.alias_of(*id).unwrap().alias()).collect();
	seen.sort();
	seen.dedup();
	assert_eq!(seen.len(), distinct.len());
	assert!(aliases.unique_shapes() < aliases.len());
}

#[test]
fn calls_round_trip_through_descriptors() {
	let compiled = compile(&v14_bytes());
	let types = compiled.metadata().types();

	let call = RuntimeCall::Balances(BalancesCall::set_lock(BalanceLock {
		id: *b"staking ",
		amount: 1_000,
		reasons: Reasons::Reserved,
	}));
	let bytes = call.encode();
	let descriptor = compiled.descriptors().call_by_index(bytes[0], bytes[1] as u32).unwrap();
	assert_eq!(descriptor.name, "set_lock");

	let args = descriptor.decode_args(types, &bytes[2..]).unwrap();
	assert_eq!(descriptor.encode_call(types, &args).unwrap(), bytes);

	let transfer = compiled.descriptors().call("Balances", "transfer_allow_death").unwrap();
	let args = Composite::Named(vec![
		("dest".into(), Value::from_bytes([3; 32])),
		("value".into(), Value::u128(u64::MAX as u128 + 1)),
	]);
	let expected =
		RuntimeCall::Balances(BalancesCall::transfer_allow_death { dest: [3; 32], value: u64::MAX as u128 + 1 }).encode();
	assert_eq!(transfer.encode_call(types, &args).unwrap(), expected);
}

#[test]
fn cyclic_and_bit_sequence_values_round_trip() {
	let compiled = compile(&v14_bytes());
	let types = compiled.metadata().types();

	let dest = Junctions(vec![
		Junction::Parachain(1000),
		Junction::Nested(Junctions(vec![Junction::AccountIndex64 { index: 42 }, Junction::Nested(Junctions(vec![]))])),
	]);
	let call = RuntimeCall::Xcm(XcmCall::send { dest: dest.clone(), flags: bitvec![u8, Lsb0; 1, 0, 1, 1, 0, 0, 0, 0, 1] });
	let bytes = call.encode();

	let descriptor = compiled.descriptors().call("Xcm", "send").unwrap();
	let args = descriptor.decode_args(types, &bytes[2..]).unwrap();
	assert_eq!(descriptor.encode_call(types, &args).unwrap(), bytes);

	let flags = args.field("flags").unwrap();
	assert_eq!(serde_json::to_value(flags).unwrap(), serde_json::json!([true, false, true, true, false, false, false, false, true]));

	let destinations = compiled.descriptors().storage("Xcm", "Destinations").unwrap();
	let value = destinations.decode_value(types, &dest.encode()).unwrap();
	assert_eq!(compiled.codec(destinations.value.id).encode(&value).unwrap(), dest.encode());
}

#[test]
fn storage_values_and_defaults() {
	let compiled = compile(&v15_bytes());
	let types = compiled.metadata().types();

	let locks = compiled.descriptors().storage("Balances", "Locks").unwrap();
	assert_eq!(locks.shape(), StorageShape::Map);
	let stored = vec![
		BalanceLock { id: *b"vesting ", amount: 10, reasons: Reasons::Free },
		BalanceLock { id: *b"democrac", amount: 20, reasons: Reasons::Reserved },
	]
	.encode();
	let value = locks.decode_value(types, &stored).unwrap();
	assert_eq!(compiled.codec(locks.value.id).encode(&value).unwrap(), stored);
	assert_eq!(locks.default_value(types).unwrap(), Some(Value::unnamed_composite(vec![])));

	let issuance = compiled.descriptors().storage("Balances", "TotalIssuance").unwrap();
	assert_eq!(issuance.shape(), StorageShape::Plain);
	assert_eq!(issuance.default_value(types).unwrap(), Some(Value::u128(0)));

	let assets = compiled.descriptors().storage("Assets", "Account").unwrap();
	assert_eq!(assets.shape(), StorageShape::NMap);
	assert_eq!(assets.default_value(types).unwrap(), None);
}

#[test]
fn storage_keys_decode_through_every_hasher() {
	let compiled = compile(&v15_bytes());
	let types = compiled.metadata().types();
	let descriptors = compiled.descriptors();

	let pair_b = descriptors.storage("Assets", "PairB").unwrap();
	let key = pair_b.storage_key(types, &[Value::u32(6)]).unwrap();
	let decoded = descriptors.decode_storage_key(types, &key).unwrap();
	assert_eq!(decoded.entry.name, "PairB");
	assert!(decoded.keys[0].hash.is_empty());
	assert_eq!(decoded.keys[0].value, Some(Value::u32(6)));

	let destinations = descriptors.storage("Xcm", "Destinations").unwrap();
	let key = destinations.storage_key(types, &[Value::u64(6)]).unwrap();
	assert_eq!(key.len(), 32 + 16);
	let decoded = descriptors.decode_storage_key(types, &key).unwrap();
	assert_eq!(decoded.keys[0].value, None);
	assert_eq!(decoded.keys[0].hash, sp_core::hashing::twox_128(&6u64.encode()).to_vec());
}

#[test]
fn runtime_api_arguments_and_results() {
	let compiled = compile(&v15_bytes());
	let types = compiled.metadata().types();
	let api = compiled.descriptors().runtime_api("BalancesApi", "account").unwrap();
	assert_eq!(api.call_name(), "BalancesApi_account");
	let names: Vec<_> = api.args.iter().map(|a| a.name.as_str()).collect();
	assert_eq!(names, vec!["who", "at"]);

	let args = api.encode_args(types, &[Value::from_bytes([8; 32]), Value::some(Value::u32(3))]).unwrap();
	assert_eq!(args, ([8u8; 32], Some(3u32)).encode());

	let result = api.decode_result(types, &AccountData { free: 1, reserved: 2 }.encode()).unwrap();
	assert_eq!(result, Value::named_composite(vec![("free", Value::u64(1)), ("reserved", Value::u64(2))]));
}

#[test]
fn events_decode_by_index() {
	let compiled = compile(&v15_bytes());
	let types = compiled.metadata().types();
	let event = RuntimeEvent::Balances(BalancesEvent::Locked { who: [1; 32], reasons: Reasons::Reserved, until: None });
	let bytes = event.encode();

	let descriptor = compiled.descriptors().event_by_index(bytes[0], bytes[1] as u32).unwrap();
	assert_eq!(descriptor.name, "Locked");
	let fields = descriptor.decode_fields(types, &bytes[2..]).unwrap();
	assert_eq!(fields.field("reasons"), Some(&Value::unit_variant("Reserved")));
	assert_eq!(fields.field("until"), Some(&Value::none()));
}
