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

use super::{
	validate_pallets, validate_runtime_api, ExtrinsicMetadata, Metadata, MetadataError, OuterEnums,
	RuntimeApiMetadata, RuntimeApiMethodMetadata, RuntimeApiParam, SignedExtensionMetadata, TypeRegistry,
};
use crate::TypeId;
use frame_metadata::v15::RuntimeMetadataV15;

/// Decode V15 metadata into our general Metadata struct
pub fn decode(meta: RuntimeMetadataV15) -> Result<Metadata, MetadataError> {
	let types = TypeRegistry::from_portable(&meta.types)?;

	let mut pallets = Vec::with_capacity(meta.pallets.len());
	for mut pallet in meta.pallets {
		let docs = std::mem::take(&mut pallet.docs);
		pallets.push(convert_pallet!(v15, &types, pallet, docs));
	}
	validate_pallets(&types, &pallets)?;

	let runtime_apis = meta
		.apis
		.into_iter()
		.map(|api| RuntimeApiMetadata {
			name: api.name,
			methods: api
				.methods
				.into_iter()
				.map(|m| RuntimeApiMethodMetadata {
					name: m.name,
					inputs: m.inputs.into_iter().map(|p| RuntimeApiParam { name: p.name, ty: p.ty.into() }).collect(),
					output: m.output.into(),
					docs: m.docs,
				})
				.collect(),
			docs: api.docs,
		})
		.collect::<Vec<_>>();
	for api in &runtime_apis {
		validate_runtime_api(&types, api)?;
	}

	let extrinsic = ExtrinsicMetadata {
		version: meta.extrinsic.version,
		ty: None,
		address_ty: Some(meta.extrinsic.address_ty.into()),
		call_ty: Some(meta.extrinsic.call_ty.into()),
		signature_ty: Some(meta.extrinsic.signature_ty.into()),
		extra_ty: Some(meta.extrinsic.extra_ty.into()),
		signed_extensions: meta
			.extrinsic
			.signed_extensions
			.into_iter()
			.map(|e| SignedExtensionMetadata {
				identifier: e.identifier,
				ty: e.ty.into(),
				additional_signed: e.additional_signed.into(),
			})
			.collect(),
	};

	let outer_enums = OuterEnums {
		call_enum_ty: meta.outer_enums.call_enum_ty.into(),
		event_enum_ty: meta.outer_enums.event_enum_ty.into(),
		error_enum_ty: meta.outer_enums.error_enum_ty.into(),
	};

	Ok(Metadata {
		version: 15,
		types,
		pallets: pallets.into(),
		runtime_apis: runtime_apis.into(),
		extrinsic,
		runtime_type: TypeId::from(meta.ty),
		outer_enums: Some(outer_enums),
	})
}
