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

use super::{validate_pallets, ExtrinsicMetadata, Metadata, MetadataError, SignedExtensionMetadata, TypeRegistry};
use crate::TypeId;
use frame_metadata::v14::RuntimeMetadataV14;

/// Decode V14 metadata into our general Metadata struct
pub fn decode(meta: RuntimeMetadataV14) -> Result<Metadata, MetadataError> {
	let types = TypeRegistry::from_portable(&meta.types)?;

	let mut pallets = Vec::with_capacity(meta.pallets.len());
	for pallet in meta.pallets {
		// V14 pallets carry no docs of their own.
		pallets.push(convert_pallet!(v14, &types, pallet, Vec::new()));
	}
	validate_pallets(&types, &pallets)?;

	// V14 only hands us the extrinsic type; the address, call, signature and extra types
	// are its generic parameters.
	let extrinsic_ty = TypeId::from(meta.extrinsic.ty);
	let param = |name: &str| types.resolve(extrinsic_ty).and_then(|info| info.type_param(name));
	let extrinsic = ExtrinsicMetadata {
		version: meta.extrinsic.version,
		ty: Some(extrinsic_ty),
		address_ty: param("Address"),
		call_ty: param("Call"),
		signature_ty: param("Signature"),
		extra_ty: param("Extra"),
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

	Ok(Metadata {
		version: 14,
		types,
		pallets: pallets.into(),
		runtime_apis: Vec::new().into_boxed_slice(),
		extrinsic,
		runtime_type: meta.ty.into(),
		outer_enums: None,
	})
}
