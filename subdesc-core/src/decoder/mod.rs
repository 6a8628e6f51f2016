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

//! Decode extrinsics using compiled [`DescriptorSet`]s.
//!
//! See [`decode_extrinsics`] to decode a block's worth of extrinsics, and [`decode_call_data`]
//! for bare call data. Only V4 extrinsics are understood.

mod extrinsic_list;

use crate::codec::{decode_compact, Codec, DecodeError};
use crate::descriptors::{DescriptorSet, TxDescriptor};
use crate::metadata::{Metadata, SignedExtensionMetadata};
use crate::value::{Composite, Value};
use crate::variant::DiscriminantWidth;
use crate::TypeId;
use serde::Serialize;

pub use extrinsic_list::{ExtrinsicList, ExtrinsicListError, ExtrinsicListIter};

/// The only extrinsic format version we know how to decode.
pub const EXTRINSIC_VERSION: u8 = 4;

/// An enum of the possible errors that can be returned from attempting to decode extrinsics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtrinsicError {
	#[error("failed to split up the list of extrinsics: {0}")]
	List(#[from] ExtrinsicListError),
	#[error("failed to decode: expected more data ({0})")]
	EarlyEof(&'static str),
	#[error("{0} bytes of the extrinsic were not consumed")]
	ExcessBytes(usize),
	#[error("cannot decode extrinsic version {0}; only version {EXTRINSIC_VERSION} is supported")]
	UnsupportedVersion(u8),
	#[error("cannot find a call with pallet index {pallet_index} and call index {call_index}")]
	CallNotFound { pallet_index: u8, call_index: u32 },
	#[error("the metadata does not describe the address and signature types of signed extrinsics")]
	MissingSignatureTypes,
	#[error(transparent)]
	Decode(#[from] DecodeError),
}

/// Decoded call data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallData<'d> {
	pub pallet: &'d str,
	pub name: &'d str,
	#[serde(skip)]
	pub descriptor: &'d TxDescriptor,
	pub args: Composite,
}

/// The signature information embedded in a signed extrinsic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtrinsicSignature {
	/// Address the extrinsic is being sent from.
	pub address: Value,
	pub signature: Value,
	/// Each signed extension, by identifier, in the order the metadata lists them.
	pub extensions: Vec<(String, Value)>,
}

/// The result of successfully decoding an extrinsic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extrinsic<'d> {
	pub call: CallData<'d>,
	pub signature: Option<ExtrinsicSignature>,
}

/// Decode a SCALE encoded vector of extrinsics (`Vec<(Compact<u32>, Extrinsic)>`).
///
/// Every extrinsic gets its own result, so one that fails to decode doesn't stop the others
/// from being decoded. A length prefix that can't be read ends the list with an error, since
/// nothing after it can be located.
pub fn decode_extrinsics<'d>(
	metadata: &Metadata,
	descriptors: &'d DescriptorSet,
	bytes: &[u8],
) -> Vec<Result<Extrinsic<'d>, ExtrinsicError>> {
	let list = match ExtrinsicList::new(bytes) {
		Ok(list) => list,
		Err(e) => return vec![Err(e.into())],
	};
	log::trace!("Decoding {} extrinsics", list.len());

	list.iter()
		.enumerate()
		.map(|(n, res)| {
			let mut data = res?;
			let ext = decode_unwrapped_extrinsic(metadata, descriptors, &mut data);
			match ext {
				Ok(_) if !data.is_empty() => Err(ExtrinsicError::ExcessBytes(data.len())),
				Err(e) => {
					log::debug!("Extrinsic {} failed to decode: {}", n, e);
					Err(e)
				}
				ok => ok,
			}
		})
		.collect()
}

/// Decode a single extrinsic that is prefixed with its compact encoded byte length. Error
/// offsets count from the start of the length prefix.
pub fn decode_extrinsic<'d>(
	metadata: &Metadata,
	descriptors: &'d DescriptorSet,
	data: &mut &[u8],
) -> Result<Extrinsic<'d>, ExtrinsicError> {
	let start = *data;
	// The length isn't needed; decoding fails anyway if the wrong number of bytes are used.
	let (_len, prefix) = decode_compact(*data).map_err(|kind| ExtrinsicListError { offset: 0, kind })?;
	*data = &data[prefix..];
	unwrapped_extrinsic(metadata, descriptors, start, data)
}

/// Decode an extrinsic that is *not* prefixed with its byte length. Error offsets count from
/// the first byte of the extrinsic.
pub fn decode_unwrapped_extrinsic<'d>(
	metadata: &Metadata,
	descriptors: &'d DescriptorSet,
	data: &mut &[u8],
) -> Result<Extrinsic<'d>, ExtrinsicError> {
	let start = *data;
	unwrapped_extrinsic(metadata, descriptors, start, data)
}

fn unwrapped_extrinsic<'d>(
	metadata: &Metadata,
	descriptors: &'d DescriptorSet,
	start: &[u8],
	data: &mut &[u8],
) -> Result<Extrinsic<'d>, ExtrinsicError> {
	// V4 extrinsics are laid out as follows:
	//
	// first byte: abbbbbbb (a = 0 for unsigned, 1 for signed, b = version)
	// signature (signed only): address, signature, then each signed extension in turn
	// call: pallet index, call index, then the call arguments
	let first = *data.first().ok_or(ExtrinsicError::EarlyEof("an extrinsic needs at least one byte"))?;
	let is_signed = first & 0b1000_0000 != 0;
	let version = first & 0b0111_1111;
	*data = &data[1..];

	if version != EXTRINSIC_VERSION {
		return Err(ExtrinsicError::UnsupportedVersion(version));
	}

	let signature = if is_signed { Some(signature(metadata, start, data)?) } else { None };
	let call = call_data(metadata, descriptors, start, data)?;
	Ok(Extrinsic { call, signature })
}

/// Decode a value from the front of `data`, which is a suffix of `start`. Errors report their
/// offset from the beginning of `start`.
fn decode_at<Id: Into<TypeId>>(
	metadata: &Metadata,
	ty: Id,
	start: &[u8],
	data: &mut &[u8],
) -> Result<Value, DecodeError> {
	let offset = start.len() - data.len();
	let (value, used) = Codec::new(metadata.types(), ty).decode(start, offset)?;
	*data = &data[used..];
	Ok(value)
}

/// Decode SCALE encoded call data: a pallet index, a call index, and then the arguments of
/// that call. Error offsets count from the pallet index.
pub fn decode_call_data<'d>(
	metadata: &Metadata,
	descriptors: &'d DescriptorSet,
	data: &mut &[u8],
) -> Result<CallData<'d>, ExtrinsicError> {
	let start = *data;
	call_data(metadata, descriptors, start, data)
}

fn call_data<'d>(
	metadata: &Metadata,
	descriptors: &'d DescriptorSet,
	start: &[u8],
	data: &mut &[u8],
) -> Result<CallData<'d>, ExtrinsicError> {
	if data.len() < 2 {
		return Err(ExtrinsicError::EarlyEof("expected at least 2 bytes for the pallet and call index"));
	}
	let pallet_index = data[0];
	*data = &data[1..];

	// Pallets with more than 256 calls compact encode the call index.
	let call_ty = descriptors.pallet_by_index(pallet_index).and_then(|p| p.calls.first()).map(|c| c.call_ty.id);
	let width = call_ty.and_then(|ty| metadata.types().variant_table(ty).map(|table| (ty, table.width())));
	let call_index = match width {
		Some((ty, DiscriminantWidth::Compact)) => {
			let offset = start.len() - data.len();
			let (index, len) = decode_compact(*data).map_err(|kind| DecodeError { kind, ty, offset })?;
			*data = &data[len..];
			u32::try_from(index).unwrap_or(u32::MAX)
		}
		_ => {
			let index = data[0] as u32;
			*data = &data[1..];
			index
		}
	};
	log::trace!("pallet index: {}, call index: {}", pallet_index, call_index);

	let descriptor = descriptors
		.call_by_index(pallet_index, call_index)
		.ok_or(ExtrinsicError::CallNotFound { pallet_index, call_index })?;

	let mut values = Vec::with_capacity(descriptor.args.len());
	for arg in &descriptor.args {
		values.push(decode_at(metadata, arg.ty.id, start, data)?);
	}
	let are_named = !descriptor.args.is_empty() && descriptor.args.iter().all(|a| a.name.is_some());
	let args = if are_named {
		let names = descriptor.args.iter().map(|a| a.name.clone().unwrap_or_default());
		Composite::Named(names.zip(values).collect())
	} else {
		Composite::Unnamed(values)
	};

	Ok(CallData { pallet: &descriptor.pallet, name: &descriptor.name, descriptor, args })
}

/// Decode the signature part of a signed extrinsic: the address, signature and signed
/// extensions.
pub fn decode_signature(metadata: &Metadata, data: &mut &[u8]) -> Result<ExtrinsicSignature, ExtrinsicError> {
	let start = *data;
	signature(metadata, start, data)
}

fn signature(metadata: &Metadata, start: &[u8], data: &mut &[u8]) -> Result<ExtrinsicSignature, ExtrinsicError> {
	let extrinsic = metadata.extrinsic();
	let (address_ty, signature_ty) = match (extrinsic.address_ty, extrinsic.signature_ty) {
		(Some(address), Some(signature)) => (address, signature),
		_ => return Err(ExtrinsicError::MissingSignatureTypes),
	};
	let address = decode_at(metadata, address_ty, start, data)?;
	let signature = decode_at(metadata, signature_ty, start, data)?;
	let extensions = extension_values(metadata, |ext| ext.ty, start, data)?;
	Ok(ExtrinsicSignature { address, signature, extensions })
}

/// Decode the signed extensions, as found in signed extrinsics.
pub fn decode_signed_extensions(metadata: &Metadata, data: &mut &[u8]) -> Result<Vec<(String, Value)>, ExtrinsicError> {
	let start = *data;
	extension_values(metadata, |ext| ext.ty, start, data)
}

/// Decode the additional signed data, which is signed over but never sent.
pub fn decode_additional_signed(
	metadata: &Metadata,
	data: &mut &[u8],
) -> Result<Vec<(String, Value)>, ExtrinsicError> {
	let start = *data;
	extension_values(metadata, |ext| ext.additional_signed, start, data)
}

fn extension_values(
	metadata: &Metadata,
	ty: impl Fn(&SignedExtensionMetadata) -> TypeId,
	start: &[u8],
	data: &mut &[u8],
) -> Result<Vec<(String, Value)>, ExtrinsicError> {
	metadata
		.extrinsic()
		.signed_extensions
		.iter()
		.map(|ext| Ok((ext.identifier.clone(), decode_at(metadata, ty(ext), start, data)?)))
		.collect()
}

/// The decoded payload that is signed to construct a signed extrinsic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignerPayload<'d> {
	pub call: CallData<'d>,
	/// Each signed extension alongside its additional signed data.
	pub extensions: Vec<SignedExtensionWithAdditional>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedExtensionWithAdditional {
	pub identifier: String,
	pub extension: Value,
	pub additional: Value,
}

/// Decode a signer payload, shaped like `(call_data, signed_extensions, additional_signed)`.
pub fn decode_signer_payload<'d>(
	metadata: &Metadata,
	descriptors: &'d DescriptorSet,
	data: &mut &[u8],
) -> Result<SignerPayload<'d>, ExtrinsicError> {
	let start = *data;
	let call = call_data(metadata, descriptors, start, data)?;
	let extensions = extension_values(metadata, |ext| ext.ty, start, data)?;
	let additional = extension_values(metadata, |ext| ext.additional_signed, start, data)?;
	let extensions = extensions
		.into_iter()
		.zip(additional)
		.map(|((identifier, extension), (_, additional))| SignedExtensionWithAdditional {
			identifier,
			extension,
			additional,
		})
		.collect();
	Ok(SignerPayload { call, extensions })
}
