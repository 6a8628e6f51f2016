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

//! Encode and decode [`Value`]s according to a type in a [`TypeRegistry`].
//!
//! A [`Codec`] is a cheap, copyable handle pairing a registry with the ID of the type to work
//! with. Nothing is cached inside it; every call walks the registry, so a codec can be made on
//! demand for any type a descriptor names.

mod bits;
mod compact;
mod decode;
mod encode;

use crate::metadata::{PrimitiveKind, TypeRegistry};
use crate::value::Value;
use crate::variant::ValidIndices;
use crate::TypeId;
use decode::Decoder;
use encode::Encoder;

pub use bits::{decode_bits, encode_bits};
pub use compact::{compact_len, decode_compact, encode_compact};

/// How deeply nested a value may be before decoding gives up. Cyclic types can otherwise
/// describe arbitrarily deep values.
pub const DEFAULT_DEPTH_LIMIT: usize = 256;

/// The reasons decoding can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeErrorKind {
	#[error("expected {needed} bytes but only {available} remain")]
	UnexpectedEndOfInput { needed: usize, available: usize },
	#[error("discriminant {index} is not valid; expected one of {valid}")]
	InvalidDiscriminant { index: u32, valid: ValidIndices },
	#[error("{0} bytes were left over after decoding")]
	TrailingBytes(usize),
	#[error("compact integer is not in its canonical form")]
	InvalidCompact,
	#[error("compact integer does not fit in a {0}")]
	CompactOutOfRange(PrimitiveKind),
	#[error("{0:#x} is not a valid char")]
	InvalidChar(u32),
	#[error("string is not valid UTF-8")]
	InvalidUtf8,
	#[error("type not found")]
	TypeNotFound,
	#[error("values are nested more than {0} levels deep")]
	DepthLimitExceeded(usize),
	#[error("cannot compact encode a {0}")]
	UnsupportedCompactType(String),
	#[error("sequence claims {len} items but only {available} bytes remain")]
	SequenceTooLong { len: u128, available: usize },
}

/// Decoding failed. Carries the type being decoded and the absolute byte offset the problem
/// was found at.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to decode type {ty} at byte offset {offset}: {kind}")]
pub struct DecodeError {
	pub kind: DecodeErrorKind,
	pub ty: TypeId,
	pub offset: usize,
}

/// An enum of the possible errors that can be returned from attempting to encode a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
	#[error("cannot encode a {got} value as type {ty}, which is a {expected}")]
	TypeMismatch { ty: TypeId, expected: String, got: &'static str },
	#[error("type {ty} has no variant named '{name}'")]
	UnknownVariant { ty: TypeId, name: String },
	#[error("type {ty} expects {expected} values but {got} were given")]
	WrongLength { ty: TypeId, expected: usize, got: usize },
	#[error("type {ty} needs a value for the field '{field}'")]
	MissingField { ty: TypeId, field: String },
	#[error("{value} is out of range for type {ty}, which is a {kind}")]
	IntegerOutOfRange { ty: TypeId, kind: PrimitiveKind, value: String },
	#[error("type {ty} not found")]
	TypeNotFound { ty: TypeId },
	#[error("type {ty} cannot be compact encoded; it is a {kind}")]
	UnsupportedCompactType { ty: TypeId, kind: String },
}

/// Encodes and decodes values of one type in a registry.
#[derive(Debug, Clone, Copy)]
pub struct Codec<'r> {
	registry: &'r TypeRegistry,
	ty: TypeId,
	depth_limit: usize,
}

impl<'r> Codec<'r> {
	pub fn new<Id: Into<TypeId>>(registry: &'r TypeRegistry, ty: Id) -> Self {
		Codec { registry, ty: ty.into(), depth_limit: DEFAULT_DEPTH_LIMIT }
	}

	/// Bound how deeply nested decoded values may be.
	pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
		self.depth_limit = depth_limit;
		self
	}

	/// The type this codec works with.
	pub fn ty(&self) -> TypeId {
		self.ty
	}

	pub fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
		let mut out = Vec::new();
		self.encode_to(value, &mut out)?;
		Ok(out)
	}

	/// Append the encoding of `value` to `out`. On failure, `out` is left as it was.
	pub fn encode_to(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), EncodeError> {
		let len = out.len();
		let res = Encoder::new(self.registry).encode(self.ty, value, out);
		if res.is_err() {
			out.truncate(len);
		}
		res
	}

	/// Decode a value starting at `offset` into `bytes`, handing back the value and the number
	/// of bytes it occupied. Error offsets are relative to the start of `bytes`.
	pub fn decode(&self, bytes: &[u8], offset: usize) -> Result<(Value, usize), DecodeError> {
		let mut data = bytes.get(offset..).ok_or_else(|| DecodeError {
			kind: DecodeErrorKind::UnexpectedEndOfInput { needed: offset - bytes.len(), available: 0 },
			ty: self.ty,
			offset: bytes.len(),
		})?;
		let len = data.len();
		let value = Decoder::new(self.registry, self.depth_limit, offset, len).decode(&mut data, self.ty)?;
		Ok((value, len - data.len()))
	}

	/// Decode a value that must occupy every one of the given bytes.
	pub fn decode_exact(&self, bytes: &[u8]) -> Result<Value, DecodeError> {
		let (value, consumed) = self.decode(bytes, 0)?;
		if consumed < bytes.len() {
			return Err(DecodeError {
				kind: DecodeErrorKind::TrailingBytes(bytes.len() - consumed),
				ty: self.ty,
				offset: consumed,
			});
		}
		Ok(value)
	}
}

/// Decode a single [`Value`] of the given type from the front of `data`, moving `data` past
/// the bytes that were used. Error offsets are relative to where `data` started.
pub fn decode_value<Id: Into<TypeId>>(registry: &TypeRegistry, ty: Id, data: &mut &[u8]) -> Result<Value, DecodeError> {
	Decoder::new(registry, DEFAULT_DEPTH_LIMIT, 0, data.len()).decode(data, ty.into())
}

/// Append the encoding of `value` as the given type to `out`.
pub fn encode_value<Id: Into<TypeId>>(
	registry: &TypeRegistry,
	ty: Id,
	value: &Value,
	out: &mut Vec<u8>,
) -> Result<(), EncodeError> {
	Codec::new(registry, ty).encode_to(value, out)
}
