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

//! Compact (variable length) integers. The low two bits of the first byte select the mode:
//!
//! - `0b00`: single byte, values below `2^6`.
//! - `0b01`: two bytes, values below `2^14`.
//! - `0b10`: four bytes, values below `2^30`.
//! - `0b11`: big integer mode; the upper six bits plus four give the number of little endian
//!   bytes that follow.

use super::DecodeErrorKind;
use crate::metadata::PrimitiveKind;
use codec::{Compact, Decode, Encode};

/// Append the compact encoding of `value` to `out`.
pub fn encode_compact(value: u128, out: &mut Vec<u8>) {
	Compact(value).encode_to(out);
}

/// The number of bytes the compact integer at the front of `bytes` occupies, going by its mode.
pub fn compact_len(bytes: &[u8]) -> Option<usize> {
	let first = *bytes.first()?;
	Some(match first & 0b11 {
		0b00 => 1,
		0b01 => 2,
		0b10 => 4,
		_ => ((first >> 2) as usize) + 5,
	})
}

/// Decode a compact integer from the front of `bytes`, handing back the value and the number of
/// bytes it occupied. Fails if the buffer is shorter than the mode declares or if the value is
/// not encoded in its shortest form.
pub fn decode_compact(bytes: &[u8]) -> Result<(u128, usize), DecodeErrorKind> {
	let len = compact_len(bytes).ok_or(DecodeErrorKind::UnexpectedEndOfInput { needed: 1, available: 0 })?;
	if bytes.len() < len {
		return Err(DecodeErrorKind::UnexpectedEndOfInput { needed: len, available: bytes.len() });
	}
	// More than 16 value bytes never fit in a u128.
	if len > 17 {
		return Err(DecodeErrorKind::CompactOutOfRange(PrimitiveKind::U128));
	}
	let value = Compact::<u128>::decode(&mut &bytes[..len]).map_err(|_| DecodeErrorKind::InvalidCompact)?;
	Ok((value.0, len))
}

/// Decode a compact integer that must fit into the given unsigned integer kind.
pub(crate) fn decode_compact_as(bytes: &[u8], kind: PrimitiveKind) -> Result<(u128, usize), DecodeErrorKind> {
	let max = kind.compact_max().ok_or(DecodeErrorKind::UnsupportedCompactType(kind.to_string()))?;
	let (value, len) = decode_compact(bytes)?;
	if value > max {
		return Err(DecodeErrorKind::CompactOutOfRange(kind));
	}
	Ok((value, len))
}
