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

//! Bit sequences are a compact bit count followed by enough store words to hold the bits, each
//! word little endian. Bit `i` lives in word `i / W`, at position `i % W` counting from the least
//! significant bit (`Lsb0`) or from the most significant bit (`Msb0`).

use super::compact::{decode_compact_as, encode_compact};
use super::DecodeErrorKind;
use crate::metadata::{BitOrder, BitStore, PrimitiveKind};
use crate::value::BitSequence;

fn bit_position(store: BitStore, order: BitOrder, i: usize) -> usize {
	let bits = store.bits();
	match order {
		BitOrder::Lsb0 => i % bits,
		BitOrder::Msb0 => bits - 1 - i % bits,
	}
}

/// Decode a bit sequence from the front of `bytes`, handing back the bits and the number of
/// bytes consumed.
pub fn decode_bits(bytes: &[u8], store: BitStore, order: BitOrder) -> Result<(BitSequence, usize), DecodeErrorKind> {
	let (len, prefix) = decode_compact_as(bytes, PrimitiveKind::U32)?;
	let len = len as usize;
	let word_bytes = store.bits() / 8;
	let words = (len + store.bits() - 1) / store.bits();
	let needed = words * word_bytes;
	let data = &bytes[prefix..];
	if data.len() < needed {
		return Err(DecodeErrorKind::UnexpectedEndOfInput { needed, available: data.len() });
	}

	let mut bits = BitSequence::with_capacity(len);
	for (w, chunk) in data[..needed].chunks_exact(word_bytes).enumerate() {
		let mut buf = [0u8; 8];
		buf[..word_bytes].copy_from_slice(chunk);
		let word = u64::from_le_bytes(buf);
		let in_word = (len - w * store.bits()).min(store.bits());
		for i in 0..in_word {
			bits.push((word >> bit_position(store, order, i)) & 1 == 1);
		}
	}
	Ok((bits, prefix + needed))
}

/// Append the encoding of `bits` to `out`. Unused bits of the final word are zero.
pub fn encode_bits(bits: &BitSequence, store: BitStore, order: BitOrder, out: &mut Vec<u8>) {
	encode_compact(bits.len() as u128, out);
	let word_bytes = store.bits() / 8;
	for chunk in bits.chunks(store.bits()) {
		let mut word = 0u64;
		for (i, bit) in chunk.iter().by_vals().enumerate() {
			if bit {
				word |= 1 << bit_position(store, order, i);
			}
		}
		out.extend_from_slice(&word.to_le_bytes()[..word_bytes]);
	}
}
