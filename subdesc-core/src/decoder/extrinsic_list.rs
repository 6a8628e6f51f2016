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

use crate::codec::{decode_compact, DecodeErrorKind};

/// A set of extrinsics in terms of their raw SCALE encoded bytes, shaped like
/// `Vec<(Compact<u32>, Extrinsic)>`: a count, then each extrinsic prefixed by its byte length.
#[derive(Debug, Clone, Copy)]
pub struct ExtrinsicList<'a> {
	len: usize,
	data: &'a [u8],
	/// Where `data` starts in the original bytes.
	start: usize,
}

impl<'a> ExtrinsicList<'a> {
	/// Read the count at the front of the bytes. The extrinsics themselves are only split
	/// out while iterating.
	pub fn new(bytes: &'a [u8]) -> Result<ExtrinsicList<'a>, ExtrinsicListError> {
		let (len, prefix) = compact_u32(bytes).map_err(|kind| ExtrinsicListError { offset: 0, kind })?;
		Ok(ExtrinsicList { len, data: &bytes[prefix..], start: prefix })
	}

	/// The reported number of extrinsics. Malformed bytes may hold fewer than this.
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn iter(&self) -> ExtrinsicListIter<'a> {
		ExtrinsicListIter { remaining: self.len, data: self.data, cursor: 0, start: self.start }
	}
}

/// Hands back the bytes of each extrinsic in turn (without their length prefix). After the
/// first error, nothing more is handed back.
pub struct ExtrinsicListIter<'a> {
	remaining: usize,
	data: &'a [u8],
	cursor: usize,
	start: usize,
}

impl<'a> ExtrinsicListIter<'a> {
	/// The bytes not yet iterated over, including any we failed to split.
	pub fn remaining_bytes(&self) -> &'a [u8] {
		&self.data[self.cursor..]
	}
}

impl<'a> Iterator for ExtrinsicListIter<'a> {
	type Item = Result<&'a [u8], ExtrinsicListError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.remaining == 0 || self.cursor >= self.data.len() {
			return None;
		}
		self.remaining -= 1;

		let (len, prefix) = match compact_u32(&self.data[self.cursor..]) {
			Ok(res) => res,
			Err(kind) => {
				self.remaining = 0;
				return Some(Err(ExtrinsicListError { offset: self.start + self.cursor, kind }));
			}
		};
		log::trace!("Extrinsic of length {} ({} byte prefix)", len, prefix);

		let begin = self.cursor + prefix;
		let end = begin + len;
		if end > self.data.len() {
			self.remaining = 0;
			return Some(Err(ExtrinsicListError {
				offset: self.start + begin,
				kind: DecodeErrorKind::UnexpectedEndOfInput { needed: len, available: self.data.len() - begin },
			}));
		}

		self.cursor = end;
		Some(Ok(&self.data[begin..end]))
	}
}

/// A length prefix couldn't be read. `offset` is relative to the start of the whole list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("bad extrinsic length prefix at byte offset {offset}: {kind}")]
pub struct ExtrinsicListError {
	pub offset: usize,
	pub kind: DecodeErrorKind,
}

fn compact_u32(bytes: &[u8]) -> Result<(usize, usize), DecodeErrorKind> {
	let (len, prefix) = decode_compact(bytes)?;
	let len = u32::try_from(len).map_err(|_| DecodeErrorKind::CompactOutOfRange(crate::metadata::PrimitiveKind::U32))?;
	Ok((len as usize, prefix))
}
