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

/// A [`codec::Input`] over a byte slice that remembers how far it has read, so that a
/// failure part way through decoding can be reported against a byte offset.
pub struct CountingInput<'a> {
	bytes: &'a [u8],
	offset: usize,
}

impl<'a> CountingInput<'a> {
	pub fn new(bytes: &'a [u8]) -> Self {
		CountingInput { bytes, offset: 0 }
	}

	/// The number of bytes successfully read so far.
	pub fn offset(&self) -> usize {
		self.offset
	}

	/// The number of bytes not yet read.
	pub fn remaining(&self) -> usize {
		self.bytes.len()
	}
}

impl<'a> codec::Input for CountingInput<'a> {
	fn remaining_len(&mut self) -> Result<Option<usize>, codec::Error> {
		Ok(Some(self.bytes.len()))
	}

	fn read(&mut self, into: &mut [u8]) -> Result<(), codec::Error> {
		if into.len() > self.bytes.len() {
			return Err("Not enough data to fill buffer".into());
		}
		let (head, rest) = self.bytes.split_at(into.len());
		into.copy_from_slice(head);
		self.bytes = rest;
		self.offset += head.len();
		Ok(())
	}
}
