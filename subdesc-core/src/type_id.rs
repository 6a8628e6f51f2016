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

use serde::Serialize;
use std::fmt;

type ScaleInfoTypeId = scale_info::interner::UntrackedSymbol<std::any::TypeId>;

/// The index of a type in a [`crate::metadata::TypeRegistry`]. Type IDs are only meaningful
/// alongside the registry that handed them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TypeId(u32);

impl TypeId {
	/// Create a type ID from a raw `u32` index.
	pub const fn from_u32(id: u32) -> TypeId {
		TypeId(id)
	}

	/// The raw `u32` index of this type.
	pub const fn id(self) -> u32 {
		self.0
	}

	/// The index of this type as a `usize`, for indexing into the registry arena.
	pub(crate) fn index(self) -> usize {
		self.0 as usize
	}
}

impl From<u32> for TypeId {
	fn from(id: u32) -> Self {
		TypeId(id)
	}
}

impl From<&TypeId> for TypeId {
	fn from(id: &TypeId) -> Self {
		*id
	}
}

impl From<ScaleInfoTypeId> for TypeId {
	fn from(id: ScaleInfoTypeId) -> Self {
		TypeId(id.id)
	}
}

impl From<&ScaleInfoTypeId> for TypeId {
	fn from(id: &ScaleInfoTypeId) -> Self {
		TypeId(id.id)
	}
}

impl fmt::Display for TypeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}
