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

//! A crate to turn V14+ Substrate metadata into typed descriptors for every storage entry, call,
//! event, error, constant and runtime API method, along with a SCALE codec that can encode and
//! decode [`Value`]s for any type the metadata describes.
//!
//! The pipeline is:
//!
//! 1. [`Metadata::from_bytes`] parses the SCALE encoded metadata into an immutable
//!    [`metadata::TypeRegistry`] arena plus the pallet sections.
//! 2. [`anonymize::AliasTable::build`] assigns every type a [`anonymize::CanonicalAlias`]
//!    derived from its shape alone, so identical shapes share one alias.
//! 3. [`descriptors::compile`] binds a descriptor to every pallet item and runtime API method.
//! 4. [`codec::Codec`] encodes and decodes values for the types those descriptors name.

#![forbid(unsafe_code)]

mod type_id;

#[cfg(test)]
mod test_utils;

pub mod anonymize;
pub mod codec;
pub mod decoder;
pub mod descriptors;
pub mod metadata;
pub mod value;
pub mod variant;

pub use metadata::Metadata;
pub use type_id::TypeId;
pub use value::{Composite, Primitive, Value, Variant};

/// A re-export of the [`scale_info`] crate, since metadata type information arrives in its format.
pub use scale_info;

/// A re-export of [`frame_metadata`], handy for constructing metadata to compile.
pub use frame_metadata;
