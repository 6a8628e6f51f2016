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

//! The enum model used wherever metadata declares a variant type.
//!
//! Every variant type gets a [`VariantTable`], built once when the registry is constructed,
//! which maps the wire discriminant to a variant and back. The discriminant is always the
//! index declared in the metadata; the position of a variant in the table (and its name) has
//! no bearing on how it is encoded.

use crate::metadata::Field;
use crate::value::{Composite, Variant};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Errors building a [`VariantTable`] or working with variant values against one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariantError {
	#[error("variant index {0} is declared more than once")]
	DuplicateIndex(u32),
	#[error("variant name '{0}' is declared more than once")]
	DuplicateName(String),
	#[error("no variant named '{name}'; expected one of {expected:?}")]
	UnknownVariant { name: String, expected: Vec<String> },
	#[error("variant '{name}' expects {expected} field(s) but {got} were provided")]
	PayloadMismatch { name: String, expected: usize, got: usize },
	#[error("no handler registered for variant '{0}'")]
	NoHandler(String),
}

/// How the discriminant of a variant is written on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum DiscriminantWidth {
	/// A single byte holding the declared index.
	#[display(fmt = "u8")]
	Byte,
	/// A compact encoded index; only used by tables holding an index above 255.
	#[display(fmt = "compact")]
	Compact,
}

/// A single variant as declared in the metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantDef {
	/// The declared discriminant.
	pub index: u32,
	pub name: String,
	pub fields: Vec<Field>,
	pub docs: Vec<String>,
}

impl VariantDef {
	/// A unit variant carries no fields (and so its value carries no payload).
	pub fn is_unit(&self) -> bool {
		self.fields.is_empty()
	}
}

/// A bidirectional `{index <-> name}` lookup table for one variant type, holding the variants
/// in their declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantTable {
	variants: Vec<VariantDef>,
	by_index: HashMap<u32, usize>,
	by_name: HashMap<String, usize>,
	width: DiscriminantWidth,
}

impl VariantTable {
	/// Build a lookup table from variants in declaration order. Indexes and names must be unique.
	pub fn new(variants: Vec<VariantDef>) -> Result<VariantTable, VariantError> {
		let mut by_index = HashMap::with_capacity(variants.len());
		let mut by_name = HashMap::with_capacity(variants.len());
		for (pos, variant) in variants.iter().enumerate() {
			if by_index.insert(variant.index, pos).is_some() {
				return Err(VariantError::DuplicateIndex(variant.index));
			}
			if by_name.insert(variant.name.clone(), pos).is_some() {
				return Err(VariantError::DuplicateName(variant.name.clone()));
			}
		}
		let width = if variants.iter().any(|v| v.index > u8::MAX as u32) {
			DiscriminantWidth::Compact
		} else {
			DiscriminantWidth::Byte
		};
		Ok(VariantTable { variants, by_index, by_name, width })
	}

	/// The variants, in declaration order.
	pub fn variants(&self) -> &[VariantDef] {
		&self.variants
	}

	pub fn len(&self) -> usize {
		self.variants.len()
	}

	pub fn is_empty(&self) -> bool {
		self.variants.is_empty()
	}

	pub fn width(&self) -> DiscriminantWidth {
		self.width
	}

	/// Look a variant up by the discriminant found on the wire.
	pub fn by_index(&self, index: u32) -> Option<&VariantDef> {
		self.by_index.get(&index).map(|&pos| &self.variants[pos])
	}

	pub fn by_name(&self, name: &str) -> Option<&VariantDef> {
		self.position_of(name).map(|pos| &self.variants[pos])
	}

	/// The position of a variant in declaration order. This is *not* its discriminant.
	pub fn position_of(&self, name: &str) -> Option<usize> {
		self.by_name.get(name).copied()
	}

	/// The declared discriminant for a variant name.
	pub fn index_of(&self, name: &str) -> Option<u32> {
		self.by_name(name).map(|v| v.index)
	}

	pub fn name_of(&self, index: u32) -> Option<&str> {
		self.by_index(index).map(|v| &*v.name)
	}

	/// The set of discriminants this table accepts, for diagnostics.
	pub fn valid_indices(&self) -> ValidIndices {
		let mut indices: Vec<u32> = self.variants.iter().map(|v| v.index).collect();
		indices.sort_unstable();
		ValidIndices(indices)
	}

	/// Construct a variant value, checking the name exists and that the payload lines up with
	/// the declared fields. Unit variants must be given `None`.
	pub fn make(&self, name: &str, value: Option<Composite>) -> Result<Variant, VariantError> {
		let def = self.by_name(name).ok_or_else(|| self.unknown(name))?;
		let got = value.as_ref().map(Composite::len).unwrap_or(0);
		let shape_ok = match &value {
			None => def.is_unit(),
			Some(c) => c.len() == def.fields.len() && !def.is_unit(),
		};
		if !shape_ok {
			return Err(VariantError::PayloadMismatch { name: name.to_owned(), expected: def.fields.len(), got });
		}
		Ok(Variant { name: def.name.clone(), value })
	}

	pub(crate) fn unknown(&self, name: &str) -> VariantError {
		VariantError::UnknownVariant {
			name: name.to_owned(),
			expected: self.variants.iter().map(|v| v.name.clone()).collect(),
		}
	}
}

impl Serialize for VariantTable {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.variants.serialize(serializer)
	}
}

/// The discriminants a variant type accepts. Displays contiguous runs as ranges, eg `0..=3, 7`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidIndices(pub Vec<u32>);

impl fmt::Display for ValidIndices {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.0.is_empty() {
			return f.write_str("none");
		}
		let mut first = true;
		let mut iter = self.0.iter().copied().peekable();
		while let Some(start) = iter.next() {
			let mut end = start;
			while iter.peek() == Some(&(end + 1)) {
				end += 1;
				iter.next();
			}
			if !first {
				f.write_str(", ")?;
			}
			first = false;
			if start == end {
				write!(f, "{start}")?;
			} else {
				write!(f, "{start}..={end}")?;
			}
		}
		Ok(())
	}
}

type Handler<'h, R> = Box<dyn Fn(Option<&Composite>) -> R + Send + Sync + 'h>;
type Fallback<'h, R> = Box<dyn Fn(&Variant) -> R + Send + Sync + 'h>;

/// A dispatch table of handlers for the variants of one [`VariantTable`]. Handlers are looked
/// up by the variant's position in the table, so building this once and reusing it avoids any
/// per-value string matching beyond the single name lookup.
pub struct VariantDispatch<'t, 'h, R> {
	table: &'t VariantTable,
	handlers: Vec<Option<Handler<'h, R>>>,
	fallback: Option<Fallback<'h, R>>,
}

impl<'t, 'h, R> VariantDispatch<'t, 'h, R> {
	pub fn new(table: &'t VariantTable) -> Self {
		let handlers = std::iter::repeat_with(|| None).take(table.len()).collect();
		VariantDispatch { table, handlers, fallback: None }
	}

	/// Register a handler for the named variant. Fails if the table has no such variant.
	pub fn on<F>(mut self, name: &str, handler: F) -> Result<Self, VariantError>
	where
		F: Fn(Option<&Composite>) -> R + Send + Sync + 'h,
	{
		let pos = self.table.position_of(name).ok_or_else(|| self.table.unknown(name))?;
		self.handlers[pos] = Some(Box::new(handler));
		Ok(self)
	}

	/// Register a handler for any variant without its own handler.
	pub fn otherwise<F>(mut self, handler: F) -> Self
	where
		F: Fn(&Variant) -> R + Send + Sync + 'h,
	{
		self.fallback = Some(Box::new(handler));
		self
	}

	/// Hand the variant's payload to the matching handler.
	pub fn dispatch(&self, variant: &Variant) -> Result<R, VariantError> {
		let pos = self.table.position_of(&variant.name).ok_or_else(|| self.table.unknown(&variant.name))?;
		match (&self.handlers[pos], &self.fallback) {
			(Some(handler), _) => Ok(handler(variant.value.as_ref())),
			(None, Some(fallback)) => Ok(fallback(variant)),
			(None, None) => Err(VariantError::NoHandler(variant.name.clone())),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::metadata::Field;
	use crate::value::Value;
	use crate::TypeId;

	fn def(index: u32, name: &str, fields: usize) -> VariantDef {
		let fields = (0..fields).map(|_| Field { name: None, ty: TypeId::from_u32(0), type_name: None }).collect();
		VariantDef { index, name: name.to_owned(), fields, docs: vec![] }
	}

	fn free_reserved() -> VariantTable {
		VariantTable::new(vec![def(0, "Free", 0), def(1, "Reserved", 0)]).unwrap()
	}

	#[test]
	fn lookups_use_declared_indexes() {
		// Declared out of alphabetical order, and with a gap.
		let table = VariantTable::new(vec![def(3, "Zeta", 0), def(0, "Alpha", 1), def(1, "Mid", 0)]).unwrap();
		assert_eq!(table.index_of("Zeta"), Some(3));
		assert_eq!(table.name_of(0), Some("Alpha"));
		assert_eq!(table.position_of("Zeta"), Some(0));
		assert_eq!(table.by_index(2), None);
		assert_eq!(table.width(), DiscriminantWidth::Byte);
		assert_eq!(table.valid_indices().to_string(), "0..=1, 3");
	}

	#[test]
	fn large_indexes_switch_to_compact() {
		let table = VariantTable::new(vec![def(0, "A", 0), def(300, "B", 0)]).unwrap();
		assert_eq!(table.width(), DiscriminantWidth::Compact);
	}

	#[test]
	fn duplicates_are_rejected() {
		assert_eq!(VariantTable::new(vec![def(0, "A", 0), def(0, "B", 0)]), Err(VariantError::DuplicateIndex(0)));
		assert_eq!(
			VariantTable::new(vec![def(0, "A", 0), def(1, "A", 0)]),
			Err(VariantError::DuplicateName("A".into()))
		);
	}

	#[test]
	fn make_checks_payload_shape() {
		let table = VariantTable::new(vec![def(0, "Unit", 0), def(1, "One", 1)]).unwrap();
		assert!(table.make("Unit", None).unwrap().is_unit());
		assert!(matches!(
			table.make("Unit", Some(Composite::Unnamed(vec![]))),
			Err(VariantError::PayloadMismatch { .. })
		));
		assert!(table.make("One", Some(Composite::Unnamed(vec![Value::u8(1)]))).is_ok());
		assert!(matches!(table.make("One", None), Err(VariantError::PayloadMismatch { expected: 1, got: 0, .. })));
		assert!(matches!(table.make("Two", None), Err(VariantError::UnknownVariant { .. })));
	}

	#[test]
	fn dispatch_routes_by_name() {
		let table = free_reserved();
		let dispatch = VariantDispatch::new(&table).on("Free", |payload| payload.is_none()).unwrap();

		let free = table.make("Free", None).unwrap();
		let reserved = table.make("Reserved", None).unwrap();
		assert_eq!(dispatch.dispatch(&free), Ok(true));
		assert_eq!(dispatch.dispatch(&reserved), Err(VariantError::NoHandler("Reserved".into())));

		let dispatch = dispatch.otherwise(|_| false);
		assert_eq!(dispatch.dispatch(&reserved), Ok(false));
	}

	#[test]
	fn dispatch_rejects_unknown_handlers() {
		let table = free_reserved();
		assert!(VariantDispatch::<()>::new(&table).on("Frozen", |_| ()).is_err());
	}
}
