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

//! Give every type an alias derived from its shape alone, so that types which look the same on
//! the wire share one alias no matter what they're called or where they're declared.
//!
//! A shape is hashed (blake2-256, over the SCALE encoding of a [`ShapeKey`]) from the node's
//! kind, the hashes of its children, field and variant names, variant indices, array lengths
//! and bit sequence details. Paths, docs and type names are left out. Types that are part of a
//! cycle are hashed together with the rest of their cycle (see [`Canonicalizer`]), which keeps
//! their hashes finite and deterministic, and the work bounded by the size of the cycle rather
//! than by the number of paths through it.

use crate::metadata::{Field, TypeNode, TypeRegistry};
use crate::TypeId;
use codec::Encode;
use serde::Serialize;
use sp_core::hashing::blake2_256;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Number of bytes of the hash shown in an alias (as hex).
const ALIAS_HASH_BYTES: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnonymizeError {
	#[error("cannot canonicalize type {0}: it does not exist")]
	TypeNotFound(TypeId),
}

/// A short identifier for a type's shape, along with the full hash it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalAlias {
	alias: String,
	hash: [u8; 32],
}

impl CanonicalAlias {
	/// The short alias, eg `I3f2a9c0b51de` or `u32` for primitives.
	pub fn alias(&self) -> &str {
		&self.alias
	}

	/// The full blake2-256 shape hash.
	pub fn hash(&self) -> &[u8; 32] {
		&self.hash
	}
}

impl fmt::Display for CanonicalAlias {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.alias)
	}
}

impl Serialize for CanonicalAlias {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.alias)
	}
}

#[derive(Encode)]
enum Child {
	Hash([u8; 32]),
	/// The number a breadth first walk of the cycle gave the referenced type's class.
	BackRef(u32),
}

#[derive(Encode)]
struct FieldKey {
	name: Option<String>,
	ty: Child,
}

#[derive(Encode)]
struct VariantKey {
	index: u32,
	name: String,
	fields: Vec<FieldKey>,
}

/// Everything about a node that contributes to its hash.
#[derive(Encode)]
enum ShapeKey {
	Primitive(String),
	Compact(Child),
	Sequence(Child),
	Array { len: u32, inner: Child },
	Tuple(Vec<Child>),
	Composite(Vec<FieldKey>),
	Variant(Vec<VariantKey>),
	Option(Child),
	BitSequence { store: String, order: String },
	/// The shapes of every class reachable inside a cycle, in the order they were found.
	Cycle(Vec<ShapeKey>),
}

/// The strongly connected components of the type graph, found with an iterative take on
/// Tarjan's algorithm.
struct Components {
	/// The component each type belongs to.
	of: Vec<usize>,
	/// The members of each component, in ID order.
	members: Vec<Vec<TypeId>>,
	/// Whether each type can reach itself.
	cyclic: Vec<bool>,
}

fn components(registry: &TypeRegistry) -> Components {
	let children: Vec<Vec<usize>> =
		registry.iter().map(|t| t.node.children().into_iter().map(TypeId::index).collect()).collect();
	let n = children.len();
	let mut index = vec![usize::MAX; n];
	let mut low = vec![0; n];
	let mut on_stack = vec![false; n];
	let mut stack = Vec::new();
	let mut of = vec![0; n];
	let mut members = Vec::new();
	let mut cyclic = vec![false; n];
	let mut next = 0;

	for root in 0..n {
		if index[root] != usize::MAX {
			continue;
		}
		index[root] = next;
		low[root] = next;
		next += 1;
		stack.push(root);
		on_stack[root] = true;
		// Each frame is a node and the position of the next child to look at.
		let mut work = vec![(root, 0)];

		while let Some(frame) = work.last_mut() {
			let v = frame.0;
			if let Some(&w) = children[v].get(frame.1) {
				frame.1 += 1;
				if index[w] == usize::MAX {
					index[w] = next;
					low[w] = next;
					next += 1;
					stack.push(w);
					on_stack[w] = true;
					work.push((w, 0));
				} else if on_stack[w] {
					low[v] = low[v].min(index[w]);
				}
				continue;
			}

			work.pop();
			if let Some(&(parent, _)) = work.last() {
				low[parent] = low[parent].min(low[v]);
			}
			if low[v] == index[v] {
				let mut component = Vec::new();
				while let Some(w) = stack.pop() {
					on_stack[w] = false;
					of[w] = members.len();
					component.push(w);
					if w == v {
						break;
					}
				}
				let is_cyclic = component.len() > 1 || children[v].contains(&v);
				component.sort_unstable();
				for &m in &component {
					cyclic[m] = is_cyclic;
				}
				members.push(component.into_iter().map(|m| TypeId::from_u32(m as u32)).collect());
			}
		}
	}
	Components { of, members, cyclic }
}

/// Hashes type shapes, remembering the hash of every type it has seen.
///
/// A type outside of any cycle hashes its own shape over the hashes of its children. The types
/// of a cycle are hashed a whole component at a time: members are first split into classes of
/// identical shape by refining on their children's classes until the split stops changing, and
/// each class then hashes the shapes of every class reachable from it inside the component,
/// numbered in the order a breadth first walk finds them. Identical shapes land in the same
/// class however they're laid out, so the hash never depends on where the cycle is entered.
struct Canonicalizer<'r> {
	registry: &'r TypeRegistry,
	components: Components,
	memo: HashMap<TypeId, [u8; 32]>,
}

impl<'r> Canonicalizer<'r> {
	fn new(registry: &'r TypeRegistry) -> Self {
		Canonicalizer { registry, components: components(registry), memo: HashMap::new() }
	}

	fn hash_of(&mut self, id: TypeId) -> Result<[u8; 32], AnonymizeError> {
		if let Some(hash) = self.memo.get(&id) {
			return Ok(*hash);
		}
		let registry = self.registry;
		let node = registry.node(id).ok_or(AnonymizeError::TypeNotFound(id))?;

		if self.components.cyclic[id.index()] {
			self.hash_component(self.components.of[id.index()])?;
			return self.memo.get(&id).copied().ok_or(AnonymizeError::TypeNotFound(id));
		}

		let shape = shape_of(node, &mut |child| self.hash_of(child).map(Child::Hash))?;
		let hash = blake2_256(&shape.encode());
		self.memo.insert(id, hash);
		Ok(hash)
	}

	fn hash_component(&mut self, component: usize) -> Result<(), AnonymizeError> {
		let registry = self.registry;
		let members = self.components.members[component].clone();
		let mut nodes = Vec::with_capacity(members.len());
		for &id in &members {
			let node = registry.node(id).ok_or(AnonymizeError::TypeNotFound(id))?;
			// Everything the cycle refers to outside of itself gets hashed first.
			for child in node.children() {
				if self.components.of[child.index()] != component {
					self.hash_of(child)?;
				}
			}
			nodes.push(node);
		}
		let position: HashMap<TypeId, usize> = members.iter().enumerate().map(|(i, id)| (*id, i)).collect();
		let memo = &self.memo;
		let outside = |ty: TypeId| memo.get(&ty).copied().map(Child::Hash).ok_or(AnonymizeError::TypeNotFound(ty));

		let mut classes = vec![[0u8; 32]; members.len()];
		let mut class_count = 0;
		loop {
			let mut refined = Vec::with_capacity(members.len());
			for (i, node) in nodes.iter().enumerate() {
				let shape = shape_of(node, &mut |ty| match position.get(&ty) {
					Some(&p) => Ok(Child::Hash(classes[p])),
					None => outside(ty),
				})?;
				refined.push(blake2_256(&(classes[i], shape).encode()));
			}
			let count = refined.iter().collect::<HashSet<_>>().len();
			classes = refined;
			// Each round only ever splits classes, so an unchanged count means a stable split.
			if count == class_count {
				break;
			}
			class_count = count;
		}

		let mut by_class: HashMap<[u8; 32], [u8; 32]> = HashMap::new();
		let mut hashes = Vec::with_capacity(members.len());
		for start in 0..members.len() {
			if let Some(hash) = by_class.get(&classes[start]) {
				hashes.push(*hash);
				continue;
			}
			let mut states: HashMap<[u8; 32], u32> = HashMap::from([(classes[start], 0)]);
			let mut queue = VecDeque::from([start]);
			let mut shapes = Vec::new();
			while let Some(i) = queue.pop_front() {
				let shape = shape_of(nodes[i], &mut |ty| match position.get(&ty) {
					Some(&p) => {
						let next = states.len() as u32;
						let state = *states.entry(classes[p]).or_insert_with(|| {
							queue.push_back(p);
							next
						});
						Ok(Child::BackRef(state))
					}
					None => outside(ty),
				})?;
				shapes.push(shape);
			}
			let hash = blake2_256(&ShapeKey::Cycle(shapes).encode());
			by_class.insert(classes[start], hash);
			hashes.push(hash);
		}
		self.memo.extend(members.into_iter().zip(hashes));
		Ok(())
	}
}

fn fields<F>(fields: &[Field], child: &mut F) -> Result<Vec<FieldKey>, AnonymizeError>
where
	F: FnMut(TypeId) -> Result<Child, AnonymizeError>,
{
	fields.iter().map(|f| Ok(FieldKey { name: f.name.clone(), ty: child(f.ty)? })).collect()
}

fn shape_of<F>(node: &TypeNode, child: &mut F) -> Result<ShapeKey, AnonymizeError>
where
	F: FnMut(TypeId) -> Result<Child, AnonymizeError>,
{
	let shape = match node {
		TypeNode::Primitive(kind) => ShapeKey::Primitive(kind.to_string()),
		TypeNode::Compact(inner) => ShapeKey::Compact(child(*inner)?),
		TypeNode::Sequence(inner) => ShapeKey::Sequence(child(*inner)?),
		TypeNode::Array { inner, len } => ShapeKey::Array { len: *len, inner: child(*inner)? },
		TypeNode::Tuple(ids) => ShapeKey::Tuple(ids.iter().map(|id| child(*id)).collect::<Result<_, _>>()?),
		TypeNode::Composite(f) => ShapeKey::Composite(fields(f, child)?),
		TypeNode::Variant(table) => ShapeKey::Variant(
			table
				.variants()
				.iter()
				.map(|v| Ok(VariantKey { index: v.index, name: v.name.clone(), fields: fields(&v.fields, child)? }))
				.collect::<Result<_, AnonymizeError>>()?,
		),
		TypeNode::Option(inner) => ShapeKey::Option(child(*inner)?),
		TypeNode::BitSequence { store, order } => {
			ShapeKey::BitSequence { store: store.to_string(), order: order.to_string() }
		}
	};
	Ok(shape)
}

/// The alias a hash gets before any collision suffix is added.
fn base_alias(node: &TypeNode, hash: &[u8; 32]) -> String {
	match node {
		TypeNode::Primitive(kind) => kind.to_string(),
		_ => format!("I{}", hex::encode(&hash[..ALIAS_HASH_BYTES])),
	}
}

/// Work out the canonical alias of a single type. Collisions between short aliases aren't
/// resolved here; use an [`AliasTable`] for that.
pub fn canonicalize<Id: Into<TypeId>>(registry: &TypeRegistry, id: Id) -> Result<CanonicalAlias, AnonymizeError> {
	let id = id.into();
	let node = registry.node(id).ok_or(AnonymizeError::TypeNotFound(id))?;
	let hash = Canonicalizer::new(registry).hash_of(id)?;
	Ok(CanonicalAlias { alias: base_alias(node, &hash), hash })
}

/// Hands out aliases, suffixing `_1`, `_2`... onto a short alias already taken by a
/// different hash.
#[derive(Default)]
struct AliasAssigner {
	taken: HashMap<String, Vec<[u8; 32]>>,
}

impl AliasAssigner {
	fn assign(&mut self, base: String, hash: [u8; 32]) -> String {
		let hashes = self.taken.entry(base.clone()).or_default();
		let n = match hashes.iter().position(|h| *h == hash) {
			Some(n) => n,
			None => {
				hashes.push(hash);
				hashes.len() - 1
			}
		};
		if n == 0 {
			base
		} else {
			log::warn!("Alias {base} is shared by {} distinct shapes; using {base}_{n}", n + 1);
			format!("{base}_{n}")
		}
	}
}

/// The canonical alias of every type in a registry.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasTable {
	aliases: Box<[CanonicalAlias]>,
	by_alias: HashMap<String, Vec<TypeId>>,
}

impl AliasTable {
	/// Alias every type in the registry, in ID order. The result depends only on the
	/// registry's content, so the same metadata always yields the same aliases.
	pub fn build(registry: &TypeRegistry) -> Result<AliasTable, AnonymizeError> {
		let mut canonicalizer = Canonicalizer::new(registry);
		let mut assigner = AliasAssigner::default();
		let mut aliases = Vec::with_capacity(registry.len());
		let mut by_alias: HashMap<String, Vec<TypeId>> = HashMap::new();

		for info in registry.iter() {
			let hash = canonicalizer.hash_of(info.id)?;
			let alias = assigner.assign(base_alias(&info.node, &hash), hash);
			by_alias.entry(alias.clone()).or_default().push(info.id);
			aliases.push(CanonicalAlias { alias, hash });
		}
		log::debug!("{} types collapse into {} distinct shapes", aliases.len(), by_alias.len());
		Ok(AliasTable { aliases: aliases.into(), by_alias })
	}

	/// The alias of a type, if it exists.
	pub fn alias_of<Id: Into<TypeId>>(&self, id: Id) -> Option<&CanonicalAlias> {
		self.aliases.get(id.into().index())
	}

	/// Every type sharing an alias, in ID order.
	pub fn types_with_alias(&self, alias: &str) -> &[TypeId] {
		self.by_alias.get(alias).map(|ids| &**ids).unwrap_or(&[])
	}

	/// The first type (by ID) to have been given an alias.
	pub fn representative(&self, alias: &str) -> Option<TypeId> {
		self.types_with_alias(alias).first().copied()
	}

	/// How many distinct shapes there are.
	pub fn unique_shapes(&self) -> usize {
		self.by_alias.len()
	}

	pub fn len(&self) -> usize {
		self.aliases.len()
	}

	pub fn is_empty(&self) -> bool {
		self.aliases.is_empty()
	}

	/// Every type's alias, in ID order.
	pub fn iter(&self) -> impl ExactSizeIterator<Item = (TypeId, &CanonicalAlias)> {
		self.aliases.iter().enumerate().map(|(i, a)| (TypeId::from_u32(i as u32), a))
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::metadata::TypeInfo as RegistryType;
	use crate::test_utils::{registry_of, registry_with};
	use std::time::{Duration, Instant};
	use scale_info::{meta_type, TypeInfo};

	mod pallet_a {
		#[allow(dead_code)]
		#[derive(scale_info::TypeInfo)]
		pub struct Pair {
			a: u8,
			b: u8,
		}

		#[allow(dead_code)]
		#[derive(scale_info::TypeInfo)]
		pub struct Junctions(Vec<Junction>);

		#[allow(dead_code)]
		#[derive(scale_info::TypeInfo)]
		pub enum Junction {
			Parachain(#[codec(compact)] u32),
			Nested(Junctions),
		}
	}

	mod pallet_b {
		#[allow(dead_code)]
		#[derive(scale_info::TypeInfo)]
		pub struct Pair {
			a: u8,
			b: u8,
		}

		#[allow(dead_code)]
		#[derive(scale_info::TypeInfo)]
		pub struct Swapped {
			b: u8,
			a: u8,
		}

		#[allow(dead_code)]
		#[derive(scale_info::TypeInfo)]
		pub struct Renamed {
			a: u8,
			c: u8,
		}

		#[allow(dead_code)]
		#[derive(scale_info::TypeInfo)]
		pub struct Junctions(Vec<Junction>);

		#[allow(dead_code)]
		#[derive(scale_info::TypeInfo)]
		pub enum Junction {
			Parachain(#[codec(compact)] u32),
			Nested(Junctions),
		}
	}

	#[allow(dead_code)]
	#[derive(TypeInfo)]
	enum Ordered {
		#[codec(index = 0)]
		A,
		#[codec(index = 1)]
		B,
	}

	#[allow(dead_code)]
	#[derive(TypeInfo)]
	enum Reindexed {
		#[codec(index = 1)]
		A,
		#[codec(index = 0)]
		B,
	}

	fn aliases(types: &[scale_info::MetaType]) -> (AliasTable, Vec<TypeId>) {
		let (registry, ids) = registry_with(types);
		(AliasTable::build(&registry).unwrap(), ids)
	}

	#[test]
	fn identical_shapes_share_an_alias() {
		let (table, ids) = aliases(&[meta_type::<pallet_a::Pair>(), meta_type::<pallet_b::Pair>()]);
		let a = table.alias_of(ids[0]).unwrap();
		let b = table.alias_of(ids[1]).unwrap();
		assert_eq!(a, b);
		assert!(a.alias().starts_with('I'));
		assert_eq!(a.alias().len(), 13);
		assert_eq!(table.types_with_alias(a.alias()), &[ids[0], ids[1]]);
		assert_eq!(table.representative(a.alias()), Some(ids[0]));
	}

	#[test]
	fn names_order_and_indices_matter() {
		let (table, ids) = aliases(&[
			meta_type::<pallet_a::Pair>(),
			meta_type::<pallet_b::Swapped>(),
			meta_type::<pallet_b::Renamed>(),
			meta_type::<Ordered>(),
			meta_type::<Reindexed>(),
			meta_type::<[u8; 2]>(),
			meta_type::<[u8; 3]>(),
			meta_type::<(u8, u8)>(),
		]);
		let mut seen: Vec<&str> = ids.iter().map(|id| table.alias_of(*id).unwrap().alias()).collect();
		seen.sort_unstable();
		seen.dedup();
		assert_eq!(seen.len(), ids.len());
	}

	#[test]
	fn primitives_are_named_after_themselves() {
		let (registry, id) = registry_of::<u32>();
		assert_eq!(canonicalize(&registry, id).unwrap().alias(), "u32");
		let (registry, id) = registry_of::<bool>();
		assert_eq!(canonicalize(&registry, id).unwrap().to_string(), "bool");
	}

	#[test]
	fn cyclic_types_hash_deterministically() {
		let (table, ids) = aliases(&[meta_type::<pallet_a::Junctions>(), meta_type::<pallet_b::Junctions>()]);
		assert_eq!(table.alias_of(ids[0]), table.alias_of(ids[1]));

		let (again, _) = aliases(&[meta_type::<pallet_a::Junctions>(), meta_type::<pallet_b::Junctions>()]);
		assert_eq!(table, again);

		// A standalone canonicalization agrees with the table.
		let (registry, id) = registry_of::<pallet_a::Junctions>();
		let (single, ids) = aliases(&[meta_type::<pallet_b::Junctions>()]);
		assert_eq!(&canonicalize(&registry, id).unwrap(), single.alias_of(ids[0]).unwrap());
	}

	#[test]
	fn cyclic_aliases_do_not_depend_on_registration_order() {
		// Entering the cycle at a different type first must not change anyone's alias.
		let (table, ids) = aliases(&[meta_type::<Vec<pallet_a::Junction>>(), meta_type::<pallet_b::Junctions>()]);
		let (registry, a) = registry_of::<pallet_a::Junctions>();
		let expected = canonicalize(&registry, a).unwrap();
		assert_eq!(table.alias_of(ids[1]), Some(&expected));

		let (registry, vec_id) = registry_of::<Vec<pallet_b::Junction>>();
		assert_eq!(table.alias_of(ids[0]), Some(&canonicalize(&registry, vec_id).unwrap()));
	}

	#[test]
	fn finds_cycles() {
		let (registry, ids) = registry_with(&[meta_type::<pallet_a::Junctions>(), meta_type::<pallet_a::Pair>()]);
		let cyclic = components(&registry).cyclic;
		assert!(cyclic[ids[0].index()]);
		assert!(!cyclic[ids[1].index()]);
		let cyclic_count = cyclic.iter().filter(|c| **c).count();
		// Junctions, Vec<Junction> and Junction; the compact u32 and u32 aren't part of it.
		assert_eq!(cyclic_count, 3);
	}

	#[test]
	fn distinct_shapes_never_share_an_alias() {
		let (registry, _) = registry_with(&[
			meta_type::<pallet_a::Junctions>(),
			meta_type::<pallet_b::Swapped>(),
			meta_type::<Option<u32>>(),
			meta_type::<Vec<Option<u32>>>(),
			meta_type::<(u8, u16, u32, u64, u128)>(),
			meta_type::<(i8, i16, i32, i64, i128)>(),
			meta_type::<(bool, char, String)>(),
			meta_type::<Result<u8, u16>>(),
			meta_type::<[u16; 4]>(),
		]);
		let table = AliasTable::build(&registry).unwrap();
		for (id, alias) in table.iter() {
			for other in table.types_with_alias(alias.alias()) {
				assert_eq!(table.alias_of(*other).unwrap().hash(), alias.hash(), "{id} and {other} share an alias");
			}
		}
		assert!(table.unique_shapes() <= table.len());
	}

	#[test]
	fn colliding_short_aliases_get_suffixes() {
		let mut assigner = AliasAssigner::default();
		let (h1, h2, h3) = ([1; 32], [2; 32], [3; 32]);
		assert_eq!(assigner.assign("Iabc".into(), h1), "Iabc");
		assert_eq!(assigner.assign("Iabc".into(), h2), "Iabc_1");
		assert_eq!(assigner.assign("Iabc".into(), h1), "Iabc");
		assert_eq!(assigner.assign("Iabc".into(), h3), "Iabc_2");
		assert_eq!(assigner.assign("Iabc".into(), h2), "Iabc_1");
	}

	#[test]
	fn unknown_types_are_an_error() {
		let (registry, _) = registry_of::<u8>();
		assert_eq!(canonicalize(&registry, 99u32), Err(AnonymizeError::TypeNotFound(TypeId::from_u32(99))));
	}

	/// `layers` repetitions of `L = (X, Y)`, where `X { x: L' }` and `Y { y: L' }` both point
	/// at the next layer and the last layer points back at the first. Every path around the
	/// ring is distinct, so there are `2^layers` of them.
	fn diamond_ring(layers: u32) -> TypeRegistry {
		let id = |n: u32| TypeId::from_u32(n);
		let field = |name: &str, ty| Field { name: Some(name.to_owned()), ty, type_name: None };
		let mut types = Vec::new();
		for i in 0..layers {
			let next = id(3 * ((i + 1) % layers));
			let nodes = [
				TypeNode::Tuple(vec![id(3 * i + 1), id(3 * i + 2)]),
				TypeNode::Composite(vec![field("x", next)]),
				TypeNode::Composite(vec![field("y", next)]),
			];
			for node in nodes {
				types.push(RegistryType {
					id: id(types.len() as u32),
					path: Vec::new(),
					type_params: Vec::new(),
					node,
					docs: Vec::new(),
				});
			}
		}
		TypeRegistry::new(types).unwrap()
	}

	#[test]
	fn cycles_with_many_paths_hash_quickly() {
		let registry = diamond_ring(64);
		let started = Instant::now();
		let table = AliasTable::build(&registry).unwrap();
		assert!(started.elapsed() < Duration::from_secs(10), "took {:?}", started.elapsed());

		// Every layer looks the same, so the whole ring collapses into three shapes.
		assert_eq!(table.unique_shapes(), 3);
		let layer = table.alias_of(TypeId::from_u32(0)).unwrap();
		assert_eq!(table.types_with_alias(layer.alias()).len(), 64);
		assert_ne!(table.alias_of(TypeId::from_u32(1)), table.alias_of(TypeId::from_u32(2)));

		let single = canonicalize(&registry, TypeId::from_u32(3 * 17)).unwrap();
		assert_eq!(&single, layer);
	}

	#[test]
	fn cycles_of_different_lengths_with_the_same_shape_share_an_alias() {
		let short = diamond_ring(1);
		let long = diamond_ring(5);
		assert_eq!(
			canonicalize(&short, TypeId::from_u32(0)).unwrap(),
			canonicalize(&long, TypeId::from_u32(6)).unwrap()
		);
	}
}
