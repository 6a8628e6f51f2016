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

use super::TypeRef;
use crate::codec::{Codec, DecodeError, EncodeError};
use crate::metadata::TypeRegistry;
use crate::value::Value;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeArgDescriptor {
	pub name: String,
	pub ty: TypeRef,
}

/// A runtime API method: its arguments, in order, and the type it hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeDescriptor {
	pub api: String,
	pub method: String,
	pub args: Vec<RuntimeArgDescriptor>,
	pub result: TypeRef,
	pub docs: Vec<String>,
}

impl RuntimeDescriptor {
	/// The name the node knows this method by, eg `AccountNonceApi_account_nonce`.
	pub fn call_name(&self) -> String {
		format!("{}_{}", self.api, self.method)
	}

	/// Encode the arguments one after the other, in declaration order. A count mismatch is
	/// reported against the result type.
	pub fn encode_args(&self, registry: &TypeRegistry, args: &[Value]) -> Result<Vec<u8>, EncodeError> {
		if args.len() != self.args.len() {
			return Err(EncodeError::WrongLength { ty: self.result.id, expected: self.args.len(), got: args.len() });
		}
		let mut out = Vec::new();
		for (arg, value) in self.args.iter().zip(args) {
			Codec::new(registry, arg.ty.id).encode_to(value, &mut out)?;
		}
		Ok(out)
	}

	/// Decode the bytes a call to this method handed back.
	pub fn decode_result(&self, registry: &TypeRegistry, bytes: &[u8]) -> Result<Value, DecodeError> {
		Codec::new(registry, self.result.id).decode_exact(bytes)
	}
}
