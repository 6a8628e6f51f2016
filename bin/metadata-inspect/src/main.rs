use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use subdesc::{descriptors::PalletDescriptors, CompiledMetadata, TypeId};

/// Compile a SCALE encoded metadata blob and inspect the result.
#[derive(Debug, Parser)]
#[command(name = "metadata-inspect", version)]
struct Opts {
	/// SCALE encoded V14 or V15 metadata blob
	metadata: PathBuf,
	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Print the metadata version and how much was compiled
	Summary,
	/// Print the compiled descriptors as JSON
	Descriptors {
		/// Only print the descriptors of this pallet
		#[arg(long)]
		pallet: Option<String>,
	},
	/// Print the canonical alias of every type
	Aliases,
	/// Decode a value of the given type
	Decode {
		/// The ID of the type to decode
		#[arg(long = "type")]
		ty: u32,
		/// SCALE encoded bytes in the form 0x1a2b3c
		bytes: String,
	},
	/// Decode a length prefixed extrinsic
	Extrinsic {
		/// Extrinsic in the form 0x1a2b3c
		extrinsic: String,
	},
	/// Decode a storage key
	StorageKey {
		/// Storage key in the form 0x1a2b3c
		key: String,
	},
}

fn main() -> Result<(), anyhow::Error> {
	let opts = Opts::parse();
	pretty_env_logger::init();

	let metadata_bytes = std::fs::read(&opts.metadata)
		.with_context(|| format!("Cannot read metadata from {}", opts.metadata.display()))?;
	let compiled = CompiledMetadata::compile(&metadata_bytes)?;
	let types = compiled.metadata().types();

	match opts.command {
		Command::Summary => {
			let metadata = compiled.metadata();
			println!("Metadata version: {}", metadata.version());
			println!("Metadata hash: 0x{}", hex::encode(compiled.hash()));
			println!("Extrinsic version: {}", metadata.extrinsic().version);
			println!("Types: {} ({} distinct shapes)", types.len(), compiled.aliases().unique_shapes());
			println!("Runtime APIs: {}", compiled.descriptors().runtime_apis().len());
			for pallet in compiled.descriptors().pallets() {
				println!("{}", pallet_line(pallet));
			}
		}
		Command::Descriptors { pallet: Some(name) } => {
			let pallet = match compiled.descriptors().pallet(&name) {
				Some(pallet) => pallet,
				None => anyhow::bail!("No pallet named '{}'", name),
			};
			println!("{}", serde_json::to_string_pretty(pallet)?);
		}
		Command::Descriptors { pallet: None } => {
			println!("{}", serde_json::to_string_pretty(compiled.descriptors())?);
		}
		Command::Aliases => {
			for (id, alias) in compiled.aliases().iter() {
				let name = types.resolve(id).map(|info| info.display_name()).unwrap_or_default();
				println!("{id:>6} {alias:<16} {name}");
			}
		}
		Command::Decode { ty, bytes } => {
			let bytes = parse_hex(&bytes)?;
			let value = match compiled.codec(TypeId::from_u32(ty)).decode_exact(&bytes) {
				Ok(value) => value,
				Err(e) => anyhow::bail!("Cannot decode value: {}", e),
			};
			println!("{}", serde_json::to_string_pretty(&value)?);
		}
		Command::Extrinsic { extrinsic } => {
			let bytes = parse_hex(&extrinsic)?;
			let decoded = match subdesc::decoder::decode_extrinsic(compiled.metadata(), compiled.descriptors(), &mut &*bytes)
			{
				Ok(decoded) => decoded,
				Err(e) => anyhow::bail!("Cannot decode extrinsic: {}", e),
			};
			println!("{}", serde_json::to_string_pretty(&decoded)?);
		}
		Command::StorageKey { key } => {
			let bytes = parse_hex(&key)?;
			let decoded = compiled.descriptors().decode_storage_key(types, &bytes)?;
			println!("{}.{}", decoded.entry.pallet, decoded.entry.name);
			println!("{}", serde_json::to_string_pretty(&decoded.keys)?);
		}
	}
	Ok(())
}

fn parse_hex(s: &str) -> Result<Vec<u8>, anyhow::Error> {
	let s = match s.strip_prefix("0x") {
		Some(s) => s,
		None => anyhow::bail!("Hex input should start with 0x"),
	};
	hex::decode(s).map_err(|e| anyhow::anyhow!("Cannot decode hex string into bytes: {}", e))
}

fn pallet_line(pallet: &PalletDescriptors) -> String {
	format!(
		"{:>3} {}: {} storage, {} calls, {} events, {} errors, {} constants",
		pallet.index,
		pallet.name,
		pallet.storage.len(),
		pallet.calls.len(),
		pallet.events.len(),
		pallet.errors.len(),
		pallet.constants.len()
	)
}
