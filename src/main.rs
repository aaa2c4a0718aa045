//! Read (and write) a value in the offchain local storage of a substrate node.

#![warn(unused_extern_crates)]

use sp_core::offchain::StorageKind;
use structopt::StructOpt;

mod decode;
mod error;
mod reader;
mod rpc;

pub use error::Error;

/// Default logging target.
pub const LOG_TARGET: &'static str = "sub-offchain";

/// A storage kind that can be parsed from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedStorageKind(StorageKind);

impl std::str::FromStr for ParsedStorageKind {
	type Err = &'static str;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match &s.to_ascii_lowercase()[..] {
			"persistent" => Ok(Self(StorageKind::PERSISTENT)),
			"local" => Ok(Self(StorageKind::LOCAL)),
			_ => Err("storage kind must be persistent or local"),
		}
	}
}

#[derive(Debug, StructOpt)]
#[structopt(
	name = "sub-offchain",
	about = "read a value from the offchain local storage of a substrate node"
)]
struct Opt {
	/// The node to connect to.
	#[structopt(long, default_value = "ws://127.0.0.1:9944")]
	uri: String,

	/// The offchain storage kind. Can be persistent|local.
	#[structopt(long, default_value = "persistent")]
	kind: ParsedStorageKind,

	/// The storage key. Taken as text, unless prefixed with `0x`, in which case it is hex.
	///
	/// Defaults to the key under which the `ocw` pallet indexes its data.
	#[structopt(long, default_value = "kictto:data_index")]
	key: String,

	/// If set, the value is wrapped in a SCALE encoded `Vec<u8>`, the way pallets write it through
	/// `offchain_index::set`.
	#[structopt(long)]
	scale: bool,

	/// The subcommand. Defaults to `get`.
	#[structopt(subcommand)]
	cmd: Option<SubCommands>,
}

#[derive(Debug, StructOpt)]
enum SubCommands {
	/// Print the value stored under the key.
	Get {},
	/// Store a value under the key. Needs a node with unsafe rpc methods enabled.
	Set {
		/// The text to store.
		value: String,
	},
}

impl Opt {
	fn config(&self) -> Result<reader::Config, Error> {
		let key = decode::parse_key(&self.key).map_err(Error::InvalidKey)?;
		let format = if self.scale { decode::ValueFormat::Scale } else { decode::ValueFormat::Raw };
		Ok(reader::Config { uri: self.uri.clone(), kind: self.kind.0, key, format })
	}
}

async fn run(opt: Opt) -> Result<(), Error> {
	let config = opt.config()?;
	log::debug!(target: LOG_TARGET, "program args: {:?}", opt);

	match opt.cmd {
		None | Some(SubCommands::Get {}) => {
			let value = reader::read(&rpc::WsConnector, &config).await?;
			println!("{}", value);
		},
		Some(SubCommands::Set { value }) => reader::write(&rpc::WsConnector, &config, &value).await?,
	}

	Ok(())
}

#[tokio::main]
async fn main() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
		.format_module_path(false)
		.format_level(true)
		.init();

	let opt = Opt::from_args();
	if let Err(e) = run(opt).await {
		log::error!(target: LOG_TARGET, "error occurred: {}", e);
		// the logger may be filtered out; the failure must still reach the user.
		eprintln!("error occurred: {}", e);
		std::process::exit(1);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn storage_kind_parses() {
		assert_eq!("persistent".parse(), Ok(ParsedStorageKind(StorageKind::PERSISTENT)));
		assert_eq!("PERSISTENT".parse(), Ok(ParsedStorageKind(StorageKind::PERSISTENT)));
		assert_eq!("local".parse(), Ok(ParsedStorageKind(StorageKind::LOCAL)));
		assert!("global".parse::<ParsedStorageKind>().is_err());
	}

	#[test]
	fn defaults_read_the_indexed_key() {
		let opt = Opt::from_iter(vec!["sub-offchain"]);
		let config = opt.config().unwrap();
		assert_eq!(config.uri, "ws://127.0.0.1:9944");
		assert_eq!(config.kind, StorageKind::PERSISTENT);
		assert_eq!(config.key, b"kictto:data_index".to_vec());
		assert_eq!(config.format, decode::ValueFormat::Raw);
		assert!(opt.cmd.is_none());
	}

	#[test]
	fn set_takes_a_value() {
		let opt = Opt::from_iter(vec!["sub-offchain", "--scale", "--key", "0x0102", "set", "hello"]);
		let config = opt.config().unwrap();
		assert_eq!(config.key, vec![1, 2]);
		assert_eq!(config.format, decode::ValueFormat::Scale);
		assert!(matches!(opt.cmd, Some(SubCommands::Set { ref value }) if value == "hello"));
	}

	#[test]
	fn malformed_hex_key_is_rejected() {
		let opt = Opt::from_iter(vec!["sub-offchain", "--key", "0xabc"]);
		assert!(matches!(opt.config(), Err(Error::InvalidKey(_))));
	}
}
