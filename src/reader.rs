//! The connect, request, decode sequence.

use sp_core::offchain::StorageKind;

use crate::{
	decode::{self, ValueFormat},
	rpc::{kind_param, Connector, OffchainApi},
	Error, LOG_TARGET,
};

/// What to talk to, and which value.
#[derive(Debug, Clone)]
pub struct Config {
	/// WebSocket endpoint of the node.
	pub uri: String,
	/// Storage kind the key lives in.
	pub kind: StorageKind,
	/// Raw storage key.
	pub key: Vec<u8>,
	/// Format of the stored bytes.
	pub format: ValueFormat,
}

/// Connect to the node and wait until it is ready.
pub async fn connect<C: Connector>(connector: &C, uri: &str) -> Result<C::Connection, Error> {
	let connection = connector.connect(uri).await?;
	log::info!(target: LOG_TARGET, "Connection to {} is OK.", uri);
	Ok(connection)
}

/// Read and decode the value under `config.key` over an established connection.
pub async fn read_value<A: OffchainApi + ?Sized>(api: &A, config: &Config) -> Result<String, Error> {
	log::debug!(
		target: LOG_TARGET,
		"reading 0x{} from {} storage",
		hex::encode(&config.key),
		kind_param(config.kind),
	);
	let response = api.local_storage_get(config.kind, &config.key).await?;
	if response.is_none() {
		log::debug!(target: LOG_TARGET, "no value stored under the key");
	}

	let value = decode::decode_value(response.as_deref(), config.format)?;
	log::info!(target: LOG_TARGET, "value in offchain storage >>> {}", value);
	Ok(value)
}

/// Encode and store `value` under `config.key` over an established connection.
pub async fn write_value<A: OffchainApi + ?Sized>(
	api: &A,
	config: &Config,
	value: &str,
) -> Result<(), Error> {
	let encoded = decode::encode_value(value, config.format);
	api.local_storage_set(config.kind, &config.key, &encoded).await?;
	log::info!(
		target: LOG_TARGET,
		"stored {} bytes under 0x{} in {} storage",
		encoded.len(),
		hex::encode(&config.key),
		kind_param(config.kind),
	);
	Ok(())
}

/// Connect, then read.
pub async fn read<C: Connector>(connector: &C, config: &Config) -> Result<String, Error> {
	let api = connect(connector, &config.uri).await?;
	read_value(&api, config).await
}

/// Connect, then write.
pub async fn write<C: Connector>(connector: &C, config: &Config, value: &str) -> Result<(), Error> {
	let api = connect(connector, &config.uri).await?;
	write_value(&api, config, value).await
}
