//! The RPC capabilities the tool needs from a node, and their jsonrpsee implementation.

use async_trait::async_trait;
use jsonrpsee::{
	core::client::{ClientT, Error as ClientError},
	rpc_params,
	ws_client::{WsClient, WsClientBuilder},
};
use serde::Deserialize;
use sp_core::{offchain::StorageKind, Bytes};

use crate::{decode::DecodeError, Error, LOG_TARGET};

const METHODS: &str = "rpc_methods";
const LOCAL_STORAGE_GET: &str = "offchain_localStorageGet";
const LOCAL_STORAGE_SET: &str = "offchain_localStorageSet";

/// Wire name of a storage kind.
pub fn kind_param(kind: StorageKind) -> &'static str {
	match kind {
		StorageKind::PERSISTENT => "PERSISTENT",
		StorageKind::LOCAL => "LOCAL",
	}
}

/// Something that can open a ready-to-use connection to a node.
#[async_trait]
pub trait Connector {
	/// The handle returned by a successful connection.
	type Connection: OffchainApi + Send + Sync;

	/// Connect to `uri` and return once the node is ready to take requests.
	async fn connect(&self, uri: &str) -> Result<Self::Connection, Error>;
}

/// The `offchain_*` RPC namespace of a node.
#[async_trait]
pub trait OffchainApi {
	/// Get the hex encoded value stored under `key`, if any.
	async fn local_storage_get(
		&self,
		kind: StorageKind,
		key: &[u8],
	) -> Result<Option<String>, Error>;

	/// Store `value` under `key`.
	async fn local_storage_set(
		&self,
		kind: StorageKind,
		key: &[u8],
		value: &[u8],
	) -> Result<(), Error>;
}

#[derive(Debug, Deserialize)]
struct RpcMethods {
	methods: Vec<String>,
}

/// Classify a failed request: the node refused it, answered with something that is not the
/// expected shape, or the transport broke.
fn request_error(uri: &str, method: &'static str, e: ClientError) -> Error {
	match e {
		ClientError::Call(_) => Error::Rpc { method, reason: e.to_string() },
		ClientError::ParseError(inner) => Error::Decode(DecodeError::Malformed(inner.to_string())),
		_ => Error::Connection { uri: uri.to_string(), reason: e.to_string() },
	}
}

/// Connects over WebSocket.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

/// A connected WebSocket client.
pub struct WsRpc {
	client: WsClient,
	uri: String,
}

impl WsRpc {
	fn connection_error(&self, e: impl ToString) -> Error {
		Error::Connection { uri: self.uri.clone(), reason: e.to_string() }
	}

	fn request_error(&self, method: &'static str, e: ClientError) -> Error {
		request_error(&self.uri, method, e)
	}

	/// The connection is ready once the node answers `rpc_methods`.
	async fn wait_ready(&self) -> Result<(), Error> {
		let available: RpcMethods = self
			.client
			.request(METHODS, rpc_params![])
			.await
			.map_err(|e| self.connection_error(e))?;
		log::trace!(target: LOG_TARGET, "{} exposes {} methods", self.uri, available.methods.len());

		if !available.methods.iter().any(|m| m == LOCAL_STORAGE_GET) {
			log::warn!(
				target: LOG_TARGET,
				"{} does not list `{}`; is it running with `--rpc-methods unsafe`?",
				self.uri,
				LOCAL_STORAGE_GET,
			);
		}
		Ok(())
	}
}

#[async_trait]
impl Connector for WsConnector {
	type Connection = WsRpc;

	async fn connect(&self, uri: &str) -> Result<WsRpc, Error> {
		log::debug!(target: LOG_TARGET, "initializing remote client to {:?}", uri);
		let client = WsClientBuilder::default()
			.build(uri)
			.await
			.map_err(|e| Error::Connection { uri: uri.to_string(), reason: e.to_string() })?;

		let rpc = WsRpc { client, uri: uri.to_string() };
		rpc.wait_ready().await?;
		Ok(rpc)
	}
}

#[async_trait]
impl OffchainApi for WsRpc {
	async fn local_storage_get(
		&self,
		kind: StorageKind,
		key: &[u8],
	) -> Result<Option<String>, Error> {
		let value: Option<String> = self
			.client
			.request(LOCAL_STORAGE_GET, rpc_params![kind_param(kind), Bytes(key.to_vec())])
			.await
			.map_err(|e| self.request_error(LOCAL_STORAGE_GET, e))?;
		log::trace!(target: LOG_TARGET, "{} => {:?}", LOCAL_STORAGE_GET, value);
		Ok(value)
	}

	async fn local_storage_set(
		&self,
		kind: StorageKind,
		key: &[u8],
		value: &[u8],
	) -> Result<(), Error> {
		self.client
			.request::<(), _>(
				LOCAL_STORAGE_SET,
				rpc_params![kind_param(kind), Bytes(key.to_vec()), Bytes(value.to_vec())],
			)
			.await
			.map_err(|e| self.request_error(LOCAL_STORAGE_SET, e))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn kinds_use_node_names() {
		assert_eq!(kind_param(StorageKind::PERSISTENT), "PERSISTENT");
		assert_eq!(kind_param(StorageKind::LOCAL), "LOCAL");
	}

	#[test]
	fn keys_are_sent_as_prefixed_hex() {
		let params = serde_json::to_value(Bytes(b"kictto:data_index".to_vec())).unwrap();
		assert_eq!(params, serde_json::json!("0x6b696374746f3a646174615f696e646578"));
	}

	#[test]
	fn unexpected_result_shape_is_a_decode_error() {
		let parse = serde_json::from_str::<Option<String>>("42").unwrap_err();
		let error =
			request_error("ws://127.0.0.1:9944", LOCAL_STORAGE_GET, ClientError::ParseError(parse));
		assert!(matches!(error, Error::Decode(DecodeError::Malformed(_))));
	}

	#[test]
	fn transport_failure_is_a_connection_error() {
		let error = request_error(
			"ws://127.0.0.1:9944",
			LOCAL_STORAGE_GET,
			ClientError::Custom("connection closed".into()),
		);
		assert!(matches!(error, Error::Connection { ref uri, .. } if uri == "ws://127.0.0.1:9944"));
	}

	#[tokio::test]
	async fn unreachable_node_is_a_connection_error() {
		// nothing listens on the discard port.
		let result = WsConnector.connect("ws://127.0.0.1:9").await;
		assert!(matches!(result, Err(Error::Connection { .. })));
	}
}
