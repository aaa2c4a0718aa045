use crate::decode::DecodeError;

/// Everything that can abort a run. All of them end the process with exit code 1.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The node could not be reached, the handshake failed, or the transport broke mid-request.
	#[error("connection to {uri} failed: {reason}")]
	Connection { uri: String, reason: String },
	/// The node answered with an error object.
	#[error("rpc call `{method}` failed: {reason}")]
	Rpc { method: &'static str, reason: String },
	/// The node answered with a value that is not what we expect.
	#[error("failed to decode value: {0}")]
	Decode(#[from] DecodeError),
	/// The `0x` key given on the command line is not valid hex.
	#[error("invalid storage key: {0}")]
	InvalidKey(DecodeError),
}
