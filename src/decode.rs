//! Decoding of the hex values returned by the offchain storage RPCs.

use codec::{Decode, Encode};

/// Prefix that the node puts in front of every hex encoded byte string.
const HEX_PREFIX: &str = "0x";

/// Failure to turn a hex response into bytes or text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
	/// The hex digits do not come in pairs.
	#[error("hex value has an odd number of digits ({0})")]
	OddLength(usize),
	/// A character outside of `[0-9a-fA-F]`. `index` is a byte offset into the response, prefix
	/// included.
	#[error("invalid hex character {c:?} at byte {index}")]
	InvalidHexCharacter { c: char, index: usize },
	/// The bytes are not a SCALE encoded `Vec<u8>`.
	#[error("value is not a SCALE encoded byte vector: {0}")]
	Scale(String),
	/// The node answered with something other than a hex string or `null`.
	#[error("unexpected response shape: {0}")]
	Malformed(String),
}

/// How the stored bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
	/// The bytes are the text.
	Raw,
	/// The bytes are a SCALE encoded `Vec<u8>` wrapping the text, as written by the `ocw` pallet
	/// through `offchain_index::set`.
	Scale,
}

/// Decode a hex string, with or without a `0x` prefix, into bytes.
///
/// The empty string decodes into the empty vector.
pub fn decode_hex(value: &str) -> Result<Vec<u8>, DecodeError> {
	let (offset, digits) = match value.strip_prefix(HEX_PREFIX) {
		Some(rest) => (HEX_PREFIX.len(), rest),
		None => (0, value),
	};

	hex::decode(digits).map_err(|e| match e {
		// `hex` reports the offending byte as a char; recover the whole char for non-ASCII input.
		hex::FromHexError::InvalidHexCharacter { c, index } => DecodeError::InvalidHexCharacter {
			c: digits.get(index..).and_then(|rest| rest.chars().next()).unwrap_or(c),
			index: index + offset,
		},
		// `InvalidStringLength` is only reported by `decode_to_slice`.
		_ => DecodeError::OddLength(digits.len()),
	})
}

/// Decode the response of `offchain_localStorageGet` into text.
///
/// An absent value is the empty string. Invalid UTF-8 sequences are replaced, not rejected.
pub fn decode_value(response: Option<&str>, format: ValueFormat) -> Result<String, DecodeError> {
	let bytes = decode_hex(response.unwrap_or_default())?;
	let bytes = match format {
		ValueFormat::Raw => bytes,
		ValueFormat::Scale => <Vec<u8> as Decode>::decode(&mut bytes.as_slice())
			.map_err(|e| DecodeError::Scale(e.to_string()))?,
	};

	Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Turn text into the bytes that [`decode_value`] maps back to the same text.
pub fn encode_value(text: &str, format: ValueFormat) -> Vec<u8> {
	match format {
		ValueFormat::Raw => text.as_bytes().to_vec(),
		ValueFormat::Scale => text.as_bytes().to_vec().encode(),
	}
}

/// Parse a storage key given by the user: `0x` prefixed hex is taken as raw bytes, anything else
/// as UTF-8 text.
pub fn parse_key(key: &str) -> Result<Vec<u8>, DecodeError> {
	if key.starts_with(HEX_PREFIX) {
		decode_hex(key)
	} else {
		Ok(key.as_bytes().to_vec())
	}
}
