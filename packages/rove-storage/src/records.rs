//! Self-describing envelope around a serialized record collection. The
//! version field lets a future reader reject blobs it does not understand
//! instead of silently misreading them.

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result};

pub const RECORD_SCHEMA_VERSION: u32 = 1;

#[derive(serde::Deserialize)]
struct Envelope<T> {
	schema_version: u32,
	records: Vec<T>,
}

#[derive(serde::Serialize)]
struct EnvelopeRef<'a, T> {
	schema_version: u32,
	records: &'a [T],
}

pub fn encode<T>(records: &[T]) -> Result<Vec<u8>>
where
	T: Serialize,
{
	let envelope = EnvelopeRef { schema_version: RECORD_SCHEMA_VERSION, records };

	serde_json::to_vec(&envelope).map_err(|err| Error::Encode { message: err.to_string() })
}

pub fn decode<T>(bytes: &[u8]) -> Result<Vec<T>>
where
	T: DeserializeOwned,
{
	let envelope: Envelope<T> =
		serde_json::from_slice(bytes).map_err(|err| Error::Decode { message: err.to_string() })?;

	if envelope.schema_version != RECORD_SCHEMA_VERSION {
		return Err(Error::UnsupportedSchema { version: envelope.schema_version });
	}

	Ok(envelope.records)
}
