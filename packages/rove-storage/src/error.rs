pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Blob io failed for key {key:?}.")]
	Io { key: String, source: std::io::Error },
	#[error("Failed to encode record collection: {message}")]
	Encode { message: String },
	#[error("Failed to decode record collection: {message}")]
	Decode { message: String },
	#[error("Unsupported record schema version {version}.")]
	UnsupportedSchema { version: u32 },
	#[error("Blob key {key:?} is not a plain file name.")]
	InvalidKey { key: String },
}
