use std::path::{Path, PathBuf};

use tokio::fs;

use crate::{BlobStore, BoxFuture, Error, Result};

/// Filesystem-backed blob store. Each key maps to one file under the root
/// directory; writes go through a sibling temp file and a rename so a crash
/// mid-write never leaves a half-written collection behind.
pub struct FsBlobStore {
	root: PathBuf,
}

impl FsBlobStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	fn path_for(&self, key: &str) -> Result<PathBuf> {
		if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
		{
			return Err(Error::InvalidKey { key: key.to_string() });
		}

		Ok(self.root.join(format!("{key}.json")))
	}

	async fn read_inner(&self, key: &str) -> Result<Option<Vec<u8>>> {
		let path = self.path_for(key)?;

		match fs::read(&path).await {
			Ok(bytes) => Ok(Some(bytes)),
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(err) => Err(Error::Io { key: key.to_string(), source: err }),
		}
	}

	async fn write_inner(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
		let path = self.path_for(key)?;

		ensure_parent(&self.root, key).await?;

		let tmp = self.root.join(format!("{key}.json.tmp"));

		fs::write(&tmp, &bytes)
			.await
			.map_err(|err| Error::Io { key: key.to_string(), source: err })?;
		fs::rename(&tmp, &path)
			.await
			.map_err(|err| Error::Io { key: key.to_string(), source: err })?;

		tracing::debug!(key, bytes = bytes.len(), "Wrote blob.");

		Ok(())
	}
}

impl BlobStore for FsBlobStore {
	fn read_blob<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Vec<u8>>>> {
		Box::pin(self.read_inner(key))
	}

	fn write_blob<'a>(&'a self, key: &'a str, bytes: Vec<u8>) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.write_inner(key, bytes))
	}
}

async fn ensure_parent(root: &Path, key: &str) -> Result<()> {
	fs::create_dir_all(root).await.map_err(|err| Error::Io { key: key.to_string(), source: err })
}
