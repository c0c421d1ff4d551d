mod error;
mod fs_store;
pub mod records;

pub use error::{Error, Result};
pub use fs_store::FsBlobStore;

use std::{future::Future, pin::Pin};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Opaque key/value blob storage for encoded record collections. The engine
/// never inspects what a store does with the bytes.
pub trait BlobStore
where
	Self: Send + Sync,
{
	/// Returns `None` for a key that was never written.
	fn read_blob<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Vec<u8>>>>;

	fn write_blob<'a>(&'a self, key: &'a str, bytes: Vec<u8>) -> BoxFuture<'a, Result<()>>;
}
