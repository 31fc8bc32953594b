mod fetcher;
#[cfg(test)]
pub(crate) mod mock;
mod transport;

pub use fetcher::{FileFetcher, ResourceMemo};
pub use transport::{DirTransport, HttpTransport, Transport};
