pub mod client;
pub mod fetcher;
pub mod headers;
pub mod transport;

pub use client::ProxyClient;
pub use fetcher::Fetcher;
pub use headers::HeaderPolicy;
pub use transport::{ByteStream, OriginRequest, OriginResponse, Transport};
