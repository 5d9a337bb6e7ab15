// finprod-api: Async Rust client for the financial products REST API

pub mod error;
pub mod products;
pub mod transport;

pub use error::Error;
pub use products::{ProductRecord, ProductUpdateRecord, ProductsClient};
pub use transport::{TlsMode, TransportConfig};
