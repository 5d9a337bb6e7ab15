mod client;
pub mod types;

pub use client::ProductsClient;
pub use types::{ProductRecord, ProductUpdateRecord};
