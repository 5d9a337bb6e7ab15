// ── Domain model ──

pub mod product;

pub use product::{Product, ProductChanges, ProductDraft, initials};
