// finprod-core: Reactive data layer between finprod-api and consumers (CLI/TUI).
//
// The controller owns the HTTP client and the cached product list; the
// list, form, and debounce modules hold the UI-independent state the
// CLI and TUI share.

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod debounce;
pub mod error;
pub mod form;
pub mod list;
pub mod model;
pub mod pagination;
pub mod search;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{ControllerConfig, DEFAULT_BASE_URL, TlsVerification};
pub use controller::{ConnectionState, Controller};
pub use debounce::Debouncer;
pub use error::CoreError;
pub use form::{Field, FieldError, FormMode, IdCheckStatus, IdCheckTicket, ProductForm};
pub use list::{ListState, ProductList};
pub use model::{Product, ProductChanges, ProductDraft};
pub use pagination::Pagination;
pub use store::ProductStore;
pub use stream::{ProductSnapshot, ProductStream};
