// ── Command API ──
//
// Every write against the products API flows through `Command`.
// The controller runs each one and re-fetches the list afterwards.

use crate::error::CoreError;
use crate::model::{Product, ProductChanges, ProductDraft};

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All write operations against the products API.
#[derive(Debug, Clone)]
pub enum Command {
    CreateProduct(ProductDraft),
    UpdateProduct { id: String, changes: ProductChanges },
    DeleteProduct { id: String },
    /// Re-fetch the list without changing anything.
    Refresh,
}

/// Result of a command execution.
#[derive(Debug)]
pub enum CommandResult {
    /// The product as the server stored it.
    Product(Product),
    Deleted { id: String, message: String },
    Refreshed { count: usize },
}
