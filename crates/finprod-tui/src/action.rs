//! Every state change in the TUI arrives as an [`Action`] on the UI task.

use std::fmt;
use std::sync::Arc;

use finprod_core::{IdCheckTicket, Product, ProductChanges, ProductDraft, ProductSnapshot};

#[derive(Debug, Clone)]
pub enum Action {
    // ── Loop ─────────────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),
    ToggleHelp,

    // ── Connection / data ────────────────────────────────────────────
    Connecting,
    Connected,
    Disconnected(String),
    ProductsLoading,
    ProductsUpdated(ProductSnapshot),
    /// A list load failed. Carries the user-facing message.
    ProductsLoadFailed(String),
    /// Retry a failed load, or re-fetch a loaded list.
    RequestRefresh,

    // ── Navigation ───────────────────────────────────────────────────
    OpenAdd,
    OpenEdit(String),
    BackToList,

    // ── List screen ──────────────────────────────────────────────────
    /// The search box settled on a term.
    SearchSettled(String),
    DeleteProduct(String),
    /// Delete finished: the API message, or the user-facing error.
    DeleteFinished(Result<String, String>),

    // ── Form screen ──────────────────────────────────────────────────
    /// The id field settled on a value.
    IdSettled(String),
    VerifyId(IdCheckTicket),
    IdVerified(IdCheckTicket, Result<bool, String>),
    CreateProduct(ProductDraft),
    UpdateProduct { id: String, changes: ProductChanges },
    /// A save finished. `form` is the generation of the form that sent it.
    SubmitFinished {
        form: u64,
        result: Result<Arc<Product>, String>,
    },

    Notify(Notification),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A toast shown above the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
