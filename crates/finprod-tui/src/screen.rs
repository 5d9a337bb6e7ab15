//! Screen identifiers.

use std::fmt;

/// The three screens that replace the browser routes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    /// `/products`
    #[default]
    List,
    /// `/products/add`
    Add,
    /// `/products/edit/{id}`
    Edit(String),
}

impl ScreenId {
    pub fn is_form(&self) -> bool {
        !matches!(self, Self::List)
    }

    /// Title shown in the header.
    pub fn label(&self) -> &'static str {
        match self {
            Self::List => "Productos financieros",
            Self::Add => "Agregar producto",
            Self::Edit(_) => "Editar producto",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("/products"),
            Self::Add => f.write_str("/products/add"),
            Self::Edit(id) => write!(f, "/products/edit/{id}"),
        }
    }
}
