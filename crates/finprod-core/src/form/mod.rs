//! Product form state and validation.
//!
//! [`ProductForm`] holds the raw text of the six product fields, decides
//! which of them are editable, tracks which have been touched, and runs
//! the field rules from [`validation`]. The id availability check is
//! driven from outside: the owner debounces id edits, asks the form for
//! an [`IdCheckTicket`], calls the backend, and hands the answer back via
//! [`ProductForm::apply_id_check`].

mod id_check;
pub mod validation;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use strum::IntoEnumIterator;
use tracing::{debug, warn};

use crate::model::{Product, ProductDraft};

pub use id_check::{IdCheckStatus, IdCheckTicket};
pub use validation::FieldError;

use id_check::IdCheck;
use validation::{format_date, parse_date, revision_for};

/// The six product form fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
pub enum Field {
    #[strum(to_string = "ID")]
    Id,
    #[strum(to_string = "Nombre")]
    Name,
    #[strum(to_string = "Descripción")]
    Description,
    #[strum(to_string = "Logo")]
    Logo,
    #[strum(to_string = "Fecha Liberación")]
    DateRelease,
    #[strum(to_string = "Fecha Revisión")]
    DateRevision,
}

/// Whether the form creates a new product or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Arc<Product>),
}

impl fmt::Display for FormMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("Agregar producto"),
            Self::Edit(_) => f.write_str("Editar producto"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FormValues {
    id: String,
    name: String,
    description: String,
    logo: String,
    date_release: String,
    date_revision: String,
}

impl FormValues {
    fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            logo: product.logo.clone(),
            date_release: format_date(product.date_release),
            date_revision: format_date(product.date_revision),
        }
    }

    fn get(&self, field: Field) -> &str {
        match field {
            Field::Id => &self.id,
            Field::Name => &self.name,
            Field::Description => &self.description,
            Field::Logo => &self.logo,
            Field::DateRelease => &self.date_release,
            Field::DateRevision => &self.date_revision,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Id => &mut self.id,
            Field::Name => &mut self.name,
            Field::Description => &mut self.description,
            Field::Logo => &mut self.logo,
            Field::DateRelease => &mut self.date_release,
            Field::DateRevision => &mut self.date_revision,
        }
    }
}

/// Add/edit form for one product.
#[derive(Debug)]
pub struct ProductForm {
    mode: FormMode,
    /// Reference date for the minimum release date rule.
    today: NaiveDate,
    values: FormValues,
    touched: HashSet<Field>,
    submitting: bool,
    id_check: IdCheck,
}

impl ProductForm {
    /// Empty form for a new product.
    pub fn new_create(today: NaiveDate) -> Self {
        Self {
            mode: FormMode::Create,
            today,
            values: FormValues::default(),
            touched: HashSet::new(),
            submitting: false,
            id_check: IdCheck::default(),
        }
    }

    /// Form pre-filled with `product`. The id is locked.
    pub fn new_edit(product: Arc<Product>, today: NaiveDate) -> Self {
        let values = FormValues::from_product(&product);
        Self {
            mode: FormMode::Edit(product),
            today,
            values,
            touched: HashSet::new(),
            submitting: false,
            id_check: IdCheck::default(),
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.get(field)
    }

    /// Disabled fields reject [`set_value`](Self::set_value). The revision
    /// date is always derived; the id is fixed once the product exists.
    pub fn is_disabled(&self, field: Field) -> bool {
        match field {
            Field::DateRevision => true,
            Field::Id => self.is_edit(),
            _ => false,
        }
    }

    /// Replace a field's raw text. Returns `false` when the field is disabled.
    ///
    /// Changing the release date re-derives the revision date. Changing
    /// the id invalidates any in-flight availability check.
    pub fn set_value(&mut self, field: Field, value: impl Into<String>) -> bool {
        if self.is_disabled(field) {
            return false;
        }
        let value = value.into();
        match field {
            Field::DateRelease => {
                self.values.date_revision = parse_date(&value)
                    .and_then(revision_for)
                    .map(format_date)
                    .unwrap_or_default();
            }
            Field::Id => self.id_check.invalidate(&value),
            _ => {}
        }
        *self.values.get_mut(field) = value;
        true
    }

    // ── Touched state ────────────────────────────────────────────────

    /// Mark a field as visited; its error becomes visible.
    pub fn touch(&mut self, field: Field) {
        self.touched.insert(field);
    }

    pub fn mark_all_touched(&mut self) {
        self.touched.extend(Field::iter());
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    // ── Errors ───────────────────────────────────────────────────────

    /// The highest-priority error for `field`, touched or not.
    pub fn error(&self, field: Field) -> Option<FieldError> {
        let value = self.value(field);
        match field {
            Field::Id => validation::validate_id(value).or_else(|| {
                (!self.is_edit() && self.id_check.status() == IdCheckStatus::Taken)
                    .then_some(FieldError::IdExists)
            }),
            Field::Name => validation::validate_name(value),
            Field::Description => validation::validate_description(value),
            Field::Logo => validation::validate_logo(value),
            Field::DateRelease => validation::validate_release(value, self.today),
            Field::DateRevision => validation::validate_revision(value),
        }
    }

    /// True when the field has an error and has been touched.
    pub fn has_error(&self, field: Field) -> bool {
        self.visible_error(field).is_some()
    }

    /// The error to show next to the field, if any.
    pub fn visible_error(&self, field: Field) -> Option<FieldError> {
        if self.is_touched(field) {
            self.error(field)
        } else {
            None
        }
    }

    /// Every field error, in field order.
    pub fn errors(&self) -> Vec<(Field, FieldError)> {
        Field::iter()
            .filter_map(|field| self.error(field).map(|e| (field, e)))
            .collect()
    }

    // ── Id availability ──────────────────────────────────────────────

    pub fn id_check_status(&self) -> IdCheckStatus {
        if self.is_edit() {
            IdCheckStatus::Available
        } else {
            self.id_check.status()
        }
    }

    /// A debounced id value settled. Returns a ticket when the backend
    /// should be asked about it.
    ///
    /// Nothing is issued in edit mode, for a value that no longer matches
    /// the field, or while the sync id rules fail.
    pub fn request_id_check(&mut self, settled: &str) -> Option<IdCheckTicket> {
        if self.is_edit() || settled != self.values.id {
            return None;
        }
        if validation::validate_id(settled).is_some() {
            return None;
        }
        let ticket = self.id_check.begin(settled)?;
        debug!(id = %ticket.id, generation = ticket.generation, "id check issued");
        Some(ticket)
    }

    /// Apply a verification answer. A failed call counts as "available".
    /// Returns `false` when the ticket is stale and nothing changed.
    pub fn apply_id_check<E: fmt::Display>(
        &mut self,
        ticket: &IdCheckTicket,
        result: Result<bool, E>,
    ) -> bool {
        let exists = match result {
            Ok(exists) => exists,
            Err(e) => {
                warn!(id = %ticket.id, error = %e, "id check failed, treating id as available");
                false
            }
        };
        let applied = self.id_check.finish(ticket, exists);
        if !applied {
            debug!(id = %ticket.id, generation = ticket.generation, "stale id check dropped");
        }
        applied
    }

    // ── Submission ───────────────────────────────────────────────────

    /// Sync rules pass for every field and, in create mode, the id is
    /// known to be available.
    pub fn is_valid(&self) -> bool {
        Field::iter().all(|field| self.error(field).is_none())
            && self.id_check_status() == IdCheckStatus::Available
    }

    /// Try to submit. Returns the field values when the form is valid and
    /// no submission is in flight; the form then stays in the submitting
    /// state until [`set_submitting(false)`](Self::set_submitting).
    ///
    /// An invalid form marks every field touched instead.
    pub fn submit(&mut self) -> Option<ProductDraft> {
        if self.submitting {
            return None;
        }
        if !self.is_valid() {
            self.mark_all_touched();
            return None;
        }
        let draft = self.draft()?;
        self.submitting = true;
        Some(draft)
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Clear the form (create) or reload the original product (edit).
    pub fn reset(&mut self) {
        self.values = match &self.mode {
            FormMode::Create => FormValues::default(),
            FormMode::Edit(product) => FormValues::from_product(product),
        };
        self.touched.clear();
        self.submitting = false;
        self.id_check.reset();
    }

    fn draft(&self) -> Option<ProductDraft> {
        Some(ProductDraft {
            id: self.values.id.clone(),
            name: self.values.name.clone(),
            description: self.values.description.clone(),
            logo: self.values.logo.clone(),
            date_release: parse_date(&self.values.date_release)?,
            date_revision: parse_date(&self.values.date_revision)?,
        })
    }
}
