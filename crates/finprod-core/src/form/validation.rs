// ── Field rules ──
//
// Each validator returns the single highest-priority error for a raw
// field value: required, then minimum length, then maximum length, then
// the field-specific rule.

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{Months, NaiveDate};

use super::Field;

pub const ID_LENGTH: RangeInclusive<usize> = 3..=10;
pub const NAME_LENGTH: RangeInclusive<usize> = 5..=100;
pub const DESCRIPTION_LENGTH: RangeInclusive<usize> = 10..=200;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A field-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required(Field),
    MinLength(Field),
    MaxLength(Field),
    /// The backend reports the id as taken.
    IdExists,
    /// Release date before today.
    MinDate,
    /// Date not in `YYYY-MM-DD` form.
    InvalidDate(Field),
    /// Revision date is not exactly one year after release.
    RevisionMismatch,
}

impl FieldError {
    pub fn message(self) -> &'static str {
        match self {
            Self::Required(Field::Id) => "El ID es requerido",
            Self::MinLength(Field::Id) => "El ID debe tener mínimo 3 caracteres",
            Self::MaxLength(Field::Id) => "El ID debe tener máximo 10 caracteres",
            Self::IdExists => "Este ID ya existe",
            Self::Required(Field::Name) => "El nombre es requerido",
            Self::MinLength(Field::Name) => "El nombre debe tener mínimo 5 caracteres",
            Self::MaxLength(Field::Name) => "El nombre debe tener máximo 100 caracteres",
            Self::Required(Field::Description) => "La descripción es requerida",
            Self::MinLength(Field::Description) => "La descripción debe tener mínimo 10 caracteres",
            Self::MaxLength(Field::Description) => {
                "La descripción debe tener máximo 200 caracteres"
            }
            Self::Required(Field::Logo) => "El logo es requerido",
            Self::Required(Field::DateRelease) => "La fecha de liberación es requerida",
            Self::MinDate => "La fecha debe ser igual o mayor a la fecha actual",
            Self::Required(Field::DateRevision) => "La fecha de revisión es requerida",
            Self::RevisionMismatch => {
                "La fecha debe ser exactamente un año posterior a la fecha de liberación"
            }
            Self::InvalidDate(_) => "La fecha debe tener el formato AAAA-MM-DD",
            Self::MinLength(_) | Self::MaxLength(_) => "Longitud inválida",
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ── Dates ────────────────────────────────────────────────────────────

/// Parse a `YYYY-MM-DD` form value.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Format a date the way the form shows it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Release date plus one calendar year. Feb 29 maps to Feb 28.
pub fn revision_for(release: NaiveDate) -> Option<NaiveDate> {
    release.checked_add_months(Months::new(12))
}

// ── Validators ───────────────────────────────────────────────────────

fn validate_text(field: Field, value: &str, range: &RangeInclusive<usize>) -> Option<FieldError> {
    if value.is_empty() {
        return Some(FieldError::Required(field));
    }
    let len = value.chars().count();
    if len < *range.start() {
        Some(FieldError::MinLength(field))
    } else if len > *range.end() {
        Some(FieldError::MaxLength(field))
    } else {
        None
    }
}

pub fn validate_id(value: &str) -> Option<FieldError> {
    validate_text(Field::Id, value, &ID_LENGTH)
}

pub fn validate_name(value: &str) -> Option<FieldError> {
    validate_text(Field::Name, value, &NAME_LENGTH)
}

pub fn validate_description(value: &str) -> Option<FieldError> {
    validate_text(Field::Description, value, &DESCRIPTION_LENGTH)
}

pub fn validate_logo(value: &str) -> Option<FieldError> {
    value.is_empty().then_some(FieldError::Required(Field::Logo))
}

/// Release date must be present, well-formed, and not before `today`.
pub fn validate_release(value: &str, today: NaiveDate) -> Option<FieldError> {
    if value.is_empty() {
        return Some(FieldError::Required(Field::DateRelease));
    }
    match parse_date(value) {
        None => Some(FieldError::InvalidDate(Field::DateRelease)),
        Some(date) if date < today => Some(FieldError::MinDate),
        Some(_) => None,
    }
}

/// Revision date must be present and well-formed. It is not compared with
/// the release date: stored products may carry any revision date, and the
/// field cannot be edited.
pub fn validate_revision(value: &str) -> Option<FieldError> {
    if value.is_empty() {
        return Some(FieldError::Required(Field::DateRevision));
    }
    parse_date(value)
        .is_none()
        .then_some(FieldError::InvalidDate(Field::DateRevision))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn id_priority_order() {
        assert_eq!(validate_id(""), Some(FieldError::Required(Field::Id)));
        assert_eq!(validate_id("ab"), Some(FieldError::MinLength(Field::Id)));
        assert_eq!(validate_id("abcdefghijk"), Some(FieldError::MaxLength(Field::Id)));
        assert_eq!(validate_id("abc"), None);
        assert_eq!(validate_id("abcdefghij"), None);
    }

    #[test]
    fn name_and_description_bounds() {
        assert_eq!(validate_name("Cta"), Some(FieldError::MinLength(Field::Name)));
        assert_eq!(validate_name("Cuenta"), None);
        assert_eq!(
            validate_name(&"x".repeat(101)),
            Some(FieldError::MaxLength(Field::Name))
        );
        assert_eq!(
            validate_description("corta"),
            Some(FieldError::MinLength(Field::Description))
        );
        assert_eq!(validate_description("descripción válida"), None);
        assert_eq!(
            validate_description(&"x".repeat(201)),
            Some(FieldError::MaxLength(Field::Description))
        );
    }

    #[test]
    fn lengths_count_characters() {
        // Three characters, six bytes.
        assert_eq!(validate_id("ñññ"), None);
    }

    #[test]
    fn logo_is_required() {
        assert_eq!(validate_logo(""), Some(FieldError::Required(Field::Logo)));
        assert_eq!(validate_logo("logo.png"), None);
    }

    #[test]
    fn release_date_rules() {
        let today = date(2025, 6, 15);
        assert_eq!(
            validate_release("", today),
            Some(FieldError::Required(Field::DateRelease))
        );
        assert_eq!(
            validate_release("15/06/2025", today),
            Some(FieldError::InvalidDate(Field::DateRelease))
        );
        assert_eq!(validate_release("2025-06-14", today), Some(FieldError::MinDate));
        assert_eq!(validate_release("2025-06-15", today), None);
        assert_eq!(validate_release("2030-01-01", today), None);
    }

    #[test]
    fn revision_is_one_year_later() {
        assert_eq!(revision_for(date(2024, 1, 1)), Some(date(2025, 1, 1)));
        assert_eq!(revision_for(date(2024, 2, 29)), Some(date(2025, 2, 28)));
    }

    #[test]
    fn revision_needs_only_a_valid_date() {
        assert_eq!(validate_revision("2025-01-01"), None);
        assert_eq!(validate_revision("2025-01-02"), None);
        assert_eq!(
            validate_revision(""),
            Some(FieldError::Required(Field::DateRevision))
        );
        assert_eq!(
            validate_revision("01/01/2025"),
            Some(FieldError::InvalidDate(Field::DateRevision))
        );
    }

    #[test]
    fn messages_match_fields() {
        assert_eq!(FieldError::Required(Field::Id).to_string(), "El ID es requerido");
        assert_eq!(FieldError::IdExists.to_string(), "Este ID ya existe");
        assert_eq!(
            FieldError::MinDate.message(),
            "La fecha debe ser igual o mayor a la fecha actual"
        );
        assert_eq!(
            FieldError::Required(Field::DateRevision).message(),
            "La fecha de revisión es requerida"
        );
    }
}
