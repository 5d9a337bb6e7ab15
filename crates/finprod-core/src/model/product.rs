// ── Product domain types ──

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A financial product as held in the local cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique, immutable identifier (3–10 chars).
    pub id: String,
    pub name: String,
    pub description: String,
    /// Logo URI.
    pub logo: String,
    pub date_release: NaiveDate,
    /// Always one year after `date_release`.
    pub date_revision: NaiveDate,
}

impl Product {
    /// Avatar initials shown in place of the logo.
    pub fn initials(&self) -> String {
        initials(&self.name)
    }

    /// Case-insensitive substring match on id, name, or description.
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.id.to_lowercase().contains(needle)
    }
}

/// Initials for a display name: the first two characters of a single word,
/// or the first letter of each of the first two words.
pub fn initials(name: &str) -> String {
    let mut words = name.split_whitespace();
    match (words.next(), words.next()) {
        (None, _) => String::new(),
        (Some(only), None) => only.chars().take(2).collect::<String>().to_uppercase(),
        (Some(first), Some(second)) => first
            .chars()
            .take(1)
            .chain(second.chars().take(1))
            .collect::<String>()
            .to_uppercase(),
    }
}

/// All six form values, as emitted by a successful form submission.
/// Body of the create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub id: String,
    pub name: String,
    pub description: String,
    pub logo: String,
    pub date_release: NaiveDate,
    pub date_revision: NaiveDate,
}

impl ProductDraft {
    /// Everything but the id, for the update call.
    pub fn changes(&self) -> ProductChanges {
        ProductChanges {
            name: self.name.clone(),
            description: self.description.clone(),
            logo: self.logo.clone(),
            date_release: self.date_release,
            date_revision: self.date_revision,
        }
    }
}

/// Update payload: a draft without the immutable id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductChanges {
    pub name: String,
    pub description: String,
    pub logo: String,
    pub date_release: NaiveDate,
    pub date_revision: NaiveDate,
}

impl From<&Product> for ProductDraft {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            description: p.description.clone(),
            logo: p.logo.clone(),
            date_release: p.date_release,
            date_revision: p.date_revision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_single_word_takes_two_chars() {
        assert_eq!(initials("visa"), "VI");
        assert_eq!(initials("  ahorro "), "AH");
        assert_eq!(initials("x"), "X");
    }

    #[test]
    fn initials_multi_word_takes_first_letters() {
        assert_eq!(initials("Tarjeta de Credito"), "TD");
        assert_eq!(initials("cuenta   corriente"), "CC");
    }

    #[test]
    fn initials_empty_name() {
        assert_eq!(initials(""), "");
        assert_eq!(initials("   "), "");
    }

    #[test]
    fn initials_handle_accents() {
        assert_eq!(initials("ñandú"), "ÑA");
    }
}
