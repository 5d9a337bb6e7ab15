// Wire types for the products REST API.
//
// Dates travel as `YYYY-MM-DD`. Some backends append a time component
// (`2025-01-01T00:00:00.000Z`); only the date part is kept.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A product as the backend returns it, and the body of a create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub logo: String,
    #[serde(with = "wire_date")]
    pub date_release: NaiveDate,
    #[serde(with = "wire_date")]
    pub date_revision: NaiveDate,
}

/// Body of an update call: every field except the immutable id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdateRecord {
    pub name: String,
    pub description: String,
    pub logo: String,
    #[serde(with = "wire_date")]
    pub date_release: NaiveDate,
    #[serde(with = "wire_date")]
    pub date_revision: NaiveDate,
}

/// `GET /products` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(default)]
    pub data: Vec<ProductRecord>,
}

/// `POST /products` and `PUT /products/{id}` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ProductEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub data: ProductRecord,
}

/// `DELETE /products/{id}` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Error body some backends send with 4xx/5xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

pub(crate) mod wire_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, ser: S) -> Result<S::Ok, S::Error> {
        ser.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(de)?;
        let date_part = raw.get(..10).unwrap_or(&raw);
        NaiveDate::parse_from_str(date_part, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn dates_serialize_as_plain_iso() {
        let record = ProductRecord {
            id: "trj-crd".into(),
            name: "Tarjetas de Credito".into(),
            description: "Tarjeta de consumo bajo la modalidad de credito".into(),
            logo: "https://example.com/logo.png".into(),
            date_release: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            date_revision: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date_release"], "2025-01-01");
        assert_eq!(json["date_revision"], "2026-01-01");
    }

    #[test]
    fn timestamps_keep_only_the_date() {
        let json = serde_json::json!({
            "id": "abc",
            "name": "Cuenta",
            "description": "Cuenta de ahorros",
            "logo": "logo.png",
            "date_release": "2025-03-04T00:00:00.000Z",
            "date_revision": "2026-03-04",
        });
        let record: ProductRecord = serde_json::from_value(json).unwrap();
        assert_eq!(
            record.date_release,
            NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
        );
    }

    #[test]
    fn malformed_date_is_rejected() {
        let json = serde_json::json!({
            "id": "abc",
            "name": "Cuenta",
            "description": "Cuenta de ahorros",
            "logo": "logo.png",
            "date_release": "04/03/2025",
            "date_revision": "2026-03-04",
        });
        assert!(serde_json::from_value::<ProductRecord>(json).is_err());
    }
}
