// ── Wire <-> domain conversions ──
//
// `finprod-api` speaks in `ProductRecord` / `ProductUpdateRecord`.
// Everything above the transport layer uses the domain model.

use finprod_api::{ProductRecord, ProductUpdateRecord};

use crate::model::{Product, ProductChanges, ProductDraft};

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            logo: r.logo,
            date_release: r.date_release,
            date_revision: r.date_revision,
        }
    }
}

impl From<&ProductDraft> for ProductRecord {
    fn from(d: &ProductDraft) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            description: d.description.clone(),
            logo: d.logo.clone(),
            date_release: d.date_release,
            date_revision: d.date_revision,
        }
    }
}

impl From<&ProductChanges> for ProductUpdateRecord {
    fn from(c: &ProductChanges) -> Self {
        Self {
            name: c.name.clone(),
            description: c.description.clone(),
            logo: c.logo.clone(),
            date_release: c.date_release,
            date_revision: c.date_revision,
        }
    }
}
