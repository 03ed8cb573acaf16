//! Cart Models

use serde::{Deserialize, Serialize};

use crate::{
    catalog::{ProductRecord, ProductUuid},
    uuids::TypedUuid,
};

/// Cart line UUID
///
/// Line identifiers are client-generated (UUIDv7) and honored by the store
/// on insert, so they survive the persistence round trip unchanged.
pub type LineUuid = TypedUuid<CartLine>;

/// One product line in the active cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Unique line identifier.
    pub uuid: LineUuid,

    /// Owned product snapshot taken when the line was created or last
    /// merged; may go stale relative to the catalog.
    pub product: ProductRecord,

    /// Units of the product, always within `1..=product.stock`.
    pub quantity: u32,

    /// Free-text annotation, e.g. a substitution preference.
    pub notes: Option<String>,
}

impl CartLine {
    /// The product this line refers to.
    #[must_use]
    pub fn product_uuid(&self) -> ProductUuid {
        self.product.uuid
    }

    /// Effective price multiplied by quantity, in minor currency units.
    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.product.effective_price() * u64::from(self.quantity)
    }
}
