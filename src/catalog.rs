//! Catalog Records
//!
//! Denormalized market and product snapshots. The catalog itself lives in an
//! external service; cart lines carry an owned [`ProductRecord`] copy taken
//! at add time, which can go stale until the next load.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Market UUID
pub type MarketUuid = TypedUuid<MarketRecord>;

/// Market Record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketRecord {
    /// Unique market identifier.
    pub uuid: MarketUuid,

    /// Human-readable market name.
    pub name: String,

    /// Whether the market is currently accepting orders.
    pub is_active: bool,

    /// Market creation timestamp.
    pub created_at: Timestamp,

    /// Last update timestamp.
    pub updated_at: Timestamp,
}

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Unique product identifier.
    pub uuid: ProductUuid,

    /// Market this product is sold from.
    pub market_uuid: MarketUuid,

    /// Product name.
    pub name: String,

    /// Product description.
    pub description: String,

    /// List price in minor currency units.
    pub price: u64,

    /// Discounted price in minor currency units, when on offer.
    pub discount_price: Option<u64>,

    /// Units currently in stock.
    pub stock: u32,

    /// Sales unit, e.g. "kg" or "bunch".
    pub unit: String,

    /// Whether the product can currently be purchased.
    pub is_available: bool,

    /// Product creation timestamp.
    pub created_at: Timestamp,

    /// Last update timestamp.
    pub updated_at: Timestamp,
}

impl ProductRecord {
    /// The price a shopper actually pays: the discount price when one is set.
    #[must_use]
    pub fn effective_price(&self) -> u64 {
        self.discount_price.unwrap_or(self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(price: u64, discount_price: Option<u64>) -> ProductRecord {
        ProductRecord {
            uuid: ProductUuid::now_v7(),
            market_uuid: MarketUuid::now_v7(),
            name: "Heirloom Tomatoes".to_string(),
            description: String::new(),
            price,
            discount_price,
            stock: 10,
            unit: "kg".to_string(),
            is_available: true,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        }
    }

    #[test]
    fn effective_price_prefers_discount() {
        assert_eq!(record(5_00, Some(4_25)).effective_price(), 4_25);
    }

    #[test]
    fn effective_price_falls_back_to_list_price() {
        assert_eq!(record(5_00, None).effective_price(), 5_00);
    }
}
