//! Cart errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

/// Rejections from cart state mutations. The cart is left unchanged when any
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The requested quantity exceeds the units in stock.
    #[error("only {available} items available in stock")]
    StockExceeded {
        /// Units currently in stock for the product.
        available: u32,
    },

    /// Added quantity must be at least one.
    #[error("quantity must be positive")]
    ZeroQuantity,

    /// The product is not currently purchasable.
    #[error("product is not available")]
    Unavailable,
}

/// Remote cart store failures.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// No matching row.
    #[error("cart line not found")]
    NotFound,

    /// A line already exists with the same identifier.
    #[error("cart line already exists")]
    AlreadyExists,

    /// The referenced product or user does not exist.
    #[error("related resource not found")]
    InvalidReference,

    /// A required column was null.
    #[error("missing required data")]
    MissingRequiredData,

    /// A row failed a storage-level check.
    #[error("invalid data")]
    InvalidData,

    /// Any other storage error.
    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CartStoreError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
