//! Carts

pub mod errors;
pub mod models;
pub mod state;
pub mod store;
pub mod sync;

mod repository;
mod writer;

pub use errors::{CartError, CartStoreError};
pub use state::{AddOutcome, CartState, PendingAdd, UpdateOutcome};
pub use store::*;
pub use sync::{AddItemOutcome, CartSynchronizer};
