//! Mercato
//!
//! Cart-synchronization core for a marketplace storefront connecting
//! shoppers, personal shoppers and market administrators. The crate owns the
//! in-memory cart state machine (single-market lock, stock-bounded
//! quantities, merge-on-add) and mirrors every mutation to a per-user row
//! store through a serialized writer queue.

pub mod cart;
pub mod catalog;
pub mod context;
pub mod database;
pub mod notify;
pub mod users;

mod uuids;
