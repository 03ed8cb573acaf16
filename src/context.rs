//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    cart::{CartStore, CartSynchronizer, PgCartStore},
    database::{self, Db},
    notify::Notifier,
    users::UserUuid,
};

/// Failures while wiring the application context.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// Establishing the database connection failed.
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Shared application services, passed explicitly rather than held in
/// ambient globals. Sessions borrow the store through
/// [`AppContext::open_cart`].
#[derive(Clone)]
pub struct AppContext {
    /// The remote cart line store.
    pub cart_store: Arc<dyn CartStore>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str) -> Result<Self, AppInitError> {
        let pool = database::connect(url).await.map_err(AppInitError::Database)?;

        let db = Db::new(pool);

        Ok(Self {
            cart_store: Arc::new(PgCartStore::new(db)),
        })
    }

    /// Open a per-session cart synchronizer for an authenticated user.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since the synchronizer
    /// spawns its writer task onto the current runtime.
    #[must_use]
    pub fn open_cart(&self, user: UserUuid, notifier: Arc<dyn Notifier>) -> CartSynchronizer {
        CartSynchronizer::new(user, self.cart_store.clone(), notifier)
    }
}
