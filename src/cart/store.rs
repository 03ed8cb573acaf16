//! Cart store contract and its Postgres implementation.

use async_trait::async_trait;
use mockall::automock;

use crate::{database::Db, users::UserUuid};

use super::{errors::CartStoreError, models::CartLine, repository::PgCartLinesRepository};

/// Remote per-user cart line store.
///
/// The store holds whole collections: [`CartStore::replace_lines`] has
/// delete-all-then-insert semantics inside a single transaction, so a call
/// either lands in full or not at all.
#[automock]
#[async_trait]
pub trait CartStore: Send + Sync {
    /// All persisted lines for the user, joined with current product data,
    /// in insertion order.
    async fn fetch_lines(&self, user: UserUuid) -> Result<Vec<CartLine>, CartStoreError>;

    /// Replace every persisted line for the user with the given snapshot.
    async fn replace_lines(
        &self,
        user: UserUuid,
        lines: Vec<CartLine>,
    ) -> Result<(), CartStoreError>;
}

/// Postgres-backed [`CartStore`]. Row access runs inside a transaction that
/// sets the session user, so row-level security scopes every statement to
/// that user's rows.
#[derive(Debug, Clone)]
pub struct PgCartStore {
    db: Db,
    lines: PgCartLinesRepository,
}

impl PgCartStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            lines: PgCartLinesRepository::new(),
        }
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn fetch_lines(&self, user: UserUuid) -> Result<Vec<CartLine>, CartStoreError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let lines = self.lines.fetch_lines(&mut tx, user).await?;

        tx.commit().await?;

        Ok(lines)
    }

    async fn replace_lines(
        &self,
        user: UserUuid,
        lines: Vec<CartLine>,
    ) -> Result<(), CartStoreError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        self.lines.delete_lines(&mut tx, user).await?;

        for line in &lines {
            self.lines.insert_line(&mut tx, user, line).await?;
        }

        tx.commit().await?;

        Ok(())
    }
}
