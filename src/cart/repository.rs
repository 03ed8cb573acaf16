//! Cart Lines Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    catalog::{MarketUuid, ProductRecord, ProductUuid},
    users::UserUuid,
};

use super::models::{CartLine, LineUuid};

const FETCH_CART_LINES_SQL: &str = include_str!("sql/fetch_cart_lines.sql");
const DELETE_CART_LINES_SQL: &str = include_str!("sql/delete_cart_lines.sql");
const INSERT_CART_LINE_SQL: &str = include_str!("sql/insert_cart_line.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartLinesRepository;

impl PgCartLinesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn fetch_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<CartLine>, sqlx::Error> {
        query_as::<Postgres, CartLine>(FETCH_CART_LINES_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn delete_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_LINES_SQL)
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn insert_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        line: &CartLine,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_CART_LINE_SQL)
            .bind(line.uuid.into_uuid())
            .bind(user.into_uuid())
            .bind(line.product.uuid.into_uuid())
            .bind(i64::from(line.quantity))
            .bind(line.notes.as_deref())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for CartLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let product = ProductRecord {
            uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            market_uuid: MarketUuid::from_uuid(row.try_get("market_uuid")?),
            name: row.try_get("product_name")?,
            description: row.try_get("product_description")?,
            price: try_get_amount(row, "price")?,
            discount_price: try_get_optional_amount(row, "discount_price")?,
            stock: try_get_count(row, "stock")?,
            unit: row.try_get("unit")?,
            is_available: row.try_get("is_available")?,
            created_at: row
                .try_get::<SqlxTimestamp, _>("product_created_at")?
                .to_jiff(),
            updated_at: row
                .try_get::<SqlxTimestamp, _>("product_updated_at")?
                .to_jiff(),
        };

        Ok(Self {
            uuid: LineUuid::from_uuid(row.try_get("uuid")?),
            product,
            quantity: try_get_count(row, "quantity")?,
            notes: row.try_get("notes")?,
        })
    }
}

fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

fn try_get_optional_amount(row: &PgRow, col: &str) -> Result<Option<u64>, sqlx::Error> {
    let amount: Option<i64> = row.try_get(col)?;

    amount
        .map(|amount| {
            u64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
                index: col.to_string(),
                source: Box::new(e),
            })
        })
        .transpose()
}

fn try_get_count(row: &PgRow, col: &str) -> Result<u32, sqlx::Error> {
    let count_i64: i64 = row.try_get(col)?;

    u32::try_from(count_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
