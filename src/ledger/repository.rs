use super::models::*;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

/// Durable store of confirmed transactions
///
/// INVARIANT: a transaction id is stored at most once. Implementations must
/// enforce this at the storage layer, not with a read before the write.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn find_by_tx_id(&self, tx_id: &str) -> AppResult<Option<TransactionRecord>>;

    /// Insert a new record. Fails with `AppError::DuplicateKey` if the id exists.
    async fn save(&self, record: &TransactionRecord) -> AppResult<TransactionRecord>;
}

/// Ledger repository - Postgres-backed mirror of confirmed transactions
pub struct LedgerRepository {
    pub pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_db(value: u64, field: &str) -> AppResult<i64> {
    i64::try_from(value)
        .map_err(|_| AppError::Internal(format!("{} {} does not fit BIGINT", field, value)))
}

/// The unique index on `tx_id` is what enforces at-most-once storage.
fn insert_error(error: sqlx::Error, tx_id: &str) -> AppError {
    match error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::DuplicateKey(tx_id.to_string())
        }
        other => AppError::Database(other),
    }
}

#[async_trait]
impl TransactionStore for LedgerRepository {
    async fn find_by_tx_id(&self, tx_id: &str) -> AppResult<Option<TransactionRecord>> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT tx_id, amount, block, created_at
            FROM transactions
            WHERE tx_id = $1
            "#,
        )
        .bind(tx_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TransactionRecord::from))
    }

    async fn save(&self, record: &TransactionRecord) -> AppResult<TransactionRecord> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO transactions (tx_id, amount, block)
            VALUES ($1, $2, $3)
            RETURNING tx_id, amount, block, created_at
            "#,
        )
        .bind(&record.tx_id)
        .bind(to_db(record.amount, "amount")?)
        .bind(to_db(record.block.value(), "block")?)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| insert_error(e, &record.tx_id))?;

        info!(
            "Transaction saved: {} (block {}, at {})",
            row.tx_id, row.block, row.created_at
        );
        Ok(row.into())
    }
}
