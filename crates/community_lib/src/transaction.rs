//! A tiny module wrapping multi-step mutations in an SQL transaction.

use sea_orm::{DatabaseTransaction, DbErr, TransactionTrait};

/// Wraps the call of the provided function with an SQL transaction.
///
/// The transaction commits if the function returns `Ok`, and rolls back before the
/// error is surfaced otherwise, so concurrent callers never observe a half-applied
/// state.
///
/// ## Arguments
///
/// * `conn`: the connection to the database.
/// * `f`: the function itself, receiving the open transaction. Every query of the
///   function must go through it, not through the outer connection.
pub async fn within<C, F, T, E>(conn: &C, f: F) -> Result<T, E>
where
    C: TransactionTrait,
    F: for<'a> AsyncFnOnce(&'a DatabaseTransaction) -> Result<T, E>,
    E: From<DbErr>,
{
    let txn = conn.begin().await?;

    match f(&txn).await {
        Ok(ret) => {
            txn.commit().await?;
            Ok(ret)
        }
        Err(e) => {
            txn.rollback().await?;
            Err(e)
        }
    }
}
