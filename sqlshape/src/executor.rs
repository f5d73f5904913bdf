//! Statement execution and transactional batches

use crate::driver::Driver;
use sqlshape_core::{Binds, Error, Params, Prepared, Result, Statement};

/// Execute a statement and return the number of affected rows.
///
/// Unbound statements run as plain text. A single bind set is prepared and
/// executed once. A batch runs every bind set inside one transaction and
/// returns the summed count; any failure rolls the whole batch back.
pub async fn execute<D: Driver>(driver: &mut D, statement: &Statement) -> Result<u64> {
    match statement.params() {
        Params::None => driver.execute_unprepared(statement.sql()).await,
        Params::Single(binds) => {
            driver.prepare(statement.prepared()).await?;
            driver.execute(statement.prepared(), binds).await
        }
        Params::Batch(rows) => execute_batch(driver, statement.prepared(), rows).await,
    }
}

/// Run `rows` through one prepared statement inside a fresh transaction.
pub async fn execute_batch<D: Driver>(
    driver: &mut D,
    prepared: &Prepared,
    rows: &[Binds],
) -> Result<u64> {
    if driver.in_transaction() {
        return Err(Error::NestedTransaction);
    }

    driver.prepare(prepared).await?;
    transaction(driver, async |driver: &mut D| {
        let mut affected = 0;
        for binds in rows {
            affected += driver.execute(prepared, binds).await?;
        }
        Ok(affected)
    })
    .await
}

/// Run `f` inside a transaction on `driver`, committing on success.
///
/// On failure the transaction is rolled back and the original error is
/// returned; a failed rollback is only logged.
pub async fn transaction<D, F, T>(driver: &mut D, f: F) -> Result<T>
where
    D: Driver,
    F: AsyncFnOnce(&mut D) -> Result<T>,
{
    driver.begin().await?;

    match f(driver).await {
        Ok(result) => {
            driver.commit().await?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_error) = driver.rollback().await {
                tracing::warn!(
                    error = %rollback_error,
                    original = %e,
                    "rollback failed after batch error"
                );
            }
            Err(e)
        }
    }
}
