use log::{debug, trace};
use lp_common::Points;
use sqlx::PgConnection;

use crate::{
    db_types::{CreateOrderOutcome, Job, MartOrder, OrderStatus},
    traits::MartStoreError,
};

/// One statement settles who owns the number: insert wins the row, otherwise
/// the existing owner decides between `duplicate` and `conflict`. A successful
/// insert fires the `new_orders` trigger as part of the same statement, so a
/// listener that sees the notification always finds the row committed.
const CREATE_ORDER: &str = r#"
    WITH inserted AS (
        INSERT INTO orders (user_id, number, status)
        VALUES ($1, $2, 'NEW')
        ON CONFLICT (number) DO NOTHING
        RETURNING uid
    ),
    existing AS (
        SELECT user_id FROM orders WHERE number = $2
    )
    SELECT CASE
        WHEN EXISTS (SELECT 1 FROM inserted) THEN 'inserted'
        WHEN EXISTS (SELECT 1 FROM existing WHERE user_id = $1) THEN 'duplicate'
        WHEN EXISTS (SELECT 1 FROM existing) THEN 'conflict'
        ELSE 'not_found'
    END AS outcome
"#;

pub async fn create_order(
    user_id: i64,
    number: &str,
    conn: &mut PgConnection,
) -> Result<CreateOrderOutcome, MartStoreError> {
    let (outcome,): (String,) = sqlx::query_as(CREATE_ORDER).bind(user_id).bind(number).fetch_one(conn).await?;
    let outcome: CreateOrderOutcome =
        outcome.parse().map_err(|_| MartStoreError::UnexpectedOutcome(outcome.clone()))?;
    trace!("🗃️ create_order({user_id}, {number}) -> {outcome:?}");
    Ok(outcome)
}

/// All orders of the user, newest upload first.
pub async fn fetch_orders(user_id: i64, conn: &mut PgConnection) -> Result<Vec<MartOrder>, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
            SELECT uid, user_id, number, status, accrual, uploaded_at
            FROM orders
            WHERE user_id = $1
            ORDER BY uploaded_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

/// The startup replay query: every order still in `NEW`, oldest first, shaped
/// as the same [`Job`] the notification channel delivers.
pub async fn fetch_pending_jobs(conn: &mut PgConnection) -> Result<Vec<Job>, sqlx::Error> {
    let jobs = sqlx::query_as(
        r#"
            SELECT uid AS order_id, user_id, number, status, uploaded_at AS created_at
            FROM orders
            WHERE status = 'NEW'
            ORDER BY uploaded_at ASC
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(jobs)
}

/// Persist the outcome reported by the accrual service for one order.
/// Errors out when the row has vanished, since the processing task would
/// otherwise poll forever on a dangling uid.
pub async fn record_accrual_outcome(
    uid: i64,
    status: OrderStatus,
    accrual: Points,
    conn: &mut PgConnection,
) -> Result<(), MartStoreError> {
    let result = sqlx::query("UPDATE orders SET status = $1, accrual = $2, uploaded_at = NOW() WHERE uid = $3")
        .bind(status)
        .bind(accrual.value())
        .bind(uid)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(MartStoreError::UnexpectedOutcome(format!("order uid {uid} not found")));
    }
    debug!("🗃️ Order uid {uid} updated: status={status}, accrual={accrual}");
    Ok(())
}
