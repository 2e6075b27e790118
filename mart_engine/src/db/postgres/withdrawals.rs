use sqlx::PgConnection;

use crate::db_types::{Balance, NewWithdrawal, Withdrawal};

/// Both totals come out of one statement, so the `current + withdrawn`
/// identity holds for any observed snapshot. Run it inside the withdraw
/// transaction to serialize against concurrent debits.
pub async fn fetch_balance(user_id: i64, conn: &mut PgConnection) -> Result<Balance, sqlx::Error> {
    let balance = sqlx::query_as(
        r#"
            SELECT
                COALESCE((
                    SELECT SUM(accrual)
                    FROM orders
                    WHERE user_id = $1 AND status = 'PROCESSED'
                ), 0)
                -
                COALESCE((
                    SELECT SUM(sum)
                    FROM withdrawals
                    WHERE user_id = $1
                ), 0) AS current,
                COALESCE((
                    SELECT SUM(sum)
                    FROM withdrawals
                    WHERE user_id = $1
                ), 0) AS withdrawn
        "#,
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(balance)
}

/// Appends a ledger row. No reference to the orders table: the debited order
/// number only needs to be Luhn-valid, which the HTTP boundary has checked.
pub async fn insert_withdrawal(
    user_id: i64,
    withdrawal: &NewWithdrawal,
    conn: &mut PgConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO withdrawals (user_id, order_number, sum) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(&withdrawal.order)
        .bind(withdrawal.sum.value())
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn fetch_withdrawals(user_id: i64, conn: &mut PgConnection) -> Result<Vec<Withdrawal>, sqlx::Error> {
    let withdrawals = sqlx::query_as(
        r#"
            SELECT order_number, sum, processed_at
            FROM withdrawals
            WHERE user_id = $1
            ORDER BY processed_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(withdrawals)
}
