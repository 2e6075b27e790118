use log::debug;
use lp_common::Points;
use sqlx::PgConnection;

use super::AccrualStoreError;
use crate::db_types::{AccrualInfo, AccrualOrderStatus, GoodsLine, MatchLine};

/// Insert an order with its goods lines in `REGISTERED` state. The goods
/// arrive as parallel description/price arrays and are assembled into the
/// composite array inside the statement.
pub async fn insert_order(order_id: i64, goods: &[GoodsLine], conn: &mut PgConnection) -> Result<(), AccrualStoreError> {
    let descriptions: Vec<String> = goods.iter().map(|g| g.description.clone()).collect();
    let prices: Vec<f64> = goods.iter().map(|g| g.price).collect();
    let result = sqlx::query(
        r#"
            INSERT INTO orders_accrual (order_id, goods, status)
            VALUES ($1,
                    ARRAY(SELECT ROW(d, p)::goods
                          FROM UNNEST($2::text[], $3::double precision[]) AS t(d, p)),
                    'REGISTERED')
        "#,
    )
    .bind(order_id)
    .bind(&descriptions)
    .bind(&prices)
    .execute(conn)
    .await;
    match result {
        Ok(_) => {
            debug!("🗃️ Order [{order_id}] registered with {} goods lines", goods.len());
            Ok(())
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AccrualStoreError::KeyExists),
        Err(e) => Err(e.into()),
    }
}

pub async fn order_exists(order_id: i64, conn: &mut PgConnection) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM orders_accrual WHERE order_id = $1)")
        .bind(order_id)
        .fetch_one(conn)
        .await?;
    Ok(exists)
}

pub async fn fetch_accrual_info(order_id: i64, conn: &mut PgConnection) -> Result<Option<AccrualInfo>, sqlx::Error> {
    let info = sqlx::query_as("SELECT order_id, status, accrual FROM orders_accrual WHERE order_id = $1")
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(info)
}

/// Every `(order_id, price)` pair whose goods description contains the match
/// substring, restricted to orders the matcher may still touch.
pub async fn match_lines(pattern: &str, conn: &mut PgConnection) -> Result<Vec<MatchLine>, sqlx::Error> {
    let lines = sqlx::query_as(
        r#"
            SELECT order_id, (g).price AS price
            FROM orders_accrual, UNNEST(goods) AS g
            WHERE (g).description LIKE $1 AND status NOT IN ('INVALID', 'PROCESSED')
        "#,
    )
    .bind(format!("%{pattern}%"))
    .fetch_all(conn)
    .await?;
    Ok(lines)
}

/// Ids of all orders still awaiting a matcher decision.
pub async fn fetch_unfinished(conn: &mut PgConnection) -> Result<Vec<i64>, sqlx::Error> {
    let rows: Vec<(i64,)> =
        sqlx::query_as("SELECT order_id FROM orders_accrual WHERE status NOT IN ('INVALID', 'PROCESSED')")
            .fetch_all(conn)
            .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Write the final award and status for one order.
pub async fn record_accrual(
    order_id: i64,
    accrual: Points,
    status: AccrualOrderStatus,
    conn: &mut PgConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders_accrual SET accrual = $1, status = $2 WHERE order_id = $3")
        .bind(accrual.value())
        .bind(status)
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Status-only update, used to park Luhn-invalid orders as `INVALID`.
pub async fn set_status(order_id: i64, status: AccrualOrderStatus, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders_accrual SET status = $1 WHERE order_id = $2")
        .bind(status)
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(())
}
