use log::debug;
use sqlx::PgConnection;

use super::AccrualStoreError;
use crate::db_types::ProductReward;

/// Insert a reward rule. The match substring is the natural key; a second
/// rule for the same substring is rejected with `KeyExists`.
pub async fn insert_product_reward(rule: &ProductReward, conn: &mut PgConnection) -> Result<(), AccrualStoreError> {
    let result = sqlx::query("INSERT INTO products (match, reward, reward_type) VALUES ($1, $2, $3)")
        .bind(&rule.matcher)
        .bind(rule.reward)
        .bind(&rule.reward_type)
        .execute(conn)
        .await;
    match result {
        Ok(_) => {
            debug!("🗃️ Reward rule [{}] registered: {} {}", rule.matcher, rule.reward, rule.reward_type);
            Ok(())
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AccrualStoreError::KeyExists),
        Err(e) => Err(e.into()),
    }
}

/// All reward rules, in no particular order.
pub async fn fetch_products(conn: &mut PgConnection) -> Result<Vec<ProductReward>, sqlx::Error> {
    let rules = sqlx::query_as("SELECT match, reward, reward_type FROM products").fetch_all(conn).await?;
    Ok(rules)
}
