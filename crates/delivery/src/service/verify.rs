use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;

use crate::audit::{LogEntry, LogStatus, LogType};
use crate::commands::{VerifyBag, VerifyOrderItem};
use crate::error::{DeliveryError, Result};
use crate::read_model::BagRow;
use crate::table::OrderItems;

impl super::OrderService {
    /// Item-in-bag verification at scan time.
    ///
    /// Succeeds only when the scanned item id exists under a bag sharing
    /// the scanned bag code. Replaying the call re-evaluates from the
    /// persisted state and overwrites the flag.
    pub async fn verify_order_item(&self, payload: VerifyOrderItem, actor: &str) -> Result<()> {
        let bag_ids: Vec<(String,)> = sqlx::query_as("SELECT id FROM bags WHERE qr_code = ?1")
            .bind(&payload.bag_code)
            .fetch_all(self.pool())
            .await?;

        if bag_ids.is_empty() {
            self.audit()
                .record(LogEntry {
                    actor_id: actor.to_owned(),
                    log_type: LogType::CheckBox,
                    detail: format!("unknown bag code {}", payload.bag_code),
                    status: LogStatus::Fail,
                    customer_id: None,
                    bag_id: None,
                })
                .await;
            return Err(DeliveryError::not_found("bag", payload.bag_code.clone()));
        }

        let statement = Query::select()
            .column(OrderItems::Id)
            .from(OrderItems::Table)
            .and_where(Expr::col(OrderItems::Id).eq(payload.order_item_id.clone()))
            .and_where(
                Expr::col(OrderItems::BagId).is_in(bag_ids.into_iter().map(|(id,)| id)),
            )
            .to_owned();
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let found: Option<(String,)> = sqlx::query_as_with(&sql, values)
            .fetch_optional(self.pool())
            .await?;

        let in_bag = found.is_some();
        sqlx::query("UPDATE order_items SET in_bag_status = ?1 WHERE id = ?2")
            .bind(in_bag)
            .bind(&payload.order_item_id)
            .execute(self.pool())
            .await?;

        self.audit()
            .record(LogEntry {
                actor_id: actor.to_owned(),
                log_type: LogType::CheckBox,
                detail: format!(
                    "item {} against bag code {}",
                    payload.order_item_id, payload.bag_code
                ),
                status: if in_bag {
                    LogStatus::Success
                } else {
                    LogStatus::Fail
                },
                customer_id: None,
                bag_id: None,
            })
            .await;

        if in_bag {
            Ok(())
        } else {
            Err(DeliveryError::not_found(
                "order item",
                payload.order_item_id.clone(),
            ))
        }
    }

    /// Bag-in-basket verification at scan time.
    ///
    /// The supplied basket label must match the stored label of a bag
    /// carrying the code; the outcome is written to every bag in the scan
    /// group, overwriting any previous verification.
    pub async fn verify_bag(&self, payload: VerifyBag, actor: &str) -> Result<()> {
        let bags: Vec<BagRow> = sqlx::query_as("SELECT * FROM bags WHERE qr_code = ?1")
            .bind(&payload.bag_code)
            .fetch_all(self.pool())
            .await?;

        if bags.is_empty() {
            self.audit()
                .record(LogEntry {
                    actor_id: actor.to_owned(),
                    log_type: LogType::CheckBag,
                    detail: format!("unknown bag code {}", payload.bag_code),
                    status: LogStatus::Fail,
                    customer_id: None,
                    bag_id: None,
                })
                .await;
            return Err(DeliveryError::not_found("bag", payload.bag_code.clone()));
        }

        let matched = bags
            .iter()
            .any(|bag| bag.basket.as_deref() == Some(payload.basket.as_str()));

        sqlx::query(
            "UPDATE bags SET in_basket_status = ?1, updated_at = CURRENT_TIMESTAMP WHERE qr_code = ?2",
        )
        .bind(matched)
        .bind(&payload.bag_code)
        .execute(self.pool())
        .await?;

        self.audit()
            .record(LogEntry {
                actor_id: actor.to_owned(),
                log_type: LogType::CheckBag,
                detail: format!(
                    "bag group {} against basket {}",
                    payload.bag_code, payload.basket
                ),
                status: if matched {
                    LogStatus::Success
                } else {
                    LogStatus::Fail
                },
                customer_id: None,
                bag_id: Some(bags[0].id.clone()),
            })
            .await;

        if matched {
            Ok(())
        } else {
            Err(DeliveryError::ScanMismatch)
        }
    }
}
