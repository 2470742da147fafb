use chrono::NaiveDate;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use uuid::Uuid;
use validator::Validate;

use crate::audit::{LogEntry, LogStatus, LogType};
use crate::commands::{BasketAssignment, UpdateBagData};
use crate::error::{DeliveryError, Result};
use crate::qr;
use crate::read_model::{BagRow, OrderItemRow};
use crate::table::{Bags, OrderItems};

use super::NewItem;

impl super::OrderService {
    /// Diff-based quantity edit scoped to one future bag.
    ///
    /// A target of 0 removes every item of that meal type; a lower target
    /// drops the oldest excess; a higher target appends freshly stamped
    /// items. The address override is applied unconditionally.
    pub async fn update_bag_data(
        &self,
        bag_id: &str,
        payload: UpdateBagData,
        actor: &str,
        today: NaiveDate,
    ) -> Result<()> {
        payload.validate()?;

        let mut tx = self.pool().begin().await?;

        let bag = sqlx::query_as::<_, BagRow>("SELECT * FROM bags WHERE id = ?1")
            .bind(bag_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DeliveryError::not_found("bag", bag_id))?;

        if bag.delivery_at <= today {
            return Err(DeliveryError::FutureOnly(bag.id));
        }

        let items: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT * FROM order_items WHERE bag_id = ?1 ORDER BY created_at, id",
        )
        .bind(bag_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut to_delete: Vec<String> = Vec::new();
        let mut to_insert: Vec<NewItem> = Vec::new();

        for (meal_type, target) in payload.targets() {
            let existing: Vec<&OrderItemRow> = items
                .iter()
                .filter(|item| item.meal_type == meal_type.to_string())
                .collect();
            let current = existing.len() as i64;

            if target < current {
                let excess = (current - target) as usize;
                to_delete.extend(existing.iter().take(excess).map(|item| item.id.clone()));
            } else if target > current {
                for _ in current..target {
                    to_insert.push(NewItem {
                        id: Uuid::new_v4().to_string(),
                        order_id: bag.order_id.clone(),
                        bag_id: bag.id.clone(),
                        delivery_at: bag.delivery_at,
                        meal_type,
                        qrcode: bag
                            .no_remark_type
                            .then(|| qr::no_remark_code(bag.delivery_at, meal_type)),
                    });
                }
            }
        }

        if !to_delete.is_empty() {
            let statement = Query::delete()
                .from_table(OrderItems::Table)
                .and_where(Expr::col(OrderItems::Id).is_in(to_delete))
                .to_owned();
            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        }
        Self::insert_items(&mut tx, &to_insert).await?;

        let statement = Query::update()
            .table(Bags::Table)
            .value(Bags::Address, payload.address.clone())
            .value(Bags::UpdatedAt, Expr::cust("CURRENT_TIMESTAMP"))
            .and_where(Expr::col(Bags::Id).eq(bag_id))
            .to_owned();
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;

        tx.commit().await?;

        self.audit()
            .record(LogEntry {
                actor_id: actor.to_owned(),
                log_type: LogType::UpdateBag,
                detail: format!("bag {} on {}", bag.id, bag.delivery_at),
                status: LogStatus::Success,
                customer_id: None,
                bag_id: Some(bag.id.clone()),
            })
            .await;

        Ok(())
    }

    /// Staff assignment of bags into physical staging baskets. Labels are
    /// stripped of whitespace before storage.
    pub async fn update_basket(&self, assignments: &[BasketAssignment]) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        for assignment in assignments {
            let basket: String = assignment.basket.split_whitespace().collect();
            let statement = Query::update()
                .table(Bags::Table)
                .value(Bags::Basket, basket)
                .value(Bags::UpdatedAt, Expr::cust("CURRENT_TIMESTAMP"))
                .and_where(Expr::col(Bags::Id).eq(assignment.id.clone()))
                .to_owned();
            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Removes a single bag and its items. Items go first; the code never
    /// relies on implicit cascades.
    pub async fn delete_bag(&self, id: &str, actor: &str) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        let bag = sqlx::query_as::<_, BagRow>("SELECT * FROM bags WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DeliveryError::not_found("bag", id))?;

        sqlx::query("DELETE FROM order_items WHERE bag_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM bags WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.audit()
            .record(LogEntry {
                actor_id: actor.to_owned(),
                log_type: LogType::RemoveBag,
                detail: format!("bag {} on {}", bag.id, bag.delivery_at),
                status: LogStatus::Success,
                customer_id: None,
                bag_id: Some(bag.id.clone()),
            })
            .await;

        Ok(())
    }
}
