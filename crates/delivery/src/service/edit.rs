use chrono::NaiveDate;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use validator::Validate;

use crate::audit::{LogEntry, LogStatus, LogType};
use crate::commands::UpdateOrder;
use crate::error::{DeliveryError, Result};
use crate::table::{Bags, OrderItems, Orders};

impl super::OrderService {
    /// Applies new subscription preferences and rebuilds the strictly
    /// future portion of the schedule.
    ///
    /// Bags with `delivery_at > today` are deleted (items first) and
    /// recreated from the same already-resolved delivery dates, so
    /// holiday shifts survive the edit. Past deliveries are an immutable
    /// record and are never touched.
    pub async fn update_order(
        &self,
        id: &str,
        payload: UpdateOrder,
        actor: &str,
        today: NaiveDate,
    ) -> Result<()> {
        payload.validate()?;

        let mut tx = self.pool().begin().await?;

        let statement = Query::update()
            .table(Orders::Table)
            .value(Orders::PreferBreakfast, payload.prefer_breakfast)
            .value(Orders::BreakfastCount, payload.breakfast_count)
            .value(Orders::PreferBreakfastSnack, payload.prefer_breakfast_snack)
            .value(Orders::BreakfastSnackCount, payload.breakfast_snack_count)
            .value(Orders::PreferLunch, payload.prefer_lunch)
            .value(Orders::LunchCount, payload.lunch_count)
            .value(Orders::PreferLunchSnack, payload.prefer_lunch_snack)
            .value(Orders::LunchSnackCount, payload.lunch_snack_count)
            .value(Orders::PreferDinner, payload.prefer_dinner)
            .value(Orders::DinnerCount, payload.dinner_count)
            .value(Orders::PreferDinnerSnack, payload.prefer_dinner_snack)
            .value(Orders::DinnerSnackCount, payload.dinner_snack_count)
            .value(Orders::Remark, payload.remark.clone())
            .value(Orders::DeliveryRemark, payload.delivery_remark.clone())
            .value(Orders::Address, payload.address.clone())
            .value(Orders::UpdatedAt, Expr::cust("CURRENT_TIMESTAMP"))
            .and_where(Expr::col(Orders::Id).eq(id))
            .to_owned();
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let updated = sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        if updated.rows_affected() == 0 {
            return Err(DeliveryError::not_found("order", id));
        }

        let order = Self::fetch_order(&mut tx, id).await?;

        let future: Vec<(String, NaiveDate)> = sqlx::query_as(
            "SELECT id, delivery_at FROM bags WHERE order_id = ?1 AND delivery_at > ?2",
        )
        .bind(id)
        .bind(today)
        .fetch_all(&mut *tx)
        .await?;

        let bag_ids: Vec<String> = future.iter().map(|(bag_id, _)| bag_id.clone()).collect();
        let mut dates: Vec<NaiveDate> = future.into_iter().map(|(_, date)| date).collect();
        dates.sort();

        if !bag_ids.is_empty() {
            let statement = Query::delete()
                .from_table(OrderItems::Table)
                .and_where(Expr::col(OrderItems::BagId).is_in(bag_ids.clone()))
                .to_owned();
            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *tx).await?;

            let statement = Query::delete()
                .from_table(Bags::Table)
                .and_where(Expr::col(Bags::Id).is_in(bag_ids))
                .to_owned();
            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        }

        let no_remark_type = order.no_remark_type();
        let bags = Self::insert_bags(&mut tx, &order, &dates, no_remark_type).await?;
        let items = Self::build_items(&order, &dates, &bags, no_remark_type)?;
        Self::insert_items(&mut tx, &items).await?;

        tx.commit().await?;

        self.audit()
            .record(LogEntry {
                actor_id: actor.to_owned(),
                log_type: LogType::UpdateOrder,
                detail: format!("order {} rebuilt {} future deliveries", order.id, dates.len()),
                status: LogStatus::Success,
                customer_id: Some(order.customer_id.clone()),
                bag_id: None,
            })
            .await;

        tracing::info!(order_id = %order.id, rebuilt = dates.len(), "order updated");

        Ok(())
    }
}
