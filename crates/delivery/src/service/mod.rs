mod bag;
mod edit;
mod verify;

use chrono::{Days, NaiveDate};
use sea_query::{Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;
use validator::Validate;

use crate::audit::{LogEntry, LogStatus, LogType, Recorder};
use crate::calendar;
use crate::commands::CreateOrder;
use crate::error::{DeliveryError, Result};
use crate::grouping;
use crate::holiday::{self, HOLIDAY_LOOKAHEAD_DAYS};
use crate::qr;
use crate::read_model::OrderRow;
use crate::table::{Bags, OrderItems, Orders};
use crate::types::MealType;

/// Items are written in fixed-size batches to bound statement size; the
/// surrounding transaction keeps the whole operation all-or-nothing.
const ITEM_INSERT_BATCH: usize = 200;

/// Orchestrates subscription scheduling and the fulfillment mutations that
/// operate on the persisted plan.
#[derive(Clone)]
pub struct OrderService {
    pool: SqlitePool,
    audit: Recorder,
}

pub(crate) struct NewBag {
    pub id: String,
    pub delivery_at: NaiveDate,
    pub qr_code: String,
}

pub(crate) struct NewItem {
    pub id: String,
    pub order_id: String,
    pub bag_id: String,
    pub delivery_at: NaiveDate,
    pub meal_type: MealType,
    pub qrcode: Option<&'static str>,
}

impl OrderService {
    pub fn new(pool: SqlitePool) -> Self {
        let audit = Recorder::new(pool.clone());
        Self { pool, audit }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(crate) fn audit(&self) -> &Recorder {
        &self.audit
    }

    /// Persists a new subscription and materializes its full delivery
    /// schedule in one transaction.
    pub async fn create_order(&self, payload: CreateOrder, actor: &str) -> Result<OrderRow> {
        payload.validate()?;

        let id = Uuid::new_v4().to_string();
        let delivery_on =
            serde_json::to_string(&payload.delivery_on).unwrap_or_else(|_| "{}".to_owned());

        let mut tx = self.pool.begin().await?;

        let statement = Query::insert()
            .into_table(Orders::Table)
            .columns([
                Orders::Id,
                Orders::CustomerId,
                Orders::Address,
                Orders::Remark,
                Orders::DeliveryRemark,
                Orders::DeliveryTime,
                Orders::StartDate,
                Orders::EndDate,
                Orders::DeliveryOn,
                Orders::PreferBreakfast,
                Orders::BreakfastCount,
                Orders::PreferBreakfastSnack,
                Orders::BreakfastSnackCount,
                Orders::PreferLunch,
                Orders::LunchCount,
                Orders::PreferLunchSnack,
                Orders::LunchSnackCount,
                Orders::PreferDinner,
                Orders::DinnerCount,
                Orders::PreferDinnerSnack,
                Orders::DinnerSnackCount,
            ])
            .values_panic([
                id.clone().into(),
                payload.customer_id.clone().into(),
                payload.address.clone().into(),
                payload.remark.clone().into(),
                payload.delivery_remark.clone().into(),
                payload.delivery_time.clone().into(),
                payload.start_date.to_string().into(),
                payload.end_date.to_string().into(),
                delivery_on.into(),
                payload.prefer_breakfast.into(),
                payload.breakfast_count.into(),
                payload.prefer_breakfast_snack.into(),
                payload.breakfast_snack_count.into(),
                payload.prefer_lunch.into(),
                payload.lunch_count.into(),
                payload.prefer_lunch_snack.into(),
                payload.lunch_snack_count.into(),
                payload.prefer_dinner.into(),
                payload.dinner_count.into(),
                payload.prefer_dinner_snack.into(),
                payload.dinner_snack_count.into(),
            ])
            .to_owned();
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values)
            .execute(&mut *tx)
            .await
            .map_err(DeliveryError::from_insert)?;

        let order = Self::fetch_order(&mut tx, &id).await?;
        let no_remark_type = order.no_remark_type();

        let dates = calendar::generate_delivery_dates(
            &order.delivery_days(),
            order.start_date,
            order.end_date,
        );
        let holidays = holiday::fetch_range(
            &mut *tx,
            order.start_date,
            order.end_date + Days::new(HOLIDAY_LOOKAHEAD_DAYS),
        )
        .await?;
        let resolved = holiday::resolve_dates(&dates, &holidays);

        let bags = Self::insert_bags(&mut tx, &order, &resolved, no_remark_type).await?;
        let items = Self::build_items(&order, &resolved, &bags, no_remark_type)?;
        Self::insert_items(&mut tx, &items).await?;

        tx.commit().await?;

        self.audit
            .record(LogEntry {
                actor_id: actor.to_owned(),
                log_type: LogType::CreateOrder,
                detail: format!("order {} scheduled {} deliveries", order.id, resolved.len()),
                status: LogStatus::Success,
                customer_id: Some(order.customer_id.clone()),
                bag_id: None,
            })
            .await;

        tracing::info!(order_id = %order.id, deliveries = resolved.len(), "order created");

        Ok(order)
    }

    pub(crate) async fn fetch_order(conn: &mut SqliteConnection, id: &str) -> Result<OrderRow> {
        sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DeliveryError::not_found("order", id))
    }

    /// One bag per resolved date; dates in the same weekly bucket carry the
    /// bucket's shared scan code.
    pub(crate) async fn insert_bags(
        conn: &mut SqliteConnection,
        order: &OrderRow,
        dates: &[NaiveDate],
        no_remark_type: bool,
    ) -> Result<Vec<NewBag>> {
        if dates.is_empty() {
            return Ok(Vec::new());
        }

        let codes = grouping::assign_scan_codes(dates, no_remark_type);
        let bags: Vec<NewBag> = dates
            .iter()
            .map(|&date| NewBag {
                id: Uuid::new_v4().to_string(),
                delivery_at: date,
                qr_code: codes[&date].clone(),
            })
            .collect();

        let mut statement = Query::insert()
            .into_table(Bags::Table)
            .columns([
                Bags::Id,
                Bags::OrderId,
                Bags::DeliveryAt,
                Bags::NoRemarkType,
                Bags::Address,
                Bags::QrCode,
            ])
            .to_owned();
        for bag in &bags {
            statement.values_panic([
                bag.id.clone().into(),
                order.id.clone().into(),
                bag.delivery_at.to_string().into(),
                no_remark_type.into(),
                order.address.clone().into(),
                bag.qr_code.clone().into(),
            ]);
        }
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *conn).await?;

        Ok(bags)
    }

    /// Fans the order's per-meal-type counts out into one row per physical
    /// meal unit, bound to the bag of its delivery date.
    pub(crate) fn build_items(
        order: &OrderRow,
        dates: &[NaiveDate],
        bags: &[NewBag],
        no_remark_type: bool,
    ) -> Result<Vec<NewItem>> {
        let by_date: std::collections::HashMap<NaiveDate, &NewBag> =
            bags.iter().map(|bag| (bag.delivery_at, bag)).collect();

        let mut items = Vec::new();
        for (meal_type, count) in order.enabled_counts() {
            for &date in dates {
                let bag = by_date
                    .get(&date)
                    .ok_or_else(|| DeliveryError::not_found("bag", date.to_string()))?;
                for _ in 0..count {
                    items.push(NewItem {
                        id: Uuid::new_v4().to_string(),
                        order_id: order.id.clone(),
                        bag_id: bag.id.clone(),
                        delivery_at: date,
                        meal_type,
                        qrcode: no_remark_type.then(|| qr::no_remark_code(date, meal_type)),
                    });
                }
            }
        }

        Ok(items)
    }

    pub(crate) async fn insert_items(
        conn: &mut SqliteConnection,
        items: &[NewItem],
    ) -> Result<()> {
        for batch in items.chunks(ITEM_INSERT_BATCH) {
            let mut statement = Query::insert()
                .into_table(OrderItems::Table)
                .columns([
                    OrderItems::Id,
                    OrderItems::OrderId,
                    OrderItems::BagId,
                    OrderItems::DeliveryAt,
                    OrderItems::MealType,
                    OrderItems::Qrcode,
                ])
                .to_owned();
            for item in batch {
                statement.values_panic([
                    item.id.clone().into(),
                    item.order_id.clone().into(),
                    item.bag_id.clone().into(),
                    item.delivery_at.to_string().into(),
                    item.meal_type.to_string().into(),
                    item.qrcode.map(str::to_owned).into(),
                ]);
            }
            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *conn).await?;
        }

        Ok(())
    }
}
