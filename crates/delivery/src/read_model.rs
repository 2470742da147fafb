use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use sea_query::{Asterisk, Expr, ExprTrait, Func, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::SqlitePool;
use sqlx::prelude::FromRow;

use crate::commands::{ListBags, ListOrders};
use crate::error::{DeliveryError, Result};
use crate::table::{Bags, OrderItems, Orders};
use crate::types::{DeliveryOn, MealType};

/// Subscription data from the `orders` table.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: String,
    pub customer_id: String,
    pub address: Option<String>,
    pub remark: Option<String>,
    pub delivery_remark: Option<String>,
    pub delivery_time: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub delivery_on: String, // JSON
    pub prefer_breakfast: bool,
    pub breakfast_count: i64,
    pub prefer_breakfast_snack: bool,
    pub breakfast_snack_count: i64,
    pub prefer_lunch: bool,
    pub lunch_count: i64,
    pub prefer_lunch_snack: bool,
    pub lunch_snack_count: i64,
    pub prefer_dinner: bool,
    pub dinner_count: i64,
    pub prefer_dinner_snack: bool,
    pub dinner_snack_count: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl OrderRow {
    pub fn delivery_days(&self) -> DeliveryOn {
        serde_json::from_str(&self.delivery_on).unwrap_or_default()
    }

    /// No-remark orders are grouped under weekly shared bag codes and their
    /// items carry deterministic label codes.
    pub fn no_remark_type(&self) -> bool {
        self.remark.as_deref().map(str::trim).unwrap_or("").is_empty()
    }

    /// Meal types that actually generate items: toggle on and count > 0.
    /// A count without its toggle is ignored.
    pub fn enabled_counts(&self) -> Vec<(MealType, i64)> {
        [
            (MealType::Breakfast, self.prefer_breakfast, self.breakfast_count),
            (
                MealType::BreakfastSnack,
                self.prefer_breakfast_snack,
                self.breakfast_snack_count,
            ),
            (MealType::Lunch, self.prefer_lunch, self.lunch_count),
            (MealType::LunchSnack, self.prefer_lunch_snack, self.lunch_snack_count),
            (MealType::Dinner, self.prefer_dinner, self.dinner_count),
            (MealType::DinnerSnack, self.prefer_dinner_snack, self.dinner_snack_count),
        ]
        .into_iter()
        .filter(|(_, prefer, count)| *prefer && *count > 0)
        .map(|(meal_type, _, count)| (meal_type, count))
        .collect()
    }
}

/// One physical per-date delivery package.
#[derive(Debug, Clone, FromRow)]
pub struct BagRow {
    pub id: String,
    pub order_id: String,
    pub delivery_at: NaiveDate,
    pub no_remark_type: bool,
    pub address: Option<String>,
    pub qr_code: String,
    pub basket: Option<String>,
    pub in_basket_status: Option<bool>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// One trackable meal unit inside a bag.
#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
    pub id: String,
    pub order_id: String,
    pub bag_id: String,
    pub delivery_at: NaiveDate,
    pub meal_type: String,
    pub qrcode: Option<String>,
    pub in_bag_status: Option<bool>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct BagWithItems {
    pub bag: BagRow,
    pub items: Vec<OrderItemRow>,
}

/// Merged view of the bags sharing one scan code, as presented to packing
/// staff. Groups have no persisted identity; they are computed from
/// `qr_code` equality at read time.
#[derive(Debug, Clone)]
pub struct BagGroupView {
    pub delivery_at: String,
    pub qr_code: String,
    pub order_id: String,
    pub address: Option<String>,
    pub no_remark_type: bool,
    pub basket: Option<String>,
    pub in_basket_status: Option<bool>,
    pub items: Vec<OrderItemRow>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MealTypeTotal {
    pub meal_type: String,
    pub total: i64,
}

/// Query methods over the persisted schedule.
pub struct DeliveryQueries;

impl DeliveryQueries {
    pub async fn get_order(pool: &SqlitePool, id: &str) -> Result<OrderRow> {
        sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DeliveryError::not_found("order", id))
    }

    pub async fn list_orders(
        pool: &SqlitePool,
        filter: &ListOrders,
    ) -> Result<(Vec<OrderRow>, i64)> {
        let mut base = Query::select().from(Orders::Table).to_owned();

        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            base.and_where(Expr::col(Orders::StartDate).lte(end.to_string()))
                .and_where(Expr::col(Orders::EndDate).gte(start.to_string()));
        }
        if let Some(customer_id) = &filter.customer_id {
            base.and_where(Expr::col(Orders::CustomerId).eq(customer_id.clone()));
        }

        let mut count_statement = base.clone();
        count_statement.expr(Func::count(Expr::col((Orders::Table, Orders::Id))));
        let (sql, values) = count_statement.build_sqlx(SqliteQueryBuilder);
        let (count,): (i64,) = sqlx::query_as_with(&sql, values).fetch_one(pool).await?;

        base.column(Asterisk)
            .order_by(Orders::CreatedAt, Order::Desc)
            .limit(filter.limit.unwrap_or(20))
            .offset(filter.offset.unwrap_or(0));
        let (sql, values) = base.build_sqlx(SqliteQueryBuilder);
        let orders = sqlx::query_as_with::<_, OrderRow, _>(&sql, values)
            .fetch_all(pool)
            .await?;

        Ok((orders, count))
    }

    /// Paged bag listing joined with item rows. A meal-type filter keeps
    /// only bags holding at least one item of that type, and narrows the
    /// attached items to that type.
    pub async fn list_bags(
        pool: &SqlitePool,
        filter: &ListBags,
    ) -> Result<(Vec<BagWithItems>, i64)> {
        let mut base = Query::select().from(Bags::Table).to_owned();

        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            base.and_where(Expr::col(Bags::DeliveryAt).gte(start.to_string()))
                .and_where(Expr::col(Bags::DeliveryAt).lte(end.to_string()));
        }
        if let Some(customer_id) = &filter.customer_id {
            base.and_where(
                Expr::col(Bags::OrderId).in_subquery(
                    Query::select()
                        .column(Orders::Id)
                        .from(Orders::Table)
                        .and_where(Expr::col(Orders::CustomerId).eq(customer_id.clone()))
                        .to_owned(),
                ),
            );
        }
        if let Some(meal_type) = filter.meal_type {
            base.and_where(Expr::exists(
                Query::select()
                    .expr(Expr::val(1))
                    .from(OrderItems::Table)
                    .and_where(
                        Expr::col((OrderItems::Table, OrderItems::BagId))
                            .equals((Bags::Table, Bags::Id)),
                    )
                    .and_where(Expr::col(OrderItems::MealType).eq(meal_type.to_string()))
                    .to_owned(),
            ));
        }

        let mut count_statement = base.clone();
        count_statement.expr(Func::count(Expr::col((Bags::Table, Bags::Id))));
        let (sql, values) = count_statement.build_sqlx(SqliteQueryBuilder);
        let (count,): (i64,) = sqlx::query_as_with(&sql, values).fetch_one(pool).await?;

        base.column(Asterisk)
            .order_by(Bags::DeliveryAt, Order::Asc)
            .limit(filter.limit.unwrap_or(20))
            .offset(filter.offset.unwrap_or(0));
        let (sql, values) = base.build_sqlx(SqliteQueryBuilder);
        let bags = sqlx::query_as_with::<_, BagRow, _>(&sql, values)
            .fetch_all(pool)
            .await?;

        let items = Self::items_for_bags(
            pool,
            bags.iter().map(|bag| bag.id.clone()).collect(),
            filter.meal_type,
        )
        .await?;
        let mut by_bag: HashMap<String, Vec<OrderItemRow>> = HashMap::new();
        for item in items {
            by_bag.entry(item.bag_id.clone()).or_default().push(item);
        }

        let bags = bags
            .into_iter()
            .map(|bag| {
                let items = by_bag.remove(&bag.id).unwrap_or_default();
                BagWithItems { bag, items }
            })
            .collect();

        Ok((bags, count))
    }

    pub async fn get_bag(pool: &SqlitePool, id: &str) -> Result<BagWithItems> {
        let bag = sqlx::query_as::<_, BagRow>("SELECT * FROM bags WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DeliveryError::not_found("bag", id))?;

        let items = sqlx::query_as::<_, OrderItemRow>(
            "SELECT * FROM order_items WHERE bag_id = ?1 ORDER BY created_at, id",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(BagWithItems { bag, items })
    }

    /// Resolves a scanned code to its bag group. A two-bag group is merged
    /// into one view labelled with both dates; larger or single groups
    /// present the earliest bag.
    pub async fn get_bag_by_qr_code(pool: &SqlitePool, code: &str) -> Result<BagGroupView> {
        let bags = sqlx::query_as::<_, BagRow>(
            "SELECT * FROM bags WHERE qr_code = ?1 ORDER BY delivery_at, id",
        )
        .bind(code)
        .fetch_all(pool)
        .await?;

        if bags.is_empty() {
            return Err(DeliveryError::not_found("bag", code));
        }

        let (delivery_at, item_bags) = if bags.len() == 2 {
            (
                format!("{} - {}", bags[0].delivery_at, bags[1].delivery_at),
                &bags[..],
            )
        } else {
            (bags[0].delivery_at.to_string(), &bags[..1])
        };

        let items = Self::items_for_bags(
            pool,
            item_bags.iter().map(|bag| bag.id.clone()).collect(),
            None,
        )
        .await?;

        let first = &bags[0];
        Ok(BagGroupView {
            delivery_at,
            qr_code: first.qr_code.clone(),
            order_id: first.order_id.clone(),
            address: first.address.clone(),
            no_remark_type: first.no_remark_type,
            basket: first.basket.clone(),
            in_basket_status: first.in_basket_status,
            items,
        })
    }

    /// Per-meal-type item totals over an inclusive delivery-date range.
    pub async fn item_summary(
        pool: &SqlitePool,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MealTypeTotal>> {
        let totals = sqlx::query_as::<_, MealTypeTotal>(
            r#"
            SELECT meal_type, COUNT(*) AS total
            FROM order_items
            WHERE delivery_at BETWEEN ?1 AND ?2
            GROUP BY meal_type
            ORDER BY meal_type
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(totals)
    }

    async fn items_for_bags(
        pool: &SqlitePool,
        bag_ids: Vec<String>,
        meal_type: Option<MealType>,
    ) -> Result<Vec<OrderItemRow>> {
        if bag_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut statement = Query::select()
            .column(Asterisk)
            .from(OrderItems::Table)
            .and_where(Expr::col(OrderItems::BagId).is_in(bag_ids))
            .order_by(OrderItems::CreatedAt, Order::Asc)
            .order_by(OrderItems::Id, Order::Asc)
            .to_owned();
        if let Some(meal_type) = meal_type {
            statement.and_where(Expr::col(OrderItems::MealType).eq(meal_type.to_string()));
        }

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let items = sqlx::query_as_with::<_, OrderItemRow, _>(&sql, values)
            .fetch_all(pool)
            .await?;

        Ok(items)
    }
}
