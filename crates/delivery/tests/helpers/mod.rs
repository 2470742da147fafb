#![allow(dead_code)]

use chrono::{NaiveDate, Weekday};
use delivery::commands::CreateOrder;
use delivery::read_model::{BagRow, OrderItemRow};
use delivery::types::DeliveryOn;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use temp_dir::TempDir;

/// Fresh on-disk database with the crate migrations applied. The TempDir
/// must stay alive for as long as the pool is used.
pub async fn setup_pool() -> anyhow::Result<(TempDir, SqlitePool)> {
    let dir = TempDir::new()?;
    let path = dir.child("mealdrop.sqlite3");
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&format!("sqlite://{}?mode=rwc", path.display()))
        .await?;

    delivery::MIGRATOR.run(&pool).await?;

    Ok((dir, pool))
}

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// Baseline no-remark subscription: Mon/Wed/Fri over 2024-01-01..2024-01-12
/// with one lunch per delivery.
pub fn mwf_lunch_order() -> CreateOrder {
    CreateOrder {
        customer_id: "cus-100".to_owned(),
        start_date: date("2024-01-01"),
        end_date: date("2024-01-12"),
        delivery_on: DeliveryOn::from_weekdays([Weekday::Mon, Weekday::Wed, Weekday::Fri]),
        prefer_breakfast: false,
        breakfast_count: 0,
        prefer_breakfast_snack: false,
        breakfast_snack_count: 0,
        prefer_lunch: true,
        lunch_count: 1,
        prefer_lunch_snack: false,
        lunch_snack_count: 0,
        prefer_dinner: false,
        dinner_count: 0,
        prefer_dinner_snack: false,
        dinner_snack_count: 0,
        remark: None,
        delivery_remark: None,
        address: Some("42 Rice Road".to_owned()),
        delivery_time: None,
    }
}

pub async fn add_holidays(pool: &SqlitePool, dates: &[&str]) -> anyhow::Result<()> {
    for d in dates {
        sqlx::query("INSERT OR IGNORE INTO holidays (date) VALUES (?1)")
            .bind(date(d))
            .execute(pool)
            .await?;
    }
    Ok(())
}

pub async fn bags_for_order(pool: &SqlitePool, order_id: &str) -> anyhow::Result<Vec<BagRow>> {
    Ok(
        sqlx::query_as("SELECT * FROM bags WHERE order_id = ?1 ORDER BY delivery_at")
            .bind(order_id)
            .fetch_all(pool)
            .await?,
    )
}

pub async fn items_for_order(
    pool: &SqlitePool,
    order_id: &str,
) -> anyhow::Result<Vec<OrderItemRow>> {
    Ok(sqlx::query_as(
        "SELECT * FROM order_items WHERE order_id = ?1 ORDER BY delivery_at, created_at, id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?)
}

pub async fn items_for_bag(pool: &SqlitePool, bag_id: &str) -> anyhow::Result<Vec<OrderItemRow>> {
    Ok(
        sqlx::query_as("SELECT * FROM order_items WHERE bag_id = ?1 ORDER BY created_at, id")
            .bind(bag_id)
            .fetch_all(pool)
            .await?,
    )
}
