use chrono::{NaiveDate, NaiveDateTime};
use sea_query::{Asterisk, Expr, ExprTrait, Func, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::SqlitePool;
use sqlx::prelude::FromRow;
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::error::Result;
use crate::table::Logs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum LogType {
    CreateOrder,
    UpdateOrder,
    UpdateBag,
    RemoveBag,
    CheckBox,
    CheckBag,
    UpdateHoliday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum LogStatus {
    Success,
    Fail,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub actor_id: String,
    pub log_type: LogType,
    pub detail: String,
    pub status: LogStatus,
    pub customer_id: Option<String>,
    pub bag_id: Option<String>,
}

/// Fire-and-forget audit sink over the `logs` table.
///
/// Recording never fails the calling operation; insert errors are logged
/// and swallowed.
#[derive(Clone)]
pub struct Recorder {
    pool: SqlitePool,
}

impl Recorder {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, entry: LogEntry) {
        if let Err(err) = self.insert(&entry).await {
            tracing::warn!(
                err = %err,
                log_type = %entry.log_type,
                "failed to record audit log"
            );
        }
    }

    async fn insert(&self, entry: &LogEntry) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO logs (id, user_id, customer_id, bag_id, type, detail, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&entry.actor_id)
        .bind(&entry.customer_id)
        .bind(&entry.bag_id)
        .bind(entry.log_type.to_string())
        .bind(&entry.detail)
        .bind(entry.status.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct LogRow {
    pub id: String,
    pub user_id: String,
    pub customer_id: Option<String>,
    pub bag_id: Option<String>,
    #[sqlx(rename = "type")]
    pub log_type: String,
    pub detail: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct ListLogs {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Inclusive lower bound on the entry date.
    pub start_date: Option<NaiveDate>,
    /// Exclusive upper bound on the entry date.
    pub end_date: Option<NaiveDate>,
    pub log_type: Option<LogType>,
}

/// Paged audit trail, newest first.
pub async fn list_logs(pool: &SqlitePool, filter: &ListLogs) -> Result<(Vec<LogRow>, i64)> {
    let mut base = Query::select().from(Logs::Table).to_owned();

    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
        base.and_where(Expr::col(Logs::CreatedAt).gte(start.to_string()))
            .and_where(Expr::col(Logs::CreatedAt).lt(end.to_string()));
    }
    if let Some(log_type) = filter.log_type {
        base.and_where(Expr::col(Logs::Type).eq(log_type.to_string()));
    }

    let mut count_statement = base.clone();
    count_statement.expr(Func::count(Expr::col((Logs::Table, Logs::Id))));
    let (sql, values) = count_statement.build_sqlx(SqliteQueryBuilder);
    let (count,): (i64,) = sqlx::query_as_with(&sql, values).fetch_one(pool).await?;

    base.column(Asterisk)
        .order_by(Logs::CreatedAt, Order::Desc)
        .limit(filter.limit.unwrap_or(20))
        .offset(filter.offset.unwrap_or(0));
    let (sql, values) = base.build_sqlx(SqliteQueryBuilder);
    let logs = sqlx::query_as_with::<_, LogRow, _>(&sql, values)
        .fetch_all(pool)
        .await?;

    Ok((logs, count))
}
