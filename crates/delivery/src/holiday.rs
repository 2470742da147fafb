use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use sqlx::SqlitePool;

use crate::audit::{LogEntry, LogStatus, LogType, Recorder};
use crate::error::Result;

/// Shifting a blocked date forward can land past the subscription's end
/// date, so holidays are always fetched with this lookahead window.
pub const HOLIDAY_LOOKAHEAD_DAYS: u64 = 90;

/// Reschedules blocked delivery dates, preserving length and order.
///
/// A date on a holiday advances by exactly 7 days (same weekday); if the
/// shifted date already exists in the original generated set it advances by
/// another 7 days, then the holiday check repeats. The collision check runs
/// against the original set only, not the evolving resolved set.
pub fn resolve_dates(dates: &[NaiveDate], holidays: &HashSet<NaiveDate>) -> Vec<NaiveDate> {
    let originals: HashSet<NaiveDate> = dates.iter().copied().collect();

    dates
        .iter()
        .map(|&date| {
            let mut current = date;
            while holidays.contains(&current) {
                current = current + Days::new(7);
                if originals.contains(&current) {
                    current = current + Days::new(7);
                }
            }
            current
        })
        .collect()
}

/// Loads the holiday set covering `[start, end]`, inclusive.
pub async fn fetch_range<'e, E>(
    executor: E,
    start: NaiveDate,
    end: NaiveDate,
) -> sqlx::Result<HashSet<NaiveDate>>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let rows: Vec<(NaiveDate,)> =
        sqlx::query_as("SELECT date FROM holidays WHERE date BETWEEN ?1 AND ?2")
            .bind(start)
            .bind(end)
            .fetch_all(executor)
            .await?;

    Ok(rows.into_iter().map(|(date,)| date).collect())
}

/// Maintenance interface over the global holiday calendar.
#[derive(Clone)]
pub struct HolidayStore {
    pool: SqlitePool,
    audit: Recorder,
}

impl HolidayStore {
    pub fn new(pool: SqlitePool) -> Self {
        let audit = Recorder::new(pool.clone());
        Self { pool, audit }
    }

    pub async fn list_by_year(&self, year: i32) -> Result<Vec<NaiveDate>> {
        let rows: Vec<(NaiveDate,)> = sqlx::query_as(
            "SELECT date FROM holidays WHERE date BETWEEN ?1 AND ?2 ORDER BY date",
        )
        .bind(format!("{year}-01-01"))
        .bind(format!("{year}-12-31"))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(date,)| date).collect())
    }

    /// Applies a bulk add/remove of blocked dates.
    pub async fn update(
        &self,
        add: &[NaiveDate],
        remove: &[NaiveDate],
        actor: &str,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for date in add {
            sqlx::query("INSERT OR IGNORE INTO holidays (date) VALUES (?1)")
                .bind(date)
                .execute(&mut *tx)
                .await?;
        }
        for date in remove {
            sqlx::query("DELETE FROM holidays WHERE date = ?1")
                .bind(date)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.audit
            .record(LogEntry {
                actor_id: actor.to_owned(),
                log_type: LogType::UpdateHoliday,
                detail: format!("added {} holidays, removed {}", add.len(), remove.len()),
                status: LogStatus::Success,
                customer_id: None,
                bag_id: None,
            })
            .await;

        Ok(())
    }
}
