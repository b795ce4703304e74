use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{FromRow, MySqlPool};

use crate::engine::service::AttendanceStore;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

#[derive(Clone)]
pub struct SqlAttendanceStore {
    pool: MySqlPool,
}

impl SqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AttendanceRow {
    staff_id: u64,
    day: NaiveDate,
    status: String,
    note: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    submitted_at: NaiveDateTime,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = sqlx::Error;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = AttendanceStatus::from_str(&row.status)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(AttendanceRecord {
            staff_id: row.staff_id,
            day: row.day,
            status,
            note: row.note,
            latitude: row.latitude,
            longitude: row.longitude,
            submitted_at: row.submitted_at.and_utc(),
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT staff_id, day, status, note, latitude, longitude, submitted_at FROM attendance";

#[async_trait]
impl AttendanceStore for SqlAttendanceStore {
    async fn find_for_day(
        &self,
        staff_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            "{SELECT_COLUMNS} WHERE staff_id = ? AND day = ?"
        ))
        .bind(staff_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AttendanceRecord::try_from).transpose()
    }

    async fn upsert(&self, record: &AttendanceRecord) -> Result<(), sqlx::Error> {
        // (staff_id, day) is the primary key, so concurrent submissions for
        // the same day collapse to one row, last writer wins.
        sqlx::query(
            r#"
            INSERT INTO attendance (staff_id, day, status, note, latitude, longitude, submitted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                status = VALUES(status),
                note = VALUES(note),
                latitude = VALUES(latitude),
                longitude = VALUES(longitude),
                submitted_at = VALUES(submitted_at)
            "#,
        )
        .bind(record.staff_id)
        .bind(record.day)
        .bind(record.status.to_string())
        .bind(&record.note)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.submitted_at.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_between(
        &self,
        staff_id: Option<u64>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        let mut sql = String::from("SELECT COUNT(*) FROM attendance WHERE day BETWEEN ? AND ?");
        if staff_id.is_some() {
            sql.push_str(" AND staff_id = ?");
        }

        let mut query = sqlx::query_scalar::<_, i64>(&sql).bind(from).bind(to);
        if let Some(id) = staff_id {
            query = query.bind(id);
        }

        query.fetch_one(&self.pool).await
    }

    async fn list_between(
        &self,
        staff_id: Option<u64>,
        from: NaiveDate,
        to: NaiveDate,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
        let mut sql = format!("{SELECT_COLUMNS} WHERE day BETWEEN ? AND ?");
        if staff_id.is_some() {
            sql.push_str(" AND staff_id = ?");
        }
        sql.push_str(" ORDER BY day DESC, submitted_at DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, AttendanceRow>(&sql).bind(from).bind(to);
        if let Some(id) = staff_id {
            query = query.bind(id);
        }

        let rows = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }
}
