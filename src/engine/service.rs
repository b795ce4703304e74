use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate};
use serde::Deserialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::engine::clock::Clock;
use crate::engine::evaluate::{evaluate, Denial, EvaluationContext, SubmissionClaim};
use crate::model::attendance::AttendanceRecord;
use crate::model::settings::{AttendanceSettings, SettingsRow};

/// Read path for the admin-owned settings singleton. Implementations do
/// the I/O; validation stays in the engine.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn current(&self) -> Result<Option<SettingsRow>, sqlx::Error>;
}

/// Keyed store of one attendance record per (staff member, local day).
/// `upsert` must be atomic per key; concurrent writes to the same key are
/// last-writer-wins on `submitted_at`.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find_for_day(
        &self,
        staff_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error>;

    async fn upsert(&self, record: &AttendanceRecord) -> Result<(), sqlx::Error>;

    async fn count_between(
        &self,
        staff_id: Option<u64>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64, sqlx::Error>;

    async fn list_between(
        &self,
        staff_id: Option<u64>,
        from: NaiveDate,
        to: NaiveDate,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<AttendanceRecord>, sqlx::Error>;
}

/// Domain denials and infrastructure failures stay distinct so a store
/// timeout can never be reported to the user as, say, "out of range".
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Denied(#[from] Denial),
    #[error("storage failure: {0}")]
    Store(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub record: AttendanceRecord,
    pub amended: bool,
}

/// Snapshot the client needs to render today's form: the record so far and
/// whether the window is currently open.
#[derive(Debug, Clone, PartialEq)]
pub struct TodayView {
    pub day: NaiveDate,
    pub window_open: bool,
    pub record: Option<AttendanceRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRange {
    Day,
    Week,
    Month,
}

impl HistoryRange {
    /// Inclusive local-date bounds of the range containing `today`.
    /// Weeks start on Monday.
    pub fn bounds(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            HistoryRange::Day => (today, today),
            HistoryRange::Week => {
                let monday =
                    today - Duration::days(today.weekday().num_days_from_monday() as i64);
                (monday, monday + Duration::days(6))
            }
            HistoryRange::Month => {
                let first = today.with_day(1).unwrap();
                let next_month = first.checked_add_months(Months::new(1)).unwrap();
                (first, next_month.pred_opt().unwrap())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub data: Vec<AttendanceRecord>,
    pub page: u64,
    pub per_page: u64,
    pub total: i64,
}

/// Wires the pure evaluation core to its collaborators. All I/O happens
/// here, before or after the one `evaluate` call; the day key is computed
/// once per call and threaded through both the lookup and the upsert.
pub struct AttendanceService<C, P, S> {
    clock: C,
    offset: FixedOffset,
    settings: P,
    store: S,
}

impl<C, P, S> AttendanceService<C, P, S>
where
    C: Clock,
    P: SettingsProvider,
    S: AttendanceStore,
{
    pub fn new(clock: C, offset: FixedOffset, settings: P, store: S) -> Self {
        Self {
            clock,
            offset,
            settings,
            store,
        }
    }

    fn local_now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.offset)
    }

    pub async fn submit(
        &self,
        staff_id: u64,
        claim: SubmissionClaim,
    ) -> Result<SubmissionOutcome, ServiceError> {
        let now = self.local_now();
        let day = now.date_naive();

        let settings = self.settings.current().await?;
        let existing = self.store.find_for_day(staff_id, day).await?;

        let ctx = EvaluationContext {
            staff_id,
            now,
            day,
            settings,
            existing,
            claim,
        };
        let decision = evaluate(&ctx)?;

        let amended = decision.is_amend();
        let record = decision.into_record();
        self.store.upsert(&record).await?;

        Ok(SubmissionOutcome { record, amended })
    }

    pub async fn today(&self, staff_id: u64) -> Result<TodayView, ServiceError> {
        let now = self.local_now();
        let day = now.date_naive();

        let window_open = match self.settings.current().await?.as_ref() {
            Some(row) => AttendanceSettings::try_from(row)
                .map(|s| s.window.contains(now.time()))
                .unwrap_or(false),
            None => false,
        };
        let record = self.store.find_for_day(staff_id, day).await?;

        Ok(TodayView {
            day,
            window_open,
            record,
        })
    }

    pub async fn history(
        &self,
        staff_id: Option<u64>,
        range: HistoryRange,
        page: u64,
        per_page: u64,
    ) -> Result<HistoryPage, ServiceError> {
        let per_page = per_page.clamp(1, 100);
        let page = page.max(1);
        let offset = (page - 1) * per_page;

        let today = self.local_now().date_naive();
        let (from, to) = range.bounds(today);

        let total = self.store.count_between(staff_id, from, to).await?;
        let data = self
            .store
            .list_between(staff_id, from, to, per_page, offset)
            .await?;

        Ok(HistoryPage {
            data,
            page,
            per_page,
            total,
        })
    }

    /// Raw snapshot for the read-only settings endpoint; the client uses
    /// the office coordinates for its live distance preview.
    pub async fn settings_snapshot(&self) -> Result<Option<SettingsRow>, ServiceError> {
        Ok(self.settings.current().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clock::FixedClock;
    use crate::model::attendance::AttendanceStatus;
    use chrono::{NaiveTime, TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FixedSettings(Option<SettingsRow>);

    #[async_trait]
    impl SettingsProvider for FixedSettings {
        async fn current(&self) -> Result<Option<SettingsRow>, sqlx::Error> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<HashMap<(u64, NaiveDate), AttendanceRecord>>,
    }

    impl MemoryStore {
        fn in_range(
            &self,
            staff_id: Option<u64>,
            from: NaiveDate,
            to: NaiveDate,
        ) -> Vec<AttendanceRecord> {
            let mut rows: Vec<_> = self
                .records
                .lock()
                .unwrap()
                .values()
                .filter(|r| from <= r.day && r.day <= to)
                .filter(|r| staff_id.is_none_or(|id| r.staff_id == id))
                .cloned()
                .collect();
            rows.sort_by(|a, b| (b.day, b.submitted_at).cmp(&(a.day, a.submitted_at)));
            rows
        }
    }

    #[async_trait]
    impl AttendanceStore for MemoryStore {
        async fn find_for_day(
            &self,
            staff_id: u64,
            day: NaiveDate,
        ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
            Ok(self.records.lock().unwrap().get(&(staff_id, day)).cloned())
        }

        async fn upsert(&self, record: &AttendanceRecord) -> Result<(), sqlx::Error> {
            self.records
                .lock()
                .unwrap()
                .insert((record.staff_id, record.day), record.clone());
            Ok(())
        }

        async fn count_between(
            &self,
            staff_id: Option<u64>,
            from: NaiveDate,
            to: NaiveDate,
        ) -> Result<i64, sqlx::Error> {
            Ok(self.in_range(staff_id, from, to).len() as i64)
        }

        async fn list_between(
            &self,
            staff_id: Option<u64>,
            from: NaiveDate,
            to: NaiveDate,
            limit: u64,
            offset: u64,
        ) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
            Ok(self
                .in_range(staff_id, from, to)
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect())
        }
    }

    fn wita() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn office_settings() -> SettingsRow {
        SettingsRow {
            window_start: NaiveTime::from_hms_opt(7, 0, 0),
            window_end: NaiveTime::from_hms_opt(16, 0, 0),
            office_latitude: Some(-9.123),
            office_longitude: Some(124.456),
            max_distance_m: Some(200.0),
        }
    }

    fn service_at(
        utc: DateTime<Utc>,
        settings: Option<SettingsRow>,
    ) -> AttendanceService<FixedClock, FixedSettings, MemoryStore> {
        AttendanceService::new(
            FixedClock::new(utc),
            wita(),
            FixedSettings(settings),
            MemoryStore::default(),
        )
    }

    fn present_at_office() -> SubmissionClaim {
        SubmissionClaim {
            status: AttendanceStatus::Present,
            note: None,
            latitude: Some(-9.123),
            longitude: Some(124.456),
        }
    }

    // 01:00 UTC is 09:00 WITA, inside the 07:00-16:00 window.
    fn nine_am_local() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 1, 0, 0).unwrap()
    }

    #[actix_web::test]
    async fn submitting_twice_keeps_a_single_record() {
        let service = service_at(nine_am_local(), Some(office_settings()));

        let first = service.submit(7, present_at_office()).await.unwrap();
        assert!(!first.amended);

        let second = service
            .submit(
                7,
                SubmissionClaim {
                    status: AttendanceStatus::Sick,
                    note: Some("demam".into()),
                    latitude: None,
                    longitude: None,
                },
            )
            .await
            .unwrap();
        assert!(second.amended);
        assert_eq!(second.record.day, first.record.day);

        let stored = service.store.records.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(
            stored.values().next().unwrap().status,
            AttendanceStatus::Sick
        );
    }

    #[actix_web::test]
    async fn denial_surfaces_as_a_domain_error() {
        // 12:00 UTC is 20:00 WITA, after close.
        let service = service_at(
            Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap(),
            Some(office_settings()),
        );

        let err = service.submit(7, present_at_office()).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Denied(Denial::OutsideWindow)
        ));
        assert!(service.store.records.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn day_key_follows_the_local_calendar_across_midnight() {
        // 17:30 UTC on Mar 1 is 01:30 WITA on Mar 2; a wrapped 22:00-02:00
        // window is open then, and the record must key to Mar 2.
        let service = service_at(
            Utc.with_ymd_and_hms(2026, 3, 1, 17, 30, 0).unwrap(),
            Some(SettingsRow {
                window_start: NaiveTime::from_hms_opt(22, 0, 0),
                window_end: NaiveTime::from_hms_opt(2, 0, 0),
                ..office_settings()
            }),
        );

        let outcome = service.submit(7, present_at_office()).await.unwrap();
        assert_eq!(
            outcome.record.day,
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
        );
    }

    #[actix_web::test]
    async fn today_reports_window_state_and_existing_record() {
        let service = service_at(nine_am_local(), Some(office_settings()));

        let before = service.today(7).await.unwrap();
        assert!(before.window_open);
        assert!(before.record.is_none());

        service.submit(7, present_at_office()).await.unwrap();

        let after = service.today(7).await.unwrap();
        assert_eq!(
            after.record.unwrap().status,
            AttendanceStatus::Present
        );
    }

    #[actix_web::test]
    async fn today_window_is_closed_when_settings_are_invalid() {
        let service = service_at(nine_am_local(), None);
        let view = service.today(7).await.unwrap();
        assert!(!view.window_open);
    }

    #[test]
    fn range_bounds_follow_the_local_calendar() {
        // 2026-01-07 is a Wednesday.
        let today = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        let d = |day| NaiveDate::from_ymd_opt(2026, 1, day).unwrap();

        assert_eq!(HistoryRange::Day.bounds(today), (today, today));
        assert_eq!(HistoryRange::Week.bounds(today), (d(5), d(11)));
        assert_eq!(HistoryRange::Month.bounds(today), (d(1), d(31)));
    }

    #[actix_web::test]
    async fn history_paginates_newest_first_and_scopes_by_staff() {
        let service = service_at(nine_am_local(), Some(office_settings()));
        let base = service.submit(7, present_at_office()).await.unwrap().record;

        // Seed earlier days for two staff members directly.
        for (staff_id, day_offset) in [(7u64, 1i64), (7, 2), (8, 1)] {
            let record = AttendanceRecord {
                staff_id,
                day: base.day - Duration::days(day_offset),
                ..base.clone()
            };
            service.store.upsert(&record).await.unwrap();
        }

        let page = service
            .history(Some(7), HistoryRange::Month, 1, 2)
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].day, base.day);
        assert!(page.data.iter().all(|r| r.staff_id == 7));

        let everyone = service
            .history(None, HistoryRange::Month, 1, 10)
            .await
            .unwrap();
        assert_eq!(everyone.total, 4);
    }
}
