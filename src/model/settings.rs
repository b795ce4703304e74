use chrono::NaiveTime;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::engine::window::TimeWindow;

/// Raw settings snapshot as stored. Every field is optional because the
/// admin surface persists fields independently; the engine refuses all
/// submissions until the whole row validates.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct SettingsRow {
    #[schema(example = "07:00:00", value_type = Option<String>)]
    pub window_start: Option<NaiveTime>,
    #[schema(example = "16:00:00", value_type = Option<String>)]
    pub window_end: Option<NaiveTime>,
    #[schema(example = -9.123)]
    pub office_latitude: Option<f64>,
    #[schema(example = 124.456)]
    pub office_longitude: Option<f64>,
    #[schema(example = 200.0)]
    pub max_distance_m: Option<f64>,
}

/// Fully validated settings the engine evaluates against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttendanceSettings {
    pub window: TimeWindow,
    pub office_latitude: f64,
    pub office_longitude: f64,
    pub max_distance_m: f64,
}

impl TryFrom<&SettingsRow> for AttendanceSettings {
    type Error = String;

    fn try_from(row: &SettingsRow) -> Result<Self, Self::Error> {
        let window_start = row.window_start.ok_or("window_start is not set")?;
        let window_end = row.window_end.ok_or("window_end is not set")?;
        let office_latitude = finite(row.office_latitude, "office_latitude")?;
        let office_longitude = finite(row.office_longitude, "office_longitude")?;
        let max_distance_m = finite(row.max_distance_m, "max_distance_m")?;

        if max_distance_m < 0.0 {
            return Err("max_distance_m is negative".into());
        }
        if window_start == window_end {
            // Could mean "closed all day" or "open all day"; refuse to guess.
            return Err("window_start equals window_end".into());
        }

        Ok(Self {
            window: TimeWindow::new(window_start, window_end),
            office_latitude,
            office_longitude,
            max_distance_m,
        })
    }
}

fn finite(value: Option<f64>, field: &str) -> Result<f64, String> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(_) => Err(format!("{field} is not a finite number")),
        None => Err(format!("{field} is not set")),
    }
}
