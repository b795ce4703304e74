use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// What a staff member reports for the day. "Present" claims are checked
/// against the office geofence; "Sick" and "Leave" require a note instead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Sick,
    Leave,
}

impl AttendanceStatus {
    pub fn requires_note(self) -> bool {
        matches!(self, AttendanceStatus::Sick | AttendanceStatus::Leave)
    }
}

/// One attendance record per staff member per local calendar day.
/// `(staff_id, day)` is the identity; amendments overwrite in place and
/// records are never deleted by this service.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1001)]
    pub staff_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub day: NaiveDate,
    #[schema(example = "present")]
    pub status: AttendanceStatus,
    #[schema(example = "berobat ke puskesmas", value_type = Option<String>)]
    pub note: Option<String>,
    #[schema(example = -9.1235)]
    pub latitude: Option<f64>,
    #[schema(example = 124.4562)]
    pub longitude: Option<f64>,
    #[schema(example = "2026-01-05T01:00:00Z", format = "date-time", value_type = String)]
    pub submitted_at: DateTime<Utc>,
}
