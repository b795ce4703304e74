use crate::api::attendance::{HistoryQuery, HistoryResponse, SubmitAttendance, TodayResponse};
use crate::engine::service::HistoryRange;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::settings::SettingsRow;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Absensi Kantor Desa API",
        version = "1.0.0",
        description = r#"
## Village Office Attendance Service

Daily staff attendance with an admin-configured submission window and a
geofence around the office.

### Key Features
- **Daily submission**
  - One record per staff member per day; re-submitting inside the window amends it
- **Time window**
  - Admin-configured start/end times, including windows that wrap past midnight
- **Geofence**
  - "Present" claims are validated against the office location; sick/leave need a note instead
- **History**
  - Day/week/month listings, scoped per staff member

### Identity
The gateway in front of this service authenticates staff and forwards
`x-staff-id` / `x-staff-role` headers.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::submit,
        crate::api::attendance::today,
        crate::api::attendance::history,

        crate::api::settings::get_settings,
    ),
    components(
        schemas(
            SubmitAttendance,
            TodayResponse,
            HistoryQuery,
            HistoryResponse,
            HistoryRange,
            AttendanceRecord,
            AttendanceStatus,
            SettingsRow
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance submission and history APIs"),
        (name = "Settings", description = "Attendance settings read APIs"),
    )
)]
pub struct ApiDoc;
