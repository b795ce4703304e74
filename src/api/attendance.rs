use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::api::LiveService;
use crate::auth::identity::StaffIdentity;
use crate::engine::evaluate::{Denial, SubmissionClaim};
use crate::engine::service::{HistoryRange, ServiceError};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

#[derive(Deserialize, ToSchema)]
pub struct SubmitAttendance {
    #[schema(example = "present")]
    pub status: AttendanceStatus,
    /// Required when status is sick or leave
    #[schema(example = "berobat ke puskesmas")]
    pub note: Option<String>,
    /// Required when status is present
    #[schema(example = -9.1235)]
    pub latitude: Option<f64>,
    #[schema(example = 124.4562)]
    pub longitude: Option<f64>,
}

#[derive(Serialize, ToSchema)]
pub struct TodayResponse {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub day: NaiveDate,
    /// Whether a submission or amendment is possible right now
    pub window_open: bool,
    pub record: Option<AttendanceRecord>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct HistoryQuery {
    /// Reporting range in local time; defaults to day
    #[param(example = "week")]
    pub range: Option<HistoryRange>,
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 10)]
    pub per_page: Option<u64>,
    /// Admin only: restrict to one staff member; ignored for staff callers
    #[param(example = 1001)]
    pub staff_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct HistoryResponse {
    pub data: Vec<AttendanceRecord>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: i64,
}

fn denial_response(denial: &Denial) -> HttpResponse {
    let mut body = json!({
        "code": denial.code(),
        "message": denial.to_string(),
    });
    if let Denial::OutOfRange { distance_m, .. } = denial {
        // Surfaced so the client can show "Jarak: 842 m".
        body["distance_m"] = json!(distance_m.round() as i64);
    }

    match denial {
        Denial::ConfigInvalid(_) => HttpResponse::ServiceUnavailable().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

/// Submit or amend today's attendance
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body(
        content = SubmitAttendance,
        description = "Claimed status, note and coordinates",
        content_type = "application/json"
    ),
    params(
        ("x-staff-id" = u64, Header, description = "Authenticated staff id, set by the gateway"),
        ("x-staff-role" = Option<String>, Header, description = "staff or admin; defaults to staff")
    ),
    responses(
        (status = 200, description = "Attendance recorded or amended", body = Object, example = json!({
            "message": "Attendance recorded",
            "amended": false,
            "record": {
                "staff_id": 1001,
                "day": "2026-01-05",
                "status": "present",
                "note": null,
                "latitude": -9.1235,
                "longitude": 124.4562,
                "submitted_at": "2026-01-05T01:00:00Z"
            }
        })),
        (status = 400, description = "Submission denied", body = Object, example = json!({
            "code": "out_of_range",
            "message": "current location is 842 m from the office (limit 200 m)",
            "distance_m": 842
        })),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Attendance settings missing or invalid"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn submit(
    identity: StaffIdentity,
    service: web::Data<LiveService>,
    payload: web::Json<SubmitAttendance>,
) -> actix_web::Result<impl Responder> {
    let claim = SubmissionClaim {
        status: payload.status,
        note: payload.note.clone(),
        latitude: payload.latitude,
        longitude: payload.longitude,
    };

    match service.submit(identity.staff_id, claim).await {
        Ok(outcome) => {
            let message = if outcome.amended {
                "Attendance updated"
            } else {
                "Attendance recorded"
            };
            Ok(HttpResponse::Ok().json(json!({
                "message": message,
                "amended": outcome.amended,
                "record": outcome.record,
            })))
        }
        Err(ServiceError::Denied(denial)) => Ok(denial_response(&denial)),
        Err(ServiceError::Store(e)) => {
            tracing::error!(error = %e, staff_id = identity.staff_id, "Attendance submission failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Today's record and window state
#[utoipa::path(
    get,
    path = "/api/v1/attendance/today",
    params(
        ("x-staff-id" = u64, Header, description = "Authenticated staff id, set by the gateway"),
        ("x-staff-role" = Option<String>, Header, description = "staff or admin; defaults to staff")
    ),
    responses(
        (status = 200, description = "Today's attendance state", body = TodayResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn today(
    identity: StaffIdentity,
    service: web::Data<LiveService>,
) -> actix_web::Result<impl Responder> {
    match service.today(identity.staff_id).await {
        Ok(view) => Ok(HttpResponse::Ok().json(TodayResponse {
            day: view.day,
            window_open: view.window_open,
            record: view.record,
        })),
        Err(e) => {
            tracing::error!(error = %e, staff_id = identity.staff_id, "Failed to load today's attendance");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Paginated attendance history
#[utoipa::path(
    get,
    path = "/api/v1/attendance/history",
    params(
        HistoryQuery,
        ("x-staff-id" = u64, Header, description = "Authenticated staff id, set by the gateway"),
        ("x-staff-role" = Option<String>, Header, description = "staff or admin; defaults to staff")
    ),
    responses(
        (status = 200, description = "Paginated history, newest first", body = HistoryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn history(
    identity: StaffIdentity,
    service: web::Data<LiveService>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    // Staff only ever see their own rows; asking for someone else's
    // requires the admin role. Admins with no filter see everyone.
    let scope = match query.staff_id {
        Some(requested) if requested != identity.staff_id => {
            identity.require_admin()?;
            Some(requested)
        }
        Some(requested) => Some(requested),
        None if identity.is_admin() => None,
        None => Some(identity.staff_id),
    };
    let range = query.range.unwrap_or(HistoryRange::Day);

    match service
        .history(
            scope,
            range,
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(10),
        )
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(HistoryResponse {
            data: page.data,
            page: page.page,
            per_page: page.per_page,
            total: page.total,
        })),
        Err(e) => {
            tracing::error!(error = %e, staff_id = identity.staff_id, "Failed to load attendance history");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}
