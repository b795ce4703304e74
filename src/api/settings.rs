use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::api::LiveService;
use crate::auth::identity::StaffIdentity;
use crate::model::settings::SettingsRow;

/// Current attendance settings
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    params(
        ("x-staff-id" = u64, Header, description = "Authenticated staff id, set by the gateway"),
        ("x-staff-role" = Option<String>, Header, description = "staff or admin; defaults to staff")
    ),
    responses(
        (status = 200, description = "Current settings snapshot", body = SettingsRow),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Settings not configured", body = Object, example = json!({
            "message": "Attendance settings not configured"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Settings"
)]
pub async fn get_settings(
    _identity: StaffIdentity,
    service: web::Data<LiveService>,
) -> actix_web::Result<impl Responder> {
    match service.settings_snapshot().await {
        Ok(Some(row)) => Ok(HttpResponse::Ok().json(row)),
        Ok(None) => Ok(HttpResponse::NotFound().json(json!({
            "message": "Attendance settings not configured"
        }))),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load attendance settings");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}
