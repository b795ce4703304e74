use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use thiserror::Error;

use crate::engine::geo;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::settings::{AttendanceSettings, SettingsRow};

/// The staff member's asserted status/location for a submission, prior to
/// validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionClaim {
    pub status: AttendanceStatus,
    pub note: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Everything one evaluation call reads, resolved up front: the current
/// local time, the day key derived from it exactly once, the raw settings
/// snapshot, and today's existing record if any. Owned by a single call;
/// never persisted.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub staff_id: u64,
    pub now: DateTime<FixedOffset>,
    pub day: NaiveDate,
    pub settings: Option<SettingsRow>,
    pub existing: Option<AttendanceRecord>,
    pub claim: SubmissionClaim,
}

/// Why a submission was refused. All variants are recoverable caller
/// outcomes; infrastructure failures travel separately.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Denial {
    #[error("attendance settings are missing or invalid: {0}")]
    ConfigInvalid(String),
    #[error("the submission window is closed")]
    OutsideWindow,
    #[error("a note is required when reporting sick or leave")]
    NoteRequired,
    #[error("a location is required when reporting present")]
    LocationRequired,
    #[error("current location is {distance_m:.0} m from the office (limit {max_distance_m:.0} m)")]
    OutOfRange { distance_m: f64, max_distance_m: f64 },
}

impl Denial {
    pub fn code(&self) -> &'static str {
        match self {
            Denial::ConfigInvalid(_) => "config_invalid",
            Denial::OutsideWindow => "outside_window",
            Denial::NoteRequired => "note_required",
            Denial::LocationRequired => "location_required",
            Denial::OutOfRange { .. } => "out_of_range",
        }
    }
}

/// Outcome of a successful evaluation. The caller owns the single
/// persistence call; the engine itself performs no I/O.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Create(AttendanceRecord),
    Amend(AttendanceRecord),
}

impl Decision {
    pub fn record(&self) -> &AttendanceRecord {
        match self {
            Decision::Create(r) | Decision::Amend(r) => r,
        }
    }

    pub fn into_record(self) -> AttendanceRecord {
        match self {
            Decision::Create(r) | Decision::Amend(r) => r,
        }
    }

    pub fn is_amend(&self) -> bool {
        matches!(self, Decision::Amend(_))
    }
}

/// Decide whether the claim may be committed, and as a create or an amend.
///
/// Checks run in a fixed order: settings validity, window, claim shape,
/// geofence. The window check comes before anything claim-specific and
/// blocks amends just as it blocks creates; once the window closes the day
/// is read-only. Re-submitting identical values inside the window is
/// allowed and simply re-stamps `submitted_at`.
pub fn evaluate(ctx: &EvaluationContext) -> Result<Decision, Denial> {
    let settings = validate_settings(ctx.settings.as_ref())?;

    if !settings.window.contains(ctx.now.time()) {
        return Err(Denial::OutsideWindow);
    }

    let claim = &ctx.claim;
    let note = claim
        .note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    if claim.status.requires_note() && note.is_none() {
        return Err(Denial::NoteRequired);
    }

    if claim.status == AttendanceStatus::Present {
        let (lat, lon) = match (claim.latitude, claim.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => (lat, lon),
            _ => return Err(Denial::LocationRequired),
        };

        let distance_m =
            geo::distance_meters(lat, lon, settings.office_latitude, settings.office_longitude);
        if distance_m > settings.max_distance_m {
            return Err(Denial::OutOfRange {
                distance_m,
                max_distance_m: settings.max_distance_m,
            });
        }
    }

    let record = AttendanceRecord {
        staff_id: ctx.staff_id,
        day: ctx.day,
        status: claim.status,
        note: note.map(str::to_owned),
        latitude: claim.latitude,
        longitude: claim.longitude,
        submitted_at: ctx.now.with_timezone(&Utc),
    };

    // Same-day identity: an existing record is amended in place, a missing
    // one gets a fresh (staff_id, day) key. Dedup is by day only, never by
    // field values.
    match ctx.existing {
        Some(_) => Ok(Decision::Amend(record)),
        None => Ok(Decision::Create(record)),
    }
}

fn validate_settings(row: Option<&SettingsRow>) -> Result<AttendanceSettings, Denial> {
    let row = row.ok_or_else(|| Denial::ConfigInvalid("no settings row".into()))?;
    AttendanceSettings::try_from(row).map_err(Denial::ConfigInvalid)
}
