pub mod attendance;
pub mod settings;

use crate::engine::clock::SystemClock;
use crate::engine::service::AttendanceService;
use crate::store::attendance::SqlAttendanceStore;
use crate::store::settings::SqlSettingsProvider;

/// Concrete service wiring consumed by the HTTP handlers.
pub type LiveService = AttendanceService<SystemClock, SqlSettingsProvider, SqlAttendanceStore>;
