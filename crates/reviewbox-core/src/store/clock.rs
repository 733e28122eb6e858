//! Time source for ids, timestamps, and display dates

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};

/// Default display date, the short `dd.mm.yyyy` form.
pub const DEFAULT_DATE_FORMAT: &str = "%d.%m.%Y";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Render `instant` in the device's local time zone.
///
/// An unusable format string falls back to [`DEFAULT_DATE_FORMAT`] instead of
/// failing the write that needs the date.
pub fn format_display_date(instant: DateTime<Utc>, format: &str) -> String {
    let local = instant.with_timezone(&Local);
    let mut rendered = String::new();
    if write!(rendered, "{}", local.format(format)).is_ok() {
        return rendered;
    }

    tracing::warn!("Invalid date format {format:?}; using {DEFAULT_DATE_FORMAT:?}");
    local.format(DEFAULT_DATE_FORMAT).to_string()
}
