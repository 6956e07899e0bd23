use std::fmt::Write;

use chrono::{
    DateTime, Utc,
    format::{Item, StrftimeItems},
};

/// Axis scaling mode, as reported by the plotting host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AxisScale {
    /// Linear axis: displayed value is the raw data value.
    #[default]
    Linear,

    /// Logarithmic axis. Values are still shown as raw data values.
    Log {
        /// The base of the logarithm.
        base: f64,
    },

    /// Date axis: raw values are days (fractional) since 1970-01-01T00:00:00 UTC.
    Date,
}

impl AxisScale {
    pub fn is_date(self) -> bool {
        matches!(self, Self::Date)
    }

    /// Format `value` with a strftime-style `format` if this is a date axis.
    ///
    /// Returns `None` for non-date axes, for values outside chrono's range and
    /// for patterns chrono cannot render.
    pub(crate) fn format_date(self, value: f64, format: &str) -> Option<String> {
        if !self.is_date() {
            return None;
        }
        let dt = days_to_datetime(value)?;
        let mut out = String::new();
        write!(out, "{}", dt.format(format)).ok()?;
        Some(out)
    }
}

/// Whether chrono understands every specifier of the strftime pattern `format`.
pub(crate) fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Convert fractional days since the Unix epoch into a UTC timestamp.
pub(crate) fn days_to_datetime(days: f64) -> Option<DateTime<Utc>> {
    const SECONDS_PER_DAY: f64 = 86_400.0;
    if !days.is_finite() {
        return None;
    }
    let total = days * SECONDS_PER_DAY;
    let secs = total.floor();
    let nanos = ((total - secs) * 1e9).round().min(999_999_999.0) as u32;
    if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(secs as i64, nanos)
}
