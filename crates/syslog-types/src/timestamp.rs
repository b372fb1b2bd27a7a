use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};

/// Numeric pieces of an RFC 5424 `FULL-DATE "T" FULL-TIME`, as read off the
/// wire before any calendar validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimestampParts {
  pub year: i32,
  pub month: u32,
  pub day: u32,
  pub hour: u32,
  pub minute: u32,
  pub second: u32,
  /// Fraction of a second, already scaled to nanoseconds.
  pub nanos: u32,
  /// Zone offset east of UTC, in seconds. `Z` is `0`.
  pub offset_seconds: i32,
}

impl TimestampParts {
  /// See [`assemble`].
  #[must_use]
  pub fn assemble(&self) -> Option<DateTime<FixedOffset>> {
    assemble(self)
  }
}

/// Build the offset timestamp, or `None` if any component is out of its
/// calendar range (month 13, February 30th, hour 24, an offset of a day
/// or more, ...).
#[must_use]
pub fn assemble(parts: &TimestampParts) -> Option<DateTime<FixedOffset>> {
  let offset = FixedOffset::east_opt(parts.offset_seconds)?;
  let date = NaiveDate::from_ymd_opt(parts.year, parts.month, parts.day)?;
  let time = NaiveTime::from_hms_nano_opt(parts.hour, parts.minute, parts.second, parts.nanos)?;
  offset.from_local_datetime(&date.and_time(time)).single()
}

/// Scale a fraction of `digits` decimal digits to nanoseconds by
/// right-padding with zeros. `digits` is at most 9.
#[must_use]
pub fn fraction_to_nanos(fraction: u32, digits: usize) -> u32 {
  let pad = u32::try_from(9usize.saturating_sub(digits)).unwrap_or(0);
  fraction.wrapping_mul(10u32.pow(pad))
}
