//! Device timestamp normalization.
//!
//! Both exports write wall-clock times as `DD-MM-YYYY hh:mm` with no seconds
//! and no zone. They are interpreted in a [`DeviceZone`] and stored as UTC
//! instants so that equal wall-clock strings always produce equal join keys.

use chrono::{
    DateTime, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
};
use crate::error::{PipelineError, Result};

const EXPORT_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Zone in which device wall-clock strings are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceZone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DeviceZone {
    pub fn utc() -> Self {
        DeviceZone::Fixed(Utc.fix())
    }

    fn resolve(&self, naive: NaiveDateTime) -> LocalResult<DateTime<Utc>> {
        match self {
            DeviceZone::Local => Local
                .from_local_datetime(&naive)
                .map(|dt| dt.with_timezone(&Utc)),
            DeviceZone::Fixed(offset) => offset
                .from_local_datetime(&naive)
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    fn wall_clock(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            DeviceZone::Local => instant.with_timezone(&Local).naive_local(),
            DeviceZone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }
}

/// Parse a device timestamp in the host's local zone.
pub fn parse_device_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    parse_device_timestamp_in(raw, DeviceZone::Local)
}

/// Parse `DD-MM-YYYY hh:mm` in `zone`.
///
/// Out-of-range calendar fields (day 32, month 13, 30 February, hour 24) are
/// rejected rather than rolled over into the next unit. Wall-clock times
/// skipped by a DST transition are rejected; repeated ones take the earlier
/// instant.
pub fn parse_device_timestamp_in(raw: &str, zone: DeviceZone) -> Result<DateTime<Utc>> {
    let naive = parse_wall_clock(raw)?;

    match zone.resolve(naive) {
        LocalResult::Single(instant) => Ok(instant),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(PipelineError::malformed(
            raw,
            "wall-clock time does not exist in the device zone",
        )),
    }
}

fn parse_wall_clock(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();
    let (date_part, time_part) = trimmed
        .split_once(' ')
        .ok_or_else(|| PipelineError::malformed(raw, "expected 'DD-MM-YYYY hh:mm'"))?;

    let [day, month, year] = split_fields::<3>(raw, date_part, '-')?;
    let [hour, minute] = split_fields::<2>(raw, time_part, ':')?;

    if year.len() != 4 {
        return Err(PipelineError::malformed(raw, "year must have four digits"));
    }
    let year = i32::try_from(number(raw, year)?)
        .map_err(|_| PipelineError::malformed(raw, "year out of range"))?;

    let date = NaiveDate::from_ymd_opt(year, number(raw, month)?, number(raw, day)?)
        .ok_or_else(|| PipelineError::malformed(raw, "calendar date out of range"))?;
    date.and_hms_opt(number(raw, hour)?, number(raw, minute)?, 0)
        .ok_or_else(|| PipelineError::malformed(raw, "time of day out of range"))
}

fn split_fields<'a, const N: usize>(
    raw: &str,
    part: &'a str,
    separator: char,
) -> Result<[&'a str; N]> {
    let mut fields = [""; N];
    let mut pieces = part.split(separator);

    for slot in fields.iter_mut() {
        *slot = pieces
            .next()
            .ok_or_else(|| PipelineError::malformed(raw, format!("too few '{separator}' fields")))?;
    }

    if pieces.next().is_some() {
        return Err(PipelineError::malformed(
            raw,
            format!("too many '{separator}' fields"),
        ));
    }

    Ok(fields)
}

/// Digits only; `u32::from_str` alone would also take a leading `+`.
fn number(raw: &str, piece: &str) -> Result<u32> {
    if piece.is_empty() || !piece.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PipelineError::malformed(
            raw,
            format!("'{piece}' is not an integer"),
        ));
    }
    piece
        .parse::<u32>()
        .map_err(|_| PipelineError::malformed(raw, format!("'{piece}' is out of range")))
}

/// Render an instant as `DD/MM/YYYY hh:mm:ss` wall-clock time in `zone`.
pub fn format_export_timestamp(instant: DateTime<Utc>, zone: DeviceZone) -> String {
    zone.wall_clock(instant).format(EXPORT_FORMAT).to_string()
}
